use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::Frame;

use crate::error::Result;
use crate::fmt::{metric_value, pct};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const GROWTH_UP_STYLE: Style = Style::new().fg(Color::Rgb(80, 220, 100));
pub const GROWTH_DOWN_STYLE: Style = Style::new().fg(Color::Red);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const BAR_STYLE: Style = Style::new().fg(Color::Rgb(196, 140, 90));

/// Growth rate as a colored Span; undefined growth renders as a dim dash.
pub fn growth_span(growth: Option<f64>) -> Span<'static> {
    match growth {
        Some(g) if g < 0.0 => Span::styled(pct(g), GROWTH_DOWN_STYLE),
        Some(g) => Span::styled(format!("+{}", pct(g)), GROWTH_UP_STYLE),
        None => Span::styled("—", FOOTER_STYLE),
    }
}

pub fn value_span(value: f64, currency: bool) -> Span<'static> {
    Span::styled(metric_value(value, currency), Style::new().add_modifier(Modifier::BOLD))
}

/// Compact axis/bar label: "$12k", "3.5k", "1.2M".
pub fn compact(val: f64, currency: bool) -> String {
    let sign = if currency { "$" } else { "" };
    let (scaled, suffix) = if val.abs() >= 1_000_000.0 {
        (val / 1_000_000.0, "M")
    } else if val.abs() >= 1000.0 {
        (val / 1000.0, "k")
    } else {
        return format!("{sign}{}", val.round() as i64);
    };
    if scaled == scaled.floor() {
        format!("{sign}{}{suffix}", scaled as i64)
    } else {
        format!("{sign}{scaled:.1}{suffix}")
    }
}

// ---------------------------------------------------------------------------
// View loop
// ---------------------------------------------------------------------------

pub enum ViewAction {
    Continue,
    Close,
    /// Re-read the data source, then redraw.
    Reload,
}

pub trait View {
    fn draw(&mut self, frame: &mut Frame);
    fn handle_key(&mut self, code: KeyCode) -> ViewAction;
    fn reload(&mut self) {}
}

/// Run an interactive ratatui view. Sets up the terminal, event loop,
/// and panic hook, then restores the terminal on exit.
pub fn run_view(view: &mut dyn View) -> Result<()> {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| view.draw(frame)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }
                match view.handle_key(key.code) {
                    ViewAction::Close => break Ok(()),
                    ViewAction::Reload => view.reload(),
                    ViewAction::Continue => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact() {
        assert_eq!(compact(999.6, true), "$1000");
        assert_eq!(compact(2500.0, true), "$2.5k");
        assert_eq!(compact(3000.0, false), "3k");
        assert_eq!(compact(1_500_000.0, true), "$1.5M");
        assert_eq!(compact(42.0, false), "42");
    }

    #[test]
    fn test_growth_span() {
        assert_eq!(growth_span(Some(5.0)).content, "+5.00%");
        assert_eq!(growth_span(Some(-1.5)).content, "-1.50%");
        assert_eq!(growth_span(None).content, "—");
    }
}
