use std::path::PathBuf;

use crossterm::event::KeyCode;
use rand::seq::SliceRandom;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::aggregate::{Granularity, Metric};
use crate::cli::{open_session, GlobalArgs};
use crate::error::Result;
use crate::filter::Filter;
use crate::fmt::{metric_value, money, number, opt, pct};
use crate::loader::reload_if_changed;
use crate::models::{Dataset, TransactionRecord};
use crate::reports::{self, Kpis, ProductReport, StoreReport, TimeOfDayReport, TrendReport};
use crate::settings::Settings;
use crate::tui::{
    compact, growth_span, run_view, value_span, View, ViewAction, BAR_STYLE, FOOTER_STYLE,
    HEADER_STYLE, SELECTED_STYLE,
};

const GREETINGS: &[&str] = &[
    "Beans counted.",
    "Fresh numbers, still warm.",
    "Let's see how the morning rush went.",
    "Another day, another register tape.",
    "Pull up a stool.",
    "The espresso machine sends its regards.",
    "Right then, where were we?",
    "Who sold the most scones?",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Tab {
    Trend,
    TimeOfDay,
    Products,
    Stores,
}

impl Tab {
    const ALL: [Tab; 4] = [Tab::Trend, Tab::TimeOfDay, Tab::Products, Tab::Stores];

    fn title(self) -> &'static str {
        match self {
            Tab::Trend => "Sales Trend",
            Tab::TimeOfDay => "Time of Day",
            Tab::Products => "Products",
            Tab::Stores => "Stores",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct Reports {
    kpis: Kpis,
    trend: TrendReport,
    time_of_day: TimeOfDayReport,
    products: ProductReport,
    stores: StoreReport,
}

struct Dashboard {
    settings: Settings,
    data_path: PathBuf,
    dataset: Dataset,
    filter: Filter,
    metric: Metric,
    granularity: Granularity,
    tab: Tab,
    greeting: String,
    reports: Option<Reports>,
    status_message: Option<String>,
}

impl Dashboard {
    fn new(global: &GlobalArgs) -> Result<Self> {
        let session = open_session(global)?;
        let mut dashboard = Self::from_parts(
            session.settings,
            session.data_path,
            session.load.dataset,
            session.filter,
        )?;
        if session.load.dropped > 0 {
            dashboard.status_message = Some(format!(
                "{} malformed rows skipped",
                number(session.load.dropped as u64)
            ));
        }
        Ok(dashboard)
    }

    fn from_parts(
        settings: Settings,
        data_path: PathBuf,
        dataset: Dataset,
        filter: Filter,
    ) -> Result<Self> {
        let mut rng = rand::thread_rng();
        let greeting = GREETINGS.choose(&mut rng).unwrap_or(&"Hello.").to_string();
        let granularity = settings.default_granularity;
        let mut dashboard = Self {
            settings,
            data_path,
            dataset,
            filter,
            metric: Metric::Revenue,
            granularity,
            tab: Tab::Trend,
            greeting,
            reports: None,
            status_message: None,
        };
        dashboard.select(Metric::Revenue, granularity)?;
        Ok(dashboard)
    }

    fn build_reports(&self, metric: Metric, granularity: Granularity) -> Result<Reports> {
        let rows: Vec<&TransactionRecord> = self.filter.apply(&self.dataset);
        let policy = self.settings.bucket_policy;
        let trend = reports::get_trend(
            &rows,
            metric,
            granularity,
            policy,
            &self.settings.rolling_windows,
        )?;
        Ok(Reports {
            kpis: reports::get_kpis(&rows),
            trend,
            time_of_day: reports::get_time_of_day(&rows, metric, false),
            products: reports::get_products(&rows, metric, None, self.settings.top_n),
            stores: reports::get_store_report(
                &self.dataset,
                &self.filter,
                &self.settings.stores,
                metric,
                granularity,
                policy,
            ),
        })
    }

    /// Switch to `metric`/`granularity`. The selection only changes when every
    /// view could be rebuilt for it.
    fn select(&mut self, metric: Metric, granularity: Granularity) -> Result<()> {
        let reports = self.build_reports(metric, granularity)?;
        self.metric = metric;
        self.granularity = granularity;
        self.reports = Some(reports);
        Ok(())
    }

    fn try_select(&mut self, metric: Metric, granularity: Granularity) {
        match self.select(metric, granularity) {
            Ok(()) => self.status_message = None,
            Err(e) => self.status_message = Some(format!("Error: {e}")),
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_kpis(&self, frame: &mut Frame, area: Rect, kpis: &Kpis) {
        let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
        let values = [
            ("Total Sales", money(kpis.total_sales)),
            ("Total Transactions", number(kpis.total_transactions as u64)),
            (
                "Avg Qty per Ticket",
                opt(kpis.avg_qty_per_ticket, |v| format!("{v:.2}")),
            ),
            ("Avg Sale Value", opt(kpis.avg_sale_value, money)),
        ];
        for ((title, value), card) in values.into_iter().zip(cards.iter()) {
            let block = Block::default().title(title).borders(Borders::ALL);
            let text = Paragraph::new(Line::from(Span::styled(
                format!(" {value}"),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .block(block);
            frame.render_widget(text, *card);
        }
    }

    fn draw_trend(&self, frame: &mut Frame, area: Rect, trend: &TrendReport) {
        let [chart_area, summary_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(3)]).areas(area);

        let items: Vec<(String, Option<f64>)> = trend
            .series
            .points
            .iter()
            .map(|p| (p.key.to_string(), Some(p.value)))
            .collect();
        let title = format!("{}: {}", trend.metric.axis_title(), trend.granularity.label());
        render_bars(frame, chart_area, &title, &items, trend.metric.is_currency());

        let latest_avg = trend.moving_average.points.last().and_then(|p| p.value);
        let latest_growth = trend.growth.points.last().and_then(|p| p.value);
        let lines = vec![
            Line::from(vec![
                Span::raw(format!(" Latest {:<28}", trend.moving_average.label)),
                Span::raw(opt(latest_avg, |v| metric_value(v, trend.metric.is_currency()))),
            ]),
            Line::from(vec![
                Span::raw(format!(" Latest {:<28}", trend.growth.label)),
                growth_span(latest_growth),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines), summary_area);
    }

    fn draw_time_of_day(&self, frame: &mut Frame, area: Rect, r: &TimeOfDayReport) {
        let [days_area, hours_area] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let days = weekday_bars(r);
        let hours: Vec<(String, Option<f64>)> = r
            .hours
            .iter()
            .map(|h| (format!("{:02}h", h.hour), Some(h.value)))
            .collect();
        let currency = r.metric.is_currency();
        let label = r.metric.label();
        render_bars(frame, days_area, &format!("Average {label} by Weekday"), &days, currency);
        render_bars(frame, hours_area, &format!("Average {label} by Hour"), &hours, currency);
    }

    fn draw_products(&self, frame: &mut Frame, area: Rect, r: &ProductReport) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let currency = r.metric.is_currency();

        let mut lines = vec![Line::from(Span::styled(
            " Product Categories",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for c in &r.categories {
            lines.push(Line::from(vec![
                Span::raw(format!(" {:<20}", c.name)),
                value_span(c.value, currency),
                Span::styled(format!("  {}", pct(c.pct)), FOOTER_STYLE),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), left);

        let top: Vec<(String, f64)> = r
            .top_products
            .points
            .iter()
            .map(|p| (p.key.clone(), p.value))
            .collect();
        let name_width = top.iter().map(|(n, _)| n.len()).max().unwrap_or(10);
        let mut lines = vec![Line::from(Span::styled(
            format!(" Top-Selling Products ({})", r.top_products.metric.label()),
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, (name, value)) in top.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::raw(format!(" {}. {:<width$}  ", i + 1, name, width = name_width)),
                value_span(*value, r.top_products.metric.is_currency()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), right);
    }

    fn draw_stores(&self, frame: &mut Frame, area: Rect, r: &StoreReport) {
        let [table_area, chart_area] =
            Layout::vertical([Constraint::Length(r.stores.len() as u16 + 2), Constraint::Fill(1)])
                .areas(area);

        let mut lines = vec![Line::from(Span::styled(
            format!(
                " {:<18}{:>14}{:>14}{:>12}{:>12}",
                "Store", "Sales", "Transactions", "Avg Ticket", "Growth"
            ),
            HEADER_STYLE,
        ))];
        for (kpi, trend) in r.stores.iter().zip(&r.trends) {
            let growth = trend.growth.points.last().and_then(|p| p.value);
            lines.push(Line::from(vec![
                Span::raw(format!(
                    " {:<18}{:>14}{:>14}{:>12}  ",
                    kpi.store,
                    money(kpi.total_sales),
                    number(kpi.transactions as u64),
                    opt(kpi.avg_ticket_size, money),
                )),
                growth_span(growth),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), table_area);

        let share: Vec<(String, Option<f64>)> = r
            .distribution
            .iter()
            .map(|d| (d.name.clone(), Some(d.value)))
            .collect();
        render_bars(
            frame,
            chart_area,
            &format!("Store Sales Distribution ({})", r.metric.label()),
            &share,
            r.metric.is_currency(),
        );
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, sep, kpi_area, tabs_area, content_area, footer_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);

        let scope = match self.dataset.date_bounds() {
            Some((first, last)) => format!("{} rows, {first} to {last}", number(self.dataset.len() as u64)),
            None => "no rows".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {}", self.greeting), HEADER_STYLE),
                Span::styled(format!("  {scope}"), FOOTER_STYLE),
            ])),
            header_area,
        );
        frame.render_widget(
            Paragraph::new(Span::styled("━".repeat(area.width as usize), FOOTER_STYLE)),
            sep,
        );

        let titles: Vec<String> = Tab::ALL.iter().map(|t| t.title().to_string()).collect();
        frame.render_widget(
            Tabs::new(titles)
                .select(self.tab.index())
                .highlight_style(SELECTED_STYLE)
                .divider("│"),
            tabs_area,
        );

        if let Some(r) = &self.reports {
            self.draw_kpis(frame, kpi_area, &r.kpis);
            match self.tab {
                Tab::Trend => self.draw_trend(frame, content_area, &r.trend),
                Tab::TimeOfDay => self.draw_time_of_day(frame, content_area, &r.time_of_day),
                Tab::Products => self.draw_products(frame, content_area, &r.products),
                Tab::Stores => self.draw_stores(frame, content_area, &r.stores),
            }
        }

        let hints = format!(
            " ←/→ view · m metric: {} · g granularity: {} · r reload · q quit",
            self.metric.label(),
            self.granularity.label()
        );
        let footer = match &self.status_message {
            Some(msg) => format!("{hints}   {msg}"),
            None => hints,
        };
        frame.render_widget(Paragraph::new(Span::styled(footer, FOOTER_STYLE)), footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Char('r') => return ViewAction::Reload,
            KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
            KeyCode::Char('m') => self.try_select(self.metric.next(), self.granularity),
            KeyCode::Char('g') => self.try_select(self.metric, self.granularity.next()),
            _ => {}
        }
        ViewAction::Continue
    }

    fn reload(&mut self) {
        match reload_if_changed(&self.dataset, &self.data_path) {
            Ok(Some(report)) => {
                log::info!(
                    "dashboard reloaded {} rows ({} dropped)",
                    report.loaded,
                    report.dropped
                );
                self.status_message = Some(format!(
                    "Reloaded {} rows ({} skipped)",
                    number(report.loaded as u64),
                    number(report.dropped as u64)
                ));
                self.dataset = report.dataset;
                if let Err(e) = self.select(self.metric, self.granularity) {
                    // Nothing on screen may describe the old file.
                    self.reports = None;
                    self.status_message = Some(format!("Error: {e}"));
                }
            }
            Ok(None) => self.status_message = Some("Data unchanged.".to_string()),
            Err(e) => self.status_message = Some(format!("Reload failed: {e}")),
        }
    }
}

/// Weekday bars, Monday first. Weekdays without data stay `None`.
fn weekday_bars(r: &TimeOfDayReport) -> Vec<(String, Option<f64>)> {
    r.weekdays
        .iter()
        .map(|d| (d.weekday[..3].to_string(), d.value))
        .collect()
}

/// Text above a bar; a dash marks a bucket with no data, as opposed to zero.
fn bar_text(value: Option<f64>, currency: bool) -> String {
    opt(value, |v| compact(v, currency))
}

/// Vertical bar chart of labelled values. Only the trailing bars that fit
/// the area are shown.
fn render_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: &[(String, Option<f64>)],
    currency: bool,
) {
    let block = Block::default()
        .title(title.to_string())
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .borders(Borders::NONE);
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(" No transactions match the current filters.", FOOTER_STYLE))
                .block(block),
            area,
        );
        return;
    }

    let label_width = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(3);
    let bar_width = label_width.clamp(3, 10) as u16;
    let fits = (area.width / (bar_width + 1)).max(1) as usize;
    let shown = &items[items.len().saturating_sub(fits)..];

    let bars: Vec<Bar> = shown
        .iter()
        .map(|(label, value)| {
            Bar::default()
                .value(value.unwrap_or(0.0).max(0.0).round() as u64)
                .label(Line::from(label.clone()))
                .text_value(bar_text(*value, currency))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(BAR_STYLE)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

pub fn run(global: &GlobalArgs) -> Result<()> {
    let mut dashboard = Dashboard::new(global)?;
    run_view(&mut dashboard)
}
