use std::path::Path;

use colored::Colorize;

use crate::aggregate::Granularity;
use crate::error::{Result, SalesError};
use crate::settings::{
    load_settings, save_settings, save_settings_to, settings_file_exists, settings_path,
    shellexpand_path, Settings,
};

pub fn show() -> Result<()> {
    let path = settings_path();
    let note = if settings_file_exists() {
        ""
    } else {
        " (not created yet; showing defaults)"
    };
    println!("Settings:  {}{note}", path.display());
    println!("{}", serde_json::to_string_pretty(&load_settings()?)?);
    Ok(())
}

fn init_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SalesError::Settings(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    save_settings_to(&Settings::default(), path)
}

pub fn init(force: bool) -> Result<()> {
    let path = settings_path();
    init_at(&path, force)?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}

fn set_data_in(settings: &mut Settings, raw: &str) -> Result<String> {
    let resolved = shellexpand_path(raw);
    if !Path::new(&resolved).is_file() {
        return Err(SalesError::Settings(format!("No such file: {resolved}")));
    }
    settings.data_path = resolved.clone();
    Ok(resolved)
}

pub fn set_data(path: &str) -> Result<()> {
    let mut settings = load_settings()?;
    let resolved = set_data_in(&mut settings, path)?;
    save_settings(&settings)?;
    println!("{} data_path = {resolved}", "Updated".green().bold());
    Ok(())
}

pub fn set_window(granularity: &str, window: usize) -> Result<()> {
    let granularity: Granularity = granularity.parse()?;
    let mut settings = load_settings()?;
    settings.rolling_windows.set(granularity, window)?;
    save_settings(&settings)?;
    println!(
        "{} {} rolling window = {window}",
        "Updated".green().bold(),
        granularity.label()
    );
    Ok(())
}
