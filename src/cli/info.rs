use chrono::NaiveDate;
use serde::Serialize;

use crate::cli::{open_session, GlobalArgs, OutputFormat};
use crate::error::Result;
use crate::fmt::number;
use crate::loader::LoadReport;

#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub path: String,
    pub checksum: Option<String>,
    pub rows: usize,
    pub dropped: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub stores: Vec<String>,
    pub categories: Vec<String>,
}

pub fn describe(path: &std::path::Path, load: &LoadReport) -> DatasetInfo {
    let ds = &load.dataset;
    let bounds = ds.date_bounds();
    DatasetInfo {
        path: path.display().to_string(),
        checksum: ds.checksum().map(str::to_string),
        rows: load.loaded,
        dropped: load.dropped,
        first_date: bounds.map(|(first, _)| first),
        last_date: bounds.map(|(_, last)| last),
        stores: ds.stores(),
        categories: ds.categories(),
    }
}

fn format_info(info: &DatasetInfo) -> String {
    let mut out = String::new();
    out.push_str(&format!("Data file:   {}\n", info.path));
    out.push_str(&format!(
        "Checksum:    {}\n",
        info.checksum.as_deref().unwrap_or("(none)")
    ));
    out.push_str(&format!("Rows:        {}\n", number(info.rows as u64)));
    if info.dropped > 0 {
        out.push_str(&format!("Skipped:     {} malformed\n", number(info.dropped as u64)));
    }
    match (info.first_date, info.last_date) {
        (Some(first), Some(last)) => out.push_str(&format!("Dates:       {first} to {last}\n")),
        _ => out.push_str("Dates:       (no rows)\n"),
    }
    out.push_str(&format!("Stores:      {}\n", info.stores.join(", ")));
    out.push_str(&format!("Categories:  {}", info.categories.join(", ")));
    out
}

pub fn run(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    let info = describe(&session.data_path, &session.load);
    match global.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Text => println!("{}", format_info(&info)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample;

    #[test]
    fn test_describe_and_format() {
        let load = LoadReport {
            dataset: sample(),
            loaded: 7,
            dropped: 2,
        };
        let info = describe(std::path::Path::new("/data/pos.csv"), &load);
        assert_eq!(info.rows, 7);
        assert_eq!(info.stores, vec!["Astoria", "Hell's Kitchen", "Lower Manhattan"]);
        assert_eq!(info.first_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(info.last_date, NaiveDate::from_ymd_opt(2024, 3, 4));

        let text = format_info(&info);
        assert!(text.contains("/data/pos.csv"));
        assert!(text.contains("Skipped:     2 malformed"));
        assert!(text.contains("2024-01-01 to 2024-03-04"));
        assert!(text.contains("Coffee, Bakery, Tea"));
    }
}
