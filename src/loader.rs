use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use csv::StringRecord;
use sha2::{Digest, Sha256};

use crate::error::{Result, SalesError};
use crate::models::{Dataset, TransactionRecord};

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%Y-%m-%d", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}

/// Parse a price like `3.00`, `$3.00` or `1,250.5`. Negative prices are rejected.
pub fn parse_price(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '$', '"'], "");
    let v: f64 = s.trim().parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

struct Columns {
    id: usize,
    date: usize,
    time: usize,
    store: usize,
    category: usize,
    product_type: usize,
    qty: usize,
    price: usize,
}

impl Columns {
    fn locate(headers: &StringRecord, file: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| SalesError::MissingColumn {
                    file: file.to_string(),
                    column: name.to_string(),
                })
        };
        Ok(Self {
            id: find("transaction_id")?,
            date: find("transaction_date")?,
            time: find("transaction_time")?,
            store: find("store_location")?,
            category: find("product_category")?,
            product_type: find("product_type")?,
            qty: find("transaction_qty")?,
            price: find("unit_price")?,
        })
    }

    /// Coerce one record. `Err` carries the reason the row was dropped.
    fn parse(&self, record: &StringRecord) -> std::result::Result<TransactionRecord, String> {
        let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");

        let id: u64 = field(self.id)
            .parse()
            .map_err(|_| format!("bad transaction_id '{}'", field(self.id)))?;
        let date = parse_date(field(self.date))
            .ok_or_else(|| format!("bad transaction_date '{}'", field(self.date)))?;
        let qty: u32 = field(self.qty)
            .parse()
            .map_err(|_| format!("bad transaction_qty '{}'", field(self.qty)))?;
        let price = parse_price(field(self.price))
            .ok_or_else(|| format!("bad unit_price '{}'", field(self.price)))?;
        // An unreadable time keeps the row; it only drops out of the hourly view.
        let time = parse_time(field(self.time));

        Ok(TransactionRecord::new(
            id,
            date,
            time,
            field(self.store),
            field(self.category),
            field(self.product_type),
            qty,
            price,
        ))
    }
}

// ---------------------------------------------------------------------------
// load_dataset
// ---------------------------------------------------------------------------

pub struct LoadReport {
    pub dataset: Dataset,
    pub loaded: usize,
    pub dropped: usize,
}

/// Load a transaction log from CSV. Unreadable files and headers are fatal;
/// individual bad rows are dropped and counted.
pub fn load_dataset(file_path: &Path) -> Result<LoadReport> {
    let file_name = file_path.display().to_string();
    let file = std::fs::File::open(file_path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let columns = Columns::locate(rdr.headers()?, &file_name)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("{file_name}: dropping row {}: {e}", line + 2);
                dropped += 1;
                continue;
            }
        };
        match columns.parse(&record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                log::debug!("{file_name}: dropping row {}: {reason}", line + 2);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::warn!("{file_name}: dropped {dropped} unparseable rows");
    }
    let loaded = rows.len();
    log::info!("Loaded {loaded} transactions from {file_name}");

    let checksum = compute_checksum(file_path)?;
    Ok(LoadReport {
        dataset: Dataset::new(rows).with_source(file_path, checksum),
        loaded,
        dropped,
    })
}

/// Reload `path` only if its content differs from `current`.
/// Returns `None` when the file is unchanged.
pub fn reload_if_changed(current: &Dataset, path: &Path) -> Result<Option<LoadReport>> {
    let checksum = compute_checksum(path)?;
    if current.checksum() == Some(checksum.as_str()) {
        log::debug!("{} unchanged, keeping current dataset", path.display());
        return Ok(None);
    }
    log::info!("{} changed, reloading", path.display());
    load_dataset(path).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "transaction_id,transaction_date,transaction_time,transaction_qty,store_id,store_location,product_id,unit_price,product_category,product_type,product_detail\n";

    fn write_csv(body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, format!("{HEADER}{body}")).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(parse_date("31-01-2023"), Some(expected));
        assert_eq!(parse_date("2023-01-31"), Some(expected));
        assert_eq!(parse_date("1/31/2023"), Some(expected));
        assert_eq!(parse_date("31/31/2023"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("07:06:11"), NaiveTime::from_hms_opt(7, 6, 11));
        assert_eq!(parse_time("7:06"), NaiveTime::from_hms_opt(7, 6, 0));
        assert_eq!(parse_time("25:00:00"), None);
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("3.00"), Some(3.0));
        assert_eq!(parse_price("$1,250.50"), Some(1250.5));
        assert_eq!(parse_price("-1"), None);
        assert_eq!(parse_price("abc"), None);
    }

    #[test]
    fn test_load_computes_total_amount() {
        let (_dir, path) = write_csv(
            "1,01-01-2023,07:06:11,2,5,Lower Manhattan,32,3,Coffee,Gourmet brewed coffee,Ethiopia Rg\n\
             2,01-01-2023,07:08:56,1,5,Lower Manhattan,57,3.1,Tea,Brewed Chai tea,Spicy Eye Opener Chai Lg\n",
        );
        let report = load_dataset(&path).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.dropped, 0);
        let rows = report.dataset.rows();
        assert_eq!(rows[0].total_amount, 6.0);
        assert_eq!(rows[1].store_location, "Lower Manhattan");
        assert_eq!(rows[1].product_type, "Brewed Chai tea");
        assert!(report.dataset.checksum().is_some());
    }

    #[test]
    fn test_bad_date_drops_row_bad_time_keeps_it() {
        let (_dir, path) = write_csv(
            "1,not-a-date,07:06:11,2,5,Astoria,32,3,Coffee,Drip,x\n\
             2,02-01-2023,??,1,5,Astoria,57,3.1,Tea,Chai,y\n\
             3,02-01-2023,08:00:00,abc,5,Astoria,57,3.1,Tea,Chai,y\n\
             4,02-01-2023,08:00:00,1,5,Astoria,57,-2,Tea,Chai,y\n",
        );
        let report = load_dataset(&path).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.dropped, 3);
        let row = &report.dataset.rows()[0];
        assert_eq!(row.transaction_id, 2);
        assert!(row.transaction_time.is_none());
    }

    #[test]
    fn test_short_row_is_dropped() {
        let (_dir, path) = write_csv("1,01-01-2023\n");
        let report = load_dataset(&path).unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.dropped, 1);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "transaction_id,transaction_date\n1,01-01-2023\n").unwrap();
        let err = load_dataset(&path).err().unwrap();
        assert!(matches!(err, SalesError::MissingColumn { ref column, .. } if column == "transaction_time"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_dataset(Path::new("/nonexistent/sales.csv")).err().unwrap();
        assert!(matches!(err, SalesError::Io(_)));
    }

    #[test]
    fn test_reload_if_changed() {
        let (_dir, path) = write_csv("1,01-01-2023,07:06:11,2,5,Astoria,32,3,Coffee,Drip,x\n");
        let first = load_dataset(&path).unwrap().dataset;
        assert!(reload_if_changed(&first, &path).unwrap().is_none());

        std::fs::write(
            &path,
            format!("{HEADER}1,01-01-2023,07:06:11,2,5,Astoria,32,3,Coffee,Drip,x\n2,01-01-2023,07:10:00,1,5,Astoria,32,3,Coffee,Drip,x\n"),
        )
        .unwrap();
        let reloaded = reload_if_changed(&first, &path).unwrap().unwrap();
        assert_eq!(reloaded.loaded, 2);
        // The old handle is untouched.
        assert_eq!(first.len(), 1);
    }
}
