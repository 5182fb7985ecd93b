//! CSV-backed data store.
//!
//! Layout: `{data_dir}/companies.csv`, `{data_dir}/disclosures.csv`,
//! `{data_dir}/stock_data.csv`, `{data_dir}/dow_jones.csv`. Column names
//! follow the upstream tables:
//!
//! - companies: `CompanyID,CompanyName,Location,StockSymbol`
//! - disclosures: `CompanyID,DisclosureDate`
//! - stock data: `CompanyID,Date,Open,High,Low,Close,AdjClose,Volume`
//! - dow jones: `Date,Price,Open,High,Low,Volume,Change %`
//!
//! Writes are atomic (write to .tmp, rename into place).

use super::provider::DataError;
use crate::domain::{
    parse_disclosure_timestamp, Company, CompanyId, DisclosureRecord, IndexQuote, PriceRecord,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const COMPANIES_FILE: &str = "companies.csv";
pub const DISCLOSURES_FILE: &str = "disclosures.csv";
pub const STOCK_DATA_FILE: &str = "stock_data.csv";
pub const DOW_JONES_FILE: &str = "dow_jones.csv";

#[derive(Debug, Serialize, Deserialize)]
struct CompanyRow {
    #[serde(rename = "CompanyID")]
    id: CompanyId,
    #[serde(rename = "CompanyName")]
    name: String,
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "StockSymbol")]
    symbol: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DisclosureRow {
    #[serde(rename = "CompanyID")]
    company_id: CompanyId,
    #[serde(rename = "DisclosureDate")]
    disclosure_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StockRow {
    #[serde(rename = "CompanyID")]
    company_id: CompanyId,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "AdjClose")]
    adj_close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
}

impl From<StockRow> for PriceRecord {
    fn from(r: StockRow) -> Self {
        PriceRecord {
            company_id: r.company_id,
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            adj_close: r.adj_close,
            volume: r.volume,
        }
    }
}

impl From<&PriceRecord> for StockRow {
    fn from(r: &PriceRecord) -> Self {
        StockRow {
            company_id: r.company_id,
            date: r.date,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            adj_close: r.adj_close,
            volume: r.volume,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DowJonesRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Price")]
    price: f64,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Volume")]
    volume: f64,
    /// `0.52%` or `0.52`.
    #[serde(rename = "Change %", alias = "Change_Percent")]
    change_percent: String,
}

impl DowJonesRow {
    fn into_quote(self, path: &Path) -> Result<IndexQuote, DataError> {
        let raw = self.change_percent.trim().trim_end_matches('%').trim();
        let change_percent = raw.parse::<f64>().map_err(|_| DataError::Parse {
            path: path.display().to_string(),
            message: format!("invalid change percent '{}'", self.change_percent),
        })?;
        Ok(IndexQuote {
            date: self.date,
            price: self.price,
            open: self.open,
            high: self.high,
            low: self.low,
            volume: self.volume,
            change_percent,
        })
    }
}

impl From<&IndexQuote> for DowJonesRow {
    fn from(q: &IndexQuote) -> Self {
        DowJonesRow {
            date: q.date,
            price: q.price,
            open: q.open,
            high: q.high,
            low: q.low,
            volume: q.volume,
            change_percent: format!("{:.2}%", q.change_percent),
        }
    }
}

/// The CSV store.
#[derive(Debug, Clone)]
pub struct CsvStore {
    data_dir: PathBuf,
}

impl CsvStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// All companies, ordered by id.
    pub fn companies(&self) -> Result<Vec<Company>, DataError> {
        let rows: Vec<CompanyRow> = read_rows(&self.path(COMPANIES_FILE))?;
        let mut companies: Vec<Company> = rows
            .into_iter()
            .map(|r| Company {
                id: r.id,
                name: r.name,
                location: r.location,
                symbol: r.symbol,
            })
            .collect();
        companies.sort_by_key(|c| c.id);
        Ok(companies)
    }

    /// Disclosures joined with their companies, ordered by disclosure time.
    ///
    /// Disclosures naming an unknown company are skipped (inner join).
    pub fn disclosures(&self) -> Result<Vec<DisclosureRecord>, DataError> {
        let companies: HashMap<CompanyId, Company> = self
            .companies()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let path = self.path(DISCLOSURES_FILE);
        let rows: Vec<DisclosureRow> = read_rows(&path)?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let disclosed_at = parse_disclosure_timestamp(&row.disclosure_date).ok_or_else(|| {
                DataError::Parse {
                    path: path.display().to_string(),
                    message: format!("invalid disclosure date '{}'", row.disclosure_date),
                }
            })?;
            let Some(company) = companies.get(&row.company_id) else {
                warn!(company_id = row.company_id, "disclosure for unknown company skipped");
                continue;
            };
            records.push(DisclosureRecord {
                company_id: company.id,
                company_name: company.name.clone(),
                symbol: company.symbol.clone(),
                disclosed_at,
            });
        }
        records.sort_by_key(|r| r.disclosed_at);
        Ok(records)
    }

    /// The stock-data table, ordered by company then date.
    pub fn stock_data(&self) -> Result<Vec<PriceRecord>, DataError> {
        let rows: Vec<StockRow> = read_rows(&self.path(STOCK_DATA_FILE))?;
        let mut records: Vec<PriceRecord> = rows.into_iter().map(PriceRecord::from).collect();
        records.sort_by_key(|r| (r.company_id, r.date));
        Ok(records)
    }

    /// The Dow Jones table, ordered by date.
    pub fn dow_jones(&self) -> Result<Vec<IndexQuote>, DataError> {
        let path = self.path(DOW_JONES_FILE);
        let rows: Vec<DowJonesRow> = read_rows(&path)?;
        let mut quotes = rows
            .into_iter()
            .map(|r| r.into_quote(&path))
            .collect::<Result<Vec<_>, _>>()?;
        quotes.sort_by_key(|q| q.date);
        Ok(quotes)
    }

    /// Replace the Dow Jones table.
    pub fn write_dow_jones(&self, quotes: &[IndexQuote]) -> Result<(), DataError> {
        let rows: Vec<DowJonesRow> = quotes.iter().map(DowJonesRow::from).collect();
        write_rows(&self.path(DOW_JONES_FILE), &rows)
    }

    /// Replace the stock-data table.
    pub fn write_stock_data(&self, records: &[PriceRecord]) -> Result<(), DataError> {
        let rows: Vec<StockRow> = records.iter().map(StockRow::from).collect();
        write_rows(&self.path(STOCK_DATA_FILE), &rows)
    }

    /// Append rows to the stock-data table, creating it if missing.
    pub fn append_stock_data(&self, records: &[PriceRecord]) -> Result<usize, DataError> {
        let mut all = match self.stock_data() {
            Ok(existing) => existing,
            Err(DataError::SourceMissing { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };
        all.extend_from_slice(records);
        self.write_stock_data(&all)?;
        Ok(records.len())
    }

    /// Replace the companies table.
    pub fn write_companies(&self, companies: &[Company]) -> Result<(), DataError> {
        let rows: Vec<CompanyRow> = companies
            .iter()
            .map(|c| CompanyRow {
                id: c.id,
                name: c.name.clone(),
                location: c.location.clone(),
                symbol: c.symbol.clone(),
            })
            .collect();
        write_rows(&self.path(COMPANIES_FILE), &rows)
    }

    /// Replace the disclosures table. Timestamps at midnight are written as
    /// plain dates.
    pub fn write_disclosures(&self, records: &[DisclosureRecord]) -> Result<(), DataError> {
        let rows: Vec<DisclosureRow> = records
            .iter()
            .map(|r| DisclosureRow {
                company_id: r.company_id,
                disclosure_date: if r.disclosed_at.time() == chrono::NaiveTime::MIN {
                    r.disclosure_date().format("%Y-%m-%d").to_string()
                } else {
                    r.disclosed_at.format("%Y-%m-%d %H:%M:%S").to_string()
                },
            })
            .collect();
        write_rows(&self.path(DISCLOSURES_FILE), &rows)
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DataError> {
    if !path.exists() {
        return Err(DataError::SourceMissing {
            path: path.display().to_string(),
        });
    }
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Io(format!("open {}: {e}", path.display())))?;

    reader
        .deserialize::<T>()
        .map(|row| {
            row.map_err(|e| DataError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DataError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| DataError::Io(format!("failed to create dir: {e}")))?;
    }
    let tmp = path.with_extension("csv.tmp");
    {
        let mut writer = csv::Writer::from_path(&tmp)
            .map_err(|e| DataError::Io(format!("create {}: {e}", tmp.display())))?;
        for row in rows {
            writer
                .serialize(row)
                .map_err(|e| DataError::Io(format!("write {}: {e}", tmp.display())))?;
        }
        writer
            .flush()
            .map_err(|e| DataError::Io(format!("flush {}: {e}", tmp.display())))?;
    }
    fs::rename(&tmp, path)
        .map_err(|e| DataError::Io(format!("rename into {}: {e}", path.display())))
}
