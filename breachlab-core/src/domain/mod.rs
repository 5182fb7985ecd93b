//! Domain types: companies, disclosures, price records, index quotes,
//! alignment rows.

pub mod company;
pub mod disclosure;
pub mod index;
pub mod price;
pub mod row;

pub use company::Company;
pub use disclosure::{parse_disclosure_timestamp, DisclosureRecord};
pub use index::IndexQuote;
pub use price::PriceRecord;
pub use row::{AlignmentRow, PriceField, REASON_MARKET_REOPEN, REASON_NO_STOCK_DATA};

/// Plain calendar date (no time of day, no timezone).
pub type CalendarDate = chrono::NaiveDate;

/// Company identifier as assigned by the disclosure source.
pub type CompanyId = i64;
