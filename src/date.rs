//! Edition date parsing and date-keyed names

use chrono::NaiveDate;
use crate::error::{Error, Result};

/// Format of the DATE argument
pub const EDITION_DATE_FORMAT: &str = "%Y-%m-%d";

/// chrono format for the combined edition file name
pub const COMBINED_PDF_FORMAT: &str = "MS_%Y_%m_%d.pdf";

/// Parse an edition date in `YYYY-MM-DD` form (e.g. `2017-12-31`)
pub fn parse_edition_date(expr: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(expr.trim(), EDITION_DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(expr.to_string()))
}

/// File name of the combined edition PDF: `MS_2017_12_31.pdf`
pub fn combined_pdf_name(date: &NaiveDate) -> String {
    date.format(COMBINED_PDF_FORMAT).to_string()
}
