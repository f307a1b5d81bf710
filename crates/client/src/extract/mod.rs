//! Record extraction from the export table page.
//!
//! ### Table shape
//! - The data lives in `table.tb_dados`; header rows sit in `thead` and the
//!   totals row in `tfoot`, so only `tbody` rows are read.
//! - Each data row has three cells: country, quantity (kg), value (US$).
//!
//! ### Row policy
//! - Rows without exactly three cells, with a blank country or with an
//!   unparseable amount are skipped and logged at debug level.
//! - A page without the data table is an extraction failure.

pub mod amount;

pub use amount::{AmountError, parse_amount};

use scraper::{ElementRef, Html, Selector};
use vitis_core::{Error, Extractor, Record};

/// Extracts trade records from the VitiBrasil export table.
pub struct TradeTableExtractor {
    table: Selector,
    rows: Selector,
    cells: Selector,
}

impl TradeTableExtractor {
    /// Create an extractor for the default `table.tb_dados` layout.
    pub fn new() -> Result<Self, Error> {
        Self::with_table_selector("table.tb_dados")
    }

    /// Create an extractor for a table matched by `selector`.
    pub fn with_table_selector(selector: &str) -> Result<Self, Error> {
        let parse = |s: &str| Selector::parse(s).map_err(|e| Error::InvalidInput(format!("selector {s:?}: {e}")));
        Ok(Self { table: parse(selector)?, rows: parse("tbody > tr")?, cells: parse("td")? })
    }

    fn row_to_record(&self, row: ElementRef<'_>) -> Option<Record> {
        let cells: Vec<String> = row.select(&self.cells).map(cell_text).collect();
        let [country, quantity, value] = cells.as_slice() else {
            return None;
        };

        if country.is_empty() {
            return None;
        }

        let quantity_kg = parse_amount(quantity).ok()?;
        let value_usd = parse_amount(value).ok()?;
        Some(Record::new(country.clone(), quantity_kg, value_usd))
    }
}

/// Cell text with whitespace runs collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

impl Extractor for TradeTableExtractor {
    fn extract(&self, raw: &str) -> Result<Vec<Record>, Error> {
        let document = Html::parse_document(raw);
        let table = document
            .select(&self.table)
            .next()
            .ok_or_else(|| Error::ExtractFailed("export data table not found".into()))?;

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (index, row) in table.select(&self.rows).enumerate() {
            match self.row_to_record(row) {
                Some(record) => records.push(record),
                None => {
                    skipped += 1;
                    tracing::debug!(row = index, html = %row.html(), "skipping malformed row");
                }
            }
        }

        tracing::debug!(records = records.len(), skipped, "extracted export table");

        Ok(records)
    }
}
