//! Inventory bootstrap from a comma-separated file.
//!
//! Each row is `id,name,stock,unit,price`. There is no header. Rows with a
//! different field count, invalid UTF-8 or a non-numeric stock or price are
//! skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::domain::Product;
use crate::error::InventoryError;

const FIELDS_PER_ROW: usize = 5;

#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_products(path: impl AsRef<Path>) -> Result<Vec<Product>, InventoryError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| InventoryError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let products = parse_products(file)?;
    info!(count = products.len(), "Inventory loaded");
    Ok(products)
}

pub fn parse_products(reader: impl Read) -> Result<Vec<Product>, InventoryError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut products = Vec::new();
    for (line, record) in csv_reader.byte_records().enumerate() {
        let parsed = csv::StringRecord::from_byte_record(record?)
            .ok()
            .and_then(|record| parse_row(&record));
        match parsed {
            Some(product) => products.push(product),
            None => debug!(line = line + 1, "Skipping malformed inventory row"),
        }
    }
    Ok(products)
}

fn parse_row(record: &csv::StringRecord) -> Option<Product> {
    if record.len() != FIELDS_PER_ROW {
        return None;
    }
    let stock = i64::from_str(&record[2]).ok()?;
    let price = Decimal::from_str(&record[4]).ok()?;
    Some(Product::new(
        &record[0],
        format!("{}({})", &record[1], &record[3]),
        stock,
        price,
    ))
}
