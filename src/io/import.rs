use anyhow::{Result, bail};
use serde::Deserialize;
use std::io::Read;

use crate::domain::{Catalog, Product, ProductId, parse_cents};

/// Error found on one row of a catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.field {
            Some(field) => write!(f, "line {}: {}: {}", self.line, field, self.error),
            None => write!(f, "line {}: {}", self.line, self.error),
        }
    }
}

/// Raw catalog row: `id,name,price,stock,category`
#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: ProductId,
    name: String,
    price: String,
    stock: u32,
    category: String,
}

/// Read every row of a catalog CSV, collecting all row errors.
///
/// Returns the parsed products alongside the errors so callers can report
/// every bad row at once.
pub fn read_catalog_csv<R: Read>(reader: R) -> (Vec<Product>, Vec<ImportError>) {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut products = Vec::new();
    let mut errors = Vec::new();

    for (line_num, result) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let line = line_num + 2; // +2 for header and 0-indexing

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                errors.push(ImportError {
                    line,
                    field: None,
                    error: format!("CSV parse error: {}", e),
                });
                continue;
            }
        };

        if row.name.is_empty() {
            errors.push(ImportError {
                line,
                field: Some("name".to_string()),
                error: "name is required".to_string(),
            });
            continue;
        }

        let price = match parse_cents(&row.price) {
            Ok(price) if price >= 0 => price,
            Ok(_) => {
                errors.push(ImportError {
                    line,
                    field: Some("price".to_string()),
                    error: "price cannot be negative".to_string(),
                });
                continue;
            }
            Err(e) => {
                errors.push(ImportError {
                    line,
                    field: Some("price".to_string()),
                    error: format!("Invalid price: {}", e),
                });
                continue;
            }
        };

        products.push(Product::new(row.id, row.name, price, row.stock, row.category));
    }

    (products, errors)
}

/// Load a catalog from CSV. Any bad row, or a repeated id, fails the load.
pub fn load_catalog_csv<R: Read>(reader: R) -> Result<Catalog> {
    let (products, errors) = read_catalog_csv(reader);
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!(
            "Catalog file has {} invalid row(s):\n  {}",
            errors.len(),
            details.join("\n  ")
        );
    }
    Ok(Catalog::from_products(products)?)
}
