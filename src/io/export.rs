use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::domain::{Bill, Product, format_cents};

/// Store snapshot for a full JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreExport {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub bills: Vec<Bill>,
}

impl StoreExport {
    pub fn new(products: Vec<Product>, bills: Vec<Bill>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            products,
            bills,
        }
    }
}

/// Write inventory rows as CSV. Returns the number of products written.
pub fn export_inventory_csv<W: Write>(products: &[Product], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["id", "name", "category", "price", "stock"])?;

    for product in products {
        csv_writer.write_record(&[
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            format_cents(product.price),
            product.stock.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(products.len())
}

/// Write bills as CSV, one row per line item. Returns the number of rows.
pub fn export_bills_csv<W: Write>(bills: &[Bill], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "bill_id",
        "date",
        "bill_total",
        "product_id",
        "product_name",
        "unit_price",
        "quantity",
        "line_total",
    ])?;

    let mut count = 0;
    for bill in bills {
        for item in &bill.items {
            let line_total = item.line_total().ok_or_else(|| {
                anyhow!("Line total of product {} on bill {} overflows", item.product_id, bill.id)
            })?;
            csv_writer.write_record(&[
                bill.id.to_string(),
                bill.date.to_string(),
                format_cents(bill.total),
                item.product_id.to_string(),
                item.product_name.clone(),
                format_cents(item.unit_price),
                item.quantity.to_string(),
                format_cents(line_total),
            ])?;
            count += 1;
        }
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Write any serializable value as pretty JSON.
pub fn export_json<T: Serialize, W: Write>(value: &T, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
