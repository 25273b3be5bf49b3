use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Product, ProductId, money};

pub type BillId = u64;

/// One sold line, frozen at sale time.
///
/// Holds copies of the product name and price, so later catalog edits never
/// rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub product_name: String,
    #[serde(with = "money::decimal")]
    pub unit_price: Cents,
    pub quantity: u32,
}

impl LineItem {
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity,
        }
    }

    /// `unit_price * quantity`, or `None` when the product does not fit in
    /// [`Cents`].
    pub fn line_total(&self) -> Option<Cents> {
        self.unit_price.checked_mul(Cents::from(self.quantity))
    }
}

/// A committed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    #[serde(with = "money::decimal")]
    pub total: Cents,
    pub date: NaiveDate,
    pub items: Vec<LineItem>,
}

impl Bill {
    pub fn new(id: BillId, total: Cents, date: NaiveDate, items: Vec<LineItem>) -> Self {
        Self {
            id,
            total,
            date,
            items,
        }
    }

    /// Sum of line totals, `None` on overflow. May differ from `total` when
    /// the caller asserted its own amount.
    pub fn items_total(&self) -> Option<Cents> {
        sum_line_totals(&self.items)
    }

    pub fn units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Checked sum of line totals.
pub fn sum_line_totals(items: &[LineItem]) -> Option<Cents> {
    items
        .iter()
        .try_fold(0, |acc: Cents, item| acc.checked_add(item.line_total()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_decoupled_from_product() {
        let mut lamp = Product::new(3, "Desk Lamp", 3500, 8, "Electronics");
        let item = LineItem::snapshot(&lamp, 2);

        lamp.price = 4000;
        lamp.name = "Desk Lamp v2".into();

        assert_eq!(item.unit_price, 3500);
        assert_eq!(item.product_name, "Desk Lamp");
        assert_eq!(item.line_total(), Some(7000));
    }

    #[test]
    fn test_bill_totals() {
        let date = NaiveDate::from_ymd_opt(2023, 11, 21).unwrap();
        let bill = Bill::new(
            1001,
            6000,
            date,
            vec![
                LineItem::snapshot(&Product::new(1, "Pastel Notebook", 1250, 45, "Stationery"), 2),
                LineItem::snapshot(&Product::new(3, "Desk Lamp", 3500, 8, "Electronics"), 1),
            ],
        );

        assert_eq!(bill.items_total(), Some(6000));
        assert_eq!(bill.units(), 3);
    }

    #[test]
    fn test_line_total_overflow() {
        let gold = Product::new(1, "Gold Bar", Cents::MAX / 2, 10, "Luxury");
        assert_eq!(LineItem::snapshot(&gold, 2).line_total(), Some(Cents::MAX - 1));
        assert_eq!(LineItem::snapshot(&gold, 3).line_total(), None);

        let date = NaiveDate::from_ymd_opt(2023, 11, 21).unwrap();
        let bill = Bill::new(
            1,
            0,
            date,
            vec![LineItem::snapshot(&gold, 2), LineItem::snapshot(&gold, 1)],
        );
        assert_eq!(bill.items_total(), None);
    }
}
