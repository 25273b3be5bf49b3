use serde::{Deserialize, Serialize};

use crate::domain::{Catalog, Cents, Ledger, Product, money};

/// Dashboard figures for the shop owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub bill_count: usize,
    #[serde(with = "money::decimal")]
    pub revenue: Cents,
    pub units_sold: u64,
    pub low_stock_threshold: u32,
    pub low_stock: Vec<Product>,
}

impl SalesSummary {
    /// `None` when revenue overflows [`Cents`].
    pub fn build(catalog: &Catalog, ledger: &Ledger, low_stock_threshold: u32) -> Option<Self> {
        Some(Self {
            bill_count: ledger.len(),
            revenue: ledger.revenue()?,
            units_sold: ledger.all().map(|bill| bill.units()).sum(),
            low_stock_threshold,
            low_stock: catalog.low_stock(low_stock_threshold).cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Bill, LineItem, demo_catalog};

    #[test]
    fn test_summary_of_empty_ledger() {
        let catalog = demo_catalog().unwrap();
        let summary = SalesSummary::build(&catalog, &Ledger::new(), 10).unwrap();

        assert_eq!(summary.bill_count, 0);
        assert_eq!(summary.revenue, 0);
        let low: Vec<u32> = summary.low_stock.iter().map(|p| p.id).collect();
        assert_eq!(low, vec![3, 5]);
    }

    #[test]
    fn test_summary_counts_units_and_revenue() {
        let catalog = demo_catalog().unwrap();
        let mut ledger = Ledger::new();
        let date = NaiveDate::from_ymd_opt(2023, 11, 21).unwrap();
        let notebook = catalog.lookup(1).unwrap();
        let mug = catalog.lookup(4).unwrap();

        ledger.append(Bill::new(1, 2500, date, vec![LineItem::snapshot(notebook, 2)]));
        ledger.append(Bill::new(
            2,
            4500,
            date,
            vec![LineItem::snapshot(mug, 3)],
        ));

        let summary = SalesSummary::build(&catalog, &ledger, 10).unwrap();
        assert_eq!(summary.bill_count, 2);
        assert_eq!(summary.revenue, 7000);
        assert_eq!(summary.units_sold, 5);
    }
}
