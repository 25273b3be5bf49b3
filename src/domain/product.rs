use serde::{Deserialize, Serialize};

use super::{Cents, money};

pub type ProductId = u32;

/// A sellable item and its live stock level.
///
/// `id`, `name` and `category` are fixed at creation. `price` and `stock`
/// only change through [`Catalog`](super::Catalog) so every mutation goes
/// through one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "money::decimal")]
    pub price: Cents,
    pub stock: u32,
    pub category: String,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Cents,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            category: category.into(),
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Stock strictly below `threshold` needs restocking.
    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock < threshold
    }
}
