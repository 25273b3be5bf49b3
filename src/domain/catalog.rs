use std::collections::HashMap;

use thiserror::Error;

use super::{Cents, Product, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("Product already exists: {0}")]
    DuplicateProduct(ProductId),

    #[error("Price for product {id} cannot be negative ({price} cents)")]
    NegativePrice { id: ProductId, price: Cents },

    #[error("Stock change of {delta} on product {id} (stock {stock}) is out of range")]
    StockOutOfRange { id: ProductId, stock: u32, delta: i64 },
}

/// The live store of products.
///
/// Products are kept in insertion order for listing, with an id index for
/// constant-time lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of products, refusing duplicate ids.
    pub fn from_products(
        products: impl IntoIterator<Item = Product>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for product in products {
            catalog.add(product)?;
        }
        Ok(catalog)
    }

    pub fn add(&mut self, product: Product) -> Result<(), CatalogError> {
        if self.index.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }
        if product.price < 0 {
            return Err(CatalogError::NegativePrice {
                id: product.id,
                price: product.price,
            });
        }
        self.index.insert(product.id, self.products.len());
        self.products.push(product);
        Ok(())
    }

    pub fn lookup(&self, id: ProductId) -> Result<&Product, CatalogError> {
        self.index
            .get(&id)
            .map(|&pos| &self.products[pos])
            .ok_or(CatalogError::NotFound(id))
    }

    fn lookup_mut(&mut self, id: ProductId) -> Result<&mut Product, CatalogError> {
        match self.index.get(&id) {
            Some(&pos) => Ok(&mut self.products[pos]),
            None => Err(CatalogError::NotFound(id)),
        }
    }

    /// Apply a signed change to a product's stock and return the new level.
    ///
    /// This is a raw mutation primitive: whether the sale or restock is
    /// allowed is decided by the caller. It only fails when the product is
    /// missing or the result does not fit a stock count.
    pub fn adjust_stock(&mut self, id: ProductId, delta: i64) -> Result<u32, CatalogError> {
        let product = self.lookup_mut(id)?;
        let next = i64::from(product.stock)
            .checked_add(delta)
            .and_then(|level| u32::try_from(level).ok())
            .ok_or(CatalogError::StockOutOfRange {
                id,
                stock: product.stock,
                delta,
            })?;
        product.stock = next;
        Ok(next)
    }

    pub fn set_price(&mut self, id: ProductId, price: Cents) -> Result<(), CatalogError> {
        if price < 0 {
            return Err(CatalogError::NegativePrice { id, price });
        }
        self.lookup_mut(id)?.price = price;
        Ok(())
    }

    /// All products in catalog order.
    pub fn all(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn low_stock(&self, threshold: u32) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.is_low_stock(threshold))
    }

    /// Case-insensitive substring match on the product name.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Product> + use<'a> {
        let needle = term.to_lowercase();
        self.products
            .iter()
            .filter(move |p| p.name.to_lowercase().contains(&needle))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::from_products([
            Product::new(1, "Pastel Notebook", 1250, 45, "Stationery"),
            Product::new(3, "Desk Lamp", 3500, 8, "Electronics"),
            Product::new(2, "Gel Pen Set", 800, 12, "Stationery"),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.lookup(3).unwrap().name, "Desk Lamp");
        assert_eq!(catalog.lookup(99), Err(CatalogError::NotFound(99)));
    }

    #[test]
    fn test_all_preserves_insertion_order() {
        let catalog = catalog();
        let ids: Vec<ProductId> = catalog.all().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_duplicate_product_refused() {
        let mut catalog = catalog();
        let result = catalog.add(Product::new(1, "Other", 100, 1, "Misc"));
        assert_eq!(result, Err(CatalogError::DuplicateProduct(1)));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_adjust_stock_both_directions() {
        let mut catalog = catalog();
        assert_eq!(catalog.adjust_stock(1, -2), Ok(43));
        assert_eq!(catalog.adjust_stock(1, 7), Ok(50));
        assert_eq!(catalog.lookup(1).unwrap().stock, 50);
    }

    #[test]
    fn test_adjust_stock_out_of_range_leaves_stock() {
        let mut catalog = catalog();
        let result = catalog.adjust_stock(3, -9);
        assert!(matches!(
            result,
            Err(CatalogError::StockOutOfRange { id: 3, stock: 8, delta: -9 })
        ));
        assert_eq!(catalog.lookup(3).unwrap().stock, 8);
    }

    #[test]
    fn test_adjust_stock_missing_product() {
        let mut catalog = catalog();
        assert_eq!(catalog.adjust_stock(42, 1), Err(CatalogError::NotFound(42)));
    }

    #[test]
    fn test_set_price() {
        let mut catalog = catalog();
        catalog.set_price(2, 950).unwrap();
        assert_eq!(catalog.lookup(2).unwrap().price, 950);

        assert!(matches!(
            catalog.set_price(2, -1),
            Err(CatalogError::NegativePrice { id: 2, .. })
        ));
        assert_eq!(catalog.lookup(2).unwrap().price, 950);
    }

    #[test]
    fn test_low_stock_and_search() {
        let catalog = catalog();
        let low: Vec<ProductId> = catalog.low_stock(10).map(|p| p.id).collect();
        assert_eq!(low, vec![3]);

        let found: Vec<ProductId> = catalog.search("pen").map(|p| p.id).collect();
        assert_eq!(found, vec![2]);
    }
}
