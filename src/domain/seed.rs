use super::{Catalog, CatalogError, Product};

/// The starter shop stock used when no catalog file is given.
pub fn demo_products() -> Vec<Product> {
    vec![
        Product::new(1, "Pastel Notebook", 1250, 45, "Stationery"),
        Product::new(2, "Gel Pen Set", 800, 12, "Stationery"),
        Product::new(3, "Desk Lamp", 3500, 8, "Electronics"),
        Product::new(4, "Ceramic Mug", 1500, 24, "Home"),
        Product::new(5, "Planner 2025", 2200, 5, "Stationery"),
        Product::new(6, "Cotton T-Shirt", 1800, 30, "Cloths"),
        Product::new(7, "Energy Bar", 350, 60, "Food"),
    ]
}

pub fn demo_catalog() -> Result<Catalog, CatalogError> {
    Catalog::from_products(demo_products())
}
