use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    Bill, Catalog, Cents, Checkout, CheckoutOutcome, CheckoutRequest, Ledger, Operator, Product,
    ProductId, TotalPolicy, demo_catalog,
};

use super::{AppError, SalesSummary};

/// Default threshold below which a product counts as low on stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub total_policy: TotalPolicy,
    pub low_stock_threshold: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            total_policy: TotalPolicy::default(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Catalog and ledger guarded together, so a checkout sees and updates both
/// under one lock.
#[derive(Debug, Default)]
struct Store {
    catalog: Catalog,
    ledger: Ledger,
}

/// Application service over the shop's in-memory store.
/// This is the interface every caller (CLI, scripts, gateway) goes through.
///
/// Each call locks the whole store for its duration. A checkout therefore
/// validates and applies its cart without any other call interleaving, and
/// two concurrent carts can never sell the same unit twice.
#[derive(Debug)]
pub struct PosService {
    store: Mutex<Store>,
    checkout: Checkout,
    config: ServiceConfig,
}

/// Full copy of the store, for exports.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub products: Vec<Product>,
    pub bills: Vec<Bill>,
}

impl PosService {
    pub fn new(catalog: Catalog, config: ServiceConfig) -> Self {
        Self {
            store: Mutex::new(Store {
                catalog,
                ledger: Ledger::new(),
            }),
            checkout: Checkout::new(config.total_policy),
            config,
        }
    }

    /// Service over the built-in demo stock.
    pub fn seeded(config: ServiceConfig) -> Result<Self, AppError> {
        Ok(Self::new(demo_catalog()?, config))
    }

    // ========================
    // Inventory (any operator)
    // ========================

    pub async fn inventory_snapshot(&self) -> Vec<Product> {
        let store = self.store.lock().await;
        store.catalog.all().cloned().collect()
    }

    pub async fn product(&self, id: ProductId) -> Result<Product, AppError> {
        let store = self.store.lock().await;
        Ok(store.catalog.lookup(id)?.clone())
    }

    pub async fn search_products(&self, term: &str) -> Vec<Product> {
        let store = self.store.lock().await;
        store.catalog.search(term).cloned().collect()
    }

    /// Products below `threshold`, or the configured threshold when omitted.
    pub async fn low_stock(&self, threshold: Option<u32>) -> Vec<Product> {
        let threshold = threshold.unwrap_or(self.config.low_stock_threshold);
        let store = self.store.lock().await;
        store.catalog.low_stock(threshold).cloned().collect()
    }

    // ========================
    // Billing (any operator)
    // ========================

    /// Process a cart into a bill, or reject it without touching stock.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutOutcome, AppError> {
        debug!(?request, "checkout called");
        let bill_id = request.bill_id;

        let mut guard = self.store.lock().await;
        let Store { catalog, ledger } = &mut *guard;
        let outcome = self.checkout.process(catalog, ledger, request);
        drop(guard);

        match &outcome {
            Ok(CheckoutOutcome::Committed(bill)) => info!(
                bill_id,
                total = bill.total,
                lines = bill.items.len(),
                "Bill committed"
            ),
            Ok(CheckoutOutcome::Rejected(rejection)) => warn!(
                bill_id,
                failed = ?rejection.failed_product_ids(),
                "Checkout rejected due to stock issues"
            ),
            Err(err) => warn!(bill_id, error = %err, "Checkout refused"),
        }

        Ok(outcome?)
    }

    // ========================
    // Reports (admin only)
    // ========================

    pub async fn bill_history(&self, operator: &Operator) -> Result<Vec<Bill>, AppError> {
        require_reports(operator, "view bill history")?;
        let store = self.store.lock().await;
        Ok(store.ledger.all().cloned().collect())
    }

    pub async fn sales_summary(&self, operator: &Operator) -> Result<SalesSummary, AppError> {
        require_reports(operator, "view the sales summary")?;
        let store = self.store.lock().await;
        SalesSummary::build(
            &store.catalog,
            &store.ledger,
            self.config.low_stock_threshold,
        )
        .ok_or(AppError::RevenueOverflow)
    }

    pub async fn snapshot(&self, operator: &Operator) -> Result<StoreSnapshot, AppError> {
        require_reports(operator, "export the store")?;
        let store = self.store.lock().await;
        Ok(StoreSnapshot {
            products: store.catalog.all().cloned().collect(),
            bills: store.ledger.all().cloned().collect(),
        })
    }

    // ========================
    // Inventory management (admin only)
    // ========================

    pub async fn add_product(
        &self,
        operator: &Operator,
        product: Product,
    ) -> Result<Product, AppError> {
        require_inventory(operator, "add products")?;
        let mut store = self.store.lock().await;
        store.catalog.add(product.clone())?;
        info!(product_id = product.id, name = %product.name, "Product added");
        Ok(product)
    }

    pub async fn set_price(
        &self,
        operator: &Operator,
        id: ProductId,
        price: Cents,
    ) -> Result<Product, AppError> {
        require_inventory(operator, "change prices")?;
        let mut store = self.store.lock().await;
        store.catalog.set_price(id, price)?;
        info!(product_id = id, price, "Price updated");
        Ok(store.catalog.lookup(id)?.clone())
    }

    pub async fn restock(
        &self,
        operator: &Operator,
        id: ProductId,
        quantity: u32,
    ) -> Result<Product, AppError> {
        require_inventory(operator, "restock products")?;
        if quantity == 0 {
            return Err(AppError::InvalidQuantity(
                "Restock quantity must be positive".to_string(),
            ));
        }
        let mut store = self.store.lock().await;
        let stock = store.catalog.adjust_stock(id, i64::from(quantity))?;
        info!(product_id = id, quantity, stock, "Product restocked");
        Ok(store.catalog.lookup(id)?.clone())
    }
}

fn require_reports(operator: &Operator, action: &str) -> Result<(), AppError> {
    if operator.can_view_reports() {
        Ok(())
    } else {
        Err(denied(operator, action))
    }
}

fn require_inventory(operator: &Operator, action: &str) -> Result<(), AppError> {
    if operator.can_manage_inventory() {
        Ok(())
    } else {
        Err(denied(operator, action))
    }
}

fn denied(operator: &Operator, action: &str) -> AppError {
    warn!(username = %operator.username, role = %operator.role, action, "Access denied");
    AppError::AccessDenied {
        username: operator.username.clone(),
        role: operator.role.to_string(),
        action: action.to_string(),
    }
}
