use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    Bill, BillId, Catalog, CatalogError, Cents, Ledger, LineItem, ProductId, sum_line_totals,
};

/// How the stored bill total is decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalPolicy {
    /// Store the amount the caller asserted, unchecked.
    #[default]
    Asserted,
    /// Ignore the asserted amount and store the sum of line totals.
    Recompute,
    /// Refuse the checkout when the asserted amount differs from the line totals.
    Verify,
}

impl TotalPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotalPolicy::Asserted => "asserted",
            TotalPolicy::Recompute => "recompute",
            TotalPolicy::Verify => "verify",
        }
    }
}

impl FromStr for TotalPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asserted" => Ok(TotalPolicy::Asserted),
            "recompute" => Ok(TotalPolicy::Recompute),
            "verify" => Ok(TotalPolicy::Verify),
            other => Err(format!(
                "unknown total policy '{}' (expected asserted, recompute or verify)",
                other
            )),
        }
    }
}

impl std::fmt::Display for TotalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One requested cart line. The quantity is signed so bad input reaches
/// validation instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub bill_id: BillId,
    pub asserted_total: Cents,
    pub date: NaiveDate,
    pub cart: Vec<CartLine>,
}

/// Why a single cart line could not be sold.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LineError {
    #[error("product not found")]
    NotFound,

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("invalid quantity {quantity}")]
    InvalidQuantity { quantity: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFailure {
    /// Position of the line in the cart, starting at 0.
    pub line: usize,
    pub product_id: ProductId,
    #[serde(flatten)]
    pub error: LineError,
}

/// A voided checkout: nothing was deducted and no bill was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub bill_id: BillId,
    pub failures: Vec<LineFailure>,
}

impl Rejection {
    pub fn failed_product_ids(&self) -> BTreeSet<ProductId> {
        self.failures.iter().map(|f| f.product_id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Committed(Bill),
    Rejected(Rejection),
}

impl CheckoutOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CheckoutOutcome::Committed(_))
    }
}

/// Request-level failures. Like a rejection, none of them leaves a trace in
/// the catalog or the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Bill {0} has already been recorded")]
    DuplicateBillId(BillId),

    #[error("Bill total cannot be negative: {0} cents")]
    NegativeTotal(Cents),

    #[error("Bill total mismatch: asserted {asserted} cents, line items sum to {computed} cents")]
    TotalMismatch { asserted: Cents, computed: Cents },

    #[error("Bill {0} amounts exceed the representable range")]
    TotalOverflow(BillId),

    #[error("Catalog update failed: {0}")]
    Catalog(#[from] CatalogError),
}

/// Lines that passed validation, ready to be committed.
struct StagedCart {
    items: Vec<LineItem>,
    deductions: BTreeMap<ProductId, u32>,
}

/// Turns a cart into stock deductions plus a committed bill, all or nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Checkout {
    policy: TotalPolicy,
}

impl Checkout {
    pub fn new(policy: TotalPolicy) -> Self {
        Self { policy }
    }

    /// Run one checkout against the catalog and ledger.
    ///
    /// Every cart line is validated against a scratch copy of the stock
    /// before anything is written. Failures are collected for all lines, so
    /// the caller learns about each bad line in one response. Stock is only
    /// deducted, and the bill only appended, when every line is valid.
    pub fn process(
        &self,
        catalog: &mut Catalog,
        ledger: &mut Ledger,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        if request.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if ledger.contains(request.bill_id) {
            return Err(CheckoutError::DuplicateBillId(request.bill_id));
        }
        if request.asserted_total < 0 {
            return Err(CheckoutError::NegativeTotal(request.asserted_total));
        }

        let staged = match stage(catalog, &request.cart) {
            Ok(staged) => staged,
            Err(failures) => {
                return Ok(CheckoutOutcome::Rejected(Rejection {
                    bill_id: request.bill_id,
                    failures,
                }));
            }
        };

        let bill_id = request.bill_id;
        if staged.items.iter().any(|item| item.line_total().is_none()) {
            return Err(CheckoutError::TotalOverflow(bill_id));
        }
        let total = self.settle_total(bill_id, request.asserted_total, &staged.items)?;
        // Revenue over the ledger must stay representable.
        ledger
            .revenue()
            .and_then(|revenue| revenue.checked_add(total))
            .ok_or(CheckoutError::TotalOverflow(bill_id))?;

        apply_deductions(catalog, &staged.deductions)?;

        let bill = Bill::new(request.bill_id, total, request.date, staged.items);
        ledger.append(bill.clone());
        Ok(CheckoutOutcome::Committed(bill))
    }

    fn settle_total(
        &self,
        bill_id: BillId,
        asserted: Cents,
        items: &[LineItem],
    ) -> Result<Cents, CheckoutError> {
        if self.policy == TotalPolicy::Asserted {
            return Ok(asserted);
        }
        let computed = sum_line_totals(items).ok_or(CheckoutError::TotalOverflow(bill_id))?;
        match self.policy {
            TotalPolicy::Verify if asserted != computed => {
                Err(CheckoutError::TotalMismatch { asserted, computed })
            }
            TotalPolicy::Recompute => Ok(computed),
            TotalPolicy::Asserted | TotalPolicy::Verify => Ok(asserted),
        }
    }
}

fn stage(catalog: &Catalog, cart: &[CartLine]) -> Result<StagedCart, Vec<LineFailure>> {
    // Remaining stock per product as seen by this cart so far.
    let mut remaining: HashMap<ProductId, u32> = HashMap::new();
    let mut items = Vec::with_capacity(cart.len());
    let mut failures = Vec::new();

    for (line, entry) in cart.iter().enumerate() {
        match stage_line(catalog, &mut remaining, entry) {
            Ok(item) => items.push(item),
            Err(error) => failures.push(LineFailure {
                line,
                product_id: entry.product_id,
                error,
            }),
        }
    }

    if !failures.is_empty() {
        return Err(failures);
    }

    let mut deductions: BTreeMap<ProductId, u32> = BTreeMap::new();
    for item in &items {
        *deductions.entry(item.product_id).or_insert(0) += item.quantity;
    }
    Ok(StagedCart { items, deductions })
}

fn stage_line(
    catalog: &Catalog,
    remaining: &mut HashMap<ProductId, u32>,
    entry: &CartLine,
) -> Result<LineItem, LineError> {
    let quantity = u32::try_from(entry.quantity)
        .ok()
        .filter(|&q| q > 0)
        .ok_or(LineError::InvalidQuantity {
            quantity: entry.quantity,
        })?;

    let product = catalog
        .lookup(entry.product_id)
        .map_err(|_| LineError::NotFound)?;

    let available = remaining.entry(product.id).or_insert(product.stock);
    if *available < quantity {
        return Err(LineError::InsufficientStock {
            requested: quantity,
            available: *available,
        });
    }
    *available -= quantity;

    Ok(LineItem::snapshot(product, quantity))
}

/// Apply staged deductions, restoring the ones already applied if any fails.
fn apply_deductions(
    catalog: &mut Catalog,
    deductions: &BTreeMap<ProductId, u32>,
) -> Result<(), CatalogError> {
    let mut applied: Vec<(ProductId, u32)> = Vec::with_capacity(deductions.len());

    for (&id, &quantity) in deductions {
        if let Err(err) = catalog.adjust_stock(id, -i64::from(quantity)) {
            for (id, quantity) in applied.into_iter().rev() {
                if let Err(undo) = catalog.adjust_stock(id, i64::from(quantity)) {
                    tracing::error!(product_id = id, error = %undo, "Failed to restore stock");
                }
            }
            return Err(err);
        }
        applied.push((id, quantity));
    }

    Ok(())
}
