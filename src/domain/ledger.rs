use super::{Bill, BillId, Cents};

/// Append-only record of committed bills, in commit order.
///
/// Bills are never edited or removed once appended. The ledger itself does
/// not check bill ids for uniqueness; [`Checkout`](super::Checkout) refuses
/// a duplicate id before anything is committed.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    bills: Vec<Bill>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, bill: Bill) {
        self.bills.push(bill);
    }

    pub fn all(&self) -> impl Iterator<Item = &Bill> {
        self.bills.iter()
    }

    pub fn get(&self, id: BillId) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn contains(&self, id: BillId) -> bool {
        self.get(id).is_some()
    }

    /// Sum of recorded bill totals, `None` if it overflows [`Cents`].
    pub fn revenue(&self) -> Option<Cents> {
        self.bills
            .iter()
            .try_fold(0, |acc: Cents, bill| acc.checked_add(bill.total))
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }
}
