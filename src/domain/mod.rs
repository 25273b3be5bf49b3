mod bill;
mod catalog;
mod checkout;
mod ledger;
pub mod money;
mod product;
mod role;
mod seed;

pub use bill::*;
pub use catalog::*;
pub use checkout::*;
pub use ledger::*;
pub use money::{Cents, ParseCentsError, format_cents, parse_cents};
pub use product::*;
pub use role::*;
pub use seed::*;
