pub mod export;
pub mod import;
pub mod script;

pub use export::*;
pub use import::*;
pub use script::*;
