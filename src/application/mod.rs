// Application layer - use cases, role checks and the request gateway.
// The domain types never see who is calling; that is decided here.

pub mod error;
pub mod gateway;
pub mod reporting;
pub mod service;

pub use error::*;
pub use gateway::{Gateway, Request, Response};
pub use reporting::*;
pub use service::*;
