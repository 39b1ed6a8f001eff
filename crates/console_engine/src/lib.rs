//! Console engine: drives the core state machines against a remote API.
mod client;
mod driver;
mod intercept;
mod shared_result;

pub use client::{ApiClient, ApiSearchSource, ClientSettings};
pub use driver::{SearchDriver, SearchSource};
pub use intercept::SessionExpiredRedirect;
pub use shared_result::SharedResult;
