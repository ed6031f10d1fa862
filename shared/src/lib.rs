pub mod error;
pub mod models;
pub mod validation;
pub mod store;
pub mod service;

pub use error::{Error, ErrorCode, PollError, Result};
pub use models::*;
pub use validation::*;
pub use store::{PollStore, TallyPolicy};
pub use service::AggregationService;
