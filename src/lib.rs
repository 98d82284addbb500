pub mod cli;
pub mod error;
pub mod form;
pub mod rule;
pub mod search;
pub mod store;
pub mod transfer;

pub use error::{GhostTraceError, Result};
pub use rule::{Platform, Rule};
pub use store::RuleStore;
