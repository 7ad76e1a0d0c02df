//! Database entity definitions.
//!
//! Entities map directly to database rows and are converted to domain models.

pub mod account;
pub mod demand;
pub mod resource;

pub use account::{AccountEntity, ACCOUNT_COLUMNS};
pub use demand::DemandEntity;
pub use resource::{ResourceEntity, RESOURCE_COLUMNS};
