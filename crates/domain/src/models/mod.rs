//! Domain models for SkillHive.

pub mod account;
pub mod batch;
pub mod demand;
pub mod otp;
pub mod resource;
pub mod sheet;

pub use account::{Account, NewAccount, Role};
pub use batch::{BatchResult, IngestStage, RowError};
pub use demand::{Demand, NewDemand};
pub use otp::{Authenticated, IssuedOtp, OtpPolicy};
pub use resource::{CanonicalField, IngestedRecord, NewResource, Resource};
pub use sheet::{CellValue, Sheet, TabularSheet};
