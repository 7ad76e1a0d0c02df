//! Domain services for SkillHive.
//!
//! Services contain business logic that operates on domain models.

pub mod account_admin;
pub mod clock;
pub mod codes;
pub mod header_map;
pub mod ingestion;
pub mod memory;
pub mod notification;
pub mod otp_gate;
pub mod store;

pub use account_admin::{AccountAdmin, AdminPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codes::{CodeGenerator, RandomDigits, SequenceCodes};
pub use header_map::{resolve_columns, resolve_header, HEADER_PATTERNS};
pub use ingestion::{IngestionEngine, ParsedSheet};
pub use memory::{InMemoryAccountStore, InMemoryDemandStore, InMemoryResourceStore};
pub use notification::{MockOtpNotifier, OtpNotifier};
pub use otp_gate::OtpGate;
pub use store::{AccountStore, DemandStore, ResourceStore};
