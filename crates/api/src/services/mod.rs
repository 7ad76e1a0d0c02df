//! External service integrations.

pub mod admin_bootstrap;
pub mod email;
pub mod otp_delivery;
pub mod workbook;

pub use admin_bootstrap::bootstrap_super_admin;
pub use email::{EmailError, EmailMessage, EmailService};
pub use otp_delivery::EmailOtpNotifier;
pub use workbook::{decode_first_sheet, WorkbookError};
