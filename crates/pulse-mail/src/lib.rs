//! # pulse-mail
//!
//! Email plumbing for Pulse ERP: the provider preset catalog (IMAP/SMTP
//! endpoints for the common Italian and international providers, PEC
//! included), the outgoing message model, and the delivery transport seam.

pub mod message;
pub mod presets;
pub mod transport;

pub use message::{MailAddress, OutgoingMail};
pub use presets::{preset_endpoints, ProviderEndpoints};
pub use transport::{LogTransport, MailError, MailResult, MailTransport, TestTransport};
