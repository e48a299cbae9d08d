//! # pulse-integrations
//!
//! Outbound integration adapters: the OpenAI-compatible AI client, the
//! Google Calendar OAuth adapter, the WhatsApp session manager, and the
//! OnlyOffice signed editor config. Each adapter owns its error type and
//! degrades to a typed error instead of propagating SDK panics.

pub mod ai;
pub mod calendar;
pub mod onlyoffice;
pub mod whatsapp;

pub use ai::{AiError, AiService};
pub use calendar::{CalendarError, CalendarEvent, GoogleCalendarService};
pub use onlyoffice::{OnlyOfficeError, OnlyOfficeService};
pub use whatsapp::{
    SessionManager, SessionState, WaEvent, WhatsAppError, WhatsAppTransport,
};
