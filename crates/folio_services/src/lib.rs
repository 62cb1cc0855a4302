//! Folio Services Layer
//!
//! Settings, the contact relay and user notices.

pub mod contact;
pub mod notify;
pub mod settings;

pub use contact::{
    AutoReply, ContactError, ContactMessage, ContactRelay, Delivery, EmailRequest, EmailTransport,
    TransportError,
};
pub use notify::{Notice, NoticeKind, Notices};
pub use settings::{Settings, SettingsError};
