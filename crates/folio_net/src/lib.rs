//! Folio Network Layer
//!
//! HTTP transports for the contact relay.

pub mod emailjs;

pub use emailjs::EmailJsTransport;
