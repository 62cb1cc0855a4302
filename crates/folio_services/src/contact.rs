//! Contact relay
//!
//! Delivers a contact-form message to the site owner and, when an
//! auto-reply template is configured, a confirmation back to the sender.
//! Only the owner notification decides success; a failed auto-reply is
//! logged and reported in [`Delivery`] but never fails the send.

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::ContactSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }
}

/// Everything a transport needs for one templated email.
#[derive(Debug, Clone, Copy)]
pub struct EmailRequest<'a> {
    pub service_id: &'a str,
    pub template_id: &'a str,
    pub public_key: &'a str,
    pub message: &'a ContactMessage,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("email API returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends one templated email.
pub trait EmailTransport {
    fn send(&self, request: EmailRequest<'_>) -> impl Future<Output = Result<(), TransportError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("email service is not configured (missing {})", .missing.join(", "))]
    NotConfigured { missing: Vec<&'static str> },

    #[error("failed to deliver message: {0}")]
    Delivery(#[from] TransportError),
}

impl ContactError {
    /// Text shown to the visitor. Every variant invites a retry.
    pub fn user_message(&self) -> &'static str {
        match self {
            ContactError::NotConfigured { .. } => {
                "Email service is not configured. Please contact the administrator."
            }
            ContactError::Delivery(_) => "Failed to send message. Please try again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoReply {
    Sent,
    /// No auto-reply template configured.
    Skipped,
    Failed(String),
}

/// Outcome of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub auto_reply: AutoReply,
}

pub struct ContactRelay<T> {
    settings: ContactSettings,
    transport: T,
}

impl<T: EmailTransport> ContactRelay<T> {
    pub fn new(settings: ContactSettings, transport: T) -> Self {
        Self { settings, transport }
    }

    pub fn settings(&self) -> &ContactSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn send_message(&self, message: &ContactMessage) -> Result<Delivery, ContactError> {
        let (service_id, receiver_template_id, public_key) = match self.credentials() {
            Ok(creds) => creds,
            Err(err) => {
                tracing::error!(%err, "contact relay unavailable");
                return Err(err);
            }
        };

        let primary = EmailRequest {
            service_id,
            template_id: receiver_template_id,
            public_key,
            message,
        };
        if let Err(err) = self.transport.send(primary).await {
            tracing::error!(%err, "contact notification failed");
            return Err(err.into());
        }
        tracing::info!(template = receiver_template_id, "contact notification sent");

        let auto_reply = match non_blank(&self.settings.auto_reply_template_id) {
            None => AutoReply::Skipped,
            Some(template_id) => {
                let request = EmailRequest { template_id, ..primary };
                match self.transport.send(request).await {
                    Ok(()) => AutoReply::Sent,
                    Err(err) => {
                        tracing::warn!(%err, "auto-reply failed");
                        AutoReply::Failed(err.to_string())
                    }
                }
            }
        };

        Ok(Delivery { auto_reply })
    }

    fn credentials(&self) -> Result<(&str, &str, &str), ContactError> {
        let service = non_blank(&self.settings.service_id);
        let receiver = non_blank(&self.settings.receiver_template_id);
        let key = non_blank(&self.settings.public_key);
        match (service, receiver, key) {
            (Some(service), Some(receiver), Some(key)) => Ok((service, receiver, key)),
            _ => {
                let missing = [
                    ("service_id", service.is_none()),
                    ("receiver_template_id", receiver.is_none()),
                    ("public_key", key.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                Err(ContactError::NotConfigured { missing })
            }
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records template ids; fails the ones listed in `failing`.
    #[derive(Default)]
    struct ScriptedTransport {
        sent: Mutex<Vec<String>>,
        failing: Vec<&'static str>,
    }

    impl ScriptedTransport {
        fn failing(templates: &[&'static str]) -> Self {
            Self {
                failing: templates.to_vec(),
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl EmailTransport for ScriptedTransport {
        fn send(&self, request: EmailRequest<'_>) -> impl Future<Output = Result<(), TransportError>> + Send {
            self.sent.lock().unwrap().push(request.template_id.to_string());
            let result = if self.failing.iter().any(|t| *t == request.template_id) {
                Err(TransportError::Status {
                    status: 400,
                    body: "bad template".into(),
                })
            } else {
                Ok(())
            };
            std::future::ready(result)
        }
    }

    fn configured(auto_reply: Option<&str>) -> ContactSettings {
        ContactSettings {
            service_id: Some("service".into()),
            receiver_template_id: Some("receiver".into()),
            auto_reply_template_id: auto_reply.map(Into::into),
            public_key: Some("key".into()),
            ..ContactSettings::default()
        }
    }

    fn message() -> ContactMessage {
        ContactMessage::new("Ada", "ada@example.com", "Hello there")
    }

    #[tokio::test]
    async fn sends_notification_then_auto_reply() {
        let relay = ContactRelay::new(configured(Some("auto")), ScriptedTransport::default());
        let delivery = relay.send_message(&message()).await.unwrap();
        assert_eq!(delivery.auto_reply, AutoReply::Sent);
        assert_eq!(relay.transport().sent(), ["receiver", "auto"]);
    }

    #[tokio::test]
    async fn auto_reply_failure_still_succeeds() {
        let relay = ContactRelay::new(configured(Some("auto")), ScriptedTransport::failing(&["auto"]));
        let delivery = relay.send_message(&message()).await.unwrap();
        assert!(matches!(delivery.auto_reply, AutoReply::Failed(_)));
    }

    #[tokio::test]
    async fn missing_auto_reply_template_is_skipped() {
        let relay = ContactRelay::new(configured(Some("")), ScriptedTransport::default());
        let delivery = relay.send_message(&message()).await.unwrap();
        assert_eq!(delivery.auto_reply, AutoReply::Skipped);
        assert_eq!(relay.transport().sent(), ["receiver"]);
    }

    #[tokio::test]
    async fn primary_failure_fails_without_auto_reply() {
        let relay = ContactRelay::new(configured(Some("auto")), ScriptedTransport::failing(&["receiver"]));
        let err = relay.send_message(&message()).await.unwrap_err();
        assert!(matches!(err, ContactError::Delivery(_)));
        assert_eq!(err.user_message(), "Failed to send message. Please try again.");
        assert_eq!(relay.transport().sent(), ["receiver"]);
    }

    #[tokio::test]
    async fn unconfigured_relay_sends_nothing() {
        let settings = ContactSettings {
            public_key: None,
            receiver_template_id: Some(" ".into()),
            ..configured(None)
        };
        let relay = ContactRelay::new(settings, ScriptedTransport::default());
        match relay.send_message(&message()).await {
            Err(ContactError::NotConfigured { missing }) => {
                assert_eq!(missing, ["receiver_template_id", "public_key"]);
            }
            other => panic!("expected NotConfigured, got {other:?}"),
        }
        assert!(relay.transport().sent().is_empty());
    }
}
