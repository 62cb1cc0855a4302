//! User-facing notices (toasts)

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::contact::{ContactError, Delivery};

pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Queue of visible notices, oldest first.
#[derive(Debug, Default)]
pub struct Notices {
    next_id: u64,
    active: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>, now: Instant) -> u64 {
        self.push_for(kind, message, now, DEFAULT_LIFETIME)
    }

    pub fn push_for(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        now: Instant,
        lifetime: Duration,
    ) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        tracing::debug!(id, ?kind, %message, "notice shown");
        self.active.push(Notice {
            id,
            kind,
            message,
            expires_at: now + lifetime,
        });
        id
    }

    pub fn success(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.push(NoticeKind::Success, message, now)
    }

    pub fn error(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.push(NoticeKind::Error, message, now)
    }

    pub fn info(&mut self, message: impl Into<String>, now: Instant) -> u64 {
        self.push(NoticeKind::Info, message, now)
    }

    /// Show the outcome of a contact send.
    pub fn contact_outcome(&mut self, result: &Result<Delivery, ContactError>, now: Instant) -> u64 {
        match result {
            Ok(_) => self.success("Message sent! I'll get back to you soon.", now),
            Err(err) => self.error(err.user_message(), now),
        }
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.active.len();
        self.active.retain(|n| n.id != id);
        self.active.len() != before
    }

    /// Drop notices whose lifetime has passed; returns how many went.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.active.len();
        self.active.retain(|n| n.expires_at > now);
        before - self.active.len()
    }

    pub fn active(&self) -> &[Notice] {
        &self.active
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
