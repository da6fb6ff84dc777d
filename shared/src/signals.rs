use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Info => 3000,
            Self::Success => 2000,
            Self::Warning => 4000,
            Self::Error => 5000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind, created_at_ms: u64) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms,
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

/// A blocking yes/no prompt. Callbacks are events fed back into `update`.
#[derive(Debug, Clone)]
pub struct ConfirmationRequest {
    pub title: String,
    pub message: String,
    pub on_confirm: Box<Event>,
    pub on_cancel: Option<Box<Event>>,
    pub confirm_label: Option<String>,
    pub cancel_label: Option<String>,
}

impl ConfirmationRequest {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>, on_confirm: Event) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            on_confirm: Box::new(on_confirm),
            on_cancel: None,
            confirm_label: None,
            cancel_label: None,
        }
    }

    #[must_use]
    pub fn on_cancel(mut self, event: Event) -> Self {
        self.on_cancel = Some(Box::new(event));
        self
    }

    #[must_use]
    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = Some(confirm.into());
        self.cancel_label = Some(cancel.into());
        self
    }
}

/// Process-wide single slot for the pending confirmation.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationSlot {
    pending: Option<ConfirmationRequest>,
}

impl ConfirmationSlot {
    /// Last write wins. The callbacks of an overwritten request are dropped
    /// without being invoked.
    pub fn set(&mut self, request: ConfirmationRequest) {
        if let Some(previous) = self.pending.replace(request) {
            warn!(
                dropped_title = %previous.title,
                "confirmation overwritten before it was resolved"
            );
        }
    }

    #[must_use]
    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_none()
    }

    /// Empties the slot and yields the confirm callback. The slot is already
    /// empty when the callback runs, so the callback may request a follow-up
    /// confirmation.
    pub fn confirm(&mut self) -> Option<Event> {
        self.pending.take().map(|request| *request.on_confirm)
    }

    /// Empties the slot and yields the cancel callback, if one was given.
    pub fn cancel(&mut self) -> Option<Event> {
        self.pending
            .take()
            .and_then(|request| request.on_cancel.map(|event| *event))
    }
}
