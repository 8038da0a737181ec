//! Caller-visible UI side effects (toasts, opening HireDeck).
//!
//! Effects are fire-and-forget: emitting never blocks and never fails. If
//! the receiving side is gone the effect is dropped.

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

pub const SUCCESS_TOAST_MS: u64 = 3_000;
pub const WARNING_TOAST_MS: u64 = 5_000;
pub const HIREDECK_OPEN_DELAY_MS: u64 = 1_500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UiEffect {
    Toast {
        level: ToastLevel,
        message: String,
        dismiss_after_ms: u64,
    },
    OpenWindow {
        path: String,
        delay_ms: u64,
    },
}

impl UiEffect {
    pub fn success(message: impl Into<String>) -> Self {
        UiEffect::Toast {
            level: ToastLevel::Success,
            message: message.into(),
            dismiss_after_ms: SUCCESS_TOAST_MS,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        UiEffect::Toast {
            level: ToastLevel::Warning,
            message: message.into(),
            dismiss_after_ms: WARNING_TOAST_MS,
        }
    }

    pub fn open_window(path: impl Into<String>, delay_ms: u64) -> Self {
        UiEffect::OpenWindow {
            path: path.into(),
            delay_ms,
        }
    }
}

/// Sending half handed to operations that may produce effects.
#[derive(Clone, Default)]
pub struct Effects {
    tx: Option<UnboundedSender<UiEffect>>,
}

impl Effects {
    pub fn channel() -> (Self, UnboundedReceiver<UiEffect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// An emitter whose effects go nowhere.
    #[cfg(test)]
    pub fn discard() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, effect: UiEffect) {
        let Some(tx) = &self.tx else { return };
        if tx.send(effect).is_err() {
            debug!("UI effect dropped: receiver gone");
        }
    }
}

/// Collects whatever has been emitted so far without waiting.
pub fn drain(rx: &mut UnboundedReceiver<UiEffect>) -> Vec<UiEffect> {
    let mut out = Vec::new();
    while let Ok(effect) = rx.try_recv() {
        out.push(effect);
    }
    out
}
