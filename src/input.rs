//! Raw player input on its way into the player's command queue.
//!
//! Input arrives on whatever task owns the terminal (or UI), but bodies may
//! only be touched while a tick runs. Lines therefore travel over a channel
//! and the scheduler moves them into the player's queue at the top of each
//! tick, in submission order.

use thiserror::Error;
use tokio::sync::mpsc;

/// Trim, lowercase, and drop submissions that carry no content.
pub fn normalize(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_lowercase())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("input channel closed, scheduler is gone")]
pub struct InputClosed;

#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<String>,
}

impl InputSender {
    /// Normalizes and forwards one line. `Ok(false)` means the line was empty
    /// and nothing was sent.
    pub fn submit(&self, raw: &str) -> Result<bool, InputClosed> {
        let Some(line) = normalize(raw) else {
            return Ok(false);
        };
        self.tx.send(line).map_err(|_| InputClosed)?;
        Ok(true)
    }
}

#[derive(Debug)]
pub struct InputReceiver {
    rx: mpsc::UnboundedReceiver<String>,
}

impl InputReceiver {
    /// Everything submitted so far, oldest first. Never waits.
    pub fn drain(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.rx.try_recv() {
            lines.push(line);
        }
        lines
    }
}

pub fn channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InputSender { tx }, InputReceiver { rx })
}
