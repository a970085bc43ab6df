use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::kernel::body::{ActorId, Body};
use crate::kernel::collaborators::Presenter;

/// Shared, append-only text of everything a [`TextPresenter`] displayed.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    text: Arc<Mutex<String>>,
}

impl Transcript {
    pub fn contents(&self) -> String {
        self.text.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn append(&self, line: &str) -> anyhow::Result<()> {
        let mut text = self.text.lock().map_err(|_| anyhow!("transcript lock poisoned"))?;
        text.push_str(line);
        text.push_str("\n\n");
        Ok(())
    }
}

/// Console-style presenter for a single viewer.
///
/// Status is redrawn only when it changed since the previous tick, so a
/// 100ms cadence does not flood the terminal. Notices addressed to other
/// bodies are dropped.
#[derive(Debug)]
pub struct TextPresenter {
    viewer: ActorId,
    transcript: Transcript,
    last_status: Option<String>,
    echo: bool,
}

impl TextPresenter {
    pub fn new(viewer: ActorId, echo: bool) -> Self {
        Self {
            viewer,
            transcript: Transcript::default(),
            last_status: None,
            echo,
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }

    fn display_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.transcript.append(line)?;
        if self.echo {
            println!("{line}\n");
        }
        Ok(())
    }
}

pub fn render_status(body: &Body) -> String {
    let mut line = format!("{}: HP {}/{}", body.id(), body.health(), body.max_health());
    if !body.is_active() {
        line.push_str(" (knocked out)");
    }
    if body.has_pending_command() {
        line.push_str(&format!(", {} queued", body.queue_len()));
    }
    line
}

impl Presenter for TextPresenter {
    fn begin_session(&mut self) -> anyhow::Result<()> {
        self.last_status = None;
        Ok(())
    }

    fn display_status(&mut self, body: &Body) -> anyhow::Result<()> {
        let status = render_status(body);
        if self.last_status.as_deref() == Some(status.as_str()) {
            return Ok(());
        }
        self.display_line(&status)?;
        self.last_status = Some(status);
        Ok(())
    }

    fn notify(&mut self, actor: &ActorId, message: &str) -> anyhow::Result<()> {
        if *actor != self.viewer {
            return Ok(());
        }
        self.display_line(message)
    }
}
