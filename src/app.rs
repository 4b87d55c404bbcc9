use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::client::{ChatClient, SendOutcome};
use crate::widgets::{ChatLog, InputBuffer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,

    pub input: InputBuffer,
    pub log: ChatLog,
    pub client: ChatClient,
    pub server_url: String,

    // Only drives the "sending" indicator; sends are never blocked on it
    pub pending: Vec<JoinHandle<SendOutcome>>,

    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(client: ChatClient, server_url: impl Into<String>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input: InputBuffer::new(),
            log: ChatLog::new(),
            client,
            server_url: server_url.into(),
            pending: Vec::new(),
            animation_frame: 0,
        }
    }

    /// Show and clear whatever is in the input box, then send it in the
    /// background. Blank input does nothing.
    pub fn submit(&mut self) {
        if let Some(send) = self.client.start(&self.input, &self.log) {
            let log = self.log.clone();
            self.pending.push(tokio::spawn(async move { send.settle(&log).await }));
        }
    }

    pub fn is_sending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drop finished send tasks and advance the animation.
    pub fn tick(&mut self) {
        self.pending.retain(|task| !task.is_finished());
        if self.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        } else {
            self.animation_frame = 0;
        }
    }

    /// Abort sends still in flight and reap the finished ones.
    pub async fn shutdown(&mut self) {
        for task in self.pending.drain(..) {
            if !task.is_finished() {
                debug!("abandoning in-flight chat request");
                task.abort();
                continue;
            }
            if let Err(err) = task.await {
                warn!(error = %err, "send task ended abnormally");
            }
        }
    }
}
