use std::sync::Arc;

use tracing::{debug, error};

use crate::api::ChatTransport;
use crate::state::Message;
use crate::widgets::{InputField, MessageLog};

pub const DEFAULT_ERROR_TEXT: &str = "Désolé, une erreur s'est produite.";

/// What a call to [`ChatClient::send_message`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was blank; nothing happened.
    Skipped,
    Answered,
    Failed,
}

/// Clears the input field when dropped.
struct ClearOnDrop<'a, I: InputField + ?Sized>(&'a I);

impl<I: InputField + ?Sized> Drop for ClearOnDrop<'_, I> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

/// Sends what the user typed and renders the outcome into the log.
///
/// There is no in-flight guard: overlapping calls each run to completion and
/// render in whatever order their requests settle.
#[derive(Clone)]
pub struct ChatClient {
    transport: Arc<dyn ChatTransport>,
    error_text: String,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            error_text: DEFAULT_ERROR_TEXT.to_string(),
        }
    }

    pub fn with_error_text(mut self, text: impl Into<String>) -> Self {
        self.error_text = text.into();
        self
    }

    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Show the user's message and clear the input, without waiting on the
    /// network. Returns `None` for blank input, which is left untouched.
    pub fn start<I, L>(&self, input: &I, log: &L) -> Option<PendingSend>
    where
        I: InputField + ?Sized,
        L: MessageLog + ?Sized,
    {
        let text = input.value();
        if text.trim().is_empty() {
            return None;
        }

        let clear = ClearOnDrop(input);
        log.append(Message::user(text.clone()));
        drop(clear);

        Some(PendingSend {
            client: self.clone(),
            text,
        })
    }

    pub async fn send_message<I, L>(&self, input: &I, log: &L) -> SendOutcome
    where
        I: InputField + ?Sized,
        L: MessageLog + ?Sized,
    {
        match self.start(input, log) {
            Some(send) => send.settle(log).await,
            None => SendOutcome::Skipped,
        }
    }
}

/// A message already shown in the log whose reply is still outstanding.
#[must_use = "nothing is sent until the pending send is settled"]
pub struct PendingSend {
    client: ChatClient,
    text: String,
}

impl PendingSend {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Send the request and render the reply or the error message.
    pub async fn settle<L>(self, log: &L) -> SendOutcome
    where
        L: MessageLog + ?Sized,
    {
        debug!(chars = self.text.chars().count(), "sending chat message");

        match self.client.transport.send(&self.text).await {
            Ok(reply) => {
                log.append(Message::bot(reply));
                log.scroll_to_bottom();
                SendOutcome::Answered
            }
            Err(err) => {
                error!(error = %err, "chat request failed");
                log.append(Message::error(self.client.error_text.clone()));
                SendOutcome::Failed
            }
        }
    }
}
