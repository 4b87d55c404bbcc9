pub mod api;
pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod layout;
pub mod logging;
pub mod state;
pub mod tui;
pub mod ui;
pub mod widgets;

// Re-export main types for convenience
pub use api::{ChatTransport, HttpTransport};
pub use client::{ChatClient, PendingSend, SendOutcome, DEFAULT_ERROR_TEXT};
pub use config::Config;
pub use error::ChatError;
pub use state::{Message, Role};
pub use widgets::{ChatLog, InputBuffer, InputField, MessageLog};
