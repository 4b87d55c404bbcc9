//! UI-agnostic chat types
//!
//! A [`Message`] only exists as something rendered in the log; there is no
//! history kept anywhere else.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A rendered chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self { role: Role::Bot, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { role: Role::Error, text: text.into() }
    }
}

/// Plain-text form used by `ecofin-chat send`: `[message bot] Hello!`
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.role.class_name(), self.text)
    }
}

/// Who a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
    Error,
}

impl Role {
    /// Class list of a message node in the web widget.
    pub fn class_name(&self) -> &'static str {
        match self {
            Role::User => "message user",
            Role::Bot => "message bot",
            Role::Error => "message error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "You:",
            Role::Bot => "Bot:",
            Role::Error => "Error:",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_names_match_roles() {
        assert_eq!(Role::User.class_name(), "message user");
        assert_eq!(Role::Bot.class_name(), "message bot");
        assert_eq!(Role::Error.class_name(), "message error");
    }

    #[test]
    fn test_display_tags_message_with_class_names() {
        assert_eq!(Message::user("Hi").to_string(), "[message user] Hi");
        assert_eq!(
            Message::error("Désolé").to_string(),
            "[message error] Désolé"
        );
    }

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Message::user("a").role, Role::User);
        assert_eq!(Message::bot("b").role, Role::Bot);
        assert_eq!(Message::error("c").role, Role::Error);
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::bot("hi")).unwrap();
        assert_eq!(json, r#"{"role":"bot","text":"hi"}"#);
    }
}
