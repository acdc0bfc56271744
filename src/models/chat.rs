use serde::{ Deserialize, Serialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationError {
    /// A system message showed up somewhere other than the head.
    MisplacedSystemMessage(usize),
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationError::MisplacedSystemMessage(index) =>
                write!(f, "System message is only allowed as the first message (found at index {})", index),
        }
    }
}

impl std::error::Error for ConversationError {}

/// Ordered chat history. A system message, when present, is always first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_messages(messages: Vec<ChatMessage>) -> Result<Self, ConversationError> {
        if let Some(index) = messages
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, m)| m.role == Role::System)
            .map(|(i, _)| i)
        {
            return Err(ConversationError::MisplacedSystemMessage(index));
        }
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends a user or assistant turn. System messages go through
    /// [`Conversation::with_system_prompt`].
    pub fn push(&mut self, message: ChatMessage) -> Result<(), ConversationError> {
        if message.role == Role::System && !self.messages.is_empty() {
            return Err(ConversationError::MisplacedSystemMessage(self.messages.len()));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Replaces any leading system message with `prompt`.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.messages.retain(|m| m.role != Role::System);
        self.messages.insert(0, ChatMessage::system(prompt));
        self
    }

    pub fn has_system_prompt(&self) -> bool {
        self.messages.first().map(|m| m.role == Role::System).unwrap_or(false)
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);

        let parsed: ChatMessage = serde_json::from_str(r#"{"role":"system","content":"x"}"#).unwrap();
        assert_eq!(parsed.role, Role::System);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let parsed = serde_json::from_str::<ChatMessage>(r#"{"role":"tool","content":"x"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn system_message_must_lead() {
        let err = Conversation::from_messages(
            vec![ChatMessage::user("hi"), ChatMessage::system("be nice")]
        ).unwrap_err();
        assert_eq!(err, ConversationError::MisplacedSystemMessage(1));

        let ok = Conversation::from_messages(
            vec![ChatMessage::system("be nice"), ChatMessage::user("hi")]
        ).unwrap();
        assert!(ok.has_system_prompt());
    }

    #[test]
    fn push_refuses_trailing_system_message() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user("hi")).unwrap();
        assert!(conversation.push(ChatMessage::system("late")).is_err());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn with_system_prompt_replaces_existing_head() {
        let conversation = Conversation::from_messages(
            vec![ChatMessage::system("old"), ChatMessage::user("hi")]
        )
            .unwrap()
            .with_system_prompt("new");

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0], ChatMessage::system("new"));
        assert_eq!(conversation.messages()[1], ChatMessage::user("hi"));
    }
}
