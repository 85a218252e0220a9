//! Conversation transcript with system-prompt-preserving truncation.

use koko_protocol::{Message, Role};

/// Ordered transcript of messages sent to the model on each turn.
///
/// Invariant: index 0 is always the system prompt and truncation never
/// drops it.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    max_messages: usize,
}

impl Conversation {
    /// Create a transcript seeded with the system prompt at index 0.
    pub fn new(system_prompt: &str, max_messages: usize) -> Self {
        Self {
            messages: vec![Message::text(Role::System, system_prompt)],
            max_messages,
        }
    }

    /// Append a message, discarding the oldest non-system entries once the
    /// transcript exceeds its cap.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        while self.messages.len() > self.max_messages {
            let Some(index) = self
                .messages
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, message)| message.role != Role::System)
                .map(|(index, _)| index)
            else {
                break;
            };
            self.messages.remove(index);
        }
    }

    /// All messages in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the transcript.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript is empty (never true once constructed).
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Conversation;
    use koko_protocol::{Message, Role};
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_with_system_prompt() {
        let conversation = Conversation::new("You are Koko.", 10);
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(
            conversation.messages()[0].content.as_deref(),
            Some("You are Koko.")
        );
    }

    #[test]
    fn truncation_never_drops_the_system_prompt() {
        let mut conversation = Conversation::new("rules", 4);
        for index in 0..20 {
            conversation.push(Message::text(Role::User, format!("message {index}")));
        }
        assert_eq!(conversation.len(), 4);
        assert_eq!(conversation.messages()[0].role, Role::System);
        assert_eq!(conversation.messages()[0].content.as_deref(), Some("rules"));
        // The tail keeps the most recent entries.
        assert_eq!(
            conversation.messages()[3].content.as_deref(),
            Some("message 19")
        );
    }

    #[test]
    fn truncation_drops_oldest_non_system_first() {
        let mut conversation = Conversation::new("rules", 3);
        conversation.push(Message::text(Role::User, "first"));
        conversation.push(Message::text(Role::Assistant, "second"));
        conversation.push(Message::text(Role::User, "third"));

        let contents: Vec<_> = conversation
            .messages()
            .iter()
            .map(|message| message.content.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(contents, vec!["rules", "second", "third"]);
    }

    #[test]
    fn injected_system_notes_survive_truncation() {
        let mut conversation = Conversation::new("rules", 3);
        conversation.push(Message::text(Role::System, "document contents"));
        for index in 0..5 {
            conversation.push(Message::text(Role::User, format!("message {index}")));
        }
        assert_eq!(conversation.len(), 3);
        assert_eq!(
            conversation.messages()[1].content.as_deref(),
            Some("document contents")
        );
    }
}
