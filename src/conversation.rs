//! In-memory conversation transcript.
//!
//! Holds the messages of one widget session in chronological order together
//! with the backend's conversation id. Messages are never edited or removed
//! individually; the only way to shrink the store is [`ConversationStore::reset`].

use crate::models::{ChatResponse, Message, Role};

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    conversation_id: Option<String>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the user's side of a turn before the backend has answered.
    ///
    /// The message stays even if the request later fails.
    pub fn append_user(&mut self, content: impl Into<String>) -> &Message {
        self.push(Message::user(content))
    }

    /// Append the backend's answer and adopt its conversation id.
    pub fn append_assistant(&mut self, response: &ChatResponse) -> &Message {
        self.conversation_id = Some(response.conversation_id.clone());
        self.push(Message::assistant(response))
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation_id.as_deref()
    }

    /// Number of completed user/assistant exchanges.
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    /// Adopt an id issued by the backend in an earlier session.
    pub(crate) fn resume(&mut self, conversation_id: impl Into<String>) {
        self.conversation_id = Some(conversation_id.into());
    }

    /// Drop every message and forget the conversation id.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.conversation_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(answer: &str, id: &str) -> ChatResponse {
        ChatResponse {
            answer: answer.to_string(),
            sources: vec![],
            grounded: true,
            conversation_id: id.to_string(),
        }
    }

    #[test]
    fn starts_empty_without_id() {
        let store = ConversationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.conversation_id(), None);
        assert_eq!(store.turns(), 0);
    }

    #[test]
    fn user_append_does_not_set_id() {
        let mut store = ConversationStore::new();
        store.append_user("What is SLAM?");
        assert_eq!(store.len(), 1);
        assert_eq!(store.conversation_id(), None);
        assert_eq!(store.turns(), 0);
    }

    #[test]
    fn assistant_append_overwrites_id() {
        let mut store = ConversationStore::new();
        store.append_user("q1");
        store.append_assistant(&response("a1", "conv-1"));
        assert_eq!(store.conversation_id(), Some("conv-1"));

        store.append_user("q2");
        store.append_assistant(&response("a2", "conv-2"));
        assert_eq!(store.conversation_id(), Some("conv-2"));

        let roles: Vec<Role> = store.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(store.turns(), 2);
        assert_eq!(store.last().unwrap().content, "a2");
    }

    #[test]
    fn reset_clears_everything() {
        let mut store = ConversationStore::new();
        store.append_user("q");
        store.append_assistant(&response("a", "conv"));
        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.conversation_id(), None);
    }
}
