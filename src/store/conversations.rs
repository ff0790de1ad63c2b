/// Two-party conversations.
use super::models::{ConversationId, Message};
use super::{seed, ChatState, ChatStore};
use crate::error::Result;
use crate::latency::Operation;
use chrono::{DateTime, Utc};

impl ChatStore {
    /// Seed a sample exchange between the viewer and `other_id` if the
    /// conversation has no messages yet. Returns whether it seeded.
    pub async fn ensure_conversation_seeded(&self, other_id: &str) -> Result<bool> {
        let mut state = self.lock().await;
        let viewer = state.viewer()?;
        Ok(state.seed_conversation(&viewer.id, other_id, self.clock().now()))
    }

    /// Messages between the viewer and `other_id`, oldest first.
    ///
    /// An empty conversation is seeded before it is read.
    pub async fn get_messages(&self, other_id: &str) -> Result<Vec<Message>> {
        self.latency().simulate(Operation::GetMessages).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;

        state.seed_conversation(&viewer.id, other_id, self.clock().now());
        Ok(state.conversation(&ConversationId::between(&viewer.id, other_id)))
    }

    /// Append a message from the viewer to `receiver_id`
    pub async fn send_message(&self, receiver_id: &str, content: &str) -> Result<Message> {
        self.latency().simulate(Operation::SendMessage).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;
        let message = state.append_message(&viewer.id, receiver_id, content, self.clock().now());

        log::debug!("Message {} sent in {}", message.id, message.conversation_id);
        Ok(message)
    }

    /// Append a message on behalf of `sender_id`, whoever is logged in
    pub async fn deliver_reply(&self, sender_id: &str, receiver_id: &str, content: &str) -> Result<Message> {
        let mut state = self.lock().await;
        let message = state.append_message(sender_id, receiver_id, content, self.clock().now());

        log::debug!("Reply {} delivered in {}", message.id, message.conversation_id);
        Ok(message)
    }
}

impl ChatState {
    fn seed_conversation(&mut self, viewer_id: &str, other_id: &str, now: DateTime<Utc>) -> bool {
        let conversation_id = ConversationId::between(viewer_id, other_id);
        if self.messages.iter().any(|m| m.conversation_id == conversation_id) {
            return false;
        }

        log::debug!("Seeding conversation {}", conversation_id);
        self.messages
            .extend(seed::sample_conversation(viewer_id, other_id, now));
        true
    }

    fn conversation(&self, conversation_id: &ConversationId) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation_id)
            .cloned()
            .collect();
        // Stable, so equal timestamps keep insertion order
        messages.sort_by_key(|m| m.created_at);
        messages
    }

    fn append_message(
        &mut self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Message {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            conversation_id: ConversationId::between(sender_id, receiver_id),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            created_at,
        };
        self.messages.push(message.clone());
        message
    }
}
