/// Data models for the in-memory stores.
/// Represents users, friend edges, friend requests, and messages.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub online: bool,
}

impl User {
    pub fn new(id: &str, username: &str, email: &str, online: bool) -> Self {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            online,
        }
    }
}

/// A user as seen by one viewer in search results.
///
/// The flags are computed per query and never stored on the canonical record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: User,
    pub is_friend: bool,
    pub request_sent: bool,
}

/// One direction of a friendship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FriendEdge {
    pub user_id: String,
    pub friend_id: String,
}

impl FriendEdge {
    pub fn new(user_id: &str, friend_id: &str) -> Self {
        FriendEdge {
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
        }
    }

    /// True if this edge links `a` and `b` in either direction
    pub fn links(&self, a: &str, b: &str) -> bool {
        (self.user_id == a && self.friend_id == b) || (self.user_id == b && self.friend_id == a)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    /// Copy of the sender taken when the request was created
    pub sender: User,
}

impl FriendRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Canonical identifier of a two-party conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Both orderings of the pair yield the same id
    pub fn between(a: &str, b: &str) -> Self {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        ConversationId(format!("{}-{}", low, high))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: ConversationId,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// Request/Response DTOs
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendFriendRequestBody {
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageBody {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_is_order_independent() {
        assert_eq!(ConversationId::between("1", "2"), ConversationId::between("2", "1"));
        assert_eq!(ConversationId::between("2", "1").as_str(), "1-2");
        assert_eq!(ConversationId::between("10", "9").as_str(), "10-9");
        assert_eq!(ConversationId::between("4", "4").as_str(), "4-4");
    }

    #[test]
    fn test_friend_edge_links() {
        let edge = FriendEdge::new("1", "2");
        assert!(edge.links("1", "2"));
        assert!(edge.links("2", "1"));
        assert!(!edge.links("1", "3"));
    }

    #[test]
    fn test_user_view_serializes_flat_camel_case() {
        let view = UserView {
            user: User::new("2", "mehmet", "mehmet@example.com", false),
            is_friend: true,
            request_sent: false,
        };

        let value = serde_json::to_value(&view).expect("Serialization failed");
        assert_eq!(value["id"], "2");
        assert_eq!(value["username"], "mehmet");
        assert_eq!(value["isFriend"], true);
        assert_eq!(value["requestSent"], false);
    }

    #[test]
    fn test_friend_request_status_serialization() {
        let json = serde_json::to_string(&RequestStatus::Pending).expect("Serialization failed");
        assert_eq!(json, "\"pending\"");
    }

    #[test]
    fn test_send_friend_request_body_uses_camel_case() {
        let body: SendFriendRequestBody =
            serde_json::from_str(r#"{"userId":"3"}"#).expect("Deserialization failed");
        assert_eq!(body.user_id, "3");
    }
}
