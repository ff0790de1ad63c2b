/// Initial demo data and sample conversation content.
use super::models::{ConversationId, FriendRequest, Message, RequestStatus, User};
use super::ChatState;
use crate::session::SessionStore;
use chrono::{DateTime, Duration, Utc};

/// Demo roster; the first entry is the default identity
pub fn demo_users() -> Vec<User> {
    vec![
        User::new("1", "ahmet", "ahmet@example.com", true),
        User::new("2", "mehmet", "mehmet@example.com", false),
        User::new("3", "ayse", "ayse@example.com", true),
        User::new("4", "fatma", "fatma@example.com", true),
        User::new("5", "ali", "ali@example.com", false),
    ]
}

/// Demo collections: 1-2 and 1-3 are friends, 4 and 5 have asked 1
pub fn demo_state(session: SessionStore, now: DateTime<Utc>) -> ChatState {
    let users = demo_users();

    let requests = [("1", "4"), ("2", "5")]
        .into_iter()
        .filter_map(|(id, sender_id)| {
            let sender = users.iter().find(|u| u.id == sender_id)?.clone();
            Some(FriendRequest {
                id: id.to_string(),
                sender_id: sender_id.to_string(),
                receiver_id: "1".to_string(),
                status: RequestStatus::Pending,
                created_at: now,
                sender,
            })
        })
        .collect();

    let mut state = ChatState {
        users,
        friends: Vec::new(),
        requests,
        messages: Vec::new(),
        current_user: None,
        session,
    };
    state.link_friends("1", "2");
    state.link_friends("1", "3");
    state
}

const SAMPLE_LINES: [&str; 4] = [
    "Hi, how are you?",
    "I'm fine, thanks! How about you?",
    "I'm good too. The weather is lovely today, isn't it?",
    "Yes, it really is! Maybe we could go out and do something.",
];

/// Four alternating messages between `viewer` and `other`, oldest first,
/// spread over the hour before `now`
pub fn sample_conversation(viewer: &str, other: &str, now: DateTime<Utc>) -> Vec<Message> {
    let conversation_id = ConversationId::between(viewer, other);

    SAMPLE_LINES
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let (sender, receiver) = if i % 2 == 0 { (viewer, other) } else { (other, viewer) };
            Message {
                id: uuid::Uuid::new_v4().to_string(),
                conversation_id: conversation_id.clone(),
                sender_id: sender.to_string(),
                receiver_id: receiver.to_string(),
                content: line.to_string(),
                created_at: now - Duration::seconds(3600 - 100 * i as i64),
            }
        })
        .collect()
}
