/// In-memory chat stores.
/// One `ChatStore` owns the directory, relationships, conversations, and the
/// session slot; it is built once per process (or per test) and shared by
/// reference.

pub mod conversations;
pub mod directory;
pub mod identity;
pub mod models;
pub mod relationships;
pub mod seed;

use crate::latency::Latency;
use crate::scheduler::{Clock, SystemClock};
use crate::session::SessionStore;
use models::{FriendEdge, FriendRequest, Message, User};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Collections guarded by the store lock
pub struct ChatState {
    pub(crate) users: Vec<User>,
    pub(crate) friends: Vec<FriendEdge>,
    pub(crate) requests: Vec<FriendRequest>,
    pub(crate) messages: Vec<Message>,
    pub(crate) current_user: Option<User>,
    pub(crate) session: SessionStore,
}

impl ChatState {
    pub(crate) fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub(crate) fn are_friends(&self, a: &str, b: &str) -> bool {
        self.friends.iter().any(|edge| edge.links(a, b))
    }

    pub(crate) fn has_pending_request(&self, sender_id: &str, receiver_id: &str) -> bool {
        self.requests
            .iter()
            .any(|r| r.is_pending() && r.sender_id == sender_id && r.receiver_id == receiver_id)
    }

    /// Add both directions of a friendship, skipping edges that already exist
    pub(crate) fn link_friends(&mut self, a: &str, b: &str) {
        for (user_id, friend_id) in [(a, b), (b, a)] {
            let exists = self
                .friends
                .iter()
                .any(|e| e.user_id == user_id && e.friend_id == friend_id);
            if !exists {
                self.friends.push(FriendEdge::new(user_id, friend_id));
            }
        }
    }
}

/// Shared handle to all stores
pub struct ChatStore {
    state: Mutex<ChatState>,
    latency: Latency,
    clock: Arc<dyn Clock>,
}

impl ChatStore {
    /// Store populated with the demo roster, friendships, and requests
    pub fn new(session: SessionStore, latency: Latency, clock: Arc<dyn Clock>) -> Self {
        let state = seed::demo_state(session, clock.now());
        Self::from_state(state, latency, clock)
    }

    /// Store with no users at all
    pub fn empty(session: SessionStore, latency: Latency, clock: Arc<dyn Clock>) -> Self {
        let state = ChatState {
            users: Vec::new(),
            friends: Vec::new(),
            requests: Vec::new(),
            messages: Vec::new(),
            current_user: None,
            session,
        };
        Self::from_state(state, latency, clock)
    }

    fn from_state(state: ChatState, latency: Latency, clock: Arc<dyn Clock>) -> Self {
        ChatStore {
            state: Mutex::new(state),
            latency,
            clock,
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().await
    }

    pub(crate) fn latency(&self) -> &Latency {
        &self.latency
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Number of friend edges, both directions counted
    pub async fn edge_count(&self) -> usize {
        self.lock().await.friends.len()
    }

    /// Number of requests in any status
    pub async fn request_count(&self) -> usize {
        self.lock().await.requests.len()
    }
}

/// Demo store with an in-memory session slot, no latency, and the wall clock
pub fn create_test_store() -> ChatStore {
    create_test_store_with_clock(Arc::new(SystemClock))
}

/// Demo store for tests that need to control time
pub fn create_test_store_with_clock(clock: Arc<dyn Clock>) -> ChatStore {
    let session = SessionStore::in_memory().expect("Failed to create in-memory session slot");
    ChatStore::new(session, Latency::disabled(), clock)
}
