/// An open chat screen between the current user and one friend.
///
/// Opening a view loads the conversation and keeps it fresh with a periodic
/// poll. Sending a message schedules a canned reply from the friend. All
/// timers go through a [`Scheduler`], so tests drive them with virtual time.

use crate::error::{Result, StoreError};
use crate::scheduler::{RepeatingTask, Scheduler, TaskHandle};
use crate::store::models::{Message, User};
use crate::store::ChatStore;
use futures::FutureExt;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_secs(2);

/// Canned answers for the simulated friend
pub const CANNED_REPLIES: [&str; 10] = [
    "Got it, thanks!",
    "That's a great idea!",
    "I completely agree.",
    "Shall we talk later?",
    "Good to hear!",
    "So when can we meet?",
    "Very interesting, go on...",
    "I never thought of that!",
    "You're right, it should be like that.",
    "I totally agree with you!",
];

/// Updates pushed to whoever renders the view
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    Snapshot { messages: Vec<Message> },
    Sent { message: Message },
    Reply { message: Message },
    Typing { typing: bool },
}

pub type EventSender = UnboundedSender<ChatEvent>;

#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub poll_interval: Duration,
    pub reply_delay: Duration,
    pub auto_reply: bool,
}

impl Default for ChatSettings {
    fn default() -> Self {
        ChatSettings {
            poll_interval: DEFAULT_POLL_INTERVAL,
            reply_delay: DEFAULT_REPLY_DELAY,
            auto_reply: true,
        }
    }
}

/// Scheduler and timing shared by every chat view and handler
#[derive(Clone)]
pub struct ChatRuntime {
    pub scheduler: Arc<dyn Scheduler>,
    pub settings: ChatSettings,
}

impl ChatRuntime {
    pub fn new(scheduler: Arc<dyn Scheduler>, settings: ChatSettings) -> Self {
        ChatRuntime { scheduler, settings }
    }
}

pub fn pick_reply() -> &'static str {
    let index = rand::thread_rng().gen_range(0..CANNED_REPLIES.len());
    CANNED_REPLIES[index]
}

/// Schedule a canned reply from `friend_id` to `viewer_id`.
///
/// Both ids are fixed now, so the reply is attributed correctly even if the
/// current user changes before it fires.
pub fn schedule_auto_reply(
    store: Arc<ChatStore>,
    scheduler: &dyn Scheduler,
    friend_id: &str,
    viewer_id: &str,
    delay: Duration,
    events: Option<EventSender>,
) -> TaskHandle {
    let friend_id = friend_id.to_string();
    let viewer_id = viewer_id.to_string();

    let task = async move {
        let text = pick_reply();
        match store.deliver_reply(&friend_id, &viewer_id, text).await {
            Ok(message) => {
                if let Some(events) = events {
                    let _ = events.send(ChatEvent::Reply { message });
                    let _ = events.send(ChatEvent::Typing { typing: false });
                }
            }
            Err(e) => log::error!("Auto-reply from {} failed: {}", friend_id, e),
        }
    }
    .boxed();

    scheduler.schedule_once(delay, task)
}

pub struct ChatView {
    store: Arc<ChatStore>,
    runtime: ChatRuntime,
    friend: User,
    events: EventSender,
    poll: TaskHandle,
    replies: Vec<TaskHandle>,
}

impl ChatView {
    /// Load the conversation with `friend_id`, emit it, and start polling
    pub async fn open(
        store: Arc<ChatStore>,
        runtime: ChatRuntime,
        friend_id: &str,
        events: EventSender,
    ) -> Result<Self> {
        store.require_current_user().await?;
        let friend = store
            .get_user_by_id(friend_id)
            .await?
            .ok_or_else(|| StoreError::UserNotFound(friend_id.to_string()))?;

        let messages = store.get_messages(&friend.id).await?;
        let _ = events.send(ChatEvent::Snapshot { messages });

        let poll = Self::start_poll(&store, &runtime, &friend.id, &events);
        log::debug!("Chat view with {} opened", friend.id);

        Ok(ChatView {
            store,
            runtime,
            friend,
            events,
            poll,
            replies: Vec::new(),
        })
    }

    fn start_poll(
        store: &Arc<ChatStore>,
        runtime: &ChatRuntime,
        friend_id: &str,
        events: &EventSender,
    ) -> TaskHandle {
        let store = store.clone();
        let events = events.clone();
        let friend_id = friend_id.to_string();

        let task: RepeatingTask = Arc::new(move || {
            let store = store.clone();
            let events = events.clone();
            let friend_id = friend_id.clone();
            async move {
                match store.get_messages(&friend_id).await {
                    Ok(messages) => {
                        let _ = events.send(ChatEvent::Snapshot { messages });
                    }
                    Err(e) => log::warn!("Chat poll for {} failed: {}", friend_id, e),
                }
            }
            .boxed()
        });

        runtime
            .scheduler
            .schedule_every(runtime.settings.poll_interval, task)
    }

    pub fn friend(&self) -> &User {
        &self.friend
    }

    /// Reply handles still held by this view
    pub fn tracked_replies(&self) -> usize {
        self.replies.len()
    }

    /// Send `content` to the friend. Blank input is ignored.
    pub async fn send(&mut self, content: &str) -> Result<Option<Message>> {
        if content.trim().is_empty() {
            return Ok(None);
        }

        let message = self.store.send_message(&self.friend.id, content).await?;
        let _ = self.events.send(ChatEvent::Sent {
            message: message.clone(),
        });

        if self.runtime.settings.auto_reply {
            let _ = self.events.send(ChatEvent::Typing { typing: true });
            let handle = schedule_auto_reply(
                self.store.clone(),
                self.runtime.scheduler.as_ref(),
                &message.receiver_id,
                &message.sender_id,
                self.runtime.settings.reply_delay,
                Some(self.events.clone()),
            );
            self.replies.retain(|reply| !reply.is_finished());
            self.replies.push(handle);
        }

        Ok(Some(message))
    }

    /// Stop polling and drop pending replies
    pub fn close(&mut self) {
        self.poll.cancel();
        for reply in self.replies.drain(..) {
            reply.cancel();
        }
    }
}

impl Drop for ChatView {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_reply_is_canned() {
        for _ in 0..20 {
            assert!(CANNED_REPLIES.contains(&pick_reply()));
        }
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(ChatEvent::Typing { typing: true }).unwrap();
        assert_eq!(json["type"], "typing");
        assert_eq!(json["typing"], true);

        let json = serde_json::to_value(ChatEvent::Snapshot { messages: vec![] }).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert!(json["messages"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_default_settings() {
        let settings = ChatSettings::default();
        assert_eq!(settings.poll_interval, Duration::from_secs(3));
        assert_eq!(settings.reply_delay, Duration::from_secs(2));
        assert!(settings.auto_reply);
    }
}
