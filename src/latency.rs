/// Simulated network latency.
///
/// Every store accessor waits a fixed, per-operation delay before doing its
/// work. The delay is cosmetic: nothing retries, times out or fails because
/// of it.

use std::time::Duration;

/// Store operations that carry an artificial delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Register,
    Logout,
    SearchUsers,
    GetUserById,
    GetFriends,
    GetFriendRequests,
    SendFriendRequest,
    AcceptFriendRequest,
    GetMessages,
    SendMessage,
}

impl Operation {
    pub fn delay(self) -> Duration {
        let millis = match self {
            Operation::Login
            | Operation::Register
            | Operation::SearchUsers
            | Operation::SendFriendRequest
            | Operation::AcceptFriendRequest
            | Operation::SendMessage => 500,
            Operation::Logout | Operation::GetFriends | Operation::GetFriendRequests | Operation::GetMessages => 300,
            Operation::GetUserById => 200,
        };
        Duration::from_millis(millis)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Latency {
    enabled: bool,
}

impl Latency {
    pub fn enabled() -> Self {
        Latency { enabled: true }
    }

    pub fn disabled() -> Self {
        Latency { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wait out the delay for `op`
    pub async fn simulate(&self, op: Operation) {
        if self.enabled {
            tokio::time::sleep(op.delay()).await;
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::enabled()
    }
}
