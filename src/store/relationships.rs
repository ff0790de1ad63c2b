/// Friendships and friend requests.
use super::models::{FriendRequest, RequestStatus, User};
use super::ChatStore;
use crate::error::{Result, StoreError};
use crate::latency::Operation;

impl ChatStore {
    /// Users the viewer has an edge to, in roster order
    pub async fn get_friends(&self) -> Result<Vec<User>> {
        self.latency().simulate(Operation::GetFriends).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;

        let friends = state
            .users
            .iter()
            .filter(|u| {
                state
                    .friends
                    .iter()
                    .any(|e| e.user_id == viewer.id && e.friend_id == u.id)
            })
            .cloned()
            .collect();

        Ok(friends)
    }

    /// Pending requests addressed to the viewer
    pub async fn get_friend_requests(&self) -> Result<Vec<FriendRequest>> {
        self.latency().simulate(Operation::GetFriendRequests).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;

        Ok(state
            .requests
            .iter()
            .filter(|r| r.is_pending() && r.receiver_id == viewer.id)
            .cloned()
            .collect())
    }

    /// Ask `target_id` to become the viewer's friend.
    ///
    /// The request keeps a copy of the viewer record as it is now.
    pub async fn send_friend_request(&self, target_id: &str) -> Result<FriendRequest> {
        self.latency().simulate(Operation::SendFriendRequest).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;

        if target_id == viewer.id {
            return Err(StoreError::CannotBefriendSelf);
        }
        if state.find_user(target_id).is_none() {
            return Err(StoreError::UserNotFound(target_id.to_string()));
        }
        if state.are_friends(&viewer.id, target_id) {
            return Err(StoreError::AlreadyFriends);
        }
        if state.has_pending_request(&viewer.id, target_id) {
            return Err(StoreError::RequestAlreadySent);
        }

        let request = FriendRequest {
            id: (state.requests.len() + 1).to_string(),
            sender_id: viewer.id.clone(),
            receiver_id: target_id.to_string(),
            status: RequestStatus::Pending,
            created_at: self.clock().now(),
            sender: viewer,
        };
        state.requests.push(request.clone());

        log::info!(
            "Friend request {} sent from {} to {}",
            request.id,
            request.sender_id,
            request.receiver_id
        );
        Ok(request)
    }

    /// Accept a pending request addressed to the viewer and link both users
    pub async fn accept_friend_request(&self, request_id: &str) -> Result<()> {
        self.latency().simulate(Operation::AcceptFriendRequest).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;

        let request = state
            .requests
            .iter_mut()
            .find(|r| r.id == request_id && r.receiver_id == viewer.id && r.is_pending())
            .ok_or(StoreError::RequestNotFound)?;
        request.status = RequestStatus::Accepted;
        let sender_id = request.sender_id.clone();

        state.link_friends(&viewer.id, &sender_id);

        log::info!("Friend request {} accepted by {}", request_id, viewer.id);
        Ok(())
    }
}
