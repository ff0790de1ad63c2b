/// Directory lookups over the user roster.
use super::models::{User, UserView};
use super::ChatStore;
use crate::error::Result;
use crate::latency::Operation;

impl ChatStore {
    /// Case-insensitive username search, excluding the viewer.
    ///
    /// `is_friend` and `request_sent` are computed against the current
    /// relationship state on every call.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserView>> {
        self.latency().simulate(Operation::SearchUsers).await;
        let mut state = self.lock().await;
        let viewer = state.viewer()?;
        let needle = query.to_lowercase();

        let results: Vec<UserView> = state
            .users
            .iter()
            .filter(|u| u.id != viewer.id && u.username.to_lowercase().contains(&needle))
            .map(|u| UserView {
                user: u.clone(),
                is_friend: state.are_friends(&viewer.id, &u.id),
                request_sent: state.has_pending_request(&viewer.id, &u.id),
            })
            .collect();

        log::debug!("Search {:?} by {} matched {} users", query, viewer.id, results.len());
        Ok(results)
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.latency().simulate(Operation::GetUserById).await;
        let state = self.lock().await;
        Ok(state.find_user(id).cloned())
    }
}
