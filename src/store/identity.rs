/// Identity operations: login, registration, logout, and the current user.
use super::models::User;
use super::{ChatState, ChatStore};
use crate::error::{Result, StoreError};
use crate::latency::Operation;

impl ChatStore {
    /// Log in by email. The password is accepted as given.
    pub async fn login(&self, email: &str, _password: &str) -> Result<User> {
        self.latency().simulate(Operation::Login).await;
        let mut state = self.lock().await;

        let user = state
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)?;

        state.set_current_user(user.clone())?;
        log::info!("User {} logged in", user.username);
        Ok(user)
    }

    /// Create a user and log them in
    pub async fn register(&self, username: &str, email: &str, _password: &str) -> Result<User> {
        self.latency().simulate(Operation::Register).await;
        let mut state = self.lock().await;

        if state
            .users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(StoreError::UserExists);
        }

        // Directory changes only after the slot write succeeds
        let user = User::new(&(state.users.len() + 1).to_string(), username, email, true);
        state.set_current_user(user.clone())?;
        state.users.push(user.clone());

        log::info!("Registered user {} with id {}", user.username, user.id);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.latency().simulate(Operation::Logout).await;
        let mut state = self.lock().await;

        state.session.clear_current_user()?;
        if let Some(user) = state.current_user.take() {
            log::info!("User {} logged out", user.username);
        }
        Ok(())
    }

    /// The logged-in user.
    ///
    /// Falls back to the session slot, then to the first directory entry,
    /// which is then persisted. `None` only when the directory is empty.
    pub async fn current_user(&self) -> Result<Option<User>> {
        let mut state = self.lock().await;
        state.resolve_current_user()
    }

    /// Like [`ChatStore::current_user`], failing with `NotAuthenticated`
    pub async fn require_current_user(&self) -> Result<User> {
        self.current_user()
            .await?
            .ok_or(StoreError::NotAuthenticated)
    }
}

impl ChatState {
    fn set_current_user(&mut self, user: User) -> Result<()> {
        self.session.save_current_user(&user)?;
        self.current_user = Some(user);
        Ok(())
    }

    pub(crate) fn resolve_current_user(&mut self) -> Result<Option<User>> {
        if let Some(user) = &self.current_user {
            return Ok(Some(user.clone()));
        }

        if let Some(user) = self.session.load_current_user()? {
            log::debug!("Restored user {} from session slot", user.username);
            self.current_user = Some(user.clone());
            return Ok(Some(user));
        }

        let Some(default_user) = self.users.first().cloned() else {
            return Ok(None);
        };
        log::info!("No session, signing in default user {}", default_user.username);
        self.set_current_user(default_user.clone())?;
        Ok(Some(default_user))
    }

    /// Current user for operations that need a viewer
    pub(crate) fn viewer(&mut self) -> Result<User> {
        self.resolve_current_user()?
            .ok_or(StoreError::NotAuthenticated)
    }
}
