//! Explicit session/auth state.
//!
//! One `SessionContext` is created per client and injected into the gateway
//! and services that need the signed-in user. It has an explicit
//! `initialize`/`teardown` lifecycle.

use chrono::Utc;
use log::{debug, info, warn};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::session_model::{Profile, ProfileUpdate, Session, SignUp, User};
use super::session_traits::AuthGateway;
use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    profile: Option<Profile>,
    initialized: bool,
}

#[derive(Debug, Default)]
pub struct SessionContext {
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a previously persisted session, if any.
    ///
    /// The session is verified against the auth service and the profile is
    /// loaded. Verification failures leave the context initialised but signed
    /// out rather than failing startup.
    pub async fn initialize(
        &self,
        auth: &dyn AuthGateway,
        restored: Option<Session>,
    ) -> Result<()> {
        let session = match restored {
            Some(session) if session.is_expired(Utc::now()) => {
                info!("[Session] Restored session has expired");
                None
            }
            Some(session) => match auth.get_user(&session.access_token).await {
                Ok(user) => Some(Session { user, ..session }),
                Err(err) => {
                    warn!("[Session] Discarding restored session: {}", err);
                    None
                }
            },
            None => None,
        };

        let signed_in = session.is_some();
        {
            let mut state = self.write_state();
            state.session = session;
            state.profile = None;
            state.initialized = true;
        }

        if signed_in {
            if let Err(err) = self.refresh_profile(auth).await {
                warn!("[Session] Failed to load profile: {}", err);
            }
        }
        debug!("[Session] Initialized (signed in: {})", signed_in);
        Ok(())
    }

    /// Drops all session state. The context must be initialised again
    /// before use.
    pub fn teardown(&self) {
        *self.write_state() = SessionState::default();
        debug!("[Session] Torn down");
    }

    pub async fn sign_in(
        &self,
        auth: &dyn AuthGateway,
        email: &str,
        password: &str,
    ) -> Result<User> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(ValidationError::InvalidInput("Password is required".to_string()).into());
        }

        let session = auth.sign_in_with_password(email.trim(), password).await?;
        let user = session.user.clone();
        self.set_session(session);
        info!("[Session] Signed in as {}", user.id);

        if let Err(err) = self.refresh_profile(auth).await {
            warn!("[Session] Failed to load profile: {}", err);
        }
        Ok(user)
    }

    /// Registers a new account. Returns the user when the backend issues a
    /// session immediately, `None` when email confirmation is pending.
    pub async fn sign_up(&self, auth: &dyn AuthGateway, sign_up: &SignUp) -> Result<Option<User>> {
        validate_email(&sign_up.email)?;
        if sign_up.password.len() < 6 {
            return Err(ValidationError::InvalidInput(
                "Password must be at least 6 characters".to_string(),
            )
            .into());
        }
        if sign_up.full_name.trim().is_empty() {
            return Err(ValidationError::InvalidInput("Full name is required".to_string()).into());
        }

        match auth.sign_up(sign_up).await? {
            Some(session) => {
                let user = session.user.clone();
                self.set_session(session);
                info!("[Session] Signed up as {}", user.id);
                Ok(Some(user))
            }
            None => {
                info!("[Session] Sign-up pending email confirmation");
                Ok(None)
            }
        }
    }

    /// Ends the session locally, and remotely when possible.
    pub async fn sign_out(&self, auth: &dyn AuthGateway) -> Result<()> {
        let token = self.access_token();
        {
            let mut state = self.write_state();
            state.session = None;
            state.profile = None;
        }
        if let Some(token) = token {
            auth.sign_out(&token).await?;
        }
        info!("[Session] Signed out");
        Ok(())
    }

    pub async fn reset_password(&self, auth: &dyn AuthGateway, email: &str) -> Result<()> {
        validate_email(email)?;
        auth.reset_password(email.trim()).await?;
        Ok(())
    }

    /// Reloads the profile of the signed-in user.
    pub async fn refresh_profile(&self, auth: &dyn AuthGateway) -> Result<Profile> {
        let session = self.session().ok_or(Error::NotAuthenticated)?;
        let profile = auth
            .get_profile(&session.access_token, &session.user.id)
            .await?;
        self.write_state().profile = Some(profile.clone());
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        auth: &dyn AuthGateway,
        update: &ProfileUpdate,
    ) -> Result<Profile> {
        let session = self.session().ok_or(Error::NotAuthenticated)?;
        if update.is_empty() {
            return Err(ValidationError::InvalidInput("Nothing to update".to_string()).into());
        }
        auth.update_profile(&session.access_token, &session.user.id, update)
            .await?;
        self.refresh_profile(auth).await
    }

    pub fn is_initialized(&self) -> bool {
        self.read_state().initialized
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().session.is_some()
    }

    pub fn session(&self) -> Option<Session> {
        self.read_state().session.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read_state().session.as_ref().map(|s| s.user.clone())
    }

    pub fn user_id(&self) -> Option<String> {
        self.read_state().session.as_ref().map(|s| s.user.id.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.read_state()
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn profile(&self) -> Option<Profile> {
        self.read_state().profile.clone()
    }

    /// The signed-in user, or [`Error::NotAuthenticated`].
    pub fn require_user(&self) -> Result<User> {
        self.user().ok_or(Error::NotAuthenticated)
    }

    fn set_session(&self, session: Session) {
        let mut state = self.write_state();
        state.session = Some(session);
        state.profile = None;
        state.initialized = true;
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidInput("Please enter a valid email address".to_string()).into())
    }
}
