use crate::client::ClientError;
use crate::dto::auth_dto::UserResponse;
use crate::model::user::UserRole;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Session {
    token: Option<String>,
    user: Option<UserResponse>,
}

/// Token and cached user for one client. `open` loads it, `clear` tears it down;
/// nothing else touches the backing file.
#[derive(Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    state: RwLock<Session>,
}

impl SessionStore {
    /// Loads a session persisted at `path`, or starts empty when the file does not exist
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref().to_path_buf();
        let session = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), authenticated = session.token.is_some(), "Session opened");
        Ok(SessionStore { path: Some(path), state: RwLock::new(session) })
    }

    pub fn in_memory() -> Self {
        SessionStore { path: None, state: RwLock::new(Session::default()) }
    }

    pub fn set(&self, token: String, user: UserResponse) -> Result<(), ClientError> {
        let mut state = self.write();
        state.token = Some(token);
        state.user = Some(user);
        self.persist(&state)
    }

    pub fn set_user(&self, user: UserResponse) -> Result<(), ClientError> {
        let mut state = self.write();
        state.user = Some(user);
        self.persist(&state)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        *self.write() = Session::default();
        if let Some(path) = &self.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<UserResponse> {
        self.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().token.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(|u| u.role == UserRole::Admin)
    }

    fn persist(&self, state: &Session) -> Result<(), ClientError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, serde_json::to_vec_pretty(state)?)?;
        }
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
