//! Identity/Credential collaborator and the identity → storage registry.

pub mod registry;
pub mod session;

use crate::errors::{AppError, AppResult};
use crate::remote::{Credential, RemoteHandle};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use registry::StorageRegistry;
pub use session::FileIdentityProvider;

/// Opaque id of a signed-in user (an email address for the sheet backend).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(id: impl Into<String>) -> AppResult<Self> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(AppError::Other("identity must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is signed in, with which credential, and which remote store belongs to them.
pub trait IdentityProvider: Send + Sync {
    /// Start a session, replacing any previous one.
    fn sign_in(&self, identity: &Identity, credential: Credential) -> AppResult<()>;

    /// End the session. Returns who was signed in.
    fn sign_out(&self) -> AppResult<Option<Identity>>;

    fn current_identity(&self) -> AppResult<Option<Identity>>;

    fn credential_for(&self, identity: &Identity) -> AppResult<Option<Credential>>;

    fn remote_handle_for(&self, identity: &Identity) -> AppResult<Option<RemoteHandle>>;

    fn bind_remote_handle(&self, identity: &Identity, handle: &RemoteHandle) -> AppResult<()>;

    /// Set when a remote store gets associated, cleared by a completed migration.
    fn needs_initial_sync(&self) -> AppResult<bool>;

    fn set_needs_initial_sync(&self, value: bool) -> AppResult<()>;
}
