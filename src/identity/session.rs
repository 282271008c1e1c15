//! File-backed identity provider.
//!
//! `session.json` holds the signed-in identity, its credential and the
//! `needs_initial_sync` flag; `remote_stores.json` maps identities to their
//! remote handle and survives logout.

use crate::errors::AppResult;
use crate::identity::{Identity, IdentityProvider};
use crate::remote::{Credential, RemoteHandle};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const SESSION_FILE: &str = "session.json";
pub const REMOTE_STORES_FILE: &str = "remote_stores.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Session {
    identity: Identity,
    credential: Credential,
    #[serde(default)]
    needs_initial_sync: bool,
}

type RemoteStores = BTreeMap<Identity, RemoteHandle>;

pub struct FileIdentityProvider {
    dir: PathBuf,
    // read-modify-write of the two files
    lock: Mutex<()>,
}

impl FileIdentityProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn stores_path(&self) -> PathBuf {
        self.dir.join(REMOTE_STORES_FILE)
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn load_session(&self) -> AppResult<Option<Session>> {
        read_json(&self.session_path())
    }

    fn load_stores(&self) -> AppResult<RemoteStores> {
        Ok(read_json(&self.stores_path())?.unwrap_or_default())
    }
}

impl IdentityProvider for FileIdentityProvider {
    /// Start a session, replacing any previous one. The initial-sync flag is
    /// reset; linking sets it again.
    fn sign_in(&self, identity: &Identity, credential: Credential) -> AppResult<()> {
        let _g = self.guard();
        let session = Session {
            identity: identity.clone(),
            credential,
            needs_initial_sync: false,
        };
        write_json(&self.session_path(), &session)
    }

    /// End the session. Returns the identity that was signed in.
    fn sign_out(&self) -> AppResult<Option<Identity>> {
        let _g = self.guard();
        let previous = self.load_session()?.map(|s| s.identity);
        let path = self.session_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(previous)
    }

    fn current_identity(&self) -> AppResult<Option<Identity>> {
        let _g = self.guard();
        Ok(self.load_session()?.map(|s| s.identity))
    }

    fn credential_for(&self, identity: &Identity) -> AppResult<Option<Credential>> {
        let _g = self.guard();
        Ok(self
            .load_session()?
            .filter(|s| &s.identity == identity)
            .map(|s| s.credential))
    }

    fn remote_handle_for(&self, identity: &Identity) -> AppResult<Option<RemoteHandle>> {
        let _g = self.guard();
        Ok(self.load_stores()?.remove(identity))
    }

    fn bind_remote_handle(&self, identity: &Identity, handle: &RemoteHandle) -> AppResult<()> {
        let _g = self.guard();
        let mut stores = self.load_stores()?;
        stores.insert(identity.clone(), handle.clone());
        write_json(&self.stores_path(), &stores)
    }

    fn needs_initial_sync(&self) -> AppResult<bool> {
        let _g = self.guard();
        Ok(self
            .load_session()?
            .map(|s| s.needs_initial_sync)
            .unwrap_or(false))
    }

    fn set_needs_initial_sync(&self, value: bool) -> AppResult<()> {
        let _g = self.guard();
        if let Some(mut session) = self.load_session()? {
            session.needs_initial_sync = value;
            write_json(&self.session_path(), &session)?;
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
