//! Associating an identity with its remote store.

use crate::errors::AppResult;
use crate::identity::{Identity, IdentityProvider};
use crate::remote::{Credential, RemoteConnector, RemoteHandle, RemoteStore};
use std::sync::Arc;
use tracing::{info, warn};

/// An identity with a credential and the remote store it writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLink {
    pub identity: Identity,
    pub credential: Credential,
    pub handle: RemoteHandle,
}

impl RemoteLink {
    pub fn open(&self, connector: &dyn RemoteConnector) -> AppResult<Arc<dyn RemoteStore>> {
        connector.open(&self.credential, &self.handle)
    }
}

/// How the remote store of a fresh link was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSource {
    /// the mapped handle could still be opened
    Reused,
    /// no usable handle: a new store was created and bound
    Provisioned,
}

/// Resolve the remote store for `identity`: reuse the mapped handle while
/// the connector can open it, otherwise provision a new one and update the
/// mapping. Either way the identity is flagged for an initial sync.
pub fn link_identity(
    provider: &dyn IdentityProvider,
    connector: &dyn RemoteConnector,
    identity: &Identity,
    credential: &Credential,
) -> AppResult<(RemoteLink, LinkSource)> {
    let reusable = match provider.remote_handle_for(identity)? {
        Some(handle) => match connector.open(credential, &handle) {
            Ok(_) => Some(handle),
            Err(e) => {
                warn!(%identity, %handle, error = %e, "mapped remote store unavailable, provisioning a new one");
                None
            }
        },
        None => None,
    };

    let (handle, source) = match reusable {
        Some(handle) => (handle, LinkSource::Reused),
        None => {
            let handle = connector.provision(credential)?;
            provider.bind_remote_handle(identity, &handle)?;
            (handle, LinkSource::Provisioned)
        }
    };

    provider.set_needs_initial_sync(true)?;
    info!(%identity, %handle, ?source, "remote store linked");

    Ok((
        RemoteLink {
            identity: identity.clone(),
            credential: credential.clone(),
            handle,
        },
        source,
    ))
}

/// The link of the signed-in identity, if it has a credential and a mapped store.
pub fn current_link(provider: &dyn IdentityProvider) -> AppResult<Option<RemoteLink>> {
    let Some(identity) = provider.current_identity()? else {
        return Ok(None);
    };
    let Some(credential) = provider.credential_for(&identity)? else {
        return Ok(None);
    };
    let Some(handle) = provider.remote_handle_for(&identity)? else {
        return Ok(None);
    };
    Ok(Some(RemoteLink {
        identity,
        credential,
        handle,
    }))
}

