//! In-memory protocol peer.

use std::collections::BTreeMap;
use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard, PoisonError};

use hkbridge_app::ports::ProtocolPeer;
use hkbridge_domain::accessory::CharacteristicChange;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::id::{AccessoryId, ClientId};
use hkbridge_domain::pairing::ClientPublicKey;

use crate::error::VirtualError;

/// Ed25519 long-term public keys are 32 bytes.
const PUBLIC_KEY_LEN: usize = 32;

/// Protocol peer that keeps pairings and pushed values in memory.
#[derive(Default)]
pub struct VirtualPeer {
    clients: Mutex<BTreeMap<ClientId, ClientPublicKey>>,
    pushed: Mutex<Vec<(AccessoryId, Vec<CharacteristicChange>)>>,
}

impl VirtualPeer {
    #[must_use]
    pub fn paired_clients(&self) -> Vec<ClientId> {
        lock(&self.clients).keys().cloned().collect()
    }

    /// Every notification pushed so far, oldest first.
    #[must_use]
    pub fn pushed(&self) -> Vec<(AccessoryId, Vec<CharacteristicChange>)> {
        lock(&self.pushed).clone()
    }

    fn try_pair(&self, client: &ClientId, key: &ClientPublicKey) -> Result<(), VirtualError> {
        let len = key.as_bytes().len();
        if len != PUBLIC_KEY_LEN {
            return Err(VirtualError::InvalidPublicKey(len));
        }
        lock(&self.clients).insert(client.clone(), key.clone());
        tracing::debug!(%client, "virtual peer paired");
        Ok(())
    }

    fn try_unpair(&self, client: &ClientId) -> Result<(), VirtualError> {
        lock(&self.clients)
            .remove(client)
            .map(|_| tracing::debug!(%client, "virtual peer unpaired"))
            .ok_or_else(|| VirtualError::UnknownClient(client.clone()))
    }
}

impl ProtocolPeer for VirtualPeer {
    fn pair(
        &self,
        client: &ClientId,
        key: &ClientPublicKey,
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        ready(self.try_pair(client, key).map_err(VirtualError::into_domain))
    }

    fn unpair(&self, client: &ClientId) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        ready(self.try_unpair(client).map_err(VirtualError::into_domain))
    }

    fn notify(
        &self,
        aid: AccessoryId,
        changes: &[CharacteristicChange],
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        for change in changes {
            tracing::info!(%aid, characteristic = %change.characteristic, value = %change.value, "characteristic changed");
        }
        lock(&self.pushed).push((aid, changes.to_vec()));
        ready(Ok(()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
