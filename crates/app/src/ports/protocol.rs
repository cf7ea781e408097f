//! Protocol peer port — the accessory-protocol library.
//!
//! The peer owns wire-level pairing, characteristic transport and
//! persistence. The core only delegates to it; failures propagate
//! unchanged.

use std::future::Future;

use hkbridge_domain::accessory::CharacteristicChange;
use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::id::{AccessoryId, ClientId};
use hkbridge_domain::pairing::ClientPublicKey;

pub trait ProtocolPeer {
    /// Complete a pairing with `client`.
    fn pair(
        &self,
        client: &ClientId,
        key: &ClientPublicKey,
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send;

    /// Remove the pairing for `client`.
    fn unpair(&self, client: &ClientId) -> impl Future<Output = Result<(), HkBridgeError>> + Send;

    /// Push characteristic values of accessory `aid` to subscribed clients.
    fn notify(
        &self,
        aid: AccessoryId,
        changes: &[CharacteristicChange],
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send;
}

impl<T: ProtocolPeer + Send + Sync> ProtocolPeer for std::sync::Arc<T> {
    fn pair(
        &self,
        client: &ClientId,
        key: &ClientPublicKey,
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        (**self).pair(client, key)
    }

    fn unpair(&self, client: &ClientId) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        (**self).unpair(client)
    }

    fn notify(
        &self,
        aid: AccessoryId,
        changes: &[CharacteristicChange],
    ) -> impl Future<Output = Result<(), HkBridgeError>> + Send {
        (**self).notify(aid, changes)
    }
}
