//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HkBridgeError`] via `#[from]`. Collaborator failures (protocol peer,
//! presenter) are carried as boxed sources.

use crate::id::AccessoryId;

/// Top-level error for the hkbridge workspace.
#[derive(Debug, thiserror::Error)]
pub enum HkBridgeError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("not implemented")]
    NotImplemented(#[from] NotImplementedError),

    #[error("duplicate identity")]
    DuplicateIdentity(#[from] DuplicateIdentityError),

    /// Failure reported by the accessory-protocol peer.
    #[error("protocol peer error")]
    Protocol(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Failure reported by the presentation collaborator.
    #[error("presentation error")]
    Presentation(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("invalid entity id {0:?}, expected `domain.object_id`")]
    InvalidEntityId(String),

    #[error("invalid pin code {0:?}, expected `XXX-XX-XXX`")]
    InvalidPinCode(String),

    #[error("pin code {0} is too easy to guess")]
    TrivialPinCode(String),

    #[error("invalid setup id {0:?}, expected 4 alphanumeric characters")]
    InvalidSetupId(String),

    #[error("accessory id {0} is reserved for the bridge")]
    ReservedAccessoryId(AccessoryId),

    #[error("characteristic {0} is read-only")]
    ReadOnlyCharacteristic(String),

    #[error("characteristic {characteristic} does not accept {value}")]
    InvalidCharacteristicValue { characteristic: String, value: String },

    #[error("entity {0} is already bound to an accessory")]
    EntityAlreadyBound(String),

    #[error("bridge is full ({max} accessories)")]
    BridgeFull { max: usize },
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An operation was requested of a kind that provides no implementation.
#[derive(Debug, thiserror::Error)]
#[error("{operation} is not implemented for {kind}")]
pub struct NotImplementedError {
    pub operation: &'static str,
    pub kind: String,
}

/// An accessory id collided with one already registered.
#[derive(Debug, thiserror::Error)]
#[error("accessory id {aid} is already registered")]
pub struct DuplicateIdentityError {
    pub aid: AccessoryId,
}
