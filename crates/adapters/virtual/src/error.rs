//! Virtual adapter error types.

use hkbridge_domain::error::HkBridgeError;
use hkbridge_domain::id::ClientId;

/// Errors specific to the virtual adapters.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// A client presented a long-term public key of the wrong size.
    #[error("client public key must be 32 bytes, got {0}")]
    InvalidPublicKey(usize),

    /// Unpair was requested for a client that never paired.
    #[error("client {0} is not paired")]
    UnknownClient(ClientId),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] HkBridgeError),
}

impl VirtualError {
    /// Convert into a [`HkBridgeError::Protocol`] for propagation across
    /// port boundaries.
    pub fn into_domain(self) -> HkBridgeError {
        match self {
            Self::Domain(err) => err,
            other => HkBridgeError::Protocol(Box::new(other)),
        }
    }
}

impl From<VirtualError> for HkBridgeError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_invalid_public_key() {
        let err = VirtualError::InvalidPublicKey(12);
        assert_eq!(err.to_string(), "client public key must be 32 bytes, got 12");
    }

    #[test]
    fn should_convert_to_protocol_error() {
        let err: HkBridgeError = VirtualError::UnknownClient(ClientId::new("phone")).into();
        assert!(matches!(err, HkBridgeError::Protocol(_)));
    }

    #[test]
    fn should_convert_domain_error_back_to_domain() {
        let domain_err =
            HkBridgeError::Validation(hkbridge_domain::error::ValidationError::EmptyName);
        let back: HkBridgeError = VirtualError::Domain(domain_err).into();
        assert!(matches!(back, HkBridgeError::Validation(_)));
    }
}
