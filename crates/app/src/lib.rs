//! # hkbridge-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `EventPublisher` — put events back on the upstream bus
//!   - `ProtocolPeer` — pairing and characteristic transport
//!   - `Presenter` — show / dismiss the setup message
//!   - `Clock` — injected time source
//! - Provide the **Debounced Dispatcher** and the **accessory types**
//!   mapping entity domains to characteristics
//! - Provide the use-cases: accessory state adapter (`HomeAccessory`),
//!   bridge registry (`HomeBridge`), pairing driver (`HomeDriver`) and the
//!   loop tying them together (`BridgeRuntime`)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `hkbridge-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod accessories;
pub mod bridge;
pub mod debounce;
pub mod driver;
pub mod event_bus;
pub mod home_accessory;
pub mod ports;
pub mod runtime;

#[cfg(test)]
mod test_support;
