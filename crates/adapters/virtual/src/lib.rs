//! # hkbridge-adapter-virtual
//!
//! In-process collaborators for running the bridge without a real home
//! automation system or a real accessory-protocol stack.
//!
//! | Adapter | Port | Behaviour |
//! |---------|------|-----------|
//! | [`VirtualPeer`] | `ProtocolPeer` | Keeps paired clients and pushed characteristics in memory |
//! | [`LogPresenter`] | `Presenter` | Logs the setup code and URI through `tracing` |
//! | [`VirtualHome`] | upstream bus | Demo entities that react to `CallService` events |
//!
//! ## Demo entities
//!
//! | Entity ID | Services |
//! |-----------|----------|
//! | `switch.virtual_switch` | `turn_on` / `turn_off` / `toggle` |
//! | `light.virtual_light` | `turn_on` (optional `brightness_pct`) / `turn_off` / `toggle` |
//! | `lock.virtual_lock` | `lock` / `unlock` |
//! | `sensor.virtual_temperature` | read-only |
//! | `binary_sensor.virtual_door` | read-only |
//!
//! ## Dependency rule
//!
//! Depends on `hkbridge-app` (port traits) and `hkbridge-domain` only.

pub mod error;
mod home;
mod peer;
mod presenter;

pub use error::VirtualError;
pub use home::VirtualHome;
pub use peer::VirtualPeer;
pub use presenter::LogPresenter;
