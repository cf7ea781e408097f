//! # hkbridge-domain
//!
//! Pure domain model for the hkbridge accessory bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (snapshots of upstream state holders)
//! - Define **Events** (state changes, service calls, time ticks)
//! - Define **Services** (upstream action requests: `turn_on`, `lock`, …)
//! - Define **Accessories** (identity, category, characteristic set)
//! - Define **Pairing** state (setup code, setup id, paired clients)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod accessory;
pub mod entity;
pub mod event;
pub mod pairing;
pub mod service;
