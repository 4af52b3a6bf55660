//! Domain layer containing the core types of the bridge.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, host events, errors)
//! - `correlation` - Pending calls and the subscription index they wait in
//! - `connection` - Persistent connection phases and wire frames

pub mod connection;
pub mod correlation;
pub mod foundation;
