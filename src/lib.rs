//! Host Bridge - awaitable calls over a callback-driven host.
//!
//! This crate turns host operations whose results arrive as later event
//! notifications into plain request/response calls, and pushes host events
//! to a remote endpoint over a persistent, auto-reconnecting WebSocket.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
