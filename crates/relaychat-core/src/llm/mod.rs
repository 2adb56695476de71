//! Relay dispatch for relaychat.
//!
//! This module defines the transport port and the engine that walks a
//! ranked candidate list:
//! - `RelayTransport`: RPITIT trait for concrete relay clients
//! - `BoxRelayTransport`: object-safe wrapper for dynamic dispatch
//! - `DispatchEngine`: sequential fallback with a per-attempt timeout
//! - `CandidateStats`: observational per-model call statistics

pub mod box_transport;
pub mod dispatch;
pub mod stats;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;
