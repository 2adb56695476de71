//! Chat sessions: the in-memory model, title derivation, and the
//! controller that runs one user turn at a time.

pub mod controller;
pub mod model;
pub mod title;
