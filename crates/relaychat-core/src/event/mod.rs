//! Event distribution for presentation adapters.

pub mod bus;
