//! Infrastructure adapters. Implement outbound ports.
//!
//! Catalog backends and clocks. Map errors to DomainError.

pub mod clock;
pub mod persistence;

pub use clock::{FixedClock, SystemClock};
