//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, eligibility service) are abstracted behind
//! traits or plain inputs. This crate provides test-friendly implementations
//! that:
//! - Return scripted, deterministic values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap the HTTP client for [`NullBackend`] in tests.

pub mod backend;
pub mod clock;

pub use backend::NullBackend;
pub use clock::NullClock;
