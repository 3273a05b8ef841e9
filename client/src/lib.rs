//! HTTP access to the eligibility service.
//!
//! Endpoints (all `GET`, JSON bodies in camelCase):
//! - `{base}/surveys/{id}/eligibility?walletAddress={wallet}` → aggregate verdict
//! - `{base}/surveys/{id}/allowlist/{wallet}` → `{listed, reason?}`
//! - `{base}/reputation/{wallet}` → score and humanity-proof status

pub mod client;
pub mod error;

pub use client::EligibilityClient;
pub use error::{error_for_status, error_for_transport};
