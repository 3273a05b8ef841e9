//! Phase resolution.
//!
//! Each resolver is a priority-ordered decision table: conditions are tested
//! top to bottom and the first match wins. Resolvers are total and pure, so a
//! phase is recomputed from a fresh snapshot on every call and never stored.
//!
//! - [`admin`]: may the connected wallet use the admin surface?
//! - [`participation`]: what should the survey's main button do?
//! - [`submission`]: what overlay does the answer submission flow show?
//! - [`button`]: UI directive and handler binding per button phase.

pub mod admin;
pub mod button;
pub mod error;
pub mod participation;
pub mod submission;

pub use admin::{resolve_admin_auth_phase, AdminAuthEffect, AdminAuthInput, AdminAuthPhase};
pub use button::{button_config, button_directive, ButtonAction, ButtonConfig, ButtonDirective, ButtonHandlers};
pub use error::PhaseError;
pub use participation::{resolve_participation_phase, ButtonPhase, ParticipationInput};
pub use submission::{submission_phase_config, SubmissionFlow, SubmissionPhase, SubmissionPhaseConfig};
