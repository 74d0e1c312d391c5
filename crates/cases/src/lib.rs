//! `caseworks-cases` — case domain (pure, no IO).

pub mod case;

pub use case::{Case, CaseId, CasePriority, CaseStatus, UpdateCase};
