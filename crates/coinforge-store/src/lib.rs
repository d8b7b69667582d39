//! Per-owner persistence of generated projects
//!
//! Projects are stored as one JSON document each under the coinforge
//! home directory. Identifiers are sanitized before they become path
//! components; see [`ProjectId`].

mod project_id;
mod store;

pub use project_id::ProjectId;
pub use store::{Project, ProjectStore};
