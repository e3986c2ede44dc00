//! In-memory mesh model and triangulation helpers

pub(crate) mod topology;
mod types;

pub use types::{Mesh, PointArray, SourceGroup};
