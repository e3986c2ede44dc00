//! Shared types for the UVF (unified voxel/mesh format) tools
//!
//! This crate holds everything that describes a UVF output directory,
//! independent of how the geometry was read:
//!
//! - [`format`] - Output layout constants (file names, batch extensions)
//! - [`manifest`] - `manifest.json` node model
//! - [`buffers`] - Binary buffer sections and the builder that writes them
//! - [`kind`] - Geometry kinds and label classification

pub mod buffers;
pub mod format;
pub mod kind;
pub mod manifest;

pub use buffers::{BufferBuilder, BufferSection, DataType, read_f32_section, read_u32_section};
pub use format::{
    DEFAULT_FACE_COLOR, IDENTITY_TRANSFORM, ROOT_GROUP_ID, UVF_LAYOUT, UvfLayout,
};
pub use kind::GeometryKind;
pub use manifest::{
    Attributions, BufferLocations, BufferResource, IndexRange, ManifestNode, NodeKind,
    NodeProperties, Resources,
};
