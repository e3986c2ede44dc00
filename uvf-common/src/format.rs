//! UVF output layout constants.
//!
//! `UvfLayout` is the single source of truth for file names and directory
//! names inside a UVF output directory, and for the input extensions that
//! directory conversion picks up.
//!
//! # Example
//!
//! ```
//! use uvf_common::UVF_LAYOUT;
//!
//! assert_eq!(UVF_LAYOUT.manifest_file, "manifest.json");
//! assert_eq!(UVF_LAYOUT.member_buffer_path("slice_xy"), "resources/uvf/slice_xy.bin");
//! assert!(UVF_LAYOUT.is_batch_input("VTP"));
//! ```

/// Layout of a UVF output directory.
#[derive(Debug, Clone, Copy)]
pub struct UvfLayout {
    /// Manifest file name at the output root
    pub manifest_file: &'static str,

    /// Single buffer written by basic mode, relative to the output root
    pub basic_buffer_file: &'static str,

    /// Directory holding one buffer per member, relative to the output root
    pub resources_dir: &'static str,

    /// Buffer file extension without dot
    pub buffer_ext: &'static str,

    /// Input extensions (lowercase, without dot) picked up by directory mode
    pub batch_extensions: &'static [&'static str],
}

impl UvfLayout {
    /// Relative path of a member buffer, as written into the manifest.
    pub fn member_buffer_path(&self, member: &str) -> String {
        format!("{}/{}.{}", self.resources_dir, member, self.buffer_ext)
    }

    /// Whether an extension (any case, without dot) is a directory-mode input.
    pub fn is_batch_input(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.batch_extensions.iter().any(|e| *e == ext)
    }
}

/// UVF layout used by every writer.
pub const UVF_LAYOUT: UvfLayout = UvfLayout {
    manifest_file: "manifest.json",
    basic_buffer_file: "uvf.bin",
    resources_dir: "resources/uvf",
    buffer_ext: "bin",
    batch_extensions: &["vtk", "vtp"],
};

/// Identity transform stored on the root group (column-major 4x4).
pub const IDENTITY_TRANSFORM: [f32; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Id of the top-level GeometryGroup in every manifest.
pub const ROOT_GROUP_ID: &str = "root_group";

/// Face color used for every generated face (0xFFFFFF).
pub const DEFAULT_FACE_COLOR: u32 = 0xFF_FF_FF;
