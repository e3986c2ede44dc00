//! Geometry kinds and the group each kind lands in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visual kind of a piece of geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    /// Planar cut through a volume
    Slice,
    /// Closed or open boundary surface (default)
    Surface,
    /// Contour surface of a scalar field
    Isosurface,
    /// Polyline data (no polygons)
    Streamline,
}

type KeywordTable = &'static [(GeometryKind, &'static [&'static str])];

/// Keywords for point-data field names. Plane tags must be delimited
/// (`_xy_`) so names like `Oxygen` stay unclassified.
const FIELD_KEYWORDS: KeywordTable = &[
    (GeometryKind::Slice, &["slice", "plane", "_xy_", "_xz_", "_yz_"]),
    (GeometryKind::Surface, &["surface", "boundary", "internal"]),
    (GeometryKind::Isosurface, &["iso", "value", "level"]),
    (GeometryKind::Streamline, &["stream", "line", "seed"]),
];

/// Keywords for file and solid labels, which may carry a bare plane tag.
const LABEL_KEYWORDS: KeywordTable = &[
    (GeometryKind::Slice, &["slice", "plane", "xy", "xz", "yz"]),
    (GeometryKind::Surface, &["surface", "boundary", "internal"]),
    (GeometryKind::Isosurface, &["iso", "value", "level"]),
    (GeometryKind::Streamline, &["stream", "line", "seed"]),
];

fn match_keywords(table: KeywordTable, name: &str) -> Option<GeometryKind> {
    let lower = name.to_lowercase();
    table
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(kind, _)| *kind)
}

impl GeometryKind {
    /// All kinds in manifest group order.
    pub const ALL: [GeometryKind; 4] = [
        GeometryKind::Slice,
        GeometryKind::Surface,
        GeometryKind::Isosurface,
        GeometryKind::Streamline,
    ];

    /// Value written to `geomKind`.
    pub fn as_str(self) -> &'static str {
        match self {
            GeometryKind::Slice => "slice",
            GeometryKind::Surface => "surface",
            GeometryKind::Isosurface => "isosurface",
            GeometryKind::Streamline => "streamline",
        }
    }

    /// Id of the GeometryGroup that collects this kind.
    pub fn group_id(self) -> &'static str {
        match self {
            GeometryKind::Slice => "slices",
            GeometryKind::Surface => "surfaces",
            GeometryKind::Isosurface => "isosurfaces",
            GeometryKind::Streamline => "streamlines",
        }
    }

    /// Classify a file stem or solid name by keyword.
    ///
    /// Matching is case-insensitive and substring based; the first matching
    /// kind in slice, surface, isosurface, streamline order wins.
    pub fn from_label(label: &str) -> Option<GeometryKind> {
        match_keywords(LABEL_KEYWORDS, label)
    }

    /// Classify a point-data field name by keyword.
    ///
    /// Same order as [`GeometryKind::from_label`], but `xy`/`xz`/`yz` only
    /// count when wrapped in underscores.
    pub fn from_field_name(name: &str) -> Option<GeometryKind> {
        match_keywords(FIELD_KEYWORDS, name)
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
