//! Small VTK/VTP/STL files for integration tests.

#![allow(dead_code)]

use std::io;
use std::path::Path;

/// Unit quad in the z=0 plane with a `pressure` and a `slice_z` field.
pub const QUAD_VTK: &str = "\
# vtk DataFile Version 3.0
quad
ASCII
DATASET POLYDATA
POINTS 4 float
0 0 0 1 0 0 1 1 0 0 1 0
POLYGONS 1 5
4 0 1 2 3
POINT_DATA 4
SCALARS pressure float 1
LOOKUP_TABLE default
0.0 0.5 1.0 1.5
SCALARS slice_z float
LOOKUP_TABLE default
0 0 0 0
";

/// Tetrahedron with no classifiable field.
pub const TETRA_VTK: &str = "\
# vtk DataFile Version 3.0
tetra
ASCII
DATASET POLYDATA
POINTS 4 float
0 0 0 1 0 0 0 1 0 0 0 1
POLYGONS 4 16
3 0 2 1
3 0 1 3
3 1 2 3
3 0 3 2
";

/// Single point, no cells.
pub const POINT_VTK: &str = "\
# vtk DataFile Version 3.0
point
ASCII
DATASET POLYDATA
POINTS 1 float
1 2 3
";

/// Triangle referencing point 5 of 3.
pub const BAD_INDEX_VTK: &str = "\
# vtk DataFile Version 3.0
bad
ASCII
DATASET POLYDATA
POINTS 3 float
0 0 0 1 0 0 0 1 0
POLYGONS 1 4
3 0 1 5
";

/// Two polylines, no polygons.
pub const STREAMLINES_VTP: &str = r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="1.0" byte_order="LittleEndian" header_type="UInt64">
  <PolyData>
    <Piece NumberOfPoints="5" NumberOfLines="2">
      <PointData>
        <DataArray type="Float64" Name="speed" format="ascii">1 2 3 4 5</DataArray>
      </PointData>
      <Points>
        <DataArray type="Float32" NumberOfComponents="3" format="ascii">
          0 0 0 1 0.5 0.2 2 1 0.4 0 1 1 1 2 2
        </DataArray>
      </Points>
      <Lines>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3 4</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">3 5</DataArray>
      </Lines>
    </Piece>
  </PolyData>
</VTKFile>
"#;

/// Two named solids.
pub const PARTS_STL: &str = "\
solid outlet_plane
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 1 1 0
    endloop
  endfacet
endsolid outlet_plane
solid hull
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 1
      vertex 0 1 2
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 1
      vertex 1 1 0
      vertex 0 1 2
    endloop
  endfacet
endsolid hull
";

pub fn write(path: &Path, contents: &str) -> io::Result<()> {
    std::fs::write(path, contents)
}
