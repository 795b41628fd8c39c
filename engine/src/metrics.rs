//! Segment Metrics
//!
//! Summary geometry of a segment mesh, used to place and orient a segment
//! before its fields are loaded:
//!
//! - total surface area (sum of triangle areas),
//! - centre (mean vertex) and mean vertex normal,
//! - the two principal in-plane axes: vertices are projected onto the plane
//!   orthogonal to the mean normal, a 2x2 sample covariance is diagonalized,
//!   and its eigenvectors are mapped back to 3D.
//!
//! Reported values are rounded to 5 decimals.

use std::io::BufRead;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::MetricsError;

/// Vertices, normals and triangles of a Wavefront OBJ file.
///
/// Polygons are fan-triangulated. Texture coordinates, groups and
/// materials are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjMesh {
    pub vertices: Vec<DVec3>,
    pub normals: Vec<DVec3>,
    pub triangles: Vec<[usize; 3]>,
}

/// Read an OBJ mesh.
pub fn parse_obj<R: BufRead>(reader: R) -> Result<ObjMesh, MetricsError> {
    let mut mesh = ObjMesh::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => mesh.vertices.push(parse_vec3(parts, line_no)?),
            Some("vn") => mesh.normals.push(parse_vec3(parts, line_no)?),
            Some("f") => {
                let corners = parts
                    .map(|p| face_index(p, mesh.vertices.len(), line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                if corners.len() < 3 {
                    return Err(MetricsError::Parse {
                        line: line_no,
                        reason: format!("face with {} vertices", corners.len()),
                    });
                }
                for i in 1..corners.len() - 1 {
                    mesh.triangles.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    log::debug!(
        "[Metrics] OBJ: {} vertices, {} normals, {} triangles",
        mesh.vertices.len(),
        mesh.normals.len(),
        mesh.triangles.len()
    );
    Ok(mesh)
}

fn parse_vec3<'a>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<DVec3, MetricsError> {
    let values = parts
        .take(3)
        .map(|p| {
            p.parse::<f64>().map_err(|e| MetricsError::Parse {
                line,
                reason: format!("'{p}': {e}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    match values.as_slice() {
        [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
        _ => Err(MetricsError::Parse {
            line,
            reason: format!("expected 3 components, got {}", values.len()),
        }),
    }
}

/// Zero-based vertex index of a face corner (`v`, `v/vt`, `v//vn`, `v/vt/vn`).
/// Negative indices count back from the last vertex read so far.
fn face_index(corner: &str, vertex_count: usize, line: usize) -> Result<usize, MetricsError> {
    let raw = corner.split('/').next().unwrap_or_default();
    let index: i64 = raw.parse().map_err(|e| MetricsError::Parse {
        line,
        reason: format!("face index '{raw}': {e}"),
    })?;
    let resolved = match index {
        i if i > 0 => i - 1,
        i if i < 0 => vertex_count as i64 + i,
        _ => -1,
    };
    if resolved < 0 || resolved as usize >= vertex_count {
        return Err(MetricsError::Parse {
            line,
            reason: format!("face index {index} out of range for {vertex_count} vertices"),
        });
    }
    Ok(resolved as usize)
}

/// Metrics record written next to a segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    pub area: f64,
    /// Size `[width, height]` of the segment's texture, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tifsize: Option<[u32; 2]>,
    pub center: [f64; 3],
    pub normal: [f64; 3],
    /// Sample variances along the principal axes, largest first.
    pub eigenvalues: [f64; 2],
    /// Principal axes in 3D, matching `eigenvalues`.
    pub eigenvectors: [[f64; 3]; 2],
}

impl SegmentMetrics {
    /// Compute metrics for a mesh.
    pub fn compute(mesh: &ObjMesh) -> Result<Self, MetricsError> {
        if mesh.triangles.is_empty() || mesh.vertices.is_empty() {
            return Err(MetricsError::Empty);
        }

        let area = total_area(mesh);
        let center = mean(&mesh.vertices);
        let normal = if mesh.normals.is_empty() {
            face_normal(mesh)
        } else {
            mean(&mesh.normals)
        };

        let (u, v) = plane_basis(normal);
        let projected: Vec<DVec2> = mesh
            .vertices
            .iter()
            .map(|p| DVec2::new(p.dot(u), p.dot(v)))
            .collect();
        let (eigenvalues, axes) = principal_axes(&projected);
        let eigenvectors = axes.map(|a| u * a.x + v * a.y);

        log::info!(
            "[Metrics] area {:.3}, centre {:?}, eigenvalues {:?}",
            area,
            center,
            eigenvalues
        );

        Ok(Self {
            area: round5(area),
            tifsize: None,
            center: center.to_array().map(round5),
            normal: normal.to_array().map(round5),
            eigenvalues: eigenvalues.map(round5),
            eigenvectors: eigenvectors.map(|e| e.to_array().map(round5)),
        })
    }

    pub fn with_tifsize(mut self, width: u32, height: u32) -> Self {
        self.tifsize = Some([width, height]);
        self
    }
}

fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}

fn mean(points: &[DVec3]) -> DVec3 {
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}

fn triangle(mesh: &ObjMesh, t: &[usize; 3]) -> (DVec3, DVec3, DVec3) {
    (mesh.vertices[t[0]], mesh.vertices[t[1]], mesh.vertices[t[2]])
}

fn total_area(mesh: &ObjMesh) -> f64 {
    mesh.triangles
        .iter()
        .map(|t| {
            let (a, b, c) = triangle(mesh, t);
            0.5 * (b - a).cross(c - a).length()
        })
        .sum()
}

/// Area-weighted unit face normal, for meshes without `vn` records.
fn face_normal(mesh: &ObjMesh) -> DVec3 {
    mesh.triangles
        .iter()
        .map(|t| {
            let (a, b, c) = triangle(mesh, t);
            (b - a).cross(c - a)
        })
        .sum::<DVec3>()
        .normalize_or(DVec3::Z)
}

/// Orthonormal basis of the plane orthogonal to `normal`:
/// `u = n × x̂`, `v = n × u`.
fn plane_basis(normal: DVec3) -> (DVec3, DVec3) {
    let n = normal.normalize_or(DVec3::Z);
    let mut u = n.cross(DVec3::X);
    if u.length_squared() < 1e-12 {
        // normal along x
        u = n.cross(DVec3::Y);
    }
    let u = u.normalize();
    let v = n.cross(u).normalize();
    (u, v)
}

/// Eigen-decomposition of the 2x2 sample covariance of `points`.
///
/// Eigenvalues come largest first. Each eigenvector's component of largest
/// magnitude is made positive.
fn principal_axes(points: &[DVec2]) -> ([f64; 2], [DVec2; 2]) {
    let n = points.len();
    let centroid = points.iter().copied().sum::<DVec2>() / n as f64;
    let denom = (n.max(2) - 1) as f64;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let d = *p - centroid;
        sxx += d.x * d.x;
        sxy += d.x * d.y;
        syy += d.y * d.y;
    }
    let (a, b, c) = (sxx / denom, sxy / denom, syy / denom);

    let mid = 0.5 * (a + c);
    let radius = (0.25 * (a - c) * (a - c) + b * b).sqrt();
    let (l1, l2) = (mid + radius, mid - radius);

    let first = if b.abs() > 1e-12 {
        DVec2::new(l1 - c, b).normalize()
    } else if a >= c {
        DVec2::X
    } else {
        DVec2::Y
    };
    let second = DVec2::new(-first.y, first.x);

    ([l1, l2.max(0.0)], [orient(first), orient(second)])
}

fn orient(axis: DVec2) -> DVec2 {
    let dominant = if axis.x.abs() >= axis.y.abs() { axis.x } else { axis.y };
    if dominant < 0.0 { -axis } else { axis }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = "\
# unit square in the xy plane
v 0 0 0
v 2 0 0
v 2 1 0
v 0 1 0
vn 0 0 1
vn 0 0 1
vn 0 0 1
vn 0 0 1
f 1//1 2//2 3//3 4//4
";

    #[test]
    fn test_parse_fan_triangulates() {
        let mesh = parse_obj(SQUARE.as_bytes()).unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_parse_rejects_bad_index() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, MetricsError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_rectangle_metrics() {
        let mesh = parse_obj(SQUARE.as_bytes()).unwrap();
        let metrics = SegmentMetrics::compute(&mesh).unwrap();
        assert!((metrics.area - 2.0).abs() < 1e-9);
        assert_eq!(metrics.center, [1.0, 0.5, 0.0]);
        assert_eq!(metrics.normal, [0.0, 0.0, 1.0]);
        // variance along x: 4 * 1 / 3, along y: 4 * 0.25 / 3
        assert!((metrics.eigenvalues[0] - 1.33333).abs() < 1e-9);
        assert!((metrics.eigenvalues[1] - 0.33333).abs() < 1e-9);
        let major = metrics.eigenvectors[0];
        assert!((major[0].abs() - 1.0).abs() < 1e-9);
        assert!(major[1].abs() < 1e-9 && major[2].abs() < 1e-9);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = parse_obj("v 0 0 0\n".as_bytes()).unwrap();
        assert!(matches!(SegmentMetrics::compute(&mesh), Err(MetricsError::Empty)));
    }
}
