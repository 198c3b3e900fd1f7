use super::{BBox, Point3, Tolerance, Vec3};

/// Indexed triangle mesh with optional per-vertex attributes.
///
/// Normals and tangents are derived data: after moving vertices call
/// [`GeomMesh::recompute_derived`] instead of editing them directly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
    pub uvs: Option<Vec<[f64; 2]>>,
    pub normals: Option<Vec<[f64; 3]>>,
    /// Unit tangents pointing along increasing U, orthogonal to the normals.
    pub tangents: Option<Vec<[f64; 3]>>,
}

impl GeomMesh {
    /// Create a new mesh with positions and indices only.
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            uvs: None,
            normals: None,
            tangents: None,
        }
    }

    /// Create a new mesh with positions, indices, UVs, and normals.
    #[must_use]
    pub fn with_attributes(
        positions: Vec<[f64; 3]>,
        indices: Vec<u32>,
        uvs: Option<Vec<[f64; 2]>>,
        normals: Option<Vec<[f64; 3]>>,
    ) -> Self {
        Self {
            positions,
            indices,
            uvs,
            normals,
            tangents: None,
        }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions
            .iter()
            .any(|p| !Point3::from_array(*p).is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if all optional vertex attribute buffers match `positions.len()`.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.positions.len();
        self.uvs.as_ref().is_none_or(|uvs| uvs.len() == n)
            && self.normals.as_ref().is_none_or(|normals| normals.len() == n)
            && self.tangents.as_ref().is_none_or(|tangents| tangents.len() == n)
    }

    /// Check structural consistency: triangle list, finite positions, indices in
    /// range and attribute buffers sized to the vertex count.
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        Ok(())
    }

    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.positions.iter().copied().map(Point3::from_array)
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<BBox> {
        BBox::from_points(self.points())
    }

    /// Recompute normals and tangents from the current positions.
    pub fn recompute_derived(&mut self) {
        self.recompute_normals();
        self.recompute_tangents();
    }

    /// Area-weighted smooth normals. Meshes without triangles get `None`.
    pub fn recompute_normals(&mut self) {
        self.normals = if self.indices.is_empty() {
            None
        } else {
            Some(compute_smooth_normals(&self.positions, &self.indices))
        };
    }

    /// UV-gradient tangents orthogonalized against the normals.
    ///
    /// Requires UVs and triangles; otherwise tangents are cleared. Missing
    /// normals are computed first.
    pub fn recompute_tangents(&mut self) {
        let Some(uvs) = self.uvs.as_deref() else {
            self.tangents = None;
            return;
        };
        if self.indices.is_empty() {
            self.tangents = None;
            return;
        }

        let normals = match self.normals.as_deref() {
            Some(normals) if normals.len() == self.positions.len() => normals.to_vec(),
            _ => compute_smooth_normals(&self.positions, &self.indices),
        };
        self.tangents = Some(compute_tangents(
            &self.positions,
            &self.indices,
            uvs,
            &normals,
        ));
    }
}

fn triangle_vertices(indices: &[u32]) -> impl Iterator<Item = [usize; 3]> + '_ {
    indices
        .chunks_exact(3)
        .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
}

fn accumulate(target: &mut [Vec3], tri: [usize; 3], value: Vec3) {
    for i in tri {
        if let Some(slot) = target.get_mut(i) {
            *slot = *slot + value;
        }
    }
}

pub(crate) fn compute_smooth_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in triangle_vertices(indices) {
        let (Some(a), Some(b), Some(c)) = (
            positions.get(tri[0]),
            positions.get(tri[1]),
            positions.get(tri[2]),
        ) else {
            continue;
        };
        let a = Point3::from_array(*a);
        // The unnormalized cross product weights each face by its area.
        let face = Point3::from_array(*b)
            .sub_point(a)
            .cross(Point3::from_array(*c).sub_point(a));
        accumulate(&mut normals, tri, face);
    }

    normals
        .into_iter()
        .map(|n| n.normalized().unwrap_or(Vec3::Z).to_array())
        .collect()
}

fn compute_tangents(
    positions: &[[f64; 3]],
    indices: &[u32],
    uvs: &[[f64; 2]],
    normals: &[[f64; 3]],
) -> Vec<[f64; 3]> {
    let mut tangents = vec![Vec3::ZERO; positions.len()];

    for tri in triangle_vertices(indices) {
        let (Some(p0), Some(p1), Some(p2)) = (
            positions.get(tri[0]),
            positions.get(tri[1]),
            positions.get(tri[2]),
        ) else {
            continue;
        };
        let (Some(uv0), Some(uv1), Some(uv2)) =
            (uvs.get(tri[0]), uvs.get(tri[1]), uvs.get(tri[2]))
        else {
            continue;
        };

        let p0 = Point3::from_array(*p0);
        let edge1 = Point3::from_array(*p1).sub_point(p0);
        let edge2 = Point3::from_array(*p2).sub_point(p0);

        let (du1, dv1) = (uv1[0] - uv0[0], uv1[1] - uv0[1]);
        let (du2, dv2) = (uv2[0] - uv0[0], uv2[1] - uv0[1]);

        let det = du1 * dv2 - du2 * dv1;
        if Tolerance::ZERO_LENGTH.is_zero_length(det) {
            continue;
        }

        let tangent = (edge1.mul_scalar(dv2) - edge2.mul_scalar(dv1)).mul_scalar(1.0 / det);
        accumulate(&mut tangents, tri, tangent);
    }

    tangents
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            let n = normals.get(i).copied().map_or(Vec3::Z, Vec3::from_array);
            // Gram-Schmidt: T' = T - (N . T) N
            let t = t - n.mul_scalar(n.dot(t));
            t.normalized()
                .unwrap_or_else(|| n.any_orthogonal())
                .to_array()
        })
        .collect()
}
