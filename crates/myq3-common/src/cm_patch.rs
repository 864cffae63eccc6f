// cm_patch.rs -- curved surface control grids kept for collision
//
// Only the control points are kept here; turning them into collision
// facets is the job of the trace code that consumes them.

use crate::cmodel::CShader;
use crate::error::{CmResult, CollisionError};
use crate::q_shared::{add_point_to_bounds, clear_bounds, Vec3};
use crate::qfiles::{DSurface, DrawVert, MAX_PATCH_VERTS, MST_PATCH};

/// A bezier patch surface: a `width` x `height` grid of control points.
#[derive(Debug, Clone, PartialEq)]
pub struct CPatch {
    pub surface_num: usize,
    pub shader_num: usize,
    pub contents: i32,
    pub surface_flags: i32,
    pub width: usize,
    pub height: usize,
    /// row-major, `width * height` entries
    pub points: Vec<Vec3>,
    pub bounds: [Vec3; 2],
}

impl CPatch {
    /// Builds a patch from a surface record, copying its control points out
    /// of the draw vertex lump.
    pub fn from_surface(
        surface_num: usize,
        surf: &DSurface,
        verts: &[DrawVert],
        shaders: &[CShader],
    ) -> CmResult<Self> {
        let (width, height) = (surf.patch_width, surf.patch_height);
        if width <= 2 || height <= 2 {
            return Err(CollisionError::format(format!(
                "patch {}: bad size {}x{}",
                surface_num, width, height
            )));
        }
        if width & 1 == 0 || height & 1 == 0 {
            return Err(CollisionError::format(format!(
                "patch {}: even sizes are invalid for quadratic meshes",
                surface_num
            )));
        }
        let (width, height) = (width as usize, height as usize);

        let count = width
            .checked_mul(height)
            .filter(|&c| c <= MAX_PATCH_VERTS)
            .ok_or_else(|| {
                CollisionError::format(format!("patch {}: MAX_PATCH_VERTS", surface_num))
            })?;

        let first = usize::try_from(surf.first_vert)
            .ok()
            .filter(|&f| f + count <= verts.len())
            .ok_or_else(|| {
                CollisionError::format(format!("patch {}: bad vertex range", surface_num))
            })?;

        let shader_num = usize::try_from(surf.shader_num)
            .ok()
            .filter(|&s| s < shaders.len())
            .ok_or_else(|| {
                CollisionError::format(format!(
                    "patch {}: bad shader number {}",
                    surface_num, surf.shader_num
                ))
            })?;
        let shader = &shaders[shader_num];

        let points: Vec<Vec3> = verts[first..first + count].iter().map(|v| v.xyz).collect();
        let [mut mins, mut maxs] = clear_bounds();
        for p in &points {
            add_point_to_bounds(p, &mut mins, &mut maxs);
        }

        Ok(Self {
            surface_num,
            shader_num,
            contents: shader.content_flags,
            surface_flags: shader.surface_flags,
            width,
            height,
            points,
            bounds: [mins, maxs],
        })
    }

    /// Control point at (`row`, `col`).
    pub fn point(&self, row: usize, col: usize) -> Option<&Vec3> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.points.get(row * self.width + col)
    }
}

/// One slot per surface record; only `MST_PATCH` surfaces get a patch.
pub fn load_patches(
    surfaces: &[DSurface],
    verts: &[DrawVert],
    shaders: &[CShader],
) -> CmResult<Vec<Option<CPatch>>> {
    surfaces
        .iter()
        .enumerate()
        .map(|(i, surf)| {
            if surf.surface_type != MST_PATCH {
                return Ok(None);
            }
            CPatch::from_surface(i, surf, verts, shaders).map(Some)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qfiles::MST_PLANAR;

    fn grid_verts(n: usize) -> Vec<DrawVert> {
        (0..n)
            .map(|i| DrawVert {
                xyz: [i as f32, -(i as f32), 2.0],
                ..Default::default()
            })
            .collect()
    }

    fn shaders() -> Vec<CShader> {
        vec![CShader {
            name: "textures/base/curve".into(),
            surface_flags: 0x10,
            content_flags: 1,
        }]
    }

    fn patch_surface(w: i32, h: i32, first_vert: i32) -> DSurface {
        DSurface {
            surface_type: MST_PATCH,
            first_vert,
            num_verts: w * h,
            patch_width: w,
            patch_height: h,
            ..Default::default()
        }
    }

    #[test]
    fn copies_control_points_and_bounds() {
        let verts = grid_verts(12);
        let patch = CPatch::from_surface(4, &patch_surface(3, 3, 2), &verts, &shaders()).unwrap();
        assert_eq!(patch.points.len(), 9);
        assert_eq!(patch.points[0], [2.0, -2.0, 2.0]);
        assert_eq!(patch.point(2, 2), Some(&[10.0, -10.0, 2.0]));
        assert_eq!(patch.point(3, 0), None);
        assert_eq!(patch.bounds, [[2.0, -10.0, 2.0], [10.0, -2.0, 2.0]]);
        assert_eq!(patch.contents, 1);
        assert_eq!(patch.surface_flags, 0x10);
    }

    #[test]
    fn rejects_bad_sizes() {
        let verts = grid_verts(2048);
        for (w, h) in [(2, 3), (3, 1), (4, 3), (3, 6), (33, 33)] {
            let err = CPatch::from_surface(0, &patch_surface(w, h, 0), &verts, &shaders());
            assert!(matches!(err, Err(CollisionError::Format(_))), "{}x{}", w, h);
        }
        // 31x33 = 1023 fits
        assert!(CPatch::from_surface(0, &patch_surface(31, 33, 0), &verts, &shaders()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_vertices_and_shader() {
        let verts = grid_verts(9);
        assert!(CPatch::from_surface(0, &patch_surface(3, 3, 1), &verts, &shaders()).is_err());
        assert!(CPatch::from_surface(0, &patch_surface(3, 3, -1), &verts, &shaders()).is_err());

        let mut surf = patch_surface(3, 3, 0);
        surf.shader_num = 1;
        assert!(CPatch::from_surface(0, &surf, &verts, &shaders()).is_err());
    }

    #[test]
    fn only_patch_surfaces_get_slots_filled() {
        let verts = grid_verts(9);
        let planar = DSurface {
            surface_type: MST_PLANAR,
            ..Default::default()
        };
        let patches = load_patches(&[planar, patch_surface(3, 3, 0)], &verts, &shaders()).unwrap();
        assert_eq!(patches.len(), 2);
        assert!(patches[0].is_none());
        assert_eq!(patches[1].as_ref().unwrap().surface_num, 1);
    }
}
