// q_shared.rs -- vector math, planes and content flags shared by every crate

pub type Vec3 = [f32; 3];

// ============================================================
// Content flags (brush and shader contents)
// ============================================================

pub const CONTENTS_SOLID: i32 = 1;
/// the box hull's contents
pub const CONTENTS_BODY: i32 = 0x2000000;

// ============================================================
// Planes
// ============================================================

pub const PLANE_X: u8 = 0;
pub const PLANE_Y: u8 = 1;
pub const PLANE_Z: u8 = 2;
pub const PLANE_NON_AXIAL: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CPlane {
    pub normal: Vec3,
    pub dist: f32,
    /// 0..2 for axial planes, `PLANE_NON_AXIAL` otherwise. The box hull
    /// uses 3..5 for its negated axial planes.
    pub plane_type: u8,
    /// signx + (signy<<1) + (signz<<2), used by `box_on_plane_side`
    pub signbits: u8,
}

impl Default for CPlane {
    fn default() -> Self {
        Self {
            normal: [0.0; 3],
            dist: 0.0,
            plane_type: PLANE_NON_AXIAL,
            signbits: 0,
        }
    }
}

impl CPlane {
    pub fn new(normal: Vec3, dist: f32) -> Self {
        Self {
            normal,
            dist,
            plane_type: plane_type_for_normal(&normal),
            signbits: signbits_for_normal(&normal),
        }
    }

    /// Signed distance from the plane, using the axial shortcut when possible.
    #[inline]
    pub fn distance_to(&self, p: &Vec3) -> f32 {
        if self.plane_type < 3 {
            p[self.plane_type as usize] - self.dist
        } else {
            dot_product(&self.normal, p) - self.dist
        }
    }
}

pub fn plane_type_for_normal(normal: &Vec3) -> u8 {
    if normal[0] == 1.0 {
        PLANE_X
    } else if normal[1] == 1.0 {
        PLANE_Y
    } else if normal[2] == 1.0 {
        PLANE_Z
    } else {
        PLANE_NON_AXIAL
    }
}

pub fn signbits_for_normal(normal: &Vec3) -> u8 {
    let mut bits = 0u8;
    for (j, &n) in normal.iter().enumerate() {
        if n < 0.0 {
            bits |= 1 << j;
        }
    }
    bits
}

// ============================================================
// Vector helpers
// ============================================================

#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn clear_bounds() -> [Vec3; 2] {
    [[f32::MAX; 3], [-f32::MAX; 3]]
}

pub fn add_point_to_bounds(v: &Vec3, mins: &mut Vec3, maxs: &mut Vec3) {
    for i in 0..3 {
        if v[i] < mins[i] {
            mins[i] = v[i];
        }
        if v[i] > maxs[i] {
            maxs[i] = v[i];
        }
    }
}

#[inline]
pub fn bounds_intersect_point(mins: &Vec3, maxs: &Vec3, point: &Vec3) -> bool {
    (0..3).all(|i| point[i] >= mins[i] && point[i] <= maxs[i])
}

#[inline]
pub fn bounds_intersect(mins: &Vec3, maxs: &Vec3, mins2: &Vec3, maxs2: &Vec3) -> bool {
    (0..3).all(|i| maxs[i] >= mins2[i] && mins[i] <= maxs2[i])
}

/// Returns 1 if the box is entirely in front of the plane, 2 if entirely
/// behind, 3 if it straddles.
pub fn box_on_plane_side(emins: &Vec3, emaxs: &Vec3, p: &CPlane) -> i32 {
    // fast axial cases
    if p.plane_type < 3 {
        let t = p.plane_type as usize;
        if p.dist <= emins[t] {
            return 1;
        }
        if p.dist >= emaxs[t] {
            return 2;
        }
        return 3;
    }

    let mut dist1 = 0.0;
    let mut dist2 = 0.0;
    for i in 0..3 {
        if p.signbits & (1 << i) != 0 {
            dist1 += p.normal[i] * emins[i];
            dist2 += p.normal[i] * emaxs[i];
        } else {
            dist1 += p.normal[i] * emaxs[i];
            dist2 += p.normal[i] * emins[i];
        }
    }

    let mut sides = 0;
    if dist1 >= p.dist {
        sides = 1;
    }
    if dist2 < p.dist {
        sides |= 2;
    }
    sides
}
