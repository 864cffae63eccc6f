// qfiles.rs -- level (.bsp) file format structures

use crate::byte_order::{
    fixed_str, put_f32, put_fixed_str, put_i32, put_vec3, BspReader, ByteOrder,
};
use crate::error::CmResult;
use crate::q_shared::Vec3;

// ============================================================
// Header
// ============================================================

/// "IBSP" in little-endian
pub const BSP_IDENT: i32 =
    (b'P' as i32) << 24 | (b'S' as i32) << 16 | (b'B' as i32) << 8 | b'I' as i32;
/// Lump layout and record sizes match the id version 46 format; only the
/// version number differs.
pub const BSP_VERSION: i32 = 47;

/// All level files are stored little-endian.
pub const BSP_BYTE_ORDER: ByteOrder = ByteOrder::Little;

pub const LUMP_ENTITIES: usize = 0;
pub const LUMP_SHADERS: usize = 1;
pub const LUMP_PLANES: usize = 2;
pub const LUMP_NODES: usize = 3;
pub const LUMP_LEAFS: usize = 4;
pub const LUMP_LEAFSURFACES: usize = 5;
pub const LUMP_LEAFBRUSHES: usize = 6;
pub const LUMP_MODELS: usize = 7;
pub const LUMP_BRUSHES: usize = 8;
pub const LUMP_BRUSHSIDES: usize = 9;
pub const LUMP_DRAWVERTS: usize = 10;
pub const LUMP_DRAWINDEXES: usize = 11;
pub const LUMP_FOGS: usize = 12;
pub const LUMP_SURFACES: usize = 13;
pub const LUMP_LIGHTMAPS: usize = 14;
pub const LUMP_LIGHTGRID: usize = 15;
pub const LUMP_VISIBILITY: usize = 16;
pub const HEADER_LUMPS: usize = 17;

/// ident + version + lump directory
pub const HEADER_SIZE: usize = 8 + HEADER_LUMPS * 8;

// ============================================================
// Limits
// ============================================================

pub const MAX_QPATH: usize = 64;
pub const MAX_SUBMODELS: usize = 256;
pub const MAX_PATCH_VERTS: usize = 1024;
pub const MAX_MAP_AREAS: usize = 0x100;
pub const MAX_MAP_CLUSTERS: usize = 0x20000;

/// Bytes before the first row of the visibility lump (num_clusters, cluster_bytes).
pub const VIS_HEADER: usize = 8;

// surface types
pub const MST_BAD: i32 = 0;
pub const MST_PLANAR: i32 = 1;
pub const MST_PATCH: i32 = 2;
pub const MST_TRIANGLE_SOUP: i32 = 3;
pub const MST_FLARE: i32 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Lump {
    pub fileofs: i32,
    pub filelen: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DHeader {
    pub ident: i32,
    pub version: i32,
    pub lumps: [Lump; HEADER_LUMPS],
}

impl DHeader {
    /// Reads only the ident and version, so a version mismatch can be
    /// reported before the directory is looked at.
    pub fn read_version(r: &mut BspReader<'_>) -> CmResult<(i32, i32)> {
        Ok((r.read_i32()?, r.read_i32()?))
    }

    pub fn read_lumps(r: &mut BspReader<'_>) -> CmResult<[Lump; HEADER_LUMPS]> {
        let mut lumps = [Lump::default(); HEADER_LUMPS];
        for lump in lumps.iter_mut() {
            lump.fileofs = r.read_i32()?;
            lump.filelen = r.read_i32()?;
        }
        Ok(lumps)
    }

    pub fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, self.ident, order);
        put_i32(out, self.version, order);
        for lump in &self.lumps {
            put_i32(out, lump.fileofs, order);
            put_i32(out, lump.filelen, order);
        }
    }
}

// ============================================================
// Lump records
// ============================================================

/// A fixed-size record stored in a lump.
pub trait DiskRecord: Sized + Send {
    const SIZE: usize;
    fn read(r: &mut BspReader<'_>) -> CmResult<Self>;
    fn write(&self, out: &mut Vec<u8>, order: ByteOrder);
}

/// Index lumps (leaf brushes, leaf surfaces) are bare i32 arrays.
impl DiskRecord for i32 {
    const SIZE: usize = 4;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        r.read_i32()
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, *self, order);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DShader {
    pub shader: String,
    pub surface_flags: i32,
    pub content_flags: i32,
}

impl DiskRecord for DShader {
    const SIZE: usize = MAX_QPATH + 8;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            shader: fixed_str(r.read_bytes(MAX_QPATH)?),
            surface_flags: r.read_i32()?,
            content_flags: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_fixed_str(out, &self.shader, MAX_QPATH);
        put_i32(out, self.surface_flags, order);
        put_i32(out, self.content_flags, order);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DPlane {
    pub normal: Vec3,
    pub dist: f32,
}

impl DiskRecord for DPlane {
    const SIZE: usize = 16;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            normal: r.read_vec3()?,
            dist: r.read_f32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_vec3(out, &self.normal, order);
        put_f32(out, self.dist, order);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DNode {
    pub plane_num: i32,
    /// negative numbers are -(leafs+1), not nodes
    pub children: [i32; 2],
    pub mins: [i32; 3],
    pub maxs: [i32; 3],
}

impl DiskRecord for DNode {
    const SIZE: usize = 36;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            plane_num: r.read_i32()?,
            children: [r.read_i32()?, r.read_i32()?],
            mins: r.read_i32x3()?,
            maxs: r.read_i32x3()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, self.plane_num, order);
        for v in self.children.iter().chain(&self.mins).chain(&self.maxs) {
            put_i32(out, *v, order);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DLeaf {
    pub cluster: i32,
    pub area: i32,
    pub mins: [i32; 3],
    pub maxs: [i32; 3],
    pub first_leaf_surface: i32,
    pub num_leaf_surfaces: i32,
    pub first_leaf_brush: i32,
    pub num_leaf_brushes: i32,
}

impl DiskRecord for DLeaf {
    const SIZE: usize = 48;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            cluster: r.read_i32()?,
            area: r.read_i32()?,
            mins: r.read_i32x3()?,
            maxs: r.read_i32x3()?,
            first_leaf_surface: r.read_i32()?,
            num_leaf_surfaces: r.read_i32()?,
            first_leaf_brush: r.read_i32()?,
            num_leaf_brushes: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, self.cluster, order);
        put_i32(out, self.area, order);
        for v in self.mins.iter().chain(&self.maxs) {
            put_i32(out, *v, order);
        }
        put_i32(out, self.first_leaf_surface, order);
        put_i32(out, self.num_leaf_surfaces, order);
        put_i32(out, self.first_leaf_brush, order);
        put_i32(out, self.num_leaf_brushes, order);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DModel {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub first_surface: i32,
    pub num_surfaces: i32,
    pub first_brush: i32,
    pub num_brushes: i32,
}

impl DiskRecord for DModel {
    const SIZE: usize = 40;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            mins: r.read_vec3()?,
            maxs: r.read_vec3()?,
            first_surface: r.read_i32()?,
            num_surfaces: r.read_i32()?,
            first_brush: r.read_i32()?,
            num_brushes: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_vec3(out, &self.mins, order);
        put_vec3(out, &self.maxs, order);
        put_i32(out, self.first_surface, order);
        put_i32(out, self.num_surfaces, order);
        put_i32(out, self.first_brush, order);
        put_i32(out, self.num_brushes, order);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DBrushSide {
    /// positive plane side faces out of the leaf
    pub plane_num: i32,
    pub shader_num: i32,
}

impl DiskRecord for DBrushSide {
    const SIZE: usize = 8;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            plane_num: r.read_i32()?,
            shader_num: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, self.plane_num, order);
        put_i32(out, self.shader_num, order);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DBrush {
    pub first_side: i32,
    pub num_sides: i32,
    /// the shader that determines the contents flags
    pub shader_num: i32,
}

impl DiskRecord for DBrush {
    const SIZE: usize = 12;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            first_side: r.read_i32()?,
            num_sides: r.read_i32()?,
            shader_num: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_i32(out, self.first_side, order);
        put_i32(out, self.num_sides, order);
        put_i32(out, self.shader_num, order);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawVert {
    pub xyz: Vec3,
    pub st: [f32; 2],
    pub lightmap: [f32; 2],
    pub normal: Vec3,
    pub color: [u8; 4],
}

impl DiskRecord for DrawVert {
    const SIZE: usize = 44;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        let xyz = r.read_vec3()?;
        let st = [r.read_f32()?, r.read_f32()?];
        let lightmap = [r.read_f32()?, r.read_f32()?];
        let normal = r.read_vec3()?;
        let c = r.read_bytes(4)?;
        Ok(Self {
            xyz,
            st,
            lightmap,
            normal,
            color: [c[0], c[1], c[2], c[3]],
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        put_vec3(out, &self.xyz, order);
        for v in self.st.iter().chain(&self.lightmap) {
            put_f32(out, *v, order);
        }
        put_vec3(out, &self.normal, order);
        out.extend_from_slice(&self.color);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DSurface {
    pub shader_num: i32,
    pub fog_num: i32,
    pub surface_type: i32,

    pub first_vert: i32,
    pub num_verts: i32,

    pub first_index: i32,
    pub num_indexes: i32,

    pub lightmap_num: i32,
    pub lightmap_x: i32,
    pub lightmap_y: i32,
    pub lightmap_width: i32,
    pub lightmap_height: i32,

    pub lightmap_origin: Vec3,
    /// for patches, [0] and [1] are lodbounds
    pub lightmap_vecs: [Vec3; 3],

    pub patch_width: i32,
    pub patch_height: i32,
}

impl DiskRecord for DSurface {
    const SIZE: usize = 104;

    fn read(r: &mut BspReader<'_>) -> CmResult<Self> {
        Ok(Self {
            shader_num: r.read_i32()?,
            fog_num: r.read_i32()?,
            surface_type: r.read_i32()?,
            first_vert: r.read_i32()?,
            num_verts: r.read_i32()?,
            first_index: r.read_i32()?,
            num_indexes: r.read_i32()?,
            lightmap_num: r.read_i32()?,
            lightmap_x: r.read_i32()?,
            lightmap_y: r.read_i32()?,
            lightmap_width: r.read_i32()?,
            lightmap_height: r.read_i32()?,
            lightmap_origin: r.read_vec3()?,
            lightmap_vecs: [r.read_vec3()?, r.read_vec3()?, r.read_vec3()?],
            patch_width: r.read_i32()?,
            patch_height: r.read_i32()?,
        })
    }

    fn write(&self, out: &mut Vec<u8>, order: ByteOrder) {
        for v in [
            self.shader_num,
            self.fog_num,
            self.surface_type,
            self.first_vert,
            self.num_verts,
            self.first_index,
            self.num_indexes,
            self.lightmap_num,
            self.lightmap_x,
            self.lightmap_y,
            self.lightmap_width,
            self.lightmap_height,
        ] {
            put_i32(out, v, order);
        }
        put_vec3(out, &self.lightmap_origin, order);
        for v in &self.lightmap_vecs {
            put_vec3(out, v, order);
        }
        put_i32(out, self.patch_width, order);
        put_i32(out, self.patch_height, order);
    }
}
