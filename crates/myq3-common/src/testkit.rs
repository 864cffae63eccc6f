// testkit.rs -- a small, valid level for tests in this and dependent crates
//
// Layout: one axial split plane at x = 0. Leaf 1 (x >= 0, cluster 0, area 0)
// holds a solid brush spanning [16,48] x [-16,16] x [-16,16]; leaf 2
// (x < 0, cluster 1, area 1) is empty. Inline model 1 is that brush.

use crate::bsp_writer::BspWriter;
use crate::files::MemFileSystem;
use crate::qfiles::{
    DBrush, DBrushSide, DLeaf, DModel, DNode, DPlane, DShader, DSurface, DrawVert,
    LUMP_BRUSHES, LUMP_BRUSHSIDES, LUMP_DRAWVERTS, LUMP_LEAFBRUSHES, LUMP_LEAFS,
    LUMP_LEAFSURFACES, LUMP_MODELS, LUMP_NODES, LUMP_PLANES, LUMP_SHADERS, LUMP_SURFACES,
    MST_PATCH, MST_PLANAR,
};

pub const SAMPLE_MAP: &str = "maps/sample.bsp";
pub const SAMPLE_ENTITIES: &str = "{\n\"classname\" \"worldspawn\"\n}\n";

/// Lump records of the sample level, editable before encoding.
#[derive(Debug, Clone)]
pub struct SampleMap {
    pub version: i32,
    pub shaders: Vec<DShader>,
    pub planes: Vec<DPlane>,
    pub nodes: Vec<DNode>,
    pub leafs: Vec<DLeaf>,
    pub leaf_surfaces: Vec<i32>,
    pub leaf_brushes: Vec<i32>,
    pub models: Vec<DModel>,
    pub brushes: Vec<DBrush>,
    pub brush_sides: Vec<DBrushSide>,
    pub draw_verts: Vec<DrawVert>,
    pub surfaces: Vec<DSurface>,
    pub entities: String,
    pub vis_clusters: i32,
    pub vis_cluster_bytes: i32,
    pub vis_rows: Vec<u8>,
}

fn shader(name: &str) -> DShader {
    DShader {
        shader: name.to_string(),
        surface_flags: 0,
        content_flags: 1,
    }
}

fn plane(normal: [f32; 3], dist: f32) -> DPlane {
    DPlane { normal, dist }
}

fn leaf(cluster: i32, area: i32, first_leaf_brush: i32, num_leaf_brushes: i32) -> DLeaf {
    DLeaf {
        cluster,
        area,
        first_leaf_brush,
        num_leaf_brushes,
        first_leaf_surface: 0,
        num_leaf_surfaces: if cluster == 0 { 2 } else { 0 },
        ..Default::default()
    }
}

impl SampleMap {
    pub fn new() -> Self {
        let draw_verts = (0..9)
            .map(|i| DrawVert {
                xyz: [-32.0 + (i % 3) as f32 * 8.0, -8.0 + (i / 3) as f32 * 8.0, 24.0],
                ..Default::default()
            })
            .collect();

        Self {
            version: crate::qfiles::BSP_VERSION,
            shaders: vec![shader("textures/base/wall"), shader("textures/base/curve")],
            planes: vec![
                plane([-1.0, 0.0, 0.0], -16.0),
                plane([1.0, 0.0, 0.0], 48.0),
                plane([0.0, -1.0, 0.0], 16.0),
                plane([0.0, 1.0, 0.0], 16.0),
                plane([0.0, 0.0, -1.0], 16.0),
                plane([0.0, 0.0, 1.0], 16.0),
                plane([1.0, 0.0, 0.0], 0.0),
            ],
            nodes: vec![DNode {
                plane_num: 6,
                children: [-2, -3],
                mins: [-64; 3],
                maxs: [64; 3],
            }],
            leafs: vec![leaf(-1, -1, 0, 0), leaf(0, 0, 0, 1), leaf(1, 1, 0, 0)],
            leaf_surfaces: vec![0, 1],
            leaf_brushes: vec![0],
            models: vec![
                DModel {
                    mins: [-64.0; 3],
                    maxs: [64.0; 3],
                    first_surface: 0,
                    num_surfaces: 2,
                    first_brush: 0,
                    num_brushes: 1,
                },
                DModel {
                    mins: [16.0, -16.0, -16.0],
                    maxs: [48.0, 16.0, 16.0],
                    first_surface: 0,
                    num_surfaces: 1,
                    first_brush: 0,
                    num_brushes: 1,
                },
            ],
            brushes: vec![DBrush {
                first_side: 0,
                num_sides: 6,
                shader_num: 0,
            }],
            brush_sides: (0..6)
                .map(|i| DBrushSide {
                    plane_num: i,
                    shader_num: 0,
                })
                .collect(),
            draw_verts,
            surfaces: vec![
                DSurface {
                    shader_num: 0,
                    surface_type: MST_PLANAR,
                    first_vert: 0,
                    num_verts: 4,
                    ..Default::default()
                },
                DSurface {
                    shader_num: 1,
                    surface_type: MST_PATCH,
                    first_vert: 0,
                    num_verts: 9,
                    patch_width: 3,
                    patch_height: 3,
                    ..Default::default()
                },
            ],
            entities: SAMPLE_ENTITIES.to_string(),
            vis_clusters: 2,
            vis_cluster_bytes: 1,
            // cluster 0 sees itself, cluster 1 sees both
            vis_rows: vec![0x01, 0x03],
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    pub fn without_visibility(mut self) -> Self {
        self.vis_clusters = 0;
        self.vis_cluster_bytes = 0;
        self.vis_rows.clear();
        self
    }

    /// Appends unused planes (+z, dist = index) to push the plane lump past
    /// the parallel decode threshold.
    pub fn with_extra_planes(mut self, count: usize) -> Self {
        self.planes
            .extend((0..count).map(|i| plane([0.0, 0.0, 1.0], i as f32)));
        self
    }

    pub fn without_shaders(mut self) -> Self {
        self.shaders.clear();
        self
    }

    pub fn without_planes(mut self) -> Self {
        self.planes.clear();
        self
    }

    pub fn without_nodes(mut self) -> Self {
        self.nodes.clear();
        self
    }

    pub fn without_models(mut self) -> Self {
        self.models.clear();
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        BspWriter::new()
            .set_version(self.version)
            .entities(&self.entities)
            .records(LUMP_SHADERS, &self.shaders)
            .records(LUMP_PLANES, &self.planes)
            .records(LUMP_NODES, &self.nodes)
            .records(LUMP_LEAFS, &self.leafs)
            .records(LUMP_LEAFSURFACES, &self.leaf_surfaces)
            .records(LUMP_LEAFBRUSHES, &self.leaf_brushes)
            .records(LUMP_MODELS, &self.models)
            .records(LUMP_BRUSHES, &self.brushes)
            .records(LUMP_BRUSHSIDES, &self.brush_sides)
            .records(LUMP_DRAWVERTS, &self.draw_verts)
            .records(LUMP_SURFACES, &self.surfaces)
            .visibility(self.vis_clusters, self.vis_cluster_bytes, &self.vis_rows)
            .finish()
    }
}

impl Default for SampleMap {
    fn default() -> Self {
        Self::new()
    }
}

/// The encoded sample level.
pub fn sample_map() -> Vec<u8> {
    SampleMap::new().to_bytes()
}

/// A file system holding the sample level at `SAMPLE_MAP`.
pub fn sample_fs() -> MemFileSystem {
    let mut fs = MemFileSystem::new();
    fs.insert(SAMPLE_MAP, sample_map());
    fs
}
