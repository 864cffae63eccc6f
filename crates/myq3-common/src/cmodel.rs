// cmodel.rs -- level file decoding into the collision model

use log::{debug, info};
use rayon::prelude::*;

use crate::byte_order::BspReader;
use crate::cm_patch::{load_patches, CPatch};
use crate::cvar::{CollisionConfig, CvarContext};
use crate::error::{CmResult, CollisionError};
use crate::files::FileSystem;
use crate::md4::com_block_checksum;
use crate::q_shared::{signbits_for_normal, CPlane, Vec3, CONTENTS_BODY};
use crate::qfiles::{
    DBrush, DBrushSide, DHeader, DLeaf, DModel, DNode, DPlane, DShader, DSurface, DiskRecord,
    DrawVert, Lump, BSP_BYTE_ORDER, BSP_IDENT, BSP_VERSION, HEADER_LUMPS, LUMP_BRUSHES,
    LUMP_BRUSHSIDES, LUMP_DRAWVERTS, LUMP_ENTITIES, LUMP_LEAFBRUSHES, LUMP_LEAFS,
    LUMP_LEAFSURFACES, LUMP_MODELS, LUMP_NODES, LUMP_PLANES, LUMP_SHADERS, LUMP_SURFACES,
    LUMP_VISIBILITY, MAX_MAP_AREAS, MAX_MAP_CLUSTERS, MAX_SUBMODELS, VIS_HEADER,
};

/// Clip handle of the temporary box model.
pub const BOX_MODEL_HANDLE: usize = 255;

/// Below this record count a lump is parsed sequentially.
const PARALLEL_LUMP_THRESHOLD: usize = 64;

/// Widest PVS row a level may declare.
const MAX_CLUSTER_BYTES: usize = ((MAX_MAP_CLUSTERS + 31) & !31) / 8;

// ============================================================
// Decoded structures
// ============================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CShader {
    pub name: String,
    pub surface_flags: i32,
    pub content_flags: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CNode {
    pub plane_num: usize,
    /// negative numbers are -(leaf + 1)
    pub children: [i32; 2],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CLeaf {
    pub cluster: i32,
    pub area: i32,
    pub first_leaf_brush: usize,
    pub num_leaf_brushes: usize,
    pub first_leaf_surface: usize,
    pub num_leaf_surfaces: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CBrushSide {
    pub plane_num: usize,
    /// `None` for the box hull's sides
    pub shader_num: Option<usize>,
    pub surface_flags: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CBrush {
    pub shader_num: Option<usize>,
    pub contents: i32,
    pub bounds: [Vec3; 2],
    pub first_side: usize,
    pub num_sides: usize,
}

/// An inline (sub)model. Models other than the world carry their own leaf.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CModel {
    pub mins: Vec3,
    pub maxs: Vec3,
    pub leaf: CLeaf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CArea {
    pub flood_num: i32,
    pub flood_valid: i32,
}

/// Everything the collision and visibility code knows about the current
/// level. Owns all of its data; the file buffer is not kept.
#[derive(Debug, Default)]
pub struct CollisionModel {
    pub name: String,
    pub checksum: u32,

    pub shaders: Vec<CShader>,
    pub leafs: Vec<CLeaf>,
    pub leaf_brushes: Vec<usize>,
    pub leaf_surfaces: Vec<usize>,
    pub planes: Vec<CPlane>,
    pub brush_sides: Vec<CBrushSide>,
    pub brushes: Vec<CBrush>,
    pub cmodels: Vec<CModel>,
    pub nodes: Vec<CNode>,
    pub entity_string: String,

    pub num_clusters: usize,
    pub cluster_bytes: usize,
    pub visibility: Vec<u8>,
    pub vised: bool,
    /// one all-visible row, handed out for clusters without data
    pub(crate) vis_all: Vec<u8>,

    pub num_areas: usize,
    pub areas: Vec<CArea>,
    /// `num_areas * num_areas` open portal reference counts
    pub area_portals: Vec<i32>,
    pub flood_valid: i32,

    /// one slot per surface record, filled for patches only
    pub surfaces: Vec<Option<CPatch>>,

    pub no_areas: bool,

    // box hull, appended after the level's own data
    pub box_planes: usize,
    pub box_brush: usize,
    pub box_model: CModel,
}

// ============================================================
// Lump helpers
// ============================================================

fn lump_bytes<'a>(
    data: &'a [u8],
    lump: &Lump,
    record_size: usize,
    what: &str,
) -> CmResult<&'a [u8]> {
    let (ofs, len) = match (usize::try_from(lump.fileofs), usize::try_from(lump.filelen)) {
        (Ok(ofs), Ok(len)) => (ofs, len),
        _ => {
            return Err(CollisionError::format(format!(
                "LoadMap: negative lump offset or length ({})",
                what
            )))
        }
    };
    let end = ofs
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| CollisionError::format(format!("LoadMap: lump out of range ({})", what)))?;
    if len % record_size != 0 {
        return Err(CollisionError::format(format!("LoadMap: funny lump size ({})", what)));
    }
    Ok(&data[ofs..end])
}

/// Parses every record of a lump. Large lumps are split across the rayon
/// pool; record order is preserved either way.
fn decode_records<T: DiskRecord>(data: &[u8], lump: &Lump, what: &str) -> CmResult<Vec<T>> {
    let bytes = lump_bytes(data, lump, T::SIZE, what)?;
    let read = |chunk: &[u8]| T::read(&mut BspReader::new(chunk, BSP_BYTE_ORDER));

    if bytes.len() / T::SIZE >= PARALLEL_LUMP_THRESHOLD {
        bytes.par_chunks_exact(T::SIZE).map(read).collect()
    } else {
        bytes.chunks_exact(T::SIZE).map(read).collect()
    }
}

fn index(v: i32, limit: usize, what: &str) -> CmResult<usize> {
    usize::try_from(v)
        .ok()
        .filter(|&i| i < limit)
        .ok_or_else(|| CollisionError::format(format!("{}: bad index {}", what, v)))
}

/// Validates `first..first + count` against `limit` and returns `first`.
fn range(first: i32, count: i32, limit: usize, what: &str) -> CmResult<usize> {
    match (usize::try_from(first), usize::try_from(count)) {
        (Ok(f), Ok(c)) if f.checked_add(c).is_some_and(|end| end <= limit) => Ok(f),
        _ => Err(CollisionError::format(format!(
            "{}: bad range {}+{} (limit {})",
            what, first, count, limit
        ))),
    }
}

fn count(v: i32, what: &str) -> CmResult<usize> {
    usize::try_from(v).map_err(|_| CollisionError::format(format!("{}: negative count", what)))
}

// ============================================================
// Decoding
// ============================================================

/// Loads and decodes a level. Nothing is returned unless every lump decodes.
pub fn decode(name: &str, fs: &dyn FileSystem) -> CmResult<CollisionModel> {
    if name.is_empty() {
        return Err(CollisionError::invalid("LoadMap: empty level name"));
    }

    let buf = fs.load_file(name).map_err(|source| CollisionError::Io {
        name: name.to_string(),
        source,
    })?;

    CollisionModel::decode_bytes(name, &buf)
}

impl CollisionModel {
    /// Decodes a level that is already in memory.
    pub fn decode_bytes(name: &str, data: &[u8]) -> CmResult<Self> {
        let checksum = com_block_checksum(data);

        let mut r = BspReader::new(data, BSP_BYTE_ORDER);
        let (ident, version) = DHeader::read_version(&mut r)?;
        if version != BSP_VERSION {
            return Err(CollisionError::format(format!(
                "LoadMap: {} has wrong version number ({} should be {})",
                name, version, BSP_VERSION
            )));
        }
        if ident != BSP_IDENT {
            debug!("{}: unexpected ident {:#010x}", name, ident);
        }
        let lumps = DHeader::read_lumps(&mut r)?;

        let mut cm = Self {
            name: name.to_string(),
            checksum,
            ..Default::default()
        };

        cm.load_shaders(data, &lumps[LUMP_SHADERS])?;
        cm.load_leafs(data, &lumps[LUMP_LEAFS])?;
        cm.load_leaf_brushes(data, &lumps[LUMP_LEAFBRUSHES])?;
        cm.load_leaf_surfaces(data, &lumps[LUMP_LEAFSURFACES])?;
        cm.load_planes(data, &lumps[LUMP_PLANES])?;
        cm.load_brush_sides(data, &lumps[LUMP_BRUSHSIDES])?;
        cm.load_brushes(data, &lumps[LUMP_BRUSHES])?;
        cm.load_submodels(data, &lumps)?;
        cm.load_nodes(data, &lumps[LUMP_NODES])?;
        cm.load_entity_string(data, &lumps[LUMP_ENTITIES])?;
        cm.load_visibility(data, &lumps[LUMP_VISIBILITY])?;
        cm.load_patches(data, &lumps)?;

        cm.init_box_hull();
        cm.flood_area_connections()?;

        debug!(
            "{}: {} shaders, {} planes, {} nodes, {} leafs, {} brushes, {} models, \
             {} clusters, {} areas",
            name,
            cm.shaders.len(),
            cm.box_planes,
            cm.nodes.len(),
            cm.leafs.len(),
            cm.box_brush,
            cm.cmodels.len(),
            cm.num_clusters,
            cm.num_areas
        );

        Ok(cm)
    }

    fn load_shaders(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DShader> = decode_records(data, lump, "shaders")?;
        if input.is_empty() {
            return Err(CollisionError::format("Map with no shaders"));
        }
        self.shaders = input
            .into_iter()
            .map(|s| CShader {
                name: s.shader,
                surface_flags: s.surface_flags,
                content_flags: s.content_flags,
            })
            .collect();
        Ok(())
    }

    fn load_leafs(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DLeaf> = decode_records(data, lump, "leafs")?;
        if input.is_empty() {
            return Err(CollisionError::format("Map with no leafs"));
        }

        let mut num_clusters = 0usize;
        let mut num_areas = 0usize;
        let mut leafs = Vec::with_capacity(input.len());
        for l in &input {
            if let Ok(c) = usize::try_from(l.cluster) {
                num_clusters = num_clusters.max(c + 1);
            }
            if let Ok(a) = usize::try_from(l.area) {
                num_areas = num_areas.max(a + 1);
            }
            leafs.push(CLeaf {
                cluster: l.cluster,
                area: l.area,
                first_leaf_brush: count(l.first_leaf_brush, "leafs")?,
                num_leaf_brushes: count(l.num_leaf_brushes, "leafs")?,
                first_leaf_surface: count(l.first_leaf_surface, "leafs")?,
                num_leaf_surfaces: count(l.num_leaf_surfaces, "leafs")?,
            });
        }

        if num_clusters > MAX_MAP_CLUSTERS {
            return Err(CollisionError::format(format!("Map has {} clusters", num_clusters)));
        }
        if num_areas > MAX_MAP_AREAS {
            return Err(CollisionError::format(format!("Map has {} areas", num_areas)));
        }

        self.leafs = leafs;
        self.num_clusters = num_clusters;
        self.num_areas = num_areas;
        self.areas = vec![CArea::default(); num_areas];
        self.area_portals = vec![0; num_areas * num_areas];
        Ok(())
    }

    fn load_leaf_brushes(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<i32> = decode_records(data, lump, "leafbrushes")?;
        self.leaf_brushes = input
            .into_iter()
            .map(|b| count(b, "leafbrushes"))
            .collect::<CmResult<_>>()?;

        for (i, leaf) in self.leafs.iter().enumerate() {
            if leaf.first_leaf_brush + leaf.num_leaf_brushes > self.leaf_brushes.len() {
                return Err(CollisionError::format(format!("leaf {}: bad leafbrush range", i)));
            }
        }
        Ok(())
    }

    fn load_leaf_surfaces(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<i32> = decode_records(data, lump, "leafsurfaces")?;
        self.leaf_surfaces = input
            .into_iter()
            .map(|s| count(s, "leafsurfaces"))
            .collect::<CmResult<_>>()?;

        for (i, leaf) in self.leafs.iter().enumerate() {
            if leaf.first_leaf_surface + leaf.num_leaf_surfaces > self.leaf_surfaces.len() {
                return Err(CollisionError::format(format!("leaf {}: bad leafsurface range", i)));
            }
        }
        Ok(())
    }

    fn load_planes(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DPlane> = decode_records(data, lump, "planes")?;
        if input.is_empty() {
            return Err(CollisionError::format("Map with no planes"));
        }
        self.planes = input.iter().map(|p| CPlane::new(p.normal, p.dist)).collect();
        Ok(())
    }

    fn load_brush_sides(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DBrushSide> = decode_records(data, lump, "brushsides")?;
        let mut sides = Vec::with_capacity(input.len());
        for s in &input {
            let shader_num = index(s.shader_num, self.shaders.len(), "brushside shader")?;
            sides.push(CBrushSide {
                plane_num: index(s.plane_num, self.planes.len(), "brushside plane")?,
                shader_num: Some(shader_num),
                surface_flags: self.shaders[shader_num].surface_flags,
            });
        }
        self.brush_sides = sides;
        Ok(())
    }

    /// Axial bounds from the first six sides, which the map compiler always
    /// emits as -x, +x, -y, +y, -z, +z.
    fn brush_bounds(&self, first_side: usize, num_sides: usize) -> [Vec3; 2] {
        if num_sides < 6 {
            return [[-f32::MAX; 3], [f32::MAX; 3]];
        }
        let dist = |side: usize| self.planes[self.brush_sides[first_side + side].plane_num].dist;
        let mut bounds = [[0.0; 3]; 2];
        for k in 0..3 {
            bounds[0][k] = -dist(k * 2);
            bounds[1][k] = dist(k * 2 + 1);
        }
        bounds
    }

    fn load_brushes(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DBrush> = decode_records(data, lump, "brushes")?;
        let mut brushes = Vec::with_capacity(input.len());
        for b in &input {
            let first_side =
                range(b.first_side, b.num_sides, self.brush_sides.len(), "brush sides")?;
            let num_sides = b.num_sides as usize;
            let shader_num = index(b.shader_num, self.shaders.len(), "brush shader")?;
            brushes.push(CBrush {
                shader_num: Some(shader_num),
                contents: self.shaders[shader_num].content_flags,
                bounds: self.brush_bounds(first_side, num_sides),
                first_side,
                num_sides,
            });
        }

        if let Some(bad) = self.leaf_brushes.iter().find(|&&b| b >= brushes.len()) {
            return Err(CollisionError::format(format!("leafbrushes: bad brush {}", bad)));
        }

        self.brushes = brushes;
        Ok(())
    }

    fn load_submodels(&mut self, data: &[u8], lumps: &[Lump; HEADER_LUMPS]) -> CmResult<()> {
        let input: Vec<DModel> = decode_records(data, &lumps[LUMP_MODELS], "models")?;
        if input.is_empty() {
            return Err(CollisionError::format("Map with no models"));
        }
        if input.len() > MAX_SUBMODELS {
            return Err(CollisionError::format("MAX_SUBMODELS exceeded"));
        }
        // surface ranges are checked against the record count; the records
        // themselves are decoded with the patches
        let num_surfaces =
            usize::try_from(lumps[LUMP_SURFACES].filelen).unwrap_or(0) / DSurface::SIZE;

        let mut cmodels = Vec::with_capacity(input.len());
        for (i, m) in input.iter().enumerate() {
            let mut out = CModel::default();
            for k in 0..3 {
                // spread the models a bit
                out.mins[k] = m.mins[k] - 1.0;
                out.maxs[k] = m.maxs[k] + 1.0;
            }

            // world model doesn't need other info
            if i == 0 {
                cmodels.push(out);
                continue;
            }

            let first_brush =
                range(m.first_brush, m.num_brushes, self.brushes.len(), "model brushes")?;
            let num_brushes = m.num_brushes as usize;
            out.leaf.first_leaf_brush = self.leaf_brushes.len();
            out.leaf.num_leaf_brushes = num_brushes;
            self.leaf_brushes.extend(first_brush..first_brush + num_brushes);

            let first_surface =
                range(m.first_surface, m.num_surfaces, num_surfaces, "model surfaces")?;
            let num_model_surfaces = m.num_surfaces as usize;
            out.leaf.first_leaf_surface = self.leaf_surfaces.len();
            out.leaf.num_leaf_surfaces = num_model_surfaces;
            self.leaf_surfaces
                .extend(first_surface..first_surface + num_model_surfaces);

            cmodels.push(out);
        }
        self.cmodels = cmodels;
        Ok(())
    }

    fn load_nodes(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let input: Vec<DNode> = decode_records(data, lump, "nodes")?;
        if input.is_empty() {
            return Err(CollisionError::format("Map has no nodes"));
        }

        let mut nodes = Vec::with_capacity(input.len());
        for (i, n) in input.iter().enumerate() {
            // children always come after their parent, so the tree can't loop
            for &child in &n.children {
                let ok = match usize::try_from(child) {
                    Ok(c) => c > i && c < input.len(),
                    Err(_) => ((-1 - child) as usize) < self.leafs.len(),
                };
                if !ok {
                    return Err(CollisionError::format(format!("node {}: bad child {}", i, child)));
                }
            }
            nodes.push(CNode {
                plane_num: index(n.plane_num, self.planes.len(), "node plane")?,
                children: n.children,
            });
        }
        self.nodes = nodes;
        Ok(())
    }

    fn load_entity_string(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let bytes = lump_bytes(data, lump, 1, "entities")?;
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |p| p + 1);
        self.entity_string = String::from_utf8_lossy(&bytes[..end]).into_owned();
        Ok(())
    }

    fn load_visibility(&mut self, data: &[u8], lump: &Lump) -> CmResult<()> {
        let bytes = lump_bytes(data, lump, 1, "visibility")?;

        if bytes.is_empty() {
            // unvised: every query gets the single all-ones row
            self.cluster_bytes = (self.num_clusters + 31) & !31;
            self.visibility = Vec::new();
            self.vised = false;
        } else {
            let mut r = BspReader::new(bytes, BSP_BYTE_ORDER);
            let num_clusters = count(r.read_i32()?, "visibility")?;
            let cluster_bytes = count(r.read_i32()?, "visibility")?;
            if num_clusters > MAX_MAP_CLUSTERS {
                return Err(CollisionError::format(format!(
                    "visibility: {} clusters",
                    num_clusters
                )));
            }
            if cluster_bytes > MAX_CLUSTER_BYTES || cluster_bytes < num_clusters.div_ceil(8) {
                return Err(CollisionError::format(format!(
                    "visibility: {} bytes per row for {} clusters",
                    cluster_bytes, num_clusters
                )));
            }
            let fits = num_clusters
                .checked_mul(cluster_bytes)
                .is_some_and(|size| size <= r.remaining());
            if !fits {
                return Err(CollisionError::format("visibility: rows overrun lump"));
            }
            self.num_clusters = num_clusters;
            self.cluster_bytes = cluster_bytes;
            self.visibility = bytes[VIS_HEADER..].to_vec();
            self.vised = true;
        }

        self.vis_all = vec![0xff; self.cluster_bytes];
        Ok(())
    }

    fn load_patches(&mut self, data: &[u8], lumps: &[Lump; HEADER_LUMPS]) -> CmResult<()> {
        let surfaces: Vec<DSurface> = decode_records(data, &lumps[LUMP_SURFACES], "surfaces")?;
        let verts: Vec<DrawVert> = decode_records(data, &lumps[LUMP_DRAWVERTS], "drawverts")?;
        self.surfaces = load_patches(&surfaces, &verts, &self.shaders)?;
        Ok(())
    }

    // ============================================================
    // Box hull
    // ============================================================

    /// Appends a brush that `temp_box_model` can reshape into any axial box,
    /// so boxes can be tested with the same code as level brushes.
    pub(crate) fn init_box_hull(&mut self) {
        self.box_planes = self.planes.len();
        self.box_brush = self.brushes.len();

        let first_side = self.brush_sides.len();
        self.box_model = CModel {
            leaf: CLeaf {
                first_leaf_brush: self.leaf_brushes.len(),
                num_leaf_brushes: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        self.leaf_brushes.push(self.box_brush);

        self.brushes.push(CBrush {
            shader_num: None,
            contents: CONTENTS_BODY,
            bounds: [[0.0; 3]; 2],
            first_side,
            num_sides: 6,
        });

        for i in 0..6 {
            let side = i & 1;
            self.brush_sides.push(CBrushSide {
                plane_num: self.box_planes + i * 2 + side,
                shader_num: None,
                surface_flags: 0,
            });
        }

        for i in 0..6 {
            let axis = i >> 1;
            let mut normal = [0.0; 3];

            normal[axis] = 1.0;
            self.planes.push(CPlane {
                normal,
                dist: 0.0,
                plane_type: axis as u8,
                signbits: 0,
            });

            normal[axis] = -1.0;
            self.planes.push(CPlane {
                normal,
                dist: 0.0,
                plane_type: 3 + axis as u8,
                signbits: signbits_for_normal(&normal),
            });
        }
    }

    /// Reshapes the box hull to `[mins, maxs]` and returns its clip handle.
    pub fn temp_box_model(&mut self, mins: &Vec3, maxs: &Vec3) -> CmResult<usize> {
        if self.box_brush >= self.brushes.len() {
            return Err(CollisionError::invalid("TempBoxModel: no level loaded"));
        }

        let p = self.box_planes;
        for k in 0..3 {
            self.planes[p + k * 4].dist = maxs[k];
            self.planes[p + k * 4 + 1].dist = -maxs[k];
            self.planes[p + k * 4 + 2].dist = mins[k];
            self.planes[p + k * 4 + 3].dist = -mins[k];
        }

        self.brushes[self.box_brush].bounds = [*mins, *maxs];
        self.box_model.mins = *mins;
        self.box_model.maxs = *maxs;

        Ok(BOX_MODEL_HANDLE)
    }

    /// Drops every decoded array. Safe to call on an empty model.
    pub fn clear(&mut self) {
        let no_areas = self.no_areas;
        *self = Self {
            no_areas,
            ..Default::default()
        };
    }
}

// ============================================================
// Context: owns the current level
// ============================================================

#[derive(Debug, Default)]
pub struct CollisionContext {
    model: CollisionModel,
    config: CollisionConfig,
}

impl CollisionContext {
    pub fn new(config: CollisionConfig) -> Self {
        Self {
            model: CollisionModel {
                no_areas: config.no_areas,
                ..Default::default()
            },
            config,
        }
    }

    pub fn from_cvars(cvars: &mut CvarContext) -> Self {
        Self::new(CollisionConfig::from_cvars(cvars))
    }

    pub fn config(&self) -> CollisionConfig {
        self.config
    }

    pub fn set_config(&mut self, config: CollisionConfig) {
        self.config = config;
        self.model.no_areas = config.no_areas;
    }

    /// Loads `name` and makes it the current level, returning its checksum.
    ///
    /// Asking for the level that is already loaded returns the cached
    /// checksum; a server load also closes every area portal. A failed load
    /// leaves the current level untouched.
    pub fn load_map(
        &mut self,
        name: &str,
        fs: &dyn FileSystem,
        client_load: bool,
    ) -> CmResult<u32> {
        if name.is_empty() {
            return Err(CollisionError::invalid("LoadMap: empty level name"));
        }

        if self.model.name == name {
            if !client_load {
                self.model.area_portals.fill(0);
                self.model.flood_area_connections()?;
            }
            return Ok(self.model.checksum);
        }

        let mut model = decode(name, fs)?;
        model.no_areas = self.config.no_areas;
        self.model = model;

        info!(
            "Loaded {} ({} leafs, {} brushes, {} inline models, checksum {:#010x})",
            name,
            self.model.leafs.len(),
            self.model.box_brush,
            self.model.cmodels.len(),
            self.model.checksum
        );
        Ok(self.model.checksum)
    }

    pub fn clear(&mut self) {
        self.model.clear();
    }

    pub fn is_loaded(&self) -> bool {
        !self.model.name.is_empty()
    }

    pub fn model(&self) -> &CollisionModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut CollisionModel {
        &mut self.model
    }
}
