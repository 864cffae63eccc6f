// cm_query.rs -- point, box and visibility queries against the loaded level

use crate::cmodel::{CLeaf, CModel, CollisionModel, BOX_MODEL_HANDLE};
use crate::error::{CmResult, CollisionError};
use crate::q_shared::{box_on_plane_side, bounds_intersect_point, dot_product, Vec3};

impl CollisionModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    pub fn num_inline_models(&self) -> usize {
        self.cmodels.len()
    }

    pub fn entity_string(&self) -> &str {
        &self.entity_string
    }

    pub fn inline_model(&self, index: usize) -> CmResult<&CModel> {
        self.cmodels.get(index).ok_or_else(|| {
            CollisionError::invalid(format!(
                "InlineModel: bad number {} ({} models)",
                index,
                self.cmodels.len()
            ))
        })
    }

    /// Resolves a clip handle: an inline model number or `BOX_MODEL_HANDLE`.
    pub fn clip_handle_to_model(&self, handle: usize) -> CmResult<&CModel> {
        if handle < self.cmodels.len() {
            return Ok(&self.cmodels[handle]);
        }
        if handle == BOX_MODEL_HANDLE && self.box_brush < self.brushes.len() {
            return Ok(&self.box_model);
        }
        Err(CollisionError::invalid(format!(
            "ClipHandleToModel: bad handle {} < {}",
            handle,
            self.cmodels.len()
        )))
    }

    pub fn model_bounds(&self, handle: usize) -> CmResult<(Vec3, Vec3)> {
        let m = self.clip_handle_to_model(handle)?;
        Ok((m.mins, m.maxs))
    }

    fn leaf(&self, leafnum: usize) -> CmResult<&CLeaf> {
        self.leafs
            .get(leafnum)
            .ok_or_else(|| CollisionError::invalid(format!("bad leaf number {}", leafnum)))
    }

    pub fn leaf_cluster(&self, leafnum: usize) -> CmResult<i32> {
        Ok(self.leaf(leafnum)?.cluster)
    }

    pub fn leaf_area(&self, leafnum: usize) -> CmResult<i32> {
        Ok(self.leaf(leafnum)?.area)
    }

    // ============================================================
    // Leaf lookups
    // ============================================================

    fn point_leafnum_r(&self, p: &Vec3, mut num: i32) -> usize {
        while num >= 0 {
            let node = &self.nodes[num as usize];
            let d = self.planes[node.plane_num].distance_to(p);
            num = if d < 0.0 { node.children[1] } else { node.children[0] };
        }
        (-1 - num) as usize
    }

    /// Leaf containing `p`. Returns 0 when no level is loaded.
    pub fn point_leafnum(&self, p: &Vec3) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.point_leafnum_r(p, 0)
    }

    /// Leafs touched by the box, at most `max_count` of them, plus the first
    /// node whose plane splits the box (-1 if none did).
    pub fn box_leafnums(&self, mins: &Vec3, maxs: &Vec3, max_count: usize) -> (Vec<usize>, i32) {
        let mut leafs = Vec::new();
        let mut top_node = -1;
        if self.nodes.is_empty() {
            return (leafs, top_node);
        }

        let mut stack = vec![0i32];
        while let Some(mut num) = stack.pop() {
            loop {
                if num < 0 {
                    if leafs.len() < max_count {
                        leafs.push((-1 - num) as usize);
                    }
                    break;
                }

                let node = &self.nodes[num as usize];
                match box_on_plane_side(mins, maxs, &self.planes[node.plane_num]) {
                    1 => num = node.children[0],
                    2 => num = node.children[1],
                    _ => {
                        if top_node == -1 {
                            top_node = num;
                        }
                        stack.push(node.children[1]);
                        num = node.children[0];
                    }
                }
            }
        }
        (leafs, top_node)
    }

    // ============================================================
    // Contents
    // ============================================================

    /// Combined contents of every brush in `leaf` that contains `p`.
    fn leaf_point_contents(&self, leaf: &CLeaf, p: &Vec3) -> i32 {
        let mut contents = 0;
        let brushes = &self.leaf_brushes[leaf.first_leaf_brush..][..leaf.num_leaf_brushes];
        for &brush_num in brushes {
            let b = &self.brushes[brush_num];
            if !bounds_intersect_point(&b.bounds[0], &b.bounds[1], p) {
                continue;
            }

            // see if the point is in the brush
            let inside = self.brush_sides[b.first_side..][..b.num_sides].iter().all(|side| {
                let plane = &self.planes[side.plane_num];
                dot_product(p, &plane.normal) <= plane.dist
            });
            if inside {
                contents |= b.contents;
            }
        }
        contents
    }

    /// Contents at `p`. Handle 0 walks the world tree; other handles test
    /// only the brushes of that inline model (or the temp box).
    pub fn point_contents(&self, p: &Vec3, model: usize) -> CmResult<i32> {
        if self.nodes.is_empty() {
            return Ok(0);
        }

        if model != 0 {
            let clipm = self.clip_handle_to_model(model)?;
            return Ok(self.leaf_point_contents(&clipm.leaf, p));
        }

        let leaf = &self.leafs[self.point_leafnum_r(p, 0)];
        Ok(self.leaf_point_contents(leaf, p))
    }

    // ============================================================
    // Visibility
    // ============================================================

    /// The PVS row for `cluster`. Clusters without data see everything.
    pub fn cluster_pvs(&self, cluster: i32) -> &[u8] {
        match usize::try_from(cluster) {
            Ok(c) if self.vised && c < self.num_clusters => {
                &self.visibility[c * self.cluster_bytes..][..self.cluster_bytes]
            }
            _ => &self.vis_all,
        }
    }

    /// True if `cluster2` is in the PVS of `cluster1`.
    pub fn cluster_visible(&self, cluster1: i32, cluster2: i32) -> bool {
        let Ok(c2) = usize::try_from(cluster2) else {
            return false;
        };
        self.cluster_pvs(cluster1)
            .get(c2 >> 3)
            .is_some_and(|&byte| byte & (1 << (c2 & 7)) != 0)
    }
}
