// sv_world.rs -- world sector tree
//
// The world volume is split into a fixed-depth binary tree of axial
// sectors. Entities are linked into every leaf sector their bounds reach,
// so region queries only look at the entities of the leaves they touch.

use log::{debug, warn};

use myq3_common::cvar::{CvarContext, CvarFlags};
use myq3_common::q_shared::{bounds_intersect, vector_subtract, Vec3};

use std::collections::{HashMap, HashSet};

/// `WorldSector::axis` of a leaf.
pub const SECTOR_LEAF: i32 = -1;
/// Child index of a leaf.
pub const NO_SECTOR: usize = usize::MAX;

/// Deepest tree `World::new` accepts (about two million sectors).
pub const MAX_AREA_DEPTH: usize = 20;

pub const CVAR_AREA_DEPTH: &str = "sv_areaDepth";
pub const CVAR_AREA_NODES: &str = "sv_areaNodes";
const DEFAULT_AREA_DEPTH: usize = 4;
const DEFAULT_AREA_NODES: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================
// Sectors
// ============================================================

#[derive(Debug, Clone, PartialEq)]
pub struct WorldSector {
    /// `SECTOR_LEAF`, 0 (x) or 1 (y)
    pub axis: i32,
    pub dist: f32,
    /// [0] covers `axis >= dist`, [1] covers `axis <= dist`
    pub children: [usize; 2],
    pub mins: Vec3,
    pub maxs: Vec3,
    /// entity numbers linked into this sector
    pub entities: Vec<usize>,
}

impl WorldSector {
    fn leaf(mins: Vec3, maxs: Vec3) -> Self {
        Self {
            axis: SECTOR_LEAF,
            dist: 0.0,
            children: [NO_SECTOR; 2],
            mins,
            maxs,
            entities: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.axis == SECTOR_LEAF
    }
}

/// Where an entity is linked and with what bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityLink {
    pub absmin: Vec3,
    pub absmax: Vec3,
    pub sectors: Vec<usize>,
}

// ============================================================
// Configuration
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    pub area_depth: usize,
    /// sizing hint only, nothing is reserved from it
    pub area_nodes: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            area_depth: DEFAULT_AREA_DEPTH,
            area_nodes: DEFAULT_AREA_NODES,
        }
    }
}

impl WorldConfig {
    /// Registers the world variables and reads their current values.
    pub fn from_cvars(cvars: &mut CvarContext) -> Result<Self, WorldError> {
        let depth = cvars
            .get(CVAR_AREA_DEPTH, &DEFAULT_AREA_DEPTH.to_string(), CvarFlags::LATCH)
            .integer;
        let nodes = cvars
            .get(CVAR_AREA_NODES, &DEFAULT_AREA_NODES.to_string(), CvarFlags::LATCH)
            .integer;

        let non_negative = |name: &str, v: i32| {
            usize::try_from(v)
                .map_err(|_| WorldError::InvalidArgument(format!("{} is negative ({})", name, v)))
        };
        Ok(Self {
            area_depth: non_negative(CVAR_AREA_DEPTH, depth)?,
            area_nodes: non_negative(CVAR_AREA_NODES, nodes)?,
        })
    }
}

// ============================================================
// World
// ============================================================

#[derive(Debug)]
pub struct World {
    area_depth: usize,
    area_nodes: usize,
    /// pre-order: a sector always comes before its children, root at 0
    sectors: Vec<WorldSector>,
    links: HashMap<usize, EntityLink>,
}

impl World {
    pub fn new(area_depth: usize, area_nodes: usize) -> Result<Self, WorldError> {
        if area_depth > MAX_AREA_DEPTH {
            return Err(WorldError::InvalidArgument(format!(
                "area depth {} exceeds {}",
                area_depth, MAX_AREA_DEPTH
            )));
        }
        Ok(Self {
            area_depth,
            area_nodes,
            sectors: Vec::new(),
            links: HashMap::new(),
        })
    }

    pub fn from_config(config: &WorldConfig) -> Result<Self, WorldError> {
        Self::new(config.area_depth, config.area_nodes)
    }

    pub fn area_depth(&self) -> usize {
        self.area_depth
    }

    pub fn area_nodes(&self) -> usize {
        self.area_nodes
    }

    /// Throws away every sector and link and builds a new tree over
    /// `[world_min, world_max]`.
    pub fn reset(&mut self, world_min: &Vec3, world_max: &Vec3) {
        self.sectors.clear();
        self.links.clear();

        let total = (1usize << (self.area_depth + 1)) - 1;
        self.sectors.reserve(total);
        if total > self.area_nodes {
            debug!("world tree has {} sectors, hint was {}", total, self.area_nodes);
        }

        // (depth, mins, maxs, parent, child slot); the lower half is pushed
        // first so a whole upper subtree is numbered before its sibling
        let mut stack = vec![(0usize, *world_min, *world_max, NO_SECTOR, 0usize)];
        while let Some((depth, mins, maxs, parent, slot)) = stack.pop() {
            let idx = self.sectors.len();
            if parent != NO_SECTOR {
                self.sectors[parent].children[slot] = idx;
            }

            let mut sector = WorldSector::leaf(mins, maxs);
            if depth < self.area_depth {
                let size = vector_subtract(&maxs, &mins);
                let axis = if size[0] >= size[1] { 0 } else { 1 };
                let dist = 0.5 * (maxs[axis] + mins[axis]);
                sector.axis = axis as i32;
                sector.dist = dist;

                let mut maxs1 = maxs;
                let mut mins2 = mins;
                maxs1[axis] = dist;
                mins2[axis] = dist;

                stack.push((depth + 1, mins, maxs1, idx, 1));
                stack.push((depth + 1, mins2, maxs, idx, 0));
            }
            self.sectors.push(sector);
        }

        debug!(
            "world reset: {} sectors over {:?} - {:?}",
            self.sectors.len(),
            world_min,
            world_max
        );
    }

    pub fn sectors(&self) -> &[WorldSector] {
        &self.sectors
    }

    pub fn sector(&self, index: usize) -> Option<&WorldSector> {
        self.sectors.get(index)
    }

    pub fn num_sectors(&self) -> usize {
        self.sectors.len()
    }

    /// Index of the root, `None` before the first reset.
    pub fn root(&self) -> Option<usize> {
        (!self.sectors.is_empty()).then_some(0)
    }

    /// Leaf sectors reached by a box. A box touching a split plane reaches
    /// both sides.
    fn touched_leaves(&self, mins: &Vec3, maxs: &Vec3) -> Vec<usize> {
        let mut leaves = Vec::new();
        let Some(root) = self.root() else {
            return leaves;
        };

        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            let s = &self.sectors[i];
            if s.is_leaf() {
                leaves.push(i);
                continue;
            }
            let axis = s.axis as usize;
            if mins[axis] <= s.dist {
                stack.push(s.children[1]);
            }
            if maxs[axis] >= s.dist {
                stack.push(s.children[0]);
            }
        }
        leaves
    }

    /// Links `ent` into every leaf its bounds reach, relinking if it was
    /// already linked. Returns the sectors it ended up in.
    pub fn link_entity(&mut self, ent: usize, absmin: &Vec3, absmax: &Vec3) -> &[usize] {
        self.unlink_entity(ent);
        if self.sectors.is_empty() {
            return &[];
        }

        let sectors = self.touched_leaves(absmin, absmax);
        for &s in &sectors {
            self.sectors[s].entities.push(ent);
        }

        let link = self.links.entry(ent).or_insert(EntityLink {
            absmin: *absmin,
            absmax: *absmax,
            sectors,
        });
        &link.sectors
    }

    /// Returns false if `ent` wasn't linked.
    pub fn unlink_entity(&mut self, ent: usize) -> bool {
        let Some(link) = self.links.remove(&ent) else {
            return false;
        };
        for s in link.sectors {
            if let Some(sector) = self.sectors.get_mut(s) {
                sector.entities.retain(|&e| e != ent);
            }
        }
        true
    }

    pub fn linked_sectors(&self, ent: usize) -> Option<&[usize]> {
        self.links.get(&ent).map(|l| l.sectors.as_slice())
    }

    pub fn entity_link(&self, ent: usize) -> Option<&EntityLink> {
        self.links.get(&ent)
    }

    /// Entities whose bounds touch `[mins, maxs]`, each once, in the order
    /// they are found. At most `max_count` are returned.
    pub fn area_entities(&self, mins: &Vec3, maxs: &Vec3, max_count: usize) -> Vec<usize> {
        let mut list = Vec::new();
        let mut seen = HashSet::new();

        for leaf in self.touched_leaves(mins, maxs) {
            for &ent in &self.sectors[leaf].entities {
                let Some(link) = self.links.get(&ent) else {
                    continue;
                };
                if !bounds_intersect(&link.absmin, &link.absmax, mins, maxs) {
                    continue; // not touching
                }
                if !seen.insert(ent) {
                    continue;
                }
                if list.len() == max_count {
                    warn!("AreaEntities: MAXCOUNT ({})", max_count);
                    return list;
                }
                list.push(ent);
            }
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD_MIN: Vec3 = [-100.0; 3];
    const WORLD_MAX: Vec3 = [100.0; 3];

    fn world(depth: usize) -> World {
        let mut w = World::new(depth, 64).unwrap();
        w.reset(&WORLD_MIN, &WORLD_MAX);
        w
    }

    #[test]
    fn new_world_owns_no_sectors() {
        let w = World::new(4, 64).unwrap();
        assert_eq!(w.num_sectors(), 0);
        assert_eq!(w.root(), None);
        assert_eq!(w.area_nodes(), 64);
    }

    #[test]
    fn rejects_excessive_depth() {
        assert!(World::new(MAX_AREA_DEPTH, 0).is_ok());
        assert!(matches!(
            World::new(MAX_AREA_DEPTH + 1, 0),
            Err(WorldError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sector_count_for_every_depth() {
        assert_eq!(world(0).num_sectors(), 1);
        assert_eq!(world(1).num_sectors(), 3);
        assert_eq!(world(4).num_sectors(), 31);
        for d in 0..=10 {
            assert_eq!(world(d).num_sectors(), (1 << (d + 1)) - 1, "depth {}", d);
        }
    }

    #[test]
    fn sector_count_ignores_bounds_shape() {
        let mut w = World::new(5, 64).unwrap();
        w.reset(&[0.0, 0.0, 0.0], &[1.0, 5000.0, 3.0]);
        assert_eq!(w.num_sectors(), 63);
        w.reset(&[0.0; 3], &[0.0; 3]);
        assert_eq!(w.num_sectors(), 63);
    }

    #[test]
    fn depth_zero_is_a_single_leaf() {
        let w = world(0);
        let root = w.sector(0).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.children, [NO_SECTOR; 2]);
        assert_eq!((root.mins, root.maxs), (WORLD_MIN, WORLD_MAX));
    }

    #[test]
    fn leaves_are_at_max_depth_and_empty() {
        let w = world(4);
        let leaves: Vec<_> = w.sectors().iter().filter(|s| s.is_leaf()).collect();
        assert_eq!(leaves.len(), 16);
        for s in leaves {
            assert_eq!(s.children, [NO_SECTOR; 2]);
            assert!(s.entities.is_empty());
        }
    }

    #[test]
    fn children_partition_parent() {
        let mut w = World::new(6, 64).unwrap();
        w.reset(&[-300.0, -50.0, -10.0], &[212.0, 700.0, 40.0]);
        for s in w.sectors().iter().filter(|s| !s.is_leaf()) {
            let axis = s.axis as usize;
            let upper = w.sector(s.children[0]).unwrap();
            let lower = w.sector(s.children[1]).unwrap();

            assert_eq!(upper.mins[axis], s.dist);
            assert_eq!(lower.maxs[axis], s.dist);
            assert_eq!(upper.maxs, s.maxs);
            assert_eq!(lower.mins, s.mins);
            for k in (0..3).filter(|&k| k != axis) {
                assert_eq!(upper.mins[k], s.mins[k]);
                assert_eq!(lower.maxs[k], s.maxs[k]);
            }
            assert_eq!(s.dist, 0.5 * (s.mins[axis] + s.maxs[axis]));
        }
    }

    #[test]
    fn sectors_are_numbered_in_pre_order() {
        let w = world(2);
        assert_eq!(w.sector(0).unwrap().children, [1, 4]);
        assert_eq!(w.sector(1).unwrap().children, [2, 3]);
        assert_eq!(w.sector(4).unwrap().children, [5, 6]);
        for (i, s) in w.sectors().iter().enumerate() {
            if !s.is_leaf() {
                assert!(s.children.iter().all(|&c| c > i));
            }
        }
    }

    #[test]
    fn axis_selection() {
        let mut w = World::new(1, 64).unwrap();

        // tie goes to x
        w.reset(&[0.0; 3], &[100.0, 100.0, 500.0]);
        assert_eq!(w.sector(0).unwrap().axis, 0);

        w.reset(&[0.0; 3], &[200.0, 100.0, 50.0]);
        let root = w.sector(0).unwrap();
        assert_eq!((root.axis, root.dist), (0, 100.0));

        w.reset(&[0.0; 3], &[100.0, 300.0, 50.0]);
        let root = w.sector(0).unwrap();
        assert_eq!((root.axis, root.dist), (1, 150.0));
        assert_eq!(w.sector(root.children[0]).unwrap().mins[1], 150.0);
        assert_eq!(w.sector(root.children[1]).unwrap().maxs[1], 150.0);
    }

    #[test]
    fn reference_world() {
        let w = world(4);
        assert_eq!(w.num_sectors(), 31);
        let root = w.sector(0).unwrap();
        assert_eq!(root.axis, 0);
        assert_eq!(root.dist, 0.0);
    }

    #[test]
    fn repeated_reset_is_identical() {
        let mut w = world(4);
        let first = w.sectors().to_vec();
        w.link_entity(1, &[-5.0; 3], &[5.0; 3]);

        w.reset(&WORLD_MIN, &WORLD_MAX);
        assert_eq!(w.sectors(), first.as_slice());
        assert!(w.linked_sectors(1).is_none());

        w.reset(&WORLD_MIN, &WORLD_MAX);
        assert_eq!(w.sectors(), first.as_slice());
    }

    #[test]
    fn link_into_single_leaf() {
        let mut w = world(4);
        let sectors = w.link_entity(1, &[60.0, 60.0, 0.0], &[70.0, 70.0, 10.0]).to_vec();
        assert_eq!(sectors.len(), 1);

        let s = w.sector(sectors[0]).unwrap();
        assert!(s.is_leaf());
        assert_eq!(s.mins, [50.0, 50.0, -100.0]);
        assert_eq!(s.maxs, [100.0, 100.0, 100.0]);
        assert_eq!(s.entities, vec![1]);
    }

    #[test]
    fn bounds_touching_a_plane_reach_both_sides() {
        let mut w = world(4);
        let sectors = w.link_entity(2, &[0.0, 60.0, 0.0], &[10.0, 70.0, 0.0]).to_vec();
        assert_eq!(sectors.len(), 2);
        let sides: Vec<_> = sectors.iter().map(|&s| w.sector(s).unwrap()).collect();
        assert!(sides.iter().any(|s| s.maxs[0] == 0.0));
        assert!(sides.iter().any(|s| s.mins[0] == 0.0));
    }

    #[test]
    fn straddling_entity_links_everywhere_it_reaches() {
        let mut w = world(4);
        // crosses x = 0, y = 0 and every deeper split near the origin
        let n = w.link_entity(3, &[-5.0; 3], &[5.0; 3]).len();
        assert_eq!(n, 4);
        let all = w.link_entity(4, &WORLD_MIN, &WORLD_MAX).len();
        assert_eq!(all, 16);
    }

    #[test]
    fn link_before_reset_is_a_no_op() {
        let mut w = World::new(4, 64).unwrap();
        assert!(w.link_entity(1, &[0.0; 3], &[1.0; 3]).is_empty());
        assert!(w.linked_sectors(1).is_none());
    }

    #[test]
    fn unlink_and_relink() {
        let mut w = world(4);
        let old = w.link_entity(1, &[60.0, 60.0, 0.0], &[70.0, 70.0, 10.0])[0];
        let new = w.link_entity(1, &[-70.0, -70.0, 0.0], &[-60.0, -60.0, 10.0])[0];
        assert_ne!(old, new);
        assert!(w.sector(old).unwrap().entities.is_empty());
        assert_eq!(w.sector(new).unwrap().entities, vec![1]);

        assert!(w.unlink_entity(1));
        assert!(!w.unlink_entity(1));
        assert!(w.sectors().iter().all(|s| s.entities.is_empty()));
        assert!(w.entity_link(1).is_none());
    }

    #[test]
    fn area_entities_filters_and_dedups() {
        let mut w = world(4);
        w.link_entity(1, &[60.0, 60.0, 0.0], &[70.0, 70.0, 10.0]);
        w.link_entity(2, &[-5.0; 3], &[5.0; 3]);
        w.link_entity(3, &[-90.0, -90.0, 0.0], &[-80.0, -80.0, 0.0]);

        assert_eq!(w.area_entities(&[55.0, 55.0, 0.0], &[75.0, 75.0, 5.0], 16), vec![1]);
        // same leaf as entity 1 but not touching it
        assert!(w.area_entities(&[90.0, 90.0, 0.0], &[95.0, 95.0, 5.0], 16).is_empty());

        let mut everything = w.area_entities(&WORLD_MIN, &WORLD_MAX, 16);
        everything.sort_unstable();
        assert_eq!(everything, vec![1, 2, 3]);

        assert_eq!(w.area_entities(&WORLD_MIN, &WORLD_MAX, 2).len(), 2);
        assert!(w.area_entities(&WORLD_MIN, &WORLD_MAX, 0).is_empty());
    }

    #[test]
    fn config_from_cvars() {
        let mut cvars = CvarContext::new();
        assert_eq!(WorldConfig::from_cvars(&mut cvars).unwrap(), WorldConfig::default());

        cvars.set(CVAR_AREA_DEPTH, "6");
        let config = WorldConfig::from_cvars(&mut cvars).unwrap();
        assert_eq!(config.area_depth, 6);
        assert_eq!(World::from_config(&config).unwrap().area_depth(), 6);

        cvars.set(CVAR_AREA_NODES, "-1");
        assert!(WorldConfig::from_cvars(&mut cvars).is_err());
    }
}
