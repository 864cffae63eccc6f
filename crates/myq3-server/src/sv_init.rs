// sv_init.rs -- server level spawn
//
// Loads a level through the collision model and rebuilds the world sector
// tree over its bounds.

use log::info;

use myq3_common::cmodel::CollisionContext;
use myq3_common::cvar::{CollisionConfig, CvarContext};
use myq3_common::error::CollisionError;
use myq3_common::files::FileSystem;

use crate::sv_world::{World, WorldConfig, WorldError};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Collision(#[from] CollisionError),
    #[error(transparent)]
    World(#[from] WorldError),
}

#[derive(Debug)]
pub struct ServerContext {
    cvars: CvarContext,
    cm: CollisionContext,
    world: World,
    map_name: String,
}

impl ServerContext {
    /// Registers the server variables and applies any pending latched values.
    pub fn new(mut cvars: CvarContext) -> Result<Self, ServerError> {
        cvars.get_latched_vars();
        let cm = CollisionContext::from_cvars(&mut cvars);
        let world = World::from_config(&WorldConfig::from_cvars(&mut cvars)?)?;

        Ok(Self {
            cvars,
            cm,
            world,
            map_name: String::new(),
        })
    }

    /// Loads `maps/<mapname>.bsp` and builds the world tree over inline
    /// model 0. Returns the level checksum.
    ///
    /// On failure the previously spawned level and world stay in place.
    pub fn spawn_server(&mut self, fs: &dyn FileSystem, mapname: &str) -> Result<u32, ServerError> {
        if mapname.is_empty() {
            return Err(CollisionError::invalid("SpawnServer: empty map name").into());
        }

        self.cvars.get_latched_vars();
        let mut world = World::from_config(&WorldConfig::from_cvars(&mut self.cvars)?)?;
        self.cm.set_config(CollisionConfig::from_cvars(&mut self.cvars));

        let name = format!("maps/{}.bsp", mapname);
        let checksum = self.cm.load_map(&name, fs, false)?;
        let (mins, maxs) = self.cm.model().model_bounds(0)?;
        world.reset(&mins, &maxs);

        self.world = world;
        self.map_name = mapname.to_string();
        self.cvars.server_running = true;

        info!(
            "SpawnServer: {} ({} world sectors, checksum {:#010x})",
            mapname,
            self.world.num_sectors(),
            checksum
        );
        Ok(checksum)
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn cvars(&self) -> &CvarContext {
        &self.cvars
    }

    pub fn cvars_mut(&mut self) -> &mut CvarContext {
        &mut self.cvars
    }

    pub fn collision(&self) -> &CollisionContext {
        &self.cm
    }

    pub fn collision_mut(&mut self) -> &mut CollisionContext {
        &mut self.cm
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sv_world::CVAR_AREA_DEPTH;
    use myq3_common::files::MemFileSystem;
    use myq3_common::testkit::{sample_fs, SampleMap};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn server() -> ServerContext {
        ServerContext::new(CvarContext::new()).unwrap()
    }

    #[test]
    fn spawn_builds_world_over_level_bounds() {
        init_logging();
        let mut sv = server();
        let fs = sample_fs();

        let checksum = sv.spawn_server(&fs, "sample").unwrap();
        assert_eq!(checksum, sv.collision().model().checksum());
        assert_eq!(sv.map_name(), "sample");
        assert!(sv.cvars().server_running);

        let world = sv.world();
        assert_eq!(world.num_sectors(), 31);
        let (mins, maxs) = sv.collision().model().model_bounds(0).unwrap();
        let root = world.sector(0).unwrap();
        assert_eq!((root.mins, root.maxs), (mins, maxs));
    }

    #[test]
    fn respawn_of_same_level_keeps_checksum() {
        let mut sv = server();
        let fs = sample_fs();
        let first = sv.spawn_server(&fs, "sample").unwrap();
        sv.world_mut().link_entity(1, &[0.0; 3], &[1.0; 3]);

        assert_eq!(sv.spawn_server(&fs, "sample").unwrap(), first);
        assert!(sv.world().linked_sectors(1).is_none());
    }

    #[test]
    fn failed_spawn_keeps_previous_level() {
        init_logging();
        let mut sv = server();
        let mut fs = sample_fs();
        sv.spawn_server(&fs, "sample").unwrap();
        sv.world_mut().link_entity(7, &[0.0; 3], &[1.0; 3]);

        assert!(matches!(
            sv.spawn_server(&fs, "missing"),
            Err(ServerError::Collision(CollisionError::Io { .. }))
        ));

        fs.insert("maps/old.bsp", SampleMap::new().with_version(38).to_bytes());
        assert!(matches!(
            sv.spawn_server(&fs, "old"),
            Err(ServerError::Collision(CollisionError::Format(_)))
        ));

        assert_eq!(sv.map_name(), "sample");
        assert_eq!(sv.collision().model().name(), "maps/sample.bsp");
        assert!(sv.world().linked_sectors(7).is_some());
    }

    #[test]
    fn empty_map_name_is_rejected() {
        let mut sv = server();
        assert!(matches!(
            sv.spawn_server(&MemFileSystem::new(), ""),
            Err(ServerError::Collision(CollisionError::InvalidArgument(_)))
        ));
    }

    #[test]
    fn area_depth_is_latched_until_respawn() {
        let mut sv = server();
        let fs = sample_fs();
        sv.spawn_server(&fs, "sample").unwrap();

        sv.cvars_mut().set(CVAR_AREA_DEPTH, "2");
        assert_eq!(sv.cvars().integer(CVAR_AREA_DEPTH), 4);
        assert_eq!(sv.world().num_sectors(), 31);

        sv.spawn_server(&fs, "sample").unwrap();
        assert_eq!(sv.world().area_depth(), 2);
        assert_eq!(sv.world().num_sectors(), 7);
    }

    #[test]
    fn bad_area_depth_fails_before_loading() {
        let mut cvars = CvarContext::new();
        cvars.set(CVAR_AREA_DEPTH, "40");
        assert!(matches!(
            ServerContext::new(cvars),
            Err(ServerError::World(WorldError::InvalidArgument(_)))
        ));
    }
}
