// cvar.rs -- console variables that configure the collision model and world

use bitflags::bitflags;
use log::{debug, info, warn};

use std::collections::HashMap;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CvarFlags: u32 {
        /// saved to the config file
        const ARCHIVE = 1;
        /// changes only take effect on the next map spawn
        const LATCH = 2;
        /// read only, can only be changed with `force_set`
        const ROM = 4;
        /// can only be changed while cheats are allowed
        const CHEAT = 8;
    }
}

/// A console variable.
#[derive(Debug, Clone)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub reset_string: String,
    pub latched_string: Option<String>,
    pub flags: CvarFlags,
    pub modified: bool,
    pub value: f32,
    pub integer: i32,
}

impl Cvar {
    fn assign(&mut self, value: &str) {
        self.string = value.to_string();
        self.value = parse_value(value);
        self.integer = self.value as i32;
        self.modified = true;
    }
}

fn parse_value(s: &str) -> f32 {
    s.trim().parse::<f32>().unwrap_or(0.0)
}

/// The variable table. Lookups are by exact name.
#[derive(Debug, Default)]
pub struct CvarContext {
    vars: Vec<Cvar>,
    index: HashMap<String, usize>,
    /// While set, LATCH variables store new values instead of applying them.
    pub server_running: bool,
    pub cheats_allowed: bool,
}

impl CvarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.index.get(name).map(|&idx| &self.vars[idx])
    }

    /// Get or create a variable. An existing variable keeps its value and
    /// gains `flags`.
    pub fn get(&mut self, name: &str, default: &str, flags: CvarFlags) -> &Cvar {
        if let Some(&idx) = self.index.get(name) {
            let var = &mut self.vars[idx];
            var.flags |= flags;
            var.reset_string = default.to_string();
            return var;
        }

        let value = parse_value(default);
        let idx = self.vars.len();
        self.vars.push(Cvar {
            name: name.to_string(),
            string: default.to_string(),
            reset_string: default.to_string(),
            latched_string: None,
            flags,
            modified: true,
            value,
            integer: value as i32,
        });
        self.index.insert(name.to_string(), idx);
        &self.vars[idx]
    }

    fn set2(&mut self, name: &str, value: &str, force: bool) {
        let Some(&idx) = self.index.get(name) else {
            self.get(name, value, CvarFlags::empty());
            return;
        };
        let server_running = self.server_running;
        let cheats_allowed = self.cheats_allowed;
        let var = &mut self.vars[idx];

        if force {
            var.latched_string = None;
        } else {
            if var.flags.contains(CvarFlags::ROM) {
                warn!("{} is read only.", name);
                return;
            }
            if var.flags.contains(CvarFlags::CHEAT) && !cheats_allowed {
                warn!("{} is cheat protected.", name);
                return;
            }
            if var.flags.contains(CvarFlags::LATCH) && server_running {
                let pending = var.latched_string.as_deref().unwrap_or(&var.string);
                if value == pending {
                    return;
                }
                if value == var.string {
                    var.latched_string = None;
                    return;
                }
                info!("{} will be changed upon restarting.", name);
                var.latched_string = Some(value.to_string());
                return;
            }
        }

        if value == var.string {
            return;
        }
        var.assign(value);
    }

    /// Set a variable, honouring ROM, CHEAT and LATCH.
    pub fn set(&mut self, name: &str, value: &str) {
        self.set2(name, value, false);
    }

    /// Set a variable ignoring every protection flag.
    pub fn force_set(&mut self, name: &str, value: &str) {
        self.set2(name, value, true);
    }

    pub fn set_value(&mut self, name: &str, value: f32) {
        let s = if value == (value as i32) as f32 {
            format!("{}", value as i32)
        } else {
            format!("{}", value)
        };
        self.set(name, &s);
    }

    /// Restore a variable's default.
    pub fn reset(&mut self, name: &str) {
        if let Some(default) = self.find_var(name).map(|v| v.reset_string.clone()) {
            self.set(name, &default);
        }
    }

    /// Apply all latched variable changes.
    pub fn get_latched_vars(&mut self) {
        for var in &mut self.vars {
            if let Some(latched) = var.latched_string.take() {
                debug!("{} latched to \"{}\"", var.name, latched);
                var.assign(&latched);
            }
        }
    }

    /// Returns 0 for unknown variables.
    pub fn value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |v| v.value)
    }

    pub fn integer(&self, name: &str) -> i32 {
        self.find_var(name).map_or(0, |v| v.integer)
    }

    /// Returns "" for unknown variables.
    pub fn string(&self, name: &str) -> &str {
        self.find_var(name).map_or("", |v| v.string.as_str())
    }

    pub fn modified(&self, name: &str) -> bool {
        self.find_var(name).is_some_and(|v| v.modified)
    }

    pub fn clear_modified(&mut self, name: &str) {
        if let Some(&idx) = self.index.get(name) {
            self.vars[idx].modified = false;
        }
    }

    pub fn vars(&self) -> &[Cvar] {
        &self.vars
    }
}

// ============================================================
// Collision model configuration
// ============================================================

pub const CVAR_CM_NO_AREAS: &str = "cm_noAreas";

/// Settings read by the collision model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionConfig {
    /// Treat every area as connected to every other.
    pub no_areas: bool,
}

impl CollisionConfig {
    /// Registers the collision variables and reads their current values.
    pub fn from_cvars(cvars: &mut CvarContext) -> Self {
        let no_areas = cvars.get(CVAR_CM_NO_AREAS, "0", CvarFlags::CHEAT).integer != 0;
        Self { no_areas }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_creates_once() {
        let mut ctx = CvarContext::new();
        ctx.get("test", "1", CvarFlags::empty());
        ctx.get("test", "2", CvarFlags::ARCHIVE);
        assert_eq!(ctx.string("test"), "1");
        assert!(ctx.find_var("test").unwrap().flags.contains(CvarFlags::ARCHIVE));
    }

    #[test]
    fn set_parses_numbers() {
        let mut ctx = CvarContext::new();
        ctx.get("depth", "4", CvarFlags::empty());
        ctx.set("depth", "6");
        assert_eq!(ctx.integer("depth"), 6);
        ctx.set_value("depth", 2.5);
        assert_eq!(ctx.string("depth"), "2.5");
        ctx.set("depth", "junk");
        assert_eq!(ctx.value("depth"), 0.0);
    }

    #[test]
    fn unknown_vars_read_as_zero() {
        let ctx = CvarContext::new();
        assert_eq!(ctx.value("nope"), 0.0);
        assert_eq!(ctx.string("nope"), "");
        assert!(!ctx.modified("nope"));
    }

    #[test]
    fn rom_needs_force() {
        let mut ctx = CvarContext::new();
        ctx.get("version", "1", CvarFlags::ROM);
        ctx.set("version", "2");
        assert_eq!(ctx.integer("version"), 1);
        ctx.force_set("version", "2");
        assert_eq!(ctx.integer("version"), 2);
    }

    #[test]
    fn cheat_vars_need_cheats() {
        let mut ctx = CvarContext::new();
        ctx.get(CVAR_CM_NO_AREAS, "0", CvarFlags::CHEAT);
        ctx.set(CVAR_CM_NO_AREAS, "1");
        assert_eq!(ctx.integer(CVAR_CM_NO_AREAS), 0);
        ctx.cheats_allowed = true;
        ctx.set(CVAR_CM_NO_AREAS, "1");
        assert_eq!(ctx.integer(CVAR_CM_NO_AREAS), 1);
    }

    #[test]
    fn latch_applies_on_request() {
        let mut ctx = CvarContext::new();
        ctx.get("sv_areaDepth", "4", CvarFlags::LATCH);

        // not running: applies immediately
        ctx.set("sv_areaDepth", "5");
        assert_eq!(ctx.integer("sv_areaDepth"), 5);

        ctx.server_running = true;
        ctx.set("sv_areaDepth", "6");
        assert_eq!(ctx.integer("sv_areaDepth"), 5);
        assert_eq!(
            ctx.find_var("sv_areaDepth").unwrap().latched_string.as_deref(),
            Some("6")
        );

        ctx.get_latched_vars();
        assert_eq!(ctx.integer("sv_areaDepth"), 6);
        assert!(ctx.find_var("sv_areaDepth").unwrap().latched_string.is_none());
    }

    #[test]
    fn reset_restores_default() {
        let mut ctx = CvarContext::new();
        ctx.get("x", "3", CvarFlags::empty());
        ctx.set("x", "9");
        ctx.reset("x");
        assert_eq!(ctx.integer("x"), 3);
    }

    #[test]
    fn modified_tracking() {
        let mut ctx = CvarContext::new();
        ctx.get("x", "3", CvarFlags::empty());
        assert!(ctx.modified("x"));
        ctx.clear_modified("x");
        ctx.set("x", "3");
        assert!(!ctx.modified("x"));
        ctx.set("x", "4");
        assert!(ctx.modified("x"));
    }

    #[test]
    fn collision_config_registers_no_areas() {
        let mut ctx = CvarContext::new();
        assert!(!CollisionConfig::from_cvars(&mut ctx).no_areas);
        ctx.force_set(CVAR_CM_NO_AREAS, "1");
        assert!(CollisionConfig::from_cvars(&mut ctx).no_areas);
    }
}
