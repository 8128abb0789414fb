// p_config.rs — movement rules read from console variables
//
// The rules are captured once into a MoveConfig when a level starts and
// handed to the movement code through MapContext. Nothing reads cvars
// in the middle of a move.

use sectormove_common::cvar::{with_cvars, CvarContext, CVAR_ARCHIVE, CVAR_LATCH};
use thiserror::Error;

use crate::p_local::SurfaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropoffPolicy {
    /// Never stand over a drop taller than a step.
    #[default]
    Strict,
    /// Walk off ledges; the move reports that a fall started.
    Permissive,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("sv_dropoff must be \"strict\" or \"permissive\", got \"{0}\"")]
    BadDropoff(String),
    #[error("{name} must be 0 or 1, got \"{value}\"")]
    BadBool { name: &'static str, value: String },
    #[error("{name} is not a valid number: \"{value}\"")]
    BadNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveConfig {
    pub dropoff: DropoffPolicy,
    pub autoaim: bool,
    pub coop: bool,
    /// Blast distance includes the vertical offset.
    pub blast_uses_z: bool,
    /// Monsters may telefrag, not only players and CAN_TELEFRAG archetypes.
    pub monster_telefrag: bool,
    pub sky_flat: Option<SurfaceId>,
    pub seed: u64,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            dropoff: DropoffPolicy::Strict,
            autoaim: true,
            coop: false,
            blast_uses_z: false,
            monster_telefrag: false,
            sky_flat: None,
            seed: 0,
        }
    }
}

impl MoveConfig {
    /// Register every movement cvar with its default.
    pub fn register_cvars(cvars: &mut CvarContext) {
        cvars.get("sv_dropoff", "strict", CVAR_LATCH);
        cvars.get("sv_autoaim", "1", CVAR_ARCHIVE);
        cvars.get("coop", "0", CVAR_LATCH);
        cvars.get("sv_blast_z", "0", CVAR_LATCH);
        cvars.get("sv_monster_telefrag", "0", CVAR_LATCH);
        cvars.get("sv_skyflat", "-1", 0);
        cvars.get("sv_seed", "0", 0);
    }

    /// Build the rules from the current cvar values. Unregistered cvars keep
    /// their defaults.
    pub fn from_cvars(cvars: &CvarContext) -> Result<Self, ConfigError> {
        let mut cfg = MoveConfig::default();

        if let Some(var) = cvars.find_var("sv_dropoff") {
            cfg.dropoff = match var.string.as_str() {
                "strict" | "0" => DropoffPolicy::Strict,
                "permissive" | "1" => DropoffPolicy::Permissive,
                other => return Err(ConfigError::BadDropoff(other.to_string())),
            };
        }
        if let Some(v) = cvar_bool(cvars, "sv_autoaim")? {
            cfg.autoaim = v;
        }
        if let Some(v) = cvar_bool(cvars, "coop")? {
            cfg.coop = v;
        }
        if let Some(v) = cvar_bool(cvars, "sv_blast_z")? {
            cfg.blast_uses_z = v;
        }
        if let Some(v) = cvar_bool(cvars, "sv_monster_telefrag")? {
            cfg.monster_telefrag = v;
        }
        if let Some(var) = cvars.find_var("sv_skyflat") {
            let n: i64 = var.string.trim().parse().map_err(|_| ConfigError::BadNumber {
                name: "sv_skyflat",
                value: var.string.clone(),
            })?;
            cfg.sky_flat = u32::try_from(n).ok();
        }
        if let Some(var) = cvars.find_var("sv_seed") {
            cfg.seed = var.string.trim().parse().map_err(|_| ConfigError::BadNumber {
                name: "sv_seed",
                value: var.string.clone(),
            })?;
        }
        Ok(cfg)
    }

    /// Rules from the process-wide cvars, or the defaults before `cvar_init`.
    pub fn from_global() -> Result<Self, ConfigError> {
        with_cvars(|cvars| MoveConfig::from_cvars(cvars)).unwrap_or_else(|| Ok(MoveConfig::default()))
    }

    pub fn is_sky(&self, pic: SurfaceId) -> bool {
        self.sky_flat == Some(pic)
    }
}

fn cvar_bool(cvars: &CvarContext, name: &'static str) -> Result<Option<bool>, ConfigError> {
    match cvars.find_var(name) {
        None => Ok(None),
        Some(var) => match var.string.trim() {
            "0" => Ok(Some(false)),
            "1" => Ok(Some(true)),
            other => Err(ConfigError::BadBool {
                name,
                value: other.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_registered_cvars() {
        let mut cvars = CvarContext::new();
        MoveConfig::register_cvars(&mut cvars);
        let cfg = MoveConfig::from_cvars(&cvars).unwrap();
        assert_eq!(cfg, MoveConfig::default());
    }

    #[test]
    fn test_unregistered_cvars_keep_defaults() {
        let cvars = CvarContext::new();
        assert_eq!(MoveConfig::from_cvars(&cvars).unwrap(), MoveConfig::default());
    }

    #[test]
    fn test_permissive_and_flags() {
        let mut cvars = CvarContext::new();
        MoveConfig::register_cvars(&mut cvars);
        cvars.set("sv_dropoff", "permissive", false);
        cvars.set("sv_autoaim", "0", false);
        cvars.set("coop", "1", false);
        cvars.set("sv_skyflat", "7", false);
        cvars.set("sv_seed", "1234", false);
        let cfg = MoveConfig::from_cvars(&cvars).unwrap();
        assert_eq!(cfg.dropoff, DropoffPolicy::Permissive);
        assert!(!cfg.autoaim);
        assert!(cfg.coop);
        assert!(cfg.is_sky(7));
        assert!(!cfg.is_sky(0));
        assert_eq!(cfg.seed, 1234);
    }

    #[test]
    fn test_latched_dropoff_waits_for_level_start() {
        let mut cvars = CvarContext::new();
        MoveConfig::register_cvars(&mut cvars);
        cvars.set("sv_dropoff", "permissive", true);
        assert_eq!(MoveConfig::from_cvars(&cvars).unwrap().dropoff, DropoffPolicy::Strict);
        cvars.get_latched_vars();
        assert_eq!(MoveConfig::from_cvars(&cvars).unwrap().dropoff, DropoffPolicy::Permissive);
    }

    #[test]
    fn test_from_global_registry() {
        sectormove_common::cvar::cvar_init();
        with_cvars(|c| {
            MoveConfig::register_cvars(c);
            c.set("coop", "1", false);
        });
        assert!(MoveConfig::from_global().unwrap().coop);
        sectormove_common::cvar::cvar_shutdown();
        assert_eq!(MoveConfig::from_global().unwrap(), MoveConfig::default());
    }

    #[test]
    fn test_bad_values_are_errors() {
        let mut cvars = CvarContext::new();
        cvars.get("sv_dropoff", "sometimes", 0);
        assert_eq!(
            MoveConfig::from_cvars(&cvars),
            Err(ConfigError::BadDropoff("sometimes".to_string()))
        );

        let mut cvars = CvarContext::new();
        cvars.get("sv_autoaim", "yes", 0);
        assert!(matches!(
            MoveConfig::from_cvars(&cvars),
            Err(ConfigError::BadBool { name: "sv_autoaim", .. })
        ));

        let mut cvars = CvarContext::new();
        cvars.get("sv_seed", "abc", 0);
        let err = MoveConfig::from_cvars(&cvars).unwrap_err();
        assert_eq!(err.to_string(), "sv_seed is not a valid number: \"abc\"");
    }
}
