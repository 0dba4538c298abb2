use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Horizontal and vertical movement feel for the player. Speeds are scene
/// units per tick, rates are per-tick changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Top speed without run held.
    pub walk_speed: f32,
    /// Top speed with run held.
    pub run_speed: f32,
    /// Speed gained per tick toward the top speed.
    pub acceleration: f32,
    /// Deceleration with no direction held.
    pub passive_deceleration: f32,
    /// Deceleration while holding the opposite direction.
    pub active_deceleration: f32,
    /// Opposing speed at or above which the player skids.
    pub skid_threshold: f32,

    /// Upward launch speed of a standing jump.
    pub jump_velocity: f32,
    /// Added to the jump velocity while running.
    pub run_jump_bonus: f32,
    /// Jump velocity multiplier when the jump stomps an enemy.
    pub stomp_multiplier: f32,
    /// Upward deceleration while ascending.
    pub gravity: f32,
    /// Downward acceleration once descending.
    pub fall_gravity: f32,
    /// Terminal fall speed.
    pub max_fall_speed: f32,
    /// Ascent ends once vertical velocity is this close to its target.
    pub velocity_tolerance: f32,
    /// Constant fall speed while gliding.
    pub glide_fall_speed: f32,

    /// Jump buffer on foot, in milliseconds.
    pub jump_buffer_ms: u64,
    /// Jump buffer while gliding, in milliseconds.
    pub glide_jump_buffer_ms: u64,
    /// Coyote window, in milliseconds.
    pub coyote_ms: u64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            walk_speed: 4.0,
            run_speed: 7.0,
            acceleration: 0.3,
            passive_deceleration: 0.25,
            active_deceleration: 0.6,
            skid_threshold: 3.0,
            jump_velocity: 10.0,
            run_jump_bonus: 1.5,
            stomp_multiplier: 1.15,
            gravity: 0.5,
            fall_gravity: 0.6,
            max_fall_speed: 9.0,
            velocity_tolerance: 0.5,
            glide_fall_speed: 1.5,
            jump_buffer_ms: 100,
            glide_jump_buffer_ms: 150,
            coyote_ms: 100,
        }
    }
}

impl PlayerTuning {
    /// How long a jump press stays buffered.
    pub fn jump_buffer(&self, gliding: bool) -> Duration {
        Duration::from_millis(if gliding {
            self.glide_jump_buffer_ms
        } else {
            self.jump_buffer_ms
        })
    }

    /// How long after leaving the ground a jump still registers.
    pub fn coyote_window(&self) -> Duration {
        Duration::from_millis(self.coyote_ms)
    }

    /// Launch speed of a jump.
    pub fn jump_speed(&self, running: bool) -> f32 {
        if running {
            self.jump_velocity + self.run_jump_bonus
        } else {
            self.jump_velocity
        }
    }

    /// Ticks from the jump until the player stops ascending, assuming no ceiling.
    pub fn ascent_ticks(&self, running: bool) -> u32 {
        let speed = self.jump_speed(running);
        ((speed - self.velocity_tolerance) / self.gravity).ceil().max(0.0) as u32 + 1
    }
}

/// Grappling hook extension and pendulum tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookTuning {
    /// Initial tip speed, scene units per tick.
    pub launch_speed: f32,
    /// Tip speed gained each tick while extending.
    pub acceleration: f32,
    /// Longest the rope can extend before the hook is dropped.
    pub max_length: f32,
    /// Launch angle above the horizontal, in degrees, mirrored by facing.
    pub launch_angle_deg: f32,
    /// Pendulum gravity, scene units per second squared.
    pub gravity: f32,
    /// Angular drag, proportional to angular velocity.
    pub damping: f32,
    /// Angular velocity added per tick when pumping the swing (rad/s).
    pub pump_strength: f32,
    /// Scale applied to the swing velocity when jumping off.
    pub launch_multiplier: f32,
    /// Extra upward speed when jumping off.
    pub launch_boost: f32,
    /// Tip sample points checked per tick while extending.
    pub samples: u32,
}

impl Default for HookTuning {
    fn default() -> Self {
        Self {
            launch_speed: 8.0,
            acceleration: 1.0,
            max_length: 320.0,
            launch_angle_deg: 60.0,
            gravity: 980.0,
            damping: 0.4,
            pump_strength: 0.05,
            launch_multiplier: 1.0,
            launch_boost: 4.0,
            samples: 4,
        }
    }
}

/// Enemy movement speeds, scene units per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    /// Walking speed.
    pub patrol_speed: f32,
    /// Constant fall speed.
    pub fall_speed: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            patrol_speed: 1.0,
            fall_speed: 4.0,
        }
    }
}

/// Moving platform defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTuning {
    /// Speed given to platforms placed in the editor.
    pub default_speed: f32,
}

impl Default for PlatformTuning {
    fn default() -> Self {
        Self { default_speed: 2.0 }
    }
}

/// How vertical velocity is inverted when the player bumps a ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingBounce {
    /// `v' = -v * damping`.
    #[default]
    SignFlip,
    /// `v' = -damping / v`. Zero velocity leaves the player at rest.
    Reciprocal,
}

impl CeilingBounce {
    /// Bounce `velocity` off a ceiling.
    pub fn apply(self, velocity: f32, damping: f32) -> f32 {
        match self {
            Self::SignFlip => -velocity * damping,
            Self::Reciprocal => {
                if velocity == 0.0 {
                    log::warn!("ceiling bounce with zero vertical velocity, leaving it at rest");
                    0.0
                } else {
                    -damping / velocity
                }
            }
        }
    }
}

/// Collision and ground detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Vertical reach of ground detection.
    pub ground_tolerance: f32,
    /// Bounce formula.
    pub ceiling_bounce: CeilingBounce,
    /// Fraction of speed kept by the bounce.
    pub ceiling_damping: f32,
    /// Fall target after bumping a ceiling.
    pub ceiling_fall_target: f32,
    /// Touching an enemy other than by landing on it kills the player.
    pub enemy_contact_kills: bool,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            ground_tolerance: 5.0,
            ceiling_bounce: CeilingBounce::SignFlip,
            ceiling_damping: 0.5,
            ceiling_fall_target: 4.0,
            enemy_contact_kills: true,
        }
    }
}

/// Camera follow tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Fraction of the remaining distance covered each tick.
    pub follow_rate: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self { follow_rate: 0.1 }
    }
}

/// Editor placement tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorTuning {
    /// Placement snaps to multiples of this.
    pub grid: f32,
}

impl Default for EditorTuning {
    fn default() -> Self {
        Self { grid: 32.0 }
    }
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Ticks per second.
    pub frame_rate: u32,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Put dead enemies back when the player continues after dying.
    pub reset_enemies_on_continue: bool,
    /// Player movement.
    pub player: PlayerTuning,
    /// Grappling hook.
    pub hook: HookTuning,
    /// Enemies.
    pub enemy: EnemyTuning,
    /// Moving platforms.
    pub platform: PlatformTuning,
    /// Collision resolution.
    pub collision: CollisionTuning,
    /// Camera.
    pub camera: CameraTuning,
    /// Editor.
    pub editor: EditorTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            max_events: 0,
            reset_enemies_on_continue: true,
            player: PlayerTuning::default(),
            hook: HookTuning::default(),
            enemy: EnemyTuning::default(),
            platform: PlatformTuning::default(),
            collision: CollisionTuning::default(),
            camera: CameraTuning::default(),
            editor: EditorTuning::default(),
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON config. Missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_json_file(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Reject values the systems cannot run with.
    pub fn validate(&self) -> SimResult<()> {
        if self.frame_rate == 0 {
            return Err(SimError::Config("frame_rate must be positive".into()));
        }
        if self.player.gravity <= 0.0 || self.player.fall_gravity <= 0.0 {
            return Err(SimError::Config("player gravity must be positive".into()));
        }
        if self.hook.max_length <= 0.0 || self.hook.samples == 0 {
            return Err(SimError::Config(
                "hook max_length and samples must be positive".into(),
            ));
        }
        if self.editor.grid <= 0.0 {
            return Err(SimError::Config("editor grid must be positive".into()));
        }
        Ok(())
    }

    /// Set the ticks per second.
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Replace the player tuning.
    pub fn with_player(mut self, player: PlayerTuning) -> Self {
        self.player = player;
        self
    }

    /// Replace the hook tuning.
    pub fn with_hook(mut self, hook: HookTuning) -> Self {
        self.hook = hook;
        self
    }

    /// Replace the enemy tuning.
    pub fn with_enemy(mut self, enemy: EnemyTuning) -> Self {
        self.enemy = enemy;
        self
    }

    /// Replace the collision tuning.
    pub fn with_collision(mut self, collision: CollisionTuning) -> Self {
        self.collision = collision;
        self
    }

    /// Choose the ceiling bounce formula.
    pub fn with_ceiling_bounce(mut self, bounce: CeilingBounce) -> Self {
        self.collision.ceiling_bounce = bounce;
        self
    }

    /// Whether dead enemies come back on continue.
    pub fn with_reset_enemies_on_continue(mut self, reset: bool) -> Self {
        self.reset_enemies_on_continue = reset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.max_events, 0);
        assert_eq!(config.collision.ground_tolerance, 5.0);
        assert_eq!(config.player.jump_buffer(false), Duration::from_millis(100));
        assert!(config.player.jump_buffer(true) > config.player.jump_buffer(false));
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_max_events(500)
            .with_ceiling_bounce(CeilingBounce::Reciprocal)
            .with_reset_enemies_on_continue(false);
        assert_eq!(config.max_events, 500);
        assert_eq!(config.collision.ceiling_bounce, CeilingBounce::Reciprocal);
        assert!(!config.reset_enemies_on_continue);
    }

    #[test]
    fn partial_json_overrides_only_named_keys() {
        let config =
            SimConfig::from_json_str(r#"{ "player": { "jump_velocity": 12.0 }, "max_events": 10 }"#)
                .unwrap();
        assert_eq!(config.player.jump_velocity, 12.0);
        assert_eq!(config.player.walk_speed, 4.0);
        assert_eq!(config.max_events, 10);
        assert_eq!(config.hook, HookTuning::default());
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(SimError::Config(_))
        ));
        assert!(matches!(
            SimConfig::from_json_str(r#"{ "frame_rate": 0 }"#),
            Err(SimError::Config(_))
        ));
    }

    #[test]
    fn ascent_ticks_matches_tuning() {
        let tuning = PlayerTuning::default();
        // (10 - 0.5) / 0.5 = 19 ticks of ascent, the 20th flips to descent.
        assert_eq!(tuning.ascent_ticks(false), 20);
    }

    #[test]
    fn ceiling_bounce_variants() {
        assert_eq!(CeilingBounce::SignFlip.apply(-8.0, 0.5), 4.0);
        assert_eq!(CeilingBounce::Reciprocal.apply(-0.5, 0.5), 1.0);
        assert_eq!(CeilingBounce::Reciprocal.apply(0.0, 0.5), 0.0);
        assert_eq!(CeilingBounce::SignFlip.apply(0.0, 0.5), 0.0);
    }
}
