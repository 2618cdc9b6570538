use glam::Vec2;
use mari_engine::Viewport;
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;

/// Arena layout and tuning. Every field has a default, so a partial JSON
/// object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub viewport: Viewport,
    pub pipe_width: f32,
    /// Horizontal distance between consecutive pipe pairs.
    pub pipe_spacing: f32,
    /// Vertical opening between a top and a bottom pipe.
    pub pipe_gap: f32,
    /// Number of recycled pipe slots.
    pub pipe_slots: usize,
    /// Floor height as a fraction of the viewport height.
    pub floor_ratio: f32,
    pub player_size: Vec2,
    /// Upward velocity change per flap (px/s). Scaled by the bird's mass
    /// into an impulse.
    pub flap_impulse: f32,
    /// Flying above this y is fatal.
    pub ceiling_y: f32,
    /// Key codes that count as a flap on `onKeyPress`.
    pub flap_keys: Vec<String>,
    /// Countdown between `start-game` and the live swap.
    pub countdown_secs: f64,
    /// Fixed physics step in seconds.
    pub fixed_dt: f32,
    /// Seed for pipe heights.
    pub seed: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            pipe_width: 100.0,
            pipe_spacing: 300.0,
            pipe_gap: 300.0,
            pipe_slots: 10,
            floor_ratio: 0.1,
            player_size: Vec2::new(70.0, 50.0),
            flap_impulse: 350.0,
            ceiling_y: 25.0,
            flap_keys: vec!["KeyW".to_string()],
            countdown_secs: 10.0,
            fixed_dt: 1.0 / 60.0,
            seed: 0x5eed_f1a9,
        }
    }
}

impl ArenaConfig {
    pub fn from_json(json: &str) -> Result<Self, ScreenError> {
        serde_json::from_str(json).map_err(ScreenError::Config)
    }

    pub fn floor_height(&self) -> f32 {
        self.viewport.height * self.floor_ratio
    }

    /// Y of the floor's top edge.
    pub fn floor_top(&self) -> f32 {
        self.viewport.height - self.floor_height()
    }

    /// Where the bird spawns.
    pub fn player_spawn(&self) -> Vec2 {
        Vec2::new(self.viewport.width / 4.0, self.viewport.height / 3.0)
    }

    pub fn is_flap_key(&self, code: &str) -> bool {
        self.flap_keys.iter().any(|k| k == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_arena_layout() {
        let config = ArenaConfig::default();
        assert_eq!(config.pipe_slots, 10);
        assert_eq!(config.floor_height(), 60.0);
        assert_eq!(config.floor_top(), 540.0);
        assert_eq!(config.player_spawn(), Vec2::new(200.0, 200.0));
        assert!(config.is_flap_key("KeyW"));
        assert!(!config.is_flap_key("Space"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ArenaConfig::from_json(
            r#"{"viewport": {"width": 1000, "height": 700}, "flap_keys": ["KeyW", "Space"]}"#,
        )
        .unwrap();
        assert_eq!(config.viewport.width, 1000.0);
        assert_eq!(config.floor_height(), 70.0);
        assert!(config.is_flap_key("Space"));
        assert_eq!(config.pipe_width, 100.0);
    }

    #[test]
    fn bad_json_is_config_error() {
        assert!(matches!(
            ArenaConfig::from_json("[1, 2]"),
            Err(ScreenError::Config(_))
        ));
    }
}
