use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A `GameConfig` that cannot produce a playable world.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid game configuration: {0}")]
pub struct ConfigError(pub String);

/// Height/width pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dims {
    pub height: i32,
    pub width: i32,
}

/// Spacing between consecutive pipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeDist {
    pub horizontal: i32,
    pub vertical: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// All game constants. Defaults reproduce the classic 370x240 layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_size: Dims,
    pub padding: i32,
    pub ground_height: i32,
    pub pipe_width: i32,
    pub pipe_min_height: i32,
    pub pipe_dist: PipeDist,
    pub bird_dims: Dims,
    pub bird_pos: Position,
    /// Initial velocity at the jump.
    pub v0: f64,
    /// Gravity.
    pub a0: f64,
    /// Maximum descent speed, pixels per tick.
    pub v_max: f64,
    /// Extra lift during the first ticks of a jump.
    pub dy: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_size: Dims {
                height: 370,
                width: 240,
            },
            padding: 5,
            ground_height: 64,
            pipe_width: 40,
            pipe_min_height: 20,
            pipe_dist: PipeDist {
                horizontal: 90,
                vertical: 80,
            },
            bird_dims: Dims {
                height: 20,
                width: 20,
            },
            bird_pos: Position { x: 80, y: 150 },
            v0: 0.04,
            a0: 0.003,
            v_max: 3.,
            dy: 2.,
        }
    }
}

impl GameConfig {
    /// Height of the playable area above the ground.
    pub fn sky_height(&self) -> i32 {
        self.window_size.height - self.ground_height
    }

    /// Exclusive upper bound for a random bottom pipe height.
    pub fn pipe_max_height(&self) -> i32 {
        self.sky_height() - self.pipe_dist.vertical - self.pipe_min_height
    }

    /// Number of pipes kept alive while scrolling.
    pub fn n_pipes(&self) -> usize {
        (self.window_size.width / (self.pipe_width + self.pipe_dist.horizontal)) as usize + 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sky_height() <= 0 {
            return Err(ConfigError(format!(
                "ground height {} leaves no sky in a window of height {}",
                self.ground_height, self.window_size.height
            )));
        }
        if self.pipe_max_height() <= self.pipe_min_height {
            return Err(ConfigError(format!(
                "pipe heights cannot be drawn from [{}, {})",
                self.pipe_min_height,
                self.pipe_max_height()
            )));
        }
        if self.pipe_width <= 0 || self.pipe_dist.horizontal <= 0 {
            return Err(ConfigError(
                "pipe width and horizontal distance must be positive".to_string(),
            ));
        }
        if self.a0 <= 0. || self.v_max <= 0. {
            return Err(ConfigError(
                "gravity and maximum descent speed must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sky_height(), 306);
        assert_eq!(config.pipe_max_height(), 206);
        assert_eq!(config.n_pipes(), 3);
    }

    #[test]
    fn rejects_ground_above_window() {
        let config = GameConfig {
            ground_height: 400,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
