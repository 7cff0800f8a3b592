use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rewards handed out on entering a state, checked in field order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardScheme {
    pub score: f64,
    pub crash: f64,
    pub jump: f64,
    pub alive: f64,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            score: 100.,
            crash: -1000.,
            jump: 0.,
            alive: 1.,
        }
    }
}

impl RewardScheme {
    pub fn reward(&self, has_jumped: bool, is_score_increased: bool, is_terminal: bool) -> f64 {
        if is_score_increased {
            self.score
        } else if is_terminal {
            self.crash
        } else if has_jumped {
            self.jump
        } else {
            self.alive
        }
    }
}

/// Grid resolution along each observation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub n_y: usize,
    pub n_dx: usize,
    pub n_dy: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub n_states: Resolution,
    /// Whether the y axis takes part in the state index.
    pub include_y: bool,
    pub gamma: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Probability of acting greedily on the first episode.
    pub initial_epsilon: f64,
    /// Added to epsilon at the start of every episode.
    pub epsilon_step: f64,
    /// Probability of jumping while exploring.
    pub explore_jump_probability: f64,
    pub rewards: RewardScheme,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            n_states: Resolution {
                n_y: 1,
                n_dx: 20,
                n_dy: 30,
            },
            include_y: false,
            gamma: 0.95,
            tolerance: 0.01,
            max_iterations: 10_000,
            initial_epsilon: 0.5,
            epsilon_step: 0.01,
            explore_jump_probability: 0.01,
            rewards: RewardScheme::default(),
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        let Resolution { n_y, n_dx, n_dy } = self.n_states;
        if n_y == 0 || n_dx == 0 || n_dy == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "every axis needs at least one grid point, got ({n_y}, {n_dx}, {n_dy})"
            )));
        }
        if !(0.0..1.0).contains(&self.gamma) {
            return Err(Error::InvalidDiscount { gamma: self.gamma });
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.) {
            return Err(Error::InvalidTolerance {
                tolerance: self.tolerance,
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        for (name, p) in [
            ("initial_epsilon", self.initial_epsilon),
            ("explore_jump_probability", self.explore_jump_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} must be a probability, got {p}"
                )));
            }
        }
        if !self.epsilon_step.is_finite() {
            return Err(Error::InvalidConfiguration(
                "epsilon_step must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
