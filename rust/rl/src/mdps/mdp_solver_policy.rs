use super::{mdp::MdpModel, solvers::pi_star};
use crate::error::Result;
use flappy::{Action, Continous, Discrete};
use rand::prelude::*;

/// Epsilon-greedy control on top of the solved model.
///
/// Note the convention: `epsilon` is the probability of *exploiting*. While
/// exploring, jumps are drawn with a small fixed probability because the bird
/// idles far more often than it jumps.
#[derive(Debug, Clone)]
pub struct EpsilonGreedyPolicy {
    pub explore_jump_probability: Continous,
    rng: StdRng,
}

impl EpsilonGreedyPolicy {
    pub fn new(explore_jump_probability: Continous, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            explore_jump_probability,
            rng,
        }
    }

    pub fn select_action(&mut self, mdp: &MdpModel, s: Discrete, epsilon: Continous) -> Result<Action> {
        if self.rng.gen::<Continous>() < epsilon {
            pi_star(mdp, s)
        } else {
            mdp.check_state(s)?;
            Ok(if self.rng.gen::<Continous>() < self.explore_jump_probability {
                Action::Jump
            } else {
                Action::Idle
            })
        }
    }
}
