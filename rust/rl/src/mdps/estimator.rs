use super::mdp::MdpModel;
use crate::error::Result;
use flappy::{Continous, Discrete};
use itertools::iproduct;
use ndarray::{s, Axis};

/// Accumulates observed transitions and turns them into maximum likelihood estimates.
pub trait TransitionRewardEstimator {
    /// Count one `(s, a) -> s'` transition and the reward received on entering `s'`.
    fn record(&mut self, s: Discrete, a: Discrete, next_s: Discrete, reward: Continous) -> Result<()>;

    /// Recompute transition probabilities and rewards from the counts.
    ///
    /// Pairs and states that were never observed keep their previous estimates,
    /// so calling this twice in a row changes nothing.
    fn refresh(&mut self);
}

impl TransitionRewardEstimator for MdpModel {
    fn record(&mut self, s: Discrete, a: Discrete, next_s: Discrete, reward: Continous) -> Result<()> {
        self.check_state(s)?;
        self.check_state(next_s)?;
        self.check_action(a)?;

        self.transition_counts[[s, next_s, a]] += 1;
        self.reward_counts[[next_s, 0]] += reward;
        self.reward_counts[[next_s, 1]] += 1.;

        Ok(())
    }

    fn refresh(&mut self) {
        for (s, a) in iproduct!(0..self.n_s(), 0..self.n_a()) {
            let counts = self.transition_counts.slice(s![s, .., a]);
            let total = counts.sum();
            if total > 0 {
                let freqs = counts.mapv(|c| c as Continous / total as Continous);
                self.transition_probs.slice_mut(s![s, .., a]).assign(&freqs);
            }
        }

        for (s, rc) in self.reward_counts.axis_iter(Axis(0)).enumerate() {
            if rc[1] > 0. {
                self.reward[s] = rc[0] / rc[1];
            }
        }
    }
}
