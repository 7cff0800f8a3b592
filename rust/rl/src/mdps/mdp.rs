use crate::error::{Error, Result};
use flappy::{Action, Continous, Discrete};
use ndarray::{s, Array1, Array2, Array3};

/// Tabular approximation of a Markov Decision Process - Sutton & Barto 2018.
///
/// Everything is indexed by the integer state produced by the discretizer:
/// `transition_*[s, s', a]`, `reward_counts[s, {sum, n}]`, `reward[s]` and `value[s]`.
///
/// Until `(s, a)` has been observed its transition row is uniform; afterwards it
/// holds the empirical frequencies of the recorded transitions. Rewards default
/// to 0 until one has been recorded for the state.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpModel {
    pub(crate) transition_counts: Array3<u64>,
    pub(crate) transition_probs: Array3<Continous>,
    pub(crate) reward_counts: Array2<Continous>,
    pub(crate) reward: Array1<Continous>,
    pub(crate) value: Array1<Continous>,
}

impl MdpModel {
    pub fn new(n_s: usize) -> Self {
        Self::with_actions(n_s, Action::COUNT)
    }

    pub fn with_actions(n_s: usize, n_a: usize) -> Self {
        Self {
            transition_counts: Array3::zeros((n_s, n_s, n_a)),
            transition_probs: Array3::from_elem((n_s, n_s, n_a), 1. / n_s as Continous),
            reward_counts: Array2::zeros((n_s, 2)),
            reward: Array1::zeros(n_s),
            value: Array1::zeros(n_s),
        }
    }

    /// Assemble a model from raw arrays, checking that all shapes agree.
    pub fn from_parts(
        transition_counts: Array3<u64>,
        transition_probs: Array3<Continous>,
        reward_counts: Array2<Continous>,
        reward: Array1<Continous>,
        value: Array1<Continous>,
    ) -> Result<Self> {
        let (n_s, n_s2, n_a) = transition_counts.dim();
        if n_s != n_s2 {
            return Err(shape_error("transition_counts", (n_s, n_s, n_a), (n_s, n_s2, n_a)));
        }
        if transition_probs.dim() != (n_s, n_s, n_a) {
            return Err(shape_error(
                "transition_probs",
                (n_s, n_s, n_a),
                transition_probs.dim(),
            ));
        }
        if reward_counts.dim() != (n_s, 2) {
            return Err(shape_error("reward_counts", (n_s, 2), reward_counts.dim()));
        }
        if reward.len() != n_s {
            return Err(shape_error("reward", n_s, reward.len()));
        }
        if value.len() != n_s {
            return Err(shape_error("value", n_s, value.len()));
        }

        Ok(Self {
            transition_counts,
            transition_probs,
            reward_counts,
            reward,
            value,
        })
    }

    pub fn n_s(&self) -> usize {
        self.value.len()
    }

    pub fn n_a(&self) -> usize {
        self.transition_probs.dim().2
    }

    pub fn transition_counts(&self) -> &Array3<u64> {
        &self.transition_counts
    }

    pub fn transition_probs(&self) -> &Array3<Continous> {
        &self.transition_probs
    }

    pub fn reward_counts(&self) -> &Array2<Continous> {
        &self.reward_counts
    }

    pub fn reward(&self) -> &Array1<Continous> {
        &self.reward
    }

    pub fn value(&self) -> &Array1<Continous> {
        &self.value
    }

    /// Expected value of the successor when taking `a` in `s`: `P[s, :, a] · V`.
    pub fn q_value(&self, s: Discrete, a: Discrete) -> Result<Continous> {
        self.check_state(s)?;
        self.check_action(a)?;
        Ok(self.transition_probs.slice(s![s, .., a]).dot(&self.value))
    }

    pub(crate) fn check_state(&self, s: Discrete) -> Result<()> {
        if s < self.n_s() {
            Ok(())
        } else {
            Err(Error::StateOutOfRange {
                state: s,
                num_states: self.n_s(),
            })
        }
    }

    pub(crate) fn check_action(&self, a: Discrete) -> Result<()> {
        if a < self.n_a() {
            Ok(())
        } else {
            Err(Error::ActionOutOfRange {
                action: a,
                num_actions: self.n_a(),
            })
        }
    }
}

fn shape_error<E: std::fmt::Debug, G: std::fmt::Debug>(field: &str, expected: E, got: G) -> Error {
    Error::ShapeMismatch {
        field: field.to_string(),
        expected: format!("{expected:?}"),
        got: format!("{got:?}"),
    }
}
