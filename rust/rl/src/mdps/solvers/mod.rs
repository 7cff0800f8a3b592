pub mod value_iteration;

use super::mdp::MdpModel;
use crate::error::Result;
use flappy::{Action, Continous, Discrete};

pub trait MdpSolver {
    type Report;

    /// Solve for the value function of the current estimates, updating `mdp` in place.
    fn exec(&self, mdp: &mut MdpModel) -> Result<Self::Report>;
}

pub fn v_star(mdp: &MdpModel, s: Discrete) -> Result<Continous> {
    mdp.check_state(s)?;
    Ok(mdp.value()[s])
}

pub fn q_star(mdp: &MdpModel, s: Discrete, a: Action) -> Result<Continous> {
    mdp.q_value(s, a.index())
}

/// Greedy action under the current value estimates. Jumping has to be strictly
/// better than idling to be chosen.
pub fn pi_star(mdp: &MdpModel, s: Discrete) -> Result<Action> {
    let q_idle = q_star(mdp, s, Action::Idle)?;
    let q_jump = q_star(mdp, s, Action::Jump)?;

    Ok(if q_jump > q_idle {
        Action::Jump
    } else {
        Action::Idle
    })
}
