#[cfg(test)]
use crate::mdps::{estimator::TransitionRewardEstimator, mdp::MdpModel};

/// Three states: from 0, idling leads to 1 and jumping to 2. States 1 and 2
/// are absorbing and pay +1 and -1 respectively on every entry.
#[cfg(test)]
pub struct ToyChain {
    pub mdp: MdpModel,
}

#[cfg(test)]
impl ToyChain {
    pub fn new() -> Self {
        let mut mdp = MdpModel::new(3);
        for _ in 0..5 {
            mdp.record(0, 0, 1, 1.).unwrap();
            mdp.record(0, 1, 2, -1.).unwrap();
        }
        for a in 0..2 {
            mdp.record(1, a, 1, 1.).unwrap();
            mdp.record(2, a, 2, -1.).unwrap();
        }
        mdp.refresh();

        Self { mdp }
    }
}
