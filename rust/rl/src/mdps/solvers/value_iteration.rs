use super::MdpSolver;
use crate::error::{Error, Result};
use crate::mdps::mdp::MdpModel;
use flappy::Continous;
use ndarray::{s, Array1};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueIteration {
    pub gamma: Continous,
    pub theta: Continous,
    pub max_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    pub iterations: usize,
    /// Largest value change in the last sweep.
    pub delta: Continous,
    pub converged: bool,
    /// The very first sweep was already within tolerance.
    pub stable_on_entry: bool,
}

impl ValueIteration {
    pub fn new(gamma: Continous, theta: Continous, max_iterations: usize) -> Result<Self> {
        if !(0.0..1.0).contains(&gamma) {
            return Err(Error::InvalidDiscount { gamma });
        }
        if !(theta.is_finite() && theta > 0.) {
            return Err(Error::InvalidTolerance { tolerance: theta });
        }

        Ok(Self {
            gamma,
            theta,
            max_iterations: max_iterations.max(1),
        })
    }

    /// One synchronous Bellman backup computed entirely from `v`.
    fn backup(&self, mdp: &MdpModel, v: &Array1<Continous>) -> Array1<Continous> {
        let p = mdp.transition_probs();
        let best = Array1::from_shape_fn(mdp.n_s(), |s| {
            (0..mdp.n_a())
                .map(|a| p.slice(s![s, .., a]).dot(v))
                .fold(Continous::NEG_INFINITY, Continous::max)
        });

        mdp.reward() + &(best * self.gamma)
    }
}

impl MdpSolver for ValueIteration {
    type Report = SolveReport;

    fn exec(&self, mdp: &mut MdpModel) -> Result<SolveReport> {
        let mut iterations = 0;
        loop {
            let new_v = self.backup(mdp, mdp.value());
            let delta = (&new_v - mdp.value())
                .iter()
                .fold(0., |acc: Continous, d| acc.max(d.abs()));
            mdp.value = new_v;
            iterations += 1;

            let converged = delta < self.theta;
            if converged || iterations >= self.max_iterations {
                let report = SolveReport {
                    iterations,
                    delta,
                    converged,
                    stable_on_entry: converged && iterations == 1,
                };
                if converged {
                    debug!(iterations, delta, "value iteration converged");
                } else {
                    warn!(iterations, delta, theta = self.theta, "value iteration hit the iteration cap");
                }
                return Ok(report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::toy_chain::ToyChain;
    use float_eq::*;

    #[test]
    fn toy_chain_converges_to_geometric_values() {
        let mut mdp = ToyChain::new().mdp;
        let vi = ValueIteration::new(0.9, 0.01, 10_000).unwrap();
        let report = vi.exec(&mut mdp).unwrap();

        assert!(report.converged);
        assert!(!report.stable_on_entry);
        assert!(report.iterations > 1);
        assert_float_eq!(mdp.value()[1], 10., abs <= 0.1);
        assert_float_eq!(mdp.value()[2], -10., abs <= 0.1);
        assert_float_eq!(mdp.value()[0], 9., abs <= 0.2);
    }

    #[test]
    fn second_solve_converges_in_one_iteration() {
        let mut mdp = ToyChain::new().mdp;
        let vi = ValueIteration::new(0.9, 0.01, 10_000).unwrap();
        vi.exec(&mut mdp).unwrap();
        let report = vi.exec(&mut mdp).unwrap();

        assert_eq!(report.iterations, 1);
        assert!(report.converged);
        assert!(report.stable_on_entry);
    }

    #[test]
    fn uses_previous_sweep_only() {
        let mut mdp = ToyChain::new().mdp;
        let vi = ValueIteration::new(0.9, 0.01, 1).unwrap();
        vi.exec(&mut mdp).unwrap();

        // State 0 looks at V(1) from before the sweep, which was still 0.
        assert_float_eq!(mdp.value()[0], 0., abs <= 1e-12);
        assert_float_eq!(mdp.value()[1], 1., abs <= 1e-12);
        assert_float_eq!(mdp.value()[2], -1., abs <= 1e-12);
    }

    #[test]
    fn reports_when_cap_is_hit() {
        let mut mdp = ToyChain::new().mdp;
        let vi = ValueIteration::new(0.9, 1e-9, 5).unwrap();
        let report = vi.exec(&mut mdp).unwrap();

        assert_eq!(report.iterations, 5);
        assert!(!report.converged);
        assert!(report.delta >= 1e-9);
    }

    #[test]
    fn rejects_non_contracting_parameters() {
        assert!(matches!(
            ValueIteration::new(1., 0.01, 10),
            Err(Error::InvalidDiscount { .. })
        ));
        assert!(matches!(
            ValueIteration::new(0.9, 0., 10),
            Err(Error::InvalidTolerance { .. })
        ));
    }
}
