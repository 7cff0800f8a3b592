extern crate rand;
extern crate serde;
extern crate serde_json;

pub mod agent;
pub mod config;
mod envs;
pub mod error;
pub mod mdps;
pub mod persistence;
pub mod trainer;

pub use agent::{MdpAgent, Phase};
pub use config::{AgentConfig, RewardScheme, Resolution};
pub use error::{Error, Result};
pub use mdps::{
    discretizer::StateDiscretizer,
    estimator::TransitionRewardEstimator,
    mdp::MdpModel,
    mdp_solver_policy::EpsilonGreedyPolicy,
    solvers::{
        pi_star, q_star, v_star,
        value_iteration::{SolveReport, ValueIteration},
        MdpSolver,
    },
};
pub use persistence::SavedModel;
