pub mod discretizer;
pub mod estimator;
pub mod mdp;
pub mod mdp_solver_policy;
pub mod solvers;
