use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::mdps::{
    discretizer::StateDiscretizer,
    estimator::TransitionRewardEstimator,
    mdp::MdpModel,
    mdp_solver_policy::EpsilonGreedyPolicy,
    solvers::{
        value_iteration::{SolveReport, ValueIteration},
        MdpSolver,
    },
};
use flappy::{Action, Actuator, Continous, Discrete, GameConfig, Observation, Tick};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Terminated,
}

/// Drives one bird through repeated episodes, learning an approximate MDP as it goes.
///
/// Every tick the host asks for an action and then reports what happened.
/// When an episode ends the model is re-estimated from all counts gathered so
/// far and value iteration is rerun before the next action can be chosen.
#[derive(Debug)]
pub struct MdpAgent {
    config: AgentConfig,
    discretizer: StateDiscretizer,
    mdp: MdpModel,
    solver: ValueIteration,
    policy: EpsilonGreedyPolicy,
    epsilon: Continous,
    episode: usize,
    phase: Phase,
    observation: Observation,
    action: Action,
    ticks: usize,
    episode_return: Continous,
}

impl MdpAgent {
    pub fn new(config: AgentConfig, game: &GameConfig, observation: Observation) -> Result<Self> {
        config.validate()?;
        let discretizer = StateDiscretizer::for_game(game, config.n_states, config.include_y)?;
        let mdp = MdpModel::new(discretizer.n_s());
        Self::with_model(config, discretizer, mdp, observation)
    }

    /// Resume from a previously learned model.
    pub fn with_model(
        config: AgentConfig,
        discretizer: StateDiscretizer,
        mdp: MdpModel,
        observation: Observation,
    ) -> Result<Self> {
        config.validate()?;
        if discretizer.n_s() != mdp.n_s() {
            return Err(Error::ShapeMismatch {
                field: "num_states".to_string(),
                expected: discretizer.n_s().to_string(),
                got: mdp.n_s().to_string(),
            });
        }
        if mdp.n_a() != Action::COUNT {
            return Err(Error::ShapeMismatch {
                field: "num_actions".to_string(),
                expected: Action::COUNT.to_string(),
                got: mdp.n_a().to_string(),
            });
        }

        let solver = ValueIteration::new(config.gamma, config.tolerance, config.max_iterations)?;
        let policy = EpsilonGreedyPolicy::new(config.explore_jump_probability, config.seed);

        Ok(Self {
            epsilon: config.initial_epsilon,
            config,
            discretizer,
            mdp,
            solver,
            policy,
            episode: 1,
            phase: Phase::Idle,
            observation,
            action: Action::Idle,
            ticks: 0,
            episode_return: 0.,
        })
    }

    /// Continue from a model that has already been trained for `episodes` episodes,
    /// picking the episode counter and epsilon up where they left off.
    pub fn resume_after(mut self, episodes: usize) -> Self {
        let epsilon = self.config.initial_epsilon + episodes as Continous * self.config.epsilon_step;
        self.episode = episodes + 1;
        self.epsilon = epsilon.clamp(0., 1.);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn discretizer(&self) -> &StateDiscretizer {
        &self.discretizer
    }

    pub fn mdp(&self) -> &MdpModel {
        &self.mdp
    }

    pub fn epsilon(&self) -> Continous {
        self.epsilon
    }

    pub fn episode(&self) -> usize {
        self.episode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> Discrete {
        self.discretizer.discretize(&self.observation, false)
    }

    /// Pick the next action for `observation` and forward it to the actuator.
    pub fn choose_action<A: Actuator>(
        &mut self,
        observation: Observation,
        actuator: &mut A,
    ) -> Result<Action> {
        self.ensure_live()?;

        self.observation = observation;
        let s = self.state();
        self.action = self.policy.select_action(&self.mdp, s, self.epsilon)?;
        self.phase = Phase::Running;

        if self.action == Action::Jump {
            actuator.jump();
        }

        Ok(self.action)
    }

    /// Record the outcome of the last action. On a terminal tick the model is
    /// refit and re-solved, and the actuator is told to restart.
    pub fn record_transition<A: Actuator>(
        &mut self,
        tick: &Tick,
        actuator: &mut A,
    ) -> Result<Option<SolveReport>> {
        self.ensure_live()?;

        let reward = self
            .config
            .rewards
            .reward(tick.has_jumped, tick.is_score_increased, tick.is_terminal);
        let s = self.state();
        let next_s = self.discretizer.discretize(&tick.observation, tick.is_terminal);
        self.mdp.record(s, self.action.index(), next_s, reward)?;

        self.observation = tick.observation;
        self.ticks += 1;
        self.episode_return += reward;
        self.phase = Phase::Running;

        if !tick.is_terminal {
            return Ok(None);
        }

        let report = self.update_mdp_parameters()?;
        info!(
            episode = self.episode,
            ticks = self.ticks,
            episode_return = self.episode_return,
            iterations = report.iterations,
            converged = report.converged,
            "episode finished"
        );
        self.phase = Phase::Terminated;
        actuator.restart();

        Ok(Some(report))
    }

    /// Begin the next episode from `observation`, nudging the policy towards exploitation.
    pub fn reset<A: Actuator>(&mut self, observation: Observation, actuator: &mut A) {
        self.episode += 1;
        self.observation = observation;
        self.action = Action::Idle;
        self.ticks = 0;
        self.episode_return = 0.;
        self.epsilon = (self.epsilon + self.config.epsilon_step).clamp(0., 1.);
        self.phase = Phase::Idle;
        debug!(episode = self.episode, epsilon = self.epsilon, "starting episode");

        actuator.start();
    }

    /// Re-estimate the model from all counts and solve it.
    pub fn update_mdp_parameters(&mut self) -> Result<SolveReport> {
        self.mdp.refresh();
        self.solver.exec(&mut self.mdp)
    }

    fn ensure_live(&self) -> Result<()> {
        match self.phase {
            Phase::Terminated => Err(Error::EpisodeTerminated {
                episode: self.episode,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use float_eq::*;
    use rstest::rstest;

    #[derive(Default)]
    struct Recorder {
        jumps: usize,
        restarts: usize,
        starts: usize,
    }

    impl Actuator for Recorder {
        fn jump(&mut self) {
            self.jumps += 1;
        }

        fn restart(&mut self) {
            self.restarts += 1;
        }

        fn start(&mut self) {
            self.starts += 1;
        }
    }

    fn agent(initial_epsilon: f64, explore_jump_probability: f64) -> MdpAgent {
        let config = AgentConfig {
            n_states: Resolution {
                n_y: 1,
                n_dx: 3,
                n_dy: 3,
            },
            initial_epsilon,
            explore_jump_probability,
            seed: Some(2718),
            ..AgentConfig::default()
        };
        MdpAgent::new(config, &GameConfig::default(), Observation::new(150., 40., 50.)).unwrap()
    }

    fn tick(observation: Observation, is_terminal: bool) -> Tick {
        Tick {
            observation,
            has_jumped: false,
            is_score_increased: false,
            is_terminal,
        }
    }

    #[test]
    fn jump_reaches_the_actuator_exactly_once() {
        let mut agent = agent(0., 1.);
        let mut actuator = Recorder::default();
        let a = agent
            .choose_action(Observation::new(150., 40., 50.), &mut actuator)
            .unwrap();
        assert_eq!(a, Action::Jump);
        assert_eq!(actuator.jumps, 1);
        assert_eq!(agent.phase(), Phase::Running);
    }

    #[test]
    fn idle_does_not_touch_the_actuator() {
        let mut agent = agent(0., 0.);
        let mut actuator = Recorder::default();
        for _ in 0..50 {
            let a = agent
                .choose_action(Observation::new(150., 40., 50.), &mut actuator)
                .unwrap();
            assert_eq!(a, Action::Idle);
        }
        assert_eq!(actuator.jumps, 0);
    }

    #[test]
    fn terminal_tick_solves_and_restarts() {
        let mut agent = agent(0., 0.);
        let mut actuator = Recorder::default();
        let obs = Observation::new(150., 40., 50.);

        agent.choose_action(obs, &mut actuator).unwrap();
        assert!(agent.record_transition(&tick(obs, false), &mut actuator).unwrap().is_none());
        agent.choose_action(obs, &mut actuator).unwrap();
        let report = agent.record_transition(&tick(obs, true), &mut actuator).unwrap();

        assert!(report.unwrap().converged);
        assert_eq!(agent.phase(), Phase::Terminated);
        assert_eq!(actuator.restarts, 1);

        let s = agent.discretizer().discretize(&obs, false);
        let dead = agent.discretizer().discretize(&obs, true);
        assert_eq!(agent.mdp().transition_counts()[[s, s, 0]], 1);
        assert_eq!(agent.mdp().transition_counts()[[s, dead, 0]], 1);
        assert_float_eq!(agent.mdp().reward()[dead], -1000., abs <= 1e-12);
        assert_float_eq!(agent.mdp().reward()[s], 1., abs <= 1e-12);
    }

    #[test]
    fn acting_after_termination_requires_reset() {
        let mut agent = agent(0., 0.);
        let mut actuator = Recorder::default();
        let obs = Observation::new(150., 40., 50.);
        agent.record_transition(&tick(obs, true), &mut actuator).unwrap();

        assert!(matches!(
            agent.choose_action(obs, &mut actuator),
            Err(Error::EpisodeTerminated { episode: 1 })
        ));
        assert!(agent.record_transition(&tick(obs, false), &mut actuator).is_err());

        agent.reset(obs, &mut actuator);
        assert_eq!(agent.phase(), Phase::Idle);
        assert_eq!(agent.episode(), 2);
        assert_eq!(actuator.starts, 1);
        assert!(agent.choose_action(obs, &mut actuator).is_ok());
    }

    #[test]
    fn epsilon_grows_and_clamps_at_one() {
        let mut agent = agent(0.95, 0.);
        let mut actuator = Recorder::default();
        let obs = Observation::default();

        agent.reset(obs, &mut actuator);
        assert_float_eq!(agent.epsilon(), 0.96, abs <= 1e-12);
        for _ in 0..10 {
            agent.reset(obs, &mut actuator);
        }
        assert_eq!(agent.epsilon(), 1.);
    }

    #[test]
    fn jump_reward_reaches_the_counts() {
        let mut agent = agent(0., 1.);
        let mut actuator = Recorder::default();
        let obs = Observation::new(150., 40., 50.);

        assert_eq!(agent.choose_action(obs, &mut actuator).unwrap(), Action::Jump);
        let jumped = Tick {
            has_jumped: true,
            ..tick(obs, false)
        };
        agent.record_transition(&jumped, &mut actuator).unwrap();

        let s = agent.state();
        assert_eq!(agent.mdp().transition_counts()[[s, s, Action::Jump.index()]], 1);
        assert_float_eq!(agent.mdp().reward_counts()[[s, 0]], 0., abs <= 1e-12);
        assert_float_eq!(agent.mdp().reward_counts()[[s, 1]], 1., abs <= 1e-12);
    }

    #[rstest]
    #[case(0, 1, 0.5)]
    #[case(30, 31, 0.8)]
    #[case(200, 201, 1.)]
    fn resuming_restores_episode_and_epsilon(
        #[case] episodes: usize,
        #[case] next_episode: usize,
        #[case] epsilon: f64,
    ) {
        let agent = agent(0.5, 0.).resume_after(episodes);
        assert_eq!(agent.episode(), next_episode);
        assert_float_eq!(agent.epsilon(), epsilon, abs <= 1e-12);
    }

    #[test]
    fn model_persists_across_episodes() {
        let mut agent = agent(0., 0.);
        let mut actuator = Recorder::default();
        let obs = Observation::new(150., 40., 50.);

        for _ in 0..3 {
            agent.choose_action(obs, &mut actuator).unwrap();
            agent.record_transition(&tick(obs, true), &mut actuator).unwrap();
            agent.reset(obs, &mut actuator);
        }

        assert_eq!(agent.mdp().transition_counts().sum(), 3);
    }

    #[test]
    fn rejects_model_of_the_wrong_size() {
        let config = AgentConfig::default();
        let discretizer =
            StateDiscretizer::for_game(&GameConfig::default(), config.n_states, false).unwrap();
        let err = MdpAgent::with_model(config, discretizer, MdpModel::new(5), Observation::default());
        assert!(matches!(err, Err(Error::ShapeMismatch { .. })));
    }
}
