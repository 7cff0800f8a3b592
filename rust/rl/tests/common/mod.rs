use flappy::{Actuator, Game, GameConfig, Player};
use flappy_rl::*;

#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingActuator {
    pub jumps: usize,
    pub restarts: usize,
    pub starts: usize,
}

impl Actuator for RecordingActuator {
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

#[allow(dead_code)]
pub fn coarse_config(seed: u64) -> AgentConfig {
    AgentConfig {
        n_states: Resolution {
            n_y: 1,
            n_dx: 5,
            n_dy: 6,
        },
        seed: Some(seed),
        ..AgentConfig::default()
    }
}

#[allow(dead_code)]
pub fn agent_and_game(seed: u64) -> (MdpAgent, Game) {
    let game = Game::new(GameConfig::default(), Player::Agent, Some(seed)).unwrap();
    let agent = MdpAgent::new(coarse_config(seed), game.config(), game.observation()).unwrap();
    (agent, game)
}
