use serde::{Deserialize, Serialize};

pub type Discrete = usize;
pub type Continous = f64;

/// What the agent sees of the world on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Vertical position of the bird centre, in pixels from the top.
    pub y: Continous,
    /// Horizontal offset from the bird to the front of the next pipe.
    pub dx: Continous,
    /// Vertical offset from the bird to the floor of the next gap.
    pub dy: Continous,
}

impl Observation {
    pub fn new(y: Continous, dx: Continous, dy: Continous) -> Self {
        Self { y, dx, dy }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Idle,
    Jump,
}

impl Action {
    pub const COUNT: usize = 2;

    pub fn index(self) -> Discrete {
        match self {
            Action::Idle => 0,
            Action::Jump => 1,
        }
    }
}

/// Everything the environment reports after advancing one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tick {
    pub observation: Observation,
    pub has_jumped: bool,
    pub is_score_increased: bool,
    pub is_terminal: bool,
}

/// Side effects the controller asks of the outside world.
///
/// The game implements this directly; a host driving a real window would
/// inject key presses and clicks instead.
pub trait Actuator {
    /// Make the bird jump. Called at most once per tick.
    fn jump(&mut self);

    /// Signal that the current run is over and the world should be rebuilt.
    fn restart(&mut self);

    /// Begin a new run.
    fn start(&mut self);
}
