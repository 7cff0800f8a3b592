use crate::bird::Bird;
use crate::common::defs::*;
use crate::config::{ConfigError, GameConfig};
use crate::course::Course;
use rand::prelude::*;
use tracing::debug;

/// Who is at the controls. The first pipe is placed further away for a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Player {
    Human,
    Agent,
}

/// Headless game world: one bird, a scrolling course and the running score.
pub struct Game {
    config: GameConfig,
    player: Player,
    bird: Bird,
    course: Course,
    rng: StdRng,
    score: usize,
    in_game: bool,
    crashed: bool,
    has_jumped: bool,
}

impl Game {
    /// Fails if `config` cannot produce a playable world.
    pub fn new(config: GameConfig, player: Player, seed: Option<u64>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let bird = Bird::new(&config);
        let course = Course::new(
            &config,
            Self::first_pipe_x(&config, player),
            StdRng::from_rng(&mut rng).unwrap_or_else(|_| StdRng::from_entropy()),
        );

        Ok(Self {
            config,
            player,
            bird,
            course,
            rng,
            score: 0,
            in_game: false,
            crashed: false,
            has_jumped: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn in_game(&self) -> bool {
        self.in_game
    }

    /// Rebuild the world for a new run. The course keeps drawing from the same RNG stream.
    pub fn reset(&mut self) {
        self.bird = Bird::new(&self.config);
        self.course = Course::new(
            &self.config,
            Self::first_pipe_x(&self.config, self.player),
            StdRng::from_rng(&mut self.rng).unwrap_or_else(|_| StdRng::from_entropy()),
        );
        self.score = 0;
        self.in_game = false;
        self.crashed = false;
        self.has_jumped = false;
    }

    pub fn observation(&self) -> Observation {
        let bird = &self.bird;
        match self.course.next_pipe(&self.config, bird.x) {
            Some(pipe) => Observation::new(
                bird.y as Continous,
                (pipe.x - bird.x) as Continous,
                (pipe.gap_floor(&self.config) - bird.y) as Continous,
            ),
            None => Observation::new(bird.y as Continous, 0., 0.),
        }
    }

    /// Whether the bird overlaps the border, the ground or a pipe.
    pub fn collides(&self) -> bool {
        let config = &self.config;
        let bird = &self.bird;

        if bird.top() < 0 || bird.bottom() > config.sky_height() {
            return true;
        }

        self.course.pipes().iter().any(|pipe| {
            let overlaps_columns =
                bird.right() > pipe.x && bird.left() < pipe.back(config.pipe_width);
            overlaps_columns
                && (bird.top() < pipe.gap_ceiling(config) || bird.bottom() > pipe.gap_floor(config))
        })
    }

    /// Advance the world by one tick and report what happened.
    pub fn step(&mut self) -> Tick {
        let has_jumped = self.has_jumped;
        self.has_jumped = false;

        if !self.in_game {
            return Tick {
                observation: self.observation(),
                has_jumped,
                is_score_increased: false,
                is_terminal: self.crashed,
            };
        }

        self.bird.advance();
        self.course.scroll(&self.config);

        let passed = self.course.score_passed(&self.config, self.bird.x);
        self.score += passed;

        let is_terminal = self.collides();
        if is_terminal {
            debug!(score = self.score, "bird crashed");
            self.in_game = false;
            self.crashed = true;
        }

        Tick {
            observation: self.observation(),
            has_jumped,
            is_score_increased: passed > 0,
            is_terminal,
        }
    }

    fn first_pipe_x(config: &GameConfig, player: Player) -> i32 {
        match player {
            Player::Human => config.window_size.width,
            Player::Agent => config.window_size.width / 2,
        }
    }
}

impl Actuator for Game {
    fn jump(&mut self) {
        if self.in_game && !self.has_jumped {
            self.bird.jump();
            self.has_jumped = true;
        }
    }

    fn restart(&mut self) {
        self.reset();
    }

    fn start(&mut self) {
        if !self.crashed {
            self.in_game = true;
        }
    }
}
