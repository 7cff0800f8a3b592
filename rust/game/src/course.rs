use crate::config::GameConfig;
use rand::prelude::*;

/// A pair of pipes sharing one gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pipe {
    /// Column of the front edge.
    pub x: i32,
    /// Height of the bottom pipe.
    pub height: i32,
    pub scored: bool,
}

impl Pipe {
    pub fn back(&self, width: i32) -> i32 {
        self.x + width
    }

    /// Row of the top of the bottom pipe.
    pub fn gap_floor(&self, config: &GameConfig) -> i32 {
        config.sky_height() - self.height
    }

    /// Row of the bottom of the top pipe.
    pub fn gap_ceiling(&self, config: &GameConfig) -> i32 {
        self.gap_floor(config) - config.pipe_dist.vertical
    }
}

/// The scrolling obstacle course.
#[derive(Debug, Clone)]
pub struct Course {
    pipes: Vec<Pipe>,
    n_pipes: usize,
    first_x: i32,
    rng: StdRng,
}

impl Course {
    /// The first pipe appears at `first_x`; the rest follow at the configured spacing.
    pub fn new(config: &GameConfig, first_x: i32, rng: StdRng) -> Self {
        let mut course = Self {
            pipes: Vec::new(),
            n_pipes: config.n_pipes(),
            first_x,
            rng,
        };
        course.refill(config);
        course
    }

    pub fn pipes(&self) -> &[Pipe] {
        &self.pipes
    }

    /// First pipe whose back edge is still ahead of `x`.
    pub fn next_pipe(&self, config: &GameConfig, x: i32) -> Option<&Pipe> {
        self.pipes
            .iter()
            .find(|p| p.back(config.pipe_width) > x)
    }

    /// Move every pipe one pixel left, drop those fully off screen and top up.
    pub fn scroll(&mut self, config: &GameConfig) {
        for pipe in self.pipes.iter_mut() {
            pipe.x -= 1;
        }
        self.pipes.retain(|p| p.back(config.pipe_width) >= 0);
        self.refill(config);
    }

    /// Mark pipes whose back edge the bird has cleared. Returns how many were newly passed.
    pub fn score_passed(&mut self, config: &GameConfig, bird_x: i32) -> usize {
        let mut passed = 0;
        for pipe in self.pipes.iter_mut() {
            if !pipe.scored && pipe.back(config.pipe_width) < bird_x {
                pipe.scored = true;
                passed += 1;
            }
        }
        passed
    }

    fn refill(&mut self, config: &GameConfig) {
        while self.pipes.len() < self.n_pipes {
            let height = self
                .rng
                .gen_range(config.pipe_min_height..config.pipe_max_height());
            let x = match self.pipes.last() {
                Some(last) => last.x + config.pipe_dist.horizontal + config.pipe_width,
                None => self.first_x,
            };
            self.pipes.push(Pipe {
                x,
                height,
                scored: false,
            });
        }
    }
}
