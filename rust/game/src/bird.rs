use crate::config::{Dims, GameConfig};

/// The controlled object. Its column is fixed; only the world scrolls.
#[derive(Debug, Clone, PartialEq)]
pub struct Bird {
    pub x: i32,
    pub y: i32,
    pub dims: Dims,
    /// Ticks since the last jump.
    t: i32,
    v0: f64,
    a0: f64,
    v_max: f64,
    boost: f64,
}

impl Bird {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.bird_pos.x,
            y: config.bird_pos.y,
            dims: config.bird_dims,
            t: (config.v0 / config.a0) as i32,
            v0: config.v0,
            a0: config.a0,
            v_max: config.v_max,
            boost: config.dy,
        }
    }

    pub fn jump(&mut self) {
        self.t = 0;
    }

    /// Advance one tick of ballistic motion.
    pub fn advance(&mut self) {
        self.t += 1;

        let t = self.t as f64;
        let boost = if self.t < 5 { self.boost } else { 0. };
        let lift = (t * self.v0 - 0.5 * t * t * self.a0 + boost).max(-self.v_max);

        self.y = ((self.y as f64 - lift) as i32).max(0);
    }

    pub fn top(&self) -> i32 {
        self.y - self.dims.height / 2
    }

    pub fn bottom(&self) -> i32 {
        self.top() + self.dims.height
    }

    pub fn left(&self) -> i32 {
        self.x - self.dims.width / 2
    }

    pub fn right(&self) -> i32 {
        self.left() + self.dims.width
    }
}
