use crate::config::Resolution;
use crate::error::{Error, Result};
use flappy::{Continous, Discrete, GameConfig, Observation};
use itertools::Itertools;
use ndarray::Array1;

/// Maps a continuous observation onto a fixed grid of representative states.
///
/// Each axis is snapped independently to its nearest grid point (first
/// occurrence wins a tie). The `dx` and `dy` indices `(j, k)` are packed as
/// `j * n_dy + k`; terminal observations land in a second block of the same
/// size directly after the live one.
#[derive(Debug, Clone, PartialEq)]
pub struct StateDiscretizer {
    y_s: Array1<Continous>,
    dx_s: Array1<Continous>,
    dy_s: Array1<Continous>,
    include_y: bool,
}

impl StateDiscretizer {
    pub fn new(
        y_s: Array1<Continous>,
        dx_s: Array1<Continous>,
        dy_s: Array1<Continous>,
        include_y: bool,
    ) -> Result<Self> {
        for (name, grid) in [("y", &y_s), ("dx", &dx_s), ("dy", &dy_s)] {
            if grid.is_empty() {
                return Err(Error::InvalidConfiguration(format!("{name} grid is empty")));
            }
            if grid.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidConfiguration(format!(
                    "{name} grid has non-finite points"
                )));
            }
        }

        Ok(Self {
            y_s,
            dx_s,
            dy_s,
            include_y,
        })
    }

    /// Grids spanning the ranges the game can produce.
    pub fn for_game(game: &GameConfig, resolution: Resolution, include_y: bool) -> Result<Self> {
        let sky = game.sky_height() as Continous;
        Self::new(
            Array1::linspace(0., sky, resolution.n_y),
            Array1::linspace(0., game.pipe_dist.horizontal as Continous, resolution.n_dx),
            Array1::linspace(-sky, sky, resolution.n_dy),
            include_y,
        )
    }

    pub fn grids(&self) -> [&Array1<Continous>; 3] {
        [&self.y_s, &self.dx_s, &self.dy_s]
    }

    pub fn include_y(&self) -> bool {
        self.include_y
    }

    /// Number of live (non-terminal) states.
    pub fn block_size(&self) -> usize {
        let block = self.dx_s.len() * self.dy_s.len();
        if self.include_y {
            self.y_s.len() * block
        } else {
            block
        }
    }

    pub fn n_s(&self) -> usize {
        2 * self.block_size()
    }

    pub fn discretize(&self, observation: &Observation, is_terminal: bool) -> Discrete {
        let j = nearest(&self.dx_s, observation.dx);
        let k = nearest(&self.dy_s, observation.dy);

        let mut ind = j * self.dy_s.len() + k;
        if self.include_y {
            let i = nearest(&self.y_s, observation.y);
            ind += i * self.dx_s.len() * self.dy_s.len();
        }

        if is_terminal {
            ind + self.block_size()
        } else {
            ind
        }
    }

    pub fn is_terminal_state(&self, s: Discrete) -> bool {
        s >= self.block_size()
    }
}

fn nearest(grid: &Array1<Continous>, x: Continous) -> Discrete {
    grid.iter()
        .map(|g| (g - x).abs())
        .position_min_by(|a, b| a.total_cmp(b))
        .unwrap_or_default()
}
