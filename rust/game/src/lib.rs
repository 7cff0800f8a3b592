extern crate rand;
extern crate serde;

pub mod bird;
pub mod common;
pub mod config;
pub mod course;
pub mod game;

pub use common::defs::*;
pub use config::{ConfigError, GameConfig};
pub use game::{Game, Player};
