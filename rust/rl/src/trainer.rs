use crate::agent::{MdpAgent, Phase};
use crate::error::{Error, Result};
use flappy::{Actuator, Game};
use std::io::{BufRead, Write};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeStats {
    pub episode: usize,
    pub ticks: usize,
    pub score: usize,
    /// Value iteration converged at the end of the episode.
    pub converged: bool,
}

/// Run `episodes` full episodes of `agent` against `game`.
///
/// Episodes that survive `max_ticks` ticks are cut off; the model is still refit
/// from what they recorded. An agent left mid-episode or terminated, by an earlier
/// call or a cut-off, is reset before it plays again.
pub fn train(
    agent: &mut MdpAgent,
    game: &mut Game,
    episodes: usize,
    max_ticks: usize,
) -> Result<Vec<EpisodeStats>> {
    let mut stats = Vec::with_capacity(episodes);
    game.start();

    for _ in 0..episodes {
        if agent.phase() != Phase::Idle {
            agent.reset(game.observation(), game);
        }

        let mut ticks = 0;
        let mut score = 0;
        let mut converged = false;
        loop {
            agent.choose_action(game.observation(), game)?;
            let tick = game.step();
            ticks += 1;
            score = score.max(game.score());
            if let Some(report) = agent.record_transition(&tick, game)? {
                converged = report.converged;
                break;
            }
            if ticks >= max_ticks {
                info!(episode = agent.episode(), ticks, "episode cut off");
                game.restart();
                agent.update_mdp_parameters()?;
                break;
            }
        }

        stats.push(EpisodeStats {
            episode: agent.episode(),
            ticks,
            score,
            converged,
        });
    }

    Ok(stats)
}

/// Line-driven play for a human: every input line is one tick.
///
/// `j` (or a blank space) jumps, `n` starts a new game, `q` quits, anything else just waits.
/// Returns the best score reached.
pub fn play_human<R: BufRead, W: Write>(game: &mut Game, input: R, mut output: W) -> Result<usize> {
    let io_err = |source| Error::Io {
        operation: "write game status".to_string(),
        path: "<stdout>".into(),
        source,
    };

    let mut best = 0;
    game.start();
    writeln!(output, "j: jump, n: new game, q: quit").map_err(io_err)?;

    for line in input.lines() {
        let line = line.map_err(|source| Error::Io {
            operation: "read input".to_string(),
            path: "<stdin>".into(),
            source,
        })?;

        match line.as_str() {
            "q" => break,
            "n" => {
                game.restart();
                game.start();
                writeln!(output, "new game").map_err(io_err)?;
                continue;
            }
            "j" | " " => game.jump(),
            _ => {}
        }

        if !game.in_game() {
            writeln!(output, "game over, score {}; n for a new game", game.score()).map_err(io_err)?;
            continue;
        }

        let tick = game.step();
        best = best.max(game.score());
        let obs = tick.observation;
        if tick.is_terminal {
            writeln!(output, "crashed! score {}", game.score()).map_err(io_err)?;
        } else {
            writeln!(
                output,
                "score {} | y {:.0} dx {:.0} dy {:.0}",
                game.score(),
                obs.y,
                obs.dx,
                obs.dy
            )
            .map_err(io_err)?;
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AgentConfig, Resolution};
    use flappy::{GameConfig, Player};

    fn setup(seed: u64) -> (MdpAgent, Game) {
        let game = Game::new(GameConfig::default(), Player::Agent, Some(seed)).unwrap();
        let config = AgentConfig {
            n_states: Resolution {
                n_y: 1,
                n_dx: 6,
                n_dy: 8,
            },
            seed: Some(seed),
            ..AgentConfig::default()
        };
        let agent = MdpAgent::new(config, game.config(), game.observation()).unwrap();
        (agent, game)
    }

    #[test]
    fn trains_for_the_requested_number_of_episodes() {
        let (mut agent, mut game) = setup(2718);
        let stats = train(&mut agent, &mut game, 5, 5_000).unwrap();

        assert_eq!(stats.len(), 5);
        assert_eq!(
            stats.iter().map(|s| s.episode).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        assert!(stats.iter().all(|s| s.ticks > 0));
        let recorded = agent.mdp().transition_counts().sum() as usize;
        assert_eq!(recorded, stats.iter().map(|s| s.ticks).sum::<usize>());
    }

    #[test]
    fn cut_off_episodes_leave_the_agent_ready() {
        let (mut agent, mut game) = setup(1);
        let stats = train(&mut agent, &mut game, 2, 3).unwrap();
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.ticks <= 3));

        let stats = train(&mut agent, &mut game, 1, 3).unwrap();
        assert_eq!(stats[0].episode, 3);
    }

    #[test]
    fn training_can_continue_across_calls() {
        let (mut agent, mut game) = setup(2718);
        let first = train(&mut agent, &mut game, 2, 5_000).unwrap();
        let second = train(&mut agent, &mut game, 2, 5_000).unwrap();

        assert_eq!(first.iter().map(|s| s.episode).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(second.iter().map(|s| s.episode).collect::<Vec<_>>(), vec![3, 4]);
        assert!((agent.epsilon() - 0.53).abs() < 1e-12);
    }

    #[test]
    fn human_mode_reads_one_tick_per_line() {
        let mut game = Game::new(GameConfig::default(), Player::Human, Some(3)).unwrap();
        let input = "j\n\n\nq\nj\n".as_bytes();
        let mut out = Vec::new();
        play_human(&mut game, input, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().filter(|l| l.starts_with("score")).count(), 3);
        assert!(game.bird().y < 150);
    }
}
