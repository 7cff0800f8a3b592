use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flappy::{Game, GameConfig, Player};
use flappy_rl::{trainer, AgentConfig, MdpAgent, SavedModel};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Agent {
    Human,
    Ai,
}

#[derive(Parser)]
#[command(name = "flappy-mdp")]
#[command(version, about = "Side-scrolling bird game played by a human or a model-based RL agent")]
struct Cli {
    /// Who plays the game.
    #[arg(long, value_enum, default_value_t = Agent::Ai)]
    agent: Agent,

    /// Number of training episodes for the AI agent.
    #[arg(long, default_value_t = 200)]
    episodes: usize,

    /// Cut an episode off after this many ticks.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: usize,

    /// Learned model to resume from and save to.
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON file with optional `game` and `agent` sections.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for pipe heights and exploration.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    game: GameConfig,
    agent: AgentConfig,
}

impl ConfigFile {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let ConfigFile { game, mut agent } = ConfigFile::load(cli.config.as_deref())?;
    agent.seed = cli.seed.or(agent.seed);

    match cli.agent {
        Agent::Human => {
            let mut game = Game::new(game, Player::Human, agent.seed)?;
            let stdin = std::io::stdin();
            let best = trainer::play_human(&mut game, stdin.lock(), std::io::stdout().lock())?;
            println!("Best score: {best}");
        }
        Agent::Ai => run_agent(&cli, game, agent)?,
    }

    Ok(())
}

fn run_agent(cli: &Cli, game_config: GameConfig, config: AgentConfig) -> Result<()> {
    let mut game = Game::new(game_config, Player::Agent, config.seed)?;

    let saved = match &cli.model {
        Some(path) => SavedModel::load_from_file(path)
            .with_context(|| format!("Failed to load model: {}", path.display()))?,
        None => None,
    };
    let prior_episodes = saved.as_ref().map(|s| s.episodes).unwrap_or_default();

    let mut agent = match saved {
        Some(saved) => {
            let (discretizer, mdp) = saved.into_parts()?;
            info!(prior_episodes, num_states = mdp.n_s(), "resuming from saved model");
            MdpAgent::with_model(config, discretizer, mdp, game.observation())?
                .resume_after(prior_episodes)
        }
        None => MdpAgent::new(config, game.config(), game.observation())?,
    };

    let stats = trainer::train(&mut agent, &mut game, cli.episodes, cli.max_ticks)?;

    let best = stats.iter().map(|s| s.score).max().unwrap_or_default();
    let mean_ticks = if stats.is_empty() {
        0.
    } else {
        stats.iter().map(|s| s.ticks).sum::<usize>() as f64 / stats.len() as f64
    };
    info!(
        episodes = stats.len(),
        best_score = best,
        mean_ticks,
        epsilon = agent.epsilon(),
        "training finished"
    );

    if let Some(path) = &cli.model {
        SavedModel::new(agent.discretizer(), agent.mdp(), prior_episodes + stats.len())
            .save_to_file(path)
            .with_context(|| format!("Failed to save model: {}", path.display()))?;
        info!(path = %path.display(), "model saved");
    }

    Ok(())
}
