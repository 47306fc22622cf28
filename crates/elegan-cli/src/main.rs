use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elegan_core::config::SimConfig;
use elegan_core::constants::ACTION_COUNT;
use elegan_core::env::ElegansEnv;
use elegan_core::metrics::RunSummary;
use elegan_core::rng::derive_policy_rng;
use elegan_core::world::{AgentSlot, Directions, Simulation};
use rand::Rng;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "elegan")]
#[command(about = "C-elegan grid world CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the first agent from the keyboard: a = left, d = right, q = quit
    Explore {
        /// Path to config file (JSON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run episodes with a uniformly random policy
    Run {
        /// Path to config file (JSON); defaults are used when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of episodes
        #[arg(long, default_value_t = 10)]
        episodes: usize,

        /// Tick limit per episode
        #[arg(long, default_value_t = 1000)]
        max_steps: usize,

        /// Output directory for summary.json (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let config = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open config file {}", path.display()))?;
            serde_json::from_reader(BufReader::new(file)).context("failed to parse config")?
        }
        None => SimConfig::default(),
    };
    config.validate().context("Config validation error")?;
    Ok(config)
}

/// Keyboard input to a relative turn.
fn parse_turn(input: &str) -> i64 {
    match input.trim() {
        "a" => 0,
        "d" => 2,
        _ => 1,
    }
}

/// One character per cell: agent slot index, `*` for food, `.` otherwise.
fn render_ascii(sim: &Simulation) -> String {
    let field = sim.field();
    let (width, height) = (field.width(), field.height());
    let mut grid = vec![vec!['.'; width]; height];
    for &[x, y] in field.foods() {
        grid[y as usize][x as usize] = '*';
    }
    for (idx, slot) in sim.slots().iter().enumerate() {
        let AgentSlot::Live(elegan) = slot else {
            continue;
        };
        let mark = std::char::from_digit((idx % 36) as u32, 36).unwrap_or('#');
        for [x, y] in elegan.cells() {
            grid[y as usize][x as usize] = mark;
        }
        let [hx, hy] = elegan.head();
        grid[hy as usize][hx as usize] = '@';
    }
    let mut out = String::with_capacity((width + 1) * height);
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

fn explore(config: SimConfig) -> Result<()> {
    let n_elegans = config.n_elegans;
    let mut env = ElegansEnv::new(config).context("failed to create environment")?;
    let obs = env.reset()?;
    println!("obs: {obs:?}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    for iter in 0.. {
        println!("iter: {iter}");
        print!("input action: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("failed to read input")?;
        if line.trim() == "q" {
            break;
        }
        // Every other agent goes straight.
        let mut turns = vec![1; n_elegans];
        if let Some(first) = turns.first_mut() {
            *first = parse_turn(&line);
        }
        let directions = if n_elegans == 1 {
            Directions::Single(turns[0])
        } else {
            Directions::Multi(turns)
        };

        let outcome = env.step(directions)?;
        println!("obs: {:?}", outcome.observations);
        println!("rew: {:?}", outcome.rewards);
        println!("done: {}", outcome.done);
        println!("info: {:?}", outcome.info);
        if let Some(sim) = env.simulation() {
            print!("{}", render_ascii(sim));
        }
        if outcome.done {
            let obs = env.reset()?;
            println!("episode over, reset. obs: {obs:?}");
        }
    }
    Ok(())
}

fn run(config: SimConfig, episodes: usize, max_steps: usize, out: Option<PathBuf>) -> Result<()> {
    let n_elegans = config.n_elegans;
    let base_seed = config.seed;
    let mut env = ElegansEnv::new(config).context("failed to create environment")?;
    println!("Running {episodes} episodes (max {max_steps} steps each)...");

    let mut summaries = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        let mut rng = derive_policy_rng(base_seed, episode as u64);
        let summary = env.run_episode(max_steps, |_| {
            let mut turns: Vec<i64> = (0..n_elegans)
                .map(|_| rng.random_range(0..ACTION_COUNT as i64))
                .collect();
            if turns.len() == 1 {
                Directions::Single(turns.remove(0))
            } else {
                Directions::Multi(turns)
            }
        })?;
        println!(
            "episode {episode}: steps={} reward={:.2} foods={} deaths={} terminated={}",
            summary.steps,
            summary.total_reward(),
            summary.foods_eaten,
            summary.deaths,
            summary.terminated
        );
        summaries.push(summary);
    }

    let run_summary = RunSummary::from_episodes(summaries);
    println!(
        "mean steps={:.1} mean reward={:.2} mean foods={:.2}",
        run_summary.mean_steps, run_summary.mean_total_reward, run_summary.mean_foods_eaten
    );
    if let Some(out_dir) = out {
        std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
        let summary_path = out_dir.join("summary.json");
        let file = File::create(summary_path).context("failed to create summary file")?;
        serde_json::to_writer_pretty(file, &run_summary).context("failed to write summary")?;
        println!("Run complete. Results saved to {:?}", out_dir);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Explore { config, seed } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            explore(config)?;
        }
        Commands::Run {
            config,
            episodes,
            max_steps,
            out,
        } => {
            let config = load_config(config.as_deref())?;
            run(config, episodes, max_steps, out)?;
        }
    }
    Ok(())
}
