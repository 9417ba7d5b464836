use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use labyrinth_common::{CellCoord, GameConfig};
use labyrinth_input::{Action, Direction, MoveInput};
use labyrinth_kernel::SimulationState;
use labyrinth_render::{AsciiMapRenderer, RenderView, Renderer};
use labyrinth_tools::SimulationInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labyrinth-cli", about = "Headless labyrinth tool")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Game config (.yaml, .yml or .json); built-in level when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Load and validate a config, then build its maze
    Validate,
    /// Print the maze as a top-down map
    Show,
    /// Run scripted movement through the simulation and print the result
    Simulate {
        /// Space separated steps: keys from `wasd` (or `.` for idle) followed by a
        /// frame count, plus `r` (restart) and `q` (quit). Example: "w10 wd3 .5"
        #[arg(short, long, default_value = "")]
        moves: String,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,
        /// Start at the center of this column instead of the spawn point
        #[arg(long, requires = "start_row")]
        start_col: Option<i32>,
        /// Start at the center of this row instead of the spawn point
        #[arg(long, requires = "start_col")]
        start_row: Option<i32>,
    },
}

/// One parsed token of a `--moves` script.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    Hold { input: MoveInput, frames: u32 },
    Act(Action),
}

fn parse_moves(script: &str) -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    for token in script.split_whitespace() {
        match token {
            "r" => steps.push(Step::Act(Action::Restart)),
            "q" => steps.push(Step::Act(Action::Quit)),
            _ => {
                let split = token
                    .find(|c: char| c.is_ascii_digit())
                    .unwrap_or(token.len());
                let (keys, count) = token.split_at(split);
                if keys.is_empty() {
                    bail!("move {token:?} has no keys");
                }
                let mut input = MoveInput::default();
                for key in keys.chars() {
                    match key {
                        'w' => input.set(Direction::Forward, true),
                        's' => input.set(Direction::Back, true),
                        'a' => input.set(Direction::Left, true),
                        'd' => input.set(Direction::Right, true),
                        '.' => {}
                        other => bail!("unknown key {other:?} in move {token:?}"),
                    }
                }
                let frames = if count.is_empty() {
                    1
                } else {
                    count
                        .parse()
                        .with_context(|| format!("bad frame count in move {token:?}"))?
                };
                steps.push(Step::Hold { input, frames });
            }
        }
    }
    Ok(steps)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn print_map(state: &SimulationState) {
    let view = RenderView::from_camera(state.camera());
    print!("{}", AsciiMapRenderer::new().render(state, &view));
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("labyrinth-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("grid: {}", labyrinth_grid::crate_info());
            println!("kernel: {}", labyrinth_kernel::crate_info());
            println!("input: {}", labyrinth_input::crate_info());
            println!("render: {}", labyrinth_render::crate_info());
            println!("tools: {}", labyrinth_tools::crate_info());
        }
        Commands::Validate => {
            let state = SimulationState::new(config).context("config does not build a maze")?;
            let grid = state.maze().grid();
            println!(
                "OK: {}x{} maze, {} walls, goal {}",
                grid.rows(),
                grid.cols(),
                grid.wall_count(),
                state.config().maze.win_cell
            );
        }
        Commands::Show => {
            let state = SimulationState::new(config)?;
            print_map(&state);
        }
        Commands::Simulate {
            moves,
            dt,
            start_col,
            start_row,
        } => {
            let steps = parse_moves(&moves)?;
            let mut state = SimulationState::new(config)?;
            if let (Some(col), Some(row)) = (start_col, start_row) {
                let cell = CellCoord::new(col, row);
                if !state.maze().grid().contains(cell) {
                    bail!("start cell {cell} is outside the maze");
                }
                let y = state.character().y;
                let center = state.maze().mapping().cell_center(cell, y);
                state.place_character(center);
            }

            for step in steps {
                match step {
                    Step::Hold { input, frames } => {
                        for _ in 0..frames {
                            state.step(&input, dt);
                        }
                    }
                    Step::Act(action) => state.apply(action),
                }
            }

            let (blocked, clamped) = SimulationInspector::collision_counts(state.events());
            println!("{}", SimulationInspector::summary(&state));
            println!("blocked moves: {blocked}, camera clamps: {clamped}");
            print_map(&state);
        }
    }

    Ok(())
}
