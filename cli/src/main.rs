use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sweepsight_core::{
    Autopilot, AutopilotConfig, CellCount, Coord, Coord2, CoordSet, Deductions, GameConfig, Grid,
    MineLayoutGenerator, OverlayMark, PlayEngine, RandomLayoutGenerator, RiskMove, ScreenPoint,
    SessionOutcome, SolverTier, StartCell, deduce_with, overlay_marks, run_session,
};

mod config;

use config::Config;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// TOML settings with optional `[geometry]` and `[autopilot]` tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Deduce safe cells and mines for a text grid
    Analyze(AnalyzeArgs),
    /// Let the autopilot play generated boards
    Simulate(SimulateArgs),
}

#[derive(clap::Args, Debug)]
struct AnalyzeArgs {
    /// Grid file, `-` for stdin
    input: PathBuf,

    /// Extra flag to fold in, as `row,col`
    #[arg(short, long = "flag", value_parser = parse_pair::<Coord>)]
    flags: Vec<Coord2>,

    /// Skip the pattern detectors
    #[arg(long)]
    basic: bool,

    /// Include screen rectangles for every deduced cell
    #[arg(long)]
    overlay: bool,

    /// Board origin on screen, as `x,y`
    #[arg(long, value_parser = parse_pair::<i32>)]
    origin: Option<(i32, i32)>,

    /// Cell size in pixels
    #[arg(long)]
    cell_size: Option<u32>,

    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Preset {
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    fn game_config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::beginner(),
            Self::Intermediate => GameConfig::intermediate(),
            Self::Expert => GameConfig::expert(),
        }
    }
}

#[derive(clap::Args, Debug)]
struct SimulateArgs {
    #[arg(short, long, value_enum, default_value_t = Preset::Beginner)]
    preset: Preset,

    #[arg(long)]
    rows: Option<Coord>,

    #[arg(long)]
    cols: Option<Coord>,

    #[arg(long)]
    mines: Option<CellCount>,

    /// Force a seed instead of the configured one
    #[arg(short, long)]
    seed: Option<u64>,

    /// First cell to reveal, as `row,col`; defaults to the center
    #[arg(long, value_parser = parse_pair::<Coord>)]
    start: Option<Coord2>,

    #[arg(long, default_value_t = 1000)]
    max_turns: u32,

    /// Number of games, each seeded one higher than the last
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Skip the pattern detectors
    #[arg(long)]
    basic: bool,

    #[arg(long)]
    json: bool,
}

fn parse_pair<T: std::str::FromStr>(s: &str) -> Result<(T, T), String> {
    let (first, second) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma separated values, got `{s}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse()
            .map_err(|_| format!("invalid number `{part}`"))
    };
    Ok((parse(first)?, parse(second)?))
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    deductions: &'a Deductions,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<Vec<OverlayMark>>,
}

fn read_grid(input: &Path) -> anyhow::Result<Grid> {
    let text = if input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading grid from stdin")?;
        text
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("reading grid {}", input.display()))?
    };
    text.parse::<Grid>()
        .with_context(|| format!("parsing grid {}", input.display()))
}

fn format_coords(cells: &CoordSet) -> String {
    if cells.is_empty() {
        return "-".to_string();
    }
    cells
        .iter()
        .map(|(row, col)| format!("({row},{col})"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn analyze(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let grid = read_grid(&args.input)?
        .with_flags(&args.flags)
        .context("folding in flags")?;
    log::info!("analyzing {}x{} grid", grid.rows(), grid.cols());

    let tier = if args.basic {
        SolverTier::Basic
    } else {
        config.autopilot.tier
    };
    let deductions = deduce_with(&grid, tier);

    let mut geometry = config.geometry;
    if let Some((x, y)) = args.origin {
        geometry.origin = ScreenPoint::new(x, y);
    }
    if let Some(cell_size) = args.cell_size {
        geometry.cell_size = cell_size;
    }
    let overlay = args
        .overlay
        .then(|| overlay_marks(&geometry, &deductions));

    if args.json {
        let report = AnalysisReport {
            deductions: &deductions,
            overlay,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("safe:   {}", format_coords(&deductions.safe));
    println!("mines:  {}", format_coords(&deductions.mines));
    println!("chords: {}", format_coords(&deductions.chords));
    match deductions.lowest_risk {
        Some(RiskMove {
            coords: (row, col),
            risk,
        }) => println!("guess:  ({row},{col}) at {:.1}%", risk * 100.0),
        None => println!("guess:  -"),
    }
    for mark in overlay.into_iter().flatten() {
        let rect = mark.rect;
        println!(
            "{:?} {:?} [{}, {}, {}, {}]",
            mark.kind, mark.coords, rect.left, rect.top, rect.right, rect.bottom
        );
    }
    Ok(())
}

fn simulate(args: SimulateArgs, config: Config) -> anyhow::Result<()> {
    let preset = args.preset.game_config();
    let size = (
        args.rows.unwrap_or(preset.size.0),
        args.cols.unwrap_or(preset.size.1),
    );
    let game_config = GameConfig::new(size, args.mines.unwrap_or(preset.mines));
    let start = args.start.unwrap_or((size.0 / 2, size.1 / 2));
    if start.0 >= game_config.size.0 || start.1 >= game_config.size.1 {
        bail!("start cell {start:?} is outside a {size:?} board");
    }

    let mut autopilot_config = config.autopilot;
    if args.basic {
        autopilot_config.tier = SolverTier::Basic;
    }
    let base_seed = args.seed.unwrap_or(autopilot_config.seed);

    let mut wins = 0;
    for game in 0..args.games {
        let seed = base_seed.wrapping_add(u64::from(game));
        let layout = RandomLayoutGenerator::new(seed, start, StartCell::AlwaysZero)
            .generate(game_config);
        let mut engine = PlayEngine::new(layout);
        let mut autopilot = Autopilot::new(AutopilotConfig {
            seed,
            ..autopilot_config
        });

        let report = run_session(&mut engine, &mut autopilot, start, args.max_turns)
            .with_context(|| format!("playing game {game} (seed {seed})"))?;
        if report.outcome == SessionOutcome::Won {
            wins += 1;
        }

        if args.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "game {game} seed {seed}: {:?} after {} turns, {} gambles, {} flags, {} mines left",
                report.outcome, report.turns, report.gambles, report.flags, report.mines_left
            );
        }
    }

    if !args.json && args.games > 1 {
        println!("won {wins}/{} games", args.games);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = Config::load(args.config.as_deref())?;
    match args.command {
        Command::Analyze(analyze_args) => analyze(analyze_args, config),
        Command::Simulate(simulate_args) => simulate(simulate_args, config),
    }
}
