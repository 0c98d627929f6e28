mod reports;
mod store;

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use ntropy_gacha::{
    GachaEngine, Objective, PullState, RewardSchedule, Tracker, catalog,
    combine_currency, pulls_for_probability_checked,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use reports::ReportFormat;
use store::JsonFileStore;

#[derive(Debug, Parser)]
#[command(name = "ntropy-tracker", version)]
#[command(about = "Gacha pull odds, objectives and capture history for Ntropy")]
struct Args {
    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console, global = true)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, ClapArgs)]
struct ScheduleArgs {
    /// Use the reward schedule of a catalog game
    #[arg(long, conflicts_with = "schedule")]
    game: Option<u32>,

    /// Load a custom reward schedule from a JSON file
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Replace the slope with one spreading this cumulative share over the
    /// soft-pity band (the reference curve's stated share is 0.324)
    #[arg(long)]
    soft_pity_share: Option<f64>,
}

#[derive(Debug, Clone, ClapArgs)]
struct BannerArgs {
    /// Pulls spent since the last top-tier success
    #[arg(long, default_value_t = 0)]
    pity: u32,

    /// The next top-tier success is the featured pick
    #[arg(long)]
    guaranteed: bool,
}

impl BannerArgs {
    const fn state(&self) -> PullState {
        PullState::new(self.pity, self.guaranteed)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Probability of the featured pick plus confidence milestones
    Report {
        /// Pulls available
        #[arg(long)]
        pulls: u32,
        #[command(flatten)]
        banner: BannerArgs,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// Fewest pulls reaching a target probability (0-1)
    Solve {
        #[arg(long)]
        target: f64,
        #[command(flatten)]
        banner: BannerArgs,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },
    /// List supported games and their schedules
    Games,
    /// Progress toward saved objectives
    Objectives {
        #[arg(long)]
        data: PathBuf,
        /// Only show one game
        #[arg(long)]
        game: Option<u32>,
        /// Evaluate with this many pulls instead of the last capture
        #[arg(long)]
        simulate_pulls: Option<f64>,
    },
    /// Save a new objective
    AddObjective {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        game: u32,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = ntropy_gacha::constants::DEFAULT_PULLS_NEEDED)]
        pulls_needed: u32,
        #[command(flatten)]
        banner: BannerArgs,
    },
    /// Delete an objective
    RemoveObjective {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        game: u32,
        #[arg(long)]
        id: String,
    },
    /// Record a currency reading for a game
    Record {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        game: u32,
        /// Pulls already converted
        #[arg(long)]
        converted: f64,
        /// Premium currency not yet converted
        #[arg(long, default_value_t = 0.0)]
        integer: f64,
        /// Override the stored conversion ratio
        #[arg(long)]
        ratio: Option<u32>,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Delete a recorded capture
    DeleteCapture {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        id: u64,
    },
    /// Drop recorded captures, for one game or all of them
    ClearHistory {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        game: Option<u32>,
    },
    /// Capture history and statistics (`--report csv` exports it)
    History {
        #[arg(long)]
        data: PathBuf,
        #[arg(long)]
        game: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.output.is_some() {
        colored::control::set_override(false);
    }

    // Render fully before touching --output so a rejected command leaves it intact.
    let mut buffer = Vec::new();
    run(&args, &mut buffer)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    output_target.writer().write_all(&buffer)?;
    output_target.flush_inner()?;
    Ok(())
}

fn run(args: &Args, out: &mut Vec<u8>) -> Result<()> {
    let format = args.report;
    match &args.command {
        Command::Report {
            pulls,
            banner,
            schedule,
        } => {
            let engine = resolve_engine(schedule)?;
            let state = banner.state().clamped(engine.schedule());
            let report = engine.milestone_report(*pulls, state);
            reports::write_odds(out, format, *pulls, state, &report)
        }
        Command::Solve {
            target,
            banner,
            schedule,
        } => {
            if !target.is_finite() || *target < 0.0 {
                bail!("target must be a probability between 0 and 1 (got {target})");
            }
            let engine = resolve_engine(schedule)?;
            let state = banner.state().clamped(engine.schedule());
            let pulls = pulls_for_probability_checked(engine.schedule(), *target, state);
            reports::write_solve(
                out,
                format,
                *target,
                state,
                pulls,
                engine.schedule().search_bound(),
            )
        }
        Command::Games => reports::write_games(out, format, catalog()),
        Command::Objectives {
            data,
            game,
            simulate_pulls,
        } => {
            let tracker = open_tracker(data);
            let game_ids: Vec<u32> = match game {
                Some(id) => vec![*id],
                None => tracker.catalog().games.iter().map(|g| g.id).collect(),
            };
            let mut sections = Vec::new();
            for game_id in game_ids {
                let profile = tracker
                    .catalog()
                    .get(game_id)
                    .with_context(|| format!("unknown game id {game_id}"))?;
                let progress = tracker.progress(game_id, *simulate_pulls)?;
                if game.is_none() && progress.is_empty() {
                    continue;
                }
                sections.push((profile, progress));
            }
            reports::write_objectives(
                out,
                format,
                &sections,
                simulate_pulls.is_some(),
            )
        }
        Command::AddObjective {
            data,
            game,
            name,
            pulls_needed,
            banner,
        } => {
            let tracker = open_tracker(data);
            let objective = Objective {
                id: tracker.storage().next_objective_id()?,
                game_id: *game,
                name: name.trim().to_string(),
                pulls_needed: *pulls_needed,
                current_pity: banner.pity,
                guaranteed: banner.guaranteed,
            };
            tracker
                .add_objective(&objective)
                .with_context(|| format!("could not add objective {name:?}"))?;
            writeln!(
                out,
                "✅ Added {} ({}) to {}",
                objective.id,
                objective.name,
                tracker.storage().path().display()
            )?;
            Ok(())
        }
        Command::RemoveObjective { data, game, id } => {
            let tracker = open_tracker(data);
            if tracker.remove_objective(*game, id)? {
                writeln!(out, "🗑️  Removed {id}")?;
            } else {
                eprintln!("⚠️  No objective {id} for game {game}");
            }
            Ok(())
        }
        Command::Record {
            data,
            game,
            converted,
            integer,
            ratio,
            notes,
        } => {
            let tracker = open_tracker(data);
            let ratio = match ratio {
                Some(ratio) => *ratio,
                None => tracker.storage().settings()?.conversion_ratio,
            };
            let value = combine_currency(*converted, *integer, ratio);
            log::debug!("{converted} + ({integer} / {ratio}) = {value}");
            let capture = tracker.record_capture(*game, value, &timestamp_now(), notes)?;
            reports::write_capture(out, format, &capture)
        }
        Command::DeleteCapture { data, id } => {
            let tracker = open_tracker(data);
            if tracker.delete_capture(*id)? {
                writeln!(out, "🗑️  Deleted capture #{id}")?;
            } else {
                eprintln!("⚠️  No capture #{id}");
            }
            Ok(())
        }
        Command::ClearHistory { data, game } => {
            let tracker = open_tracker(data);
            let removed = tracker.clear_history(*game)?;
            writeln!(out, "🗑️  Cleared {removed} capture(s)")?;
            Ok(())
        }
        Command::History { data, game, limit } => {
            let tracker = open_tracker(data);
            let captures = tracker.history(*game, *limit)?;
            let stats = tracker.stats(*game)?;
            reports::write_history(out, format, &captures, &stats)
        }
    }
}

fn open_tracker(data: &Path) -> Tracker<JsonFileStore> {
    Tracker::new(catalog().clone(), JsonFileStore::new(data))
}

fn resolve_engine(args: &ScheduleArgs) -> Result<GachaEngine> {
    let schedule = if let Some(path) = &args.schedule {
        load_schedule(path)?
    } else if let Some(game_id) = args.game {
        catalog().schedule_for(game_id)?
    } else {
        RewardSchedule::default()
    };
    let schedule = match args.soft_pity_share {
        Some(share) => RewardSchedule::from_soft_pity_share(
            schedule.base_rate,
            schedule.soft_pity_start,
            schedule.hard_pity,
            share,
        )
        .context("cannot derive a soft pity slope")?,
        None => schedule,
    };
    log::debug!("using schedule {schedule:?}");
    Ok(GachaEngine::new(schedule)?)
}

fn load_schedule(path: &Path) -> Result<RewardSchedule> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schedule {}", path.display()))?;
    let schedule: RewardSchedule = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse schedule {}", path.display()))?;
    schedule
        .validate()
        .with_context(|| format!("invalid schedule {}", path.display()))?;
    Ok(schedule)
}

fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn report_args_parse_banner_state() {
        let args = Args::try_parse_from([
            "ntropy-tracker",
            "report",
            "--pulls",
            "120",
            "--pity",
            "12",
            "--guaranteed",
            "--game",
            "2",
        ])
        .unwrap();
        match args.command {
            Command::Report {
                pulls,
                banner,
                schedule,
            } => {
                assert_eq!(pulls, 120);
                assert_eq!(banner.state(), PullState::new(12, true));
                assert_eq!(schedule.game, Some(2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn game_and_schedule_file_conflict() {
        let parsed = Args::try_parse_from([
            "ntropy-tracker",
            "solve",
            "--target",
            "0.5",
            "--game",
            "1",
            "--schedule",
            "custom.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn resolve_engine_defaults_to_reference_schedule() {
        let engine = resolve_engine(&ScheduleArgs {
            game: None,
            schedule: None,
            soft_pity_share: None,
        })
        .unwrap();
        assert_eq!(*engine.schedule(), RewardSchedule::default());
        let wuwa = resolve_engine(&ScheduleArgs {
            game: Some(4),
            schedule: None,
            soft_pity_share: None,
        })
        .unwrap();
        assert_eq!(wuwa.schedule().hard_pity, 80);
        assert!(
            resolve_engine(&ScheduleArgs {
                game: Some(77),
                schedule: None,
                soft_pity_share: None,
            })
            .is_err()
        );
    }

    #[test]
    fn soft_pity_share_rederives_slope() {
        let engine = resolve_engine(&ScheduleArgs {
            game: Some(1),
            schedule: None,
            soft_pity_share: Some(ntropy_gacha::constants::SOFT_PITY_TOTAL_SHARE),
        })
        .unwrap();
        let slope = engine.schedule().soft_pity_slope;
        assert!(slope > 0.0 && slope < 0.01);
        assert!(
            resolve_engine(&ScheduleArgs {
                game: None,
                schedule: None,
                soft_pity_share: Some(0.01),
            })
            .is_err()
        );
    }
}
