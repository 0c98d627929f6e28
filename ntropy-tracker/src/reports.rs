use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use ntropy_gacha::numbers::percent_label;
use ntropy_gacha::{
    Capture, CaptureStats, GameCatalog, GameProfile, MilestoneReport, ObjectiveProgress,
    PullState,
};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored terminal output
    Console,
    /// Pretty-printed JSON
    Json,
    /// Markdown tables
    Markdown,
    /// Comma-separated rows with a header line
    Csv,
}

#[derive(Serialize)]
struct OddsJson<'a> {
    pulls: u32,
    state: PullState,
    percentage: f64,
    #[serde(flatten)]
    report: &'a MilestoneReport,
}

#[derive(Serialize)]
struct SolveJson {
    target: f64,
    state: PullState,
    pulls: Option<u32>,
    search_bound: u32,
}

#[derive(Serialize)]
struct HistoryJson<'a> {
    stats: &'a CaptureStats,
    captures: &'a [Capture],
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Quote a CSV field when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

const CAPTURE_CSV_HEADER: &str = "id,game_id,value,timestamp,notes";

fn write_capture_row(out: &mut dyn Write, c: &Capture) -> Result<()> {
    writeln!(
        out,
        "{},{},{},{},{}",
        c.id,
        c.game_id,
        c.value,
        csv_field(&c.timestamp),
        csv_field(&c.notes)
    )?;
    Ok(())
}

fn state_label(state: PullState) -> &'static str {
    if state.guaranteed {
        "guaranteed"
    } else {
        "50/50"
    }
}

pub fn write_odds(
    out: &mut dyn Write,
    format: ReportFormat,
    pulls: u32,
    state: PullState,
    report: &MilestoneReport,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(
            out,
            &OddsJson {
                pulls,
                state,
                percentage: report.percentage(),
                report,
            },
        ),
        ReportFormat::Csv => {
            writeln!(out, "confidence,pulls")?;
            for (label, needed) in &report.milestones {
                writeln!(out, "{label},{needed}")?;
            }
            Ok(())
        }
        ReportFormat::Markdown => {
            writeln!(out, "# Featured Odds\n")?;
            writeln!(out, "- **Pulls**: {pulls}")?;
            writeln!(out, "- **Pity**: {}", state.pity)?;
            writeln!(out, "- **State**: {}", state_label(state))?;
            writeln!(out, "- **Probability**: {}\n", percent_label(report.probability))?;
            writeln!(out, "## Breakdown\n")?;
            for line in report.explanation.to_string().lines() {
                writeln!(out, "> {line}")?;
            }
            writeln!(out, "\n## Milestones\n")?;
            writeln!(out, "| Confidence | Pulls |")?;
            writeln!(out, "|---|---|")?;
            for (label, needed) in &report.milestones {
                writeln!(out, "| {label} | {needed} |")?;
            }
            writeln!(out, "\n_Worst case: {} pulls_", report.worst_case_pulls)?;
            Ok(())
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "🎲 Featured Odds".bright_cyan().bold())?;
            writeln!(out, "{}", "================".cyan())?;
            writeln!(
                out,
                "Pulls: {pulls}  •  Pity: {}  •  State: {}",
                state.pity,
                state_label(state)
            )?;
            writeln!(
                out,
                "Probability: {}",
                percent_label(report.probability).green().bold()
            )?;
            writeln!(out)?;
            writeln!(out, "{}", report.explanation)?;
            writeln!(out)?;
            writeln!(out, "{}", "📈 Milestones".bright_yellow().bold())?;
            for (label, needed) in &report.milestones {
                writeln!(out, "  {label:>4} → {needed} pulls")?;
            }
            writeln!(
                out,
                "  Worst case: {} pulls",
                report.worst_case_pulls.to_string().yellow()
            )?;
            Ok(())
        }
    }
}

pub fn write_solve(
    out: &mut dyn Write,
    format: ReportFormat,
    target: f64,
    state: PullState,
    pulls: Option<u32>,
    search_bound: u32,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(
            out,
            &SolveJson {
                target,
                state,
                pulls,
                search_bound,
            },
        ),
        ReportFormat::Csv => {
            writeln!(out, "target,pity,guaranteed,pulls")?;
            let pulls = pulls.map(|p| p.to_string()).unwrap_or_default();
            writeln!(out, "{target},{},{},{pulls}", state.pity, state.guaranteed)?;
            Ok(())
        }
        ReportFormat::Markdown | ReportFormat::Console => {
            let target_label = percent_label(target);
            match pulls {
                Some(pulls) => writeln!(
                    out,
                    "🎯 {target_label} needs {} pulls (pity {}, {})",
                    pulls.to_string().green().bold(),
                    state.pity,
                    state_label(state)
                )?,
                None => writeln!(
                    out,
                    "⚠️  {target_label} is not reachable within {search_bound} pulls"
                )?,
            }
            Ok(())
        }
    }
}

fn schedule_cells(game: &GameProfile) -> String {
    let s = &game.schedule;
    format!(
        "base {} | soft pity {} | hard pity {} | slope {}",
        percent_label(s.base_rate),
        s.soft_pity_start,
        s.hard_pity,
        s.soft_pity_slope
    )
}

pub fn write_games(out: &mut dyn Write, format: ReportFormat, catalog: &GameCatalog) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, catalog),
        ReportFormat::Csv => {
            writeln!(
                out,
                "id,name,process_name,base_rate,soft_pity_start,hard_pity,soft_pity_slope"
            )?;
            for game in &catalog.games {
                let s = &game.schedule;
                writeln!(
                    out,
                    "{},{},{},{},{},{},{}",
                    game.id,
                    csv_field(&game.name),
                    csv_field(&game.process_name),
                    s.base_rate,
                    s.soft_pity_start,
                    s.hard_pity,
                    s.soft_pity_slope
                )?;
            }
            Ok(())
        }
        ReportFormat::Markdown => {
            writeln!(out, "| Id | Game | Process | Schedule |")?;
            writeln!(out, "|---|---|---|---|")?;
            for game in &catalog.games {
                writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    game.id,
                    game.name,
                    game.process_name,
                    schedule_cells(game)
                )?;
            }
            Ok(())
        }
        ReportFormat::Console => {
            writeln!(out, "Available games:")?;
            for game in &catalog.games {
                writeln!(
                    out,
                    "  {:>2}  {:20} {}",
                    game.id,
                    game.name.bold(),
                    schedule_cells(game)
                )?;
            }
            Ok(())
        }
    }
}

/// Objective progress grouped by game.
pub type ObjectiveSection<'a> = (&'a GameProfile, Vec<ObjectiveProgress>);

pub fn write_objectives(
    out: &mut dyn Write,
    format: ReportFormat,
    sections: &[ObjectiveSection<'_>],
    simulated: bool,
) -> Result<()> {
    if format == ReportFormat::Json {
        let all: Vec<&ObjectiveProgress> = sections.iter().flat_map(|(_, p)| p).collect();
        return write_json(out, &all);
    }
    if format == ReportFormat::Csv {
        writeln!(
            out,
            "id,game_id,name,pulls_needed,current_pity,guaranteed,current_pulls,progress_percent,probability,is_complete"
        )?;
        for p in sections.iter().flat_map(|(_, p)| p) {
            let o = &p.objective;
            writeln!(
                out,
                "{},{},{},{},{},{},{},{:.1},{},{}",
                csv_field(&o.id),
                o.game_id,
                csv_field(&o.name),
                o.pulls_needed,
                o.current_pity,
                o.guaranteed,
                p.current_pulls,
                p.progress_percent,
                p.probability,
                p.is_complete
            )?;
        }
        return Ok(());
    }
    if sections.is_empty() {
        writeln!(out, "No objectives yet.")?;
        return Ok(());
    }
    for (game, progress) in sections {
        match format {
            ReportFormat::Markdown => write_objectives_markdown(out, game, progress)?,
            _ => write_objectives_console(out, game, progress, simulated)?,
        }
    }
    Ok(())
}

fn write_objectives_markdown(
    out: &mut dyn Write,
    game: &GameProfile,
    progress: &[ObjectiveProgress],
) -> Result<()> {
    writeln!(out, "# Objectives: {}\n", game.name)?;
    if progress.is_empty() {
        writeln!(out, "_No objectives yet._\n")?;
        return Ok(());
    }
    writeln!(out, "| Id | Objective | Saved | Progress | Probability | Done |")?;
    writeln!(out, "|---|---|---|---|---|---|")?;
    for p in progress {
        writeln!(
            out,
            "| {} | {} | {:.1}/{} | {:.1}% | {:.1}% | {} |",
            p.objective.id,
            p.objective.name,
            p.current_pulls,
            p.objective.pulls_needed,
            p.progress_percent,
            p.probability_percent(),
            if p.is_complete { "✅" } else { "" }
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_objectives_console(
    out: &mut dyn Write,
    game: &GameProfile,
    progress: &[ObjectiveProgress],
    simulated: bool,
) -> Result<()> {
    writeln!(out, "{}", format!("🎯 {}", game.name).bright_cyan().bold())?;
    if simulated && let Some(first) = progress.first() {
        writeln!(
            out,
            "{}",
            format!("🧪 SIMULATION: {:.1} pulls", first.current_pulls).yellow()
        )?;
    }
    if progress.is_empty() {
        writeln!(out, "No objectives yet.")?;
        return Ok(());
    }
    for p in progress {
        let icon = if p.objective.guaranteed { "🎯" } else { "🎲" };
        let status = if p.is_complete {
            "✅".to_string()
        } else {
            format!("{:.1} remaining", p.remaining)
        };
        writeln!(
            out,
            "{icon} [{}] {}  •  Pity: {}/{}",
            p.objective.id,
            p.objective.name.bold(),
            p.objective.current_pity,
            game.schedule.hard_pity
        )?;
        writeln!(
            out,
            "   {:.1} pulls saved  •  Progress: {:.1}%  •  Real probability: {}  •  {status}",
            p.current_pulls,
            p.progress_percent,
            format!("{:.1}%", p.probability_percent()).green()
        )?;
        for line in p.explanation.to_string().lines() {
            writeln!(out, "   {}", line.dimmed())?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub fn write_history(
    out: &mut dyn Write,
    format: ReportFormat,
    captures: &[Capture],
    stats: &CaptureStats,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, &HistoryJson { stats, captures }),
        ReportFormat::Csv => {
            writeln!(out, "{CAPTURE_CSV_HEADER}")?;
            for c in captures {
                write_capture_row(out, c)?;
            }
            Ok(())
        }
        ReportFormat::Markdown => {
            writeln!(out, "| Id | Game | Value | Timestamp | Notes |")?;
            writeln!(out, "|---|---|---|---|---|")?;
            for c in captures {
                writeln!(
                    out,
                    "| {} | {} | {:.2} | {} | {} |",
                    c.id, c.game_id, c.value, c.timestamp, c.notes
                )?;
            }
            writeln!(
                out,
                "\n- **Count**: {}\n- **Average**: {:.2}\n- **Min**: {:.2}\n- **Max**: {:.2}",
                stats.count, stats.average, stats.min, stats.max
            )?;
            Ok(())
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "📜 Capture History".bright_cyan().bold())?;
            if captures.is_empty() {
                writeln!(out, "No captures recorded.")?;
            }
            for c in captures {
                writeln!(
                    out,
                    "  #{:<4} game {}  {:>10.2}  {}  {}",
                    c.id, c.game_id, c.value, c.timestamp, c.notes
                )?;
            }
            writeln!(
                out,
                "Count: {}  •  Average: {:.2}  •  Min: {:.2}  •  Max: {:.2}",
                stats.count, stats.average, stats.min, stats.max
            )?;
            Ok(())
        }
    }
}

pub fn write_capture(out: &mut dyn Write, format: ReportFormat, capture: &Capture) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, capture),
        ReportFormat::Csv => {
            writeln!(out, "{CAPTURE_CSV_HEADER}")?;
            write_capture_row(out, capture)
        }
        ReportFormat::Markdown | ReportFormat::Console => {
            writeln!(
                out,
                "✅ Recorded #{} for game {}: {:.2} pulls at {}",
                capture.id, capture.game_id, capture.value, capture.timestamp
            )?;
            Ok(())
        }
    }
}
