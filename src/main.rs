// CLI entry point for Links Tour Simulator

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use prettytable::{row, Table};

use links_tour_simulator::api::{CreateFormat, CreateTournament, FieldType, HumanSeed};
use links_tour_simulator::models::tournament::TournamentStatus;
use links_tour_simulator::seed::courses::seed_courses_from_file;
use links_tour_simulator::seed::ratings::refresh_ratings_from_csv;
use links_tour_simulator::{Engine, EngineConfig, TournamentSnapshot};

#[derive(Parser)]
#[command(name = "links-tour-simulator")]
#[command(about = "PGA-style tournament simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FieldArg {
    TopRanked,
    Amateur,
    Random,
    Mixed,
    MidTier,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Stroke,
    Match,
    MatchFourball,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate seed files and report what they contain
    Seed {
        /// Course catalog JSON
        #[arg(long, default_value = "data/pga_courses.json")]
        courses: PathBuf,

        /// World-ranking CSV (NAME, RANKING, CTRY)
        #[arg(long, default_value = "data/rankings.csv")]
        rankings: PathBuf,
    },

    /// Simulate a full tournament and print the leaderboard
    Run {
        /// Course catalog JSON
        #[arg(long, default_value = "data/pga_courses.json")]
        courses: PathBuf,

        /// World-ranking CSV
        #[arg(long, default_value = "data/rankings.csv")]
        rankings: PathBuf,

        /// Course to play (defaults to the first in the catalog)
        #[arg(long)]
        course: Option<String>,

        /// Tournament name
        #[arg(long, default_value = "Simulated Open")]
        name: String,

        /// Bot field size
        #[arg(short, long, default_value = "90")]
        golfers: usize,

        /// Field selection flavor
        #[arg(long, value_enum, default_value = "top-ranked")]
        field: FieldArg,

        /// Tournament format
        #[arg(long, value_enum, default_value = "stroke")]
        format: FormatArg,

        /// Add a human entry with this name (scores must be submitted via ticks)
        #[arg(long)]
        human: Option<String>,

        /// RNG seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { courses, rankings } => {
            let engine = Engine::new(EngineConfig::default());
            let (created, _) = engine.with_store_mut(|s| seed_courses_from_file(s, &courses))?;
            let golfers = engine.with_store_mut(|s| refresh_ratings_from_csv(s, &rankings))?;
            println!("Seeded {} courses and {} golfers.", created, golfers);
            Ok(())
        }
        Commands::Run {
            courses,
            rankings,
            course,
            name,
            golfers,
            field,
            format,
            human,
            seed,
        } => run_tournament(
            &courses, &rankings, course, name, golfers, field, format, human, seed,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_tournament(
    courses: &PathBuf,
    rankings: &PathBuf,
    course: Option<String>,
    name: String,
    golfers: usize,
    field: FieldArg,
    format: FormatArg,
    human: Option<String>,
    seed: Option<u64>,
) -> Result<()> {
    let config = EngineConfig::default();
    let engine = match seed {
        Some(s) => Engine::with_seed(config, s),
        None => Engine::new(config),
    };

    engine.with_store_mut(|s| seed_courses_from_file(s, courses))?;
    engine.with_store_mut(|s| refresh_ratings_from_csv(s, rankings))?;

    let course_id = match &course {
        Some(name) => engine
            .courses()
            .into_iter()
            .find(|c| &c.name == name)
            .map(|c| c.id)
            .with_context(|| format!("course not found in catalog: {}", name))?,
        None => match engine.courses().first() {
            Some(c) => c.id,
            None => bail!("course catalog is empty"),
        },
    };

    let humans = human
        .into_iter()
        .map(|name| HumanSeed {
            name,
            country: "USA".to_string(),
            handedness: Default::default(),
            avatar_color: String::new(),
            team: None,
        })
        .collect();

    let tid = engine.create_tournament(CreateTournament {
        name,
        course_id,
        golfer_count: golfers,
        field_type: match field {
            FieldArg::TopRanked => FieldType::TopRanked,
            FieldArg::Amateur => FieldType::Amateur,
            FieldArg::Random => FieldType::Random,
            FieldArg::Mixed => FieldType::Mixed,
            FieldArg::MidTier => FieldType::MidTier,
        },
        format: match format {
            FormatArg::Stroke => CreateFormat::Stroke,
            FormatArg::Match => CreateFormat::Match,
            FormatArg::MatchFourball => CreateFormat::MatchFourball,
        },
        humans,
        start_time: None,
    })?;

    // Four regulation rounds plus a little playoff headroom.
    let pb = ProgressBar::new(6);
    pb.set_style(
        ProgressStyle::with_template("{spinner} round {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut snapshot = engine.snapshot(tid)?;
    for _ in 0..6 {
        if snapshot.tournament.status == TournamentStatus::Finished {
            break;
        }
        pb.set_position(snapshot.tournament.current_round.min(6) as u64);
        snapshot = engine.sim_to_end_of_day(tid)?;
    }
    pb.finish_and_clear();

    print_leaderboard(&engine, &snapshot)?;
    print_events(&snapshot);
    Ok(())
}

fn format_to_par(diff: i32) -> String {
    match diff {
        0 => "E".to_string(),
        d if d > 0 => format!("+{}", d),
        d => d.to_string(),
    }
}

fn print_leaderboard(engine: &Engine, snapshot: &TournamentSnapshot) -> Result<()> {
    let detail = engine.course_detail(snapshot.tournament.course)?;
    let pars: HashMap<u8, u8> = detail
        .holes
        .iter()
        .map(|h| (h.hole.number, h.hole.par))
        .collect();

    let mut rows: Vec<_> = snapshot
        .entries
        .iter()
        .filter(|e| e.entry.position.is_some())
        .collect();
    rows.sort_by_key(|e| e.entry.position.unwrap_or(usize::MAX));

    let mut table = Table::new();
    table.add_row(row!["POS", "PLAYER", "CTRY", "TO PAR", "THRU", "TOTAL"]);
    for e in rows.iter().take(25) {
        let par_played: i32 = e
            .hole_results
            .iter()
            .map(|r| pars.get(&r.hole_number).copied().unwrap_or(4) as i32)
            .sum();
        let to_par = e.entry.tournament_strokes - par_played;
        let cut_mark = if e.entry.cut { " (MC)" } else { "" };
        table.add_row(row![
            e.entry.position.map(|p| p.to_string()).unwrap_or_default(),
            format!("{}{}", e.entry.display_name, cut_mark),
            e.entry.country,
            format_to_par(to_par),
            e.entry.thru_hole,
            e.entry.tournament_strokes,
        ]);
    }
    table.printstd();

    if snapshot.tournament.status == TournamentStatus::Finished {
        if let Some(champ) = rows.first() {
            println!(
                "\n{} {}",
                "CHAMPION:".bold().green(),
                champ.entry.display_name.bold()
            );
        }
    }

    if !snapshot.session_history.is_empty() {
        println!("\nMatch results:");
        for (session, matches) in &snapshot.session_history {
            for m in matches {
                println!("  {}: {} ({})", session, m.winner, m.score);
            }
        }
    }
    Ok(())
}

fn print_events(snapshot: &TournamentSnapshot) {
    if snapshot.recent_events.is_empty() {
        return;
    }
    println!("\nRecent events:");
    for ev in &snapshot.recent_events {
        let line = format!("  R{}: {}", ev.round_number, ev.text);
        match ev.importance {
            4 => println!("{}", line.bright_yellow().bold()),
            3 => println!("{}", line.yellow()),
            2 => println!("{}", line.green()),
            _ => println!("{}", line),
        }
    }
}
