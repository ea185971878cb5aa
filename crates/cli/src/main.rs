//! ClimaCode CLI - website carbon scanner and green web development course.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use climacode_core::{
    Catalog, ClimaConfig, ModuleId, ScanResult, Session, UserId, UserProfile, COUNTRIES,
};
use climacode_progress::{
    dashboard_achievements, school_achievements, Achievement, ModuleStatus, ProgressTracker,
    ScanActivity,
};
use climacode_scan::{certificate_eligible, ImpactStats, ScanPipeline, ScanRequest};
use climacode_storage::{JsonStorage, Storage};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "climacode")]
#[command(about = "Website carbon scanner and green web development course", long_about = None)]
struct Cli {
    /// Account to act as; scans are not saved without one
    #[arg(long, global = true)]
    user: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and CLIMACODE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the carbon footprint of a web page
    Scan {
        /// Page URL (http or https)
        url: String,
        /// Hosting country
        #[arg(long, value_parser = PossibleValuesParser::new(COUNTRIES.iter().copied()))]
        country: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Lesson actions
    Lesson {
        #[command(subcommand)]
        action: LessonCommand,
    },
    /// Answer a lesson quiz
    Quiz {
        /// Module number
        module: ModuleId,
        /// Lesson number (1-based)
        lesson: u32,
        /// Chosen option (1-based)
        option: usize,
    },
    /// List course modules and their status
    Modules,
    /// Show scan history, impact and achievements
    Dashboard {
        /// Number of recent scans to list
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Profile settings
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },
}

#[derive(Subcommand)]
enum LessonCommand {
    /// Mark a lesson as completed
    Complete {
        /// Module number
        module: ModuleId,
        /// Lesson number (1-based)
        lesson: u32,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Set the display name; an empty name clears it
    SetUsername {
        /// New username
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --json.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClimaConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let storage = Arc::new(Mutex::new(JsonStorage::new(&config.data_dir).await?));
    let catalog = Arc::new(Catalog::ecodev());
    let session = session_for(cli.user.as_deref())?;

    match cli.command {
        Commands::Scan { url, country, json } => {
            let pipeline = ScanPipeline::from_config(storage, &config);
            let mut request = ScanRequest::new(url);
            request.country = country;
            let result = pipeline.run(&session, request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_scan(&result);
            }
            if !session.is_authenticated() {
                info!("Not signed in, scan was not saved");
            }
        }
        Commands::Lesson { action: LessonCommand::Complete { module, lesson } } => {
            let user = require_user(&session)?;
            let mut tracker = ProgressTracker::load(storage, catalog, user).await?;
            let progress = tracker.record_lesson_completion(module, lesson_index(lesson)?).await?;
            let done = progress.lessons_completed();
            let completed = progress.completed;
            let total = tracker.catalog().total_lessons(module).unwrap_or(0);

            println!("Module {}: {}/{} lessons", module, done, total);
            if completed {
                println!("Module {} completed", module);
                if tracker.catalog().module(module + 1).is_some() {
                    println!("Module {} unlocked", module + 1);
                }
            }
        }
        Commands::Quiz { module, lesson, option } => {
            let user = require_user(&session)?;
            let mut tracker = ProgressTracker::load(storage, catalog, user).await?;
            let option = option
                .checked_sub(1)
                .ok_or_else(|| anyhow::anyhow!("Options are numbered from 1"))?;
            let outcome = tracker
                .submit_quiz_answer(module, lesson_index(lesson)?, option)
                .await?;

            if outcome.correct {
                println!("Correct!");
            } else {
                println!("Not quite. The answer is: {}", outcome.correct_answer);
            }
        }
        Commands::Modules => {
            let user = require_user(&session)?;
            let tracker = ProgressTracker::load(storage, catalog.clone(), user).await?;

            println!("EcoDev School");
            for module in catalog.modules() {
                let status = tracker.module_status(module.id).unwrap_or(ModuleStatus::Unavailable);
                let done = tracker.progress(module.id).map_or(0, |p| p.lessons_completed());
                println!(
                    "  {} | {} | {}/{} | {} - {} ({}, {} min)",
                    module.id,
                    format_status(status),
                    done,
                    module.total_lessons(),
                    module.title,
                    module.description,
                    module.difficulty,
                    module.duration_minutes,
                );
                if let Some(next) = tracker.next_lesson(module.id) {
                    if status != ModuleStatus::Locked {
                        if let Some(lesson) = module.lesson(next) {
                            println!("      next: {}. {}", next + 1, lesson.title);
                        }
                    }
                }
            }

            let summary = tracker.summary();
            println!(
                "Overall: {}/{} modules, {} lessons, {:.0}%",
                summary.modules_completed,
                summary.total_modules,
                summary.lessons_completed,
                summary.percentage,
            );
            print_achievements("Achievements", &school_achievements(&catalog, tracker.progress_map()));
        }
        Commands::Dashboard { limit } => {
            let user = require_user(&session)?;
            let scans = storage.lock().await.list_scans(&user, None).await?;
            let profile = storage
                .lock()
                .await
                .load_profile(&user)
                .await?
                .unwrap_or_else(|| UserProfile::new(user.clone()));
            let tracker = ProgressTracker::load(storage, catalog, user).await?;

            let stats = ImpactStats::from_scans(&scans);
            println!("{}", profile.display_name());
            println!("  Scans: {}", stats.scan_count);
            println!("  CO₂ measured: {}g", stats.total_co2_grams);
            println!("  Trees equivalent: {}", stats.trees_equivalent);
            println!("  Water equivalent: {}L", stats.water_litres);
            match (stats.average_score, stats.band()) {
                (Some(avg), Some(band)) => println!("  Average score: {:.2} ({})", avg, band),
                _ => println!("  Average score: -"),
            }

            println!("Milestones");
            for m in &stats.milestones {
                println!("  {} {} {:.0}%", m.icon, m.target, m.percent);
            }

            println!("Recent scans");
            for scan in scans.iter().take(limit) {
                println!(
                    "  {} | {} | {}g | {:.2} | {}",
                    scan.created_at.format("%Y-%m-%d %H:%M"),
                    scan.url,
                    scan.co2_per_view_grams,
                    scan.sustainability_score,
                    scan.country_label,
                );
            }

            let activity = ScanActivity::from_scans(&scans);
            print_achievements("Achievements", &dashboard_achievements(&activity, tracker.progress_map()));
        }
        Commands::Profile { action: ProfileCommand::SetUsername { name } } => {
            let user = require_user(&session)?;
            let mut storage = storage.lock().await;
            let mut profile = storage
                .load_profile(&user)
                .await?
                .unwrap_or_else(|| UserProfile::new(user.clone()));
            profile.set_username(&name);
            storage.upsert_profile(&profile).await?;
            println!("Profile name: {}", profile.display_name());
        }
    }

    Ok(())
}

fn session_for(user: Option<&str>) -> Result<Session> {
    match user.map(str::trim) {
        Some("") => anyhow::bail!("--user must not be empty"),
        Some(user) => Ok(Session::signed_in(UserId::new(user))),
        None => Ok(Session::anonymous()),
    }
}

fn require_user(session: &Session) -> Result<UserId> {
    session
        .user()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("This command needs --user"))
}

fn lesson_index(lesson: u32) -> Result<u32> {
    lesson
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Lessons are numbered from 1"))
}

fn print_scan(result: &ScanResult) {
    println!("Scan: {}", result.url);
    println!("  Country: {}", result.country_label);
    println!("  Page size: {:.0}KB ({:?})", result.page_bytes as f64 / 1024.0, result.page_size_source);
    println!("  CO₂ per view: {}g", result.co2_per_view_grams);
    println!("  CO₂ per year: {}kg (10k views)", result.co2_per_year_kg);
    println!("  Score: {:.2}", result.sustainability_score);
    println!(
        "  Breakdown: images {}%, css {}%, javascript {}%, other {}%",
        result.breakdown.images, result.breakdown.css, result.breakdown.javascript, result.breakdown.other,
    );
    if certificate_eligible(result.sustainability_score) {
        println!("  Eligible for the green website certificate");
    }
    println!("Recommendations");
    for (i, rec) in result.recommendations.iter().enumerate() {
        println!("  {}. {}", i + 1, rec);
    }
}

fn print_achievements(heading: &str, achievements: &[Achievement]) {
    let earned = achievements.iter().filter(|a| a.earned).count();
    println!("{} ({}/{})", heading, earned, achievements.len());
    for a in achievements {
        println!(
            "  [{}] {} {} - {}",
            if a.earned { "x" } else { " " },
            a.icon,
            a.title,
            a.description,
        );
    }
}

fn format_status(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::Unavailable => "SOON",
        ModuleStatus::Locked => "LOCKED",
        ModuleStatus::NotStarted => "NEW",
        ModuleStatus::InProgress => "ACTIVE",
        ModuleStatus::Completed => "DONE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nested_commands_with_global_user() {
        let cli = Cli::parse_from(["climacode", "lesson", "complete", "2", "3", "--user", "greta"]);
        assert_eq!(cli.user.as_deref(), Some("greta"));
        assert!(matches!(
            cli.command,
            Commands::Lesson { action: LessonCommand::Complete { module: 2, lesson: 3 } }
        ));

        let cli = Cli::parse_from(["climacode", "scan", "https://example.com", "--country", "Japan"]);
        assert!(cli.user.is_none());
        assert!(matches!(cli.command, Commands::Scan { json: false, .. }));
    }

    #[test]
    fn test_country_must_be_listed() {
        assert!(Cli::try_parse_from(["climacode", "scan", "https://example.com", "--country", "United Kingdom"]).is_ok());
        assert!(Cli::try_parse_from(["climacode", "scan", "https://example.com", "--country", "Atlantis"]).is_err());
    }

    #[test]
    fn test_numbering_is_one_based() {
        assert_eq!(lesson_index(1).unwrap(), 0);
        assert!(lesson_index(0).is_err());
        assert!(require_user(&Session::anonymous()).is_err());
    }

    #[test]
    fn test_blank_user_flag_rejected() {
        assert!(session_for(Some("  ")).is_err());
        assert!(!session_for(None).unwrap().is_authenticated());
        let session = session_for(Some(" greta ")).unwrap();
        assert_eq!(session.user().map(UserId::as_str), Some("greta"));
    }
}
