use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use countdown_core::model::ProjectDraft;
use services::{AppServices, CelebrationService, Clock, ProjectUpdate};

mod config;
mod observability;
mod render;

const DENIED_WARNING: &str = "Persistent storage is not available. Progress may be lost.";

/// countdown - track a reading goal against its deadline
#[derive(Parser)]
#[command(name = "countdown")]
#[command(about = "Reading goal countdown tracker", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    /// SQLite database URL or path (overrides config file)
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new reading goal
    Setup {
        /// Total pages to read
        #[arg(long, allow_negative_numbers = true)]
        pages: i64,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Deadline, YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
    /// Show stats, pages and chart
    Status {
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a page read today (defaults to the next page)
    Complete { page: Option<u32> },
    /// Undo the most recent page
    Undo { page: u32 },
    /// Lock in every page read so far
    Lock {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Change the total page count
    Goal {
        #[arg(allow_negative_numbers = true)]
        pages: i64,
    },
    /// Delete the project and all progress
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    observability::init_logging(&config.log_level)?;

    let db_url = normalize_sqlite_url(cli.db.unwrap_or(config.database.url));
    prepare_sqlite_file(&db_url)?;
    tracing::debug!(%db_url, "opening database");

    let services = AppServices::new_sqlite(
        &db_url,
        Clock::default_clock(),
        CelebrationService::new(config.celebration.heart_chance),
        |manager| manager.with_on_denied(|| eprintln!("{DENIED_WARNING}")),
    )
    .await
    .with_context(|| format!("failed to open {db_url}"))?;
    services.persistence().check_persisted().await;

    match cli.command {
        Commands::Setup { pages, start, end } => setup_command(&services, pages, start, end).await,
        Commands::Status { json } => status_command(&services, json).await,
        Commands::Complete { page } => complete_command(&services, page).await,
        Commands::Undo { page } => undo_command(&services, page).await,
        Commands::Lock { yes } => lock_command(&services, yes).await,
        Commands::Goal { pages } => goal_command(&services, pages).await,
        Commands::Reset { yes } => reset_command(&services, yes).await,
    }
}

async fn setup_command(services: &AppServices, pages: i64, start: String, end: String) -> Result<()> {
    let project = services
        .projects()
        .setup(ProjectDraft::new(pages, start, end))
        .await?;
    println!(
        "Reading {} pages from {} to {}.",
        project.total_pages(),
        project.start_date(),
        project.end_date()
    );
    services.persistence().request_persistence_once().await;
    Ok(())
}

async fn status_command(services: &AppServices, json: bool) -> Result<()> {
    let Some(view) = services.projects().dashboard().await? else {
        println!("No project yet. Run `countdown setup` to start one.");
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::dashboard(&view));
    }
    Ok(())
}

async fn complete_command(services: &AppServices, page: Option<u32>) -> Result<()> {
    let projects = services.projects();
    let update = match page {
        Some(page) => projects.complete_page(page).await?,
        None => projects.complete_next().await?,
    };

    if !update.applied {
        match update.project.next_page() {
            Some(next) => bail!("page {next} is the next page to complete"),
            None => bail!("every page is already complete"),
        }
    }

    let done = update.project.completed_pages().len();
    println!("Page {done} done.");
    println!("{}", render::confetti(&services.celebration().burst()));
    if update.project.is_goal_met() {
        println!("Goal reached!");
    }
    services.persistence().request_persistence_once().await;
    Ok(())
}

async fn undo_command(services: &AppServices, page: u32) -> Result<()> {
    let update = services.projects().undo_page(page).await?;
    if !update.applied {
        bail!("page {page} cannot be undone");
    }
    println!("Page {page} undone.");
    Ok(())
}

async fn lock_command(services: &AppServices, yes: bool) -> Result<()> {
    let projects = services.projects();
    let Some(frontier) = projects.lock_in_candidate().await? else {
        println!("Nothing new to lock in.");
        return Ok(());
    };

    let prompt = format!("Lock in pages 1 through {frontier}? This cannot be undone.");
    if !yes && !confirm(&prompt)? {
        println!("Lock in cancelled.");
        return Ok(());
    }

    report(projects.confirm_lock_in(frontier).await?, || {
        format!("Pages 1 through {frontier} are locked in.")
    });
    Ok(())
}

async fn goal_command(services: &AppServices, pages: i64) -> Result<()> {
    let update = services.projects().change_goal(pages).await?;
    let total = update.project.total_pages();
    if !update.applied {
        println!("Goal is already {total} pages.");
        return Ok(());
    }
    println!(
        "Goal is now {total} pages, {} complete.",
        update.project.completions().len()
    );
    Ok(())
}

async fn reset_command(services: &AppServices, yes: bool) -> Result<()> {
    if !yes && !confirm("Reset this project? This clears all progress.")? {
        println!("Reset cancelled.");
        return Ok(());
    }
    services.projects().reset().await?;
    println!("Project reset.");
    Ok(())
}

fn report(update: ProjectUpdate, message: impl FnOnce() -> String) {
    if update.applied {
        println!("{}", message());
    } else {
        println!("Nothing changed.");
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt} [y/N] ")?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<()> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite://") else {
        bail!("invalid database url: {db_url}");
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        bail!("invalid database url: {db_url}");
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn complete_defaults_to_the_next_page() {
        let cli = Cli::try_parse_from(["countdown", "complete"]).unwrap();
        assert!(matches!(cli.command, Commands::Complete { page: None }));

        let cli = Cli::try_parse_from(["countdown", "--db", "x.db", "undo", "4"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        assert!(matches!(cli.command, Commands::Undo { page: 4 }));
    }

    #[test]
    fn negative_goals_reach_validation() {
        let cli = Cli::try_parse_from(["countdown", "goal", "-3"]).unwrap();
        assert!(matches!(cli.command, Commands::Goal { pages: -3 }));
    }

    #[test]
    fn relative_paths_become_sqlite_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/a.db".into()),
            "sqlite:///tmp/a.db"
        );
        assert_eq!(normalize_sqlite_url("/tmp/b.db".into()), "sqlite:///tmp/b.db");
        assert!(normalize_sqlite_url("sqlite:c.db".into()).ends_with("/c.db"));
    }

    #[test]
    fn rejects_unknown_url_schemes() {
        assert!(prepare_sqlite_file("postgres://host/db").is_err());
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
    }
}
