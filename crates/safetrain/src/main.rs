// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Safetrain - corporate safety-training progress and credentialing CLI.
//!
//! This is the binary entry point for the Safetrain portal tooling. It
//! operates directly on the portal database: inspecting a learner's
//! progress, printing the points leaderboard, listing issued certificates,
//! marking lessons complete, and seeding demo content.

use clap::{Parser, Subcommand};

mod certificates;
mod complete;
mod leaderboard;
mod progress;
mod seed;

/// Safetrain - safety-training progress and credentialing tooling.
#[derive(Parser, Debug)]
#[command(name = "safetrain", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show a learner's lesson and course progress.
    Progress {
        /// Learner user id.
        #[arg(long)]
        user: String,
        /// Course id to inspect.
        #[arg(long)]
        course: String,
    },
    /// Print the points leaderboard.
    Leaderboard {
        /// Maximum number of accounts to show.
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// List a learner's issued certificates.
    Certificates {
        /// Learner user id.
        #[arg(long)]
        user: String,
        /// Output structured JSON for scripting.
        #[arg(long)]
        json: bool,
    },
    /// Mark a lesson complete for a learner (administrative override).
    Complete {
        /// Learner user id.
        #[arg(long)]
        user: String,
        /// Lesson id to complete.
        #[arg(long)]
        lesson: String,
    },
    /// Seed a demo course, lessons, and learner profile.
    Seed,
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("safetrain={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match safetrain_config::load_and_validate() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("safetrain: {err}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.portal.log_level);

    let db = match safetrain_storage::Database::open(&config.storage.database_path).await {
        Ok(db) => std::sync::Arc::new(db),
        Err(err) => {
            eprintln!("safetrain: cannot open database: {err}");
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Progress { user, course } => progress::run(&db, &user, &course).await,
        Commands::Leaderboard { limit, json } => leaderboard::run(&db, limit, json).await,
        Commands::Certificates { user, json } => certificates::run(&db, &user, json).await,
        Commands::Complete { user, lesson } => {
            complete::run(db.clone(), &config, &user, &lesson).await
        }
        Commands::Seed => seed::run(&db).await,
    };

    if let Err(err) = result {
        eprintln!("safetrain: {err}");
        std::process::exit(1);
    }
    if let Err(err) = db.close().await {
        eprintln!("safetrain: close failed: {err}");
        std::process::exit(1);
    }
}
