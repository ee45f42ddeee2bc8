//! # Pathwise CLI Module
//!
//! Drives the playlist engine from the shell. Each invocation loads the
//! course manifest, restores the learner's session from the database, runs
//! one command and saves the result.
//!
//! ## Available Commands
//!
//! - `init` - Start a session for an enrollment
//! - `next` - Show the next decision without applying it
//! - `step` - Resolve and apply the next decision
//! - `gate` - Record a gate attempt
//! - `mastery` - Record mastery of a knowledge node
//! - `goto` - Jump to a playlist entry
//! - `show` - Show the playlist
//! - `status` - Show session status
//! - `export` - Export the session as JSON
//! - `import` - Import a session from JSON
//! - `reset` - Rebuild the playlist, keeping history

mod commands;

use clap::{Parser, Subcommand};
use pathwise_core::{EnrollmentId, PathwiseError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Pathwise - adaptive learning playlists
///
/// Sequences a course module for one learner: gates, retries, mastery-based
/// skipping and remediation.
#[derive(Parser, Debug)]
#[command(name = "pathwise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the session database
    #[arg(
        short = 'D',
        long,
        global = true,
        env = "PATHWISE_DB",
        default_value = "pathwise.redb"
    )]
    pub database: PathBuf,

    /// Path to the course manifest (TOML)
    #[arg(
        short = 'm',
        long,
        global = true,
        env = "PATHWISE_MANIFEST",
        default_value = "course.toml"
    )]
    pub manifest: PathBuf,

    /// Enrollment the session belongs to
    #[arg(
        short = 'e',
        long,
        global = true,
        env = "PATHWISE_ENROLLMENT",
        default_value = "default"
    )]
    pub enrollment: String,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start a new session
    Init {
        /// Replace an existing session
        #[arg(short, long)]
        force: bool,
    },

    /// Show the next decision without applying it
    Next,

    /// Resolve and apply the next decision
    Step,

    /// Record a gate attempt
    Gate {
        /// Score of the attempt (0.0 - 1.0)
        #[arg(short, long)]
        score: f64,

        /// Gate unit id (defaults to the current entry)
        #[arg(short, long)]
        unit: Option<String>,

        /// Override pass/fail (defaults to score >= the gate's mastery threshold)
        #[arg(long)]
        passed: Option<bool>,

        /// Failed node ids (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        failed: Vec<String>,

        /// Attempt number (defaults to the number of recorded attempts + 1)
        #[arg(short, long)]
        attempt: Option<u32>,
    },

    /// Record mastery of a knowledge node
    Mastery {
        /// Node id
        node: String,

        /// Mastery (0.0 - 1.0, clamped)
        mastery: f64,

        /// Number of attempts behind this estimate
        #[arg(short, long, default_value = "1")]
        attempts: u32,
    },

    /// Jump to a playlist entry
    Goto {
        /// Playlist index (0-based)
        index: usize,
    },

    /// Show the playlist
    Show,

    /// Show session status
    Status,

    /// Export the session as JSON
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a session from JSON
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Rebuild the playlist from the manifest, keeping mastery and gate history
    Reset,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), PathwiseError> {
    let ctx = CommandContext {
        database: cli.database,
        manifest: cli.manifest,
        enrollment: EnrollmentId::new(cli.enrollment),
        json_mode: cli.json_mode,
    };

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Next) => cmd_next(&ctx),
        Some(Commands::Step) => cmd_step(&ctx),
        Some(Commands::Gate {
            score,
            unit,
            passed,
            failed,
            attempt,
        }) => cmd_gate(
            &ctx,
            &GateArgs {
                score,
                unit,
                passed,
                failed,
                attempt,
            },
        ),
        Some(Commands::Mastery {
            node,
            mastery,
            attempts,
        }) => cmd_mastery(&ctx, &node, mastery, attempts),
        Some(Commands::Goto { index }) => cmd_goto(&ctx, index),
        Some(Commands::Show) => cmd_show(&ctx),
        Some(Commands::Export { output }) => cmd_export(&ctx, &output),
        Some(Commands::Import { input }) => cmd_import(&ctx, &input),
        Some(Commands::Reset) => cmd_reset(&ctx),
        Some(Commands::Status) | None => {
            // No subcommand - show status by default
            cmd_status(&ctx)
        }
    }
}
