//! Shared types for the dailydo application.
//!
//! This module contains the Result alias and the command definitions used by
//! the command-line front-end.
use std::path::PathBuf;

use clap::Subcommand;

use crate::TodoError;

/// A specialized Result type for dailydo operations.
pub type Result<T> = std::result::Result<T, TodoError>;

/// Available subcommands for the dailydo application
#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Text of the task
        text: String,
    },

    /// Mark a task as done, or move a done task back to active
    Done {
        /// ID of the task to toggle
        id: i64,
    },

    /// Delete a task by ID
    Delete {
        /// ID of the task to delete
        id: i64,

        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },

    /// List tasks
    List {
        /// Which tab to show
        #[clap(short, long, value_parser = ["active", "done", "all"], default_value = "active")]
        tab: String,

        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },

    /// Routine operations (add, check, delete, list)
    Routine {
        #[clap(subcommand)]
        command: RoutineCommands,
    },

    /// Uncheck all routines if today's reset has not happened yet
    Reset {
        /// Reset now, ignoring the cutoff hour and the last reset date
        #[clap(short, long)]
        force: bool,
    },

    /// Keep running and reset routines once a day after the cutoff hour
    Watch,

    /// Export a snapshot of all tasks and routines
    Export {
        /// Path where the exported file will be saved
        #[clap(short, long)]
        output: PathBuf,

        /// Format to export to
        #[clap(short, long, value_parser = ["html", "json"], default_value = "html")]
        format: String,
    },

    /// Configuration management
    Config {
        /// Show current configuration
        #[clap(short = 'S', long)]
        show: bool,

        /// Update a configuration setting (key=value)
        #[clap(short, long)]
        set: Option<String>,

        /// Reset configuration to defaults
        #[clap(short, long)]
        reset: bool,
    },

    /// Remove every stored task, routine and reset marker
    Clear {
        /// Skip confirmation prompt
        #[clap(short, long)]
        force: bool,
    },
}

/// Routine subcommands
#[derive(Subcommand)]
pub enum RoutineCommands {
    /// Add a new routine
    Add {
        /// Text of the routine
        text: String,
    },

    /// Check or uncheck a routine
    Check {
        /// ID of the routine to toggle
        id: i64,
    },

    /// Delete a routine by ID
    Delete {
        /// ID of the routine to delete
        id: i64,
    },

    /// List routines
    List {
        /// Format output as JSON
        #[clap(short, long)]
        json: bool,
    },
}
