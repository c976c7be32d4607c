//! Command-line interface built on clap.
//!
//! Defines [`Cli`] with the [`Command`] subcommands and the global flags
//! (`--config`, `--store`, `--verbose`).

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::workflow::Viewer;

/// Offboarding workflow tracker.
#[derive(Debug, Parser)]
#[command(name = "offboard", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file (defaults to ./offboard.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Ticket store directory, overriding the configured one.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open a new offboarding ticket.
    Create {
        /// Name of the departing employee.
        #[arg(long)]
        employee: String,

        /// Name of the employee's manager.
        #[arg(long)]
        manager: String,

        /// External reference id (e.g. the service desk ticket).
        #[arg(long = "ref")]
        external_ref: String,

        /// Role being vacated.
        #[arg(long, default_value = "P-Card Holder")]
        role: String,

        /// Due date, YYYY-MM-DD.
        #[arg(long)]
        due: NaiveDate,

        /// TOML step template to use instead of the configured one.
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// List all tickets.
    List,

    /// Show a ticket's steps and activity as seen by a role.
    Show {
        /// Ticket id or unique prefix.
        ticket: String,

        /// Viewer role: Admin or a department (OSI, ABC, GFS, Manager, NewHolder, MD).
        #[arg(long = "as", default_value = "Admin")]
        viewer: Viewer,
    },

    /// Save an input value on the current step without completing it.
    Input {
        ticket: String,
        step: String,
        value: String,
    },

    /// Complete the current step.
    Complete {
        ticket: String,
        step: String,

        /// Acting role.
        #[arg(long = "as")]
        viewer: Viewer,

        /// Input value for steps that require one.
        #[arg(long)]
        input: Option<String>,

        /// Recipient of the email sent for this step.
        #[arg(long)]
        to: Option<String>,

        /// CC recipients of the email.
        #[arg(long, default_value = "")]
        cc: String,

        /// File holding the email text (a leading "Subject:" line is honoured).
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Open the email in the default mail client before completing.
        #[arg(long, default_value_t = false)]
        open: bool,
    },

    /// Skip the current step (admin override).
    Skip {
        ticket: String,
        step: String,

        /// Why the step is being skipped.
        #[arg(long)]
        reason: String,
    },

    /// Archive a ticket.
    Archive { ticket: String },

    /// Generate an email draft for the current step.
    Draft {
        ticket: String,

        /// Recipient to pre-fill in the mailto link.
        #[arg(long, default_value = "")]
        to: String,

        /// CC recipients to pre-fill in the mailto link.
        #[arg(long, default_value = "")]
        cc: String,

        /// Write the draft to this file for editing before `complete --body-file`.
        #[arg(long)]
        save: Option<PathBuf>,

        /// Open the draft in the default mail client.
        #[arg(long, default_value_t = false)]
        open: bool,
    },
}
