//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "motofix")]
#[command(about = "Motofix - roadside assistance from your terminal")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "MOTOFIX_CONFIG")]
    pub config_file: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a one-time sign-in code to a phone number
    Otp {
        /// Phone number, e.g. +256700000000 or 0700000000
        phone: String,
    },

    /// Sign in with a one-time code
    Login {
        phone: String,
        code: String,
        /// Name to register with on first sign-in
        #[arg(long)]
        name: Option<String>,
    },

    /// Show the cached session and confirm it with the server
    Whoami {
        /// Only show the cached session, do not contact the server
        #[arg(long)]
        offline: bool,
    },

    /// Sign out and forget the cached session
    Logout,

    /// Breakdown requests
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },

    /// Look up the address of a position
    Geocode {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,
        #[arg(allow_negative_numbers = true)]
        longitude: f64,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RequestAction {
    /// Report a breakdown
    New {
        /// Your name
        #[arg(long)]
        name: String,
        /// Contact phone number (defaults to the signed-in user's)
        #[arg(long)]
        phone: Option<String>,
        /// Where you are; looked up from --lat/--lon when omitted
        #[arg(long)]
        location: Option<String>,
        /// What is wrong
        #[arg(long)]
        issue: String,
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
        /// Voice note to attach
        #[arg(long)]
        voice: Option<PathBuf>,
        /// Photo to attach (repeatable)
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
        /// Other file to attach (repeatable)
        #[arg(long = "file")]
        files: Vec<PathBuf>,
    },

    /// List your requests
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Change the status of a request
    Status { id: String, status: String },

    /// Get the number to call about a request
    Call { id: String },

    /// Poll a request until it is completed or cancelled
    Watch {
        id: String,
        /// Seconds between checks
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Where to write it
        #[arg(long, default_value = motofix_core::config::DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
