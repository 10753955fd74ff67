//! CLI interface for padmap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// MIDI control mapping for pad instruments
#[derive(Parser)]
#[command(name = "padmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "padmap.yaml")]
        config: PathBuf,
    },

    /// List conflicting MIDI assignments between active profiles
    Conflicts {
        /// Configuration file path
        #[arg(short, long, default_value = "padmap.yaml")]
        config: PathBuf,
    },

    /// Run one MIDI message through the configured profiles
    Simulate {
        /// Configuration file path
        #[arg(short, long, default_value = "padmap.yaml")]
        config: PathBuf,

        /// Message type (cc, note_on, pitch_bend, ...)
        message_type: String,

        /// MIDI channel (0-15)
        channel: u8,

        /// First data byte (controller, note, or pitch bend LSB)
        #[arg(default_value = "0")]
        data1: u8,

        /// Second data byte (value, velocity, or pitch bend MSB)
        #[arg(default_value = "0")]
        data2: u8,

        /// Print the resulting changes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the response of a curve across the 7-bit range
    Curve {
        /// Curve name (linear, exponential, logarithmic, s_curve)
        name: String,

        /// Lower parameter bound
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        min: f64,

        /// Upper parameter bound
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        max: f64,

        /// Quantize the output to this many levels
        #[arg(short, long)]
        steps: Option<usize>,

        /// Rows to print
        #[arg(short, long, default_value = "9")]
        rows: usize,
    },

    /// Generate an example configuration file
    Init,
}
