/// Configuration management for the chat server.
/// Handles command-line argument parsing and config structure.
use crate::chat_view::ChatSettings;
use crate::latency::Latency;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "Friend Chat Server")]
#[command(about = "Demo friend list and two-party chat backend", long_about = None)]
pub struct Config {
    /// Server port (default: 4000)
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// SQLite file holding the current-user session slot (default: session.db)
    #[arg(long, default_value = "session.db")]
    pub session_db: PathBuf,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,

    /// Answer store calls without the simulated network delay
    #[arg(long)]
    pub no_latency: bool,

    /// Delay before the simulated friend replies, in milliseconds
    #[arg(long, default_value = "2000")]
    pub reply_delay_ms: u64,

    /// Interval between chat view refreshes, in milliseconds
    #[arg(long, default_value = "3000")]
    pub poll_interval_ms: u64,

    /// Disable the simulated friend replies
    #[arg(long)]
    pub no_auto_reply: bool,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn latency(&self) -> Latency {
        if self.no_latency {
            Latency::disabled()
        } else {
            Latency::enabled()
        }
    }

    pub fn chat_settings(&self) -> ChatSettings {
        ChatSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            reply_delay: Duration::from_millis(self.reply_delay_ms),
            auto_reply: !self.no_auto_reply,
        }
    }
}
