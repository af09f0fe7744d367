use clap::Parser;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Integration-test harness for the CinéBase actors and movies API
#[derive(Parser, Debug)]
#[command(name = "cinebase-check")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "Use RUST_LOG to control diagnostic logging, e.g. RUST_LOG=cinebase_check=debug."
)]
pub struct Cli {
    /// Base URL of the API, e.g. https://host/api
    #[arg(long, env = "CINEBASE_API_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CINEBASE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Only run the given phase (repeatable)
    #[arg(long = "phase", value_name = "PHASE")]
    pub phases: Vec<Phase>,

    /// Image to upload in the uploads phase (defaults to a built-in 1x1 PNG)
    #[arg(long, value_name = "PATH")]
    pub photo: Option<PathBuf>,

    /// Update and delete the created records after the run
    #[arg(long)]
    pub cleanup: bool,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Increase diagnostic logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Default `RUST_LOG` filter for the requested verbosity
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "cinebase_check=warn",
            1 => "cinebase_check=info",
            2 => "cinebase_check=debug",
            _ => "cinebase_check=trace",
        }
    }
}

/// A group of scenarios run together
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Actors,
    Movies,
    Search,
    Suggestions,
    Uploads,
    Cleanup,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Actors,
        Phase::Movies,
        Phase::Search,
        Phase::Suggestions,
        Phase::Uploads,
        Phase::Cleanup,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Phase::Actors => "ACTOR CRUD OPERATIONS",
            Phase::Movies => "MOVIE CRUD OPERATIONS",
            Phase::Search => "SEARCH AND UTILITY OPERATIONS",
            Phase::Suggestions => "DAILY SUGGESTIONS TESTING",
            Phase::Uploads => "FILE UPLOAD OPERATIONS",
            Phase::Cleanup => "UPDATE AND CLEANUP OPERATIONS",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Actors => write!(f, "actors"),
            Phase::Movies => write!(f, "movies"),
            Phase::Search => write!(f, "search"),
            Phase::Suggestions => write!(f, "suggestions"),
            Phase::Uploads => write!(f, "uploads"),
            Phase::Cleanup => write!(f, "cleanup"),
        }
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "actors" | "actor" => Ok(Phase::Actors),
            "movies" | "movie" => Ok(Phase::Movies),
            "search" | "utility" => Ok(Phase::Search),
            "suggestions" | "suggestion" => Ok(Phase::Suggestions),
            "uploads" | "upload" | "photos" => Ok(Phase::Uploads),
            "cleanup" => Ok(Phase::Cleanup),
            _ => Err(format!(
                "Unknown phase '{}'. Supported: actors, movies, search, suggestions, uploads, cleanup",
                s
            )),
        }
    }
}
