use clap::{Parser, Subcommand};
use lurescan_core::Domain;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lurescan")]
#[command(
    author,
    version,
    about = "Detect phishing links and scam messages"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "lurescan.yaml")]
    pub config: String,

    /// Models directory (overrides the configuration file)
    #[arg(short, long, global = true, env = "LURESCAN_MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Enable verbose logging (RUST_LOG takes precedence when set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train models and print the held-out evaluation
    Train {
        /// Domain to train: url, message or all
        #[arg(short, long, default_value = "all", value_parser = parse_target)]
        domain: Target,

        /// Labeled corpus (YAML or JSON) to train on instead of the built-in one
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Classify a link or a message
    Detect {
        /// What to check: url (link) or message (msg)
        #[arg(value_parser = parse_domain)]
        domain: Domain,

        /// The URL or message text
        text: String,

        /// Only print FAKE or LEGITIMATE
        #[arg(long)]
        simple: bool,

        /// Print the full result as JSON
        #[arg(long, conflicts_with = "simple")]
        json: bool,
    },

    /// Print the extracted feature vector as JSON
    Features {
        /// Feature schema to use: url or message
        #[arg(value_parser = parse_domain)]
        domain: Domain,

        /// The URL or message text
        text: String,
    },

    /// Delete persisted models
    Reset {
        /// Domain to reset: url, message or all
        #[arg(short, long, default_value = "all", value_parser = parse_target)]
        domain: Target,
    },
}

/// One domain or both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    One(Domain),
}

impl Target {
    pub fn domains(self) -> Vec<Domain> {
        match self {
            Self::All => Domain::ALL.to_vec(),
            Self::One(domain) => vec![domain],
        }
    }
}

fn parse_domain(s: &str) -> Result<Domain, String> {
    s.parse().map_err(|e: lurescan_core::Error| e.to_string())
}

fn parse_target(s: &str) -> Result<Target, String> {
    if s.trim().eq_ignore_ascii_case("all") {
        Ok(Target::All)
    } else {
        parse_domain(s).map(Target::One)
    }
}
