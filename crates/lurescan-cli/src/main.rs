//! LureScan command-line detector
//!
//! Trains the URL and message models, classifies single inputs and inspects
//! extracted features.

use anyhow::{bail, Context, Result};
use clap::Parser;
use lurescan_classifiers::{Detector, DetectorConfig, LabeledCorpus};
use lurescan_core::{DetectionResult, Domain};
use std::path::Path;
use tracing::{debug, info};

mod cli;

use cli::{Cli, Commands, Target};

const RULE: &str = "======================================================================";

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    debug!(models_dir = %config.models_dir.display(), "Configuration loaded");
    let detector = Detector::new(config)?;

    match cli.command {
        Commands::Train { domain, data } => train(&detector, domain, data.as_deref()),
        Commands::Detect {
            domain,
            text,
            simple,
            json,
        } => detect(&detector, domain, &text, simple, json),
        Commands::Features { domain, text } => {
            let features = detector.extract_features(domain, &text);
            println!("{}", serde_json::to_string_pretty(&features)?);
            Ok(())
        }
        Commands::Reset { domain } => {
            for domain in domain.domains() {
                if detector.reset(domain)? {
                    println!("Removed {} model", domain);
                } else {
                    println!("No {} model to remove", domain);
                }
            }
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let directives = log_directives(std::env::var(EnvFilter::DEFAULT_ENV).ok(), verbose);
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new(log_directives(None, verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// `RUST_LOG` when set, otherwise the level picked by `--verbose`
fn log_directives(rust_log: Option<String>, verbose: bool) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => "lurescan=debug,lurescan_classifiers=debug".to_string(),
        _ => "lurescan=info,lurescan_classifiers=info".to_string(),
    }
}

/// Load configuration from file and CLI overrides
fn load_config(cli: &Cli) -> Result<DetectorConfig> {
    // Try to load from file, or use defaults
    let mut config = if Path::new(&cli.config).exists() {
        DetectorConfig::from_file(&cli.config)
            .with_context(|| format!("Failed to load configuration from {}", cli.config))?
    } else {
        DetectorConfig::default()
    };

    if let Some(dir) = &cli.models_dir {
        config.models_dir = dir.clone();
    }

    Ok(config)
}

fn train(detector: &Detector, target: Target, data: Option<&Path>) -> Result<()> {
    let external = match (data, target) {
        (Some(_), Target::All) => bail!("--data needs a single --domain (url or message)"),
        (Some(path), Target::One(_)) => Some(
            LabeledCorpus::from_file(path)
                .with_context(|| format!("Failed to load corpus from {}", path.display()))?,
        ),
        (None, _) => None,
    };

    for domain in target.domains() {
        let corpus = external
            .clone()
            .unwrap_or_else(|| LabeledCorpus::builtin(domain));

        println!("{}", RULE);
        println!("Training {} model...", domain);
        println!("{}", RULE);
        println!("Total {} samples: {}", domain, corpus.len());
        println!(
            "Legitimate: {}, Fake: {}",
            corpus.count(lurescan_core::Label::Legitimate),
            corpus.count(lurescan_core::Label::Fake)
        );

        let report = detector.train_corpus(domain, &corpus)?;
        println!("\n{} Model Accuracy: {:.4}", title(domain), report.accuracy);
        println!("\nClassification Report:");
        println!("{}", report.report);
        info!(domain = %domain, unit_id = %report.unit_id, "Model saved");
    }

    println!("{}", RULE);
    println!("Training Complete!");
    println!("{}", RULE);
    println!(
        "\nModels have been saved to {}",
        detector.config().models_dir.display()
    );
    Ok(())
}

fn detect(detector: &Detector, domain: Domain, text: &str, simple: bool, json: bool) -> Result<()> {
    let result = detector.detect(domain, text);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if simple {
        println!("{}", result.label.display_name());
    } else {
        print_detailed(domain, &result);
    }
    Ok(())
}

fn print_detailed(domain: Domain, result: &DetectionResult) {
    let (heading, field) = match domain {
        Domain::Url => ("URL DETECTION RESULT", "URL"),
        Domain::Message => ("MESSAGE DETECTION RESULT", "Message"),
    };

    println!("{}", RULE);
    println!("{}", heading);
    println!("{}", RULE);
    println!("{}: {}", field, result.input);
    println!("\nStatus: [{}]", result.label.display_name());
    println!("Confidence: {:.1}%", result.confidence * 100.0);
    println!("\nReasons:");
    for (i, reason) in result.reasons.iter().enumerate() {
        println!("  {}. {}", i + 1, reason);
    }
    println!("{}", RULE);
}

fn title(domain: Domain) -> &'static str {
    match domain {
        Domain::Url => "URL",
        Domain::Message => "Message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins_over_verbose() {
        assert_eq!(
            log_directives(Some("lurescan=warn".to_string()), true),
            "lurescan=warn"
        );
        assert_eq!(
            log_directives(Some("trace".to_string()), false),
            "trace"
        );
    }

    #[test]
    fn test_verbose_picks_default_level() {
        assert_eq!(
            log_directives(None, true),
            "lurescan=debug,lurescan_classifiers=debug"
        );
        assert_eq!(
            log_directives(None, false),
            "lurescan=info,lurescan_classifiers=info"
        );
        assert_eq!(
            log_directives(Some("  ".to_string()), true),
            "lurescan=debug,lurescan_classifiers=debug"
        );
    }
}
