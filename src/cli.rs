//! CLI interface for Sentra.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::{ConfigOverrides, DevicePreference, PredictorConfig};
use crate::labels::Sentiment;
use crate::predictor::HybridPredictor;

/// Sentra - hybrid sentiment classification for free-text passages
#[derive(Parser)]
#[command(name = "sentra", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding config.json, tokenizer.json and model.safetensors
    #[arg(long, env = "SENTRA_MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    /// Lexical margin-classifier artifact (JSON)
    #[arg(long, env = "SENTRA_CLASSIFIER_PATH", global = true)]
    pub classifier: Option<PathBuf>,

    /// Lexical TF-IDF vectorizer artifact (JSON)
    #[arg(long, env = "SENTRA_VECTORIZER_PATH", global = true)]
    pub vectorizer: Option<PathBuf>,

    /// Inference batch size
    #[arg(long, env = "SENTRA_BATCH_SIZE", global = true)]
    pub batch_size: Option<usize>,

    /// Maximum token length per passage
    #[arg(long, env = "SENTRA_MAX_LENGTH", global = true)]
    pub max_length: Option<usize>,

    /// Compute device: auto or cpu
    #[arg(long, env = "SENTRA_DEVICE", global = true)]
    pub device: Option<DevicePreference>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a single passage
    Predict {
        /// The text to classify
        text: String,
    },

    /// Classify one passage per line from a file, or stdin when omitted
    Batch {
        /// Input file (defaults to stdin)
        file: Option<PathBuf>,
    },

    /// Read passages interactively; 'exit' or 'quit' ends the session
    Interactive,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            model_dir: self.model_dir.clone(),
            classifier_path: self.classifier.clone(),
            vectorizer_path: self.vectorizer.clone(),
            batch_size: self.batch_size,
            max_length: self.max_length,
            device: self.device,
        }
    }
}

/// Execute a CLI command against a freshly constructed predictor.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = PredictorConfig::resolve(cli.overrides());
    let predictor = HybridPredictor::new(config)?;

    match &cli.command {
        Commands::Predict { text } => {
            let label = predictor.predict_one(text)?;
            print_labels(std::slice::from_ref(text), &[label], cli.json)?;
        }
        Commands::Batch { file } => {
            let input = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let texts: Vec<String> = input.lines().map(|l| l.to_string()).collect();
            let labels = predictor.predict_batch(&texts)?;
            print_labels(&texts, &labels, cli.json)?;
        }
        Commands::Interactive => interactive_loop(&predictor)?,
    }

    Ok(())
}

fn print_labels(texts: &[String], labels: &[Sentiment], json: bool) -> anyhow::Result<()> {
    if json {
        let entries: Vec<serde_json::Value> = texts
            .iter()
            .zip(labels)
            .map(|(text, label)| serde_json::json!({ "text": text, "label": label }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for label in labels {
            println!("{}", render_label(*label));
        }
    }
    Ok(())
}

fn render_label(label: Sentiment) -> colored::ColoredString {
    match label {
        Sentiment::Positive => label.as_str().green(),
        Sentiment::Negative => label.as_str().red(),
        Sentiment::Neutral => label.as_str().yellow(),
    }
}

fn interactive_loop(predictor: &HybridPredictor) -> anyhow::Result<()> {
    println!("Enter a passage (type 'exit' to quit):");
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        if trimmed.is_empty() {
            println!("Please enter some text to analyze.");
            continue;
        }

        let label = predictor.predict_one(trimmed)?;
        println!("{}", render_label(label));
    }

    Ok(())
}
