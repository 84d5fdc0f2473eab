use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::config::{load_config, HintConfig};
use crate::hints::{EquationData, HintEscalationEngine, HintProvider, HintResponse};
use crate::providers::{BackendHintProvider, OllamaHintProvider, ResilientProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    /// The app's hint-generation endpoint
    Backend,
    /// A local model served by Ollama
    Ollama,
}

/// Work through one math problem, one hint at a time.
#[derive(Debug, Parser)]
#[command(name = "hintstep", version)]
pub struct Args {
    /// Problem statement
    pub problem: String,

    /// Template equation, e.g. "v = d / t"
    #[arg(long)]
    pub equation: Option<String>,

    /// Equation with the problem's values substituted
    #[arg(long, requires = "equation")]
    pub substituted: Option<String>,

    /// Comma-separated variable names
    #[arg(long, value_delimiter = ',', requires = "equation")]
    pub variables: Vec<String>,

    #[arg(long, value_enum, default_value_t = ProviderKind::Backend)]
    pub provider: ProviderKind,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print every level and exit instead of prompting
    #[arg(long)]
    pub all: bool,

    /// Emit JSON logs instead of plain stderr lines
    #[arg(long)]
    pub json_logs: bool,
}

impl Args {
    pub fn equation_data(&self) -> Option<EquationData> {
        self.equation.as_ref().map(|equation| EquationData {
            equation: equation.clone(),
            substituted_equation: self.substituted.clone().unwrap_or_default(),
            variables: self.variables.iter().map(|v| v.trim().to_string()).collect(),
        })
    }
}

fn build_provider(kind: ProviderKind, config: &HintConfig) -> Result<Box<dyn HintProvider>> {
    let provider: Box<dyn HintProvider> = match kind {
        ProviderKind::Backend => Box::new(ResilientProvider::new(BackendHintProvider::new(config)?, config)),
        ProviderKind::Ollama => Box::new(ResilientProvider::new(OllamaHintProvider::new(config)?, config)),
    };
    Ok(provider)
}

fn print_hint(hint: &HintResponse) {
    println!("\nHint {} of 3:\n{}\n", hint.level, hint.hint);
}

fn print_prompt<P: HintProvider>(engine: &HintEscalationEngine<P>) {
    if engine.has_more_hints() {
        println!("[Enter] hint {}  [r] start over  [q] quit", engine.current_level());
    } else {
        println!("All hints shown.  [r] start over  [q] quit");
    }
}

pub async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let provider = build_provider(args.provider, &config)?;
    let engine = HintEscalationEngine::new(provider, args.problem.clone(), args.equation_data())?;

    if args.all {
        while let Some(hint) = engine.next_hint().await? {
            print_hint(&hint);
        }
        return Ok(());
    }

    print_prompt(&engine);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" | "quit" => break,
            "r" | "reset" => {
                engine.reset();
                println!("Starting over from hint 1.");
            }
            _ => match engine.next_hint().await {
                Ok(Some(hint)) => print_hint(&hint),
                Ok(None) => println!("No more hints. The last step is yours!"),
                Err(e) if e.is_retryable() => {
                    eprintln!("Couldn't get a hint: {}. Press Enter to try again.", e.message);
                }
                Err(e) => return Err(e.into()),
            },
        }
        print_prompt(&engine);
    }

    tracing::info!(metrics = ?engine.metrics().snapshot(), "Hint session finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_equation_flags() {
        let args = Args::try_parse_from([
            "hintstep",
            "A car travels 120 km in 2 hours.",
            "--equation",
            "v = d / t",
            "--substituted",
            "v = 120 / 2",
            "--variables",
            "v, d,t",
            "--provider",
            "ollama",
        ])
        .unwrap();

        assert_eq!(args.provider, ProviderKind::Ollama);
        let eq = args.equation_data().unwrap();
        assert_eq!(eq.substituted_equation, "v = 120 / 2");
        assert_eq!(eq.variables, vec!["v", "d", "t"]);
    }

    #[test]
    fn test_equation_is_optional() {
        let args = Args::try_parse_from(["hintstep", "What is 3 + 4?", "--all"]).unwrap();
        assert!(args.all);
        assert_eq!(args.provider, ProviderKind::Backend);
        assert!(args.equation_data().is_none());
    }

    #[test]
    fn test_substituted_requires_equation() {
        assert!(Args::try_parse_from(["hintstep", "What is 3 + 4?", "--substituted", "3 + 4"]).is_err());
    }
}
