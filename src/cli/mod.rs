//! Command-line interface for nbrun.
//!
//! Provides commands for running the notebook, previewing the cached
//! dataset on its own, and inspecting the resolved configuration.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::ResolvedConfig;
use crate::core::{Orchestrator, RunError};

/// nbrun - run the project notebook and preview its cached dataset
#[derive(Parser, Debug)]
#[command(name = "nbrun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the notebook, then preview the cached dataset (default)
    Run {
        /// Keep the executed notebook at this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview the cached dataset without executing the notebook
    Preview {
        /// Number of leading elements to show
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Show resolved configuration (debug)
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = ResolvedConfig::load()?;

        match self.command.unwrap_or(Commands::Run { output: None }) {
            Commands::Run { output } => run_notebook(&config, output).await,
            Commands::Preview { rows } => preview_artifact(config, rows),
            Commands::Config { json } => show_config(&config, json),
        }
    }
}

/// Execute the notebook and print the preview
async fn run_notebook(config: &ResolvedConfig, output: Option<PathBuf>) -> Result<()> {
    let mut orchestrator = Orchestrator::from_config(config);
    if let Some(path) = output {
        orchestrator = orchestrator.with_output(path);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let run = match orchestrator.run(&mut out).await {
        Ok(run) => run,
        Err(e) => {
            if let RunError::NotebookExecution { ref run, .. } = e {
                eprintln!("\n[Run {} state: {:?}]", run.id, run.state);
            }
            return Err(e)
                .with_context(|| format!("Run of {} failed", config.notebook.display()));
        }
    };
    out.flush().context("Failed to flush stdout")?;

    if run.artifact_found {
        eprintln!(
            "\n[Run {} completed: previewed {} rows]",
            run.id, run.previewed_rows
        );
    } else {
        eprintln!("\n[Run {} completed: no cached dataset]", run.id);
    }

    Ok(())
}

/// Print the preview of the cached dataset, if any
fn preview_artifact(mut config: ResolvedConfig, rows: Option<usize>) -> Result<()> {
    if let Some(rows) = rows {
        config.preview.rows = rows;
    }

    let orchestrator = Orchestrator::from_config(&config);
    match orchestrator.preview_artifact()? {
        Some(preview) => {
            println!("{}", preview.rendered);
            eprintln!(
                "\n[Showing {} of {} elements from {}]",
                preview.shown,
                preview.total,
                orchestrator.store().artifact_path(&config.artifact).display()
            );
        }
        None => {
            eprintln!(
                "No cached dataset at {}",
                orchestrator.store().artifact_path(&config.artifact).display()
            );
        }
    }

    Ok(())
}

/// Show resolved configuration
fn show_config(config: &ResolvedConfig, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Project root: {}", config.root.display());
    match &config.config_file {
        Some(path) => println!("Config file:  {}", path.display()),
        None => println!("Config file:  (none, using defaults)"),
    }
    println!("Notebook:     {}", config.notebook.display());
    println!("Results:      {}", config.results_dir.display());
    println!("Artifact:     {}", config.artifact);
    println!("Engine:       {}", config.engine.binary);
    if let Some(ref kernel) = config.engine.kernel {
        println!("Kernel:       {}", kernel);
    }
    match config.engine.timeout_seconds {
        Some(secs) => println!("Timeout:      {}s", secs),
        None => println!("Timeout:      none"),
    }
    for (name, value) in &config.engine.parameters {
        println!("Parameter:    {} = {}", name, value);
    }
    println!(
        "Preview:      {} rows, width {}",
        config.preview.rows, config.preview.width
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_run() {
        let cli = Cli::try_parse_from(["nbrun"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_with_output() {
        let cli = Cli::try_parse_from(["nbrun", "run", "--output", "out.ipynb"]).unwrap();
        match cli.command {
            Some(Commands::Run { output }) => {
                assert_eq!(output, Some(PathBuf::from("out.ipynb")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_preview_rows_flag() {
        let cli = Cli::try_parse_from(["nbrun", "preview", "-r", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Preview { rows: Some(5) })
        ));
    }
}
