use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::llm::HttpTextGenerator;
use crate::load_config::{load_config, Overrides};
use crate::pipeline::{run_stages, Stage};

/// CLI for docmill: generate Markdown documentation from a CLI tool catalog.
#[derive(Parser)]
#[clap(
    name = "docmill",
    version,
    about = "Generate per-tool and per-family Markdown documentation from a tool catalog"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the annotations fragment for every tool
    Annotations(CommonArgs),
    /// Generate the parameters fragment for every tool
    Parameters(CommonArgs),
    /// Generate example prompts for every tool via the text generator
    Examples(CommonArgs),
    /// Compose complete tool pages from the generated fragments
    Compose {
        #[clap(flatten)]
        common: CommonArgs,
        /// Rewrite each composed page through the text generator
        #[clap(long)]
        improve: bool,
    },
    /// Assemble per-family pages from the composed tool pages
    Families(CommonArgs),
    /// Run every stage in order
    All {
        #[clap(flatten)]
        common: CommonArgs,
        /// Rewrite each composed page through the text generator
        #[clap(long)]
        improve: bool,
    },
}

#[derive(Args)]
pub struct CommonArgs {
    /// Path to the YAML config file
    #[clap(long)]
    pub config: PathBuf,
    /// Override the configured output directory
    #[clap(long)]
    pub output_dir: Option<PathBuf>,
    /// Override the configured document version stamp
    #[clap(long)]
    pub doc_version: Option<String>,
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let (common, improve, stages) = match cli.command {
        Commands::Annotations(common) => (common, false, vec![Stage::Annotations]),
        Commands::Parameters(common) => (common, false, vec![Stage::Parameters]),
        Commands::Examples(common) => (common, false, vec![Stage::Examples]),
        Commands::Compose { common, improve } => (common, improve, vec![Stage::Compose]),
        Commands::Families(common) => (common, false, vec![Stage::Families]),
        Commands::All { common, improve } => (common, improve, Stage::ALL.to_vec()),
    };

    let overrides = Overrides {
        output_dir: common.output_dir,
        version: common.doc_version,
        improve,
    };
    let config = load_config(common.config, overrides)?;

    let generator = if config.generator.enabled {
        Some(HttpTextGenerator::new(&config.generator))
    } else {
        tracing::info!("Text generation disabled in config, stages fall back");
        None
    };

    println!("Documentation run starting...");
    match run_stages(&config, generator.as_ref(), &stages).await {
        Ok(report) => {
            println!("Documentation run complete.\nReport:");
            println!("{:#?}", report);
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] Documentation run failed: {e}");
            Err(e.into())
        }
    }
}
