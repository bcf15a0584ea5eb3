// Command routing and dispatch

use crate::commands::{
    ApplyCommand, BatchCommand, Command, Context, ListCommand, PreviewCommand, RecipeCheckCommand,
};
use crate::error::{CliError, CliResult};
use crate::logging::{init_logging, resolve_level};
use clap::{ArgAction, Args, Parser, Subcommand};
use recast_engine::{ConfigLoader, Pathway, RecipeExporter, TransformerRegistry};
use std::path::PathBuf;
use tracing::debug;

/// Recast - recipe-driven Python source rewriting
#[derive(Parser, Debug)]
#[command(name = "recast")]
#[command(bin_name = "recast")]
#[command(about = "Recipe-driven, scope-aware Python source rewriting")]
#[command(
    long_about = "Recast rewrites Python sources with declarative recipes or built-in API migrations.\n\nEvery output is re-parsed before it is written; sources are only overwritten with --in-place, after a backup.\n\nQuick start:\n  • recast list                                   Show available transformers\n  • recast preview app.py --transformer pathlib   Show the diff without writing\n  • recast apply app.py --recipe bump.yaml        Write app_transformed.py\n  • recast batch src/*.py --transformer pathlib   Transform many files"
)]
#[command(version)]
#[command(author = "Recast Contributors")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Exactly one rewrite pathway
#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[group(required = true, multiple = false)]
pub struct PathwayArgs {
    /// Recipe file (JSON or YAML) for the scope-aware rewriter
    #[arg(short, long, value_name = "FILE")]
    pub recipe: Option<PathBuf>,

    /// Registered transformer to run
    #[arg(short, long, value_name = "NAME")]
    pub transformer: Option<String>,
}

impl PathwayArgs {
    pub fn load(&self) -> CliResult<Pathway> {
        match (&self.recipe, &self.transformer) {
            (Some(path), None) => Ok(Pathway::Recipe(RecipeExporter::load(path)?)),
            (None, Some(name)) => Ok(Pathway::Transformer(name.clone())),
            _ => Err(CliError::InvalidArgument {
                message: "pass exactly one of --recipe or --transformer".to_string(),
            }),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List transformers and any that failed to load
    List,

    /// Transform one file
    Apply {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        #[command(flatten)]
        pathway: PathwayArgs,

        /// Output path (default: <stem>_<suffix><.ext> next to the source)
        #[arg(short, long, value_name = "DEST", conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the source after backing it up
        #[arg(long)]
        in_place: bool,
    },

    /// Transform many files with one pathway
    Batch {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        pathway: PathwayArgs,

        /// Directory for derived outputs
        #[arg(long, value_name = "DIR", conflicts_with = "in_place")]
        output_dir: Option<PathBuf>,

        /// Overwrite sources after backing them up
        #[arg(long)]
        in_place: bool,

        /// Files processed concurrently
        #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(usize))]
        workers: Option<usize>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the diff a transformation would produce, without writing
    Preview {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        #[command(flatten)]
        pathway: PathwayArgs,
    },

    /// Recipe file utilities
    Recipe {
        #[command(subcommand)]
        action: RecipeAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecipeAction {
    /// Validate a recipe file
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Load configuration, install logging, discover transformers and run the command
    pub async fn route(cli: Cli) -> CliResult<()> {
        let mut config = ConfigLoader::load_or_default(cli.config.as_deref())
            .map_err(|e| CliError::Config(e.to_string()))?;
        init_logging(resolve_level(cli.verbose, cli.quiet, &config.log_level));

        if let Commands::Batch {
            output_dir: Some(dir),
            ..
        } = &cli.command
        {
            config.output_dir = Some(dir.clone());
        }

        let registry = TransformerRegistry::discover();
        if let Some(dir) = &config.recipe_dir {
            let loaded = registry.load_recipe_dir(dir)?;
            debug!(dir = %dir.display(), loaded, "registered recipe directory");
        }

        let context = Context::new(registry, config, cli.verbose > 0);
        match cli.command {
            Commands::List => ListCommand.execute(&context).await,
            Commands::Apply {
                source,
                pathway,
                output,
                in_place,
            } => {
                ApplyCommand::new(source, pathway, output, in_place)
                    .execute(&context)
                    .await
            }
            Commands::Batch {
                files,
                pathway,
                in_place,
                workers,
                json,
                ..
            } => {
                BatchCommand::new(files, pathway, in_place, workers, json)
                    .execute(&context)
                    .await
            }
            Commands::Preview { source, pathway } => {
                PreviewCommand::new(source, pathway).execute(&context).await
            }
            Commands::Recipe {
                action: RecipeAction::Check { file },
            } => RecipeCheckCommand::new(file).execute(&context).await,
        }
    }
}
