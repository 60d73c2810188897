mod cmd;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{BootstrapArgs, BuildArgs, InitArgs, ServiceCommands};
use output::OutputFormat;

/// gitops - GitOps repository scaffolding for Tekton and ArgoCD
#[derive(Parser)]
#[command(name = "gitops")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Scaffold a GitOps repository with its CI/CD namespace
  Init(InitArgs),

  /// Scaffold a GitOps repository together with a first service
  Bootstrap(BootstrapArgs),

  /// Regenerate the repository from pipelines.yaml
  Build(BuildArgs),

  /// Manage services
  Service {
    #[command(subcommand)]
    command: ServiceCommands,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "info" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  match &cli.command {
    Commands::Init(args) => cmd::cmd_init(args, cli.format),
    Commands::Bootstrap(args) => cmd::cmd_bootstrap(args, cli.format),
    Commands::Build(args) => cmd::cmd_build(args, cli.format),
    Commands::Service { command } => cmd::cmd_service(command, cli.format),
  }
}
