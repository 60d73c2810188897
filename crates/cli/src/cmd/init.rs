//! Implementation of the `gitops init` command.
//!
//! Scaffolds a GitOps repository: `pipelines.yaml` plus the CI/CD namespace
//! resources.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

use gitops_lib::init::{InitOptions, init};
use gitops_lib::scm::RepositoryRegistry;
use gitops_lib::secrets::AgeSealer;

use crate::output::{OutputFormat, canonical, print_files, print_json, print_stat, print_success, print_warning, symbols};

/// Flags shared by `init` and `bootstrap`.
#[derive(Debug, Args)]
pub struct InitArgs {
  /// GitOps repository URL, e.g. https://github.com/org/gitops
  #[arg(long)]
  pub gitops_repo_url: String,

  /// Webhook secret for the GitOps repository (generated when omitted)
  #[arg(long)]
  pub gitops_webhook_secret: Option<String>,

  /// Prefix for generated namespaces
  #[arg(long, default_value = "")]
  pub prefix: String,

  /// Docker config.json holding registry credentials
  #[arg(long)]
  pub dockercfgjson: Option<PathBuf>,

  /// Directory to write the repository to
  #[arg(long, default_value = ".")]
  pub output: PathBuf,

  /// Replace an existing pipelines.yaml
  #[arg(long)]
  pub overwrite: bool,

  /// age public key secrets are sealed for
  #[arg(long, env = "GITOPS_SEALING_KEY")]
  pub sealing_key: String,
}

impl InitArgs {
  pub fn to_options(&self) -> InitOptions {
    InitOptions {
      gitops_repo_url: self.gitops_repo_url.clone(),
      gitops_webhook_secret: self.gitops_webhook_secret.clone(),
      prefix: self.prefix.clone(),
      docker_config_json: self.dockercfgjson.clone(),
      output_path: self.output.clone(),
      overwrite: self.overwrite,
    }
  }

  pub fn sealer(&self) -> Result<AgeSealer> {
    self.sealing_key.parse().context("Invalid --sealing-key")
  }
}

pub fn cmd_init(args: &InitArgs, format: OutputFormat) -> Result<()> {
  let options = args.to_options();
  let sealer = args.sealer()?;

  let result =
    init(&options, &sealer, &RepositoryRegistry::default()).context("Failed to initialize GitOps repository")?;

  if format.is_json() {
    let files: Vec<_> = result.written.iter().map(|p| p.display().to_string()).collect();
    print_json(&serde_json::json!({
      "output": canonical(&options.output_path),
      "pipelines_file": result.pipelines_file.display().to_string(),
      "generated_webhook_secret": result.generated_secret,
      "files": files,
    }))?;
    return Ok(());
  }

  print_success(&"Initialized GitOps repository".green().bold().to_string());
  println!();
  print_stat("Output", &canonical(&options.output_path));
  print_stat("Pipelines namespace", &options.cicd_namespace());
  print_stat("Files", &result.written.len().to_string());
  print_files(&options.output_path, &result.written);
  if result.generated_secret {
    println!();
    print_warning("Generated a random GitOps webhook secret; pass --gitops-webhook-secret to choose one");
  }
  println!();
  println!("{}", "Next steps:".bold());
  println!(
    "  {} Commit {} and point ArgoCD at it",
    symbols::INFO,
    options.gitops_url().cyan()
  );

  Ok(())
}
