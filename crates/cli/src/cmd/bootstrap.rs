//! Implementation of the `gitops bootstrap` command.

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

use gitops_lib::bootstrap::{BootstrapOptions, bootstrap};
use gitops_lib::build::BuildConfig;

use super::init::InitArgs;
use crate::output::{OutputFormat, canonical, print_files, print_json, print_stat, print_success, print_warning};

#[derive(Debug, Args)]
pub struct BootstrapArgs {
  #[command(flatten)]
  pub init: InitArgs,

  /// Source repository of the first service
  #[arg(long)]
  pub app_repo_url: String,

  /// Webhook secret for the service repository (generated when omitted)
  #[arg(long)]
  pub app_webhook_secret: Option<String>,

  /// Image repository the service is built into, e.g. quay.io/org/app
  #[arg(long)]
  pub image_repo: String,
}

pub fn cmd_bootstrap(args: &BootstrapArgs, format: OutputFormat) -> Result<()> {
  let options = BootstrapOptions {
    init: args.init.to_options(),
    app_repo_url: args.app_repo_url.clone(),
    app_webhook_secret: args.app_webhook_secret.clone(),
    image_repo: args.image_repo.clone(),
  };
  let sealer = args.init.sealer()?;

  let result =
    bootstrap(&options, &sealer, &BuildConfig::default()).context("Failed to bootstrap GitOps repository")?;
  let output = &options.init.output_path;

  let environments: Vec<_> = result.manifest.environments.iter().map(|e| e.name.as_str()).collect();
  let apps: Vec<_> = result.manifest.apps.iter().map(|a| a.name.as_str()).collect();

  if format.is_json() {
    let files: Vec<_> = result.written.iter().map(|p| p.display().to_string()).collect();
    print_json(&serde_json::json!({
      "output": canonical(output),
      "environments": environments,
      "apps": apps,
      "generated_webhook_secrets": result.generated_secrets,
      "files": files,
    }))?;
    return Ok(());
  }

  print_success(&"Bootstrapped GitOps repository".green().bold().to_string());
  println!();
  print_stat("Output", &canonical(output));
  print_stat("Environments", &environments.join(", "));
  print_stat("Applications", &apps.join(", "));
  print_stat("Files", &result.written.len().to_string());
  print_files(output, &result.written);
  if !result.generated_secrets.is_empty() {
    println!();
    print_warning(&format!(
      "Generated random values for {}; pass --gitops-webhook-secret and --app-webhook-secret to choose them",
      result.generated_secrets.join(", ")
    ));
  }

  Ok(())
}
