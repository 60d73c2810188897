//! Implementation of `gitops service` subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use gitops_lib::secrets::AgeSealer;
use gitops_lib::service::{AddServiceOptions, add_service};

use crate::output::{OutputFormat, print_files, print_info, print_json, print_stat, print_success, print_warning};

#[derive(Debug, Subcommand)]
pub enum ServiceCommands {
  /// Add a service to an environment and application
  Add(AddServiceArgs),
}

#[derive(Debug, Args)]
pub struct AddServiceArgs {
  /// Environment the service is deployed to
  #[arg(long)]
  pub env_name: String,

  /// Application the service belongs to (created when missing)
  #[arg(long)]
  pub app_name: String,

  #[arg(long)]
  pub service_name: String,

  /// Source repository of the service
  #[arg(long)]
  pub git_repo_url: Option<String>,

  /// Webhook secret for the source repository (generated when omitted)
  #[arg(long)]
  pub webhook_secret: Option<String>,

  /// Root of the GitOps repository, containing pipelines.yaml
  #[arg(long, default_value = ".")]
  pub pipelines_folder: PathBuf,

  /// age public key secrets are sealed for
  #[arg(long, env = "GITOPS_SEALING_KEY")]
  pub sealing_key: String,
}

pub fn cmd_service(command: &ServiceCommands, format: OutputFormat) -> Result<()> {
  match command {
    ServiceCommands::Add(args) => cmd_service_add(args, format),
  }
}

fn cmd_service_add(args: &AddServiceArgs, format: OutputFormat) -> Result<()> {
  let sealer: AgeSealer = args.sealing_key.parse().context("Invalid --sealing-key")?;
  let options = AddServiceOptions {
    pipelines_folder: args.pipelines_folder.clone(),
    env_name: args.env_name.clone(),
    app_name: args.app_name.clone(),
    service_name: args.service_name.clone(),
    git_repo_url: args.git_repo_url.clone(),
    webhook_secret: args.webhook_secret.clone(),
    ..Default::default()
  };

  let result = add_service(&options, &sealer)
    .with_context(|| format!("Failed to add service {} to {}", args.service_name, args.env_name))?;

  if format.is_json() {
    let files: Vec<_> = result.written.iter().map(|p| p.display().to_string()).collect();
    print_json(&serde_json::json!({
      "environment": args.env_name,
      "application": args.app_name,
      "service": args.service_name,
      "generated_webhook_secret": result.generated_secret,
      "files": files,
    }))?;
    return Ok(());
  }

  print_success(&format!("Added service {}", args.service_name));
  print_stat("Environment", &args.env_name);
  print_stat("Application", &args.app_name);
  if args.git_repo_url.is_none() {
    print_info("No source repository given, so no CI trigger was created");
  }
  print_stat("Files", &result.written.len().to_string());
  print_files(&args.pipelines_folder, &result.written);
  if let Some(name) = &result.generated_secret {
    print_warning(&format!("Generated a random value for {name}; pass --webhook-secret to choose one"));
  }

  Ok(())
}
