//! Implementation of the `gitops build` command.
//!
//! Regenerates the tree from `pipelines.yaml`, either in place or as a single
//! YAML stream on stdout.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use gitops_lib::build::{BuildConfig, BuildOptions, build, build_resources};
use gitops_lib::fs::DiskLister;
use gitops_lib::manifest::parse_folder;
use gitops_lib::output::marshal_outputs;

use crate::output::{OutputFormat, canonical, print_files, print_json, print_stat, print_success};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Directory containing pipelines.yaml
  #[arg(long, default_value = ".")]
  pub pipelines_folder: PathBuf,

  /// Root of the generated tree
  #[arg(long, default_value = ".")]
  pub output: PathBuf,

  /// Print the resources to stdout instead of writing them
  #[arg(long)]
  pub stdout: bool,
}

pub fn cmd_build(args: &BuildArgs, format: OutputFormat) -> Result<()> {
  if args.stdout {
    let manifest = parse_folder(&args.pipelines_folder)
      .with_context(|| format!("Failed to load manifest from {}", args.pipelines_folder.display()))?;
    let lister = DiskLister::new(&args.output);
    let resources =
      build_resources(&manifest, &lister, &BuildConfig::default()).context("Failed to build resources")?;

    debug!(count = resources.len(), "streaming resources to stdout");
    let mut out = io::stdout().lock();
    marshal_outputs(&mut out, &resources).context("Failed to write resources")?;
    out.flush().context("Failed to flush stdout")?;
    return Ok(());
  }

  let options = BuildOptions {
    pipelines_folder: args.pipelines_folder.clone(),
    output_path: args.output.clone(),
    config: BuildConfig::default(),
  };
  let result = build(&options).context("Failed to build GitOps repository")?;

  if format.is_json() {
    let files: Vec<_> = result.written.iter().map(|p| p.display().to_string()).collect();
    print_json(&serde_json::json!({
      "output": canonical(&args.output),
      "resources": result.resources.len(),
      "files": files,
    }))?;
    return Ok(());
  }

  print_success("Build complete");
  print_stat("Output", &canonical(&args.output));
  print_stat("Files", &result.written.len().to_string());
  print_files(&args.output, &result.written);

  Ok(())
}
