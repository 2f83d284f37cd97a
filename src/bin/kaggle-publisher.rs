//! Kaggle Publisher CLI
//!
//! Pushes a proof-of-run commit from a notebook session to GitHub

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use kaggle_publisher::core::config_loader::{ConfigLoadOptions, ConfigLoader, ConfigOverrides};
use kaggle_publisher::{
    ABORT_MESSAGE, CredentialResolver, CredentialSourceKind, PublishConfig, PublishError,
    PublishRun, Redactor, RunOutcome, RunStamp, SafeCommandExecutor, WorkspaceMode,
};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Publish a proof-of-run commit from a Kaggle notebook to GitHub
#[derive(Parser)]
#[command(name = "kaggle-publisher")]
#[command(version)]
#[command(about = "Publish a proof-of-run commit from a Kaggle notebook to GitHub", long_about = None)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the token, commit a run artifact and push it
    Run(RunArgs),

    /// Resolve the token only; no git commands are run
    Check(ConfigArgs),

    /// Write a default .kaggle-publish.yaml
    Init {
        /// Directory to write into (defaults to current directory)
        #[arg(value_name = "PROJECT_PATH")]
        project_path: Option<PathBuf>,

        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Config file to use instead of ./.kaggle-publish.yaml
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// GitHub account that owns the repository
    #[arg(long)]
    username: Option<String>,

    /// Repository name
    #[arg(long)]
    repo: Option<String>,

    /// Root of attached datasets
    #[arg(long, value_name = "DIR")]
    input_root: Option<PathBuf>,

    /// Credential sources in lookup order (file, kaggle-secrets, env)
    #[arg(long, value_delimiter = ',')]
    sources: Vec<CredentialSourceKind>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Working copy directory
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Push to this fixed branch instead of a timestamped one
    #[arg(long)]
    branch: Option<String>,

    /// How to obtain the working copy
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Pull the default branch before switching to the run branch
    #[arg(long)]
    sync_default_branch: bool,

    /// Force-push the run branch
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Clone,
    Init,
}

impl From<ModeArg> for WorkspaceMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Clone => WorkspaceMode::Clone,
            ModeArg::Init => WorkspaceMode::Init,
        }
    }
}

impl ConfigArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            username: self.username.clone(),
            repo: self.repo.clone(),
            input_root: self.input_root.clone(),
            sources: (!self.sources.is_empty()).then(|| self.sources.clone()),
            ..Default::default()
        }
    }
}

impl RunArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            work_dir: self.work_dir.clone(),
            static_branch: self.branch.clone(),
            mode: self.mode.map(Into::into),
            sync_default_branch: self.sync_default_branch.then_some(true),
            force_push: self.force.then_some(true),
            ..self.config.overrides()
        }
    }
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => {
            let overrides = args.overrides();
            run_command(args.config.config, overrides).await
        }
        Commands::Check(args) => {
            let overrides = args.overrides();
            check_command(args.config, overrides).await
        }
        Commands::Init {
            project_path,
            force,
        } => {
            let path = project_path.unwrap_or_else(|| PathBuf::from("."));
            init_command(path, force).await
        }
    }
}

/// Process environment; entries that are not valid Unicode are skipped
fn process_env() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Load, merge and validate configuration; warnings are printed here
async fn load_config(
    config_file: Option<PathBuf>,
    overrides: ConfigOverrides,
) -> Result<PublishConfig, PublishError> {
    let options = ConfigLoadOptions {
        project_path: PathBuf::from("."),
        config_file,
        cli_args: Some(overrides),
        env: process_env(),
    };

    let config = ConfigLoader::load(options).await?;
    let validation = ConfigLoader::validate(&config);

    if !validation.valid {
        return Err(PublishError::ConfigError(
            ConfigLoader::format_validation_result(&validation),
        ));
    }
    if !validation.warnings.is_empty() {
        println!("{}\n", ConfigLoader::format_validation_result(&validation));
    }

    Ok(config)
}

fn print_error(error: &PublishError) {
    eprintln!("❌ {} ({})", error, error.code());
    eprintln!("\nSuggested actions:");
    for action in error.suggested_actions() {
        eprintln!("  - {}", action);
    }
}

async fn run_command(config_file: Option<PathBuf>, overrides: ConfigOverrides) -> Result<i32> {
    println!("\n[START] Starting Git workflow - Clone, Process, Push...\n");

    let config = match load_config(config_file, overrides).await {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return Ok(1);
        }
    };

    let resolver = match CredentialResolver::from_config(&config.credentials) {
        Ok(resolver) => resolver,
        Err(e) => {
            print_error(&e);
            return Ok(1);
        }
    };

    let mut executor = SafeCommandExecutor::new();
    executor.set_timeout(config.repository.command_timeout());

    let mut run = PublishRun::new(&config, resolver, &executor, RunStamp::now());
    let outcome = run.execute().await;

    match &outcome {
        RunOutcome::Aborted(e) => {
            if matches!(e, PublishError::NoCredentialFound { .. }) {
                println!("{}", ABORT_MESSAGE);
            }
            print_error(e);
        }
        RunOutcome::Completed(summary) => {
            print!("{}", summary.status);
        }
    }

    Ok(outcome.exit_code())
}

async fn check_command(config_file: Option<PathBuf>, overrides: ConfigOverrides) -> Result<i32> {
    println!("\n🔑 Credential check\n");

    let config = match load_config(config_file, overrides).await {
        Ok(config) => config,
        Err(e) => {
            print_error(&e);
            return Ok(1);
        }
    };

    let resolver = match CredentialResolver::from_config(&config.credentials) {
        Ok(resolver) => resolver,
        Err(e) => {
            print_error(&e);
            return Ok(1);
        }
    };

    println!("Sources: {}", resolver.source_names().join(", "));

    match resolver.resolve().await {
        Ok(credential) => {
            println!("✅ GITHUB_TOKEN loaded from {}", credential.source());
            println!(
                "  Token: {}",
                Redactor::mask_token(credential.secret().expose_secret())
            );
            Ok(0)
        }
        Err(e) => {
            print_error(&e);
            Ok(1)
        }
    }
}

async fn init_command(project_path: PathBuf, force: bool) -> Result<i32> {
    println!("\n🎯 Initialize kaggle-publisher\n");

    match ConfigLoader::write_default(&project_path, force).await {
        Ok(path) => {
            println!("✅ Created {}", path.display());
            println!("  Set github.username and github.repo before the first run.");
            Ok(0)
        }
        Err(e) => {
            print_error(&e);
            Ok(1)
        }
    }
}
