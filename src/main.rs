//! prmerge CLI

mod cli;

use anstream::eprintln;
use clap::{Args, Parser, Subcommand};
use cli::context::RepoArgs;
use cli::merge::run_merge_command;
use cli::style::Stylize;
use prmerge::config::load_config;
use prmerge::error::Error;
use prmerge::merge::MergeOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "PRMERGE_LOG";

/// Merge GitHub pull requests and clean up their branches
#[derive(Parser, Debug)]
#[command(name = "prmerge", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the local checkout
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Git remote to use
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Select another repository using the [HOST/]OWNER/REPO format
    #[arg(short = 'R', long, global = true)]
    repo: Option<String>,

    /// Never prompt, even on a terminal
    #[arg(long, global = true)]
    no_prompt: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge a pull request
    Merge(MergeArgs),
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct MergeArgs {
    /// Pull request number, URL or head branch (default: current branch)
    selector: Option<String>,

    /// Merge the commits with the base branch
    #[arg(short, long)]
    merge: bool,

    /// Rebase the commits onto the base branch
    #[arg(short, long)]
    rebase: bool,

    /// Squash the commits into one commit and merge it into the base branch
    #[arg(short, long)]
    squash: bool,

    /// Delete the local and remote branch after merge
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    delete_branch: Option<bool>,

    /// Body text for the merge commit
    #[arg(short, long)]
    body: Option<String>,

    /// Read body text from file (use "-" to read from standard input)
    #[arg(short = 'F', long)]
    body_file: Option<PathBuf>,

    /// Subject text for the merge commit
    #[arg(short = 't', long)]
    subject: Option<String>,

    /// Email text for merge commit author
    #[arg(short = 'A', long)]
    author_email: Option<String>,

    /// Commit SHA that the pull request head must match to allow merge
    #[arg(long)]
    match_head_commit: Option<String>,

    /// Use administrator privileges to merge a pull request that does not meet requirements
    #[arg(long)]
    admin: bool,

    /// Automatically merge only after necessary requirements are met
    #[arg(long)]
    auto: bool,

    /// Disable auto-merge for this pull request
    #[arg(long)]
    disable_auto: bool,
}

impl From<MergeArgs> for MergeOptions {
    fn from(args: MergeArgs) -> Self {
        Self {
            selector: args.selector,
            merge: args.merge,
            rebase: args.rebase,
            squash: args.squash,
            default_method: None,
            delete_branch: args.delete_branch,
            body: args.body,
            body_file: args.body_file,
            subject: args.subject,
            author_email: args.author_email,
            match_head_commit: args.match_head_commit,
            admin: args.admin,
            auto_merge: args.auto,
            disable_auto_merge: args.disable_auto,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("prmerge=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let repo_args = RepoArgs {
        path: cli.path.as_deref(),
        repo: cli.repo.as_deref(),
        remote: cli.remote.as_deref(),
        no_prompt: cli.no_prompt,
    };

    match cli.command {
        Commands::Merge(args) => {
            let options = MergeOptions::from(args);
            // Flag conflicts are reported before any file, git or network access
            options.validate()?;
            let config = load_config()?;
            run_merge_command(&repo_args, &config, options).await?;
        }
    }
    Ok(())
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<Error>() {
        // Already phrased for the user
        Some(e) if e.is_silent() => eprintln!("{e}"),
        _ => eprintln!("{} {err:#}", "error:".failure()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}
