use crate::commands::{run_check, run_submit, RepoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use repo_intake::error::AppError;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "Repo Intake",
    about = "Normalize repository references and schedule them for Sourcegraph embeddings",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate a repository reference and schedule it for embeddings
    Submit(RepoArgs),
    /// Validate a repository reference without submitting it
    Check(RepoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await.map(|()| ExitCode::SUCCESS),
        Command::Submit(args) => run_submit(args).await,
        Command::Check(args) => run_check(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["repo-intake"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn submit_takes_the_raw_reference() {
        let cli = Cli::try_parse_from(["repo-intake", "submit", "git@github.com:org/repo.git"])
            .expect("parses");
        match cli.command {
            Some(Command::Submit(args)) => assert_eq!(args.repo_url, "git@github.com:org/repo.git"),
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_overrides() {
        let cli = Cli::try_parse_from(["repo-intake", "serve", "--host", "0.0.0.0", "--port", "9000"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(9000));
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
