use crate::demo::run_demo;
use crate::server;
use clap::{Args, Parser, Subcommand};
use recruitment::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "recruitment-api",
    about = "Run the recruitment backend or walk through a hiring scenario",
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
    /// Run the hire/reject scenario against an in-memory store and print the outcome
    Demo,
}

#[derive(Args, Debug)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Create a demo recruiter and sample jobs when the store has none
    #[arg(long)]
    pub(crate) seed: bool,
    /// Number of jobs created by --seed
    #[arg(long, default_value_t = crate::seed::DEFAULT_SEED_JOBS)]
    pub(crate) seed_jobs: usize,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            seed: false,
            seed_jobs: crate::seed::DEFAULT_SEED_JOBS,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo => run_demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "recruitment-api",
            "serve",
            "--port",
            "9090",
            "--seed",
            "--seed-jobs",
            "5",
        ])
        .expect("valid arguments");

        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(9090));
                assert!(args.seed);
                assert_eq!(args.seed_jobs, 5);
                assert!(args.host.is_none());
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["recruitment-api"]).expect("valid arguments");
        assert!(cli.command.is_none());
        assert_eq!(ServeArgs::default().seed_jobs, 100);
    }
}
