use crate::demo::{run_demo, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Screening Service",
    about = "Run and exercise the loan application screening service from the command line",
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
    /// Score a CSV export of applications with the deployed classifier
    Score(ScoreArgs),
    /// Run an end-to-end screening demo against in-memory infrastructure
    Demo(DemoArgs),
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

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args),
    }
}
