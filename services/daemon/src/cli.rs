use crate::daemon::{self, RunOnceArgs};
use crate::demo::{run_demo, DemoArgs};
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use fleet_reminder::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Expiry Reminder",
    about = "Run the daily license and insurance expiry reminder service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the reminder daemon (default command)
    Serve(ServeArgs),
    /// Run a single reminder cycle against the configured rosters, then exit
    RunOnce(RunOnceArgs),
    /// Run a demo cycle over seeded records, printing mail to the console
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured local fire time (HH:MM)
    #[arg(long, value_parser = crate::infra::parse_fire_at)]
    pub(crate) fire_at: Option<NaiveTime>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => daemon::run(args).await,
        Command::RunOnce(args) => daemon::run_once(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
