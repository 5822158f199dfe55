use crate::demo::{
    run_demo, run_expiring_report, run_sweep, DemoArgs, ExpiringReportArgs, SweepArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use leasehold::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "leasehold",
    about = "Run and demonstrate the leasehold tenancy service",
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
    /// Run one lease expiry sweep against a seeded sample portfolio
    Sweep(SweepArgs),
    /// Reports over a seeded sample portfolio
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Walk through the tenancy rules end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Active leases ending inside the look-ahead window
    Expiring(ExpiringReportArgs),
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
        Command::Sweep(args) => run_sweep(args),
        Command::Report {
            command: ReportCommand::Expiring(args),
        } => run_expiring_report(args),
        Command::Demo(args) => run_demo(args),
    }
}
