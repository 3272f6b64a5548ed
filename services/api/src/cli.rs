use crate::commands::{run_fields, run_report, FieldsArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use member_dossier::config::AppConfig;
use member_dossier::error::AppError;
use member_dossier::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Member Dossier",
    about = "Project member records into field views and export dossier reports",
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
    /// Print the projected fields of a member record
    Fields(FieldsArgs),
    /// Export a member report as PDF or CSV
    Report(ReportArgs),
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
        Command::Fields(args) => run_fields(args),
        Command::Report(args) => {
            let config = AppConfig::load()?;
            telemetry::init(&config.telemetry)?;
            tokio::task::spawn_blocking(move || run_report(args, config))
                .await
                .map_err(|err| AppError::Io(std::io::Error::other(err)))?
        }
    }
}
