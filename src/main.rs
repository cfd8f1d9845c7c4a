use clap::{Parser, Subcommand};
use smartbi_client::api::types::ChartType;
use smartbi_client::commands::{self, charts::ChartsArgs, generate::GenerateArgs};
use smartbi_client::config::ClientConfig;
use smartbi_client::notify::ChannelNotifier;
use smartbi_client::services::SubmitMode;
use smartbi_client::state::AppState;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "smartbi", version, about = "Generate charts with AI and follow their jobs")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the chart service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit an analysis goal with a dataset
    Generate {
        #[arg(long)]
        goal: String,
        #[arg(long)]
        name: String,
        /// line, bar, stacked, pie or radar
        #[arg(long)]
        chart_type: Option<ChartType>,
        /// Dataset to analyse (CSV or Excel)
        #[arg(long)]
        file: Option<PathBuf>,
        /// sync, async or mq
        #[arg(long, default_value = "sync")]
        mode: SubmitMode,
        #[arg(long)]
        json: bool,
    },
    /// List my charts
    Charts {
        /// Search by chart name
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        page: Option<u64>,
        #[arg(long)]
        page_size: Option<u64>,
        /// Keep refreshing while jobs are pending
        #[arg(long)]
        watch: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    smartbi_client::init_tracing();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
        config.validate()?;
    }

    let ok = match cli.command {
        Command::Config => commands::config::run(&config)?,
        command => {
            let (notifier, rx) = ChannelNotifier::new();
            let printer = tokio::spawn(commands::print_notifications(rx));

            let ok = {
                let state = AppState::new(config, Arc::new(notifier))?;
                match command {
                    Command::Generate {
                        goal,
                        name,
                        chart_type,
                        file,
                        mode,
                        json,
                    } => {
                        let args = GenerateArgs {
                            goal,
                            name,
                            chart_type,
                            file,
                            mode,
                            json,
                        };
                        commands::generate::run(&state, args).await?
                    }
                    Command::Charts {
                        filter,
                        page,
                        page_size,
                        watch,
                        json,
                    } => {
                        let args = ChartsArgs {
                            filter,
                            page,
                            page_size,
                            watch,
                            json,
                        };
                        commands::charts::run(&state, args).await?
                    }
                    Command::Config => true,
                }
            };

            // all senders are gone once the state is dropped
            printer.await?;
            ok
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
