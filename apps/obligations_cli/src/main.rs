use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use obligation_client::{
    CreateObligationModal, DashboardController, DialogHost, Flow, HttpObligationApi,
    LifecycleAction, MessageModal, ObligationApi, SubmitOutcome, Transition,
};
use shared::protocol::MessagePayload;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use render::{render_dashboard, render_records, TerminalDialogs};

#[derive(Parser, Debug)]
#[command(about = "Terminal client for the obligation ledger")]
struct Cli {
    #[arg(long, default_value = "obligations.toml")]
    config: PathBuf,
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_base: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show identity, peers and both obligation lists, newest first.
    Show,
    /// Open the creation dialog; prompts for the amount when not given.
    Create {
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
    },
    Get {
        id: String,
    },
    Consumed,
    Unconsumed,
    Pledge {
        amount: u64,
    },
    Redeem {
        amount: u64,
    },
    Approve {
        flow: FlowArg,
        external_id: String,
    },
    Deny {
        flow: FlowArg,
        external_id: String,
    },
    Cancel {
        flow: FlowArg,
        external_id: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FlowArg {
    Pledge,
    Redeem,
}

impl From<FlowArg> for Flow {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Pledge => Flow::Pledge,
            FlowArg::Redeem => Flow::Redeem,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = config::load_settings(&cli.config)?;
    if let Some(api_base) = cli.api_base {
        settings.api_base = api_base;
    }

    let filter =
        EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let api = Arc::new(
        HttpObligationApi::with_timeout(&settings.api_base, settings.request_timeout())
            .context("failed to build ledger client")?,
    );
    tracing::debug!(api_base = %api.base_url(), "ledger client ready");
    let dialogs: Arc<dyn DialogHost> = Arc::new(TerminalDialogs);

    match cli.command {
        Command::Show => {
            let mut dashboard = DashboardController::new(api, dialogs);
            dashboard.initialize().await;
            print!("{}", render_dashboard(dashboard.state()));
        }
        Command::Create { amount } => {
            let mut dashboard = DashboardController::new(api, dialogs);
            dashboard.load_peers().await;
            let modal = dashboard.open_create_modal();
            match amount {
                Some(raw) => submit_once(modal, raw).await?,
                None => prompt_and_submit(modal).await?,
            }
        }
        Command::Get { id } => {
            let record = api
                .obligation(&id)
                .await
                .with_context(|| format!("failed to load obligation {id}"))?;
            println!("{}", record.summary());
        }
        Command::Consumed => {
            let records = api
                .consumed()
                .await
                .context("failed to load consumed obligations")?;
            print!("{}", render_records("Consumed obligations", &records));
        }
        Command::Unconsumed => {
            let records = api
                .unconsumed()
                .await
                .context("failed to load unconsumed obligations")?;
            print!("{}", render_records("Unconsumed obligations", &records));
        }
        Command::Pledge { amount } => {
            let action = LifecycleAction::Request {
                flow: Flow::Pledge,
                amount,
            };
            run_lifecycle(&api, dialogs.as_ref(), action).await;
        }
        Command::Redeem { amount } => {
            let action = LifecycleAction::Request {
                flow: Flow::Redeem,
                amount,
            };
            run_lifecycle(&api, dialogs.as_ref(), action).await;
        }
        Command::Approve { flow, external_id } => {
            let action = transition(Transition::Approve, flow, external_id);
            run_lifecycle(&api, dialogs.as_ref(), action).await;
        }
        Command::Deny { flow, external_id } => {
            let action = transition(Transition::Deny, flow, external_id);
            run_lifecycle(&api, dialogs.as_ref(), action).await;
        }
        Command::Cancel { flow, external_id } => {
            let action = transition(Transition::Cancel, flow, external_id);
            run_lifecycle(&api, dialogs.as_ref(), action).await;
        }
    }

    Ok(())
}

fn transition(transition: Transition, flow: FlowArg, external_id: String) -> LifecycleAction {
    LifecycleAction::Transition {
        transition,
        flow: flow.into(),
        external_id,
    }
}

/// Replies and transport failures are both shown as a message dialog.
async fn run_lifecycle(
    api: &HttpObligationApi,
    dialogs: &dyn DialogHost,
    action: LifecycleAction,
) {
    tracing::info!(endpoint = %action.endpoint(), "submitting lifecycle action");
    let payload = match api.lifecycle(&action).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = %err, "lifecycle action got no response");
            MessagePayload::transport_failure(err.to_string())
        }
    };
    dialogs.open_message(MessageModal::new(payload));
}

async fn submit_once(mut modal: CreateObligationModal, raw: String) -> Result<()> {
    modal.set_amount(raw);
    match modal.create().await? {
        SubmitOutcome::Submitted(_) => Ok(()),
        SubmitOutcome::Invalid(err) => Err(anyhow::anyhow!("amount rejected: {err}")),
    }
}

async fn prompt_and_submit(mut modal: CreateObligationModal) -> Result<()> {
    if !modal.peers().is_empty() {
        let names: Vec<_> = modal.peers().iter().map(ToString::to_string).collect();
        println!("Peers: {}", names.join(", "));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        stdout.write_all(b"Amount to redeem (empty to cancel): ").await?;
        stdout.flush().await?;

        let line = lines.next_line().await.context("failed to read amount")?;
        let raw = match line {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                modal.cancel()?;
                println!("Cancelled.");
                return Ok(());
            }
        };

        modal.set_amount(raw);
        match modal.create().await? {
            SubmitOutcome::Submitted(_) => return Ok(()),
            SubmitOutcome::Invalid(err) => println!("Invalid amount: {err}"),
        }
    }
}
