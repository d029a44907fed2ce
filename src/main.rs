use std::io;
use std::sync::Arc;

use chatwidget::adapter::{self, Input, UiEvent, parse_input};
use chatwidget::api::{ApiClient, ApiError};
use chatwidget::bot::LocalBot;
use chatwidget::config::{ConfigError, WidgetConfig};
use chatwidget::controller::ChatWidgetController;
use chatwidget::payment::{self, PayTarget};
use chatwidget::transport::{FRAME_CHANNEL_CAPACITY, TransportError, Transport, ws};
use chatwidget::view::TerminalView;
use clap::{Parser, Subcommand};
use frames::{Frame, syscall};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

const UI_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[derive(Parser, Debug)]
#[command(name = "chatwidget", about = "Terminal chat widget with payment-gated lock")]
struct Cli {
    #[arg(long, env = "CHAT_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    #[arg(long, env = "CHAT_SESSION_TOKEN")]
    session_token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with a local bot; no server needed.
    Local,
    /// Join the chat server over websocket.
    Connect,
    Ping,
    PaymentStatus,
    Verify {
        reference: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = WidgetConfig::from_env()?;
    let token = cli.session_token.as_deref();

    match cli.command {
        Command::Local => run_local(config).await,
        Command::Connect => run_connect(&cli.base_url, token, config).await,
        Command::Ping => {
            ApiClient::new(&cli.base_url, token)?.ping().await?;
            println!("ok");
            Ok(())
        }
        Command::PaymentStatus => {
            let report = ApiClient::new(&cli.base_url, token)?.payment_report().await?;
            println!(
                "{}: session={} db={} paid={}",
                report.username,
                report.paid_in_session,
                report.paid_in_db,
                report.paid()
            );
            Ok(())
        }
        Command::Verify { reference } => {
            let status = ApiClient::new(&cli.base_url, token)?.verify_payment(&reference).await?;
            println!("{}", status.as_str());
            Ok(())
        }
    }
}

async fn run_local(config: WidgetConfig) -> Result<(), CliError> {
    let (inbound_tx, inbound_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
    let bot = LocalBot::new(inbound_tx.clone(), config.bot_delay);
    // The bot stands in for the server, so lock requests are always allowed.
    let config = WidgetConfig { is_admin: true, ..config };

    let client_id = Uuid::new_v4().to_string();
    let connected = Frame::request(
        syscall::SESSION_CONNECTED,
        serde_json::json!({ "client_id": client_id, "username": config.username }),
    );
    inbound_tx.send(connected).await.map_err(|_| TransportError::Closed)?;

    info!(%client_id, "local session started");
    drive(bot, config, inbound_tx, inbound_rx, PayTarget::Local).await;
    Ok(())
}

async fn run_connect(base_url: &str, token: Option<&str>, config: WidgetConfig) -> Result<(), CliError> {
    let api = Arc::new(ApiClient::new(base_url, token)?);
    let (inbound_tx, inbound_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

    let url = ws::ws_url(base_url)?;
    let (transport, _tasks) = ws::connect(&url, token, inbound_tx.clone()).await?;
    info!(%url, "connected");

    // Unpaid sessions start locked; paid ones are marked paid up front.
    match api.payment_report().await {
        Ok(report) => {
            if let Some(frame) = payment::report_frame(&report, config.is_admin) {
                let _ = inbound_tx.send(frame).await;
            }
        }
        Err(e) => warn!(error = %e, "payment status check failed"),
    }

    drive(transport, config, inbound_tx, inbound_rx, PayTarget::Server(api)).await;
    Ok(())
}

async fn drive<T: Transport>(
    transport: T,
    config: WidgetConfig,
    inbound_tx: mpsc::Sender<Frame>,
    inbound_rx: mpsc::Receiver<Frame>,
    pay: PayTarget,
) {
    let mut controller = ChatWidgetController::new(TerminalView::new(io::stdout()), transport, config);
    let (ui_tx, ui_rx) = mpsc::channel(UI_CHANNEL_CAPACITY);
    let stdin = spawn_stdin_reader(ui_tx, inbound_tx, pay);

    adapter::run(&mut controller, ui_rx, inbound_rx).await;
    stdin.abort();
}

/// Read stdin lines into UI events. `/pay` is resolved here and lands on the
/// inbound channel as a `payment:status` frame.
fn spawn_stdin_reader(ui_tx: mpsc::Sender<UiEvent>, inbound_tx: mpsc::Sender<Frame>, pay: PayTarget) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            };
            match parse_input(&line) {
                Input::Event(event) => {
                    if ui_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Input::Pay(reference) => submit_payment(&pay, reference, inbound_tx.clone()),
            }
        }
    })
}

fn submit_payment(pay: &PayTarget, reference: String, inbound_tx: mpsc::Sender<Frame>) {
    let pay = pay.clone();
    tokio::spawn(async move {
        let frame = pay.resolve(&reference).await;
        let _ = inbound_tx.send(frame).await;
    });
}
