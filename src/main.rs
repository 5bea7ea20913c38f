use std::io::Write as _;
use std::sync::Arc;

use callsentry::chat::{ChatTransport, HttpChatTransport};
use callsentry::config::{AppConfig, ConfigError};
use callsentry::dashboard::mock::MockCallProvider;
use callsentry::dashboard::{self, CallDataProvider};
use callsentry::llm::{self, screening::ScreeningTransport};
use callsentry::risk::label_band;
use callsentry::services::{AnalysisService, LogSink};
use callsentry::session::{Session, SubmitRejected, TurnOutcome};
use callsentry::types::{RiskAnalysis, Sender};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const MOCK_CALL_SPACING_MINUTES: i64 = 3;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("generative client not configured; set API_KEY or GEMINI_API_KEY")]
    LlmNotConfigured,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("turn task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("unknown call id: {0}")]
    UnknownCall(String),
    #[error("chat backend at {0} is not healthy")]
    Unhealthy(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "callsentry", about = "CallSentry call-screening demo client")]
struct Cli {
    /// Chat backend endpoint; overrides CALLSENTRY_CHAT_ENDPOINT.
    #[arg(long)]
    chat_endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Screen a simulated call: each stdin line is one caller message.
    Chat(ChatArgs),
    /// Print stat cards, call rows and the risk/sentiment series.
    Dashboard(DashboardArgs),
    /// Run the detailed AI analysis for one call.
    Analyze {
        call_id: String,
        #[command(flatten)]
        data: MockDataArgs,
    },
    /// Probe the chat backend's /health route.
    Health,
}

#[derive(Args, Debug)]
struct ChatArgs {
    /// Talk to the generative service directly instead of the chat backend.
    #[arg(long)]
    direct: bool,
    /// Ask the generative service for a risk verdict when the call ends.
    #[arg(long)]
    assess: bool,
    /// Upload the transcript to the log sink when the call ends.
    #[arg(long)]
    upload_log: bool,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    #[command(flatten)]
    data: MockDataArgs,
    /// Emit cards and series as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone, Copy)]
struct MockDataArgs {
    #[arg(long, env = "CALLSENTRY_MOCK_SEED", default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 24)]
    count: usize,
}

impl MockDataArgs {
    fn provider(self) -> MockCallProvider {
        MockCallProvider::seeded(
            self.seed,
            self.count,
            OffsetDateTime::now_utc(),
            Duration::minutes(MOCK_CALL_SPACING_MINUTES),
        )
    }
}

struct CliContext {
    config: AppConfig,
    http: reqwest::Client,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(endpoint) = cli.chat_endpoint {
        config.chat_endpoint = endpoint;
    }
    let http = config.http_client()?;
    let ctx = CliContext { config, http };

    match cli.command {
        Command::Chat(args) => run_chat(&ctx, args).await,
        Command::Dashboard(args) => run_dashboard(args),
        Command::Analyze { call_id, data } => run_analyze(&call_id, data).await,
        Command::Health => run_health(&ctx).await,
    }
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(ctx: &CliContext, args: ChatArgs) -> Result<(), CliError> {
    let llm = llm::client_from_env();
    let screening = if args.direct {
        let llm = llm.clone().ok_or(CliError::LlmNotConfigured)?;
        Some(Arc::new(ScreeningTransport::new(llm)))
    } else {
        None
    };
    let transport: Arc<dyn ChatTransport> = match &screening {
        Some(screening) => screening.clone(),
        None => Arc::new(HttpChatTransport::new(ctx.http.clone(), ctx.config.chat_endpoint.clone())),
    };

    let session = Session::new(transport);
    eprintln!("conversation {} (type 'bye' to hang up)", session.conversation_id());
    print_risk(&session.risk());
    for message in session.messages() {
        print_bot(&message.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().eq_ignore_ascii_case("bye") {
            break;
        }
        let handle = match session.spawn_submit(&line) {
            Ok(handle) => handle,
            Err(SubmitRejected::EmptyInput) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match handle.await? {
            TurnOutcome::Replied { risk } => {
                print_last_bot(&session);
                if let Some(risk) = risk {
                    print_risk(&risk);
                }
            }
            TurnOutcome::Fallback => print_last_bot(&session),
            TurnOutcome::Discarded => break,
        }
    }

    if args.assess {
        let verdict = AnalysisService::new(llm).analyze_conversation(&session.messages()).await;
        println!("assessment: {} ({}) {}", verdict.label, verdict.score, verdict.reasoning);
    }
    if args.upload_log {
        let sink = LogSink::new(ctx.http.clone(), ctx.config.log_endpoint.clone(), ctx.config.secure_origin);
        let uploaded = sink.upload(&session.log_payload()).await;
        eprintln!("log upload to {}: {}", sink.endpoint(), if uploaded { "ok" } else { "skipped" });
    }
    session.close();
    if let Some(screening) = screening {
        screening.forget(session.conversation_id());
    }
    Ok(())
}

fn prompt() -> Result<(), CliError> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_last_bot(session: &Session) {
    if let Some(message) = session
        .messages()
        .into_iter()
        .rev()
        .find(|m| m.sender == Sender::Bot)
    {
        print_bot(&message.text);
    }
}

fn print_bot(text: &str) {
    println!("CallSentry: {text}");
}

fn print_risk(risk: &RiskAnalysis) {
    println!(
        "[{} • RISK: {}% • {}] {}",
        risk.label,
        risk.score,
        label_band(risk.label).as_str(),
        risk.reasoning
    );
}

// =============================================================================
// DASHBOARD
// =============================================================================

fn run_dashboard(args: DashboardArgs) -> Result<(), CliError> {
    let calls = args.data.provider().calls();
    let cards = dashboard::stat_cards(&calls);
    let series = dashboard::risk_series(&calls);

    if args.json {
        let rendered = serde_json::to_string_pretty(&json!({ "cards": cards, "series": series }))?;
        println!("{rendered}");
        return Ok(());
    }

    for card in &cards {
        println!("{:<20} {:>6}  ({:?})", card.title, card.value, card.tone);
    }
    println!();
    println!("{:<10} {:<9} {:>6} {:<10} {:>5} {:<7} anomalies", "call", "agent", "dur", "status", "risk", "band");
    for row in dashboard::call_rows(&calls) {
        let worst = row
            .worst_severity
            .map_or_else(String::new, |s| format!(" (worst: {s:?})"));
        let status = format!("{:?}", row.status);
        println!(
            "{:<10} {:<9} {:>6} {:<10} {:>5} {:<7} {}{}",
            row.id,
            row.agent_id,
            row.duration,
            status,
            row.risk_score,
            row.band.as_str(),
            row.anomaly_count,
            worst
        );
    }
    println!();
    for point in series {
        println!("{}  risk {:>3}  sentiment {:>5.1}", point.time, point.risk, point.sentiment);
    }
    Ok(())
}

// =============================================================================
// ANALYZE / HEALTH
// =============================================================================

async fn run_analyze(call_id: &str, data: MockDataArgs) -> Result<(), CliError> {
    let call = data
        .provider()
        .call(call_id)
        .ok_or_else(|| CliError::UnknownCall(call_id.to_owned()))?;

    let service = AnalysisService::new(llm::client_from_env());
    let analysis = service.analyze_call(&call).await;

    println!("call {} / {}  risk {}/100  anomalies {}", call.id, call.agent_id, call.risk_score, call.anomalies.len());
    println!("summary:        {}", analysis.summary);
    println!("root cause:     {}", analysis.root_cause);
    println!("recommendation: {}", analysis.recommendation);
    println!(
        "compliance:     {}",
        if analysis.compliance_check { "verified" } else { "risk detected" }
    );
    Ok(())
}

async fn run_health(ctx: &CliContext) -> Result<(), CliError> {
    let transport = HttpChatTransport::new(ctx.http.clone(), ctx.config.chat_endpoint.clone());
    if !transport.health().await {
        return Err(CliError::Unhealthy(ctx.config.chat_endpoint.clone()));
    }
    println!("ok");
    Ok(())
}
