//! HTTP server wiring the exchange pipeline together.
//!
//! Inbound mention events arrive on `POST /events` and are acknowledged
//! immediately; the exchange runs on a spawned task so the chat surface
//! never waits on model or tool latency.

mod config;
mod transport;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use config::ServerConfig;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use threadrelay_ai::{MessagesClient, ModelConfig};
use threadrelay_conversation::HistoryStore;
use threadrelay_exchange::{ExchangeConfig, Orchestrator};
use threadrelay_tools::{QueryTool, ToolDispatcher, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

/// One inbound mention event from the chat surface.
#[derive(Debug, Deserialize)]
struct ChatEvent {
    channel: String,
    ts: String,
    #[serde(default)]
    thread_ts: Option<String>,
    text: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!("Loaded configuration");

    let mut model_config = ModelConfig::new(&config.model.api_key, &config.model.name)
        .with_base_url(&config.model.base_url)
        .with_max_tokens(config.model.max_tokens)
        .with_timeout(Duration::from_secs(config.model.timeout_seconds));
    if let Some(prompt) = &config.model.system_prompt {
        model_config = model_config.with_system_prompt(prompt);
    }
    let model = MessagesClient::new(model_config).expect("failed to build model client");

    let mut registry = ToolRegistry::new();
    let tool_timeout = Duration::from_secs(config.toolbox.timeout_seconds);
    if let Some(toolbox_url) = &config.toolbox.base_url {
        let query_tool =
            QueryTool::new(toolbox_url, tool_timeout).expect("failed to build query tool");
        registry.register(Arc::new(query_tool));
        tracing::info!(%toolbox_url, "registered warehouse query tool");
    } else {
        tracing::info!("no toolbox configured; running without tools");
    }
    let dispatcher = ToolDispatcher::new(Arc::new(registry), tool_timeout);

    let chat_transport = transport::WebhookTransport::new(
        &config.chat.post_url,
        config.chat.history_url.clone(),
        Duration::from_secs(30),
    )
    .expect("failed to build chat transport");

    let history = Arc::new(HistoryStore::new(config.exchange.history_cap));
    let exchange_config = ExchangeConfig {
        max_tool_rounds: config.exchange.max_tool_rounds,
        history_fetch_limit: config.exchange.history_fetch_limit,
        max_lines_per_group: config.exchange.max_lines_per_group,
        placeholder: config.exchange.placeholder.clone(),
        ..ExchangeConfig::default()
    };
    let orchestrator = Arc::new(Orchestrator::new(
        history,
        Arc::new(model),
        dispatcher,
        Arc::new(chat_transport),
        exchange_config,
    ));

    let app = Router::new()
        .route("/events", post(handle_event))
        .route("/health", get(health))
        .with_state(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}

/// Acknowledges the event immediately and runs the exchange detached.
async fn handle_event(State(state): State<AppState>, Json(event): Json<ChatEvent>) -> StatusCode {
    let thread_root_ts = event.thread_ts.unwrap_or(event.ts);
    tokio::spawn(async move {
        if let Err(error) = state
            .orchestrator
            .handle_event(&event.channel, &thread_root_ts, &event.text)
            .await
        {
            tracing::error!(channel = %event.channel, %error, "exchange failed");
        }
    });
    StatusCode::ACCEPTED
}

async fn health() -> StatusCode {
    StatusCode::OK
}
