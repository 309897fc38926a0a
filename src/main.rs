use std::path::Path;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use ava_companion::channels::{chat_routes, run_repl};
use ava_companion::companion::Companion;
use ava_companion::config::Settings;
use ava_companion::graph::helpers::HostedBackends;
use ava_companion::graph::{RunContext, workflow_graph};
use ava_companion::memory::MemoryManager;
use ava_companion::store::LibSqlBackend;

/// Stderr logging, plus a daily rolling file when `log_dir` is set.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "ava-companion.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let file = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(file)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Arc::new(Settings::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }));

    let _log_guard = init_tracing(settings.log_dir.as_deref());

    eprintln!("Ava Companion v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", settings.text_model_name);
    eprintln!("   Database: {}", settings.db_path.display());
    eprintln!("   Chat API: http://0.0.0.0:{}/api/chat", settings.http_port);
    eprintln!("   Type a message and press Enter. /quit to exit.\n");

    let graph = workflow_graph()?;

    let db = Arc::new(LibSqlBackend::new_local(&settings.db_path).await?);
    let memory = Arc::new(MemoryManager::new(db.clone(), settings.memory_top_k));
    let backends = Arc::new(HostedBackends::new(Arc::clone(&settings)));
    let ctx = RunContext::new(Arc::clone(&settings), backends, memory);
    let companion = Arc::new(Companion::new(graph, ctx, db));

    let app = chat_routes(Arc::clone(&companion)).layer(CorsLayer::permissive());
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.http_port)).await?;
    tracing::info!(port = settings.http_port, "Chat API server started");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Chat API server stopped");
        }
    });

    run_repl(companion).await;
    Ok(())
}
