//! Development server with live reload and the contact endpoint

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::contact::{
    ContactFields, ContactForm, Relay, SubmissionState, SubmitAttempt, Web3FormsRelay,
};
use crate::generator::CONTACT_ACTION;
use crate::helpers::url_for;
use crate::{Folio, CONFIG_FILE};

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function () {
  var ws = new WebSocket('ws://' + location.host + '/__livereload');
  ws.onmessage = function (msg) {
    if (msg.data === 'reload') location.reload();
  };
  ws.onclose = function () {
    setTimeout(function () { location.reload(); }, 1000);
  };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    public_dir: PathBuf,
    /// Site root with a trailing slash, stripped from request paths
    root: String,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
    from_name: String,
    relay: Arc<dyn Relay>,
}

/// Start the development server
pub async fn start(folio: &Folio, ip: &str, port: u16, watch: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);
    let relay = Arc::new(Web3FormsRelay::from_config(&folio.config.contact));
    if !relay.is_configured() {
        tracing::warn!("Contact relay has no access key; submissions will fail");
    }

    let app = router(folio, relay, reload_tx.clone(), watch);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}{}", ip, port, folio.config.root);
    if watch {
        println!("Live reload enabled. Watching for changes...");

        let folio = folio.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(folio, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router
fn router(
    folio: &Folio,
    relay: Arc<dyn Relay>,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
) -> Router {
    let state = Arc::new(ServerState {
        public_dir: folio.public_dir.clone(),
        root: format!("{}/", folio.config.root.trim_end_matches('/')),
        reload_tx,
        live_reload,
        from_name: folio.config.contact.from_name.clone(),
        relay,
    });

    Router::new()
        .route("/__livereload", get(livereload_handler))
        .route(
            &url_for(&folio.config, CONTACT_ACTION),
            post(contact_handler),
        )
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Watch the site sources and regenerate on change. Blocks the calling thread.
fn watch_and_reload(folio: Folio, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if folio.source_dir.exists() {
        debouncer
            .watcher()
            .watch(&folio.source_dir, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", folio.source_dir);
    }

    let config_path = folio.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    for result in rx {
        match result {
            Ok(events) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path = e.path.to_string_lossy();
                        !path.contains(".git") && !path.contains(".DS_Store") && !path.ends_with('~')
                    })
                    .collect();
                if changed.is_empty() {
                    continue;
                }

                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match crate::commands::generate::reload(&folio).and_then(|f| f.generate()) {
                    Ok(()) => {
                        tracing::info!("Regenerated successfully");
                        // no receivers just means no open pages
                        let _ = reload_tx.send(());
                    }
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Validate a posted form and relay it
async fn contact_handler(
    State(state): State<Arc<ServerState>>,
    Json(fields): Json<ContactFields>,
) -> Response {
    let mut form = ContactForm::with_fields(state.from_name.clone(), fields);

    match form.begin_submit() {
        // Bots get the same answer as an untouched form
        SubmitAttempt::Ignored => (StatusCode::OK, Json(form.state().clone())).into_response(),
        SubmitAttempt::Invalid(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "state": "idle", "errors": errors })),
        )
            .into_response(),
        SubmitAttempt::Busy => (StatusCode::CONFLICT, Json(form.state().clone())).into_response(),
        SubmitAttempt::Ready(pending) => {
            let result = state.relay.send(&pending.message).await;
            form.finish(pending, result);

            let status = match form.state() {
                SubmissionState::Succeeded => StatusCode::OK,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Json(form.state().clone())).into_response()
        }
    }
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(()) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve generated files, falling back to `404.html`
async fn fallback_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let path = request.uri().path();
    let relative = path
        .strip_prefix(state.root.as_str())
        .unwrap_or(path)
        .trim_start_matches('/')
        .to_string();
    if !is_within_public_dir(Path::new(&relative)) {
        tracing::warn!("Refusing to serve {:?}", path);
        return not_found(&state).await;
    }

    let candidate = state.public_dir.join(&relative);
    let file_path = if candidate.is_dir() {
        candidate.join("index.html")
    } else {
        candidate
    };

    if !file_path.is_file() {
        return not_found(&state).await;
    }

    let is_html = file_path
        .extension()
        .map(|ext| ext == "html" || ext == "htm")
        .unwrap_or(false);

    if is_html && state.live_reload {
        return match tokio::fs::read_to_string(&file_path).await {
            Ok(content) => Html(inject_live_reload(&content)).into_response(),
            Err(_) => not_found(&state).await,
        };
    }

    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    let (mut parts, body) = request.into_parts();
    // ServeDir resolves against the public dir, so drop the site root
    if let Ok(uri) = format!("/{}", relative).parse() {
        parts.uri = uri;
    }
    match service.try_call(Request::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn not_found(state: &ServerState) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(content) => {
            let content = if state.live_reload {
                inject_live_reload(&content)
            } else {
                content
            };
            (StatusCode::NOT_FOUND, Html(content)).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// A request path may only name entries below the public dir
fn is_within_public_dir(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", LIVE_RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}
