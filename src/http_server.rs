use crate::dispatch::{self, Route};
use crate::filter::{self, Decision, ResponseTable, Trigger};
use crate::sender::Notifier;
use crate::types::{AlertPayload, OutboundMessage};
use crate::verification::{WebhookSigner, OUTBOUND_TOKEN_HEADER};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

pub const LIVENESS_TEXT: &str = "IBM Watson Workspace Integration for NewRelic is alive and happy!";

/// Shared, read-only handler state. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    signer: WebhookSigner,
    trigger: Arc<Trigger>,
    responses: Arc<ResponseTable>,
    notifier: Arc<dyn Notifier>,
    halt_on_auth_failure: bool,
    shutdown: Arc<Notify>,
}

impl AppState {
    pub fn new(
        signer: WebhookSigner,
        trigger: Trigger,
        responses: ResponseTable,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            signer,
            trigger: Arc::new(trigger),
            responses: Arc::new(responses),
            notifier,
            halt_on_auth_failure: false,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Stop the server when a send fails to authenticate.
    pub fn halt_on_auth_failure(mut self, halt: bool) -> Self {
        self.halt_on_auth_failure = halt;
        self
    }

    /// Notified when a background send asks the server to stop.
    pub fn shutdown_requested(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Hand a message to the notifier without blocking the caller's response.
    fn deliver(&self, message: OutboundMessage, span: Span) {
        let notifier = self.notifier.clone();
        let shutdown = self.shutdown.clone();
        let halt = self.halt_on_auth_failure;

        tokio::spawn(
            async move {
                let space_id = message.space_id.clone();
                if let Err(e) = notifier.send(message).await {
                    error!(%space_id, error = %e, "failed to deliver message");
                    if e.is_auth() && halt {
                        error!("cannot authenticate with Workspace; shutting down");
                        shutdown.notify_one();
                    }
                }
            }
            .instrument(span),
        );
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/webhook", post(handle_webhook))
        .route("/alert/{space_id}", post(handle_alert))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C/SIGTERM or until a send requests shutdown.
/// In-flight deliveries are dropped with the runtime.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let halt = state.shutdown_requested();
    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = shutdown_signal() => info!("received shutdown signal"),
                _ = halt.notified() => warn!("shutdown requested after authentication failure"),
            }
        })
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn liveness() -> &'static str {
    LIVENESS_TEXT
}

async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let span = info_span!("webhook", delivery_id = %Uuid::new_v4());
    span.in_scope(|| process_webhook(&state, &body, &span))
}

fn process_webhook(state: &AppState, body: &[u8], span: &Span) -> Response {
    match dispatch::classify(body) {
        Route::Verify { challenge } => {
            info!("answering verification challenge");
            let signed = state.signer.answer(&challenge);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE.as_str(), "application/json".to_string()),
                    (OUTBOUND_TOKEN_HEADER, signed.token),
                ],
                signed.body,
            )
                .into_response()
        }
        Route::Message(event) => {
            // Acknowledge first; the reply goes out on its own task.
            match filter::reply_for(
                &event,
                &state.trigger,
                &state.responses,
                &mut rand::thread_rng(),
            ) {
                Decision::Reply(reply) => {
                    info!(space_id = %event.space_id, "trigger matched; replying");
                    state.deliver(reply, span.clone());
                }
                Decision::NoResponses => warn!("trigger matched but the response table is empty"),
                Decision::NotTriggered => debug!("message ignored"),
            }
            StatusCode::OK.into_response()
        }
        Route::Ignore => {
            debug!("event ignored");
            StatusCode::OK.into_response()
        }
    }
}

async fn handle_alert(
    Path(space_id): Path<String>,
    State(state): State<AppState>,
    body: Bytes,
) -> StatusCode {
    let span = info_span!("alert", delivery_id = %Uuid::new_v4(), %space_id);
    span.in_scope(|| process_alert(&state, space_id, &body, &span))
}

fn process_alert(state: &AppState, space_id: String, body: &[u8], span: &Span) -> StatusCode {
    debug!(body = %String::from_utf8_lossy(body), "alert received");

    let alert: AlertPayload = match serde_json::from_slice(body) {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "unparsable alert payload; ignoring");
            return StatusCode::OK;
        }
    };

    let message = alert.into_message(space_id);
    info!(title = %message.title, "forwarding alert");
    state.deliver(message, span.clone());

    StatusCode::OK
}
