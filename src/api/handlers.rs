//! HTTP request handlers
//!
//! The ladder service is synchronous and may wait on locks or write a
//! snapshot file, so handlers run it on the blocking thread pool.

use crate::error::LadderError;
use crate::rules::{Locale, RuleViolation};
use crate::service::app::AppState;
use crate::service::health::{HealthCheck, HealthStatus};
use crate::service::LadderService;
use crate::types::{MatchInput, MatchRequest, PlayerId, SetScore};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error};

/// Ladder error rendered as `{"error": "..."}` in the configured language
#[derive(Debug)]
pub struct ApiError {
    error: LadderError,
    locale: Locale,
}

impl ApiError {
    pub fn new(error: LadderError, locale: Locale) -> Self {
        Self { error, locale }
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.error {
            LadderError::PlayerNotFound { .. } => StatusCode::NOT_FOUND,
            LadderError::DuplicatePlayerName { .. } => StatusCode::CONFLICT,
            error if error.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.error);
        }

        (
            status,
            Json(json!({ "error": self.error.localized(self.locale) })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run a ladder operation on the blocking pool
async fn with_ladder<T, F>(state: &AppState, operation: F) -> ApiResult<T>
where
    F: FnOnce(&LadderService) -> std::result::Result<T, LadderError> + Send + 'static,
    T: Send + 'static,
{
    let locale = state.config().service.locale;
    let ladder = state.ladder();

    tokio::task::spawn_blocking(move || operation(ladder.as_ref()))
        .await
        .map_err(|e| LadderError::InternalError {
            message: format!("Ladder task failed: {}", e),
        })
        .and_then(|result| result)
        .map_err(|error| ApiError::new(error, locale))
}

/// Unwrap a JSON body, reporting a malformed one as a ladder error
fn json_body<T>(
    state: &AppState,
    body: std::result::Result<Json<T>, JsonRejection>,
) -> ApiResult<T> {
    body.map(|Json(body)| body).map_err(|rejection| {
        ApiError::new(
            LadderError::InvalidRequest {
                message: rejection.body_text(),
            },
            state.config().service.locale,
        )
    })
}

/// Integer value of a JSON number; integral floats such as `11.0` count
fn json_integer(value: &Value) -> Option<i64> {
    let Value::Number(number) = value else {
        return None;
    };

    number.as_i64().or_else(|| {
        number
            .as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| n as i64)
    })
}

/// Body of `POST /players`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlayerBody {
    pub name: String,
}

/// One set as sent by a client. Points stay raw JSON so that non-integer
/// scores are reported by the scoring rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetScoreBody {
    pub score1: Value,
    pub score2: Value,
}

impl SetScoreBody {
    fn to_set_score(&self) -> Option<SetScore> {
        Some(SetScore::new(
            json_integer(&self.score1)?,
            json_integer(&self.score2)?,
        ))
    }
}

/// Body of `POST /matches`
///
/// Accepts either a list of set scores, a single set score for best-of-1
/// matches, or both aggregate set counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterMatchBody {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    #[serde(default)]
    pub match_format: Value,
    #[serde(default)]
    pub set_scores: Option<Vec<SetScoreBody>>,
    #[serde(default)]
    pub set_score: Option<SetScoreBody>,
    #[serde(default)]
    pub sets_won1: Option<Value>,
    #[serde(default)]
    pub sets_won2: Option<Value>,
}

impl RegisterMatchBody {
    /// Turn the body into a match request, picking the input encoding
    pub fn into_request(self) -> std::result::Result<MatchRequest, LadderError> {
        let match_format = json_integer(&self.match_format)
            .and_then(|format| u32::try_from(format).ok())
            .ok_or_else(|| LadderError::InvalidRequest {
                message: format!("match_format must be 1, 3 or 5, got {}", self.match_format),
            })?;

        let input = match (self.set_scores, self.set_score, self.sets_won1, self.sets_won2) {
            (Some(set_scores), _, _, _) => MatchInput::PerSetScores {
                set_scores: parse_sets(&set_scores)?,
            },
            (None, Some(set_score), _, _) => MatchInput::PerSetScores {
                set_scores: parse_sets(std::slice::from_ref(&set_score))?,
            },
            (None, None, Some(sets_won1), Some(sets_won2)) => {
                match (json_integer(&sets_won1), json_integer(&sets_won2)) {
                    (Some(sets_won1), Some(sets_won2)) => MatchInput::AggregateCounts {
                        sets_won1,
                        sets_won2,
                    },
                    _ => return Err(RuleViolation::NonIntegerSetCount.into()),
                }
            }
            _ => return Err(LadderError::MissingSetResult),
        };

        Ok(MatchRequest {
            player1_id: self.player1_id,
            player2_id: self.player2_id,
            match_format,
            input,
        })
    }
}

/// Integer set scores, or the first set holding a non-integer score
fn parse_sets(sets: &[SetScoreBody]) -> std::result::Result<Vec<SetScore>, RuleViolation> {
    sets.iter()
        .enumerate()
        .map(|(index, set)| {
            set.to_set_score().ok_or_else(|| RuleViolation::InvalidSet {
                set: index + 1,
                reason: Box::new(RuleViolation::NonIntegerScore),
            })
        })
        .collect()
}

/// Root endpoint handler - shows service information
pub async fn root_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "service": state.config().service.name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/health",
            "/live",
            "/ready",
            "/metrics",
            "/players",
            "/players/{id}",
            "/players/{id}/matches",
            "/leaderboard",
            "/matches",
            "/matches/recent"
        ]
    }))
}

/// Health check endpoint handler
pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    match HealthCheck::check(state.clone()).await {
        Ok(health) => {
            state
                .metrics_collector()
                .update_health_status(health.status.as_gauge());

            let status = match health.status {
                HealthStatus::Healthy => StatusCode::OK,
                HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
            };
            (status, Json(json!(health)))
        }
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": state.config().service.name,
                    "version": env!("CARGO_PKG_VERSION")
                })),
            )
        }
    }
}

/// Liveness check endpoint handler
pub async fn live_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match HealthCheck::liveness_check(state).await {
        HealthStatus::Healthy => (StatusCode::OK, "Alive"),
        HealthStatus::Unhealthy => (StatusCode::SERVICE_UNAVAILABLE, "Stopped"),
    }
}

/// Readiness check endpoint handler
pub async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match HealthCheck::readiness_check(state).await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "Ready"),
        Ok(HealthStatus::Unhealthy) => (StatusCode::SERVICE_UNAVAILABLE, "Not ready"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Not ready")
        }
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let collector = state.metrics_collector();
    collector.update_uptime(state.uptime());

    let metric_families = collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => {
            debug!("Serving {} metric families", metric_families.len());
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                metrics_output,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

/// `GET /players`
pub async fn list_players(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let players = with_ladder(&state, |ladder| ladder.players_by_name()).await?;
    Ok(Json(players))
}

/// `POST /players`
pub async fn create_player(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CreatePlayerBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let body = json_body(&state, body)?;
    let player = with_ladder(&state, move |ladder| ladder.register_player(&body.name)).await?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// `GET /players/{id}`
pub async fn player_profile(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<impl IntoResponse> {
    let profile = with_ladder(&state, move |ladder| ladder.player_profile(player_id)).await?;
    Ok(Json(profile))
}

/// `GET /players/{id}/matches`
pub async fn player_matches(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<PlayerId>,
) -> ApiResult<impl IntoResponse> {
    let matches = with_ladder(&state, move |ladder| ladder.player_matches(player_id)).await?;
    Ok(Json(matches))
}

/// `GET /leaderboard`
pub async fn leaderboard(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let players = with_ladder(&state, |ladder| ladder.leaderboard()).await?;
    Ok(Json(players))
}

/// `GET /matches/recent`
pub async fn recent_matches(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let matches = with_ladder(&state, |ladder| ladder.recent_matches()).await?;
    Ok(Json(matches))
}

/// `POST /matches`
pub async fn register_match(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<RegisterMatchBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = json_body(&state, body)?
        .into_request()
        .map_err(|error| ApiError::new(error, state.config().service.locale))?;
    let outcome = with_ladder(&state, move |ladder| ladder.register_match(request)).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
