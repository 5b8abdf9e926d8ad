//! Request proxy for browser clients that must not hold the model API key.
//!
//! - `POST /api/generate-schedule` `{userInput, personality?}` -> `{tasks}`
//! - `POST /api/generate-summary` `{completionRate, totalTasks, completedTasks, personality?}` -> `{summary}`
//! - `GET  /health`
//!
//! Build with `--features server`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use p2j_core::{NewTask, Personality, SummaryRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::llm::LlmClient;
use crate::setup::parse_personality;

struct ServerState {
    client: LlmClient,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleBody {
    user_input: Option<String>,
    personality: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryBody {
    completion_rate: Option<f64>,
    total_tasks: Option<usize>,
    completed_tasks: Option<usize>,
    personality: Option<String>,
}

#[derive(Serialize)]
struct ScheduleResponse {
    tasks: Vec<NewTask>,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

// Unknown or absent personalities get the default voice.
fn personality_or_default(p: Option<&str>) -> Personality {
    p.and_then(|s| parse_personality(s).ok()).unwrap_or_default()
}

fn error_body(status: StatusCode, msg: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": msg })))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn generate_schedule(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<ScheduleBody>,
) -> Result<Json<ScheduleResponse>, (StatusCode, Json<Value>)> {
    let Some(input) = body.user_input.filter(|s| !s.trim().is_empty()) else {
        return Err(error_body(StatusCode::BAD_REQUEST, "Missing userInput"));
    };
    let personality = personality_or_default(body.personality.as_deref());
    let today = Utc::now().date_naive();

    match state.client.generate_schedule(&input, personality, today).await {
        Ok(tasks) => Ok(Json(ScheduleResponse { tasks })),
        Err(e) => {
            error!(error = %e, "schedule generation failed");
            Err(error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to generate schedule",
            ))
        }
    }
}

async fn generate_summary(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<SummaryBody>,
) -> Result<Json<SummaryResponse>, (StatusCode, Json<Value>)> {
    let (Some(completion_rate), Some(total_tasks), Some(completed_tasks)) =
        (body.completion_rate, body.total_tasks, body.completed_tasks)
    else {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "Missing required parameters",
        ));
    };
    let req = SummaryRequest {
        completion_rate,
        total_tasks,
        completed_tasks,
        personality: personality_or_default(body.personality.as_deref()),
    };
    let summary = state.client.generate_summary(&req).await;
    Ok(Json(SummaryResponse { summary }))
}

fn router(client: LlmClient) -> Router {
    let state = Arc::new(ServerState { client });
    Router::new()
        .route("/health", get(health))
        .route("/api/generate-schedule", post(generate_schedule))
        .route("/api/generate-summary", post(generate_summary))
        .with_state(state)
}

pub async fn serve(client: LlmClient, addr: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, "proxy listening");
    println!("Listening on http://{addr}");
    axum::serve(listener, router(client))
        .await
        .context("proxy server")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmSection;

    fn state() -> Arc<ServerState> {
        // Unroutable endpoint: any test that reaches the network fails fast.
        let section = LlmSection {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".into(),
            ..LlmSection::default()
        };
        Arc::new(ServerState {
            client: LlmClient::new(section, "sk-test".into()),
        })
    }

    #[tokio::test]
    async fn schedule_requires_user_input() {
        let err = generate_schedule(State(state()), Json(ScheduleBody::default()))
            .await
            .err()
            .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1.0, json!({ "error": "Missing userInput" }));
    }

    #[tokio::test]
    async fn schedule_upstream_failure_is_500() {
        let body = ScheduleBody {
            user_input: Some("learn piano".into()),
            personality: Some("savage".into()),
        };
        let err = generate_schedule(State(state()), Json(body)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.1.0, json!({ "error": "Failed to generate schedule" }));
    }

    #[tokio::test]
    async fn summary_requires_all_counts() {
        let body = SummaryBody {
            completion_rate: Some(50.0),
            total_tasks: Some(4),
            ..SummaryBody::default()
        };
        let err = generate_summary(State(state()), Json(body)).await.err().unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert_eq!(err.1.0, json!({ "error": "Missing required parameters" }));
    }

    #[tokio::test]
    async fn summary_upstream_failure_falls_back() {
        let body = SummaryBody {
            completion_rate: Some(50.0),
            total_tasks: Some(4),
            completed_tasks: Some(2),
            personality: Some("nonsense".into()),
        };
        let Json(resp) = generate_summary(State(state()), Json(body)).await.unwrap();
        assert_eq!(resp.summary, p2j_core::FALLBACK_SUMMARY);
    }

    #[test]
    fn unknown_personality_defaults_to_warm() {
        assert_eq!(personality_or_default(Some("savage")), Personality::Savage);
        assert_eq!(personality_or_default(Some("???")), Personality::Warm);
        assert_eq!(personality_or_default(None), Personality::Warm);
    }
}
