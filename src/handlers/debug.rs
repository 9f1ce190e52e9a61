//! Debug endpoints.

use crate::{state::AppState, version};
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// `GET /debug/vars`: the published options, build version and command line.
pub async fn vars(State(state): State<AppState>) -> Json<Value> {
    let cmdline: Vec<String> = std::env::args().collect();

    Json(json!({
        "appOptions": state.published.as_ref(),
        "version": version::info(),
        "cmdline": cmdline,
    }))
}
