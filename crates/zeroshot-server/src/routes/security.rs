//! Security matrix lookups.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroshot_core::RiskLevel;

use crate::error::{ApiJson, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LevelRequest {
    pub category: String,
    pub security_level: String,
}

#[derive(Debug, Serialize)]
pub struct LevelResponse {
    pub category: String,
    pub security_level: &'static str,
    pub level_value: i64,
}

pub async fn level(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LevelRequest>,
) -> ApiResult<Json<LevelResponse>> {
    let (level, level_value) = state
        .catalog
        .security
        .lookup(&req.category, &req.security_level)?;
    debug!(category = %req.category, %level, level_value, "security lookup");
    Ok(Json(LevelResponse {
        category: req.category.trim().to_string(),
        security_level: level.as_str(),
        level_value,
    }))
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

pub async fn categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: state
            .catalog
            .security
            .categories()
            .map(str::to_string)
            .collect(),
    })
}

#[derive(Debug, Serialize)]
pub struct LevelsResponse {
    pub levels: Vec<&'static str>,
}

pub async fn levels() -> Json<LevelsResponse> {
    Json(LevelsResponse {
        levels: RiskLevel::ALL.iter().map(RiskLevel::as_str).collect(),
    })
}
