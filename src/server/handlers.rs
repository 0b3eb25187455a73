use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::state::AppState;
use crate::application::{AddOutcome, ServiceStatus, SourceOutcome, ViewQuery};
use crate::domain::fees::TokenDetails;
use crate::domain::ranking::{SortDirection, SortField, View};
use crate::domain::token::Token;

#[derive(Debug, Default, Deserialize)]
pub struct TokensParams {
    pub view: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub q: Option<String>,
}

impl TokensParams {
    fn into_query(self) -> Result<ViewQuery, ApiError> {
        Ok(ViewQuery {
            view: non_empty(self.view)
                .map(|v| v.parse::<View>())
                .transpose()?
                .unwrap_or_default(),
            sort: non_empty(self.sort)
                .map(|s| s.parse::<SortField>())
                .transpose()?,
            direction: non_empty(self.direction)
                .map(|d| d.parse::<SortDirection>())
                .transpose()?,
            search: non_empty(self.q),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensResponse {
    pub view: String,
    pub sort: String,
    pub direction: String,
    pub count: usize,
    pub tokens: Vec<Token>,
}

/// Addresses as a JSON array or one comma/whitespace separated string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddressInput {
    List(Vec<String>),
    Joined(String),
}

impl AddressInput {
    pub fn into_addresses(self) -> Vec<String> {
        match self {
            AddressInput::List(list) => list,
            AddressInput::Joined(joined) => joined
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddTokensRequest {
    pub addresses: AddressInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub count: usize,
    pub candidates: usize,
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<SourceOutcome>,
}

pub async fn list_tokens(
    State(state): State<AppState>,
    Query(params): Query<TokensParams>,
) -> Result<Json<TokensResponse>, ApiError> {
    let query = params.into_query()?;
    let tokens = state.discovery.ranked_view(&query).await?;

    Ok(Json(TokensResponse {
        view: query.view.to_string(),
        sort: query.sort_field().to_string(),
        direction: query.sort_direction().to_string(),
        count: tokens.len(),
        tokens,
    }))
}

pub async fn add_tokens(
    State(state): State<AppState>,
    Json(request): Json<AddTokensRequest>,
) -> Result<Json<AddOutcome>, ApiError> {
    let addresses = request.addresses.into_addresses();
    if addresses.iter().all(|a| a.trim().is_empty()) {
        return Err(ApiError::BadRequest("No addresses provided".to_string()));
    }

    let outcome = state.discovery.add_addresses(&addresses).await?;
    if outcome.accepted.is_empty() {
        let reasons: Vec<String> = outcome
            .rejected
            .iter()
            .map(|r| format!("{} ({})", r.address, r.reason))
            .collect();
        return Err(ApiError::BadRequest(format!(
            "No valid addresses: {}",
            reasons.join(", ")
        )));
    }
    Ok(Json(outcome))
}

pub async fn refresh_tokens(State(state): State<AppState>) -> Json<RefreshResponse> {
    let report = state.discovery.refresh().await;
    Json(RefreshResponse {
        count: report.tokens.len(),
        candidates: report.candidates,
        generated_at: report.generated_at,
        outcomes: report.outcomes.clone(),
    })
}

pub async fn token_details(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<TokenDetails>, ApiError> {
    let details = state.discovery.token_details(&address).await?;
    Ok(Json(details))
}

pub async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.discovery.status().await)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
