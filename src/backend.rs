use anyhow::{Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::debounce::SearchQuery;
use crate::http_client::{get_text, http_client};
use crate::projection::SEASON_COUNT;
use crate::state::{MAX_SUGGESTIONS, PlayerRecord, PlayerSuggestion, SeasonForecast};

pub fn fetch_player_suggestions(
    config: &Config,
    query: &SearchQuery,
) -> Result<Vec<PlayerSuggestion>> {
    let client = http_client(config)?;
    let url = format!("{}/searchPlayers", config.backend_url);
    let req = client.get(&url).query(&[("name", query.as_str())]);
    let body = get_text(req).context("player search request failed")?;
    let records = parse_search_json(&body)?;
    Ok(suggestions_from_records(records))
}

pub fn fetch_forecast(config: &Config, player_id: &str) -> Result<Vec<SeasonForecast>> {
    let client = http_client(config)?;
    let url = forecast_url(&config.backend_url, player_id)?;
    let body = get_text(client.get(url)).context("prediction request failed")?;
    parse_forecast_json(&body)
}

/// `{backend}/predictPlayer/<id>` with the id escaped as a single path segment.
pub fn forecast_url(backend_url: &str, player_id: &str) -> Result<Url> {
    let mut url = Url::parse(backend_url).context("invalid backend url")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("backend url cannot carry a path"))?
        .pop_if_empty()
        .push("predictPlayer")
        .push(player_id);
    Ok(url)
}

/// The search endpoint answers with a bare array. `null` or an empty body is an
/// empty result; anything else that isn't an array is malformed.
pub fn parse_search_json(raw: &str) -> Result<Vec<PlayerRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let root: Value = serde_json::from_str(trimmed).context("invalid searchPlayers json")?;
    match root {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter(Value::is_object)
            .map(PlayerRecord::new)
            .collect()),
        _ => Err(anyhow::anyhow!("searchPlayers did not return an array")),
    }
}

/// First [`MAX_SUGGESTIONS`] records, backend order kept.
pub fn suggestions_from_records(records: Vec<PlayerRecord>) -> Vec<PlayerSuggestion> {
    records
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(PlayerSuggestion::from_record)
        .collect()
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    #[serde(rename = "statsLibrary", alias = "stats_library")]
    stats_library: Option<Vec<SeasonForecast>>,
}

pub fn parse_forecast_json(raw: &str) -> Result<Vec<SeasonForecast>> {
    let response: PredictionResponse =
        serde_json::from_str(raw.trim()).context("invalid predictPlayer json")?;
    let seasons = response
        .stats_library
        .context("prediction response has no statsLibrary")?;
    if seasons.len() != SEASON_COUNT {
        return Err(anyhow::anyhow!(
            "statsLibrary has {} seasons, expected {SEASON_COUNT}",
            seasons.len()
        ));
    }
    Ok(seasons)
}
