use std::collections::VecDeque;

use chrono::Local;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::debounce::SearchQuery;
use crate::projection::{self, SEASONS, SEASON_COUNT};

pub const MAX_SUGGESTIONS: usize = 5;
const MAX_LOGS: usize = 200;

/// Backend player record as returned by `/searchPlayers`. Kept opaque; only the
/// fields the dashboard reads have accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    raw: Value,
}

impl PlayerRecord {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// `playerID` wins over `id`; numbers are coerced to their integer text.
    pub fn id(&self) -> Option<String> {
        ["playerID", "id"]
            .iter()
            .find_map(|key| self.raw.get(*key).and_then(id_to_string))
    }

    pub fn display_name(&self) -> Option<String> {
        pick_string(&self.raw, &["shortName", "name"])
    }

    pub fn club_name(&self) -> Option<String> {
        pick_string(&self.raw, &["club_name"])
    }

    pub fn nationality_name(&self) -> Option<String> {
        pick_string(&self.raw, &["nationality_name"])
    }

    pub fn age(&self) -> Option<u32> {
        pick_f64(&self.raw, "age_fifa").and_then(non_negative_u32)
    }

    pub fn overall(&self) -> Option<u32> {
        pick_f64(&self.raw, "overall").and_then(non_negative_u32)
    }

    pub fn positions(&self) -> Option<String> {
        pick_string(&self.raw, &["player_positions"])
    }

    pub fn market_value(&self) -> Option<f64> {
        pick_f64(&self.raw, "value_eur")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSuggestion {
    pub id: Option<String>,
    pub display_name: String,
    pub club: String,
    pub nationality: String,
    pub raw: Option<PlayerRecord>,
}

impl PlayerSuggestion {
    pub fn from_record(record: PlayerRecord) -> Self {
        Self {
            id: record.id(),
            display_name: record.display_name().unwrap_or_default(),
            club: record.club_name().unwrap_or_default(),
            nationality: record.nationality_name().unwrap_or_default(),
            raw: Some(record),
        }
    }

    /// A name-only suggestion with no backend record behind it.
    pub fn name_only(name: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: name.into(),
            club: String::new(),
            nationality: String::new(),
            raw: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerIdentity {
    pub id: Option<String>,
    pub age: Option<u32>,
    pub current_overall: Option<u32>,
    pub position: Option<String>,
    pub club: Option<String>,
    pub current_market_value: Option<f64>,
}

impl PlayerIdentity {
    pub fn from_record(record: &PlayerRecord) -> Self {
        Self {
            id: record.id(),
            age: record.age(),
            current_overall: record.overall(),
            position: record.positions(),
            club: record.club_name(),
            current_market_value: record.market_value(),
        }
    }
}

/// One season of the backend forecast. Every field is optional; charts read
/// missing values as 0 while single-value displays show a placeholder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeasonForecast {
    #[serde(rename = "predictOverall", deserialize_with = "lenient_number")]
    pub predict_overall: Option<f64>,
    #[serde(rename = "predictRatingChange", deserialize_with = "lenient_number")]
    pub predict_rating_change: Option<f64>,
    #[serde(rename = "predictValue", deserialize_with = "lenient_number")]
    pub predict_value: Option<f64>,
    #[serde(rename = "predictedPotential", deserialize_with = "lenient_number")]
    pub predicted_potential: Option<f64>,
    #[serde(rename = "predictedGoals", deserialize_with = "lenient_number")]
    pub predicted_goals: Option<f64>,
    #[serde(rename = "predictedAssists", deserialize_with = "lenient_number")]
    pub predicted_assists: Option<f64>,
    #[serde(rename = "predictedInterceptions", deserialize_with = "lenient_number")]
    pub predicted_interceptions: Option<f64>,
    #[serde(rename = "predictedTackles", deserialize_with = "lenient_number")]
    pub predicted_tackles: Option<f64>,
    #[serde(rename = "predictedKeyPasses", deserialize_with = "lenient_number")]
    pub predicted_key_passes: Option<f64>,
    #[serde(rename = "predictPace", deserialize_with = "lenient_number")]
    pub predict_pace: Option<f64>,
    #[serde(rename = "predictShooting", deserialize_with = "lenient_number")]
    pub predict_shooting: Option<f64>,
    #[serde(rename = "predictPassing", deserialize_with = "lenient_number")]
    pub predict_passing: Option<f64>,
    #[serde(rename = "predictDribbling", deserialize_with = "lenient_number")]
    pub predict_dribbling: Option<f64>,
    #[serde(rename = "predictDefending", deserialize_with = "lenient_number")]
    pub predict_defending: Option<f64>,
    #[serde(rename = "predictPhysic", deserialize_with = "lenient_number")]
    pub predict_physic: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaAssets {
    pub portrait_url: Option<String>,
    pub badge_url: Option<String>,
    pub nationality_label: Option<String>,
}

impl MediaAssets {
    pub fn is_empty(&self) -> bool {
        self.portrait_url.is_none() && self.badge_url.is_none() && self.nationality_label.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Searching,
    NoResults,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastStatus {
    NotRequested,
    Loading,
    Ready,
    Unavailable,
}

/// Identifies the selection an outbound request was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTag {
    pub generation: u64,
    pub player_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub search_text: String,
    pub search_seq: u64,
    pub search_status: SearchStatus,
    pub suggestions: Vec<PlayerSuggestion>,
    pub suggestion_selected: usize,
    pub displayed_name: Option<String>,
    pub identity: PlayerIdentity,
    pub selection_generation: u64,
    pub forecast: Option<Vec<SeasonForecast>>,
    pub forecast_status: ForecastStatus,
    pub media: MediaAssets,
    pub media_request: u64,
    pub media_loading: bool,
    pub season_index: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            search_text: String::new(),
            search_seq: 0,
            search_status: SearchStatus::Idle,
            suggestions: Vec::with_capacity(MAX_SUGGESTIONS),
            suggestion_selected: 0,
            displayed_name: None,
            identity: PlayerIdentity::default(),
            selection_generation: 0,
            forecast: None,
            forecast_status: ForecastStatus::NotRequested,
            media: MediaAssets::default(),
            media_request: 0,
            media_loading: false,
            season_index: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        let stamped = format!("{} {}", Local::now().format("%H:%M:%S"), msg.into());
        self.logs.push_back(stamped);
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Records new search text. Any displayed suggestions are dropped at once and
    /// every search result still in flight becomes stale.
    pub fn on_search_input(&mut self, text: &str) {
        self.search_text = text.to_string();
        self.search_seq = self.search_seq.wrapping_add(1);
        self.clear_suggestions();
    }

    /// Marks a debounced lookup as in flight and returns the command for it.
    pub fn begin_search(&mut self, query: SearchQuery) -> ProviderCommand {
        self.search_status = SearchStatus::Searching;
        ProviderCommand::SearchPlayers {
            seq: self.search_seq,
            query,
        }
    }

    pub fn dropdown_visible(&self) -> bool {
        self.search_status == SearchStatus::Ready && !self.suggestions.is_empty()
    }

    pub fn highlighted_suggestion(&self) -> Option<&PlayerSuggestion> {
        if !self.dropdown_visible() {
            return None;
        }
        self.suggestions.get(self.suggestion_selected)
    }

    pub fn select_next_suggestion(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        self.suggestion_selected = (self.suggestion_selected + 1) % self.suggestions.len();
    }

    pub fn select_prev_suggestion(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        if self.suggestion_selected == 0 {
            self.suggestion_selected = self.suggestions.len() - 1;
        } else {
            self.suggestion_selected -= 1;
        }
    }

    pub fn current_tag(&self) -> SelectionTag {
        SelectionTag {
            generation: self.selection_generation,
            player_id: self.identity.id.clone(),
        }
    }

    pub fn is_current(&self, tag: &SelectionTag) -> bool {
        tag.generation == self.selection_generation && tag.player_id == self.identity.id
    }

    /// Switches the dashboard to `suggestion` in one transition and returns the
    /// lookups to dispatch afterwards. Nothing from the previous player survives
    /// this call, so late results for it can only be discarded.
    pub fn begin_selection(&mut self, suggestion: &PlayerSuggestion) -> Vec<ProviderCommand> {
        self.search_text.clear();
        self.search_seq = self.search_seq.wrapping_add(1);
        self.clear_suggestions();
        self.media = MediaAssets::default();
        self.media_loading = false;
        self.forecast = None;
        self.forecast_status = ForecastStatus::NotRequested;
        self.identity = PlayerIdentity::default();
        self.selection_generation = self.selection_generation.wrapping_add(1);
        self.displayed_name = Some(suggestion.display_name.clone());

        let mut commands = Vec::with_capacity(2);
        let Some(record) = suggestion.raw.as_ref() else {
            if let Some(cmd) = self.begin_media_lookup(&suggestion.display_name, None, None) {
                commands.push(cmd);
            }
            return commands;
        };

        self.identity = PlayerIdentity::from_record(record);
        let Some(player_id) = self.identity.id.clone() else {
            self.push_log(format!(
                "[WARN] No player id for {}; skipping forecast and media",
                suggestion.display_name
            ));
            return commands;
        };

        self.forecast_status = ForecastStatus::Loading;
        commands.push(ProviderCommand::FetchForecast {
            tag: self.current_tag(),
            player_id,
        });
        if let Some(cmd) = self.begin_media_lookup(
            &suggestion.display_name,
            record.club_name(),
            record.nationality_name(),
        ) {
            commands.push(cmd);
        }
        commands
    }

    /// Media lookup for the current selection. Each call supersedes earlier
    /// media requests, even ones issued for the same selection.
    pub fn begin_media_lookup(
        &mut self,
        player_name: &str,
        club_hint: Option<String>,
        nationality_hint: Option<String>,
    ) -> Option<ProviderCommand> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return None;
        }
        self.media_request = self.media_request.wrapping_add(1);
        self.media_loading = true;
        Some(ProviderCommand::EnrichMedia {
            tag: self.current_tag(),
            request: self.media_request,
            player_name: player_name.to_string(),
            club_hint,
            nationality_hint,
        })
    }

    pub fn season_label(&self) -> &'static str {
        SEASONS[self.season_index.min(SEASON_COUNT - 1)]
    }

    pub fn next_season(&mut self) {
        self.season_index = (self.season_index + 1) % SEASON_COUNT;
    }

    pub fn prev_season(&mut self) {
        self.season_index = (self.season_index + SEASON_COUNT - 1) % SEASON_COUNT;
    }

    pub fn select_season(&mut self, label: &str) -> bool {
        match projection::season_index(label) {
            Some(idx) => {
                self.season_index = idx;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Option<&SeasonForecast> {
        projection::snapshot_for(self.forecast.as_deref(), self.season_label())
    }

    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestion_selected = 0;
        self.search_status = SearchStatus::Idle;
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetSuggestions {
        seq: u64,
        suggestions: Vec<PlayerSuggestion>,
    },
    SuggestionsFailed {
        seq: u64,
        error: String,
    },
    SetForecast {
        tag: SelectionTag,
        forecast: Vec<SeasonForecast>,
    },
    ForecastFailed {
        tag: SelectionTag,
        error: String,
    },
    SetMedia {
        tag: SelectionTag,
        request: u64,
        media: MediaAssets,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    SearchPlayers {
        seq: u64,
        query: SearchQuery,
    },
    FetchForecast {
        tag: SelectionTag,
        player_id: String,
    },
    EnrichMedia {
        tag: SelectionTag,
        request: u64,
        player_name: String,
        club_hint: Option<String>,
        nationality_hint: Option<String>,
    },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetSuggestions {
            seq,
            mut suggestions,
        } => {
            if seq != state.search_seq {
                return;
            }
            suggestions.truncate(MAX_SUGGESTIONS);
            state.suggestion_selected = 0;
            if suggestions.is_empty() {
                state.suggestions.clear();
                state.search_status = SearchStatus::NoResults;
            } else {
                state.suggestions = suggestions;
                state.search_status = SearchStatus::Ready;
            }
        }
        Delta::SuggestionsFailed { seq, error } => {
            state.push_log(format!("[WARN] Player search failed: {error}"));
            if seq != state.search_seq {
                return;
            }
            state.clear_suggestions();
        }
        Delta::SetForecast { tag, forecast } => {
            if !state.is_current(&tag) {
                return;
            }
            if forecast.len() != SEASON_COUNT {
                state.push_log(format!(
                    "[WARN] Forecast had {} seasons, expected {SEASON_COUNT}",
                    forecast.len()
                ));
                state.forecast = None;
                state.forecast_status = ForecastStatus::Unavailable;
                return;
            }
            state.forecast = Some(forecast);
            state.forecast_status = ForecastStatus::Ready;
        }
        Delta::ForecastFailed { tag, error } => {
            let who = tag.player_id.as_deref().unwrap_or("?");
            state.push_log(format!("[WARN] Forecast fetch failed for {who}: {error}"));
            if !state.is_current(&tag) {
                return;
            }
            state.forecast = None;
            state.forecast_status = ForecastStatus::Unavailable;
        }
        Delta::SetMedia {
            tag,
            request,
            media,
        } => {
            if !state.is_current(&tag) || request != state.media_request {
                return;
            }
            state.media = media;
            state.media_loading = false;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i.to_string());
            }
            if let Some(u) = n.as_u64() {
                return Some(u.to_string());
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 {
                Some(format!("{f:.0}"))
            } else {
                Some(n.to_string())
            }
        }
        _ => None,
    }
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn pick_f64(value: &Value, key: &str) -> Option<f64> {
    value.get(key).and_then(value_as_f64)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    let num = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    num.is_finite().then_some(num)
}

fn non_negative_u32(value: f64) -> Option<u32> {
    (value >= 0.0 && value <= u32::MAX as f64).then(|| value.round() as u32)
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_id_prefers_player_id_and_coerces_numbers() {
        let record = PlayerRecord::new(json!({"playerID": 231747, "id": 9}));
        assert_eq!(record.id().as_deref(), Some("231747"));

        let record = PlayerRecord::new(json!({"id": 12.0}));
        assert_eq!(record.id().as_deref(), Some("12"));

        let record = PlayerRecord::new(json!({"id": " abc "}));
        assert_eq!(record.id().as_deref(), Some("abc"));

        let record = PlayerRecord::new(json!({"name": "Nobody"}));
        assert_eq!(record.id(), None);
    }

    #[test]
    fn identity_reads_numeric_fields_leniently() {
        let record = PlayerRecord::new(json!({
            "id": 1,
            "age_fifa": 25,
            "overall": "91",
            "player_positions": "ST, LW",
            "club_name": "Real Madrid",
            "value_eur": 180000000.0
        }));
        let identity = PlayerIdentity::from_record(&record);
        assert_eq!(identity.age, Some(25));
        assert_eq!(identity.current_overall, Some(91));
        assert_eq!(identity.position.as_deref(), Some("ST, LW"));
        assert_eq!(identity.club.as_deref(), Some("Real Madrid"));
        assert_eq!(identity.current_market_value, Some(180_000_000.0));
    }

    #[test]
    fn season_forecast_tolerates_nulls_and_numeric_strings() {
        let season: SeasonForecast = serde_json::from_value(json!({
            "predictOverall": "88.4",
            "predictValue": null,
            "predictPace": 91
        }))
        .unwrap();
        assert_eq!(season.predict_overall, Some(88.4));
        assert_eq!(season.predict_value, None);
        assert_eq!(season.predict_pace, Some(91.0));
        assert_eq!(season.predicted_goals, None);
    }

    #[test]
    fn suggestion_navigation_wraps() {
        let mut state = AppState::new();
        state.suggestions = vec![
            PlayerSuggestion::name_only("A"),
            PlayerSuggestion::name_only("B"),
        ];
        state.search_status = SearchStatus::Ready;
        state.select_prev_suggestion();
        assert_eq!(state.suggestion_selected, 1);
        state.select_next_suggestion();
        assert_eq!(state.suggestion_selected, 0);
        assert_eq!(
            state.highlighted_suggestion().map(|s| s.display_name.as_str()),
            Some("A")
        );
    }

    #[test]
    fn season_navigation_wraps_and_accepts_labels() {
        let mut state = AppState::new();
        state.prev_season();
        assert_eq!(state.season_label(), "33/34");
        state.next_season();
        assert_eq!(state.season_label(), "25/26");
        assert!(state.select_season("29/30"));
        assert_eq!(state.season_index, 4);
        assert!(!state.select_season("99/00"));
        assert_eq!(state.season_index, 4);
    }

    #[test]
    fn logs_are_bounded() {
        let mut state = AppState::new();
        for i in 0..(MAX_LOGS + 10) {
            state.push_log(format!("[INFO] line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert!(state.logs.back().unwrap().ends_with("line 209"));
    }
}
