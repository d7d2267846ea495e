use fut_forecast::debounce::SearchQuery;
use fut_forecast::projection::SEASON_COUNT;
use fut_forecast::state::{
    AppState, Delta, ForecastStatus, MediaAssets, PlayerRecord, PlayerSuggestion,
    ProviderCommand, SearchStatus, SeasonForecast, SelectionTag, apply_delta,
};
use serde_json::json;

fn suggestion(id: u32, name: &str) -> PlayerSuggestion {
    PlayerSuggestion::from_record(PlayerRecord::new(json!({
        "playerID": id,
        "shortName": name,
        "club_name": "Test FC",
        "nationality_name": "France",
        "age_fifa": 24,
        "overall": 88,
        "player_positions": "ST",
        "value_eur": 10000000,
    })))
}

fn forecast(overall: f64) -> Vec<SeasonForecast> {
    (0..SEASON_COUNT)
        .map(|i| SeasonForecast {
            predict_overall: Some(overall + i as f64),
            ..SeasonForecast::default()
        })
        .collect()
}

fn forecast_tag(commands: &[ProviderCommand]) -> SelectionTag {
    commands
        .iter()
        .find_map(|cmd| match cmd {
            ProviderCommand::FetchForecast { tag, .. } => Some(tag.clone()),
            _ => None,
        })
        .expect("forecast command")
}

fn media_request(commands: &[ProviderCommand]) -> (SelectionTag, u64) {
    commands
        .iter()
        .find_map(|cmd| match cmd {
            ProviderCommand::EnrichMedia { tag, request, .. } => Some((tag.clone(), *request)),
            _ => None,
        })
        .expect("media command")
}

fn media(label: &str) -> MediaAssets {
    MediaAssets {
        portrait_url: Some(format!("https://img.example/{label}.png")),
        badge_url: None,
        nationality_label: Some("France".to_string()),
    }
}

#[test]
fn selection_resets_view_before_issuing_lookups() {
    let mut state = AppState::new();
    state.on_search_input("mba");
    let seq = state.search_seq;
    apply_delta(
        &mut state,
        Delta::SetSuggestions {
            seq,
            suggestions: vec![suggestion(1, "A"), suggestion(2, "B")],
        },
    );
    assert!(state.dropdown_visible());

    let cmds = state.begin_selection(&suggestion(1, "A"));
    let tag = forecast_tag(&cmds);
    let (media_tag, request) = media_request(&cmds);
    apply_delta(&mut state, Delta::SetForecast { tag, forecast: forecast(80.0) });
    apply_delta(&mut state, Delta::SetMedia { tag: media_tag, request, media: media("a") });
    assert_eq!(state.forecast_status, ForecastStatus::Ready);
    assert!(!state.media.is_empty());

    let cmds = state.begin_selection(&suggestion(2, "B"));
    assert_eq!(cmds.len(), 2);
    assert!(state.search_text.is_empty());
    assert!(state.suggestions.is_empty());
    assert!(!state.dropdown_visible());
    assert!(state.forecast.is_none());
    assert_eq!(state.forecast_status, ForecastStatus::Loading);
    assert!(state.media.is_empty());
    assert!(state.media_loading);
    assert_eq!(state.displayed_name.as_deref(), Some("B"));
    assert_eq!(state.identity.id.as_deref(), Some("2"));
    assert_eq!(state.identity.current_overall, Some(88));

    match &cmds[0] {
        ProviderCommand::FetchForecast { player_id, .. } => assert_eq!(player_id, "2"),
        other => panic!("unexpected first command: {other:?}"),
    }
    match &cmds[1] {
        ProviderCommand::EnrichMedia {
            player_name,
            club_hint,
            nationality_hint,
            ..
        } => {
            assert_eq!(player_name, "B");
            assert_eq!(club_hint.as_deref(), Some("Test FC"));
            assert_eq!(nationality_hint.as_deref(), Some("France"));
        }
        other => panic!("unexpected second command: {other:?}"),
    }
}

#[test]
fn late_results_for_previous_player_are_discarded() {
    let mut state = AppState::new();
    let first = state.begin_selection(&suggestion(1, "A"));
    let a_tag = forecast_tag(&first);
    let (a_media_tag, a_request) = media_request(&first);

    let second = state.begin_selection(&suggestion(2, "B"));
    let b_tag = forecast_tag(&second);

    apply_delta(&mut state, Delta::SetForecast { tag: a_tag.clone(), forecast: forecast(70.0) });
    apply_delta(
        &mut state,
        Delta::SetMedia {
            tag: a_media_tag,
            request: a_request,
            media: media("a"),
        },
    );
    assert!(state.forecast.is_none());
    assert!(state.media.is_empty());
    assert_eq!(state.forecast_status, ForecastStatus::Loading);

    apply_delta(&mut state, Delta::ForecastFailed { tag: a_tag, error: "timeout".to_string() });
    assert_eq!(state.forecast_status, ForecastStatus::Loading);
    assert!(state.logs.back().is_some_and(|l| l.contains("timeout")));

    apply_delta(&mut state, Delta::SetForecast { tag: b_tag, forecast: forecast(90.0) });
    assert_eq!(state.forecast_status, ForecastStatus::Ready);
    assert_eq!(state.snapshot().and_then(|s| s.predict_overall), Some(90.0));
}

#[test]
fn reselecting_the_same_player_ignores_the_older_request() {
    let mut state = AppState::new();
    let first = forecast_tag(&state.begin_selection(&suggestion(7, "Same")));
    let second = forecast_tag(&state.begin_selection(&suggestion(7, "Same")));
    assert_ne!(first, second);

    apply_delta(&mut state, Delta::SetForecast { tag: first, forecast: forecast(60.0) });
    assert!(state.forecast.is_none());
    apply_delta(&mut state, Delta::SetForecast { tag: second, forecast: forecast(61.0) });
    assert!(state.forecast.is_some());
}

#[test]
fn forecast_failure_marks_unavailable() {
    let mut state = AppState::new();
    let tag = forecast_tag(&state.begin_selection(&suggestion(3, "C")));
    apply_delta(&mut state, Delta::ForecastFailed { tag, error: "http 500".to_string() });
    assert_eq!(state.forecast_status, ForecastStatus::Unavailable);
    assert!(state.forecast.is_none());
    assert!(state.snapshot().is_none());
}

#[test]
fn short_forecast_is_not_committed() {
    let mut state = AppState::new();
    let tag = forecast_tag(&state.begin_selection(&suggestion(3, "C")));
    let mut short = forecast(80.0);
    short.truncate(4);
    apply_delta(&mut state, Delta::SetForecast { tag, forecast: short });
    assert_eq!(state.forecast_status, ForecastStatus::Unavailable);
    assert!(state.forecast.is_none());
}

#[test]
fn stale_search_results_do_not_reopen_dropdown() {
    let mut state = AppState::new();
    state.on_search_input("me");
    let old_seq = state.search_seq;
    let _ = state.begin_search(SearchQuery::parse("me").unwrap());
    state.on_search_input("mes");

    apply_delta(
        &mut state,
        Delta::SetSuggestions {
            seq: old_seq,
            suggestions: vec![suggestion(1, "Old")],
        },
    );
    assert!(state.suggestions.is_empty());
    assert_eq!(state.search_status, SearchStatus::Idle);

    let seq = state.search_seq;
    let _ = state.begin_selection(&suggestion(9, "Picked"));
    apply_delta(
        &mut state,
        Delta::SetSuggestions {
            seq,
            suggestions: vec![suggestion(1, "Late")],
        },
    );
    assert!(!state.dropdown_visible());
}

#[test]
fn suggestions_are_capped_and_empty_means_no_results() {
    let mut state = AppState::new();
    state.on_search_input("ab");
    let seq = state.search_seq;
    let many: Vec<_> = (0..8).map(|i| suggestion(i, &format!("P{i}"))).collect();
    apply_delta(&mut state, Delta::SetSuggestions { seq, suggestions: many });
    assert_eq!(state.suggestions.len(), 5);
    assert_eq!(state.suggestions[0].display_name, "P0");
    assert_eq!(state.search_status, SearchStatus::Ready);

    state.on_search_input("abc");
    let seq = state.search_seq;
    apply_delta(&mut state, Delta::SetSuggestions { seq, suggestions: Vec::new() });
    assert_eq!(state.search_status, SearchStatus::NoResults);
    assert!(!state.dropdown_visible());
}

#[test]
fn search_failure_hides_dropdown_and_logs() {
    let mut state = AppState::new();
    state.on_search_input("ab");
    let seq = state.search_seq;
    let _ = state.begin_search(SearchQuery::parse("ab").unwrap());
    apply_delta(&mut state, Delta::SuggestionsFailed { seq, error: "http 502".to_string() });
    assert_eq!(state.search_status, SearchStatus::Idle);
    assert!(state.suggestions.is_empty());
    assert!(state.logs.back().is_some_and(|l| l.contains("http 502")));
}

#[test]
fn name_only_selection_looks_up_media_without_forecast() {
    let mut state = AppState::new();
    let cmds = state.begin_selection(&PlayerSuggestion::name_only("Lionel Messi"));
    assert_eq!(cmds.len(), 1);
    assert!(matches!(
        &cmds[0],
        ProviderCommand::EnrichMedia { player_name, club_hint: None, nationality_hint: None, .. }
            if player_name == "Lionel Messi"
    ));
    assert_eq!(state.forecast_status, ForecastStatus::NotRequested);
    assert_eq!(state.identity.id, None);
    assert_eq!(state.displayed_name.as_deref(), Some("Lionel Messi"));
}

#[test]
fn record_without_id_skips_forecast_and_media() {
    let mut state = AppState::new();
    let record = PlayerRecord::new(json!({"shortName": "No Id", "overall": 70}));
    let cmds = state.begin_selection(&PlayerSuggestion::from_record(record));
    assert!(cmds.is_empty());
    assert_eq!(state.identity.current_overall, Some(70));
    assert_eq!(state.forecast_status, ForecastStatus::NotRequested);
    assert!(!state.media_loading);
    assert!(state.logs.back().is_some_and(|l| l.contains("No player id")));
}

#[test]
fn newer_media_request_supersedes_older_one() {
    let mut state = AppState::new();
    let cmds = state.begin_selection(&suggestion(4, "D"));
    let (tag, first) = media_request(&cmds);
    let second = match state.begin_media_lookup("D", None, None) {
        Some(ProviderCommand::EnrichMedia { request, .. }) => request,
        other => panic!("expected media command, got {other:?}"),
    };

    apply_delta(
        &mut state,
        Delta::SetMedia {
            tag: tag.clone(),
            request: first,
            media: media("old"),
        },
    );
    assert!(state.media.is_empty());
    assert!(state.media_loading);

    apply_delta(&mut state, Delta::SetMedia { tag, request: second, media: media("new") });
    assert_eq!(
        state.media.portrait_url.as_deref(),
        Some("https://img.example/new.png")
    );
    assert!(!state.media_loading);
}
