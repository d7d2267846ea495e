use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fut_forecast::backend::{parse_forecast_json, parse_search_json, suggestions_from_records};
use fut_forecast::projection::{
    Metric, goals_assists_series, radar_coordinates_for, rating_series, series_for,
    value_series,
};
use fut_forecast::state::{AppState, Delta, PlayerSuggestion, apply_delta};

fn bench_forecast_parse(c: &mut Criterion) {
    c.bench_function("forecast_parse", |b| {
        b.iter(|| {
            let seasons = parse_forecast_json(black_box(FORECAST_JSON)).unwrap();
            black_box(seasons.len());
        })
    });
}

fn bench_search_parse(c: &mut Criterion) {
    c.bench_function("search_parse", |b| {
        b.iter(|| {
            let records = parse_search_json(black_box(SEARCH_JSON)).unwrap();
            let suggestions = suggestions_from_records(records);
            black_box(suggestions.len());
        })
    });
}

fn bench_chart_series(c: &mut Criterion) {
    let forecast = parse_forecast_json(FORECAST_JSON).expect("valid fixture json");
    c.bench_function("chart_series", |b| {
        b.iter(|| {
            let slice = Some(black_box(forecast.as_slice()));
            black_box(value_series(slice).len());
            black_box(rating_series(slice).len());
            black_box(goals_assists_series(slice).len());
            black_box(series_for(slice, &[Metric::Interceptions, Metric::Tackles]).len());
        })
    });
}

fn bench_radar(c: &mut Criterion) {
    let forecast = parse_forecast_json(FORECAST_JSON).expect("valid fixture json");
    c.bench_function("radar_coordinates", |b| {
        b.iter(|| {
            for season in &forecast {
                let points = radar_coordinates_for(black_box(season), (150.0, 150.0), 100.0);
                black_box(points[0].y);
            }
        })
    });
}

fn bench_suggestion_deltas(c: &mut Criterion) {
    let records = parse_search_json(SEARCH_JSON).expect("valid fixture json");
    let suggestions: Vec<PlayerSuggestion> = suggestions_from_records(records);
    c.bench_function("suggestion_deltas", |b| {
        b.iter(|| {
            let mut state = AppState::new();
            for text in ["me", "mes", "mess", "messi"] {
                state.on_search_input(text);
                let seq = state.search_seq;
                apply_delta(
                    &mut state,
                    Delta::SetSuggestions {
                        seq,
                        suggestions: suggestions.clone(),
                    },
                );
            }
            black_box(state.suggestions.len());
        })
    });
}

criterion_group!(
    perf,
    bench_forecast_parse,
    bench_search_parse,
    bench_chart_series,
    bench_radar,
    bench_suggestion_deltas
);
criterion_main!(perf);

static FORECAST_JSON: &str = include_str!("../tests/fixtures/predict_player.json");
static SEARCH_JSON: &str = include_str!("../tests/fixtures/search_players.json");
