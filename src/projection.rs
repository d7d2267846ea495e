//! Pure derivations over a loaded forecast: per-season snapshots, chart series,
//! radar geometry and display formatting.
//!
//! Two missing-value policies live here on purpose. Series and radar read a
//! missing metric as 0 so lines and polygons stay continuous; the `display_*`
//! helpers render a missing metric as [`PLACEHOLDER`].

use crate::state::SeasonForecast;

pub const SEASON_COUNT: usize = 9;
pub const SEASONS: [&str; SEASON_COUNT] = [
    "25/26", "26/27", "27/28", "28/29", "29/30", "30/31", "31/32", "32/33", "33/34",
];
pub const PLACEHOLDER: &str = "--";
pub const MARKET_VALUE_MULTIPLIER: f64 = 1.18;
pub const RADAR_STAT_MAX: f64 = 99.0;

pub fn season_index(label: &str) -> Option<usize> {
    SEASONS.iter().position(|s| *s == label.trim())
}

/// Forecast entry for `label`, or `None` when nothing is loaded or the label's
/// slot is past the end of the array.
pub fn snapshot_for<'a>(
    forecast: Option<&'a [SeasonForecast]>,
    label: &str,
) -> Option<&'a SeasonForecast> {
    let idx = season_index(label)?;
    forecast?.get(idx)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Overall,
    RatingChange,
    Value,
    Potential,
    Goals,
    Assists,
    Interceptions,
    Tackles,
    KeyPasses,
    Pace,
    Shooting,
    Passing,
    Dribbling,
    Defending,
    Physical,
}

impl Metric {
    pub fn read(self, season: &SeasonForecast) -> Option<f64> {
        match self {
            Metric::Overall => season.predict_overall,
            Metric::RatingChange => season.predict_rating_change,
            Metric::Value => season.predict_value,
            Metric::Potential => season.predicted_potential,
            Metric::Goals => season.predicted_goals,
            Metric::Assists => season.predicted_assists,
            Metric::Interceptions => season.predicted_interceptions,
            Metric::Tackles => season.predicted_tackles,
            Metric::KeyPasses => season.predicted_key_passes,
            Metric::Pace => season.predict_pace,
            Metric::Shooting => season.predict_shooting,
            Metric::Passing => season.predict_passing,
            Metric::Dribbling => season.predict_dribbling,
            Metric::Defending => season.predict_defending,
            Metric::Physical => season.predict_physic,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Overall => "Rating",
            Metric::RatingChange => "Rating change",
            Metric::Value => "Market value",
            Metric::Potential => "Potential",
            Metric::Goals => "Goals",
            Metric::Assists => "Assists",
            Metric::Interceptions => "Interceptions",
            Metric::Tackles => "Tackles",
            Metric::KeyPasses => "Key passes",
            Metric::Pace => "PAC",
            Metric::Shooting => "SHO",
            Metric::Passing => "PAS",
            Metric::Dribbling => "DRI",
            Metric::Defending => "DEF",
            Metric::Physical => "PHY",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub season: &'static str,
    /// One value per requested metric, in request order.
    pub values: Vec<f64>,
}

/// One point per season in label order. Missing metrics (or missing seasons)
/// read as 0. An unloaded forecast yields no points.
pub fn series_for(forecast: Option<&[SeasonForecast]>, metrics: &[Metric]) -> Vec<SeriesPoint> {
    let Some(forecast) = forecast else {
        return Vec::new();
    };
    SEASONS
        .iter()
        .enumerate()
        .map(|(idx, season)| {
            let entry = forecast.get(idx);
            let values = metrics
                .iter()
                .map(|metric| entry.and_then(|e| metric.read(e)).unwrap_or(0.0))
                .collect();
            SeriesPoint { season, values }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub season: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingPoint {
    pub season: &'static str,
    pub rating: f64,
    pub potential: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalsAssistsPoint {
    pub season: &'static str,
    pub goals: f64,
    pub assists: f64,
}

pub fn value_series(forecast: Option<&[SeasonForecast]>) -> Vec<ValuePoint> {
    series_for(forecast, &[Metric::Value])
        .into_iter()
        .map(|p| ValuePoint {
            season: p.season,
            value: p.values[0],
        })
        .collect()
}

pub fn rating_series(forecast: Option<&[SeasonForecast]>) -> Vec<RatingPoint> {
    series_for(forecast, &[Metric::Overall, Metric::Potential])
        .into_iter()
        .map(|p| RatingPoint {
            season: p.season,
            rating: p.values[0],
            potential: p.values[1],
        })
        .collect()
}

/// Goals and assists are whole numbers on the chart.
pub fn goals_assists_series(forecast: Option<&[SeasonForecast]>) -> Vec<GoalsAssistsPoint> {
    series_for(forecast, &[Metric::Goals, Metric::Assists])
        .into_iter()
        .map(|p| GoalsAssistsPoint {
            season: p.season,
            goals: p.values[0].round(),
            assists: p.values[1].round(),
        })
        .collect()
}

/// Radar axes in drawing order: the first sits at the top, the rest follow
/// clockwise.
pub const RADAR_AXES: [Metric; 6] = [
    Metric::Pace,
    Metric::Shooting,
    Metric::Passing,
    Metric::Dribbling,
    Metric::Defending,
    Metric::Physical,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadarPoint {
    pub metric: Metric,
    pub angle_deg: f64,
    pub normalized: f64,
    pub x: f64,
    pub y: f64,
}

pub fn normalize_attribute(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    (raw.clamp(0.0, RADAR_STAT_MAX) / RADAR_STAT_MAX).clamp(0.0, 1.0)
}

/// Hexagon vertices around `center` in screen coordinates (y grows downward),
/// starting at -90° and stepping 60°.
pub fn radar_coordinates_for(
    snapshot: &SeasonForecast,
    center: (f64, f64),
    max_radius: f64,
) -> [RadarPoint; 6] {
    let (cx, cy) = center;
    std::array::from_fn(|i| {
        let metric = RADAR_AXES[i];
        let normalized = normalize_attribute(metric.read(snapshot).unwrap_or(0.0));
        let angle_deg = -90.0 + 60.0 * i as f64;
        let rad = angle_deg.to_radians();
        let r = normalized * max_radius;
        RadarPoint {
            metric,
            angle_deg,
            normalized,
            x: cx + r * rad.cos(),
            y: cy + r * rad.sin(),
        }
    })
}

pub fn market_value_millions(raw: f64) -> f64 {
    raw * MARKET_VALUE_MULTIPLIER / 1_000_000.0
}

pub fn format_market_value(raw: f64) -> String {
    format!("${:.1}M", market_value_millions(raw))
}

pub fn display_market_value(raw: Option<f64>) -> String {
    present(raw).map_or_else(|| PLACEHOLDER.to_string(), format_market_value)
}

pub fn display_rounded(raw: Option<f64>) -> String {
    present(raw).map_or_else(|| PLACEHOLDER.to_string(), |v| whole(v.round()))
}

/// Attributes and per-season counts round up, so 12.1 goals shows as 13.
pub fn display_ceil(raw: Option<f64>) -> String {
    present(raw).map_or_else(|| PLACEHOLDER.to_string(), |v| whole(v.ceil()))
}

pub fn display_rating_change(raw: Option<f64>) -> String {
    present(raw).map_or_else(
        || PLACEHOLDER.to_string(),
        |v| {
            if v == 0.0 {
                "+0".to_string()
            } else if v.fract() == 0.0 {
                format!("{v:+.0}")
            } else {
                format!("{v:+.1}")
            }
        },
    )
}

/// Interceptions plus tackles; shown only when both halves were predicted.
pub fn display_defensive_contributions(season: &SeasonForecast) -> String {
    match (
        present(season.predicted_interceptions),
        present(season.predicted_tackles),
    ) {
        (Some(i), Some(t)) => whole((i + t).ceil()),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Direction marker for the rating change; empty when there is no prediction.
pub fn rating_change_arrow(raw: Option<f64>) -> &'static str {
    match present(raw) {
        Some(change) if change < 0.0 => "↓",
        Some(_) => "↑",
        None => "",
    }
}

/// Integral value as text. Rounding can yield -0.0, which prints as "0".
fn whole(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v:.0}")
}

fn present(raw: Option<f64>) -> Option<f64> {
    raw.filter(|v| v.is_finite())
}
