use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::Config;
use crate::http_client::{get_text, http_client};
use crate::state::MediaAssets;

const EXPECTED_SPORT: &str = "soccer";

/// Result of a media lookup. Never an error: problems are reported as warnings
/// and the affected asset is simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaLookup {
    pub assets: MediaAssets,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SportsDbPlayer {
    #[serde(rename = "strPlayer", default)]
    pub name: Option<String>,
    #[serde(rename = "strSport", default)]
    pub sport: Option<String>,
    #[serde(rename = "strTeam", default)]
    pub team: Option<String>,
    #[serde(rename = "strThumb", default)]
    pub thumb: Option<String>,
    #[serde(rename = "strCutout", default)]
    pub cutout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SportsDbTeam {
    #[serde(rename = "strTeam", default)]
    pub name: Option<String>,
    #[serde(rename = "strSport", default)]
    pub sport: Option<String>,
    #[serde(rename = "strBadge", default)]
    pub badge: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerSearchResponse {
    #[serde(default)]
    player: Option<Vec<SportsDbPlayer>>,
}

#[derive(Debug, Deserialize)]
struct TeamSearchResponse {
    #[serde(default)]
    teams: Option<Vec<SportsDbTeam>>,
}

/// Resolves a portrait and club badge for `player_name` from TheSportsDB.
pub fn enrich(
    config: &Config,
    player_name: &str,
    club_hint: Option<&str>,
    nationality_hint: Option<&str>,
) -> MediaLookup {
    enrich_with(
        player_name,
        club_hint,
        nationality_hint,
        |name| fetch_sportsdb_players(config, name),
        |team| fetch_sportsdb_teams(config, team),
    )
}

/// Lookup logic over injected fetchers.
///
/// The badge lookup runs only once a soccer player record was found. Its team
/// name comes from that record, or from `club_hint` when the record has none.
/// A failed badge lookup keeps the portrait. Portrait, badge and nationality
/// are returned together so the caller can commit them as one update.
pub fn enrich_with<P, T>(
    player_name: &str,
    club_hint: Option<&str>,
    nationality_hint: Option<&str>,
    fetch_players: P,
    fetch_teams: T,
) -> MediaLookup
where
    P: FnOnce(&str) -> Result<Vec<SportsDbPlayer>>,
    T: FnOnce(&str) -> Result<Vec<SportsDbTeam>>,
{
    let mut lookup = MediaLookup {
        assets: MediaAssets {
            nationality_label: non_blank(nationality_hint).map(str::to_string),
            ..MediaAssets::default()
        },
        warnings: Vec::new(),
    };

    let player_name = player_name.trim();
    if player_name.is_empty() {
        return lookup;
    }

    let player = match fetch_players(player_name) {
        Ok(players) => first_soccer_player(players),
        Err(err) => {
            lookup
                .warnings
                .push(format!("player image lookup for {player_name}: {err:#}"));
            None
        }
    };
    let Some(player) = player else {
        return lookup;
    };
    lookup.assets.portrait_url = portrait_url(&player);

    let team = non_blank(player.team.as_deref()).or_else(|| non_blank(club_hint));
    if let Some(team) = team {
        match fetch_teams(team) {
            Ok(teams) => {
                lookup.assets.badge_url =
                    first_soccer_team(teams).and_then(|t| non_blank_owned(t.badge));
            }
            Err(err) => lookup
                .warnings
                .push(format!("team badge lookup for {team}: {err:#}")),
        }
    }
    lookup
}

pub fn fetch_sportsdb_players(config: &Config, name: &str) -> Result<Vec<SportsDbPlayer>> {
    let client = http_client(config)?;
    let url = format!("{}/searchplayers.php", config.sportsdb_url);
    let body = get_text(client.get(&url).query(&[("p", name)]))?;
    parse_players_json(&body)
}

pub fn fetch_sportsdb_teams(config: &Config, team: &str) -> Result<Vec<SportsDbTeam>> {
    let client = http_client(config)?;
    let url = format!("{}/searchteams.php", config.sportsdb_url);
    let body = get_text(client.get(&url).query(&[("t", team)]))?;
    parse_teams_json(&body)
}

pub fn parse_players_json(raw: &str) -> Result<Vec<SportsDbPlayer>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let response: PlayerSearchResponse =
        serde_json::from_str(trimmed).context("invalid searchplayers json")?;
    Ok(response.player.unwrap_or_default())
}

pub fn parse_teams_json(raw: &str) -> Result<Vec<SportsDbTeam>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let response: TeamSearchResponse =
        serde_json::from_str(trimmed).context("invalid searchteams json")?;
    Ok(response.teams.unwrap_or_default())
}

pub fn first_soccer_player(players: Vec<SportsDbPlayer>) -> Option<SportsDbPlayer> {
    players
        .into_iter()
        .find(|p| is_expected_sport(p.sport.as_deref()))
}

pub fn first_soccer_team(teams: Vec<SportsDbTeam>) -> Option<SportsDbTeam> {
    teams
        .into_iter()
        .find(|t| is_expected_sport(t.sport.as_deref()))
}

/// Thumbnail first, cutout as the fallback.
pub fn portrait_url(player: &SportsDbPlayer) -> Option<String> {
    non_blank(player.thumb.as_deref())
        .or_else(|| non_blank(player.cutout.as_deref()))
        .map(str::to_string)
}

fn is_expected_sport(sport: Option<&str>) -> bool {
    sport.is_some_and(|s| s.trim().eq_ignore_ascii_case(EXPECTED_SPORT))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_blank_owned(value: Option<String>) -> Option<String> {
    non_blank(value.as_deref()).map(str::to_string)
}
