use std::sync::mpsc::Sender;
use std::time::{Duration, Instant};

use crate::debounce::SearchDebouncer;
use crate::state::{AppState, Delta, MediaAssets, PlayerSuggestion, ProviderCommand, apply_delta};

/// Owns the view state plus the pieces that feed it: the search debouncer and
/// the command channel to the provider worker. All mutation happens here, on
/// the UI thread.
pub struct Dashboard {
    pub state: AppState,
    debouncer: SearchDebouncer,
    cmd_tx: Option<Sender<ProviderCommand>>,
}

impl Dashboard {
    pub fn new(cmd_tx: Option<Sender<ProviderCommand>>) -> Self {
        Self::with_debouncer(cmd_tx, SearchDebouncer::new())
    }

    pub fn with_debouncer(
        cmd_tx: Option<Sender<ProviderCommand>>,
        debouncer: SearchDebouncer,
    ) -> Self {
        Self {
            state: AppState::new(),
            debouncer,
            cmd_tx,
        }
    }

    pub fn on_search_input(&mut self, text: &str, now: Instant) {
        self.state.on_search_input(text);
        self.debouncer.on_input(text, now);
    }

    pub fn push_search_char(&mut self, ch: char, now: Instant) {
        let mut text = self.state.search_text.clone();
        text.push(ch);
        self.on_search_input(&text, now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        let mut text = self.state.search_text.clone();
        if text.pop().is_some() {
            self.on_search_input(&text, now);
        }
    }

    pub fn clear_search(&mut self, now: Instant) {
        self.on_search_input("", now);
    }

    /// Fires the debounced lookup once its quiet period has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(query) = self.debouncer.poll(now) {
            let cmd = self.state.begin_search(query);
            self.dispatch(cmd);
        }
    }

    /// How long the UI loop may block before the next debounce deadline.
    pub fn poll_timeout(&self, now: Instant, tick_rate: Duration) -> Duration {
        self.debouncer
            .time_until_due(now)
            .map_or(tick_rate, |due| due.min(tick_rate))
    }

    pub fn select_suggestion(&mut self, suggestion: &PlayerSuggestion) {
        self.debouncer.cancel();
        let commands = self.state.begin_selection(suggestion);
        for cmd in commands {
            self.dispatch(cmd);
        }
    }

    /// Enter key: pick the highlighted suggestion, or with no dropdown open,
    /// look up media for whatever was typed. The media commit replaces all
    /// assets, so the shown nationality rides along as the hint.
    pub fn submit_search(&mut self) {
        if let Some(suggestion) = self.state.highlighted_suggestion().cloned() {
            self.select_suggestion(&suggestion);
            return;
        }
        let text = self.state.search_text.clone();
        let nationality = self.state.media.nationality_label.clone();
        if let Some(cmd) = self.state.begin_media_lookup(&text, None, nationality) {
            self.dispatch(cmd);
        }
    }

    pub fn apply(&mut self, delta: Delta) {
        apply_delta(&mut self.state, delta);
    }

    fn dispatch(&mut self, cmd: ProviderCommand) {
        let Some(tx) = &self.cmd_tx else {
            self.abandon(cmd, "provider unavailable");
            return;
        };
        if let Err(err) = tx.send(cmd) {
            self.abandon(err.0, "provider stopped");
        }
    }

    /// Settles a command that never reached the worker through the same failure
    /// paths a failed request would take.
    fn abandon(&mut self, cmd: ProviderCommand, reason: &str) {
        let delta = match cmd {
            ProviderCommand::SearchPlayers { seq, .. } => Delta::SuggestionsFailed {
                seq,
                error: reason.to_string(),
            },
            ProviderCommand::FetchForecast { tag, .. } => Delta::ForecastFailed {
                tag,
                error: reason.to_string(),
            },
            ProviderCommand::EnrichMedia {
                tag,
                request,
                nationality_hint,
                ..
            } => {
                self.state
                    .push_log(format!("[WARN] Media lookup not sent: {reason}"));
                Delta::SetMedia {
                    tag,
                    request,
                    media: MediaAssets {
                        nationality_label: nationality_hint,
                        ..MediaAssets::default()
                    },
                }
            }
        };
        apply_delta(&mut self.state, delta);
    }
}
