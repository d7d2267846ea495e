use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::backend;
use crate::config::Config;
use crate::media;
use crate::state::{Delta, ProviderCommand};

/// Runs network lookups off the UI thread. Every command becomes an independent
/// job whose outcome comes back as a [`Delta`]; jobs are never cancelled, so a
/// superseded one still reports and the reducer drops its result.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    config: Config,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(config.fetch_parallelism);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Fetch pool unavailable; using one thread per request".to_string(),
            ));
        }

        while let Ok(cmd) = cmd_rx.recv() {
            let tx = tx.clone();
            let config = config.clone();
            let job = move || run_command(&config, cmd, &tx);
            if let Some(pool) = pool.as_ref() {
                pool.spawn(job);
            } else {
                thread::spawn(job);
            }
        }
    })
}

/// Executes one command to completion on the calling thread.
pub fn run_command(config: &Config, cmd: ProviderCommand, tx: &Sender<Delta>) {
    match cmd {
        ProviderCommand::SearchPlayers { seq, query } => {
            match backend::fetch_player_suggestions(config, &query) {
                Ok(suggestions) => {
                    let _ = tx.send(Delta::SetSuggestions { seq, suggestions });
                }
                Err(err) => {
                    let _ = tx.send(Delta::SuggestionsFailed {
                        seq,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        ProviderCommand::FetchForecast { tag, player_id } => {
            match backend::fetch_forecast(config, &player_id) {
                Ok(forecast) => {
                    let _ = tx.send(Delta::SetForecast { tag, forecast });
                }
                Err(err) => {
                    let _ = tx.send(Delta::ForecastFailed {
                        tag,
                        error: format!("{err:#}"),
                    });
                }
            }
        }
        ProviderCommand::EnrichMedia {
            tag,
            request,
            player_name,
            club_hint,
            nationality_hint,
        } => {
            let lookup = media::enrich(
                config,
                &player_name,
                club_hint.as_deref(),
                nationality_hint.as_deref(),
            );
            for warning in lookup.warnings {
                let _ = tx.send(Delta::Log(format!("[WARN] Media: {warning}")));
            }
            let _ = tx.send(Delta::SetMedia {
                tag,
                request,
                media: lookup.assets,
            });
        }
    }
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("fetch-{idx}"))
        .build()
        .ok()
}
