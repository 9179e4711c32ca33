use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{
    error::WeatherError,
    history::HistoryStore,
    model::{CurrentWeather, ForecastDay, LocationQuery, Theme},
    prefs::PreferenceStore,
    provider::WeatherProvider,
};

const IDLE_PROMPT: &str = "Enter a city name to get the current weather!";
const IDLE_NOT_CONFIGURED: &str =
    "API key not configured. Set OPENWEATHERMAP_API_KEY or run `dashboard configure`.";

/// Single source of truth for what the presentation layer renders.
///
/// A sum type instead of independent loading/error/data flags: exactly one
/// variant is active, so loading-plus-error combinations cannot exist.
#[derive(Debug, Clone)]
pub enum ViewState {
    Idle {
        message: String,
    },
    Loading,
    Error {
        message: String,
    },
    Success {
        current: CurrentWeather,
        forecast: Vec<ForecastDay>,
    },
}

#[derive(Debug)]
struct ControllerState {
    view: ViewState,
    active_query: Option<LocationQuery>,
    /// Bumped per accepted query; a fetch result is committed only if the
    /// generation it started under is still current. This is the whole
    /// "most recent query wins" mechanism — superseded responses are
    /// dropped on arrival, no cancellation needed.
    generation: u64,
    history: Vec<CurrentWeather>,
    theme: Theme,
}

/// Drives the fetch/reconcile cycle: accepts user intents, orchestrates
/// the provider and the stores, and owns the authoritative [`ViewState`].
///
/// All transitions are serialized through one internal mutex. The lock is
/// never held across an await; provider calls run between two discrete
/// transitions (enter `Loading`, commit result).
#[derive(Debug)]
pub struct QueryController {
    provider: Option<Arc<dyn WeatherProvider>>,
    history: HistoryStore,
    prefs: PreferenceStore,
    state: Mutex<ControllerState>,
}

impl QueryController {
    /// Seeds history and theme from the stores. `provider` is `None` when
    /// no API credential is configured; that state is reflected in the
    /// idle message and short-circuits every fetch.
    pub fn new(
        provider: Option<Arc<dyn WeatherProvider>>,
        history: HistoryStore,
        prefs: PreferenceStore,
    ) -> Self {
        let message = if provider.is_some() {
            IDLE_PROMPT
        } else {
            IDLE_NOT_CONFIGURED
        };

        let state = ControllerState {
            view: ViewState::Idle {
                message: message.to_string(),
            },
            active_query: None,
            generation: 0,
            history: history.load(),
            theme: prefs.load_theme().unwrap_or_default(),
        };

        Self {
            provider,
            history,
            prefs,
            state: Mutex::new(state),
        }
    }

    /// Submit a new search. Empty input is ignored, and a query matching
    /// the active one case-insensitively is a no-op so re-submissions do
    /// not trigger redundant fetches.
    pub async fn submit(&self, raw: &str) {
        let Some(query) = LocationQuery::new(raw) else {
            return;
        };

        let (generation, provider) = {
            let mut state = self.state();

            if state
                .active_query
                .as_ref()
                .is_some_and(|active| active.matches(&query))
            {
                return;
            }
            state.active_query = Some(query.clone());

            let Some(provider) = self.provider.clone() else {
                state.view = ViewState::Error {
                    message: WeatherError::NotConfigured.to_string(),
                };
                return;
            };

            // Entering Loading clears stale results immediately; a spinner
            // never shows alongside the previous city's data.
            state.generation += 1;
            state.view = ViewState::Loading;
            (state.generation, provider)
        };

        let result = provider.current_and_forecast(&query).await;
        self.commit(generation, &query, result, true);
    }

    /// Selecting a history entry is the same as submitting its name.
    pub async fn select_history(&self, location_name: &str) {
        self.submit(location_name).await;
    }

    /// Re-fetch the currently displayed location in place, without
    /// entering `Loading`. No-op unless the view is `Success`. A failed
    /// refresh transitions to `Error` like any other fetch; history is not
    /// re-recorded on success.
    pub async fn refresh(&self) {
        let (generation, provider, query) = {
            let state = self.state();

            let ViewState::Success { current, .. } = &state.view else {
                return;
            };
            let Some(query) = LocationQuery::new(&current.location_name) else {
                return;
            };
            let Some(provider) = self.provider.clone() else {
                return;
            };

            (state.generation, provider, query)
        };

        let result = provider.current_and_forecast(&query).await;
        self.commit(generation, &query, result, false);
    }

    /// Flip the display preference and persist it best-effort.
    pub fn toggle_theme(&self) -> Theme {
        let mut state = self.state();
        state.theme = state.theme.toggled();
        self.prefs.save_theme(state.theme);
        state.theme
    }

    pub fn set_theme(&self, theme: Theme) {
        let mut state = self.state();
        state.theme = theme;
        self.prefs.save_theme(theme);
    }

    pub fn clear_history(&self) {
        let mut state = self.state();
        state.history = self.history.clear();
    }

    pub fn view_state(&self) -> ViewState {
        self.state().view.clone()
    }

    /// Published history sequence, most recent first.
    pub fn history(&self) -> Vec<CurrentWeather> {
        self.state().history.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state().theme
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Commit a fetch outcome unless a newer query superseded it.
    fn commit(
        &self,
        generation: u64,
        query: &LocationQuery,
        result: Result<(CurrentWeather, Vec<ForecastDay>), WeatherError>,
        record_history: bool,
    ) {
        let mut state = self.state();

        if state.generation != generation {
            tracing::debug!("dropping superseded result for \"{query}\"");
            return;
        }

        match result {
            Ok((current, forecast)) => {
                if record_history {
                    state.history = self.history.record(&current);
                }
                state.view = ViewState::Success { current, forecast };
            }
            Err(err) => {
                tracing::debug!("fetch for \"{query}\" failed: {err:?}");
                state.view = ViewState::Error {
                    message: err.to_string(),
                };
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        // A poisoned lock only means a panic mid-transition; the state
        // itself is still a valid variant.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
