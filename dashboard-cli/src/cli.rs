use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};

use dashboard_core::{
    Config, HistoryStore, OpenWeatherProvider, PreferenceStore, QueryController, StoragePaths,
    Theme, ViewState, WeatherError, WeatherProvider,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Weather dashboard CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather and the 5-day forecast for a city.
    Show {
        /// City name, e.g. "Paris" or "Rio de Janeiro".
        #[arg(required = true)]
        city: Vec<String>,
    },

    /// Interactive session: search, refresh, history, theme.
    Interactive,

    /// Print recent searches, or clear them.
    History {
        /// Remove all saved history.
        #[arg(long)]
        clear: bool,
    },

    /// Set the display theme, or toggle it when no value is given.
    Theme {
        /// "light" or "dark".
        value: Option<String>,
    },

    /// Store the OpenWeatherMap API key.
    Configure,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Some(Command::Show { city }) => show(&city.join(" ")).await,
            Some(Command::Interactive) | None => interactive().await,
            Some(Command::History { clear }) => history(clear),
            Some(Command::Theme { value }) => theme(value.as_deref()),
            Some(Command::Configure) => configure(),
        }
    }
}

/// Wire the controller from config and platform storage. Initialization
/// problems degrade to detached stores / missing provider and are reported
/// once by the caller; the app stays interactive.
fn build_controller() -> (QueryController, bool) {
    let mut init_failed = false;

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!("Failed to load configuration: {err:#}");
        init_failed = true;
        Config::default()
    });

    let provider: Option<Arc<dyn WeatherProvider>> = match config.api_key.filter(|k| !k.is_empty())
    {
        Some(key) => match OpenWeatherProvider::new(key) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(err) => {
                tracing::warn!("Failed to build weather client: {err}");
                init_failed = true;
                None
            }
        },
        None => None,
    };

    let (history, prefs) = match StoragePaths::resolve() {
        Ok(paths) => (
            HistoryStore::new(paths.history),
            PreferenceStore::new(paths.theme),
        ),
        Err(err) => {
            tracing::warn!("Failed to resolve storage paths: {err:#}");
            init_failed = true;
            (HistoryStore::detached(), PreferenceStore::detached())
        }
    };

    (QueryController::new(provider, history, prefs), init_failed)
}

async fn show(city: &str) -> Result<()> {
    let (controller, init_failed) = build_controller();
    if init_failed {
        eprintln!("{}", WeatherError::InitializationFailure);
    }

    controller.submit(city).await;
    render::view_state(&controller.view_state());
    render::history(&controller.history());

    Ok(())
}

/// Outcome of one inquire prompt: a value, "go back", or "leave".
enum PromptFlow<T> {
    Value(T),
    Back,
    Quit,
}

fn flow<T>(result: Result<T, InquireError>) -> Result<PromptFlow<T>> {
    match result {
        Ok(value) => Ok(PromptFlow::Value(value)),
        Err(InquireError::OperationCanceled) => Ok(PromptFlow::Back),
        Err(InquireError::OperationInterrupted) => Ok(PromptFlow::Quit),
        Err(err) => Err(err.into()),
    }
}

async fn interactive() -> Result<()> {
    const SEARCH: &str = "Search city";
    const REFRESH: &str = "Refresh";
    const HISTORY: &str = "Recent searches";
    const CLEAR_HISTORY: &str = "Clear history";
    const TOGGLE_THEME: &str = "Toggle theme";
    const QUIT: &str = "Quit";

    let (controller, init_failed) = build_controller();
    if init_failed {
        eprintln!("{}", WeatherError::InitializationFailure);
    }

    if let ViewState::Idle { message } = controller.view_state() {
        println!("{message}");
    }

    loop {
        let mut options = vec![SEARCH];
        if matches!(controller.view_state(), ViewState::Success { .. }) {
            options.push(REFRESH);
        }
        if !controller.history().is_empty() {
            options.push(HISTORY);
            options.push(CLEAR_HISTORY);
        }
        options.push(TOGGLE_THEME);
        options.push(QUIT);

        let choice = match flow(Select::new("What next?", options).prompt())? {
            PromptFlow::Value(choice) => choice,
            PromptFlow::Back | PromptFlow::Quit => break,
        };

        match choice {
            SEARCH => {
                let city = match flow(Text::new("City:").prompt())? {
                    PromptFlow::Value(city) => city,
                    PromptFlow::Back => continue,
                    PromptFlow::Quit => break,
                };
                controller.submit(&city).await;
                render::view_state(&controller.view_state());
            }
            REFRESH => {
                controller.refresh().await;
                render::view_state(&controller.view_state());
            }
            HISTORY => {
                let names: Vec<String> = controller
                    .history()
                    .iter()
                    .map(|entry| entry.location_name.clone())
                    .collect();

                let name = match flow(Select::new("Recent searches", names).prompt())? {
                    PromptFlow::Value(name) => name,
                    PromptFlow::Back => continue,
                    PromptFlow::Quit => break,
                };
                controller.select_history(&name).await;
                render::view_state(&controller.view_state());
            }
            CLEAR_HISTORY => {
                controller.clear_history();
                println!("History cleared.");
            }
            TOGGLE_THEME => {
                println!("Theme: {}", controller.toggle_theme());
            }
            _ => break,
        }
    }

    Ok(())
}

fn history(clear: bool) -> Result<()> {
    let paths = StoragePaths::resolve()?;
    let store = HistoryStore::new(paths.history);

    if clear {
        store.clear();
        println!("History cleared.");
    } else {
        render::history(&store.load());
    }

    Ok(())
}

fn theme(value: Option<&str>) -> Result<()> {
    let paths = StoragePaths::resolve()?;
    let store = PreferenceStore::new(paths.theme);

    let next = match value {
        Some(value) => Theme::try_from(value)?,
        None => store.load_theme().unwrap_or_default().toggled(),
    };

    store.save_theme(next);
    println!("Theme: {next}");

    Ok(())
}

fn configure() -> Result<()> {
    let key = Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()?;
    let key = key.trim().to_string();
    if key.is_empty() {
        bail!("API key cannot be empty.");
    }

    let config = Config { api_key: Some(key) };
    config.save()?;

    println!(
        "Saved API key to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
