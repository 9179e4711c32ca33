use std::fs;
use std::path::PathBuf;

use crate::model::Theme;

/// Durable store for the single display preference.
///
/// Pure pass-through: failures are swallowed and logged, and the in-memory
/// value stays the session's source of truth.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A store without a backing file; the preference lives only for the
    /// session.
    pub fn detached() -> Self {
        Self { path: None }
    }

    /// Returns the saved theme, or `None` when nothing valid is stored.
    pub fn load_theme(&self) -> Option<Theme> {
        let path = self.path.as_ref()?;
        let contents = fs::read_to_string(path).ok()?;

        match Theme::try_from(contents.as_str()) {
            Ok(theme) => Some(theme),
            Err(err) => {
                tracing::debug!("Ignoring saved theme in {}: {err}", path.display());
                None
            }
        }
    }

    /// Best-effort write of the preference.
    pub fn save_theme(&self, theme: Theme) {
        let Some(path) = &self.path else { return };

        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                tracing::warn!(
                    "Failed to create preference directory {}: {err}",
                    parent.display()
                );
                return;
            }
        }

        if let Err(err) = fs::write(path, theme.as_str()) {
            tracing::warn!("Failed to save theme to {}: {err}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_file_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::new(dir.path().join("theme"));

        assert_eq!(store.load_theme(), None);
    }

    #[test]
    fn saved_theme_survives_a_fresh_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme");

        PreferenceStore::new(path.clone()).save_theme(Theme::Dark);

        assert_eq!(PreferenceStore::new(path).load_theme(), Some(Theme::Dark));
    }

    #[test]
    fn garbage_contents_yield_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme");
        fs::write(&path, "neon").unwrap();

        assert_eq!(PreferenceStore::new(path).load_theme(), None);
    }

    #[test]
    fn detached_store_is_a_noop() {
        let store = PreferenceStore::detached();
        store.save_theme(Theme::Dark);
        assert_eq!(store.load_theme(), None);
    }
}
