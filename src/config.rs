//! Configuration loading and hot reload

use std::path::{Path, PathBuf};

use barkeep_types::AppConfig;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc::{self, Receiver};

const APP_NAME: &str = "barkeep";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("configuration file {path} has no parent directory")]
    NoParent { path: PathBuf },

    #[error("failed to watch configuration at {path}")]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Load the config from `path`, or from the platform config directory.
/// Missing files are created with defaults.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => confy::load_path(path)?,
        None => confy::load(APP_NAME, CONFIG_NAME)?,
    };
    Ok(config)
}

/// Resolve the file `load` reads.
pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?),
    }
}

/// Watches the config file for edits.
///
/// The parent directory is watched since editors commonly replace the file
/// instead of writing it in place.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(path: &Path) -> Result<Self, ConfigError> {
        let dir = path.parent().ok_or_else(|| ConfigError::NoParent {
            path: path.to_path_buf(),
        })?;

        let (tx, rx) = mpsc::channel(16);
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.blocking_send(res);
            },
            Config::default(),
        )
        .map_err(|source| ConfigError::Watch {
            path: path.to_path_buf(),
            source,
        })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| ConfigError::Watch {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            _watcher: watcher,
            rx,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolves when the config file was created or modified. `None` once
    /// the watcher is gone.
    pub async fn changed(&mut self) -> Option<()> {
        while let Some(result) = self.rx.recv().await {
            match result {
                Ok(event) if is_config_change(&event, &self.path) => return Some(()),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Config watcher error"),
            }
        }
        None
    }
}

fn is_config_change(event: &Event, path: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p.file_name() == path.file_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, ModifyKind, RemoveKind};

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_edits_to_config_count() {
        let config = Path::new("/home/alice/.config/barkeep/config.toml");

        assert!(is_config_change(
            &event(EventKind::Modify(ModifyKind::Any), "/home/alice/.config/barkeep/config.toml"),
            config
        ));
        assert!(is_config_change(
            &event(EventKind::Create(CreateKind::File), "/home/alice/.config/barkeep/config.toml"),
            config
        ));
        assert!(!is_config_change(
            &event(EventKind::Modify(ModifyKind::Any), "/home/alice/.config/barkeep/barkeep.log"),
            config
        ));
        assert!(!is_config_change(
            &event(EventKind::Remove(RemoveKind::File), "/home/alice/.config/barkeep/config.toml"),
            config
        ));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("barkeep-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "font = \"fixed\"\nkeys = [\"volume\", \"clock\"]\n\n[bar]\nleft_bar_width = 120\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.font, "fixed");
        assert_eq!(config.keys, vec!["volume", "clock"]);
        assert_eq!(config.bar.left_bar_width, 120);
        assert_eq!(resolve_path(Some(&path)).unwrap(), path);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
