use std::path::PathBuf;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::reactor::{self, Event as ReactorEvent};
use crate::common::config::Config;

/// Polls the config file and hands every successfully parsed revision to the
/// reactor. A file that fails to parse keeps the previous config in effect.
pub struct ConfigWatcher {
    file: PathBuf,
    events_tx: reactor::Sender,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, events_tx: reactor::Sender) -> Self { ConfigWatcher { file, events_tx } }

    pub fn spawn(file: PathBuf, events_tx: reactor::Sender) {
        let watcher = ConfigWatcher::new(file, events_tx);
        tokio::spawn(async move {
            if let Err(e) = watcher.run().await {
                warn!("config-watcher: error: {e:?}");
            }
        });
    }

    pub async fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_compare_contents(true),
        )?;

        // Watch the directory so a file created after startup is picked up.
        let dir = match self.file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        while let Some(res) = rx.recv().await {
            match res {
                Ok(event) if self.is_relevant(&event) => {
                    debug!("change detected: {:?}", event.kind);
                    self.reload();
                }
                Ok(event) => debug!("ignoring unrelated event: {:?}", event.kind),
                Err(e) => warn!("watch error: {e:?}"),
            }
            if self.events_tx.is_closed() {
                break;
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    fn reload(&self) {
        match Self::load(&self.file) {
            Ok(config) => {
                info!("config reloaded");
                self.events_tx.send(ReactorEvent::ConfigUpdated(config));
            }
            Err(e) => warn!("keeping previous config: {e:#}"),
        }
    }

    pub fn load(file: &std::path::Path) -> anyhow::Result<Config> {
        let mut config = Config::read_or_default(file)?;
        let fixes = config.auto_fix_values();
        if fixes > 0 {
            warn!("fixed {fixes} invalid config value(s)");
        }
        for issue in config.validate() {
            warn!("config: {issue}");
        }
        Ok(config)
    }
}
