//! The notes watcher: filesystem events in, editor actions out.

use crate::debounce::Debouncer;
use crate::editor::EditorSurface;
use crate::rules;
use anyhow::{bail, Result};
use coursecap_config::NotesConfig;
use notify::{RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Watches the collector's note tree and keeps the editor in step with it.
///
/// Three behaviors, each gated by config: a fresh per-lecture note replaces
/// the previously open notes, a fresh screenshot opens as a preview once the
/// file has settled, and edits to an open note scroll it to the newest
/// screenshot link.
pub struct NotesWatcher {
    config: NotesConfig,
    root: PathBuf,
    editor: Arc<dyn EditorSurface>,
    enabled: Arc<AtomicBool>,
    debouncer: Debouncer,
    debounced: Option<mpsc::UnboundedReceiver<PathBuf>>,
}

impl NotesWatcher {
    pub fn new(config: NotesConfig, root: PathBuf, editor: Arc<dyn EditorSurface>) -> Self {
        let (debouncer, debounced) = Debouncer::new(Duration::from_millis(config.debounce_ms));
        Self {
            config,
            root,
            editor,
            enabled: Arc::new(AtomicBool::new(true)),
            debouncer,
            debounced: Some(debounced),
        }
    }

    /// Shared on/off toggle. Flipping it pauses event handling without
    /// tearing the watcher down.
    pub fn enabled_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.enabled)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs until the filesystem feed closes.
    pub async fn run(mut self) -> Result<()> {
        let Some(mut debounced) = self.debounced.take() else {
            bail!("notes watcher already running");
        };
        let (bridge_tx, mut bridge_rx) = mpsc::channel::<notify::Event>(256);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    if let Err(e) = bridge_tx.blocking_send(event) {
                        warn!("failed to forward file event: {e}");
                    }
                }
                Err(e) => warn!("file watch error: {e}"),
            }
        })?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        info!(root = %self.root.display(), "notes watcher running");

        loop {
            tokio::select! {
                maybe = bridge_rx.recv() => match maybe {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        warn!("file event feed closed; notes watcher stopping");
                        return Ok(());
                    }
                },
                maybe = debounced.recv() => {
                    if let Some(path) = maybe {
                        self.jump_to_latest_screenshot(&path).await;
                    }
                },
            }
        }
    }

    /// Applies one raw filesystem event.
    pub async fn handle_event(&self, event: notify::Event) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        if event.kind.is_create() {
            for path in &event.paths {
                self.on_created(path).await;
            }
        } else if event.kind.is_modify() {
            for path in &event.paths {
                self.on_modified(path.clone()).await;
            }
        }
    }

    async fn on_created(&self, path: &Path) {
        if rules::is_image(path, &self.config.image_extensions) {
            if !self.config.auto_open_images {
                return;
            }
            let editor = Arc::clone(&self.editor);
            let path = path.to_path_buf();
            let settle = Duration::from_millis(self.config.image_settle_ms);
            tokio::spawn(async move {
                // Give the collector time to finish writing the file.
                tokio::time::sleep(settle).await;
                if !path.exists() {
                    debug!(path = %path.display(), "image gone after the settle; not opened");
                    return;
                }
                if let Err(e) = editor.open(&path, true).await {
                    warn!(path = %path.display(), error = %e, "image open failed");
                }
            });
            return;
        }

        if !self.config.auto_open_markdown || !rules::is_auto_open_note(path) {
            return;
        }
        info!(path = %path.display(), "new lecture note; opening");
        if let Err(e) = self.editor.close_others(".md", &self.config.keep_open).await {
            warn!(error = %e, "closing previous notes failed");
        }
        if let Err(e) = self.editor.open(path, false).await {
            warn!(path = %path.display(), error = %e, "note open failed");
        }
    }

    async fn on_modified(&self, path: PathBuf) {
        if !self.config.jump_to_screenshot {
            return;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            return;
        }
        self.debouncer.touch(path).await;
    }

    /// Scrolls an open note to its newest screenshot link. Notes that are not
    /// open stay untouched.
    pub async fn jump_to_latest_screenshot(&self, path: &Path) {
        if !self.editor.is_open(path).await {
            debug!(path = %path.display(), "note not open; jump skipped");
            return;
        }
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "note unreadable; jump skipped");
                return;
            }
        };
        let Some(offset) = rules::last_screenshot_link(&text) else {
            return;
        };
        let (line, col) = rules::offset_to_position(&text, offset);
        debug!(path = %path.display(), line, col, "revealing latest screenshot link");
        if let Err(e) = self.editor.reveal(path, line, col).await {
            warn!(path = %path.display(), error = %e, "reveal failed");
        }
    }
}
