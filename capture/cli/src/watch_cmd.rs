//! `coursecap watch`: run the note-tree watcher against a directory.

use anyhow::{bail, Result};
use coursecap_config::CoursecapConfig;
use coursecap_notes::{CodeCliEditor, EditorSurface, NotesWatcher};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: &CoursecapConfig, root_override: Option<PathBuf>) -> Result<()> {
    let root = match root_override.or_else(|| config.notes.root.clone()) {
        Some(root) => root,
        None => bail!("no notes root configured; set `notes.root` or pass --root"),
    };
    if !root.is_dir() {
        bail!("notes root `{}` is not a directory", root.display());
    }

    let editor = Arc::new(CodeCliEditor::new()) as Arc<dyn EditorSurface>;
    let watcher = NotesWatcher::new(config.notes.clone(), root, editor);
    info!(root = %watcher.root().display(), "watching the note tree; ctrl-c to stop");
    watcher.run().await
}
