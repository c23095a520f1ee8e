//! Editor surface the notes watcher drives.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::process::Command;
use tracing::debug;

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// What the watcher needs from an editor.
#[async_trait]
pub trait EditorSurface: Send + Sync {
    /// Opens a file, as a preview tab where the editor supports it.
    async fn open(&self, path: &Path, preview: bool) -> Result<()>;

    /// Closes other open files carrying `extension`, sparing names in `keep`.
    /// Implementations without tab control treat this as a no-op.
    async fn close_others(&self, extension: &str, keep: &[String]) -> Result<()>;

    /// Scrolls an open file to a 1-based line and column.
    async fn reveal(&self, path: &Path, line: u32, col: u32) -> Result<()>;

    /// Whether the file is currently open.
    async fn is_open(&self, path: &Path) -> bool;
}

// ---------------------------------------------------------------------------
// code CLI
// ---------------------------------------------------------------------------

/// Editor driven through the `code` command line.
///
/// The CLI can open files and jump to positions but has no way to enumerate
/// or close tabs, so `close_others` is a no-op and `is_open` reports every
/// file as open.
pub struct CodeCliEditor {
    binary: String,
}

impl CodeCliEditor {
    pub fn new() -> Self {
        Self::with_binary("code")
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        debug!(binary = %self.binary, ?args, "editor command");
        let status = Command::new(&self.binary).args(args).status().await?;
        if !status.success() {
            bail!("editor command exited with {status}");
        }
        Ok(())
    }
}

impl Default for CodeCliEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn goto_arg(path: &Path, line: u32, col: u32) -> String {
    format!("{}:{line}:{col}", path.display())
}

#[async_trait]
impl EditorSurface for CodeCliEditor {
    async fn open(&self, path: &Path, _preview: bool) -> Result<()> {
        self.run(&[
            "--reuse-window".to_string(),
            path.display().to_string(),
        ])
        .await
    }

    async fn close_others(&self, extension: &str, _keep: &[String]) -> Result<()> {
        debug!(extension, "close-others not available through the CLI; skipped");
        Ok(())
    }

    async fn reveal(&self, path: &Path, line: u32, col: u32) -> Result<()> {
        self.run(&[
            "--reuse-window".to_string(),
            "--goto".to_string(),
            goto_arg(path, line, col),
        ])
        .await
    }

    async fn is_open(&self, _path: &Path) -> bool {
        // The CLI cannot ask; treat every file as open and let jumps apply.
        true
    }
}

// ---------------------------------------------------------------------------
// Recording double
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RecordingState {
    opened: Vec<(PathBuf, bool)>,
    revealed: Vec<(PathBuf, u32, u32)>,
    closed: Vec<(String, Vec<String>)>,
    open_paths: HashSet<PathBuf>,
}

/// Editor that records calls instead of driving anything. Tests and dry runs
/// use it the way captures use a recording submitter.
#[derive(Debug, Default)]
pub struct RecordingEditor {
    state: Mutex<RecordingState>,
}

impl RecordingEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a file open without recording an `open` call, for seeding state.
    pub fn mark_open(&self, path: impl Into<PathBuf>) {
        locked(&self.state).open_paths.insert(path.into());
    }

    pub fn opened(&self) -> Vec<(PathBuf, bool)> {
        locked(&self.state).opened.clone()
    }

    pub fn revealed(&self) -> Vec<(PathBuf, u32, u32)> {
        locked(&self.state).revealed.clone()
    }

    pub fn closed(&self) -> Vec<(String, Vec<String>)> {
        locked(&self.state).closed.clone()
    }
}

#[async_trait]
impl EditorSurface for RecordingEditor {
    async fn open(&self, path: &Path, preview: bool) -> Result<()> {
        let mut state = locked(&self.state);
        state.opened.push((path.to_path_buf(), preview));
        state.open_paths.insert(path.to_path_buf());
        Ok(())
    }

    async fn close_others(&self, extension: &str, keep: &[String]) -> Result<()> {
        let mut state = locked(&self.state);
        state.closed.push((extension.to_string(), keep.to_vec()));
        state.open_paths.retain(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            !name.ends_with(extension) || keep.iter().any(|k| k == name)
        });
        Ok(())
    }

    async fn reveal(&self, path: &Path, line: u32, col: u32) -> Result<()> {
        locked(&self.state)
            .revealed
            .push((path.to_path_buf(), line, col));
        Ok(())
    }

    async fn is_open(&self, path: &Path) -> bool {
        locked(&self.state).open_paths.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goto_arg_is_editor_addressable() {
        assert_eq!(
            goto_arg(Path::new("/notes/lecture.md"), 12, 1),
            "/notes/lecture.md:12:1"
        );
    }

    #[tokio::test]
    async fn recording_editor_tracks_open_state() {
        let editor = RecordingEditor::new();
        editor.open(Path::new("/notes/a.md"), false).await.unwrap();
        editor.open(Path::new("/notes/titles.md"), false).await.unwrap();
        assert!(editor.is_open(Path::new("/notes/a.md")).await);

        editor
            .close_others(".md", &["titles.md".to_string()])
            .await
            .unwrap();
        assert!(!editor.is_open(Path::new("/notes/a.md")).await);
        assert!(editor.is_open(Path::new("/notes/titles.md")).await);
    }

    #[tokio::test]
    async fn cli_editor_surfaces_command_failures() {
        let ok = CodeCliEditor::with_binary("true");
        ok.open(Path::new("/tmp/x.md"), false).await.unwrap();

        let failing = CodeCliEditor::with_binary("false");
        assert!(failing.open(Path::new("/tmp/x.md"), false).await.is_err());
    }
}
