//! Note-tree watcher for coursecap.
//!
//! The collector files subtitles and screenshots into a markdown note tree.
//! This crate watches that tree and keeps an editor in step with it: fresh
//! lecture notes open automatically, fresh screenshots open in a preview, and
//! edits to an open note scroll it to the newest screenshot link.

pub mod debounce;
pub mod editor;
pub mod rules;
pub mod watcher;

pub use debounce::Debouncer;
pub use editor::{CodeCliEditor, EditorSurface, RecordingEditor};
pub use watcher::NotesWatcher;
