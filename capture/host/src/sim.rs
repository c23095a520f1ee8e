//! Scripted host page used by the replay harness and the test suites.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use coursecap_core::{CaptureError, ScreenshotAsset};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::broadcast;
use tracing::debug;

use crate::page::HostPage;
use crate::types::{FrameMessage, MediaKey, Navigation, TransferRecord};

const FEED_CAPACITY: usize = 64;

fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// An in-memory page whose state and events are driven by the caller.
///
/// Selector lookups are exact-string matches against scripted entries; a
/// descendant selector is scripted as the full combined string.
pub struct SimPage {
    name: String,
    url: Mutex<String>,
    title: Mutex<Option<String>>,
    dom: Mutex<HashMap<String, String>>,
    attrs: Mutex<HashMap<(String, String), String>>,
    sections: Mutex<HashMap<String, String>>,
    resources: Mutex<HashMap<String, String>>,
    parent_title: Mutex<Option<String>>,
    frame_image: Mutex<Option<String>>,

    transfers_tx: broadcast::Sender<TransferRecord>,
    navigations_tx: broadcast::Sender<Navigation>,
    media_keys_tx: broadcast::Sender<MediaKey>,
    frames_tx: broadcast::Sender<FrameMessage>,
    attr_watches: Mutex<HashMap<(String, String), broadcast::Sender<String>>>,

    presses: Mutex<HashMap<String, u32>>,
    seeks: Mutex<Vec<f64>>,
    playback: Mutex<Vec<bool>>,
    posted: Mutex<Vec<FrameMessage>>,
}

impl SimPage {
    pub fn new(name: impl Into<String>) -> Self {
        let (transfers_tx, _) = broadcast::channel(FEED_CAPACITY);
        let (navigations_tx, _) = broadcast::channel(FEED_CAPACITY);
        let (media_keys_tx, _) = broadcast::channel(FEED_CAPACITY);
        let (frames_tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            name: name.into(),
            url: Mutex::new("about:blank".to_string()),
            title: Mutex::new(None),
            dom: Mutex::new(HashMap::new()),
            attrs: Mutex::new(HashMap::new()),
            sections: Mutex::new(HashMap::new()),
            resources: Mutex::new(HashMap::new()),
            parent_title: Mutex::new(None),
            frame_image: Mutex::new(None),
            transfers_tx,
            navigations_tx,
            media_keys_tx,
            frames_tx,
            attr_watches: Mutex::new(HashMap::new()),
            presses: Mutex::new(HashMap::new()),
            seeks: Mutex::new(Vec::new()),
            playback: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
        }
    }

    // -- scripting ---------------------------------------------------------

    pub fn set_text(&self, selector: impl Into<String>, text: impl Into<String>) {
        locked(&self.dom).insert(selector.into(), text.into());
    }

    pub fn remove_element(&self, selector: &str) {
        locked(&self.dom).remove(selector);
    }

    pub fn set_attr(
        &self,
        selector: impl Into<String>,
        attr: impl Into<String>,
        value: impl Into<String>,
    ) {
        locked(&self.attrs).insert((selector.into(), attr.into()), value.into());
    }

    /// Sets an attribute and publishes the new value to any watcher.
    pub fn update_attr(&self, selector: &str, attr: &str, value: impl Into<String>) {
        let value = value.into();
        locked(&self.attrs).insert((selector.to_string(), attr.to_string()), value.clone());
        if let Some(tx) = locked(&self.attr_watches).get(&(selector.to_string(), attr.to_string()))
        {
            let _ = tx.send(value);
        }
    }

    pub fn set_document_title(&self, title: impl Into<String>) {
        *locked(&self.title) = Some(title.into());
    }

    pub fn set_section_heading(&self, active_item: impl Into<String>, heading: impl Into<String>) {
        locked(&self.sections).insert(active_item.into(), heading.into());
    }

    /// Body served when the runtime fetches `url` through this page.
    pub fn set_resource(&self, url: impl Into<String>, body: impl Into<String>) {
        locked(&self.resources).insert(url.into(), body.into());
    }

    /// With a parent title set, `need-title` posts are answered immediately.
    pub fn set_parent_title(&self, title: impl Into<String>) {
        *locked(&self.parent_title) = Some(title.into());
    }

    pub fn set_frame_image(&self, data_url: impl Into<String>) {
        *locked(&self.frame_image) = Some(data_url.into());
    }

    // -- event injection ---------------------------------------------------

    pub fn emit_transfer(&self, record: TransferRecord) {
        debug!(page = %self.name, url = %record.url, "sim transfer");
        let _ = self.transfers_tx.send(record);
    }

    pub fn navigate(&self, url: impl Into<String>) {
        let url = url.into();
        *locked(&self.url) = url.clone();
        let _ = self.navigations_tx.send(Navigation { url });
    }

    pub fn emit_media_key(&self, key: MediaKey) {
        let _ = self.media_keys_tx.send(key);
    }

    /// Manually answers a pending title request.
    pub fn respond_title(&self, title: impl Into<String>) {
        let _ = self.frames_tx.send(FrameMessage::TitleResponse {
            title: title.into(),
        });
    }

    // -- inspection --------------------------------------------------------

    pub fn press_count(&self, selector: &str) -> u32 {
        locked(&self.presses).get(selector).copied().unwrap_or(0)
    }

    pub fn seeks(&self) -> Vec<f64> {
        locked(&self.seeks).clone()
    }

    pub fn playback_calls(&self) -> Vec<bool> {
        locked(&self.playback).clone()
    }

    pub fn posted_messages(&self) -> Vec<FrameMessage> {
        locked(&self.posted).clone()
    }

    fn placeholder_image(&self, format: &str, label: &str) -> ScreenshotAsset {
        let bytes = format!("sim-{label}-{}", self.name);
        ScreenshotAsset::from_data_url(format!(
            "data:image/{format};base64,{}",
            BASE64.encode(bytes)
        ))
    }
}

#[async_trait]
impl HostPage for SimPage {
    fn name(&self) -> &str {
        &self.name
    }

    async fn current_url(&self) -> String {
        locked(&self.url).clone()
    }

    async fn document_title(&self) -> Option<String> {
        locked(&self.title).clone()
    }

    async fn query_text(&self, selector: &str) -> Option<String> {
        locked(&self.dom).get(selector).cloned()
    }

    async fn query_attr(&self, selector: &str, attr: &str) -> Option<String> {
        locked(&self.attrs)
            .get(&(selector.to_string(), attr.to_string()))
            .cloned()
    }

    async fn section_heading(&self, active_item: &str) -> Option<String> {
        locked(&self.sections).get(active_item).cloned()
    }

    fn transfers(&self) -> broadcast::Receiver<TransferRecord> {
        self.transfers_tx.subscribe()
    }

    fn navigations(&self) -> broadcast::Receiver<Navigation> {
        self.navigations_tx.subscribe()
    }

    fn media_keys(&self) -> broadcast::Receiver<MediaKey> {
        self.media_keys_tx.subscribe()
    }

    fn frame_messages(&self) -> broadcast::Receiver<FrameMessage> {
        self.frames_tx.subscribe()
    }

    fn attribute_updates(&self, selector: &str, attr: &str) -> broadcast::Receiver<String> {
        let mut watches = locked(&self.attr_watches);
        watches
            .entry((selector.to_string(), attr.to_string()))
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }

    async fn press(&self, selector: &str) -> Result<(), CaptureError> {
        if !locked(&self.dom).contains_key(selector) {
            return Err(CaptureError::MissingElement(selector.to_string()));
        }
        *locked(&self.presses).entry(selector.to_string()).or_insert(0) += 1;
        Ok(())
    }

    async fn seek_by(&self, selector: &str, seconds: f64) -> Result<(), CaptureError> {
        if !locked(&self.dom).contains_key(selector) {
            return Err(CaptureError::MissingElement(selector.to_string()));
        }
        locked(&self.seeks).push(seconds);
        Ok(())
    }

    async fn set_playing(&self, selector: &str, playing: bool) -> Result<(), CaptureError> {
        if !locked(&self.dom).contains_key(selector) {
            return Err(CaptureError::MissingElement(selector.to_string()));
        }
        locked(&self.playback).push(playing);
        Ok(())
    }

    async fn post_to_parent(&self, message: FrameMessage) -> Result<(), CaptureError> {
        locked(&self.posted).push(message.clone());
        if matches!(message, FrameMessage::NeedTitle) {
            if let Some(title) = locked(&self.parent_title).clone() {
                let _ = self.frames_tx.send(FrameMessage::TitleResponse { title });
            }
        }
        Ok(())
    }

    async fn fetch_resource(&self, url: &str) -> Result<String, CaptureError> {
        locked(&self.resources).get(url).cloned().ok_or_else(|| {
            CaptureError::Other(anyhow::anyhow!("fetch failed: no body for `{url}`"))
        })
    }

    async fn capture_tab(
        &self,
        format: &str,
        _quality: u8,
    ) -> Result<ScreenshotAsset, CaptureError> {
        Ok(self.placeholder_image(format, "tab"))
    }

    async fn capture_frame(&self, selector: &str) -> Result<ScreenshotAsset, CaptureError> {
        if !locked(&self.dom).contains_key(selector) {
            return Err(CaptureError::NoVideo);
        }
        match locked(&self.frame_image).clone() {
            Some(data) => Ok(ScreenshotAsset::from_data_url(data)),
            None => Ok(self.placeholder_image("png", "frame")),
        }
    }
}
