//! Media key bridge: hardware play, pause, next and previous mapped onto the
//! player controls a profile names.

use coursecap_config::{KeyAction, MediaKeyRules, PlayerControl, SelectorSet, SiteProfile};
use coursecap_core::{CaptureError, SessionEvent, SessionEventKind};
use coursecap_host::{HostPage, MediaKey};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::emit_to;

/// Forwards hardware media keys to the page once the player controls exist.
///
/// Binding retries on an interval because players mount their controls well
/// after the page loads. Keys arriving before a successful bind are ignored.
pub struct MediaKeyBridge {
    host: Arc<dyn HostPage>,
    rules: MediaKeyRules,
    selectors: SelectorSet,
    video_selector: String,
    settle: Duration,
    last_video: Option<String>,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    session: Uuid,
}

impl MediaKeyBridge {
    /// Builds the bridge for a profile. `None` when the profile disables
    /// media keys.
    pub(crate) fn for_session(
        host: Arc<dyn HostPage>,
        profile: &SiteProfile,
        events: Option<mpsc::UnboundedSender<SessionEvent>>,
        session: Uuid,
    ) -> Option<Self> {
        if !profile.media_keys.enabled {
            return None;
        }
        let video_selector = profile
            .selectors
            .video
            .clone()
            .unwrap_or_else(|| "video".to_string());
        Some(Self {
            host,
            rules: profile.media_keys.clone(),
            selectors: profile.selectors.clone(),
            video_selector,
            settle: Duration::from_millis(profile.timings.navigation_settle_ms),
            last_video: None,
            events,
            session,
        })
    }

    /// Runs until a host feed closes. Rebinds after every navigation.
    pub async fn run(mut self) {
        let mut keys = self.host.media_keys();
        let mut navigations = self.host.navigations();
        let mut bound = self.bind().await;

        loop {
            tokio::select! {
                received = keys.recv() => match received {
                    Ok(key) => {
                        if !bound {
                            debug!(session = %self.session, key = ?key, "media key before controls bound; ignored");
                            continue;
                        }
                        self.dispatch(key).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session = %self.session, skipped, "media key feed lagged")
                    }
                    Err(RecvError::Closed) => return,
                },
                received = navigations.recv() => match received {
                    Ok(nav) => {
                        debug!(session = %self.session, url = %nav.url, "navigation; rebinding media keys");
                        if !self.settle.is_zero() {
                            tokio::time::sleep(self.settle).await;
                        }
                        bound = self.bind().await;
                    }
                    Err(RecvError::Lagged(_)) => {
                        bound = self.bind().await;
                    }
                    Err(RecvError::Closed) => return,
                },
            }
        }
    }

    /// Probes for the player controls until they exist or attempts run out.
    async fn bind(&mut self) -> bool {
        let anchor = self.anchor_selector();
        for attempt in 1..=self.rules.max_attempts.max(1) {
            if self.host.query_text(&anchor).await.is_some() {
                let video = self.host.query_attr(&self.video_selector, "src").await;
                if video.is_some() && video == self.last_video {
                    debug!(session = %self.session, "same video after navigation; bindings kept");
                    return true;
                }
                self.last_video = video;
                info!(session = %self.session, anchor = %anchor, attempt, "media keys bound");
                emit_to(
                    &self.events,
                    self.session,
                    SessionEventKind::MediaKeysBound,
                    json!({ "anchor": anchor, "attempt": attempt }),
                );
                return true;
            }
            tokio::time::sleep(Duration::from_millis(self.rules.retry_ms)).await;
        }
        warn!(
            session = %self.session,
            anchor = %anchor,
            attempts = self.rules.max_attempts,
            "player controls never appeared; media keys stay unbound"
        );
        false
    }

    async fn dispatch(&self, key: MediaKey) {
        let action = match key {
            MediaKey::Play => &self.rules.play,
            MediaKey::Pause => &self.rules.pause,
            MediaKey::NextTrack => &self.rules.next,
            MediaKey::PreviousTrack => &self.rules.previous,
        };
        debug!(session = %self.session, key = ?key, action = ?action, "media key");
        if let Err(e) = self.apply(action).await {
            warn!(session = %self.session, key = ?key, error = %e, "media key action failed");
        }
    }

    async fn apply(&self, action: &KeyAction) -> Result<(), CaptureError> {
        match action {
            KeyAction::Press { control } => {
                let selector = self.control_selector(*control).ok_or_else(|| {
                    CaptureError::Config(format!("no selector for the {control:?} control"))
                })?;
                self.host.press(&selector).await
            }
            KeyAction::Seek { seconds } => self.host.seek_by(&self.video_selector, *seconds).await,
            KeyAction::Playback { play } => {
                self.host.set_playing(&self.video_selector, *play).await
            }
            KeyAction::Ignore => Ok(()),
        }
    }

    fn control_selector(&self, control: PlayerControl) -> Option<String> {
        match control {
            PlayerControl::Play => self.selectors.play_button.clone(),
            PlayerControl::Pause => self.selectors.pause_button.clone(),
            PlayerControl::Forward => self.selectors.forward_button.clone(),
        }
    }

    /// The element whose presence signals the player is ready. The play
    /// button where the profile has one, the video element otherwise.
    fn anchor_selector(&self) -> String {
        self.selectors
            .play_button
            .clone()
            .unwrap_or_else(|| self.video_selector.clone())
    }
}
