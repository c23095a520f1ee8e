//! Progress trigger: presses pause once when playback completion crosses the
//! profile threshold.

use coursecap_config::SiteProfile;
use coursecap_core::{SessionEvent, SessionEventKind};
use coursecap_host::HostPage;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::session::emit_to;

/// Inline style attribute the player widens as playback advances.
pub const PROGRESS_ATTR: &str = "style.width";

/// How a progress watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressOutcome {
    /// The threshold was crossed and pause was pressed.
    Triggered,
    /// A navigation ended the watch before the threshold.
    Cancelled,
    /// A host feed closed.
    FeedClosed,
}

/// Watches a progress bar's inline width and pauses the player once near the
/// end, so autoplay never carries the lecture past its completion mark.
pub struct ProgressTrigger {
    host: Arc<dyn HostPage>,
    bar_selector: String,
    pause_selector: Option<String>,
    threshold_pct: f64,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    session: Uuid,
}

impl ProgressTrigger {
    /// Builds the trigger for a profile. `None` when the profile disables it
    /// or names no progress bar.
    pub(crate) fn for_session(
        host: Arc<dyn HostPage>,
        profile: &SiteProfile,
        events: Option<mpsc::UnboundedSender<SessionEvent>>,
        session: Uuid,
    ) -> Option<Self> {
        if !profile.progress.enabled {
            return None;
        }
        let bar_selector = profile.selectors.progress_bar.clone()?;
        Some(Self {
            host,
            bar_selector,
            pause_selector: profile.selectors.pause_button.clone(),
            threshold_pct: profile.progress.threshold_pct,
            events,
            session,
        })
    }

    /// Runs until the threshold is crossed, a navigation ends the watch, or a
    /// host feed closes.
    pub async fn run(self) -> ProgressOutcome {
        let mut updates = self
            .host
            .attribute_updates(&self.bar_selector, PROGRESS_ATTR);
        let mut navigations = self.host.navigations();

        // A nearly finished video can already sit past the threshold.
        if let Some(value) = self.host.query_attr(&self.bar_selector, PROGRESS_ATTR).await {
            if self.crossed(&value) {
                return self.fire(&value).await;
            }
        }

        loop {
            tokio::select! {
                received = updates.recv() => match received {
                    Ok(value) => {
                        if self.crossed(&value) {
                            return self.fire(&value).await;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(session = %self.session, skipped, "progress feed lagged")
                    }
                    Err(RecvError::Closed) => return ProgressOutcome::FeedClosed,
                },
                received = navigations.recv() => match received {
                    Ok(_) => {
                        debug!(session = %self.session, "navigation; progress watch ended");
                        return ProgressOutcome::Cancelled;
                    }
                    Err(RecvError::Lagged(_)) => return ProgressOutcome::Cancelled,
                    Err(RecvError::Closed) => return ProgressOutcome::FeedClosed,
                },
            }
        }
    }

    fn crossed(&self, value: &str) -> bool {
        matches!(parse_progress(value), Some(pct) if pct >= self.threshold_pct)
    }

    async fn fire(self, value: &str) -> ProgressOutcome {
        info!(
            session = %self.session,
            progress = value,
            threshold = self.threshold_pct,
            "completion threshold crossed; pressing pause"
        );
        match &self.pause_selector {
            Some(selector) => {
                if let Err(e) = self.host.press(selector).await {
                    warn!(session = %self.session, error = %e, "pause press failed");
                }
            }
            None => {
                warn!(session = %self.session, "no pause button configured; nothing pressed")
            }
        }
        emit_to(
            &self.events,
            self.session,
            SessionEventKind::ProgressPause,
            json!({ "progress": value }),
        );
        ProgressOutcome::Triggered
    }
}

/// Parses the leading percentage out of an inline width value such as
/// `"98.71%"`. `None` for values that do not start with a number.
pub fn parse_progress(value: &str) -> Option<f64> {
    let numeric: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursecap_config::builtin_profiles;
    use coursecap_host::SimPage;

    const BAR: &str = r#"div[data-purpose="video-progress-bar"] > div > div:nth-of-type(2)"#;
    const PAUSE: &str = r#"button[data-purpose="pause-button"]"#;

    fn udemy() -> SiteProfile {
        builtin_profiles()
            .into_iter()
            .find(|p| p.id == "udemy")
            .unwrap()
    }

    fn trigger(
        page: &Arc<SimPage>,
        profile: &SiteProfile,
    ) -> (ProgressTrigger, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let trigger = ProgressTrigger::for_session(
            Arc::clone(page) as Arc<dyn HostPage>,
            profile,
            Some(tx),
            Uuid::new_v4(),
        )
        .unwrap();
        (trigger, rx)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn parse_progress_reads_the_leading_number() {
        assert_eq!(parse_progress("98.71%"), Some(98.71));
        assert_eq!(parse_progress("100%"), Some(100.0));
        assert_eq!(parse_progress(" 42% "), Some(42.0));
        assert_eq!(parse_progress("auto"), None);
        assert_eq!(parse_progress(""), None);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_is_pressed_once_past_the_threshold() {
        let page = Arc::new(SimPage::new("udemy"));
        page.set_text(PAUSE, "");
        let (trigger, mut rx) = trigger(&page, &udemy());
        let handle = tokio::spawn(trigger.run());
        settle().await;

        page.update_attr(BAR, PROGRESS_ATTR, "45%");
        settle().await;
        assert_eq!(page.press_count(PAUSE), 0);

        page.update_attr(BAR, PROGRESS_ATTR, "98.71%");
        assert_eq!(handle.await.unwrap(), ProgressOutcome::Triggered);
        assert_eq!(page.press_count(PAUSE), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, SessionEventKind::ProgressPause);
        assert_eq!(event.detail["progress"], "98.71%");
    }

    #[tokio::test(start_paused = true)]
    async fn an_already_finished_video_fires_immediately() {
        let page = Arc::new(SimPage::new("udemy"));
        page.set_text(PAUSE, "");
        page.set_attr(BAR, PROGRESS_ATTR, "99.2%");
        let (trigger, _rx) = trigger(&page, &udemy());
        assert_eq!(trigger.run().await, ProgressOutcome::Triggered);
        assert_eq!(page.press_count(PAUSE), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_ends_the_watch() {
        let page = Arc::new(SimPage::new("udemy"));
        page.set_text(PAUSE, "");
        let (trigger, _rx) = trigger(&page, &udemy());
        let handle = tokio::spawn(trigger.run());
        settle().await;

        page.navigate("https://learn.example.com/course/lecture/4");
        assert_eq!(handle.await.unwrap(), ProgressOutcome::Cancelled);
        assert_eq!(page.press_count(PAUSE), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn a_missing_pause_button_still_reports_the_trigger() {
        let page = Arc::new(SimPage::new("udemy"));
        page.set_attr(BAR, PROGRESS_ATTR, "99%");
        let (trigger, mut rx) = trigger(&page, &udemy());
        assert_eq!(trigger.run().await, ProgressOutcome::Triggered);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, SessionEventKind::ProgressPause);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_profiles_build_no_trigger() {
        let page = Arc::new(SimPage::new("youtube"));
        let profile = builtin_profiles()
            .into_iter()
            .find(|p| p.id == "youtube")
            .unwrap();
        let built = ProgressTrigger::for_session(
            Arc::clone(&page) as Arc<dyn HostPage>,
            &profile,
            None,
            Uuid::new_v4(),
        );
        assert!(built.is_none());
    }
}
