//! The capture session: one page, one profile, at most one submission per
//! navigation.

use coursecap_config::{ScreenshotSource, SiteProfile, SubtitleMode};
use coursecap_core::{
    CaptureError, Payload, ScreenshotPayload, SessionEvent, SessionEventKind, SubtitleAsset,
    SubtitlePayload, Submitter,
};
use coursecap_host::{HostPage, Navigation, TransferKind, TransferRecord};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::extract;
use crate::matcher::ResourceMatcher;
use crate::media_keys::MediaKeyBridge;
use crate::progress::ProgressTrigger;
use crate::wait;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not watching yet, or disarmed by a watch timeout.
    Idle,
    /// Armed and waiting for a matching resource.
    Watching,
    /// The capture happened; only a navigation leaves this phase.
    Captured,
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    sent: bool,
    seen: HashSet<String>,
    epoch: u64,
    watch_deadline: Option<Instant>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            sent: false,
            seen: HashSet::new(),
            epoch: 0,
            watch_deadline: None,
        }
    }
}

/// Watches one host page with one site profile.
///
/// A session arms after a settle delay, then waits for the first transfer
/// matching the profile's subtitle rules. The first match wins the whole
/// session; navigation resets everything and bumps the epoch so callbacks
/// still in flight from the previous page discard themselves.
pub struct CaptureSession {
    id: Uuid,
    profile: SiteProfile,
    host: Arc<dyn HostPage>,
    submitter: Arc<dyn Submitter>,
    matcher: ResourceMatcher,
    state: Mutex<SessionState>,
    deadline_changed: Notify,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl CaptureSession {
    pub fn new(
        profile: SiteProfile,
        host: Arc<dyn HostPage>,
        submitter: Arc<dyn Submitter>,
    ) -> Self {
        let matcher = ResourceMatcher::new(&profile.subtitles);
        Self {
            id: Uuid::new_v4(),
            profile,
            host,
            submitter,
            matcher,
            state: Mutex::new(SessionState::new()),
            deadline_changed: Notify::new(),
            events: None,
        }
    }

    /// Attaches a lifecycle event channel.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub(crate) async fn epoch(&self) -> u64 {
        self.state.lock().await.epoch
    }

    /// Progress trigger wired to this session's page, when the profile
    /// enables one.
    pub fn progress_trigger(&self) -> Option<ProgressTrigger> {
        ProgressTrigger::for_session(
            Arc::clone(&self.host),
            &self.profile,
            self.events.clone(),
            self.id,
        )
    }

    /// Media key bridge wired to this session's page, when the profile
    /// enables one.
    pub fn media_key_bridge(&self) -> Option<MediaKeyBridge> {
        MediaKeyBridge::for_session(
            Arc::clone(&self.host),
            &self.profile,
            self.events.clone(),
            self.id,
        )
    }

    fn emit(&self, kind: SessionEventKind, detail: serde_json::Value) {
        emit_to(&self.events, self.id, kind, detail);
    }

    /// Runs the event loop until a host feed closes.
    pub async fn run(self: Arc<Self>) -> Result<(), CaptureError> {
        let mut transfers = self.host.transfers();
        let mut navigations = self.host.navigations();
        info!(
            session = %self.id,
            site = %self.profile.id,
            page = self.host.name(),
            "capture session starting"
        );
        let epoch = self.epoch().await;
        self.spawn_arm(epoch, Duration::from_millis(self.profile.timings.arm_delay_ms));

        loop {
            let deadline = self.state.lock().await.watch_deadline;
            tokio::select! {
                received = transfers.recv() => match received {
                    Ok(record) => self.on_transfer(record).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session = %self.id, skipped, "transfer feed lagged")
                    }
                    Err(RecvError::Closed) => {
                        return Err(CaptureError::FeedClosed("transfers".to_string()))
                    }
                },
                received = navigations.recv() => match received {
                    Ok(nav) => self.on_navigation(nav).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(session = %self.id, skipped, "navigation feed lagged")
                    }
                    Err(RecvError::Closed) => {
                        return Err(CaptureError::FeedClosed("navigations".to_string()))
                    }
                },
                // The arm task installs the deadline after this loop has
                // already snapshotted it; a notification re-reads it.
                _ = self.deadline_changed.notified() => {}
                _ = watch_window(deadline) => self.on_watch_timeout().await,
            }
        }
    }

    /// Transitions to `Watching` after `delay`, unless a navigation happened
    /// in the meantime.
    fn spawn_arm(self: &Arc<Self>, epoch: u64, delay: Duration) {
        let session = Arc::clone(self);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            {
                let mut st = session.state.lock().await;
                if st.epoch != epoch {
                    debug!(session = %session.id, "arm callback is stale; discarded");
                    return;
                }
                st.phase = Phase::Watching;
                if session.profile.timings.watch_timeout_ms > 0 {
                    st.watch_deadline = Some(
                        Instant::now()
                            + Duration::from_millis(session.profile.timings.watch_timeout_ms),
                    );
                    session.deadline_changed.notify_one();
                }
            }
            let url = session.host.current_url().await;
            info!(session = %session.id, url = %url, "session armed");
            session.emit(SessionEventKind::Armed, json!({ "url": url }));
            if session.profile.subtitles.enabled
                && session.profile.subtitles.mode == SubtitleMode::TrackPoll
            {
                session.spawn_track_poll(epoch);
            }
        });
    }

    async fn on_transfer(self: &Arc<Self>, record: TransferRecord) {
        if !self.profile.subtitles.enabled
            || self.profile.subtitles.mode != SubtitleMode::Intercept
        {
            return;
        }
        let epoch;
        {
            let mut st = self.state.lock().await;
            match st.phase {
                Phase::Watching => {}
                Phase::Idle => {
                    trace!(session = %self.id, url = %record.url, "transfer before arm; dropped");
                    return;
                }
                Phase::Captured => {
                    trace!(session = %self.id, url = %record.url, "already captured; dropped");
                    return;
                }
            }
            if st.sent {
                return;
            }
            if !st.seen.insert(record.url.clone()) {
                debug!(session = %self.id, url = %record.url, "duplicate resource url; dropped");
                return;
            }
            if !self.matcher.matches(&record.url) {
                trace!(session = %self.id, url = %record.url, "resource does not match subtitle rules");
                return;
            }
            st.sent = true;
            st.phase = Phase::Captured;
            st.watch_deadline = None;
            epoch = st.epoch;
        }
        info!(session = %self.id, url = %record.url, "subtitle resource matched");
        self.emit(
            SessionEventKind::ResourceMatched,
            json!({ "url": record.url, "kind": record.kind }),
        );
        let session = Arc::clone(self);
        tokio::spawn(async move { session.complete_subtitles(record, epoch).await });
    }

    async fn on_navigation(self: &Arc<Self>, nav: Navigation) {
        let epoch = {
            let mut st = self.state.lock().await;
            st.sent = false;
            st.seen.clear();
            st.phase = Phase::Idle;
            st.watch_deadline = None;
            st.epoch += 1;
            st.epoch
        };
        info!(session = %self.id, url = %nav.url, "navigation; session reset");
        self.emit(SessionEventKind::Reset, json!({ "url": nav.url }));
        self.spawn_arm(
            epoch,
            Duration::from_millis(self.profile.timings.navigation_settle_ms),
        );
    }

    async fn on_watch_timeout(&self) {
        let mut st = self.state.lock().await;
        let Some(deadline) = st.watch_deadline else {
            return;
        };
        if Instant::now() < deadline || st.phase != Phase::Watching {
            return;
        }
        st.phase = Phase::Idle;
        st.watch_deadline = None;
        drop(st);
        info!(session = %self.id, "watch window elapsed without a match; disarming");
        self.emit(
            SessionEventKind::WatchTimeout,
            json!({ "watchTimeoutMs": self.profile.timings.watch_timeout_ms }),
        );
    }

    /// Track-poll capture: wait for the subtitle track element, read its
    /// `src`, then run the same completion path as an intercepted transfer.
    fn spawn_track_poll(self: &Arc<Self>, epoch: u64) {
        let Some(track_selector) = self.profile.selectors.subtitle_track.clone() else {
            warn!(session = %self.id, "track-poll mode without a track selector; nothing to do");
            return;
        };
        let session = Arc::clone(self);
        tokio::spawn(async move {
            let poll = Duration::from_millis(session.profile.timings.element_poll_ms);
            let timeout = Duration::from_millis(session.profile.timings.element_timeout_ms);
            let src = match wait::wait_for_attr(
                session.host.as_ref(),
                &track_selector,
                "src",
                poll,
                timeout,
            )
            .await
            {
                Ok(src) => src,
                Err(e) => {
                    warn!(session = %session.id, error = %e, "subtitle track never appeared");
                    let mut st = session.state.lock().await;
                    if st.epoch == epoch && st.phase == Phase::Watching {
                        st.phase = Phase::Idle;
                        st.watch_deadline = None;
                        drop(st);
                        session.emit(
                            SessionEventKind::WatchTimeout,
                            json!({ "selector": track_selector }),
                        );
                    }
                    return;
                }
            };
            {
                let mut st = session.state.lock().await;
                if st.epoch != epoch || st.phase != Phase::Watching || st.sent {
                    return;
                }
                if !st.seen.insert(src.clone()) {
                    return;
                }
                if !session.matcher.matches(&src) {
                    debug!(session = %session.id, url = %src, "track src does not match subtitle rules");
                    return;
                }
                st.sent = true;
                st.phase = Phase::Captured;
                st.watch_deadline = None;
            }
            info!(session = %session.id, url = %src, "subtitle track matched");
            session.emit(
                SessionEventKind::ResourceMatched,
                json!({ "url": src, "kind": TransferKind::Attribute }),
            );
            session
                .complete_subtitles(TransferRecord::new(src, TransferKind::Attribute), epoch)
                .await;
        });
    }

    /// Runs the tail of a subtitle capture: body, context, payload, submit.
    /// Checks the epoch after every await that could span a navigation.
    async fn complete_subtitles(self: Arc<Self>, record: TransferRecord, epoch: u64) {
        let body = match record.body.clone() {
            Some(body) => body,
            None => match self.host.fetch_resource(&record.url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(
                        session = %self.id,
                        url = %record.url,
                        error = %e,
                        "subtitle fetch failed; re-opening the watch"
                    );
                    {
                        let mut st = self.state.lock().await;
                        if st.epoch == epoch {
                            st.sent = false;
                            st.phase = Phase::Watching;
                            // Forget the URL so a later observation can retry.
                            st.seen.remove(&record.url);
                        }
                    }
                    self.emit(
                        SessionEventKind::SubmitFailed,
                        json!({ "stage": "fetch", "url": record.url }),
                    );
                    return;
                }
            },
        };

        let ctx = extract::extract_context(self.host.as_ref(), &self.profile).await;
        if self.epoch().await != epoch {
            debug!(session = %self.id, "navigation during extraction; capture discarded");
            self.emit(SessionEventKind::StaleDropped, json!({ "stage": "subtitles" }));
            return;
        }

        let payload: Payload = SubtitlePayload::assemble(
            &ctx,
            SubtitleAsset::new(record.url, body),
            &self.profile.root_directory,
        )
        .into();
        self.submit_detached(payload);
    }

    /// Captures a screenshot with freshly extracted context and submits it.
    /// Independent of the subtitle watch: it neither reads nor writes the
    /// sent flag.
    pub async fn capture_screenshot_now(&self) -> Result<(), CaptureError> {
        let epoch = self.epoch().await;
        let ctx = extract::extract_context(self.host.as_ref(), &self.profile).await;

        let shot = match self.profile.screenshot.source {
            ScreenshotSource::Tab => {
                self.host
                    .capture_tab(
                        &self.profile.screenshot.format,
                        self.profile.screenshot.quality,
                    )
                    .await?
            }
            ScreenshotSource::VideoFrame => {
                let video = self.profile.selectors.video.as_deref().unwrap_or("video");
                self.host.capture_frame(video).await?
            }
        };

        if self.epoch().await != epoch {
            debug!(session = %self.id, "navigation during screenshot; capture discarded");
            self.emit(SessionEventKind::StaleDropped, json!({ "stage": "screenshot" }));
            return Ok(());
        }

        info!(session = %self.id, timestamp = %ctx.timestamp, "screenshot captured");
        self.emit(
            SessionEventKind::ScreenshotCaptured,
            json!({ "timestamp": ctx.timestamp }),
        );
        let payload: Payload =
            ScreenshotPayload::assemble(&ctx, shot, &self.profile.root_directory).into();
        self.submit_detached(payload);
        Ok(())
    }

    /// Fire-and-forget submission: one attempt, logged either way, never
    /// blocking the caller.
    fn submit_detached(&self, payload: Payload) {
        let submitter = Arc::clone(&self.submitter);
        let events = self.events.clone();
        let id = self.id;
        let route = payload.route();
        tokio::spawn(async move {
            match submitter.submit(&payload).await {
                Ok(response) => {
                    info!(session = %id, route, response = %response, "collector accepted payload");
                    emit_to(&events, id, SessionEventKind::Submitted, json!({ "route": route }));
                }
                Err(e) => {
                    warn!(session = %id, route, error = %e, "collector submission failed; payload dropped");
                    emit_to(
                        &events,
                        id,
                        SessionEventKind::SubmitFailed,
                        json!({ "stage": "post", "route": route }),
                    );
                }
            }
        });
    }
}

async fn watch_window(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

pub(crate) fn emit_to(
    events: &Option<mpsc::UnboundedSender<SessionEvent>>,
    id: Uuid,
    kind: SessionEventKind,
    detail: serde_json::Value,
) {
    if let Some(tx) = events {
        let _ = tx.send(SessionEvent::with_detail(id, kind, detail));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursecap_config::builtin_profiles;
    use coursecap_core::DrySink;
    use coursecap_host::SimPage;

    fn profile(id: &str) -> SiteProfile {
        builtin_profiles()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    fn seeded_udemy_page() -> Arc<SimPage> {
        let page = Arc::new(SimPage::new("udemy"));
        page.set_text(
            r#"h1[data-purpose="course-header-title"]"#,
            "Learn Go | Udemy",
        );
        page.set_text(
            r#"li[aria-current="true"] span[data-purpose="item-title"]"#,
            "3. Variables & Types",
        );
        page.set_section_heading(r#"li[aria-current="true"]"#, "Section 1: Getting Started");
        page.set_text(r#"span[data-purpose="duration"]"#, "12:34");
        page.set_text(r#"span[data-purpose="current-time"]"#, "4:05");
        page.set_text(r#"div[data-purpose="captions-cue-text"]"#, "a variable is");
        page
    }

    fn wire_session(
        profile: SiteProfile,
        page: &Arc<SimPage>,
    ) -> (
        Arc<CaptureSession>,
        Arc<DrySink>,
        mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        let sink = Arc::new(DrySink::new());
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Arc::new(
            CaptureSession::new(
                profile,
                Arc::clone(page) as Arc<dyn HostPage>,
                Arc::clone(&sink) as Arc<dyn Submitter>,
            )
            .with_events(tx),
        );
        (session, sink, rx)
    }

    async fn wait_for_kind(
        rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
        kind: SessionEventKind,
    ) -> SessionEvent {
        tokio::time::timeout(Duration::from_secs(120), async {
            loop {
                match rx.recv().await {
                    Some(event) if event.kind == kind => return event,
                    Some(_) => continue,
                    None => panic!("event channel closed while waiting for {kind:?}"),
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
    }

    /// Lets already-spawned tasks reach their next await point without
    /// advancing the clock.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    fn vtt_transfer(url: &str) -> TransferRecord {
        TransferRecord::new(url, TransferKind::Promise).with_body("WEBVTT\n\n1\n00:00.000")
    }

    #[tokio::test(start_paused = true)]
    async fn first_match_wins_and_duplicates_are_dropped() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());

        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/lecture3.vtt"));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        // Repeats and late arrivals change nothing.
        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/lecture3.vtt"));
        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/other.vtt"));
        settle().await;

        assert_eq!(sink.count().await, 1);
        assert_eq!(session.phase().await, Phase::Captured);
        match &sink.recorded().await[0] {
            Payload::Subtitles(p) => {
                assert_eq!(p.url, "https://cdn.example.com/subs/en_US/lecture3.vtt");
                assert_eq!(p.parent_title, "learn-go");
                assert_eq!(p.title, "3-variables-types");
                assert_eq!(p.section_name, "section-1-getting-started");
                assert_eq!(p.video_length, "12:34");
                assert_eq!(p.root_directory, "udemy");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transfers_before_arming_are_dropped() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());
        settle().await;

        // Still inside the arm delay.
        assert_eq!(session.phase().await, Phase::Idle);
        page.emit_transfer(vtt_transfer("https://cdn.example.com/early_en_US.vtt"));
        settle().await;

        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        page.emit_transfer(vtt_transfer("https://cdn.example.com/later_en_US.vtt"));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        let recorded = sink.recorded().await;
        assert_eq!(recorded.len(), 1);
        match &recorded[0] {
            Payload::Subtitles(p) => {
                assert_eq!(p.url, "https://cdn.example.com/later_en_US.vtt")
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_matching_transfers_leave_the_watch_armed() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;

        page.emit_transfer(vtt_transfer("https://cdn.example.com/en_US/video.mp4"));
        page.emit_transfer(vtt_transfer("https://cdn.example.com/fr_FR/lecture.vtt"));
        settle().await;

        assert_eq!(sink.count().await, 0);
        assert_eq!(session.phase().await, Phase::Watching);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_resets_and_allows_the_same_url_again() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;

        let url = "https://cdn.example.com/subs/en_US/lecture3.vtt";
        page.emit_transfer(vtt_transfer(url));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        page.navigate("https://learn.example.com/course/lecture/4");
        wait_for_kind(&mut rx, SessionEventKind::Reset).await;
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;

        page.emit_transfer(vtt_transfer(url));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        assert_eq!(sink.count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_during_extraction_discards_the_capture() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;

        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/lecture3.vtt"));
        wait_for_kind(&mut rx, SessionEventKind::ResourceMatched).await;
        // Extraction is now sleeping through the settle window; navigate
        // before it finishes.
        settle().await;
        page.navigate("https://learn.example.com/course/lecture/4");

        wait_for_kind(&mut rx, SessionEventKind::StaleDropped).await;
        assert_eq!(sink.count().await, 0);

        // The fresh watch still captures.
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/lecture4.vtt"));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;
        assert_eq!(sink.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_timeout_disarms_the_session() {
        let page = seeded_udemy_page();
        let mut p = profile("udemy");
        p.timings.watch_timeout_ms = 5_000;
        let (session, sink, mut rx) = wire_session(p, &page);
        tokio::spawn(Arc::clone(&session).run());

        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        wait_for_kind(&mut rx, SessionEventKind::WatchTimeout).await;
        assert_eq!(session.phase().await, Phase::Idle);

        page.emit_transfer(vtt_transfer("https://cdn.example.com/subs/en_US/late.vtt"));
        settle().await;
        assert_eq!(sink.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_failure_reopens_the_watch() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);
        tokio::spawn(Arc::clone(&session).run());
        wait_for_kind(&mut rx, SessionEventKind::Armed).await;

        let url = "https://cdn.example.com/subs/en_US/lecture3.vtt";
        // Bodyless transfer with no fetchable resource behind it.
        page.emit_transfer(TransferRecord::new(url, TransferKind::Attribute));
        wait_for_kind(&mut rx, SessionEventKind::SubmitFailed).await;
        assert_eq!(session.phase().await, Phase::Watching);
        assert_eq!(sink.count().await, 0);

        // The same URL observed again now succeeds.
        page.emit_transfer(vtt_transfer(url));
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;
        assert_eq!(sink.count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn track_poll_captures_from_the_track_element() {
        let page = Arc::new(SimPage::new("kodekloud"));
        page.set_document_title("Pods Overview from Kubernetes Basics");
        page.set_parent_title("Kubernetes Basics | KodeKloud");
        page.set_attr(r#"div[aria-label="Progress Bar"]"#, "aria-valuetext", "18:40");
        page.set_text(r#"track[srclang="en-US"]"#, "");
        page.set_attr(
            r#"track[srclang="en-US"]"#,
            "src",
            "https://vod.example.com/texttrack/sub.vtt",
        );
        page.set_resource("https://vod.example.com/texttrack/sub.vtt", "WEBVTT\n\n1");

        let (session, sink, mut rx) = wire_session(profile("kodekloud"), &page);
        tokio::spawn(Arc::clone(&session).run());

        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        let recorded = sink.recorded().await;
        assert_eq!(recorded.len(), 1);
        match &recorded[0] {
            Payload::Subtitles(p) => {
                assert_eq!(p.url, "https://vod.example.com/texttrack/sub.vtt");
                assert_eq!(p.content, "WEBVTT\n\n1");
                assert_eq!(p.title, "pods-overview");
                assert_eq!(p.parent_title, "kubernetes-basics");
                assert_eq!(p.video_length, "18:40");
                assert_eq!(p.root_directory, "kodekloud");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn track_poll_without_a_track_times_out() {
        let page = Arc::new(SimPage::new("kodekloud"));
        let (session, sink, mut rx) = wire_session(profile("kodekloud"), &page);
        tokio::spawn(Arc::clone(&session).run());

        wait_for_kind(&mut rx, SessionEventKind::Armed).await;
        wait_for_kind(&mut rx, SessionEventKind::WatchTimeout).await;
        assert_eq!(session.phase().await, Phase::Idle);
        assert_eq!(sink.count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn screenshot_flow_submits_with_context() {
        let page = seeded_udemy_page();
        let (session, sink, mut rx) = wire_session(profile("udemy"), &page);

        session.capture_screenshot_now().await.unwrap();
        wait_for_kind(&mut rx, SessionEventKind::ScreenshotCaptured).await;
        wait_for_kind(&mut rx, SessionEventKind::Submitted).await;

        let recorded = sink.recorded().await;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].route(), "screenshorts-with-timestamps");
        match &recorded[0] {
            Payload::Screenshot(p) => {
                assert_eq!(p.parent_title, "learn-go");
                assert_eq!(p.title, "3-variables-types");
                assert_eq!(p.timestamp, "4:05");
                assert_eq!(p.captions, "a variable is");
                assert!(p.screenshot.starts_with("data:image/jpeg;base64,"));
                assert_eq!(p.root_directory, "udemy");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn frame_capture_without_a_video_is_an_error() {
        let page = Arc::new(SimPage::new("udemy"));
        let mut p = profile("udemy");
        p.screenshot.source = ScreenshotSource::VideoFrame;
        let (session, sink, _rx) = wire_session(p, &page);

        let err = session.capture_screenshot_now().await.unwrap_err();
        assert!(matches!(err, CaptureError::NoVideo));
        assert_eq!(sink.count().await, 0);
    }
}
