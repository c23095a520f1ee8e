//! `coursecap replay`: drive a capture session from a scripted page.

use anyhow::{Context, Result};
use coursecap_collector::CollectorClient;
use coursecap_config::CoursecapConfig;
use coursecap_core::{DrySink, SessionEvent, Submitter};
use coursecap_host::{HostPage, SimPage};
use coursecap_session::CaptureSession;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::script::ReplayScript;

pub async fn run(config: &CoursecapConfig, script_path: &Path, dry_run: bool) -> Result<()> {
    let script = ReplayScript::load(script_path).await?;
    let profile = config
        .sites
        .iter()
        .find(|site| site.id == script.site)
        .cloned()
        .with_context(|| format!("no site profile named `{}` in the config", script.site))?;

    let page = Arc::new(SimPage::new(script.site.clone()));
    script.seed(&page);

    let dry = dry_run.then(|| Arc::new(DrySink::new()));
    let submitter: Arc<dyn Submitter> = match &dry {
        Some(sink) => Arc::clone(sink) as Arc<dyn Submitter>,
        None => Arc::new(CollectorClient::new(&config.collector)?),
    };

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let session = Arc::new(
        CaptureSession::new(profile, Arc::clone(&page) as Arc<dyn HostPage>, submitter)
            .with_events(events_tx),
    );

    let narrator = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", describe(&event));
        }
    });
    let mut tasks = vec![tokio::spawn(log_session_exit(Arc::clone(&session)))];
    if let Some(trigger) = session.progress_trigger() {
        tasks.push(tokio::spawn(async move {
            trigger.run().await;
        }));
    }
    if let Some(bridge) = session.media_key_bridge() {
        tasks.push(tokio::spawn(bridge.run()));
    }

    info!(
        script = %script_path.display(),
        site = %session.profile().id,
        steps = script.steps.len(),
        "replay starting"
    );
    for (index, step) in script.steps.iter().enumerate() {
        if step.after_ms > 0 {
            tokio::time::sleep(Duration::from_millis(step.after_ms)).await;
        }
        if let Err(error) = step.action.apply(&page, &session).await {
            warn!(step = index + 1, %error, "replay step failed; continuing");
        }
    }

    // Leave room for settle windows and detached submits still in flight.
    let timings = &session.profile().timings;
    let tail = timings.video_length_settle_ms + timings.frame_title_timeout_ms + 1_000;
    tokio::time::sleep(Duration::from_millis(tail)).await;

    for task in tasks {
        task.abort();
    }
    narrator.abort();

    if let Some(sink) = dry {
        let recorded = sink.recorded().await;
        println!("dry run: {} payload(s) captured, nothing sent", recorded.len());
        for payload in &recorded {
            println!("  {} -> {}", payload.kind(), payload.route());
        }
    }
    Ok(())
}

async fn log_session_exit(session: Arc<CaptureSession>) {
    if let Err(error) = session.run().await {
        warn!(%error, "capture session ended early");
    }
}

fn describe(event: &SessionEvent) -> String {
    let kind = serde_json::to_value(event.kind)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", event.kind));
    if event.detail.is_null() {
        format!("[{kind}]")
    } else {
        format!("[{kind}] {}", event.detail)
    }
}
