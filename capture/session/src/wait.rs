//! Bounded element waits.
//!
//! Every wait in the runtime is bounded: polls run at a fixed interval and
//! give up with [`CaptureError::WaitTimeout`] once the window elapses.

use coursecap_core::CaptureError;
use coursecap_host::HostPage;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

enum Probe<'a> {
    Text,
    Attr(&'a str),
}

/// Polls until `selector` matches an element, returning its text content.
pub async fn wait_for_element(
    host: &dyn HostPage,
    selector: &str,
    poll: Duration,
    timeout: Duration,
) -> Result<String, CaptureError> {
    wait_for(host, selector, Probe::Text, poll, timeout).await
}

/// Polls until `selector` matches an element carrying a non-empty `attr`,
/// returning the attribute value.
pub async fn wait_for_attr(
    host: &dyn HostPage,
    selector: &str,
    attr: &str,
    poll: Duration,
    timeout: Duration,
) -> Result<String, CaptureError> {
    wait_for(host, selector, Probe::Attr(attr), poll, timeout).await
}

async fn wait_for(
    host: &dyn HostPage,
    selector: &str,
    probe: Probe<'_>,
    poll: Duration,
    timeout: Duration,
) -> Result<String, CaptureError> {
    let started = Instant::now();
    let mut ticker = time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        let found = match probe {
            Probe::Text => host.query_text(selector).await,
            Probe::Attr(attr) => host
                .query_attr(selector, attr)
                .await
                .filter(|value| !value.is_empty()),
        };
        if let Some(found) = found {
            return Ok(found);
        }
        if started.elapsed() >= timeout {
            return Err(CaptureError::WaitTimeout {
                selector: selector.to_string(),
                waited_ms: timeout.as_millis() as u64,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursecap_host::SimPage;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn returns_once_the_element_appears() {
        let page = Arc::new(SimPage::new("test"));
        let waiter = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                wait_for_element(
                    page.as_ref(),
                    "video",
                    Duration::from_millis(100),
                    Duration::from_secs(10),
                )
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(250)).await;
        page.set_text("video", "");
        let text = waiter.await.unwrap().unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_the_window() {
        let page = SimPage::new("test");
        let err = wait_for_element(
            &page,
            "video",
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .await
        .unwrap_err();
        match err {
            CaptureError::WaitTimeout {
                selector,
                waited_ms,
            } => {
                assert_eq!(selector, "video");
                assert_eq!(waited_ms, 10_000);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn attr_wait_skips_empty_values() {
        let page = Arc::new(SimPage::new("test"));
        page.set_text(r#"track[srclang="en-US"]"#, "");
        page.set_attr(r#"track[srclang="en-US"]"#, "src", "");
        let waiter = {
            let page = Arc::clone(&page);
            tokio::spawn(async move {
                wait_for_attr(
                    page.as_ref(),
                    r#"track[srclang="en-US"]"#,
                    "src",
                    Duration::from_millis(100),
                    Duration::from_secs(10),
                )
                .await
            })
        };
        tokio::time::sleep(Duration::from_millis(300)).await;
        page.set_attr(
            r#"track[srclang="en-US"]"#,
            "src",
            "https://cdn.example.com/sub.vtt",
        );
        let src = waiter.await.unwrap().unwrap();
        assert_eq!(src, "https://cdn.example.com/sub.vtt");
    }
}
