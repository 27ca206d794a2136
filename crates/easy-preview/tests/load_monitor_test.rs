// Tests for LoadMonitor
//
// Timer races run on a paused tokio clock: sleeping in the test advances time
// deterministically and fires the monitor's timers in order.

use easy_preview::{BlockReason, LoadMonitor, LoadOutcome, LoadPolicy, Presentation};
use std::sync::Arc;
use std::time::Duration;

mod common;

use common::FakeFrame;

fn monitor(frame: &Arc<FakeFrame>) -> LoadMonitor {
    LoadMonitor::new(frame.clone(), LoadPolicy::default()).expect("default policy is valid")
}

fn loading(url: &str) -> Presentation {
    Presentation::Loading {
        url: url.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn test_issue_navigates_and_shows_loading() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    let monitor = monitor(&frame);
    assert_eq!(monitor.presentation(), Presentation::Empty);

    let id = monitor.issue("https://example.com");

    assert_eq!(frame.navigations(), vec!["https://example.com"]);
    assert_eq!(monitor.presentation(), loading("https://example.com"));
    let attempt = monitor.current_attempt().expect("attempt should exist");
    assert_eq!(attempt.id, id);
    assert_eq!(attempt.outcome, LoadOutcome::Pending);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_without_load_is_blocked() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    monitor.issue("https://no-frames.test");

    tokio::time::sleep(Duration::from_millis(2999)).await;
    assert_eq!(monitor.presentation(), loading("https://no-frames.test"));

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(
        monitor.presentation(),
        Presentation::Blocked {
            url: "https://no-frames.test".to_string(),
            reason: BlockReason::Timeout,
        }
    );
    tracing::info!("✓ Opaque frame without load event blocked after 3000ms");
}

#[tokio::test(start_paused = true)]
async fn test_timeout_with_readable_document_keeps_waiting() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_readable("https://same-origin.test/slow", "Still loading", "<p>Still loading</p>");
    let monitor = monitor(&frame);

    let id = monitor.issue("https://same-origin.test/slow");
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(monitor.presentation(), loading("https://same-origin.test/slow"));

    // The late load event still completes the attempt
    assert!(monitor.on_load(id));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(matches!(monitor.presentation(), Presentation::Frame { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_load_then_settle_is_success_for_opaque_frame() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    let id = monitor.issue("https://example.com");
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(monitor.on_load(id));
    assert_eq!(
        monitor.current_attempt().map(|a| a.outcome),
        Some(LoadOutcome::Settling)
    );

    // Settle delay has not elapsed yet
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(monitor.presentation(), loading("https://example.com"));

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(
        monitor.presentation(),
        Presentation::Frame {
            url: "https://example.com".to_string()
        }
    );

    // The cleared timeout must not override the outcome
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        monitor.current_attempt().map(|a| a.outcome),
        Some(LoadOutcome::Success)
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_into_browser_error_page_is_blocked() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_address("chrome-error://chromewebdata/");
    let monitor = monitor(&frame);

    let id = monitor.issue("https://denies-framing.test");
    monitor.on_load(id);
    tokio::time::sleep(Duration::from_millis(101)).await;

    match monitor.presentation() {
        Presentation::Blocked { url, reason } => {
            assert_eq!(url, "https://denies-framing.test");
            assert!(matches!(reason, BlockReason::ErrorPage(_)));
        }
        other => panic!("expected Blocked, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_load_with_policy_message_is_blocked() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_readable(
        "https://intranet.test/",
        "intranet.test refused to connect.",
        "<div>intranet.test refused to connect.</div>",
    );
    let monitor = monitor(&frame);

    let id = monitor.issue("https://intranet.test/");
    monitor.on_load(id);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(
        monitor.current_attempt().map(|a| a.outcome),
        Some(LoadOutcome::Blocked(BlockReason::PolicyPhrase(
            "refused to connect".to_string()
        )))
    );
    assert_eq!(
        monitor.presentation().external_url(),
        Some("https://intranet.test/")
    );
}

#[tokio::test(start_paused = true)]
async fn test_error_event_fails_immediately_and_clears_timeout() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    let id = monitor.issue("https://down.test");
    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(monitor.on_error(id));
    assert_eq!(
        monitor.presentation(),
        Presentation::Failed {
            url: "https://down.test".to_string()
        }
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(
        monitor.current_attempt().map(|a| a.outcome),
        Some(LoadOutcome::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_error_event_during_settle_fails() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    let id = monitor.issue("https://flaky.test");
    monitor.on_load(id);
    assert!(monitor.on_error(id));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        monitor.current_attempt().map(|a| a.outcome),
        Some(LoadOutcome::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_supersedes_pending_timeout() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    let first = monitor.issue("https://one.test");
    tokio::time::sleep(Duration::from_millis(2000)).await;
    let second = monitor.issue("https://two.test");
    assert!(second > first);

    // First attempt's timeout would have fired at t=3000
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(monitor.presentation(), loading("https://two.test"));

    // Stale native events of the first attempt are ignored
    assert!(!monitor.on_load(first));
    assert!(!monitor.on_error(first));
    assert_eq!(monitor.presentation(), loading("https://two.test"));

    // Second attempt's own timeout still fires at t=5000
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(
        monitor.presentation(),
        Presentation::Blocked {
            url: "https://two.test".to_string(),
            reason: BlockReason::Timeout,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_supersedes_pending_settle() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_address("about:blank");
    let monitor = monitor(&frame);

    let first = monitor.issue("https://one.test");
    monitor.on_load(first);
    // Settle check of the first attempt would find about:blank at t=100
    tokio::time::sleep(Duration::from_millis(50)).await;
    frame.set_opaque();
    let second = monitor.issue("https://two.test");

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(monitor.presentation(), loading("https://two.test"));

    monitor.on_load(second);
    tokio::time::sleep(Duration::from_millis(110)).await;
    assert_eq!(
        monitor.presentation(),
        Presentation::Frame {
            url: "https://two.test".to_string()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_load_event_is_ignored() {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);

    let id = monitor.issue("https://example.com");
    assert!(monitor.on_load(id));
    assert!(!monitor.on_load(id));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(!monitor.on_load(id));
    assert!(!monitor.on_error(id));
    assert!(matches!(monitor.presentation(), Presentation::Frame { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_transitions() -> anyhow::Result<()> {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let monitor = monitor(&frame);
    let mut updates = monitor.subscribe();

    monitor.issue("https://example.com");
    updates.changed().await?;
    assert_eq!(*updates.borrow_and_update(), loading("https://example.com"));

    updates.changed().await?;
    assert!(matches!(
        *updates.borrow_and_update(),
        Presentation::Blocked { .. }
    ));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_custom_policy_timings() -> anyhow::Result<()> {
    common::init_tracing();
    let frame = Arc::new(FakeFrame::new());
    frame.set_opaque();
    let policy = LoadPolicy::new()
        .timeout(Duration::from_millis(500))
        .settle_delay(Duration::from_millis(10));
    let monitor = LoadMonitor::new(frame.clone(), policy)?;

    monitor.issue("https://quick.test");
    tokio::time::sleep(Duration::from_millis(501)).await;
    assert!(matches!(
        monitor.presentation(),
        Presentation::Blocked { .. }
    ));
    Ok(())
}

#[test]
fn test_invalid_policy_is_rejected() {
    let frame = Arc::new(FakeFrame::new());
    let policy = LoadPolicy::new().timeout(Duration::ZERO);
    assert!(LoadMonitor::new(frame.clone(), policy).is_err());

    // An empty host would match every unreadable address
    let policy = LoadPolicy::new().error_page_hosts(vec![String::new()]);
    assert!(LoadMonitor::new(frame, policy).is_err());
}
