// Frame Load Monitor - Load-outcome detection for the embedded preview
//
// An embedded cross-origin document cannot be inspected, so the outcome of a
// load is inferred:
//
// - no load event within the time budget while the document stays opaque
//   means the page most likely refused to be framed (Blocked)
// - after the load event, the frame's address and any same-origin-readable
//   content are checked for blocked-page indicators (Blocked)
// - a native error event is a certain failure (Failed)
// - anything else is reported as Success, which only means no failure was
//   detected
//
// The classifier is probabilistic. A slow page that misses the time budget is
// reported as Blocked, and a block message served cross-origin is invisible.
//
// Each issue() starts a new generation. Deferred callbacks (timeout, settle
// delay, native load/error events) carry the generation they were created for
// and do nothing once a newer attempt exists.

use crate::api::LoadPolicy;
use crate::error::{Error, Result};
use crate::preview::resizer::LiveSize;
use parking_lot::Mutex;
use regex::RegexSet;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Adapter over the embedded-content element (an iframe in a browser).
///
/// Implementations forward to the platform; the monitor never assumes it can
/// read the embedded document.
pub trait EmbeddedFrame: Send + Sync {
    /// Points the frame at `url`.
    fn navigate(&self, url: &str);

    /// Reports what same-origin policy currently allows us to see.
    fn probe(&self) -> FrameProbe;

    /// Writes the live size of the container and frame during a resize.
    fn apply_size(&self, _size: LiveSize) {}
}

/// Snapshot of the embedded document as far as it is readable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameProbe {
    /// Resolved address of the frame; `None` when reading it throws
    pub address: Option<String>,
    /// Document content; `None` when the document is opaque
    pub document: Option<DocumentContent>,
}

impl FrameProbe {
    /// Probe of a cross-origin frame: nothing is readable.
    pub fn opaque() -> Self {
        Self::default()
    }

    pub fn is_document_accessible(&self) -> bool {
        self.document.is_some()
    }
}

/// Readable content of a same-origin document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentContent {
    /// Visible text (`body.innerText`)
    pub text: String,
    /// Raw markup (`documentElement.innerHTML`)
    pub markup: String,
}

/// Why a load was classified as blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "detail")]
pub enum BlockReason {
    /// No load event within the time budget and the document stayed opaque
    Timeout,
    /// Frame resolved to the browser's error page
    ErrorPage(String),
    /// Frame resolved to a blank address
    BlankAddress,
    /// Readable content contained a policy phrase
    PolicyPhrase(String),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Timeout => write!(f, "no load event within the time budget"),
            BlockReason::ErrorPage(address) => write!(f, "browser error page '{}'", address),
            BlockReason::BlankAddress => write!(f, "frame stayed blank"),
            BlockReason::PolicyPhrase(phrase) => write!(f, "content mentions '{}'", phrase),
        }
    }
}

/// Outcome of a load attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum LoadOutcome {
    /// Issued, waiting for the load event or the timeout
    Pending,
    /// Load event received, waiting for the settle delay
    Settling,
    Success,
    Blocked(BlockReason),
    Failed,
}

impl LoadOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoadOutcome::Success | LoadOutcome::Blocked(_) | LoadOutcome::Failed
        )
    }
}

/// Identity of a load attempt; compared at the entry of every deferred callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One load of one URL, from issue to terminal outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadAttempt {
    pub id: AttemptId,
    pub target_url: String,
    pub started_at: Instant,
    pub outcome: LoadOutcome,
}

/// What the preview area shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Presentation {
    /// Nothing has been loaded yet
    Empty,
    /// Loading placeholder; the frame is hidden
    Loading { url: String },
    /// The frame is shown
    Frame { url: String },
    /// Placeholder with an "open externally" affordance for a blocked page
    Blocked { url: String, reason: BlockReason },
    /// Placeholder with an "open externally" affordance for a failed load
    Failed { url: String },
}

impl Presentation {
    /// Whether the frame is hidden behind a placeholder.
    pub fn is_frame_hidden(&self) -> bool {
        !matches!(self, Presentation::Frame { .. })
    }

    /// Placeholder message, `None` when the frame is shown.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Presentation::Empty => Some("Enter a URL to preview"),
            Presentation::Loading { .. } => Some("Loading preview..."),
            Presentation::Frame { .. } => None,
            Presentation::Blocked { .. } => {
                Some("This site doesn't allow embedding. Open it in a new tab instead.")
            }
            Presentation::Failed { .. } => Some("Failed to load URL. Open it in a new tab instead."),
        }
    }

    /// URL for the "open externally" affordance, when one is shown.
    pub fn external_url(&self) -> Option<&str> {
        match self {
            Presentation::Blocked { url, .. } | Presentation::Failed { url } => Some(url),
            _ => None,
        }
    }
}

/// Compiled form of the indicator lists in a [`LoadPolicy`].
#[derive(Debug, Clone)]
pub struct LoadClassifier {
    phrases: Vec<String>,
    phrase_set: RegexSet,
    error_page_schemes: Vec<String>,
    error_page_hosts: Vec<String>,
    blank_addresses: Vec<String>,
}

impl LoadClassifier {
    pub fn new(policy: &LoadPolicy) -> Result<Self> {
        let patterns = policy
            .blocked_phrases
            .iter()
            .map(|phrase| format!("(?i){}", regex::escape(phrase)));
        let phrase_set = RegexSet::new(patterns)
            .map_err(|e| Error::InvalidArgument(format!("blocked phrases: {}", e)))?;
        Ok(Self {
            phrases: policy.blocked_phrases.clone(),
            phrase_set,
            error_page_schemes: lowercase_all(&policy.error_page_schemes),
            error_page_hosts: lowercase_all(&policy.error_page_hosts),
            blank_addresses: policy.blank_addresses.clone(),
        })
    }

    /// Checks a resolved frame address for blocked-page sentinels.
    pub fn check_address(&self, address: &str) -> Option<BlockReason> {
        let address = address.trim();
        if self.blank_addresses.iter().any(|blank| blank == address) {
            return Some(BlockReason::BlankAddress);
        }
        let lowered = address.to_ascii_lowercase();
        let is_error_page = match url::Url::parse(&lowered) {
            Ok(parsed) => {
                self.error_page_schemes.iter().any(|s| s == parsed.scheme())
                    || parsed
                        .host_str()
                        .is_some_and(|host| self.error_page_hosts.iter().any(|h| h == host))
            }
            Err(_) => self.error_page_hosts.iter().any(|h| lowered.contains(h.as_str())),
        };
        is_error_page.then(|| BlockReason::ErrorPage(address.to_string()))
    }

    /// Scans readable content for policy phrases (case-insensitive).
    pub fn check_content(&self, content: &DocumentContent) -> Option<BlockReason> {
        [&content.text, &content.markup].into_iter().find_map(|haystack| {
            self.phrase_set
                .matches(haystack)
                .iter()
                .next()
                .map(|index| BlockReason::PolicyPhrase(self.phrases[index].clone()))
        })
    }

    /// Classifies a settled frame.
    ///
    /// Returns `Success` when no indicator is found, including for opaque
    /// cross-origin content: absence of a detected failure, not proof of
    /// success.
    pub fn classify(&self, probe: &FrameProbe) -> LoadOutcome {
        let reason = probe
            .address
            .as_deref()
            .and_then(|address| self.check_address(address))
            .or_else(|| {
                probe
                    .document
                    .as_ref()
                    .and_then(|content| self.check_content(content))
            });
        match reason {
            Some(reason) => LoadOutcome::Blocked(reason),
            None => LoadOutcome::Success,
        }
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_ascii_lowercase()).collect()
}

/// Classifies a settled frame against a policy.
pub fn classify_load_outcome(probe: &FrameProbe, classifier: &LoadClassifier) -> LoadOutcome {
    classifier.classify(probe)
}

#[derive(Default)]
struct Timers {
    timeout: Option<JoinHandle<()>>,
    settle: Option<JoinHandle<()>>,
}

impl Timers {
    fn abort_all(&mut self) {
        if let Some(handle) = self.timeout.take() {
            handle.abort();
        }
        if let Some(handle) = self.settle.take() {
            handle.abort();
        }
    }
}

struct MonitorInner {
    frame: Arc<dyn EmbeddedFrame>,
    policy: LoadPolicy,
    classifier: LoadClassifier,
    generation: AtomicU64,
    attempt: Mutex<Option<LoadAttempt>>,
    timers: Mutex<Timers>,
    presentation: watch::Sender<Presentation>,
}

/// Drives load attempts for one embedded frame.
///
/// Cloning shares the same monitor. `issue` spawns timer tasks and must be
/// called from within a tokio runtime.
#[derive(Clone)]
pub struct LoadMonitor {
    inner: Arc<MonitorInner>,
}

impl LoadMonitor {
    /// Creates a monitor for `frame` using `policy`.
    ///
    /// Fails when the policy does not validate or its phrases do not compile.
    pub fn new(frame: Arc<dyn EmbeddedFrame>, policy: LoadPolicy) -> Result<Self> {
        policy.validate()?;
        let classifier = LoadClassifier::new(&policy)?;
        Ok(Self::from_parts(frame, policy, classifier))
    }

    fn from_parts(
        frame: Arc<dyn EmbeddedFrame>,
        policy: LoadPolicy,
        classifier: LoadClassifier,
    ) -> Self {
        let (presentation, _) = watch::channel(Presentation::Empty);
        Self {
            inner: Arc::new(MonitorInner {
                frame,
                policy,
                classifier,
                generation: AtomicU64::new(0),
                attempt: Mutex::new(None),
                timers: Mutex::new(Timers::default()),
                presentation,
            }),
        }
    }

    pub fn policy(&self) -> &LoadPolicy {
        &self.inner.policy
    }

    pub fn classifier(&self) -> &LoadClassifier {
        &self.inner.classifier
    }

    /// The frame this monitor drives.
    pub fn frame(&self) -> &Arc<dyn EmbeddedFrame> {
        &self.inner.frame
    }

    /// Starts a new load attempt, superseding any earlier one.
    ///
    /// The returned id must be passed to [`on_load`](Self::on_load) and
    /// [`on_error`](Self::on_error) by the adapter that observes the frame.
    pub fn issue(&self, url: &str) -> AttemptId {
        let inner = &self.inner;
        let id = AttemptId(inner.generation.fetch_add(1, Ordering::SeqCst) + 1);
        inner.timers.lock().abort_all();

        let previous = inner.attempt.lock().replace(LoadAttempt {
            id,
            target_url: url.to_string(),
            started_at: Instant::now(),
            outcome: LoadOutcome::Pending,
        });
        if let Some(previous) = previous.filter(|a| !a.outcome.is_terminal()) {
            tracing::debug!(
                "Load attempt {} for {} superseded by {}",
                previous.id,
                previous.target_url,
                id
            );
        }

        inner.presentation.send_replace(Presentation::Loading {
            url: url.to_string(),
        });
        tracing::debug!("Load attempt {} issued for {}", id, url);
        inner.frame.navigate(url);

        let monitor = self.clone();
        let budget = inner.policy.timeout_duration();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(budget).await;
            monitor.handle_timeout(id);
        });
        // Navigation may already have reported load or error synchronously.
        let mut timers = inner.timers.lock();
        if self.outcome_of(id) == Some(LoadOutcome::Pending) {
            timers.timeout = Some(handle);
        } else {
            handle.abort();
        }
        id
    }

    /// Native load event of the frame.
    ///
    /// Returns false when the event belongs to a superseded or finished attempt.
    pub fn on_load(&self, id: AttemptId) -> bool {
        if !self.transition(id, LoadOutcome::Pending, LoadOutcome::Settling) {
            return false;
        }
        let mut timers = self.inner.timers.lock();
        if let Some(handle) = timers.timeout.take() {
            handle.abort();
        }
        let monitor = self.clone();
        let delay = self.inner.policy.settle_duration();
        timers.settle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            monitor.handle_settled(id);
        }));
        true
    }

    /// Native error event of the frame: the attempt fails immediately.
    ///
    /// Returns false when the event belongs to a superseded or finished attempt.
    pub fn on_error(&self, id: AttemptId) -> bool {
        if !self.is_current(id) {
            tracing::debug!("Ignoring error event of stale attempt {}", id);
            return false;
        }
        let finished = self.finish(id, |outcome| !outcome.is_terminal(), LoadOutcome::Failed);
        if finished {
            self.inner.timers.lock().abort_all();
        }
        finished
    }

    fn handle_timeout(&self, id: AttemptId) {
        if !self.is_current(id) {
            return;
        }
        let probe = self.inner.frame.probe();
        let still_hidden = self.inner.presentation.borrow().is_frame_hidden();
        if probe.is_document_accessible() || !still_hidden {
            tracing::debug!(
                "Load attempt {} timed out with a readable document; waiting for load event",
                id
            );
            return;
        }
        tracing::warn!(
            "Load attempt {} had no load event after {}ms; treating as blocked",
            id,
            self.inner.policy.timeout_ms
        );
        self.finish(
            id,
            |outcome| *outcome == LoadOutcome::Pending,
            LoadOutcome::Blocked(BlockReason::Timeout),
        );
    }

    fn handle_settled(&self, id: AttemptId) {
        if !self.is_current(id) {
            return;
        }
        let probe = self.inner.frame.probe();
        let outcome = self.inner.classifier.classify(&probe);
        self.finish(id, |outcome| *outcome == LoadOutcome::Settling, outcome);
    }

    fn is_current(&self, id: AttemptId) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == id.0
    }

    fn outcome_of(&self, id: AttemptId) -> Option<LoadOutcome> {
        self.inner
            .attempt
            .lock()
            .as_ref()
            .filter(|attempt| attempt.id == id)
            .map(|attempt| attempt.outcome.clone())
    }

    fn transition(&self, id: AttemptId, from: LoadOutcome, to: LoadOutcome) -> bool {
        let mut attempt = self.inner.attempt.lock();
        match attempt.as_mut() {
            Some(current) if current.id == id && current.outcome == from => {
                tracing::debug!("Load attempt {}: {:?} -> {:?}", id, from, to);
                current.outcome = to;
                true
            }
            _ => {
                tracing::debug!("Ignoring {:?} -> {:?} for attempt {}", from, to, id);
                false
            }
        }
    }

    /// Records a terminal outcome and publishes its presentation.
    fn finish(
        &self,
        id: AttemptId,
        allowed: impl Fn(&LoadOutcome) -> bool,
        outcome: LoadOutcome,
    ) -> bool {
        let mut attempt = self.inner.attempt.lock();
        let Some(current) = attempt.as_mut() else {
            return false;
        };
        if current.id != id || !allowed(&current.outcome) {
            return false;
        }
        let url = current.target_url.clone();
        let presentation = match &outcome {
            LoadOutcome::Success => Presentation::Frame { url },
            LoadOutcome::Blocked(reason) => Presentation::Blocked {
                url,
                reason: reason.clone(),
            },
            LoadOutcome::Failed => Presentation::Failed { url },
            LoadOutcome::Pending | LoadOutcome::Settling => return false,
        };
        tracing::debug!(
            "Load attempt {} finished as {:?} after {:?}",
            id,
            outcome,
            current.started_at.elapsed()
        );
        current.outcome = outcome;
        self.inner.presentation.send_replace(presentation);
        true
    }

    /// Snapshot of the live attempt, if any.
    pub fn current_attempt(&self) -> Option<LoadAttempt> {
        self.inner.attempt.lock().clone()
    }

    /// What the preview area currently shows.
    pub fn presentation(&self) -> Presentation {
        self.inner.presentation.borrow().clone()
    }

    /// Receiver notified on every presentation change.
    pub fn subscribe(&self) -> watch::Receiver<Presentation> {
        self.inner.presentation.subscribe()
    }
}

impl fmt::Debug for LoadMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadMonitor")
            .field("generation", &self.inner.generation.load(Ordering::SeqCst))
            .field("attempt", &self.current_attempt())
            .finish()
    }
}
