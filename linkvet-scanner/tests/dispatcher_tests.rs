// Tests for batch dispatch: cardinality, ordering, progress and fault isolation

use async_trait::async_trait;
use linkvet_scanner::{
    Dispatcher, HttpTransport, ProbeConfig, ProbeStatus, Prober, ProgressCallback, Transport,
    TransportError, TransportResponse,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

// ============================================================================
// Fake transport
// ============================================================================

#[derive(Clone)]
enum Reply {
    Ok(u16, &'static str),
    Fail(TransportError),
    Panic,
}

/// Scripted transport. Tracks how many calls are active at once.
struct ScriptedTransport {
    replies: HashMap<String, (Duration, Reply)>,
    default_delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            default_delay: Duration::from_millis(10),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    fn reply(mut self, url: &str, delay: Duration, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), (delay, reply));
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, _timeout: Duration) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let (delay, reply) = self
            .replies
            .get(url)
            .cloned()
            .unwrap_or((self.default_delay, Reply::Ok(200, "")));

        tokio::time::sleep(delay).await;
        self.active.fetch_sub(1, Ordering::SeqCst);

        match reply {
            Reply::Ok(status, final_url) => Ok(TransportResponse {
                final_url: if final_url.is_empty() {
                    url.to_string()
                } else {
                    final_url.to_string()
                },
                status,
            }),
            Reply::Fail(err) => Err(err),
            Reply::Panic => panic!("transport exploded for {}", url),
        }
    }
}

fn dispatcher(transport: Arc<ScriptedTransport>, concurrency: usize) -> Dispatcher {
    let prober = Prober::with_transport(
        transport,
        ProbeConfig {
            timeout: Duration::from_secs(10),
        },
    );
    Dispatcher::with_prober(prober).with_concurrency(concurrency)
}

fn recording_callback() -> (ProgressCallback, Arc<Mutex<Vec<(usize, usize)>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let events_clone = events.clone();
    let callback: ProgressCallback = Arc::new(move |completed, total| {
        events_clone.lock().unwrap().push((completed, total));
    });
    (callback, events)
}

fn addresses(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Batch shape
// ============================================================================

#[tokio::test]
async fn test_empty_batch_returns_immediately() {
    let transport = Arc::new(ScriptedTransport::new());
    let (callback, events) = recording_callback();
    let dispatcher = dispatcher(transport.clone(), 4).with_progress_callback(callback);

    let results = dispatcher.run_batch(&[]).await;

    assert!(results.is_empty());
    assert!(events.lock().unwrap().is_empty());
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_three_addresses_three_outcomes() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("https://a.com", Duration::from_millis(30), Reply::Ok(200, "https://a.com/"))
            .reply(
                "https://b.com",
                Duration::from_millis(10),
                Reply::Fail(TransportError::Connect("refused".to_string())),
            )
            .reply(
                "https://c.com",
                Duration::from_millis(20),
                Reply::Fail(TransportError::Request("bad certificate".to_string())),
            ),
    );
    let (callback, events) = recording_callback();
    let dispatcher = dispatcher(transport, 10).with_progress_callback(callback);

    let results = dispatcher.run_batch(&addresses(&["a.com", "b.com", "c.com"])).await;

    assert_eq!(results.len(), 3);

    let by_original: HashMap<&str, &ProbeStatus> = results
        .iter()
        .map(|o| (o.original.as_str(), &o.status))
        .collect();
    assert_eq!(by_original["a.com"], &ProbeStatus::Success(200));
    assert_eq!(by_original["b.com"], &ProbeStatus::ConnectionFailure);
    assert_eq!(by_original["c.com"], &ProbeStatus::RequestFailure);

    assert_eq!(*events.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test(start_paused = true)]
async fn test_results_follow_completion_order() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("https://slow.com", Duration::from_millis(300), Reply::Ok(200, ""))
            .reply("https://medium.com", Duration::from_millis(100), Reply::Ok(200, ""))
            .reply("https://fast.com", Duration::from_millis(1), Reply::Ok(200, "")),
    );
    let dispatcher = dispatcher(transport, 3);

    let results = dispatcher
        .run_batch(&addresses(&["slow.com", "medium.com", "fast.com"]))
        .await;

    let order: Vec<&str> = results.iter().map(|o| o.original.as_str()).collect();
    assert_eq!(order, vec!["fast.com", "medium.com", "slow.com"]);
}

// ============================================================================
// Progress accounting
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_progress_counts_every_completion_once() {
    let transport = Arc::new(ScriptedTransport::new());
    let (callback, events) = recording_callback();
    let dispatcher = dispatcher(transport, 7).with_progress_callback(callback);

    let batch: Vec<String> = (0..100).map(|i| format!("host{}.example", i)).collect();
    let results = dispatcher.run_batch(&batch).await;

    assert_eq!(results.len(), 100);

    let events = events.lock().unwrap();
    let completed: Vec<usize> = events.iter().map(|(c, _)| *c).collect();
    assert_eq!(completed, (1..=100).collect::<Vec<_>>());
    assert!(events.iter().all(|(_, total)| *total == 100));
}

#[tokio::test(start_paused = true)]
async fn test_failures_still_advance_progress() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("https://x.com", Duration::from_millis(5), Reply::Fail(TransportError::Timeout))
            .reply(
                "https://y.com",
                Duration::from_millis(5),
                Reply::Fail(TransportError::Connect("dns".to_string())),
            ),
    );
    let (callback, events) = recording_callback();
    let dispatcher = dispatcher(transport, 2).with_progress_callback(callback);

    let results = dispatcher.run_batch(&addresses(&["x.com", "y.com"])).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|o| !o.status.is_success()));
    assert_eq!(events.lock().unwrap().len(), 2);
}

// ============================================================================
// Concurrency bound
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_never_exceeds_concurrency() {
    let transport = Arc::new(ScriptedTransport::new());
    let dispatcher = dispatcher(transport.clone(), 3);

    let batch: Vec<String> = (0..20).map(|i| format!("site{}.example", i)).collect();
    let results = dispatcher.run_batch(&batch).await;

    assert_eq!(results.len(), 20);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 20);

    let max_active = transport.max_active.load(Ordering::SeqCst);
    assert!(max_active <= 3, "observed {} simultaneous probes", max_active);
    assert!(max_active > 1, "pool never ran probes in parallel");
}

#[tokio::test(start_paused = true)]
async fn test_zero_concurrency_is_clamped() {
    let transport = Arc::new(ScriptedTransport::new());
    let dispatcher = dispatcher(transport.clone(), 0);

    assert_eq!(dispatcher.concurrency(), 1);

    let results = dispatcher.run_batch(&addresses(&["a.com", "b.com"])).await;

    assert_eq!(results.len(), 2);
    assert_eq!(transport.max_active.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_slow_probe_does_not_block_others() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .reply("https://hung.example", Duration::from_secs(60), Reply::Ok(200, "")),
    );
    let dispatcher = dispatcher(transport, 2);

    let batch = addresses(&["hung.example", "a.com", "b.com", "c.com", "d.com"]);
    let results = dispatcher.run_batch(&batch).await;

    assert_eq!(results.len(), 5);
    assert_eq!(results.outcomes().last().unwrap().original, "hung.example");
}

// ============================================================================
// Fault isolation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_panicking_probe_becomes_execution_error() {
    let transport = Arc::new(
        ScriptedTransport::new().reply("https://boom.example", Duration::from_millis(5), Reply::Panic),
    );
    let (callback, events) = recording_callback();
    let dispatcher = dispatcher(transport, 4).with_progress_callback(callback);

    let batch = addresses(&["ok1.example", "boom.example", "ok2.example", "ok3.example"]);
    let results = dispatcher.run_batch(&batch).await;

    assert_eq!(results.len(), 4);
    assert_eq!(events.lock().unwrap().len(), 4);

    let failed: Vec<_> = results
        .iter()
        .filter(|o| o.status == ProbeStatus::ExecutionFailure)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].original, "boom.example");
    assert_eq!(failed[0].status.label(), "Execution Error");
    assert!(failed[0].resolved.is_empty());
    assert!(
        failed[0].error.contains("transport exploded"),
        "error was {:?}",
        failed[0].error
    );

    let summary = results.summary();
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.execution_failed, 1);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_addresses_each_get_an_outcome() {
    let transport = Arc::new(ScriptedTransport::new());
    let dispatcher = dispatcher(transport.clone(), 2);

    let results = dispatcher
        .run_batch(&addresses(&["dup.com", "dup.com", "dup.com"]))
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
}

// ============================================================================
// Real HTTP
// ============================================================================

#[tokio::test]
async fn test_batch_against_mock_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/ok", mock_server.uri())),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let prober = Prober::with_transport(
        Arc::new(HttpTransport::new().unwrap()),
        ProbeConfig {
            timeout: Duration::from_secs(5),
        },
    );
    let (callback, events) = recording_callback();
    let dispatcher = Dispatcher::with_prober(prober)
        .with_concurrency(2)
        .with_progress_callback(callback);

    let batch = vec![
        format!("{}/ok", mock_server.uri()),
        format!("{}/moved", mock_server.uri()),
        format!("{}/missing", mock_server.uri()),
    ];
    let results = dispatcher.run_batch(&batch).await;

    assert_eq!(results.len(), 3);
    assert_eq!(events.lock().unwrap().len(), 3);

    let moved = results
        .iter()
        .find(|o| o.original.ends_with("/moved"))
        .unwrap();
    assert_eq!(moved.status, ProbeStatus::Success(200));
    assert_eq!(moved.resolved, format!("{}/ok", mock_server.uri()));

    let missing = results
        .iter()
        .find(|o| o.original.ends_with("/missing"))
        .unwrap();
    assert_eq!(missing.status, ProbeStatus::Success(404));
}
