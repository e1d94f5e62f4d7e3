//! Integration Tests for Peer Routing
//!
//! Runs real nodes on loopback and checks that keys are fetched from their
//! owner, that concurrent misses collapse across the network hop, and that
//! peer failures fall back to the local loader.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use peer_cache::consistenthash::HashFn;
use peer_cache::transport::{FetchRequest, HttpGetter, DEFAULT_BASE_PATH};
use peer_cache::{
    create_router, loader_fn, AppState, CacheError, Group, GroupRegistry, PeerError, PeerGetter,
    PeerPool,
};
use tokio::net::TcpListener;

type Calls = Arc<Mutex<HashMap<String, usize>>>;

// == Helper Functions ==

/// Slow loader over a fixed table, counting calls per key.
fn counting_loader(tag: &'static str) -> (Arc<dyn peer_cache::Loader>, Calls) {
    let calls: Calls = Arc::new(Mutex::new(HashMap::new()));
    let seen = Arc::clone(&calls);
    let loader = loader_fn(move |key: String| {
        let seen = Arc::clone(&seen);
        async move {
            *seen.lock().entry(key.clone()).or_insert(0) += 1;
            tokio::time::sleep(Duration::from_millis(100)).await;
            match key.as_str() {
                "tom" | "sam" => Ok(format!("{}-{}", tag, key).into_bytes()),
                _ => Err(anyhow::anyhow!("{} not exist", key)),
            }
        }
    });
    (loader, calls)
}

/// Ring hash pinning "tom", "sam" and "unknown" to `owner`; every other key
/// and every virtual node of other peers lands after it.
fn pinned_hash(owner: String) -> HashFn {
    Arc::new(move |data: &[u8]| {
        let text = String::from_utf8_lossy(data);
        match text.as_ref() {
            "tom" | "sam" | "unknown" => 10,
            node if node.ends_with(owner.as_str()) => 20,
            _ => 30,
        }
    })
}

struct Node {
    addr: String,
    group: Arc<Group>,
    calls: Calls,
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

/// Starts a node serving a `scores` group, routing with `peers`.
fn start_node(
    listener: TcpListener,
    addr: &str,
    tag: &'static str,
    peers: &[String],
    owner: &str,
) -> Node {
    let (loader, calls) = counting_loader(tag);
    let registry = Arc::new(GroupRegistry::new());
    let group = registry.new_group("scores", 2048, loader);

    let pool = PeerPool::new(addr)
        .with_replicas(1)
        .with_hash(pinned_hash(owner.to_string()))
        .with_timeout(Duration::from_secs(2));
    pool.set_peers(peers).unwrap();
    group.register_peers(Arc::new(pool));

    let app = create_router(AppState::new(registry));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Node {
        addr: addr.to_string(),
        group,
        calls,
    }
}

fn count(calls: &Calls, key: &str) -> usize {
    calls.lock().get(key).copied().unwrap_or(0)
}

/// Two nodes A and B, both agreeing that B owns the pinned keys.
async fn two_nodes() -> (Node, Node) {
    let (listener_a, addr_a) = bind().await;
    let (listener_b, addr_b) = bind().await;
    let peers = vec![addr_a.clone(), addr_b.clone()];

    let a = start_node(listener_a, &addr_a, "a", &peers, &addr_b);
    let b = start_node(listener_b, &addr_b, "b", &peers, &addr_b);
    (a, b)
}

// == Routing Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_key_is_served_by_owner() {
    let (a, b) = two_nodes().await;

    let value = a.group.get("tom").await.unwrap();

    assert_eq!(value.to_string(), "b-tom");
    assert_eq!(count(&a.calls, "tom"), 0);
    assert_eq!(count(&b.calls, "tom"), 1);
    // The owner caches it, the asking node does not
    assert_eq!(b.group.stats().total_entries, 1);
    assert_eq!(a.group.stats().total_entries, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_load_once_on_owner() {
    let (a, b) = two_nodes().await;

    let (first, second) = tokio::join!(a.group.get("tom"), a.group.get("tom"));

    assert_eq!(first.unwrap().to_string(), "b-tom");
    assert_eq!(second.unwrap().to_string(), "b-tom");
    assert_eq!(count(&b.calls, "tom"), 1);
    assert_eq!(count(&a.calls, "tom"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_owner_and_peer_share_one_load() {
    let (a, b) = two_nodes().await;

    let (from_a, from_b) = tokio::join!(a.group.get("sam"), b.group.get("sam"));

    assert_eq!(from_a.unwrap(), from_b.unwrap());
    assert_eq!(count(&b.calls, "sam"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_owner_serves_its_own_keys_locally() {
    let (a, b) = two_nodes().await;

    assert_eq!(b.group.get("tom").await.unwrap().to_string(), "b-tom");
    assert_eq!(count(&b.calls, "tom"), 1);
    assert_eq!(count(&a.calls, "tom"), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_remote_loader_error_falls_back_and_surfaces_local_error() {
    let (a, b) = two_nodes().await;

    let err = a.group.get("unknown").await.unwrap_err();

    assert!(matches!(err, CacheError::Loader(_)));
    assert_eq!(err.to_string(), "unknown not exist");
    assert_eq!(count(&b.calls, "unknown"), 1);
    assert_eq!(count(&a.calls, "unknown"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unreachable_owner_falls_back_to_local_loader() {
    let (listener_a, addr_a) = bind().await;
    // Bound then dropped, so nothing listens there
    let (listener_dead, addr_dead) = bind().await;
    drop(listener_dead);

    let peers = vec![addr_a.clone(), addr_dead.clone()];
    let a = start_node(listener_a, &addr_a, "a", &peers, &addr_dead);

    let value = a.group.get("tom").await.unwrap();

    assert_eq!(value.to_string(), "a-tom");
    assert_eq!(count(&a.calls, "tom"), 1);
    // Locally loaded values are cached
    assert_eq!(a.group.get("tom").await.unwrap().to_string(), "a-tom");
    assert_eq!(count(&a.calls, "tom"), 1);
}

// == Client Tests ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_http_getter_against_live_node() {
    let (_a, b) = two_nodes().await;
    let getter = HttpGetter::new(
        &b.addr,
        DEFAULT_BASE_PATH,
        reqwest::Client::new(),
        Duration::from_secs(2),
    )
    .unwrap();

    let response = getter.fetch(&FetchRequest::new("scores", "tom")).await.unwrap();
    assert_eq!(response.value, b"b-tom".to_vec());

    let err = getter
        .fetch(&FetchRequest::new("missing", "tom"))
        .await
        .unwrap_err();
    match err {
        PeerError::Status { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("no such group: missing"));
        }
        other => panic!("unexpected error: {}", other),
    }
}
