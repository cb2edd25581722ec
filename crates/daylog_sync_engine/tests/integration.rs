//! Integration tests for the sync engine against a live entries server.

use daylog_entry::{Entry, EntryId, Timestamp};
use daylog_storage::{EntryStore, FileEntryStore};
use daylog_sync_engine::{
    HttpRemote, Journal, LoadSource, ReconcileOutcome, SyncConfig, SyncEngine,
};
use daylog_sync_server::{serve_listener, SyncServer};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::sync::oneshot;

type Engine = SyncEngine<HttpRemote, FileEntryStore>;

/// An entries server running on its own runtime thread.
struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestServer {
    fn start(data_dir: &Path) -> Self {
        Self::start_on("127.0.0.1:0".parse().unwrap(), data_dir)
    }

    fn start_on(addr: SocketAddr, data_dir: &Path) -> Self {
        init_tracing();
        let listener = std::net::TcpListener::bind(addr).unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let store = FileEntryStore::open(data_dir).unwrap();
        let server = Arc::new(SyncServer::new(Arc::new(store)));
        let (tx, rx) = oneshot::channel::<()>();

        let thread = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                serve_listener(listener, server, async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
            });
        });

        Self {
            addr,
            shutdown: Some(tx),
            thread: Some(thread),
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn stop(mut self) -> SocketAddr {
        self.shutdown_now();
        self.addr
    }

    fn shutdown_now(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown_now();
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn config(url: &str) -> SyncConfig {
    SyncConfig::new(url)
        .with_timeout(Duration::from_millis(500))
        .with_sync_interval(Duration::from_millis(50))
}

fn engine(url: &str, local_dir: &Path) -> Arc<Engine> {
    let config = config(url);
    let remote = HttpRemote::new(&config).unwrap();
    let store = FileEntryStore::open(local_dir).unwrap();
    Arc::new(SyncEngine::new(config, remote, store))
}

/// A URL nothing is listening on.
fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn id(s: &str) -> EntryId {
    EntryId::parse(s).unwrap()
}

fn ts(s: &str) -> Timestamp {
    s.parse().unwrap()
}

fn dated(content: &str, updated_at: &str) -> Entry {
    Entry {
        content: content.to_owned(),
        created_at: Some(ts(updated_at)),
        updated_at: Some(ts(updated_at)),
    }
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn load_prefers_remote_and_mirrors_it() {
    let server_dir = TempDir::new().unwrap();
    let local_dir = TempDir::new().unwrap();
    FileEntryStore::open(server_dir.path())
        .unwrap()
        .write(&id("2024-01-01"), &dated("from server", "2024-01-01T09:00:00"))
        .unwrap();
    let server = TestServer::start(server_dir.path());

    let engine = engine(&server.url(), local_dir.path());
    assert_eq!(engine.load().unwrap(), LoadSource::Remote { count: 1 });

    let mirror = FileEntryStore::open(local_dir.path()).unwrap();
    let local = mirror.read(&id("2024-01-01")).unwrap().unwrap();
    assert_eq!(local.content, "from server");
}

#[test]
fn load_falls_back_to_local_cache() {
    let local_dir = TempDir::new().unwrap();
    let mirror = FileEntryStore::open(local_dir.path()).unwrap();
    mirror
        .write(&id("2024-01-01"), &dated("cached", "2024-01-01T09:00:00"))
        .unwrap();
    std::fs::write(local_dir.path().join("2024-01-02.json"), b"{ torn").unwrap();

    init_tracing();
    let engine = engine(&dead_url(), local_dir.path());
    assert_eq!(
        engine.load().unwrap(),
        LoadSource::LocalCache {
            count: 1,
            skipped: 1
        }
    );
    assert_eq!(engine.get(&id("2024-01-01")).unwrap().content, "cached");
    assert_eq!(engine.stats().remote_available, Some(false));
}

#[test]
fn journal_operations_reach_the_server() {
    let server_dir = TempDir::new().unwrap();
    let local_dir = TempDir::new().unwrap();
    let server = TestServer::start(server_dir.path());
    let journal = Journal::new(engine(&server.url(), local_dir.path()));
    journal.refresh().unwrap();

    let first = journal.create_at(ts("2024-05-01T08:00:00")).unwrap();
    let second = journal.create_at(ts("2024-05-01T21:00:00")).unwrap();
    assert_eq!(first.as_str(), "2024-05-01");
    assert_eq!(second.as_str(), "2024-05-01_1");

    journal
        .edit_at(&first, "Morning run.", ts("2024-05-01T08:30:00"))
        .unwrap();
    journal.delete(&second).unwrap();

    let remote = FileEntryStore::open(server_dir.path()).unwrap();
    let stored = remote.read(&first).unwrap().unwrap();
    assert_eq!(stored.content, "Morning run.");
    assert_eq!(stored.updated_at, Some(ts("2024-05-01T08:30:00")));
    assert!(remote.read(&second).unwrap().is_none());
    assert_eq!(journal.list(), vec![first]);
}

#[test]
fn reconcile_takes_strictly_newer_remote() {
    let server_dir = TempDir::new().unwrap();
    let local_dir = TempDir::new().unwrap();
    let server = TestServer::start(server_dir.path());
    let engine = engine(&server.url(), local_dir.path());
    engine.load().unwrap();

    engine
        .save(&id("2024-01-01"), dated("a", "2024-01-01T10:00:00"))
        .unwrap();
    engine
        .save(&id("2024-01-02"), dated("mine", "2024-01-02T12:00:00"))
        .unwrap();

    // Another writer replaces the records on the server directly.
    let remote = FileEntryStore::open(server_dir.path()).unwrap();
    remote
        .write(&id("2024-01-01"), &dated("b", "2024-01-01T11:00:00"))
        .unwrap();
    remote
        .write(&id("2024-01-02"), &dated("theirs", "2024-01-02T12:00:00"))
        .unwrap();
    remote
        .write(&id("2024-01-03"), &dated("new", "2024-01-03T07:00:00"))
        .unwrap();

    let ReconcileOutcome::Merged(report) = engine.reconcile().unwrap() else {
        panic!("server should be reachable");
    };
    assert_eq!(report.replaced, 1);
    assert_eq!(report.inserted, 1);

    assert_eq!(engine.get(&id("2024-01-01")).unwrap().content, "b");
    assert_eq!(engine.get(&id("2024-01-02")).unwrap().content, "mine");
    assert_eq!(engine.get(&id("2024-01-03")).unwrap().content, "new");

    let mirror = FileEntryStore::open(local_dir.path()).unwrap();
    assert_eq!(mirror.read(&id("2024-01-01")).unwrap().unwrap().content, "b");
}

#[test]
fn offline_edits_survive_outage() {
    let server_dir = TempDir::new().unwrap();
    let local_dir = TempDir::new().unwrap();
    let server = TestServer::start(server_dir.path());
    let url = server.url();
    let engine = engine(&url, local_dir.path());
    engine.load().unwrap();
    engine
        .save(&id("2024-02-01"), dated("online", "2024-02-01T09:00:00"))
        .unwrap();

    let addr = server.stop();

    // Edits while offline land locally and are not lost by failed syncs.
    engine
        .save(&id("2024-02-01"), dated("offline", "2024-02-01T10:00:00"))
        .unwrap();
    engine
        .save(&id("2024-02-02"), dated("local only", "2024-02-02T10:00:00"))
        .unwrap();
    assert!(matches!(
        engine.reconcile().unwrap(),
        ReconcileOutcome::Skipped(_)
    ));
    assert_eq!(engine.stats().remote_available, Some(false));

    let _server = TestServer::start_on(addr, server_dir.path());
    assert!(wait_until(Duration::from_secs(5), || matches!(
        engine.reconcile(),
        Ok(ReconcileOutcome::Merged(_))
    )));

    assert_eq!(engine.get(&id("2024-02-01")).unwrap().content, "offline");
    assert_eq!(engine.get(&id("2024-02-02")).unwrap().content, "local only");
    assert_eq!(engine.stats().remote_available, Some(true));
}

#[test]
fn two_devices_converge_through_background_sync() {
    let server_dir = TempDir::new().unwrap();
    let server = TestServer::start(server_dir.path());
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();

    let device_a = Journal::new(engine(&server.url(), dir_a.path()));
    let device_b = Journal::new(engine(&server.url(), dir_b.path()));
    device_a.refresh().unwrap();
    device_b.refresh().unwrap();
    let worker = SyncEngine::start(device_b.engine()).unwrap();

    let entry = device_a.create_at(ts("2024-06-01T07:00:00")).unwrap();
    device_a
        .edit_at(&entry, "Written on A.", ts("2024-06-01T07:05:00"))
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        device_b.view(&entry).ok().as_deref() == Some("Written on A.")
    }));

    worker.stop();
    assert_eq!(device_a.engine().entries(), device_b.engine().entries());
}
