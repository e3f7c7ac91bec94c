//! Tests for loading and persisting configurations through a store.

use std::cell::Cell;

use chrono::NaiveDate;
use delivery_rules::store::{ConfigurationStore, CONFIG_KEY, CONFIG_NAMESPACE};
use delivery_rules::{
    load_configuration, persist_session, Configuration, EditorSession, FileStore, MemoryStore,
    StoreError,
};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// A store whose writes fail until `healthy` is set.
struct FlakyStore {
    inner: MemoryStore,
    healthy: Cell<bool>,
}

impl ConfigurationStore for FlakyStore {
    fn load(&self, owner: &str) -> Result<Option<String>, StoreError> {
        self.inner.load(owner)
    }

    fn save(&self, owner: &str, blob: &str) -> Result<(), StoreError> {
        if !self.healthy.get() {
            return Err(StoreError::Rejected {
                owner: owner.to_string(),
                message: "store is read-only".to_string(),
            });
        }
        self.inner.save(owner, blob)
    }
}

/// A store that cannot be reached at all.
struct DownStore;

impl ConfigurationStore for DownStore {
    fn load(&self, _owner: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    fn save(&self, _owner: &str, _blob: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

#[test]
fn missing_owner_loads_empty_configuration() {
    let store = MemoryStore::new();
    assert!(load_configuration(&store, "shop-1").unwrap().is_empty());
}

#[test]
fn corrupt_blob_loads_empty_configuration() {
    let store = MemoryStore::new().with_blob("shop-1", "{{{{");
    assert!(load_configuration(&store, "shop-1").unwrap().is_empty());
}

#[test]
fn unreachable_store_is_an_error() {
    assert!(matches!(
        load_configuration(&DownStore, "shop-1"),
        Err(StoreError::Unavailable(_))
    ));
}

#[test]
fn owners_are_isolated() {
    let store = MemoryStore::new().with_blob("shop-1", r#"{"blockedDays":[0]}"#);
    assert!(!load_configuration(&store, "shop-1").unwrap().is_empty());
    assert!(load_configuration(&store, "shop-2").unwrap().is_empty());
}

// ── Persisting ──────────────────────────────────────────────────────────────

#[test]
fn persist_then_load_roundtrips() {
    let store = MemoryStore::new();
    let mut session = EditorSession::new();
    session.toggle_weekday(0).unwrap();
    session.upsert_date(date("2024-12-25"), None).unwrap();
    session
        .upsert_range_bounds(date("2024-07-01"), date("2024-07-14"), None)
        .unwrap();

    let persisted = persist_session(&store, "shop-1", session).unwrap();
    assert_eq!(load_configuration(&store, "shop-1").unwrap(), persisted);
}

#[test]
fn failed_persist_returns_session_for_retry() {
    let store = FlakyStore {
        inner: MemoryStore::new(),
        healthy: Cell::new(false),
    };
    let mut session = EditorSession::new();
    session.upsert_date(date("2024-12-25"), None).unwrap();

    let err = persist_session(&store, "shop-1", session).unwrap_err();
    assert!(matches!(err.store_error(), StoreError::Rejected { .. }));
    assert!(load_configuration(&store, "shop-1").unwrap().is_empty());

    let session = err.into_session();
    assert!(session.is_dirty());
    assert_eq!(session.dates().len(), 1);

    store.healthy.set(true);
    let persisted = persist_session(&store, "shop-1", session).unwrap();
    assert_eq!(persisted.blocked_dates(), &[date("2024-12-25")]);
    assert_eq!(load_configuration(&store, "shop-1").unwrap(), persisted);
}

#[test]
fn last_writer_wins() {
    let store = MemoryStore::new();
    let base = Configuration::new();

    let mut first = EditorSession::from_configuration(&base);
    first.toggle_weekday(1).unwrap();
    let mut second = EditorSession::from_configuration(&base);
    second.toggle_weekday(2).unwrap();

    persist_session(&store, "shop-1", first).unwrap();
    persist_session(&store, "shop-1", second).unwrap();

    let loaded = load_configuration(&store, "shop-1").unwrap();
    assert_eq!(loaded.blocked_weekdays().iter().copied().collect::<Vec<_>>(), vec![2]);
}

// ── FileStore ───────────────────────────────────────────────────────────────

#[test]
fn file_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    assert!(load_configuration(&store, "shop-1").unwrap().is_empty());

    let mut session = EditorSession::new();
    session.toggle_weekday(6).unwrap();
    let persisted = persist_session(&store, "shop-1", session).unwrap();

    assert_eq!(load_configuration(&store, "shop-1").unwrap(), persisted);
    assert!(store.path_for("shop-1").exists());
}

#[test]
fn file_store_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("nested").join("settings"));
    store.save("shop-1", "{}").unwrap();
    assert_eq!(store.load("shop-1").unwrap().as_deref(), Some("{}"));
}

#[test]
fn file_store_escapes_owner_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let path = store.path_for("gid://shopify/Shop/1");
    assert_eq!(path.parent(), Some(dir.path()));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert_eq!(
        name,
        format!("gid_3a_2f_2fshopify_2fShop_2f1.{CONFIG_NAMESPACE}.{CONFIG_KEY}.json")
    );
    assert!(store
        .path_for("shop-1")
        .ends_with(format!("shop-1.{CONFIG_NAMESPACE}.{CONFIG_KEY}.json")));
}

#[test]
fn file_store_keeps_lookalike_owners_apart() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let owners = ["shop/1", "shop_1", "shop_2f1", "gid://a", "gid___a", "caf\u{e9}", "caf_"];

    let paths: std::collections::HashSet<_> = owners.iter().map(|o| store.path_for(o)).collect();
    assert_eq!(paths.len(), owners.len());

    let mut session = EditorSession::new();
    session.toggle_weekday(3).unwrap();
    persist_session(&store, "shop/1", session).unwrap();

    assert!(load_configuration(&store, "shop_1").unwrap().is_empty());
    assert!(load_configuration(&store, "shop_2f1").unwrap().is_empty());
    assert!(load_configuration(&store, "shop/1").unwrap().is_weekday_blocked(3));
}

#[test]
fn file_store_treats_non_utf8_file_as_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.path_for("shop-1"), [0xff, 0xfe, 0x00]).unwrap();

    let loaded = load_configuration(&store, "shop-1").unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn file_store_failed_write_cleans_up_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    // A non-empty directory where the file should go makes the final rename fail.
    let target = store.path_for("shop-1");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep"), "x").unwrap();

    let err = store.save("shop-1", "{}").unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![target]);
}

#[test]
fn file_store_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    store.save("shop-1", "{}").unwrap();
    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}
