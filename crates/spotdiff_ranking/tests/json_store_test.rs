//! Integration test for the JSON file ranking store.

use spotdiff_ranking::{JsonFileStore, RankingEntry, RankingError, RankingStore, RankingTable};

fn temp_ranking_path(tag: &str) -> std::path::PathBuf {
    let id = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("test_ranking_{tag}_{id}.json"))
}

#[test]
fn test_missing_file_reads_empty() {
    let store = JsonFileStore::new(temp_ranking_path("missing"));
    assert!(store.read().unwrap().is_empty());
}

#[test]
fn test_write_then_read() {
    let path = temp_ranking_path("roundtrip");
    let store = JsonFileStore::new(&path);

    let mut table = RankingTable::new(10);
    table.submit(RankingEntry::new("mina", 800, 10));
    table.submit(RankingEntry::new("joon", 1200, 20));
    store.write(table.entries()).unwrap();

    // A second handle sees the same record
    let reopened = JsonFileStore::new(&path);
    let loaded = RankingTable::from_entries(reopened.read().unwrap(), 10);
    assert_eq!(loaded, table);
    assert_eq!(loaded.best().unwrap().name, "joon");

    // No temp file left behind
    let tmp = path.with_file_name(format!(
        "{}.tmp",
        path.file_name().unwrap().to_string_lossy()
    ));
    assert!(!tmp.exists());

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_rewrite_replaces_record() {
    let path = temp_ranking_path("rewrite");
    let store = JsonFileStore::new(&path);

    store.write(&[RankingEntry::new("a", 1, 0)]).unwrap();
    store.write(&[RankingEntry::new("b", 2, 0), RankingEntry::new("c", 1, 0)]).unwrap();

    let names: Vec<_> = store.read().unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, ["b", "c"]);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_corrupt_file() {
    let path = temp_ranking_path("corrupt");
    std::fs::write(&path, "[{\"name\": 5}]").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(matches!(store.read(), Err(RankingError::Corrupt(_))));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_unwritable_location() {
    let dir = temp_ranking_path("missing_dir");
    let store = JsonFileStore::new(dir.join("nested").join("ranking.json"));
    assert!(matches!(
        store.write(&[RankingEntry::new("a", 1, 0)]),
        Err(RankingError::StorageUnavailable(_))
    ));
}
