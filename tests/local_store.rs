//! Local store behavior beyond the capture path: listings, maintenance,
//! fish catch annotations, and reopening an existing database.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use lakelog::{Database, FishCatch, Position, Reading, ReadingFlags, SyncState};

fn reading_at(minutes_ago: i64, depth: f64) -> Reading {
    Reading {
        id: None,
        remote_id: None,
        depth,
        position: Some(Position {
            latitude: 53.9,
            longitude: 27.5 + depth * 1e-4,
            accuracy_m: 10.0,
        }),
        flags: ReadingFlags::default(),
        captured_at: Utc::now() - Duration::minutes(minutes_ago),
        sync_state: SyncState::Pending,
    }
}

#[tokio::test]
async fn listings_are_newest_first() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("local.sqlite3")).unwrap();

    db.insert_reading(&reading_at(30, 3.0)).await.unwrap();
    db.insert_reading(&reading_at(10, 4.0)).await.unwrap();
    db.insert_reading(&reading_at(20, 5.0)).await.unwrap();

    let listed = db.list_readings().await.unwrap();
    let depths: Vec<f64> = listed.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![4.0, 5.0, 3.0]);

    let latest = db.latest_reading().await.unwrap().unwrap();
    assert_eq!(latest.depth, 4.0);
}

#[tokio::test]
async fn clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("local.sqlite3")).unwrap();

    db.insert_reading(&reading_at(5, 3.0)).await.unwrap();
    db.insert_reading(&reading_at(1, 4.0)).await.unwrap();
    assert_eq!(db.pending_count().await.unwrap(), 2);

    db.clear_readings().await.unwrap();
    assert_eq!(db.pending_count().await.unwrap(), 0);
    assert!(db.list_readings().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_removes_a_single_reading() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("local.sqlite3")).unwrap();

    let keep = db.insert_reading(&reading_at(5, 3.0)).await.unwrap();
    let remove = db.insert_reading(&reading_at(1, 4.0)).await.unwrap();

    db.delete_reading(remove).await.unwrap();
    assert!(db.get_reading(remove).await.unwrap().is_none());
    assert!(db.get_reading(keep).await.unwrap().is_some());
}

#[tokio::test]
async fn reopening_keeps_data_and_schema() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("local.sqlite3");

    {
        let db = Database::new(path.clone()).unwrap();
        db.insert_reading(&reading_at(5, 3.0)).await.unwrap();
    }

    // Second open runs migrations again over an up-to-date file.
    let db = Database::new(path).unwrap();
    let listed = db.list_readings().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].depth, 3.0);
}

#[tokio::test]
async fn fish_catches_round_trip() {
    let dir = TempDir::new().unwrap();
    let db = Database::new(dir.path().join("local.sqlite3")).unwrap();

    let mut catch = FishCatch::new(
        "perch",
        Some(Position {
            latitude: 53.91,
            longitude: 27.52,
            accuracy_m: 6.0,
        }),
        Utc::now(),
    );
    catch.weight_kg = Some(0.8);
    catch.note = Some("near the reeds".into());

    db.insert_fish_catch(&catch).await.unwrap();

    let listed = db.list_fish_catches().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].species, "perch");
    assert_eq!(listed[0].weight_kg, Some(0.8));
    assert_eq!(listed[0].note.as_deref(), Some("near the reeds"));
    assert!(listed[0].position.is_some());

    db.delete_fish_catch(catch.id.clone()).await.unwrap();
    assert!(db.list_fish_catches().await.unwrap().is_empty());
}
