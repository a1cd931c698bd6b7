use liftlog_core::model::{
    Entry, ExerciseCatalog, ExerciseName, Ledger, LoggedAt, Performance, UserName,
};
use storage::repository::{CatalogRepository, LedgerRepository, StorageError};
use storage::sqlite::SqliteRepository;

fn entry(user: &str, at: &str, exercise: &str, weight: f64) -> Entry {
    Entry::new(
        UserName::new(user).unwrap(),
        LoggedAt::parse(at).unwrap(),
        ExerciseName::new(exercise).unwrap(),
        Performance {
            weight,
            sets: 3,
            reps: 5,
            last_set_reps: 4,
            effort: 8,
        },
    )
    .unwrap()
}

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_ledger_keeps_insertion_order() {
    let repo = repo("memdb_ledger_order").await;
    assert!(repo.read_all().await.unwrap().is_empty());

    // Deliberately not sorted by timestamp.
    let ledger = Ledger::from_entries(vec![
        entry("al", "2024/01/03 10:00:00", "Squat", 105.0),
        entry("al", "2024/01/01 10:00:00", "Squat", 100.0),
        entry("bo", "2024/01/02 08:15:00", "Bench Press", 62.5),
    ]);
    repo.overwrite_all(&ledger).await.unwrap();

    let fetched = repo.read_all().await.unwrap();
    assert_eq!(fetched, ledger);
}

#[tokio::test]
async fn sqlite_overwrite_replaces_previous_rows() {
    let repo = repo("memdb_ledger_replace").await;
    let first = Ledger::from_entries(vec![
        entry("al", "2024/01/01 10:00:00", "Squat", 100.0),
        entry("al", "2024/01/01 10:05:00", "Dips", 0.0),
    ]);
    repo.overwrite_all(&first).await.unwrap();

    let second = Ledger::from_entries(vec![entry("bo", "2024/02/01 09:00:00", "Pull-up", 0.0)]);
    repo.overwrite_all(&second).await.unwrap();
    assert_eq!(repo.read_all().await.unwrap(), second);
}

#[tokio::test]
async fn sqlite_guarded_overwrite_rejects_stale_count() {
    let repo = repo("memdb_ledger_guard").await;
    let base = Ledger::from_entries(vec![entry("al", "2024/01/01 10:00:00", "Squat", 100.0)]);
    repo.overwrite_all(&base).await.unwrap();

    let stale = Ledger::new().appended(&[entry("bo", "2024/01/01 11:00:00", "Dips", 0.0)]);
    let err = repo.overwrite_if_unchanged(0, &stale).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Conflict {
            expected: 0,
            found: 1
        }
    ));
    assert_eq!(repo.read_all().await.unwrap(), base);

    let merged = base.appended(&[entry("al", "2024/01/01 11:00:00", "Dips", 0.0)]);
    repo.overwrite_if_unchanged(1, &merged).await.unwrap();
    assert_eq!(repo.read_all().await.unwrap(), merged);
}

#[tokio::test]
async fn sqlite_rejects_rows_with_bad_timestamps() {
    let repo = repo("memdb_ledger_schema").await;
    sqlx::query(
        r"
        INSERT INTO data (position, name, timestamp, exercise, weight, sets, reps, last_set, effort)
        VALUES (0, 'al', '2024-01-01T10:00:00Z', 'Squat', 100, 3, 5, 5, 8)
        ",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let err = repo.read_all().await.unwrap_err();
    assert!(matches!(err, StorageError::Schema(_)), "{err}");
}

#[tokio::test]
async fn sqlite_catalog_round_trips_in_order() {
    let repo = repo("memdb_catalog").await;
    assert!(repo.list_exercises().await.unwrap().is_empty());

    let catalog = ExerciseCatalog::from_cells(["Squat", "Bench Press", "Dips"]);
    repo.replace_exercises(&catalog).await.unwrap();
    assert_eq!(repo.list_exercises().await.unwrap(), catalog);

    let smaller = ExerciseCatalog::from_cells(["Pull-up"]);
    repo.replace_exercises(&smaller).await.unwrap();
    assert_eq!(repo.list_exercises().await.unwrap(), smaller);
}

#[tokio::test]
async fn sqlite_reads_back_names_longer_than_sign_in_allows() {
    let repo = repo("memdb_long_names").await;
    let ledger = Ledger::from_entries(vec![
        entry("al", "2024/01/01 10:00:00", "Squat", 100.0),
        entry("Alexandra Montgomery-Smith", "2024/01/01 11:00:00", "Dips", 0.0),
    ]);
    repo.overwrite_all(&ledger).await.unwrap();

    let fetched = repo.read_all().await.unwrap();
    assert_eq!(fetched, ledger);
    assert_eq!(
        fetched.entries()[1].user().as_str(),
        "Alexandra Montgomery-Smith"
    );
}
