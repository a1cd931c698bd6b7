use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use liftlog_core::model::{
    Entry, ExerciseCatalog, ExerciseName, Ledger, LoggedAt, Performance, UserName,
};
use liftlog_core::time::{fixed_clock, fixed_now};
use services::{Clock, EntryForm, SessionError, ValidationError, WorkoutService};
use storage::repository::{
    CatalogRepository, InMemoryRepository, LedgerRepository, StorageError,
};

fn catalog() -> ExerciseCatalog {
    ExerciseCatalog::from_cells(["Bench Press", "Squat", "Dips", "Pull-up"])
}

fn entry(user: &str, at: &str, exercise: &str, weight: f64) -> Entry {
    Entry::new(
        UserName::new(user).unwrap(),
        LoggedAt::parse(at).unwrap(),
        ExerciseName::new(exercise).unwrap(),
        Performance {
            weight,
            sets: 3,
            reps: 5,
            last_set_reps: 5,
            effort: 8,
        },
    )
    .unwrap()
}

fn squat_form() -> EntryForm {
    EntryForm {
        exercise: "Squat".into(),
        weight: 100.0,
        sets: 3,
        reps: 5,
        last_set_reps: 5,
        effort: 8,
    }
}

fn service_over(repo: &InMemoryRepository, clock: Clock) -> WorkoutService {
    WorkoutService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone()))
}

/// Ledger store that counts calls, can refuse writes, and can let another
/// writer slip a row in right after a read.
#[derive(Default)]
struct FlakyLedger {
    inner: InMemoryRepository,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    sneak_in: Mutex<Option<Entry>>,
}

impl FlakyLedger {
    fn over(inner: InMemoryRepository) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    fn refuse_writes(&self, refuse: bool) {
        self.fail_writes.store(refuse, Ordering::SeqCst);
    }

    fn sneak_in_after_next_read(&self, entry: Entry) {
        *self.sneak_in.lock().unwrap() = Some(entry);
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Connectivity("spreadsheet unreachable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerRepository for FlakyLedger {
    async fn read_all(&self) -> Result<Ledger, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let ledger = self.inner.read_all().await?;
        let pending = self.sneak_in.lock().unwrap().take();
        if let Some(entry) = pending {
            self.inner.overwrite_all(&ledger.appended(&[entry])).await?;
        }
        Ok(ledger)
    }

    async fn overwrite_all(&self, ledger: &Ledger) -> Result<(), StorageError> {
        self.check_writable()?;
        self.inner.overwrite_all(ledger).await
    }

    async fn overwrite_if_unchanged(
        &self,
        expected_rows: usize,
        ledger: &Ledger,
    ) -> Result<(), StorageError> {
        self.check_writable()?;
        self.inner.overwrite_if_unchanged(expected_rows, ledger).await
    }
}

#[tokio::test]
async fn flush_appends_buffer_with_generated_timestamp() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let service = service_over(&repo, fixed_clock());

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    assert_eq!(service.add_entry(&mut session, &squat_form()).unwrap(), 0);

    let outcome = service.flush(&mut session).await.unwrap();
    assert_eq!(outcome.appended, 1);
    assert_eq!(outcome.ledger_rows, 1);
    assert!(session.buffer().is_empty());

    let stored = repo.read_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    let row = &stored.entries()[0];
    assert_eq!(row.user().as_str(), "al");
    assert_eq!(row.exercise().as_str(), "Squat");
    assert_eq!(row.logged_at(), fixed_now());
    assert_eq!(row.logged_at().to_string(), "2023/11/14 22:13:20");
    assert_eq!(session.ledger(), &stored);
}

#[tokio::test]
async fn flush_keeps_rows_written_since_session_start() {
    let existing = Ledger::from_entries(vec![entry("al", "2024/01/01 10:00:00", "Squat", 95.0)]);
    let repo = InMemoryRepository::with_contents(existing.clone(), catalog());
    let mut clock = Clock::fixed(LoggedAt::parse("2024/01/02 18:00:00").unwrap());
    let service = service_over(&repo, clock);

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();

    // Another client pushes while this one is still logging.
    let other = entry("bo", "2024/01/02 17:30:00", "Bench Press", 60.0);
    repo.overwrite_all(&existing.appended(std::slice::from_ref(&other)))
        .await
        .unwrap();

    service.add_entry(&mut session, &squat_form()).unwrap();
    clock.advance(Duration::minutes(5));
    let later = service_over(&repo, clock);
    let dips = EntryForm {
        exercise: "Dips".into(),
        weight: 0.0,
        ..squat_form()
    };
    later.add_entry(&mut session, &dips).unwrap();

    let outcome = service.flush(&mut session).await.unwrap();
    assert_eq!(outcome.appended, 2);
    assert_eq!(outcome.ledger_rows, 4);

    let stored = repo.read_all().await.unwrap();
    let exercises: Vec<_> = stored
        .entries()
        .iter()
        .map(|e| (e.user().as_str(), e.exercise().as_str()))
        .collect();
    assert_eq!(
        exercises,
        vec![
            ("al", "Squat"),
            ("bo", "Bench Press"),
            ("al", "Squat"),
            ("al", "Dips"),
        ]
    );
    assert_eq!(
        stored.entries()[3].logged_at().to_string(),
        "2024/01/02 18:05:00"
    );
}

#[tokio::test]
async fn empty_flush_touches_no_remote_state() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let ledger = Arc::new(FlakyLedger::over(repo.clone()));
    let service = WorkoutService::new(fixed_clock(), ledger.clone(), Arc::new(repo.clone()));

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    let reads_before = ledger.reads.load(Ordering::SeqCst);

    let outcome = service.flush(&mut session).await.unwrap();
    assert_eq!(outcome.appended, 0);
    assert_eq!(ledger.reads.load(Ordering::SeqCst), reads_before);
    assert_eq!(ledger.writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_flush_keeps_buffer_and_snapshot() {
    let repo = InMemoryRepository::with_contents(
        Ledger::from_entries(vec![entry("al", "2024/01/01 10:00:00", "Squat", 95.0)]),
        catalog(),
    );
    let ledger = Arc::new(FlakyLedger::over(repo.clone()));
    let service = WorkoutService::new(fixed_clock(), ledger.clone(), Arc::new(repo.clone()));

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();
    let snapshot = session.ledger().clone();

    ledger.refuse_writes(true);
    let err = service.flush(&mut session).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Storage(StorageError::Connectivity(_))
    ));
    assert_eq!(session.buffer().len(), 1);
    assert_eq!(session.ledger(), &snapshot);
    assert_eq!(repo.read_all().await.unwrap().len(), 1);

    // Retrying once the store is back pushes the same entries.
    ledger.refuse_writes(false);
    let outcome = service.flush(&mut session).await.unwrap();
    assert_eq!(outcome.ledger_rows, 2);
    assert!(session.buffer().is_empty());
}

#[tokio::test]
async fn concurrent_push_during_flush_is_a_conflict() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let ledger = Arc::new(FlakyLedger::over(repo.clone()));
    let service = WorkoutService::new(fixed_clock(), ledger.clone(), Arc::new(repo.clone()));

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();

    ledger.sneak_in_after_next_read(entry("bo", "2024/01/02 08:00:00", "Dips", 0.0));
    let err = service.flush(&mut session).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Storage(StorageError::Conflict {
            expected: 0,
            found: 1
        })
    ));
    assert_eq!(session.buffer().len(), 1);
    assert!(session.ledger().is_empty());

    // The other writer's row survives and a retry merges on top of it.
    service.flush(&mut session).await.unwrap();
    let stored = repo.read_all().await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.entries()[0].user().as_str(), "bo");
    assert_eq!(stored.entries()[1].user().as_str(), "al");
}

#[tokio::test]
async fn unguarded_flush_overwrites_without_counting() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let ledger = Arc::new(FlakyLedger::over(repo.clone()));
    let service = WorkoutService::new(fixed_clock(), ledger.clone(), Arc::new(repo.clone()))
        .with_overwrite_guard(false);

    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();

    // The sneaked-in row is lost: last writer wins.
    ledger.sneak_in_after_next_read(entry("bo", "2024/01/02 08:00:00", "Dips", 0.0));
    service.flush(&mut session).await.unwrap();
    let stored = repo.read_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored.entries()[0].user().as_str(), "al");
}

#[tokio::test]
async fn add_entry_validates_form_and_sign_in() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let service = service_over(&repo, fixed_clock());
    let mut session = service.start_session().await.unwrap();

    assert!(matches!(
        service.add_entry(&mut session, &squat_form()),
        Err(SessionError::NotSignedIn)
    ));

    session.sign_in("al").unwrap();
    let unknown = EntryForm {
        exercise: "Curl".into(),
        ..squat_form()
    };
    assert!(matches!(
        service.add_entry(&mut session, &unknown),
        Err(SessionError::Validation(ValidationError::UnknownExercise(_)))
    ));
    let heavy = EntryForm {
        weight: 750.0,
        ..squat_form()
    };
    assert!(matches!(
        service.add_entry(&mut session, &heavy),
        Err(SessionError::Validation(ValidationError::WeightOutOfRange { .. }))
    ));
    assert!(session.buffer().is_empty());

    service.add_entry(&mut session, &squat_form()).unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();
    let removed = service.delete_entry(&mut session, 1).unwrap();
    assert_eq!(removed.exercise().as_str(), "Squat");
    assert_eq!(session.buffer().len(), 1);
    assert!(matches!(
        service.delete_entry(&mut session, 5),
        Err(SessionError::Buffer(_))
    ));
}

#[tokio::test]
async fn prefill_uses_latest_committed_entry() {
    let repo = InMemoryRepository::with_contents(
        Ledger::from_entries(vec![
            entry("al", "2024/01/01 10:00:00", "Squat", 100.0),
            entry("al", "2024/01/03 10:00:00", "Squat", 105.0),
            entry("al", "2024/01/02 10:00:00", "Squat", 102.5),
            entry("bo", "2024/01/04 10:00:00", "Squat", 140.0),
        ]),
        catalog(),
    );
    let service = service_over(&repo, fixed_clock());
    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();

    let squat = ExerciseName::new("Squat").unwrap();
    let form = session.prefill(&squat).unwrap();
    assert!((form.weight - 105.0).abs() < f64::EPSILON);
    assert_eq!(form.sets, 3);

    let dips = ExerciseName::new("Dips").unwrap();
    let fresh = session.prefill(&dips).unwrap();
    assert_eq!(fresh.exercise, "Dips");
    assert_eq!(fresh.weight, 0.0);

    let options: Vec<_> = session
        .catalog_options()
        .iter()
        .map(|name| name.as_str().to_owned())
        .collect();
    assert_eq!(options, vec!["Squat", "Bench Press", "Dips", "Pull-up"]);
}

#[tokio::test]
async fn refresh_picks_up_remote_changes_and_keeps_buffer() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let service = service_over(&repo, fixed_clock());
    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();

    repo.overwrite_all(&Ledger::from_entries(vec![entry(
        "al",
        "2024/01/01 10:00:00",
        "Dips",
        10.0,
    )]))
    .await
    .unwrap();
    repo.replace_exercises(&ExerciseCatalog::from_cells(["Squat", "Dips", "Lunge"]))
        .await
        .unwrap();

    service.refresh(&mut session).await.unwrap();
    assert_eq!(session.ledger().len(), 1);
    assert!(session
        .catalog()
        .contains(&ExerciseName::new("Lunge").unwrap()));
    assert_eq!(session.buffer().len(), 1);
    assert_eq!(session.user().unwrap().as_str(), "al");
}

#[tokio::test]
async fn full_reset_signs_out_and_reloads() {
    let repo = InMemoryRepository::with_contents(Ledger::new(), catalog());
    let service = service_over(&repo, fixed_clock());
    let mut session = service.start_session().await.unwrap();
    session.sign_in("al").unwrap();
    service.add_entry(&mut session, &squat_form()).unwrap();

    repo.overwrite_all(&Ledger::from_entries(vec![entry(
        "bo",
        "2024/01/01 10:00:00",
        "Dips",
        0.0,
    )]))
    .await
    .unwrap();

    service.full_reset(&mut session).await.unwrap();
    assert!(!session.is_signed_in());
    assert!(session.buffer().is_empty());
    assert_eq!(session.ledger().len(), 1);
}
