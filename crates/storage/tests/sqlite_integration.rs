use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{
    AnswerOption, AnswerRecord, Difficulty, Label, Question, Report, ReportId, ReportItem,
    ReportMetadata, SessionId,
};
use quiz_core::time::fixed_now;
use storage::repository::{ReportRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

fn build_question(text: &str, correct: Label) -> Question {
    Question::new(
        text,
        [
            AnswerOption::new(Label::C, "Session"),
            AnswerOption::new(Label::A, "Physical"),
            AnswerOption::new(Label::D, "Application"),
            AnswerOption::new(Label::B, "Network"),
        ],
        correct,
        "Routing is a Network-layer function.",
    )
    .unwrap()
}

fn build_report(completed_at: DateTime<Utc>) -> Report {
    let first = build_question("Which layer routes packets?", Label::B);
    let second = build_question("Which layer carries bits?", Label::A);
    let items = vec![
        ReportItem::from_answer(&first, &AnswerRecord::new(0, Label::B, Label::B)),
        ReportItem::from_answer(&second, &AnswerRecord::new(1, Label::D, Label::A)),
    ];
    Report::new(SessionId::generate(), fixed_now(), completed_at, items).unwrap()
}

fn metadata(completed_at: DateTime<Utc>) -> ReportMetadata {
    ReportMetadata::new(
        "Ana Torres",
        Some("ana@example.com".into()),
        "Switching and routing",
        Difficulty::Intermediate,
        completed_at,
    )
    .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_report_detail() {
    let repo = connect("memdb_report_roundtrip").await;
    let completed_at = fixed_now() + Duration::minutes(4);
    let report = build_report(completed_at);
    let meta = metadata(completed_at);

    let id = repo.append_report(&meta, &report).await.expect("append");
    let stored = repo.get_report(id).await.expect("fetch");

    assert_eq!(stored.id, id);
    assert_eq!(stored.report, report);
    assert_eq!(stored.metadata, meta);
    assert_eq!(stored.report.items()[0].options[0].label(), Label::C);
    assert_eq!(stored.report.items()[1].chosen_text, "Application");
    assert_eq!(stored.report.score(), 1);
}

#[tokio::test]
async fn sqlite_rejects_duplicate_session_and_missing_ids() {
    let repo = connect("memdb_report_conflict").await;
    let report = build_report(fixed_now());
    repo.append_report(&metadata(fixed_now()), &report)
        .await
        .expect("append");

    let err = repo
        .append_report(&metadata(fixed_now()), &report)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let missing = repo.get_report(ReportId::new(404)).await.unwrap_err();
    assert!(matches!(missing, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_lists_newest_first() {
    let repo = connect("memdb_report_list").await;
    let earlier = fixed_now() + Duration::minutes(1);
    let later = fixed_now() + Duration::hours(2);

    repo.append_report(&metadata(earlier), &build_report(earlier))
        .await
        .unwrap();
    let newest = repo
        .append_report(&metadata(later), &build_report(later))
        .await
        .unwrap();

    let items = repo.list_reports(10).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, newest);
    assert_eq!(items[0].difficulty, Difficulty::Intermediate);
    assert_eq!((items[0].score, items[0].total), (1, 2));

    assert_eq!(repo.list_reports(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn storage_sqlite_runs_migrations_once() {
    let url = "sqlite:file:memdb_storage_bootstrap?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("bootstrap");
    let again = SqliteRepository::connect(url).await.expect("connect");
    again.migrate().await.expect("second migrate is a no-op");

    let report = build_report(fixed_now());
    let id = storage
        .reports
        .append_report(&metadata(fixed_now()), &report)
        .await
        .unwrap();
    assert_eq!(again.get_report(id).await.unwrap().report, report);
}
