use super::*;
use crate::{
    registry::{refresh_signal, DocumentRegistry},
    test_support::{Call, FakeBackend, Op},
};

const USER: UserId = UserId(3);

fn coordinator(backend: Arc<FakeBackend>) -> (UploadCoordinator, DocumentRegistry) {
    let (trigger, refresh) = refresh_signal();
    let registry = DocumentRegistry::new(backend.clone(), USER, refresh);
    (UploadCoordinator::new(backend, USER, trigger), registry)
}

fn pdf() -> PendingFile {
    PendingFile::new("report.pdf", b"%PDF-1.4".to_vec())
}

#[test]
fn extension_check_is_case_insensitive_and_advisory() {
    assert!(PendingFile::new("Sheet.XLSX", Vec::new()).has_accepted_extension());
    assert!(PendingFile::new("notes.txt", Vec::new()).has_accepted_extension());
    assert!(!PendingFile::new("image.png", Vec::new()).has_accepted_extension());
    assert!(!PendingFile::new("README", Vec::new()).has_accepted_extension());
}

#[test]
fn mime_type_is_guessed_from_name() {
    assert_eq!(pdf().mime_type(), "application/pdf");
    assert_eq!(
        PendingFile::new("blob.unknownext", Vec::new()).mime_type(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn select_replaces_prior_selection_even_outside_allow_list() {
    let (mut coordinator, _) = coordinator(Arc::new(FakeBackend::new()));

    assert!(coordinator.select(pdf()));
    assert!(!coordinator.select(PendingFile::new("photo.png", vec![1, 2])));

    assert_eq!(coordinator.pending().map(PendingFile::name), Some("photo.png"));
}

#[tokio::test]
async fn upload_without_file_is_a_no_op() {
    let backend = Arc::new(FakeBackend::new());
    let (mut coordinator, _) = coordinator(backend.clone());

    assert!(!coordinator.can_upload());
    assert_eq!(coordinator.upload().await, UploadOutcome::Skipped);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn successful_upload_clears_pending_and_triggers_relist() {
    let backend = Arc::new(FakeBackend::new());
    let (mut coordinator, mut registry) = coordinator(backend.clone());
    registry.sync().await.expect("initial list");
    coordinator.select(pdf());

    let outcome = coordinator.upload().await;

    assert_eq!(
        outcome.notice().map(|notice| notice.text.as_str()),
        Some("Upload successful!")
    );
    assert!(coordinator.pending().is_none());
    assert!(!coordinator.is_uploading());

    assert_eq!(registry.sync().await, Ok(true));
    assert_eq!(registry.documents()[0].file_name, "report.pdf");
    assert_eq!(
        backend.calls(),
        vec![
            Call::List(USER),
            Call::Upload(USER, "report.pdf".into()),
            Call::List(USER),
        ]
    );
}

#[tokio::test]
async fn failed_upload_keeps_file_for_retry() {
    let backend = Arc::new(FakeBackend::new());
    let (mut coordinator, mut registry) = coordinator(backend.clone());
    registry.sync().await.expect("initial list");
    coordinator.select(pdf());
    backend.fail(Op::Upload);

    let outcome = coordinator.upload().await;

    assert!(matches!(&outcome, UploadOutcome::Failed(notice) if notice.text == "Upload failed"));
    assert_eq!(coordinator.pending(), Some(&pdf()));
    assert_eq!(registry.sync().await, Ok(false));

    backend.recover(Op::Upload);
    assert!(matches!(coordinator.upload().await, UploadOutcome::Uploaded(_)));
    assert!(coordinator.pending().is_none());
}

#[tokio::test]
async fn remove_clears_selection() {
    let (mut coordinator, _) = coordinator(Arc::new(FakeBackend::new()));
    coordinator.select(pdf());

    assert_eq!(coordinator.remove(), Some(pdf()));
    assert!(coordinator.pending().is_none());
    assert_eq!(coordinator.remove(), None);
}

#[tokio::test]
async fn from_path_reads_name_and_bytes() {
    let dir = std::env::temp_dir().join(format!("documind_upload_{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.expect("dir");
    let path = dir.join("notes.txt");
    tokio::fs::write(&path, b"hello").await.expect("write");

    let file = PendingFile::from_path(&path).await.expect("read");

    assert_eq!(file.name(), "notes.txt");
    assert_eq!(file.bytes(), b"hello");
    assert!(PendingFile::from_path(dir.join("missing.txt")).await.is_err());

    tokio::fs::remove_dir_all(dir).await.expect("cleanup");
}
