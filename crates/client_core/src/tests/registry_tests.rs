use super::*;
use crate::test_support::{Call, FakeBackend, Op};

const USER: UserId = UserId(7);

fn registry(backend: FakeBackend) -> (Arc<FakeBackend>, RefreshTrigger, DocumentRegistry) {
    let backend = Arc::new(backend);
    let (trigger, refresh) = refresh_signal();
    let registry = DocumentRegistry::new(backend.clone(), USER, refresh);
    (backend, trigger, registry)
}

fn ids(registry: &DocumentRegistry) -> Vec<DocumentId> {
    registry.documents().iter().map(|doc| doc.id).collect()
}

#[tokio::test]
async fn sync_lists_once_per_user_and_refresh_generation() {
    let (backend, trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf", "b.txt"]));
    assert!(registry.is_loading());

    assert_eq!(registry.sync().await, Ok(true));
    assert_eq!(registry.sync().await, Ok(false));
    assert!(!registry.is_loading());
    assert_eq!(registry.documents().len(), 2);

    trigger.bump();
    assert_eq!(registry.sync().await, Ok(true));

    registry.set_user(UserId(8));
    assert_eq!(registry.sync().await, Ok(true));

    assert_eq!(
        backend.calls(),
        vec![
            Call::List(USER),
            Call::List(USER),
            Call::List(UserId(8)),
        ]
    );
}

#[tokio::test]
async fn deleted_document_is_gone_after_relist() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf", "b.txt", "c.csv"]));
    registry.list().await.expect("list");
    let victim = registry.documents()[1].id;

    registry.delete(victim).await.expect("delete");

    assert!(!ids(&registry).contains(&victim));
    assert_eq!(ids(&registry), backend.stored_ids());
    assert_eq!(
        backend.calls(),
        vec![Call::List(USER), Call::Delete(victim), Call::List(USER)]
    );
}

#[tokio::test]
async fn failed_delete_keeps_cached_list_and_skips_relist() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf", "b.txt"]));
    registry.list().await.expect("list");
    let before = ids(&registry);
    backend.fail(Op::Delete);

    let notice = registry.delete(before[0]).await.expect_err("must fail");

    assert!(notice.is_error());
    assert_eq!(notice.text, "Delete failed");
    assert_eq!(ids(&registry), before);
    assert_eq!(backend.count(|call| matches!(call, Call::List(_))), 1);
}

#[tokio::test]
async fn failed_list_leaves_stale_documents() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf"]));
    registry.list().await.expect("list");
    backend.fail(Op::List);

    let notice = registry.list().await.expect_err("list fails");

    assert_eq!(notice.text, "Failed to load documents");
    assert_eq!(registry.documents().len(), 1);
}

#[tokio::test]
async fn declined_delete_all_issues_nothing() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf", "b.txt"]));
    registry.list().await.expect("list");

    let outcome = registry
        .delete_all(|prompt| {
            assert_eq!(prompt, CLEAR_ALL_PROMPT);
            async { false }
        })
        .await;

    assert_eq!(outcome, Ok(DeleteAllOutcome::Declined));
    assert_eq!(registry.documents().len(), 2);
    assert_eq!(backend.calls(), vec![Call::List(USER)]);
}

#[tokio::test]
async fn confirmed_delete_all_clears_and_relists() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf", "b.txt"]));
    registry.list().await.expect("list");
    assert!(registry.can_clear_all());

    let outcome = registry.delete_all(|_| async { true }).await;

    assert_eq!(outcome, Ok(DeleteAllOutcome::Cleared));
    assert!(registry.documents().is_empty());
    assert!(!registry.can_clear_all());
    assert_eq!(
        backend.calls(),
        vec![Call::List(USER), Call::DeleteAll(USER), Call::List(USER)]
    );
}

#[tokio::test]
async fn failed_delete_all_reports_and_keeps_list() {
    let (backend, _trigger, mut registry) =
        registry(FakeBackend::new().with_documents(&["a.pdf"]));
    registry.list().await.expect("list");
    backend.fail(Op::DeleteAll);

    let notice = registry
        .delete_all(|_| async { true })
        .await
        .expect_err("must fail");

    assert_eq!(notice.text, "Failed to clear documents");
    assert_eq!(registry.documents().len(), 1);
}
