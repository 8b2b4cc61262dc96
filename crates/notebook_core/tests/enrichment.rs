use notebook_core::{
    DocumentStore, EncyclopediaLookup, EnrichOutcome, EnrichmentService, FileNoteRepository,
    LookupError, LookupHit, LookupResult, NoteRepository, RepoError,
};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

struct FakeLookup {
    response: LookupResult<LookupHit>,
    calls: AtomicUsize,
}

impl FakeLookup {
    fn returning(response: LookupResult<LookupHit>) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }
}

impl EncyclopediaLookup for FakeLookup {
    fn lookup(&self, _term: &str) -> LookupResult<LookupHit> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }

    fn source_label(&self) -> &str {
        "Wikipedia"
    }
}

fn go_hit() -> LookupHit {
    LookupHit {
        title: "Go (programming language)".to_string(),
        link: "https://en.wikipedia.org/wiki/Go_(programming_language)".to_string(),
        summary: "Go is a statically typed, compiled language.".to_string(),
    }
}

fn setup(
    response: LookupResult<LookupHit>,
) -> (
    TempDir,
    Arc<FileNoteRepository>,
    Arc<FakeLookup>,
    EnrichmentService<FileNoteRepository, FakeLookup>,
) {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path().join("notebook.json")).unwrap();
    let repo = Arc::new(FileNoteRepository::new(Arc::new(store)));
    let lookup = Arc::new(FakeLookup::returning(response));
    let service = EnrichmentService::new(Arc::clone(&repo), Arc::clone(&lookup));
    (dir, repo, lookup, service)
}

#[test]
fn successful_lookup_appends_exactly_one_formatted_note() {
    let (_dir, repo, _lookup, service) = setup(Ok(go_hit()));
    repo.add_note("lang", "existing", None).unwrap();

    let (hit, note) = match service.enrich_topic("lang", Some("Go")) {
        EnrichOutcome::Stored { hit, note } => (hit, note),
        other => panic!("expected stored outcome, got {other:?}"),
    };
    assert_eq!(hit, go_hit());

    let notes = repo.get_notes("lang").unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1], note);
    assert!(note.text.contains("Go (programming language)"));
    assert!(note
        .text
        .contains("https://en.wikipedia.org/wiki/Go_(programming_language)"));
    assert!(note.text.starts_with("Wikipedia: "));
}

#[test]
fn not_found_lookup_leaves_topic_unchanged() {
    let (_dir, repo, lookup, service) = setup(Err(LookupError::NotFound("zzz".into())));
    repo.add_note("lang", "existing", None).unwrap();

    let outcome = service.enrich_topic("lang", Some("zzz"));
    assert!(matches!(
        outcome,
        EnrichOutcome::LookupFailed(LookupError::NotFound(_))
    ));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    assert_eq!(repo.get_notes("lang").unwrap().len(), 1);
}

#[test]
fn transport_failure_is_distinct_and_touches_nothing() {
    let (_dir, repo, _lookup, service) = setup(Err(LookupError::Transport("timed out".into())));

    let outcome = service.enrich_topic("fresh", None);
    let EnrichOutcome::LookupFailed(err) = outcome else {
        panic!("expected lookup failure");
    };
    assert!(err.is_retryable());
    assert!(repo.list_topics().unwrap().is_empty());
}

#[test]
fn storage_failure_after_lookup_is_reported_separately() {
    let (dir, _repo, _lookup, service) = setup(Ok(go_hit()));
    fs::write(dir.path().join("notebook.json"), "corrupted").unwrap();

    let outcome = service.enrich_topic("lang", Some("Go"));
    let EnrichOutcome::StoreFailed { hit, error } = outcome else {
        panic!("expected store failure");
    };
    assert_eq!(hit.title, "Go (programming language)");
    assert!(matches!(error, RepoError::Store(_)));
}

#[test]
fn blank_topic_is_rejected_before_lookup() {
    let (_dir, repo, lookup, service) = setup(Ok(go_hit()));

    let outcome = service.enrich_topic("  ", Some("Go"));
    assert!(matches!(
        outcome,
        EnrichOutcome::InvalidTopic(RepoError::InvalidTopic(_))
    ));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    assert!(repo.list_topics().unwrap().is_empty());
}
