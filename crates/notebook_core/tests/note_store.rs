use notebook_core::{DocumentStore, FileNoteRepository, Note, NoteDocument, NoteRepository};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn open_repo() -> (TempDir, FileNoteRepository) {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::open(dir.path().join("notebook.json")).unwrap();
    (dir, FileNoteRepository::new(Arc::new(store)))
}

#[test]
fn initialize_twice_keeps_existing_notes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notebook.json");
    let store = DocumentStore::open(&path).unwrap();
    let repo = FileNoteRepository::new(Arc::new(store));
    repo.add_note("kept", "survives re-init", None).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    repo.store().initialize().unwrap();
    let reopened = DocumentStore::open(&path).unwrap();
    reopened.initialize().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
    assert_eq!(repo.get_notes("kept").unwrap().len(), 1);
}

#[test]
fn add_then_get_round_trips_text_and_timestamp_exactly() {
    let (_dir, repo) = open_repo();
    let texts = [
        "plain".to_string(),
        "multi\nline\n\n  indented\ttabbed\n".to_string(),
        "unicode: héllo wörld ✓ 日本語 🚀".to_string(),
        "markup-ish <note timestamp=\"x\">&amp;</note> \"quotes\"".to_string(),
        String::new(),
    ];

    for (idx, text) in texts.iter().enumerate() {
        let timestamp = format!("2024-05-0{} 12:00:00", idx + 1);
        repo.add_note("round-trip", text, Some(timestamp)).unwrap();
    }

    let notes = repo.get_notes("round-trip").unwrap();
    assert_eq!(notes.len(), texts.len());
    for (idx, (note, text)) in notes.iter().zip(texts.iter()).enumerate() {
        assert_eq!(&note.text, text);
        assert_eq!(note.timestamp, format!("2024-05-0{} 12:00:00", idx + 1));
    }
}

#[test]
fn topic_names_round_trip_verbatim() {
    let (_dir, repo) = open_repo();
    let topic = "Ünïcode topic / with \"quotes\"";
    repo.add_note(topic, "x", None).unwrap();
    assert_eq!(repo.get_notes(topic).unwrap().len(), 1);
    assert_eq!(repo.list_topics().unwrap()[0].name, topic);
}

#[test]
fn notes_stay_isolated_per_topic() {
    let (_dir, repo) = open_repo();
    repo.add_note("A", "only in A", None).unwrap();
    repo.add_note("B", "only in B", None).unwrap();

    let a = repo.get_notes("A").unwrap();
    let b = repo.get_notes("B").unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(a[0].text, "only in A");
    assert_eq!(b[0].text, "only in B");
    assert!(repo.get_notes("a").unwrap().is_empty());
}

#[test]
fn unknown_topic_reads_as_empty() {
    let (_dir, repo) = open_repo();
    assert!(repo.get_notes("never-added").unwrap().is_empty());
}

#[test]
fn notes_keep_insertion_order() {
    let (_dir, repo) = open_repo();
    for ts in [
        "2024-01-01 00:00:01",
        "2024-01-01 00:00:02",
        "2024-01-01 00:00:03",
    ] {
        repo.add_note("ordered", ts, Some(ts.to_string())).unwrap();
    }

    let timestamps: Vec<_> = repo
        .get_notes("ordered")
        .unwrap()
        .into_iter()
        .map(|note| note.timestamp)
        .collect();
    assert_eq!(
        timestamps,
        vec![
            "2024-01-01 00:00:01",
            "2024-01-01 00:00:02",
            "2024-01-01 00:00:03"
        ]
    );
}

#[test]
fn concurrent_writers_lose_and_duplicate_nothing() {
    const WRITERS: usize = 16;
    const NOTES_PER_WRITER: usize = 5;

    let (_dir, repo) = open_repo();
    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let repo = &repo;
            scope.spawn(move || {
                for seq in 0..NOTES_PER_WRITER {
                    repo.add_note("shared", &format!("w{writer}-n{seq}"), None)
                        .expect("concurrent add should succeed");
                }
            });
        }
    });

    let mut texts: Vec<_> = repo
        .get_notes("shared")
        .unwrap()
        .into_iter()
        .map(|note| note.text)
        .collect();
    assert_eq!(texts.len(), WRITERS * NOTES_PER_WRITER);
    texts.sort();
    texts.dedup();
    assert_eq!(texts.len(), WRITERS * NOTES_PER_WRITER);
}

#[test]
fn concurrent_writers_on_distinct_topics_keep_one_topic_each() {
    let (_dir, repo) = open_repo();
    std::thread::scope(|scope| {
        for idx in 0..8 {
            let repo = &repo;
            scope.spawn(move || {
                repo.add_note(&format!("topic-{}", idx % 4), "x", None).unwrap();
            });
        }
    });

    let topics = repo.list_topics().unwrap();
    assert_eq!(topics.len(), 4);
    assert!(topics.iter().all(|topic| topic.note_count == 2));
}

#[test]
fn document_survives_repeated_load_save_cycles() {
    let (dir, repo) = open_repo();
    repo.add_note("t", "line one\nline two", Some("2024-01-01 00:00:00".into()))
        .unwrap();
    let path = dir.path().join("notebook.json");
    let first: NoteDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    for _ in 0..3 {
        repo.store()
            .with_document(|_| Ok::<_, notebook_core::StoreError>(()))
            .unwrap();
    }

    let after: NoteDocument = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(first, after);
    assert_eq!(
        after.topic("t").unwrap().notes,
        vec![Note {
            timestamp: "2024-01-01 00:00:00".into(),
            text: "line one\nline two".into(),
        }]
    );
}

#[test]
fn corrupt_document_fails_both_reads_and_writes() {
    let (dir, repo) = open_repo();
    let path = dir.path().join("notebook.json");
    fs::write(&path, r#"{"topics":[{"name":"dup"},{"name":"dup"}]}"#).unwrap();

    let read_err = repo.get_notes("dup").unwrap_err();
    assert!(read_err.to_string().contains("duplicate topic"));
    assert!(repo.add_note("dup", "x", None).is_err());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"topics":[{"name":"dup"},{"name":"dup"}]}"#
    );
}

#[test]
fn two_stores_on_one_file_do_not_lose_updates() {
    const THREADS: usize = 8;
    const NOTES_PER_THREAD: usize = 25;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notebook.json");
    let first = FileNoteRepository::new(Arc::new(DocumentStore::open(&path).unwrap()));
    let second = FileNoteRepository::new(Arc::new(DocumentStore::open(&path).unwrap()));

    std::thread::scope(|scope| {
        for thread in 0..THREADS {
            let repo = if thread % 2 == 0 { &first } else { &second };
            scope.spawn(move || {
                for seq in 0..NOTES_PER_THREAD {
                    repo.add_note("shared", &format!("t{thread}-n{seq}"), None)
                        .expect("add through either store should succeed");
                }
            });
        }
    });

    assert_eq!(
        first.get_notes("shared").unwrap().len(),
        THREADS * NOTES_PER_THREAD
    );
    assert_eq!(
        second.get_notes("shared").unwrap().len(),
        THREADS * NOTES_PER_THREAD
    );
}
