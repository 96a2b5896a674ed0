//! Draft store tests against real and failing storage backends

use async_trait::async_trait;
use proptest::prelude::*;
use quire_core::draft::DraftStore;
use quire_core::error::{ErrorKind, StorageError};
use quire_core::storage::{LocalStorage, MemoryStorage, StorageProvider, StorageResult};
use quire_core::types::{BookPatch, ChapterPatch};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Memory storage whose writes can be switched off
struct FailingStorage {
    inner: MemoryStorage,
    fail_writes: AtomicBool,
}

impl FailingStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            fail_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl StorageProvider for FailingStorage {
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("quota exceeded".to_string()));
        }
        self.inner.write(path, data).await
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        self.inner.exists(path).await
    }
}

#[tokio::test]
async fn test_failed_write_keeps_previous_state() {
    let storage = Arc::new(FailingStorage::new());
    let drafts = DraftStore::new(storage.clone());

    let book = drafts.create_book().await.unwrap();
    drafts
        .update_book(&book.id, BookPatch::default().title("Before"))
        .await
        .unwrap();

    storage.fail_writes.store(true, Ordering::SeqCst);
    let err = drafts
        .update_book(&book.id, BookPatch::default().title("After"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    let err = drafts.add_chapter(&book.id, "Lost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialization);

    let stored = drafts.get(&book.id).await.unwrap();
    assert_eq!(stored.title, "Before");
    assert!(stored.chapters.is_empty());
}

#[tokio::test]
async fn test_drafts_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let drafts = DraftStore::new(Arc::new(LocalStorage::new(dir.path())));
        let book = drafts.create_book().await.unwrap();
        drafts
            .update_book(&book.id, BookPatch::default().title("Persisted").author("Ann"))
            .await
            .unwrap();
        let chapter = drafts.add_chapter(&book.id, "One").await.unwrap();
        drafts
            .update_chapter(&book.id, &chapter.id, ChapterPatch::default().content("Body"))
            .await
            .unwrap();
        book.id
    };

    let reopened = DraftStore::new(Arc::new(LocalStorage::new(dir.path())));
    let book = reopened.get(&id).await.unwrap();
    assert_eq!(book.title, "Persisted");
    assert_eq!(book.author, "Ann");
    assert_eq!(book.chapters.len(), 1);
    assert_eq!(book.chapters[0].content, "Body");
}

#[tokio::test]
async fn test_corrupt_collection_reads_as_empty() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .write("localBooks_v1", b"{not json".to_vec())
        .await
        .unwrap();

    let drafts = DraftStore::new(storage);
    assert!(drafts.list().await.unwrap().is_empty());

    // The next write replaces the corrupt value
    let book = drafts.create_book().await.unwrap();
    assert_eq!(drafts.list().await.unwrap()[0].id, book.id);
}

#[tokio::test]
async fn test_export_filenames_follow_chapter_order() {
    let drafts = DraftStore::new(Arc::new(MemoryStorage::new()));
    let book = drafts.create_book().await.unwrap();
    for title in ["Zeta", "Alpha", "", "Mid: Point"] {
        drafts.add_chapter(&book.id, title).await.ok();
    }
    drafts.move_chapter(&book.id, 0, 2).await.unwrap();

    let archive = drafts.export_book(&book.id).await.unwrap();
    let names: Vec<&str> = archive
        .manifest
        .chapters
        .iter()
        .map(|c| c.filename.as_str())
        .collect();
    assert_eq!(names, vec!["01-Alpha.md", "02-Mid__Point.md", "03-Zeta.md"]);

    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn test_cover_stays_inside_export_folder() {
    let drafts = DraftStore::new(Arc::new(MemoryStorage::new()));
    let book = drafts.create_book().await.unwrap();

    drafts
        .set_cover(&book.id, "book.json", b"{}".to_vec())
        .await
        .unwrap();
    let archive = drafts.export_book(&book.id).await.unwrap();
    let names: Vec<&str> = archive.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["book.json", "cover-book.json"]);

    drafts
        .set_cover(&book.id, "../../evil.sh", vec![0])
        .await
        .unwrap();
    let archive = drafts.export_book(&book.id).await.unwrap();
    let bytes = archive.to_zip_bytes().unwrap();
    let zip = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let entries: Vec<&str> = zip.file_names().collect();
    assert!(entries.contains(&"Untitled/.._.._evil.sh"));
    assert!(entries.iter().all(|n| n.starts_with("Untitled/") && !n.contains("../")));
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn move_chapter_is_a_permutation(len in 1usize..8, from in 0usize..10, to in 0usize..10) {
        runtime().block_on(async {
            let storage = Arc::new(MemoryStorage::new());
            let drafts = DraftStore::new(storage.clone());
            let book = drafts.create_book().await.unwrap();
            for i in 0..len {
                drafts.add_chapter(&book.id, &format!("Chapter {}", i)).await.unwrap();
            }

            let before_bytes = storage.read("localBooks_v1").await.unwrap();
            let before: Vec<String> = drafts.get(&book.id).await.unwrap()
                .chapters.into_iter().map(|c| c.id).collect();

            drafts.move_chapter(&book.id, from, to).await.unwrap();

            let after: Vec<String> = drafts.get(&book.id).await.unwrap()
                .chapters.into_iter().map(|c| c.id).collect();

            if from >= len || to >= len {
                let after_bytes = storage.read("localBooks_v1").await.unwrap();
                prop_assert_eq!(before_bytes, after_bytes);
            } else {
                prop_assert_eq!(&after[to], &before[from]);
                let mut a = after.clone();
                let mut b = before.clone();
                a.sort();
                b.sort();
                prop_assert_eq!(a, b);
            }
            Ok(())
        })?;
    }
}
