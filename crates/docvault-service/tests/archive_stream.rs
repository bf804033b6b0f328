//! Archive streaming tests against the in-memory object store.

use std::io::{Cursor, Read};
use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

use docvault_core::traits::storage::{ByteStream, ObjectStore};
use docvault_service::document::archive::{ArchiveEntry, stream_zip};
use docvault_storage::MemoryObjectStore;

async fn collect(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.expect("stream chunk"));
    }
    out
}

#[tokio::test]
async fn zip_preserves_nested_entry_layout() {
    let store = Arc::new(MemoryObjectStore::new());
    store
        .put("user/o/B/d1/v1/x.txt", Bytes::from("root file"))
        .await
        .unwrap();
    store
        .put("user/o/B/A/d2/v2/y.txt", Bytes::from("nested file"))
        .await
        .unwrap();

    let entries = vec![
        ArchiveEntry {
            name: "x.txt".to_string(),
            object_key: "user/o/B/d1/v1/x.txt".to_string(),
        },
        ArchiveEntry {
            name: "A/y.txt".to_string(),
            object_key: "user/o/B/A/d2/v2/y.txt".to_string(),
        },
    ];

    let stream = stream_zip(store, entries).await.expect("archive");
    let bytes = collect(stream).await;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    assert_eq!(archive.len(), 2);

    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["A/y.txt".to_string(), "x.txt".to_string()]);

    let mut content = String::new();
    archive
        .by_name("A/y.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "nested file");
}

#[tokio::test]
async fn unreadable_entries_are_skipped_and_archive_completes() {
    let store = Arc::new(MemoryObjectStore::new());
    store
        .put("user/o/B/d1/v1/ok.txt", Bytes::from("still here"))
        .await
        .unwrap();

    let entries = vec![
        ArchiveEntry {
            name: "gone.txt".to_string(),
            object_key: "user/o/B/d9/v1/gone.txt".to_string(),
        },
        ArchiveEntry {
            name: "ok.txt".to_string(),
            object_key: "user/o/B/d1/v1/ok.txt".to_string(),
        },
    ];

    let stream = stream_zip(store, entries).await.expect("archive");
    let bytes = collect(stream).await;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    assert_eq!(archive.len(), 1);

    let mut content = String::new();
    archive
        .by_name("ok.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "still here");
}

#[tokio::test]
async fn large_entry_roundtrips_intact() {
    let store = Arc::new(MemoryObjectStore::new());
    let payload: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();
    store
        .put("user/o/B/d1/v1/big.bin", Bytes::from(payload.clone()))
        .await
        .unwrap();

    let entries = vec![ArchiveEntry {
        name: "big.bin".to_string(),
        object_key: "user/o/B/d1/v1/big.bin".to_string(),
    }];

    let stream = stream_zip(store, entries).await.expect("archive");
    let bytes = collect(stream).await;

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("valid zip");
    let mut content = Vec::new();
    archive
        .by_name("big.bin")
        .unwrap()
        .read_to_end(&mut content)
        .unwrap();
    assert_eq!(content, payload);
}
