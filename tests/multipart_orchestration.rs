//! Multipart orchestrator behavior against a scripted backend: part
//! boundaries, ordering, retry budget, and abort handling.

mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{ALWAYS, Call, MockBackend};
use object_store_client::{StoreConfig, StoreError, StoreSession};
use tempfile::TempDir;

const PART_SIZE: usize = 6_000_000;

fn write_fixture(dir: &TempDir, name: &str, len: usize) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, vec![0xa5u8; len]).unwrap();
    path
}

fn session_over(backend: Arc<MockBackend>) -> StoreSession {
    let config = StoreConfig {
        part_size: PART_SIZE,
        part_retries: 2,
        ..StoreConfig::default()
    };
    StoreSession::with_backend(config, backend)
}

fn part_uploads(calls: &[Call]) -> Vec<(i32, usize)> {
    calls
        .iter()
        .filter_map(|c| match c {
            Call::UploadPart { part_number, len } => Some((*part_number, *len)),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn fifteen_megabytes_become_three_ordered_parts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "data.bin", 15_000_000);
    let backend = Arc::new(MockBackend::new());
    let session = session_over(backend.clone());

    session
        .upload_large_file(&path, Some("backups/data.bin"), "test-bucket", None)
        .await
        .unwrap();

    let calls = backend.recorded();
    assert_eq!(
        part_uploads(&calls),
        vec![(1, PART_SIZE), (2, PART_SIZE), (3, 3_000_000)]
    );

    let finalizes: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::CompleteMultipart { parts } => Some(parts.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(finalizes.len(), 1);
    assert_eq!(
        finalizes[0].iter().map(|p| p.part_number).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(!calls.contains(&Call::AbortMultipart));
}

#[tokio::test]
async fn exact_multiple_of_part_size_has_no_short_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "even.bin", PART_SIZE * 2);
    let backend = Arc::new(MockBackend::new());
    let session = session_over(backend.clone());

    session
        .upload_large_file(&path, Some("even.bin"), "test-bucket", None)
        .await
        .unwrap();

    assert_eq!(
        part_uploads(&backend.recorded()),
        vec![(1, PART_SIZE), (2, PART_SIZE)]
    );
}

#[tokio::test]
async fn small_file_uploads_as_single_part() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "small.bin", 1024);
    let backend = Arc::new(MockBackend::new());
    let session = session_over(backend.clone());

    session
        .upload_large_file(&path, Some("small.bin"), "test-bucket", None)
        .await
        .unwrap();

    assert_eq!(part_uploads(&backend.recorded()), vec![(1, 1024)]);
}

#[tokio::test]
async fn part_two_failure_uses_three_attempts_then_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "data.bin", 15_000_000);
    let backend = Arc::new(MockBackend::new().fail_part(2, ALWAYS));
    let session = session_over(backend.clone());

    let err = session
        .upload_large_file(&path, Some("data.bin"), "test-bucket", None)
        .await
        .unwrap_err();

    match err {
        StoreError::UploadAborted { part_number, source } => {
            assert_eq!(part_number, 2);
            match *source {
                StoreError::PartRetriesExhausted {
                    part_number,
                    attempts,
                    ..
                } => {
                    assert_eq!(part_number, 2);
                    assert_eq!(attempts, 3);
                }
                other => panic!("unexpected source error: {other}"),
            }
        }
        other => panic!("unexpected error: {other}"),
    }

    let calls = backend.recorded();
    let attempts_on_part_two = calls
        .iter()
        .filter(|c| matches!(c, Call::UploadPart { part_number: 2, .. }))
        .count();
    assert_eq!(attempts_on_part_two, 3);

    let aborts = calls.iter().filter(|c| **c == Call::AbortMultipart).count();
    assert_eq!(aborts, 1);
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, Call::CompleteMultipart { .. }))
    );
    // Part 3 is never attempted once part 2 gives up.
    assert!(
        !calls
            .iter()
            .any(|c| matches!(c, Call::UploadPart { part_number: 3, .. }))
    );
}

#[tokio::test]
async fn transient_part_failure_recovers_within_budget() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "data.bin", 15_000_000);
    let backend = Arc::new(MockBackend::new().fail_part(1, 2));
    let session = session_over(backend.clone());

    session
        .upload_large_file(&path, Some("data.bin"), "test-bucket", None)
        .await
        .unwrap();

    let calls = backend.recorded();
    let attempts_on_part_one = calls
        .iter()
        .filter(|c| matches!(c, Call::UploadPart { part_number: 1, .. }))
        .count();
    assert_eq!(attempts_on_part_one, 3);
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, Call::CompleteMultipart { .. }))
    );
    assert!(!calls.contains(&Call::AbortMultipart));
}

#[tokio::test]
async fn abort_failure_reports_both_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir, "data.bin", PART_SIZE + 1);
    let mut backend = MockBackend::new().fail_part(1, ALWAYS);
    backend.fail_abort = true;
    let backend = Arc::new(backend);
    let session = session_over(backend.clone());

    let err = session
        .upload_large_file(&path, Some("data.bin"), "test-bucket", None)
        .await
        .unwrap_err();

    match err {
        StoreError::AbortFailed {
            upload_id,
            abort_error,
            upload_error,
        } => {
            assert_eq!(upload_id, "upload-1");
            assert!(matches!(*abort_error, StoreError::Transport { .. }));
            assert!(matches!(
                *upload_error,
                StoreError::PartRetriesExhausted { part_number: 1, .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_local_file_fails_before_any_remote_call() {
    let backend = Arc::new(MockBackend::new());
    let session = session_over(backend.clone());

    let err = session
        .upload_large_file("/nonexistent/path.bin", None, "test-bucket", None)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Io(_)));
    assert!(backend.recorded().is_empty());
}
