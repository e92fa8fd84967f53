//! Kept apart from `upload.rs`: `traced_test` installs its own global
//! subscriber, which clashes with the one `utils::init` sets up.
use planx_loadtest::prelude::*;
use planx_loadtest::workloads::upload::upload_then_delete;
use planx_loadtest_tests::{base_for, fixture_dir, mock_config, spawn_mock, TOKEN};

#[tracing_test::traced_test]
#[tokio::test]
#[ntest::timeout(10_000)]
async fn logs_uploaded_key() {
    let mock = spawn_mock(mock_config()).await.unwrap();
    let (_dir, sampler) = fixture_dir(&[("notes.txt", &b"hello"[..])]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    upload_then_delete(&workload).await.unwrap();
    assert!(logs_contain("/notes.txt"));
}

#[tracing_test::traced_test]
#[tokio::test]
#[ntest::timeout(10_000)]
async fn delete_runs_in_a_span_carrying_the_key() {
    let mock = spawn_mock(mock_config()).await.unwrap();
    let (_dir, sampler) = fixture_dir(&[("notes.txt", &b"hello"[..])]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    upload_then_delete(&workload).await.unwrap();
    assert!(logs_contain("delete_file{key="));
    assert!(logs_contain("Deleted"));
}
