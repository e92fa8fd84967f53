use utils::*;

use mock_service::{MockConfig, StatusCode};
use planx_loadtest::prelude::*;
use planx_loadtest::workloads::upload::{delete_file, upload_file, upload_then_delete};
use planx_loadtest::WorkloadError;

const GUIDE: &[u8] = b"%PDF-1.4 guidance notes";

#[tokio::test]
#[ntest::timeout(10_000)]
async fn uploads_then_deletes() {
    let mock = init(mock_config()).await;
    let (_dir, sampler) = fixture_dir(&[("guide.pdf", GUIDE)]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    upload_then_delete(&workload).await.unwrap();

    assert_eq!(mock.state.uploads(), 1);
    assert_eq!(mock.state.deletes(), 1);
    assert!(mock.state.stored_keys().is_empty());
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn uploaded_bytes_match_fixture() {
    let mock = init(mock_config()).await;
    let (dir, sampler) = fixture_dir(&[
        ("guide.pdf", GUIDE),
        ("site plan #1.png", &[0x89, b'P', b'N', b'G', 0x0d, 0x0a][..]),
    ])
    .unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    for _ in 0..10 {
        let key = upload_file(&workload).await.unwrap();
        let (_, name) = key.split_once('/').unwrap();

        let stored = mock.state.stored_file(&key).unwrap();
        assert_eq!(stored.bytes, read_fixture(dir.path(), name).unwrap());
        assert_eq!(stored.mime, mime_type(name));

        delete_file(&workload, &key).await.unwrap();
    }

    assert_eq!(mock.state.uploads(), 10);
    assert_eq!(mock.state.deletes(), 10);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn only_no_content_counts_as_deleted() {
    let mock = init(MockConfig {
        delete_status: StatusCode::OK,
        ..mock_config()
    })
    .await;
    let (_dir, sampler) = fixture_dir(&[("guide.pdf", GUIDE)]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    let err = upload_then_delete(&workload).await.unwrap_err();
    assert!(matches!(err, WorkloadError::UnexpectedStatus { actual: 200, .. }));
    // the delete was still issued against the extracted key
    assert_eq!(mock.state.deletes(), 1);
    assert!(mock.state.stored_keys().is_empty());
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn deleting_twice_fails() {
    let mock = init(mock_config()).await;
    let (_dir, sampler) = fixture_dir(&[("guide.pdf", GUIDE)]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), TOKEN, sampler);

    let key = upload_file(&workload).await.unwrap();
    delete_file(&workload, &key).await.unwrap();

    let err = delete_file(&workload, &key).await.unwrap_err();
    assert!(matches!(err, WorkloadError::UnexpectedStatus { actual: 404, .. }));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn rejected_upload_skips_delete() {
    let mock = init(mock_config()).await;
    let (_dir, sampler) = fixture_dir(&[("guide.pdf", GUIDE)]).unwrap();
    let workload = UploadWorkload::new(base_for(&mock, None).unwrap(), "wrong-token", sampler);

    let err = upload_then_delete(&workload).await.unwrap_err();
    assert!(matches!(err, WorkloadError::UnexpectedStatus { actual: 401, .. }));
    assert_eq!(mock.state.uploads(), 0);
    assert_eq!(mock.state.deletes(), 0);
}
