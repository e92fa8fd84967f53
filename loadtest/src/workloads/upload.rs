//! Authenticated upload of a fixture file followed by its deletion.
use crate::error::{LoadTestError, WorkloadError};
use crate::nested::nested;
use crate::sample::FileSampler;
use crate::storage::{delete_path, file_key};
use crate::workload::{expect_status, expect_success, WorkloadBase};
use balter::prelude::*;
use reqwest::{
    multipart::{Form, Part},
    StatusCode,
};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{debug, error, instrument, warn};

pub const UPLOAD_PATH: &str = "/file/public/upload";

static UPLOAD: OnceLock<UploadWorkload> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct UploadWorkload {
    base: WorkloadBase,
    auth_token: String,
    sampler: FileSampler,
}

impl UploadWorkload {
    pub fn new(base: WorkloadBase, auth_token: impl Into<String>, sampler: FileSampler) -> Self {
        Self {
            base,
            auth_token: auth_token.into(),
            sampler,
        }
    }

    /// Make this workload available to [`upload_and_delete`].
    pub fn install(self) -> Result<(), LoadTestError> {
        UPLOAD
            .set(self)
            .map_err(|_| LoadTestError::AlreadyInstalled("upload"))
    }
}

#[scenario]
pub async fn upload_and_delete() {
    let Some(workload) = UPLOAD.get() else {
        error!("Upload workload was not installed");
        return;
    };

    if let Err(err) = upload_then_delete(workload).await {
        warn!("Upload sequence failed: {err}");
    }
}

/// Upload a sampled file, then delete it again by the key from the returned
/// URL. The delete is only attempted after a successful upload.
pub async fn upload_then_delete(workload: &UploadWorkload) -> Result<(), WorkloadError> {
    let key = upload_file(workload).await?;
    debug!("Uploaded {key}");
    delete_file(workload, &key).await
}

/// Returns the storage key of the uploaded file.
#[transaction]
#[instrument(skip_all)]
pub async fn upload_file(workload: &UploadWorkload) -> Result<String, WorkloadError> {
    let sample = workload.sampler.sample().await?;
    let part = Part::bytes(sample.bytes)
        .file_name(sample.name.clone())
        .mime_str(sample.mime)?;
    let form = Form::new().text("filename", sample.name).part("file", part);

    let res = workload
        .base
        .client()
        .post(workload.base.url(UPLOAD_PATH))
        .bearer_auth(&workload.auth_token)
        .multipart(form)
        .send()
        .await?;
    expect_success(&res)?;

    let body: Value = res.json().await?;
    let file_url = nested(&body, &["fileUrl"])
        .and_then(Value::as_str)
        .ok_or(WorkloadError::MissingField("fileUrl"))?;

    Ok(file_key(file_url)?)
}

/// Only `204 No Content` counts as a successful delete.
#[transaction]
#[instrument(skip(workload))]
pub async fn delete_file(workload: &UploadWorkload, key: &str) -> Result<(), WorkloadError> {
    let res = workload
        .base
        .client()
        .delete(workload.base.url(&delete_path(key)))
        .bearer_auth(&workload.auth_token)
        .send()
        .await?;
    expect_status(&res, StatusCode::NO_CONTENT)?;
    debug!("Deleted");
    Ok(())
}
