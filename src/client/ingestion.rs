use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{Endpoint, FilePart, Transport, FILES_FIELD};
use crate::model::{JobId, StatusOutcome, StatusReport, UploadOutcome};

/// Document upload and ingestion status polling
#[derive(Clone)]
pub struct IngestionClient {
    transport: Arc<dyn Transport>,
}

impl IngestionClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Upload every file in one multipart request.
    ///
    /// With no files nothing is sent and no job is produced.
    pub async fn upload(&self, files: Vec<FilePart>) -> UploadOutcome {
        if files.is_empty() {
            return UploadOutcome::Skipped;
        }

        let count = files.len();
        match self
            .transport
            .post_files(Endpoint::IngestDocuments, FILES_FIELD, files)
            .await
        {
            Ok(response) => {
                let outcome = UploadOutcome::from_response(&response);
                match outcome.job() {
                    Some(job) => tracing::info!("Uploaded {} files as job {}", count, job),
                    None => tracing::warn!("Upload of {} files returned no job id", count),
                }
                outcome
            }
            Err(e) => {
                tracing::warn!("Upload failed: {}", e);
                UploadOutcome::failed(e)
            }
        }
    }

    /// Read files from disk, then upload them.
    ///
    /// An unreadable file fails the whole upload before any request is sent.
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> UploadOutcome {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match FilePart::from_path(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    tracing::warn!("Cannot read {}: {}", path.display(), e);
                    return UploadOutcome::failed(format!("{}: {}", path.display(), e));
                }
            }
        }
        self.upload(files).await
    }

    /// Fetch the status of a job. The payload is kept verbatim for display.
    pub async fn poll_status(&self, job: &JobId) -> StatusOutcome {
        match self
            .transport
            .get_json(Endpoint::IngestStatus(job.as_str()))
            .await
        {
            Ok(raw) => {
                let report = StatusReport::from_response(job.clone(), raw);
                tracing::debug!("Job {} is {}", job, report.state);
                StatusOutcome::Report { report }
            }
            Err(e) => {
                tracing::warn!("Status poll for job {} failed: {}", job, e);
                StatusOutcome::Failed {
                    job: job.clone(),
                    message: e.to_string(),
                }
            }
        }
    }
}
