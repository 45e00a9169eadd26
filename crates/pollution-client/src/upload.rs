//! Dataset file upload.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::info;

use viewer_common::{ViewerError, ViewerResult};

use crate::client::PollutionClient;
use crate::types::UploadPayload;

impl PollutionClient {
    /// Upload a raw dataset file and return the server-assigned dataset
    /// identifier. Does not affect the active dataset or selection.
    pub async fn upload_dataset(&self, path: &Path) -> ViewerResult<String> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.nc".to_string());

        let data = tokio::fs::read(path)
            .await
            .map_err(|e| ViewerError::UploadRejected(format!("{}: {}", path.display(), e)))?;
        let size = data.len();

        let form = Form::new().part("file", Part::bytes(data).file_name(filename.clone()));

        let response = self
            .http
            .post(self.url("/pollution/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(ViewerError::http)?;

        let payload: UploadPayload = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ViewerError::Decode(e.to_string()))?;

        if !payload.ok {
            return Err(ViewerError::UploadRejected(
                payload.message.unwrap_or_else(|| "upload refused".to_string()),
            ));
        }

        let dataset = payload
            .dataset
            .ok_or_else(|| ViewerError::Decode("upload response missing dataset id".to_string()))?;

        info!(file = %filename, bytes = size, dataset = %dataset, "Dataset uploaded");
        Ok(dataset)
    }
}
