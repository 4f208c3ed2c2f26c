//! Image download and the staged-upload flow into Shopify Files.
//!
//! An upload is three calls: `stagedUploadsCreate` reserves a target, the
//! bytes are POSTed to that target as multipart form data, and `fileCreate`
//! registers the staged object. Files are processed asynchronously, so the
//! node is then polled until a public URL appears.

use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::error::ShopifyError;
use crate::queries;
use crate::rate_limit::retry_with_backoff;
use crate::types::{FileCreateData, FileNode, FileNodeData, StagedTarget, StagedUploadsData};

use super::{check_status, ShopifyAdminClient};

/// MIME type for an image filename, by extension. Unknown extensions are
/// sent as JPEG, matching the default extension given to renamed copies.
#[must_use]
pub fn mime_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        _ => "image/jpeg",
    }
}

impl ShopifyAdminClient {
    /// Downloads an image's bytes from its source URL.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Fetch`] for non-success responses and for
    /// network failures that persist past the retry policy.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, ShopifyError> {
        let result = retry_with_backoff(self.retry, || async move {
            let response = self.client.get(url).send().await?;
            check_status(&response, url)?;
            let bytes = response.bytes().await?;
            Ok(bytes.to_vec())
        })
        .await;

        result.map_err(|err| match err {
            ShopifyError::Http(e) => ShopifyError::Fetch {
                url: url.to_owned(),
                reason: e.to_string(),
            },
            ShopifyError::UnexpectedStatus { status, .. } => ShopifyError::Fetch {
                url: url.to_owned(),
                reason: format!("HTTP {status}"),
            },
            other => other,
        })
    }

    /// Uploads `bytes` under `filename` and returns the durable public URL.
    ///
    /// Existing files with the same name are replaced, so re-running a
    /// migration overwrites rather than accumulating `_1` copies.
    ///
    /// # Errors
    ///
    /// Returns [`ShopifyError::Upload`] when any step reports user errors,
    /// the file fails processing, or no URL appears within the poll budget.
    pub async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        alt: Option<&str>,
    ) -> Result<String, ShopifyError> {
        let mime_type = mime_type_for(filename);
        let target = self.stage_upload(filename, mime_type, bytes.len()).await?;
        let (Some(target_url), Some(resource_url)) = (&target.url, &target.resource_url) else {
            return Err(upload_error(filename, "staged target has no url"));
        };

        self.post_staged(filename, mime_type, &bytes, target_url, &target)
            .await?;
        let file = self.create_file(filename, resource_url, alt).await?;

        if let Some(url) = file.public_url() {
            return Ok(url.to_owned());
        }
        let file_id = file
            .id
            .ok_or_else(|| upload_error(filename, "fileCreate returned no file id"))?;
        self.wait_for_url(filename, &file_id).await
    }

    async fn stage_upload(
        &self,
        filename: &str,
        mime_type: &str,
        size: usize,
    ) -> Result<StagedTarget, ShopifyError> {
        let variables = json!({
            "input": [{
                "resource": "IMAGE",
                "filename": filename,
                "mimeType": mime_type,
                "httpMethod": "POST",
                "fileSize": size.to_string(),
            }]
        });
        let data: StagedUploadsData = self
            .graphql("stagedUploadsCreate", queries::STAGED_UPLOADS_CREATE, &variables)
            .await?;
        let payload = data
            .staged_uploads_create
            .ok_or_else(|| upload_error(filename, "stagedUploadsCreate returned no payload"))?;
        if !payload.user_errors.is_empty() {
            return Err(upload_error(filename, &join_user_errors(&payload.user_errors)));
        }
        payload
            .staged_targets
            .into_iter()
            .next()
            .ok_or_else(|| upload_error(filename, "stagedUploadsCreate returned no target"))
    }

    async fn post_staged(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
        target_url: &str,
        target: &StagedTarget,
    ) -> Result<(), ShopifyError> {
        retry_with_backoff(self.retry, || async move {
            let mut form = Form::new();
            for param in &target.parameters {
                form = form.text(param.name.clone(), param.value.clone());
            }
            let part = Part::bytes(bytes.to_vec())
                .file_name(filename.to_owned())
                .mime_str(mime_type)?;
            form = form.part("file", part);

            let response = self.client.post(target_url).multipart(form).send().await?;
            check_status(&response, target_url)
        })
        .await
        .map_err(|err| match err {
            ShopifyError::UnexpectedStatus { status, .. } => {
                upload_error(filename, &format!("staged target rejected upload with HTTP {status}"))
            }
            other => other,
        })
    }

    async fn create_file(
        &self,
        filename: &str,
        resource_url: &str,
        alt: Option<&str>,
    ) -> Result<FileNode, ShopifyError> {
        let variables = json!({
            "files": [{
                "originalSource": resource_url,
                "contentType": "IMAGE",
                "filename": filename,
                "alt": alt.unwrap_or_default(),
                "duplicateResolutionMode": "REPLACE",
            }]
        });
        let data: FileCreateData = self
            .graphql("fileCreate", queries::FILE_CREATE, &variables)
            .await?;
        let payload = data
            .file_create
            .ok_or_else(|| upload_error(filename, "fileCreate returned no payload"))?;
        if !payload.user_errors.is_empty() {
            return Err(upload_error(filename, &join_user_errors(&payload.user_errors)));
        }
        let file = payload
            .files
            .into_iter()
            .next()
            .ok_or_else(|| upload_error(filename, "fileCreate returned no file"))?;
        if file.has_failed() {
            return Err(upload_error(filename, "file processing failed"));
        }
        Ok(file)
    }

    async fn wait_for_url(&self, filename: &str, file_id: &str) -> Result<String, ShopifyError> {
        for attempt in 1..=self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            let data: FileNodeData = self
                .graphql("fileNode", queries::FILE_NODE, &json!({ "id": file_id }))
                .await?;
            let Some(node) = data.node else {
                tracing::debug!(file_id, attempt, "file node not visible yet");
                continue;
            };
            if node.has_failed() {
                return Err(upload_error(filename, "file processing failed"));
            }
            if let Some(url) = node.public_url() {
                return Ok(url.to_owned());
            }
            tracing::debug!(
                file_id,
                attempt,
                status = node.file_status.as_deref().unwrap_or("unknown"),
                "file not ready"
            );
        }
        Err(upload_error(
            filename,
            &format!("no public URL after {} polls", self.poll_attempts),
        ))
    }
}

fn upload_error(filename: &str, reason: &str) -> ShopifyError {
    ShopifyError::Upload {
        filename: filename.to_owned(),
        reason: reason.to_owned(),
    }
}

fn join_user_errors(errors: &[crate::types::UserError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_by_extension() {
        assert_eq!(mime_type_for("tile-red-01.jpg"), "image/jpeg");
        assert_eq!(mime_type_for("tile-red-01.JPEG"), "image/jpeg");
        assert_eq!(mime_type_for("tile-red-01.png"), "image/png");
        assert_eq!(mime_type_for("tile-red-01.webp"), "image/webp");
        assert_eq!(mime_type_for("noext"), "image/jpeg");
    }

    #[test]
    fn user_errors_join_with_field_paths() {
        let errors = vec![
            crate::types::UserError {
                field: Some(vec!["files".to_owned(), "0".to_owned(), "alt".to_owned()]),
                message: "is too long".to_owned(),
            },
            crate::types::UserError {
                field: None,
                message: "quota".to_owned(),
            },
        ];
        assert_eq!(join_user_errors(&errors), "files.0.alt: is too long; quota");
    }
}
