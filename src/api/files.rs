use std::sync::Arc;

use poem::Request;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::{Attachment, AttachmentType, Json};
use poem_openapi::{OpenApi, Tags};

use crate::api::BearerAuth;
use crate::api::helpers::{content_length, require_context};
use crate::app_data::AppData;
use crate::coordinators::FileCoordinator;
use crate::coordinators::file_coordinator::UploadInput;
use crate::errors::AdminError;
use crate::types::dto::common::{MessageResponse, PageInfo, PageRequest};
use crate::types::dto::files::{FileListResponse, FileResponse, UploadFileRequest};

/// Uploaded documents
pub struct FileApi {
    app_data: Arc<AppData>,
    file_coordinator: FileCoordinator,
}

impl FileApi {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self {
            file_coordinator: FileCoordinator::new(app_data.clone()),
            app_data,
        }
    }
}

#[derive(Tags)]
enum FileTags {
    /// File uploads
    Files,
}

#[OpenApi]
impl FileApi {
    /// Upload a file (multipart field `file`, optional `category`)
    ///
    /// Permission and declared size are checked before the file is read; the
    /// stored size and content type are then checked against
    /// `max_upload_size_mb` and `allowed_upload_types`.
    #[oai(path = "/files", method = "post", tag = "FileTags::Files")]
    async fn upload(&self, req: &Request, auth: BearerAuth, body: UploadFileRequest) -> Result<Json<FileResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        self.file_coordinator
            .check_upload(&ctx, content_length(req))
            .await
            .map_err(AdminError::from_internal_error)?;
        let UploadFileRequest { file, category } = body;

        let file_name = file.file_name().map(str::to_string);
        let content_type = file.content_type().map(str::to_string);
        let bytes = file.into_vec().await.map_err(|e| {
            tracing::warn!(request_id = %ctx.request_id, "Failed to read upload: {}", e);
            AdminError::bad_request("invalid_upload", "Could not read the uploaded file")
        })?;

        let input = UploadInput {
            file_name,
            content_type,
            category,
            bytes,
        };
        let stored = self
            .file_coordinator
            .upload(&ctx, input)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(stored.into()))
    }

    #[oai(path = "/files", method = "get", tag = "FileTags::Files")]
    async fn list(
        &self,
        req: &Request,
        auth: BearerAuth,
        category: Query<Option<String>>,
        page: Query<Option<u64>>,
        page_size: Query<Option<u64>>,
    ) -> Result<Json<FileListResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;
        let page = PageRequest::new(page.0, page_size.0);

        let (files, total) = self
            .file_coordinator
            .list(&ctx, category.0.as_deref(), page)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(FileListResponse {
            items: files.into_iter().map(Into::into).collect(),
            page: PageInfo::new(page, total),
        }))
    }

    /// File metadata
    #[oai(path = "/files/:id", method = "get", tag = "FileTags::Files")]
    async fn get(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<FileResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let file = self
            .file_coordinator
            .get(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(file.into()))
    }

    /// File contents as an attachment under its original name
    #[oai(path = "/files/:id/download", method = "get", tag = "FileTags::Files")]
    async fn download(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Attachment<Vec<u8>>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        let (file, bytes) = self
            .file_coordinator
            .download(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Attachment::new(bytes)
            .attachment_type(AttachmentType::Attachment)
            .filename(file.original_name))
    }

    /// Delete the metadata row and the stored file
    #[oai(path = "/files/:id", method = "delete", tag = "FileTags::Files")]
    async fn delete(&self, req: &Request, auth: BearerAuth, id: Path<String>) -> Result<Json<MessageResponse>, AdminError> {
        let ctx = require_context(req, auth, &self.app_data.token_provider)?;

        self.file_coordinator
            .delete(&ctx, &id.0)
            .await
            .map_err(AdminError::from_internal_error)?;

        Ok(Json(MessageResponse::new("File deleted")))
    }
}
