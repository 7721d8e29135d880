use std::sync::Arc;

use crate::app_data::AppData;
use crate::coordinators::authorize;
use crate::errors::InternalError;
use crate::errors::internal::FileError;
use crate::stores::file_store::NewFile;
use crate::stores::settings_store::{ALLOWED_UPLOAD_TYPES, MAX_UPLOAD_SIZE_MB};
use crate::types::db::uploaded_file;
use crate::types::dto::common::PageRequest;
use crate::types::internal::audit::EventType;
use crate::types::internal::context::RequestContext;
use crate::types::internal::permission::Permission;

const DEFAULT_MAX_UPLOAD_MB: u64 = 10;
/// Room for multipart boundaries and part headers around the file itself
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct UploadInput {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub category: Option<String>,
    pub bytes: Vec<u8>,
}

/// Last path component of a client supplied file name
fn display_name(file_name: Option<&str>) -> String {
    file_name
        .and_then(|name| name.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("upload")
        .to_string()
}

/// `image/PNG; charset=x` → `image/png`
fn normalize_content_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

pub struct FileCoordinator {
    app_data: Arc<AppData>,
}

impl FileCoordinator {
    pub fn new(app_data: Arc<AppData>) -> Self {
        Self { app_data }
    }

    /// Current upload limit in bytes
    pub async fn max_upload_bytes(&self) -> Result<u64, InternalError> {
        let megabytes = self
            .app_data
            .settings_store
            .get_u64(&self.app_data.connections.main, MAX_UPLOAD_SIZE_MB, DEFAULT_MAX_UPLOAD_MB)
            .await?;
        Ok(megabytes.saturating_mul(1024 * 1024))
    }

    /// Authorize an upload before its body is read
    ///
    /// `declared_length` is the request Content-Length; a body that cannot
    /// fit under the limit is refused up front.
    pub async fn check_upload(&self, ctx: &RequestContext, declared_length: Option<u64>) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::FileUpload).await?;
        let max_bytes = self.max_upload_bytes().await?;
        if declared_length.is_some_and(|length| length > max_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES)) {
            return Err(FileError::TooLarge { max_bytes }.into());
        }
        Ok(())
    }

    /// Store an upload after checking size and content type against settings
    pub async fn upload(&self, ctx: &RequestContext, input: UploadInput) -> Result<uploaded_file::Model, InternalError> {
        let profile = authorize(&self.app_data, ctx, Permission::FileUpload).await?;
        let db = &self.app_data.connections.main;

        let max_bytes = self.max_upload_bytes().await?;
        if input.bytes.len() as u64 > max_bytes {
            return Err(FileError::TooLarge { max_bytes }.into());
        }

        let content_type = normalize_content_type(input.content_type.as_deref());
        let allowed = self.app_data.settings_store.get_list(db, ALLOWED_UPLOAD_TYPES).await?;
        if !allowed.is_empty() && !allowed.iter().any(|t| t.eq_ignore_ascii_case(&content_type)) {
            return Err(FileError::UnsupportedType(content_type).into());
        }

        let file = self
            .app_data
            .file_store
            .create(
                db,
                NewFile {
                    original_name: display_name(input.file_name.as_deref()),
                    content_type,
                    category: input.category.filter(|c| !c.trim().is_empty()),
                    uploaded_by: profile.user_id().to_string(),
                },
                &input.bytes,
            )
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::FileUploaded)
            .with_context(ctx)
            .add_field("file_id", &file.id)
            .add_field("original_name", &file.original_name)
            .add_field("size_bytes", file.size_bytes)
            .emit()
            .await;

        Ok(file)
    }

    pub async fn list(
        &self,
        ctx: &RequestContext,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<uploaded_file::Model>, u64), InternalError> {
        authorize(&self.app_data, ctx, Permission::FileList).await?;
        self.app_data
            .file_store
            .list(&self.app_data.connections.main, category, page)
            .await
    }

    pub async fn get(&self, ctx: &RequestContext, file_id: &str) -> Result<uploaded_file::Model, InternalError> {
        authorize(&self.app_data, ctx, Permission::FileList).await?;
        self.app_data
            .file_store
            .get(&self.app_data.connections.main, file_id)
            .await
    }

    /// Metadata and content of a stored file
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: &str,
    ) -> Result<(uploaded_file::Model, Vec<u8>), InternalError> {
        let file = self.get(ctx, file_id).await?;
        let bytes = self.app_data.file_store.read(&file).await?;
        Ok((file, bytes))
    }

    pub async fn delete(&self, ctx: &RequestContext, file_id: &str) -> Result<(), InternalError> {
        authorize(&self.app_data, ctx, Permission::FileDelete).await?;
        let file = self
            .app_data
            .file_store
            .delete(&self.app_data.connections.main, file_id)
            .await?;

        self.app_data
            .audit_logger
            .builder(EventType::FileDeleted)
            .with_context(ctx)
            .add_field("file_id", &file.id)
            .add_field("original_name", &file.original_name)
            .emit()
            .await;

        Ok(())
    }
}
