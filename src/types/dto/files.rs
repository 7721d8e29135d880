use poem_openapi::types::multipart::Upload;
use poem_openapi::{Multipart, Object};

use crate::types::db::uploaded_file;
use crate::types::dto::common::PageInfo;

#[derive(Object, Debug)]
pub struct FileResponse {
    pub id: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub category: Option<String>,
    pub uploaded_by: String,
    pub created_at: i64,
}

impl From<uploaded_file::Model> for FileResponse {
    fn from(file: uploaded_file::Model) -> Self {
        Self {
            id: file.id,
            original_name: file.original_name,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            category: file.category,
            uploaded_by: file.uploaded_by,
            created_at: file.created_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct FileListResponse {
    pub items: Vec<FileResponse>,
    pub page: PageInfo,
}

#[derive(Multipart, Debug)]
pub struct UploadFileRequest {
    pub file: Upload,
    pub category: Option<String>,
}
