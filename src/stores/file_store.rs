use std::path::{Path, PathBuf};

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::FileError;
use crate::types::db::uploaded_file;
use crate::types::dto::common::PageRequest;

#[derive(Debug, Clone)]
pub struct NewFile {
    pub original_name: String,
    pub content_type: String,
    pub category: Option<String>,
    pub uploaded_by: String,
}

/// Uploaded file metadata plus the bytes on disk
///
/// Files are stored flat under the upload directory using a UUID name, the
/// client supplied name is only kept as metadata.
pub struct FileStore {
    upload_dir: PathBuf,
}

impl FileStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    fn path_for(&self, stored_name: &str) -> PathBuf {
        self.upload_dir.join(stored_name)
    }

    /// Write the bytes and insert the metadata row
    ///
    /// The file is removed again when the insert fails.
    pub async fn create(
        &self,
        conn: &impl ConnectionTrait,
        file: NewFile,
        bytes: &[u8],
    ) -> Result<uploaded_file::Model, InternalError> {
        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| FileError::io("create_upload_dir", e))?;

        let id = Uuid::new_v4().to_string();
        let stored_name = Uuid::new_v4().simple().to_string();
        let path = self.path_for(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| FileError::io("write_upload", e))?;

        let model = uploaded_file::ActiveModel {
            id: Set(id),
            original_name: Set(file.original_name),
            stored_name: Set(stored_name),
            content_type: Set(file.content_type),
            size_bytes: Set(bytes.len() as i64),
            category: Set(file.category),
            uploaded_by: Set(file.uploaded_by),
            created_at: Set(Utc::now().timestamp()),
        };

        match model.insert(conn).await {
            Ok(model) => Ok(model),
            Err(e) => {
                if let Err(io_err) = tokio::fs::remove_file(&path).await {
                    tracing::warn!("Failed to remove orphaned upload {}: {}", path.display(), io_err);
                }
                Err(InternalError::database("create_uploaded_file", e))
            }
        }
    }

    pub async fn get(&self, conn: &impl ConnectionTrait, file_id: &str) -> Result<uploaded_file::Model, InternalError> {
        uploaded_file::Entity::find_by_id(file_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_uploaded_file", e))?
            .ok_or_else(|| FileError::NotFound(file_id.to_string()).into())
    }

    pub async fn list(
        &self,
        conn: &impl ConnectionTrait,
        category: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<uploaded_file::Model>, u64), InternalError> {
        let mut query = uploaded_file::Entity::find();
        if let Some(category) = category {
            query = query.filter(uploaded_file::Column::Category.eq(category));
        }

        let paginator = query
            .order_by_desc(uploaded_file::Column::CreatedAt)
            .paginate(conn, page.page_size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| InternalError::database("count_uploaded_files", e))?;
        let files = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| InternalError::database("list_uploaded_files", e))?;

        Ok((files, total))
    }

    pub async fn read(&self, file: &uploaded_file::Model) -> Result<Vec<u8>, InternalError> {
        tokio::fs::read(self.path_for(&file.stored_name))
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FileError::NotFound(file.id.clone()).into(),
                _ => FileError::io("read_upload", e).into(),
            })
    }

    /// Delete the row, then the bytes; a file already gone from disk is ignored
    pub async fn delete(&self, conn: &impl ConnectionTrait, file_id: &str) -> Result<uploaded_file::Model, InternalError> {
        let file = self.get(conn, file_id).await?;
        uploaded_file::Entity::delete_by_id(file.id.clone())
            .exec(conn)
            .await
            .map_err(|e| InternalError::database("delete_uploaded_file", e))?;

        match tokio::fs::remove_file(self.path_for(&file.stored_name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Upload {} was already missing from disk", file.stored_name);
            }
            Err(e) => return Err(FileError::io("remove_upload", e).into()),
        }

        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::setup_test_db;

    fn new_file(name: &str) -> NewFile {
        NewFile {
            original_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            category: Some("documents".to_string()),
            uploaded_by: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_read_delete() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let file = store.create(&db, new_file("report.pdf"), b"%PDF-1.4").await.unwrap();
        assert_eq!(file.size_bytes, 8);
        assert_ne!(file.stored_name, "report.pdf");
        assert!(dir.path().join(&file.stored_name).exists());

        let bytes = store.read(&file).await.unwrap();
        assert_eq!(bytes, b"%PDF-1.4");

        store.delete(&db, &file.id).await.unwrap();
        assert!(!dir.path().join(&file.stored_name).exists());
        let missing = store.get(&db, &file.id).await;
        assert!(matches!(missing, Err(InternalError::File(FileError::NotFound(_)))));
    }

    #[tokio::test]
    async fn test_original_name_never_becomes_a_path() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("uploads"));

        let file = store.create(&db, new_file("../../etc/passwd"), b"x").await.unwrap();
        assert!(store.upload_dir().join(&file.stored_name).exists());
        assert_eq!(file.original_name, "../../etc/passwd");
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = setup_test_db().await;
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.create(&db, new_file("a.pdf"), b"a").await.unwrap();
        let mut other = new_file("b.png");
        other.category = None;
        store.create(&db, other, b"b").await.unwrap();

        let (files, total) = store.list(&db, Some("documents"), PageRequest::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(files[0].original_name, "a.pdf");
    }
}
