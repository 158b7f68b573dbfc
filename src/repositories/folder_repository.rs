use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, FOLDERS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Folder,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the access code is taken.
    async fn create(&self, folder: Folder) -> AppResult<Folder>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Folder>>;
    async fn find_by_access_code(&self, access_code: &str) -> AppResult<Option<Folder>>;
    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Folder>, i64)>;
    async fn update(&self, folder: Folder) -> AppResult<Folder>;
    async fn find_ids_by_owner(&self, owner_id: &str) -> AppResult<Vec<String>>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoFolderRepository {
    collection: Collection<Folder>,
}

impl MongoFolderRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(FOLDERS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl FolderRepository for MongoFolderRepository {
    async fn create(&self, folder: Folder) -> AppResult<Folder> {
        self.collection.insert_one(&folder).await?;
        Ok(folder)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Folder>> {
        let folder = self.collection.find_one(doc! { "id": id }).await?;
        Ok(folder)
    }

    async fn find_by_access_code(&self, access_code: &str) -> AppResult<Option<Folder>> {
        let folder = self
            .collection
            .find_one(doc! { "access_code": access_code })
            .await?;
        Ok(folder)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<(Vec<Folder>, i64)> {
        let total = self.collection.count_documents(doc! {}).await? as i64;

        let folders: Vec<Folder> = self
            .collection
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((folders, total))
    }

    async fn update(&self, folder: Folder) -> AppResult<Folder> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &folder.id }, &folder)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Folder with id '{}' not found",
                folder.id
            )));
        }

        Ok(folder)
    }

    async fn find_ids_by_owner(&self, owner_id: &str) -> AppResult<Vec<String>> {
        let folders: Vec<Folder> = self
            .collection
            .find(doc! { "owner_id": owner_id })
            .await?
            .try_collect()
            .await?;
        Ok(folders.into_iter().map(|f| f.id).collect())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!(
                "Folder with id '{}' not found",
                id
            )));
        }

        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .delete_many(doc! { "id": { "$in": ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for folders collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let access_code_index = IndexModel::builder()
            .keys(doc! { "access_code": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("access_code_unique".to_string())
                    .build(),
            )
            .build();

        let owner_index = IndexModel::builder()
            .keys(doc! { "owner_id": 1 })
            .options(IndexOptions::builder().name("owner_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(access_code_index).await?;
        self.collection.create_index(owner_index).await?;

        log::info!("Successfully created indexes for folders collection");
        Ok(())
    }
}
