use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, TESTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Test,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TestRepository: Send + Sync {
    async fn create(&self, test: Test) -> AppResult<Test>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>>;
    async fn list(
        &self,
        folder_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Test>, i64)>;
    async fn find_ids_by_folder(&self, folder_id: &str) -> AppResult<Vec<String>>;
    async fn update(&self, test: Test) -> AppResult<Test>;
    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoTestRepository {
    collection: Collection<Test>,
}

impl MongoTestRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(TESTS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl TestRepository for MongoTestRepository {
    async fn create(&self, test: Test) -> AppResult<Test> {
        self.collection.insert_one(&test).await?;
        Ok(test)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Test>> {
        let test = self.collection.find_one(doc! { "id": id }).await?;
        Ok(test)
    }

    async fn list(
        &self,
        folder_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Test>, i64)> {
        let mut filter = Document::new();
        if let Some(folder_id) = folder_id {
            filter.insert("folder_id", folder_id);
        }

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let tests: Vec<Test> = self
            .collection
            .find(filter)
            .sort(doc! { "section_type": 1, "section_number": 1, "created_at": 1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((tests, total))
    }

    async fn find_ids_by_folder(&self, folder_id: &str) -> AppResult<Vec<String>> {
        let tests: Vec<Test> = self
            .collection
            .find(doc! { "folder_id": folder_id })
            .await?
            .try_collect()
            .await?;
        Ok(tests.into_iter().map(|t| t.id).collect())
    }

    async fn update(&self, test: Test) -> AppResult<Test> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &test.id }, &test)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Test with id '{}' not found",
                test.id
            )));
        }

        Ok(test)
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
        log::info!("Creating indexes for tests collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let folder_index = IndexModel::builder()
            .keys(doc! { "folder_id": 1 })
            .options(IndexOptions::builder().name("folder_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(folder_index).await?;

        log::info!("Successfully created indexes for tests collection");
        Ok(())
    }
}
