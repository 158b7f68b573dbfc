use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, SESSIONS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::Session,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> AppResult<Session>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>>;
    async fn list_by_student(
        &self,
        student_id: &str,
        test_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Session>, i64)>;
    async fn find_ids_by_student(&self, student_id: &str) -> AppResult<Vec<String>>;
    async fn find_ids_by_tests(&self, test_ids: &[String]) -> AppResult<Vec<String>>;
    async fn update(&self, session: Session) -> AppResult<Session>;
    async fn delete_by_ids(&self, ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSessionRepository {
    collection: Collection<Session>,
}

impl MongoSessionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(SESSIONS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl SessionRepository for MongoSessionRepository {
    async fn create(&self, session: Session) -> AppResult<Session> {
        self.collection.insert_one(&session).await?;
        Ok(session)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Session>> {
        let session = self.collection.find_one(doc! { "id": id }).await?;
        Ok(session)
    }

    async fn list_by_student(
        &self,
        student_id: &str,
        test_id: Option<String>,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Session>, i64)> {
        let mut filter = doc! { "student_id": student_id };

        if let Some(test_id) = test_id {
            filter.insert("test_id", test_id);
        }

        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let sessions = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((sessions, total))
    }

    async fn find_ids_by_student(&self, student_id: &str) -> AppResult<Vec<String>> {
        let sessions: Vec<Session> = self
            .collection
            .find(doc! { "student_id": student_id })
            .await?
            .try_collect()
            .await?;
        Ok(sessions.into_iter().map(|s| s.id).collect())
    }

    async fn find_ids_by_tests(&self, test_ids: &[String]) -> AppResult<Vec<String>> {
        if test_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sessions: Vec<Session> = self
            .collection
            .find(doc! { "test_id": { "$in": test_ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        Ok(sessions.into_iter().map(|s| s.id).collect())
    }

    async fn update(&self, session: Session) -> AppResult<Session> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &session.id }, &session)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Session with id '{}' not found",
                session.id
            )));
        }

        Ok(session)
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
        log::info!("Creating indexes for sessions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let student_test_index = IndexModel::builder()
            .keys(doc! { "student_id": 1, "test_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_test".to_string())
                    .build(),
            )
            .build();

        let test_index = IndexModel::builder()
            .keys(doc! { "test_id": 1 })
            .options(IndexOptions::builder().name("test_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(student_test_index).await?;
        self.collection.create_index(test_index).await?;

        log::info!("Successfully created indexes for sessions collection");
        Ok(())
    }
}
