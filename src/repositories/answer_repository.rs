use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::{Database, ANSWERS_COLLECTION},
    errors::AppResult,
    models::domain::AnswerRecord,
};

/// Answers are append-only: there is no update and no single-record delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    async fn create(&self, record: AnswerRecord) -> AppResult<AnswerRecord>;
    async fn list_by_sessions(
        &self,
        session_ids: &[String],
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<AnswerRecord>, i64)>;
    async fn delete_by_sessions(&self, session_ids: &[String]) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoAnswerRepository {
    collection: Collection<AnswerRecord>,
}

impl MongoAnswerRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(ANSWERS_COLLECTION);
        Self { collection }
    }
}

#[async_trait]
impl AnswerRepository for MongoAnswerRepository {
    async fn create(&self, record: AnswerRecord) -> AppResult<AnswerRecord> {
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn list_by_sessions(
        &self,
        session_ids: &[String],
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<AnswerRecord>, i64)> {
        if session_ids.is_empty() {
            return Ok((Vec::new(), 0));
        }

        let filter = doc! { "session_id": { "$in": session_ids.to_vec() } };
        let total = self.collection.count_documents(filter.clone()).await? as i64;

        let records = self
            .collection
            .find(filter)
            .sort(doc! { "session_id": 1, "question_index": 1, "answered_at": 1 })
            .skip(offset as u64)
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok((records, total))
    }

    async fn delete_by_sessions(&self, session_ids: &[String]) -> AppResult<u64> {
        if session_ids.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .delete_many(doc! { "session_id": { "$in": session_ids.to_vec() } })
            .await?;
        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let session_index = IndexModel::builder()
            .keys(doc! { "session_id": 1, "question_index": 1 })
            .options(
                IndexOptions::builder()
                    .name("session_question".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(session_index).await?;
        log::info!("Created index on answers.session_id");

        Ok(())
    }
}
