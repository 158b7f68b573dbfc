use async_trait::async_trait;
use chrono::Utc;
use log::info;
use mongodb::{
    bson::{doc, to_bson, Bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::{Database, REFRESH_TOKENS_COLLECTION},
    errors::AppResult,
    models::domain::RefreshToken,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken>;
    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>>;
    /// Marks the token revoked. Returns `false` when it was already revoked
    /// or does not exist, so a token can only be consumed once.
    async fn revoke(&self, hash: &str) -> AppResult<bool>;
    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64>;
    async fn delete_expired(&self) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoRefreshTokenRepository {
    collection: Collection<RefreshToken>,
}

impl MongoRefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(REFRESH_TOKENS_COLLECTION);
        Self { collection }
    }
}

// Timestamps are stored through serde, so queries must use the same encoding.
fn now_bson() -> AppResult<Bson> {
    Ok(to_bson(&Utc::now())?)
}

#[async_trait]
impl RefreshTokenRepository for MongoRefreshTokenRepository {
    async fn create(&self, token: RefreshToken) -> AppResult<RefreshToken> {
        self.collection.insert_one(&token).await?;
        Ok(token)
    }

    async fn find_by_token_hash(&self, hash: &str) -> AppResult<Option<RefreshToken>> {
        let token = self
            .collection
            .find_one(doc! { "token_hash": hash })
            .await?;
        Ok(token)
    }

    async fn revoke(&self, hash: &str) -> AppResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "token_hash": hash, "revoked_at": Bson::Null },
                doc! { "$set": { "revoked_at": now_bson()? } },
            )
            .await?;

        Ok(result.modified_count == 1)
    }

    async fn revoke_all_for_user(&self, user_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .update_many(
                doc! { "user_id": user_id, "revoked_at": Bson::Null },
                doc! { "$set": { "revoked_at": now_bson()? } },
            )
            .await?;

        Ok(result.modified_count)
    }

    async fn delete_expired(&self) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "expires_at": { "$lt": now_bson()? } })
            .await?;

        Ok(result.deleted_count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let token_hash_options = IndexOptions::builder().unique(true).build();
        let token_hash_model = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(token_hash_options)
            .build();
        self.collection.create_index(token_hash_model).await?;
        info!("Created unique index on refresh_tokens.token_hash");

        let user_id_model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .build();
        self.collection.create_index(user_id_model).await?;
        info!("Created index on refresh_tokens.user_id");

        Ok(())
    }
}
