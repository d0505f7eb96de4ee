use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::errors::ServiceError;

/// Data access contract for dishes.
///
/// Mutating methods only stage changes; nothing is durable until the
/// owning unit of work is committed.
#[async_trait]
pub trait DishRepository: Send + Sync {
    async fn all(&self) -> Result<Vec<models::dish::Model>, ServiceError>;
    async fn find(&self, id: i32) -> Result<Option<models::dish::Model>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<models::dish::Model>, ServiceError>;
    /// Mean of the cost column; `None` when no dishes exist.
    async fn average_cost(&self) -> Result<Option<f64>, ServiceError>;
    async fn add(&self, name: &str, cost: f64, made_by: &str) -> Result<models::dish::Model, ServiceError>;
    async fn replace(&self, current: models::dish::Model, name: &str, cost: f64, made_by: &str) -> Result<models::dish::Model, ServiceError>;
    async fn remove(&self, id: i32) -> Result<bool, ServiceError>;
}

/// SeaORM-backed repository implementation.
///
/// Wraps one transaction scoped to the current request: `begin` at
/// request start, stage through the trait methods, then either `commit`
/// or drop (which rolls back).
pub struct SeaOrmDishRepository {
    txn: DatabaseTransaction,
}

impl SeaOrmDishRepository {
    pub async fn begin(db: &DatabaseConnection) -> Result<Self, ServiceError> {
        let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(Self { txn })
    }

    /// Flush staged changes to the store.
    pub async fn commit(self) -> Result<(), ServiceError> {
        self.txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))
    }
}

#[async_trait]
impl DishRepository for SeaOrmDishRepository {
    async fn all(&self) -> Result<Vec<models::dish::Model>, ServiceError> {
        Ok(models::dish::find_all(&self.txn).await?)
    }

    async fn find(&self, id: i32) -> Result<Option<models::dish::Model>, ServiceError> {
        Ok(models::dish::find_by_id(&self.txn, id).await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<models::dish::Model>, ServiceError> {
        Ok(models::dish::find_by_name(&self.txn, name).await?)
    }

    async fn average_cost(&self) -> Result<Option<f64>, ServiceError> {
        Ok(models::dish::average_cost(&self.txn).await?)
    }

    async fn add(&self, name: &str, cost: f64, made_by: &str) -> Result<models::dish::Model, ServiceError> {
        Ok(models::dish::create(&self.txn, name, cost, made_by).await?)
    }

    async fn replace(&self, current: models::dish::Model, name: &str, cost: f64, made_by: &str) -> Result<models::dish::Model, ServiceError> {
        Ok(models::dish::update(&self.txn, current, name, cost, made_by).await?)
    }

    async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
        Ok(models::dish::delete_by_id(&self.txn, id).await?)
    }
}
