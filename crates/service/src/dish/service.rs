use tracing::{instrument, warn};

use crate::dish::repository::DishRepository;
use crate::errors::ServiceError;

/// Cost updates above this factor of the current cost are rejected.
pub const MAX_COST_INCREASE_FACTOR: f64 = 1.2;

/// Application service encapsulating the dish business rules.
/// Handles duplicate-name and price-cap policy on top of the repository.
pub struct DishService<'a, R: DishRepository> {
    repo: &'a R,
}

impl<'a, R: DishRepository> DishService<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// All dishes together with the mean cost. An empty store is reported
    /// as not-found, matching the listing contract.
    pub async fn list_with_average(&self) -> Result<(Vec<models::dish::Model>, f64), ServiceError> {
        let dishes = self.repo.all().await?;
        if dishes.is_empty() {
            warn!("dish listing requested but store is empty");
            return Err(ServiceError::NotFound("no dishes found in database".into()));
        }
        let average = self
            .repo
            .average_cost()
            .await?
            .ok_or_else(|| ServiceError::Db("average cost missing for non-empty dish set".into()))?;
        Ok((dishes, average))
    }

    pub async fn get(&self, id: i32) -> Result<models::dish::Model, ServiceError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(&format!("dish with id {}", id)))
    }

    /// Create with policy: reject names already taken (exact match).
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        name: &str,
        cost: f64,
        made_by: &str,
    ) -> Result<models::dish::Model, ServiceError> {
        if self.repo.find_by_name(name).await?.is_some() {
            warn!(%name, "dish with this name already exists");
            return Err(ServiceError::Validation("dish with this name already exists".into()));
        }
        self.repo.add(name, cost, made_by).await
    }

    /// Replace name, cost and made_by of an existing dish. The new cost may
    /// not exceed the current cost by more than 20%.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: i32,
        name: &str,
        cost: f64,
        made_by: &str,
    ) -> Result<models::dish::Model, ServiceError> {
        let current = self
            .repo
            .find(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(&format!("dish with id {}", id)))?;

        if cost > current.cost * MAX_COST_INCREASE_FACTOR {
            warn!(
                id,
                current_cost = current.cost,
                requested_cost = cost,
                "cost increase above allowed factor rejected"
            );
            return Err(ServiceError::Validation(
                "new cost cannot be more than 20% higher than the current cost".into(),
            ));
        }

        self.repo.replace(current, name, cost, made_by).await
    }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if self.repo.find(id).await?.is_none() {
            return Err(ServiceError::not_found(&format!("dish with id {}", id)));
        }
        self.repo.remove(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use models::dish::Model;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    /// In-memory repository standing in for the transactional SeaORM one.
    #[derive(Default)]
    struct MemRepo {
        dishes: Mutex<Vec<Model>>,
        next_id: AtomicI32,
    }

    impl MemRepo {
        fn new() -> Self {
            Self { dishes: Mutex::new(Vec::new()), next_id: AtomicI32::new(1) }
        }

        fn stored(&self, id: i32) -> Option<Model> {
            self.dishes.lock().unwrap().iter().find(|d| d.id == id).cloned()
        }
    }

    #[async_trait]
    impl DishRepository for MemRepo {
        async fn all(&self) -> Result<Vec<Model>, ServiceError> {
            Ok(self.dishes.lock().unwrap().clone())
        }

        async fn find(&self, id: i32) -> Result<Option<Model>, ServiceError> {
            Ok(self.stored(id))
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Model>, ServiceError> {
            Ok(self.dishes.lock().unwrap().iter().find(|d| d.name == name).cloned())
        }

        async fn average_cost(&self) -> Result<Option<f64>, ServiceError> {
            let dishes = self.dishes.lock().unwrap();
            if dishes.is_empty() {
                return Ok(None);
            }
            Ok(Some(dishes.iter().map(|d| d.cost).sum::<f64>() / dishes.len() as f64))
        }

        async fn add(&self, name: &str, cost: f64, made_by: &str) -> Result<Model, ServiceError> {
            let model = Model {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                name: name.to_string(),
                cost,
                made_by: made_by.to_string(),
            };
            self.dishes.lock().unwrap().push(model.clone());
            Ok(model)
        }

        async fn replace(
            &self,
            current: Model,
            name: &str,
            cost: f64,
            made_by: &str,
        ) -> Result<Model, ServiceError> {
            let mut dishes = self.dishes.lock().unwrap();
            let slot = dishes
                .iter_mut()
                .find(|d| d.id == current.id)
                .ok_or_else(|| ServiceError::not_found("dish"))?;
            slot.name = name.to_string();
            slot.cost = cost;
            slot.made_by = made_by.to_string();
            Ok(slot.clone())
        }

        async fn remove(&self, id: i32) -> Result<bool, ServiceError> {
            let mut dishes = self.dishes.lock().unwrap();
            let before = dishes.len();
            dishes.retain(|d| d.id != id);
            Ok(dishes.len() < before)
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_name() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        svc.create("Soup", 10.0, "Chef A").await.unwrap();
        let err = svc.create("Soup", 12.0, "Chef B").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Nothing new was staged
        assert_eq!(repo.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_name_match_is_case_sensitive() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        svc.create("Soup", 10.0, "Chef A").await.unwrap();
        assert!(svc.create("soup", 10.0, "Chef A").await.is_ok());
    }

    #[tokio::test]
    async fn update_rejects_cost_increase_above_cap() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let created = svc.create("Soup", 10.0, "Chef A").await.unwrap();
        let err = svc.update(created.id, "Soup", 12.1, "Chef A").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Stored record unchanged
        let stored = repo.stored(created.id).unwrap();
        assert_eq!(stored.cost, 10.0);
        assert_eq!(stored.made_by, "Chef A");
    }

    #[tokio::test]
    async fn update_within_cap_overwrites_all_fields() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let created = svc.create("Soup", 10.0, "Chef A").await.unwrap();
        let updated = svc.update(created.id, "Stew", 11.9, "Chef B").await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Stew");
        assert_eq!(updated.cost, 11.9);
        assert_eq!(updated.made_by, "Chef B");

        let stored = repo.stored(created.id).unwrap();
        assert_eq!(stored.name, "Stew");
        assert_eq!(stored.cost, 11.9);
        assert_eq!(stored.made_by, "Chef B");
    }

    #[tokio::test]
    async fn update_cap_is_relative_to_current_cost() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let created = svc.create("Soup", 10.0, "Chef A").await.unwrap();
        // 12.0 == 10.0 * 1.2 is still allowed
        assert!(svc.update(created.id, "Soup", 12.0, "Chef A").await.is_ok());
        // The cap now follows the updated cost: 12.0 allows up to 14.4-ish
        assert!(svc.update(created.id, "Soup", 14.0, "Chef A").await.is_ok());
        assert!(svc.update(created.id, "Soup", 16.0, "Chef A").await.is_ok());
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        assert!(matches!(svc.get(42).await.unwrap_err(), ServiceError::NotFound(_)));
        assert!(matches!(
            svc.update(42, "Soup", 1.0, "Chef A").await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
        assert!(matches!(svc.delete(42).await.unwrap_err(), ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_empty_store_is_not_found() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let err = svc.list_with_average().await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn listing_single_dish_averages_to_its_cost() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        svc.create("Soup", 10.0, "Chef A").await.unwrap();
        let (dishes, average) = svc.list_with_average().await.unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(average, 10.0);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let created = svc.create("Soup", 10.0, "Chef A").await.unwrap();
        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.get(created.id).await.unwrap_err(), ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn price_rule_scenario() {
        let repo = MemRepo::new();
        let svc = DishService::new(&repo);

        let soup = svc.create("Soup", 10.0, "Chef A").await.unwrap();
        assert!(svc.create("Soup", 12.0, "Chef B").await.is_err());
        assert!(svc.update(soup.id, "Soup", 11.9, "Chef A").await.is_ok());
        // Cap is now 11.9 * 1.2 = 14.28
        assert!(svc.update(soup.id, "Soup", 14.4, "Chef A").await.is_err());
    }
}
