use axum::extract::{Path, State};
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use service::dish::repository::SeaOrmDishRepository;
use service::dish::service::DishService;

use crate::errors::JsonApiError;
use crate::routes::ServerState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadDishDto {
    pub id: i32,
    pub name: String,
    pub cost: f64,
    pub made_by: String,
}

impl From<models::dish::Model> for ReadDishDto {
    fn from(m: models::dish::Model) -> Self {
        Self { id: m.id, name: m.name, cost: m.cost, made_by: m.made_by }
    }
}

/// Fields arrive optional so a missing one maps to a 400 with a clear
/// message instead of a framework-level rejection.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishInput {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub made_by: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishInput {
    pub name: Option<String>,
    pub cost: Option<f64>,
    pub made_by: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishesAndAveragePriceDto {
    pub dishes: Vec<ReadDishDto>,
    pub average_price: f64,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, JsonApiError> {
    value.ok_or_else(|| JsonApiError::bad_request(format!("missing required field: {}", field)))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<DishesAndAveragePriceDto>, JsonApiError> {
    let repo = SeaOrmDishRepository::begin(&state.db).await?;
    let svc = DishService::new(&repo);

    let (dishes, average_price) = svc.list_with_average().await?;
    info!(count = dishes.len(), "retrieved dishes and average price");

    Ok(Json(DishesAndAveragePriceDto {
        dishes: dishes.into_iter().map(ReadDishDto::from).collect(),
        average_price,
    }))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ReadDishDto>, JsonApiError> {
    let repo = SeaOrmDishRepository::begin(&state.db).await?;
    let svc = DishService::new(&repo);

    let dish = svc.get(id).await?;
    info!(id, "retrieved dish");

    Ok(Json(ReadDishDto::from(dish)))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateDishInput>, JsonApiError>,
) -> Result<Json<ReadDishDto>, JsonApiError> {
    let name = required(input.name, "name")?;
    let cost = required(input.cost, "cost")?;
    let made_by = required(input.made_by, "madeBy")?;

    let repo = SeaOrmDishRepository::begin(&state.db).await?;
    let svc = DishService::new(&repo);

    let created = svc.create(&name, cost, &made_by).await?;
    repo.commit().await?;
    info!(id = created.id, name = %created.name, "dish created");

    Ok(Json(ReadDishDto::from(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    WithRejection(Json(input), _): WithRejection<Json<UpdateDishInput>, JsonApiError>,
) -> Result<Json<ReadDishDto>, JsonApiError> {
    let name = required(input.name, "name")?;
    let cost = required(input.cost, "cost")?;
    let made_by = required(input.made_by, "madeBy")?;

    let repo = SeaOrmDishRepository::begin(&state.db).await?;
    let svc = DishService::new(&repo);

    let updated = svc.update(id, &name, cost, &made_by).await?;
    repo.commit().await?;
    info!(id, "dish updated");

    Ok(Json(ReadDishDto::from(updated)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, JsonApiError> {
    let repo = SeaOrmDishRepository::begin(&state.db).await?;
    let svc = DishService::new(&repo);

    svc.delete(id).await?;
    repo.commit().await?;
    info!(id, "dish deleted");

    Ok(Json(json!({ "message": "Dish deleted successfully" })))
}
