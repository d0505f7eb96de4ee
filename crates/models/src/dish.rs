use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    entity::prelude::*, ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dish")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub cost: f64,
    pub made_by: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name must not be empty".into()));
    }
    if name.len() > 128 {
        return Err(ModelError::Validation("name must be at most 128 characters".into()));
    }
    Ok(())
}

pub fn validate_cost(cost: f64) -> Result<(), ModelError> {
    if !cost.is_finite() {
        return Err(ModelError::Validation("cost must be a finite number".into()));
    }
    if cost < 0.0 {
        return Err(ModelError::Validation("cost must not be negative".into()));
    }
    Ok(())
}

pub fn validate_made_by(made_by: &str) -> Result<(), ModelError> {
    if made_by.trim().is_empty() {
        return Err(ModelError::Validation("madeBy must not be empty".into()));
    }
    if made_by.len() > 128 {
        return Err(ModelError::Validation("madeBy must be at most 128 characters".into()));
    }
    Ok(())
}

pub async fn find_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .order_by_asc(Column::Id)
        .all(conn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Case-sensitive exact match on the name column.
pub async fn find_by_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Name.eq(name))
        .one(conn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// Arithmetic mean of the cost column; `None` when the table is empty
/// (SQL `AVG` over zero rows is NULL).
pub async fn average_cost<C: ConnectionTrait>(conn: &C) -> Result<Option<f64>, ModelError> {
    let avg = Entity::find()
        .select_only()
        .expr_as(Func::avg(Expr::col(Column::Cost)), "avg_cost")
        .into_tuple::<Option<f64>>()
        .one(conn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(avg.flatten())
}

pub async fn create<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    cost: f64,
    made_by: &str,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_cost(cost)?;
    validate_made_by(made_by)?;

    let am = ActiveModel {
        name: Set(name.to_string()),
        cost: Set(cost),
        made_by: Set(made_by.to_string()),
        ..Default::default()
    };
    am.insert(conn).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Overwrite name, cost and made_by of an already-fetched record.
pub async fn update<C: ConnectionTrait>(
    conn: &C,
    current: Model,
    name: &str,
    cost: f64,
    made_by: &str,
) -> Result<Model, ModelError> {
    validate_name(name)?;
    validate_cost(cost)?;
    validate_made_by(made_by)?;

    let mut am: ActiveModel = current.into();
    am.name = Set(name.to_string());
    am.cost = Set(cost);
    am.made_by = Set(made_by.to_string());
    am.update(conn).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Returns whether a row was actually removed.
pub async fn delete_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id)
        .exec(conn)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
