/// Category Routes
///
/// Same access rules as products: public reads, admin-only writes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Identity;
use crate::database::{from_row, scalar_flag, scalar_id, QueryExecutor, Row};
use crate::error::AppError;
use crate::extractors::{not_blank, valid_slug, ValidatedQuery};
use crate::routes::products::MessageResponse;

const LIST_CATEGORIES: &str = "SELECT * FROM get_categories()";
const GET_CATEGORY: &str = "SELECT * FROM get_category_by_id($1)";
const ADD_CATEGORY: &str = "SELECT add_category($1, $2, $3)";
const UPDATE_CATEGORY: &str = "SELECT update_category($1, $2, $3, $4)";
const DELETE_CATEGORY: &str = "SELECT delete_category($1)";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryParams {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "valid_slug"))]
    pub slug: String,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub success: bool,
    pub data: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoryListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Category>,
}

#[derive(Serialize)]
pub struct CategoryCreatedResponse {
    pub success: bool,
    pub category_id: i64,
}

fn is_missing(row: &Row) -> bool {
    row.get("category_id").map_or(true, |id| id.is_null())
}

/// GET /categories/
pub async fn list_categories(db: web::Data<dyn QueryExecutor>) -> Result<HttpResponse, AppError> {
    let rows = db.execute_query(LIST_CATEGORIES, &[]).await?;

    let categories = rows
        .iter()
        .filter(|row| !is_missing(row))
        .map(from_row::<Category>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(CategoryListResponse {
        success: true,
        count: categories.len(),
        data: categories,
    }))
}

/// GET /categories/{category_id}
pub async fn get_category(
    path: web::Path<i64>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();

    let rows = db.execute_query(GET_CATEGORY, &[category_id.into()]).await?;
    let category: Category = match rows.first() {
        Some(row) if !is_missing(row) => from_row(row)?,
        _ => return Err(AppError::NotFound("Category".to_string())),
    };

    Ok(HttpResponse::Ok().json(CategoryResponse {
        success: true,
        data: vec![category],
    }))
}

/// POST /categories/
pub async fn add_category(
    identity: web::ReqData<Identity>,
    params: ValidatedQuery<CategoryParams>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();

    let rows = db
        .execute_query(
            ADD_CATEGORY,
            &[
                params.name.trim().into(),
                params.description.into(),
                params.slug.into(),
            ],
        )
        .await?;
    let category_id = scalar_id(&rows)?;

    tracing::info!(category_id = category_id, admin = %identity.email, "Category created");

    Ok(HttpResponse::Created().json(CategoryCreatedResponse {
        success: true,
        category_id,
    }))
}

/// PUT /categories/{category_id}
pub async fn update_category(
    identity: web::ReqData<Identity>,
    path: web::Path<i64>,
    params: ValidatedQuery<CategoryParams>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();
    let params = params.into_inner();

    let rows = db
        .execute_query(
            UPDATE_CATEGORY,
            &[
                category_id.into(),
                params.name.trim().into(),
                params.description.into(),
                params.slug.into(),
            ],
        )
        .await?;
    if !scalar_flag(&rows)? {
        return Err(AppError::NotFound("Category".to_string()));
    }

    tracing::info!(category_id = category_id, admin = %identity.email, "Category updated");

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Category updated".to_string(),
    }))
}

/// DELETE /categories/{category_id}
pub async fn delete_category(
    identity: web::ReqData<Identity>,
    path: web::Path<i64>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let category_id = path.into_inner();

    let rows = db.execute_query(DELETE_CATEGORY, &[category_id.into()]).await?;
    if !scalar_flag(&rows)? {
        return Err(AppError::NotFound("Category".to_string()));
    }

    tracing::info!(category_id = category_id, admin = %identity.email, "Category deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Category deleted".to_string(),
    }))
}
