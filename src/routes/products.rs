/// Product Routes
///
/// Reads are public. Create, update and delete sit behind `JwtMiddleware`,
/// which puts the caller's `Identity` in the request before these run.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::Identity;
use crate::database::{from_row, scalar_flag, scalar_id, QueryExecutor, Row};
use crate::error::{AppError, ValidationError};
use crate::extractors::{not_blank, ValidatedQuery};

const GET_PRODUCT: &str = "SELECT * FROM get_product_by_id($1)";
const SEARCH_PRODUCTS: &str = "SELECT * FROM search_products($1, $2, $3, $4)";
const ADD_PRODUCT: &str = "SELECT add_product($1, $2, $3, $4, $5, $6)";
const UPDATE_PRODUCT: &str = "SELECT update_product($1, $2, $3, $4, $5, $6, $7)";
const DELETE_PRODUCT: &str = "SELECT delete_product($1)";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub product_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub sku: String,
    pub category_id: Option<i64>,
}

/// Fields accepted by create and update
#[derive(Debug, Deserialize, Validate)]
pub struct ProductParams {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "must be non-negative"))]
    pub price: f64,
    #[serde(default)]
    #[validate(range(min = 0, message = "must be non-negative"))]
    pub stock: i64,
    #[validate(custom(function = "not_blank"))]
    pub sku: String,
    pub category_id: Option<i64>,
}

impl ProductParams {
    fn check_price(&self) -> Result<(), ValidationError> {
        if !self.price.is_finite() {
            return Err(ValidationError::InvalidInput(
                "price: must be a finite number".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    pub name: Option<String>,
    pub category_id: Option<i64>,
    #[validate(range(min = 0.0, message = "must be non-negative"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must be non-negative"))]
    pub max_price: Option<f64>,
}

#[derive(Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub data: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Product>,
}

#[derive(Serialize)]
pub struct ProductCreatedResponse {
    pub success: bool,
    pub product_id: i64,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Stored functions answer a miss with a row of nulls rather than no row.
fn is_missing(row: &Row) -> bool {
    row.get("product_id").map_or(true, |id| id.is_null())
}

/// GET /products/{product_id}
pub async fn get_product(
    path: web::Path<i64>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let rows = db.execute_query(GET_PRODUCT, &[product_id.into()]).await?;
    let product: Product = match rows.first() {
        Some(row) if !is_missing(row) => from_row(row)?,
        _ => return Err(AppError::NotFound("Product".to_string())),
    };

    Ok(HttpResponse::Ok().json(ProductResponse {
        success: true,
        data: vec![product],
    }))
}

/// GET /products/
///
/// Every filter is optional; an absent filter matches everything.
pub async fn search_products(
    params: ValidatedQuery<SearchParams>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    let name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let rows = db
        .execute_query(
            SEARCH_PRODUCTS,
            &[
                name.into(),
                params.category_id.into(),
                params.min_price.into(),
                params.max_price.into(),
            ],
        )
        .await?;

    let products = rows
        .iter()
        .filter(|row| !is_missing(row))
        .map(from_row::<Product>)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HttpResponse::Ok().json(ProductListResponse {
        success: true,
        count: products.len(),
        data: products,
    }))
}

/// POST /products/
///
/// # Errors
/// - 401/403: handled by middleware
/// - 400: blank name/sku, negative price or stock
pub async fn add_product(
    identity: web::ReqData<Identity>,
    params: ValidatedQuery<ProductParams>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let params = params.into_inner();
    params.check_price()?;

    let rows = db
        .execute_query(
            ADD_PRODUCT,
            &[
                params.name.trim().into(),
                params.description.into(),
                params.price.into(),
                params.stock.into(),
                params.sku.trim().into(),
                params.category_id.into(),
            ],
        )
        .await?;
    let product_id = scalar_id(&rows)?;

    tracing::info!(product_id = product_id, admin = %identity.email, "Product created");

    Ok(HttpResponse::Created().json(ProductCreatedResponse {
        success: true,
        product_id,
    }))
}

/// PUT /products/{product_id}
pub async fn update_product(
    identity: web::ReqData<Identity>,
    path: web::Path<i64>,
    params: ValidatedQuery<ProductParams>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let params = params.into_inner();
    params.check_price()?;

    let rows = db
        .execute_query(
            UPDATE_PRODUCT,
            &[
                product_id.into(),
                params.name.trim().into(),
                params.description.into(),
                params.price.into(),
                params.stock.into(),
                params.sku.trim().into(),
                params.category_id.into(),
            ],
        )
        .await?;
    if !scalar_flag(&rows)? {
        return Err(AppError::NotFound("Product".to_string()));
    }

    tracing::info!(product_id = product_id, admin = %identity.email, "Product updated");

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Product updated".to_string(),
    }))
}

/// DELETE /products/{product_id}
pub async fn delete_product(
    identity: web::ReqData<Identity>,
    path: web::Path<i64>,
    db: web::Data<dyn QueryExecutor>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();

    let rows = db.execute_query(DELETE_PRODUCT, &[product_id.into()]).await?;
    if !scalar_flag(&rows)? {
        return Err(AppError::NotFound("Product".to_string()));
    }

    tracing::info!(product_id = product_id, admin = %identity.email, "Product deleted");

    Ok(HttpResponse::Ok().json(MessageResponse {
        success: true,
        message: "Product deleted".to_string(),
    }))
}
