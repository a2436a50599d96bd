//! Catalog routes: products, suppliers and categories.
//!
//! Every form goes through the core validators before the store is
//! touched, so a rejected request never writes anything.

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use softmax_core::catalog::filter_products;
use softmax_core::validation::{
    validate_category_draft, validate_product_draft, validate_search_query,
    validate_supplier_draft,
};
use softmax_core::{Category, CategoryDraft, Product, ProductDraft, Supplier, SupplierDraft};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::state::{Backend, SharedState};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Cashier screen: only stock > 0, ordered by name.
    #[serde(default)]
    pub in_stock: bool,
    /// Case-insensitive match on name or description.
    #[serde(default)]
    pub search: Option<String>,
}

async fn list_products(
    backend: Backend,
    _session: Session,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = if query.in_stock {
        backend.db.products().list_in_stock().await?
    } else {
        backend.db.products().list().await?
    };

    let products = match query.search.as_deref() {
        Some(term) => filter_products(&products, &validate_search_query(term)?),
        None => products,
    };

    Ok(Json(products))
}

async fn get_product(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    backend
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

async fn create_product(
    backend: Backend,
    _session: Session,
    Json(draft): Json<ProductDraft>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let draft = validate_product_draft(draft)?;
    let product = backend.db.products().insert(&draft).await?;
    info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
    Json(draft): Json<ProductDraft>,
) -> ApiResult<Json<Product>> {
    let draft = validate_product_draft(draft)?;
    let product = backend.db.products().update(&id, &draft).await?;
    Ok(Json(product))
}

/// Hard delete. Past sale items keep their rows with no product.
async fn delete_product(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    backend.db.products().delete(&id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Suppliers
// =============================================================================

async fn list_suppliers(backend: Backend, _session: Session) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(backend.db.suppliers().list().await?))
}

async fn get_supplier(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    backend
        .db
        .suppliers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Supplier", &id))
}

async fn create_supplier(
    backend: Backend,
    _session: Session,
    Json(draft): Json<SupplierDraft>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    let draft = validate_supplier_draft(draft)?;
    let supplier = backend.db.suppliers().insert(&draft).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
    Json(draft): Json<SupplierDraft>,
) -> ApiResult<Json<Supplier>> {
    let draft = validate_supplier_draft(draft)?;
    Ok(Json(backend.db.suppliers().update(&id, &draft).await?))
}

async fn delete_supplier(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    backend.db.suppliers().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

async fn list_categories(backend: Backend, _session: Session) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(backend.db.categories().list().await?))
}

async fn get_category(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    backend
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category", &id))
}

async fn create_category(
    backend: Backend,
    _session: Session,
    Json(draft): Json<CategoryDraft>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let draft = validate_category_draft(draft)?;
    let category = backend.db.categories().insert(&draft).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResult<Json<Category>> {
    let draft = validate_category_draft(draft)?;
    Ok(Json(backend.db.categories().update(&id, &draft).await?))
}

async fn delete_category(
    backend: Backend,
    _session: Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    backend.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
