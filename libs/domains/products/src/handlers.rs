//! HTTP handlers for Products API

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    JsonBody,
    errors::responses::{
        BadRequestAmountResponse, BadRequestIdResponse, BadRequestValidationResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ProductResult;
use crate::models::{CreateProduct, DeleteProductResponse, Product, StockChange, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
        add_stock,
        reduce_stock,
        low_stock_report,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, StockChange, DeleteProductResponse),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            BadRequestAmountResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Products", description = "Product and stock management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/alerts/low-stock", get(low_stock_report))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/addStock", post(add_stock))
        .route("/{id}/reduceStock", post(reduce_stock))
        .with_state(shared_service)
}

/// List all products, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "List of products", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    JsonBody(input): JsonBody<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let product = service.create_product(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex ObjectId)")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(&id).await?;
    Ok(Json(product))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex ObjectId)")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, description = "Product updated successfully", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateProduct>,
) -> ProductResult<Json<Product>> {
    let product = service.update_product(&id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex ObjectId)")
    ),
    responses(
        (status = 200, description = "Product deleted successfully", body = DeleteProductResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
) -> ProductResult<Json<DeleteProductResponse>> {
    let product = service.delete_product(&id).await?;
    Ok(Json(DeleteProductResponse::new(product)))
}

/// Increase a product's stock
#[utoipa::path(
    post,
    path = "/{id}/addStock",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex ObjectId)")
    ),
    request_body = StockChange,
    responses(
        (status = 200, description = "Stock increased", body = Product),
        (status = 400, response = BadRequestAmountResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
    JsonBody(change): JsonBody<StockChange>,
) -> ProductResult<Json<Product>> {
    let product = service.add_stock(&id, change).await?;
    Ok(Json(product))
}

/// Decrease a product's stock; fails without changes when stock is insufficient
#[utoipa::path(
    post,
    path = "/{id}/reduceStock",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product ID (24-character hex ObjectId)")
    ),
    request_body = StockChange,
    responses(
        (status = 200, description = "Stock decreased", body = Product),
        (status = 400, response = BadRequestAmountResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reduce_stock<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    Path(id): Path<String>,
    JsonBody(change): JsonBody<StockChange>,
) -> ProductResult<Json<Product>> {
    let product = service.reduce_stock(&id, change).await?;
    Ok(Json(product))
}

/// Products whose stock is below their low-stock threshold
#[utoipa::path(
    get,
    path = "/alerts/low-stock",
    tag = "Products",
    responses(
        (status = 200, description = "Products below their threshold", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn low_stock_report<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.low_stock_report().await?;
    Ok(Json(products))
}
