use crate::application::ports::buyer_repository::BuyerRow;
use crate::application::ports::order_repository::{OrderDetail, PaymentRow};
use crate::application::ports::product_repository::{ListedProduct, ProductPatch, ProductRow};
use crate::application::ports::seller_repository::SellerRow;
use crate::application::services::payments::verify_stripe_signature;
use crate::application::use_cases::marketplace::attach_image::{AttachImage, AttachImageOutcome};
use crate::application::use_cases::marketplace::create_buyer::{CreateBuyer, CreateBuyerOutcome};
use crate::application::use_cases::marketplace::create_product::{
    CreateProduct, CreateProductOutcome, CreateProductRequest as CreateProductDto,
};
use crate::application::use_cases::marketplace::create_seller::{
    CreateSeller, CreateSellerOutcome, CreateSellerRequest as CreateSellerDto,
};
use crate::application::use_cases::marketplace::delete_product::{
    DeleteProduct, DeleteProductOutcome,
};
use crate::application::use_cases::marketplace::landing::Landing;
use crate::application::use_cases::marketplace::list_products::{
    ListProducts, ListProductsOutcome,
};
use crate::application::use_cases::marketplace::my_products::{MyProducts, MyProductsOutcome};
use crate::application::use_cases::marketplace::update_product::{
    UpdateProduct, UpdateProductOutcome,
};
use crate::application::use_cases::marketplace::verification::TierVerification;
use crate::application::use_cases::orders::checkout::{
    Checkout, CheckoutOutcome, CheckoutRequest as CheckoutDto,
};
use crate::application::use_cases::orders::list_orders::{ListOrders, ListOrdersOutcome};
use crate::application::use_cases::orders::mpesa_callback::{
    HandleMpesaCallback, MpesaCallbackOutcome,
};
use crate::application::use_cases::orders::order_detail::{GetOrder, GetOrderOutcome};
use crate::application::use_cases::orders::payment_status::{
    PaymentStatusCheck, PaymentStatusOutcome,
};
use crate::application::use_cases::orders::seller_orders::{SellerOrders, SellerOrdersOutcome};
use crate::application::use_cases::orders::stripe_webhook::HandleStripeEvent;
use crate::application::use_cases::orders::update_delivery::{
    UpdateDelivery, UpdateDeliveryOutcome,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::marketplace::verification::{VerificationProgress, VerificationTier};
use crate::presentation::http::auth::{Bearer, require_user};
use crate::presentation::http::challenges::VerificationProgressResponse;
use crate::presentation::http::{ApiMessage, message_response};
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct BuyerResponse {
    pub id: Uuid,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<BuyerRow> for BuyerResponse {
    fn from(row: BuyerRow) -> Self {
        Self {
            id: row.id,
            display_name: row.display_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerResponse {
    pub id: Uuid,
    pub business_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SellerRow> for SellerResponse {
    fn from(row: SellerRow) -> Self {
        Self {
            id: row.id,
            business_name: row.business_name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            image_url: image_url(row.image_filename.as_deref()),
            id: row.id,
            seller_id: row.seller_id,
            name: row.name,
            description: row.description,
            category: row.category,
            price_cents: row.price_cents,
            stock: row.stock,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListedProductResponse {
    pub product: ProductResponse,
    pub business_name: String,
}

impl From<ListedProduct> for ListedProductResponse {
    fn from(listed: ListedProduct) -> Self {
        Self {
            product: listed.product.into(),
            business_name: listed.business_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LandingResponse {
    pub buyer: Option<BuyerResponse>,
    pub seller: Option<SellerResponse>,
    pub buyer_progress: VerificationProgressResponse,
    pub seller_progress: VerificationProgressResponse,
    /// Present only when the caller is a verified buyer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings: Option<Vec<ListedProductResponse>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBuyerRequest {
    pub display_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSellerRequest {
    pub business_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TierChallengeResponse {
    pub id: String,
    pub kind: String,
    pub difficulty: String,
    pub points: i32,
    pub solved: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerificationViewResponse {
    pub tier: String,
    pub solved: i64,
    pub required: i64,
    pub verified: bool,
    pub challenges: Vec<TierChallengeResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: i64,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// `mpesa` or `stripe`.
    pub method: String,
    pub phone_number: Option<String>,
    pub delivery_address: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<PaymentRow> for PaymentResponse {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            amount_cents: row.amount_cents,
            method: row.method,
            status: row.status,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub business_name: String,
    pub buyer_name: String,
    pub quantity: i32,
    pub total_cents: i64,
    pub delivery_status: String,
    pub delivery_address: Option<String>,
    pub phone_number: Option<String>,
    pub mpesa_receipt_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub payment: Option<PaymentResponse>,
}

impl From<OrderDetail> for OrderResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            id: detail.order.id,
            product_id: detail.order.product_id,
            product_name: detail.product_name,
            business_name: detail.business_name,
            buyer_name: detail.buyer_name,
            quantity: detail.order.quantity,
            total_cents: detail.order.total_cents,
            delivery_status: detail.order.delivery_status,
            delivery_address: detail.order.delivery_address,
            phone_number: detail.order.phone_number,
            mpesa_receipt_number: detail.order.mpesa_receipt_number,
            created_at: detail.order.created_at,
            delivered_at: detail.order.delivered_at,
            payment: detail.payment.map(PaymentResponse::from),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentStatusResponse {
    pub order_id: Uuid,
    pub delivery_status: String,
    pub payment_status: String,
    pub receipt: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryUpdateResponse {
    pub order_id: Uuid,
    pub delivery_status: String,
    pub delivered_at: Option<DateTime<Utc>>,
}

fn image_url(filename: Option<&str>) -> Option<String> {
    filename.map(|f| format!("/api/marketplace/uploads/products/{f}"))
}

fn not_verified(progress: VerificationProgress, tier: VerificationTier) -> Response {
    message_response(
        StatusCode::FORBIDDEN,
        format!(
            "{} verification required: {} of {} challenges solved",
            tier.as_str(),
            progress.solved,
            progress.required
        ),
    )
}

fn no_profile(tier: VerificationTier) -> Response {
    message_response(
        StatusCode::FORBIDDEN,
        format!("create a {} profile first", tier.as_str()),
    )
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(landing))
        .route("/buyers", post(create_buyer))
        .route("/sellers", post(create_seller))
        .route("/buyers/me/verification", get(buyer_verification))
        .route("/sellers/me/verification", get(seller_verification))
        .route("/sellers/me/orders", get(seller_orders))
        .route("/products", get(list_products).post(create_product))
        .route("/products/mine", get(my_products))
        .route(
            "/products/:id",
            put(update_product).delete(delete_product),
        )
        .route("/products/:id/image", post(upload_product_image))
        .route("/uploads/products/:filename", get(serve_product_image))
        .route("/checkout/:product_id", post(checkout))
        .route("/mpesa/callback", post(mpesa_callback))
        .route("/stripe/webhook", post(stripe_webhook))
        .route("/orders", get(list_orders))
        .route("/orders/:id", get(order_detail))
        .route("/orders/:id/payment-status", get(payment_status))
        .route("/orders/:id/status", post(update_delivery))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/api/marketplace", tag = "Marketplace", responses(
    (status = 200, body = LandingResponse)
))]
pub async fn landing(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<LandingResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let progress = ctx.progress_repo();
    let uc = Landing {
        buyers: buyers.as_ref(),
        sellers: sellers.as_ref(),
        products: products.as_ref(),
        progress: progress.as_ref(),
    };
    let view = uc
        .execute(
            user_id,
            ctx.cfg.buyer_required_solves,
            ctx.cfg.seller_required_solves,
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(LandingResponse {
        buyer: view.buyer.map(BuyerResponse::from),
        seller: view.seller.map(SellerResponse::from),
        buyer_progress: view.buyer_progress.into(),
        seller_progress: view.seller_progress.into(),
        listings: view
            .listings
            .map(|rows| rows.into_iter().map(ListedProductResponse::from).collect()),
    }))
}

#[utoipa::path(post, path = "/api/marketplace/buyers", tag = "Marketplace", request_body = CreateBuyerRequest, responses(
    (status = 201, body = BuyerResponse),
    (status = 400, body = ApiMessage),
    (status = 409, body = ApiMessage)
))]
pub async fn create_buyer(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Json(req): Json<CreateBuyerRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let uc = CreateBuyer {
        buyers: buyers.as_ref(),
    };
    match uc
        .execute(user_id, &req.display_name)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CreateBuyerOutcome::Created(row) => {
            Ok((StatusCode::CREATED, Json(BuyerResponse::from(row))).into_response())
        }
        CreateBuyerOutcome::AlreadyExists => Ok(message_response(
            StatusCode::CONFLICT,
            "you already have a buyer profile",
        )),
        CreateBuyerOutcome::InvalidInput(msg) => Ok(message_response(StatusCode::BAD_REQUEST, msg)),
    }
}

#[utoipa::path(post, path = "/api/marketplace/sellers", tag = "Marketplace", request_body = CreateSellerRequest, responses(
    (status = 201, body = SellerResponse),
    (status = 400, body = ApiMessage),
    (status = 409, body = ApiMessage)
))]
pub async fn create_seller(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Json(req): Json<CreateSellerRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let uc = CreateSeller {
        sellers: sellers.as_ref(),
    };
    let dto = CreateSellerDto {
        business_name: req.business_name.clone(),
        description: req.description.clone(),
    };
    match uc
        .execute(user_id, &dto)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CreateSellerOutcome::Created(row) => {
            Ok((StatusCode::CREATED, Json(SellerResponse::from(row))).into_response())
        }
        CreateSellerOutcome::AlreadyExists => Ok(message_response(
            StatusCode::CONFLICT,
            "you already have a seller profile",
        )),
        CreateSellerOutcome::InvalidInput(msg) => {
            Ok(message_response(StatusCode::BAD_REQUEST, msg))
        }
    }
}

async fn tier_verification(
    ctx: &AppContext,
    user_id: Uuid,
    tier: VerificationTier,
) -> Result<Json<VerificationViewResponse>, StatusCode> {
    let required = match tier {
        VerificationTier::Buyer => ctx.cfg.buyer_required_solves,
        VerificationTier::Seller => ctx.cfg.seller_required_solves,
    };
    let challenges = ctx.challenge_repo();
    let progress = ctx.progress_repo();
    let uc = TierVerification {
        challenges: challenges.as_ref(),
        progress: progress.as_ref(),
    };
    let view = uc
        .execute(user_id, tier, required)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(VerificationViewResponse {
        tier: view.tier.as_str().to_string(),
        solved: view.progress.solved,
        required: view.progress.required,
        verified: view.progress.verified(),
        challenges: view
            .challenges
            .into_iter()
            .map(|c| TierChallengeResponse {
                id: c.challenge.id,
                kind: c.challenge.kind,
                difficulty: c.challenge.difficulty,
                points: c.challenge.points,
                solved: c.solved,
            })
            .collect(),
    }))
}

#[utoipa::path(get, path = "/api/marketplace/buyers/me/verification", tag = "Marketplace", responses(
    (status = 200, body = VerificationViewResponse)
))]
pub async fn buyer_verification(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<VerificationViewResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    tier_verification(&ctx, user_id, VerificationTier::Buyer).await
}

#[utoipa::path(get, path = "/api/marketplace/sellers/me/verification", tag = "Marketplace", responses(
    (status = 200, body = VerificationViewResponse)
))]
pub async fn seller_verification(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Json<VerificationViewResponse>, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    tier_verification(&ctx, user_id, VerificationTier::Seller).await
}

#[utoipa::path(get, path = "/api/marketplace/products", tag = "Marketplace", responses(
    (status = 200, body = [ListedProductResponse]),
    (status = 403, body = ApiMessage)
))]
pub async fn list_products(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let products = ctx.product_repo();
    let progress = ctx.progress_repo();
    let uc = ListProducts {
        buyers: buyers.as_ref(),
        products: products.as_ref(),
        progress: progress.as_ref(),
    };
    match uc
        .execute(user_id, ctx.cfg.buyer_required_solves)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        ListProductsOutcome::Allowed(rows) => Ok(Json(
            rows.into_iter()
                .map(ListedProductResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response()),
        ListProductsOutcome::NoProfile => Ok(no_profile(VerificationTier::Buyer)),
        ListProductsOutcome::NotVerified(progress) => {
            Ok(not_verified(progress, VerificationTier::Buyer))
        }
    }
}

#[utoipa::path(get, path = "/api/marketplace/products/mine", tag = "Marketplace", responses(
    (status = 200, body = [ProductResponse]),
    (status = 403, body = ApiMessage)
))]
pub async fn my_products(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let uc = MyProducts {
        sellers: sellers.as_ref(),
        products: products.as_ref(),
    };
    match uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        MyProductsOutcome::Allowed(rows) => Ok(Json(
            rows.into_iter()
                .map(ProductResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response()),
        MyProductsOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
    }
}

#[utoipa::path(post, path = "/api/marketplace/products", tag = "Marketplace", request_body = CreateProductRequest, responses(
    (status = 201, body = ProductResponse),
    (status = 400, body = ApiMessage),
    (status = 403, body = ApiMessage)
))]
pub async fn create_product(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Json(req): Json<CreateProductRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let progress = ctx.progress_repo();
    let uc = CreateProduct {
        sellers: sellers.as_ref(),
        products: products.as_ref(),
        progress: progress.as_ref(),
    };
    let dto = CreateProductDto {
        name: req.name.clone(),
        description: req.description.clone(),
        category: req.category.clone(),
        price_cents: req.price_cents,
        stock: req.stock,
    };
    match uc
        .execute(user_id, &dto, ctx.cfg.seller_required_solves)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CreateProductOutcome::Created(row) => {
            Ok((StatusCode::CREATED, Json(ProductResponse::from(row))).into_response())
        }
        CreateProductOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
        CreateProductOutcome::NotVerified(progress) => {
            Ok(not_verified(progress, VerificationTier::Seller))
        }
        CreateProductOutcome::InvalidInput(msg) => {
            Ok(message_response(StatusCode::BAD_REQUEST, msg))
        }
    }
}

#[utoipa::path(put, path = "/api/marketplace/products/{id}", tag = "Marketplace", request_body = UpdateProductRequest, responses(
    (status = 200, body = ProductResponse),
    (status = 400, body = ApiMessage),
    (status = 403, body = ApiMessage),
    (status = 404)
))]
pub async fn update_product(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let uc = UpdateProduct {
        sellers: sellers.as_ref(),
        products: products.as_ref(),
    };
    let patch = ProductPatch {
        name: req.name.clone(),
        description: req.description.clone(),
        category: req.category.clone(),
        price_cents: req.price_cents,
        stock: req.stock,
        is_active: req.is_active,
    };
    match uc
        .execute(user_id, id, &patch)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        UpdateProductOutcome::Updated(row) => {
            Ok(Json(ProductResponse::from(row)).into_response())
        }
        UpdateProductOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        UpdateProductOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
        UpdateProductOutcome::InvalidInput(msg) => {
            Ok(message_response(StatusCode::BAD_REQUEST, msg))
        }
    }
}

#[utoipa::path(delete, path = "/api/marketplace/products/{id}", tag = "Marketplace", responses(
    (status = 204),
    (status = 403, body = ApiMessage),
    (status = 404)
))]
pub async fn delete_product(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let images = ctx.image_store();
    let uc = DeleteProduct {
        sellers: sellers.as_ref(),
        products: products.as_ref(),
        images: images.as_ref(),
    };
    match uc
        .execute(user_id, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        DeleteProductOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteProductOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        DeleteProductOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
    }
}

#[utoipa::path(post, path = "/api/marketplace/products/{id}/image", tag = "Marketplace", responses(
    (status = 200, body = ProductResponse),
    (status = 400, body = ApiMessage),
    (status = 403, body = ApiMessage),
    (status = 404),
    (status = 413)
))]
pub async fn upload_product_image(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let mut data: Option<Vec<u8>> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            if bytes.len() > ctx.cfg.upload_max_bytes {
                return Err(StatusCode::PAYLOAD_TOO_LARGE);
            }
            data = Some(bytes.to_vec());
        }
    }
    let data = data.ok_or(StatusCode::BAD_REQUEST)?;

    let sellers = ctx.seller_repo();
    let products = ctx.product_repo();
    let images = ctx.image_store();
    let uc = AttachImage {
        sellers: sellers.as_ref(),
        products: products.as_ref(),
        images: images.as_ref(),
    };
    match uc
        .execute(user_id, id, &data)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        AttachImageOutcome::Attached(row) => Ok(Json(ProductResponse::from(row)).into_response()),
        AttachImageOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        AttachImageOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
        AttachImageOutcome::NotAnImage => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "file must be a png, jpeg, gif or webp image",
        )),
    }
}

#[utoipa::path(get, path = "/api/marketplace/uploads/products/{filename}", tag = "Marketplace",
    params(("filename" = String, Path, description = "Stored image name")),
    security(()),
    responses((status = 200, description = "Image bytes"), (status = 404))
)]
pub async fn serve_product_image(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> Result<Response, StatusCode> {
    let image = ctx
        .image_store()
        .open(&filename)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_str(&image.content_type)
            .unwrap_or(axum::http::HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(
        axum::http::HeaderName::from_static("x-content-type-options"),
        axum::http::HeaderValue::from_static("nosniff"),
    );
    Ok((headers, image.bytes).into_response())
}

#[utoipa::path(post, path = "/api/marketplace/checkout/{product_id}", tag = "Marketplace", request_body = CheckoutRequest, responses(
    (status = 200, body = CheckoutResponse),
    (status = 400, body = ApiMessage),
    (status = 403, body = ApiMessage),
    (status = 409, body = ApiMessage),
    (status = 502, body = ApiMessage),
    (status = 503, body = ApiMessage)
))]
pub async fn checkout(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(product_id): Path<Uuid>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let products = ctx.product_repo();
    let orders = ctx.order_repo();
    let progress = ctx.progress_repo();
    let mpesa = ctx.mpesa_gateway();
    let stripe = ctx.stripe_gateway();
    let uc = Checkout {
        buyers: buyers.as_ref(),
        products: products.as_ref(),
        orders: orders.as_ref(),
        progress: progress.as_ref(),
        mpesa: mpesa.as_ref(),
        stripe: stripe.as_ref(),
    };
    let dto = CheckoutDto {
        method: req.method.clone(),
        phone_number: req.phone_number.clone(),
        delivery_address: req.delivery_address.clone(),
    };
    match uc
        .execute(user_id, product_id, &dto, ctx.cfg.buyer_required_solves)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        CheckoutOutcome::MpesaStarted {
            order_id,
            checkout_request_id,
            customer_message,
        } => Ok(Json(CheckoutResponse {
            order_id,
            checkout_request_id: Some(checkout_request_id),
            message: Some(customer_message),
            client_secret: None,
            public_key: None,
        })
        .into_response()),
        CheckoutOutcome::StripeStarted {
            order_id,
            client_secret,
        } => Ok(Json(CheckoutResponse {
            order_id,
            checkout_request_id: None,
            message: None,
            client_secret: Some(client_secret),
            public_key: ctx.cfg.stripe_publishable_key.clone(),
        })
        .into_response()),
        CheckoutOutcome::NoProfile => Ok(no_profile(VerificationTier::Buyer)),
        CheckoutOutcome::NotVerified(progress) => {
            Ok(not_verified(progress, VerificationTier::Buyer))
        }
        CheckoutOutcome::ProductUnavailable => Ok(message_response(
            StatusCode::CONFLICT,
            "product is unavailable or out of stock",
        )),
        CheckoutOutcome::InvalidInput(msg) => Ok(message_response(StatusCode::BAD_REQUEST, msg)),
        CheckoutOutcome::GatewayRejected(msg) => Ok(message_response(StatusCode::BAD_GATEWAY, msg)),
        CheckoutOutcome::GatewayUnavailable => Ok(message_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "this payment method is not available right now",
        )),
    }
}

#[utoipa::path(post, path = "/api/marketplace/mpesa/callback", tag = "Marketplace", security(()), responses(
    (status = 200, description = "Acknowledged"),
    (status = 400, description = "Unparseable envelope")
))]
pub async fn mpesa_callback(
    State(ctx): State<AppContext>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Response, StatusCode> {
    let orders = ctx.order_repo();
    let uc = HandleMpesaCallback {
        orders: orders.as_ref(),
    };
    match uc
        .execute(&payload)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        MpesaCallbackOutcome::Accepted => Ok(Json(
            serde_json::json!({"ResultCode": 0, "ResultDesc": "Accepted"}),
        )
        .into_response()),
        MpesaCallbackOutcome::Unparseable => Ok((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"ResultCode": 1, "ResultDesc": "Invalid callback payload"})),
        )
            .into_response()),
    }
}

#[utoipa::path(post, path = "/api/marketplace/stripe/webhook", tag = "Marketplace", security(()), responses(
    (status = 200, description = "Acknowledged"),
    (status = 400, description = "Bad signature or body")
))]
pub async fn stripe_webhook(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: String,
) -> Result<Response, StatusCode> {
    let secret = ctx
        .cfg
        .stripe_webhook_secret
        .as_deref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    if !verify_stripe_signature(secret, signature, &body, Utc::now().timestamp()) {
        error!("stripe_webhook_bad_signature");
        return Err(StatusCode::BAD_REQUEST);
    }
    let event: serde_json::Value =
        serde_json::from_str(&body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let orders = ctx.order_repo();
    let uc = HandleStripeEvent {
        orders: orders.as_ref(),
    };
    uc.execute(&event)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(serde_json::json!({"received": true})).into_response())
}

#[utoipa::path(get, path = "/api/marketplace/orders", tag = "Marketplace", responses(
    (status = 200, body = [OrderResponse]),
    (status = 403, body = ApiMessage)
))]
pub async fn list_orders(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let orders = ctx.order_repo();
    let uc = ListOrders {
        buyers: buyers.as_ref(),
        orders: orders.as_ref(),
    };
    match uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        ListOrdersOutcome::Allowed(rows) => Ok(Json(
            rows.into_iter()
                .map(OrderResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response()),
        ListOrdersOutcome::NoProfile => Ok(no_profile(VerificationTier::Buyer)),
    }
}

#[utoipa::path(get, path = "/api/marketplace/orders/{id}", tag = "Marketplace", responses(
    (status = 200, body = OrderResponse),
    (status = 403, body = ApiMessage),
    (status = 404)
))]
pub async fn order_detail(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let orders = ctx.order_repo();
    let uc = GetOrder {
        buyers: buyers.as_ref(),
        orders: orders.as_ref(),
    };
    match uc
        .execute(user_id, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        GetOrderOutcome::Found(detail) => Ok(Json(OrderResponse::from(*detail)).into_response()),
        GetOrderOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        GetOrderOutcome::NoProfile => Ok(no_profile(VerificationTier::Buyer)),
    }
}

#[utoipa::path(get, path = "/api/marketplace/orders/{id}/payment-status", tag = "Marketplace", responses(
    (status = 200, body = PaymentStatusResponse),
    (status = 403, body = ApiMessage),
    (status = 404)
))]
pub async fn payment_status(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let buyers = ctx.buyer_repo();
    let orders = ctx.order_repo();
    let mpesa = ctx.mpesa_gateway();
    let uc = PaymentStatusCheck {
        buyers: buyers.as_ref(),
        orders: orders.as_ref(),
        mpesa: mpesa.as_ref(),
    };
    match uc
        .execute(user_id, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        PaymentStatusOutcome::Status(view) => Ok(Json(PaymentStatusResponse {
            order_id: view.order_id,
            delivery_status: view.delivery_status,
            payment_status: view.payment_status,
            receipt: view.receipt,
            message: view.message,
        })
        .into_response()),
        PaymentStatusOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        PaymentStatusOutcome::NoProfile => Ok(no_profile(VerificationTier::Buyer)),
    }
}

#[utoipa::path(get, path = "/api/marketplace/sellers/me/orders", tag = "Marketplace", responses(
    (status = 200, body = [OrderResponse]),
    (status = 403, body = ApiMessage)
))]
pub async fn seller_orders(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let orders = ctx.order_repo();
    let uc = SellerOrders {
        sellers: sellers.as_ref(),
        orders: orders.as_ref(),
    };
    match uc
        .execute(user_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        SellerOrdersOutcome::Allowed(rows) => Ok(Json(
            rows.into_iter()
                .map(OrderResponse::from)
                .collect::<Vec<_>>(),
        )
        .into_response()),
        SellerOrdersOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
    }
}

#[utoipa::path(post, path = "/api/marketplace/orders/{id}/status", tag = "Marketplace", request_body = UpdateDeliveryRequest, responses(
    (status = 200, body = DeliveryUpdateResponse),
    (status = 400, body = ApiMessage),
    (status = 403, body = ApiMessage),
    (status = 404)
))]
pub async fn update_delivery(
    State(ctx): State<AppContext>,
    bearer: Result<Bearer, StatusCode>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDeliveryRequest>,
) -> Result<Response, StatusCode> {
    let user_id = require_user(&ctx.cfg, bearer)?;
    let sellers = ctx.seller_repo();
    let orders = ctx.order_repo();
    let uc = UpdateDelivery {
        sellers: sellers.as_ref(),
        orders: orders.as_ref(),
    };
    match uc
        .execute(user_id, id, &req.status)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    {
        UpdateDeliveryOutcome::Updated(order) => Ok(Json(DeliveryUpdateResponse {
            order_id: order.id,
            delivery_status: order.delivery_status,
            delivered_at: order.delivered_at,
        })
        .into_response()),
        UpdateDeliveryOutcome::NotFound => Err(StatusCode::NOT_FOUND),
        UpdateDeliveryOutcome::NoProfile => Ok(no_profile(VerificationTier::Seller)),
        UpdateDeliveryOutcome::InvalidStatus => Ok(message_response(
            StatusCode::BAD_REQUEST,
            "unknown delivery status",
        )),
    }
}
