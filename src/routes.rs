//! HTTP surface for the counter UI and the admin screen.

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::{CatalogItem, LineItem, PurchaseRecord};
use crate::domain::value_objects::{CatalogId, Kilograms, Money};
use crate::services::{receipt_csv, AdminGate, ChangeQuote, ImportSummary, PointOfSale, PriceRow, UpsertMode};
use crate::{AdminError, PosError};

pub const ADMIN_HEADER: &str = "x-admin-password";

#[derive(Clone)]
pub struct AppState {
    pub pos: Arc<PointOfSale>,
    pub admin: Arc<AdminGate>,
}

type ApiResult<T> = Result<T, (StatusCode, String)>;

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/catalog", put(replace_catalog))
        .route("/catalog/items", post(add_item))
        .route("/catalog/items/:id", put(edit_item).delete(remove_item))
        .route("/catalog/prices", post(apply_prices))
        .route("/catalog/import", post(import_prices))
        .route("/catalog/export", get(export_catalog))
        .route("/purchases", get(list_purchases))
        .route("/purchases/by-user", get(purchases_by_user))
        .route("/purchases/export", get(export_purchases))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "veghop"})) }))
        .route("/api/v1/catalog", get(list_catalog))
        .route("/api/v1/quantities", get(|| async { Json(Kilograms::QUICK_PICKS) }))
        .route("/api/v1/users", get(list_users).post(select_user))
        .route("/api/v1/users/active", get(active_user))
        .route("/api/v1/cart/:user", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/checkout/quote", post(quote))
        .route("/api/v1/checkout", post(checkout))
        .route("/api/v1/checkout/receipt", post(download_receipt))
        .nest("/api/v1/admin", admin)
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

fn reject(e: PosError) -> (StatusCode, String) {
    let status = match &e {
        PosError::Validation(_) | PosError::InvalidItem(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PosError::DuplicateId(_) => StatusCode::CONFLICT,
        PosError::ItemNotFound(_) | PosError::UserNotFound(_) => StatusCode::NOT_FOUND,
        PosError::ImportFormat(_) => StatusCode::BAD_REQUEST,
        PosError::Admin(AdminError::InvalidPassword) => StatusCode::UNAUTHORIZED,
        PosError::Admin(AdminError::LockedOut { .. }) => StatusCode::TOO_MANY_REQUESTS,
        PosError::Admin(AdminError::Disabled) => StatusCode::FORBIDDEN,
        PosError::Persistence(err) => {
            tracing::error!(error = %err, "persistence failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PosError::Export(err) => {
            tracing::error!(error = %err, "csv export failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

async fn require_admin(State(s): State<AppState>, req: Request, next: Next) -> Response {
    let verdict = s.admin.verify(req.headers().get(ADMIN_HEADER).and_then(|v| v.to_str().ok()).unwrap_or(""));
    match verdict {
        Ok(()) => next.run(req).await,
        Err(e) => reject(e.into()).into_response(),
    }
}

fn csv_download(stem: &str, body: String) -> impl IntoResponse {
    let disposition = format!("attachment; filename=\"{stem}-{}.csv\"", Local::now().format("%Y-%m-%d"));
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()), (header::CONTENT_DISPOSITION, disposition)], body)
}

// =============================================================================
// Counter
// =============================================================================

async fn list_catalog(State(s): State<AppState>) -> Json<Vec<CatalogItem>> { Json(s.pos.reload_catalog()) }

#[derive(Debug, Serialize)] pub struct UsersView { pub users: Vec<String>, pub active: Option<String> }
#[derive(Debug, Default, Deserialize)] pub struct SelectUserRequest { #[serde(default)] pub name: String }
#[derive(Debug, Serialize)] pub struct CartView { pub user: String, pub lines: Vec<LineItem>, pub total: Money }

async fn list_users(State(s): State<AppState>) -> Json<UsersView> {
    Json(UsersView { users: s.pos.user_names(), active: s.pos.active_user().map(|u| u.name().to_string()) })
}

async fn select_user(State(s): State<AppState>, Json(r): Json<SelectUserRequest>) -> Json<CartView> {
    let user = s.pos.select_or_create(&r.name);
    Json(CartView { user: user.name().to_string(), lines: user.cart().lines().to_vec(), total: user.cart().total() })
}

async fn active_user(State(s): State<AppState>) -> ApiResult<Json<CartView>> {
    let user = s.pos.active_user().ok_or((StatusCode::NOT_FOUND, "No active user".to_string()))?;
    Ok(Json(CartView { user: user.name().to_string(), lines: user.cart().lines().to_vec(), total: user.cart().total() }))
}

async fn get_cart(State(s): State<AppState>, Path(user): Path<String>) -> Json<CartView> {
    Json(CartView { lines: s.pos.cart(&user), total: s.pos.total(&user), user })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLineRequest { pub catalog_id: CatalogId, pub grams: Decimal }

async fn add_to_cart(State(s): State<AppState>, Path(user): Path<String>, Json(r): Json<AddLineRequest>) -> ApiResult<(StatusCode, Json<LineItem>)> {
    let line = s.pos.add_line(&user, &r.catalog_id, r.grams).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(line)))
}

async fn clear_cart(State(s): State<AppState>, Path(user): Path<String>) -> Json<Vec<LineItem>> { Json(s.pos.clear_cart(&user)) }

/// Cash amount as typed at the counter: a number, or text such as `"₹ 200"`.
/// Fractions of a paisa never count towards the total.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Tendered { Amount(Decimal), Text(String) }

impl From<Tendered> for Money {
    fn from(t: Tendered) -> Self {
        match t { Tendered::Amount(a) => Money::tendered(a), Tendered::Text(s) => Money::parse_tendered(&s) }
    }
}

#[derive(Debug, Deserialize)] pub struct TenderRequest { pub user: String, pub tendered: Tendered }

async fn quote(State(s): State<AppState>, Json(r): Json<TenderRequest>) -> Json<ChangeQuote> {
    Json(s.pos.quote_change(&r.user, r.tendered.into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt { pub record: PurchaseRecord, pub change: Money, pub receipt_csv: String }

async fn checkout(State(s): State<AppState>, Json(r): Json<TenderRequest>) -> ApiResult<(StatusCode, Json<Receipt>)> {
    let tendered: Money = r.tendered.into();
    let record = s.pos.finalize(&r.user, tendered).map_err(reject)?;
    let change = tendered.subtract(&record.total());
    let receipt_csv = receipt_csv(&record).map_err(|e| reject(e.into()))?;
    Ok((StatusCode::CREATED, Json(Receipt { record, change, receipt_csv })))
}

/// Re-renders a finalized purchase as a downloadable receipt.
async fn download_receipt(Json(record): Json<PurchaseRecord>) -> ApiResult<impl IntoResponse> {
    Ok(csv_download("receipt", receipt_csv(&record).map_err(|e| reject(e.into()))?))
}

// =============================================================================
// Admin
// =============================================================================

async fn replace_catalog(State(s): State<AppState>, Json(items): Json<Vec<CatalogItem>>) -> ApiResult<Json<Vec<CatalogItem>>> {
    s.pos.replace_catalog(items).map_err(reject)?;
    Ok(Json(s.pos.catalog_items()))
}

async fn add_item(State(s): State<AppState>, Json(item): Json<CatalogItem>) -> ApiResult<(StatusCode, Json<CatalogItem>)> {
    let saved = s.pos.upsert_item(item, UpsertMode::Add).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn edit_item(State(s): State<AppState>, Path(id): Path<String>, Json(item): Json<CatalogItem>) -> ApiResult<Json<CatalogItem>> {
    Ok(Json(s.pos.upsert_item(item.with_id(id.as_str()), UpsertMode::Edit).map_err(reject)?))
}

async fn remove_item(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    s.pos.remove_item(&CatalogId::new(id)).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn apply_prices(State(s): State<AppState>, Json(rows): Json<Vec<PriceRow>>) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(s.pos.apply_price_overrides(&rows).map_err(reject)?))
}

async fn import_prices(State(s): State<AppState>, body: String) -> ApiResult<Json<ImportSummary>> {
    Ok(Json(s.pos.import_price_sheet(&body).map_err(reject)?))
}

async fn export_catalog(State(s): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(csv_download("vegetable-prices", s.pos.export_catalog_csv().map_err(reject)?))
}

#[derive(Debug, Deserialize)] pub struct DateFilter { pub date: Option<String> }

async fn list_purchases(State(s): State<AppState>, Query(q): Query<DateFilter>) -> Json<Vec<PurchaseRecord>> {
    Json(s.pos.purchases(q.date.as_deref()))
}

async fn purchases_by_user(State(s): State<AppState>) -> Json<BTreeMap<String, Vec<PurchaseRecord>>> { Json(s.pos.purchases_by_user()) }

async fn export_purchases(State(s): State<AppState>, Query(q): Query<DateFilter>) -> ApiResult<impl IntoResponse> {
    Ok(csv_download("purchases", s.pos.export_purchases_csv(q.date.as_deref()).map_err(reject)?))
}
