//! Customer portal handlers
//!
//! Admin endpoints mint and revoke tokens; customer endpoints authenticate
//! with `X-Portal-Token` and only ever see documents bearing their own
//! customer name.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pulse_auth::portal::{expiry, generate_token};
use pulse_core::traits::Id;
use pulse_db::finance::FinanceRepository;
use pulse_db::portal::PortalRepository;
use pulse_db::warehouse::WarehouseRepository;
use pulse_models::finance::Invoice;
use pulse_models::portal::PortalToken;
use pulse_models::warehouse::Ddt;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AdminUser, AppState, PortalCustomer};

/// POST /api/portal/tokens (admin) — returns the token value once
pub async fn create_token(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(dto): Json<CreateTokenRequest>,
) -> ApiResult<(StatusCode, Json<CreatedToken>)> {
    if dto.customer_name.trim().is_empty() {
        return Err(ApiError::Validation(
            pulse_core::error::ValidationErrors::single("customerName", "is required"),
        ));
    }

    let repo = PortalRepository::new(state.pool.clone());
    let value = generate_token();
    let days = dto
        .expires_in_days
        .unwrap_or(state.config.auth.portal_token_days);

    let record = repo
        .create(&value, &dto.customer_name, expiry(days), admin.id)
        .await?;

    info!(customer = %record.customer_name, "Portal token minted");
    Ok((
        StatusCode::CREATED,
        Json(CreatedToken {
            token: value,
            record,
        }),
    ))
}

/// GET /api/portal/tokens (admin)
pub async fn list_tokens(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<PortalToken>>> {
    let repo = PortalRepository::new(state.pool.clone());
    Ok(Json(repo.list().await?))
}

/// DELETE /api/portal/tokens/:id (admin)
pub async fn revoke_token(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Id>,
) -> ApiResult<StatusCode> {
    let repo = PortalRepository::new(state.pool.clone());
    repo.revoke(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/portal/overview (portal token)
pub async fn overview(
    State(state): State<AppState>,
    customer: PortalCustomer,
) -> ApiResult<Json<PortalOverview>> {
    let finance = FinanceRepository::new(state.pool.clone());
    let warehouse = WarehouseRepository::new(state.pool.clone());

    let invoices = finance.invoices_for_customer(&customer.customer_name).await?;
    let shipments = warehouse.for_customer(&customer.customer_name).await?;

    let outstanding = invoices.iter().map(|i| i.residual()).sum();

    Ok(Json(PortalOverview {
        customer_name: customer.customer_name,
        invoice_count: invoices.len(),
        shipment_count: shipments.len(),
        outstanding,
    }))
}

/// GET /api/portal/invoices (portal token)
pub async fn invoices(
    State(state): State<AppState>,
    customer: PortalCustomer,
) -> ApiResult<Json<Vec<Invoice>>> {
    let finance = FinanceRepository::new(state.pool.clone());
    Ok(Json(
        finance.invoices_for_customer(&customer.customer_name).await?,
    ))
}

/// GET /api/portal/ddt (portal token)
pub async fn shipments(
    State(state): State<AppState>,
    customer: PortalCustomer,
) -> ApiResult<Json<Vec<Ddt>>> {
    let warehouse = WarehouseRepository::new(state.pool.clone());
    Ok(Json(
        warehouse.for_customer(&customer.customer_name).await?,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub customer_name: String,
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedToken {
    /// Shown once at creation; only a lookup value is stored server-side
    pub token: String,
    #[serde(flatten)]
    pub record: PortalToken,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalOverview {
    pub customer_name: String,
    pub invoice_count: usize,
    pub shipment_count: usize,
    /// Total unpaid across visible invoices, euro cents
    pub outstanding: i64,
}
