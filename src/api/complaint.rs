use crate::api::ReviewBody;
use crate::api::leave_request::FilterValue;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::request::AssetComplaint;
use crate::model::role::Role;
use crate::utils::list_cache::{self, Flow};
use crate::workflow::{self, COMPLAINT_FLOW, ComplaintStatus};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const COMPLAINT_COLUMNS: &str = "id, employee_id, asset_name, description, status, \
     remarks, reviewed_by, reviewed_at, created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateComplaint {
    #[schema(example = "Laptop LP-223")]
    pub asset_name: String,
    #[schema(example = "Screen flickers after resume from sleep")]
    pub description: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ComplaintFilter {
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ComplaintListResponse {
    pub data: Vec<AssetComplaint>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    request_body = CreateComplaint,
    responses(
        (status = 200, description = "Complaint submitted"),
        (status = 400, description = "Bad request"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaint"
)]
pub async fn create_complaint(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateComplaint>,
) -> Result<HttpResponse, ApiError> {
    auth.require_create()?;
    let employee_id = auth.require_employee_link()?;

    if payload.asset_name.trim().is_empty() {
        return Err(ApiError::Validation("asset_name is required".into()));
    }
    if payload.description.trim().is_empty() {
        return Err(ApiError::Validation("description is required".into()));
    }

    sqlx::query(
        r#"
        INSERT INTO asset_complaints (employee_id, asset_name, description, status)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.asset_name.trim())
    .bind(payload.description.trim())
    .bind(ComplaintStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await?;

    list_cache::invalidate(Flow::Complaint);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Complaint submitted",
        "status": "pending"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    params(ComplaintFilter),
    responses(
        (status = 200, description = "Paginated complaint list", body = ComplaintListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaint"
)]
pub async fn complaint_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ComplaintFilter>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // Employees only ever see their own requests
    let scoped_employee = if auth.role == Role::Employee {
        Some(auth.require_employee_link()?)
    } else {
        query.employee_id
    };

    let mut where_sql = String::from(" WHERE is_deleted = 0");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = scoped_employee {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let cache_key = format!(
        "emp={:?}|status={:?}|page={}|pp={}",
        scoped_employee, query.status, page, per_page
    );
    if let Some(cached) = list_cache::get(Flow::Complaint, &cache_key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let count_sql = format!("SELECT COUNT(*) FROM asset_complaints{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT {COMPLAINT_COLUMNS} FROM asset_complaints{} \
         ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, AssetComplaint>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }
    let data = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await?;

    let response = ComplaintListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    let value = serde_json::to_value(&response).map_err(|e| ApiError::Internal(e.to_string()))?;
    list_cache::put(Flow::Complaint, cache_key, value.clone()).await;

    Ok(HttpResponse::Ok().json(value))
}

#[utoipa::path(
    get,
    path = "/api/v1/complaints/{complaint_id}",
    params(("complaint_id" = u64, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint found", body = AssetComplaint),
        (status = 404, description = "Asset complaint not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaint"
)]
pub async fn get_complaint(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let complaint_id = path.into_inner();
    let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM asset_complaints WHERE id = ? AND is_deleted = 0");
    let row = sqlx::query_as::<_, AssetComplaint>(&sql)
        .bind(complaint_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Asset complaint"))?;

    auth.employee_scope(Some(row.employee_id))?;

    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    put,
    path = "/api/v1/complaints/{complaint_id}/resolve",
    params(("complaint_id" = u64, Path, description = "Complaint ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Complaint resolved"),
        (status = 400, description = "Remarks missing"),
        (status = 404, description = "Asset complaint not found"),
        (status = 409, description = "Already finalized"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaint"
)]
pub async fn resolve_complaint(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewBody>,
) -> Result<HttpResponse, ApiError> {
    review_complaint(auth, pool, path.into_inner(), ComplaintStatus::Resolved, &body).await
}

#[utoipa::path(
    put,
    path = "/api/v1/complaints/{complaint_id}/reject",
    params(("complaint_id" = u64, Path, description = "Complaint ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Complaint rejected"),
        (status = 400, description = "Remarks missing"),
        (status = 404, description = "Asset complaint not found"),
        (status = 409, description = "Already finalized"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Complaint"
)]
pub async fn reject_complaint(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewBody>,
) -> Result<HttpResponse, ApiError> {
    review_complaint(auth, pool, path.into_inner(), ComplaintStatus::Rejected, &body).await
}

async fn review_complaint(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    complaint_id: u64,
    target: ComplaintStatus,
    body: &ReviewBody,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    workflow::apply_transition(
        pool.get_ref(),
        &COMPLAINT_FLOW,
        complaint_id,
        auth.user_id,
        target,
        body.remarks.as_deref().unwrap_or(""),
    )
    .await?;

    list_cache::invalidate(Flow::Complaint);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Complaint {}", target)
    })))
}
