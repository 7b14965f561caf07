use crate::api::ReviewBody;
use crate::api::leave_request::FilterValue;
use crate::auth::auth::AuthUser;
use crate::classifier::parse_clock;
use crate::error::ApiError;
use crate::model::attendance::AttendanceRecord;
use crate::model::request::CorrectionRequest;
use crate::model::role::Role;
use crate::utils::list_cache::{self, Flow};
use crate::workflow::{self, CORRECTION_FLOW, CorrectionStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const CORRECTION_COLUMNS: &str = "id, employee_id, date, requested_check_in, \
     requested_check_out, reason, status, remarks, reviewed_by, reviewed_at, created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateCorrection {
    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", nullable = true)]
    pub requested_check_in: Option<String>,
    #[schema(example = "17:30:00", nullable = true)]
    pub requested_check_out: Option<String>,
    #[schema(example = "Device was offline, checked in at the gate register")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct CorrectionFilter {
    pub employee_id: Option<u64>,
    #[schema(example = "in_progress")]
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct CorrectionListResponse {
    pub data: Vec<CorrectionRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Employee files a claim that a recorded time is wrong.
#[utoipa::path(
    post,
    path = "/api/v1/corrections",
    request_body = CreateCorrection,
    responses(
        (status = 200, description = "Correction request submitted"),
        (status = 400, description = "Bad request"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn create_correction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateCorrection>,
) -> Result<HttpResponse, ApiError> {
    auth.require_create()?;
    let employee_id = auth.require_employee_link()?;

    let requested_check_in = match &payload.requested_check_in {
        Some(raw) => Some(
            parse_clock(raw)
                .ok_or_else(|| ApiError::Validation("requested_check_in is not a valid time".into()))?,
        ),
        None => None,
    };
    let requested_check_out = match &payload.requested_check_out {
        Some(raw) => Some(
            parse_clock(raw)
                .ok_or_else(|| ApiError::Validation("requested_check_out is not a valid time".into()))?,
        ),
        None => None,
    };

    if requested_check_in.is_none() && requested_check_out.is_none() {
        return Err(ApiError::Validation(
            "At least one corrected time is required".into(),
        ));
    }

    if payload.reason.trim().is_empty() {
        return Err(ApiError::Validation("A reason is required".into()));
    }

    sqlx::query(
        r#"
        INSERT INTO correction_requests
            (employee_id, date, requested_check_in, requested_check_out, reason, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.date)
    .bind(requested_check_in)
    .bind(requested_check_out)
    .bind(payload.reason.trim())
    .bind(CorrectionStatus::Pending.to_string())
    .execute(pool.get_ref())
    .await?;

    list_cache::invalidate(Flow::Correction);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Correction request submitted",
        "status": "pending"
    })))
}

/// Paginated correction listing with employee and status filters.
#[utoipa::path(
    get,
    path = "/api/v1/corrections",
    params(CorrectionFilter),
    responses(
        (status = 200, description = "Paginated correction list", body = CorrectionListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn correction_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<CorrectionFilter>,
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
    if let Some(cached) = list_cache::get(Flow::Correction, &cache_key).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let count_sql = format!("SELECT COUNT(*) FROM correction_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }
    let total = count_q.fetch_one(pool.get_ref()).await?;

    let data_sql = format!(
        "SELECT {CORRECTION_COLUMNS} FROM correction_requests{} \
         ORDER BY created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );
    let mut data_q = sqlx::query_as::<_, CorrectionRequest>(&data_sql);
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

    let response = CorrectionListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    let value = serde_json::to_value(&response).map_err(|e| ApiError::Internal(e.to_string()))?;
    list_cache::put(Flow::Correction, cache_key, value.clone()).await;

    Ok(HttpResponse::Ok().json(value))
}

#[utoipa::path(
    get,
    path = "/api/v1/corrections/{correction_id}",
    params(("correction_id" = u64, Path, description = "Correction request ID")),
    responses(
        (status = 200, description = "Correction request found", body = CorrectionRequest),
        (status = 404, description = "Correction request not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn get_correction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let correction_id = path.into_inner();
    let sql =
        format!("SELECT {CORRECTION_COLUMNS} FROM correction_requests WHERE id = ? AND is_deleted = 0");
    let row = sqlx::query_as::<_, CorrectionRequest>(&sql)
        .bind(correction_id)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::NotFound("Correction request"))?;

    auth.employee_scope(Some(row.employee_id))?;

    Ok(HttpResponse::Ok().json(row))
}

/// Reviewer picks the claim up for verification. No remarks required for
/// the intermediate state.
#[utoipa::path(
    put,
    path = "/api/v1/corrections/{correction_id}/progress",
    params(("correction_id" = u64, Path, description = "Correction request ID")),
    responses(
        (status = 200, description = "Correction marked in progress"),
        (status = 404, description = "Correction request not found"),
        (status = 409, description = "Already finalized"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn start_progress(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    workflow::apply_transition(
        pool.get_ref(),
        &CORRECTION_FLOW,
        path.into_inner(),
        auth.user_id,
        CorrectionStatus::InProgress,
        "",
    )
    .await?;

    list_cache::invalidate(Flow::Correction);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Correction marked in progress"
    })))
}

#[utoipa::path(
    put,
    path = "/api/v1/corrections/{correction_id}/reject",
    params(("correction_id" = u64, Path, description = "Correction request ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Correction rejected"),
        (status = 400, description = "Remarks missing"),
        (status = 404, description = "Correction request not found"),
        (status = 409, description = "Already finalized"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn reject_correction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewBody>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    workflow::apply_transition(
        pool.get_ref(),
        &CORRECTION_FLOW,
        path.into_inner(),
        auth.user_id,
        CorrectionStatus::Rejected,
        body.remarks.as_deref().unwrap_or(""),
    )
    .await?;

    list_cache::invalidate(Flow::Correction);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Correction rejected"
    })))
}

/// Accept the claim: finalize the request and write the requested times
/// onto the attendance row in one transaction, tagged as manual entries.
/// The attendance statuses are derived at read time, so they pick up the
/// corrected values on the next fetch.
#[utoipa::path(
    put,
    path = "/api/v1/corrections/{correction_id}/resolve",
    params(("correction_id" = u64, Path, description = "Correction request ID")),
    request_body = ReviewBody,
    responses(
        (status = 200, description = "Correction resolved and attendance updated"),
        (status = 400, description = "Remarks missing"),
        (status = 404, description = "Correction request not found"),
        (status = 409, description = "Already finalized"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Correction"
)]
pub async fn resolve_correction(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<ReviewBody>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    let correction_id = path.into_inner();
    let mut tx = pool.begin().await?;

    let sql =
        format!("SELECT {CORRECTION_COLUMNS} FROM correction_requests WHERE id = ? AND is_deleted = 0");
    let row = sqlx::query_as::<_, CorrectionRequest>(&sql)
        .bind(correction_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Correction request"))?;

    let current: CorrectionStatus = row.status.parse().map_err(|_| {
        ApiError::Internal(format!(
            "unrecognized status '{}' on correction {}",
            row.status, correction_id
        ))
    })?;

    let normalized = workflow::validate_transition(
        current,
        CorrectionStatus::Resolved,
        body.remarks.as_deref().unwrap_or(""),
    )?
    .unwrap_or_default();

    let affected = sqlx::query(
        r#"
        UPDATE correction_requests
        SET status = ?, remarks = ?, reviewed_by = ?, reviewed_at = NOW()
        WHERE id = ? AND status = ? AND is_deleted = 0
        "#,
    )
    .bind(CorrectionStatus::Resolved.to_string())
    .bind(&normalized)
    .bind(auth.user_id)
    .bind(correction_id)
    .bind(current.to_string())
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if affected == 0 {
        // Lost the race to another reviewer; nothing was applied.
        return Err(ApiError::AlreadyFinalized);
    }

    let existing = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, date, check_in, check_out,
               manual_check_in, manual_check_out, work_from_home
        FROM attendance
        WHERE employee_id = ? AND date = ? AND is_deleted = 0
        "#,
    )
    .bind(row.employee_id)
    .bind(row.date)
    .fetch_optional(&mut *tx)
    .await?;

    match existing {
        Some(att) => {
            sqlx::query(
                r#"
                UPDATE attendance
                SET check_in = ?, check_out = ?, manual_check_in = ?, manual_check_out = ?
                WHERE id = ?
                "#,
            )
            .bind(row.requested_check_in.or(att.check_in))
            .bind(row.requested_check_out.or(att.check_out))
            .bind(row.requested_check_in.is_some() || att.manual_check_in)
            .bind(row.requested_check_out.is_some() || att.manual_check_out)
            .bind(att.id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO attendance
                    (employee_id, date, check_in, check_out, manual_check_in, manual_check_out)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(row.employee_id)
            .bind(row.date)
            .bind(row.requested_check_in)
            .bind(row.requested_check_out)
            .bind(row.requested_check_in.is_some())
            .bind(row.requested_check_out.is_some())
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    list_cache::invalidate(Flow::Correction);

    tracing::info!(
        correction_id,
        employee_id = row.employee_id,
        date = %row.date,
        actor = auth.user_id,
        "Correction resolved, attendance updated"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Correction resolved and attendance updated"
    })))
}
