use crate::auth::auth::AuthUser;
use crate::classifier::{self, DayContext, ShiftRules, parse_clock};
use crate::error::ApiError;
use crate::model::attendance::{AttendanceDayView, AttendanceRecord};
use crate::model::shift::Shift;
use crate::utils::holiday_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

const ATTENDANCE_COLUMNS: &str = "id, employee_id, date, check_in, check_out, \
     manual_check_in, manual_check_out, work_from_home";

/// Classification parameters for one employee, falling back to the default
/// day shift when no shift is assigned.
pub(crate) async fn shift_rules_for(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<ShiftRules, ApiError> {
    let shift = sqlx::query_as::<_, Shift>(
        r#"
        SELECT s.id, s.name, s.start_time, s.end_time,
               s.grace_minutes, s.early_leave_minutes, s.half_day_hours
        FROM shifts s
        JOIN employees e ON e.shift_id = s.id
        WHERE e.id = ? AND s.is_deleted = 0
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(shift.map(|s| s.rules()).unwrap_or_default())
}

async fn approved_leave_ranges(
    pool: &MySqlPool,
    employee_id: u64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<(NaiveDate, NaiveDate)>, ApiError> {
    let ranges = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ?
          AND status = 'approved'
          AND is_deleted = 0
          AND start_date <= ?
          AND end_date >= ?
        "#,
    )
    .bind(employee_id)
    .bind(to)
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(ranges)
}

/// Fetch raw rows for a range and classify each one exactly once. Day
/// flags are resolved here, never stored on the row: holidays come from
/// the calendar cache, leave cover from the approved leave table, weekends
/// from the date itself.
pub(crate) async fn classified_range(
    pool: &MySqlPool,
    employee_id: u64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(Vec<AttendanceDayView>, ShiftRules), ApiError> {
    let rules = shift_rules_for(pool, employee_id).await?;
    let leaves = approved_leave_ranges(pool, employee_id, from, to).await?;

    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE employee_id = ? AND date BETWEEN ? AND ? AND is_deleted = 0 \
         ORDER BY date"
    );
    let records = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;

    let mut views = Vec::with_capacity(records.len());
    for record in &records {
        let ctx = DayContext {
            is_weekend: classifier::is_weekend(record.date),
            is_holiday: holiday_cache::holiday_name(pool, record.date).await?.is_some(),
            has_approved_leave: leaves
                .iter()
                .any(|(start, end)| *start <= record.date && record.date <= *end),
            work_from_home: record.work_from_home,
        };
        views.push(AttendanceDayView::build(record, &rules, &ctx));
    }

    Ok((views, rules))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.require_employee_link()?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in)
        VALUES (?, CURDATE(), CURTIME())
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(ApiError::Database(e))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully"),
        (status = 400, description = "No active check-in found for today"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = auth.require_employee_link()?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME()
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        AND is_deleted = 0
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        ApiError::Database(e)
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

#[derive(Deserialize, ToSchema)]
pub struct ManualEntry {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:30:00", nullable = true)]
    pub check_in: Option<String>,
    #[schema(example = "17:00:00", nullable = true)]
    pub check_out: Option<String>,
    pub work_from_home: Option<bool>,
}

fn parse_entry_time(raw: &Option<String>, field: &str) -> Result<Option<NaiveTime>, ApiError> {
    match raw {
        None => Ok(None),
        Some(s) => parse_clock(s)
            .map(Some)
            .ok_or_else(|| ApiError::Validation(format!("{} is not a valid time", field))),
    }
}

/// Administrator-entered attendance, outside the device flow. Times land
/// with the manual flag set so classification reports them as such.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/manual",
    request_body = ManualEntry,
    responses(
        (status = 200, description = "Attendance recorded"),
        (status = 400, description = "Invalid time value"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn manual_entry(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ManualEntry>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    let check_in = parse_entry_time(&payload.check_in, "check_in")?;
    let check_out = parse_entry_time(&payload.check_out, "check_out")?;

    if check_in.is_none() && check_out.is_none() && payload.work_from_home.is_none() {
        return Err(ApiError::Validation(
            "Nothing to record: provide check_in, check_out or work_from_home".into(),
        ));
    }

    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance \
         WHERE employee_id = ? AND date = ? AND is_deleted = 0"
    );
    let existing = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(payload.employee_id)
        .bind(payload.date)
        .fetch_optional(pool.get_ref())
        .await?;

    match existing {
        Some(record) => {
            sqlx::query(
                r#"
                UPDATE attendance
                SET check_in = ?, check_out = ?,
                    manual_check_in = ?, manual_check_out = ?,
                    work_from_home = ?
                WHERE id = ?
                "#,
            )
            .bind(check_in.or(record.check_in))
            .bind(check_out.or(record.check_out))
            .bind(check_in.is_some() || record.manual_check_in)
            .bind(check_out.is_some() || record.manual_check_out)
            .bind(payload.work_from_home.unwrap_or(record.work_from_home))
            .bind(record.id)
            .execute(pool.get_ref())
            .await?;
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO attendance
                    (employee_id, date, check_in, check_out,
                     manual_check_in, manual_check_out, work_from_home)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(payload.employee_id)
            .bind(payload.date)
            .bind(check_in)
            .bind(check_out)
            .bind(check_in.is_some())
            .bind(check_out.is_some())
            .bind(payload.work_from_home.unwrap_or(false))
            .execute(pool.get_ref())
            .await?;
        }
    }

    tracing::info!(
        employee_id = payload.employee_id,
        date = %payload.date,
        actor = auth.user_id,
        "Manual attendance entry recorded"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance recorded"
    })))
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1000)]
    /// Employee whose records to list; employees may omit it
    pub employee_id: Option<u64>,
    #[schema(example = "2026-08-01", value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-08-31", value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceDayView>,
    #[schema(value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to: NaiveDate,
}

/// Classified attendance listing for one employee over a date range.
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Classified attendance rows", body = AttendanceListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;
    let employee_id = auth.employee_scope(query.employee_id)?;

    let to = query.to.unwrap_or_else(|| Local::now().date_naive());
    let from = query.from.unwrap_or_else(|| to - Duration::days(29));
    if from > to {
        return Err(ApiError::Validation("from cannot be after to".into()));
    }

    let (data, _) = classified_range(pool.get_ref(), employee_id, from, to).await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, from, to }))
}
