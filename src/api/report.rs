use crate::api::attendance::classified_range;
use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::AttendanceDayView;
use crate::report::{AttendanceSummary, summarize, to_spreadsheet};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ReportQuery {
    #[schema(example = 1000)]
    /// Employee the report covers; employees may omit it
    pub employee_id: Option<u64>,
    #[schema(example = "2026-08-01", value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-08-31", value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceReport {
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub from: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to: NaiveDate,
    pub summary: AttendanceSummary,
    pub records: Vec<AttendanceDayView>,
}

/// Current month by default, matching the report screen's initial view.
fn resolve_range(query: &ReportQuery) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let today = Local::now().date_naive();
    let from = query
        .from
        .unwrap_or_else(|| today.with_day(1).unwrap_or(today));
    let to = query.to.unwrap_or(today);

    if from > to {
        return Err(ApiError::Validation("from cannot be after to".into()));
    }

    Ok((from, to))
}

async fn build_report(
    pool: &MySqlPool,
    employee_id: u64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<AttendanceReport, ApiError> {
    let (records, rules) = classified_range(pool, employee_id, from, to).await?;
    let summary = summarize(&records, &rules, from, to);

    Ok(AttendanceReport {
        employee_id,
        from,
        to,
        summary,
        records,
    })
}

/// Attendance summary plus the classified day rows behind it.
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance",
    params(ReportQuery),
    responses(
        (status = 200, description = "Attendance report", body = AttendanceReport),
        (status = 400, description = "Invalid range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;
    let employee_id = auth.employee_scope(query.employee_id)?;
    let (from, to) = resolve_range(&query)?;

    let report = build_report(pool.get_ref(), employee_id, from, to).await?;

    Ok(HttpResponse::Ok().json(report))
}

/// Same report rendered as a CSV download.
#[utoipa::path(
    get,
    path = "/api/v1/reports/attendance/export",
    params(ReportQuery),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 400, description = "Invalid range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Report"
)]
pub async fn export_attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_view()?;
    let employee_id = auth.employee_scope(query.employee_id)?;
    let (from, to) = resolve_range(&query)?;

    let report = build_report(pool.get_ref(), employee_id, from, to).await?;
    let bytes = to_spreadsheet(&report.summary, &report.records)?;

    let filename = format!("attendance-{}-{}-{}.csv", employee_id, from, to);

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}
