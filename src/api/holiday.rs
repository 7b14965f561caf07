use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::holiday::Holiday;
use crate::utils::holiday_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2026-12-16", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Victory Day")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 200, description = "Holiday created"),
        (status = 400),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }

    sqlx::query("INSERT INTO holidays (date, name) VALUES (?, ?)")
        .bind(payload.date)
        .bind(name)
        .execute(pool.get_ref())
        .await?;

    // Day classification reads through the calendar cache
    holiday_cache::mark(payload.date, Some(name.to_string())).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/holidays",
    responses(
        (status = 200, description = "All holidays", body = [Holiday]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let holidays = sqlx::query_as::<_, Holiday>(
        "SELECT id, date, name FROM holidays WHERE is_deleted = 0 ORDER BY date",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(holidays))
}

#[utoipa::path(
    delete,
    path = "/api/v1/holidays/{holiday_id}",
    params(("holiday_id" = u64, Path, description = "Holiday ID")),
    responses(
        (status = 200, description = "Holiday removed"),
        (status = 404, description = "Holiday not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    auth.require_delete()?;

    let holiday_id = path.into_inner();

    let date: Option<NaiveDate> =
        sqlx::query_scalar("SELECT date FROM holidays WHERE id = ? AND is_deleted = 0")
            .bind(holiday_id)
            .fetch_optional(pool.get_ref())
            .await?;

    let date = date.ok_or(ApiError::NotFound("Holiday"))?;

    sqlx::query("UPDATE holidays SET is_deleted = 1 WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await?;

    holiday_cache::mark(date, None).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday removed"
    })))
}
