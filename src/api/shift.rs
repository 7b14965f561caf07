use crate::auth::auth::AuthUser;
use crate::classifier::parse_clock;
use crate::error::ApiError;
use crate::model::shift::Shift;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateShift {
    #[schema(example = "Day shift")]
    pub name: String,
    #[schema(example = "09:00:00")]
    pub start_time: String,
    #[schema(example = "17:00:00")]
    pub end_time: String,
    #[schema(example = 10)]
    pub grace_minutes: i32,
    #[schema(example = 30)]
    pub early_leave_minutes: i32,
    #[schema(example = 4.0)]
    pub half_day_hours: f64,
}

#[utoipa::path(
    post,
    path = "/api/v1/shifts",
    request_body = CreateShift,
    responses(
        (status = 200, description = "Shift created"),
        (status = 400, description = "Invalid shift parameters"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn create_shift(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateShift>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    let start_time = parse_clock(&payload.start_time)
        .ok_or_else(|| ApiError::Validation("start_time is not a valid time".into()))?;
    let end_time = parse_clock(&payload.end_time)
        .ok_or_else(|| ApiError::Validation("end_time is not a valid time".into()))?;

    if end_time <= start_time {
        return Err(ApiError::Validation(
            "end_time must be after start_time".into(),
        ));
    }
    if payload.grace_minutes < 0 || payload.early_leave_minutes < 0 {
        return Err(ApiError::Validation(
            "grace_minutes and early_leave_minutes must not be negative".into(),
        ));
    }
    if payload.half_day_hours < 0.0 {
        return Err(ApiError::Validation(
            "half_day_hours must not be negative".into(),
        ));
    }

    sqlx::query(
        r#"
        INSERT INTO shifts
            (name, start_time, end_time, grace_minutes, early_leave_minutes, half_day_hours)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(start_time)
    .bind(end_time)
    .bind(payload.grace_minutes)
    .bind(payload.early_leave_minutes)
    .bind(payload.half_day_hours)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Shift created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/shifts",
    responses(
        (status = 200, description = "All shifts", body = [Shift]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Shift"
)]
pub async fn list_shifts(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let shifts = sqlx::query_as::<_, Shift>(
        r#"
        SELECT id, name, start_time, end_time, grace_minutes, early_leave_minutes, half_day_hours
        FROM shifts
        WHERE is_deleted = 0
        ORDER BY name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(shifts))
}
