use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::designation::Designation;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDesignation {
    #[schema(example = "Senior Engineer")]
    pub title: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/designations",
    request_body = CreateDesignation,
    responses(
        (status = 200, description = "Designation created"),
        (status = 400),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn create_designation(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDesignation>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }

    sqlx::query("INSERT INTO designations (title) VALUES (?)")
        .bind(payload.title.trim())
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Designation created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/designations",
    responses(
        (status = 200, description = "All designations", body = [Designation]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Designation"
)]
pub async fn list_designations(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let designations = sqlx::query_as::<_, Designation>(
        "SELECT id, title FROM designations WHERE is_deleted = 0 ORDER BY title",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(designations))
}
