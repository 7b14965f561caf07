use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::department::Department;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 200, description = "Department created"),
        (status = 400),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> Result<HttpResponse, ApiError> {
    auth.require_edit()?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }

    sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Department created"
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> Result<impl Responder, ApiError> {
    auth.require_view()?;

    let departments = sqlx::query_as::<_, Department>(
        "SELECT id, name FROM departments WHERE is_deleted = 0 ORDER BY name",
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(departments))
}
