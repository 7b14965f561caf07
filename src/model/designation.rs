use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Designation {
    pub id: u64,
    #[schema(example = "Senior Engineer")]
    pub title: String,
}
