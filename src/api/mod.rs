use serde::Deserialize;
use utoipa::ToSchema;

pub mod attendance;
pub mod complaint;
pub mod correction;
pub mod department;
pub mod designation;
pub mod employee;
pub mod holiday;
pub mod leave_request;
pub mod report;
pub mod shift;

/// Body shared by every review decision endpoint.
#[derive(Deserialize, ToSchema)]
pub struct ReviewBody {
    #[schema(example = "Verified against the device log")]
    pub remarks: Option<String>,
}
