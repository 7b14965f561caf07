use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::ShiftRules;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Shift {
    pub id: u64,
    #[schema(example = "Day shift")]
    pub name: String,
    #[schema(example = "09:00:00", value_type = String)]
    pub start_time: NaiveTime,
    #[schema(example = "17:00:00", value_type = String)]
    pub end_time: NaiveTime,
    #[schema(example = 10)]
    pub grace_minutes: i32,
    #[schema(example = 30)]
    pub early_leave_minutes: i32,
    #[schema(example = 4.0)]
    pub half_day_hours: f64,
}

impl Shift {
    pub fn rules(&self) -> ShiftRules {
        ShiftRules {
            shift_start: self.start_time,
            shift_end: self.end_time,
            grace_minutes: self.grace_minutes as i64,
            early_leave_minutes: self.early_leave_minutes as i64,
            half_day_hours: self.half_day_hours,
        }
    }
}
