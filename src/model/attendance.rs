use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::{
    self, CheckInStatus, CheckOutStatus, DayContext, DayStatus, ShiftRules,
};

/// One raw attendance row, exactly as the store holds it. Times may be
/// absent when the employee never touched the device that day. The manual
/// flags mark values entered by an administrator instead of the device.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
    pub manual_check_in: bool,
    pub manual_check_out: bool,
    pub work_from_home: bool,
}

/// An attendance row with its derived labels. The status fields are never
/// stored; they are computed here, once per record, from the raw times and
/// the day's calendar context.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "date": "2026-08-03",
    "check_in": "09:05:00",
    "check_out": "17:42:00",
    "check_in_status": "on_time",
    "check_out_status": "overtime",
    "day_status": "present",
    "work_hours": 8.62,
    "weekend": false,
    "holiday": false
}))]
pub struct AttendanceDayView {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    pub check_in_status: Option<CheckInStatus>,
    pub check_out_status: Option<CheckOutStatus>,
    pub day_status: DayStatus,
    pub work_hours: Option<f64>,
    pub weekend: bool,
    pub holiday: bool,
}

impl AttendanceDayView {
    pub fn build(record: &AttendanceRecord, rules: &ShiftRules, ctx: &DayContext) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_id,
            date: record.date,
            check_in: record.check_in,
            check_out: record.check_out,
            check_in_status: classifier::classify_check_in(
                record.check_in,
                record.manual_check_in,
                rules,
                ctx.is_off_day(),
            ),
            check_out_status: classifier::classify_check_out(
                record.check_out,
                record.check_in,
                record.manual_check_out,
                rules,
            ),
            day_status: classifier::classify_day(record.check_in.is_some(), ctx),
            work_hours: classifier::work_hours(record.check_in, record.check_out),
            weekend: ctx.is_weekend,
            holiday: ctx.is_holiday,
        }
    }
}
