use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Classification of a single check-in against the employee's shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckInStatus {
    OnTime,
    Late,
    Absent,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckOutStatus {
    OnTime,
    EarlyLeave,
    Overtime,
    HalfDay,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayStatus {
    Present,
    Absent,
    Leave,
    Weekend,
    Holiday,
    WorkFromHome,
}

/// Shift parameters used to classify raw clock times.
#[derive(Debug, Clone, Copy)]
pub struct ShiftRules {
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub grace_minutes: i64,
    pub early_leave_minutes: i64,
    pub half_day_hours: f64,
}

impl Default for ShiftRules {
    fn default() -> Self {
        Self {
            shift_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            shift_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            grace_minutes: 10,
            early_leave_minutes: 30,
            half_day_hours: 4.0,
        }
    }
}

impl ShiftRules {
    /// Nominal length of one working day, in hours to two decimals.
    pub fn shift_duration_hours(&self) -> f64 {
        work_hours(Some(self.shift_start), Some(self.shift_end)).unwrap_or(0.0)
    }
}

/// Calendar flags for one employee-day, resolved before classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayContext {
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub has_approved_leave: bool,
    pub work_from_home: bool,
}

impl DayContext {
    /// A day on which a missing check-in does not mean the employee was absent.
    pub fn is_off_day(&self) -> bool {
        self.is_weekend || self.is_holiday || self.has_approved_leave || self.work_from_home
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Tolerant parse of a device-feed clock string. The feed is partial and
/// occasionally garbled, so a bad value maps to None rather than an error.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

pub fn classify_check_in(
    time: Option<NaiveTime>,
    manual: bool,
    rules: &ShiftRules,
    off_day: bool,
) -> Option<CheckInStatus> {
    let time = match time {
        Some(t) => t,
        None if off_day => return None,
        None => return Some(CheckInStatus::Absent),
    };

    if manual {
        return Some(CheckInStatus::Manual);
    }

    let cutoff = rules.shift_start + Duration::minutes(rules.grace_minutes);
    if time <= cutoff {
        Some(CheckInStatus::OnTime)
    } else {
        Some(CheckInStatus::Late)
    }
}

pub fn classify_check_out(
    time: Option<NaiveTime>,
    check_in: Option<NaiveTime>,
    manual: bool,
    rules: &ShiftRules,
) -> Option<CheckOutStatus> {
    let time = time?;

    if manual {
        return Some(CheckOutStatus::Manual);
    }

    let early_cutoff = rules.shift_end - Duration::minutes(rules.early_leave_minutes);
    if time < early_cutoff {
        return Some(CheckOutStatus::EarlyLeave);
    }

    if time >= rules.shift_end {
        if let Some(worked) = work_hours(check_in, Some(time)) {
            if worked < rules.half_day_hours {
                return Some(CheckOutStatus::HalfDay);
            }
        }
        if time > rules.shift_end {
            return Some(CheckOutStatus::Overtime);
        }
    }

    Some(CheckOutStatus::OnTime)
}

/// Resolve the overall day label. First match wins.
pub fn classify_day(has_check_in: bool, ctx: &DayContext) -> DayStatus {
    if ctx.is_holiday {
        return DayStatus::Holiday;
    }
    if ctx.is_weekend {
        // Weekend attendance still renders as present; summaries tally it
        // separately from regular working days.
        return if has_check_in {
            DayStatus::Present
        } else {
            DayStatus::Weekend
        };
    }
    if ctx.has_approved_leave {
        return DayStatus::Leave;
    }
    if ctx.work_from_home {
        return DayStatus::WorkFromHome;
    }
    if has_check_in {
        DayStatus::Present
    } else {
        DayStatus::Absent
    }
}

/// Hours between check-in and check-out, rounded to two decimals.
///
/// A negative span means clock skew or bad feed data. It is reported as
/// None so the caller can flag the record, never coerced to zero.
pub fn work_hours(check_in: Option<NaiveTime>, check_out: Option<NaiveTime>) -> Option<f64> {
    let seconds = (check_out? - check_in?).num_seconds();
    if seconds < 0 {
        return None;
    }
    Some(round2(seconds as f64 / 3600.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32, s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, s).unwrap()
    }

    fn rules() -> ShiftRules {
        ShiftRules::default()
    }

    #[test]
    fn check_in_within_grace_is_on_time() {
        let status = classify_check_in(Some(t(9, 5, 0)), false, &rules(), false);
        assert_eq!(status, Some(CheckInStatus::OnTime));
    }

    #[test]
    fn check_in_at_grace_boundary_is_on_time() {
        let status = classify_check_in(Some(t(9, 10, 0)), false, &rules(), false);
        assert_eq!(status, Some(CheckInStatus::OnTime));
    }

    #[test]
    fn check_in_after_grace_is_late() {
        let status = classify_check_in(Some(t(9, 15, 0)), false, &rules(), false);
        assert_eq!(status, Some(CheckInStatus::Late));
    }

    #[test]
    fn missing_check_in_on_working_day_is_absent() {
        let status = classify_check_in(None, false, &rules(), false);
        assert_eq!(status, Some(CheckInStatus::Absent));
    }

    #[test]
    fn missing_check_in_on_off_day_is_unclassified() {
        assert_eq!(classify_check_in(None, false, &rules(), true), None);
    }

    #[test]
    fn manual_check_in_overrides_time_comparison() {
        let status = classify_check_in(Some(t(11, 30, 0)), true, &rules(), false);
        assert_eq!(status, Some(CheckInStatus::Manual));
    }

    #[test]
    fn early_check_out_before_threshold() {
        let status = classify_check_out(Some(t(16, 0, 0)), Some(t(9, 0, 0)), false, &rules());
        assert_eq!(status, Some(CheckOutStatus::EarlyLeave));
    }

    #[test]
    fn check_out_inside_threshold_window_is_on_time() {
        let status = classify_check_out(Some(t(16, 45, 0)), Some(t(9, 0, 0)), false, &rules());
        assert_eq!(status, Some(CheckOutStatus::OnTime));
    }

    #[test]
    fn check_out_exactly_at_shift_end_is_on_time() {
        let status = classify_check_out(Some(t(17, 0, 0)), Some(t(9, 0, 0)), false, &rules());
        assert_eq!(status, Some(CheckOutStatus::OnTime));
    }

    #[test]
    fn check_out_after_shift_end_is_overtime() {
        let status = classify_check_out(Some(t(18, 30, 0)), Some(t(9, 0, 0)), false, &rules());
        assert_eq!(status, Some(CheckOutStatus::Overtime));
    }

    #[test]
    fn short_day_past_shift_end_is_half_day() {
        // Checked in very late, left after shift end with under four hours worked.
        let status = classify_check_out(Some(t(17, 10, 0)), Some(t(14, 0, 0)), false, &rules());
        assert_eq!(status, Some(CheckOutStatus::HalfDay));
    }

    #[test]
    fn manual_check_out_overrides_time_comparison() {
        let status = classify_check_out(Some(t(12, 0, 0)), Some(t(9, 0, 0)), true, &rules());
        assert_eq!(status, Some(CheckOutStatus::Manual));
    }

    #[test]
    fn missing_check_out_is_unclassified() {
        assert_eq!(classify_check_out(None, Some(t(9, 0, 0)), false, &rules()), None);
    }

    #[test]
    fn day_resolution_order() {
        let mut ctx = DayContext {
            is_holiday: true,
            is_weekend: true,
            has_approved_leave: true,
            work_from_home: true,
        };
        assert_eq!(classify_day(true, &ctx), DayStatus::Holiday);

        ctx.is_holiday = false;
        assert_eq!(classify_day(false, &ctx), DayStatus::Weekend);
        assert_eq!(classify_day(true, &ctx), DayStatus::Present);

        ctx.is_weekend = false;
        assert_eq!(classify_day(false, &ctx), DayStatus::Leave);

        ctx.has_approved_leave = false;
        assert_eq!(classify_day(false, &ctx), DayStatus::WorkFromHome);

        ctx.work_from_home = false;
        assert_eq!(classify_day(true, &ctx), DayStatus::Present);
        assert_eq!(classify_day(false, &ctx), DayStatus::Absent);
    }

    #[test]
    fn work_hours_round_to_two_decimals() {
        let hours = work_hours(Some(t(9, 0, 0)), Some(t(17, 20, 0)));
        assert_eq!(hours, Some(8.33));
    }

    #[test]
    fn work_hours_null_when_either_side_missing() {
        assert_eq!(work_hours(None, Some(t(17, 0, 0))), None);
        assert_eq!(work_hours(Some(t(9, 0, 0)), None), None);
    }

    #[test]
    fn negative_span_reports_null_not_zero() {
        assert_eq!(work_hours(Some(t(17, 0, 0)), Some(t(9, 0, 0))), None);
    }

    #[test]
    fn parse_clock_accepts_both_feed_formats() {
        assert_eq!(parse_clock("09:05:00"), Some(t(9, 5, 0)));
        assert_eq!(parse_clock(" 18:45 "), Some(t(18, 45, 0)));
    }

    #[test]
    fn parse_clock_rejects_garbage_without_panicking() {
        assert_eq!(parse_clock("25:99"), None);
        assert_eq!(parse_clock("not a time"), None);
        assert_eq!(parse_clock(""), None);
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()));
    }
}
