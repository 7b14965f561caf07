use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use crate::classifier::{DayStatus, ShiftRules, round2};
use crate::error::ApiError;
use crate::model::attendance::AttendanceDayView;

/// Placeholder rendered for any missing cell in an export. Attendance data
/// comes from a device feed and is routinely partial.
const PLACEHOLDER: &str = "—";

/// Aggregate counters over one employee's date range.
///
/// All integer counters are additive, so summaries over disjoint sub-ranges
/// sum to the summary of the whole range. actual_work_hours skips days with
/// no measurable span; measured_work_days counts the days that did
/// contribute, so averages are never computed against skipped nulls.
#[derive(Debug, Default, PartialEq, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub total_days: u32,
    pub working_days: u32,
    pub present_days: u32,
    pub absent_days: u32,
    pub leave_days: u32,
    pub weekend_attendance_days: u32,
    pub work_from_home_days: u32,
    pub on_time_check_ins: u32,
    pub late_check_ins: u32,
    pub overtime_check_outs: u32,
    pub measured_work_days: u32,
    pub expected_work_hours: f64,
    pub actual_work_hours: f64,
}

/// Single-pass reduction of classified day records into summary counters.
pub fn summarize(
    records: &[AttendanceDayView],
    rules: &ShiftRules,
    from: NaiveDate,
    to: NaiveDate,
) -> AttendanceSummary {
    let mut summary = AttendanceSummary {
        total_days: ((to - from).num_days() + 1).max(0) as u32,
        ..Default::default()
    };

    for day in records {
        if !day.weekend && !day.holiday {
            summary.working_days += 1;
        }

        match day.day_status {
            DayStatus::Present if day.weekend => summary.weekend_attendance_days += 1,
            DayStatus::Present => summary.present_days += 1,
            DayStatus::Absent => summary.absent_days += 1,
            DayStatus::Leave => summary.leave_days += 1,
            DayStatus::WorkFromHome => summary.work_from_home_days += 1,
            DayStatus::Weekend | DayStatus::Holiday => {}
        }

        match day.check_in_status {
            Some(crate::classifier::CheckInStatus::OnTime) => summary.on_time_check_ins += 1,
            Some(crate::classifier::CheckInStatus::Late) => summary.late_check_ins += 1,
            _ => {}
        }

        if day.check_out_status == Some(crate::classifier::CheckOutStatus::Overtime) {
            summary.overtime_check_outs += 1;
        }

        if let Some(hours) = day.work_hours {
            summary.actual_work_hours += hours;
            summary.measured_work_days += 1;
        }
    }

    summary.expected_work_hours =
        round2(summary.working_days as f64 * rules.shift_duration_hours());
    summary.actual_work_hours = round2(summary.actual_work_hours);

    summary
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Render the detail rows and summary block as a CSV workbook.
pub fn to_spreadsheet(
    summary: &AttendanceSummary,
    details: &[AttendanceDayView],
) -> Result<Vec<u8>, ApiError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "Date",
            "Check In",
            "Check Out",
            "Check In Status",
            "Check Out Status",
            "Day Status",
            "Work Hours",
        ])
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    for day in details {
        writer
            .write_record([
                day.date.to_string(),
                cell(&day.check_in),
                cell(&day.check_out),
                cell(&day.check_in_status),
                cell(&day.check_out_status),
                day.day_status.to_string(),
                cell(&day.work_hours),
            ])
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    let totals: [(&str, String); 13] = [
        ("Total Days", summary.total_days.to_string()),
        ("Working Days", summary.working_days.to_string()),
        ("Present Days", summary.present_days.to_string()),
        ("Absent Days", summary.absent_days.to_string()),
        ("Leave Days", summary.leave_days.to_string()),
        (
            "Weekend Attendance",
            summary.weekend_attendance_days.to_string(),
        ),
        ("Work From Home", summary.work_from_home_days.to_string()),
        ("On Time Check-ins", summary.on_time_check_ins.to_string()),
        ("Late Check-ins", summary.late_check_ins.to_string()),
        ("Overtime Check-outs", summary.overtime_check_outs.to_string()),
        ("Measured Work Days", summary.measured_work_days.to_string()),
        ("Expected Work Hours", summary.expected_work_hours.to_string()),
        ("Actual Work Hours", summary.actual_work_hours.to_string()),
    ];

    writer
        .write_record(["", "", "", "", "", "", ""])
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    for (label, value) in totals {
        writer
            .write_record([label, value.as_str(), "", "", "", "", ""])
            .map_err(|e| ApiError::Internal(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{CheckInStatus, CheckOutStatus};
    use chrono::NaiveTime;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn view(day: u32, status: DayStatus, weekend: bool) -> AttendanceDayView {
        AttendanceDayView {
            id: day as u64,
            employee_id: 1000,
            date: date(day),
            check_in: None,
            check_out: None,
            check_in_status: None,
            check_out_status: None,
            day_status: status,
            work_hours: None,
            weekend,
            holiday: false,
        }
    }

    #[test]
    fn five_day_week_counts() {
        // Mon-Wed present, Thu absent, Sat weekend without check-in.
        let records = vec![
            view(3, DayStatus::Present, false),
            view(4, DayStatus::Present, false),
            view(5, DayStatus::Present, false),
            view(6, DayStatus::Absent, false),
            view(8, DayStatus::Weekend, true),
        ];

        let summary = summarize(&records, &ShiftRules::default(), date(3), date(7));
        assert_eq!(summary.total_days, 5);
        assert_eq!(summary.present_days, 3);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.weekend_attendance_days, 0);
        assert_eq!(summary.working_days, 4);
    }

    #[test]
    fn weekend_check_in_tallies_separately_from_present() {
        let mut weekend_day = view(8, DayStatus::Present, true);
        weekend_day.check_in = Some(t(10, 0));

        let summary = summarize(
            &[weekend_day],
            &ShiftRules::default(),
            date(8),
            date(8),
        );
        assert_eq!(summary.present_days, 0);
        assert_eq!(summary.weekend_attendance_days, 1);
        assert_eq!(summary.working_days, 0);
    }

    #[test]
    fn hours_skip_nulls_without_conflating_sum_and_average() {
        let mut a = view(3, DayStatus::Present, false);
        a.work_hours = Some(8.0);
        let mut b = view(4, DayStatus::Present, false);
        b.work_hours = None;
        let mut c = view(5, DayStatus::Present, false);
        c.work_hours = Some(7.5);

        let summary = summarize(&[a, b, c], &ShiftRules::default(), date(3), date(5));
        assert_eq!(summary.actual_work_hours, 15.5);
        // The null day is skipped from the measured count, not counted as zero.
        assert_eq!(summary.measured_work_days, 2);
    }

    #[test]
    fn expected_hours_follow_working_days() {
        let records = vec![
            view(3, DayStatus::Present, false),
            view(4, DayStatus::Absent, false),
        ];
        let summary = summarize(&records, &ShiftRules::default(), date(3), date(4));
        // Two working days on an eight hour shift.
        assert_eq!(summary.expected_work_hours, 16.0);
    }

    #[test]
    fn counters_are_additive_over_partitions() {
        let mut records = Vec::new();
        for day in 3..=12 {
            let mut v = view(
                day,
                if day % 3 == 0 {
                    DayStatus::Absent
                } else {
                    DayStatus::Present
                },
                matches!(day, 8 | 9),
            );
            if day % 2 == 0 {
                v.work_hours = Some(8.0);
                v.check_in_status = Some(CheckInStatus::OnTime);
            } else {
                v.check_in_status = Some(CheckInStatus::Late);
                v.check_out_status = Some(CheckOutStatus::Overtime);
            }
            records.push(v);
        }

        let rules = ShiftRules::default();
        let whole = summarize(&records, &rules, date(3), date(12));
        let left = summarize(&records[..5], &rules, date(3), date(7));
        let right = summarize(&records[5..], &rules, date(8), date(12));

        assert_eq!(whole.total_days, left.total_days + right.total_days);
        assert_eq!(whole.working_days, left.working_days + right.working_days);
        assert_eq!(whole.present_days, left.present_days + right.present_days);
        assert_eq!(whole.absent_days, left.absent_days + right.absent_days);
        assert_eq!(
            whole.weekend_attendance_days,
            left.weekend_attendance_days + right.weekend_attendance_days
        );
        assert_eq!(
            whole.on_time_check_ins,
            left.on_time_check_ins + right.on_time_check_ins
        );
        assert_eq!(
            whole.late_check_ins,
            left.late_check_ins + right.late_check_ins
        );
        assert_eq!(
            whole.overtime_check_outs,
            left.overtime_check_outs + right.overtime_check_outs
        );
        assert_eq!(
            whole.measured_work_days,
            left.measured_work_days + right.measured_work_days
        );
        assert_eq!(
            whole.actual_work_hours,
            round2(left.actual_work_hours + right.actual_work_hours)
        );
    }

    #[test]
    fn presence_counters_never_exceed_range() {
        let records = vec![
            view(3, DayStatus::Present, false),
            view(4, DayStatus::Leave, false),
            view(5, DayStatus::Absent, false),
        ];
        let summary = summarize(&records, &ShiftRules::default(), date(3), date(7));
        assert!(summary.present_days + summary.absent_days + summary.leave_days <= summary.total_days);
    }

    #[test]
    fn spreadsheet_renders_placeholder_for_missing_cells() {
        let summary = AttendanceSummary::default();
        let rows = vec![view(3, DayStatus::Absent, false)];

        let bytes = to_spreadsheet(&summary, &rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains(PLACEHOLDER));
        assert!(text.contains("2026-08-03"));
        assert!(text.contains("Total Days"));
    }
}
