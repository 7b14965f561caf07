use crate::api::ReviewBody;
use crate::api::attendance::{AttendanceListResponse, AttendanceQuery, ManualEntry};
use crate::api::complaint::{ComplaintFilter, ComplaintListResponse, CreateComplaint};
use crate::api::correction::{CorrectionFilter, CorrectionListResponse, CreateCorrection};
use crate::api::department::CreateDepartment;
use crate::api::designation::CreateDesignation;
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::holiday::CreateHoliday;
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, LeaveType};
use crate::api::report::{AttendanceReport, ReportQuery};
use crate::api::shift::CreateShift;
use crate::classifier::{CheckInStatus, CheckOutStatus, DayStatus};
use crate::model::attendance::AttendanceDayView;
use crate::model::department::Department;
use crate::model::designation::Designation;
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::request::{AssetComplaint, CorrectionRequest, LeaveRequest};
use crate::model::role::Capabilities;
use crate::model::shift::Shift;
use crate::report::AttendanceSummary;
use crate::workflow::{ComplaintStatus, CorrectionStatus, LeaveStatus};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Workforce Attendance API",
        version = "1.0.0",
        description = r#"
## Workforce attendance and approval service

This API manages employee attendance and the review workflows built on top of it.

### Key Features
- **Attendance**
  - Device check-in / check-out, administrator manual entry
  - Derived check-in, check-out and day status per record
- **Correction Requests**
  - Employees contest recorded times; reviewers verify, resolve or reject
- **Leave Management**
  - Apply for leave, approve or reject with remarks
- **Asset Complaints**
  - Report faulty equipment, resolve or reject with remarks
- **Reports**
  - Per-employee summaries over a date range, CSV export

### Security
Endpoints are protected with **JWT Bearer authentication**. Review actions
require **Admin** or **HR** capabilities; employees are scoped to their own
records.

### Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::correction::correction_list,
        crate::api::correction::get_correction,
        crate::api::correction::create_correction,
        crate::api::correction::start_progress,
        crate::api::correction::resolve_correction,
        crate::api::correction::reject_correction,

        crate::api::complaint::complaint_list,
        crate::api::complaint::get_complaint,
        crate::api::complaint::create_complaint,
        crate::api::complaint::resolve_complaint,
        crate::api::complaint::reject_complaint,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::manual_entry,
        crate::api::attendance::list_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,

        crate::api::designation::create_designation,
        crate::api::designation::list_designations,

        crate::api::shift::create_shift,
        crate::api::shift::list_shifts,

        crate::api::holiday::create_holiday,
        crate::api::holiday::list_holidays,
        crate::api::holiday::delete_holiday,

        crate::api::report::attendance_report,
        crate::api::report::export_attendance_report
    ),
    components(
        schemas(
            ReviewBody,
            LeaveType,
            LeaveFilter,
            CreateLeave,
            LeaveRequest,
            LeaveListResponse,
            LeaveStatus,
            CreateCorrection,
            CorrectionFilter,
            CorrectionRequest,
            CorrectionListResponse,
            CorrectionStatus,
            CreateComplaint,
            ComplaintFilter,
            AssetComplaint,
            ComplaintListResponse,
            ComplaintStatus,
            ManualEntry,
            AttendanceQuery,
            AttendanceDayView,
            AttendanceListResponse,
            CheckInStatus,
            CheckOutStatus,
            DayStatus,
            CreateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse,
            CreateDepartment,
            Department,
            CreateDesignation,
            Designation,
            CreateShift,
            Shift,
            CreateHoliday,
            Holiday,
            ReportQuery,
            AttendanceReport,
            AttendanceSummary,
            Capabilities
        )
    ),
    tags(
        (name = "Leave", description = "Leave request workflow"),
        (name = "Correction", description = "Attendance correction workflow"),
        (name = "Complaint", description = "Asset complaint workflow"),
        (name = "Attendance", description = "Attendance capture and listing"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Designation", description = "Designation management APIs"),
        (name = "Shift", description = "Shift management APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Report", description = "Attendance reporting and export"),
    )
)]
pub struct ApiDoc;
