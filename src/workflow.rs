use std::fmt::{Debug, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Review lifecycle of a leave request. Leave goes straight from pending
/// to a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Review lifecycle of an attendance correction. Corrections may pass
/// through an intermediate in_progress state while the claim is verified
/// against the device feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CorrectionStatus {
    Pending,
    InProgress,
    Resolved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplaintStatus {
    Pending,
    Resolved,
    Rejected,
}

pub trait WorkflowStatus: Copy + Eq + Display + FromStr + Debug {
    fn is_terminal(self) -> bool;
    fn allows(self, target: Self) -> bool;
}

impl WorkflowStatus for LeaveStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }

    fn allows(self, target: Self) -> bool {
        matches!(
            (self, target),
            (LeaveStatus::Pending, LeaveStatus::Approved)
                | (LeaveStatus::Pending, LeaveStatus::Rejected)
        )
    }
}

impl WorkflowStatus for CorrectionStatus {
    fn is_terminal(self) -> bool {
        matches!(self, CorrectionStatus::Resolved | CorrectionStatus::Rejected)
    }

    fn allows(self, target: Self) -> bool {
        matches!(
            (self, target),
            (CorrectionStatus::Pending, CorrectionStatus::InProgress)
                | (CorrectionStatus::Pending, CorrectionStatus::Resolved)
                | (CorrectionStatus::Pending, CorrectionStatus::Rejected)
                | (CorrectionStatus::InProgress, CorrectionStatus::Resolved)
                | (CorrectionStatus::InProgress, CorrectionStatus::Rejected)
        )
    }
}

impl WorkflowStatus for ComplaintStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, ComplaintStatus::Pending)
    }

    fn allows(self, target: Self) -> bool {
        matches!(
            (self, target),
            (ComplaintStatus::Pending, ComplaintStatus::Resolved)
                | (ComplaintStatus::Pending, ComplaintStatus::Rejected)
        )
    }
}

/// Table binding for one workflow, so the transition code stays generic.
pub struct FlowTable {
    pub table: &'static str,
    pub label: &'static str,
}

pub const LEAVE_FLOW: FlowTable = FlowTable {
    table: "leave_requests",
    label: "Leave request",
};

pub const CORRECTION_FLOW: FlowTable = FlowTable {
    table: "correction_requests",
    label: "Correction request",
};

pub const COMPLAINT_FLOW: FlowTable = FlowTable {
    table: "asset_complaints",
    label: "Asset complaint",
};

/// Collapse internal whitespace runs and trim both ends.
pub fn normalize_remarks(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate one transition and, for terminal targets, produce the remarks
/// value to persist.
///
/// Reviewers sometimes start typing with a space; the input is normalized
/// and only rejected when nothing is left after that.
pub fn validate_transition<S: WorkflowStatus>(
    current: S,
    target: S,
    remarks: &str,
) -> Result<Option<String>, ApiError> {
    if current.is_terminal() {
        return Err(ApiError::AlreadyFinalized);
    }

    if !current.allows(target) {
        return Err(ApiError::InvalidStateTransition {
            from: current.to_string(),
            to: target.to_string(),
        });
    }

    if !target.is_terminal() {
        return Ok(None);
    }

    if remarks.starts_with(|c: char| c.is_whitespace()) && !remarks.trim().is_empty() {
        tracing::warn!("Remarks submitted with leading whitespace, normalizing");
    }

    let normalized = normalize_remarks(remarks);
    if normalized.is_empty() {
        return Err(ApiError::MissingRemarks);
    }

    Ok(Some(normalized))
}

/// Apply a reviewed transition to the store.
///
/// The row is re-read and the update is conditioned on the status we read,
/// so a concurrent reviewer losing the race gets a conflict back instead of
/// a silent double apply. reviewed_by and reviewed_at are written exactly
/// once, on the terminal transition.
pub async fn apply_transition<S: WorkflowStatus>(
    pool: &MySqlPool,
    flow: &FlowTable,
    record_id: u64,
    actor_id: u64,
    target: S,
    remarks: &str,
) -> Result<(), ApiError> {
    let select = format!(
        "SELECT status FROM {} WHERE id = ? AND is_deleted = 0",
        flow.table
    );
    let raw: Option<String> = sqlx::query_scalar(&select)
        .bind(record_id)
        .fetch_optional(pool)
        .await?;

    let raw = raw.ok_or(ApiError::NotFound(flow.label))?;
    let current: S = raw.parse().map_err(|_| {
        ApiError::Internal(format!(
            "unrecognized status '{}' on {} {}",
            raw, flow.label, record_id
        ))
    })?;

    let normalized = validate_transition(current, target, remarks)?;

    let affected = match &normalized {
        Some(remarks) => {
            let update = format!(
                "UPDATE {} \
                 SET status = ?, remarks = ?, reviewed_by = ?, reviewed_at = NOW() \
                 WHERE id = ? AND status = ? AND is_deleted = 0",
                flow.table
            );
            sqlx::query(&update)
                .bind(target.to_string())
                .bind(remarks)
                .bind(actor_id)
                .bind(record_id)
                .bind(current.to_string())
                .execute(pool)
                .await?
                .rows_affected()
        }
        None => {
            let update = format!(
                "UPDATE {} SET status = ? WHERE id = ? AND status = ? AND is_deleted = 0",
                flow.table
            );
            sqlx::query(&update)
                .bind(target.to_string())
                .bind(record_id)
                .bind(current.to_string())
                .execute(pool)
                .await?
                .rows_affected()
        }
    };

    if affected == 0 {
        // Another reviewer moved the row after our read. Propagate, never retry.
        return Err(ApiError::AlreadyFinalized);
    }

    tracing::info!(
        record_id,
        actor_id,
        target = %target,
        table = flow.table,
        "Request transitioned"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_pending_can_be_approved_or_rejected() {
        for target in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            let result = validate_transition(LeaveStatus::Pending, target, "ok by manager");
            assert_eq!(result.unwrap(), Some("ok by manager".to_string()));
        }
    }

    #[test]
    fn terminal_leave_rejects_any_further_transition() {
        for current in [LeaveStatus::Approved, LeaveStatus::Rejected] {
            for target in [LeaveStatus::Pending, LeaveStatus::Approved, LeaveStatus::Rejected] {
                let result = validate_transition(current, target, "again");
                assert!(matches!(result, Err(ApiError::AlreadyFinalized)));
            }
        }
    }

    #[test]
    fn blank_remarks_fail_every_terminal_target() {
        assert!(matches!(
            validate_transition(LeaveStatus::Pending, LeaveStatus::Approved, "   "),
            Err(ApiError::MissingRemarks)
        ));
        assert!(matches!(
            validate_transition(CorrectionStatus::Pending, CorrectionStatus::Resolved, ""),
            Err(ApiError::MissingRemarks)
        ));
        assert!(matches!(
            validate_transition(ComplaintStatus::Pending, ComplaintStatus::Rejected, " \t "),
            Err(ApiError::MissingRemarks)
        ));
    }

    #[test]
    fn leading_whitespace_is_normalized_not_rejected() {
        let result =
            validate_transition(LeaveStatus::Pending, LeaveStatus::Rejected, "  Insufficient  evidence ");
        assert_eq!(result.unwrap(), Some("Insufficient evidence".to_string()));
    }

    #[test]
    fn correction_may_pass_through_in_progress() {
        let step = validate_transition(
            CorrectionStatus::Pending,
            CorrectionStatus::InProgress,
            "",
        );
        // No remarks required for the intermediate state.
        assert_eq!(step.unwrap(), None);

        let done = validate_transition(
            CorrectionStatus::InProgress,
            CorrectionStatus::Resolved,
            "verified against device log",
        );
        assert_eq!(done.unwrap(), Some("verified against device log".to_string()));
    }

    #[test]
    fn in_progress_cannot_go_back_to_pending() {
        let result = validate_transition(
            CorrectionStatus::InProgress,
            CorrectionStatus::Pending,
            "undo",
        );
        assert!(matches!(
            result,
            Err(ApiError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn self_transition_is_invalid() {
        let result = validate_transition(LeaveStatus::Pending, LeaveStatus::Pending, "");
        assert!(matches!(
            result,
            Err(ApiError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn status_strings_round_trip_through_the_store() {
        assert_eq!(CorrectionStatus::InProgress.to_string(), "in_progress");
        assert_eq!("in_progress".parse::<CorrectionStatus>().unwrap(), CorrectionStatus::InProgress);
        assert_eq!("approved".parse::<LeaveStatus>().unwrap(), LeaveStatus::Approved);
        assert!("cancelled".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn normalize_collapses_internal_runs() {
        assert_eq!(normalize_remarks("  a \t b\n c  "), "a b c");
        assert_eq!(normalize_remarks("   "), "");
    }
}
