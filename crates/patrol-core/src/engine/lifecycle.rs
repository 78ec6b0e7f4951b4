//! Order state machine.
//!
//! Each transition checks every precondition before touching the order, so
//! a rejected action leaves its arguments exactly as they were. Persisting
//! the result is the caller's job.
//!
//! ```text
//! Pending ──assign──▶ Assigned ──start──▶ InProgress ──complete──▶ Completed
//!                         ▲                  │    ▲
//!   (factory, with        │                  └────┘
//!    default assigner) ───┘                  confirm
//! ```

use jiff::Timestamp;

use crate::{
    error::{InspectionError, Result},
    models::{Check, CheckStatus, Order, OrderStatus},
};

pub(super) fn require_status(order: &Order, expected: OrderStatus, action: &str) -> Result<()> {
    if order.status == expected {
        Ok(())
    } else {
        Err(InspectionError::state_conflict(
            order.id,
            format!(
                "cannot {action} an order that is {}, it must be {}",
                order.status.as_str(),
                expected.as_str()
            ),
        ))
    }
}

/// `Pending → Assigned`, recording who will carry the work out.
///
/// `assigner_id` fills the assigner only when the order has none yet.
pub fn assign(
    order: &mut Order,
    assignee_id: u64,
    assigner_id: Option<u64>,
    now: Timestamp,
) -> Result<()> {
    require_status(order, OrderStatus::Pending, "assign")?;

    order.status = OrderStatus::Assigned;
    order.assignee_id = Some(assignee_id);
    if order.assigner_id.is_none() {
        order.assigner_id = assigner_id;
    }
    order.updated_at = now;
    Ok(())
}

/// `Assigned → InProgress`, stamping the start time.
pub fn start(order: &mut Order, now: Timestamp) -> Result<()> {
    require_status(order, OrderStatus::Assigned, "start")?;

    order.status = OrderStatus::InProgress;
    order.started_at = Some(now);
    order.updated_at = now;
    Ok(())
}

/// Records the outcome of one point.
///
/// Re-confirming a point overwrites its status and comment but is counted
/// once; returns whether this call moved the completed counter.
pub fn confirm(
    order: &mut Order,
    check: &mut Check,
    status: CheckStatus,
    comment: Option<String>,
    now: Timestamp,
) -> Result<bool> {
    require_status(order, OrderStatus::InProgress, "confirm a point on")?;
    if !status.is_confirmed() {
        return Err(InspectionError::invalid_input("status")
            .with_reason("A point can only be confirmed as passed or failed"));
    }
    if check.order_id != order.id {
        return Err(InspectionError::CheckNotFound {
            order_id: order.id,
            point_id: check.point_id,
        });
    }

    let first_confirmation = !check.status.is_confirmed();
    if first_confirmation && order.completed_checks >= order.total_checks {
        return Err(InspectionError::state_conflict(
            order.id,
            "every check is already confirmed",
        ));
    }

    check.status = status;
    check.comment = comment;
    check.checked_at = Some(now);
    if first_confirmation {
        order.completed_checks += 1;
    }
    order.updated_at = now;
    Ok(first_confirmation)
}

/// `InProgress → Completed`, only once every check is confirmed.
pub fn complete(order: &mut Order, inspection_data: String, now: Timestamp) -> Result<()> {
    require_status(order, OrderStatus::InProgress, "complete")?;
    if inspection_data.trim().is_empty() {
        return Err(InspectionError::invalid_input("inspection_data")
            .with_reason("Inspection data cannot be empty"));
    }
    if order.completed_checks < order.total_checks {
        return Err(InspectionError::state_conflict(
            order.id,
            format!(
                "{} of {} checks are still unconfirmed",
                order.remaining_checks(),
                order.total_checks
            ),
        ));
    }

    order.status = OrderStatus::Completed;
    order.ended_at = Some(now);
    order.inspection_data = Some(inspection_data);
    order.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn order(status: OrderStatus, total_checks: u32) -> Order {
        Order {
            id: 1,
            plan_id: 1,
            status,
            assigner_id: None,
            assignee_id: None,
            started_at: None,
            ended_at: None,
            inspection_data: None,
            completed_checks: 0,
            total_checks,
            revision: 0,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn check(point_id: u64) -> Check {
        Check {
            id: point_id + 100,
            order_id: 1,
            point_id,
            status: CheckStatus::Pending,
            comment: None,
            checked_at: None,
        }
    }

    fn later() -> Timestamp {
        Timestamp::from_second(60).unwrap()
    }

    #[test]
    fn test_assign_pending() {
        let mut o = order(OrderStatus::Pending, 0);
        assign(&mut o, 5, Some(2), later()).unwrap();
        assert_eq!(o.status, OrderStatus::Assigned);
        assert_eq!(o.assignee_id, Some(5));
        assert_eq!(o.assigner_id, Some(2));
        assert_eq!(o.updated_at, later());
    }

    #[test]
    fn test_assign_rejected_after_pending() {
        for status in [
            OrderStatus::Assigned,
            OrderStatus::InProgress,
            OrderStatus::Completed,
        ] {
            let mut o = order(status, 0);
            let before = o.clone();
            let err = assign(&mut o, 5, None, later()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::StateConflict);
            assert_eq!(o, before);
        }
    }

    #[test]
    fn test_start_pending_is_conflict_and_unchanged() {
        let mut o = order(OrderStatus::Pending, 2);
        let before = o.clone();
        let err = start(&mut o, later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(o, before);
    }

    #[test]
    fn test_start_assigned() {
        let mut o = order(OrderStatus::Assigned, 2);
        start(&mut o, later()).unwrap();
        assert_eq!(o.status, OrderStatus::InProgress);
        assert_eq!(o.started_at, Some(later()));
    }

    #[test]
    fn test_confirm_counts_each_point_once() {
        let mut o = order(OrderStatus::InProgress, 2);
        let mut c = check(10);

        assert!(confirm(&mut o, &mut c, CheckStatus::Passed, None, later()).unwrap());
        assert_eq!(o.completed_checks, 1);

        let counted = confirm(
            &mut o,
            &mut c,
            CheckStatus::Failed,
            Some("leak found".to_string()),
            later(),
        )
        .unwrap();
        assert!(!counted);
        assert_eq!(o.completed_checks, 1);
        assert_eq!(c.status, CheckStatus::Failed);
        assert_eq!(c.comment.as_deref(), Some("leak found"));
    }

    #[test]
    fn test_confirm_requires_in_progress() {
        let mut o = order(OrderStatus::Assigned, 1);
        let mut c = check(10);
        let err = confirm(&mut o, &mut c, CheckStatus::Passed, None, later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(c.status, CheckStatus::Pending);
        assert_eq!(o.completed_checks, 0);
    }

    #[test]
    fn test_confirm_pending_status_rejected() {
        let mut o = order(OrderStatus::InProgress, 1);
        let mut c = check(10);
        let err = confirm(&mut o, &mut c, CheckStatus::Pending, None, later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(o.completed_checks, 0);
    }

    #[test]
    fn test_confirm_foreign_check() {
        let mut o = order(OrderStatus::InProgress, 1);
        let mut c = check(10);
        c.order_id = 2;
        let err = confirm(&mut o, &mut c, CheckStatus::Passed, None, later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_complete_gated_on_checks() {
        let mut o = order(OrderStatus::InProgress, 3);
        o.completed_checks = 2;
        let before = o.clone();

        let err = complete(&mut o, "all good".to_string(), later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(o, before);

        o.completed_checks = 3;
        complete(&mut o, "all good".to_string(), later()).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
        assert_eq!(o.ended_at, Some(later()));
        assert_eq!(o.inspection_data.as_deref(), Some("all good"));
    }

    #[test]
    fn test_complete_empty_route() {
        let mut o = order(OrderStatus::InProgress, 0);
        complete(&mut o, "nothing to inspect".to_string(), later()).unwrap();
        assert_eq!(o.status, OrderStatus::Completed);
    }

    #[test]
    fn test_complete_requires_data() {
        let mut o = order(OrderStatus::InProgress, 0);
        let err = complete(&mut o, "  ".to_string(), later()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(o.status, OrderStatus::InProgress);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut o = order(OrderStatus::Completed, 0);
        assert!(start(&mut o, later()).is_err());
        assert!(complete(&mut o, "again".to_string(), later()).is_err());
        assert!(assign(&mut o, 1, None, later()).is_err());
    }
}
