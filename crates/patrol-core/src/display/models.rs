//! Display implementations for domain models.
//!
//! Everything renders as markdown so the CLI can hand it straight to the
//! terminal renderer.

use std::fmt;

use super::datetime::{LocalDateTime, MaybeDateTime};
use crate::{
    engine::{Confirmation, SweepReport},
    models::{Check, CheckStatus, Item, Order, OrderStatus, Plan, Point, Project, Route, User},
};

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn id_list(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;

        writeln!(f, "- Trigger: {}", self.trigger)?;
        writeln!(f, "- Project: {}", self.project_id)?;
        writeln!(f, "- Route: {}", self.route_id)?;
        if let Some(assigner) = self.assigner_id {
            writeln!(f, "- Assigner: {assigner}")?;
        }
        if !self.assignee_ids.is_empty() {
            writeln!(f, "- Assignees: {}", id_list(&self.assignee_ids))?;
        }
        writeln!(
            f,
            "- Last triggered: {}",
            MaybeDateTime(self.last_triggered_at.as_ref())
        )?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Order {} ({})", self.id, self.status.with_icon())?;
        writeln!(f)?;

        writeln!(f, "- Plan: {}", self.plan_id)?;
        writeln!(
            f,
            "- Checks: {}/{}",
            self.completed_checks, self.total_checks
        )?;
        if let Some(assigner) = self.assigner_id {
            writeln!(f, "- Assigner: {assigner}")?;
        }
        if let Some(assignee) = self.assignee_id {
            writeln!(f, "- Assignee: {assignee}")?;
        }
        if let Some(started) = &self.started_at {
            writeln!(f, "- Started: {}", LocalDateTime(started))?;
        }
        if let Some(ended) = &self.ended_at {
            writeln!(f, "- Ended: {}", LocalDateTime(ended))?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;

        if self.status == OrderStatus::Completed {
            if let Some(data) = &self.inspection_data {
                writeln!(f)?;
                writeln!(f, "## Result")?;
                writeln!(f)?;
                writeln!(f, "{data}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- Point {}: {}", self.point_id, self.status.with_icon())?;
        if let Some(comment) = &self.comment {
            write!(f, " ({comment})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id, self.name)?;
        if let Some(location) = &self.location {
            write!(f, " @ {location}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.title)?;
        writeln!(f)?;
        writeln!(f, "- Method: {}", self.execution_method)?;
        if let Some(details) = &self.details {
            writeln!(f)?;
            writeln!(f, "{details}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}. {}", self.id, self.name)?;
        writeln!(f)?;
        writeln!(f, "- Project: {}", self.project_id)?;

        if let Some(desc) = &self.description {
            writeln!(f)?;
            writeln!(f, "{desc}")?;
        }

        if self.points.is_empty() {
            writeln!(f, "\nNo points on this route.")?;
        } else {
            writeln!(f, "\n## Points")?;
            writeln!(f)?;
            for (position, point) in self.points.iter().enumerate() {
                writeln!(f, "{}. {point}", position + 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "# {}. {}", self.id, self.name)?;
        if let Some(parent) = self.parent_id {
            write!(f, " (under {parent})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.project_id {
            Some(project) => writeln!(f, "- {} (ID: {}), project {project}", self.username, self.id),
            None => writeln!(f, "- {} (ID: {}), administrator", self.username, self.id),
        }
    }
}

impl fmt::Display for Confirmation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.check)?;
        if !self.counted {
            writeln!(f, "\nPoint was already confirmed; progress unchanged.")?;
        }
        writeln!(
            f,
            "\nOrder {}: {}/{} checks confirmed",
            self.order.id, self.order.completed_checks, self.order.total_checks
        )
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Sweep at {}", LocalDateTime(&self.at))?;
        writeln!(f)?;
        writeln!(f, "- Evaluated: {}", self.evaluated)?;
        writeln!(f, "- Fired: {}", self.fired.len())?;
        writeln!(f, "- Skipped: {}", self.skipped.len())?;
        writeln!(f, "- Failed: {}", self.failed.len())?;

        if !self.fired.is_empty() {
            writeln!(f, "\n## Fired")?;
            writeln!(f)?;
            for firing in &self.fired {
                writeln!(f, "- Plan {} → order {}", firing.plan_id, firing.order_id)?;
            }
        }
        if !self.failed.is_empty() {
            writeln!(f, "\n## Failed")?;
            writeln!(f)?;
            for failure in &self.failed {
                writeln!(f, "- Plan {}: {}", failure.plan_id, failure.error)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::{
        engine::{Firing, SweepFailure},
        models::{MonthDay, Trigger},
    };

    #[test]
    fn test_item_display() {
        let item = Item {
            id: 8,
            title: "Pressure gauge".to_string(),
            details: Some("Between 2 and 4 bar".to_string()),
            execution_method: "meter reading".to_string(),
        };
        assert_eq!(
            item.to_string(),
            "# 8. Pressure gauge\n\n- Method: meter reading\n\nBetween 2 and 4 bar\n"
        );
    }

    #[test]
    fn test_plan_display() {
        let plan = Plan {
            id: 4,
            name: "Roof check".to_string(),
            project_id: 2,
            route_id: 9,
            trigger: Trigger::Monthly(MonthDay::new(15).unwrap()),
            assigner_id: Some(3),
            assignee_ids: vec![5, 6],
            last_triggered_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };
        let output = plan.to_string();
        assert!(output.starts_with("# 4. Roof check\n"));
        assert!(output.contains("- Trigger: monthly on day 15"));
        assert!(output.contains("- Assignees: 5, 6"));
        assert!(output.contains("- Last triggered: -"));
    }

    #[test]
    fn test_check_display() {
        let check = Check {
            id: 1,
            order_id: 2,
            point_id: 3,
            status: CheckStatus::Failed,
            comment: Some("cracked".to_string()),
            checked_at: None,
        };
        assert_eq!(check.to_string(), "- Point 3: ✗ Failed (cracked)\n");
    }

    #[test]
    fn test_sweep_report_display() {
        let report = SweepReport {
            at: Timestamp::UNIX_EPOCH,
            evaluated: 3,
            fired: vec![Firing {
                plan_id: 1,
                order_id: 10,
            }],
            skipped: vec![],
            failed: vec![SweepFailure {
                plan_id: 2,
                error: "Route with ID 7 not found".to_string(),
            }],
        };
        let output = report.to_string();
        assert!(output.contains("- Fired: 1"));
        assert!(output.contains("- Plan 1 → order 10"));
        assert!(output.contains("- Plan 2: Route with ID 7 not found"));
    }
}
