//! Collection wrapper types for displaying lists of plans, orders, checks and
//! inspection items.
//!
//! Lists print one line per item rather than the full markdown record, and
//! print a short notice when empty.

use std::{fmt, ops::Index};

use crate::models::{Check, Item, Order, Plan};

/// Newtype wrapper for displaying a list of plans.
///
/// # Examples
///
/// ```rust
/// use jiff::Timestamp;
/// use patrol_core::{
///     display::Plans,
///     models::{Plan, Trigger},
/// };
///
/// let plan = Plan {
///     id: 1,
///     name: "Boiler room".to_string(),
///     project_id: 1,
///     route_id: 2,
///     trigger: Trigger::Manual,
///     assigner_id: None,
///     assignee_ids: vec![],
///     last_triggered_at: None,
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
/// };
///
/// let output = Plans(vec![plan]).to_string();
/// assert!(output.contains("Boiler room"));
/// assert_eq!(Plans(vec![]).to_string(), "No plans found.\n");
/// ```
pub struct Plans(pub Vec<Plan>);

impl Plans {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Plan> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Plan> {
        self.0.iter()
    }
}

impl Index<usize> for Plans {
    type Output = Plan;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Plans {
    type Item = Plan;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Plans {
    type Item = &'a Plan;
    type IntoIter = std::slice::Iter<'a, Plan>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Plans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No plans found.");
        }
        for plan in &self.0 {
            writeln!(
                f,
                "- **{}. {}** ({}), project {}, route {}",
                plan.id, plan.name, plan.trigger, plan.project_id, plan.route_id
            )?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying a list of orders.
pub struct Orders(pub Vec<Order>);

impl Orders {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Order> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Order> {
        self.0.iter()
    }
}

impl Index<usize> for Orders {
    type Output = Order;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Orders {
    type Item = Order;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Orders {
    type Item = &'a Order;
    type IntoIter = std::slice::Iter<'a, Order>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Orders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No orders found.");
        }
        for order in &self.0 {
            writeln!(
                f,
                "- **Order {}** from plan {}: {}, {}/{} checks",
                order.id,
                order.plan_id,
                order.status.with_icon(),
                order.completed_checks,
                order.total_checks
            )?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying the checks of one order.
///
/// Each check is rendered with its own [`Display`](fmt::Display)
/// implementation.
pub struct Checks(pub Vec<Check>);

impl Checks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Check> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Check> {
        self.0.iter()
    }

    /// Number of checks that carry an outcome.
    pub fn confirmed(&self) -> usize {
        self.0.iter().filter(|c| c.status.is_confirmed()).count()
    }
}

impl Index<usize> for Checks {
    type Output = Check;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Checks {
    type Item = Check;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Checks {
    type Item = &'a Check;
    type IntoIter = std::slice::Iter<'a, Check>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Checks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No checks found.");
        }
        for check in &self.0 {
            write!(f, "{check}")?;
        }
        Ok(())
    }
}

/// Newtype wrapper for displaying the items attached to a point.
pub struct Items(pub Vec<Item>);

impl Items {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Items {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No items found.");
        }
        for item in &self.0 {
            writeln!(f, "- **{}. {}** ({})", item.id, item.title, item.execution_method)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{CheckStatus, OrderStatus};

    fn order(id: u64, status: OrderStatus) -> Order {
        Order {
            id,
            plan_id: 7,
            status,
            assigner_id: None,
            assignee_id: None,
            started_at: None,
            ended_at: None,
            inspection_data: None,
            completed_checks: 1,
            total_checks: 3,
            revision: 0,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_orders_display() {
        let orders = Orders(vec![
            order(1, OrderStatus::Pending),
            order(2, OrderStatus::InProgress),
        ]);
        let output = orders.to_string();
        assert!(output.contains("**Order 1** from plan 7: ○ Pending, 1/3 checks"));
        assert!(output.contains("**Order 2** from plan 7: ➤ In Progress"));
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[1].id, 2);
    }

    #[test]
    fn test_empty_collections() {
        assert_eq!(Orders(vec![]).to_string(), "No orders found.\n");
        assert_eq!(Checks(vec![]).to_string(), "No checks found.\n");
        assert_eq!(Items(vec![]).to_string(), "No items found.\n");
    }

    #[test]
    fn test_items_display() {
        let items = Items(vec![Item {
            id: 3,
            title: "Valve seal".to_string(),
            details: None,
            execution_method: "visual".to_string(),
        }]);
        assert_eq!(items.to_string(), "- **3. Valve seal** (visual)\n");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_checks_confirmed_count() {
        let check = |id, status| Check {
            id,
            order_id: 1,
            point_id: id,
            status,
            comment: None,
            checked_at: None,
        };
        let checks = Checks(vec![
            check(1, CheckStatus::Passed),
            check(2, CheckStatus::Pending),
            check(3, CheckStatus::Failed),
        ]);
        assert_eq!(checks.confirmed(), 2);
        assert_eq!(checks.iter().count(), 3);
    }
}
