//! Trigger evaluation.
//!
//! [`should_trigger`] is a pure predicate over a plan and an instant. It has
//! no memory of earlier firings; [`fired_on_same_day`] is the separate guard
//! the sweep uses to stay idempotent within one firing window.

use jiff::Zoned;

use crate::models::{Plan, Trigger};

/// Whether `now` is a firing instant for `plan`.
///
/// Calendar fields are read in `now`'s own time zone. Manual plans never
/// fire here, and a monthly plan on day 31 skips shorter months.
pub fn should_trigger(plan: &Plan, now: &Zoned) -> bool {
    match plan.trigger {
        Trigger::Monthly(day) => i16::from(now.day()) == i16::from(day.get()),
        Trigger::Weekly(day) => day.matches(now.weekday()),
        Trigger::Manual => false,
    }
}

/// Whether the plan's last firing falls on the same local calendar date as
/// `now`.
pub fn fired_on_same_day(plan: &Plan, now: &Zoned) -> bool {
    match plan.last_triggered_at {
        Some(last) => last.to_zoned(now.time_zone().clone()).date() == now.date(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use jiff::{
        civil::date,
        tz::{self, TimeZone},
        Timestamp,
    };

    use super::*;
    use crate::models::{MonthDay, WeekDay};

    fn plan(trigger: Trigger) -> Plan {
        Plan {
            id: 1,
            name: "Boiler room".to_string(),
            project_id: 1,
            route_id: 1,
            trigger,
            assigner_id: None,
            assignee_ids: vec![],
            last_triggered_at: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn at(y: i16, m: i8, d: i8) -> Zoned {
        date(y, m, d).at(0, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap()
    }

    #[test]
    fn test_monthly_matches_day_of_month_only() {
        let p = plan(Trigger::Monthly(MonthDay::new(15).unwrap()));
        assert!(should_trigger(&p, &at(2024, 3, 15)));
        assert!(should_trigger(&p, &at(2024, 4, 15)));
        assert!(!should_trigger(&p, &at(2024, 3, 14)));
        assert!(!should_trigger(&p, &at(2024, 3, 16)));
    }

    #[test]
    fn test_monthly_day_31_skips_short_months() {
        let p = plan(Trigger::Monthly(MonthDay::new(31).unwrap()));
        let mut day = date(2024, 4, 1);
        while day.month() == 4 {
            let now = day.at(12, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
            assert!(!should_trigger(&p, &now), "fired on {day}");
            day = day.tomorrow().unwrap();
        }
        assert!(should_trigger(&p, &at(2024, 5, 31)));
    }

    #[test]
    fn test_weekly_uses_sunday_zero() {
        // 2024-03-17 is a Sunday, 2024-03-20 a Wednesday
        let sunday = plan(Trigger::Weekly(WeekDay::new(0).unwrap()));
        assert!(should_trigger(&sunday, &at(2024, 3, 17)));
        assert!(!should_trigger(&sunday, &at(2024, 3, 18)));

        let wednesday = plan(Trigger::Weekly(WeekDay::new(3).unwrap()));
        assert!(should_trigger(&wednesday, &at(2024, 3, 20)));
        assert!(!should_trigger(&wednesday, &at(2024, 3, 17)));
    }

    #[test]
    fn test_manual_never_fires() {
        let p = plan(Trigger::Manual);
        let mut day = date(2024, 1, 1);
        for _ in 0..40 {
            let now = day.at(0, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
            assert!(!should_trigger(&p, &now));
            day = day.tomorrow().unwrap();
        }
    }

    #[test]
    fn test_day_is_read_in_local_zone() {
        let p = plan(Trigger::Monthly(MonthDay::new(15).unwrap()));
        // 23:30 UTC on the 14th is already the 15th at UTC+9
        let utc = date(2024, 3, 14).at(23, 30, 0, 0).to_zoned(TimeZone::UTC).unwrap();
        let east = utc.with_time_zone(TimeZone::fixed(tz::offset(9)));
        assert!(!should_trigger(&p, &utc));
        assert!(should_trigger(&p, &east));
    }

    #[test]
    fn test_fired_on_same_day() {
        let mut p = plan(Trigger::Monthly(MonthDay::new(15).unwrap()));
        let now = date(2024, 3, 15).at(18, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap();
        assert!(!fired_on_same_day(&p, &now));

        p.last_triggered_at = Some(at(2024, 3, 15).timestamp());
        assert!(fired_on_same_day(&p, &now));

        p.last_triggered_at = Some(at(2024, 2, 15).timestamp());
        assert!(!fired_on_same_day(&p, &now));
    }
}
