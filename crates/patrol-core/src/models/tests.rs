#[cfg(test)]
mod model_tests {
    use jiff::civil::Weekday;

    use crate::{
        error::ErrorKind,
        models::{CheckStatus, MonthDay, OrderStatus, Trigger, TriggerKind, WeekDay},
    };

    #[test]
    fn test_monthly_trigger_day_range() {
        assert!(Trigger::from_parts("monthly", 1).is_ok());
        assert!(Trigger::from_parts("monthly", 31).is_ok());

        for bad in [0, 32, -1, 300] {
            let err = Trigger::from_parts("monthly", bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "day {bad}");
        }
    }

    #[test]
    fn test_weekly_trigger_day_range() {
        assert!(Trigger::from_parts("weekly", 0).is_ok());
        assert!(Trigger::from_parts("weekly", 6).is_ok());

        let err = Trigger::from_parts("weekly", 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_manual_trigger_ignores_day() {
        assert_eq!(Trigger::from_parts("manual", 0).unwrap(), Trigger::Manual);
        assert_eq!(Trigger::from_parts("manual", 99).unwrap(), Trigger::Manual);
        assert_eq!(Trigger::from_parts("Manual", -5).unwrap(), Trigger::Manual);
        assert_eq!(Trigger::Manual.day(), 0);
    }

    #[test]
    fn test_unknown_trigger_kind_rejected() {
        let err = Trigger::from_parts("daily", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("trigger_kind"));
    }

    #[test]
    fn test_trigger_storage_parts() {
        let trigger = Trigger::from_parts("weekly", 3).unwrap();
        assert_eq!(trigger.kind(), TriggerKind::Weekly);
        assert_eq!(trigger.day(), 3);
        assert_eq!(trigger.to_string(), "weekly on Wednesday");

        let trigger = Trigger::from_parts("monthly", 15).unwrap();
        assert_eq!(trigger.kind(), TriggerKind::Monthly);
        assert_eq!(trigger.to_string(), "monthly on day 15");
    }

    #[test]
    fn test_week_day_uses_sunday_zero() {
        let sunday = WeekDay::new(0).unwrap();
        assert!(sunday.matches(Weekday::Sunday));
        assert!(!sunday.matches(Weekday::Monday));

        let saturday = WeekDay::new(6).unwrap();
        assert!(saturday.matches(Weekday::Saturday));
    }

    #[test]
    fn test_trigger_serde_shape() {
        let trigger = Trigger::Monthly(MonthDay::new(15).unwrap());
        let json = serde_json::to_value(trigger).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "monthly", "day": 15}));

        let parsed: Trigger = serde_json::from_value(serde_json::json!({"kind": "manual"})).unwrap();
        assert_eq!(parsed, Trigger::Manual);

        let invalid = serde_json::from_value::<Trigger>(serde_json::json!({"kind": "weekly", "day": 7}));
        assert!(invalid.is_err());
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Assigned,
            OrderStatus::InProgress,
            OrderStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("archived".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_check_status_parse() {
        assert_eq!("passed".parse::<CheckStatus>().unwrap(), CheckStatus::Passed);
        assert_eq!("FAIL".parse::<CheckStatus>().unwrap(), CheckStatus::Failed);
        assert!(!CheckStatus::Pending.is_confirmed());
        assert!(CheckStatus::Failed.is_confirmed());
        assert_eq!(CheckStatus::Failed.with_icon(), "✗ Failed");
    }
}
