//! Recurrence rules that decide when a plan fires.

use std::{fmt, str::FromStr};

use jiff::civil::Weekday;
use serde::{Deserialize, Serialize};

use crate::error::{InspectionError, Result};

/// Day of the month a monthly plan fires on (1-31).
///
/// Day 31 never matches in shorter months; such plans simply skip those
/// months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthDay(u8);

impl MonthDay {
    pub fn new(day: u8) -> Result<Self> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(InspectionError::invalid_input("trigger_day")
                .with_reason(format!("Monthly trigger day must be between 1 and 31, got {day}")))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for MonthDay {
    type Error = InspectionError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MonthDay> for u8 {
    fn from(value: MonthDay) -> Self {
        value.0
    }
}

/// Day of the week a weekly plan fires on, 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct WeekDay(u8);

impl WeekDay {
    pub fn new(day: u8) -> Result<Self> {
        if day <= 6 {
            Ok(Self(day))
        } else {
            Err(InspectionError::invalid_input("trigger_day").with_reason(format!(
                "Weekly trigger day must be between 0 and 6 (0 = Sunday), got {day}"
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Whether `weekday` is this day, using the same Sunday-zero numbering
    /// accepted at validation time.
    pub fn matches(self, weekday: Weekday) -> bool {
        i16::from(weekday.to_sunday_zero_offset()) == i16::from(self.0)
    }
}

impl TryFrom<u8> for WeekDay {
    type Error = InspectionError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<WeekDay> for u8 {
    fn from(value: WeekDay) -> Self {
        value.0
    }
}

/// Storage tag of a [`Trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Monthly,
    Weekly,
    Manual,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Monthly => "monthly",
            TriggerKind::Weekly => "weekly",
            TriggerKind::Manual => "manual",
        }
    }
}

impl FromStr for TriggerKind {
    type Err = InspectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(TriggerKind::Monthly),
            "weekly" => Ok(TriggerKind::Weekly),
            "manual" => Ok(TriggerKind::Manual),
            _ => Err(InspectionError::invalid_input("trigger_kind")
                .with_reason(format!("Unknown trigger kind '{s}'"))),
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a plan auto-fires.
///
/// The day is carried inside the variant, so a weekly plan with day 9 or a
/// monthly plan with day 0 cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "day", rename_all = "lowercase")]
pub enum Trigger {
    Monthly(MonthDay),
    Weekly(WeekDay),
    /// Only fired by an explicit administrator action
    Manual,
}

impl Trigger {
    /// Builds a trigger from its loose kind/day form, validating the day
    /// against the kind. Manual triggers ignore `day` entirely.
    pub fn from_parts(kind: &str, day: i64) -> Result<Self> {
        let kind = kind.parse::<TriggerKind>()?;
        Self::from_kind(kind, day)
    }

    /// Same as [`Trigger::from_parts`] with an already parsed kind.
    pub fn from_kind(kind: TriggerKind, day: i64) -> Result<Self> {
        let narrow = |day: i64| {
            u8::try_from(day).map_err(|_| {
                InspectionError::invalid_input("trigger_day")
                    .with_reason(format!("Trigger day {day} is out of range for {kind}"))
            })
        };

        match kind {
            TriggerKind::Monthly => Ok(Trigger::Monthly(MonthDay::new(narrow(day)?)?)),
            TriggerKind::Weekly => Ok(Trigger::Weekly(WeekDay::new(narrow(day)?)?)),
            TriggerKind::Manual => Ok(Trigger::Manual),
        }
    }

    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Monthly(_) => TriggerKind::Monthly,
            Trigger::Weekly(_) => TriggerKind::Weekly,
            Trigger::Manual => TriggerKind::Manual,
        }
    }

    /// Day stored alongside the kind; 0 for manual plans.
    pub fn day(&self) -> u8 {
        match self {
            Trigger::Monthly(day) => day.get(),
            Trigger::Weekly(day) => day.get(),
            Trigger::Manual => 0,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Monthly(day) => write!(f, "monthly on day {}", day.get()),
            Trigger::Weekly(day) => {
                const NAMES: [&str; 7] = [
                    "Sunday",
                    "Monday",
                    "Tuesday",
                    "Wednesday",
                    "Thursday",
                    "Friday",
                    "Saturday",
                ];
                write!(f, "weekly on {}", NAMES[usize::from(day.get())])
            }
            Trigger::Manual => f.write_str("manual"),
        }
    }
}
