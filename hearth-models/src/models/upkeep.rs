//! Service history and maintenance thresholds shared by residences and vehicles.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use hearth_core::error::{HearthError, HearthResult};

/// One dated line in a service log ("replaced furnace filter").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLogEntry {
    pub date: NaiveDate,
    pub note: String,
}

impl ServiceLogEntry {
    pub fn new(date: NaiveDate, note: impl Into<String>) -> Self {
        Self { date, note: note.into() }
    }

    /// An entry must carry a note.
    pub fn validate(&self) -> HearthResult<()> {
        if self.note.trim().is_empty() {
            return Err(HearthError::Validation("service log note cannot be empty".into()));
        }
        Ok(())
    }
}

/// A recurring maintenance rule: due every N months and/or every N miles
/// after it was last done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceMarker {
    pub label: String,
    #[serde(default)]
    pub every_months: Option<u32>,
    #[serde(default)]
    pub every_miles: Option<u64>,
    #[serde(default)]
    pub last_done_on: Option<NaiveDate>,
    #[serde(default)]
    pub last_done_miles: Option<u64>,
}

impl MaintenanceMarker {
    /// At least one threshold must be set and thresholds must be non-zero.
    pub fn validate(&self) -> HearthResult<()> {
        if self.label.trim().is_empty() {
            return Err(HearthError::Validation("maintenance marker needs a label".into()));
        }
        if self.every_months.is_none() && self.every_miles.is_none() {
            return Err(HearthError::Validation(format!(
                "maintenance marker `{}` needs a month or mileage threshold",
                self.label
            )));
        }
        if self.every_months == Some(0) || self.every_miles == Some(0) {
            return Err(HearthError::Validation(format!(
                "maintenance marker `{}` has a zero threshold",
                self.label
            )));
        }
        Ok(())
    }

    /// Whether the marker has come due.
    ///
    /// A threshold with no recorded baseline counts as due. The mileage
    /// threshold is only checked when the current odometer is known.
    pub fn is_due(&self, today: NaiveDate, odometer_miles: Option<u64>) -> bool {
        let by_date = self.every_months.map(|months| match self.last_done_on {
            Some(last) => last
                .checked_add_months(Months::new(months))
                .map_or(true, |due_on| today >= due_on),
            None => true,
        });

        let by_miles = self.every_miles.and_then(|miles| match self.last_done_miles {
            Some(last) => odometer_miles.map(|now| now >= last.saturating_add(miles)),
            None => Some(true),
        });

        by_date.unwrap_or(false) || by_miles.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn oil_change() -> MaintenanceMarker {
        MaintenanceMarker {
            label: "Oil change".into(),
            every_months: Some(6),
            every_miles: Some(5_000),
            last_done_on: Some(date(2024, 1, 15)),
            last_done_miles: Some(40_000),
        }
    }

    #[test]
    fn test_not_due_inside_both_thresholds() {
        assert!(!oil_change().is_due(date(2024, 5, 1), Some(42_000)));
    }

    #[test]
    fn test_due_by_date() {
        assert!(oil_change().is_due(date(2024, 7, 15), Some(41_000)));
    }

    #[test]
    fn test_due_by_miles() {
        assert!(oil_change().is_due(date(2024, 2, 1), Some(45_000)));
    }

    #[test]
    fn test_unknown_odometer_only_checks_date() {
        assert!(!oil_change().is_due(date(2024, 2, 1), None));
    }

    #[test]
    fn test_never_done_is_due() {
        let marker = MaintenanceMarker {
            label: "Gutter cleaning".into(),
            every_months: Some(12),
            every_miles: None,
            last_done_on: None,
            last_done_miles: None,
        };
        assert!(marker.is_due(date(2024, 1, 1), None));
    }

    #[test]
    fn test_validate() {
        assert!(oil_change().validate().is_ok());

        let mut marker = oil_change();
        marker.every_months = None;
        marker.every_miles = None;
        assert!(marker.validate().is_err());

        let mut marker = oil_change();
        marker.every_miles = Some(0);
        assert!(marker.validate().is_err());

        assert!(ServiceLogEntry::new(date(2024, 1, 1), "  ").validate().is_err());
    }

    #[test]
    fn test_entry_serializes_iso_date() {
        let entry = ServiceLogEntry::new(date(2024, 3, 9), "Rotated tires");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["date"], "2024-03-09");
        assert_eq!(json["note"], "Rotated tires");
    }
}
