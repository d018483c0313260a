use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Day of the week a routine is due on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

/// Days a routine is due on. An empty schedule means every day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct Schedule(Vec<Weekday>);

impl Schedule {
    /// Build a schedule, sorting and dropping duplicate days.
    pub fn new(mut days: Vec<Weekday>) -> Self {
        days.sort();
        days.dedup();
        Self(days)
    }

    pub fn every_day() -> Self {
        Self(Vec::new())
    }

    pub fn days(&self) -> &[Weekday] {
        &self.0
    }

    /// Whether the routine is due on the given date.
    pub fn is_due(&self, date: NaiveDate) -> bool {
        self.days().is_empty() || self.days().contains(&Weekday::from(date.weekday()))
    }

    /// Normalized form used for storage.
    pub fn normalized(self) -> Self {
        Self::new(self.0)
    }
}

/// A routine ("mission") a user wants to perform on a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Routine {
    pub id: Uuid,
    /// Subject identifier of the owning user, issued by the auth provider
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schedule: Schedule,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the routine has been soft-deleted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Routine {
    /// Not soft-deleted. Purged routines no longer exist at all.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Request to create a routine
#[derive(Debug, Clone, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct CreateRoutine {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Days the routine is due; omit or leave empty for every day
    #[serde(default = "Schedule::every_day")]
    pub schedule: Schedule,
}

/// Request to update a routine. Omitted fields are left unchanged; an empty
/// description clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UpdateRoutine {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub schedule: Option<Schedule>,
}

impl UpdateRoutine {
    /// Apply this update on top of an existing routine.
    pub fn apply(self, mut routine: Routine, now: DateTime<Utc>) -> Routine {
        if let Some(name) = self.name {
            routine.name = name;
        }
        if let Some(description) = self.description {
            routine.description = if description.is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(schedule) = self.schedule {
            routine.schedule = schedule.normalized();
        }
        routine.updated_at = now;
        routine
    }
}
