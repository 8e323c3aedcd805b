//! Domain checks for clinical record fields.
//!
//! These helpers enforce the declared domains of ages, visit dates, vital signs and lab values
//! before a [`crate::record::ClinicalRecord`] can be constructed.

use crate::constants::{EARLIEST_VISIT_DATE, MAX_AGE, MIN_AGE};
use crate::error::ValidationError;
use chrono::{DateTime, FixedOffset, NaiveDate};

/// Inclusive numeric domain of a measured value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
}

pub const SYSTOLIC_BP: Domain = Domain {
    field: "systolic_bp",
    min: 50.0,
    max: 260.0,
};
pub const DIASTOLIC_BP: Domain = Domain {
    field: "diastolic_bp",
    min: 30.0,
    max: 160.0,
};
pub const HEART_RATE: Domain = Domain {
    field: "heart_rate",
    min: 20.0,
    max: 250.0,
};
pub const TEMPERATURE_F: Domain = Domain {
    field: "temperature",
    min: 90.0,
    max: 110.0,
};
pub const RESPIRATORY_RATE: Domain = Domain {
    field: "respiratory_rate",
    min: 4.0,
    max: 60.0,
};
pub const OXYGEN_SATURATION: Domain = Domain {
    field: "oxygen_saturation",
    min: 50.0,
    max: 100.0,
};
pub const GLUCOSE: Domain = Domain {
    field: "glucose",
    min: 10.0,
    max: 1000.0,
};
pub const CHOLESTEROL: Domain = Domain {
    field: "cholesterol",
    min: 50.0,
    max: 600.0,
};
pub const HEMOGLOBIN: Domain = Domain {
    field: "hemoglobin",
    min: 2.0,
    max: 25.0,
};

impl Domain {
    /// Checks that `value` is finite and within the inclusive domain.
    pub fn check(&self, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(self.field));
        }
        if value < self.min || value > self.max {
            return Err(ValidationError::ValueOutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Like [`Domain::check`], but absence is always valid.
    pub fn check_optional(&self, value: Option<f64>) -> Result<(), ValidationError> {
        match value {
            Some(v) => self.check(v),
            None => Ok(()),
        }
    }
}

/// Validates an age in years and narrows it to `u8`.
pub fn validate_age(age: i64) -> Result<u8, ValidationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(ValidationError::AgeOutOfRange(age));
    }
    u8::try_from(age).map_err(|_| ValidationError::AgeOutOfRange(age))
}

/// Validates that a visit date is not before 1900-01-01.
///
/// Used on its own where no creation timestamp is available, such as imported metadata.
pub fn validate_visit_date_floor(visit_date: NaiveDate) -> Result<(), ValidationError> {
    let (year, month, day) = EARLIEST_VISIT_DATE;
    let earliest = NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN);

    if visit_date < earliest {
        return Err(ValidationError::VisitDateOutOfRange {
            visit_date,
            reason: "before 1900-01-01",
        });
    }
    Ok(())
}

/// Validates that a visit date is not before 1900-01-01 and not after the record was created.
///
/// The creation date is the calendar date in the timestamp's own offset, so a visit recorded
/// shortly after local midnight is not pushed onto the previous UTC day.
pub fn validate_visit_date(
    visit_date: NaiveDate,
    created_at: &DateTime<FixedOffset>,
) -> Result<(), ValidationError> {
    validate_visit_date_floor(visit_date)?;
    if visit_date > created_at.date_naive() {
        return Err(ValidationError::VisitDateOutOfRange {
            visit_date,
            reason: "after the record creation date",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn age_domain_is_inclusive() {
        assert_eq!(validate_age(0), Ok(0));
        assert_eq!(validate_age(130), Ok(130));
        assert_eq!(validate_age(-1), Err(ValidationError::AgeOutOfRange(-1)));
        assert_eq!(validate_age(131), Err(ValidationError::AgeOutOfRange(131)));
    }

    #[test]
    fn domain_rejects_out_of_range_and_non_finite() {
        assert!(HEART_RATE.check(20.0).is_ok());
        assert!(HEART_RATE.check(250.0).is_ok());

        let err = HEART_RATE.check(251.0).expect_err("above max");
        assert!(matches!(
            err,
            ValidationError::ValueOutOfRange { field: "heart_rate", .. }
        ));

        let err = GLUCOSE.check(f64::NAN).expect_err("NaN is not a lab value");
        assert_eq!(err, ValidationError::NotFinite("glucose"));
    }

    #[test]
    fn optional_domain_accepts_absence() {
        assert!(CHOLESTEROL.check_optional(None).is_ok());
        assert!(CHOLESTEROL.check_optional(Some(210.0)).is_ok());
        assert!(CHOLESTEROL.check_optional(Some(0.0)).is_err());
    }

    #[test]
    fn visit_date_must_not_follow_creation() {
        let created = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap().fixed_offset();
        let same_day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let ancient = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();

        assert!(validate_visit_date(same_day, &created).is_ok());
        assert!(matches!(
            validate_visit_date(next_day, &created),
            Err(ValidationError::VisitDateOutOfRange { .. })
        ));
        assert!(matches!(
            validate_visit_date(ancient, &created),
            Err(ValidationError::VisitDateOutOfRange { reason: "before 1900-01-01", .. })
        ));
    }

    #[test]
    fn creation_date_uses_the_timestamp_offset() {
        let created = DateTime::parse_from_rfc3339("2024-06-01T00:30:00+02:00").unwrap();
        let visit = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(validate_visit_date(visit, &created).is_ok());

        let next_day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert!(validate_visit_date(next_day, &created).is_err());
    }
}
