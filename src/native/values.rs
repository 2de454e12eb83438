use std::num::TryFromIntError;

use chrono::{Duration, NaiveDate, TimeZone, Utc};

/// Wrapper type for the `ClickHouse` `Date` type: days since 1970-01-01.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Default)]
pub struct Date(pub u16);

impl From<NaiveDate> for Date {
    fn from(other: NaiveDate) -> Self {
        #[expect(clippy::cast_possible_truncation)]
        #[expect(clippy::cast_sign_loss)]
        Self(other.signed_duration_since(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days()
            as u16)
    }
}

impl From<Date> for NaiveDate {
    fn from(date: Date) -> Self {
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + Duration::days(i64::from(date.0))
    }
}

/// Wrapper type for the `ClickHouse` `DateTime` type: seconds since
/// 1970-01-01 00:00:00 UTC.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd, Debug, Default)]
pub struct DateTime(pub u32);

impl From<DateTime> for chrono::DateTime<Utc> {
    fn from(value: DateTime) -> Self { Utc.timestamp_opt(i64::from(value.0), 0).unwrap() }
}

impl TryFrom<chrono::DateTime<Utc>> for DateTime {
    type Error = TryFromIntError;

    fn try_from(other: chrono::DateTime<Utc>) -> Result<Self, TryFromIntError> {
        Ok(Self(other.timestamp().try_into()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_naivedate_round_trip() {
        for i in (0..30000u16).step_by(97) {
            let date = Date(i);
            let chrono_date: NaiveDate = date.into();
            assert_eq!(Date::from(chrono_date), date);
        }
    }

    #[test]
    fn date_epoch_is_1970() {
        assert_eq!(NaiveDate::from(Date(0)), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(Date::from(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), Date(1));
    }

    #[test]
    fn datetime_chrono_round_trip() {
        for i in (0..30000u32).map(|x| x * 10000) {
            let value = DateTime(i);
            let chrono_value: chrono::DateTime<Utc> = value.into();
            assert_eq!(DateTime::try_from(chrono_value).unwrap(), value);
        }
    }

    #[test]
    fn datetime_rejects_pre_epoch() {
        let early = Utc.timestamp_opt(-1, 0).unwrap();
        assert!(DateTime::try_from(early).is_err());
    }
}
