//! Partial time labels such as `"2013"`, `"2013-1"` or `"2013-01-15 06:00"`
//!
//! A label denotes the whole period it names, so a slice from `"2010-1"` to
//! `"2012-12"` covers everything up to the end of December 2012.

use crate::errors::{CutoutError, CutoutResult};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Resolution {
    Year,
    Month,
    Day,
    Minute,
    Second,
}

/// The half-open interval `[start, end)` covered by a time label
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Period {
    pub fn parse(label: &str) -> CutoutResult<Self> {
        let invalid = || CutoutError::InvalidTime(label.to_string());
        let label = label.trim();
        let (date_part, time_part) = match label.split_once(['T', ' ']) {
            Some((date, time)) => (date, Some(time)),
            None => (label, None),
        };

        let fields: Vec<&str> = date_part.split('-').collect();
        let number = |s: &str| s.parse::<u32>().map_err(|_| invalid());
        let year: i32 = fields[0].parse().map_err(|_| invalid())?;
        let month = fields.get(1).map(|s| number(s)).transpose()?;
        let day = fields.get(2).map(|s| number(s)).transpose()?;
        if fields.len() > 3 || (time_part.is_some() && day.is_none()) {
            return Err(invalid());
        }

        let date = NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))
            .ok_or_else(invalid)?;
        let (time, resolution) = match time_part {
            Some(t) => {
                if let Ok(time) = NaiveTime::parse_from_str(t, "%H:%M:%S") {
                    (time, Resolution::Second)
                } else {
                    let time = NaiveTime::parse_from_str(t, "%H:%M").map_err(|_| invalid())?;
                    (time, Resolution::Minute)
                }
            }
            None => {
                let resolution = match (month, day) {
                    (None, _) => Resolution::Year,
                    (Some(_), None) => Resolution::Month,
                    (Some(_), Some(_)) => Resolution::Day,
                };
                (NaiveTime::MIN, resolution)
            }
        };

        let start = date.and_time(time);
        let end = match resolution {
            Resolution::Year => NaiveDate::from_ymd_opt(year + 1, 1, 1)
                .ok_or_else(invalid)?
                .and_time(NaiveTime::MIN),
            Resolution::Month => first_of_next_month(date).ok_or_else(invalid)?,
            Resolution::Day => start
                .checked_add_signed(Duration::days(1))
                .ok_or_else(invalid)?,
            Resolution::Minute => start
                .checked_add_signed(Duration::minutes(1))
                .ok_or_else(invalid)?,
            Resolution::Second => start
                .checked_add_signed(Duration::seconds(1))
                .ok_or_else(invalid)?,
        };
        Ok(Self { start, end })
    }

    pub fn contains(&self, t: &NaiveDateTime) -> bool {
        self.start <= *t && *t < self.end
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDateTime> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN))
}

/// Instants from `start` (inclusive) to `end` (exclusive) every `step_minutes`
///
/// Stops early at the end of the representable time range.
pub fn time_range(
    start: NaiveDateTime,
    end: NaiveDateTime,
    step_minutes: i64,
) -> Vec<NaiveDateTime> {
    if step_minutes <= 0 {
        return vec![];
    }
    let step = Duration::minutes(step_minutes);
    let mut values = vec![];
    let mut t = start;
    while t < end {
        values.push(t);
        match t.checked_add_signed(step) {
            Some(next) => t = next,
            None => break,
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn year_label() {
        let p = Period::parse("2013").unwrap();
        assert_eq!(p.start, dt(2013, 1, 1, 0));
        assert_eq!(p.end, dt(2014, 1, 1, 0));
    }

    #[test]
    fn month_label_without_padding() {
        let p = Period::parse("2013-1").unwrap();
        assert_eq!(p.start, dt(2013, 1, 1, 0));
        assert_eq!(p.end, dt(2013, 2, 1, 0));
    }

    #[test]
    fn december_rolls_over() {
        let p = Period::parse("2012-12").unwrap();
        assert_eq!(p.end, dt(2013, 1, 1, 0));
    }

    #[test]
    fn day_and_time_labels() {
        let p = Period::parse("2013-01-15").unwrap();
        assert_eq!(p.end, dt(2013, 1, 16, 0));

        let p = Period::parse("2013-01-15 06:00").unwrap();
        assert_eq!(p.start, dt(2013, 1, 15, 6));
        assert!(p.contains(&dt(2013, 1, 15, 6)));
        assert!(!p.contains(&dt(2013, 1, 15, 7)));
    }

    #[test]
    fn invalid_labels() {
        assert!(Period::parse("20x3").is_err());
        assert!(Period::parse("2013-13").is_err());
        assert!(Period::parse("2013-01 06:00").is_err());
        assert!(Period::parse("2013-01-01-01").is_err());
    }

    #[test]
    fn labels_at_end_of_time() {
        let last_day = NaiveDate::MAX.format("%Y-%m-%d").to_string();
        assert!(matches!(
            Period::parse(&last_day),
            Err(CutoutError::InvalidTime(_))
        ));
        let last_year = NaiveDate::MAX.format("%Y").to_string();
        assert!(Period::parse(&last_year).is_err());
    }

    #[test]
    fn range_stops_at_end_of_time() {
        let start = NaiveDate::MAX.and_hms_opt(22, 0, 0).unwrap();
        let values = time_range(start, NaiveDateTime::MAX, 60);
        assert_eq!(values.len(), 2);
        assert_eq!(values[1], NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn hourly_range() {
        let values = time_range(dt(2013, 1, 1, 0), dt(2013, 1, 2, 0), 60);
        assert_eq!(values.len(), 24);
        assert_eq!(values[23], dt(2013, 1, 1, 23));
    }
}
