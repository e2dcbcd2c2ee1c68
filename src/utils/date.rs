//! UTC calendar dates and clock times from `SystemTime`.
//!
//! Post dates are plain ISO dates (`YYYY-MM-DD`); the watch status block
//! shows the wall clock as `HH:MM:SS`.

use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeUtc {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTimeUtc {
    pub const fn from_ymd(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }

    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        Self::from_unix(secs)
    }

    /// Current UTC date at midnight.
    pub fn today() -> Self {
        let now = Self::now();
        Self::from_ymd(now.year, now.month, now.day)
    }

    /// Civil date from days since the epoch (Hinnant's algorithm).
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn from_unix(secs: u64) -> Self {
        let z = (secs / 86_400) as i64 + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z - era * 146_097;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;

        let secs_of_day = secs % 86_400;
        Self {
            year: (yoe + era * 400 + i64::from(month <= 2)) as u16,
            month,
            day: (doy - (153 * mp + 2) / 5 + 1) as u8,
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day / 60 % 60) as u8,
            second: (secs_of_day % 60) as u8,
        }
    }

    /// Parse a strict `YYYY-MM-DD` date, rejecting impossible days.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split('-');
        let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || year.len() != 4 || month.len() != 2 || day.len() != 2 {
            return None;
        }
        let digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if !(digits(year) && digits(month) && digits(day)) {
            return None;
        }

        let date = Self::from_ymd(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?);
        (1..=days_in_month(date.year, date.month))
            .contains(&date.day)
            .then_some(date)
    }

    pub fn to_ymd(self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    pub fn to_hms(self) -> String {
        format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

const fn days_in_month(year: u16, month: u8) -> u8 {
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(DateTimeUtc::parse("2024-06-15"), Some(DateTimeUtc::from_ymd(2024, 6, 15)));
        assert_eq!(DateTimeUtc::parse("2024-06-15").unwrap().to_ymd(), "2024-06-15");
    }

    #[test]
    fn test_parse_rejects() {
        for bad in [
            "2024-13-01",
            "2023-02-29",
            "2024-06-00",
            "2024/06/15",
            "2024-6-15",
            "2024-06-15 extra",
            "2024-06-15T10:00:00Z",
            "+024-06-15",
            "short",
        ] {
            assert!(DateTimeUtc::parse(bad).is_none(), "{bad}");
        }
    }

    #[test]
    fn test_leap_days() {
        assert!(DateTimeUtc::parse("2024-02-29").is_some());
        assert!(DateTimeUtc::parse("2000-02-29").is_some());
        assert!(DateTimeUtc::parse("1900-02-29").is_none());
    }

    #[test]
    fn test_from_unix() {
        assert_eq!(DateTimeUtc::from_unix(0).to_ymd(), "1970-01-01");
        let leap_noon = DateTimeUtc::from_unix(1_709_208_000);
        assert_eq!(leap_noon.to_ymd(), "2024-02-29");
        assert_eq!(leap_noon.to_hms(), "12:00:00");
        assert_eq!(DateTimeUtc::from_unix(951_868_800).to_ymd(), "2000-03-01");
    }

    #[test]
    fn test_today_is_midnight() {
        let today = DateTimeUtc::today();
        assert_eq!(today.to_hms(), "00:00:00");
        assert!(DateTimeUtc::parse(&today.to_ymd()).is_some());
    }
}
