use chrono::NaiveDate;

use super::utils::clean_str;

/// Parse an accident date: `YYYY-MM-DD` (optionally followed by a time part)
/// or `D.M.YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = clean_str(s);
    if s.len() >= 10 && s.as_bytes()[4] == b'-' {
        return NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok();
    }
    NaiveDate::parse_from_str(s, "%d.%m.%Y").ok()
}

/// Days since 1970-01-01, the Date32 representation.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_and_dotted_dates() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 5).unwrap();
        assert_eq!(parse_date("2020-01-05"), Some(d));
        assert_eq!(parse_date("\"2020-01-05\""), Some(d));
        assert_eq!(parse_date("2020-01-05 00:00"), Some(d));
        assert_eq!(parse_date("5.1.2020"), Some(d));
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2020-13-01"), None);
    }

    #[test]
    fn epoch_offsets() {
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 31).unwrap()), 30);
        assert_eq!(days_since_epoch(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()), -1);
    }
}
