use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

/// The calendar month containing a moment, in that moment's time zone. Both bounds are
/// inclusive: the first day at 00:00:00 through the last day at 23:59:59.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub label: String,
}

impl MonthWindow {
    /// The month containing the server's local "now". Computed per call, never cached.
    pub fn current() -> Self {
        Self::containing(&Local::now())
    }

    pub fn containing<Tz: TimeZone>(moment: &DateTime<Tz>) -> Self {
        let tz = moment.timezone();
        let local = moment.naive_local();

        let first_day = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)
            .unwrap_or_else(|| local.date());
        let last_day = first_day
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first_day);

        let start_naive = first_day.and_hms_opt(0, 0, 0).unwrap_or_default();
        let end_naive = last_day.and_hms_opt(23, 59, 59).unwrap_or_default();

        // A DST gap at a boundary resolves to the nearest representable instant
        let start = tz
            .from_local_datetime(&start_naive)
            .earliest()
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&start_naive));
        let end = tz
            .from_local_datetime(&end_naive)
            .latest()
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&end_naive));

        Self {
            start,
            end,
            label: first_day.format("%B %Y").to_string(),
        }
    }

    pub fn contains(&self, moment: &DateTime<Utc>) -> bool {
        *moment >= self.start && *moment <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::FixedOffset;

    #[test]
    fn test_window_bounds_in_utc() {
        let window = MonthWindow::containing(&Utc.with_ymd_and_hms(2024, 2, 14, 9, 30, 0).unwrap());

        assert_eq!(window.start, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap());
        assert_eq!(window.label, "February 2024");
    }

    #[test]
    fn test_window_follows_moment_time_zone() {
        let offset = FixedOffset::east_opt(5 * 3600).unwrap();
        // 2025-12-31 22:00 UTC is already January in UTC+5
        let moment = Utc
            .with_ymd_and_hms(2025, 12, 31, 22, 0, 0)
            .unwrap()
            .with_timezone(&offset);

        let window = MonthWindow::containing(&moment);

        assert_eq!(window.label, "January 2026");
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 12, 31, 19, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 1, 31, 18, 59, 59).unwrap());
    }

    #[test]
    fn test_window_contains_is_inclusive() {
        let window = MonthWindow::containing(&Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap());

        assert!(window.contains(&window.start));
        assert!(window.contains(&window.end));
        assert!(!window.contains(&(window.end + chrono::Duration::seconds(1))));
        assert!(!window.contains(&(window.start - chrono::Duration::seconds(1))));
    }
}
