use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc,
};
use core_types::TimeFilter;

/// Returns the earliest `created_at` a leaderboard for `filter` includes,
/// with calendar boundaries taken in the time zone of `now`.
///
/// - `Today`: midnight of the current day.
/// - `ThisWeek`: midnight of the most recent Monday (ISO week start).
/// - `ThisMonth`: midnight of the first day of the current month.
/// - `AllTime`: no lower bound.
pub fn window_start<Tz: TimeZone>(
    filter: TimeFilter,
    now: &DateTime<Tz>,
) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    let first_day = match filter {
        TimeFilter::AllTime => return None,
        TimeFilter::Today => today,
        TimeFilter::ThisWeek => {
            today - Days::new(u64::from(today.weekday().num_days_from_monday()))
        }
        TimeFilter::ThisMonth => today.with_day(1)?,
    };
    Some(local_midnight(first_day, &now.timezone()))
}

/// The instant `date` begins in `tz`.
fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(start) => start.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        // Midnight skipped by a DST jump: the day starts at the first local time that exists.
        LocalResult::None => (1..=96)
            .find_map(|quarter| {
                tz.from_local_datetime(&(midnight + Duration::minutes(15 * quarter)))
                    .earliest()
            })
            .map(|start| start.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc()),
    }
}
