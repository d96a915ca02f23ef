use chrono::{
  DateTime,
  Local,
  TimeZone,
  Utc
};

/// Relative completion caption. Both instants must already be in the
/// viewer's time zone; calendar days are compared, not 24h spans.
pub fn completion_label<Tz>(
  completed_at: &DateTime<Tz>,
  now: &DateTime<Tz>
) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display
{
  let day = completed_at.date_naive();
  let today = now.date_naive();

  if day == today {
    format!(
      "Completed today at {}",
      clock_label(completed_at)
    )
  } else if today.pred_opt()
    == Some(day)
  {
    format!(
      "Completed yesterday at {}",
      clock_label(completed_at)
    )
  } else {
    format!(
      "Completed on {}",
      completed_at.format("%b %-d, %Y")
    )
  }
}

/// `completion_label` against the local clock.
pub fn local_completion_label(
  completed_at: DateTime<Utc>
) -> String {
  let now = Local::now();
  completion_label(
    &completed_at.with_timezone(&Local),
    &now
  )
}

fn clock_label<Tz>(
  at: &DateTime<Tz>
) -> String
where
  Tz: TimeZone,
  Tz::Offset: std::fmt::Display
{
  at.format("%-I:%M %p").to_string()
}
