//! Free-text workout durations
//!
//! Durations are entered as text ("45 min", "1 hr 30 min"). Parsing never
//! fails: any fragment that is not a whole number counts as zero.

/// Parse a duration string into whole minutes.
///
/// Accepts `"<m> min"`, `"<h> hr <m> min"`, either segment alone, plural
/// units, and a bare number (minutes).
pub fn parse_duration_minutes(raw: &str) -> u32 {
  let text = raw.trim().to_lowercase();
  if text.is_empty() {
    return 0;
  }

  let (hours_part, rest) = match text.split_once("hr") {
    Some((hours, rest)) => (Some(hours), rest.strip_prefix('s').unwrap_or(rest)),
    None => (None, text.as_str()),
  };

  let minutes_part = rest.split_once("min").map_or(rest, |(minutes, _)| minutes);

  let hours = hours_part.map_or(0, parse_fragment);
  let minutes = parse_fragment(minutes_part);

  hours.saturating_mul(60).saturating_add(minutes)
}

fn parse_fragment(fragment: &str) -> u32 {
  fragment.trim().parse().unwrap_or(0)
}

/// Parse an optional duration; absent counts as zero
pub fn parse_optional_duration(raw: Option<&str>) -> u32 {
  raw.map_or(0, parse_duration_minutes)
}

/// Sum parsed minutes across many durations
pub fn total_minutes<'a, I>(durations: I) -> u32
where
  I: IntoIterator<Item = Option<&'a str>>,
{
  durations
    .into_iter()
    .map(parse_optional_duration)
    .fold(0u32, u32::saturating_add)
}

/// Format minutes for display: "45 min", "1 hr", "1 hr 30 min", "2 hrs 5 min"
pub fn format_minutes(total: u32) -> String {
  if total < 60 {
    return format!("{} min", total);
  }

  let hours = total / 60;
  let minutes = total % 60;
  let unit = if hours == 1 { "hr" } else { "hrs" };

  if minutes == 0 {
    format!("{} {}", hours, unit)
  } else {
    format!("{} {} {} min", hours, unit, minutes)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_canonical_roundtrips() {
    assert_eq!(parse_duration_minutes("45 min"), 45);
    assert_eq!(format_minutes(parse_duration_minutes("45 min")), "45 min");

    assert_eq!(parse_duration_minutes("1 hr 30 min"), 90);
    assert_eq!(format_minutes(parse_duration_minutes("1 hr 30 min")), "1 hr 30 min");

    assert_eq!(parse_duration_minutes("2 hr"), 120);
    assert_eq!(format_minutes(parse_duration_minutes("2 hr")), "2 hrs");
  }

  #[test]
  fn test_formatted_output_parses_back() {
    for minutes in [0, 5, 59, 60, 61, 90, 120, 125, 600] {
      assert_eq!(parse_duration_minutes(&format_minutes(minutes)), minutes);
    }
  }

  #[test]
  fn test_whitespace_case_and_plurals() {
    assert_eq!(parse_duration_minutes("  1 HR   15   MIN "), 75);
    assert_eq!(parse_duration_minutes("2 hrs 5 mins"), 125);
    assert_eq!(parse_duration_minutes("1hr30min"), 90);
    assert_eq!(parse_duration_minutes("30"), 30);
  }

  #[test]
  fn test_unparseable_fragments_count_as_zero() {
    assert_eq!(parse_duration_minutes(""), 0);
    assert_eq!(parse_duration_minutes("   "), 0);
    assert_eq!(parse_duration_minutes("forever"), 0);
    assert_eq!(parse_duration_minutes("abc min"), 0);
    assert_eq!(parse_duration_minutes("1 hr lots min"), 60);
    assert_eq!(parse_duration_minutes("some hr 20 min"), 20);
    assert_eq!(parse_duration_minutes("1.5 hr"), 0);
  }

  #[test]
  fn test_total_minutes_skips_missing() {
    let durations = vec![Some("45 min"), None, Some("1 hr 30 min"), Some("n/a")];
    assert_eq!(total_minutes(durations), 135);
    assert_eq!(total_minutes(Vec::<Option<&str>>::new()), 0);
  }

  #[test]
  fn test_format_boundaries() {
    assert_eq!(format_minutes(0), "0 min");
    assert_eq!(format_minutes(59), "59 min");
    assert_eq!(format_minutes(60), "1 hr");
    assert_eq!(format_minutes(61), "1 hr 1 min");
    assert_eq!(format_minutes(180), "3 hrs");
  }
}
