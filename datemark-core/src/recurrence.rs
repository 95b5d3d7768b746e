//! Recurrence expansion for repeating events.
//!
//! Expands an `EventDescriptor` into the dates it occurs on. Occurrences are
//! always computed from the anchor (`anchor + n * step`) rather than from the
//! previous occurrence, so monthly clamping never drifts: an event anchored on
//! the 31st lands on the 31st again whenever the month has one.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::event::{EventDescriptor, RepeatRule};

/// The `n`-th occurrence after the anchor, or `None` if it is not representable.
///
/// Monthly steps clamp to the last day of the target month (Jan 31 + 1 month = Feb 29/28).
pub(crate) fn nth_occurrence(anchor: NaiveDate, rule: RepeatRule, n: u32) -> Option<NaiveDate> {
    match rule {
        RepeatRule::None => None,
        RepeatRule::Daily => anchor.checked_add_days(Days::new(u64::from(n))),
        RepeatRule::Weekly => anchor.checked_add_days(Days::new(u64::from(n) * 7)),
        RepeatRule::Monthly => anchor.checked_add_months(Months::new(n)),
    }
}

/// All dates the event occurs on, ascending, starting with the anchor.
///
/// Non-repeating events and repeating events without an end date yield just
/// the anchor. An end date before the anchor also yields just the anchor.
pub fn occurrence_dates(event: &EventDescriptor) -> Vec<NaiveDate> {
    let anchor = event.anchor_date;
    let end = match (event.repeat_rule, event.repeat_end_date) {
        (RepeatRule::None, _) | (_, None) => return vec![anchor],
        (_, Some(end)) => end,
    };

    let mut dates = vec![anchor];
    let mut current = anchor;
    let mut step = 0;

    while current < end {
        step += 1;
        let Some(next) = nth_occurrence(anchor, event.repeat_rule, step) else {
            break;
        };
        if next > end {
            break;
        }
        dates.push(next);
        current = next;
    }

    dates
}

/// Whether the event occurs on `target`.
///
/// A repeating event with no end date never matches, not even on its anchor.
/// Answered arithmetically; agrees with membership in `occurrence_dates`.
pub fn occurs_on(event: &EventDescriptor, target: NaiveDate) -> bool {
    let anchor = event.anchor_date;
    if event.repeat_rule == RepeatRule::None {
        return target == anchor;
    }
    let Some(end) = event.repeat_end_date else {
        return false;
    };

    if target == anchor {
        return true;
    }
    if target < anchor || target > end {
        return false;
    }

    match event.repeat_rule {
        RepeatRule::None => false,
        RepeatRule::Daily => true,
        RepeatRule::Weekly => (target - anchor).num_days() % 7 == 0,
        // A monthly step only ever lands in the month `n` months after the anchor
        RepeatRule::Monthly => u32::try_from(months_between(anchor, target))
            .ok()
            .and_then(|n| nth_occurrence(anchor, RepeatRule::Monthly, n))
            == Some(target),
    }
}

/// Occurrences inside the inclusive window `[from, to]`.
///
/// Starts stepping near `from` instead of expanding the series from the anchor.
pub fn occurrences_between(event: &EventDescriptor, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    if from > to {
        return Vec::new();
    }

    let anchor = event.anchor_date;
    let mut dates = Vec::new();
    if anchor >= from && anchor <= to {
        dates.push(anchor);
    }

    let end = match (event.repeat_rule, event.repeat_end_date) {
        (RepeatRule::None, _) | (_, None) => return dates,
        (_, Some(end)) => end,
    };

    // May undershoot `from` by a step or so; those dates are skipped below
    let estimate = match event.repeat_rule {
        RepeatRule::None => return dates,
        RepeatRule::Daily => (from - anchor).num_days(),
        RepeatRule::Weekly => (from - anchor).num_days() / 7,
        RepeatRule::Monthly => months_between(anchor, from),
    };
    let Ok(mut step) = u32::try_from(estimate.max(1)) else {
        return dates;
    };

    while let Some(next) = nth_occurrence(anchor, event.repeat_rule, step) {
        if next > end || next > to {
            break;
        }
        if next >= from {
            dates.push(next);
        }
        let Some(following) = step.checked_add(1) else {
            break;
        };
        step = following;
    }

    dates
}

/// Whole calendar months from `from`'s month to `to`'s month, ignoring days.
fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) - i64::from(from.year())) * 12 + i64::from(to.month())
        - i64::from(from.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_keeps_weekday() {
        let event = EventDescriptor::new(date(2024, 6, 10), RepeatRule::Weekly, Some(date(2024, 7, 2)));
        assert_eq!(
            occurrence_dates(&event),
            vec![date(2024, 6, 10), date(2024, 6, 17), date(2024, 6, 24), date(2024, 7, 1)]
        );
    }

    #[test]
    fn test_monthly_clamps_then_recovers() {
        // Stepping from the anchor means March gets the 31st back, not the 29th
        let event = EventDescriptor::new(date(2023, 1, 31), RepeatRule::Monthly, Some(date(2023, 5, 31)));
        assert_eq!(
            occurrence_dates(&event),
            vec![
                date(2023, 1, 31),
                date(2023, 2, 28),
                date(2023, 3, 31),
                date(2023, 4, 30),
                date(2023, 5, 31),
            ]
        );
    }

    #[test]
    fn test_end_before_anchor_yields_anchor_only() {
        let event = EventDescriptor::new(date(2024, 5, 5), RepeatRule::Daily, Some(date(2024, 5, 1)));
        assert_eq!(occurrence_dates(&event), vec![date(2024, 5, 5)]);
        assert!(occurs_on(&event, date(2024, 5, 5)));
        assert!(!occurs_on(&event, date(2024, 5, 1)));
    }

    #[test]
    fn test_end_between_steps_is_not_overshot() {
        let event = EventDescriptor::new(date(2024, 1, 1), RepeatRule::Weekly, Some(date(2024, 1, 10)));
        assert_eq!(occurrence_dates(&event), vec![date(2024, 1, 1), date(2024, 1, 8)]);
    }

    #[test]
    fn test_sequence_stops_at_calendar_limit() {
        let event = EventDescriptor::new(
            NaiveDate::MAX.pred_opt().unwrap(),
            RepeatRule::Weekly,
            Some(NaiveDate::MAX),
        );
        assert_eq!(occurrence_dates(&event), vec![NaiveDate::MAX.pred_opt().unwrap()]);
    }

    #[test]
    fn test_occurrences_between_window() {
        let event = EventDescriptor::new(date(2024, 1, 30), RepeatRule::Daily, Some(date(2024, 2, 3)));
        assert_eq!(
            occurrences_between(&event, date(2024, 2, 1), date(2024, 2, 29)),
            vec![date(2024, 2, 1), date(2024, 2, 2), date(2024, 2, 3)]
        );
        assert!(occurrences_between(&event, date(2024, 3, 1), date(2024, 3, 31)).is_empty());
        assert!(occurrences_between(&event, date(2024, 2, 2), date(2024, 2, 1)).is_empty());
    }

    #[test]
    fn test_unbounded_event_still_marks_anchor() {
        let event = EventDescriptor::new(date(2024, 3, 1), RepeatRule::Daily, None);
        assert_eq!(
            occurrences_between(&event, date(2024, 3, 1), date(2024, 3, 31)),
            vec![date(2024, 3, 1)]
        );
        assert!(!occurs_on(&event, date(2024, 3, 1)));
    }

    #[test]
    fn test_far_end_date_answers_near_queries() {
        let event = EventDescriptor::new(date(2024, 1, 1), RepeatRule::Daily, Some(NaiveDate::MAX));

        assert!(occurs_on(&event, date(2024, 1, 5)));
        assert!(occurs_on(&event, NaiveDate::MAX));
        assert!(!occurs_on(&event, date(2023, 12, 31)));

        let june = occurrences_between(&event, date(2024, 6, 1), date(2024, 6, 30));
        assert_eq!(june.len(), 30);
        assert_eq!(june.first(), Some(&date(2024, 6, 1)));
        assert_eq!(june.last(), Some(&date(2024, 6, 30)));
    }

    #[test]
    fn test_window_agrees_with_expansion() {
        let rules = [RepeatRule::Daily, RepeatRule::Weekly, RepeatRule::Monthly];
        let windows = [
            (date(2023, 12, 1), date(2024, 1, 31)),
            (date(2024, 2, 1), date(2024, 2, 29)),
            (date(2024, 3, 30), date(2024, 5, 2)),
            (date(2024, 7, 1), date(2024, 12, 31)),
        ];

        for rule in rules {
            let event = EventDescriptor::new(date(2024, 1, 31), rule, Some(date(2024, 8, 31)));
            let all = occurrence_dates(&event);
            for (from, to) in windows {
                let expected: Vec<_> = all.iter().copied().filter(|d| *d >= from && *d <= to).collect();
                assert_eq!(occurrences_between(&event, from, to), expected, "{:?} {} {}", rule, from, to);
            }
        }
    }

    #[test]
    fn test_monthly_occurs_on_clamped_days() {
        let event = EventDescriptor::new(date(2024, 1, 31), RepeatRule::Monthly, Some(date(2024, 12, 31)));
        assert!(occurs_on(&event, date(2024, 2, 29)));
        assert!(occurs_on(&event, date(2024, 3, 31)));
        assert!(!occurs_on(&event, date(2024, 3, 29)));
        assert!(!occurs_on(&event, date(2024, 2, 28)));
    }
}
