#[cfg(test)]
mod tests {
    use crate::availability::SlotGrid;
    use crate::booking::sanitize_notes;
    use crate::calendar::{is_business_day, shift_to_prior_business_day};
    use crate::models::WeekdayMask;
    use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn base_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    // Strategy: an arbitrary timestamp in 2026 plus a sparse holiday set
    // around it. Sparse keeps the calendar well-formed, matching the
    // iteration-cap contract.
    fn holiday_set(day_offsets: Vec<i64>) -> HashSet<NaiveDate> {
        day_offsets
            .into_iter()
            .map(|off| base_date() + Duration::days(off))
            .collect()
    }

    proptest! {
        #[test]
        fn shifted_deadline_is_a_business_day_at_or_before_the_input(
            day_offset in 30i64..360,
            hour in 0u32..24,
            minute in 0u32..60,
            holiday_offsets in proptest::collection::vec(0i64..400, 0..10),
        ) {
            let holidays = holiday_set(holiday_offsets);
            let timestamp = (base_date() + Duration::days(day_offset))
                .and_hms_opt(hour, minute, 0)
                .unwrap();

            let shifted = shift_to_prior_business_day(timestamp, &holidays).unwrap();

            prop_assert!(is_business_day(shifted.date(), &holidays));
            prop_assert!(shifted <= timestamp);
            prop_assert_eq!(shifted.time(), timestamp.time());
            // Ten holidays can bridge at most two work weeks of weekends.
            prop_assert!(timestamp.date() - shifted.date() <= Duration::days(21));
        }

        #[test]
        fn slot_grid_starts_stay_inside_the_window(
            open_minutes in 0u32..(24 * 60),
            window_minutes in 30u32..(10 * 60),
            duration in 5i64..180,
        ) {
            let open =
                NaiveTime::from_num_seconds_from_midnight_opt(open_minutes * 60, 0).unwrap();
            let close_minutes = (open_minutes + window_minutes).min(24 * 60 - 1);
            let close =
                NaiveTime::from_num_seconds_from_midnight_opt(close_minutes * 60, 0).unwrap();

            let Ok(grid) = SlotGrid::new(open, close, duration) else {
                // Duration does not fit the window at all; nothing to check.
                return Ok(());
            };
            let starts: Vec<NaiveTime> = grid.starts().collect();

            prop_assert!(!starts.is_empty());
            prop_assert_eq!(starts[0], open);
            for pair in starts.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], grid.duration());
            }
            // Compare in seconds from midnight: NaiveTime addition wraps at
            // midnight and would mask a slot spilling into the next day.
            let close_secs = i64::from(close.num_seconds_from_midnight());
            for start in &starts {
                let start_secs = i64::from(start.num_seconds_from_midnight());
                prop_assert!(start_secs + grid.duration().num_seconds() <= close_secs);
            }
        }

        #[test]
        fn sanitized_notes_are_clean_and_bounded(
            raw in "\\PC{0,200}",
            max_len in 0usize..120,
        ) {
            let cleaned = sanitize_notes(&raw, max_len);
            prop_assert!(cleaned.chars().count() <= max_len);
            prop_assert!(!cleaned.chars().any(char::is_control));
            prop_assert!(!cleaned.contains("  "));
            prop_assert!(!cleaned.starts_with(' '));
            prop_assert!(!cleaned.ends_with(' '));
        }

        #[test]
        fn weekday_mask_round_trips(bits in proptest::array::uniform7(any::<bool>())) {
            let text: String = bits.iter().map(|b| if *b { '1' } else { '0' }).collect();
            let mask: WeekdayMask = text.parse().unwrap();
            prop_assert_eq!(String::from(mask), text);
        }
    }
}
