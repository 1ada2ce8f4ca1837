#[cfg(test)]
mod tests {
    use crate::availability::{slot_is_blocked, AvailabilityError, AvailableDays, SlotGrid};
    use crate::models::{BlockedHour, WeekdayMask};
    use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
    use std::collections::HashSet;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn t(h: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn available_days_skip_weekends_and_holidays() {
        let holidays: HashSet<NaiveDate> = [d(2026, 9, 16)].into_iter().collect();
        // Tuesday 2026-09-15 over a two-week horizon.
        let days: Vec<NaiveDate> = AvailableDays::new(
            d(2026, 9, 15),
            14,
            WeekdayMask::business_week(),
            holidays,
        )
        .collect();
        assert!(days.contains(&d(2026, 9, 15)), "start day is included");
        assert!(!days.contains(&d(2026, 9, 16)), "holiday excluded");
        assert!(!days.contains(&d(2026, 9, 19)), "Saturday excluded");
        assert!(!days.contains(&d(2026, 9, 20)), "Sunday excluded");
        // 10 weekdays in 14 days, minus the holiday.
        assert_eq!(days.len(), 9);
        assert!(days.windows(2).all(|w| w[0] < w[1]), "strictly ascending");
    }

    #[test]
    fn weekday_mask_narrows_the_day_set() {
        // Mondays only.
        let mask: WeekdayMask = "1000000".parse().unwrap();
        let days: Vec<NaiveDate> =
            AvailableDays::new(d(2026, 9, 15), 30, mask, HashSet::new()).collect();
        assert!(!days.is_empty());
        assert!(days.iter().all(|day| day.weekday() == Weekday::Mon));
    }

    #[test]
    fn saturday_service_is_still_excluded_by_the_calendar() {
        // A mask allowing every day never yields weekend dates; the business
        // calendar wins.
        let days: Vec<NaiveDate> =
            AvailableDays::new(d(2026, 9, 14), 7, WeekdayMask::every_day(), HashSet::new())
                .collect();
        assert!(days
            .iter()
            .all(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)));
        assert_eq!(days.len(), 5);
    }

    #[test]
    fn slot_grid_steps_by_the_service_duration() {
        let grid = SlotGrid::new(t(8, 30), t(16, 30), 30).unwrap();
        let starts: Vec<NaiveTime> = grid.starts().collect();
        assert_eq!(starts.first(), Some(&t(8, 30)));
        assert_eq!(starts.last(), Some(&t(16, 0)));
        assert_eq!(starts.len(), 16);
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn last_slot_must_fit_entirely_before_close() {
        // 45-minute slots in an 08:30..16:30 window: 08:30, 09:15, ... the
        // last start is 15:45 (ends exactly at 16:30).
        let grid = SlotGrid::new(t(8, 30), t(16, 30), 45).unwrap();
        let starts: Vec<NaiveTime> = grid.starts().collect();
        assert_eq!(starts.last(), Some(&t(15, 45)));
        assert!(starts.iter().all(|s| *s + grid.duration() <= t(16, 30)));
    }

    #[test]
    fn malformed_grids_are_rejected_at_construction() {
        assert!(matches!(
            SlotGrid::new(t(9, 0), t(17, 0), 0),
            Err(AvailabilityError::NonPositiveDuration(0))
        ));
        assert!(matches!(
            SlotGrid::new(t(9, 0), t(17, 0), -30),
            Err(AvailabilityError::NonPositiveDuration(-30))
        ));
        assert!(matches!(
            SlotGrid::new(t(16, 0), t(16, 30), 60),
            Err(AvailabilityError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn windows_near_midnight_do_not_wrap() {
        // NaiveTime arithmetic wraps at midnight; a slot that would spill
        // into the next day must not be accepted or emitted.
        assert!(matches!(
            SlotGrid::new(t(23, 0), t(23, 30), 120),
            Err(AvailabilityError::EmptyWindow { .. })
        ));
        let grid = SlotGrid::new(t(22, 0), t(23, 30), 60).unwrap();
        let starts: Vec<NaiveTime> = grid.starts().collect();
        // 23:00 would end at midnight, past the 23:30 close.
        assert_eq!(starts, vec![t(22, 0)]);
    }

    #[test]
    fn blocked_hours_use_half_open_intersection() {
        let blocked = vec![BlockedHour {
            id: Uuid::new_v4(),
            office_id: Uuid::new_v4(),
            date: d(2026, 9, 15),
            start_time: t(10, 0),
            end_time: t(11, 0),
        }];
        // Touching endpoints do not conflict.
        assert!(!slot_is_blocked(t(9, 30), t(10, 0), &blocked));
        assert!(!slot_is_blocked(t(11, 0), t(11, 30), &blocked));
        // Any true intersection does.
        assert!(slot_is_blocked(t(9, 45), t(10, 15), &blocked));
        assert!(slot_is_blocked(t(10, 30), t(11, 0), &blocked));
        assert!(slot_is_blocked(t(9, 0), t(12, 0), &blocked));
    }
}
