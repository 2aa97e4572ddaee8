use chrono::{DateTime, Duration, Utc};
use ulid::Ulid;

use crate::model::{Span, TimeSlot};

// ── Slot generation ──────────────────────────────────────────────

/// Compute candidate slots of exactly `duration` inside `window`, avoiding
/// `busy` periods.
///
/// A cursor sweeps forward from the window start. Inside every free gap a
/// slot is emitted at each `step`-aligned offset that still fits the full
/// duration, so consecutive slots overlap (09:00–10:00 and 09:15–10:15 both
/// appear); do not collapse this into adjacent tiling. Busy periods only
/// ever push the cursor forward, which also handles busy periods that
/// overlap each other or reach outside the window.
pub fn generate_slots(
    window: Span,
    busy: &[Span],
    duration: Duration,
    step: Duration,
    room_id: Ulid,
) -> Vec<TimeSlot> {
    let mut sorted: Vec<Span> = busy.to_vec();
    sorted.sort_by_key(|s| s.start);

    let mut slots = Vec::new();
    let mut cursor = window.start;

    for period in &sorted {
        if cursor < period.start {
            let gap_end = period.start.min(window.end);
            emit_gap(&mut slots, &mut cursor, gap_end, duration, step, room_id);
        }
        cursor = cursor.max(period.end);
    }

    if cursor < window.end {
        emit_gap(&mut slots, &mut cursor, window.end, duration, step, room_id);
    }

    slots
}

fn emit_gap(
    slots: &mut Vec<TimeSlot>,
    cursor: &mut DateTime<Utc>,
    gap_end: DateTime<Utc>,
    duration: Duration,
    step: Duration,
    room_id: Ulid,
) {
    while *cursor + duration <= gap_end {
        slots.push(TimeSlot {
            start: *cursor,
            end: *cursor + duration,
            room_id,
            is_available: true,
        });
        *cursor += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const STEP: i64 = 15;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn window() -> Span {
        Span::new(at(9, 0), at(18, 0))
    }

    fn slots(busy: &[Span], duration_minutes: i64) -> Vec<TimeSlot> {
        generate_slots(
            window(),
            busy,
            Duration::minutes(duration_minutes),
            Duration::minutes(STEP),
            Ulid::new(),
        )
    }

    #[test]
    fn empty_day_yields_dense_stepped_slots() {
        let out = slots(&[], 60);
        // Starts every 15 minutes from 09:00 through 17:00 inclusive.
        assert_eq!(out.len(), 33);
        assert_eq!(out[0].start, at(9, 0));
        assert_eq!(out[0].end, at(10, 0));
        assert_eq!(out[1].start, at(9, 15));
        assert_eq!(out.last().unwrap().start, at(17, 0));
        assert_eq!(out.last().unwrap().end, at(18, 0));
        assert!(out.iter().all(|s| s.is_available));
    }

    #[test]
    fn consecutive_slots_overlap() {
        let out = slots(&[], 60);
        // Not adjacent tiling: the second slot starts inside the first.
        assert!(out[0].end > out[1].start);
    }

    #[test]
    fn lunch_busy_splits_the_day() {
        let out = slots(&[Span::new(at(12, 0), at(13, 0))], 60);
        // Morning: 09:00..=11:00 (11:00+60min hits the gap boundary exactly).
        let morning: Vec<_> = out.iter().filter(|s| s.start < at(12, 0)).collect();
        assert_eq!(morning.len(), 9);
        assert_eq!(morning.last().unwrap().start, at(11, 0));
        assert_eq!(morning.last().unwrap().end, at(12, 0));
        // Afternoon resumes at 13:00 and runs through 17:00.
        let afternoon: Vec<_> = out.iter().filter(|s| s.start >= at(12, 0)).collect();
        assert_eq!(afternoon.first().unwrap().start, at(13, 0));
        assert_eq!(afternoon.last().unwrap().start, at(17, 0));
        assert_eq!(afternoon.len(), 17);
        assert_eq!(out.len(), 26);
    }

    #[test]
    fn eight_hour_meeting_in_nine_hour_window() {
        let out = slots(&[], 480);
        // Only 09:00 through 10:00 starts fit an 8h meeting before 18:00.
        let starts: Vec<_> = out.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![at(9, 0), at(9, 15), at(9, 30), at(9, 45), at(10, 0)]
        );
    }

    #[test]
    fn duration_longer_than_window_yields_nothing() {
        assert!(slots(&[], 10 * 60).is_empty());
    }

    #[test]
    fn gap_shorter_than_duration_yields_nothing_for_that_gap() {
        // 09:00–09:30 gap cannot fit 60 minutes.
        let out = slots(&[Span::new(at(9, 30), at(17, 30))], 60);
        assert!(out.is_empty());
    }

    #[test]
    fn busy_before_window_is_clipped() {
        let out = slots(&[Span::new(at(6, 0), at(8, 0))], 60);
        assert_eq!(out.len(), 33);
        assert_eq!(out[0].start, at(9, 0));
    }

    #[test]
    fn busy_straddling_window_start_pushes_cursor() {
        let out = slots(&[Span::new(at(8, 0), at(10, 0))], 60);
        assert_eq!(out[0].start, at(10, 0));
    }

    #[test]
    fn busy_after_window_is_ignored() {
        let out = slots(&[Span::new(at(19, 0), at(20, 0))], 60);
        assert_eq!(out.len(), 33);
        assert_eq!(out.last().unwrap().start, at(17, 0));
    }

    #[test]
    fn busy_covering_whole_window_yields_nothing() {
        assert!(slots(&[Span::new(at(8, 0), at(19, 0))], 15).is_empty());
    }

    #[test]
    fn overlapping_busy_periods_handled_by_forward_cursor() {
        let busy = [
            Span::new(at(10, 0), at(12, 0)),
            Span::new(at(11, 0), at(11, 30)), // nested inside the first
            Span::new(at(11, 45), at(13, 0)),
        ];
        let out = slots(&busy, 60);
        // Free: 09:00–10:00 and 13:00–18:00.
        assert_eq!(out[0].start, at(9, 0));
        assert!(out.iter().all(|s| s.start == at(9, 0) || s.start >= at(13, 0)));
    }

    #[test]
    fn unsorted_busy_input_is_sorted_first() {
        let shuffled = [
            Span::new(at(15, 0), at(16, 0)),
            Span::new(at(10, 0), at(11, 0)),
        ];
        let ordered = [
            Span::new(at(10, 0), at(11, 0)),
            Span::new(at(15, 0), at(16, 0)),
        ];
        let a = slots(&shuffled, 30);
        let b = slots(&ordered, 30);
        let starts_a: Vec<_> = a.iter().map(|s| s.start).collect();
        let starts_b: Vec<_> = b.iter().map(|s| s.start).collect();
        assert_eq!(starts_a, starts_b);
    }

    #[test]
    fn every_slot_has_exact_duration_and_stays_in_window() {
        let busy = [
            Span::new(at(9, 40), at(10, 10)),
            Span::new(at(14, 0), at(15, 5)),
        ];
        for duration in [15, 30, 45, 60, 90] {
            for slot in slots(&busy, duration) {
                assert_eq!(slot.end - slot.start, Duration::minutes(duration));
                assert!(slot.start >= window().start);
                assert!(slot.end <= window().end);
            }
        }
    }

    #[test]
    fn no_slot_overlaps_a_busy_period() {
        let busy = [
            Span::new(at(9, 40), at(10, 10)),
            Span::new(at(12, 0), at(13, 0)),
            Span::new(at(16, 55), at(17, 30)),
        ];
        for slot in slots(&busy, 30) {
            let s = Span::new(slot.start, slot.end);
            for b in &busy {
                assert!(!s.overlaps(b), "slot {s:?} overlaps busy {b:?}");
            }
        }
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let room = Ulid::new();
        let busy = [Span::new(at(11, 0), at(11, 45))];
        let duration = Duration::minutes(45);
        let step = Duration::minutes(STEP);
        let a = generate_slots(window(), &busy, duration, step, room);
        let b = generate_slots(window(), &busy, duration, step, room);
        assert_eq!(a, b);
    }

    #[test]
    fn coarser_step_spaces_starts_wider() {
        let out = generate_slots(
            window(),
            &[],
            Duration::minutes(60),
            Duration::minutes(60),
            Ulid::new(),
        );
        // Hourly starts 09:00 through 17:00.
        assert_eq!(out.len(), 9);
        assert_eq!(out[1].start - out[0].start, Duration::minutes(60));
    }
}
