//! Month navigation and reload bookkeeping.
//!
//! Every window fetch is issued with a [`ReloadTicket`]. Only the result of
//! the most recently issued ticket may replace the loaded tasks; results of
//! older fetches that arrive later are discarded.

use chrono::NaiveDate;

use crate::utils::date::{first_of_month, shift_month, DateWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadTicket {
    seq: u64,
    window: DateWindow,
}

impl ReloadTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn window(&self) -> DateWindow {
        self.window
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReloadTracker {
    issued: u64,
}

impl ReloadTracker {
    pub fn issue(&mut self, window: DateWindow) -> ReloadTicket {
        self.issued += 1;
        ReloadTicket {
            seq: self.issued,
            window,
        }
    }

    pub fn is_current(&self, ticket: &ReloadTicket) -> bool {
        ticket.seq == self.issued
    }
}

/// First day of the month `delta` months away from `current`.
pub fn navigate(current: NaiveDate, delta: i32) -> NaiveDate {
    first_of_month(shift_month(current, delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut tracker = ReloadTracker::default();
        let first = tracker.issue(DateWindow::for_month(ymd(2024, 3, 1)));
        let second = tracker.issue(DateWindow::for_month(ymd(2024, 4, 1)));
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(second.seq() > first.seq());
    }

    #[test_case(ymd(2024, 1, 31), 1, ymd(2024, 2, 1); "forward past short month")]
    #[test_case(ymd(2024, 1, 15), -1, ymd(2023, 12, 1); "back across year")]
    #[test_case(ymd(2024, 12, 3), 1, ymd(2025, 1, 1); "forward across year")]
    fn test_navigate(current: NaiveDate, delta: i32, expected: NaiveDate) {
        assert_eq!(navigate(current, delta), expected);
    }
}
