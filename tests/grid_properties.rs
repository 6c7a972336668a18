// Property-based tests for the month grid and the fetch window
// Random reference dates across several decades, leap years included

use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;
use task_planner::utils::date::{month_grid, shift_month, DateWindow, GRID_CELLS};

fn any_date() -> impl Strategy<Value = NaiveDate> {
    (1990..2060i32, 1..=12u32, 1..=31u32).prop_map(|(y, m, d)| {
        // Clamp to the last valid day of the month
        (1..=d)
            .rev()
            .find_map(|day| NaiveDate::from_ymd_opt(y, m, day))
            .unwrap()
    })
}

proptest! {
    /// Property: the grid is 42 consecutive days starting on a Monday
    #[test]
    fn prop_grid_is_six_consecutive_weeks(reference in any_date()) {
        let grid = month_grid(reference);
        prop_assert_eq!(grid.len(), GRID_CELLS);
        prop_assert_eq!(grid[0].weekday(), Weekday::Mon);
        for pair in grid.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
    }

    /// Property: the 1st of the month is in the first week of the grid
    #[test]
    fn prop_first_of_month_in_first_row(reference in any_date()) {
        let grid = month_grid(reference);
        let first = reference.with_day(1).unwrap();
        let pos = grid.iter().position(|d| *d == first);
        prop_assert!(matches!(pos, Some(p) if p < 7));
        // Every day of the month is displayed
        let last = shift_month(reference, 1).pred_opt().unwrap();
        prop_assert!(grid.contains(&last));
    }

    /// Property: the fetch window covers exactly the rendered cells
    #[test]
    fn prop_window_matches_grid(reference in any_date()) {
        let grid = month_grid(reference);
        let window = DateWindow::for_month(reference);
        prop_assert_eq!(window.start, grid[0]);
        prop_assert_eq!(window.end, grid[GRID_CELLS - 1]);
    }
}
