// Date utility functions
// Month grid and fetch window helpers shared by the board and the store

use chrono::{Datelike, Days, Months, NaiveDate};

/// Number of cells in a displayed month (six full weeks).
pub const GRID_CELLS: usize = 42;

/// Format used for date keys on the wire and in the task index.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Monday on or before `date`. Sunday counts as weekday 7.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().number_from_monday() - 1;
    date - Days::new(u64::from(offset))
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Build the 42 dates shown for the month containing `reference`.
///
/// The grid starts on the Monday on or before the 1st and always spans six
/// weeks, so leading and trailing cells from adjacent months are included.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use task_planner::utils::date::month_grid;
///
/// let grid = month_grid(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
/// assert_eq!(grid.len(), 42);
/// assert_eq!(grid[0], NaiveDate::from_ymd_opt(2024, 2, 26).unwrap());
/// ```
pub fn month_grid(reference: NaiveDate) -> Vec<NaiveDate> {
    let start = start_of_week(first_of_month(reference));
    start.iter_days().take(GRID_CELLS).collect()
}

/// Shift to the first day of the month `delta` months away from `date`.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(date);
    let months = Months::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        first.checked_add_months(months)
    } else {
        first.checked_sub_months(months)
    };
    shifted.unwrap_or(first)
}

/// Render a date as its `YYYY-MM-DD` key.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` key.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT)
}

/// True for Saturday and Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().number_from_monday() >= 6
}

/// Inclusive 6-week span used both for rendering and for fetching tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window displayed for the month containing `reference`.
    pub fn for_month(reference: NaiveDate) -> Self {
        let start = start_of_week(first_of_month(reference));
        let end = start + Days::new(GRID_CELLS as u64 - 1);
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
