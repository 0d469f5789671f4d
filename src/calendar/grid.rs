use crate::calendar::date_state::DateState;
use crate::consts::DAYS_PER_WEEK;

/// One cell of the day grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DayCell {
    day: Option<u32>,
    disabled: bool,
}

impl DayCell {
    /// Padding cell. Always disabled.
    pub const EMPTY: Self = Self {
        day: None,
        disabled: true,
    };

    pub const fn day(&self) -> Option<u32> {
        self.day
    }

    pub const fn is_empty(&self) -> bool {
        self.day.is_none()
    }

    pub const fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Day number a click on this cell commits, if any
    pub const fn selectable_day(&self) -> Option<u32> {
        if self.disabled { None } else { self.day }
    }
}

/// Seven cells, Monday through Sunday.
pub type WeekRow = [DayCell; DAYS_PER_WEEK];

/// Day cells of one month laid out in Monday-first week rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    rows: Vec<WeekRow>,
}

impl CalendarGrid {
    /// Lays out the selected month of `state`. Days before today are disabled.
    pub fn build(state: &DateState) -> Self {
        let mut rows = Vec::new();
        let mut row = [DayCell::EMPTY; DAYS_PER_WEEK];
        let mut filled = state.first_weekday_offset() as usize;

        for day in 1..=state.days_in_month() {
            row[filled] = DayCell {
                day: Some(day),
                disabled: state.is_before_today(day),
            };
            filled += 1;

            if filled == DAYS_PER_WEEK {
                rows.push(row);
                row = [DayCell::EMPTY; DAYS_PER_WEEK];
                filled = 0;
            }
        }

        // trailing cells are already EMPTY
        if filled > 0 {
            rows.push(row);
        }

        Self { rows }
    }

    pub fn rows(&self) -> &[WeekRow] {
        &self.rows
    }

    pub fn cells(&self) -> impl Iterator<Item = &DayCell> {
        self.rows.iter().flatten()
    }

    /// Number of blank cells before the 1st
    pub fn leading_blanks(&self) -> usize {
        self.cells().take_while(|cell| cell.is_empty()).count()
    }

    /// Number of blank cells after the last day
    pub fn trailing_blanks(&self) -> usize {
        self.rows
            .last()
            .map_or(0, |row| row.iter().rev().take_while(|cell| cell.is_empty()).count())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn state_for(today: (i32, u32, u32)) -> DateState {
        DateState::new(NaiveDate::from_ymd_opt(today.0, today.1, today.2).unwrap())
    }

    #[test]
    fn test_march_2024_layout() {
        let grid = CalendarGrid::build(&state_for((2024, 3, 15)));
        assert_eq!(grid.leading_blanks(), 4);
        assert_eq!(grid.rows().len(), 5);
        // 4 + 31 = 35 cells, no trailing padding
        assert_eq!(grid.trailing_blanks(), 0);

        let first_row: Vec<Option<u32>> = grid.rows()[0].iter().map(DayCell::day).collect();
        assert_eq!(first_row, vec![None, None, None, None, Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_past_days_disabled() {
        let grid = CalendarGrid::build(&state_for((2024, 3, 15)));
        for cell in grid.cells().filter(|cell| !cell.is_empty()) {
            let day = cell.day().unwrap();
            if day < 15 {
                assert!(cell.is_disabled(), "day {day} should be disabled");
                assert_eq!(cell.selectable_day(), None);
            } else {
                assert!(!cell.is_disabled(), "day {day} should be enabled");
                assert_eq!(cell.selectable_day(), Some(day));
            }
        }
    }

    #[test]
    fn test_empty_cells_disabled() {
        let grid = CalendarGrid::build(&state_for((2024, 3, 15)));
        assert!(grid.cells().filter(|c| c.is_empty()).all(DayCell::is_disabled));
        assert_eq!(DayCell::EMPTY.selectable_day(), None);
    }

    #[test]
    fn test_exactly_full_last_row_adds_nothing() {
        // February 2021: starts on a Monday, 28 days
        let mut state = state_for((2021, 1, 10));
        state.select_month(1);
        let grid = CalendarGrid::build(&state);
        assert_eq!(grid.leading_blanks(), 0);
        assert_eq!(grid.trailing_blanks(), 0);
        assert_eq!(grid.rows().len(), 4);
    }

    #[test]
    fn test_trailing_padding() {
        // April 2024: starts on a Monday, 30 days -> 5 trailing blanks
        let mut state = state_for((2024, 3, 15));
        state.select_month(3);
        let grid = CalendarGrid::build(&state);
        assert_eq!(grid.leading_blanks(), 0);
        assert_eq!(grid.trailing_blanks(), 5);
        assert_eq!(grid.rows().len(), 5);
    }

    #[test]
    fn test_six_row_month() {
        // September 2024: starts on a Sunday, 30 days
        let mut state = state_for((2024, 3, 15));
        state.select_month(8);
        let grid = CalendarGrid::build(&state);
        assert_eq!(grid.leading_blanks(), 6);
        assert_eq!(grid.rows().len(), 6);
        assert_eq!(grid.trailing_blanks(), 6);
    }

    #[test]
    fn test_cell_count_multiple_of_seven_for_all_months() {
        let today = (2000, 1, 1);
        for year in 1990..=2040 {
            for month in 0..12 {
                let mut state = state_for(today);
                state.select_year(year);
                state.select_month(month);
                let grid = CalendarGrid::build(&state);
                let cells = grid.cells().count();
                assert_eq!(cells % DAYS_PER_WEEK, 0, "{year}-{}", month + 1);
                assert_eq!(
                    cells,
                    grid.leading_blanks() + state.days_in_month() as usize + grid.trailing_blanks(),
                    "{year}-{}",
                    month + 1
                );
                assert_eq!(grid.leading_blanks(), state.first_weekday_offset() as usize);
            }
        }
    }

    #[test]
    fn test_future_month_fully_enabled() {
        let mut state = state_for((2024, 3, 15));
        state.select_year(2025);
        state.select_month(0);
        let grid = CalendarGrid::build(&state);
        assert!(
            grid.cells()
                .filter(|c| !c.is_empty())
                .all(|c| !c.is_disabled())
        );
    }

    #[test]
    fn test_past_year_fully_disabled() {
        let mut state = state_for((2024, 3, 15));
        state.select_year(2020);
        let grid = CalendarGrid::build(&state);
        assert!(grid.cells().all(DayCell::is_disabled));
    }
}
