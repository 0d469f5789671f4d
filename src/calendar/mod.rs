//! Date picker: month state, day grid layout and the popup widget.

pub mod date_state;
pub mod grid;
pub mod widget;

pub use date_state::{DateState, HostDate, days_in_month, first_weekday_offset, parse_host_date};
pub use grid::{CalendarGrid, DayCell, WeekRow};
pub use widget::{Calendar, popup_offset};
