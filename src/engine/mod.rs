mod availability;
mod error;
mod selection;
mod series;
mod summary;

pub use availability::{first_blocker, generate_slots, is_busy};
pub use error::SlotError;
pub use selection::{RangeSelection, SelectionChange};
pub use series::{check_series, recurrence_label, WeeklySeries};
pub use summary::{is_occupied, occupancy_at, summarize, OccupancySummary};
