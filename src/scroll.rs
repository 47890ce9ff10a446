//! Scroll observer that turns grid movement into "load more" requests

use serde::{Deserialize, Serialize};

/// How close (in grid rows) to the last loaded row the selection must be
/// before the next page is requested.
pub const SCROLL_THRESHOLD_ROWS: usize = 2;

/// Where the selection sits in the card grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollPosition {
    pub row: usize,
    pub total_rows: usize,
}

impl ScrollPosition {
    pub fn in_grid(index: usize, len: usize, columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            row: index / columns,
            total_rows: len.div_ceil(columns),
        }
    }
}

/// Subscription to list scrolling.
///
/// The list screen attaches it while visible and detaches it when another
/// screen takes over; a detached observer never reports the end of the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollObserver {
    attached: bool,
    threshold_rows: usize,
}

impl Default for ScrollObserver {
    fn default() -> Self {
        Self::new(SCROLL_THRESHOLD_ROWS)
    }
}

impl ScrollObserver {
    pub fn new(threshold_rows: usize) -> Self {
        Self {
            attached: false,
            threshold_rows,
        }
    }

    pub fn attach(&mut self) {
        self.attached = true;
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// True when an attached observer sees the selection near the last row.
    pub fn near_end(&self, position: ScrollPosition) -> bool {
        if !self.attached || position.total_rows == 0 {
            return false;
        }
        position.row + self.threshold_rows >= position.total_rows - 1
    }
}
