//! Navigation cursor over the working dataset.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Cursor into a dataset of `len` items.
///
/// The cursor is `None` exactly when the dataset is empty; otherwise it
/// stays within `0..len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigator {
    cursor: Option<usize>,
    len: usize,
}

impl Navigator {
    /// Navigator for a freshly loaded dataset: positioned at 0.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            cursor: (len > 0).then_some(0),
            len,
        }
    }

    /// Rebuild a navigator from a persisted cursor, clamping it into range.
    #[must_use]
    pub fn restore(len: usize, cursor: usize) -> Self {
        Self {
            cursor: (len > 0).then(|| cursor.min(len - 1)),
            len,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move by `delta`, clamping into range.
    ///
    /// Returns whether the cursor changed. Always `false` on an empty
    /// dataset.
    pub fn move_by(&mut self, delta: isize) -> bool {
        let Some(current) = self.cursor else {
            return false;
        };
        let last = self.len - 1;
        let target = current.saturating_add_signed(delta).min(last);
        if target == current {
            return false;
        }
        self.cursor = Some(target);
        true
    }

    /// Resolve a 1-based user position to a 0-based index without moving.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the input is not an integer, `JumpOutOfRange`
    /// when it falls outside `1..=len`, `NoDataset` when empty.
    pub fn resolve_position(&self, input: &str) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::NoDataset);
        }
        let position: i64 = input.trim().parse().map_err(|_| {
            Error::InvalidArgument(format!("position '{input}' is not a whole number"))
        })?;
        usize::try_from(position)
            .ok()
            .filter(|p| (1..=self.len).contains(p))
            .map(|p| p - 1)
            .ok_or(Error::JumpOutOfRange {
                position,
                len: self.len,
            })
    }

    /// Jump to a 1-based user position. Out-of-range input is rejected,
    /// never clamped.
    ///
    /// # Errors
    ///
    /// See [`Navigator::resolve_position`].
    pub fn jump(&mut self, input: &str) -> Result<usize> {
        let index = self.resolve_position(input)?;
        self.cursor = Some(index);
        Ok(index)
    }
}
