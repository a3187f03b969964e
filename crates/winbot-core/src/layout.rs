//! Layout policy — how a flat button list is cut into rows.
//!
//! `row_sizes` is consumed left to right. When it runs out:
//! - `repeat = true` replays the sizes from the start;
//! - otherwise `exhaustion` decides: `Overflow` puts every remaining button
//!   into one final row, `RepeatLast` keeps applying the last size.

use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// What happens to leftover buttons once `row_sizes` is exhausted and
/// `repeat` is off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exhaustion {
    /// All remaining buttons go into one final row.
    #[default]
    Overflow,
    /// The last size is applied to every following row.
    RepeatLast,
}

/// Row-size sequence plus repeat behavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawLayout")]
pub struct LayoutPolicy {
    row_sizes: Vec<usize>,
    repeat: bool,
    exhaustion: Exhaustion,
}

impl LayoutPolicy {
    /// Create a policy. Sizes must be non-empty and all positive.
    pub fn new(row_sizes: impl Into<Vec<usize>>, repeat: bool) -> Result<Self, WindowError> {
        let row_sizes = row_sizes.into();
        if row_sizes.is_empty() {
            return Err(WindowError::InvalidLayout("row sizes can't be empty".into()));
        }
        if let Some(pos) = row_sizes.iter().position(|&s| s == 0) {
            return Err(WindowError::InvalidLayout(format!(
                "row size #{pos} is zero"
            )));
        }
        Ok(Self {
            row_sizes,
            repeat,
            exhaustion: Exhaustion::default(),
        })
    }

    /// Override the exhaustion rule (only consulted when `repeat` is off).
    pub fn with_exhaustion(mut self, exhaustion: Exhaustion) -> Self {
        self.exhaustion = exhaustion;
        self
    }

    pub fn row_sizes(&self) -> &[usize] {
        &self.row_sizes
    }

    pub fn repeat(&self) -> bool {
        self.repeat
    }

    pub fn exhaustion(&self) -> Exhaustion {
        self.exhaustion
    }

    /// Size of the row with the given index.
    ///
    /// `None` means "everything that is left" (overflow row).
    fn size_of_row(&self, row: usize) -> Option<usize> {
        let n = self.row_sizes.len();
        if row < n {
            return Some(self.row_sizes[row]);
        }
        if self.repeat {
            return Some(self.row_sizes[row % n]);
        }
        match self.exhaustion {
            Exhaustion::Overflow => None,
            Exhaustion::RepeatLast => self.row_sizes.last().copied(),
        }
    }

    /// Chunk `buttons` into rows. Order is preserved and every item lands in
    /// exactly one row.
    pub fn build_rows<T: Clone>(&self, buttons: &[T]) -> Vec<Vec<T>> {
        let mut rows = Vec::new();
        let mut rest = buttons;
        let mut row = 0;

        while !rest.is_empty() {
            let take = match self.size_of_row(row) {
                Some(size) => size.min(rest.len()),
                None => rest.len(),
            };
            let (head, tail) = rest.split_at(take);
            rows.push(head.to_vec());
            rest = tail;
            row += 1;
        }

        rows
    }
}

impl Default for LayoutPolicy {
    /// One button per row.
    fn default() -> Self {
        Self {
            row_sizes: vec![1],
            repeat: true,
            exhaustion: Exhaustion::default(),
        }
    }
}

/// Unvalidated on-disk form.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLayout {
    #[serde(alias = "sizes")]
    row_sizes: Vec<usize>,
    #[serde(default)]
    repeat: bool,
    #[serde(default)]
    exhaustion: Exhaustion,
}

impl TryFrom<RawLayout> for LayoutPolicy {
    type Error = WindowError;

    fn try_from(raw: RawLayout) -> Result<Self, Self::Error> {
        Ok(LayoutPolicy::new(raw.row_sizes, raw.repeat)?.with_exhaustion(raw.exhaustion))
    }
}
