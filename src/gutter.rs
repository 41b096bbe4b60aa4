//! Line-number gutter
//!
//! The gutter is redrawn from scratch on every call: starting from the
//! character under the viewport's top-left cell, it asks the buffer access
//! for the row of each successive line and records one label per line that
//! is laid out, stopping at the first one that is not.

use tracing::{debug, warn};

use crate::access::BufferAccess;
use crate::error::Result;

/// One rendered gutter label; valid until the next redraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleLine {
    /// 1-based line number
    pub line_number: usize,
    /// Screen row the line is drawn on
    pub row: u16,
}

/// Walks the viewport and holds the labels of the last walk
#[derive(Debug, Default)]
pub struct GutterRenderer {
    labels: Vec<VisibleLine>,
}

impl GutterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels from the most recent redraw, in ascending line order
    pub fn labels(&self) -> &[VisibleLine] {
        &self.labels
    }

    /// Widest label in characters (at least one)
    pub fn label_width(&self) -> usize {
        self.labels
            .last()
            .map(|l| l.line_number.to_string().len())
            .unwrap_or(1)
    }

    /// Clear all labels and repaint one per visible line
    ///
    /// A failing layout query ends the walk as if no more lines were
    /// visible; it is logged, never propagated.
    pub fn redraw(&mut self, access: &dyn BufferAccess) -> usize {
        self.labels.clear();

        if let Err(e) = self.walk(access) {
            warn!(error = %e, labels = self.labels.len(), "gutter walk stopped early");
        }

        debug!(labels = self.labels.len(), "gutter redrawn");
        self.labels.len()
    }

    fn walk(&mut self, access: &dyn BufferAccess) -> Result<()> {
        let mut position = access.top_visible_position()?;
        let mut line_number = access.line_index_at(position)? + 1;

        while let Some(row) = access.line_offset_at(position)? {
            if self.labels.last().is_some_and(|prev| row <= prev.row) {
                break;
            }
            self.labels.push(VisibleLine { line_number, row });

            let next = access.next_line_start(position)?;
            if next <= position {
                break;
            }
            position = next;
            line_number += 1;
        }
        Ok(())
    }
}
