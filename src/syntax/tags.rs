//! Style tags
//!
//! A tag is a named category with a visual style and the ranges of buffer
//! text currently carrying it. Where ranges of several tags overlap, the tag
//! later in `TokenCategory::APPLY_ORDER` wins.
//!
//! Each tag keeps its ranges sorted by start, so drawing a line only looks
//! at the ranges that can reach it.

use std::ops::Range;

use super::style::Theme;
use super::tokens::TokenCategory;

/// Ranges assigned to every category, plus the theme that styles them
#[derive(Debug, Clone, Default)]
pub struct TagTable {
    ranges: [Vec<Range<usize>>; TokenCategory::COUNT],
    /// Length of the longest range in each tag
    longest: [usize; TokenCategory::COUNT],
    theme: Theme,
}

/// A run of text within a line that shares one style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyledRun {
    /// Byte offset within the line (inclusive)
    pub start: usize,
    /// Byte offset within the line (exclusive)
    pub end: usize,
    /// Winning category, or None for plain text
    pub category: Option<TokenCategory>,
}

impl TagTable {
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Remove every range from one tag
    pub fn clear(&mut self, category: TokenCategory) {
        self.ranges[category.index()].clear();
        self.longest[category.index()] = 0;
    }

    /// Add a range to a tag. Empty ranges are ignored.
    ///
    /// Adding in start order appends; anything else is inserted in place.
    pub fn add(&mut self, category: TokenCategory, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let ranges = &mut self.ranges[category.index()];
        let at = ranges.partition_point(|r| r.start <= start);
        ranges.insert(at, start..end);
        let longest = &mut self.longest[category.index()];
        *longest = (*longest).max(end - start);
    }

    /// Ranges currently carried by a tag, sorted by start
    pub fn ranges(&self, category: TokenCategory) -> &[Range<usize>] {
        &self.ranges[category.index()]
    }

    /// Total number of ranges over all tags
    #[cfg(test)]
    pub fn range_count(&self) -> usize {
        self.ranges.iter().map(Vec::len).sum()
    }

    /// Largest end offset over all tags
    #[cfg(test)]
    pub fn max_end(&self) -> Option<usize> {
        self.ranges.iter().flatten().map(|r| r.end).max()
    }

    /// The category whose style shows at a position
    #[cfg(test)]
    pub fn category_at(&self, pos: usize) -> Option<TokenCategory> {
        TokenCategory::APPLY_ORDER
            .into_iter()
            .rev()
            .find(|category| self.ranges(*category).iter().any(|r| r.contains(&pos)))
    }

    /// Split `[line_start, line_start + len)` into runs of equal category
    ///
    /// Runs are relative to `line_start`, cover the whole span in order, and
    /// are produced by painting each tag over the previous ones in
    /// application order.
    pub fn runs(&self, line_start: usize, len: usize) -> Vec<StyledRun> {
        if len == 0 {
            return Vec::new();
        }

        let line_end = line_start + len;
        let mut painted: Vec<Option<TokenCategory>> = vec![None; len];
        for category in TokenCategory::APPLY_ORDER {
            for range in self.ranges_near(category, line_start, line_end) {
                let start = range.start.max(line_start);
                let end = range.end.min(line_end);
                if start < end {
                    for cell in &mut painted[start - line_start..end - line_start] {
                        *cell = Some(category);
                    }
                }
            }
        }

        let mut runs: Vec<StyledRun> = Vec::new();
        for (i, category) in painted.into_iter().enumerate() {
            match runs.last_mut() {
                Some(run) if run.category == category => run.end = i + 1,
                _ => runs.push(StyledRun {
                    start: i,
                    end: i + 1,
                    category,
                }),
            }
        }
        runs
    }

    /// The ranges of one tag that may overlap `[start, end)`
    fn ranges_near(&self, category: TokenCategory, start: usize, end: usize) -> &[Range<usize>] {
        let ranges = self.ranges(category);
        let longest = self.longest[category.index()];
        // Anything starting this far back ends before `start`
        let first = ranges.partition_point(|r| r.start + longest <= start);
        let last = ranges.partition_point(|r| r.start < end);
        &ranges[first..last]
    }
}
