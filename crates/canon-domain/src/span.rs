//! Byte spans into a source document

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open byte range `[start, end)` into a backstory or a novel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// First byte offset (inclusive)
    pub start: usize,
    /// Last byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a span, swapping the bounds if they are given in reverse
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Number of bytes covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two spans share at least one byte.
    ///
    /// Two empty spans at the same offset also count as overlapping, so a
    /// backend that reports point locations still deduplicates.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.start == other.start
                || (other.start > self.start && other.start < self.end)
                || (self.start > other.start && self.start < other.end);
        }
        self.start < other.end && other.start < self.end
    }

    /// Slice the span out of `text`, if it lies on character boundaries
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
