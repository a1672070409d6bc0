//! Allen's interval algebra on the schedule time axis.
//!
//! See Allen, "Maintaining Knowledge about Temporal Intervals", CACM 1983.

use qtty::{Quantity, Second};
use std::fmt::Display;

/// Time axis quantity: seconds since the schedule epoch.
pub type Seconds = Quantity<Second>;

/// A closed time interval `[start, end]` implementing the 13 Allen
/// relations.
///
/// For any ordered pair of intervals with positive duration, exactly one of
/// the relations holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    start: Seconds,
    end: Seconds,
}

impl Interval {
    /// Creates the interval `[start, end]`.
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: Seconds, end: Seconds) -> Self {
        assert!(
            start.value() <= end.value(),
            "interval start must be <= end"
        );
        Self { start, end }
    }

    pub fn from_f64(start: f64, end: f64) -> Self {
        Self::new(Quantity::new(start), Quantity::new(end))
    }

    pub fn start(&self) -> Seconds {
        self.start
    }

    pub fn end(&self) -> Seconds {
        self.end
    }

    pub fn duration(&self) -> Seconds {
        self.end - self.start
    }

    /// `XXX YYY`: this interval ends strictly before `other` begins.
    pub fn precedes(&self, other: &Interval) -> bool {
        self.end.value() < other.start.value()
    }

    /// `XXXYYY`: this interval ends exactly where `other` begins.
    pub fn meets(&self, other: &Interval) -> bool {
        self.end.value() == other.start.value()
    }

    /// ```text
    /// XXX
    ///  YYY
    /// ```
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start.value() < other.start.value()
            && self.end.value() > other.start.value()
            && self.end.value() < other.end.value()
    }

    /// ```text
    /// XXX
    /// YYYYY
    /// ```
    pub fn starts(&self, other: &Interval) -> bool {
        self.start.value() == other.start.value() && self.end.value() < other.end.value()
    }

    /// ```text
    ///  XXX
    /// YYYYY
    /// ```
    pub fn during(&self, other: &Interval) -> bool {
        self.start.value() > other.start.value() && self.end.value() < other.end.value()
    }

    /// ```text
    ///   XXX
    /// YYYYY
    /// ```
    pub fn finishes(&self, other: &Interval) -> bool {
        self.start.value() > other.start.value() && self.end.value() == other.end.value()
    }

    /// Both endpoints coincide.
    pub fn equals(&self, other: &Interval) -> bool {
        self.start.value() == other.start.value() && self.end.value() == other.end.value()
    }

    /// ```text
    /// XXXXX
    ///   YYY
    /// ```
    pub fn finished_by(&self, other: &Interval) -> bool {
        self.start.value() < other.start.value() && self.end.value() == other.end.value()
    }

    /// ```text
    /// XXXXX
    ///  YYY
    /// ```
    pub fn contains(&self, other: &Interval) -> bool {
        self.start.value() < other.start.value() && self.end.value() > other.end.value()
    }

    /// ```text
    /// XXXXX
    /// YYY
    /// ```
    pub fn started_by(&self, other: &Interval) -> bool {
        self.start.value() == other.start.value() && self.end.value() > other.end.value()
    }

    /// ```text
    ///  XXX
    /// YYY
    /// ```
    pub fn overlapped_by(&self, other: &Interval) -> bool {
        self.start.value() > other.start.value()
            && self.start.value() < other.end.value()
            && self.end.value() > other.end.value()
    }

    /// `YYYXXX`: this interval begins exactly where `other` ends.
    pub fn met_by(&self, other: &Interval) -> bool {
        self.start.value() == other.end.value()
    }

    /// `YYY XXX`: this interval begins strictly after `other` ends.
    pub fn preceded_by(&self, other: &Interval) -> bool {
        self.start.value() > other.end.value()
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.3}, {:.3}]", self.start.value(), self.end.value())
    }
}
