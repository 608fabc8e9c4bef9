//! Timepoints, timings and intervals.
//!
//! Temporal bounds are ordinary numeric expressions; this module only names the points in time
//! they are measured from and the interval shapes built over them. A [`Timing`] becomes an
//! expression through [`ExpressionManager::timing_exp`](crate::expr::manager::ExpressionManager::timing_exp).
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use strum::{Display, EnumIs};

use crate::expr::Expr;

/// A reference point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Timepoint {
    /// Start of the plan.
    GlobalStart,
    /// End of the plan.
    GlobalEnd,
    /// Start of the enclosing durative action.
    Start,
    /// End of the enclosing durative action.
    End,
}

/// A timepoint shifted by a constant delay.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timing {
    timepoint: Timepoint,
    delay: BigRational,
}

impl Timing {
    pub fn new(timepoint: Timepoint, delay: BigRational) -> Self {
        Self { timepoint, delay }
    }

    pub fn start() -> Self {
        Self::new(Timepoint::Start, BigRational::zero())
    }

    pub fn end() -> Self {
        Self::new(Timepoint::End, BigRational::zero())
    }

    pub fn global_start() -> Self {
        Self::new(Timepoint::GlobalStart, BigRational::zero())
    }

    pub fn global_end() -> Self {
        Self::new(Timepoint::GlobalEnd, BigRational::zero())
    }

    /// The same timepoint with `delay` added to the current delay.
    pub fn delayed(&self, delay: BigRational) -> Self {
        Self::new(self.timepoint, &self.delay + delay)
    }

    #[inline]
    pub fn timepoint(&self) -> Timepoint {
        self.timepoint
    }

    #[inline]
    pub fn delay(&self) -> &BigRational {
        &self.delay
    }

    /// Measured from a start (of the plan or of an action).
    pub fn is_from_start(&self) -> bool {
        matches!(self.timepoint, Timepoint::Start | Timepoint::GlobalStart)
    }

    /// Measured from an end (of the plan or of an action).
    pub fn is_from_end(&self) -> bool {
        !self.is_from_start()
    }
}

impl std::fmt::Display for Timing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.delay.is_zero() {
            write!(f, "{}", self.timepoint)
        } else if self.delay.is_negative() {
            write!(f, "{} - {}", self.timepoint, -&self.delay)
        } else {
            write!(f, "{} + {}", self.timepoint, self.delay)
        }
    }
}

/// An interval between two bounds, each of which may be open or closed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    lower: T,
    upper: T,
    lower_open: bool,
    upper_open: bool,
}

/// Interval whose bounds are numeric expressions (durations).
pub type DurationInterval = Interval<Expr>;

/// Interval whose bounds are timings.
pub type TimeInterval = Interval<Timing>;

impl<T> Interval<T> {
    pub fn new(lower: T, upper: T, lower_open: bool, upper_open: bool) -> Self {
        Self {
            lower,
            upper,
            lower_open,
            upper_open,
        }
    }

    /// `[lower, upper]`
    pub fn closed(lower: T, upper: T) -> Self {
        Self::new(lower, upper, false, false)
    }

    /// `(lower, upper)`
    pub fn open(lower: T, upper: T) -> Self {
        Self::new(lower, upper, true, true)
    }

    /// `(lower, upper]`
    pub fn left_open(lower: T, upper: T) -> Self {
        Self::new(lower, upper, true, false)
    }

    /// `[lower, upper)`
    pub fn right_open(lower: T, upper: T) -> Self {
        Self::new(lower, upper, false, true)
    }

    #[inline]
    pub fn lower(&self) -> &T {
        &self.lower
    }

    #[inline]
    pub fn upper(&self) -> &T {
        &self.upper
    }

    #[inline]
    pub fn is_left_open(&self) -> bool {
        self.lower_open
    }

    #[inline]
    pub fn is_right_open(&self) -> bool {
        self.upper_open
    }
}

impl<T: Clone + PartialEq> Interval<T> {
    /// `[point, point]`
    pub fn point(point: T) -> Self {
        Self::closed(point.clone(), point)
    }

    /// A closed interval whose bounds coincide.
    pub fn is_point(&self) -> bool {
        !self.lower_open && !self.upper_open && self.lower == self.upper
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (l, r) = (
            if self.lower_open { '(' } else { '[' },
            if self.upper_open { ')' } else { ']' },
        );
        write!(f, "{l}{}, {}{r}", self.lower, self.upper)
    }
}
