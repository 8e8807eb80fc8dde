use crate::{Error, Result};
use core::ops::RangeInclusive;

/// Maximum number of integers a single [`Range`] may span, inclusive.
pub const MAX_RANGE_SIZE: usize = 100;

/// A validated, inclusive span of integers.
///
/// A `Range` can only be obtained through [`Range::new`] or [`Range::parse`],
/// so every instance satisfies `from <= to` and `len() <= MAX_RANGE_SIZE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    from: i64,
    to: i64,
}

impl Range {
    /// Validates a pair of bounds.
    ///
    /// # Errors
    ///
    /// - [`Error::FromGreaterThanTo`] if `from > to`.
    /// - [`Error::RangeTooLarge`] if the span exceeds [`MAX_RANGE_SIZE`].
    pub fn new(from: i64, to: i64) -> Result<Self> {
        if from > to {
            return Err(Error::FromGreaterThanTo);
        }
        // `abs_diff` is `to - from` computed in `u64`, so it cannot overflow
        // even for `i64::MIN..=i64::MAX`.
        if to.abs_diff(from) >= MAX_RANGE_SIZE as u64 {
            return Err(Error::RangeTooLarge);
        }
        Ok(Self { from, to })
    }

    /// Parses and validates raw request bounds.
    ///
    /// Both inputs must be base-10 integers with an optional sign and no
    /// surrounding whitespace. Parsing is checked for both bounds before
    /// ordering, so a non-integer always wins over the other checks.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnInteger`] if either bound fails to parse.
    /// - Any error from [`Range::new`].
    pub fn parse(from_raw: &str, to_raw: &str) -> Result<Self> {
        let from = from_raw.parse::<i64>();
        let to = to_raw.parse::<i64>();
        Self::new(from?, to?)
    }

    /// The first integer in the range.
    pub const fn from(&self) -> i64 {
        self.from
    }

    /// The last integer in the range.
    pub const fn to(&self) -> i64 {
        self.to
    }

    /// Number of integers in the range. Always in `1..=MAX_RANGE_SIZE`.
    pub const fn len(&self) -> usize {
        self.to.abs_diff(self.from) as usize + 1
    }

    /// Always `false`; a valid range holds at least one integer.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The integers in ascending order.
    pub const fn iter(&self) -> RangeInclusive<i64> {
        self.from..=self.to
    }
}

impl IntoIterator for Range {
    type Item = i64;
    type IntoIter = RangeInclusive<i64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_element_range() {
        let range = Range::new(5, 5).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range.iter().collect::<Vec<_>>(), [5]);
    }

    #[test]
    fn accepts_exactly_max_span() {
        let range = Range::new(1, 100).unwrap();
        assert_eq!(range.len(), MAX_RANGE_SIZE);
    }

    #[test]
    fn rejects_one_past_max_span() {
        assert_eq!(Range::new(1, 101), Err(Error::RangeTooLarge));
        assert_eq!(Range::new(1, 102), Err(Error::RangeTooLarge));
    }

    #[test]
    fn rejects_reversed_bounds() {
        assert_eq!(Range::new(10, 3), Err(Error::FromGreaterThanTo));
    }

    #[test]
    fn parse_rejects_non_integers() {
        assert_eq!(Range::parse("x", "5"), Err(Error::NotAnInteger));
        assert_eq!(Range::parse("1", "5.0"), Err(Error::NotAnInteger));
        assert_eq!(Range::parse("", "5"), Err(Error::NotAnInteger));
        assert_eq!(Range::parse(" 1", "5"), Err(Error::NotAnInteger));
        assert_eq!(
            Range::parse("1", "99999999999999999999"),
            Err(Error::NotAnInteger)
        );
    }

    #[test]
    fn non_integer_wins_over_ordering() {
        assert_eq!(Range::parse("10", "y"), Err(Error::NotAnInteger));
        assert_eq!(Range::parse("x", "-10"), Err(Error::NotAnInteger));
    }

    #[test]
    fn parse_accepts_signs() {
        let range = Range::parse("-3", "+3").unwrap();
        assert_eq!(range.from(), -3);
        assert_eq!(range.to(), 3);
        assert_eq!(range.len(), 7);
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        assert_eq!(Range::new(i64::MIN, i64::MAX), Err(Error::RangeTooLarge));

        let top = Range::new(i64::MAX - 99, i64::MAX).unwrap();
        assert_eq!(top.len(), MAX_RANGE_SIZE);
        assert_eq!(top.iter().last(), Some(i64::MAX));

        let bottom = Range::new(i64::MIN, i64::MIN + 99).unwrap();
        assert_eq!(bottom.len(), MAX_RANGE_SIZE);
        assert_eq!(bottom.into_iter().next(), Some(i64::MIN));
    }
}
