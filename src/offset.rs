use alloc::boxed::Box;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive};

use crate::error::Error;

/// Seconds in a civil day.
const SECONDS_PER_DAY: i32 = 86_400;

/// An offset from UTC, applied to a datetime for presentation.
///
/// Negative offsets correspond to time zones west of the prime meridian,
/// while positive offsets correspond to time zones east of the prime
/// meridian. Equivalently, in all cases, `civil-time - offset = UTC`.
///
/// An offset is almost always a whole number of seconds, and is stored as
/// one. The exception is an offset constructed from an arbitrary fraction
/// of a day via [`UtcOffset::from_day_fraction`], which is kept exactly; a
/// datetime carrying such an offset is held in its exact form rather than
/// its packed machine-integer form.
///
/// The absolute value of an offset is strictly less than one day.
///
/// # Example
///
/// ```
/// use lilian::UtcOffset;
///
/// let tokyo = UtcOffset::from_seconds(9 * 60 * 60)?;
/// assert_eq!(tokyo.to_string(), "+09:00");
/// assert_eq!(tokyo.whole_seconds(), Some(32_400));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UtcOffset {
    kind: OffsetKind,
}

/// The representation of an offset.
///
/// Invariant: `Exact` never holds a value expressible as a whole number of
/// seconds. Constructors demote such values to `Seconds`, which is what
/// makes the derived equality semantically correct.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum OffsetKind {
    Seconds(i32),
    Exact(Box<BigRational>),
}

impl UtcOffset {
    /// The offset corresponding to UTC. That is, no offset at all.
    pub const UTC: UtcOffset = UtcOffset { kind: OffsetKind::Seconds(0) };

    /// Creates a new offset in a `const` context from a given number of
    /// hours.
    ///
    /// The fallible non-const version of this constructor is
    /// [`UtcOffset::from_seconds`].
    ///
    /// # Panics
    ///
    /// This routine panics when the given number of hours is out of range.
    /// Namely, `hours` must be in the range `-23..=23`.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::UtcOffset;
    ///
    /// let o = UtcOffset::constant(-5);
    /// assert_eq!(o.whole_seconds(), Some(-18_000));
    /// ```
    #[inline]
    pub const fn constant(hours: i8) -> UtcOffset {
        if hours <= -24 || 24 <= hours {
            panic!("invalid offset hours")
        }
        UtcOffset { kind: OffsetKind::Seconds(hours as i32 * 3600) }
    }

    /// Creates a new offset from a given number of seconds.
    ///
    /// # Errors
    ///
    /// This routine returns an error when the given number of seconds is
    /// out of range. The range corresponds to the offsets
    /// `-23:59:59..=23:59:59`. In units of seconds, that corresponds to
    /// `-86,399..=86,399`.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::UtcOffset;
    ///
    /// let o = UtcOffset::from_seconds(9 * 60 * 60)?;
    /// assert_eq!(o.to_string(), "+09:00");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn from_seconds(seconds: i32) -> Result<UtcOffset, Error> {
        if seconds.unsigned_abs() >= SECONDS_PER_DAY as u32 {
            return Err(Error::range(
                "offset seconds",
                seconds,
                -(SECONDS_PER_DAY - 1),
                SECONDS_PER_DAY - 1,
            ));
        }
        Ok(UtcOffset { kind: OffsetKind::Seconds(seconds) })
    }

    /// Creates a new offset from hour, minute and second components.
    ///
    /// The components are summed, so they would ordinarily all carry the
    /// same sign: `from_hms(-9, -30, 0)` is the offset `-09:30`.
    ///
    /// # Errors
    ///
    /// This routine returns an error when the summed components are out of
    /// the range `-23:59:59..=23:59:59`.
    #[inline]
    pub fn from_hms(
        hours: i8,
        minutes: i8,
        seconds: i8,
    ) -> Result<UtcOffset, Error> {
        let seconds = i32::from(hours) * 3600
            + i32::from(minutes) * 60
            + i32::from(seconds);
        UtcOffset::from_seconds(seconds)
    }

    /// Creates a new offset from an exact fraction of a day.
    ///
    /// A fraction expressible as a whole number of seconds is stored as
    /// one, so `from_day_fraction(3/8) == from_hms(9, 0, 0)`. Anything
    /// else is kept exactly, and forces datetimes carrying it into their
    /// exact representation.
    ///
    /// # Errors
    ///
    /// This routine returns an error when the fraction's absolute value is
    /// one day or more.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::UtcOffset;
    /// use num_rational::BigRational;
    ///
    /// let third = BigRational::new(1.into(), 3.into());
    /// let o = UtcOffset::from_day_fraction(third)?;
    /// // A third of a day is eight hours.
    /// assert_eq!(o.whole_seconds(), Some(8 * 60 * 60));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_day_fraction(
        fraction: BigRational,
    ) -> Result<UtcOffset, Error> {
        if fraction.abs() >= BigRational::from(BigInt::from(1)) {
            return Err(err!(
                "offset day fraction {fraction} \
                 is not in the exclusive range (-1, 1)",
            ));
        }
        let in_seconds = &fraction * BigInt::from(SECONDS_PER_DAY);
        if in_seconds.is_integer() {
            // OK because |fraction| < 1 implies |seconds| < 86400.
            let seconds = in_seconds.to_integer().to_i32().unwrap();
            return UtcOffset::from_seconds(seconds);
        }
        Ok(UtcOffset { kind: OffsetKind::Exact(Box::new(fraction)) })
    }

    /// Returns this offset as a whole number of seconds, or `None` when it
    /// is a fraction of a day finer than one second.
    #[inline]
    pub fn whole_seconds(&self) -> Option<i32> {
        match self.kind {
            OffsetKind::Seconds(seconds) => Some(seconds),
            OffsetKind::Exact(_) => None,
        }
    }

    /// Returns this offset as an exact fraction of a day.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::UtcOffset;
    /// use num_rational::BigRational;
    ///
    /// let o = UtcOffset::from_seconds(-6 * 60 * 60)?;
    /// assert_eq!(o.to_day_fraction(), BigRational::new((-1).into(), 4.into()));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_day_fraction(&self) -> BigRational {
        match self.kind {
            OffsetKind::Seconds(seconds) => BigRational::new(
                BigInt::from(seconds),
                BigInt::from(SECONDS_PER_DAY),
            ),
            OffsetKind::Exact(ref fraction) => (**fraction).clone(),
        }
    }

    /// This offset in seconds, truncated toward zero. Used where a plain
    /// integer is needed for rendering or interchange.
    pub(crate) fn seconds_truncated(&self) -> i32 {
        match self.kind {
            OffsetKind::Seconds(seconds) => seconds,
            OffsetKind::Exact(ref fraction) => {
                let in_seconds =
                    (**fraction).clone() * BigInt::from(SECONDS_PER_DAY);
                // OK because |fraction| < 1 implies |seconds| < 86400.
                in_seconds.to_integer().to_i32().unwrap()
            }
        }
    }
}

impl Default for UtcOffset {
    fn default() -> UtcOffset {
        UtcOffset::UTC
    }
}

impl core::fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let seconds = self.seconds_truncated();
        let sign = if seconds < 0 { "-" } else { "+" };
        let seconds = seconds.unsigned_abs();
        let (hours, minutes, seconds) =
            (seconds / 3600, (seconds / 60) % 60, seconds % 60);
        if seconds == 0 {
            write!(f, "{sign}{hours:02}:{minutes:02}")
        } else {
            write!(f, "{sign}{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for UtcOffset {
    fn arbitrary(g: &mut quickcheck::Gen) -> UtcOffset {
        let seconds = i32::arbitrary(g).rem_euclid(2 * 86_399 + 1) - 86_399;
        UtcOffset::from_seconds(seconds).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn seconds_bounds() {
        assert!(UtcOffset::from_seconds(86_399).is_ok());
        assert!(UtcOffset::from_seconds(-86_399).is_ok());
        assert!(UtcOffset::from_seconds(86_400).unwrap_err().is_range());
        assert!(UtcOffset::from_seconds(-86_400).unwrap_err().is_range());
    }

    #[test]
    fn exact_fractions_demote_when_whole() {
        let f = BigRational::new(3.into(), 8.into());
        let o = UtcOffset::from_day_fraction(f).unwrap();
        assert_eq!(o, UtcOffset::from_hms(9, 0, 0).unwrap());
        assert_eq!(o.whole_seconds(), Some(32_400));

        // One tenth of a second is not a whole second.
        let f = BigRational::new(1.into(), 864_000.into());
        let o = UtcOffset::from_day_fraction(f.clone()).unwrap();
        assert_eq!(o.whole_seconds(), None);
        assert_eq!(o.to_day_fraction(), f);
        assert_eq!(o.seconds_truncated(), 0);

        let whole = BigRational::from(num_bigint::BigInt::from(1));
        assert!(UtcOffset::from_day_fraction(whole).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(UtcOffset::UTC.to_string(), "+00:00");
        assert_eq!(UtcOffset::constant(9).to_string(), "+09:00");
        assert_eq!(
            UtcOffset::from_hms(-9, -30, 0).unwrap().to_string(),
            "-09:30",
        );
        assert_eq!(
            UtcOffset::from_seconds(-(5 * 3600 + 30 * 60 + 21))
                .unwrap()
                .to_string(),
            "-05:30:21",
        );
    }

    quickcheck::quickcheck! {
        fn prop_day_fraction_roundtrip(o: UtcOffset) -> bool {
            UtcOffset::from_day_fraction(o.to_day_fraction()).unwrap() == o
        }
    }
}
