use crate::error::Error;

/// A representation of a day of the week.
///
/// The default representation is unambiguous: a day of the week is an enum
/// variant, not a number. Two numbering schemes are reachable through
/// explicit conversions:
///
/// * The civil scheme, where Sunday is `0` and Saturday is `6`. This is the
/// numbering produced by a Julian Day via [`Date::weekday`](crate::Date).
/// * The commercial (ISO 8601) scheme, where Monday is `1` and Sunday is
/// `7`. This is the numbering used by ISO week dates.
///
/// # Example
///
/// ```
/// use lilian::Weekday;
///
/// let wd = Weekday::Sunday;
/// assert_eq!(wd.to_sunday_zero_offset(), 0);
/// assert_eq!(wd.to_monday_one_offset(), 7);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Convert to a zero offset weekday, where Sunday is `0`.
    #[inline]
    pub const fn to_sunday_zero_offset(self) -> i8 {
        self as i8
    }

    /// Convert to a one offset weekday, where Monday is `1` and Sunday is
    /// `7`, as in ISO week dates.
    #[inline]
    pub const fn to_monday_one_offset(self) -> i8 {
        match self {
            Weekday::Sunday => 7,
            _ => self as i8,
        }
    }

    /// Convert from a zero offset weekday, where Sunday is `0`.
    ///
    /// # Errors
    ///
    /// This returns an error when the offset is not in the range `0..=6`.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::Weekday;
    ///
    /// assert_eq!(Weekday::from_sunday_zero_offset(0)?, Weekday::Sunday);
    /// assert_eq!(Weekday::from_sunday_zero_offset(6)?, Weekday::Saturday);
    /// assert!(Weekday::from_sunday_zero_offset(7).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn from_sunday_zero_offset(offset: i8) -> Result<Weekday, Error> {
        match offset {
            0 => Ok(Weekday::Sunday),
            1 => Ok(Weekday::Monday),
            2 => Ok(Weekday::Tuesday),
            3 => Ok(Weekday::Wednesday),
            4 => Ok(Weekday::Thursday),
            5 => Ok(Weekday::Friday),
            6 => Ok(Weekday::Saturday),
            _ => Err(Error::range("weekday", offset, 0, 6)),
        }
    }

    /// Convert from a one offset weekday, where Monday is `1` and Sunday is
    /// `7`, as in ISO week dates.
    ///
    /// # Errors
    ///
    /// This returns an error when the offset is not in the range `1..=7`.
    #[inline]
    pub fn from_monday_one_offset(offset: i8) -> Result<Weekday, Error> {
        match offset {
            7 => Ok(Weekday::Sunday),
            1..=6 => Weekday::from_sunday_zero_offset(offset),
            _ => Err(Error::range("weekday", offset, 1, 7)),
        }
    }

    /// Add the given number of days to this weekday, wrapping around the
    /// week in either direction.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::Weekday;
    ///
    /// assert_eq!(Weekday::Saturday.wrapping_add(2), Weekday::Monday);
    /// assert_eq!(Weekday::Sunday.wrapping_add(-1), Weekday::Saturday);
    /// ```
    #[inline]
    pub fn wrapping_add<D: Into<i64>>(self, days: D) -> Weekday {
        let wd = i64::from(self.to_sunday_zero_offset());
        let sum = (wd + days.into().rem_euclid(7)).rem_euclid(7) as i8;
        // OK because rem_euclid(7) is always in 0..=6.
        Weekday::from_sunday_zero_offset(sum).unwrap()
    }

    /// The weekday of the given Julian Day Number.
    ///
    /// JD 0 was a Monday, so the civil number is `(jd + 1) mod 7`.
    #[inline]
    pub(crate) fn from_jd(jd: i64) -> Weekday {
        // OK because rem_euclid(7) is always in 0..=6.
        Weekday::from_sunday_zero_offset((jd + 1).rem_euclid(7) as i8)
            .unwrap()
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Weekday {
    fn arbitrary(g: &mut quickcheck::Gen) -> Weekday {
        let offset = i8::arbitrary(g).rem_euclid(7);
        Weekday::from_sunday_zero_offset(offset).unwrap()
    }
}
