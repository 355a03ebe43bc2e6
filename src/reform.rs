use crate::error::Error;

/// The day the Gregorian calendar reform takes effect.
///
/// Every date value in this crate carries a `Reform`. Days strictly before
/// the reform day are interpreted in the proleptic Julian calendar, and
/// days on or after it in the Gregorian calendar. Two special values turn
/// the switch off entirely: [`Reform::JULIAN`] keeps every day Julian and
/// [`Reform::GREGORIAN`] keeps every day Gregorian.
///
/// The reform day is identified by its Julian Day Number, which is
/// unambiguous in both calendars. Historically meaningful reform days all
/// fall between 1582 (the papal reform) and 1930 (the last national
/// adoptions), and [`Reform::at_jd`] enforces that window. The two named
/// switchovers that account for nearly all practical use are provided as
/// constants:
///
/// * [`Reform::ITALY`], the original 1582 reform, where 1582-10-04 (Julian)
/// is followed by 1582-10-15 (Gregorian).
/// * [`Reform::ENGLAND`], the 1752 adoption by England and its colonies,
/// where 1752-09-02 is followed by 1752-09-14.
///
/// The default value is `ITALY`.
///
/// # Example
///
/// ```
/// use lilian::{Date, Reform};
///
/// // The ten days after 1582-10-04 never existed in Italy...
/// assert!(Date::civil(1582, 10, 10, Reform::ITALY).is_err());
/// // ...but England kept the Julian calendar for another 170 years.
/// assert!(Date::civil(1582, 10, 10, Reform::ENGLAND).is_ok());
/// ```
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
pub struct Reform {
    kind: ReformKind,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum ReformKind {
    /// Proleptic Julian: the reform never happens.
    Julian,
    /// Proleptic Gregorian: the reform predates every representable day.
    Gregorian,
    /// The reform takes effect on this Julian Day Number.
    At(i64),
}

impl Reform {
    /// The proleptic Julian calendar. No day is Gregorian.
    pub const JULIAN: Reform = Reform { kind: ReformKind::Julian };

    /// The proleptic Gregorian calendar. Every day is Gregorian.
    pub const GREGORIAN: Reform = Reform { kind: ReformKind::Gregorian };

    /// The papal reform of 1582: the first Gregorian day is JD `2299161`,
    /// i.e. 1582-10-15.
    pub const ITALY: Reform = Reform { kind: ReformKind::At(2_299_161) };

    /// The English reform of 1752: the first Gregorian day is JD `2361222`,
    /// i.e. 1752-09-14.
    pub const ENGLAND: Reform = Reform { kind: ReformKind::At(2_361_222) };

    /// The earliest permitted reform day: 1582-01-01 (Gregorian).
    pub(crate) const MIN_JD: i64 = 2_298_874;

    /// The latest permitted reform day: 1930-12-31 (Julian).
    pub(crate) const MAX_JD: i64 = 2_426_355;

    /// Creates a reform taking effect on the given Julian Day Number.
    ///
    /// The day itself is the first Gregorian day.
    ///
    /// # Errors
    ///
    /// This returns an error when `jd` is outside the window of historical
    /// calendar reforms, JD `2298874..=2426355` (the year 1582 through
    /// 1930). For fully proleptic calendars use [`Reform::JULIAN`] or
    /// [`Reform::GREGORIAN`] instead.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::Reform;
    ///
    /// // Sweden's (eventual) 1753 reform.
    /// let sweden = Reform::at_jd(2_361_390)?;
    /// assert_eq!(sweden.as_jd(), Some(2_361_390));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[inline]
    pub fn at_jd(jd: i64) -> Result<Reform, Error> {
        if !(Reform::MIN_JD <= jd && jd <= Reform::MAX_JD) {
            return Err(Error::range(
                "reform day",
                jd,
                Reform::MIN_JD,
                Reform::MAX_JD,
            ));
        }
        Ok(Reform { kind: ReformKind::At(jd) })
    }

    /// Returns the Julian Day Number on which this reform takes effect, or
    /// `None` for the proleptic [`JULIAN`](Reform::JULIAN) and
    /// [`GREGORIAN`](Reform::GREGORIAN) calendars.
    #[inline]
    pub const fn as_jd(self) -> Option<i64> {
        match self.kind {
            ReformKind::At(jd) => Some(jd),
            _ => None,
        }
    }

    /// Returns true when no day is Gregorian under this reform.
    #[inline]
    pub const fn is_proleptic_julian(self) -> bool {
        matches!(self.kind, ReformKind::Julian)
    }

    /// Returns true when every day is Gregorian under this reform.
    #[inline]
    pub const fn is_proleptic_gregorian(self) -> bool {
        matches!(self.kind, ReformKind::Gregorian)
    }

    /// Whether the given Julian Day Number falls in the Gregorian regime of
    /// this reform. Days strictly before the reform day are Julian.
    #[inline]
    pub(crate) const fn is_gregorian(self, jd: i64) -> bool {
        match self.kind {
            ReformKind::Julian => false,
            ReformKind::Gregorian => true,
            ReformKind::At(reform) => jd >= reform,
        }
    }
}

impl Default for Reform {
    fn default() -> Reform {
        Reform::ITALY
    }
}

impl core::fmt::Debug for Reform {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.kind {
            ReformKind::Julian => f.write_str("Reform(julian)"),
            ReformKind::Gregorian => f.write_str("Reform(gregorian)"),
            ReformKind::At(jd) => write!(f, "Reform({jd}j)"),
        }
    }
}

/// Serializes as the reform day number, or `"julian"`/`"gregorian"` for
/// the proleptic calendars.
#[cfg(feature = "serde")]
impl serde::Serialize for Reform {
    #[inline]
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self.kind {
            ReformKind::Julian => serializer.serialize_str("julian"),
            ReformKind::Gregorian => serializer.serialize_str("gregorian"),
            ReformKind::At(jd) => serializer.serialize_i64(jd),
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Reform {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Reform, D::Error> {
        use serde::de;

        struct ReformVisitor;

        impl<'de> de::Visitor<'de> for ReformVisitor {
            type Value = Reform;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str(
                    "a reform day number, \"julian\" or \"gregorian\"",
                )
            }

            #[inline]
            fn visit_i64<E: de::Error>(
                self,
                value: i64,
            ) -> Result<Reform, E> {
                Reform::at_jd(value).map_err(de::Error::custom)
            }

            #[inline]
            fn visit_u64<E: de::Error>(
                self,
                value: u64,
            ) -> Result<Reform, E> {
                let jd = i64::try_from(value).map_err(de::Error::custom)?;
                self.visit_i64(jd)
            }

            #[inline]
            fn visit_str<E: de::Error>(
                self,
                value: &str,
            ) -> Result<Reform, E> {
                match value {
                    "julian" => Ok(Reform::JULIAN),
                    "gregorian" => Ok(Reform::GREGORIAN),
                    _ => Err(de::Error::invalid_value(
                        de::Unexpected::Str(value),
                        &self,
                    )),
                }
            }
        }

        deserializer.deserialize_any(ReformVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Reform {
    fn arbitrary(g: &mut quickcheck::Gen) -> Reform {
        let span = Reform::MAX_JD - Reform::MIN_JD + 1;
        match u8::arbitrary(g) % 4 {
            0 => Reform::JULIAN,
            1 => Reform::GREGORIAN,
            2 => Reform::ITALY,
            _ => {
                let jd = Reform::MIN_JD + i64::arbitrary(g).rem_euclid(span);
                Reform::at_jd(jd).unwrap()
            }
        }
    }
}
