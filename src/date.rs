/*!
The calendar date facade.

A [`Date`] names one day under one calendar reform. All the ways of
naming a day meet here: civil year/month/day, ordinal day of the year,
ISO week dates, week numbers counted from a chosen first weekday, "the
nth Thursday of November", and plain day numbers. Every constructor
validates by round trip, so a `Date` that exists names a day that
exists.
*/

use alloc::string::String;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

use crate::{
    cal,
    datetime::DateTime,
    error::Error,
    fields::{self, Fields, TimeParts, UNIX_EPOCH_JD},
    offset::UtcOffset,
    reform::Reform,
    repr::{self, DateRepr},
    weekday::Weekday,
};

/// A day in the proleptic Julian/Gregorian calendar.
///
/// A `Date` pairs a day number with the calendar reform it is presented
/// under. The reform decides where the Julian reckoning hands over to the
/// Gregorian one; [`Reform::ITALY`], the default elsewhere, places it at
/// the papal reform of October 1582, and [`Reform::JULIAN`] and
/// [`Reform::GREGORIAN`] extend one rule over all time.
///
/// # Construction
///
/// Each broken-down constructor takes the reform explicitly and returns
/// an error when the fields name no real day, whether because they are
/// out of range, because February is too short that year, or because the
/// named day fell in a reform gap:
///
/// ```
/// use lilian::{Date, Reform};
///
/// assert!(Date::civil(2021, 2, 29, Reform::ITALY).is_err());
/// assert!(Date::civil(1582, 10, 10, Reform::ITALY).is_err());
/// assert!(Date::civil(1582, 10, 10, Reform::ENGLAND).is_ok());
/// ```
///
/// Negative month, day, day-of-year, week and nth values count backward
/// from the end of their unit, so `-1` is the last one:
///
/// ```
/// use lilian::{Date, Reform};
///
/// let eve = Date::civil(2021, -1, -1, Reform::ITALY)?;
/// assert_eq!((eve.year(), eve.month(), eve.day()), (2021, 12, 31));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Identity
///
/// Equality, ordering and hashing go by the underlying day alone. The
/// reform is presentation: the same day labeled under two reforms
/// compares equal even though its civil fields differ.
///
/// ```
/// use lilian::{Date, Reform};
///
/// let gregorian = Date::civil(1582, 10, 15, Reform::ITALY)?;
/// let julian = gregorian.with_reform(Reform::JULIAN);
/// assert_eq!(julian, gregorian);
/// assert_eq!((julian.month(), julian.day()), (10, 5));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Range
///
/// Construction accepts any `i64` year; days beyond the directly
/// reckonable window are carried exactly by an internal arbitrary
/// precision form. In the astronomically remote tail where even a day
/// count leaves `i64`, the integer accessors saturate rather than fail.
#[derive(Clone)]
pub struct Date {
    repr: DateRepr,
}

impl Date {
    /// Creates a date from a civil year, month and day.
    ///
    /// A negative month counts back from December and a negative day
    /// counts back from the last day of the month. In a month cut by a
    /// reform gap the backward count runs over the days that exist.
    ///
    /// # Errors
    ///
    /// This returns an error when the fields name no day under `reform`.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// let date = Date::civil(1582, 10, 4, Reform::ITALY)?;
    /// assert_eq!(date.jd(), 2_299_160);
    /// // The next day number lands across the reform gap.
    /// assert_eq!(date + 1, Date::civil(1582, 10, 15, Reform::ITALY)?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn civil(
        year: i64,
        month: i8,
        day: i8,
        reform: Reform,
    ) -> Result<Date, Error> {
        let jd = fields::valid_civil(year, month, day, reform)?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    /// Creates a date from a year and a day of that year.
    ///
    /// A negative day counts back from the year's last day.
    ///
    /// # Errors
    ///
    /// This returns an error when the year has no such day. Note that a
    /// reform year is short: 1582 under [`Reform::ITALY`] has 355 days.
    pub fn ordinal(
        year: i64,
        day_of_year: i16,
        reform: Reform,
    ) -> Result<Date, Error> {
        let jd = fields::valid_ordinal(year, day_of_year, reform)?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    /// Creates a date from an ISO week date: the week year, the week
    /// `1..=52` or `53`, and the weekday.
    ///
    /// A negative week counts back from the year's last week.
    ///
    /// # Errors
    ///
    /// This returns an error when the week year has no such week.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform, Weekday};
    ///
    /// let date = Date::commercial(2021, 1, Weekday::Monday, Reform::ITALY)?;
    /// assert_eq!((date.year(), date.month(), date.day()), (2021, 1, 4));
    /// assert!(Date::commercial(2021, 53, Weekday::Monday, Reform::ITALY)
    ///     .is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn commercial(
        year: i64,
        week: i8,
        weekday: Weekday,
        reform: Reform,
    ) -> Result<Date, Error> {
        let jd = fields::valid_commercial(
            year,
            week,
            weekday.to_monday_one_offset(),
            reform,
        )?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    /// Creates a date from a week number date: the civil year, the week
    /// number and the day's offset `0..=6` within its week, with weeks
    /// starting on `week_start`.
    ///
    /// This is the numbering of `%U` (weeks starting Sunday) and `%W`
    /// (weeks starting Monday) format directives: week 1 begins on the
    /// year's first `week_start` day and the days before it are week 0.
    /// A negative week counts back from the year's last week and a
    /// negative day offset counts back from the week's end.
    ///
    /// # Errors
    ///
    /// This returns an error when the year has no such week.
    pub fn weeknum(
        year: i64,
        week: i8,
        day: i8,
        week_start: Weekday,
        reform: Reform,
    ) -> Result<Date, Error> {
        let jd = fields::valid_weeknum(year, week, day, week_start, reform)?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    /// Creates a date from an "nth weekday of the month" description,
    /// like the 4th Thursday of November.
    ///
    /// A negative `nth` counts the weekday back from the month's end,
    /// so `-1` names the last one.
    ///
    /// # Errors
    ///
    /// This returns an error when the month has no such weekday, or when
    /// `nth` is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform, Weekday};
    ///
    /// let date = Date::nth_kday(2021, 11, 4, Weekday::Thursday, Reform::ITALY)?;
    /// assert_eq!((date.month(), date.day()), (11, 25));
    /// assert_eq!(
    ///     Date::nth_kday(2021, 11, -1, Weekday::Thursday, Reform::ITALY)?,
    ///     date,
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn nth_kday(
        year: i64,
        month: i8,
        nth: i8,
        weekday: Weekday,
        reform: Reform,
    ) -> Result<Date, Error> {
        let jd = fields::valid_nth_kday(year, month, nth, weekday, reform)?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    /// Creates a date from a Julian Day Number, the continuous day count
    /// with day `0` at -4712-01-01 in the proleptic Julian calendar.
    ///
    /// Every day number names a day, so this cannot fail.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// let origin = Date::from_jd(0, Reform::ITALY);
    /// assert_eq!(
    ///     (origin.year(), origin.month(), origin.day()),
    ///     (-4712, 1, 1),
    /// );
    /// ```
    pub fn from_jd(jd: i64, reform: Reform) -> Date {
        Date { repr: DateRepr::from_wide_jd(i128::from(jd), reform) }
    }

    /// Creates a date from an astronomical day number: a day count from
    /// noon UTC of the day before JD 0, as an exact rational.
    ///
    /// A fractional astronomical day number is kept exactly; the date
    /// presents as the day its integral part falls in, with the fraction
    /// visible through [`Date::day_fraction`].
    pub fn from_ajd(ajd: BigRational, reform: Reform) -> Date {
        Date { repr: DateRepr::from_ajd(ajd, reform) }
    }

    /// The current day on the system clock, reckoned in UTC.
    #[cfg(feature = "std")]
    pub fn today(reform: Reform) -> Date {
        let unix = match std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
        {
            Ok(elapsed) => elapsed.as_secs() as i64,
            Err(err) => -(err.duration().as_secs() as i64),
        };
        Date::from_jd(unix.div_euclid(86_400) + UNIX_EPOCH_JD, reform)
    }

    /// Creates a date from a partial field mapping, as a parser produces
    /// one.
    ///
    /// The mapping's most specified broken-down form is picked and
    /// validated; see [`Fields`] for the selection rules. Clock fields in
    /// the mapping are ignored here except as evidence of which form the
    /// mapping is in.
    ///
    /// # Errors
    ///
    /// This returns an error when the chosen form's fields are missing
    /// (consider [`Fields::complete`]) or name no real day.
    pub fn from_fields(fields: &Fields, reform: Reform) -> Result<Date, Error> {
        let jd = fields.resolve_jd(reform)?;
        Ok(Date { repr: DateRepr::from_wide_jd(jd, reform) })
    }

    pub(crate) fn from_repr(repr: DateRepr) -> Date {
        Date { repr }
    }

    pub(crate) fn repr(&self) -> &DateRepr {
        &self.repr
    }

    /// The civil year.
    pub fn year(&self) -> i64 {
        self.repr.civil().0
    }

    /// The month, `1..=12`.
    pub fn month(&self) -> i8 {
        self.repr.civil().1
    }

    /// The day of the month, `1..=31`.
    pub fn day(&self) -> i8 {
        self.repr.civil().2
    }

    /// The day of the year, `1..=366`.
    pub fn day_of_year(&self) -> i16 {
        self.repr.ordinal().1
    }

    /// The weekday.
    pub fn weekday(&self) -> Weekday {
        self.repr.weekday()
    }

    /// The ISO week year. Near the turn of a year it can differ from
    /// [`Date::year`] by one.
    pub fn iso_week_year(&self) -> i64 {
        self.repr.commercial().0
    }

    /// The ISO week, `1..=52` or `53`.
    pub fn iso_week(&self) -> i8 {
        self.repr.commercial().1
    }

    /// The weekday, as the ISO week date systems reads it. The same
    /// value as [`Date::weekday`]; the `1..=7` numbering is reached
    /// through [`Weekday::to_monday_one_offset`].
    pub fn iso_weekday(&self) -> Weekday {
        self.repr.weekday()
    }

    /// The Julian Day Number.
    pub fn jd(&self) -> i64 {
        self.repr.jd()
    }

    /// The astronomical day number, an exact rational. A whole date is
    /// its midnight, half a day before the astronomical day's noon
    /// origin, so this is `jd - 1/2` plus any day fraction.
    pub fn ajd(&self) -> BigRational {
        self.repr.ajd()
    }

    /// The Modified Julian Day Number, day `0` at 1858-11-17 Gregorian.
    pub fn mjd(&self) -> i64 {
        self.jd().saturating_sub(2_400_001)
    }

    /// The astronomical Modified Julian Day Number, `ajd - 2400000.5`.
    pub fn amjd(&self) -> BigRational {
        self.ajd()
            - BigRational::new(BigInt::from(4_800_001), BigInt::from(2))
    }

    /// The Lilian Day Number, the count of days since the Gregorian
    /// calendar came into use: day `1` is 1582-10-15.
    pub fn ld(&self) -> i64 {
        self.jd().saturating_sub(2_299_160)
    }

    /// The fraction of the day elapsed since its midnight, in `[0, 1)`.
    /// Zero unless exact arithmetic introduced a fraction.
    pub fn day_fraction(&self) -> BigRational {
        self.repr.day_fraction()
    }

    /// The calendar reform this date is presented under.
    pub fn reform(&self) -> Reform {
        self.repr.reform()
    }

    /// Whether the day falls on the Gregorian side of the reform.
    pub fn is_gregorian(&self) -> bool {
        repr::wide_is_gregorian(self.repr.wide_jd(), self.reform())
    }

    /// Whether the day falls on the Julian side of the reform.
    pub fn is_julian(&self) -> bool {
        !self.is_gregorian()
    }

    /// Whether the date's year is a leap year under its reform, that is,
    /// whether the year's February ends on the 29th.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// assert!(Date::civil(2000, 6, 1, Reform::ITALY)?.is_leap_year());
    /// assert!(!Date::civil(1900, 6, 1, Reform::ITALY)?.is_leap_year());
    /// // The Julian rule makes every fourth year leap.
    /// assert!(Date::civil(1900, 6, 1, Reform::JULIAN)?.is_leap_year());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn is_leap_year(&self) -> bool {
        let (_, year, eff) = cal::fold_year(self.year(), self.reform());
        cal::leap(year, eff)
    }

    /// Adds an exact number of days, possibly fractional. A fractional
    /// result keeps its fraction, visible through [`Date::day_fraction`].
    pub fn add_days_exact(&self, days: &BigRational) -> Date {
        Date { repr: self.repr.add_days_exact(days) }
    }

    /// The date shifted by the given number of months, with the day of
    /// the month clamped downward when the target month is shorter or
    /// the target day fell in a reform gap.
    ///
    /// # Errors
    ///
    /// This returns an error in one obscure case: a reform whose gap
    /// swallows the first days of the target month can leave no day to
    /// clamp to.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// let date = Date::civil(2021, 1, 31, Reform::ITALY)?;
    /// let next = date.add_months(1)?;
    /// assert_eq!((next.month(), next.day()), (2, 28));
    ///
    /// // Three months before 1583-01-05 would be 1582-10-05, which the
    /// // papal reform removed; the day clamps to October 4th.
    /// let date = Date::civil(1583, 1, 5, Reform::ITALY)?;
    /// let back = date.sub_months(3)?;
    /// assert_eq!((back.month(), back.day()), (10, 4));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add_months(&self, months: i64) -> Result<Date, Error> {
        self.month_shift(i128::from(months))
    }

    /// The date shifted backward by the given number of months; see
    /// [`Date::add_months`].
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn sub_months(&self, months: i64) -> Result<Date, Error> {
        self.month_shift(-i128::from(months))
    }

    fn month_shift(&self, months: i128) -> Result<Date, Error> {
        let (year, month, day) = self.repr.civil();
        let target =
            i128::from(year) * 12 + i128::from(month) - 1 + months;
        let year = repr::saturate_i64(target.div_euclid(12));
        let month = (target.rem_euclid(12) + 1) as i8;
        let mut day = day;
        let jd = loop {
            match fields::valid_civil(year, month, day, self.reform()) {
                Ok(jd) => break jd,
                Err(err) => {
                    day -= 1;
                    if day < 1 {
                        return Err(err.context(err!(
                            "no day of {year:04}-{month:02} can hold the \
                             shifted date",
                        )));
                    }
                }
            }
        };
        Ok(self.shift_to(jd))
    }

    /// The next day.
    pub fn next_day(&self) -> Date {
        self + 1
    }

    /// The previous day.
    pub fn prev_day(&self) -> Date {
        self - 1
    }

    /// One month later; see [`Date::add_months`] for clamping and the
    /// error case.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn next_month(&self) -> Result<Date, Error> {
        self.add_months(1)
    }

    /// One month earlier.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn prev_month(&self) -> Result<Date, Error> {
        self.sub_months(1)
    }

    /// One year later, day clamped as for [`Date::add_months`].
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn next_year(&self) -> Result<Date, Error> {
        self.add_months(12)
    }

    /// One year earlier.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn prev_year(&self) -> Result<Date, Error> {
        self.sub_months(12)
    }

    /// The first existing day of this date's month.
    pub fn first_of_month(&self) -> Date {
        let (year, month, _) = self.repr.civil();
        let (fold, year, eff) = cal::fold_year(year, self.reform());
        let jd = i128::from(cal::find_fdom(year, month, eff))
            + i128::from(fold) * i128::from(cal::PERIOD_DAYS);
        self.shift_to(jd)
    }

    /// The last existing day of this date's month.
    pub fn last_of_month(&self) -> Date {
        let (year, month, _) = self.repr.civil();
        let (fold, year, eff) = cal::fold_year(year, self.reform());
        let jd = i128::from(cal::find_ldom(year, month, eff))
            + i128::from(fold) * i128::from(cal::PERIOD_DAYS);
        self.shift_to(jd)
    }

    /// How many days of this date's month exist under its reform.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// // October 1582 lost ten days to the papal reform.
    /// let date = Date::civil(1582, 10, 1, Reform::ITALY)?;
    /// assert_eq!(date.days_in_month(), 21);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn days_in_month(&self) -> i8 {
        let (year, month, _) = self.repr.civil();
        let (_, year, eff) = cal::fold_year(year, self.reform());
        (cal::find_ldom(year, month, eff) - cal::find_fdom(year, month, eff)
            + 1) as i8
    }

    /// An endless series of dates stepping by the given number of days,
    /// beginning with this date.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// let start = Date::civil(1582, 9, 30, Reform::ITALY)?;
    /// let days: Vec<i8> =
    ///     start.series(7).take(3).map(|date| date.day()).collect();
    /// // Weekly steps hop the reform gap like any other days.
    /// assert_eq!(days, vec![30, 17, 24]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn series(&self, step_days: i64) -> DateSeries {
        DateSeries { next: self.clone(), step: step_days }
    }

    /// The same day presented under another reform. The day number is
    /// unchanged; the civil fields move when the day changes sides.
    pub fn with_reform(&self, reform: Reform) -> Date {
        Date { repr: self.repr.with_reform(reform) }
    }

    /// This day at the given local time of day, presented at the given
    /// offset.
    ///
    /// Negative clock fields wrap once against their unit. An hour of
    /// `24` with zero minutes and seconds means the following midnight.
    ///
    /// # Errors
    ///
    /// This returns an error when the clock fields name no time of day.
    pub fn at(
        &self,
        hour: i8,
        minute: i8,
        second: i8,
        offset: &UtcOffset,
    ) -> Result<DateTime, Error> {
        DateTime::from_jd_and_clock(
            self.repr.wide_jd(),
            hour,
            minute,
            second,
            offset,
            self.reform(),
        )
    }

    /// Decomposes into the fully populated record a format renderer
    /// consumes. The clock parts read as midnight unless exact
    /// arithmetic left a day fraction on this date.
    pub fn to_parts(&self) -> TimeParts {
        let (year, month, day) = self.repr.civil();
        let seconds = self.repr.day_fraction()
            * BigRational::from_integer(BigInt::from(86_400));
        let second_of_day = repr::saturate_i64(repr::floor_i128(&seconds));
        TimeParts {
            year,
            month,
            day,
            day_of_year: self.repr.ordinal().1,
            weekday: self.repr.weekday(),
            hour: (second_of_day / 3_600) as i8,
            minute: (second_of_day / 60 % 60) as i8,
            second: (second_of_day % 60) as i8,
            second_fraction: &seconds - seconds.floor(),
            offset_seconds: 0,
            zone: String::from("+00:00"),
            unix_seconds: repr::unix_seconds(&self.repr.ajd()),
        }
    }

    /// Whole-day move to a target day number, keeping any day fraction.
    fn shift_to(&self, jd: i128) -> Date {
        if self.repr.day_fraction().is_zero() {
            return Date { repr: DateRepr::from_wide_jd(jd, self.reform()) };
        }
        let delta = jd - self.repr.wide_jd();
        Date { repr: self.repr.add_days(delta) }
    }
}

impl PartialEq for Date {
    fn eq(&self, other: &Date) -> bool {
        self.cmp(other) == core::cmp::Ordering::Equal
    }
}

impl Eq for Date {}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Date) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Date) -> core::cmp::Ordering {
        self.repr.cmp_ajd(&other.repr)
    }
}

impl core::hash::Hash for Date {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.repr.hash_ajd(state);
    }
}

impl core::fmt::Display for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let (year, month, day) = self.repr.civil();
        if year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", year.unsigned_abs(), month, day)
        } else {
            write!(f, "{year:04}-{month:02}-{day:02}")
        }
    }
}

impl core::fmt::Debug for Date {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "Date({self})")
    }
}

impl core::ops::Add<i64> for Date {
    type Output = Date;

    fn add(self, days: i64) -> Date {
        Date { repr: self.repr.add_days(i128::from(days)) }
    }
}

impl core::ops::Add<i64> for &Date {
    type Output = Date;

    fn add(self, days: i64) -> Date {
        Date { repr: self.repr.add_days(i128::from(days)) }
    }
}

impl core::ops::Sub<i64> for Date {
    type Output = Date;

    fn sub(self, days: i64) -> Date {
        Date { repr: self.repr.add_days(-i128::from(days)) }
    }
}

impl core::ops::Sub<i64> for &Date {
    type Output = Date;

    fn sub(self, days: i64) -> Date {
        Date { repr: self.repr.add_days(-i128::from(days)) }
    }
}

impl core::ops::Sub for Date {
    type Output = BigRational;

    /// The exact difference in days.
    fn sub(self, other: Date) -> BigRational {
        self.repr.diff_days(&other.repr)
    }
}

impl<'a> core::ops::Sub<&'a Date> for &Date {
    type Output = BigRational;

    /// The exact difference in days.
    fn sub(self, other: &'a Date) -> BigRational {
        self.repr.diff_days(&other.repr)
    }
}

/// An endless iterator of dates a fixed number of days apart, created by
/// [`Date::series`].
#[derive(Clone, Debug)]
pub struct DateSeries {
    next: Date,
    step: i64,
}

impl Iterator for DateSeries {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next.clone();
        self.next = &current + self.step;
        Some(current)
    }
}

/// Serializes the underlying representation: `(jd, reform)` for the
/// light form and `(ajd, offset, reform)` for the exact one. The offset
/// of a date is always zero; the field keeps the exact form shared with
/// [`DateTime`](crate::DateTime).
#[cfg(feature = "serde")]
impl serde::Serialize for Date {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        match self.repr {
            DateRepr::Light(ref light) => {
                let mut state = serializer.serialize_struct("Date", 2)?;
                state.serialize_field("jd", &i64::from(light.jd))?;
                state.serialize_field("reform", &light.reform)?;
                state.end()
            }
            DateRepr::Exact(ref exact) => {
                let mut state = serializer.serialize_struct("Date", 3)?;
                state.serialize_field("ajd", &exact.ajd)?;
                state.serialize_field("offset", &exact.offset)?;
                state.serialize_field("reform", &exact.reform)?;
                state.end()
            }
        }
    }
}

/// Deserializes either serialized form, re-deriving every field and
/// re-running representation selection rather than trusting the payload.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Date {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Date, D::Error> {
        use serde::de;

        const FIELDS: &[&str] = &["jd", "ajd", "offset", "reform"];

        struct DateVisitor;

        impl<'de> de::Visitor<'de> for DateVisitor {
            type Value = Date;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str(
                    "a date as (jd, reform) or (ajd, offset, reform)",
                )
            }

            fn visit_map<A: de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<Date, A::Error> {
                let mut jd: Option<i64> = None;
                let mut ajd: Option<BigRational> = None;
                let mut offset: Option<BigRational> = None;
                let mut reform: Option<Reform> = None;

                macro_rules! set {
                    ($field:ident) => {{
                        if $field.is_some() {
                            return Err(de::Error::duplicate_field(
                                stringify!($field),
                            ));
                        }
                        $field = Some(map.next_value()?);
                    }};
                }

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "jd" => set!(jd),
                        "ajd" => set!(ajd),
                        "offset" => set!(offset),
                        "reform" => set!(reform),
                        _ => {
                            return Err(de::Error::unknown_field(
                                &key, FIELDS,
                            ));
                        }
                    }
                }
                let reform = reform
                    .ok_or_else(|| de::Error::missing_field("reform"))?;
                match (jd, ajd) {
                    (Some(jd), None) => {
                        if offset.is_some() {
                            return Err(de::Error::custom(
                                "the \"offset\" field belongs to the exact \
                                 form",
                            ));
                        }
                        Ok(Date::from_jd(jd, reform))
                    }
                    (None, Some(ajd)) => {
                        let offset = offset.ok_or_else(|| {
                            de::Error::missing_field("offset")
                        })?;
                        if !offset.is_zero() {
                            return Err(de::Error::custom(
                                "a date's offset must be zero",
                            ));
                        }
                        Ok(Date::from_ajd(ajd, reform))
                    }
                    (Some(_), Some(_)) => Err(de::Error::custom(
                        "\"jd\" and \"ajd\" are mutually exclusive",
                    )),
                    (None, None) => Err(de::Error::missing_field("jd")),
                }
            }
        }

        deserializer.deserialize_struct("Date", FIELDS, DateVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Date {
    fn arbitrary(g: &mut quickcheck::Gen) -> Date {
        let span = repr::MAX_JD - repr::MIN_JD + 1;
        let jd = i64::arbitrary(g).rem_euclid(span) + repr::MIN_JD;
        Date::from_jd(jd, Reform::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec, vec::Vec};

    use super::*;

    #[test]
    fn reform_gap_is_contiguous() {
        let before = Date::civil(1582, 10, 4, Reform::ITALY).unwrap();
        let after = Date::civil(1582, 10, 15, Reform::ITALY).unwrap();
        assert_eq!(before.jd(), 2_299_160);
        assert_eq!(after.jd(), 2_299_161);
        assert_eq!(before.next_day(), after);
        assert!(Date::civil(1582, 10, 5, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());

        let before = Date::civil(1752, 9, 2, Reform::ENGLAND).unwrap();
        let after = Date::civil(1752, 9, 14, Reform::ENGLAND).unwrap();
        assert_eq!(before.next_day(), after);
        assert!(Date::civil(1752, 9, 3, Reform::ENGLAND)
            .unwrap_err()
            .is_invalid_date());
    }

    #[test]
    fn day_number_epochs() {
        let origin = Date::from_jd(0, Reform::ITALY);
        assert_eq!(
            (origin.year(), origin.month(), origin.day()),
            (-4712, 1, 1),
        );
        assert_eq!(origin.weekday(), Weekday::Monday);

        let mjd_epoch = Date::from_jd(2_400_001, Reform::ITALY);
        assert_eq!(mjd_epoch.mjd(), 0);
        assert!(mjd_epoch.amjd().is_integer());
        assert_eq!(
            mjd_epoch.amjd(),
            BigRational::new(BigInt::from(0), BigInt::from(1)),
        );

        let lilian_epoch = Date::civil(1582, 10, 15, Reform::ITALY).unwrap();
        assert_eq!(lilian_epoch.ld(), 1);
    }

    #[test]
    fn broken_down_constructors() {
        let date =
            Date::commercial(2021, 1, Weekday::Monday, Reform::ITALY)
                .unwrap();
        assert_eq!(date.jd(), 2_459_219);
        assert_eq!(
            (date.iso_week_year(), date.iso_week(), date.iso_weekday()),
            (2021, 1, Weekday::Monday),
        );

        let date =
            Date::weeknum(2021, 1, 0, Weekday::Sunday, Reform::ITALY)
                .unwrap();
        assert_eq!(date.jd(), 2_459_218);
        assert_eq!(date.weekday(), Weekday::Sunday);

        let date = Date::ordinal(2021, -1, Reform::ITALY).unwrap();
        assert_eq!((date.month(), date.day()), (12, 31));
        assert_eq!(date.day_of_year(), 365);

        let date =
            Date::nth_kday(2021, 11, 4, Weekday::Thursday, Reform::ITALY)
                .unwrap();
        assert_eq!((date.month(), date.day()), (11, 25));
    }

    #[test]
    fn iso_week_around_new_year() {
        // 2021-01-01 is a Friday of ISO week 2020-W53.
        let date = Date::civil(2021, 1, 1, Reform::ITALY).unwrap();
        assert_eq!(date.iso_week_year(), 2020);
        assert_eq!(date.iso_week(), 53);
        assert_eq!(date.weekday(), Weekday::Friday);
    }

    #[test]
    fn arithmetic_and_difference() {
        let date = Date::civil(2021, 3, 4, Reform::ITALY).unwrap();
        let later = &date + 10;
        assert_eq!((later.month(), later.day()), (3, 14));
        assert_eq!(
            &later - &date,
            BigRational::from_integer(BigInt::from(10)),
        );
        assert_eq!(later - 10, date);

        // Exact fractional arithmetic leaves the light representation
        // without losing anything.
        let half = BigRational::new(BigInt::from(3), BigInt::from(2));
        let shifted = date.add_days_exact(&half);
        assert_eq!(shifted.jd(), date.jd() + 1);
        assert_eq!(
            shifted.day_fraction(),
            BigRational::new(BigInt::from(1), BigInt::from(2)),
        );
        assert_eq!(&shifted - &date, half);
    }

    #[test]
    fn month_shifts_clamp() {
        let date = Date::civil(2021, 1, 31, Reform::ITALY).unwrap();
        let next = date.add_months(1).unwrap();
        assert_eq!((next.year(), next.month(), next.day()), (2021, 2, 28));
        let leap = Date::civil(2020, 1, 31, Reform::ITALY).unwrap();
        assert_eq!(leap.add_months(1).unwrap().day(), 29);

        // Shifting into the reform gap clamps below it.
        let date = Date::civil(1583, 1, 5, Reform::ITALY).unwrap();
        let back = date.sub_months(3).unwrap();
        assert_eq!(
            (back.year(), back.month(), back.day()),
            (1582, 10, 4),
        );

        let date = Date::civil(2021, 5, 15, Reform::ITALY).unwrap();
        assert_eq!(date.add_months(-3).unwrap(), date.sub_months(3).unwrap());
        assert_eq!(date.next_year().unwrap().year(), 2022);
        assert_eq!(date.prev_month().unwrap().month(), 4);
    }

    #[test]
    fn month_boundaries() {
        let date = Date::civil(1582, 10, 20, Reform::ITALY).unwrap();
        assert_eq!(date.first_of_month().day(), 1);
        assert_eq!(date.last_of_month().day(), 31);
        assert_eq!(date.days_in_month(), 21);

        let date = Date::civil(2021, 2, 10, Reform::ITALY).unwrap();
        assert_eq!(date.days_in_month(), 28);
        assert_eq!(date.last_of_month().day(), 28);
    }

    #[test]
    fn reform_relabeling() {
        let gregorian = Date::civil(1582, 10, 15, Reform::ITALY).unwrap();
        let julian = gregorian.with_reform(Reform::JULIAN);
        assert_eq!(julian, gregorian);
        assert_eq!((julian.month(), julian.day()), (10, 5));
        assert!(gregorian.is_gregorian());
        assert!(julian.is_julian());

        // Proleptic Gregorian reckons dates before the reform by the
        // modern rule.
        let proleptic = Date::civil(1500, 2, 29, Reform::JULIAN);
        assert!(proleptic.is_ok());
        assert!(Date::civil(1500, 2, 29, Reform::GREGORIAN).is_err());
    }

    #[test]
    fn leap_years() {
        let reform = Reform::ITALY;
        assert!(Date::civil(2000, 1, 1, reform).unwrap().is_leap_year());
        assert!(!Date::civil(1900, 1, 1, reform).unwrap().is_leap_year());
        assert!(Date::civil(2020, 1, 1, reform).unwrap().is_leap_year());
        assert!(Date::civil(1900, 1, 1, Reform::JULIAN)
            .unwrap()
            .is_leap_year());
        // The Gregorian rule holds in folded years too.
        assert!(Date::civil(500_000, 1, 1, Reform::GREGORIAN)
            .unwrap()
            .is_leap_year());
    }

    #[test]
    fn far_years_fold() {
        let date = Date::civil(500_000, 6, 15, Reform::GREGORIAN).unwrap();
        assert_eq!(
            (date.year(), date.month(), date.day()),
            (500_000, 6, 15),
        );
        assert_eq!(date.weekday(), date.with_reform(Reform::ITALY).weekday());
        assert_eq!(
            date.next_day() - date.clone(),
            BigRational::from_integer(BigInt::from(1)),
        );

        let date = Date::civil(-10_000, 6, 15, Reform::ITALY).unwrap();
        assert_eq!(
            (date.year(), date.month(), date.day()),
            (-10_000, 6, 15),
        );
    }

    #[test]
    fn completion_against_today() {
        let today = Date::civil(2021, 3, 10, Reform::ITALY).unwrap();
        let reform = Reform::ITALY;

        let mut fields = Fields::new();
        fields.set_day(Some(5));
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 5));

        let mut fields = Fields::new();
        fields.set_month(Some(2));
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 2, 1));

        // A time-only mapping resolves to the reference day itself, but
        // only after completion.
        let mut fields = Fields::new();
        fields.set_hour(Some(12));
        assert!(Date::from_fields(&fields, reform).is_err());
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!(date, today);

        // A bare weekday names that day within the reference week,
        // which starts on Sunday. 2021-03-10 is a Wednesday.
        let mut fields = Fields::new();
        fields.set_weekday(Some(Weekday::Tuesday));
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!((date.month(), date.day()), (3, 9));

        // A bare ISO week keeps the reference week year and defaults to
        // Monday.
        let mut fields = Fields::new();
        fields.set_iso_week(Some(50));
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!(date.jd(), 2_459_562);
        assert_eq!((date.month(), date.day()), (12, 13));

        // Epoch seconds win over everything else, completed or not.
        let mut fields = Fields::new();
        fields.set_unix_seconds(Some(0));
        fields.set_year(Some(1999));
        let date =
            Date::from_fields(&fields.complete(&today), reform).unwrap();
        assert_eq!(date.jd(), 2_440_588);
    }

    #[test]
    fn series_steps() {
        let start = Date::civil(2021, 1, 1, Reform::ITALY).unwrap();
        let days: Vec<i8> =
            start.series(10).take(4).map(|date| date.day()).collect();
        assert_eq!(days, vec![1, 11, 21, 31]);

        let backwards: Vec<i8> =
            start.series(-1).take(3).map(|date| date.day()).collect();
        assert_eq!(backwards, vec![1, 31, 30]);
    }

    #[test]
    fn display_forms() {
        let date = Date::civil(2021, 3, 4, Reform::ITALY).unwrap();
        assert_eq!(date.to_string(), "2021-03-04");
        let origin = Date::from_jd(0, Reform::ITALY);
        assert_eq!(origin.to_string(), "-4712-01-01");
        assert_eq!(alloc::format!("{origin:?}"), "Date(-4712-01-01)");
    }

    #[test]
    fn parts_decomposition() {
        let date = Date::civil(1970, 1, 1, Reform::ITALY).unwrap();
        let parts = date.to_parts();
        assert_eq!(parts.year(), 1970);
        assert_eq!(parts.day_of_year(), 1);
        assert_eq!(parts.weekday(), Weekday::Thursday);
        assert_eq!((parts.hour(), parts.minute(), parts.second()), (0, 0, 0));
        assert_eq!(parts.offset_seconds(), 0);
        assert_eq!(parts.zone(), "+00:00");
        assert_eq!(parts.unix_seconds(), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn today_is_modern() {
        let today = Date::today(Reform::ITALY);
        assert!(today.year() > 2000);
        assert!(today.is_gregorian());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips() {
        let date = Date::civil(2021, 3, 10, Reform::ITALY).unwrap();
        let json = serde_json::to_string(&date).unwrap();
        assert_eq!(json, r#"{"jd":2459284,"reform":2299161}"#);
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
        assert_eq!(back.reform(), date.reform());

        let julian: Date =
            serde_json::from_str(r#"{"jd":0,"reform":"julian"}"#).unwrap();
        assert!(julian.reform().is_proleptic_julian());
        assert_eq!(julian.jd(), 0);

        // A day outside the light window round-trips through the exact
        // form.
        let far = Date::civil(1_000_001, 1, 1, Reform::GREGORIAN).unwrap();
        let json = serde_json::to_string(&far).unwrap();
        assert!(json.contains("\"ajd\""));
        let back: Date = serde_json::from_str(&json).unwrap();
        assert_eq!(back, far);
        assert_eq!(back.year(), 1_000_001);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_bad_payloads() {
        // The reform window is re-validated.
        assert!(serde_json::from_str::<Date>(r#"{"jd":0,"reform":5}"#)
            .is_err());
        assert!(serde_json::from_str::<Date>(r#"{"jd":0}"#).is_err());
        assert!(serde_json::from_str::<Date>(r#"{"reform":2299161}"#)
            .is_err());
        assert!(serde_json::from_str::<Date>(
            r#"{"jd":0,"reform":2299161,"year":2021}"#
        )
        .is_err());

        // Both day number forms at once make no sense.
        let far = Date::civil(1_000_001, 1, 1, Reform::GREGORIAN).unwrap();
        let exact_json = serde_json::to_string(&far).unwrap();
        let mixed = alloc::format!("{{\"jd\":0,{}", &exact_json[1..]);
        assert!(serde_json::from_str::<Date>(&mixed).is_err());
    }

    quickcheck::quickcheck! {
        fn prop_civil_round_trip(date: Date) -> bool {
            Date::civil(date.year(), date.month(), date.day(), date.reform())
                .map(|back| back == date)
                .unwrap_or(false)
        }

        fn prop_ordinal_round_trip(date: Date) -> bool {
            Date::ordinal(date.year(), date.day_of_year(), date.reform())
                .map(|back| back == date)
                .unwrap_or(false)
        }

        fn prop_commercial_round_trip(date: Date) -> bool {
            Date::commercial(
                date.iso_week_year(),
                date.iso_week(),
                date.iso_weekday(),
                date.reform(),
            )
            .map(|back| back == date)
            .unwrap_or(false)
        }

        fn prop_add_sub_identity(date: Date, days: i32) -> bool {
            let days = i64::from(days);
            (&date + days) - days == date
        }

        fn prop_order_follows_day_numbers(date: Date, days: i16) -> bool {
            let shifted = &date + i64::from(days);
            match days.cmp(&0) {
                core::cmp::Ordering::Less => shifted < date,
                core::cmp::Ordering::Equal => shifted == date,
                core::cmp::Ordering::Greater => shifted > date,
            }
        }
    }
}
