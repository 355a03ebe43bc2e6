/*!
The date and time facade.

A [`DateTime`] is a [`Date`](crate::Date) carrying a time of day and the
UTC offset that time is presented in. Identity is the instant: two
values at different offsets compare equal when they name the same moment.
*/

use alloc::string::ToString;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::{
    cal,
    date::Date,
    error::Error,
    fields::{self, Fields, TimeParts, UNIX_EPOCH_JD},
    offset::UtcOffset,
    reform::Reform,
    repr::{self, DateRepr, DateTimeRepr},
    weekday::Weekday,
};

/// A calendar date with a time of day, presented at a UTC offset.
///
/// The date side works exactly as [`Date`] does, reform and all; the
/// clock side adds hours, minutes, seconds and an exact fractional
/// second. The offset shifts presentation only. Unlike [`Date`], whose
/// identity is its day, a `DateTime`'s identity is its instant:
///
/// ```
/// use lilian::{DateTime, Reform, UtcOffset};
///
/// let tokyo = UtcOffset::constant(9);
/// let dt = DateTime::civil(2021, 3, 4, 9, 0, 0, &tokyo, Reform::ITALY)?;
/// let utc = dt.with_offset(&UtcOffset::UTC);
/// assert_eq!(utc, dt);
/// assert_eq!(utc.hour(), 0);
/// assert_eq!(utc.day(), 4);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Subtraction gives the exact difference in days, fractional when the
/// clocks differ:
///
/// ```
/// use lilian::{DateTime, Reform, UtcOffset};
/// use num_bigint::BigInt;
/// use num_rational::BigRational;
///
/// let utc = UtcOffset::UTC;
/// let a = DateTime::civil(2001, 2, 3, 0, 0, 0, &utc, Reform::ITALY)?;
/// let b = DateTime::civil(2001, 2, 4, 12, 0, 0, &utc, Reform::ITALY)?;
/// assert_eq!(
///     &b - &a,
///     BigRational::new(BigInt::from(3), BigInt::from(2)),
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct DateTime {
    repr: DateTimeRepr,
}

impl DateTime {
    /// Creates a date and time from civil fields, a clock and an offset.
    ///
    /// Negative calendar fields count backward as for [`Date::civil`],
    /// and negative clock fields wrap once against their unit, so an
    /// hour of `-1` is 23. An hour of `24` with zero minutes and seconds
    /// names the following midnight.
    ///
    /// # Errors
    ///
    /// This returns an error when the calendar fields name no day under
    /// `reform` or the clock fields name no time of day.
    pub fn civil(
        year: i64,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
        offset: &UtcOffset,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        let jd = fields::valid_civil(year, month, day, reform)?;
        DateTime::from_jd_and_clock(jd, hour, minute, second, offset, reform)
    }

    /// Creates a date and time from a year, a day of that year, a clock
    /// and an offset.
    ///
    /// # Errors
    ///
    /// As for [`DateTime::civil`].
    pub fn ordinal(
        year: i64,
        day_of_year: i16,
        hour: i8,
        minute: i8,
        second: i8,
        offset: &UtcOffset,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        let jd = fields::valid_ordinal(year, day_of_year, reform)?;
        DateTime::from_jd_and_clock(jd, hour, minute, second, offset, reform)
    }

    /// Creates a date and time from an ISO week date, a clock and an
    /// offset.
    ///
    /// # Errors
    ///
    /// As for [`DateTime::civil`].
    pub fn commercial(
        year: i64,
        week: i8,
        weekday: Weekday,
        hour: i8,
        minute: i8,
        second: i8,
        offset: &UtcOffset,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        let jd = fields::valid_commercial(
            year,
            week,
            weekday.to_monday_one_offset(),
            reform,
        )?;
        DateTime::from_jd_and_clock(jd, hour, minute, second, offset, reform)
    }

    /// Creates a date and time at the UTC midnight of the given Julian
    /// Day Number.
    pub fn from_jd(jd: i64, reform: Reform) -> DateTime {
        DateTime {
            repr: DateTimeRepr::from_civil_parts(
                i128::from(jd),
                0,
                None,
                &UtcOffset::UTC,
                reform,
            ),
        }
    }

    /// Creates a date and time from an exact astronomical day number,
    /// presented at the given offset.
    pub fn from_ajd(
        ajd: BigRational,
        offset: &UtcOffset,
        reform: Reform,
    ) -> DateTime {
        DateTime { repr: DateTimeRepr::from_ajd(ajd, offset, reform) }
    }

    /// Creates a date and time from a count of seconds since the Unix
    /// epoch, 1970-01-01T00:00:00 UTC, presented at the given offset.
    ///
    /// # Errors
    ///
    /// This returns an error when `nanosecond` is outside
    /// `0..=999_999_999`. Any `seconds` names an instant.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{DateTime, Reform, UtcOffset};
    ///
    /// let epoch =
    ///     DateTime::from_unix(0, 0, &UtcOffset::UTC, Reform::ITALY)?;
    /// assert_eq!(epoch.jd(), 2_440_588);
    /// assert_eq!((epoch.hour(), epoch.minute(), epoch.second()), (0, 0, 0));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_unix(
        seconds: i64,
        nanosecond: i32,
        offset: &UtcOffset,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        if !(0..=999_999_999).contains(&nanosecond) {
            return Err(Error::range(
                "nanosecond",
                nanosecond,
                0,
                999_999_999,
            ));
        }
        let jd = i128::from(seconds.div_euclid(repr::SECONDS_PER_DAY))
            + i128::from(UNIX_EPOCH_JD);
        let second_of_day = seconds.rem_euclid(repr::SECONDS_PER_DAY) as i32;
        let fraction = (nanosecond != 0).then(|| {
            BigRational::new(
                BigInt::from(nanosecond),
                BigInt::from(repr::NANOS_PER_SECOND),
            )
        });
        let utc = DateTime {
            repr: DateTimeRepr::from_civil_parts(
                jd,
                second_of_day,
                fraction.as_ref(),
                &UtcOffset::UTC,
                reform,
            ),
        };
        Ok(utc.with_offset(offset))
    }

    /// The current moment on the system clock, presented at the given
    /// offset.
    #[cfg(feature = "std")]
    pub fn now(offset: &UtcOffset, reform: Reform) -> DateTime {
        let (seconds, nanosecond) = match std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
        {
            Ok(elapsed) => {
                (elapsed.as_secs() as i64, elapsed.subsec_nanos() as i32)
            }
            Err(err) => {
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanosecond = before.subsec_nanos() as i32;
                if nanosecond > 0 {
                    seconds -= 1;
                    nanosecond = 1_000_000_000 - nanosecond;
                }
                (seconds, nanosecond)
            }
        };
        // OK because a clock reading's nanosecond part is always in
        // range.
        DateTime::from_unix(seconds, nanosecond, offset, reform).unwrap()
    }

    /// Creates a date and time from a partial field mapping, as a parser
    /// produces one.
    ///
    /// The day resolves as for [`Date::from_fields`]. Missing clock
    /// fields read as zero and the offset defaults to UTC. A second of
    /// `60` collapses to 59: the engine has no leap seconds, and this
    /// lets mappings from sources that do resolve.
    ///
    /// # Errors
    ///
    /// This returns an error when the day or the clock cannot be
    /// resolved.
    pub fn from_fields(
        fields: &Fields,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        let jd = fields.resolve_jd(reform)?;
        let (hour, minute, second) = fields.clock()?;
        let offset = match fields.offset() {
            Some(offset) => offset.clone(),
            None => UtcOffset::UTC,
        };
        Ok(DateTime::assemble(
            jd,
            hour,
            minute,
            second,
            fields.second_fraction(),
            &offset,
            reform,
        ))
    }

    /// Entry for a validated day paired with an unvalidated clock. Used
    /// by the broken-down constructors and [`Date::at`].
    pub(crate) fn from_jd_and_clock(
        jd: i128,
        hour: i8,
        minute: i8,
        second: i8,
        offset: &UtcOffset,
        reform: Reform,
    ) -> Result<DateTime, Error> {
        let (hour, minute, second) =
            fields::valid_time(hour, minute, second)?;
        Ok(DateTime::assemble(
            jd, hour, minute, second, None, offset, reform,
        ))
    }

    /// Assembles from a day and an already validated clock, rolling the
    /// 24:00:00 form over to the next day.
    fn assemble(
        mut jd: i128,
        hour: i8,
        minute: i8,
        second: i8,
        second_fraction: Option<&BigRational>,
        offset: &UtcOffset,
        reform: Reform,
    ) -> DateTime {
        let mut second_of_day = i32::from(hour) * 3_600
            + i32::from(minute) * 60
            + i32::from(second);
        if hour == 24 {
            jd += 1;
            second_of_day = 0;
        }
        DateTime {
            repr: DateTimeRepr::from_civil_parts(
                jd,
                second_of_day,
                second_fraction,
                offset,
                reform,
            ),
        }
    }

    pub(crate) fn from_repr(repr: DateTimeRepr) -> DateTime {
        DateTime { repr }
    }

    pub(crate) fn repr(&self) -> &DateTimeRepr {
        &self.repr
    }

    /// The civil year, in local time.
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

    /// The ISO week year.
    pub fn iso_week_year(&self) -> i64 {
        self.repr.commercial().0
    }

    /// The ISO week, `1..=52` or `53`.
    pub fn iso_week(&self) -> i8 {
        self.repr.commercial().1
    }

    /// The weekday, as the ISO week date system reads it.
    pub fn iso_weekday(&self) -> Weekday {
        self.repr.weekday()
    }

    /// The hour, `0..=23`.
    pub fn hour(&self) -> i8 {
        self.repr.clock().0
    }

    /// The minute, `0..=59`.
    pub fn minute(&self) -> i8 {
        self.repr.clock().1
    }

    /// The second, `0..=59`.
    pub fn second(&self) -> i8 {
        self.repr.clock().2
    }

    /// The fraction of the current second elapsed, in `[0, 1)`, exact.
    pub fn second_fraction(&self) -> BigRational {
        self.repr.second_fraction()
    }

    /// The UTC offset the local fields are presented in.
    pub fn offset(&self) -> UtcOffset {
        self.repr.offset()
    }

    /// The local Julian Day Number: the day the local fields fall in.
    pub fn jd(&self) -> i64 {
        self.repr.jd()
    }

    /// The astronomical day number, an exact rational in UTC.
    pub fn ajd(&self) -> BigRational {
        self.repr.ajd()
    }

    /// The Modified Julian Day Number of the local day.
    pub fn mjd(&self) -> i64 {
        self.jd().saturating_sub(2_400_001)
    }

    /// The astronomical Modified Julian Day Number, `ajd - 2400000.5`.
    pub fn amjd(&self) -> BigRational {
        self.ajd()
            - BigRational::new(BigInt::from(4_800_001), BigInt::from(2))
    }

    /// The Lilian Day Number of the local day.
    pub fn ld(&self) -> i64 {
        self.jd().saturating_sub(2_299_160)
    }

    /// The fraction of the local day elapsed since its midnight, exact.
    pub fn day_fraction(&self) -> BigRational {
        self.repr.day_fraction()
    }

    /// The calendar reform the date side is presented under.
    pub fn reform(&self) -> Reform {
        self.repr.reform()
    }

    /// Whether the local day falls on the Gregorian side of the reform.
    pub fn is_gregorian(&self) -> bool {
        repr::wide_is_gregorian(self.repr.wide_jd(), self.reform())
    }

    /// Whether the local day falls on the Julian side of the reform.
    pub fn is_julian(&self) -> bool {
        !self.is_gregorian()
    }

    /// Whether the local year is a leap year under the reform.
    pub fn is_leap_year(&self) -> bool {
        let (_, year, eff) = cal::fold_year(self.year(), self.reform());
        cal::leap(year, eff)
    }

    /// Adds an exact number of days, possibly fractional.
    pub fn add_days_exact(&self, days: &BigRational) -> DateTime {
        DateTime { repr: self.repr.add_days_exact(days) }
    }

    /// The date and time shifted by the given number of months, clock
    /// and offset untouched, the day of the month clamped downward as
    /// for [`Date::add_months`].
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn add_months(&self, months: i64) -> Result<DateTime, Error> {
        self.month_shift(i128::from(months))
    }

    /// The date and time shifted backward by the given number of months.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn sub_months(&self, months: i64) -> Result<DateTime, Error> {
        self.month_shift(-i128::from(months))
    }

    fn month_shift(&self, months: i128) -> Result<DateTime, Error> {
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

    /// The same clock one day later.
    pub fn next_day(&self) -> DateTime {
        self + 1
    }

    /// The same clock one day earlier.
    pub fn prev_day(&self) -> DateTime {
        self - 1
    }

    /// One month later; see [`Date::add_months`].
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn next_month(&self) -> Result<DateTime, Error> {
        self.add_months(1)
    }

    /// One month earlier.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn prev_month(&self) -> Result<DateTime, Error> {
        self.sub_months(1)
    }

    /// One year later, day clamped as for [`Date::add_months`].
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn next_year(&self) -> Result<DateTime, Error> {
        self.add_months(12)
    }

    /// One year earlier.
    ///
    /// # Errors
    ///
    /// As for [`Date::add_months`].
    pub fn prev_year(&self) -> Result<DateTime, Error> {
        self.sub_months(12)
    }

    /// The same clock on the first existing day of the local month.
    pub fn first_of_month(&self) -> DateTime {
        let (year, month, _) = self.repr.civil();
        let (fold, year, eff) = cal::fold_year(year, self.reform());
        let jd = i128::from(cal::find_fdom(year, month, eff))
            + i128::from(fold) * i128::from(cal::PERIOD_DAYS);
        self.shift_to(jd)
    }

    /// The same clock on the last existing day of the local month.
    pub fn last_of_month(&self) -> DateTime {
        let (year, month, _) = self.repr.civil();
        let (fold, year, eff) = cal::fold_year(year, self.reform());
        let jd = i128::from(cal::find_ldom(year, month, eff))
            + i128::from(fold) * i128::from(cal::PERIOD_DAYS);
        self.shift_to(jd)
    }

    /// How many days of the local month exist under the reform.
    pub fn days_in_month(&self) -> i8 {
        let (year, month, _) = self.repr.civil();
        let (_, year, eff) = cal::fold_year(year, self.reform());
        (cal::find_ldom(year, month, eff) - cal::find_fdom(year, month, eff)
            + 1) as i8
    }

    /// The same instant presented at another offset. The local fields
    /// move; equality does not.
    pub fn with_offset(&self, offset: &UtcOffset) -> DateTime {
        DateTime { repr: self.repr.with_offset(offset) }
    }

    /// The same instant presented under another reform.
    pub fn with_reform(&self, reform: Reform) -> DateTime {
        DateTime { repr: self.repr.with_reform(reform) }
    }

    /// The local day, with the time of day dropped.
    pub fn to_date(&self) -> Date {
        Date::from_repr(DateRepr::from_wide_jd(
            self.repr.wide_jd(),
            self.reform(),
        ))
    }

    /// Decomposes into the fully populated record a format renderer
    /// consumes.
    pub fn to_parts(&self) -> TimeParts {
        let (year, month, day) = self.repr.civil();
        let (hour, minute, second) = self.repr.clock();
        let offset = self.repr.offset();
        TimeParts {
            year,
            month,
            day,
            day_of_year: self.repr.ordinal().1,
            weekday: self.repr.weekday(),
            hour,
            minute,
            second,
            second_fraction: self.repr.second_fraction(),
            offset_seconds: offset.seconds_truncated(),
            zone: offset.to_string(),
            unix_seconds: repr::unix_seconds(&self.repr.ajd()),
        }
    }

    /// Whole-day move to a target local day, keeping the clock.
    fn shift_to(&self, jd: i128) -> DateTime {
        let delta = jd - self.repr.wide_jd();
        DateTime { repr: self.repr.add_days(delta) }
    }
}

impl PartialEq for DateTime {
    fn eq(&self, other: &DateTime) -> bool {
        self.cmp(other) == core::cmp::Ordering::Equal
    }
}

impl Eq for DateTime {}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &DateTime) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateTime {
    fn cmp(&self, other: &DateTime) -> core::cmp::Ordering {
        self.repr.cmp_ajd(&other.repr)
    }
}

impl core::hash::Hash for DateTime {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.repr.hash_ajd(state);
    }
}

impl PartialEq<Date> for DateTime {
    fn eq(&self, other: &Date) -> bool {
        self.partial_cmp(other) == Some(core::cmp::Ordering::Equal)
    }
}

impl PartialEq<DateTime> for Date {
    fn eq(&self, other: &DateTime) -> bool {
        self.partial_cmp(other) == Some(core::cmp::Ordering::Equal)
    }
}

impl PartialOrd<Date> for DateTime {
    /// Compares the instants; the date counts as its UTC midnight.
    fn partial_cmp(&self, other: &Date) -> Option<core::cmp::Ordering> {
        Some(self.repr.cmp_ajd(&other.repr().to_datetime_repr()))
    }
}

impl PartialOrd<DateTime> for Date {
    /// Compares the instants; the date counts as its UTC midnight.
    fn partial_cmp(&self, other: &DateTime) -> Option<core::cmp::Ordering> {
        Some(self.repr().to_datetime_repr().cmp_ajd(&other.repr))
    }
}

impl core::fmt::Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let (year, month, day) = self.repr.civil();
        let (hour, minute, second) = self.repr.clock();
        if year < 0 {
            write!(f, "-{:04}-{:02}-{:02}", year.unsigned_abs(), month, day)?;
        } else {
            write!(f, "{year:04}-{month:02}-{day:02}")?;
        }
        write!(
            f,
            "T{hour:02}:{minute:02}:{second:02}{}",
            self.repr.offset(),
        )
    }
}

impl core::fmt::Debug for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "DateTime({self})")
    }
}

impl core::ops::Add<i64> for DateTime {
    type Output = DateTime;

    fn add(self, days: i64) -> DateTime {
        DateTime { repr: self.repr.add_days(i128::from(days)) }
    }
}

impl core::ops::Add<i64> for &DateTime {
    type Output = DateTime;

    fn add(self, days: i64) -> DateTime {
        DateTime { repr: self.repr.add_days(i128::from(days)) }
    }
}

impl core::ops::Sub<i64> for DateTime {
    type Output = DateTime;

    fn sub(self, days: i64) -> DateTime {
        DateTime { repr: self.repr.add_days(-i128::from(days)) }
    }
}

impl core::ops::Sub<i64> for &DateTime {
    type Output = DateTime;

    fn sub(self, days: i64) -> DateTime {
        DateTime { repr: self.repr.add_days(-i128::from(days)) }
    }
}

impl core::ops::Sub for DateTime {
    type Output = BigRational;

    /// The exact difference in days.
    fn sub(self, other: DateTime) -> BigRational {
        self.repr.diff_days(&other.repr)
    }
}

impl<'a> core::ops::Sub<&'a DateTime> for &DateTime {
    type Output = BigRational;

    /// The exact difference in days.
    fn sub(self, other: &'a DateTime) -> BigRational {
        self.repr.diff_days(&other.repr)
    }
}

/// Serializes the underlying representation: `(jd, second_of_day,
/// nanosecond, offset_seconds, reform)` for the light form and
/// `(ajd, offset, reform)` for the exact one.
#[cfg(feature = "serde")]
impl serde::Serialize for DateTime {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        match self.repr {
            DateTimeRepr::Light(ref light) => {
                let mut state =
                    serializer.serialize_struct("DateTime", 5)?;
                state.serialize_field("jd", &i64::from(light.date.jd))?;
                state
                    .serialize_field("second_of_day", &light.second_of_day)?;
                state.serialize_field("nanosecond", &light.nanosecond)?;
                state
                    .serialize_field("offset_seconds", &light.offset_seconds)?;
                state.serialize_field("reform", &light.date.reform)?;
                state.end()
            }
            DateTimeRepr::Exact(ref exact) => {
                let mut state =
                    serializer.serialize_struct("DateTime", 3)?;
                state.serialize_field("ajd", &exact.ajd)?;
                state.serialize_field("offset", &exact.offset)?;
                state.serialize_field("reform", &exact.reform)?;
                state.end()
            }
        }
    }
}

/// Deserializes either serialized form, re-validating every field and
/// re-running representation selection rather than trusting the payload.
/// Missing clock fields of the light form read as zero.
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for DateTime {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime, D::Error> {
        use alloc::string::String;

        use serde::de;

        const FIELDS: &[&str] = &[
            "jd",
            "second_of_day",
            "nanosecond",
            "offset_seconds",
            "ajd",
            "offset",
            "reform",
        ];

        struct DateTimeVisitor;

        impl<'de> de::Visitor<'de> for DateTimeVisitor {
            type Value = DateTime;

            fn expecting(
                &self,
                f: &mut core::fmt::Formatter,
            ) -> core::fmt::Result {
                f.write_str(
                    "a date and time as (jd, second_of_day, nanosecond, \
                     offset_seconds, reform) or (ajd, offset, reform)",
                )
            }

            fn visit_map<A: de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<DateTime, A::Error> {
                let mut jd: Option<i64> = None;
                let mut second_of_day: Option<i32> = None;
                let mut nanosecond: Option<i32> = None;
                let mut offset_seconds: Option<i32> = None;
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
                        "second_of_day" => set!(second_of_day),
                        "nanosecond" => set!(nanosecond),
                        "offset_seconds" => set!(offset_seconds),
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
                        let second_of_day = second_of_day.unwrap_or(0);
                        if !(0..86_400).contains(&second_of_day) {
                            return Err(de::Error::custom(Error::range(
                                "second of day",
                                second_of_day,
                                0,
                                86_399,
                            )));
                        }
                        let nanosecond = nanosecond.unwrap_or(0);
                        if !(0..1_000_000_000).contains(&nanosecond) {
                            return Err(de::Error::custom(Error::range(
                                "nanosecond",
                                nanosecond,
                                0,
                                999_999_999,
                            )));
                        }
                        let offset =
                            UtcOffset::from_seconds(
                                offset_seconds.unwrap_or(0),
                            )
                            .map_err(de::Error::custom)?;
                        let fraction = BigRational::new(
                            BigInt::from(nanosecond),
                            BigInt::from(repr::NANOS_PER_SECOND),
                        );
                        Ok(DateTime {
                            repr: DateTimeRepr::from_civil_parts(
                                i128::from(jd),
                                second_of_day,
                                Some(&fraction),
                                &offset,
                                reform,
                            ),
                        })
                    }
                    (None, Some(ajd)) => {
                        if second_of_day.is_some()
                            || nanosecond.is_some()
                            || offset_seconds.is_some()
                        {
                            return Err(de::Error::custom(
                                "clock fields belong to the light form",
                            ));
                        }
                        let offset = offset.ok_or_else(|| {
                            de::Error::missing_field("offset")
                        })?;
                        let offset = UtcOffset::from_day_fraction(offset)
                            .map_err(de::Error::custom)?;
                        Ok(DateTime::from_ajd(ajd, &offset, reform))
                    }
                    (Some(_), Some(_)) => Err(de::Error::custom(
                        "\"jd\" and \"ajd\" are mutually exclusive",
                    )),
                    (None, None) => Err(de::Error::missing_field("jd")),
                }
            }
        }

        deserializer.deserialize_struct("DateTime", FIELDS, DateTimeVisitor)
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for DateTime {
    fn arbitrary(g: &mut quickcheck::Gen) -> DateTime {
        let date = Date::arbitrary(g);
        let second_of_day =
            i32::arbitrary(g).rem_euclid(repr::SECONDS_PER_DAY as i32);
        let nanosecond = i32::arbitrary(g).rem_euclid(1_000_000_000);
        let offset_seconds = i32::arbitrary(g).rem_euclid(2 * 86_399 + 1)
            - 86_399;
        let fraction = BigRational::new(
            BigInt::from(nanosecond),
            BigInt::from(repr::NANOS_PER_SECOND),
        );
        let offset = UtcOffset::from_seconds(offset_seconds).unwrap();
        DateTime {
            repr: DateTimeRepr::from_civil_parts(
                i128::from(date.jd()),
                second_of_day,
                Some(&fraction),
                &offset,
                date.reform(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use num_traits::Zero;

    use super::*;

    fn utc() -> UtcOffset {
        UtcOffset::UTC
    }

    fn tokyo() -> UtcOffset {
        UtcOffset::constant(9)
    }

    #[test]
    fn civil_with_clock() {
        let dt = DateTime::civil(2021, 3, 4, 5, 6, 7, &tokyo(), Reform::ITALY)
            .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 3, 4));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (5, 6, 7));
        assert_eq!(dt.offset(), tokyo());
        assert!(dt.second_fraction().is_zero());
        assert_eq!(dt.jd(), 2_459_278);

        assert!(DateTime::civil(2021, 3, 4, 25, 0, 0, &utc(), Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
        assert!(DateTime::civil(2021, 2, 29, 0, 0, 0, &utc(), Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
    }

    #[test]
    fn negative_clock_fields_wrap() {
        let dt =
            DateTime::civil(2021, 3, 4, -1, -1, -1, &utc(), Reform::ITALY)
                .unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
    }

    #[test]
    fn hour_twenty_four_rolls_over() {
        let dt =
            DateTime::civil(2021, 12, 31, 24, 0, 0, &utc(), Reform::ITALY)
                .unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2022, 1, 1));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
        assert!(DateTime::civil(
            2021,
            12,
            31,
            24,
            0,
            1,
            &utc(),
            Reform::ITALY
        )
        .is_err());
    }

    #[test]
    fn offset_relabeling_preserves_instant() {
        let dt = DateTime::civil(2021, 1, 1, 1, 0, 0, &tokyo(), Reform::ITALY)
            .unwrap();
        let utc = dt.with_offset(&UtcOffset::UTC);
        assert_eq!(utc, dt);
        assert_eq!((utc.year(), utc.month(), utc.day()), (2020, 12, 31));
        assert_eq!(utc.hour(), 16);
        assert_eq!(utc.jd(), dt.jd() - 1);
        assert_eq!(utc.ajd(), dt.ajd());
    }

    #[test]
    fn unix_conversions() {
        let epoch =
            DateTime::from_unix(0, 0, &utc(), Reform::ITALY).unwrap();
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1970, 1, 1));
        assert_eq!(epoch.jd(), 2_440_588);
        assert_eq!(epoch.to_parts().unix_seconds(), 0);

        let before =
            DateTime::from_unix(-1, 0, &utc(), Reform::ITALY).unwrap();
        assert_eq!((before.year(), before.month(), before.day()), (1969, 12, 31));
        assert_eq!((before.hour(), before.minute(), before.second()), (23, 59, 59));
        assert_eq!(before.to_parts().unix_seconds(), -1);

        let half =
            DateTime::from_unix(0, 500_000_000, &utc(), Reform::ITALY)
                .unwrap();
        assert_eq!(
            half.second_fraction(),
            BigRational::new(BigInt::from(1), BigInt::from(2)),
        );

        assert!(DateTime::from_unix(0, 1_000_000_000, &utc(), Reform::ITALY)
            .unwrap_err()
            .is_range());
    }

    #[test]
    fn difference_is_exact() {
        let a = DateTime::civil(2001, 2, 3, 0, 0, 0, &utc(), Reform::ITALY)
            .unwrap();
        let b = DateTime::civil(2001, 2, 4, 12, 0, 0, &utc(), Reform::ITALY)
            .unwrap();
        let gap = BigRational::new(BigInt::from(3), BigInt::from(2));
        assert_eq!(&b - &a, gap);
        assert_eq!(&a - &b, -gap.clone());
        // Presentation offsets cancel out of differences.
        assert_eq!(&b.with_offset(&tokyo()) - &a, gap);
    }

    #[test]
    fn exact_fractions_survive() {
        // 1/7 of a day is not a whole number of nanoseconds, so the
        // exact form has to carry it.
        let ajd = BigRational::new(BigInt::from(1), BigInt::from(7));
        let dt = DateTime::from_ajd(ajd.clone(), &utc(), Reform::ITALY);
        assert_eq!(dt.ajd(), ajd);
        assert_eq!(dt.jd(), 0);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (15, 25, 42));
        assert_eq!(
            dt.second_fraction(),
            BigRational::new(BigInt::from(6), BigInt::from(7)),
        );

        // A whole-nanosecond fraction demotes back to the light form
        // and the clock agrees.
        let dt = DateTime::from_ajd(
            BigRational::new(BigInt::from(1), BigInt::from(4)),
            &utc(),
            Reform::ITALY,
        );
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (18, 0, 0));
        assert!(dt.second_fraction().is_zero());
    }

    #[test]
    fn month_shifts_keep_clock() {
        let dt =
            DateTime::civil(2021, 1, 31, 12, 30, 0, &tokyo(), Reform::ITALY)
                .unwrap();
        let next = dt.add_months(1).unwrap();
        assert_eq!((next.year(), next.month(), next.day()), (2021, 2, 28));
        assert_eq!((next.hour(), next.minute(), next.second()), (12, 30, 0));
        assert_eq!(next.offset(), tokyo());

        let dt = DateTime::civil(1583, 1, 5, 6, 0, 0, &utc(), Reform::ITALY)
            .unwrap();
        let back = dt.sub_months(3).unwrap();
        assert_eq!((back.month(), back.day(), back.hour()), (10, 4, 6));
    }

    #[test]
    fn month_boundaries_keep_clock() {
        let dt =
            DateTime::civil(1582, 10, 20, 7, 8, 9, &utc(), Reform::ITALY)
                .unwrap();
        assert_eq!(dt.days_in_month(), 21);
        let first = dt.first_of_month();
        assert_eq!((first.day(), first.hour()), (1, 7));
        let last = dt.last_of_month();
        assert_eq!((last.day(), last.minute()), (31, 8));
    }

    #[test]
    fn date_conversions() {
        let date = Date::civil(2021, 3, 4, Reform::ITALY).unwrap();
        let dt = date.at(23, 59, 59, &tokyo()).unwrap();
        assert_eq!(dt.to_date(), date);
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));

        let midnight = date.at(24, 0, 0, &utc()).unwrap();
        assert_eq!(midnight.to_date(), date.next_day());
    }

    #[test]
    fn cross_type_comparison() {
        let date = Date::civil(2021, 3, 4, Reform::ITALY).unwrap();
        let midnight = date.at(0, 0, 0, &utc()).unwrap();
        let noon = date.at(12, 0, 0, &utc()).unwrap();
        assert!(midnight == date);
        assert!(date == midnight);
        assert!(noon > date);
        assert!(date < noon);
        assert!(midnight < date.next_day());
    }

    #[test]
    fn hashing_ignores_presentation() {
        // A seventh of a day is not a whole number of seconds, so the
        // relabeled value lives in the exact form. It still names the
        // same instant and must hash with it.
        let dt = DateTime::civil(2021, 3, 4, 5, 6, 7, &tokyo(), Reform::ITALY)
            .unwrap();
        let seventh = UtcOffset::from_day_fraction(BigRational::new(
            BigInt::from(1),
            BigInt::from(7),
        ))
        .unwrap();
        let relabeled = dt.with_offset(&seventh);
        assert_eq!(dt, relabeled);

        let mut instants = std::collections::HashSet::new();
        instants.insert(dt.clone());
        assert!(instants.contains(&relabeled));
        assert!(!instants.insert(relabeled));
    }

    #[test]
    fn display_forms() {
        let dt = DateTime::civil(2021, 3, 4, 5, 6, 7, &tokyo(), Reform::ITALY)
            .unwrap();
        assert_eq!(dt.to_string(), "2021-03-04T05:06:07+09:00");
        let origin = DateTime::from_jd(0, Reform::ITALY);
        assert_eq!(origin.to_string(), "-4712-01-01T00:00:00+00:00");
        assert_eq!(
            alloc::format!("{dt:?}"),
            "DateTime(2021-03-04T05:06:07+09:00)",
        );
    }

    #[test]
    fn parts_decomposition() {
        let dt = DateTime::civil(2001, 2, 3, 4, 5, 6, &tokyo(), Reform::ITALY)
            .unwrap();
        let parts = dt.to_parts();
        assert_eq!(parts.year(), 2001);
        assert_eq!((parts.month(), parts.day()), (2, 3));
        assert_eq!(parts.day_of_year(), 34);
        assert_eq!(parts.weekday(), Weekday::Saturday);
        assert_eq!((parts.hour(), parts.minute(), parts.second()), (4, 5, 6));
        assert_eq!(parts.offset_seconds(), 32_400);
        assert_eq!(parts.zone(), "+09:00");
        assert_eq!(parts.unix_seconds(), 981_140_706);
    }

    #[test]
    fn field_mapping_resolution() {
        let mut fields = Fields::new();
        fields.set_year(Some(2021));
        fields.set_month(Some(3));
        fields.set_day(Some(4));
        fields.set_hour(Some(5));
        fields.set_offset(Some(tokyo()));
        let dt = DateTime::from_fields(&fields, Reform::ITALY).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (5, 0, 0));
        assert_eq!(dt.offset(), tokyo());

        // A leap second collapses to the last representable second.
        let mut fields = Fields::new();
        fields.set_jd(Some(2_459_278));
        fields.set_hour(Some(23));
        fields.set_minute(Some(59));
        fields.set_second(Some(60));
        let dt = DateTime::from_fields(&fields, Reform::ITALY).unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
    }

    #[cfg(feature = "std")]
    #[test]
    fn now_is_modern() {
        let now = DateTime::now(&utc(), Reform::ITALY);
        assert!(now.year() > 2000);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trips() {
        let dt = DateTime::civil(2021, 3, 4, 5, 6, 7, &tokyo(), Reform::ITALY)
            .unwrap();
        let json = serde_json::to_string(&dt).unwrap();
        let want = concat!(
            r#"{"jd":2459278,"second_of_day":18367,"nanosecond":0,"#,
            r#""offset_seconds":32400,"reform":2299161}"#,
        );
        assert_eq!(json, want);
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dt);
        assert_eq!(back.offset(), dt.offset());

        // Missing clock fields read as zero.
        let midnight: DateTime =
            serde_json::from_str(r#"{"jd":2440588,"reform":"gregorian"}"#)
                .unwrap();
        assert_eq!(
            midnight,
            DateTime::from_unix(0, 0, &utc(), Reform::GREGORIAN).unwrap(),
        );

        // A seventh of a day is not whole nanoseconds, so this lives in
        // the exact form.
        let exact = DateTime::from_ajd(
            BigRational::new(BigInt::from(1), BigInt::from(7)),
            &utc(),
            Reform::ITALY,
        );
        let json = serde_json::to_string(&exact).unwrap();
        assert!(json.contains("\"ajd\""));
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exact);
        assert_eq!(back.second_fraction(), exact.second_fraction());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_rejects_bad_payloads() {
        // The clock fields are re-validated.
        assert!(serde_json::from_str::<DateTime>(
            r#"{"jd":0,"second_of_day":90000,"reform":2299161}"#
        )
        .is_err());
        assert!(serde_json::from_str::<DateTime>(
            r#"{"jd":0,"nanosecond":-1,"reform":2299161}"#
        )
        .is_err());
        assert!(serde_json::from_str::<DateTime>(
            r#"{"jd":0,"offset_seconds":86400,"reform":2299161}"#
        )
        .is_err());

        // A clock field without a day number names nothing.
        assert!(serde_json::from_str::<DateTime>(
            r#"{"second_of_day":1,"reform":2299161}"#
        )
        .is_err());
    }

    quickcheck::quickcheck! {
        fn prop_order_agrees_with_difference(
            a: DateTime,
            b: DateTime
        ) -> bool {
            let diff = &a - &b;
            match a.cmp(&b) {
                core::cmp::Ordering::Less => diff < BigRational::zero(),
                core::cmp::Ordering::Equal => diff.is_zero(),
                core::cmp::Ordering::Greater => diff > BigRational::zero(),
            }
        }

        fn prop_add_days_keeps_clock(dt: DateTime, days: i16) -> bool {
            let shifted = &dt + i64::from(days);
            shifted.repr.clock() == dt.repr.clock()
                && shifted.offset() == dt.offset()
        }

        fn prop_relabeling_keeps_instant(dt: DateTime, hours: i8) -> bool {
            let offset = UtcOffset::constant(hours.rem_euclid(24) - 12);
            dt.with_offset(&offset) == dt
        }

        fn prop_to_date_agrees_with_local_day(dt: DateTime) -> bool {
            let date = dt.to_date();
            date.jd() == dt.jd() && date.reform() == dt.reform()
        }
    }
}
