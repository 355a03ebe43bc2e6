/*!
Broken-down field mappings and their validation.

The types here sit between a free-text parser and the [`Date`](crate::Date)
and [`DateTime`](crate::DateTime) constructors. A parser produces a
[`Fields`] value holding whichever named fields it saw, [`Fields::complete`]
fills the holes a reader would fill from context ("the 5th" means the 5th
of the current month), and the `valid_*` routines turn one broken-down form
into a day number while rejecting combinations that name no real day.

Validation is uniform across the broken-down forms: resolve negative fields
against the last valid unit they count back from, convert to a day number,
convert back, and require the round trip to reproduce every field.
February 30, week 54 and days swallowed by a calendar reform gap all fail
that check without needing a bespoke rule each.
*/

use alloc::string::String;

use num_rational::BigRational;

use crate::{
    cal,
    date::Date,
    error::{Error, FieldError},
    offset::UtcOffset,
    reform::Reform,
    weekday::Weekday,
};

/// The Julian Day Number of the Unix epoch, 1970-01-01.
pub(crate) const UNIX_EPOCH_JD: i64 = 2_440_588;

/// Reassembles a wide day number from a reduced one and its fold count.
fn widen(jd: i64, fold: i64) -> i128 {
    i128::from(jd) + i128::from(fold) * i128::from(cal::PERIOD_DAYS)
}

/// Validates a civil date, resolving negative fields, and returns its day
/// number.
///
/// A negative month counts back from December (`-1` is December) and a
/// negative day counts back from the last existing day of the month (`-1`
/// is the last day). In a month cut by a reform gap the backward count is
/// over the days that exist, so it never lands inside the gap.
pub(crate) fn valid_civil(
    year: i64,
    month: i8,
    day: i8,
    reform: Reform,
) -> Result<i128, Error> {
    let month = if month < 0 { month + 13 } else { month };
    if !(1..=12).contains(&month) {
        return Err(FieldError::Civil.into());
    }
    let (fold, year, reform) = cal::fold_year(year, reform);
    let day = if day < 0 {
        let ldom = cal::find_ldom(year, month, reform);
        let (y, m, d) = cal::jd_to_civil(ldom + i64::from(day) + 1, reform);
        if y != year || m != month {
            return Err(FieldError::Civil.into());
        }
        d
    } else {
        day
    };
    let Some(jd) = cal::civil_exists(year, month, day, reform) else {
        debug!("civil {year:04}-{month:02}-{day:02} does not exist");
        return Err(FieldError::Civil.into());
    };
    Ok(widen(jd, fold))
}

/// Validates an ordinal date and returns its day number.
///
/// A negative day of the year counts back from the last existing day of
/// the year.
pub(crate) fn valid_ordinal(
    year: i64,
    day: i16,
    reform: Reform,
) -> Result<i128, Error> {
    let (fold, year, reform) = cal::fold_year(year, reform);
    let day = if day < 0 {
        let ldoy = cal::find_ldoy(year, reform);
        let (y, d) = cal::jd_to_ordinal(ldoy + i64::from(day) + 1, reform);
        if y != year {
            return Err(FieldError::Ordinal.into());
        }
        d
    } else {
        day
    };
    let jd = cal::ordinal_to_jd(year, day, reform);
    if cal::jd_to_ordinal(jd, reform) != (year, day) {
        debug!("ordinal {year:04}-{day:03} does not exist");
        return Err(FieldError::Ordinal.into());
    }
    Ok(widen(jd, fold))
}

/// Validates an ISO week date and returns its day number.
///
/// A negative weekday counts back from Sunday (`-1` is Sunday, `-7` is
/// Monday) and a negative week counts back from the last week of the
/// year.
pub(crate) fn valid_commercial(
    year: i64,
    week: i8,
    day: i8,
    reform: Reform,
) -> Result<i128, Error> {
    let day = if day < 0 { day + 8 } else { day };
    if !(1..=7).contains(&day) {
        return Err(FieldError::Commercial.into());
    }
    let (fold, year, reform) = cal::fold_year(year, reform);
    let week = if week < 0 {
        // Step whole weeks back from the Monday beginning the next week
        // year.
        let anchor = cal::commercial_to_jd(year + 1, 1, 1, reform);
        let (y, w, _) =
            cal::jd_to_commercial(anchor + 7 * i64::from(week), reform);
        if y != year {
            return Err(FieldError::Commercial.into());
        }
        w
    } else {
        week
    };
    let jd = cal::commercial_to_jd(year, week, day, reform);
    if cal::jd_to_commercial(jd, reform) != (year, week, day) {
        debug!("ISO week date {year:04}-W{week:02}-{day} does not exist");
        return Err(FieldError::Commercial.into());
    }
    Ok(widen(jd, fold))
}

/// Validates a week number date and returns its day number.
///
/// Weeks are numbered from 0 and begin on `week_start`; `day` is the
/// offset of the day within its week, `0..=6` counted from `week_start`.
/// A negative day counts back from the week's end and a negative week
/// counts back from the last week of the year.
pub(crate) fn valid_weeknum(
    year: i64,
    week: i8,
    day: i8,
    week_start: Weekday,
    reform: Reform,
) -> Result<i128, Error> {
    let first = week_start.to_sunday_zero_offset();
    let day = if day < 0 { day + 7 } else { day };
    if !(0..=6).contains(&day) {
        return Err(FieldError::Weeknum.into());
    }
    let (fold, year, reform) = cal::fold_year(year, reform);
    let week = if week < 0 {
        let anchor = cal::weeknum_to_jd(year + 1, 1, 0, first, reform);
        let (y, w, _) = cal::jd_to_weeknum(
            anchor + 7 * i64::from(week),
            first,
            reform,
        );
        if y != year {
            return Err(FieldError::Weeknum.into());
        }
        w
    } else {
        week
    };
    let jd = cal::weeknum_to_jd(year, week, day, first, reform);
    if cal::jd_to_weeknum(jd, first, reform) != (year, week, day) {
        debug!("week number date {year:04} w{week} d{day} does not exist");
        return Err(FieldError::Weeknum.into());
    }
    Ok(widen(jd, fold))
}

/// Validates an "nth weekday of the month" date and returns its day
/// number.
///
/// A negative month counts back from December and a negative `nth` counts
/// the weekday back from the month's end (`-1` is the last such weekday).
pub(crate) fn valid_nth_kday(
    year: i64,
    month: i8,
    nth: i8,
    weekday: Weekday,
    reform: Reform,
) -> Result<i128, Error> {
    let k = weekday.to_sunday_zero_offset();
    let month = if month < 0 { month + 13 } else { month };
    if !(1..=12).contains(&month) {
        return Err(FieldError::NthKday.into());
    }
    let (fold, year, reform) = cal::fold_year(year, reform);
    let nth = if nth < 0 {
        // Step whole weeks back from the first matching weekday of the
        // next month.
        let t = year * 12 + i64::from(month);
        let (ny, nm) = (t.div_euclid(12), t.rem_euclid(12) as i8 + 1);
        let anchor = cal::nth_kday_to_jd(ny, nm, 1, k, reform);
        let (y, m, n, _) =
            cal::jd_to_nth_kday(anchor + 7 * i64::from(nth), reform);
        if y != year || m != month {
            return Err(FieldError::NthKday.into());
        }
        n
    } else {
        nth
    };
    let jd = cal::nth_kday_to_jd(year, month, nth, k, reform);
    if cal::jd_to_nth_kday(jd, reform) != (year, month, nth, k) {
        debug!(
            "nth weekday {year:04}-{month:02} n={nth} k={k} does not exist",
        );
        return Err(FieldError::NthKday.into());
    }
    Ok(widen(jd, fold))
}

/// Validates a time of day, resolving negative fields, and returns the
/// normalized `(hour, minute, second)`.
///
/// Negative fields wrap against their unit once: hour `-1` is `23`,
/// minute or second `-1` is `59`. An hour of `24` is permitted only as
/// exactly `24:00:00`, denoting the start of the next day.
pub(crate) fn valid_time(
    hour: i8,
    minute: i8,
    second: i8,
) -> Result<(i8, i8, i8), Error> {
    let hour = if hour < 0 { hour + 24 } else { hour };
    let minute = if minute < 0 { minute + 60 } else { minute };
    let second = if second < 0 { second + 60 } else { second };
    let ok = (0..=24).contains(&hour)
        && (0..=59).contains(&minute)
        && (0..=59).contains(&second)
        && !(hour == 24 && (minute > 0 || second > 0));
    if !ok {
        debug!("time {hour:02}:{minute:02}:{second:02} does not exist");
        return Err(FieldError::Time.into());
    }
    Ok((hour, minute, second))
}

/// The broken-down form a partial field mapping most specifies.
///
/// Forms are tried in declaration order; a form with strictly more of its
/// fields populated wins, and ties go to the earlier form. The last three
/// are mixed forms pairing one system's week fields with the other
/// system's weekday.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Form {
    Time,
    DayNumber,
    Ordinal,
    Civil,
    Commercial,
    WeekdayOnly,
    WeekSunday,
    WeekMonday,
    IsoWeekCivilWeekday,
    WeekSundayIsoWeekday,
    WeekMondayIsoWeekday,
}

/// A partial mapping of named date and time fields.
///
/// This is the interchange type at the parsing boundary: a free-text
/// parser populates whichever fields it recognizes and the mapping is then
/// turned into a value with [`Date::from_fields`] or
/// [`DateTime::from_fields`](crate::DateTime::from_fields), optionally
/// after [`Fields::complete`] has filled the holes from a reference date.
///
/// Every field is optional and none are validated at assignment time,
/// since negative values carry "count from the end" meaning that only the
/// validators can resolve.
///
/// # Which form wins
///
/// A mapping can name the same day several ways at once. Resolution picks
/// the broken-down form with the most of its fields populated, with ties
/// going to the earliest in this fixed order: time only, day number,
/// ordinal, civil, ISO week, weekday only, Sunday-based week number,
/// Monday-based week number, then the three mixed week forms. The two
/// weekday fields ([`Fields::weekday`] counted from Sunday,
/// [`Fields::iso_weekday`] counted from Monday) are interchangeable
/// evidence: a form uses its native one when present and derives it from
/// the other otherwise.
///
/// # Example
///
/// ```
/// use lilian::{Date, Fields, Reform};
///
/// let mut fields = Fields::new();
/// fields.set_year(Some(2021));
/// fields.set_month(Some(3));
/// fields.set_day(Some(4));
/// let date = Date::from_fields(&fields, Reform::ITALY)?;
/// assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 4));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Fields {
    jd: Option<i64>,
    year: Option<i64>,
    month: Option<i8>,
    day: Option<i8>,
    day_of_year: Option<i16>,
    iso_week_year: Option<i64>,
    iso_week: Option<i8>,
    iso_weekday: Option<Weekday>,
    weekday: Option<Weekday>,
    week_sunday: Option<i8>,
    week_monday: Option<i8>,
    hour: Option<i8>,
    minute: Option<i8>,
    second: Option<i8>,
    second_fraction: Option<BigRational>,
    unix_seconds: Option<i64>,
    offset: Option<UtcOffset>,
}

impl Fields {
    /// Creates an empty mapping with every field unset.
    pub fn new() -> Fields {
        Fields::default()
    }

    /// Fills unparsed fields the way a reader of a partial date would,
    /// relative to a reference date ("today").
    ///
    /// The mapping's most specified form is determined first. Missing
    /// fields more significant than the most significant given one are
    /// copied from `today`, and less significant ones default to the
    /// first of their unit (month and day `1`, weeks to week `1` or `0`
    /// per their numbering, weekdays to the week's first day). A mapping
    /// carrying only clock fields resolves to the reference date itself,
    /// and one carrying only a weekday to that weekday within the
    /// reference date's Sunday-started week. Clock fields are never
    /// filled; absent ones simply read as midnight downstream.
    ///
    /// Completion never fails. Whether the filled mapping names a real
    /// day is decided by [`Date::from_fields`].
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Fields, Reform};
    ///
    /// let today = Date::civil(2021, 3, 10, Reform::ITALY)?;
    /// let mut fields = Fields::new();
    /// fields.set_day(Some(5));
    /// let date = Date::from_fields(&fields.complete(&today), Reform::ITALY)?;
    /// assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 5));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn complete(&self, today: &Date) -> Fields {
        let mut out = self.clone();
        let Some(form) = self.form() else { return out };
        debug!("completing fields through the {form:?} form");
        match form {
            Form::Time => {
                if out.jd.is_none() {
                    out.jd = Some(today.jd());
                }
            }
            Form::Ordinal => {
                if out.year.is_none() {
                    out.year = Some(today.year());
                }
                if out.day_of_year.is_none() {
                    out.day_of_year = Some(1);
                }
            }
            Form::Civil => {
                if out.year.is_none() {
                    out.year = Some(today.year());
                    if out.month.is_none() {
                        out.month = Some(today.month());
                        if out.day.is_none() {
                            out.day = Some(today.day());
                        }
                    }
                }
                if out.month.is_none() {
                    out.month = Some(1);
                }
                if out.day.is_none() {
                    out.day = Some(1);
                }
            }
            Form::Commercial => {
                if out.iso_week_year.is_none() {
                    out.iso_week_year = Some(today.iso_week_year());
                    if out.iso_week.is_none() {
                        out.iso_week = Some(today.iso_week());
                        if out.iso_weekday.is_none() {
                            out.iso_weekday = Some(today.iso_weekday());
                        }
                    }
                }
                if out.iso_week.is_none() {
                    out.iso_week = Some(1);
                }
                if out.iso_weekday.is_none() {
                    out.iso_weekday = Some(Weekday::Monday);
                }
            }
            Form::WeekdayOnly => {
                // The given weekday within the reference date's
                // Sunday-started week.
                //
                // OK because this form wins only when the weekday field
                // is set.
                let weekday = out.weekday.unwrap();
                out.jd = Some(
                    today.jd()
                        - i64::from(today.weekday().to_sunday_zero_offset())
                        + i64::from(weekday.to_sunday_zero_offset()),
                );
            }
            Form::WeekSunday | Form::WeekMonday => {
                let (start, week) = match form {
                    Form::WeekSunday => (Weekday::Sunday, &mut out.week_sunday),
                    _ => (Weekday::Monday, &mut out.week_monday),
                };
                if out.year.is_none() {
                    out.year = Some(today.year());
                    if week.is_none() {
                        let (_, w, _) = cal::jd_to_weeknum(
                            today.jd(),
                            start.to_sunday_zero_offset(),
                            today.reform(),
                        );
                        *week = Some(w);
                        if out.weekday.is_none() {
                            out.weekday = Some(today.weekday());
                        }
                    }
                }
                if week.is_none() {
                    *week = Some(0);
                }
                if out.weekday.is_none() {
                    out.weekday = Some(start);
                }
            }
            // A bare day number needs nothing, and the mixed forms fill
            // nothing: they only arise from deliberately cross-paired
            // fields, where inventing the rest would hide mistakes.
            Form::DayNumber
            | Form::IsoWeekCivilWeekday
            | Form::WeekSundayIsoWeekday
            | Form::WeekMondayIsoWeekday => {}
        }
        out
    }

    /// Resolves this mapping to a day number under the given reform.
    ///
    /// Epoch seconds short-circuit everything else and give the UTC day
    /// of that instant.
    pub(crate) fn resolve_jd(&self, reform: Reform) -> Result<i128, Error> {
        if let Some(seconds) = self.unix_seconds {
            return Ok(i128::from(
                seconds.div_euclid(86_400) + UNIX_EPOCH_JD,
            ));
        }
        let Some(form) = self.form() else {
            return Err(err!("the field mapping is empty"));
        };
        debug!("resolving fields through the {form:?} form");
        match form {
            Form::Time | Form::DayNumber | Form::WeekdayOnly => {
                let Some(jd) = self.jd else {
                    return Err(err!(
                        "the field mapping does not determine a day; \
                         completing it against a reference date would",
                    ));
                };
                Ok(i128::from(jd))
            }
            Form::Ordinal => {
                let (Some(year), Some(day)) = (self.year, self.day_of_year)
                else {
                    return Err(err!("ordinal fields lack a year"));
                };
                valid_ordinal(year, day, reform)
            }
            Form::Civil => {
                let (Some(year), Some(month), Some(day)) =
                    (self.year, self.month, self.day)
                else {
                    return Err(err!(
                        "civil fields lack a year, month or day",
                    ));
                };
                valid_civil(year, month, day, reform)
            }
            Form::Commercial => {
                let (Some(year), Some(week)) =
                    (self.iso_week_year, self.iso_week)
                else {
                    return Err(err!("ISO week fields lack a year or week"));
                };
                let Some(weekday) = self.iso_weekday.or(self.weekday) else {
                    return Err(err!("ISO week fields lack a weekday"));
                };
                valid_commercial(
                    year,
                    week,
                    weekday.to_monday_one_offset(),
                    reform,
                )
            }
            Form::WeekSunday | Form::WeekSundayIsoWeekday => {
                let (Some(year), Some(week)) = (self.year, self.week_sunday)
                else {
                    return Err(err!(
                        "week number fields lack a year or week",
                    ));
                };
                let weekday = match form {
                    Form::WeekSunday => self.weekday.or(self.iso_weekday),
                    _ => self.iso_weekday,
                };
                let Some(weekday) = weekday else {
                    return Err(err!("week number fields lack a weekday"));
                };
                valid_weeknum(
                    year,
                    week,
                    weekday.to_sunday_zero_offset(),
                    Weekday::Sunday,
                    reform,
                )
            }
            Form::WeekMonday | Form::WeekMondayIsoWeekday => {
                let (Some(year), Some(week)) = (self.year, self.week_monday)
                else {
                    return Err(err!(
                        "week number fields lack a year or week",
                    ));
                };
                let weekday = match form {
                    Form::WeekMonday => self.weekday.or(self.iso_weekday),
                    _ => self.iso_weekday,
                };
                let Some(weekday) = weekday else {
                    return Err(err!("week number fields lack a weekday"));
                };
                valid_weeknum(
                    year,
                    week,
                    weekday.to_monday_one_offset() - 1,
                    Weekday::Monday,
                    reform,
                )
            }
            Form::IsoWeekCivilWeekday => {
                let (Some(year), Some(week), Some(weekday)) =
                    (self.iso_week_year, self.iso_week, self.weekday)
                else {
                    return Err(err!(
                        "ISO week fields lack a year, week or weekday",
                    ));
                };
                valid_commercial(
                    year,
                    week,
                    weekday.to_monday_one_offset(),
                    reform,
                )
            }
        }
    }

    /// The normalized `(hour, minute, second)` of this mapping, absent
    /// fields reading as midnight.
    ///
    /// A second of `60`, as leap-second timestamps are written, collapses
    /// onto the second before it.
    pub(crate) fn clock(&self) -> Result<(i8, i8, i8), Error> {
        let second = match self.second {
            Some(60) => 59,
            Some(second) => second,
            None => 0,
        };
        valid_time(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            second,
        )
    }

    /// Picks the broken-down form this mapping most specifies.
    fn form(&self) -> Option<Form> {
        let clock = u8::from(self.hour.is_some())
            + u8::from(self.minute.is_some())
            + u8::from(self.second.is_some());
        let rows: [(Form, u8); 11] = [
            (Form::Time, clock),
            (Form::DayNumber, u8::from(self.jd.is_some())),
            (
                Form::Ordinal,
                u8::from(self.year.is_some())
                    + u8::from(self.day_of_year.is_some())
                    + clock,
            ),
            (
                Form::Civil,
                u8::from(self.year.is_some())
                    + u8::from(self.month.is_some())
                    + u8::from(self.day.is_some())
                    + clock,
            ),
            (
                Form::Commercial,
                u8::from(self.iso_week_year.is_some())
                    + u8::from(self.iso_week.is_some())
                    + u8::from(self.iso_weekday.is_some())
                    + clock,
            ),
            (Form::WeekdayOnly, u8::from(self.weekday.is_some()) + clock),
            (
                Form::WeekSunday,
                u8::from(self.year.is_some())
                    + u8::from(self.week_sunday.is_some())
                    + u8::from(self.weekday.is_some())
                    + clock,
            ),
            (
                Form::WeekMonday,
                u8::from(self.year.is_some())
                    + u8::from(self.week_monday.is_some())
                    + u8::from(self.weekday.is_some())
                    + clock,
            ),
            (
                Form::IsoWeekCivilWeekday,
                u8::from(self.iso_week_year.is_some())
                    + u8::from(self.iso_week.is_some())
                    + u8::from(self.weekday.is_some())
                    + clock,
            ),
            (
                Form::WeekSundayIsoWeekday,
                u8::from(self.year.is_some())
                    + u8::from(self.week_sunday.is_some())
                    + u8::from(self.iso_weekday.is_some())
                    + clock,
            ),
            (
                Form::WeekMondayIsoWeekday,
                u8::from(self.year.is_some())
                    + u8::from(self.week_monday.is_some())
                    + u8::from(self.iso_weekday.is_some())
                    + clock,
            ),
        ];
        let mut best = None;
        let mut most = 0;
        for (form, populated) in rows {
            if populated > most {
                most = populated;
                best = Some(form);
            }
        }
        best
    }

    /// The day number field, if set.
    pub fn jd(&self) -> Option<i64> {
        self.jd
    }

    /// Sets the day number field.
    pub fn set_jd(&mut self, jd: Option<i64>) {
        self.jd = jd;
    }

    /// The civil (and week number) year field, if set.
    pub fn year(&self) -> Option<i64> {
        self.year
    }

    /// Sets the civil year field.
    pub fn set_year(&mut self, year: Option<i64>) {
        self.year = year;
    }

    /// The month field, if set.
    pub fn month(&self) -> Option<i8> {
        self.month
    }

    /// Sets the month field. Negative months count back from December.
    pub fn set_month(&mut self, month: Option<i8>) {
        self.month = month;
    }

    /// The day of the month field, if set.
    pub fn day(&self) -> Option<i8> {
        self.day
    }

    /// Sets the day of the month field. Negative days count back from the
    /// last day of the month.
    pub fn set_day(&mut self, day: Option<i8>) {
        self.day = day;
    }

    /// The day of the year field, if set.
    pub fn day_of_year(&self) -> Option<i16> {
        self.day_of_year
    }

    /// Sets the day of the year field. Negative days count back from the
    /// last day of the year.
    pub fn set_day_of_year(&mut self, day_of_year: Option<i16>) {
        self.day_of_year = day_of_year;
    }

    /// The ISO week year field, if set.
    pub fn iso_week_year(&self) -> Option<i64> {
        self.iso_week_year
    }

    /// Sets the ISO week year field.
    pub fn set_iso_week_year(&mut self, iso_week_year: Option<i64>) {
        self.iso_week_year = iso_week_year;
    }

    /// The ISO week field, if set.
    pub fn iso_week(&self) -> Option<i8> {
        self.iso_week
    }

    /// Sets the ISO week field. Negative weeks count back from the last
    /// week of the week year.
    pub fn set_iso_week(&mut self, iso_week: Option<i8>) {
        self.iso_week = iso_week;
    }

    /// The weekday paired with the ISO week fields, if set.
    pub fn iso_weekday(&self) -> Option<Weekday> {
        self.iso_weekday
    }

    /// Sets the weekday paired with the ISO week fields.
    pub fn set_iso_weekday(&mut self, iso_weekday: Option<Weekday>) {
        self.iso_weekday = iso_weekday;
    }

    /// The weekday paired with the civil and week number fields, if set.
    pub fn weekday(&self) -> Option<Weekday> {
        self.weekday
    }

    /// Sets the weekday paired with the civil and week number fields.
    pub fn set_weekday(&mut self, weekday: Option<Weekday>) {
        self.weekday = weekday;
    }

    /// The Sunday-based week number field, if set.
    ///
    /// This is the week numbering of `%U` format directives: week 1
    /// begins on the year's first Sunday, and earlier days are week 0.
    pub fn week_sunday(&self) -> Option<i8> {
        self.week_sunday
    }

    /// Sets the Sunday-based week number field.
    pub fn set_week_sunday(&mut self, week_sunday: Option<i8>) {
        self.week_sunday = week_sunday;
    }

    /// The Monday-based week number field, if set.
    ///
    /// This is the week numbering of `%W` format directives: week 1
    /// begins on the year's first Monday, and earlier days are week 0.
    pub fn week_monday(&self) -> Option<i8> {
        self.week_monday
    }

    /// Sets the Monday-based week number field.
    pub fn set_week_monday(&mut self, week_monday: Option<i8>) {
        self.week_monday = week_monday;
    }

    /// The hour field, if set.
    pub fn hour(&self) -> Option<i8> {
        self.hour
    }

    /// Sets the hour field. A negative hour wraps once, so `-1` is `23`.
    pub fn set_hour(&mut self, hour: Option<i8>) {
        self.hour = hour;
    }

    /// The minute field, if set.
    pub fn minute(&self) -> Option<i8> {
        self.minute
    }

    /// Sets the minute field. A negative minute wraps once.
    pub fn set_minute(&mut self, minute: Option<i8>) {
        self.minute = minute;
    }

    /// The second field, if set.
    pub fn second(&self) -> Option<i8> {
        self.second
    }

    /// Sets the second field. A negative second wraps once.
    pub fn set_second(&mut self, second: Option<i8>) {
        self.second = second;
    }

    /// The fraction of a second, if set.
    pub fn second_fraction(&self) -> Option<&BigRational> {
        self.second_fraction.as_ref()
    }

    /// Sets the fraction of a second. Meaningful values are in `[0, 1)`.
    pub fn set_second_fraction(
        &mut self,
        second_fraction: Option<BigRational>,
    ) {
        self.second_fraction = second_fraction;
    }

    /// The seconds since the Unix epoch, if set.
    pub fn unix_seconds(&self) -> Option<i64> {
        self.unix_seconds
    }

    /// Sets the seconds since the Unix epoch.
    ///
    /// When present, this field short-circuits resolution: the mapping
    /// names that instant and every other date field is ignored.
    pub fn set_unix_seconds(&mut self, unix_seconds: Option<i64>) {
        self.unix_seconds = unix_seconds;
    }

    /// The offset from UTC, if set.
    pub fn offset(&self) -> Option<&UtcOffset> {
        self.offset.as_ref()
    }

    /// Sets the offset from UTC.
    pub fn set_offset(&mut self, offset: Option<UtcOffset>) {
        self.offset = offset;
    }
}

/// A fully decomposed date and time, as a format-string renderer consumes
/// it.
///
/// Produced by [`Date::to_parts`] and
/// [`DateTime::to_parts`](crate::DateTime::to_parts); every part is
/// populated, with absent clock parts reading as midnight UTC. This is the
/// whole interface a `strftime`-style formatter needs, so rendering code
/// never touches the calendar machinery directly.
#[derive(Clone, Debug)]
pub struct TimeParts {
    pub(crate) year: i64,
    pub(crate) month: i8,
    pub(crate) day: i8,
    pub(crate) day_of_year: i16,
    pub(crate) weekday: Weekday,
    pub(crate) hour: i8,
    pub(crate) minute: i8,
    pub(crate) second: i8,
    pub(crate) second_fraction: BigRational,
    pub(crate) offset_seconds: i32,
    pub(crate) zone: String,
    pub(crate) unix_seconds: i64,
}

impl TimeParts {
    /// The civil year.
    pub fn year(&self) -> i64 {
        self.year
    }

    /// The month, `1..=12`.
    pub fn month(&self) -> i8 {
        self.month
    }

    /// The day of the month, `1..=31`.
    pub fn day(&self) -> i8 {
        self.day
    }

    /// The day of the year, `1..=366`.
    pub fn day_of_year(&self) -> i16 {
        self.day_of_year
    }

    /// The weekday.
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// The hour, `0..=23`.
    pub fn hour(&self) -> i8 {
        self.hour
    }

    /// The minute, `0..=59`.
    pub fn minute(&self) -> i8 {
        self.minute
    }

    /// The second, `0..=59`.
    pub fn second(&self) -> i8 {
        self.second
    }

    /// The fraction of a second, in `[0, 1)`.
    pub fn second_fraction(&self) -> &BigRational {
        &self.second_fraction
    }

    /// The offset from UTC in seconds, truncated toward zero when the
    /// offset is finer than a second.
    pub fn offset_seconds(&self) -> i32 {
        self.offset_seconds
    }

    /// The rendered zone string, like `+09:00`.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    /// Seconds since the Unix epoch, saturating at the `i64` range for
    /// values beyond it.
    pub fn unix_seconds(&self) -> i64 {
        self.unix_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_negative_fields() {
        assert_eq!(
            valid_civil(2021, -1, -1, Reform::GREGORIAN).unwrap(),
            valid_civil(2021, 12, 31, Reform::GREGORIAN).unwrap(),
        );
        assert_eq!(
            valid_civil(2020, 2, -1, Reform::ITALY).unwrap(),
            valid_civil(2020, 2, 29, Reform::ITALY).unwrap(),
        );
        // October 1582 under the papal reform has 21 days; counting back
        // crosses the gap without landing in it.
        assert_eq!(valid_civil(1582, 10, -1, Reform::ITALY).unwrap(), 2_299_177);
        assert_eq!(valid_civil(1582, 10, -21, Reform::ITALY).unwrap(), 2_299_157);
        assert!(valid_civil(1582, 10, -22, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
    }

    #[test]
    fn civil_rejections() {
        assert!(valid_civil(2021, 2, 29, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
        assert!(valid_civil(1582, 10, 10, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
        assert!(valid_civil(1582, 10, 10, Reform::ENGLAND).is_ok());
        assert!(valid_civil(2021, 0, 5, Reform::ITALY).is_err());
        assert!(valid_civil(2021, 13, 5, Reform::ITALY).is_err());
        assert!(valid_civil(2021, -13, 5, Reform::ITALY).is_err());
    }

    #[test]
    fn ordinal_fields() {
        assert_eq!(
            valid_ordinal(2021, 365, Reform::ITALY).unwrap(),
            valid_civil(2021, 12, 31, Reform::ITALY).unwrap(),
        );
        assert_eq!(
            valid_ordinal(2021, -1, Reform::ITALY).unwrap(),
            valid_ordinal(2021, 365, Reform::ITALY).unwrap(),
        );
        assert!(valid_ordinal(2021, 366, Reform::ITALY).is_err());
        assert!(valid_ordinal(2020, 366, Reform::ITALY).is_ok());
        // The papal reform year kept only 355 days.
        assert!(valid_ordinal(1582, 355, Reform::ITALY).is_ok());
        assert!(valid_ordinal(1582, 356, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
    }

    #[test]
    fn commercial_fields() {
        assert_eq!(
            valid_commercial(2021, 1, 1, Reform::ITALY).unwrap(),
            2_459_219,
        );
        // Counting back: the last week of 2021 is week 52, and its last
        // day is the Sunday 2022-01-02.
        assert_eq!(
            valid_commercial(2021, -1, -1, Reform::ITALY).unwrap(),
            valid_commercial(2021, 52, 7, Reform::ITALY).unwrap(),
        );
        assert_eq!(
            valid_commercial(2021, 52, 7, Reform::ITALY).unwrap(),
            2_459_582,
        );
        assert!(valid_commercial(2020, 53, 5, Reform::ITALY).is_ok());
        assert!(valid_commercial(2021, 53, 1, Reform::ITALY)
            .unwrap_err()
            .is_invalid_date());
        assert!(valid_commercial(2021, 1, 0, Reform::ITALY).is_err());
        assert!(valid_commercial(2021, 1, 8, Reform::ITALY).is_err());
    }

    #[test]
    fn weeknum_fields() {
        assert_eq!(
            valid_weeknum(2021, 0, 5, Weekday::Sunday, Reform::ITALY)
                .unwrap(),
            2_459_216,
        );
        assert_eq!(
            valid_weeknum(2021, 1, 0, Weekday::Sunday, Reform::ITALY)
                .unwrap(),
            2_459_218,
        );
        // The last Sunday-started week of 2021 begins on 2021-12-26.
        assert_eq!(
            valid_weeknum(2021, -1, 0, Weekday::Sunday, Reform::ITALY)
                .unwrap(),
            2_459_575,
        );
        assert_eq!(
            valid_weeknum(2021, -1, -7, Weekday::Sunday, Reform::ITALY)
                .unwrap(),
            2_459_575,
        );
        assert!(valid_weeknum(2021, 55, 0, Weekday::Sunday, Reform::ITALY)
            .is_err());
        assert!(valid_weeknum(2021, 1, 7, Weekday::Sunday, Reform::ITALY)
            .is_err());
    }

    #[test]
    fn nth_kday_fields() {
        // November 2021 has four Thursdays, the 4th through the 25th.
        assert_eq!(
            valid_nth_kday(2021, 11, 1, Weekday::Thursday, Reform::ITALY)
                .unwrap(),
            2_459_523,
        );
        assert_eq!(
            valid_nth_kday(2021, 11, -1, Weekday::Thursday, Reform::ITALY)
                .unwrap(),
            valid_nth_kday(2021, 11, 4, Weekday::Thursday, Reform::ITALY)
                .unwrap(),
        );
        assert!(
            valid_nth_kday(2021, 11, 5, Weekday::Thursday, Reform::ITALY)
                .unwrap_err()
                .is_invalid_date(),
        );
        assert!(
            valid_nth_kday(2021, 11, 0, Weekday::Thursday, Reform::ITALY)
                .is_err(),
        );
        assert_eq!(
            valid_nth_kday(2021, -2, -1, Weekday::Thursday, Reform::ITALY)
                .unwrap(),
            valid_nth_kday(2021, 11, 4, Weekday::Thursday, Reform::ITALY)
                .unwrap(),
        );
    }

    #[test]
    fn time_fields() {
        assert_eq!(valid_time(-1, -1, -1).unwrap(), (23, 59, 59));
        assert_eq!(valid_time(24, 0, 0).unwrap(), (24, 0, 0));
        assert!(valid_time(24, 0, 1).unwrap_err().is_invalid_date());
        assert!(valid_time(24, 1, 0).is_err());
        assert!(valid_time(25, 0, 0).is_err());
        assert!(valid_time(-25, 0, 0).is_err());
        assert!(valid_time(23, 60, 0).is_err());
        assert!(valid_time(23, 0, 60).is_err());
    }

    #[test]
    fn folded_years_resolve() {
        // A year far beyond the bounded range reduces by whole repetition
        // periods of the Gregorian cycle.
        let reduced = cal::civil_exists(110_400, 6, 15, Reform::GREGORIAN)
            .unwrap();
        assert_eq!(
            valid_civil(500_000, 6, 15, Reform::GREGORIAN).unwrap(),
            i128::from(reduced) + 2 * i128::from(cal::PERIOD_DAYS),
        );

        // Negative years reduce through the Julian cycle; the folded
        // result must agree with the plain formula, which has no trouble
        // with this year on its own.
        let direct = cal::civil_exists(-10_000, 6, 15, Reform::JULIAN);
        assert_eq!(
            valid_civil(-10_000, 6, 15, Reform::JULIAN).unwrap(),
            i128::from(direct.unwrap()),
        );
    }

    #[test]
    fn resolution_picks_most_specified_form() {
        let mut fields = Fields::new();
        fields.set_jd(Some(100));
        assert_eq!(fields.resolve_jd(Reform::ITALY).unwrap(), 100);

        // Three civil fields outweigh the day number.
        fields.set_year(Some(2021));
        fields.set_month(Some(3));
        fields.set_day(Some(4));
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            valid_civil(2021, 3, 4, Reform::ITALY).unwrap(),
        );

        // Epoch seconds outweigh everything.
        fields.set_unix_seconds(Some(0));
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            i128::from(UNIX_EPOCH_JD),
        );
        let mut fields = Fields::new();
        fields.set_unix_seconds(Some(-1));
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            i128::from(UNIX_EPOCH_JD) - 1,
        );
    }

    #[test]
    fn resolution_needs_enough_fields() {
        let fields = Fields::new();
        assert!(fields.resolve_jd(Reform::ITALY).is_err());

        // A bare year picks the ordinal form but cannot resolve without
        // completion.
        let mut fields = Fields::new();
        fields.set_year(Some(2021));
        assert!(fields.resolve_jd(Reform::ITALY).is_err());

        // Clock fields alone name no day either.
        let mut fields = Fields::new();
        fields.set_hour(Some(12));
        assert!(fields.resolve_jd(Reform::ITALY).is_err());
    }

    #[test]
    fn native_weekday_beats_foreign() {
        // ISO week fields with both weekday flavors present: the ISO one
        // wins and the civil one is ignored.
        let mut fields = Fields::new();
        fields.set_iso_week_year(Some(2021));
        fields.set_iso_week(Some(1));
        fields.set_iso_weekday(Some(Weekday::Sunday));
        fields.set_weekday(Some(Weekday::Friday));
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            valid_commercial(2021, 1, 7, Reform::ITALY).unwrap(),
        );

        // Without the native one, the civil weekday is borrowed.
        fields.set_iso_weekday(None);
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            valid_commercial(2021, 1, 5, Reform::ITALY).unwrap(),
        );
    }

    #[test]
    fn mixed_form_weeknum_with_iso_weekday() {
        // Sunday-based week number paired with an ISO weekday: Sunday is
        // offset 0 in that numbering.
        let mut fields = Fields::new();
        fields.set_year(Some(2021));
        fields.set_week_sunday(Some(1));
        fields.set_iso_weekday(Some(Weekday::Sunday));
        assert_eq!(fields.resolve_jd(Reform::ITALY).unwrap(), 2_459_218);

        // Monday-based numbering maps Monday to offset 0.
        let mut fields = Fields::new();
        fields.set_year(Some(2021));
        fields.set_week_monday(Some(1));
        fields.set_iso_weekday(Some(Weekday::Monday));
        assert_eq!(
            fields.resolve_jd(Reform::ITALY).unwrap(),
            valid_weeknum(2021, 1, 0, Weekday::Monday, Reform::ITALY)
                .unwrap(),
        );
    }

    #[test]
    fn clock_defaults_and_leap_second() {
        let mut fields = Fields::new();
        assert_eq!(fields.clock().unwrap(), (0, 0, 0));
        fields.set_hour(Some(23));
        fields.set_minute(Some(59));
        fields.set_second(Some(60));
        assert_eq!(fields.clock().unwrap(), (23, 59, 59));
        fields.set_second(Some(61));
        assert!(fields.clock().is_err());
    }

    quickcheck::quickcheck! {
        fn prop_decoded_fields_validate(jd: i32, reform: Reform) -> bool {
            let jd = i64::from(jd);
            let wide = i128::from(jd);

            let (y, m, d) = cal::jd_to_civil(jd, reform);
            if valid_civil(y, m, d, reform).ok() != Some(wide) {
                return false;
            }

            let (y, d) = cal::jd_to_ordinal(jd, reform);
            if valid_ordinal(y, d, reform).ok() != Some(wide) {
                return false;
            }

            let (y, w, d) = cal::jd_to_commercial(jd, reform);
            if valid_commercial(y, w, d, reform).ok() != Some(wide) {
                return false;
            }

            for start in [Weekday::Sunday, Weekday::Monday] {
                let f = start.to_sunday_zero_offset();
                let (y, w, d) = cal::jd_to_weeknum(jd, f, reform);
                if valid_weeknum(y, w, d, start, reform).ok() != Some(wide) {
                    return false;
                }
            }

            let (y, m, n, k) = cal::jd_to_nth_kday(jd, reform);
            let k = Weekday::from_sunday_zero_offset(k).unwrap();
            valid_nth_kday(y, m, n, k, reform).ok() == Some(wide)
        }
    }
}
