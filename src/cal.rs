/*!
This module defines the core calendar arithmetic on plain integers.

Everything here converts between a Julian Day Number and one of the
broken-down field systems (civil year/month/day, ordinal year/day-of-year,
ISO week dates, first-day-of-week relative week numbers and "nth weekday of
the month"), in a calendar that switches from Julian to Gregorian reckoning
at a configurable reform day.

These routines are implemented on simple primitive integer types, with no
floating point anywhere. The classic astronomical formulas written with
`365.25` and `30.6001` become exact floored divisions (`1461 n div 4` and
`306001 m div 10000`).

Callers are expected to fold years and day numbers into a single repetition
period first (see [`fold_year`] and [`fold_jd`]); the routines themselves
then stay comfortably inside `i64`.
*/

use crate::reform::Reform;

/// The number of days after which the Gregorian cycle, the Julian cycle and
/// the week all realign: `lcm(146097, 1461, 7)`.
///
/// Shifting any broken-down representation by one period in the same
/// (uniform) calendar shifts its day number by exactly this many days, and
/// preserves the weekday.
pub(crate) const PERIOD_DAYS: i64 = 71_149_239;

/// Gregorian years in one period: `PERIOD_DAYS / 146097 * 400`.
pub(crate) const GREGORIAN_YEARS_PER_PERIOD: i64 = 194_800;

/// Julian years in one period: `PERIOD_DAYS / 1461 * 4`.
pub(crate) const JULIAN_YEARS_PER_PERIOD: i64 = 194_796;

/// Returns true if and only if the given year is a Julian leap year.
#[inline]
pub(crate) const fn julian_leap(year: i64) -> bool {
    year.rem_euclid(4) == 0
}

/// Returns true if and only if the given year is a Gregorian leap year.
#[inline]
pub(crate) const fn gregorian_leap(year: i64) -> bool {
    (year.rem_euclid(4) == 0 && year % 100 != 0)
        || year.rem_euclid(400) == 0
}

/// Returns true if and only if February 29 of the given year exists under
/// the given reform.
///
/// For a year cut by the reform this is decided by what the calendar
/// actually contains: the day before March 1, which the reform gap may have
/// turned into something other than the 29th.
pub(crate) fn leap(year: i64, reform: Reform) -> bool {
    if reform.is_proleptic_gregorian() {
        return gregorian_leap(year);
    }
    let (jd, _) = civil_to_jd(year, 3, 1, reform);
    let (_, _, day) = jd_to_civil(jd - 1, reform);
    day == 29
}

/// The number of days in a month of a year that is not cut by a reform.
#[inline]
pub(crate) const fn days_in_month_uniform(leap: bool, month: i8) -> i8 {
    const TABLE: [[i8; 13]; 2] = [
        [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
        [0, 31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31],
    ];
    TABLE[leap as usize][month as usize]
}

/// The weekday of a Julian Day Number, with Sunday as `0`.
///
/// JD 0 was a Monday.
#[inline]
pub(crate) const fn jd_to_weekday(jd: i64) -> i8 {
    (jd + 1).rem_euclid(7) as i8
}

/// Converts a proleptic Julian calendar date to a Julian Day Number.
#[inline]
pub(crate) const fn julian_to_jd(year: i64, month: i8, day: i8) -> i64 {
    let (y, m) = if month <= 2 {
        (year - 1, month as i64 + 12)
    } else {
        (year, month as i64)
    };
    (1461 * (y + 4716)).div_euclid(4)
        + (306_001 * (m + 1)).div_euclid(10_000)
        + day as i64
        - 1524
}

/// Converts a proleptic Gregorian calendar date to a Julian Day Number.
#[inline]
pub(crate) const fn gregorian_to_jd(year: i64, month: i8, day: i8) -> i64 {
    // January and February count as months 13 and 14 of the previous
    // year, so the century correction uses that year too.
    let y = if month <= 2 { year - 1 } else { year };
    let a = y.div_euclid(100);
    julian_to_jd(year, month, day) + 2 - a + a.div_euclid(4)
}

/// Converts a civil date to a Julian Day Number under the given reform.
///
/// The date is first interpreted in the Gregorian calendar; if the
/// resulting day number falls before the reform day, it is reinterpreted in
/// the Julian calendar. The returned flag records which interpretation was
/// used (true for Gregorian).
///
/// The result is the day the fields *describe*, which for fields swallowed
/// by a reform gap is a day that decodes to different fields. Use
/// [`civil_exists`] to tell those apart.
pub(crate) fn civil_to_jd(
    year: i64,
    month: i8,
    day: i8,
    reform: Reform,
) -> (i64, bool) {
    let gregorian = gregorian_to_jd(year, month, day);
    if reform.is_gregorian(gregorian) {
        (gregorian, true)
    } else {
        (julian_to_jd(year, month, day), false)
    }
}

/// Converts a Julian Day Number to a civil date under the given reform.
pub(crate) fn jd_to_civil(jd: i64, reform: Reform) -> (i64, i8, i8) {
    let a = if reform.is_gregorian(jd) {
        let x = (100 * jd - 186_721_625).div_euclid(3_652_425);
        jd + 1 + x - x.div_euclid(4)
    } else {
        jd
    };
    let b = a + 1524;
    let c = (20 * b - 2442).div_euclid(7305);
    let d = (1461 * c).div_euclid(4);
    let e = (10_000 * (b - d)).div_euclid(306_001);
    let day = (b - d - (306_001 * e).div_euclid(10_000)) as i8;
    if e <= 13 {
        (c - 4716, (e - 1) as i8, day)
    } else {
        (c - 4715, (e - 13) as i8, day)
    }
}

/// Returns the Julian Day Number of the given civil date if the date
/// exists under the given reform, i.e. if converting the fields to a day
/// number and back reproduces them exactly.
pub(crate) fn civil_exists(
    year: i64,
    month: i8,
    day: i8,
    reform: Reform,
) -> Option<i64> {
    let (jd, _) = civil_to_jd(year, month, day, reform);
    let (y, m, d) = jd_to_civil(jd, reform);
    if y == year && m == month && d == day {
        Some(jd)
    } else {
        None
    }
}

/// The first day of the given year that exists under the given reform.
///
/// This is January 1 except for a year whose January is cut by a reform
/// gap. Reform gaps are much shorter than a month, so the scan always
/// finds a day.
pub(crate) fn find_fdoy(year: i64, reform: Reform) -> i64 {
    find_fdom(year, 1, reform)
}

/// The last day of the given year that exists under the given reform.
pub(crate) fn find_ldoy(year: i64, reform: Reform) -> i64 {
    find_ldom(year, 12, reform)
}

/// The first day of the given month that exists under the given reform.
pub(crate) fn find_fdom(year: i64, month: i8, reform: Reform) -> i64 {
    let mut day = 1;
    while day <= 30 {
        if let Some(jd) = civil_exists(year, month, day, reform) {
            return jd;
        }
        day += 1;
    }
    // A reform gap spans at most 13 days and so cannot cover 30.
    unreachable!("no valid day in year {year}, month {month}")
}

/// The last day of the given month that exists under the given reform.
pub(crate) fn find_ldom(year: i64, month: i8, reform: Reform) -> i64 {
    let mut day = 31;
    while day >= 1 {
        if let Some(jd) = civil_exists(year, month, day, reform) {
            return jd;
        }
        day -= 1;
    }
    // A reform gap spans at most 13 days and so cannot cover a month.
    unreachable!("no valid day in year {year}, month {month}")
}

/// Converts an ordinal date (year and day of the year) to a Julian Day
/// Number under the given reform.
///
/// Day 1 is the first *existing* day of the year, so in a year cut by a
/// reform gap the ordinal numbering is contiguous even though the civil
/// numbering is not.
pub(crate) fn ordinal_to_jd(year: i64, day: i16, reform: Reform) -> i64 {
    find_fdoy(year, reform) + day as i64 - 1
}

/// Converts a Julian Day Number to an ordinal date under the given reform.
pub(crate) fn jd_to_ordinal(jd: i64, reform: Reform) -> (i64, i16) {
    let (year, _, _) = jd_to_civil(jd, reform);
    let fdoy = find_fdoy(year, reform);
    (year, (jd - fdoy + 1) as i16)
}

/// Converts an ISO week date to a Julian Day Number under the given
/// reform.
///
/// Week 1 is the week containing the first Thursday of the year, weeks
/// begin on Monday, and `day` is the commercial weekday with Monday as `1`
/// and Sunday as `7`.
pub(crate) fn commercial_to_jd(
    year: i64,
    week: i8,
    day: i8,
    reform: Reform,
) -> i64 {
    // The Monday of week 1 is found by rounding the day three days past
    // the first of the year down to a multiple of seven. (Day numbers that
    // are multiples of seven are Mondays.)
    let near = find_fdoy(year, reform) + 3;
    let monday = near - near.rem_euclid(7);
    monday + 7 * (week as i64 - 1) + (day as i64 - 1)
}

/// Converts a Julian Day Number to an ISO week date under the given
/// reform.
pub(crate) fn jd_to_commercial(jd: i64, reform: Reform) -> (i64, i8, i8) {
    // The Thursday rule: the week year is the civil year of this week's
    // Thursday. Guess from the civil year three days back, then check
    // whether the day already belongs to the next week year.
    let (guess, _, _) = jd_to_civil(jd - 3, reform);
    let year = if jd >= commercial_to_jd(guess + 1, 1, 1, reform) {
        guess + 1
    } else {
        guess
    };
    let week = 1 + (jd - commercial_to_jd(year, 1, 1, reform)).div_euclid(7);
    let day = (jd + 1).rem_euclid(7);
    let day = if day == 0 { 7 } else { day };
    (year, week as i8, day as i8)
}

/// Converts a week number date to a Julian Day Number under the given
/// reform.
///
/// The year's weeks are numbered from 0, where week 1 begins on the first
/// `first_day_of_week` (Sunday as `0`) of the year; the days before it are
/// week 0. `day` is the offset of the day within its week, `0..=6` from
/// the week's first day.
pub(crate) fn weeknum_to_jd(
    year: i64,
    week: i8,
    day: i8,
    first_day_of_week: i8,
    reform: Reform,
) -> i64 {
    let near = find_fdoy(year, reform) + 6;
    let week_start = near - (near - first_day_of_week as i64 + 1).rem_euclid(7);
    (week_start - 7) + 7 * week as i64 + day as i64
}

/// Converts a Julian Day Number to a week number date under the given
/// reform. The inverse of [`weeknum_to_jd`].
pub(crate) fn jd_to_weeknum(
    jd: i64,
    first_day_of_week: i8,
    reform: Reform,
) -> (i64, i8, i8) {
    let (year, _, _) = jd_to_civil(jd, reform);
    let near = find_fdoy(year, reform) + 6;
    let week_start = near - (near - first_day_of_week as i64 + 1).rem_euclid(7);
    let j = jd - week_start + 7;
    (year, j.div_euclid(7) as i8, j.rem_euclid(7) as i8)
}

/// Converts an "nth weekday of the month" to a Julian Day Number under the
/// given reform.
///
/// `nth` counts the given weekday (Sunday as `0`) within the month:
/// positive from the start (`1` is the first such weekday), negative from
/// the end (`-1` is the last).
pub(crate) fn nth_kday_to_jd(
    year: i64,
    month: i8,
    nth: i8,
    weekday: i8,
    reform: Reform,
) -> i64 {
    // Anchor just outside the month on the counting side, snap to the
    // nearest earlier matching weekday, then step by whole weeks.
    let near = if nth > 0 {
        find_fdom(year, month, reform) - 1
    } else {
        find_ldom(year, month, reform) + 7
    };
    let anchor = near - (near - weekday as i64 + 1).rem_euclid(7);
    anchor + 7 * nth as i64
}

/// Converts a Julian Day Number to an "nth weekday of the month" under the
/// given reform, counting from the start of the month.
pub(crate) fn jd_to_nth_kday(
    jd: i64,
    reform: Reform,
) -> (i64, i8, i8, i8) {
    let (year, month, _) = jd_to_civil(jd, reform);
    let fdom = find_fdom(year, month, reform);
    let nth = (jd - fdom).div_euclid(7) + 1;
    (year, month, nth as i8, jd_to_weekday(jd))
}

/// Folds a year into the period around the day origin.
///
/// Returns the fold count, the reduced year and the reform to reckon the
/// reduced year under. Years in fold zero keep the caller's reform; years
/// in any other fold are entirely on one side of any permissible reform
/// day, so the reduced year is reckoned in the proleptic calendar of that
/// side and the fold count converts back via the matching
/// years-per-period.
pub(crate) fn fold_year(year: i64, reform: Reform) -> (i64, i64, Reform) {
    let julian_side = if reform.is_proleptic_julian() {
        true
    } else if reform.is_proleptic_gregorian() {
        false
    } else {
        // Reform days all fall in 1582..=1930, so a year outside fold
        // zero is Julian below that window and Gregorian above it.
        year < 1582
    };
    let per = if julian_side {
        JULIAN_YEARS_PER_PERIOD
    } else {
        GREGORIAN_YEARS_PER_PERIOD
    };
    // Shift so that fold zero starts at year -4712, the year of JD 0.
    let nth = (year as i128 + 4712).div_euclid(per as i128);
    let reduced = (year as i128 - nth * per as i128) as i64;
    let eff = if nth == 0 {
        reform
    } else if julian_side {
        Reform::JULIAN
    } else {
        Reform::GREGORIAN
    };
    (nth as i64, reduced, eff)
}

/// Folds a day number into the period starting at JD 0.
///
/// The counterpart of [`fold_year`] for the decoding direction: returns
/// the fold count, the reduced day number in `0..PERIOD_DAYS` and the
/// reform to decode it under.
pub(crate) fn fold_jd(jd: i128, reform: Reform) -> (i128, i64, Reform) {
    let nth = jd.div_euclid(PERIOD_DAYS as i128);
    let reduced = (jd - nth * PERIOD_DAYS as i128) as i64;
    let uniform =
        reform.is_proleptic_julian() || reform.is_proleptic_gregorian();
    let eff = if nth == 0 || uniform {
        reform
    } else if nth < 0 {
        // Every permissible reform day is inside fold zero.
        Reform::JULIAN
    } else {
        Reform::GREGORIAN
    };
    (nth, reduced, eff)
}

/// The years-per-period matching the calendar a folded value was reduced
/// in. Only meaningful for the uniform reform returned by [`fold_year`]
/// or [`fold_jd`] with a non-zero fold count.
#[inline]
pub(crate) const fn years_per_period(reform: Reform) -> i64 {
    if reform.is_proleptic_julian() {
        JULIAN_YEARS_PER_PERIOD
    } else {
        GREGORIAN_YEARS_PER_PERIOD
    }
}
