/*!
The two runtime representations of a calendar value.

A value lives in the light representation when machine integers can carry
it exactly: a whole day number inside the historically bounded window, a
time of day that is a whole number of nanoseconds and an offset that is a
whole number of seconds. Everything else, from astronomically remote days
to a third-of-a-second fraction, lives in the exact representation as a
`BigRational` astronomical day number.

Selection between the two is re-run by every operation that derives a new
value. Promotion is silent and lossless, and demotion happens whenever the
exactness checks prove a value fits the light form again, so which
representation is in use is never observable through the public API. One
consequence worth keeping in mind: a reachable value is always in its
canonical representation, which is what lets equality and hashing compare
light values by integers alone.

Day numbers beyond the bounded window decode through [`cal::fold_jd`]:
whole repetitions of the 71,149,239-day calendar period are split off,
the remainder is decoded normally and the year is shifted back by whole
periods. The unreachable tail where even the shifted year leaves `i64`
saturates instead of erroring, keeping every accessor total.
*/

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

use crate::{cal, offset::UtcOffset, reform::Reform, weekday::Weekday};

/// The smallest day number the light representation covers.
pub(crate) const MIN_JD: i64 = -327;

/// The largest day number the light representation covers: the last day
/// of civil year 1,000,000 in the proleptic Gregorian calendar.
pub(crate) const MAX_JD: i64 = 366_963_925;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
pub(crate) const NANOS_PER_SECOND: i64 = 1_000_000_000;
pub(crate) const NANOS_PER_DAY: i64 = SECONDS_PER_DAY * NANOS_PER_SECOND;

/// A date the light representation can carry.
///
/// The civil breakdown is computed eagerly: every constructor runs the
/// day number through the calendar anyway, so storing the result costs
/// nothing and makes the most common accessors field reads. The other
/// breakdowns are cheap pure functions of `jd` and are recomputed on
/// demand.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LightDate {
    pub(crate) jd: i32,
    pub(crate) year: i32,
    pub(crate) month: i8,
    pub(crate) day: i8,
    pub(crate) reform: Reform,
}

impl LightDate {
    /// Builds a light date from a day number already known to be inside
    /// the light window.
    pub(crate) fn new(jd: i32, reform: Reform) -> LightDate {
        let (year, month, day) = cal::jd_to_civil(i64::from(jd), reform);
        debug_assert!((-4714..=1_000_000).contains(&year));
        LightDate { jd, year: year as i32, month, day, reform }
    }

    /// Promotes to the exact representation. Lossless.
    pub(crate) fn to_exact(self) -> ExactDateTime {
        ExactDateTime::from_wide_jd(i128::from(self.jd), self.reform)
    }
}

/// A date and time of day the light representation can carry.
///
/// `second_of_day` counts `0..86_400` in local time and `nanosecond`
/// subdivides that second. The offset is whole seconds with
/// `|offset_seconds| < 86_400`, the same bound [`UtcOffset`] enforces.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LightDateTime {
    pub(crate) date: LightDate,
    pub(crate) second_of_day: i32,
    pub(crate) nanosecond: i32,
    pub(crate) offset_seconds: i32,
}

impl LightDateTime {
    /// Promotes to the exact representation. Lossless.
    pub(crate) fn to_exact(&self) -> ExactDateTime {
        let jd = BigRational::from_integer(BigInt::from(self.date.jd));
        let nanos = i64::from(self.second_of_day) * NANOS_PER_SECOND
            + i64::from(self.nanosecond);
        let fraction =
            BigRational::new(BigInt::from(nanos), BigInt::from(NANOS_PER_DAY));
        let offset = BigRational::new(
            BigInt::from(self.offset_seconds),
            BigInt::from(SECONDS_PER_DAY),
        );
        // The astronomical day counts from noon UTC, so the local day
        // number and fraction convert as jd + fraction - offset - 1/2.
        let ajd = jd + fraction - &offset - half();
        ExactDateTime { ajd, offset, reform: self.date.reform }
    }
}

/// The exact representation: an astronomical day number, the offset its
/// local fields are presented in, and the reform they are reckoned under.
///
/// The astronomical day number is UTC and counts from noon, so a date's
/// midnight is `jd - 1/2`. The offset is a fraction of a day with
/// `|offset| < 1`. Values wrapped by [`DateRepr`] keep the offset at
/// exactly zero.
#[derive(Clone, Debug)]
pub(crate) struct ExactDateTime {
    pub(crate) ajd: BigRational,
    pub(crate) offset: BigRational,
    pub(crate) reform: Reform,
}

impl ExactDateTime {
    /// Midnight at the start of the given whole day number, UTC.
    pub(crate) fn from_wide_jd(jd: i128, reform: Reform) -> ExactDateTime {
        let ajd = BigRational::new(BigInt::from(2 * jd - 1), BigInt::from(2));
        ExactDateTime { ajd, offset: BigRational::zero(), reform }
    }

    /// The local day number and the fraction of the local day elapsed
    /// since its midnight, in `[0, 1)`.
    pub(crate) fn local(&self) -> (i128, BigRational) {
        let local = &self.ajd + &self.offset + half();
        let jd = floor_i128(&local);
        let fraction = local - BigRational::from_integer(BigInt::from(jd));
        (jd, fraction)
    }

    /// Demotes to the light date and time form when every exactness
    /// check passes.
    fn try_light(&self) -> Option<LightDateTime> {
        let offset_seconds = whole_offset_seconds(&self.offset)?;
        let (jd, fraction) = self.local();
        let jd = light_jd(jd)?;
        let nanos = whole_nanos(&fraction)?;
        Some(LightDateTime {
            date: LightDate::new(jd, self.reform),
            second_of_day: (nanos / NANOS_PER_SECOND) as i32,
            nanosecond: (nanos % NANOS_PER_SECOND) as i32,
            offset_seconds,
        })
    }
}

fn half() -> BigRational {
    BigRational::new(BigInt::from(1), BigInt::from(2))
}

/// The day number as an `i32` when it is inside the light window.
fn light_jd(jd: i128) -> Option<i32> {
    if (i128::from(MIN_JD)..=i128::from(MAX_JD)).contains(&jd) {
        // OK because the light window is well inside the i32 range.
        Some(jd as i32)
    } else {
        None
    }
}

/// The offset as whole seconds, when it is exactly that.
fn whole_offset_seconds(offset: &BigRational) -> Option<i32> {
    let seconds =
        offset * BigRational::from_integer(BigInt::from(SECONDS_PER_DAY));
    if !seconds.is_integer() {
        return None;
    }
    let seconds = seconds.to_integer().to_i32()?;
    if !(-(SECONDS_PER_DAY as i32) < seconds
        && seconds < SECONDS_PER_DAY as i32)
    {
        return None;
    }
    Some(seconds)
}

/// A day fraction in `[0, 1)` as whole nanoseconds, when it is exactly
/// that.
fn whole_nanos(fraction: &BigRational) -> Option<i64> {
    let nanos =
        fraction * BigRational::from_integer(BigInt::from(NANOS_PER_DAY));
    if !nanos.is_integer() {
        return None;
    }
    let nanos = nanos.to_integer().to_i64()?;
    if !(0..NANOS_PER_DAY).contains(&nanos) {
        return None;
    }
    Some(nanos)
}

/// Floor of a rational to an `i128`, saturating in the unreachable tail.
pub(crate) fn floor_i128(r: &BigRational) -> i128 {
    let floored = r.floor().to_integer();
    floored.to_i128().unwrap_or_else(|| {
        if floored.sign() == Sign::Minus {
            i128::MIN
        } else {
            i128::MAX
        }
    })
}

/// Narrows a wide integer to an `i64`, saturating in the unreachable
/// tail.
pub(crate) fn saturate_i64(n: i128) -> i64 {
    i64::try_from(n)
        .unwrap_or_else(|_| if n < 0 { i64::MIN } else { i64::MAX })
}

/// Whole seconds since the Unix epoch of an astronomical day number,
/// floored, saturating at the `i64` range.
pub(crate) fn unix_seconds(ajd: &BigRational) -> i64 {
    let epoch = BigRational::new(
        BigInt::from(2 * crate::fields::UNIX_EPOCH_JD - 1),
        BigInt::from(2),
    );
    let seconds = (ajd - epoch)
        * BigRational::from_integer(BigInt::from(SECONDS_PER_DAY));
    saturate_i64(floor_i128(&seconds))
}

/// Decodes a wide day number into civil fields, folding by whole
/// calendar periods when it lies outside the directly reckonable range.
pub(crate) fn wide_civil(jd: i128, reform: Reform) -> (i64, i8, i8) {
    let (nth, reduced, eff) = cal::fold_jd(jd, reform);
    let (year, month, day) = cal::jd_to_civil(reduced, eff);
    (shift_year(year, nth, eff), month, day)
}

/// Decodes a wide day number into ordinal fields.
pub(crate) fn wide_ordinal(jd: i128, reform: Reform) -> (i64, i16) {
    let (nth, reduced, eff) = cal::fold_jd(jd, reform);
    let (year, day) = cal::jd_to_ordinal(reduced, eff);
    (shift_year(year, nth, eff), day)
}

/// Decodes a wide day number into ISO week fields.
pub(crate) fn wide_commercial(jd: i128, reform: Reform) -> (i64, i8, i8) {
    let (nth, reduced, eff) = cal::fold_jd(jd, reform);
    let (year, week, day) = cal::jd_to_commercial(reduced, eff);
    (shift_year(year, nth, eff), week, day)
}

/// The weekday of a wide day number. The calendar period is a whole
/// number of weeks, so no folding is needed.
pub(crate) fn wide_weekday(jd: i128) -> Weekday {
    let offset = (jd.rem_euclid(7) + 1).rem_euclid(7) as i8;
    // OK because rem_euclid(7) is always in 0..=6.
    Weekday::from_sunday_zero_offset(offset).unwrap()
}

/// Whether a wide day number is on the Gregorian side of the reform.
pub(crate) fn wide_is_gregorian(jd: i128, reform: Reform) -> bool {
    match reform.as_jd() {
        Some(reform) => jd >= i128::from(reform),
        None => reform.is_proleptic_gregorian(),
    }
}

fn shift_year(year: i64, nth: i128, eff: Reform) -> i64 {
    let shifted = i128::from(year)
        + nth * i128::from(cal::years_per_period(eff));
    saturate_i64(shifted)
}

/// The representation of a [`Date`](crate::Date): a whole (or, after
/// exact arithmetic, fractional) day number with no offset.
#[derive(Clone, Debug)]
pub(crate) enum DateRepr {
    Light(LightDate),
    Exact(ExactDateTime),
}

impl DateRepr {
    /// Selects the representation for a whole day number.
    pub(crate) fn from_wide_jd(jd: i128, reform: Reform) -> DateRepr {
        match light_jd(jd) {
            Some(jd) => DateRepr::Light(LightDate::new(jd, reform)),
            None => {
                trace!("day {jd} is outside the light window, going exact");
                DateRepr::Exact(ExactDateTime::from_wide_jd(jd, reform))
            }
        }
    }

    /// Selects the representation for an exact astronomical day number.
    pub(crate) fn from_ajd(ajd: BigRational, reform: Reform) -> DateRepr {
        let local = &ajd + half();
        if local.is_integer() {
            if let Some(jd) = local.to_integer().to_i128().and_then(light_jd)
            {
                return DateRepr::Light(LightDate::new(jd, reform));
            }
        }
        DateRepr::Exact(ExactDateTime {
            ajd,
            offset: BigRational::zero(),
            reform,
        })
    }

    /// Re-selects after an operation on the exact form.
    pub(crate) fn select(exact: ExactDateTime) -> DateRepr {
        debug_assert!(exact.offset.is_zero());
        DateRepr::from_ajd(exact.ajd, exact.reform)
    }

    pub(crate) fn to_exact(&self) -> ExactDateTime {
        match *self {
            DateRepr::Light(light) => light.to_exact(),
            DateRepr::Exact(ref exact) => exact.clone(),
        }
    }

    pub(crate) fn reform(&self) -> Reform {
        match *self {
            DateRepr::Light(ref light) => light.reform,
            DateRepr::Exact(ref exact) => exact.reform,
        }
    }

    /// The local day number, without narrowing.
    pub(crate) fn wide_jd(&self) -> i128 {
        match *self {
            DateRepr::Light(ref light) => i128::from(light.jd),
            DateRepr::Exact(ref exact) => exact.local().0,
        }
    }

    /// The local day number, saturating in the unreachable tail.
    pub(crate) fn jd(&self) -> i64 {
        match *self {
            DateRepr::Light(ref light) => i64::from(light.jd),
            DateRepr::Exact(ref exact) => saturate_i64(exact.local().0),
        }
    }

    pub(crate) fn civil(&self) -> (i64, i8, i8) {
        match *self {
            DateRepr::Light(ref light) => {
                (i64::from(light.year), light.month, light.day)
            }
            DateRepr::Exact(ref exact) => {
                wide_civil(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn ordinal(&self) -> (i64, i16) {
        match *self {
            DateRepr::Light(ref light) => {
                cal::jd_to_ordinal(i64::from(light.jd), light.reform)
            }
            DateRepr::Exact(ref exact) => {
                wide_ordinal(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn commercial(&self) -> (i64, i8, i8) {
        match *self {
            DateRepr::Light(ref light) => {
                cal::jd_to_commercial(i64::from(light.jd), light.reform)
            }
            DateRepr::Exact(ref exact) => {
                wide_commercial(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn weekday(&self) -> Weekday {
        match *self {
            DateRepr::Light(ref light) => {
                Weekday::from_jd(i64::from(light.jd))
            }
            DateRepr::Exact(ref exact) => wide_weekday(exact.local().0),
        }
    }

    pub(crate) fn ajd(&self) -> BigRational {
        match *self {
            DateRepr::Light(ref light) => BigRational::new(
                BigInt::from(2 * i64::from(light.jd) - 1),
                BigInt::from(2),
            ),
            DateRepr::Exact(ref exact) => exact.ajd.clone(),
        }
    }

    /// The fraction of the local day elapsed since its midnight. Always
    /// zero in the light form.
    pub(crate) fn day_fraction(&self) -> BigRational {
        match *self {
            DateRepr::Light(_) => BigRational::zero(),
            DateRepr::Exact(ref exact) => exact.local().1,
        }
    }

    /// Adds a whole number of days, preserving any fraction.
    pub(crate) fn add_days(&self, days: i128) -> DateRepr {
        match *self {
            DateRepr::Light(ref light) => DateRepr::from_wide_jd(
                i128::from(light.jd) + days,
                light.reform,
            ),
            DateRepr::Exact(ref exact) => {
                let ajd = &exact.ajd
                    + BigRational::from_integer(BigInt::from(days));
                DateRepr::from_ajd(ajd, exact.reform)
            }
        }
    }

    /// Adds an exact number of days, possibly fractional.
    pub(crate) fn add_days_exact(&self, days: &BigRational) -> DateRepr {
        let exact = self.to_exact();
        DateRepr::from_ajd(&exact.ajd + days, exact.reform)
    }

    /// The same day relabeled under another reform.
    pub(crate) fn with_reform(&self, reform: Reform) -> DateRepr {
        match *self {
            DateRepr::Light(ref light) => {
                DateRepr::Light(LightDate::new(light.jd, reform))
            }
            DateRepr::Exact(ref exact) => {
                DateRepr::from_ajd(exact.ajd.clone(), reform)
            }
        }
    }

    /// Lifts to a date and time form at the same instant, which for a
    /// date is its UTC midnight plus any carried fraction.
    pub(crate) fn to_datetime_repr(&self) -> DateTimeRepr {
        match *self {
            DateRepr::Light(light) => DateTimeRepr::Light(LightDateTime {
                date: light,
                second_of_day: 0,
                nanosecond: 0,
                offset_seconds: 0,
            }),
            DateRepr::Exact(ref exact) => {
                // A fractional day can demote once it reads as a time of
                // day, so re-select rather than keep the exact form.
                DateTimeRepr::select(exact.clone())
            }
        }
    }

    /// The exact difference in days, with an integer fast path when both
    /// sides are light.
    pub(crate) fn diff_days(&self, other: &DateRepr) -> BigRational {
        match (self, other) {
            (DateRepr::Light(a), DateRepr::Light(b)) => {
                BigRational::from_integer(BigInt::from(
                    i64::from(a.jd) - i64::from(b.jd),
                ))
            }
            _ => self.ajd() - other.ajd(),
        }
    }

    /// Total order by astronomical day number, with an integer fast path
    /// when both sides are light.
    pub(crate) fn cmp_ajd(&self, other: &DateRepr) -> core::cmp::Ordering {
        match (self, other) {
            (DateRepr::Light(a), DateRepr::Light(b)) => a.jd.cmp(&b.jd),
            _ => self.ajd().cmp(&other.ajd()),
        }
    }

    /// Hashes consistently with [`DateRepr::cmp_ajd`] equality. Values
    /// are canonical, so equal values are always in the same variant.
    pub(crate) fn hash_ajd<H: core::hash::Hasher>(&self, state: &mut H) {
        use core::hash::Hash;

        match *self {
            DateRepr::Light(ref light) => {
                0u8.hash(state);
                light.jd.hash(state);
            }
            DateRepr::Exact(ref exact) => {
                1u8.hash(state);
                exact.ajd.hash(state);
            }
        }
    }
}

/// The representation of a [`DateTime`](crate::DateTime).
#[derive(Clone, Debug)]
pub(crate) enum DateTimeRepr {
    Light(LightDateTime),
    Exact(ExactDateTime),
}

impl DateTimeRepr {
    /// Selects the representation for local civil parts: a wide local
    /// day number, the second of that day, an optional fraction of the
    /// second and the presentation offset.
    pub(crate) fn from_civil_parts(
        jd: i128,
        second_of_day: i32,
        second_fraction: Option<&BigRational>,
        offset: &UtcOffset,
        reform: Reform,
    ) -> DateTimeRepr {
        let nanos = match second_fraction {
            None => Some(0),
            Some(fraction) => whole_second_nanos(fraction),
        };
        if let (Some(jd32), Some(nanosecond), Some(offset_seconds)) =
            (light_jd(jd), nanos, offset.whole_seconds())
        {
            return DateTimeRepr::Light(LightDateTime {
                date: LightDate::new(jd32, reform),
                second_of_day,
                nanosecond,
                offset_seconds,
            });
        }
        trace!("day {jd} with second {second_of_day} needs the exact form");
        let offset = offset.to_day_fraction();
        let mut fraction = BigRational::new(
            BigInt::from(second_of_day),
            BigInt::from(SECONDS_PER_DAY),
        );
        if let Some(of_second) = second_fraction {
            fraction += of_second
                / BigRational::from_integer(BigInt::from(SECONDS_PER_DAY));
        }
        let ajd = BigRational::from_integer(BigInt::from(jd)) + fraction
            - &offset
            - half();
        DateTimeRepr::select(ExactDateTime { ajd, offset, reform })
    }

    /// Selects the representation for an exact astronomical day number
    /// presented at the given offset.
    pub(crate) fn from_ajd(
        ajd: BigRational,
        offset: &UtcOffset,
        reform: Reform,
    ) -> DateTimeRepr {
        DateTimeRepr::select(ExactDateTime {
            ajd,
            offset: offset.to_day_fraction(),
            reform,
        })
    }

    /// Re-selects after an operation on the exact form.
    pub(crate) fn select(exact: ExactDateTime) -> DateTimeRepr {
        match exact.try_light() {
            Some(light) => DateTimeRepr::Light(light),
            None => DateTimeRepr::Exact(exact),
        }
    }

    pub(crate) fn to_exact(&self) -> ExactDateTime {
        match *self {
            DateTimeRepr::Light(ref light) => light.to_exact(),
            DateTimeRepr::Exact(ref exact) => exact.clone(),
        }
    }

    pub(crate) fn reform(&self) -> Reform {
        match *self {
            DateTimeRepr::Light(ref light) => light.date.reform,
            DateTimeRepr::Exact(ref exact) => exact.reform,
        }
    }

    /// The local day number, without narrowing.
    pub(crate) fn wide_jd(&self) -> i128 {
        match *self {
            DateTimeRepr::Light(ref light) => i128::from(light.date.jd),
            DateTimeRepr::Exact(ref exact) => exact.local().0,
        }
    }

    /// The local day number, saturating in the unreachable tail.
    pub(crate) fn jd(&self) -> i64 {
        saturate_i64(self.wide_jd())
    }

    pub(crate) fn civil(&self) -> (i64, i8, i8) {
        match *self {
            DateTimeRepr::Light(ref light) => (
                i64::from(light.date.year),
                light.date.month,
                light.date.day,
            ),
            DateTimeRepr::Exact(ref exact) => {
                wide_civil(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn ordinal(&self) -> (i64, i16) {
        match *self {
            DateTimeRepr::Light(ref light) => {
                cal::jd_to_ordinal(i64::from(light.date.jd), light.date.reform)
            }
            DateTimeRepr::Exact(ref exact) => {
                wide_ordinal(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn commercial(&self) -> (i64, i8, i8) {
        match *self {
            DateTimeRepr::Light(ref light) => cal::jd_to_commercial(
                i64::from(light.date.jd),
                light.date.reform,
            ),
            DateTimeRepr::Exact(ref exact) => {
                wide_commercial(exact.local().0, exact.reform)
            }
        }
    }

    pub(crate) fn weekday(&self) -> Weekday {
        match *self {
            DateTimeRepr::Light(ref light) => {
                Weekday::from_jd(i64::from(light.date.jd))
            }
            DateTimeRepr::Exact(ref exact) => wide_weekday(exact.local().0),
        }
    }

    /// The local hour, minute and second.
    pub(crate) fn clock(&self) -> (i8, i8, i8) {
        let second_of_day = match *self {
            DateTimeRepr::Light(ref light) => i64::from(light.second_of_day),
            DateTimeRepr::Exact(ref exact) => {
                let seconds = exact.local().1
                    * BigRational::from_integer(BigInt::from(
                        SECONDS_PER_DAY,
                    ));
                // Truncation: the fraction of the second is reported
                // separately.
                saturate_i64(floor_i128(&seconds))
            }
        };
        (
            (second_of_day / 3_600) as i8,
            (second_of_day / 60 % 60) as i8,
            (second_of_day % 60) as i8,
        )
    }

    /// The fraction of the current second elapsed, in `[0, 1)`.
    pub(crate) fn second_fraction(&self) -> BigRational {
        match *self {
            DateTimeRepr::Light(ref light) => BigRational::new(
                BigInt::from(light.nanosecond),
                BigInt::from(NANOS_PER_SECOND),
            ),
            DateTimeRepr::Exact(ref exact) => {
                let seconds = exact.local().1
                    * BigRational::from_integer(BigInt::from(
                        SECONDS_PER_DAY,
                    ));
                &seconds - seconds.floor()
            }
        }
    }

    pub(crate) fn offset(&self) -> UtcOffset {
        match *self {
            DateTimeRepr::Light(ref light) => {
                // OK because the light form bounds the offset the same
                // way UtcOffset does.
                UtcOffset::from_seconds(light.offset_seconds).unwrap()
            }
            DateTimeRepr::Exact(ref exact) => {
                // OK because every constructor bounds |offset| < 1 day.
                UtcOffset::from_day_fraction(exact.offset.clone()).unwrap()
            }
        }
    }

    pub(crate) fn ajd(&self) -> BigRational {
        match *self {
            DateTimeRepr::Light(ref light) => light.to_exact().ajd,
            DateTimeRepr::Exact(ref exact) => exact.ajd.clone(),
        }
    }

    /// The fraction of the local day elapsed since its midnight.
    pub(crate) fn day_fraction(&self) -> BigRational {
        match *self {
            DateTimeRepr::Light(ref light) => {
                let nanos = i64::from(light.second_of_day)
                    * NANOS_PER_SECOND
                    + i64::from(light.nanosecond);
                BigRational::new(
                    BigInt::from(nanos),
                    BigInt::from(NANOS_PER_DAY),
                )
            }
            DateTimeRepr::Exact(ref exact) => exact.local().1,
        }
    }

    /// Adds a whole number of days, preserving the time of day.
    pub(crate) fn add_days(&self, days: i128) -> DateTimeRepr {
        match *self {
            DateTimeRepr::Light(ref light) => {
                let jd = i128::from(light.date.jd) + days;
                match light_jd(jd) {
                    Some(jd) => DateTimeRepr::Light(LightDateTime {
                        date: LightDate::new(jd, light.date.reform),
                        ..*light
                    }),
                    None => {
                        let mut exact = light.to_exact();
                        exact.ajd +=
                            BigRational::from_integer(BigInt::from(days));
                        DateTimeRepr::Exact(exact)
                    }
                }
            }
            DateTimeRepr::Exact(ref exact) => {
                let mut exact = exact.clone();
                exact.ajd += BigRational::from_integer(BigInt::from(days));
                DateTimeRepr::select(exact)
            }
        }
    }

    /// Adds an exact number of days, possibly fractional.
    pub(crate) fn add_days_exact(&self, days: &BigRational) -> DateTimeRepr {
        let mut exact = self.to_exact();
        exact.ajd += days;
        DateTimeRepr::select(exact)
    }

    /// The same instant presented in another offset.
    pub(crate) fn with_offset(&self, offset: &UtcOffset) -> DateTimeRepr {
        if let (DateTimeRepr::Light(light), Some(seconds)) =
            (self, offset.whole_seconds())
        {
            // Relabeling only moves the local clock, by the difference
            // of the offsets.
            let total = i64::from(light.second_of_day)
                + i64::from(seconds - light.offset_seconds);
            let jd = i128::from(light.date.jd)
                + i128::from(total.div_euclid(SECONDS_PER_DAY));
            if let Some(jd) = light_jd(jd) {
                return DateTimeRepr::Light(LightDateTime {
                    date: LightDate::new(jd, light.date.reform),
                    second_of_day: total.rem_euclid(SECONDS_PER_DAY) as i32,
                    nanosecond: light.nanosecond,
                    offset_seconds: seconds,
                });
            }
        }
        let exact = self.to_exact();
        DateTimeRepr::select(ExactDateTime {
            ajd: exact.ajd,
            offset: offset.to_day_fraction(),
            reform: exact.reform,
        })
    }

    /// The same instant relabeled under another reform.
    pub(crate) fn with_reform(&self, reform: Reform) -> DateTimeRepr {
        match *self {
            DateTimeRepr::Light(ref light) => {
                DateTimeRepr::Light(LightDateTime {
                    date: LightDate::new(light.date.jd, reform),
                    ..*light
                })
            }
            DateTimeRepr::Exact(ref exact) => {
                DateTimeRepr::Exact(ExactDateTime {
                    ajd: exact.ajd.clone(),
                    offset: exact.offset.clone(),
                    reform,
                })
            }
        }
    }

    /// The exact difference in days, with an integer fast path when both
    /// sides are light.
    pub(crate) fn diff_days(&self, other: &DateTimeRepr) -> BigRational {
        match (self, other) {
            (DateTimeRepr::Light(a), DateTimeRepr::Light(b)) => {
                BigRational::new(
                    BigInt::from(utc_nanos(a) - utc_nanos(b)),
                    BigInt::from(NANOS_PER_DAY),
                )
            }
            _ => self.ajd() - other.ajd(),
        }
    }

    /// Total order by astronomical day number, with an integer fast path
    /// when both sides are light.
    pub(crate) fn cmp_ajd(
        &self,
        other: &DateTimeRepr,
    ) -> core::cmp::Ordering {
        match (self, other) {
            (DateTimeRepr::Light(a), DateTimeRepr::Light(b)) => {
                utc_nanos(a).cmp(&utc_nanos(b))
            }
            _ => self.ajd().cmp(&other.ajd()),
        }
    }

    /// Hashes consistently with [`DateTimeRepr::cmp_ajd`] equality.
    ///
    /// The offset is presentation, not identity, so an exact value can
    /// name the same instant as a light one (a whole-nanosecond instant
    /// presented at a fractional-second offset). Whole-nanosecond
    /// instants therefore hash through their nanosecond count no matter
    /// which variant carries them.
    pub(crate) fn hash_ajd<H: core::hash::Hasher>(&self, state: &mut H) {
        use core::hash::Hash;

        match *self {
            DateTimeRepr::Light(ref light) => {
                0u8.hash(state);
                utc_nanos(light).hash(state);
            }
            DateTimeRepr::Exact(ref exact) => {
                let nanos = (&exact.ajd + half())
                    * BigRational::from_integer(BigInt::from(NANOS_PER_DAY));
                if nanos.is_integer() {
                    match nanos.to_integer().to_i128() {
                        Some(nanos) => {
                            0u8.hash(state);
                            nanos.hash(state);
                        }
                        None => {
                            2u8.hash(state);
                            nanos.to_integer().hash(state);
                        }
                    }
                } else {
                    1u8.hash(state);
                    exact.ajd.hash(state);
                }
            }
        }
    }
}

/// Nanoseconds since the UTC midnight of JD 0 for a light value. Fits
/// comfortably: the light window is under 4e8 days of 8.64e13
/// nanoseconds each.
fn utc_nanos(light: &LightDateTime) -> i128 {
    let seconds = i128::from(light.date.jd) * i128::from(SECONDS_PER_DAY)
        + i128::from(light.second_of_day)
        - i128::from(light.offset_seconds);
    seconds * i128::from(NANOS_PER_SECOND) + i128::from(light.nanosecond)
}

/// A fraction of one second as whole nanoseconds, when it is exactly
/// that.
fn whole_second_nanos(fraction: &BigRational) -> Option<i32> {
    let nanos =
        fraction * BigRational::from_integer(BigInt::from(NANOS_PER_SECOND));
    if !nanos.is_integer() {
        return None;
    }
    let nanos = nanos.to_integer().to_i32()?;
    if !(0..NANOS_PER_SECOND as i32).contains(&nanos) {
        return None;
    }
    Some(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn window_edges() {
        for jd in [i128::from(MIN_JD), 0, 2_459_216, i128::from(MAX_JD)] {
            assert!(matches!(
                DateRepr::from_wide_jd(jd, Reform::ITALY),
                DateRepr::Light(_),
            ));
        }
        for jd in [i128::from(MIN_JD) - 1, i128::from(MAX_JD) + 1] {
            assert!(matches!(
                DateRepr::from_wide_jd(jd, Reform::ITALY),
                DateRepr::Exact(_),
            ));
        }
    }

    #[test]
    fn exact_beyond_window_still_decodes() {
        let repr =
            DateRepr::from_wide_jd(i128::from(MAX_JD) + 1, Reform::ITALY);
        assert_eq!(repr.jd(), MAX_JD + 1);
        assert_eq!(repr.civil(), (1_000_001, 1, 1));
        assert_eq!(repr.weekday(), wide_weekday(i128::from(MAX_JD) + 1));
    }

    #[test]
    fn folded_decoding() {
        let period = i128::from(cal::PERIOD_DAYS);
        let jd = i128::from(2_459_216);
        assert_eq!(wide_civil(jd, Reform::ITALY), (2021, 1, 1));
        assert_eq!(
            wide_civil(jd + period, Reform::ITALY),
            (2021 + 194_800, 1, 1),
        );
        // The fold below zero is entirely Julian. JD 0 is -4712-01-01
        // there.
        assert_eq!(
            wide_civil(-period, Reform::ITALY),
            (-4712 - 194_796, 1, 1),
        );
        // Weekday survives folding: the period is a whole number of
        // weeks.
        assert_eq!(wide_weekday(jd), wide_weekday(jd + period));
    }

    #[test]
    fn fractional_date_round_trip() {
        // ajd 16/3 has local day 5 with a 5/6 day fraction.
        let repr = DateRepr::from_ajd(ratio(16, 3), Reform::ITALY);
        assert!(matches!(repr, DateRepr::Exact(_)));
        assert_eq!(repr.jd(), 5);
        assert_eq!(repr.day_fraction(), ratio(5, 6));

        // Whole-day arithmetic keeps the fraction.
        let bumped = repr.add_days(3);
        assert_eq!(bumped.jd(), 8);
        assert_eq!(bumped.day_fraction(), ratio(5, 6));

        // Removing the fraction demotes back to the light form.
        let whole = repr.add_days_exact(&ratio(1, 6));
        assert!(matches!(whole, DateRepr::Light(_)));
        assert_eq!(whole.jd(), 5);
    }

    #[test]
    fn datetime_selection() {
        let utc = UtcOffset::UTC;
        let light = DateTimeRepr::from_civil_parts(
            2_459_216,
            3 * 3_600 + 4 * 60 + 5,
            None,
            &utc,
            Reform::ITALY,
        );
        assert!(matches!(light, DateTimeRepr::Light(_)));
        assert_eq!(light.clock(), (3, 4, 5));

        // A third of a second cannot be whole nanoseconds.
        let exact = DateTimeRepr::from_civil_parts(
            2_459_216,
            3 * 3_600 + 4 * 60 + 5,
            Some(&ratio(1, 3)),
            &utc,
            Reform::ITALY,
        );
        assert!(matches!(exact, DateTimeRepr::Exact(_)));
        assert_eq!(exact.clock(), (3, 4, 5));
        assert_eq!(exact.second_fraction(), ratio(1, 3));

        // A sub-second offset forces the exact form even at a whole
        // nanosecond time.
        let offset = UtcOffset::from_day_fraction(ratio(1, 864_000)).unwrap();
        let exact = DateTimeRepr::from_civil_parts(
            2_459_216,
            0,
            None,
            &offset,
            Reform::ITALY,
        );
        assert!(matches!(exact, DateTimeRepr::Exact(_)));
        assert_eq!(exact.clock(), (0, 0, 0));
    }

    #[test]
    fn promotion_round_trips() {
        let light = LightDateTime {
            date: LightDate::new(2_459_216, Reform::ITALY),
            second_of_day: 13 * 3_600,
            nanosecond: 500_000_000,
            offset_seconds: 9 * 3_600,
        };
        let back = ExactDateTime::try_light(&light.to_exact()).unwrap();
        assert_eq!(back.date.jd, light.date.jd);
        assert_eq!(back.second_of_day, light.second_of_day);
        assert_eq!(back.nanosecond, light.nanosecond);
        assert_eq!(back.offset_seconds, light.offset_seconds);
    }

    #[test]
    fn offset_relabeling_preserves_instant() {
        let plus_nine = UtcOffset::constant(9);
        let repr = DateTimeRepr::from_civil_parts(
            2_459_216,
            3_600,
            None,
            &UtcOffset::UTC,
            Reform::ITALY,
        );
        let relabeled = repr.with_offset(&plus_nine);
        assert_eq!(relabeled.ajd(), repr.ajd());
        assert_eq!(relabeled.clock(), (10, 0, 0));

        // Crossing backwards over midnight moves the local day.
        let minus_two = UtcOffset::constant(-2);
        let relabeled = repr.with_offset(&minus_two);
        assert_eq!(relabeled.ajd(), repr.ajd());
        assert_eq!(relabeled.jd(), 2_459_215);
        assert_eq!(relabeled.clock(), (23, 0, 0));
    }

    #[test]
    fn comparison_fast_path_agrees() {
        let a = DateTimeRepr::from_civil_parts(
            2_459_216,
            3_600,
            None,
            &UtcOffset::UTC,
            Reform::ITALY,
        );
        // The same instant presented at +01:00.
        let b = a.with_offset(&UtcOffset::constant(1));
        assert_eq!(a.cmp_ajd(&b), core::cmp::Ordering::Equal);
        assert_eq!(a.ajd(), b.ajd());

        let later = a.add_days(1);
        assert_eq!(a.cmp_ajd(&later), core::cmp::Ordering::Less);
    }

    quickcheck::quickcheck! {
        fn prop_light_exact_accessors_agree(
            jd: i32,
            reform: Reform
        ) -> bool {
            let span = i64::from(MAX_JD - MIN_JD) + 1;
            let jd = i64::from(jd).rem_euclid(span) + MIN_JD;
            let light = DateRepr::from_wide_jd(i128::from(jd), reform);
            let exact = DateRepr::Exact(light.to_exact());
            light.civil() == exact.civil()
                && light.ordinal() == exact.ordinal()
                && light.commercial() == exact.commercial()
                && light.weekday() == exact.weekday()
                && light.jd() == exact.jd()
                && light.ajd() == exact.ajd()
        }

        fn prop_selection_is_canonical(jd: i32, reform: Reform) -> bool {
            let span = i64::from(MAX_JD - MIN_JD) + 1;
            let jd = i64::from(jd).rem_euclid(span) + MIN_JD;
            let light = DateRepr::from_wide_jd(i128::from(jd), reform);
            // Shoving the same value back through selection demotes it.
            matches!(
                DateRepr::select(light.to_exact()),
                DateRepr::Light(_),
            )
        }

        fn prop_add_days_shifts_jd(jd: i32, days: i16, reform: Reform) -> bool {
            let repr = DateRepr::from_wide_jd(i128::from(jd), reform);
            let shifted = repr.add_days(i128::from(days));
            shifted.wide_jd() == i128::from(jd) + i128::from(days)
        }
    }
}
