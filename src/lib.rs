/*!
Calendar arithmetic across the Julian to Gregorian reform.

This crate does the arithmetic side of calendars: converting between day
numbers and the broken-down forms people actually write, moving dates
around, and comparing them, all while accounting for the day the
Gregorian calendar replaced the Julian one. That day is a parameter.
Italy and the Catholic states switched in October 1582, England and its
colonies in September 1752, and a caller can pick any day at all,
including never in either direction.

The central conceit is the Julian day number, a plain count of days on
which every calendar question becomes integer arithmetic. Each
broken-down form is a bijection with the day count under a given
[`Reform`]: civil year, month and day; ordinal year and day of year; the
ISO week date; and a couple of month-relative forms. Constructing a date
from broken-down fields validates them by converting to the day count
and back, which is what rejects February 30 and the days a reform
dropped, with no per-form special cases.

# Examples

Thursday October 4, 1582 was followed by Friday October 15, and the days
in between never existed:

```
use lilian::{Date, Reform, Weekday};

let last_julian = Date::civil(1582, 10, 4, Reform::ITALY)?;
assert_eq!(last_julian.weekday(), Weekday::Thursday);

let first_gregorian = last_julian.next_day();
assert_eq!(
    (first_gregorian.year(), first_gregorian.month(), first_gregorian.day()),
    (1582, 10, 15),
);
assert_eq!(first_gregorian.weekday(), Weekday::Friday);

assert!(Date::civil(1582, 10, 10, Reform::ITALY).is_err());

# Ok::<(), Box<dyn std::error::Error>>(())
```

England kept the Julian calendar for another 170 years, so the same
scheme with a different reform day relabels the same days:

```
use lilian::{Date, Reform};

let date = Date::civil(1752, 9, 2, Reform::ENGLAND)?;
let next = date.next_day();
assert_eq!((next.month(), next.day()), (9, 14));

// The very same day, as Italy wrote it.
let relabeled = date.with_reform(Reform::ITALY);
assert_eq!((relabeled.month(), relabeled.day()), (9, 13));

# Ok::<(), Box<dyn std::error::Error>>(())
```

A [`DateTime`] adds a clock and a UTC offset, and subtraction yields the
exact difference in days as a rational number:

```
use lilian::{DateTime, Reform, UtcOffset};
use num_rational::BigRational;

let utc = UtcOffset::UTC;
let a = DateTime::civil(2001, 2, 3, 0, 0, 0, &utc, Reform::ITALY)?;
let b = DateTime::civil(2001, 2, 4, 12, 0, 0, &utc, Reform::ITALY)?;
assert_eq!(&b - &a, BigRational::new(3.into(), 2.into()));

# Ok::<(), Box<dyn std::error::Error>>(())
```

# Exactness

Values are exact, always. A date within a few million years of the
present, with a time of day that is a whole number of nanoseconds and an
offset that is a whole number of seconds, is carried as machine
integers. Everything else, like civil year 10^40 or a time one seventh
of a second past midnight, is carried as an arbitrary precision rational
astronomical day number from the [`num-rational`](num_rational) crate.
Which representation is in use is decided per value and is not
observable: it changes nothing about any accessor, comparison or hash.

# Partial inputs

[`Fields`] holds an arbitrary subset of broken-down fields, such as the
output of a lenient parser. [`Date::from_fields`] and
[`DateTime::from_fields`] complete a partial set against today and
resolve it by a fixed precedence, so "week 7, Wednesday" or a bare time
of day mean what a person would expect them to mean.

# Crate features

* **std** (enabled by default) - Enables [`Date::today`] and
  [`DateTime::now`], along with the `std::error::Error` trait
  implementation. Without it, this crate is `no_std`, although it still
  requires `alloc`.
* **logging** - Emits some messages through the [`log`] crate, mostly
  tracing when values move between their machine integer and exact
  representations.
* **serde** - Enables `serde::Serialize` and `serde::Deserialize`
  implementations for [`Date`], [`DateTime`] and [`Reform`].

[`log`]: https://docs.rs/log
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// We generally want all types to impl Debug.
#![warn(missing_debug_implementations)]

#[cfg(any(test, feature = "std"))]
extern crate std;

// There is no core-only mode. Every error allocates its message, and the
// exact representation is heap-allocated big rationals.
extern crate alloc;

pub use crate::{
    date::{Date, DateSeries},
    datetime::DateTime,
    error::Error,
    fields::{Fields, TimeParts},
    offset::UtcOffset,
    reform::Reform,
    weekday::Weekday,
};

#[macro_use]
mod logging;
#[macro_use]
mod error;

mod cal;
mod date;
mod datetime;
mod fields;
mod offset;
mod reform;
mod repr;
mod weekday;
