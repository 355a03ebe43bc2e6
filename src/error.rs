/// A macro for constructing an ad hoc [`Error`] from format arguments.
///
/// Most errors in this crate are structured, but a few call sites want a
/// one-off message. This keeps them terse.
macro_rules! err {
    ($($tt:tt)*) => {{
        crate::error::Error::adhoc_from_args(core::format_args!($($tt)*))
    }}
}

/// An error that can occur in this crate.
///
/// The most common sources of error are a broken-down date that doesn't
/// exist in the requested calendar (like February 30, or a day swallowed by
/// a calendar reform gap) and a parameter that is out of its supported
/// range (like a UTC offset of 25 hours).
///
/// # Introspection is limited
///
/// Other than implementing the [`std::error::Error`] trait when the `std`
/// feature is enabled, the [`core::fmt::Debug`] trait and the
/// [`core::fmt::Display`] trait, this error type provides very limited
/// introspection capabilities: the [`Error::is_invalid_date`] and
/// [`Error::is_range`] predicates.
///
/// # Design
///
/// A single error type is used for everything fallible in this crate. Finer
/// grained error types compose poorly in practice, and none of the fallible
/// operations here have failure modes a caller can meaningfully branch on
/// beyond the two predicates above.
#[derive(Clone)]
pub struct Error {
    /// The internal representation of an error.
    ///
    /// The box keeps `Error` at one machine word, which matters because
    /// nearly every constructor in this crate returns `Result<T, Error>`.
    inner: alloc::boxed::Box<ErrorInner>,
}

#[derive(Clone, Debug)]
struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

impl Error {
    /// Creates a new error value from `core::fmt::Arguments`.
    ///
    /// This is what the crate internal `err!` macro expands to.
    pub(crate) fn adhoc_from_args<'a>(
        message: core::fmt::Arguments<'a>,
    ) -> Error {
        Error::from(ErrorKind::Adhoc(AdhocError::from_args(message)))
    }

    /// Creates a new error indicating that a `given` value is out of the
    /// specified `min..=max` range. The given `what` label is used in the
    /// error message as a human readable description of what exactly is out
    /// of range. (e.g., "offset seconds")
    #[inline(never)]
    #[cold]
    pub(crate) fn range(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> Error {
        Error::from(ErrorKind::Range(RangeError::new(what, given, min, max)))
    }

    /// Returns true when this error originated from a broken-down date or
    /// time that does not exist in the requested calendar.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::{Date, Reform};
    ///
    /// assert!(Date::civil(2025, 2, 29, Reform::ITALY)
    ///     .unwrap_err()
    ///     .is_invalid_date());
    /// // 1582-10-10 fell in the days dropped by the Gregorian reform.
    /// assert!(Date::civil(1582, 10, 10, Reform::ITALY)
    ///     .unwrap_err()
    ///     .is_invalid_date());
    /// ```
    pub fn is_invalid_date(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Field(_))
    }

    /// Returns true when this error originated as a result of a parameter
    /// being out of its supported range.
    ///
    /// # Example
    ///
    /// ```
    /// use lilian::UtcOffset;
    ///
    /// assert!(UtcOffset::from_seconds(86_400).unwrap_err().is_range());
    /// ```
    pub fn is_range(&self) -> bool {
        matches!(*self.root().kind(), ErrorKind::Range(_))
    }

    #[inline(always)]
    pub(crate) fn context(self, consequent: impl IntoError) -> Error {
        self.context_impl(consequent.into_error())
    }

    #[inline(never)]
    #[cold]
    fn context_impl(self, consequent: Error) -> Error {
        let mut err = consequent;
        debug_assert!(
            err.inner.cause.is_none(),
            "cause of consequence must be `None`",
        );
        err.inner.cause = Some(self);
        err
    }

    /// Returns the root error in this chain.
    fn root(&self) -> &Error {
        // OK because `Error::chain` is guaranteed to return a non-empty
        // iterator.
        self.chain().last().unwrap()
    }

    /// Returns a chain of error values.
    ///
    /// This starts with the most recent error added to the chain. That is,
    /// the highest level context. The last error in the chain is always the
    /// "root" cause. That is, the error closest to the point where something
    /// has gone wrong.
    ///
    /// The iterator returned is guaranteed to yield at least one error.
    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }

    /// Returns the kind of this error.
    fn kind(&self) -> &ErrorKind {
        &self.inner.kind
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(err.kind(), f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause)
                .finish()
        }
    }
}

/// The underlying kind of a [`Error`].
#[derive(Clone, Debug)]
enum ErrorKind {
    Adhoc(AdhocError),
    Field(FieldError),
    Range(RangeError),
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Adhoc(ref err) => err.fmt(f),
            ErrorKind::Field(ref err) => err.fmt(f),
            ErrorKind::Range(ref err) => err.fmt(f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: alloc::boxed::Box::new(ErrorInner { kind, cause: None }),
        }
    }
}

/// A generic error message.
#[derive(Clone)]
struct AdhocError {
    message: alloc::boxed::Box<str>,
}

impl AdhocError {
    fn from_args<'a>(message: core::fmt::Arguments<'a>) -> AdhocError {
        use alloc::string::ToString;

        let message = message.to_string().into_boxed_str();
        AdhocError { message }
    }
}

impl core::fmt::Display for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.message, f)
    }
}

impl core::fmt::Debug for AdhocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.message, f)
    }
}

/// An error that occurs when an input value is out of bounds.
///
/// The error message produced by this type will include a name describing
/// which input was out of bounds, the value given and its minimum and
/// maximum allowed values.
#[derive(Clone, Debug)]
struct RangeError {
    what: &'static str,
    given: i128,
    min: i128,
    max: i128,
}

impl RangeError {
    fn new(
        what: &'static str,
        given: impl Into<i128>,
        min: impl Into<i128>,
        max: impl Into<i128>,
    ) -> RangeError {
        RangeError {
            what,
            given: given.into(),
            min: min.into(),
            max: max.into(),
        }
    }
}

impl core::fmt::Display for RangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let RangeError { what, given, min, max } = *self;
        write!(
            f,
            "parameter '{what}' with value {given} \
             is not in the required range of {min}..={max}",
        )
    }
}

/// An error for a broken-down date or time rejected by validation.
///
/// One variant per field system. The message deliberately does not say
/// which individual field was at fault: validation is a round trip through
/// the day counts, so a failure is a property of the whole combination.
#[derive(Clone, Debug)]
pub(crate) enum FieldError {
    Civil,
    Ordinal,
    Commercial,
    Weeknum,
    NthKday,
    Time,
}

impl core::fmt::Display for FieldError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            FieldError::Civil => f.write_str("invalid civil date"),
            FieldError::Ordinal => f.write_str("invalid ordinal date"),
            FieldError::Commercial => {
                f.write_str("invalid ISO week date")
            }
            FieldError::Weeknum => f.write_str("invalid week number date"),
            FieldError::NthKday => {
                f.write_str("invalid nth weekday of month")
            }
            FieldError::Time => f.write_str("invalid time"),
        }
    }
}

impl From<FieldError> for Error {
    #[cold]
    #[inline(never)]
    fn from(err: FieldError) -> Error {
        ErrorKind::Field(err).into()
    }
}

/// A simple trait to encapsulate automatic conversion to `Error`.
///
/// This trait exists to make `Error::context` work without needing public
/// `From` impls. For example, without this trait, we might otherwise write
/// `impl From<String> for Error`. But that would make it part of the public
/// API, and errors should be able to evolve in semver compatible ways.
pub(crate) trait IntoError {
    fn into_error(self) -> Error;
}

impl IntoError for Error {
    #[inline(always)]
    fn into_error(self) -> Error {
        self
    }
}

impl IntoError for FieldError {
    fn into_error(self) -> Error {
        self.into()
    }
}

impl IntoError for &'static str {
    fn into_error(self) -> Error {
        err!("{self}")
    }
}

/// A trait for contextualizing error values.
///
/// This makes it easy to contextualize either `Error` or `Result<T, Error>`.
/// Specifically, in the latter case, it absolves one of the need to call
/// `map_err` everywhere one wants to add context to an error.
///
/// This trick was borrowed from `anyhow`.
pub(crate) trait ErrorContext<T, E> {
    /// Contextualize the given consequent error with this (`self`) error as
    /// the cause.
    ///
    /// This is equivalent to saying that "consequent is caused by self."
    ///
    /// Note that the consequent must not itself have a cause. (The cause
    /// would otherwise be dropped. An error causal chain is just a linked
    /// list, not a tree.)
    fn context(self, consequent: impl IntoError) -> Result<T, Error>;

    /// Like `context`, but hides error construction within a closure.
    ///
    /// This is useful if the creation of the consequent error is not
    /// otherwise guarded and when error construction is potentially "costly"
    /// (i.e., it allocates). The closure avoids paying the cost of
    /// contextual error creation in the happy path.
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error>;
}

impl<T, E> ErrorContext<T, E> for Result<T, E>
where
    E: IntoError,
{
    #[inline(always)]
    fn context(self, consequent: impl IntoError) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent.into_error())
        })
    }

    #[inline(always)]
    fn with_context<C: IntoError>(
        self,
        consequent: impl FnOnce() -> C,
    ) -> Result<T, Error> {
        self.map_err(|err| {
            err.into_error().context_impl(consequent().into_error())
        })
    }
}
