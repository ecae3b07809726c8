//! Registration window arithmetic.
//!
//! A student re-registers for a window of [`WINDOW_MONTHS`] calendar months
//! starting at their renewal month. Missing and malformed renewal months are
//! ordinary outcomes, reported through [`RegistrationValue`].

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};

/// Length of a registration window in calendar months.
pub const WINDOW_MONTHS: u32 = 6;

//
// ─── OUTCOME ───────────────────────────────────────────────────────────────────
//

/// A value derived from an optional `YYYY-MM` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationValue<T> {
    Known(T),
    /// No renewal month was given.
    Unspecified,
    /// A renewal month was given but is not a valid `YYYY-MM`.
    FormatError,
}

impl<T> RegistrationValue<T> {
    #[must_use]
    pub fn known(&self) -> Option<&T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unspecified | Self::FormatError => None,
        }
    }

    #[must_use]
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(value) => Some(value),
            Self::Unspecified | Self::FormatError => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RegistrationValue<U> {
        match self {
            Self::Known(value) => RegistrationValue::Known(f(value)),
            Self::Unspecified => RegistrationValue::Unspecified,
            Self::FormatError => RegistrationValue::FormatError,
        }
    }

    fn and_then<U>(self, f: impl FnOnce(T) -> RegistrationValue<U>) -> RegistrationValue<U> {
        match self {
            Self::Known(value) => f(value),
            Self::Unspecified => RegistrationValue::Unspecified,
            Self::FormatError => RegistrationValue::FormatError,
        }
    }
}

impl<T: fmt::Display> fmt::Display for RegistrationValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(value) => value.fmt(f),
            Self::Unspecified => f.write_str("not set"),
            Self::FormatError => f.write_str("invalid format"),
        }
    }
}

//
// ─── YEAR-MONTH ────────────────────────────────────────────────────────────────
//

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first_day: NaiveDate,
}

/// Error returned when text is not a `YYYY-MM` month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError {
    raw: String,
}

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected YYYY-MM, got {:?}", self.raw)
    }
}

impl std::error::Error for ParseMonthError {}

impl YearMonth {
    /// Returns `None` unless `month` is in `1..=12` and the year is representable.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The month containing `day`.
    #[must_use]
    pub fn of(day: NaiveDate) -> Self {
        Self {
            first_day: day.with_day0(0).unwrap_or(day),
        }
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last calendar day of the month.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
    }

    #[must_use]
    pub fn plus_months(&self, months: u32) -> Option<Self> {
        self.first_day
            .checked_add_months(Months::new(months))
            .map(|first_day| Self { first_day })
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        day.year() == self.year() && day.month() == self.month()
    }

    /// Whole calendar months from `self` to `later` (negative if `later` is earlier).
    #[must_use]
    pub fn months_until(&self, later: YearMonth) -> i64 {
        let index = |ym: &YearMonth| i64::from(ym.year()) * 12 + i64::from(ym.month());
        index(&later) - index(self)
    }
}

impl FromStr for YearMonth {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMonthError { raw: s.to_owned() };
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let digits = |part: &str, len: std::ops::RangeInclusive<usize>| {
            len.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(year, 4..=4) || !digits(month, 1..=2) {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let month: u32 = month.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

//
// ─── PERIOD ────────────────────────────────────────────────────────────────────
//

/// The registration window `[start, start + 5 months]`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPeriod {
    start: YearMonth,
    end: YearMonth,
    last_day: NaiveDate,
}

impl RegistrationPeriod {
    /// Window starting at `start`; `None` only if the dates overflow.
    #[must_use]
    pub fn starting(start: YearMonth) -> Option<Self> {
        let end = start.plus_months(WINDOW_MONTHS - 1)?;
        let last_day = end.last_day()?;
        Some(Self {
            start,
            end,
            last_day,
        })
    }

    #[must_use]
    pub fn start(&self) -> YearMonth {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> YearMonth {
        self.end
    }

    /// Last calendar day of the final month of the window.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.last_day
    }

    /// Months left in the window as of `today`, counting the current month as one.
    ///
    /// Zero once `today` is past the window.
    #[must_use]
    pub fn remaining_months(&self, today: NaiveDate) -> u32 {
        if today > self.last_day {
            return 0;
        }
        let whole = YearMonth::of(today).months_until(self.end);
        u32::try_from(whole + 1).unwrap_or(0)
    }
}

/// Short display form: `25.01 ~ 06` within one year, `24.09 ~ 25.02` across years.
impl fmt::Display for RegistrationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = |ym: YearMonth| ym.year().rem_euclid(100);
        if self.start.year() == self.end.year() {
            write!(
                f,
                "{:02}.{:02} ~ {:02}",
                short(self.start),
                self.start.month(),
                self.end.month()
            )
        } else {
            write!(
                f,
                "{:02}.{:02} ~ {:02}.{:02}",
                short(self.start),
                self.start.month(),
                short(self.end),
                self.end.month()
            )
        }
    }
}

//
// ─── OPERATIONS ────────────────────────────────────────────────────────────────
//

/// Reads a renewal month. Blank input counts as missing.
#[must_use]
pub fn parse_renewal_month(input: Option<&str>) -> RegistrationValue<YearMonth> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        None => RegistrationValue::Unspecified,
        Some(raw) => match raw.parse() {
            Ok(month) => RegistrationValue::Known(month),
            Err(_) => RegistrationValue::FormatError,
        },
    }
}

/// The registration window that starts at the renewal month.
#[must_use]
pub fn compute_period(input: Option<&str>) -> RegistrationValue<RegistrationPeriod> {
    parse_renewal_month(input).and_then(|start| match RegistrationPeriod::starting(start) {
        Some(period) => RegistrationValue::Known(period),
        None => RegistrationValue::FormatError,
    })
}

/// Months left in the registration window as of `today`.
#[must_use]
pub fn compute_remaining_months(input: Option<&str>, today: NaiveDate) -> RegistrationValue<u32> {
    compute_period(input).map(|period| period.remaining_months(today))
}

/// Contracted lessons minus completed ones. Goes negative on overrun.
#[must_use]
pub fn compute_remaining_lessons(total_lessons: u32, lessons_completed: u32) -> i64 {
    i64::from(total_lessons) - i64::from(lessons_completed)
}
