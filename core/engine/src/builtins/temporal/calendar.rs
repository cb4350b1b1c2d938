//! Pure proleptic-Gregorian calendrical math.
//!
//! Everything here is total and allocation-free; the invariants (leap
//! years, month lengths, epoch day conversion round-trips, clamping date
//! addition) are exercised by the module tests.

/// Nanoseconds in one civil day.
pub const NANOSECONDS_PER_DAY: i64 = 86_400_000_000_000;

/// A validated ISO calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDate {
    pub year: i64,
    pub month: u8,
    pub day: u8,
}

/// A validated wall-clock time. The derived ordering is chronological
/// because the fields run from the coarsest unit down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
    pub microsecond: u16,
    pub nanosecond: u16,
}

/// The date components of a duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateDuration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
}

impl DateDuration {
    pub fn negated(self) -> Self {
        Self {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
        }
    }
}

/// The time components of a duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeDuration {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub microseconds: i64,
    pub nanoseconds: i64,
}

impl TimeDuration {
    pub fn negated(self) -> Self {
        Self {
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
            milliseconds: -self.milliseconds,
            microseconds: -self.microseconds,
            nanoseconds: -self.nanoseconds,
        }
    }

    pub fn is_zero(self) -> bool {
        self == Self::default()
    }

    /// Every component folded into nanoseconds.
    pub fn total_nanoseconds(self) -> i128 {
        i128::from(self.hours) * 3_600_000_000_000
            + i128::from(self.minutes) * 60_000_000_000
            + i128::from(self.seconds) * 1_000_000_000
            + i128::from(self.milliseconds) * 1_000_000
            + i128::from(self.microseconds) * 1_000
            + i128::from(self.nanoseconds)
    }

    /// Balances a nanosecond count (smaller than one day in magnitude)
    /// into hour..nanosecond components sharing the sign of the input.
    pub fn from_nanoseconds(nanoseconds: i64) -> Self {
        let negative = nanoseconds < 0;
        let mut rest = nanoseconds.abs();

        let hours = rest / 3_600_000_000_000;
        rest %= 3_600_000_000_000;
        let minutes = rest / 60_000_000_000;
        rest %= 60_000_000_000;
        let seconds = rest / 1_000_000_000;
        rest %= 1_000_000_000;
        let milliseconds = rest / 1_000_000;
        rest %= 1_000_000;
        let microseconds = rest / 1_000;
        let nanoseconds = rest % 1_000;

        let balanced = Self {
            hours,
            minutes,
            seconds,
            milliseconds,
            microseconds,
            nanoseconds,
        };
        if negative {
            balanced.negated()
        } else {
            balanced
        }
    }
}

/// Years divisible by 4, except centuries not divisible by 400.
pub fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i64) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

pub fn days_in_month(year: i64, month: u8) -> u8 {
    const DAYS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        return 29;
    }
    DAYS[(month - 1) as usize]
}

impl IsoDate {
    /// Validates the components; `None` for anything outside the calendar.
    pub fn new(year: i64, month: i64, day: i64) -> Option<Self> {
        if !(1..=12).contains(&month) {
            return None;
        }
        let month = month as u8;
        if !(1..=i64::from(days_in_month(year, month))).contains(&day) {
            return None;
        }
        // Stay well inside the epoch-day arithmetic range.
        if !(-271_821..=275_760).contains(&year) {
            return None;
        }
        Some(Self {
            year,
            month,
            day: day as u8,
        })
    }

    /// Days since 1970-01-01.
    pub fn days_since_epoch(self) -> i64 {
        days_from_civil(self.year, self.month, self.day)
    }

    /// Calendar addition: years and months first, clamping the day into
    /// the resulting month (Jan 31 + 1 month = Feb 28/29), then weeks and
    /// days as exact day counts.
    pub fn add(self, duration: DateDuration) -> Option<Self> {
        let total_months =
            i64::from(self.month) - 1 + duration.years * 12 + duration.months;
        let year = self.year + total_months.div_euclid(12);
        let month = (total_months.rem_euclid(12) + 1) as u8;
        let clamped_day = self.day.min(days_in_month(year, month));

        let intermediate = Self {
            year,
            month,
            day: clamped_day,
        };
        let days = intermediate.days_since_epoch() + duration.weeks * 7 + duration.days;
        let result = civil_from_days(days);
        Self::new(result.year, i64::from(result.month), i64::from(result.day))
    }

    /// `YYYY-MM-DD`, with the expanded-year sign form outside 0..=9999.
    pub fn to_iso_string(self) -> String {
        if (0..=9999).contains(&self.year) {
            format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
        } else {
            format!("{:+07}-{:02}-{:02}", self.year, self.month, self.day)
        }
    }
}

impl IsoTime {
    /// Validates the components; `None` outside the clock.
    pub fn new(
        hour: i64,
        minute: i64,
        second: i64,
        millisecond: i64,
        microsecond: i64,
        nanosecond: i64,
    ) -> Option<Self> {
        if !(0..=23).contains(&hour)
            || !(0..=59).contains(&minute)
            || !(0..=59).contains(&second)
            || !(0..=999).contains(&millisecond)
            || !(0..=999).contains(&microsecond)
            || !(0..=999).contains(&nanosecond)
        {
            return None;
        }
        Some(Self {
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            millisecond: millisecond as u16,
            microsecond: microsecond as u16,
            nanosecond: nanosecond as u16,
        })
    }

    pub fn midnight() -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            microsecond: 0,
            nanosecond: 0,
        }
    }

    /// Nanoseconds since midnight.
    pub fn nanoseconds_of_day(self) -> i64 {
        i64::from(self.hour) * 3_600_000_000_000
            + i64::from(self.minute) * 60_000_000_000
            + i64::from(self.second) * 1_000_000_000
            + i64::from(self.millisecond) * 1_000_000
            + i64::from(self.microsecond) * 1_000
            + i64::from(self.nanosecond)
    }

    fn from_nanoseconds_of_day(nanoseconds: i64) -> Self {
        debug_assert!((0..NANOSECONDS_PER_DAY).contains(&nanoseconds));
        let mut rest = nanoseconds;
        let hour = (rest / 3_600_000_000_000) as u8;
        rest %= 3_600_000_000_000;
        let minute = (rest / 60_000_000_000) as u8;
        rest %= 60_000_000_000;
        let second = (rest / 1_000_000_000) as u8;
        rest %= 1_000_000_000;
        Self {
            hour,
            minute,
            second,
            millisecond: (rest / 1_000_000) as u16,
            microsecond: (rest / 1_000 % 1_000) as u16,
            nanosecond: (rest % 1_000) as u16,
        }
    }

    /// Applies a nanosecond offset, wrapping within the day; returns the
    /// wrapped time together with the day carry.
    pub fn add_nanoseconds(self, nanoseconds: i128) -> (Self, i64) {
        let total = i128::from(self.nanoseconds_of_day()) + nanoseconds;
        let carry = total.div_euclid(i128::from(NANOSECONDS_PER_DAY)) as i64;
        let of_day = total.rem_euclid(i128::from(NANOSECONDS_PER_DAY)) as i64;
        (Self::from_nanoseconds_of_day(of_day), carry)
    }

    /// `HH:MM:SS`, with the sub-second fraction appended at millisecond,
    /// microsecond or nanosecond precision when one is set.
    pub fn to_iso_string(self) -> String {
        let mut out = format!("{:02}:{:02}:{:02}", self.hour, self.minute, self.second);
        let sub_nanoseconds = u32::from(self.millisecond) * 1_000_000
            + u32::from(self.microsecond) * 1_000
            + u32::from(self.nanosecond);
        if sub_nanoseconds > 0 {
            if sub_nanoseconds % 1_000_000 == 0 {
                out.push_str(&format!(".{:03}", sub_nanoseconds / 1_000_000));
            } else if sub_nanoseconds % 1_000 == 0 {
                out.push_str(&format!(".{:06}", sub_nanoseconds / 1_000));
            } else {
                out.push_str(&format!(".{sub_nanoseconds:09}"));
            }
        }
        out
    }
}

/// The signed wall-clock distance from `from` to `to`, balanced.
pub fn time_difference(from: IsoTime, to: IsoTime) -> TimeDuration {
    TimeDuration::from_nanoseconds(to.nanoseconds_of_day() - from.nanoseconds_of_day())
}

/// Days from 1970-01-01 to `year-month-day`, days-from-civil form of the
/// proleptic Gregorian calendar.
pub fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let month = i64::from(month);
    let day = i64::from(day);
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let year_of_era = year - era * 400;
    let day_of_year = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    era * 146_097 + day_of_era - 719_468
}

/// The inverse of [`days_from_civil`].
pub fn civil_from_days(days: i64) -> IsoDate {
    let days = days + 719_468;
    let era = days.div_euclid(146_097);
    let day_of_era = days - era * 146_097;
    let year_of_era =
        (day_of_era - day_of_era / 1460 + day_of_era / 36_524 - day_of_era / 146_096) / 365;
    let year = year_of_era + era * 400;
    let day_of_year = day_of_era - (365 * year_of_era + year_of_era / 4 - year_of_era / 100);
    let mp = (5 * day_of_year + 2) / 153;
    let day = (day_of_year - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    IsoDate {
        year: if month <= 2 { year + 1 } else { year },
        month,
        day,
    }
}

/// ISO 8601 weekday, Monday = 1 through Sunday = 7.
pub fn day_of_week(date: IsoDate) -> u8 {
    // 1970-01-01 was a Thursday.
    let weekday = (date.days_since_epoch() + 3).rem_euclid(7);
    (weekday + 1) as u8
}

/// Ordinal day within the year, 1-based.
pub fn day_of_year(date: IsoDate) -> i64 {
    let mut ordinal = i64::from(date.day);
    for month in 1..date.month {
        ordinal += i64::from(days_in_month(date.year, month));
    }
    ordinal
}

/// The date difference as whole years, months and days, the `until`
/// semantics with the largest unit being years.
pub fn difference(from: IsoDate, to: IsoDate) -> DateDuration {
    if to < from {
        return difference(to, from).negated();
    }

    let mut years = to.year - from.year;
    let mut months = i64::from(to.month) - i64::from(from.month);
    let mut days = i64::from(to.day) - i64::from(from.day);

    if days < 0 {
        months -= 1;
        let borrow_month = if to.month == 1 { 12 } else { to.month - 1 };
        let borrow_year = if to.month == 1 { to.year - 1 } else { to.year };
        days += i64::from(days_in_month(borrow_year, borrow_month));
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    DateDuration {
        years,
        months,
        weeks: 0,
        days,
    }
}

/// Parses `YYYY-MM-DD` (with an optional expanded-year sign).
pub fn parse_iso_date(text: &str) -> Option<IsoDate> {
    let text = text.trim();
    let (sign, rest) = match text.as_bytes() {
        [b'+', ..] => (1i64, &text[1..]),
        [b'-', ..] => (-1i64, &text[1..]),
        _ => (1, text),
    };
    let mut pieces = rest.splitn(3, '-');
    let year: i64 = pieces.next()?.parse().ok()?;
    let month: i64 = pieces.next()?.parse().ok()?;
    let day_piece = pieces.next()?;
    // Tolerate a trailing time designator.
    let day_text = day_piece.split(['T', 't', ' ']).next()?;
    let day: i64 = day_text.parse().ok()?;
    IsoDate::new(sign * year, month, day)
}

/// Parses `HH:MM[:SS[.fraction]]` with up to nine fraction digits.
pub fn parse_iso_time(text: &str) -> Option<IsoTime> {
    let text = text.trim();
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let mut pieces = clock.split(':');
    let hour: i64 = pieces.next()?.parse().ok()?;
    let minute: i64 = pieces.next()?.parse().ok()?;
    let second: i64 = match pieces.next() {
        Some(second) => second.parse().ok()?,
        None => 0,
    };
    if pieces.next().is_some() {
        return None;
    }

    let mut sub_nanoseconds: i64 = 0;
    if let Some(fraction) = fraction {
        if fraction.is_empty()
            || fraction.len() > 9
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let mut padded = fraction.to_owned();
        while padded.len() < 9 {
            padded.push('0');
        }
        sub_nanoseconds = padded.parse().ok()?;
    }

    IsoTime::new(
        hour,
        minute,
        second,
        sub_nanoseconds / 1_000_000,
        sub_nanoseconds / 1_000 % 1_000,
        sub_nanoseconds % 1_000,
    )
}

/// Parses `YYYY-MM-DD[THH:MM[:SS[.fraction]]]`; a missing time is
/// midnight.
pub fn parse_iso_date_time(text: &str) -> Option<(IsoDate, IsoTime)> {
    let text = text.trim();
    match text.split_once(['T', 't', ' ']) {
        Some((date, time)) => Some((parse_iso_date(date)?, parse_iso_time(time)?)),
        None => Some((parse_iso_date(text)?, IsoTime::midnight())),
    }
}

/// The ISO 8601 duration form used by `Temporal.Duration`.
pub fn format_duration(date: DateDuration, time: TimeDuration) -> String {
    if date == DateDuration::default() && time.is_zero() {
        return "PT0S".to_owned();
    }
    let negative = date.years < 0
        || date.months < 0
        || date.weeks < 0
        || date.days < 0
        || time.total_nanoseconds() < 0;
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if date.years != 0 {
        out.push_str(&format!("{}Y", date.years.abs()));
    }
    if date.months != 0 {
        out.push_str(&format!("{}M", date.months.abs()));
    }
    if date.weeks != 0 {
        out.push_str(&format!("{}W", date.weeks.abs()));
    }
    if date.days != 0 {
        out.push_str(&format!("{}D", date.days.abs()));
    }
    if !time.is_zero() {
        out.push('T');
        if time.hours != 0 {
            out.push_str(&format!("{}H", time.hours.abs()));
        }
        if time.minutes != 0 {
            out.push_str(&format!("{}M", time.minutes.abs()));
        }
        let sub_nanoseconds = time.milliseconds.abs() * 1_000_000
            + time.microseconds.abs() * 1_000
            + time.nanoseconds.abs();
        if time.seconds != 0 || sub_nanoseconds != 0 {
            if sub_nanoseconds == 0 {
                out.push_str(&format!("{}S", time.seconds.abs()));
            } else {
                out.push_str(&format!("{}.{:09}S", time.seconds.abs(), sub_nanoseconds));
            }
        }
    }
    out
}
