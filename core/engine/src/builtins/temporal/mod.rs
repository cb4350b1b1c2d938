//! This module implements the `Temporal` namespace: `Temporal.Now`,
//! `Temporal.Instant`, `Temporal.PlainDate`, `Temporal.PlainTime`,
//! `Temporal.PlainDateTime` and `Temporal.Duration`.
//!
//! The calendrical math lives in [`calendar`]; it is pure and carries the
//! proleptic-Gregorian invariants (leap years, month lengths, day-of-week
//! and day-of-year, date addition with day clamping) the rest of the
//! engine relies on.

pub mod calendar;

#[cfg(test)]
mod tests;

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData, ObjectInitializer},
    property::{Attribute, PropertyKey},
    value::JsValue,
    JsResult,
};
use calendar::{DateDuration, IsoDate, IsoTime, TimeDuration};
use chrono::Utc;
use vesper_gc::{Finalize, Trace, Tracer};

/// `Temporal.PlainDate`: a calendar date with no time or zone.
#[derive(Debug, Clone, Copy, Finalize)]
pub struct PlainDate {
    pub iso: IsoDate,
}

impl Trace for PlainDate {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// `Temporal.PlainTime`: a wall-clock time with no date or zone.
#[derive(Debug, Clone, Copy, Finalize)]
pub struct PlainTime {
    pub iso: IsoTime,
}

impl Trace for PlainTime {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// `Temporal.PlainDateTime`: a calendar date combined with a wall-clock
/// time, still zone-free.
#[derive(Debug, Clone, Copy, Finalize)]
pub struct PlainDateTime {
    pub date: IsoDate,
    pub time: IsoTime,
}

impl Trace for PlainDateTime {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// `Temporal.Instant`: an exact moment as epoch nanoseconds.
#[derive(Debug, Clone, Copy, Finalize)]
pub struct Instant {
    pub epoch_nanoseconds: i128,
}

impl Trace for Instant {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// `Temporal.Duration`: date and time components.
#[derive(Debug, Clone, Copy, Default, Finalize)]
pub struct Duration {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub milliseconds: i64,
    pub microseconds: i64,
    pub nanoseconds: i64,
}

impl Duration {
    fn date_part(&self) -> DateDuration {
        DateDuration {
            years: self.years,
            months: self.months,
            weeks: self.weeks,
            days: self.days,
        }
    }

    fn time_part(&self) -> TimeDuration {
        TimeDuration {
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
            milliseconds: self.milliseconds,
            microseconds: self.microseconds,
            nanoseconds: self.nanoseconds,
        }
    }
}

impl Trace for Duration {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Temporal;

impl BuiltIn for Temporal {
    const NAME: &'static str = "Temporal";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let plain_date = plain_date_constructor(context);
        let plain_time = plain_time_constructor(context);
        let plain_date_time = plain_date_time_constructor(context);
        let instant = instant_constructor(context);
        let duration = duration_constructor(context);
        let now = now_namespace(context);

        let tag_key = PropertyKey::from(context.well_known_symbols().to_string_tag_symbol());
        let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        let temporal = ObjectInitializer::new(context)
            .property("Now", now, attribute)
            .property("PlainDate", plain_date, attribute)
            .property("PlainTime", plain_time, attribute)
            .property("PlainDateTime", plain_date_time, attribute)
            .property("Instant", instant, attribute)
            .property("Duration", duration, attribute)
            .property(
                tag_key,
                "Temporal",
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();

        (Self::NAME, temporal.into(), Self::attribute())
    }
}

fn now_namespace(context: &mut Context) -> JsObject {
    ObjectInitializer::new(context)
        .function(now_instant, "instant", 0)
        .function(now_plain_date_iso, "plainDateISO", 0)
        .function(now_plain_time_iso, "plainTimeISO", 0)
        .function(now_plain_date_time_iso, "plainDateTimeISO", 0)
        .build()
}

/// `Temporal.Now.instant()`.
fn now_instant(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let now = Utc::now();
    let nanoseconds = i128::from(now.timestamp()) * 1_000_000_000
        + i128::from(now.timestamp_subsec_nanos());
    Ok(new_instant_object(nanoseconds, context).into())
}

/// `Temporal.Now.plainDateISO()`.
fn now_plain_date_iso(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let days = (Utc::now().timestamp() as i64).div_euclid(86_400);
    let iso = calendar::civil_from_days(days);
    Ok(new_plain_date_object(iso, context).into())
}

/// `Temporal.Now.plainTimeISO()`.
fn now_plain_time_iso(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let now = Utc::now();
    let of_day = i128::from(now.timestamp().rem_euclid(86_400)) * 1_000_000_000
        + i128::from(now.timestamp_subsec_nanos());
    let (time, _) = IsoTime::midnight().add_nanoseconds(of_day);
    Ok(new_plain_time_object(time, context).into())
}

/// `Temporal.Now.plainDateTimeISO()`.
fn now_plain_date_time_iso(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let now = Utc::now();
    let days = now.timestamp().div_euclid(86_400);
    let of_day = i128::from(now.timestamp().rem_euclid(86_400)) * 1_000_000_000
        + i128::from(now.timestamp_subsec_nanos());
    let (time, _) = IsoTime::midnight().add_nanoseconds(of_day);
    let date = calendar::civil_from_days(days);
    Ok(new_plain_date_time_object(date, time, context).into())
}

// === PlainDate ===

pub(crate) fn new_plain_date_object(iso: IsoDate, context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().plain_date_object().prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::PlainDate(PlainDate { iso }),
    ))
}

fn this_plain_date(this: &JsValue, context: &mut Context) -> JsResult<IsoDate> {
    if let JsValue::Object(object) = this {
        if let ObjectData::PlainDate(date) = object.borrow().data {
            return Ok(date.iso);
        }
    }
    context.throw_type_error("Temporal.PlainDate method called on incompatible receiver")
}

/// Reads `{years, months, weeks, days}` off a duration-like object.
fn to_date_duration(value: &JsValue, context: &mut Context) -> JsResult<DateDuration> {
    let JsValue::Object(object) = value else {
        return context.throw_type_error("duration must be an object");
    };
    if let ObjectData::Duration(duration) = object.borrow().data {
        return Ok(DateDuration {
            years: duration.years,
            months: duration.months,
            weeks: duration.weeks,
            days: duration.days,
        });
    }
    let mut read = |name: &str, context: &mut Context| -> JsResult<Option<i64>> {
        let field = object.get(&name.into(), value.clone(), context)?;
        if field.is_undefined() {
            return Ok(None);
        }
        let number = field.to_number(context)?;
        if !number.is_finite() {
            return context.throw_range_error("duration fields must be finite");
        }
        Ok(Some(number.trunc() as i64))
    };

    let mut duration = DateDuration::default();
    if let Some(years) = read("years", context)? {
        duration.years = years;
    }
    if let Some(months) = read("months", context)? {
        duration.months = months;
    }
    if let Some(weeks) = read("weeks", context)? {
        duration.weeks = weeks;
    }
    if let Some(days) = read("days", context)? {
        duration.days = days;
    }
    Ok(duration)
}

/// Reads `{hours .. nanoseconds}` off a duration-like object.
fn to_time_duration(value: &JsValue, context: &mut Context) -> JsResult<TimeDuration> {
    let JsValue::Object(object) = value else {
        return context.throw_type_error("duration must be an object");
    };
    if let ObjectData::Duration(duration) = object.borrow().data {
        return Ok(duration.time_part());
    }
    let mut read = |name: &str, context: &mut Context| -> JsResult<Option<i64>> {
        let field = object.get(&name.into(), value.clone(), context)?;
        if field.is_undefined() {
            return Ok(None);
        }
        let number = field.to_number(context)?;
        if !number.is_finite() {
            return context.throw_range_error("duration fields must be finite");
        }
        Ok(Some(number.trunc() as i64))
    };

    let mut duration = TimeDuration::default();
    if let Some(hours) = read("hours", context)? {
        duration.hours = hours;
    }
    if let Some(minutes) = read("minutes", context)? {
        duration.minutes = minutes;
    }
    if let Some(seconds) = read("seconds", context)? {
        duration.seconds = seconds;
    }
    if let Some(milliseconds) = read("milliseconds", context)? {
        duration.milliseconds = milliseconds;
    }
    if let Some(microseconds) = read("microseconds", context)? {
        duration.microseconds = microseconds;
    }
    if let Some(nanoseconds) = read("nanoseconds", context)? {
        duration.nanoseconds = nanoseconds;
    }
    Ok(duration)
}

fn plain_date_constructor(context: &mut Context) -> JsObject {
    ConstructorBuilder::with_standard_object(
        context,
        plain_date_construct,
        context.standard_objects().plain_date_object().clone(),
    )
    .name("Temporal.PlainDate")
    .length(3)
    .static_method(plain_date_from, "from", 1)
    .static_method(plain_date_compare, "compare", 2)
    .method(plain_date_add, "add", 1)
    .method(plain_date_subtract, "subtract", 1)
    .method(plain_date_with, "with", 1)
    .method(plain_date_until, "until", 1)
    .method(plain_date_since, "since", 1)
    .method(plain_date_equals, "equals", 1)
    .method(plain_date_day_of_week, "dayOfWeek", 0)
    .method(plain_date_day_of_year, "dayOfYear", 0)
    .method(plain_date_days_in_month, "daysInMonth", 0)
    .method(plain_date_days_in_year, "daysInYear", 0)
    .method(plain_date_in_leap_year, "inLeapYear", 0)
    .method(plain_date_year, "year", 0)
    .method(plain_date_month, "month", 0)
    .method(plain_date_month_code, "monthCode", 0)
    .method(plain_date_day, "day", 0)
    .method(plain_date_to_string, "toString", 0)
    .method(plain_date_to_string, "toJSON", 0)
    .method(temporal_value_of, "valueOf", 0)
    .build()
}

fn plain_date_construct(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error("Temporal.PlainDate requires new");
    }
    let year = args.get(0).cloned().unwrap_or_default().to_integer_or_infinity(context)?;
    let month = args.get(1).cloned().unwrap_or_default().to_integer_or_infinity(context)?;
    let day = args.get(2).cloned().unwrap_or_default().to_integer_or_infinity(context)?;
    if !year.is_finite() || !month.is_finite() || !day.is_finite() {
        return context.throw_range_error("invalid ISO date");
    }

    let Some(iso) = IsoDate::new(year as i64, month as i64, day as i64) else {
        return context.throw_range_error("invalid ISO date");
    };
    if let JsValue::Object(object) = this {
        object.borrow_mut().data = ObjectData::PlainDate(PlainDate { iso });
        return Ok(this.clone());
    }
    Ok(new_plain_date_object(iso, context).into())
}

/// `Temporal.PlainDate.from(item)`: an ISO string, a property bag or
/// another plain date.
fn plain_date_from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let item = args.get(0).cloned().unwrap_or_default();
    match &item {
        JsValue::String(text) => match calendar::parse_iso_date(text) {
            Some(iso) => Ok(new_plain_date_object(iso, context).into()),
            None => context.throw_range_error(format!("cannot parse '{text}' as an ISO date")),
        },
        JsValue::Object(object) => {
            if let ObjectData::PlainDate(date) = object.borrow().data {
                return Ok(new_plain_date_object(date.iso, context).into());
            }
            let year = object
                .get(&"year".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            let month = object
                .get(&"month".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            let day = object
                .get(&"day".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            match IsoDate::new(year as i64, month as i64, day as i64) {
                Some(iso) => Ok(new_plain_date_object(iso, context).into()),
                None => context.throw_range_error("invalid ISO date"),
            }
        }
        _ => context.throw_type_error("cannot convert value to a Temporal.PlainDate"),
    }
}

/// `Temporal.PlainDate.compare(a, b)`.
fn plain_date_compare(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_date(&args.get(0).cloned().unwrap_or_default(), context)?;
    let b = this_plain_date(&args.get(1).cloned().unwrap_or_default(), context)?;
    Ok(JsValue::new(match a.days_since_epoch().cmp(&b.days_since_epoch()) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

/// `add(duration)`: years and months clamp the day into the target month.
fn plain_date_add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    let duration = to_date_duration(&args.get(0).cloned().unwrap_or_default(), context)?;
    match iso.add(duration) {
        Some(result) => Ok(new_plain_date_object(result, context).into()),
        None => context.throw_range_error("date outside the supported range"),
    }
}

fn plain_date_subtract(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    let duration = to_date_duration(&args.get(0).cloned().unwrap_or_default(), context)?;
    match iso.add(duration.negated()) {
        Some(result) => Ok(new_plain_date_object(result, context).into()),
        None => context.throw_range_error("date outside the supported range"),
    }
}

/// `with(fields)`: replaces the present components.
fn plain_date_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    let JsValue::Object(fields) = args.get(0).cloned().unwrap_or_default() else {
        return context.throw_type_error("with() requires an object");
    };
    let fields_value = JsValue::from(fields.clone());

    let mut year = iso.year;
    let mut month = i64::from(iso.month);
    let mut day = i64::from(iso.day);
    let year_field = fields.get(&"year".into(), fields_value.clone(), context)?;
    if !year_field.is_undefined() {
        year = year_field.to_integer_or_infinity(context)? as i64;
    }
    let month_field = fields.get(&"month".into(), fields_value.clone(), context)?;
    if !month_field.is_undefined() {
        month = month_field.to_integer_or_infinity(context)? as i64;
    }
    let day_field = fields.get(&"day".into(), fields_value, context)?;
    if !day_field.is_undefined() {
        day = day_field.to_integer_or_infinity(context)? as i64;
    }

    match IsoDate::new(year, month, day) {
        Some(result) => Ok(new_plain_date_object(result, context).into()),
        None => context.throw_range_error("invalid ISO date"),
    }
}

/// `until(other)`: the duration from this date to the other.
fn plain_date_until(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let from = this_plain_date(this, context)?;
    let to = this_plain_date(&args.get(0).cloned().unwrap_or_default(), context)?;
    let duration = calendar::difference(from, to);
    Ok(new_duration_object(duration, TimeDuration::default(), context).into())
}

fn plain_date_since(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let to = this_plain_date(this, context)?;
    let from = this_plain_date(&args.get(0).cloned().unwrap_or_default(), context)?;
    let duration = calendar::difference(from, to);
    Ok(new_duration_object(duration, TimeDuration::default(), context).into())
}

fn plain_date_equals(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_date(this, context)?;
    let b = this_plain_date(&args.get(0).cloned().unwrap_or_default(), context)?;
    Ok((a == b).into())
}

fn plain_date_day_of_week(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(calendar::day_of_week(iso)))
}

fn plain_date_day_of_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(calendar::day_of_year(iso)))
}

fn plain_date_days_in_month(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(calendar::days_in_month(iso.year, iso.month)))
}

fn plain_date_days_in_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(calendar::days_in_year(iso.year)))
}

fn plain_date_in_leap_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(calendar::is_leap_year(iso.year).into())
}

fn plain_date_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date(this, context)?.year))
}

fn plain_date_month(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date(this, context)?.month))
}

fn plain_date_month_code(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(format!("M{:02}", iso.month)))
}

fn plain_date_day(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date(this, context)?.day))
}

fn plain_date_to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_date(this, context)?;
    Ok(JsValue::new(iso.to_iso_string()))
}

/// Temporal types have no implicit primitive form; `valueOf` always
/// throws, pushing callers to `compare`/`equals`.
fn temporal_value_of(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    context.throw_type_error("Temporal objects have no valueOf; use compare() or equals()")
}

// === PlainTime ===

pub(crate) fn new_plain_time_object(iso: IsoTime, context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().plain_time_object().prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::PlainTime(PlainTime { iso }),
    ))
}

fn this_plain_time(this: &JsValue, context: &mut Context) -> JsResult<IsoTime> {
    if let JsValue::Object(object) = this {
        if let ObjectData::PlainTime(time) = object.borrow().data {
            return Ok(time.iso);
        }
    }
    context.throw_type_error("Temporal.PlainTime method called on incompatible receiver")
}

fn plain_time_constructor(context: &mut Context) -> JsObject {
    ConstructorBuilder::with_standard_object(
        context,
        plain_time_construct,
        context.standard_objects().plain_time_object().clone(),
    )
    .name("Temporal.PlainTime")
    .length(6)
    .static_method(plain_time_from, "from", 1)
    .static_method(plain_time_compare, "compare", 2)
    .method(plain_time_add, "add", 1)
    .method(plain_time_subtract, "subtract", 1)
    .method(plain_time_with, "with", 1)
    .method(plain_time_until, "until", 1)
    .method(plain_time_since, "since", 1)
    .method(plain_time_equals, "equals", 1)
    .method(plain_time_hour, "hour", 0)
    .method(plain_time_minute, "minute", 0)
    .method(plain_time_second, "second", 0)
    .method(plain_time_millisecond, "millisecond", 0)
    .method(plain_time_microsecond, "microsecond", 0)
    .method(plain_time_nanosecond, "nanosecond", 0)
    .method(plain_time_to_string, "toString", 0)
    .method(plain_time_to_string, "toJSON", 0)
    .method(temporal_value_of, "valueOf", 0)
    .build()
}

fn plain_time_construct(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error("Temporal.PlainTime requires new");
    }
    let mut parts = [0f64; 6];
    for (index, part) in parts.iter_mut().enumerate() {
        *part = args
            .get(index)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if !part.is_finite() {
            return context.throw_range_error("invalid wall-clock time");
        }
    }

    let Some(iso) = IsoTime::new(
        parts[0] as i64,
        parts[1] as i64,
        parts[2] as i64,
        parts[3] as i64,
        parts[4] as i64,
        parts[5] as i64,
    ) else {
        return context.throw_range_error("invalid wall-clock time");
    };
    if let JsValue::Object(object) = this {
        object.borrow_mut().data = ObjectData::PlainTime(PlainTime { iso });
        return Ok(this.clone());
    }
    Ok(new_plain_time_object(iso, context).into())
}

/// `Temporal.PlainTime.from(item)`: an ISO string, a property bag or
/// another plain time.
fn plain_time_from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let item = args.get(0).cloned().unwrap_or_default();
    match &item {
        JsValue::String(text) => match calendar::parse_iso_time(text) {
            Some(iso) => Ok(new_plain_time_object(iso, context).into()),
            None => context.throw_range_error(format!("cannot parse '{text}' as an ISO time")),
        },
        JsValue::Object(object) => {
            if let ObjectData::PlainTime(time) = object.borrow().data {
                return Ok(new_plain_time_object(time.iso, context).into());
            }
            let iso = read_time_fields(object, &item, IsoTime::midnight(), context)?;
            Ok(new_plain_time_object(iso, context).into())
        }
        _ => context.throw_type_error("cannot convert value to a Temporal.PlainTime"),
    }
}

/// Reads the `hour`..`nanosecond` fields off a property bag, defaulting the
/// absent ones from `base`.
fn read_time_fields(
    object: &JsObject,
    receiver: &JsValue,
    base: IsoTime,
    context: &mut Context,
) -> JsResult<IsoTime> {
    let mut read = |name: &str, default: i64, context: &mut Context| -> JsResult<i64> {
        let field = object.get(&name.into(), receiver.clone(), context)?;
        if field.is_undefined() {
            return Ok(default);
        }
        let number = field.to_integer_or_infinity(context)?;
        if !number.is_finite() {
            return context.throw_range_error("invalid wall-clock time");
        }
        Ok(number as i64)
    };

    let hour = read("hour", i64::from(base.hour), context)?;
    let minute = read("minute", i64::from(base.minute), context)?;
    let second = read("second", i64::from(base.second), context)?;
    let millisecond = read("millisecond", i64::from(base.millisecond), context)?;
    let microsecond = read("microsecond", i64::from(base.microsecond), context)?;
    let nanosecond = read("nanosecond", i64::from(base.nanosecond), context)?;
    match IsoTime::new(hour, minute, second, millisecond, microsecond, nanosecond) {
        Some(iso) => Ok(iso),
        None => context.throw_range_error("invalid wall-clock time"),
    }
}

/// `Temporal.PlainTime.compare(a, b)`: every component participates.
fn plain_time_compare(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let b = this_plain_time(&args.get(1).cloned().unwrap_or_default(), context)?;
    Ok(JsValue::new(match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

/// `add(duration)`: wall-clock arithmetic wraps around the day.
fn plain_time_add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_time(this, context)?;
    let duration = to_time_duration(&args.get(0).cloned().unwrap_or_default(), context)?;
    let (result, _) = iso.add_nanoseconds(duration.total_nanoseconds());
    Ok(new_plain_time_object(result, context).into())
}

fn plain_time_subtract(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_time(this, context)?;
    let duration = to_time_duration(&args.get(0).cloned().unwrap_or_default(), context)?;
    let (result, _) = iso.add_nanoseconds(duration.negated().total_nanoseconds());
    Ok(new_plain_time_object(result, context).into())
}

/// `with(fields)`: replaces the present components.
fn plain_time_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_time(this, context)?;
    let JsValue::Object(fields) = args.get(0).cloned().unwrap_or_default() else {
        return context.throw_type_error("with() requires an object");
    };
    let receiver = JsValue::from(fields.clone());
    let result = read_time_fields(&fields, &receiver, iso, context)?;
    Ok(new_plain_time_object(result, context).into())
}

/// `until(other)`: the balanced wall-clock distance to the other time.
fn plain_time_until(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let from = this_plain_time(this, context)?;
    let to = this_plain_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let duration = calendar::time_difference(from, to);
    Ok(new_duration_object(DateDuration::default(), duration, context).into())
}

fn plain_time_since(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let to = this_plain_time(this, context)?;
    let from = this_plain_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let duration = calendar::time_difference(from, to);
    Ok(new_duration_object(DateDuration::default(), duration, context).into())
}

fn plain_time_equals(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_time(this, context)?;
    let b = this_plain_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    Ok((a == b).into())
}

fn plain_time_hour(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.hour))
}

fn plain_time_minute(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.minute))
}

fn plain_time_second(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.second))
}

fn plain_time_millisecond(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.millisecond))
}

fn plain_time_microsecond(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.microsecond))
}

fn plain_time_nanosecond(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_time(this, context)?.nanosecond))
}

fn plain_time_to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let iso = this_plain_time(this, context)?;
    Ok(JsValue::new(iso.to_iso_string()))
}

// === PlainDateTime ===

pub(crate) fn new_plain_date_time_object(
    date: IsoDate,
    time: IsoTime,
    context: &mut Context,
) -> JsObject {
    let prototype = context
        .standard_objects()
        .plain_date_time_object()
        .prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::PlainDateTime(PlainDateTime { date, time }),
    ))
}

fn this_plain_date_time(this: &JsValue, context: &mut Context) -> JsResult<PlainDateTime> {
    if let JsValue::Object(object) = this {
        if let ObjectData::PlainDateTime(date_time) = object.borrow().data {
            return Ok(date_time);
        }
    }
    context.throw_type_error("Temporal.PlainDateTime method called on incompatible receiver")
}

fn plain_date_time_constructor(context: &mut Context) -> JsObject {
    ConstructorBuilder::with_standard_object(
        context,
        plain_date_time_construct,
        context.standard_objects().plain_date_time_object().clone(),
    )
    .name("Temporal.PlainDateTime")
    .length(3)
    .static_method(plain_date_time_from, "from", 1)
    .static_method(plain_date_time_compare, "compare", 2)
    .method(plain_date_time_add, "add", 1)
    .method(plain_date_time_subtract, "subtract", 1)
    .method(plain_date_time_with, "with", 1)
    .method(plain_date_time_with_plain_date, "withPlainDate", 1)
    .method(plain_date_time_with_plain_time, "withPlainTime", 0)
    .method(plain_date_time_until, "until", 1)
    .method(plain_date_time_since, "since", 1)
    .method(plain_date_time_equals, "equals", 1)
    .method(plain_date_time_year, "year", 0)
    .method(plain_date_time_month, "month", 0)
    .method(plain_date_time_day, "day", 0)
    .method(plain_date_time_hour, "hour", 0)
    .method(plain_date_time_minute, "minute", 0)
    .method(plain_date_time_second, "second", 0)
    .method(plain_date_time_millisecond, "millisecond", 0)
    .method(plain_date_time_microsecond, "microsecond", 0)
    .method(plain_date_time_nanosecond, "nanosecond", 0)
    .method(plain_date_time_to_string, "toString", 0)
    .method(plain_date_time_to_string, "toJSON", 0)
    .method(temporal_value_of, "valueOf", 0)
    .build()
}

fn plain_date_time_construct(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error("Temporal.PlainDateTime requires new");
    }
    let mut parts = [0f64; 9];
    for (index, part) in parts.iter_mut().enumerate() {
        *part = args
            .get(index)
            .cloned()
            .unwrap_or_default()
            .to_integer_or_infinity(context)?;
        if !part.is_finite() {
            return context.throw_range_error("invalid ISO date-time");
        }
    }

    let Some(date) = IsoDate::new(parts[0] as i64, parts[1] as i64, parts[2] as i64) else {
        return context.throw_range_error("invalid ISO date-time");
    };
    let Some(time) = IsoTime::new(
        parts[3] as i64,
        parts[4] as i64,
        parts[5] as i64,
        parts[6] as i64,
        parts[7] as i64,
        parts[8] as i64,
    ) else {
        return context.throw_range_error("invalid ISO date-time");
    };
    if let JsValue::Object(object) = this {
        object.borrow_mut().data = ObjectData::PlainDateTime(PlainDateTime { date, time });
        return Ok(this.clone());
    }
    Ok(new_plain_date_time_object(date, time, context).into())
}

/// `Temporal.PlainDateTime.from(item)`: an ISO string, a property bag or
/// another plain date-time.
fn plain_date_time_from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let item = args.get(0).cloned().unwrap_or_default();
    match &item {
        JsValue::String(text) => match calendar::parse_iso_date_time(text) {
            Some((date, time)) => Ok(new_plain_date_time_object(date, time, context).into()),
            None => {
                context.throw_range_error(format!("cannot parse '{text}' as an ISO date-time"))
            }
        },
        JsValue::Object(object) => {
            if let ObjectData::PlainDateTime(date_time) = object.borrow().data {
                return Ok(
                    new_plain_date_time_object(date_time.date, date_time.time, context).into(),
                );
            }
            let year = object
                .get(&"year".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            let month = object
                .get(&"month".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            let day = object
                .get(&"day".into(), item.clone(), context)?
                .to_integer_or_infinity(context)?;
            let Some(date) = IsoDate::new(year as i64, month as i64, day as i64) else {
                return context.throw_range_error("invalid ISO date-time");
            };
            let time = read_time_fields(object, &item, IsoTime::midnight(), context)?;
            Ok(new_plain_date_time_object(date, time, context).into())
        }
        _ => context.throw_type_error("cannot convert value to a Temporal.PlainDateTime"),
    }
}

/// Chronological order: the date decides, the wall clock breaks ties.
fn plain_date_time_compare(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_date_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let b = this_plain_date_time(&args.get(1).cloned().unwrap_or_default(), context)?;
    let a_key = (a.date.days_since_epoch(), a.time.nanoseconds_of_day());
    let b_key = (b.date.days_since_epoch(), b.time.nanoseconds_of_day());
    Ok(JsValue::new(match a_key.cmp(&b_key) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

/// The shared `add`/`subtract` core: the time part may carry days into the
/// date part.
fn plain_date_time_offset(
    date_time: PlainDateTime,
    date_duration: DateDuration,
    time_duration: TimeDuration,
    context: &mut Context,
) -> JsResult<PlainDateTime> {
    let (time, day_carry) = date_time
        .time
        .add_nanoseconds(time_duration.total_nanoseconds());
    let mut date_duration = date_duration;
    date_duration.days += day_carry;
    match date_time.date.add(date_duration) {
        Some(date) => Ok(PlainDateTime { date, time }),
        None => context.throw_range_error("date-time outside the supported range"),
    }
}

fn plain_date_time_add(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    let argument = args.get(0).cloned().unwrap_or_default();
    let date_duration = to_date_duration(&argument, context)?;
    let time_duration = to_time_duration(&argument, context)?;
    let result = plain_date_time_offset(date_time, date_duration, time_duration, context)?;
    Ok(new_plain_date_time_object(result.date, result.time, context).into())
}

fn plain_date_time_subtract(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    let argument = args.get(0).cloned().unwrap_or_default();
    let date_duration = to_date_duration(&argument, context)?.negated();
    let time_duration = to_time_duration(&argument, context)?.negated();
    let result = plain_date_time_offset(date_time, date_duration, time_duration, context)?;
    Ok(new_plain_date_time_object(result.date, result.time, context).into())
}

/// `with(fields)`: replaces the present date and time components.
fn plain_date_time_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    let JsValue::Object(fields) = args.get(0).cloned().unwrap_or_default() else {
        return context.throw_type_error("with() requires an object");
    };
    let receiver = JsValue::from(fields.clone());

    let mut read = |name: &str, default: i64, context: &mut Context| -> JsResult<i64> {
        let field = fields.get(&name.into(), receiver.clone(), context)?;
        if field.is_undefined() {
            return Ok(default);
        }
        let number = field.to_integer_or_infinity(context)?;
        if !number.is_finite() {
            return context.throw_range_error("invalid ISO date-time");
        }
        Ok(number as i64)
    };

    let year = read("year", date_time.date.year, context)?;
    let month = read("month", i64::from(date_time.date.month), context)?;
    let day = read("day", i64::from(date_time.date.day), context)?;
    let Some(date) = IsoDate::new(year, month, day) else {
        return context.throw_range_error("invalid ISO date-time");
    };
    let time = read_time_fields(&fields, &receiver, date_time.time, context)?;
    Ok(new_plain_date_time_object(date, time, context).into())
}

/// `withPlainDate(date)`: replaces the calendar date, keeping the clock.
fn plain_date_time_with_plain_date(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    let argument = args.get(0).cloned().unwrap_or_default();
    let date = match &argument {
        JsValue::String(text) => match calendar::parse_iso_date(text) {
            Some(date) => date,
            None => {
                return context.throw_range_error(format!("cannot parse '{text}' as an ISO date"))
            }
        },
        other => this_plain_date(other, context)?,
    };
    Ok(new_plain_date_time_object(date, date_time.time, context).into())
}

/// `withPlainTime([time])`: replaces the clock; absent means midnight.
fn plain_date_time_with_plain_time(
    this: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    let time = match args.get(0) {
        None | Some(JsValue::Undefined) => IsoTime::midnight(),
        Some(JsValue::String(text)) => match calendar::parse_iso_time(text) {
            Some(time) => time,
            None => {
                return context.throw_range_error(format!("cannot parse '{text}' as an ISO time"))
            }
        },
        Some(other) => this_plain_time(other, context)?,
    };
    Ok(new_plain_date_time_object(date_time.date, time, context).into())
}

/// `until(other)`: the date difference plus the balanced clock distance,
/// borrowing a day when the clock runs backwards.
fn plain_date_time_difference(from: PlainDateTime, to: PlainDateTime) -> (DateDuration, TimeDuration) {
    let from_key = (from.date.days_since_epoch(), from.time.nanoseconds_of_day());
    let to_key = (to.date.days_since_epoch(), to.time.nanoseconds_of_day());
    if to_key < from_key {
        let (date, time) = plain_date_time_difference(to, from);
        return (date.negated(), time.negated());
    }

    let mut end_date = to.date;
    let mut clock_nanoseconds = to.time.nanoseconds_of_day() - from.time.nanoseconds_of_day();
    if clock_nanoseconds < 0 {
        clock_nanoseconds += calendar::NANOSECONDS_PER_DAY;
        end_date = calendar::civil_from_days(end_date.days_since_epoch() - 1);
    }
    (
        calendar::difference(from.date, end_date),
        TimeDuration::from_nanoseconds(clock_nanoseconds),
    )
}

fn plain_date_time_until(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let from = this_plain_date_time(this, context)?;
    let to = this_plain_date_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let (date, time) = plain_date_time_difference(from, to);
    Ok(new_duration_object(date, time, context).into())
}

fn plain_date_time_since(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let to = this_plain_date_time(this, context)?;
    let from = this_plain_date_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    let (date, time) = plain_date_time_difference(from, to);
    Ok(new_duration_object(date, time, context).into())
}

fn plain_date_time_equals(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_plain_date_time(this, context)?;
    let b = this_plain_date_time(&args.get(0).cloned().unwrap_or_default(), context)?;
    Ok((a.date == b.date && a.time == b.time).into())
}

fn plain_date_time_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.date.year))
}

fn plain_date_time_month(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.date.month))
}

fn plain_date_time_day(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.date.day))
}

fn plain_date_time_hour(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.time.hour))
}

fn plain_date_time_minute(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.time.minute))
}

fn plain_date_time_second(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::new(this_plain_date_time(this, context)?.time.second))
}

fn plain_date_time_millisecond(
    this: &JsValue,
    _: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    Ok(JsValue::new(
        this_plain_date_time(this, context)?.time.millisecond,
    ))
}

fn plain_date_time_microsecond(
    this: &JsValue,
    _: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    Ok(JsValue::new(
        this_plain_date_time(this, context)?.time.microsecond,
    ))
}

fn plain_date_time_nanosecond(
    this: &JsValue,
    _: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    Ok(JsValue::new(
        this_plain_date_time(this, context)?.time.nanosecond,
    ))
}

fn plain_date_time_to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let date_time = this_plain_date_time(this, context)?;
    Ok(JsValue::new(format!(
        "{}T{}",
        date_time.date.to_iso_string(),
        date_time.time.to_iso_string(),
    )))
}

// === Instant ===

pub(crate) fn new_instant_object(epoch_nanoseconds: i128, context: &mut Context) -> JsObject {
    let prototype = context.standard_objects().instant_object().prototype();
    JsObject::new(Object::with_prototype(
        prototype.into(),
        ObjectData::Instant(Instant { epoch_nanoseconds }),
    ))
}

fn this_instant(this: &JsValue, context: &mut Context) -> JsResult<i128> {
    if let JsValue::Object(object) = this {
        if let ObjectData::Instant(instant) = object.borrow().data {
            return Ok(instant.epoch_nanoseconds);
        }
    }
    context.throw_type_error("Temporal.Instant method called on incompatible receiver")
}

fn instant_constructor(context: &mut Context) -> JsObject {
    ConstructorBuilder::with_standard_object(
        context,
        instant_construct,
        context.standard_objects().instant_object().clone(),
    )
    .name("Temporal.Instant")
    .length(1)
    .static_method(instant_from_epoch_milliseconds, "fromEpochMilliseconds", 1)
    .static_method(instant_compare, "compare", 2)
    .method(instant_epoch_seconds, "epochSeconds", 0)
    .method(instant_epoch_milliseconds, "epochMilliseconds", 0)
    .method(instant_equals, "equals", 1)
    .method(instant_to_string, "toString", 0)
    .method(instant_to_string, "toJSON", 0)
    .method(temporal_value_of, "valueOf", 0)
    .build()
}

fn instant_construct(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error("Temporal.Instant requires new");
    }
    let nanoseconds = args.get(0).cloned().unwrap_or_default().to_bigint(context)?;
    let nanoseconds = i128::try_from(nanoseconds.as_inner().clone())
        .map_err(|_| context.construct_range_error("instant out of range"))?;
    if let JsValue::Object(object) = this {
        object.borrow_mut().data = ObjectData::Instant(Instant {
            epoch_nanoseconds: nanoseconds,
        });
        return Ok(this.clone());
    }
    Ok(new_instant_object(nanoseconds, context).into())
}

fn instant_from_epoch_milliseconds(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let millis = args.get(0).cloned().unwrap_or_default().to_number(context)?;
    if !millis.is_finite() {
        return context.throw_range_error("invalid epoch milliseconds");
    }
    Ok(new_instant_object(millis as i128 * 1_000_000, context).into())
}

fn instant_compare(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_instant(&args.get(0).cloned().unwrap_or_default(), context)?;
    let b = this_instant(&args.get(1).cloned().unwrap_or_default(), context)?;
    Ok(JsValue::new(match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }))
}

fn instant_epoch_seconds(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let nanoseconds = this_instant(this, context)?;
    Ok(JsValue::new((nanoseconds / 1_000_000_000) as i64))
}

fn instant_epoch_milliseconds(
    this: &JsValue,
    _: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let nanoseconds = this_instant(this, context)?;
    Ok(JsValue::new((nanoseconds / 1_000_000) as i64))
}

fn instant_equals(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let a = this_instant(this, context)?;
    let b = this_instant(&args.get(0).cloned().unwrap_or_default(), context)?;
    Ok((a == b).into())
}

fn instant_to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    let nanoseconds = this_instant(this, context)?;
    let seconds = nanoseconds.div_euclid(1_000_000_000) as i64;
    let days = seconds.div_euclid(86_400);
    let time = seconds.rem_euclid(86_400);
    let iso = calendar::civil_from_days(days);
    let millis = nanoseconds.rem_euclid(1_000_000_000) / 1_000_000;
    Ok(JsValue::new(format!(
        "{}T{:02}:{:02}:{:02}.{:03}Z",
        iso.to_iso_string(),
        time / 3600,
        (time % 3600) / 60,
        time % 60,
        millis,
    )))
}

// === Duration ===

/// Builds the `Duration` internal slots and installs the component
/// properties.
fn fill_duration(object: &JsObject, duration: Duration) {
    object.borrow_mut().data = ObjectData::Duration(duration);
    let permanent = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
    object.insert_property("years", duration.years, permanent);
    object.insert_property("months", duration.months, permanent);
    object.insert_property("weeks", duration.weeks, permanent);
    object.insert_property("days", duration.days, permanent);
    object.insert_property("hours", duration.hours, permanent);
    object.insert_property("minutes", duration.minutes, permanent);
    object.insert_property("seconds", duration.seconds, permanent);
    object.insert_property("milliseconds", duration.milliseconds, permanent);
    object.insert_property("microseconds", duration.microseconds, permanent);
    object.insert_property("nanoseconds", duration.nanoseconds, permanent);
}

pub(crate) fn new_duration_object(
    date: DateDuration,
    time: TimeDuration,
    context: &mut Context,
) -> JsObject {
    let prototype = context.standard_objects().duration_object().prototype();
    let object = JsObject::new(Object::create(prototype.into()));
    fill_duration(
        &object,
        Duration {
            years: date.years,
            months: date.months,
            weeks: date.weeks,
            days: date.days,
            hours: time.hours,
            minutes: time.minutes,
            seconds: time.seconds,
            milliseconds: time.milliseconds,
            microseconds: time.microseconds,
            nanoseconds: time.nanoseconds,
        },
    );
    object
}

fn duration_constructor(context: &mut Context) -> JsObject {
    ConstructorBuilder::with_standard_object(
        context,
        duration_construct,
        context.standard_objects().duration_object().clone(),
    )
    .name("Temporal.Duration")
    .length(0)
    .method(duration_to_string, "toString", 0)
    .method(duration_to_string, "toJSON", 0)
    .method(temporal_value_of, "valueOf", 0)
    .build()
}

fn duration_construct(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if !context.is_in_constructor_call() {
        return context.throw_type_error("Temporal.Duration requires new");
    }
    // years, months, weeks, days, hours, minutes, seconds, milliseconds,
    // microseconds, nanoseconds.
    let mut parts = [0i64; 10];
    for (index, part) in parts.iter_mut().enumerate() {
        if let Some(value) = args.get(index) {
            if !value.is_undefined() {
                let number = value.to_number(context)?;
                if !number.is_finite() {
                    return context.throw_range_error("duration fields must be finite");
                }
                *part = number.trunc() as i64;
            }
        }
    }
    let duration = Duration {
        years: parts[0],
        months: parts[1],
        weeks: parts[2],
        days: parts[3],
        hours: parts[4],
        minutes: parts[5],
        seconds: parts[6],
        milliseconds: parts[7],
        microseconds: parts[8],
        nanoseconds: parts[9],
    };
    if let JsValue::Object(object) = this {
        fill_duration(object, duration);
        return Ok(this.clone());
    }
    Ok(new_duration_object(duration.date_part(), duration.time_part(), context).into())
}

fn duration_to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if let JsValue::Object(object) = this {
        if let ObjectData::Duration(duration) = object.borrow().data {
            return Ok(JsValue::new(calendar::format_duration(
                duration.date_part(),
                duration.time_part(),
            )));
        }
    }
    context.throw_type_error("Temporal.Duration method called on incompatible receiver")
}
