//! This module implements the global `Date` object.
//!
//! The internal slot is the epoch-milliseconds timestamp (`NaN` marks an
//! invalid date). Wall-clock acquisition and civil/epoch conversion go
//! through `chrono`; component setters recompute the timestamp from the
//! changed component per ECMA-262.

use crate::{
    builtins::BuiltIn,
    context::Context,
    object::{ConstructorBuilder, JsObject, Object, ObjectData},
    property::Attribute,
    value::{JsValue, PreferredType},
    JsResult,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use vesper_gc::{Finalize, Trace, Tracer};

/// The `[[DateValue]]` slot.
#[derive(Debug, Clone, Copy, Finalize)]
pub struct Date(f64);

impl Trace for Date {
    #[inline]
    fn trace(&self, _tracer: &mut Tracer) {}
}

impl Date {
    pub fn timestamp(self) -> f64 {
        self.0
    }

    fn datetime(self) -> Option<DateTime<Utc>> {
        if !self.0.is_finite() {
            return None;
        }
        Utc.timestamp_millis_opt(self.0 as i64).single()
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DateBuiltin;

impl BuiltIn for DateBuiltin {
    const NAME: &'static str = "Date";

    fn init(context: &mut Context) -> (&'static str, JsValue, Attribute) {
        let date = ConstructorBuilder::with_standard_object(
            context,
            Self::constructor,
            context.standard_objects().date_object().clone(),
        )
        .name(Self::NAME)
        .length(7)
        .static_method(Self::now, "now", 0)
        .static_method(Self::parse, "parse", 1)
        .static_method(Self::utc, "UTC", 7)
        .method(Self::get_date, "getDate", 0)
        .method(Self::get_day, "getDay", 0)
        .method(Self::get_full_year, "getFullYear", 0)
        .method(Self::get_hours, "getHours", 0)
        .method(Self::get_milliseconds, "getMilliseconds", 0)
        .method(Self::get_minutes, "getMinutes", 0)
        .method(Self::get_month, "getMonth", 0)
        .method(Self::get_seconds, "getSeconds", 0)
        .method(Self::get_time, "getTime", 0)
        .method(Self::get_timezone_offset, "getTimezoneOffset", 0)
        .method(Self::get_date, "getUTCDate", 0)
        .method(Self::get_day, "getUTCDay", 0)
        .method(Self::get_full_year, "getUTCFullYear", 0)
        .method(Self::get_hours, "getUTCHours", 0)
        .method(Self::get_milliseconds, "getUTCMilliseconds", 0)
        .method(Self::get_minutes, "getUTCMinutes", 0)
        .method(Self::get_month, "getUTCMonth", 0)
        .method(Self::get_seconds, "getUTCSeconds", 0)
        .method(Self::set_date, "setDate", 1)
        .method(Self::set_full_year, "setFullYear", 3)
        .method(Self::set_hours, "setHours", 4)
        .method(Self::set_milliseconds, "setMilliseconds", 1)
        .method(Self::set_minutes, "setMinutes", 3)
        .method(Self::set_month, "setMonth", 2)
        .method(Self::set_seconds, "setSeconds", 2)
        .method(Self::set_time, "setTime", 1)
        .method(Self::to_iso_string, "toISOString", 0)
        .method(Self::to_json, "toJSON", 1)
        .method(Self::to_string, "toString", 0)
        .method(Self::value_of, "valueOf", 0)
        .build();

        (Self::NAME, date.into(), Self::attribute())
    }
}

fn now_millis() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// `MakeDay`/`MakeTime`/`TimeClip` folded together: components may
/// overflow and carry (month 12 is January of the next year).
fn make_timestamp(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
    millisecond: i64,
) -> f64 {
    let (carry_year, month) = (year + month.div_euclid(12), month.rem_euclid(12));
    let Some(base) = NaiveDate::from_ymd_opt(carry_year as i32, 1 + month as u32, 1) else {
        return f64::NAN;
    };
    let days = i64::from(base.num_days_from_ce()) - 719_163 + (day - 1);
    let millis = days * 86_400_000
        + hour * 3_600_000
        + minute * 60_000
        + second * 1_000
        + millisecond;
    let clipped = millis as f64;
    if clipped.abs() > 8.64e15 {
        f64::NAN
    } else {
        clipped
    }
}

fn this_timestamp(this: &JsValue, context: &mut Context) -> JsResult<f64> {
    if let JsValue::Object(object) = this {
        if let ObjectData::Date(date) = object.borrow().data {
            return Ok(date.timestamp());
        }
    }
    context.throw_type_error("Date.prototype method called on incompatible receiver")
}

fn set_this_timestamp(this: &JsValue, timestamp: f64, context: &mut Context) -> JsResult<JsValue> {
    if let JsValue::Object(object) = this {
        if matches!(object.borrow().data, ObjectData::Date(_)) {
            object.borrow_mut().data = ObjectData::Date(Date(timestamp));
            return Ok(JsValue::new(timestamp));
        }
    }
    context.throw_type_error("Date.prototype method called on incompatible receiver")
}

/// The datetime of `this`, or `None` for an invalid date.
fn this_datetime(this: &JsValue, context: &mut Context) -> JsResult<Option<DateTime<Utc>>> {
    Ok(Date(this_timestamp(this, context)?).datetime())
}

fn parse_date_string(text: &str) -> f64 {
    // ISO 8601 first, then the RFC 2822 fallback.
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return datetime.timestamp_millis() as f64;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        let datetime = NaiveDateTime::from(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        return datetime.and_utc().timestamp_millis() as f64;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(text) {
        return datetime.timestamp_millis() as f64;
    }
    f64::NAN
}

/// Reads the argument at `index` as an integral component; `NaN` poisons
/// the date.
fn component(
    args: &[JsValue],
    index: usize,
    default: i64,
    context: &mut Context,
) -> JsResult<Option<i64>> {
    match args.get(index) {
        None | Some(JsValue::Undefined) => Ok(Some(default)),
        Some(value) => {
            let number = value.to_number(context)?;
            if number.is_finite() {
                Ok(Some(number.trunc() as i64))
            } else {
                Ok(None)
            }
        }
    }
}

impl DateBuiltin {
    /// `new Date()` / `new Date(ms)` / `new Date(string)` /
    /// `new Date(y, m, d, h, min, s, ms)`.
    fn constructor(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if !context.is_in_constructor_call() {
            // `Date()` as a function is the current time as a string.
            let timestamp = Date(now_millis());
            return Ok(JsValue::new(render_date(timestamp)));
        }

        let timestamp = match args.len() {
            0 => now_millis(),
            1 => match &args[0] {
                JsValue::String(text) => parse_date_string(text),
                value => {
                    let primitive = value.to_primitive(context, PreferredType::Default)?;
                    match primitive {
                        JsValue::String(text) => parse_date_string(&text),
                        other => other.to_number(context)?,
                    }
                }
            },
            _ => {
                let mut parts = [0i64; 7];
                let defaults = [1970, 0, 1, 0, 0, 0, 0];
                let mut valid = true;
                for (index, part) in parts.iter_mut().enumerate() {
                    match component(args, index, defaults[index], context)? {
                        Some(value) => *part = value,
                        None => valid = false,
                    }
                }
                if valid {
                    let year = if (0..=99).contains(&parts[0]) {
                        1900 + parts[0]
                    } else {
                        parts[0]
                    };
                    make_timestamp(
                        year, parts[1], parts[2], parts[3], parts[4], parts[5], parts[6],
                    )
                } else {
                    f64::NAN
                }
            }
        };

        let JsValue::Object(object) = this else {
            let prototype = context.standard_objects().date_object().prototype();
            return Ok(JsObject::new(Object::with_prototype(
                prototype.into(),
                ObjectData::Date(Date(timestamp)),
            ))
            .into());
        };
        object.borrow_mut().data = ObjectData::Date(Date(timestamp));
        Ok(this.clone())
    }

    /// `Date.now()`.
    fn now(_: &JsValue, _: &[JsValue], _context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(now_millis()))
    }

    /// `Date.parse(string)`.
    fn parse(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = args.get(0).cloned().unwrap_or_default().to_string(context)?;
        Ok(JsValue::new(parse_date_string(&text)))
    }

    /// `Date.UTC(year[, month[, ...]])`.
    fn utc(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let defaults = [1970, 0, 1, 0, 0, 0, 0];
        let mut parts = [0i64; 7];
        for (index, part) in parts.iter_mut().enumerate() {
            match component(args, index, defaults[index], context)? {
                Some(value) => *part = value,
                None => return Ok(JsValue::nan()),
            }
        }
        let year = if (0..=99).contains(&parts[0]) {
            1900 + parts[0]
        } else {
            parts[0]
        };
        Ok(JsValue::new(make_timestamp(
            year, parts[1], parts[2], parts[3], parts[4], parts[5], parts[6],
        )))
    }

    fn get_date(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.day())))
    }

    fn get_day(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?.map_or(JsValue::nan(), |dt| {
            JsValue::new(dt.weekday().num_days_from_sunday())
        }))
    }

    fn get_full_year(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.year())))
    }

    fn get_hours(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.hour())))
    }

    fn get_milliseconds(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?.map_or(JsValue::nan(), |dt| {
            JsValue::new(dt.timestamp_subsec_millis())
        }))
    }

    fn get_minutes(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.minute())))
    }

    fn get_month(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.month0())))
    }

    fn get_seconds(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_datetime(this, context)?
            .map_or(JsValue::nan(), |dt| JsValue::new(dt.second())))
    }

    /// `Date.prototype.getTime()`.
    fn get_time(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(this_timestamp(this, context)?))
    }

    /// The engine keeps civil time in UTC, so the offset is zero.
    fn get_timezone_offset(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        this_timestamp(this, context)?;
        Ok(JsValue::new(0))
    }

    /// `setDate(day)`: applies the component, as the standard requires.
    fn set_date(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let Some(day) = component(args, 0, i64::from(dt.day()), context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            i64::from(dt.month0()),
            day,
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            i64::from(dt.second()),
            i64::from(dt.timestamp_subsec_millis()),
        );
        set_this_timestamp(this, timestamp, context)
    }

    /// `setFullYear(year[, month[, day]])`.
    fn set_full_year(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let dt = this_datetime(this, context)?
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).single().expect("epoch is valid"));
        let (Some(year), Some(month), Some(day)) = (
            component(args, 0, i64::from(dt.year()), context)?,
            component(args, 1, i64::from(dt.month0()), context)?,
            component(args, 2, i64::from(dt.day()), context)?,
        ) else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            year,
            month,
            day,
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            i64::from(dt.second()),
            i64::from(dt.timestamp_subsec_millis()),
        );
        set_this_timestamp(this, timestamp, context)
    }

    /// `setHours(h[, m[, s[, ms]]])`.
    fn set_hours(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let (Some(hour), Some(minute), Some(second), Some(milli)) = (
            component(args, 0, i64::from(dt.hour()), context)?,
            component(args, 1, i64::from(dt.minute()), context)?,
            component(args, 2, i64::from(dt.second()), context)?,
            component(args, 3, i64::from(dt.timestamp_subsec_millis()), context)?,
        ) else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            i64::from(dt.month0()),
            i64::from(dt.day()),
            hour,
            minute,
            second,
            milli,
        );
        set_this_timestamp(this, timestamp, context)
    }

    fn set_milliseconds(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let Some(milli) = component(args, 0, 0, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            i64::from(dt.month0()),
            i64::from(dt.day()),
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            i64::from(dt.second()),
            milli,
        );
        set_this_timestamp(this, timestamp, context)
    }

    fn set_minutes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let (Some(minute), Some(second), Some(milli)) = (
            component(args, 0, i64::from(dt.minute()), context)?,
            component(args, 1, i64::from(dt.second()), context)?,
            component(args, 2, i64::from(dt.timestamp_subsec_millis()), context)?,
        ) else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            i64::from(dt.month0()),
            i64::from(dt.day()),
            i64::from(dt.hour()),
            minute,
            second,
            milli,
        );
        set_this_timestamp(this, timestamp, context)
    }

    fn set_month(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let (Some(month), Some(day)) = (
            component(args, 0, i64::from(dt.month0()), context)?,
            component(args, 1, i64::from(dt.day()), context)?,
        ) else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            month,
            day,
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            i64::from(dt.second()),
            i64::from(dt.timestamp_subsec_millis()),
        );
        set_this_timestamp(this, timestamp, context)
    }

    fn set_seconds(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(dt) = this_datetime(this, context)? else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let (Some(second), Some(milli)) = (
            component(args, 0, i64::from(dt.second()), context)?,
            component(args, 1, i64::from(dt.timestamp_subsec_millis()), context)?,
        ) else {
            return set_this_timestamp(this, f64::NAN, context);
        };
        let timestamp = make_timestamp(
            i64::from(dt.year()),
            i64::from(dt.month0()),
            i64::from(dt.day()),
            i64::from(dt.hour()),
            i64::from(dt.minute()),
            second,
            milli,
        );
        set_this_timestamp(this, timestamp, context)
    }

    /// `setTime(ms)`.
    fn set_time(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let timestamp = args.get(0).cloned().unwrap_or_default().to_number(context)?;
        set_this_timestamp(this, timestamp, context)
    }

    /// `Date.prototype.toISOString()`.
    fn to_iso_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        match this_datetime(this, context)? {
            Some(dt) => Ok(JsValue::new(
                dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            )),
            None => context.throw_range_error("invalid time value"),
        }
    }

    /// `Date.prototype.toJSON()`.
    fn to_json(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if this_datetime(this, context)?.is_none() {
            return Ok(JsValue::null());
        }
        Self::to_iso_string(this, &[], context)
    }

    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let timestamp = this_timestamp(this, context)?;
        Ok(JsValue::new(render_date(Date(timestamp))))
    }

    /// `Date.prototype.valueOf()`.
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::new(this_timestamp(this, context)?))
    }
}

fn render_date(date: Date) -> String {
    match date.datetime() {
        Some(dt) => dt.format("%a %b %d %Y %H:%M:%S GMT+0000").to_string(),
        None => "Invalid Date".to_owned(),
    }
}
