use super::calendar::{
    civil_from_days, day_of_week, day_of_year, days_from_civil, days_in_month, difference,
    is_leap_year, parse_iso_date, parse_iso_date_time, parse_iso_time, time_difference,
    DateDuration, IsoDate, IsoTime, TimeDuration, NANOSECONDS_PER_DAY,
};
use crate::Context;

fn eval_display(context: &mut Context, source: &str) -> String {
    context
        .eval(source)
        .unwrap_or_else(|error| panic!("{source} threw {}", error.display()))
        .display()
        .to_string()
}

#[test]
fn leap_year_rules() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
}

#[test]
fn month_lengths() {
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2024, 1), 31);
    assert_eq!(days_in_month(2024, 4), 30);
    assert_eq!(days_in_month(2024, 12), 31);
}

#[test]
fn epoch_day_conversion_round_trips() {
    assert_eq!(days_from_civil(1970, 1, 1), 0);
    assert_eq!(days_from_civil(1970, 1, 2), 1);
    assert_eq!(days_from_civil(1969, 12, 31), -1);
    assert_eq!(days_from_civil(2000, 3, 1), 11017);

    for days in [-1_000_000, -400, -1, 0, 1, 59, 60, 365, 146_097, 1_000_000] {
        let date = civil_from_days(days);
        assert_eq!(
            days_from_civil(date.year, date.month, date.day),
            days,
            "round trip failed for {days}"
        );
    }
}

#[test]
fn weekday_and_ordinal_day() {
    // 1970-01-01 was a Thursday (ISO weekday 4).
    assert_eq!(day_of_week(IsoDate::new(1970, 1, 1).unwrap()), 4);
    // 2024-01-01 was a Monday.
    assert_eq!(day_of_week(IsoDate::new(2024, 1, 1).unwrap()), 1);
    assert_eq!(day_of_year(IsoDate::new(2024, 1, 1).unwrap()), 1);
    assert_eq!(day_of_year(IsoDate::new(2024, 12, 31).unwrap()), 366);
    assert_eq!(day_of_year(IsoDate::new(2023, 12, 31).unwrap()), 365);
}

#[test]
fn date_validation() {
    assert!(IsoDate::new(2024, 2, 29).is_some());
    assert!(IsoDate::new(2023, 2, 29).is_none());
    assert!(IsoDate::new(2023, 13, 1).is_none());
    assert!(IsoDate::new(2023, 0, 1).is_none());
    assert!(IsoDate::new(2023, 4, 31).is_none());
}

#[test]
fn addition_clamps_into_short_months() {
    let jan31 = IsoDate::new(2023, 1, 31).unwrap();
    let plus_month = jan31
        .add(DateDuration {
            months: 1,
            ..Default::default()
        })
        .unwrap();
    assert_eq!((plus_month.year, plus_month.month, plus_month.day), (2023, 2, 28));

    let leap = IsoDate::new(2024, 1, 31).unwrap();
    let plus_month = leap
        .add(DateDuration {
            months: 1,
            ..Default::default()
        })
        .unwrap();
    assert_eq!((plus_month.year, plus_month.month, plus_month.day), (2024, 2, 29));

    let plus_year = IsoDate::new(2024, 2, 29)
        .unwrap()
        .add(DateDuration {
            years: 1,
            ..Default::default()
        })
        .unwrap();
    assert_eq!((plus_year.year, plus_year.month, plus_year.day), (2025, 2, 28));
}

#[test]
fn addition_carries_days_across_months() {
    let date = IsoDate::new(2023, 12, 30).unwrap();
    let next = date
        .add(DateDuration {
            days: 3,
            ..Default::default()
        })
        .unwrap();
    assert_eq!((next.year, next.month, next.day), (2024, 1, 2));
}

#[test]
fn difference_matches_until_semantics() {
    let from = IsoDate::new(2023, 1, 15).unwrap();
    let to = IsoDate::new(2024, 3, 10).unwrap();
    let duration = difference(from, to);
    assert_eq!((duration.years, duration.months), (1, 1));
    // Reversed operands negate.
    let back = difference(to, from);
    assert_eq!((back.years, back.months), (-1, -1));
}

#[test]
fn iso_parsing_and_formatting() {
    let date = parse_iso_date("2024-02-29").unwrap();
    assert_eq!((date.year, date.month, date.day), (2024, 2, 29));
    assert!(parse_iso_date("2023-02-29").is_none());
    assert_eq!(date.to_iso_string(), "2024-02-29");
    assert_eq!(
        parse_iso_date("2024-03-01T12:00:00").map(|d| d.to_iso_string()),
        Some("2024-03-01".to_owned())
    );
}

#[test]
fn time_validation_and_nanoseconds_of_day() {
    assert!(IsoTime::new(23, 59, 59, 999, 999, 999).is_some());
    assert!(IsoTime::new(24, 0, 0, 0, 0, 0).is_none());
    assert!(IsoTime::new(0, 60, 0, 0, 0, 0).is_none());
    assert!(IsoTime::new(0, 0, 0, 1000, 0, 0).is_none());

    let last = IsoTime::new(23, 59, 59, 999, 999, 999).unwrap();
    assert_eq!(last.nanoseconds_of_day(), NANOSECONDS_PER_DAY - 1);
    assert_eq!(IsoTime::midnight().nanoseconds_of_day(), 0);
}

#[test]
fn time_arithmetic_wraps_with_day_carry() {
    let late = IsoTime::new(23, 30, 0, 0, 0, 0).unwrap();
    let (wrapped, carry) = late.add_nanoseconds(3_600_000_000_000);
    assert_eq!((wrapped.hour, wrapped.minute), (0, 30));
    assert_eq!(carry, 1);

    let early = IsoTime::new(0, 15, 0, 0, 0, 0).unwrap();
    let (wrapped, carry) = early.add_nanoseconds(-3_600_000_000_000);
    assert_eq!((wrapped.hour, wrapped.minute), (23, 15));
    assert_eq!(carry, -1);
}

#[test]
fn time_difference_balances_components() {
    let from = IsoTime::new(10, 20, 30, 0, 0, 0).unwrap();
    let to = IsoTime::new(12, 45, 15, 500, 0, 0).unwrap();
    let duration = time_difference(from, to);
    assert_eq!(
        (duration.hours, duration.minutes, duration.seconds, duration.milliseconds),
        (2, 24, 45, 500)
    );
    let back = time_difference(to, from);
    assert_eq!((back.hours, back.minutes), (-2, -24));
}

#[test]
fn iso_time_parsing_and_formatting() {
    let time = parse_iso_time("12:34:56.789").unwrap();
    assert_eq!(
        (time.hour, time.minute, time.second, time.millisecond),
        (12, 34, 56, 789)
    );
    assert_eq!(time.to_iso_string(), "12:34:56.789");
    assert_eq!(parse_iso_time("08:05").unwrap().to_iso_string(), "08:05:00");
    assert!(parse_iso_time("25:00").is_none());
    assert!(parse_iso_time("10:61").is_none());

    let (date, time) = parse_iso_date_time("2024-02-29T23:59:59").unwrap();
    assert_eq!((date.year, date.month, date.day), (2024, 2, 29));
    assert_eq!((time.hour, time.minute, time.second), (23, 59, 59));
    let (_, midnight) = parse_iso_date_time("2024-03-01").unwrap();
    assert_eq!(midnight, IsoTime::midnight());
}

#[test]
fn time_duration_round_trips_nanoseconds() {
    let duration = TimeDuration {
        hours: 5,
        minutes: 42,
        seconds: 7,
        milliseconds: 123,
        microseconds: 456,
        nanoseconds: 789,
    };
    let rebuilt = TimeDuration::from_nanoseconds(duration.total_nanoseconds() as i64);
    assert_eq!(rebuilt, duration);
    assert_eq!(
        TimeDuration::from_nanoseconds(-1_500_000_000),
        TimeDuration {
            seconds: -1,
            milliseconds: -500,
            ..Default::default()
        }
    );
}

#[test]
fn plain_time_surface() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var t = new Temporal.PlainTime(13, 37, 5);
             t.hour() + ':' + t.minute() + ':' + t.second()"
        ),
        "13:37:5"
    );
    assert_eq!(
        eval_display(&mut context, "Temporal.PlainTime.from('23:30').add({ hours: 2 }).toString()"),
        "01:30:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainTime.from('01:30').subtract({ hours: 2 }).toString()"
        ),
        "23:30:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainTime.from('10:00').with({ minute: 59 }).toString()"
        ),
        "10:59:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainTime.from('10:00').until(Temporal.PlainTime.from('12:30')).toString()"
        ),
        "PT2H30M"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainTime.compare(
                 Temporal.PlainTime.from('09:00'),
                 Temporal.PlainTime.from('09:00:00.001'))"
        ),
        "-1"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { new Temporal.PlainTime(24); } catch (e) { e.name }"
        ),
        "RangeError"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { Temporal.PlainTime.from('12:00') < 5; } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn plain_date_time_surface() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "new Temporal.PlainDateTime(2024, 2, 29, 23, 30).toString()"
        ),
        "2024-02-29T23:30:00"
    );
    // The time carry crosses the leap day into March.
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from('2024-02-29T23:30:00').add({ hours: 1 }).toString()"
        ),
        "2024-03-01T00:30:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from('2024-03-01T00:30:00')
                 .subtract({ hours: 1 }).toString()"
        ),
        "2024-02-29T23:30:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.compare(
                 Temporal.PlainDateTime.from('2024-01-01T12:00'),
                 Temporal.PlainDateTime.from('2024-01-01T12:00:01'))"
        ),
        "-1"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from('2024-01-15T08:00')
                 .withPlainTime('20:15').toString()"
        ),
        "2024-01-15T20:15:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from('2024-01-15T08:00')
                 .withPlainDate('2025-06-01').toString()"
        ),
        "2025-06-01T08:00:00"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from('2024-01-01T23:00')
                 .until(Temporal.PlainDateTime.from('2024-01-02T01:30')).toString()"
        ),
        "PT2H30M"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDateTime.from({ year: 2024, month: 7, day: 4, hour: 9 })
                 .hour()"
        ),
        "9"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { new Temporal.PlainDateTime(2023, 2, 29); } catch (e) { e.name }"
        ),
        "RangeError"
    );
}

#[test]
fn durations_carry_time_components() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "new Temporal.Duration(1, 2, 0, 3, 4, 5, 6).toString()"
        ),
        "P1Y2M3DT4H5M6S"
    );
    assert_eq!(
        eval_display(&mut context, "new Temporal.Duration(0, 0, 0, 0, 0, 0, 0).toString()"),
        "PT0S"
    );
    assert_eq!(
        eval_display(&mut context, "new Temporal.Duration(0, 0, 0, 2).hours"),
        "0"
    );
}

#[test]
fn plain_date_surface() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "var d = new Temporal.PlainDate(2024, 2, 29);
             d.year() + '-' + d.month() + '-' + d.day()"
        ),
        "2024-2-29"
    );
    assert_eq!(
        eval_display(&mut context, "Temporal.PlainDate.from('2024-01-31').add({ months: 1 }).toString()"),
        "2024-02-29"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "Temporal.PlainDate.compare(
                 Temporal.PlainDate.from('2024-01-01'),
                 Temporal.PlainDate.from('2023-12-31'))"
        ),
        "1"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { new Temporal.PlainDate(2023, 2, 29); } catch (e) { e.name }"
        ),
        "RangeError"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "try { new Temporal.PlainDate(2024, 1, 1) < 5; } catch (e) { e.name }"
        ),
        "TypeError"
    );
}

#[test]
fn date_setters_apply_components() {
    let mut context = Context::new();
    // setFullYear really changes the stored date.
    assert_eq!(
        eval_display(
            &mut context,
            "var d = new Date(0);
             d.setFullYear(1980);
             d.getFullYear()"
        ),
        "1980"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var d = new Date(Date.UTC(2024, 0, 31));
             d.setMonth(1);
             d.getMonth() + ':' + d.getDate()"
        ),
        // Jan 31 + month 1 carries into March: ECMA MakeDay overflow.
        "2:2"
    );
    assert_eq!(
        eval_display(
            &mut context,
            "var d = new Date(Date.UTC(2020, 5, 15, 10, 30));
             d.setHours(0);
             d.getHours() + ':' + d.getMinutes()"
        ),
        "0:30"
    );
}

#[test]
fn date_iso_round_trip() {
    let mut context = Context::new();
    assert_eq!(
        eval_display(
            &mut context,
            "new Date('2024-02-29T12:34:56.000Z').toISOString()"
        ),
        "2024-02-29T12:34:56.000Z"
    );
    assert_eq!(
        eval_display(&mut context, "Date.UTC(2024, 0, 1)"),
        "1704067200000"
    );
    assert_eq!(
        eval_display(&mut context, "new Date(NaN).toString()"),
        "Invalid Date"
    );
}
