//! Color construction and channel accessors (global functions).

use sass_diagnostic::{SassError, SassResult};
use sass_value::{Color, Number, Value};

use crate::callable::Args;
use crate::evaluator::Evaluator;

pub fn rgb(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    rgb_impl(ev, args, "rgb")
}

pub fn rgba(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    rgb_impl(ev, args, "rgba")
}

fn rgb_impl(_ev: &mut Evaluator, args: &mut Args, name: &str) -> SassResult<Value> {
    // rgba($color, $alpha) adjusts an existing color.
    if args.len() == 2 {
        let first = args.get("color")?;
        let alpha = args.get("alpha")?;
        args.check_exhausted()?;
        if let Value::Color(color) = first {
            let alpha = channel_fraction(&alpha, "alpha")?;
            return Ok(Value::Color(color.with_alpha(alpha)));
        }
        return Err(SassError::runtime(
            format!("{name}($color, $alpha) expects a color."),
            args.span,
        ));
    }

    let red = args.get("red")?;
    let green = args.get("green")?;
    let blue = args.get("blue")?;
    let alpha = args.get_or("alpha", Value::number(1.0));
    args.check_exhausted()?;
    Ok(Value::Color(Color::from_rgba(
        channel_byte(&red, "red")?,
        channel_byte(&green, "green")?,
        channel_byte(&blue, "blue")?,
        channel_fraction(&alpha, "alpha")?,
    )))
}

pub fn hsl(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    hsl_impl(ev, args)
}

pub fn hsla(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    hsl_impl(ev, args)
}

fn hsl_impl(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let hue = args.get("hue")?;
    let saturation = args.get("saturation")?;
    let lightness = args.get("lightness")?;
    let alpha = args.get_or("alpha", Value::number(1.0));
    args.check_exhausted()?;
    Ok(Value::Color(Color::from_hsla(
        hue.assert_number(Some("hue"))?.value,
        saturation.assert_number(Some("saturation"))?.value,
        lightness.assert_number(Some("lightness"))?.value,
        channel_fraction(&alpha, "alpha")?,
    )))
}

pub fn hwb(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let hue = args.get("hue")?;
    let whiteness = args.get("whiteness")?;
    let blackness = args.get("blackness")?;
    let alpha = args.get_or("alpha", Value::number(1.0));
    args.check_exhausted()?;
    Ok(Value::Color(Color::from_hwba(
        hue.assert_number(Some("hue"))?.value,
        whiteness.assert_number(Some("whiteness"))?.value,
        blackness.assert_number(Some("blackness"))?.value,
        channel_fraction(&alpha, "alpha")?,
    )))
}

pub fn red(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| Value::number(color.red().round()))
}

pub fn green(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| Value::number(color.green().round()))
}

pub fn blue(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| Value::number(color.blue().round()))
}

pub fn alpha(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| Value::number(color.alpha()))
}

pub fn hue(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| {
        Value::Number(Number::with_unit(color.hue(), "deg"))
    })
}

pub fn saturation(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| {
        Value::Number(Number::with_unit(color.saturation(), "%"))
    })
}

pub fn lightness(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    channel(args, |color| {
        Value::Number(Number::with_unit(color.lightness(), "%"))
    })
}

fn channel(args: &mut Args, f: fn(&Color) -> Value) -> SassResult<Value> {
    let value = args.get("color")?;
    args.check_exhausted()?;
    let color = value.assert_color(Some("color"))?;
    Ok(f(color))
}

/// A channel in [0, 255]; percentages scale.
fn channel_byte(value: &Value, name: &str) -> SassResult<f64> {
    let number = value.assert_number(Some(name))?;
    if number.numerator_units() == ["%"] {
        Ok(number.value / 100.0 * 255.0)
    } else {
        Ok(number.value)
    }
}

/// An alpha in [0, 1]; percentages scale.
fn channel_fraction(value: &Value, name: &str) -> SassResult<f64> {
    let number = value.assert_number(Some(name))?;
    if number.numerator_units() == ["%"] {
        Ok(number.value / 100.0)
    } else {
        Ok(number.value)
    }
}
