//! Feet-inch dimensions, rounding and averaging

use lazy_regex::{lazy_regex, Lazy, Regex};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Steel pipe weight constant (lbs/ft per in² of wall section)
pub const PIPE_WEIGHT_FACTOR: f64 = 10.69;

/// Digits kept before rounding up, so float noise never crosses a step
const ROUNDING_DP: u32 = 6;

static FEET_INCHES: Lazy<Regex> = lazy_regex!(
    r#"^\s*(?:(\d+(?:\.\d+)?)\s*')?\s*-?\s*(?:(\d+(?:\.\d+)?)\s*(?:"|''))?\s*$"#
);

/// Parse `27'-10"` style text into decimal feet
///
/// Accepts feet only (`27'`), inches only (`10"`), both with an optional
/// dash, or a plain decimal taken as feet. Anything else is `None`.
pub fn parse_feet_inches(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(feet) = text.parse::<f64>() {
        return feet.is_finite().then_some(feet);
    }

    let caps = FEET_INCHES.captures(text)?;
    let feet = caps.get(1).map(|m| m.as_str().parse::<f64>());
    let inches = caps.get(2).map(|m| m.as_str().parse::<f64>());
    match (feet, inches) {
        (None, None) => None,
        (feet, inches) => {
            let feet = feet.transpose().ok()?.unwrap_or(0.0);
            let inches = inches.transpose().ok()?.unwrap_or(0.0);
            Some(feet + inches / 12.0)
        }
    }
}

/// Format decimal feet as `F'-I"`, to the nearest inch
pub fn format_feet_inches(feet: f64) -> String {
    let total_inches = (feet.abs() * 12.0).round() as i64;
    let sign = if feet < 0.0 && total_inches != 0 { "-" } else { "" };
    format!("{}{}'-{}\"", sign, total_inches / 12, total_inches % 12)
}

/// Round `value` up to the next multiple of `step`
///
/// Values already on a step stay put. The arithmetic runs in decimal after
/// trimming to six places, so `25.000000000004` is still 25. A non-positive
/// or non-finite step returns the value unchanged.
pub fn round_up_to_multiple(value: f64, step: f64) -> f64 {
    if !value.is_finite() || !step.is_finite() || step <= 0.0 {
        return value;
    }
    let (Some(value_dec), Some(step_dec)) = (Decimal::from_f64(value), Decimal::from_f64(step))
    else {
        return value;
    };
    let value_dec = value_dec.round_dp(ROUNDING_DP);
    let step_dec = step_dec.round_dp(ROUNDING_DP);
    if step_dec.is_zero() {
        return value;
    }
    let steps = (value_dec / step_dec).ceil();
    (steps * step_dec).to_f64().unwrap_or(value)
}

/// [`round_up_to_multiple`] with the usual 5 ft step
pub fn round_up_to_multiple_of_5(value: f64) -> f64 {
    round_up_to_multiple(value, 5.0)
}

/// Weighted mean of `(value, weight)` pairs
///
/// Pairs with a non-positive or non-finite weight are ignored. Returns
/// `None` when nothing carries weight.
pub fn weighted_average<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let (sum, weight) = pairs
        .into_iter()
        .filter(|(value, weight)| value.is_finite() && weight.is_finite() && *weight > 0.0)
        .fold((0.0, 0.0), |(sum, total), (value, weight)| {
            (sum + value * weight, total + weight)
        });
    (weight > 0.0).then(|| sum / weight)
}

/// Weight per foot of a steel pipe, from outside diameter and wall thickness in inches
pub fn pipe_weight_per_ft(diameter_in: f64, thickness_in: f64) -> f64 {
    PIPE_WEIGHT_FACTOR * (diameter_in - thickness_in) * thickness_in
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_feet_inches() {
        assert_eq!(parse_feet_inches("27'-10\""), Some(27.0 + 10.0 / 12.0));
        assert_eq!(parse_feet_inches("27'"), Some(27.0));
        assert_eq!(parse_feet_inches("27'-0\""), Some(27.0));
        assert_eq!(parse_feet_inches("24'-9\""), Some(24.75));
        assert_eq!(parse_feet_inches("10\""), Some(10.0 / 12.0));
        assert_eq!(parse_feet_inches("27' 6\""), Some(27.5));
        assert_eq!(parse_feet_inches("12.5"), Some(12.5));
    }

    #[test]
    fn test_parse_feet_inches_rejects_garbage() {
        assert_eq!(parse_feet_inches(""), None);
        assert_eq!(parse_feet_inches("abc"), None);
        assert_eq!(parse_feet_inches("-"), None);
        assert_eq!(parse_feet_inches("HP12x63"), None);
    }

    #[test]
    fn test_format_feet_inches() {
        assert_eq!(format_feet_inches(27.833), "27'-10\"");
        assert_eq!(format_feet_inches(25.0), "25'-0\"");
        assert_eq!(format_feet_inches(0.5), "0'-6\"");
        // 11.98 inches carries into the next foot
        assert_eq!(format_feet_inches(9.999), "10'-0\"");
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_up_to_multiple_of_5(22.1), 25.0);
        assert_eq!(round_up_to_multiple_of_5(25.0), 25.0);
        assert_eq!(round_up_to_multiple_of_5(22.5), 25.0);
        assert_eq!(round_up_to_multiple_of_5(25.000000000004), 25.0);
        assert_eq!(round_up_to_multiple_of_5(0.0), 0.0);
        assert_eq!(round_up_to_multiple(7.2, 2.5), 7.5);
        assert_eq!(round_up_to_multiple(7.2, 0.0), 7.2);
    }

    #[test]
    fn test_weighted_average() {
        assert_eq!(weighted_average([(24.75, 1.0), (20.25, 1.0)]), Some(22.5));
        assert_eq!(weighted_average([(10.0, 3.0), (20.0, 1.0)]), Some(12.5));
        assert_eq!(weighted_average([(10.0, 0.0)]), None);
        assert_eq!(weighted_average(Vec::<(f64, f64)>::new()), None);
    }

    #[test]
    fn test_pipe_weight() {
        let w = pipe_weight_per_ft(9.625, 0.545);
        assert!((w - 52.90).abs() < 0.01, "got {}", w);
    }

    proptest! {
        #[test]
        fn prop_round_up_is_a_multiple_not_below(value in 0.0f64..10_000.0) {
            let rounded = round_up_to_multiple_of_5(value);
            // values are trimmed to six places before rounding
            prop_assert!(rounded + 1e-6 >= value);
            prop_assert!(rounded - value < 5.0 + 1e-9);
            prop_assert!((rounded / 5.0 - (rounded / 5.0).round()).abs() < 1e-9);
        }

        #[test]
        fn prop_round_up_fixed_point(steps in 0u32..2_000) {
            let value = f64::from(steps) * 5.0;
            prop_assert_eq!(round_up_to_multiple_of_5(value), value);
        }

        #[test]
        fn prop_feet_inches_round_trip(feet in 0u32..500, inches in 0u32..12) {
            let text = format!("{}'-{}\"", feet, inches);
            let parsed = parse_feet_inches(&text).unwrap();
            prop_assert!((parsed - (f64::from(feet) + f64::from(inches) / 12.0)).abs() < 1e-12);
            prop_assert_eq!(format_feet_inches(parsed), text);
        }
    }
}
