//! Pattern extraction
//!
//! Pulls dimensional tokens out of free-text item descriptions. Every field
//! of [`PartialDimensions`] is optional and `None` means the token was not
//! found, so averaging downstream can leave it out instead of counting a
//! zero.
//!
//! ```rust
//! use takeoff::extract::extract;
//!
//! let dims = extract("HP12x63 H=24'-9\"");
//! assert_eq!(dims.hp_section(), Some("HP12x63"));
//! assert_eq!(dims.hp_weight(), Some(63.0));
//! assert_eq!(dims.height_ft, Some(24.75));
//! ```

use lazy_regex::{lazy_regex, Lazy, Regex};
use serde::Serialize;

use crate::dims::{parse_feet_inches, pipe_weight_per_ft};

// Pipe thickness always carries a decimal point, which keeps `HP12x63` out
static DIAMETER_THICKNESS: Lazy<Regex> = lazy_regex!(
    r#"(?:^|[^A-Za-z0-9.])(\d+(?:\.\d+)?)\s*"?\s*[xX×]\s*(\d*\.\d+)\s*"?"#
);
static DIAMETER_SYMBOL: Lazy<Regex> = lazy_regex!(r#"[Ø⌀]\s*(\d+(?:\.\d+)?)\s*"?"#);
static DIAMETER_WORD: Lazy<Regex> = lazy_regex!(r#"(?i)(\d+(?:\.\d+)?)\s*"?\s*(?:dia\b|diam\b|diameter\b)"#);
// Value: 27'-10", 27', 10" or a bare number of feet
static HEIGHT: Lazy<Regex> = lazy_regex!(
    r#"\bH\s*=\s*(\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?\s*")?|\d+(?:\.\d+)?\s*"?)"#
);
static ROCK_SOCKET: Lazy<Regex> = lazy_regex!(
    r#"\bRS\s*=\s*(\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?\s*")?|\d+(?:\.\d+)?\s*"?)"#
);
static EMBEDMENT: Lazy<Regex> = lazy_regex!(
    r#"\bE\s*=\s*(\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?\s*")?|\d+(?:\.\d+)?\s*"?)"#
);
static LENGTH: Lazy<Regex> = lazy_regex!(
    r#"\bL\s*=\s*(\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?\s*")?|\d+(?:\.\d+)?\s*"?)"#
);
static BOND: Lazy<Regex> = lazy_regex!(
    r#"\bB\s*=\s*(\d+(?:\.\d+)?\s*'(?:\s*-?\s*\d+(?:\.\d+)?\s*")?|\d+(?:\.\d+)?\s*"?)"#
);
static BAR_SIZE: Lazy<Regex> = lazy_regex!(r"#\s*(\d{1,2})\b");
static HP_SECTION: Lazy<Regex> = lazy_regex!(r"(?i)\bHP\s*(\d+)\s*[xX×]\s*(\d+(?:\.\d+)?)");
static WIDE_FLANGE: Lazy<Regex> = lazy_regex!(r"\bW\s*(\d+)\s*[xX×]\s*(\d+(?:\.\d+)?)");

/// Rolled steel shape such as `HP12x63` or `W12x26`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SteelShape {
    /// Normalized designation, e.g. `HP12x63`
    pub designation: String,
    /// Nominal depth in inches
    pub depth_in: f64,
    /// Weight in lbs/ft
    pub weight_lb_ft: f64,
}

/// Dimensional tokens found in one description
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PartialDimensions {
    pub diameter_in: Option<f64>,
    pub thickness_in: Option<f64>,
    pub height_ft: Option<f64>,
    pub rock_socket_ft: Option<f64>,
    pub embedment_ft: Option<f64>,
    /// Free length (`L=`), used by anchors
    pub length_ft: Option<f64>,
    /// Bond length (`+ B=`), used by anchors
    pub bond_ft: Option<f64>,
    pub bar_size: Option<u8>,
    pub hp: Option<SteelShape>,
    pub wide_flange: Option<SteelShape>,
}

impl PartialDimensions {
    /// `HP12x63` style designation
    pub fn hp_section(&self) -> Option<&str> {
        self.hp.as_ref().map(|s| s.designation.as_str())
    }

    /// Weight in lbs/ft of the HP section
    pub fn hp_weight(&self) -> Option<f64> {
        self.hp.as_ref().map(|s| s.weight_lb_ft)
    }

    /// Height including the additive rock socket
    pub fn total_height_ft(&self) -> Option<f64> {
        self.height_ft
            .map(|h| h + self.rock_socket_ft.unwrap_or(0.0))
    }

    /// Anchor length: free length plus bond length or rock socket
    pub fn anchor_length_ft(&self) -> Option<f64> {
        self.length_ft
            .map(|l| l + self.bond_ft.or(self.rock_socket_ft).unwrap_or(0.0))
    }

    /// Steel pipe weight per foot when diameter and wall thickness are known
    pub fn pipe_weight(&self) -> Option<f64> {
        match (self.diameter_in, self.thickness_in) {
            (Some(d), Some(t)) if d > t => Some(pipe_weight_per_ft(d, t)),
            _ => None,
        }
    }

    /// Whether nothing at all was recognized
    pub fn is_empty(&self) -> bool {
        *self == PartialDimensions::default()
    }
}

/// Extract every recognizable dimension token from `text`
///
/// The first occurrence of each token wins.
pub fn extract(text: &str) -> PartialDimensions {
    let mut dims = PartialDimensions {
        height_ft: feet_token(&HEIGHT, text),
        rock_socket_ft: feet_token(&ROCK_SOCKET, text),
        embedment_ft: feet_token(&EMBEDMENT, text),
        length_ft: feet_token(&LENGTH, text),
        bond_ft: feet_token(&BOND, text),
        bar_size: BAR_SIZE
            .captures(text)
            .and_then(|c| c[1].parse::<u8>().ok()),
        hp: shape_token(&HP_SECTION, "HP", text),
        wide_flange: shape_token(&WIDE_FLANGE, "W", text),
        ..PartialDimensions::default()
    };

    if let Some(caps) = DIAMETER_THICKNESS.captures(text) {
        dims.diameter_in = caps[1].parse().ok();
        dims.thickness_in = caps[2].parse().ok();
    } else if let Some(caps) = DIAMETER_SYMBOL
        .captures(text)
        .or_else(|| DIAMETER_WORD.captures(text))
    {
        dims.diameter_in = caps[1].parse().ok();
    }

    dims
}

/// Whether `text` names an HP section
pub fn is_hp_section(text: &str) -> bool {
    HP_SECTION.is_match(text)
}

fn feet_token(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| parse_feet_inches(&caps[1]))
}

fn shape_token(pattern: &Regex, prefix: &str, text: &str) -> Option<SteelShape> {
    let caps = pattern.captures(text)?;
    let depth_in = caps[1].parse().ok()?;
    let weight_lb_ft = caps[2].parse().ok()?;
    Some(SteelShape {
        designation: format!("{}{}x{}", prefix, &caps[1], &caps[2]),
        depth_in,
        weight_lb_ft,
    })
}
