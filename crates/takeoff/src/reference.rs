//! Reference-code lookup over the raw takeoff records

use lazy_regex::{lazy_regex, Lazy, Regex};
use takeoff_core::TakeoffRecord;
use tracing::debug;

use crate::group::Family;

static DRILLED_SOLDIER: Lazy<Regex> =
    lazy_regex!(r#"(?i)drilled\s+soldier|soldier.*\d"?\s*x\s*\d*\.\d"#);
static HP_SOLDIER: Lazy<Regex> = lazy_regex!(r"(?i)\bHP\s*\d+\s*x\s*\d+");
static SECANT: Lazy<Regex> = lazy_regex!(r"(?i)\bsecant\b");
static TANGENT: Lazy<Regex> = lazy_regex!(r"(?i)\btangent\b");
static SHEET_PILE: Lazy<Regex> = lazy_regex!(r"(?i)\bsheet\s*pil");
static LAGGING: Lazy<Regex> = lazy_regex!(r"(?i)\blagging\b");
static ANCHOR: Lazy<Regex> = lazy_regex!(r"(?i)tie[\s-]*back|\banchor|\brock\s*bolt");
static BRACING: Lazy<Regex> = lazy_regex!(r"(?i)\b(?:waler|raker|strut)");
static DRILLED_FOUNDATION: Lazy<Regex> = lazy_regex!(r"(?i)\b(?:drilled|caisson)\b");
static HELICAL: Lazy<Regex> = lazy_regex!(r"(?i)\bhelical\b");
static DRIVEN: Lazy<Regex> = lazy_regex!(r"(?i)\bdriven\b|\bHP\s*\d+\s*x\s*\d+");
static SHOTCRETE: Lazy<Regex> = lazy_regex!(r"(?i)\bshotcrete\b");
static HEEL_BLOCK: Lazy<Regex> = lazy_regex!(r"(?i)\bheel\s*block");
static UNDERPINNING: Lazy<Regex> = lazy_regex!(r"(?i)\bunderpinning\b");
static WATERPROOFING: Lazy<Regex> =
    lazy_regex!(r"(?i)waterproof|vapou?r\s*barrier|drainage\s*board|waterstop");

/// Description pattern that identifies a family's raw records
pub fn family_pattern(family: Family) -> Option<&'static Regex> {
    let pattern: &'static Lazy<Regex> = match family {
        Family::DrilledSoldierPile => &DRILLED_SOLDIER,
        Family::HpSoldierPile => &HP_SOLDIER,
        Family::SecantPile => &SECANT,
        Family::TangentPile => &TANGENT,
        Family::SheetPile => &SHEET_PILE,
        Family::Lagging => &LAGGING,
        Family::Anchor => &ANCHOR,
        Family::BracingMember => &BRACING,
        Family::DrilledFoundationPile => &DRILLED_FOUNDATION,
        Family::HelicalPile => &HELICAL,
        Family::DrivenPile => &DRIVEN,
        Family::Shotcrete => &SHOTCRETE,
        Family::HeelBlock => &HEEL_BLOCK,
        Family::Underpinning => &UNDERPINNING,
        Family::Waterproofing => &WATERPROOFING,
        Family::Generic => return None,
    };
    Some(Lazy::force(pattern))
}

/// Raw records in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordIndex {
    records: Vec<TakeoffRecord>,
}

impl RecordIndex {
    /// Index records, keeping their order
    pub fn new(records: Vec<TakeoffRecord>) -> Self {
        Self { records }
    }

    /// All records
    pub fn records(&self) -> &[TakeoffRecord] {
        &self.records
    }

    /// Drawing reference for a family
    ///
    /// When several records match, the first one in source order wins, even
    /// if a later one would match more specifically.
    pub fn reference_for(&self, family: Family) -> Option<&str> {
        let pattern = family_pattern(family)?;
        let record = self
            .records
            .iter()
            .filter(|r| !r.page.trim().is_empty())
            .find(|r| pattern.is_match(&r.description))?;
        debug!(%family, line = record.line, page = %record.page, "reference found");
        Some(record.page.trim())
    }
}
