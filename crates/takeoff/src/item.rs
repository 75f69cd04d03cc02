//! Parsed takeoff items
//!
//! The per-trade parsers that turn raw drawing text into these records live
//! upstream; everything in this crate consumes them read-only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Trade section, in processing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Demolition,
    Excavation,
    RockExcavation,
    Soe,
    Foundation,
    Waterproofing,
}

impl Section {
    /// Every section in processing order
    pub const ORDER: [Section; 6] = [
        Section::Demolition,
        Section::Excavation,
        Section::RockExcavation,
        Section::Soe,
        Section::Foundation,
        Section::Waterproofing,
    ];

    /// Title written into column A of the section header
    pub fn title(self) -> &'static str {
        match self {
            Section::Demolition => "Demolition",
            Section::Excavation => "Excavation",
            Section::RockExcavation => "Rock Excavation",
            Section::Soe => "SOE",
            Section::Foundation => "Foundation",
            Section::Waterproofing => "Waterproofing",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Unit a takeoff count is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[default]
    #[serde(rename = "EA", alias = "ea", alias = "Ea", alias = "EACH")]
    Ea,
    #[serde(rename = "FT", alias = "ft", alias = "LF", alias = "lf")]
    Ft,
    #[serde(rename = "SQ FT", alias = "SF", alias = "sf", alias = "SQFT", alias = "sqft")]
    Sqft,
    #[serde(rename = "CY", alias = "cy")]
    Cy,
    #[serde(rename = "LBS", alias = "lbs", alias = "LB")]
    Lbs,
}

impl Unit {
    /// Label written into column D
    pub fn label(self) -> &'static str {
        match self {
            Unit::Ea => "EA",
            Unit::Ft => "FT",
            Unit::Sqft => "SQ FT",
            Unit::Cy => "CY",
            Unit::Lbs => "LBS",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

macro_rules! item_types {
    ($($variant:ident),+ $(,)?) => {
        /// Item type tag
        ///
        /// The set is closed: every tag an upstream parser can emit is listed
        /// here, and both the builder registry and the aggregation rules are
        /// keyed on it.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum ItemType {
            $($variant),+
        }

        impl ItemType {
            /// Every item type
            pub const ALL: &'static [ItemType] = &[$(ItemType::$variant),+];
        }
    };
}

item_types! {
    // structural rows, valid in every section
    SectionHeader,
    SubsectionHeader,
    Blank,
    Sum,

    // demolition
    DemoSlabOnGrade,
    DemoStripFooting,
    DemoFoundationWall,
    DemoIsolatedFooting,
    DemoRetainingWall,
    DemoExtra,

    // excavation
    BulkExcavation,
    TrenchExcavation,
    Backfill,
    SoilExport,
    ExcavationExtra,

    // rock excavation
    RockExcavation,
    LineDrilling,
    RockTrench,

    // support of excavation
    DrilledSoldierPile,
    HpSoldierPile,
    PrimarySecantPile,
    SecondarySecantPile,
    TangentPile,
    TimberLagging,
    SheetPile,
    Shotcrete,
    Waler,
    Raker,
    Strut,
    TieBackAnchor,
    RockAnchor,
    RockBolt,
    HeelBlock,
    Underpinning,
    GuideWall,

    // foundation
    DrilledFoundationPile,
    HelicalPile,
    DrivenPile,
    PileCap,
    StripFooting,
    IsolatedFooting,
    FoundationWall,
    GradeBeam,
    SlabOnGrade,
    ElevatorPit,
    StairOnGrade,
    StairLanding,

    // waterproofing
    WallWaterproofing,
    SlabWaterproofing,
    VaporBarrier,
    DrainageBoard,
    Waterstop,
}

impl ItemType {
    /// Header, separator and sum rows
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ItemType::SectionHeader | ItemType::SubsectionHeader | ItemType::Blank | ItemType::Sum
        )
    }

    /// Rows that carry takeoff data
    pub fn is_data(self) -> bool {
        !self.is_structural()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Dimensional fields a parser extracted for one item
///
/// Everything is optional; a missing field stays a blank cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedData {
    pub takeoff: Option<f64>,
    pub unit: Unit,
    pub qty: Option<f64>,
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A typed record derived from one takeoff row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedItem {
    pub section: Section,
    #[serde(default)]
    pub subsection: String,
    pub item_type: ItemType,
    /// Target 1-based row on the calculation sheet
    pub row: u32,
    #[serde(default)]
    pub particulars: String,
    #[serde(default)]
    pub data: ParsedData,
}

impl ParsedItem {
    /// Create an item with empty data
    pub fn new(
        section: Section,
        subsection: impl Into<String>,
        item_type: ItemType,
        row: u32,
        particulars: impl Into<String>,
    ) -> Self {
        Self {
            section,
            subsection: subsection.into(),
            item_type,
            row,
            particulars: particulars.into(),
            data: ParsedData::default(),
        }
    }

    /// Set the takeoff count
    pub fn takeoff(mut self, takeoff: f64) -> Self {
        self.data.takeoff = Some(takeoff);
        self
    }

    /// Set the unit
    pub fn unit(mut self, unit: Unit) -> Self {
        self.data.unit = unit;
        self
    }

    /// Set the quantity multiplier
    pub fn qty(mut self, qty: f64) -> Self {
        self.data.qty = Some(qty);
        self
    }

    /// Set length, width and height at once
    pub fn dims(mut self, length: Option<f64>, width: Option<f64>, height: Option<f64>) -> Self {
        self.data.length = length;
        self.data.width = width;
        self.data.height = height;
        self
    }

    /// A row that separates groups: explicitly blank, or a data row with no particulars
    pub fn is_blank(&self) -> bool {
        self.item_type == ItemType::Blank
            || (self.item_type.is_data() && self.particulars.trim().is_empty())
    }

    /// Takeoff times the quantity multiplier (which defaults to 1)
    pub fn count(&self) -> Option<f64> {
        self.data
            .takeoff
            .map(|takeoff| takeoff * self.data.qty.unwrap_or(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order() {
        let mut sorted = Section::ORDER.to_vec();
        sorted.sort();
        assert_eq!(sorted, Section::ORDER.to_vec());
        assert_eq!(Section::RockExcavation.title(), "Rock Excavation");
    }

    #[test]
    fn test_item_types_enumerable() {
        assert!(ItemType::ALL.len() >= 50);
        assert!(ItemType::ALL.contains(&ItemType::StairLanding));
        assert_eq!(
            ItemType::ALL.iter().filter(|t| t.is_structural()).count(),
            4
        );
    }

    #[test]
    fn test_deserialize_item() {
        let json = r#"{
            "section": "soe",
            "subsection": "Soldier piles",
            "item_type": "hp_soldier_pile",
            "row": 10,
            "particulars": "HP12x63 H=24'-9\"",
            "data": { "takeoff": 3, "unit": "EA" }
        }"#;
        let item: ParsedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.section, Section::Soe);
        assert_eq!(item.item_type, ItemType::HpSoldierPile);
        assert_eq!(item.data.takeoff, Some(3.0));
        assert_eq!(item.data.height, None);
    }

    #[test]
    fn test_unit_aliases() {
        let unit: Unit = serde_json::from_str("\"SF\"").unwrap();
        assert_eq!(unit, Unit::Sqft);
        let unit: Unit = serde_json::from_str("\"LF\"").unwrap();
        assert_eq!(unit, Unit::Ft);
    }

    #[test]
    fn test_blank_detection() {
        let blank = ParsedItem::new(Section::Soe, "Soldier piles", ItemType::Blank, 12, "");
        assert!(blank.is_blank());
        let unnamed = ParsedItem::new(Section::Soe, "Soldier piles", ItemType::HpSoldierPile, 12, "  ");
        assert!(unnamed.is_blank());
        let header = ParsedItem::new(Section::Soe, "Soldier piles", ItemType::Sum, 12, "");
        assert!(!header.is_blank());
    }

    #[test]
    fn test_count() {
        let item = ParsedItem::new(Section::Soe, "Rakers", ItemType::Raker, 5, "Raker")
            .takeoff(4.0)
            .qty(2.0);
        assert_eq!(item.count(), Some(8.0));
    }
}
