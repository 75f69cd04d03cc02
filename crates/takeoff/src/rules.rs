//! Aggregation rule table
//!
//! Which of the I..M columns a subsection's sum row totals. The rules are
//! data: one entry per subsection name, plus a few overrides for
//! subsections shared by more than one item family. Names are matched
//! case-insensitively with runs of whitespace collapsed.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use takeoff_core::{ColumnSet, SumColumn};
use tracing::debug;

use crate::item::{ItemType, Section};

use SumColumn::{Cy, Ft, Lbs, Qty, Sqft};

/// Built-in subsection rules, in section order
const STANDARD_RULES: &[(Section, &str, ColumnSet)] = &[
    // demolition
    (Section::Demolition, "Demo slab on grade", ColumnSet::of(&[Sqft, Cy])),
    (Section::Demolition, "Demo strip footing", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Demolition, "Demo foundation wall", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Demolition, "Demo retaining wall", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Demolition, "Demo isolated footing", ColumnSet::of(&[Sqft, Cy, Qty])),
    (Section::Demolition, "Demo extras", ColumnSet::of(&[Ft, Sqft, Cy, Qty])),
    // excavation
    (Section::Excavation, "Excavation", ColumnSet::of(&[Sqft, Cy])),
    (Section::Excavation, "Bulk excavation", ColumnSet::of(&[Sqft, Cy])),
    (Section::Excavation, "Trench excavation", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Excavation, "Backfill", ColumnSet::of(&[Sqft, Cy])),
    (Section::Excavation, "Soil export", ColumnSet::of(&[Cy])),
    (Section::Excavation, "Excavation extras", ColumnSet::of(&[Ft, Sqft, Cy, Qty])),
    // rock excavation
    (Section::RockExcavation, "Rock excavation", ColumnSet::of(&[Sqft, Cy])),
    (Section::RockExcavation, "Line drilling", ColumnSet::of(&[Ft, Sqft])),
    (Section::RockExcavation, "Rock trench", ColumnSet::of(&[Ft, Sqft, Cy])),
    // support of excavation
    (Section::Soe, "Soldier piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Soe, "Drilled soldier piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Soe, "HP soldier piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Soe, "Secant piles", ColumnSet::of(&[Ft, Lbs, Cy, Qty])),
    (Section::Soe, "Primary secant piles", ColumnSet::of(&[Ft, Cy, Qty])),
    (Section::Soe, "Secondary secant piles", ColumnSet::of(&[Ft, Lbs, Cy, Qty])),
    (Section::Soe, "Tangent piles", ColumnSet::of(&[Ft, Lbs, Cy, Qty])),
    (Section::Soe, "Timber lagging", ColumnSet::of(&[Ft, Sqft])),
    (Section::Soe, "Sheet piles", ColumnSet::of(&[Ft, Sqft, Lbs])),
    (Section::Soe, "Shotcrete", ColumnSet::of(&[Ft, Sqft])),
    (Section::Soe, "Walers", ColumnSet::of(&[Ft, Lbs])),
    (Section::Soe, "Rakers", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Soe, "Struts", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Soe, "Tie back anchors", ColumnSet::of(&[Ft, Qty])),
    (Section::Soe, "Rock anchors", ColumnSet::of(&[Ft, Qty])),
    (Section::Soe, "Rock bolts", ColumnSet::of(&[Ft, Qty])),
    (Section::Soe, "Heel blocks", ColumnSet::of(&[Cy, Qty])),
    (Section::Soe, "Underpinning", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Soe, "Guide wall", ColumnSet::of(&[Ft, Sqft, Cy])),
    // foundation
    (Section::Foundation, "Foundation piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Foundation, "Drilled foundation piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Foundation, "Helical piles", ColumnSet::of(&[Ft, Qty])),
    (Section::Foundation, "Driven piles", ColumnSet::of(&[Ft, Lbs, Qty])),
    (Section::Foundation, "Pile caps", ColumnSet::of(&[Sqft, Cy, Qty])),
    (Section::Foundation, "Strip footings", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Foundation, "Isolated footings", ColumnSet::of(&[Sqft, Cy, Qty])),
    (Section::Foundation, "Foundation walls", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Foundation, "Grade beams", ColumnSet::of(&[Ft, Sqft, Cy])),
    (Section::Foundation, "Slab on grade", ColumnSet::of(&[Sqft, Cy])),
    (Section::Foundation, "Elevator pit", ColumnSet::of(&[Sqft, Cy])),
    (Section::Foundation, "Stairs on grade", ColumnSet::of(&[Cy, Qty])),
    // waterproofing
    (Section::Waterproofing, "Wall waterproofing", ColumnSet::of(&[Ft, Sqft])),
    (Section::Waterproofing, "Slab waterproofing", ColumnSet::of(&[Sqft])),
    (Section::Waterproofing, "Vapor barrier", ColumnSet::of(&[Sqft])),
    (Section::Waterproofing, "Drainage board", ColumnSet::of(&[Ft, Sqft])),
    (Section::Waterproofing, "Waterstop", ColumnSet::of(&[Ft])),
];

/// Shared subsections where the first item's family changes the columns
const STANDARD_OVERRIDES: &[(&str, ItemType, ColumnSet)] = &[
    ("Foundation piles", ItemType::HelicalPile, ColumnSet::of(&[Ft, Qty])),
    ("Secant piles", ItemType::PrimarySecantPile, ColumnSet::of(&[Ft, Cy, Qty])),
    ("Soldier piles", ItemType::TimberLagging, ColumnSet::of(&[Ft, Sqft])),
];

static STANDARD: Lazy<RuleTable> = Lazy::new(RuleTable::build_standard);

/// Normalize a subsection name for lookup
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Where a lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// A subsection entry
    Entry,
    /// A `(subsection, item type)` override
    Override,
    /// The section's fallback set
    SectionDefault,
}

/// Lookup result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub columns: ColumnSet,
    pub source: RuleSource,
}

/// One enumerable table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEntry {
    pub section: Option<Section>,
    pub subsection: String,
    pub item_type: Option<ItemType>,
    pub columns: ColumnSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Named {
    display: String,
    section: Option<Section>,
    columns: ColumnSet,
}

/// Immutable subsection → summed-columns map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    entries: BTreeMap<String, Named>,
    overrides: BTreeMap<(String, ItemType), ColumnSet>,
}

impl RuleTable {
    /// The built-in table
    pub fn standard() -> &'static RuleTable {
        &STANDARD
    }

    fn build_standard() -> RuleTable {
        let entries = STANDARD_RULES
            .iter()
            .map(|&(section, name, columns)| {
                (
                    normalize_name(name),
                    Named {
                        display: name.to_string(),
                        section: Some(section),
                        columns,
                    },
                )
            })
            .collect();
        let overrides = STANDARD_OVERRIDES
            .iter()
            .map(|&(name, item_type, columns)| ((normalize_name(name), item_type), columns))
            .collect();
        RuleTable { entries, overrides }
    }

    /// Copy of this table with additional or replacement subsection rules
    pub fn extend<'a, I>(&self, extra: I) -> RuleTable
    where
        I: IntoIterator<Item = (&'a String, &'a Vec<SumColumn>)>,
    {
        let mut table = self.clone();
        for (name, columns) in extra {
            let key = normalize_name(name);
            let section = table.entries.get(&key).and_then(|n| n.section);
            table.entries.insert(
                key,
                Named {
                    display: name.trim().to_string(),
                    section,
                    columns: columns.iter().copied().collect(),
                },
            );
        }
        table
    }

    /// Columns summed for a subsection
    ///
    /// `first_item` is the type of the subsection's first data row; it only
    /// matters for the few shared subsections with overrides. Unknown names
    /// fall back to [`RuleTable::section_default`].
    pub fn lookup(&self, section: Section, subsection: &str, first_item: Option<ItemType>) -> Rule {
        let key = normalize_name(subsection);
        if let Some(item_type) = first_item {
            if let Some(&columns) = self.overrides.get(&(key.clone(), item_type)) {
                return Rule {
                    columns,
                    source: RuleSource::Override,
                };
            }
        }
        if let Some(named) = self.entries.get(&key) {
            return Rule {
                columns: named.columns,
                source: RuleSource::Entry,
            };
        }
        let columns = Self::section_default(section);
        debug!(%section, subsection, %columns, "no aggregation rule, using section default");
        Rule {
            columns,
            source: RuleSource::SectionDefault,
        }
    }

    /// Fallback columns for subsections the table does not name
    pub fn section_default(section: Section) -> ColumnSet {
        match section {
            Section::Demolition | Section::Excavation | Section::RockExcavation => {
                ColumnSet::of(&[Sqft, Cy])
            }
            Section::Soe => ColumnSet::of(&[Ft, Lbs, Qty]),
            Section::Foundation => ColumnSet::of(&[Sqft, Cy, Qty]),
            Section::Waterproofing => ColumnSet::of(&[Sqft]),
        }
    }

    /// Every entry then every override, in a stable order
    pub fn entries(&self) -> Vec<RuleEntry> {
        let mut out: Vec<RuleEntry> = self
            .entries
            .values()
            .map(|named| RuleEntry {
                section: named.section,
                subsection: named.display.clone(),
                item_type: None,
                columns: named.columns,
            })
            .collect();
        out.sort_by(|a, b| a.section.cmp(&b.section).then(a.subsection.cmp(&b.subsection)));
        for ((key, item_type), &columns) in &self.overrides {
            let named = self.entries.get(key);
            out.push(RuleEntry {
                section: named.and_then(|n| n.section),
                subsection: named.map_or_else(|| key.clone(), |n| n.display.clone()),
                item_type: Some(*item_type),
                columns,
            });
        }
        out
    }

    /// Number of subsection entries (overrides excluded)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no subsection entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
