//! Grouping engine
//!
//! Partitions a subsection's data rows into groups. A blank-particulars row
//! closes the current group; afterwards, runs of different families that
//! share one subsection header (drilled vs. HP piles) are split apart by
//! description pattern.

use std::fmt;

use serde::Serialize;
use takeoff_core::{Column, RowKind, Worksheet};
use takeoff_formula::builder::{sheet_cell, sheet_range, sum};
use takeoff_formula::{FormulaExpr, FormulaResult};
use tracing::debug;

use crate::extract::is_hp_section;
use crate::item::{ItemType, ParsedItem, Section};

/// Item family, the unit a proposal line describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    DrilledSoldierPile,
    HpSoldierPile,
    SecantPile,
    TangentPile,
    SheetPile,
    Lagging,
    Anchor,
    BracingMember,
    DrilledFoundationPile,
    HelicalPile,
    DrivenPile,
    Shotcrete,
    HeelBlock,
    Underpinning,
    Waterproofing,
    Generic,
}

impl Family {
    /// Family of one item, looking at its description where types are shared
    pub fn of(item: &ParsedItem) -> Family {
        use ItemType as T;

        match item.item_type {
            T::DrilledSoldierPile if is_hp_section(&item.particulars) => Family::HpSoldierPile,
            T::DrilledSoldierPile => Family::DrilledSoldierPile,
            T::HpSoldierPile => Family::HpSoldierPile,
            T::PrimarySecantPile | T::SecondarySecantPile => Family::SecantPile,
            T::TangentPile => Family::TangentPile,
            T::SheetPile => Family::SheetPile,
            T::TimberLagging => Family::Lagging,
            T::TieBackAnchor | T::RockAnchor | T::RockBolt => Family::Anchor,
            T::Waler | T::Raker | T::Strut => Family::BracingMember,
            T::DrilledFoundationPile if is_hp_section(&item.particulars) => Family::DrivenPile,
            T::DrilledFoundationPile => Family::DrilledFoundationPile,
            T::HelicalPile => Family::HelicalPile,
            T::DrivenPile => Family::DrivenPile,
            T::Shotcrete => Family::Shotcrete,
            T::HeelBlock => Family::HeelBlock,
            T::Underpinning => Family::Underpinning,
            T::WallWaterproofing
            | T::SlabWaterproofing
            | T::VaporBarrier
            | T::DrainageBoard
            | T::Waterstop => Family::Waterproofing,
            _ => Family::Generic,
        }
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Family::DrilledSoldierPile => "drilled soldier piles",
            Family::HpSoldierPile => "HP soldier piles",
            Family::SecantPile => "secant piles",
            Family::TangentPile => "tangent piles",
            Family::SheetPile => "sheet piles",
            Family::Lagging => "timber lagging",
            Family::Anchor => "anchors",
            Family::BracingMember => "bracing members",
            Family::DrilledFoundationPile => "drilled foundation piles",
            Family::HelicalPile => "helical piles",
            Family::DrivenPile => "driven piles",
            Family::Shotcrete => "shotcrete",
            Family::HeelBlock => "heel blocks",
            Family::Underpinning => "underpinning",
            Family::Waterproofing => "waterproofing",
            Family::Generic => "items",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a group's totals live on the calculation sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SumAnchor {
    /// The subsection's sum row, when the group is the whole subsection
    Subsection { row: u32 },
    /// The group's own rows, summed in place
    Trailing { first: u32, last: u32 },
}

impl SumAnchor {
    /// Cross-sheet reference to the group's total in `column`
    ///
    /// ```rust
    /// use takeoff::group::SumAnchor;
    /// use takeoff_core::Column;
    ///
    /// let anchor = SumAnchor::Trailing { first: 10, last: 11 };
    /// let expr = anchor.reference("Calculations Sheet", Column::I).unwrap();
    /// assert_eq!(expr.to_formula_string(), "=SUM('Calculations Sheet'!I10:I11)");
    /// ```
    pub fn reference(&self, sheet: &str, column: Column) -> FormulaResult<FormulaExpr> {
        match *self {
            SumAnchor::Subsection { row } => sheet_cell(sheet, column, row),
            SumAnchor::Trailing { first, last } => {
                Ok(sum(vec![sheet_range(sheet, column, first, last)?]))
            }
        }
    }
}

/// An ordered run of items that becomes one proposal line
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub section: Section,
    pub subsection: String,
    pub family: Family,
    pub items: Vec<ParsedItem>,
    pub anchor: SumAnchor,
}

impl Group {
    fn from_run(items: Vec<ParsedItem>) -> Option<Group> {
        let first = items.first()?;
        let last = items.last()?;
        Some(Group {
            section: first.section,
            subsection: first.subsection.clone(),
            family: Family::of(first),
            anchor: SumAnchor::Trailing {
                first: first.row,
                last: last.row,
            },
            items,
        })
    }

    /// First data row
    pub fn first_row(&self) -> u32 {
        self.items.first().map_or(0, |i| i.row)
    }

    /// Last data row
    pub fn last_row(&self) -> u32 {
        self.items.last().map_or(0, |i| i.row)
    }

    /// Item type of the first row
    pub fn first_item_type(&self) -> Option<ItemType> {
        self.items.first().map(|i| i.item_type)
    }
}

/// Split a subsection's items at blank-particulars rows
///
/// Header and sum rows are ignored; a trailing run closes at the end.
pub fn group<'a, I>(items: I) -> Vec<Group>
where
    I: IntoIterator<Item = &'a ParsedItem>,
{
    group_with(items, ParsedItem::is_blank)
}

/// [`group`] with a custom boundary test
pub fn group_with<'a, I, F>(items: I, is_blank: F) -> Vec<Group>
where
    I: IntoIterator<Item = &'a ParsedItem>,
    F: Fn(&ParsedItem) -> bool,
{
    let mut groups = Vec::new();
    let mut current: Vec<ParsedItem> = Vec::new();

    for item in items {
        if is_blank(item) {
            groups.extend(Group::from_run(std::mem::take(&mut current)));
        } else if item.item_type.is_data() {
            current.push(item.clone());
        }
    }
    groups.extend(Group::from_run(current));
    groups
}

/// Split groups into contiguous runs of a single family
pub fn split_by_family(groups: Vec<Group>) -> Vec<Group> {
    let mut out = Vec::with_capacity(groups.len());
    for group in groups {
        let mut run: Vec<ParsedItem> = Vec::new();
        let mut family = None;
        for item in group.items {
            let item_family = Family::of(&item);
            if family.is_some_and(|f| f != item_family) {
                out.extend(Group::from_run(std::mem::take(&mut run)));
            }
            family = Some(item_family);
            run.push(item);
        }
        out.extend(Group::from_run(run));
    }
    out
}

/// Consecutive items of one subsection, closed by its sum row
///
/// A subsection name can repeat within a section; each occurrence is its own
/// run with its own data rows and sum row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsectionRun<'a> {
    pub section: Section,
    pub subsection: &'a str,
    pub items: Vec<&'a ParsedItem>,
    /// Row of the closing `Sum` item
    pub sum_row: Option<u32>,
    closed: bool,
}

impl<'a> SubsectionRun<'a> {
    fn open(item: &'a ParsedItem) -> Self {
        Self {
            section: item.section,
            subsection: item.subsection.as_str(),
            items: Vec::new(),
            sum_row: None,
            closed: false,
        }
    }

    /// Data items of the run, in source order
    pub fn data_items(&self) -> impl Iterator<Item = &'a ParsedItem> + '_ {
        self.items.iter().copied().filter(|i| i.item_type.is_data())
    }

    fn has_data(&self) -> bool {
        self.data_items().next().is_some()
    }

    fn continues_with(&self, item: &ParsedItem) -> bool {
        if self.closed || self.section != item.section {
            return false;
        }
        match item.item_type {
            ItemType::Blank | ItemType::Sum => true,
            ItemType::SubsectionHeader => !self.has_data() && self.subsection == item.subsection,
            _ => self.subsection == item.subsection,
        }
    }
}

/// Cut section-ordered items into subsection runs
///
/// A run starts at a subsection header, a change of section or subsection
/// name, or the first item after a sum row. Section headers belong to no run.
///
/// ```rust
/// use takeoff::group::subsection_runs;
/// use takeoff::prelude::*;
///
/// let items = vec![
///     ParsedItem::new(Section::Foundation, "Strip footings", ItemType::StripFooting, 10, "SF-1"),
///     ParsedItem::new(Section::Foundation, "Strip footings", ItemType::Sum, 11, ""),
///     ParsedItem::new(Section::Foundation, "Strip footings", ItemType::StripFooting, 12, "SF-2"),
///     ParsedItem::new(Section::Foundation, "Strip footings", ItemType::Sum, 13, ""),
/// ];
/// let runs = subsection_runs(&items);
/// assert_eq!(runs.len(), 2);
/// assert_eq!(runs[1].sum_row, Some(13));
/// ```
pub fn subsection_runs<'a, I>(items: I) -> Vec<SubsectionRun<'a>>
where
    I: IntoIterator<Item = &'a ParsedItem>,
{
    let mut runs: Vec<SubsectionRun<'a>> = Vec::new();
    for item in items {
        if item.item_type == ItemType::SectionHeader {
            if let Some(run) = runs.last_mut() {
                run.closed = true;
            }
            continue;
        }
        if !runs.last().is_some_and(|run| run.continues_with(item)) {
            runs.push(SubsectionRun::open(item));
        }
        if let Some(run) = runs.last_mut() {
            if item.item_type == ItemType::Sum {
                run.sum_row = Some(item.row);
                run.closed = true;
            }
            run.items.push(item);
        }
    }
    runs
}

/// Groups of a finalized calculation sheet, in sheet order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupIndex {
    groups: Vec<Group>,
}

impl GroupIndex {
    /// Group the items of every subsection against the finalized sheet
    ///
    /// Only rows the sheet actually holds as data count; a data row whose
    /// particulars cell ended up empty is a boundary.
    pub fn build(sheet: &Worksheet, items: &[ParsedItem]) -> GroupIndex {
        let mut groups = Vec::new();
        for run in subsection_runs(items) {
            let rows = run.items.iter().copied().filter(|item| {
                item.item_type == ItemType::Blank
                    || (item.item_type.is_data()
                        && sheet.row_kind(item.row) == Some(RowKind::Data))
            });
            let found = split_by_family(group_with(rows, |item| {
                item.is_blank() || sheet.get(item.row, Column::B).is_none()
            }));

            // a sum row that was skipped holds no totals to point at
            let sum_row = run.sum_row.filter(|&row| {
                sheet.row_kind(row) == Some(RowKind::Sum) && sheet.row_cells(row).next().is_some()
            });

            let single = found.len() == 1;
            for mut group in found {
                if let (true, Some(row)) = (single, sum_row) {
                    group.anchor = SumAnchor::Subsection { row };
                }
                debug!(
                    section = %group.section,
                    subsection = %group.subsection,
                    family = %group.family,
                    rows = group.items.len(),
                    anchor = ?group.anchor,
                    "grouped"
                );
                groups.push(group);
            }
        }
        GroupIndex { groups }
    }

    /// All groups
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Iterate over the groups
    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group owning a data row
    pub fn by_row(&self, row: u32) -> Option<&Group> {
        self.groups
            .iter()
            .find(|g| g.items.iter().any(|i| i.row == row))
    }
}
