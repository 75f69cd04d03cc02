//! Proposal synthesis
//!
//! One [`ProposalLine`] per group: a sentence filled from the group's
//! averaged dimensions, plus formulas that point at the group's totals on
//! the calculation sheet. Quantities are never copied as numbers.

use std::collections::BTreeMap;

use lazy_regex::{lazy_regex, Lazy, Regex};
use regex::Captures;
use serde::Serialize;
use takeoff_core::{CellWrite, Column, ColumnSet, RowKind, SumColumn, Worksheet};
use takeoff_formula::format_number;
use tracing::warn;

use crate::assign::style_for;
use crate::classify::Builder;
use crate::dims::{format_feet_inches, round_up_to_multiple, weighted_average};
use crate::extract::{extract, PartialDimensions};
use crate::group::{Family, Group, SumAnchor};
use crate::item::{ItemType, ParsedItem, Section};
use crate::options::EngineOptions;
use crate::pipeline::{PipelineContext, SkippedWrite};
use crate::rules::normalize_name;

/// Columns a proposal line may reference
pub const PROPOSAL_COLUMNS: ColumnSet =
    ColumnSet::of(&[SumColumn::Ft, SumColumn::Lbs, SumColumn::Qty]);

static OPTIONAL: Lazy<Regex> = lazy_regex!(r"<([^<>]*)>");
static TOKEN: Lazy<Regex> = lazy_regex!(r"\{([A-Z]+)\}");

/// A token that could not be filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedPlaceholder {
    pub section: Section,
    pub subsection: String,
    /// First row of the group the line describes
    pub row: u32,
    pub token: String,
}

/// One line of the proposal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalLine {
    pub section: Section,
    pub subsection: String,
    pub family: Family,
    pub text: String,
    pub reference: String,
    pub anchor: SumAnchor,
    /// Formula per referenced column, e.g. `FT` → `='Calculations Sheet'!I12`
    pub cells: BTreeMap<SumColumn, String>,
    pub unresolved: Vec<UnresolvedPlaceholder>,
}

impl ProposalLine {
    /// Formula for a column, if the line references it
    pub fn formula(&self, column: SumColumn) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }
}

fn template(family: Family) -> &'static str {
    match family {
        Family::DrilledSoldierPile => {
            "F&I new ({N})no drilled soldier piles ({D}\" Ø x{T}\" thick) (H={H}<, RS={RS}>, E={E}) as per {REF}"
        }
        Family::HpSoldierPile => "F&I new ({N})no {HP} soldier piles (H={H}, E={E}) as per {REF}",
        Family::SecantPile => "F&I new ({N})no {D}\" Ø secant piles (H={H}<, RS={RS}>) as per {REF}",
        Family::TangentPile => "F&I new ({N})no {D}\" Ø tangent piles (H={H}<, RS={RS}>) as per {REF}",
        Family::SheetPile => "F&I new sheet piles (H={H}<, E={E}>) as per {REF}",
        Family::Lagging => "F&I new timber lagging (H={H}) as per {REF}",
        Family::Anchor => "F&I new ({N})no {NOUN} (L={L}<, B={B}><, RS={RS}><, {BAR} bar>) as per {REF}",
        Family::BracingMember => "F&I new ({N})no {NOUN}< ({W})> as per {REF}",
        Family::DrilledFoundationPile => {
            "F&I new ({N})no drilled foundation piles ({D}\" Ø x{T}\" thick) (H={H}<, RS={RS}>) as per {REF}"
        }
        Family::HelicalPile => "F&I new ({N})no helical piles (H={H}) as per {REF}",
        Family::DrivenPile => "F&I new ({N})no {HP} driven piles (H={H}) as per {REF}",
        Family::Shotcrete => "F&I new shotcrete (H={H}) as per {REF}",
        Family::HeelBlock => "F&I new ({N})no heel blocks as per {REF}",
        Family::Underpinning => "F&I new underpinning (H={H}) as per {REF}",
        Family::Waterproofing | Family::Generic => "F&I new {NOUN} as per {REF}",
    }
}

fn noun(group: &Group) -> String {
    match group.first_item_type() {
        Some(ItemType::TieBackAnchor) => "tie-back anchors".to_string(),
        Some(ItemType::RockAnchor) => "rock anchors".to_string(),
        Some(ItemType::RockBolt) => "rock bolts".to_string(),
        Some(ItemType::Waler) => "walers".to_string(),
        Some(ItemType::Raker) => "rakers".to_string(),
        Some(ItemType::Strut) => "struts".to_string(),
        _ => {
            let name = normalize_name(&group.subsection);
            if name.is_empty() {
                group.family.name().to_string()
            } else {
                name
            }
        }
    }
}

/// Per-item values the averages are taken over
struct Measured<'a> {
    item: &'a ParsedItem,
    dims: PartialDimensions,
}

impl Measured<'_> {
    /// Takeoff quantity; items without one stay out of the averages
    fn weight(&self) -> Option<f64> {
        self.item.data.takeoff
    }

    fn height(&self) -> Option<f64> {
        self.item.data.height.or(self.dims.height_ft)
    }
}

/// Fill the token map for a group
fn tokens(group: &Group, ctx: &PipelineContext) -> BTreeMap<&'static str, String> {
    let step = ctx.options().rounding_step_ft;
    let measured: Vec<Measured<'_>> = group
        .items
        .iter()
        .map(|item| Measured {
            item,
            dims: extract(&item.particulars),
        })
        .collect();

    let average = |value: &dyn Fn(&Measured<'_>) -> Option<f64>| -> Option<String> {
        let avg = weighted_average(
            measured
                .iter()
                .filter_map(|m| Some((value(m)?, m.weight()?))),
        )?;
        Some(format_feet_inches(round_up_to_multiple(avg, step)))
    };
    let first = |value: &dyn Fn(&PartialDimensions) -> Option<String>| -> Option<String> {
        measured.iter().find_map(|m| value(&m.dims))
    };

    let mut tokens: BTreeMap<&'static str, String> = BTreeMap::new();
    let mut put = |key: &'static str, value: Option<String>| {
        if let Some(value) = value {
            tokens.insert(key, value);
        }
    };

    let counts: Vec<f64> = group.items.iter().filter_map(ParsedItem::count).collect();
    put(
        "N",
        (!counts.is_empty()).then(|| {
            let total: f64 = counts.iter().sum();
            format_number((total * 100.0).round() / 100.0)
        }),
    );
    put("H", average(&|m: &Measured<'_>| m.height()));
    put("E", average(&|m: &Measured<'_>| m.dims.embedment_ft));
    put("RS", average(&|m: &Measured<'_>| m.dims.rock_socket_ft));
    put("L", average(&|m: &Measured<'_>| m.dims.length_ft));
    put("B", average(&|m: &Measured<'_>| m.dims.bond_ft));
    put("D", first(&|d: &PartialDimensions| d.diameter_in.map(format_number)));
    put("T", first(&|d: &PartialDimensions| d.thickness_in.map(format_number)));
    put("HP", first(&|d: &PartialDimensions| d.hp_section().map(str::to_string)));
    put("W", first(&|d: &PartialDimensions| d.wide_flange.as_ref().map(|s| s.designation.clone())));
    put("BAR", first(&|d: &PartialDimensions| d.bar_size.map(|b| format!("#{}", b))));
    put("NOUN", Some(noun(group)));
    put("REF", Some(reference(group.family, ctx)));
    tokens
}

/// Reference code for a family, falling back to the configured default
fn reference(family: Family, ctx: &PipelineContext) -> String {
    ctx.records()
        .reference_for(family)
        .map(str::to_string)
        .unwrap_or_else(|| ctx.options().default_reference.clone())
}

/// Render a template
///
/// `<...>` segments are dropped unless every token inside them is known.
/// Remaining unknown tokens become `placeholder` and are returned.
pub fn render(
    template: &str,
    tokens: &BTreeMap<&'static str, String>,
    placeholder: &str,
) -> (String, Vec<String>) {
    let text = OPTIONAL.replace_all(template, |caps: &Captures<'_>| {
        let inner = &caps[1];
        if TOKEN
            .captures_iter(inner)
            .all(|t| tokens.contains_key(&t[1]))
        {
            inner.to_string()
        } else {
            String::new()
        }
    });

    let mut missing = Vec::new();
    let text = TOKEN.replace_all(&text, |caps: &Captures<'_>| {
        match tokens.get(&caps[1]) {
            Some(value) => value.clone(),
            None => {
                missing.push(caps[1].to_string());
                placeholder.to_string()
            }
        }
    });
    (text.into_owned(), missing)
}

/// Build the proposal line for one group
pub fn synthesize(group: &Group, ctx: &PipelineContext) -> ProposalLine {
    let options = ctx.options();
    let tokens = tokens(group, ctx);
    let (text, missing) = render(template(group.family), &tokens, &options.placeholder);

    let unresolved: Vec<UnresolvedPlaceholder> = missing
        .into_iter()
        .map(|token| {
            warn!(
                section = %group.section,
                subsection = %group.subsection,
                row = group.first_row(),
                %token,
                "unresolved proposal placeholder"
            );
            UnresolvedPlaceholder {
                section: group.section,
                subsection: group.subsection.clone(),
                row: group.first_row(),
                token,
            }
        })
        .collect();

    let rule = ctx
        .rules()
        .lookup(group.section, &group.subsection, group.first_item_type());
    let mut cells = BTreeMap::new();
    for column in rule.columns.iter().filter(|c| PROPOSAL_COLUMNS.contains(*c)) {
        match group.anchor.reference(&options.calculation_sheet, column.column()) {
            Ok(expr) => {
                cells.insert(column, expr.to_formula_string());
            }
            Err(e) => warn!(%column, error = %e, "cannot reference group total"),
        }
    }

    ProposalLine {
        section: group.section,
        subsection: group.subsection.clone(),
        family: group.family,
        text,
        reference: tokens.get("REF").cloned().unwrap_or_default(),
        anchor: group.anchor,
        cells,
        unresolved,
    }
}

/// Lay proposal lines out on a worksheet
///
/// Each section gets a header row in A, each line its text in B and its
/// formulas in the referenced columns, and a blank row closes the section.
/// A row or cell the sheet refuses is recorded in `skipped`.
pub fn layout(
    lines: &[ProposalLine],
    options: &EngineOptions,
    skipped: &mut Vec<SkippedWrite>,
) -> Worksheet {
    let mut sheet = Worksheet::new(options.proposal_sheet.as_str());
    let mut row = options.proposal_start_row;
    let mut current: Option<Section> = None;

    for line in lines {
        if current != Some(line.section) {
            if current.is_some() {
                claim(&mut sheet, row, RowKind::Blank, skipped);
                row += 1;
            }
            if claim(&mut sheet, row, RowKind::SectionHeader, skipped) {
                sheet.set_row_style(row, style_for(line.section, Builder::SectionHeader));
                put(&mut sheet, row, Column::A, CellWrite::value(line.section.title()), skipped);
            }
            row += 1;
            current = Some(line.section);
        }

        if claim(&mut sheet, row, RowKind::Data, skipped) {
            put(&mut sheet, row, Column::B, CellWrite::value(line.text.as_str()), skipped);
            for (column, formula) in &line.cells {
                put(&mut sheet, row, column.column(), CellWrite::formula(formula.as_str()), skipped);
            }
        }
        row += 1;
    }
    sheet
}

fn claim(sheet: &mut Worksheet, row: u32, kind: RowKind, skipped: &mut Vec<SkippedWrite>) -> bool {
    match sheet.mark_row(row, kind) {
        Ok(()) => true,
        Err(e) => {
            skipped.push(SkippedWrite::new(row, None, e.to_string()));
            false
        }
    }
}

fn put(sheet: &mut Worksheet, row: u32, column: Column, write: CellWrite, skipped: &mut Vec<SkippedWrite>) {
    if let Err(e) = sheet.write(row, column, write) {
        skipped.push(SkippedWrite::new(row, Some(column), e.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(pairs: &[(&'static str, &str)]) -> BTreeMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_fills_tokens() {
        let (text, missing) = render(
            "({N})no {HP} soldier piles (H={H}, E={E})",
            &tokens(&[("N", "5"), ("HP", "HP12x63"), ("H", "25'-0\""), ("E", "15'-0\"")]),
            "#",
        );
        assert_eq!(text, "(5)no HP12x63 soldier piles (H=25'-0\", E=15'-0\")");
        assert!(missing.is_empty());
    }

    #[test]
    fn test_render_marks_unknown_tokens() {
        let (text, missing) = render("(H={H}, E={E})", &tokens(&[("H", "25'-0\"")]), "#");
        assert_eq!(text, "(H=25'-0\", E=#)");
        assert_eq!(missing, vec!["E".to_string()]);
    }

    #[test]
    fn test_render_drops_optional_segments() {
        let template = "(H={H}<, RS={RS}>)";
        let (text, missing) = render(template, &tokens(&[("H", "20'-0\"")]), "#");
        assert_eq!(text, "(H=20'-0\")");
        assert!(missing.is_empty());

        let (text, _) = render(template, &tokens(&[("H", "20'-0\""), ("RS", "5'-0\"")]), "#");
        assert_eq!(text, "(H=20'-0\", RS=5'-0\")");
    }

    #[test]
    fn test_every_family_has_a_template_with_a_reference() {
        let families = [
            Family::DrilledSoldierPile,
            Family::HpSoldierPile,
            Family::SecantPile,
            Family::TangentPile,
            Family::SheetPile,
            Family::Lagging,
            Family::Anchor,
            Family::BracingMember,
            Family::DrilledFoundationPile,
            Family::HelicalPile,
            Family::DrivenPile,
            Family::Shotcrete,
            Family::HeelBlock,
            Family::Underpinning,
            Family::Waterproofing,
            Family::Generic,
        ];
        for family in families {
            assert!(template(family).ends_with("as per {REF}"), "{}", family);
        }
    }
}
