//! Pipeline
//!
//! One run turns raw records plus parsed items into a calculation sheet, a
//! group index and the proposal. All state of a run lives in its
//! [`PipelineContext`]; two runs over the same input produce the same
//! writes.

use ahash::AHashMap;
use serde::Serialize;
use takeoff_core::{Column, TakeoffRecord, Workbook, Worksheet};
use tracing::{debug, info, warn};

use crate::assign::{assign, sum_formulas};
use crate::classify::{classify, Builder, Phase, Route};
use crate::error::Result;
use crate::extract::extract;
use crate::group::{subsection_runs, GroupIndex};
use crate::item::{ItemType, ParsedItem, Section};
use crate::options::EngineOptions;
use crate::proposal::{layout, synthesize, ProposalLine, UnresolvedPlaceholder};
use crate::reference::RecordIndex;
use crate::rules::RuleTable;
use crate::schedule::{flush, MainPass, RowSpan, ScheduledWrite, Scheduler};

/// A write that was dropped without aborting the pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedWrite {
    pub row: u32,
    /// `None` when the whole row was dropped
    pub column: Option<Column>,
    pub reason: String,
}

impl SkippedWrite {
    pub(crate) fn new(row: u32, column: Option<Column>, reason: impl Into<String>) -> Self {
        let skipped = Self {
            row,
            column,
            reason: reason.into(),
        };
        warn!(row, column = ?skipped.column, reason = %skipped.reason, "skipped write");
        skipped
    }
}

/// Everything a run needs and produces
#[derive(Debug)]
pub struct PipelineContext {
    options: EngineOptions,
    rules: RuleTable,
    records: RecordIndex,
    workbook: Workbook,
    groups: GroupIndex,
}

impl PipelineContext {
    /// Fresh context for one run
    pub fn new(options: EngineOptions, records: Vec<TakeoffRecord>) -> Self {
        let rules = RuleTable::standard().extend(&options.extra_rules);
        Self {
            options,
            rules,
            records: RecordIndex::new(records),
            workbook: Workbook::new(),
            groups: GroupIndex::default(),
        }
    }

    /// Options of the run
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Aggregation rules in effect
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Raw records
    pub fn records(&self) -> &RecordIndex {
        &self.records
    }

    /// Workbook built so far
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Groups of the finalized calculation sheet
    pub fn groups(&self) -> &GroupIndex {
        &self.groups
    }
}

/// Result of a run
#[derive(Debug)]
pub struct PipelineOutput {
    /// Calculation sheet followed by proposal sheet
    pub workbook: Workbook,
    pub groups: GroupIndex,
    pub proposal: Vec<ProposalLine>,
    pub skipped: Vec<SkippedWrite>,
}

impl PipelineOutput {
    /// The calculation worksheet
    pub fn calculation_sheet(&self) -> Option<&Worksheet> {
        self.workbook.worksheet(0)
    }

    /// The proposal worksheet
    pub fn proposal_sheet(&self) -> Option<&Worksheet> {
        self.workbook.worksheet(1)
    }

    /// Every unresolved placeholder across all proposal lines
    pub fn unresolved(&self) -> impl Iterator<Item = &UnresolvedPlaceholder> {
        self.proposal.iter().flat_map(|line| line.unresolved.iter())
    }
}

/// Data rows of one subsection
#[derive(Debug, Clone, Default)]
struct SubsectionRows {
    rows: Vec<u32>,
    first_item: Option<ItemType>,
}

impl SubsectionRows {
    fn span(&self) -> Option<RowSpan> {
        let first = self.rows.iter().min()?;
        let last = self.rows.iter().max()?;
        Some(RowSpan::new(*first, *last))
    }
}

/// Runs the engines in order
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: EngineOptions,
}

impl Pipeline {
    /// Create a pipeline with the given options
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Options the pipeline runs with
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Run the full pass
    ///
    /// Structural problems (an item type with no builder, a deferred sum
    /// that never resolves) abort with an error. Per-cell failures are
    /// collected in [`PipelineOutput::skipped`].
    pub fn run(&self, records: Vec<TakeoffRecord>, items: &[ParsedItem]) -> Result<PipelineOutput> {
        self.options.validate()?;
        let mut ctx = PipelineContext::new(self.options.clone(), records);
        let mut skipped = Vec::new();

        // sections in fixed order, source order within a section
        let mut ordered: Vec<&ParsedItem> = items.iter().collect();
        ordered.sort_by_key(|item| item.section);

        let pass = main_pass(&ctx, &ordered, &mut skipped)?;
        info!(
            rows = pass.rows.len(),
            writes = pass.writes.len(),
            deferred = pass.deferred.len(),
            "main pass complete"
        );

        let mut sheet = Worksheet::new(ctx.options.calculation_sheet.as_str());
        apply_rows(&mut sheet, &pass, &mut skipped);
        apply_writes(&mut sheet, pass.writes, &mut skipped);
        let flushed = flush(&sheet, pass.deferred)?;
        apply_writes(&mut sheet, flushed, &mut skipped);

        let sorted: Vec<ParsedItem> = ordered.into_iter().cloned().collect();
        ctx.groups = GroupIndex::build(&sheet, &sorted);
        ctx.workbook.add_existing_worksheet(sheet)?;

        let proposal: Vec<ProposalLine> = ctx.groups.iter().map(|g| synthesize(g, &ctx)).collect();
        let proposal_sheet = layout(&proposal, &ctx.options, &mut skipped);
        ctx.workbook.add_existing_worksheet(proposal_sheet)?;

        let unresolved: usize = proposal.iter().map(|l| l.unresolved.len()).sum();
        info!(
            groups = ctx.groups.len(),
            lines = proposal.len(),
            unresolved,
            skipped = skipped.len(),
            "pipeline complete"
        );

        Ok(PipelineOutput {
            workbook: ctx.workbook,
            groups: ctx.groups,
            proposal,
            skipped,
        })
    }
}

/// Classify and assign every item, primary rows before trailing ones
fn main_pass(
    ctx: &PipelineContext,
    ordered: &[&ParsedItem],
    skipped: &mut Vec<SkippedWrite>,
) -> Result<MainPass> {
    let mut routed: Vec<(&ParsedItem, Route)> = Vec::with_capacity(ordered.len());
    for &item in ordered {
        routed.push((item, classify(item.section, item.item_type)?));
    }

    // keyed by the closing sum row, so a repeated name sums only its own rows
    let subsections: AHashMap<u32, SubsectionRows> = subsection_runs(ordered.iter().copied())
        .into_iter()
        .filter_map(|run| {
            let sum_row = run.sum_row?;
            let mut rows = SubsectionRows::default();
            for item in run.data_items() {
                rows.rows.push(item.row);
                rows.first_item.get_or_insert(item.item_type);
            }
            Some((sum_row, rows))
        })
        .collect();

    let mut scheduler = Scheduler::new();
    for section in Section::ORDER {
        for phase in [Phase::Primary, Phase::Trailing] {
            let batch = routed
                .iter()
                .filter(|(item, route)| item.section == section && route.phase == phase);
            for &(item, route) in batch {
                let dims = extract(&item.particulars);
                let writes = match assign(item.row, route.builder, item, &dims) {
                    Ok(writes) => writes,
                    Err(e) => {
                        skipped.push(SkippedWrite::new(item.row, None, e.to_string()));
                        continue;
                    }
                };
                scheduler.push_row(writes);

                if route.builder == Builder::Sum {
                    let rows = subsections.get(&item.row).cloned().unwrap_or_default();
                    submit_sums(ctx, &mut scheduler, item, &rows, skipped);
                }
            }
        }
    }
    Ok(scheduler.finish())
}

fn submit_sums(
    ctx: &PipelineContext,
    scheduler: &mut Scheduler,
    item: &ParsedItem,
    rows: &SubsectionRows,
    skipped: &mut Vec<SkippedWrite>,
) {
    let Some(span) = rows.span() else {
        skipped.push(SkippedWrite::new(
            item.row,
            None,
            format!("subsection '{}' has no data rows to sum", item.subsection),
        ));
        return;
    };
    if span.contains(item.row) {
        skipped.push(SkippedWrite::new(
            item.row,
            None,
            format!("sum row lies inside its own range {}..={}", span.first, span.last),
        ));
        return;
    }

    let rule = ctx.rules.lookup(item.section, &item.subsection, rows.first_item);
    debug!(
        row = item.row,
        subsection = %item.subsection,
        columns = %rule.columns,
        source = ?rule.source,
        "sum row"
    );
    match sum_formulas(span.first, span.last, rule.columns) {
        Ok(formulas) => {
            for (column, formula) in formulas {
                scheduler.submit_sum(item.row, column, formula, span, rows.rows.clone());
            }
        }
        Err(e) => skipped.push(SkippedWrite::new(item.row, None, e.to_string())),
    }
}

fn apply_rows(sheet: &mut Worksheet, pass: &MainPass, skipped: &mut Vec<SkippedWrite>) {
    for claim in &pass.rows {
        match sheet.mark_row(claim.row, claim.kind) {
            Ok(()) => {
                if !claim.style.is_plain() {
                    sheet.set_row_style(claim.row, claim.style);
                }
            }
            Err(e) => skipped.push(SkippedWrite::new(claim.row, None, e.to_string())),
        }
    }
}

fn apply_writes(
    sheet: &mut Worksheet,
    writes: Vec<ScheduledWrite>,
    skipped: &mut Vec<SkippedWrite>,
) {
    for w in writes {
        // a row that lost its claim keeps none of its cells
        if sheet.row_kind(w.row).is_none() {
            skipped.push(SkippedWrite::new(w.row, Some(w.column), "row was not claimed"));
            continue;
        }
        if let Err(e) = sheet.write(w.row, w.column, w.write) {
            skipped.push(SkippedWrite::new(w.row, Some(w.column), e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use takeoff_core::RowKind;

    fn heel_items() -> Vec<ParsedItem> {
        vec![
            ParsedItem::new(Section::Soe, "Heel blocks", ItemType::SubsectionHeader, 9, "Heel blocks"),
            ParsedItem::new(Section::Soe, "Heel blocks", ItemType::HeelBlock, 10, "Heel block 4'x4'")
                .takeoff(3.0)
                .dims(Some(4.0), Some(4.0), Some(2.0)),
            ParsedItem::new(Section::Soe, "Heel blocks", ItemType::HeelBlock, 11, "Heel block 5'x5'")
                .takeoff(5.0)
                .dims(Some(5.0), Some(5.0), Some(2.0)),
            ParsedItem::new(Section::Soe, "Heel blocks", ItemType::Sum, 12, ""),
        ]
    }

    #[test]
    fn test_context_uses_extra_rules() {
        let mut options = EngineOptions::default();
        options
            .extra_rules
            .insert("Heel blocks".to_string(), vec![takeoff_core::SumColumn::Cy]);
        let ctx = PipelineContext::new(options, Vec::new());
        let rule = ctx.rules().lookup(Section::Soe, "Heel blocks", None);
        assert_eq!(rule.columns.len(), 1);
    }

    #[test]
    fn test_sum_without_data_rows_is_skipped() {
        let items = vec![
            ParsedItem::new(Section::Soe, "Rakers", ItemType::SubsectionHeader, 1, "Rakers"),
            ParsedItem::new(Section::Soe, "Rakers", ItemType::Sum, 2, ""),
        ];
        let output = Pipeline::default().run(Vec::new(), &items).unwrap();
        assert_eq!(output.skipped.len(), 1);
        assert_eq!(output.skipped[0].row, 2);
        let sheet = output.calculation_sheet().unwrap();
        assert_eq!(sheet.row_kind(2), Some(RowKind::Sum));
        assert_eq!(sheet.row_cells(2).count(), 0);
    }

    #[test]
    fn test_conflicting_rows_are_skipped_not_fatal() {
        let mut items = heel_items();
        items.push(
            ParsedItem::new(Section::Soe, "Heel blocks", ItemType::SubsectionHeader, 10, "Again"),
        );
        let output = Pipeline::default().run(Vec::new(), &items).unwrap();
        assert!(output.skipped.iter().any(|s| s.row == 10));
        let sheet = output.calculation_sheet().unwrap();
        assert_eq!(sheet.row_kind(10), Some(RowKind::Data));
        assert_eq!(sheet.formula(12, Column::M), Some("=SUM(M10:M11)"));
    }

    #[test]
    fn test_output_sheets() {
        let output = Pipeline::default().run(Vec::new(), &heel_items()).unwrap();
        assert_eq!(output.calculation_sheet().unwrap().name(), "Calculations Sheet");
        assert_eq!(output.proposal_sheet().unwrap().name(), "Proposal Sheet");
        assert_eq!(output.proposal.len(), 1);
    }
}
