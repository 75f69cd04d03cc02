//! End-to-end runs of the calculation pass

use pretty_assertions::assert_eq;
use takeoff::group::SumAnchor;
use takeoff::prelude::*;
use takeoff::schedule::{flush, RowSpan, Scheduler};
use takeoff::{EngineError, StyleIntent};
use takeoff_formula::builder::{column_range, sum};

fn heel_blocks() -> Vec<ParsedItem> {
    vec![
        ParsedItem::new(Section::Soe, "", ItemType::SectionHeader, 8, "SOE"),
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

fn run(items: &[ParsedItem]) -> PipelineOutput {
    Pipeline::new(EngineOptions::default())
        .run(Vec::new(), items)
        .unwrap()
}

#[test]
fn test_heel_blocks_sum_only_their_columns() {
    let output = run(&heel_blocks());
    let sheet = output.calculation_sheet().unwrap();

    assert_eq!(sheet.formula(12, Column::L), Some("=SUM(L10:L11)"));
    assert_eq!(sheet.formula(12, Column::M), Some("=SUM(M10:M11)"));
    assert_eq!(sheet.get(12, Column::I), None);
    assert_eq!(sheet.get(12, Column::J), None);
    assert_eq!(sheet.get(12, Column::K), None);

    assert_eq!(sheet.formula(10, Column::J), Some("=F10*G10*C10"));
    assert_eq!(sheet.formula(10, Column::L), Some("=J10*H10/27"));
    assert_eq!(sheet.formula(10, Column::M), Some("=C10"));
    assert!(output.skipped.is_empty());
}

#[test]
fn test_row_kinds_and_styles() {
    let output = run(&heel_blocks());
    let sheet = output.calculation_sheet().unwrap();

    assert_eq!(sheet.row_kind(8), Some(RowKind::SectionHeader));
    assert_eq!(sheet.row_kind(9), Some(RowKind::SubsectionHeader));
    assert_eq!(sheet.row_kind(10), Some(RowKind::Data));
    assert_eq!(sheet.row_kind(12), Some(RowKind::Sum));
    assert_eq!(sheet.row_kind(13), None);

    assert!(sheet.row_style(12).bold);
    assert_eq!(sheet.row_style(10), StyleIntent::new());
}

#[test]
fn test_missing_dimension_leaves_blank() {
    let items = vec![
        ParsedItem::new(Section::Soe, "Heel blocks", ItemType::HeelBlock, 10, "Heel block")
            .takeoff(3.0)
            .dims(Some(4.0), Some(4.0), None),
        ParsedItem::new(Section::Soe, "Heel blocks", ItemType::Sum, 11, ""),
    ];
    let output = run(&items);
    let sheet = output.calculation_sheet().unwrap();

    assert_eq!(sheet.get(10, Column::H), None);
    assert_eq!(sheet.formula(10, Column::J), Some("=F10*G10*C10"));
    assert_eq!(sheet.get(10, Column::L), None);
    assert_eq!(sheet.formula(11, Column::L), Some("=SUM(L10)"));
}

#[test]
fn test_stair_landing_sum_is_deferred_then_flushed() {
    let items = vec![
        ParsedItem::new(Section::Foundation, "Stairs on grade", ItemType::SubsectionHeader, 30, "Stairs on grade"),
        ParsedItem::new(Section::Foundation, "Stairs on grade", ItemType::StairOnGrade, 31, "Stair on grade")
            .takeoff(2.0)
            .dims(Some(4.0), Some(10.0), Some(0.5)),
        ParsedItem::new(Section::Foundation, "Stairs on grade", ItemType::StairLanding, 32, "Landing")
            .takeoff(40.0)
            .dims(None, None, Some(0.67)),
        ParsedItem::new(Section::Foundation, "Stairs on grade", ItemType::Sum, 33, ""),
    ];
    let output = run(&items);
    let sheet = output.calculation_sheet().unwrap();

    assert_eq!(sheet.formula(33, Column::L), Some("=SUM(L31:L32)"));
    assert_eq!(sheet.formula(33, Column::M), Some("=SUM(M31:M32)"));
    assert_eq!(sheet.formula(32, Column::J), Some("=C32"));
    assert_eq!(sheet.formula(32, Column::L), Some("=J32*H32/27"));
}

fn strip_footings(header: u32, data: &[u32], sum: u32) -> Vec<ParsedItem> {
    let name = "Strip footings";
    let mut items = vec![ParsedItem::new(Section::Foundation, name, ItemType::SubsectionHeader, header, name)];
    items.extend(data.iter().map(|&row| {
        ParsedItem::new(Section::Foundation, name, ItemType::StripFooting, row, format!("SF-{}", row))
            .takeoff(25.0)
            .dims(None, Some(2.0), Some(1.0))
    }));
    items.push(ParsedItem::new(Section::Foundation, name, ItemType::Sum, sum, ""));
    items
}

#[test]
fn test_repeated_subsection_name_sums_each_run() {
    let mut items = strip_footings(9, &[10, 11], 12);
    items.extend(strip_footings(13, &[14], 15));
    let output = run(&items);
    let sheet = output.calculation_sheet().unwrap();

    assert_eq!(sheet.formula(12, Column::I), Some("=SUM(I10:I11)"));
    assert_eq!(sheet.formula(12, Column::L), Some("=SUM(L10:L11)"));
    assert_eq!(sheet.formula(15, Column::I), Some("=SUM(I14)"));
    assert_eq!(sheet.formula(15, Column::L), Some("=SUM(L14)"));
    assert!(output.skipped.is_empty());

    let anchors: Vec<SumAnchor> = output.proposal.iter().map(|l| l.anchor).collect();
    assert_eq!(
        anchors,
        vec![SumAnchor::Subsection { row: 12 }, SumAnchor::Subsection { row: 15 }]
    );
    assert_eq!(
        output.proposal[0].formula(SumColumn::Ft),
        Some("='Calculations Sheet'!I12")
    );
    assert_eq!(
        output.proposal[1].formula(SumColumn::Ft),
        Some("='Calculations Sheet'!I15")
    );
}

#[test]
fn test_sections_are_processed_in_order() {
    let mut items = vec![
        ParsedItem::new(Section::Waterproofing, "Vapor barrier", ItemType::VaporBarrier, 40, "Vapor barrier")
            .takeoff(1200.0),
        ParsedItem::new(Section::Waterproofing, "Vapor barrier", ItemType::Sum, 41, ""),
    ];
    items.extend(heel_blocks());
    let output = run(&items);

    let sections: Vec<Section> = output.groups.iter().map(|g| g.section).collect();
    assert_eq!(sections, vec![Section::Soe, Section::Waterproofing]);
    let sheet = output.calculation_sheet().unwrap();
    assert_eq!(sheet.formula(41, Column::J), Some("=SUM(J40)"));
}

#[test]
fn test_unknown_combination_aborts() {
    let items = vec![ParsedItem::new(Section::Excavation, "Excavation", ItemType::HeelBlock, 5, "Heel block")];
    match Pipeline::default().run(Vec::new(), &items) {
        Err(EngineError::NoBuilder { section, item_type }) => {
            assert_eq!(section, Section::Excavation);
            assert_eq!(item_type, ItemType::HeelBlock);
        }
        other => panic!("expected NoBuilder, got {:?}", other.map(|o| o.skipped)),
    }
}

#[test]
fn test_invalid_options_abort() {
    let options = EngineOptions {
        rounding_step_ft: 0.0,
        ..EngineOptions::default()
    };
    assert!(Pipeline::new(options).run(Vec::new(), &heel_blocks()).is_err());
}

#[test]
fn test_unresolved_dependency_surfaces_from_flush() {
    let mut scheduler = Scheduler::new();
    let formula = sum(vec![column_range(Column::L, 10, 11).unwrap()]);
    assert!(scheduler.submit_sum(12, Column::L, formula, RowSpan::new(10, 11), vec![10, 11]));
    let pass = scheduler.finish();

    let mut sheet = Worksheet::new("Calculations Sheet");
    sheet.mark_row(10, RowKind::Data).unwrap();
    let err = flush(&sheet, pass.deferred).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Deferred write L12 depends on unwritten rows [11]"
    );
}

#[test]
fn test_runs_are_idempotent() {
    let mut items = heel_blocks();
    items.push(
        ParsedItem::new(Section::Foundation, "Helical piles", ItemType::HelicalPile, 20, "Helical pile H=30'")
            .takeoff(6.0),
    );
    items.push(ParsedItem::new(Section::Foundation, "Helical piles", ItemType::Sum, 21, ""));

    let first = run(&items);
    let second = run(&items);
    assert_eq!(first.workbook, second.workbook);
    assert_eq!(first.proposal, second.proposal);
    assert_eq!(first.skipped, second.skipped);
}
