//! Formula assignment
//!
//! Turns one classified item into the cell writes for its row. Literal
//! inputs go into B..H; the derived quantities in I..M are formulas over
//! the same row. A formula is only written when every same-row cell it
//! reads is filled, so a missing dimension leaves a blank rather than a
//! zero.

use takeoff_core::{CellWrite, Color, Column, ColumnSet, RowKind, StyleIntent};
use takeoff_formula::builder::{cell, column_range, num, pi, sum};
use takeoff_formula::{FormulaExpr, FormulaResult, Reference};
use tracing::debug;

use crate::classify::Builder;
use crate::extract::PartialDimensions;
use crate::item::{ParsedItem, Section, Unit};

/// Everything one row contributes to the calculation sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RowWrites {
    pub row: u32,
    pub kind: RowKind,
    pub cells: Vec<(Column, CellWrite)>,
    pub style: StyleIntent,
}

impl RowWrites {
    /// Write held for a column, if any
    pub fn get(&self, column: Column) -> Option<&CellWrite> {
        self.cells
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, w)| w)
    }

    /// Formula text held for a column, if any
    pub fn formula(&self, column: Column) -> Option<&str> {
        self.get(column).and_then(CellWrite::formula_text)
    }
}

/// Style intent for a row, fixed by section and builder
pub fn style_for(section: Section, builder: Builder) -> StyleIntent {
    match builder {
        Builder::SectionHeader => StyleIntent::new().bold(true).fill(Color::SECTION_FILL),
        Builder::SubsectionHeader => StyleIntent::new().bold(true).italic(true),
        Builder::Sum => StyleIntent::new().bold(true).fill(Color::SUM_FILL),
        Builder::Blank => StyleIntent::new(),
        Builder::Extra => StyleIntent::new().italic(true),
        _ if section == Section::Demolition => StyleIntent::new().font_color(Color::RED),
        _ => StyleIntent::new(),
    }
}

/// Build the writes for one item's row
///
/// Sum rows come back with their kind and style only; their formulas depend
/// on the rest of the subsection and are produced by [`sum_formulas`].
pub fn assign(
    row: u32,
    builder: Builder,
    item: &ParsedItem,
    dims: &PartialDimensions,
) -> FormulaResult<RowWrites> {
    let mut cells = RowCells::new(row);

    let kind = match builder {
        Builder::SectionHeader => {
            let title = non_empty(&item.particulars).unwrap_or(item.section.title());
            cells.text(Column::A, title);
            RowKind::SectionHeader
        }
        Builder::SubsectionHeader => {
            let title = non_empty(&item.particulars).unwrap_or(item.subsection.as_str());
            cells.text(Column::B, title);
            RowKind::SubsectionHeader
        }
        Builder::Blank => RowKind::Blank,
        Builder::Sum => RowKind::Sum,
        data => {
            cells.inputs(data, item, dims);
            cells.derived(data, item)?;
            RowKind::Data
        }
    };

    Ok(RowWrites {
        row,
        kind,
        cells: cells.into_cells(),
        style: style_for(item.section, builder),
    })
}

/// `SUM` formulas for a sum row over `first..=last`, one per summed column
///
/// A single-row span names the one cell: `=SUM(L14)`, not `=SUM(L14:L14)`.
pub fn sum_formulas(
    first: u32,
    last: u32,
    columns: ColumnSet,
) -> FormulaResult<Vec<(Column, FormulaExpr)>> {
    columns
        .iter()
        .map(|c| -> FormulaResult<(Column, FormulaExpr)> {
            let column = c.column();
            Ok((column, sum(vec![column_range(column, first, last)?])))
        })
        .collect()
}

fn non_empty(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Cells of one row under construction
struct RowCells {
    row: u32,
    cells: Vec<(Column, CellWrite)>,
    filled: u16,
}

impl RowCells {
    fn new(row: u32) -> Self {
        Self {
            row,
            cells: Vec::new(),
            filled: 0,
        }
    }

    fn into_cells(self) -> Vec<(Column, CellWrite)> {
        self.cells
    }

    fn has(&self, column: Column) -> bool {
        self.filled & (1 << column.index()) != 0
    }

    fn put(&mut self, column: Column, write: CellWrite) {
        if self.has(column) {
            return;
        }
        self.filled |= 1 << column.index();
        self.cells.push((column, write));
    }

    fn text(&mut self, column: Column, text: &str) {
        if let Some(text) = non_empty(text) {
            self.put(column, CellWrite::value(text));
        }
    }

    fn number(&mut self, column: Column, value: Option<f64>) {
        if let Some(value) = value.filter(|v| v.is_finite()) {
            self.put(column, CellWrite::value(value));
        }
    }

    fn at(&self, column: Column) -> FormulaResult<FormulaExpr> {
        cell(column, self.row)
    }

    /// Write a formula if every same-row input it reads is present
    fn formula(&mut self, column: Column, expr: FormulaExpr) {
        let missing: Vec<Column> = expr
            .references()
            .into_iter()
            .filter_map(|r| match r {
                Reference::Cell(c) if c.sheet.is_none() && c.address.row_number() == self.row => {
                    Column::from_index(c.address.col)
                }
                _ => None,
            })
            .filter(|&c| !self.has(c))
            .collect();
        if missing.is_empty() {
            self.put(column, CellWrite::formula(expr.to_formula_string()));
        } else {
            debug!(row = self.row, %column, ?missing, "inputs missing, leaving blank");
        }
    }

    /// Literal columns B..H
    fn inputs(&mut self, builder: Builder, item: &ParsedItem, dims: &PartialDimensions) {
        let data = &item.data;
        self.text(Column::B, &item.particulars);
        self.number(Column::C, data.takeoff);
        self.text(Column::D, data.unit.label());
        self.number(Column::E, data.qty);

        let (length, width, height) = match builder {
            Builder::DrilledPile => (
                data.length,
                data.width.or_else(|| dims.pipe_weight().map(round2)),
                data.height.or_else(|| dims.total_height_ft()),
            ),
            Builder::HpPile => (
                data.length,
                data.width.or_else(|| dims.hp_weight()),
                data.height.or_else(|| dims.total_height_ft()),
            ),
            Builder::ConcretePile { .. } => (
                data.length.or_else(|| dims.diameter_in.map(|d| d / 12.0)),
                data.width,
                data.height.or_else(|| dims.total_height_ft()),
            ),
            Builder::Helical => (
                data.length,
                data.width,
                data.height.or_else(|| dims.total_height_ft()),
            ),
            Builder::SheetPile => (
                data.length,
                data.width,
                data.height.or_else(|| {
                    dims.height_ft
                        .map(|h| h + dims.embedment_ft.unwrap_or(0.0))
                }),
            ),
            Builder::Anchor => (
                data.length,
                data.width,
                data.height.or_else(|| dims.anchor_length_ft()),
            ),
            Builder::LinearMember | Builder::CountedMember => (
                data.length,
                data.width
                    .or_else(|| dims.wide_flange.as_ref().map(|s| s.weight_lb_ft)),
                data.height,
            ),
            _ => (data.length, data.width, data.height),
        };
        self.number(Column::F, length);
        self.number(Column::G, width);
        self.number(Column::H, height);
    }

    /// Formula columns I..M
    fn derived(&mut self, builder: Builder, item: &ParsedItem) -> FormulaResult<()> {
        use Column::{C, F, G, H, I, J, K, L, M};

        match builder {
            Builder::AreaVolume => {
                self.formula(J, self.at(C)?);
                self.formula(L, self.volume(J, H)?);
            }
            Builder::LinearSection => {
                self.formula(I, self.at(C)?);
                self.formula(J, self.at(I)?.mul(self.at(G)?));
                self.formula(L, self.volume(J, H)?);
            }
            Builder::Wall => {
                self.formula(I, self.at(C)?);
                self.formula(J, self.at(I)?.mul(self.at(H)?));
                self.formula(L, self.volume(J, G)?);
            }
            Builder::Isolated => {
                self.formula(J, self.at(F)?.mul(self.at(G)?).mul(self.at(C)?));
                self.formula(L, self.volume(J, H)?);
            }
            Builder::Extra => {
                match item.data.unit {
                    Unit::Ea => {
                        self.formula(J, self.at(C)?.mul(self.at(F)?).mul(self.at(G)?));
                    }
                    Unit::Ft => {
                        self.formula(I, self.at(C)?);
                        self.formula(J, self.at(C)?.mul(self.at(G)?));
                    }
                    Unit::Sqft => self.formula(J, self.at(C)?),
                    Unit::Cy => self.formula(L, self.at(C)?),
                    Unit::Lbs => self.formula(K, self.at(C)?),
                }
                if !self.has(L) && self.has(H) {
                    self.formula(L, self.volume(J, H)?);
                }
                if item.data.unit == Unit::Ea {
                    self.count()?;
                }
            }
            Builder::Volume => self.formula(L, self.at(C)?),
            Builder::Linear => {
                self.formula(I, self.at(C)?);
                self.formula(J, self.at(I)?.mul(self.at(H)?));
            }
            Builder::LinearOnly => self.formula(I, self.at(C)?),
            Builder::AreaOnly => self.formula(J, self.at(C)?),
            Builder::DrilledPile | Builder::HpPile => {
                self.formula(I, self.at(H)?.mul(self.at(C)?));
                self.formula(K, self.at(I)?.mul(self.at(G)?));
            }
            Builder::ConcretePile { reinforced } => {
                self.formula(I, self.at(H)?.mul(self.at(C)?));
                let radius = self.at(F)?.div(num(2.0));
                self.formula(
                    L,
                    self.at(I)?
                        .mul(pi())
                        .mul(radius.pow(num(2.0)))
                        .div(num(27.0)),
                );
                if reinforced {
                    self.formula(K, self.at(I)?.mul(self.at(G)?));
                }
            }
            Builder::Helical | Builder::Anchor => {
                self.formula(I, self.at(H)?.mul(self.at(C)?));
            }
            Builder::SheetPile => {
                self.formula(I, self.at(C)?);
                self.formula(J, self.at(I)?.mul(self.at(H)?));
                self.formula(K, self.at(J)?.mul(self.at(G)?));
            }
            Builder::LinearMember => {
                self.formula(I, self.at(C)?);
                self.formula(K, self.at(I)?.mul(self.at(G)?));
            }
            Builder::CountedMember => {
                self.formula(I, self.at(C)?.mul(self.at(F)?));
                self.formula(K, self.at(I)?.mul(self.at(G)?));
            }
            Builder::SectionHeader | Builder::SubsectionHeader | Builder::Blank | Builder::Sum => {}
        }

        if builder.is_counted() {
            self.count()?;
        }
        Ok(())
    }

    /// `area * depth / 27`
    fn volume(&self, area: Column, depth: Column) -> FormulaResult<FormulaExpr> {
        Ok(self.at(area)?.mul(self.at(depth)?).div(num(27.0)))
    }

    /// M = C, or C*E when a quantity multiplier is present
    fn count(&mut self) -> FormulaResult<()> {
        let expr = if self.has(Column::E) {
            self.at(Column::C)?.mul(self.at(Column::E)?)
        } else {
            self.at(Column::C)?
        };
        self.formula(Column::M, expr);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::item::ItemType;
    use pretty_assertions::assert_eq;

    fn formulas(writes: &RowWrites) -> Vec<(Column, String)> {
        writes
            .cells
            .iter()
            .filter_map(|(c, w)| w.formula_text().map(|f| (*c, f.to_string())))
            .collect()
    }

    fn item(section: Section, item_type: ItemType, particulars: &str) -> ParsedItem {
        ParsedItem::new(section, "Test", item_type, 5, particulars)
    }

    #[test]
    fn test_area_volume() {
        let item = item(Section::Foundation, ItemType::SlabOnGrade, "SOG 6\"")
            .takeoff(1200.0)
            .unit(Unit::Sqft)
            .dims(None, None, Some(0.5));
        let writes = assign(5, Builder::AreaVolume, &item, &PartialDimensions::default()).unwrap();
        assert_eq!(writes.kind, RowKind::Data);
        assert_eq!(
            formulas(&writes),
            vec![
                (Column::J, "=C5".to_string()),
                (Column::L, "=J5*H5/27".to_string()),
            ]
        );
        assert_eq!(writes.get(Column::D), Some(&CellWrite::value("SQ FT")));
    }

    #[test]
    fn test_missing_height_leaves_blank() {
        let item = item(Section::Foundation, ItemType::SlabOnGrade, "SOG")
            .takeoff(1200.0)
            .unit(Unit::Sqft);
        let writes = assign(5, Builder::AreaVolume, &item, &PartialDimensions::default()).unwrap();
        assert_eq!(writes.formula(Column::J), Some("=C5"));
        assert_eq!(writes.get(Column::L), None);
        assert_eq!(writes.get(Column::H), None);
    }

    #[test]
    fn test_hp_pile_literals() {
        let item = item(Section::Soe, ItemType::HpSoldierPile, "HP12x63 H=24'-9\"").takeoff(3.0);
        let dims = extract(&item.particulars);
        let writes = assign(5, Builder::HpPile, &item, &dims).unwrap();
        assert_eq!(writes.get(Column::G), Some(&CellWrite::value(63.0)));
        assert_eq!(writes.get(Column::H), Some(&CellWrite::value(24.75)));
        assert_eq!(
            formulas(&writes),
            vec![
                (Column::I, "=H5*C5".to_string()),
                (Column::K, "=I5*G5".to_string()),
                (Column::M, "=C5".to_string()),
            ]
        );
    }

    #[test]
    fn test_drilled_pile_adds_rock_socket() {
        let item = item(
            Section::Soe,
            ItemType::DrilledSoldierPile,
            "9.625\" x0.545\" H=20'-0\" + RS=5'-0\"",
        )
        .takeoff(4.0);
        let dims = extract(&item.particulars);
        let writes = assign(5, Builder::DrilledPile, &item, &dims).unwrap();
        assert_eq!(writes.get(Column::H), Some(&CellWrite::value(25.0)));
        assert_eq!(writes.get(Column::G), Some(&CellWrite::value(52.9)));
        assert_eq!(writes.formula(Column::K), Some("=I5*G5"));
    }

    #[test]
    fn test_concrete_pile_volume() {
        let item = item(Section::Soe, ItemType::PrimarySecantPile, "Ø24\" H=30'-0\"").takeoff(10.0);
        let dims = extract(&item.particulars);
        let writes = assign(7, Builder::ConcretePile { reinforced: false }, &item, &dims).unwrap();
        assert_eq!(writes.get(Column::F), Some(&CellWrite::value(2.0)));
        assert_eq!(writes.formula(Column::L), Some("=I7*PI()*(F7/2)^2/27"));
        assert_eq!(writes.get(Column::K), None);
        assert_eq!(writes.formula(Column::M), Some("=C7"));
    }

    #[test]
    fn test_extra_by_unit() {
        let ea = item(Section::Demolition, ItemType::DemoExtra, "Pad")
            .takeoff(2.0)
            .unit(Unit::Ea)
            .dims(Some(3.0), Some(4.0), Some(1.0));
        let writes = assign(5, Builder::Extra, &ea, &PartialDimensions::default()).unwrap();
        assert_eq!(
            formulas(&writes),
            vec![
                (Column::J, "=C5*F5*G5".to_string()),
                (Column::L, "=J5*H5/27".to_string()),
                (Column::M, "=C5".to_string()),
            ]
        );

        let ft = item(Section::Demolition, ItemType::DemoExtra, "Curb")
            .takeoff(40.0)
            .unit(Unit::Ft)
            .dims(None, Some(1.0), None);
        let writes = assign(5, Builder::Extra, &ft, &PartialDimensions::default()).unwrap();
        assert_eq!(
            formulas(&writes),
            vec![
                (Column::I, "=C5".to_string()),
                (Column::J, "=C5*G5".to_string()),
            ]
        );

        let cy = item(Section::Excavation, ItemType::ExcavationExtra, "Pit")
            .takeoff(12.0)
            .unit(Unit::Cy)
            .dims(None, None, Some(2.0));
        let writes = assign(5, Builder::Extra, &cy, &PartialDimensions::default()).unwrap();
        assert_eq!(formulas(&writes), vec![(Column::L, "=C5".to_string())]);
    }

    #[test]
    fn test_quantity_multiplier() {
        let item = item(Section::Soe, ItemType::Raker, "Raker W12x26")
            .takeoff(4.0)
            .qty(2.0)
            .dims(Some(30.0), None, None);
        let dims = extract(&item.particulars);
        let writes = assign(5, Builder::CountedMember, &item, &dims).unwrap();
        assert_eq!(writes.formula(Column::I), Some("=C5*F5"));
        assert_eq!(writes.formula(Column::K), Some("=I5*G5"));
        assert_eq!(writes.formula(Column::M), Some("=C5*E5"));
    }

    #[test]
    fn test_headers() {
        let header = ParsedItem::new(Section::Soe, "Heel blocks", ItemType::SubsectionHeader, 9, "");
        let writes = assign(9, Builder::SubsectionHeader, &header, &PartialDimensions::default()).unwrap();
        assert_eq!(writes.kind, RowKind::SubsectionHeader);
        assert_eq!(writes.cells, vec![(Column::B, CellWrite::value("Heel blocks"))]);
        assert!(writes.style.bold);

        let section = ParsedItem::new(Section::RockExcavation, "", ItemType::SectionHeader, 1, "");
        let writes = assign(1, Builder::SectionHeader, &section, &PartialDimensions::default()).unwrap();
        assert_eq!(writes.cells, vec![(Column::A, CellWrite::value("Rock Excavation"))]);
    }

    #[test]
    fn test_sum_formulas() {
        use takeoff_core::SumColumn;

        let columns = ColumnSet::of(&[SumColumn::Cy, SumColumn::Qty]);
        let formulas: Vec<(Column, String)> = sum_formulas(10, 11, columns)
            .unwrap()
            .into_iter()
            .map(|(c, f)| (c, f.to_formula_string()))
            .collect();
        assert_eq!(
            formulas,
            vec![
                (Column::L, "=SUM(L10:L11)".to_string()),
                (Column::M, "=SUM(M10:M11)".to_string()),
            ]
        );
    }

    #[test]
    fn test_single_row_sum_names_one_cell() {
        use takeoff_core::SumColumn;

        let formulas = sum_formulas(14, 14, ColumnSet::of(&[SumColumn::Cy])).unwrap();
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].1.to_formula_string(), "=SUM(L14)");
    }

    #[test]
    fn test_demolition_rows_are_red() {
        let style = style_for(Section::Demolition, Builder::AreaVolume);
        assert_eq!(style.font_color, Some(Color::RED));
        assert!(style_for(Section::Soe, Builder::Linear).is_plain());
    }
}
