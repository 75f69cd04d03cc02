//! Item classifier
//!
//! Routes a `(section, item type)` pair to the builder that fills its row.
//! The match is exhaustive over [`ItemType`], so a new tag does not compile
//! until it is routed; a tag routed to the wrong section is a
//! [`EngineError::NoBuilder`].

use std::fmt;

use tracing::debug;

use crate::error::{EngineError, Result};
use crate::item::{ItemType, Section};

/// Row builder families
///
/// Each family fixes which columns get literals and which get formulas over
/// the row's own cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builder {
    /// Section title in column A
    SectionHeader,
    /// Subsection title in column B
    SubsectionHeader,
    /// Separator row, nothing written
    Blank,
    /// Subsection total
    Sum,

    /// J=C, L=J*H/27
    AreaVolume,
    /// I=C, J=I*G, L=J*H/27
    LinearSection,
    /// I=C, J=I*H, L=J*G/27
    Wall,
    /// J=F*G*C, L=J*H/27, M=C
    Isolated,
    /// Formulas follow the declared unit
    Extra,
    /// L=C
    Volume,
    /// I=C, J=I*H
    Linear,
    /// I=C
    LinearOnly,
    /// J=C
    AreaOnly,
    /// Steel pipe pile: I=H*C, K=I*G, M=C
    DrilledPile,
    /// HP section pile: I=H*C, K=I*G, M=C
    HpPile,
    /// Round concrete pile: I=H*C, L=I*PI()*(F/2)^2/27, M=C
    ConcretePile { reinforced: bool },
    /// I=H*C, M=C
    Helical,
    /// I=C, J=I*H, K=J*G
    SheetPile,
    /// I=C, K=I*G
    LinearMember,
    /// I=C*F, K=I*G, M=C
    CountedMember,
    /// I=H*C, M=C with H = free length plus bond
    Anchor,
}

impl Builder {
    /// Whether the builder writes a final count into column M
    pub fn is_counted(self) -> bool {
        matches!(
            self,
            Builder::Isolated
                | Builder::DrilledPile
                | Builder::HpPile
                | Builder::ConcretePile { .. }
                | Builder::Helical
                | Builder::CountedMember
                | Builder::Anchor
        )
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Builder::ConcretePile { reinforced: true } => f.write_str("ConcretePile(reinforced)"),
            Builder::ConcretePile { reinforced: false } => f.write_str("ConcretePile"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// When a builder runs within its section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// In source order with the rest of the section
    Primary,
    /// After every primary row of the section
    Trailing,
}

/// Result of classifying one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub builder: Builder,
    pub phase: Phase,
}

impl Route {
    const fn primary(builder: Builder) -> Self {
        Self {
            builder,
            phase: Phase::Primary,
        }
    }

    const fn trailing(builder: Builder) -> Self {
        Self {
            builder,
            phase: Phase::Trailing,
        }
    }
}

/// Pick the builder for an item type within a section
pub fn classify(section: Section, item_type: ItemType) -> Result<Route> {
    let route = route(section, item_type).ok_or(EngineError::NoBuilder { section, item_type })?;
    debug!(%section, %item_type, builder = %route.builder, phase = ?route.phase, "classified");
    Ok(route)
}

fn route(section: Section, item_type: ItemType) -> Option<Route> {
    use Builder as B;
    use ItemType as T;
    use Section as S;

    let builder = match (section, item_type) {
        (_, T::SectionHeader) => B::SectionHeader,
        (_, T::SubsectionHeader) => B::SubsectionHeader,
        (_, T::Blank) => B::Blank,
        (_, T::Sum) => B::Sum,

        (S::Demolition, T::DemoSlabOnGrade) => B::AreaVolume,
        (S::Demolition, T::DemoStripFooting) => B::LinearSection,
        (S::Demolition, T::DemoFoundationWall | T::DemoRetainingWall) => B::Wall,
        (S::Demolition, T::DemoIsolatedFooting) => B::Isolated,
        (S::Demolition, T::DemoExtra) => B::Extra,
        (
            _,
            T::DemoSlabOnGrade
            | T::DemoStripFooting
            | T::DemoFoundationWall
            | T::DemoRetainingWall
            | T::DemoIsolatedFooting
            | T::DemoExtra,
        ) => return None,

        (S::Excavation, T::BulkExcavation | T::Backfill) => B::AreaVolume,
        (S::Excavation, T::TrenchExcavation) => B::LinearSection,
        (S::Excavation, T::SoilExport) => B::Volume,
        (S::Excavation, T::ExcavationExtra) => B::Extra,
        (
            _,
            T::BulkExcavation
            | T::Backfill
            | T::TrenchExcavation
            | T::SoilExport
            | T::ExcavationExtra,
        ) => return None,

        (S::RockExcavation, T::RockExcavation) => B::AreaVolume,
        (S::RockExcavation, T::LineDrilling) => B::Linear,
        (S::RockExcavation, T::RockTrench) => B::LinearSection,
        (_, T::RockExcavation | T::LineDrilling | T::RockTrench) => return None,

        (S::Soe, T::DrilledSoldierPile) => B::DrilledPile,
        (S::Soe, T::HpSoldierPile) => B::HpPile,
        (S::Soe, T::PrimarySecantPile) => B::ConcretePile { reinforced: false },
        (S::Soe, T::SecondarySecantPile | T::TangentPile) => B::ConcretePile { reinforced: true },
        (S::Soe, T::TimberLagging | T::Shotcrete) => B::Linear,
        (S::Soe, T::SheetPile) => B::SheetPile,
        (S::Soe, T::Waler) => B::LinearMember,
        (S::Soe, T::Raker | T::Strut) => B::CountedMember,
        (S::Soe, T::TieBackAnchor | T::RockAnchor | T::RockBolt) => B::Anchor,
        (S::Soe, T::HeelBlock) => B::Isolated,
        (S::Soe, T::Underpinning | T::GuideWall) => B::LinearSection,
        (
            _,
            T::DrilledSoldierPile
            | T::HpSoldierPile
            | T::PrimarySecantPile
            | T::SecondarySecantPile
            | T::TangentPile
            | T::TimberLagging
            | T::Shotcrete
            | T::SheetPile
            | T::Waler
            | T::Raker
            | T::Strut
            | T::TieBackAnchor
            | T::RockAnchor
            | T::RockBolt
            | T::HeelBlock
            | T::Underpinning
            | T::GuideWall,
        ) => return None,

        (S::Foundation, T::DrilledFoundationPile) => B::DrilledPile,
        (S::Foundation, T::HelicalPile) => B::Helical,
        (S::Foundation, T::DrivenPile) => B::HpPile,
        (S::Foundation, T::PileCap | T::IsolatedFooting | T::StairOnGrade) => B::Isolated,
        (S::Foundation, T::StripFooting | T::GradeBeam) => B::LinearSection,
        (S::Foundation, T::FoundationWall) => B::Wall,
        (S::Foundation, T::SlabOnGrade | T::ElevatorPit) => B::AreaVolume,
        (S::Foundation, T::StairLanding) => return Some(Route::trailing(B::AreaVolume)),
        (
            _,
            T::DrilledFoundationPile
            | T::HelicalPile
            | T::DrivenPile
            | T::PileCap
            | T::IsolatedFooting
            | T::StairOnGrade
            | T::StripFooting
            | T::GradeBeam
            | T::FoundationWall
            | T::SlabOnGrade
            | T::ElevatorPit
            | T::StairLanding,
        ) => return None,

        (S::Waterproofing, T::WallWaterproofing | T::DrainageBoard) => B::Linear,
        (S::Waterproofing, T::SlabWaterproofing | T::VaporBarrier) => B::AreaOnly,
        (S::Waterproofing, T::Waterstop) => B::LinearOnly,
        (
            _,
            T::WallWaterproofing
            | T::DrainageBoard
            | T::SlabWaterproofing
            | T::VaporBarrier
            | T::Waterstop,
        ) => return None,
    };
    Some(Route::primary(builder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_rows_route_everywhere() {
        for section in Section::ORDER {
            assert_eq!(
                classify(section, ItemType::Sum).unwrap().builder,
                Builder::Sum
            );
            assert_eq!(
                classify(section, ItemType::Blank).unwrap().builder,
                Builder::Blank
            );
        }
    }

    #[test]
    fn test_every_data_type_has_exactly_one_home() {
        for &item_type in ItemType::ALL.iter().filter(|t| t.is_data()) {
            let homes: Vec<Section> = Section::ORDER
                .into_iter()
                .filter(|&s| classify(s, item_type).is_ok())
                .collect();
            assert_eq!(homes.len(), 1, "{} routes to {:?}", item_type, homes);
        }
    }

    #[test]
    fn test_misplaced_item_is_a_hard_error() {
        let err = classify(Section::Foundation, ItemType::DemoSlabOnGrade).unwrap_err();
        assert!(matches!(
            err,
            EngineError::NoBuilder {
                section: Section::Foundation,
                item_type: ItemType::DemoSlabOnGrade
            }
        ));
        assert!(err.to_string().contains("DemoSlabOnGrade"));
    }

    #[test]
    fn test_landing_is_trailing() {
        let route = classify(Section::Foundation, ItemType::StairLanding).unwrap();
        assert_eq!(route.phase, Phase::Trailing);
        assert_eq!(route.builder, Builder::AreaVolume);
        let route = classify(Section::Foundation, ItemType::StairOnGrade).unwrap();
        assert_eq!(route.phase, Phase::Primary);
    }

    #[test]
    fn test_pile_routes() {
        assert_eq!(
            classify(Section::Soe, ItemType::HpSoldierPile).unwrap().builder,
            Builder::HpPile
        );
        assert_eq!(
            classify(Section::Soe, ItemType::TangentPile).unwrap().builder,
            Builder::ConcretePile { reinforced: true }
        );
        assert_eq!(
            classify(Section::Soe, ItemType::HeelBlock).unwrap().builder,
            Builder::Isolated
        );
    }
}
