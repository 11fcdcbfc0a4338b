//! Life in weeks with the Olympic Games overlay, in three stages.
//!
//! Stage 0 shades lived against remaining weeks. Stage 1 colours the weeks
//! that overlap a Games edition by season. Stage 2 keeps only the Games
//! weeks and packs them into two bands, lived and remaining, using each
//! cell's dense index as its position.

use lifespan_types::{
    CellTone, GameSeason, PlacedCell, ViewStage, WEEKS_PER_YEAR, WeekBand, WeekCell, WeekGrid,
    WeekGridModel, WeekSummary,
};
use tracing::debug;

use crate::dataset::Dataset;
use crate::state::SharedState;
use crate::views::{RenderContext, Rendered, View, ViewError};
use crate::weeks::build_week_grid;

/// Week grid with stage transitions.
#[derive(Debug, Default)]
pub struct WeekGridView {
    rendered: Rendered<WeekGridModel>,
}

impl WeekGridView {
    /// View name.
    pub const NAME: &'static str = "weeks";

    /// A view that has not refreshed yet.
    pub const fn new() -> Self {
        Self {
            rendered: Rendered::new(),
        }
    }
}

const fn life_tone(cell: WeekCell) -> CellTone {
    if cell.passed {
        CellTone::Lived
    } else {
        CellTone::Remaining
    }
}

/// Position and colour of one cell at `stage`.
pub fn place(cell: WeekCell, row: u32, column: u32, stage: ViewStage) -> PlacedCell {
    match stage {
        ViewStage::LifeInWeeks => PlacedCell {
            cell,
            row,
            column,
            band: None,
            visible: true,
            tone: life_tone(cell),
        },
        ViewStage::GamesOverlay => PlacedCell {
            cell,
            row,
            column,
            band: None,
            visible: true,
            tone: match cell.season {
                Some(GameSeason::Summer) => CellTone::Summer,
                Some(GameSeason::Winter) => CellTone::Winter,
                None => life_tone(cell),
            },
        },
        ViewStage::GamesRegrouped => match cell.index {
            Some(index) if cell.in_game => PlacedCell {
                cell,
                row: index / WEEKS_PER_YEAR,
                column: index % WEEKS_PER_YEAR,
                band: Some(if cell.passed {
                    WeekBand::Passed
                } else {
                    WeekBand::NotPassed
                }),
                visible: true,
                tone: life_tone(cell),
            },
            _ => PlacedCell {
                cell,
                row,
                column,
                band: None,
                visible: false,
                tone: life_tone(cell),
            },
        },
    }
}

/// Lived and remaining counts, overall and for Games weeks.
pub fn summarize(grid: &WeekGrid) -> WeekSummary {
    let count = |predicate: fn(&WeekCell) -> bool| {
        u32::try_from(grid.count(predicate)).unwrap_or(u32::MAX)
    };
    WeekSummary {
        weeks_lived: count(|c| c.passed),
        weeks_left: count(|c| !c.passed),
        game_weeks_lived: count(|c| c.passed && c.in_game),
        game_weeks_left: count(|c| !c.passed && c.in_game),
    }
}

impl View for WeekGridView {
    type Model = WeekGridModel;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn refresh(
        &mut self,
        state: &SharedState,
        data: &Dataset,
        ctx: &RenderContext,
    ) -> Result<(), ViewError> {
        let stage = state.view_stage();
        let grid = build_week_grid(
            state.dob(),
            state.life_expectancy_years(),
            &data.games,
            ctx.now,
        )?;

        let mut cells = Vec::new();
        for (row, week_row) in (0_u32..).zip(&grid.rows) {
            for (column, cell) in (0_u32..).zip(week_row) {
                cells.push(place(*cell, row, column, stage));
            }
        }
        let summary = summarize(&grid);

        debug!(
            view = Self::NAME,
            version = state.version(),
            stage = stage.index(),
            rows = grid.rows.len(),
            game_weeks = summary.game_weeks_lived.saturating_add(summary.game_weeks_left),
            "week grid refreshed"
        );

        let model = WeekGridModel {
            stage,
            description: stage.description().to_owned(),
            rows: u32::try_from(grid.rows.len()).unwrap_or(u32::MAX),
            columns: WEEKS_PER_YEAR,
            cells,
            summary,
        };
        self.rendered.store(model, state.version());
        Ok(())
    }

    fn rendered(&self) -> &Rendered<WeekGridModel> {
        &self.rendered
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::lifetable::update_life_expectancy;

    fn refreshed(stage: ViewStage) -> WeekGridModel {
        let data = fixtures::dataset();
        let mut state = SharedState::default();
        update_life_expectancy(&mut state, &data.life_table).unwrap();
        state.change_view_stage(lifespan_types::StageChange::Set(stage));

        let mut view = WeekGridView::new();
        view.refresh(&state, &data, &fixtures::render()).unwrap();
        view.model().cloned().unwrap()
    }

    #[test]
    fn first_stage_shows_every_week() {
        let model = refreshed(ViewStage::LifeInWeeks);
        assert_eq!(model.rows, 81);
        assert_eq!(model.columns, 52);
        assert_eq!(model.cells.len(), 81 * 52);
        assert!(model.cells.iter().all(|c| c.visible));
        assert!(
            model
                .cells
                .iter()
                .all(|c| matches!(c.tone, CellTone::Lived | CellTone::Remaining))
        );
        let s = model.summary;
        assert_eq!(s.weeks_lived + s.weeks_left, 81 * 52);
        assert_eq!(model.description, ViewStage::LifeInWeeks.description());
    }

    #[test]
    fn overlay_colours_games_by_season() {
        let model = refreshed(ViewStage::GamesOverlay);
        assert!(model.cells.iter().any(|c| c.tone == CellTone::Summer));
        assert!(model.cells.iter().any(|c| c.tone == CellTone::Winter));
        for placed in &model.cells {
            if !placed.cell.in_game {
                assert!(matches!(placed.tone, CellTone::Lived | CellTone::Remaining));
            }
        }
    }

    #[test]
    fn regrouped_stage_packs_game_weeks() {
        let model = refreshed(ViewStage::GamesRegrouped);
        let visible: Vec<&PlacedCell> = model.cells.iter().filter(|c| c.visible).collect();
        let s = model.summary;
        assert_eq!(
            u32::try_from(visible.len()).unwrap(),
            s.game_weeks_lived + s.game_weeks_left
        );
        // Fixture games are all in the past relative to "now".
        assert!(s.game_weeks_lived > 0);
        let mut lived: Vec<(u32, u32)> = visible
            .iter()
            .filter(|c| c.band == Some(WeekBand::Passed))
            .map(|c| (c.row, c.column))
            .collect();
        lived.sort_unstable();
        let expected: Vec<(u32, u32)> = (0..s.game_weeks_lived).map(|i| (i / 52, i % 52)).collect();
        assert_eq!(lived, expected);
    }
}
