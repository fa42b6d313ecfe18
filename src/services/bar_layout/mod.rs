//! Bar placement on the gantt grid.
//!
//! Work-background bars are pushed one cell to the right so the fill starts on
//! the first working slot, matching the classifier treating the start boundary
//! as off. Reservation bars sit at their raw position.

use crate::models::resource_row::{Bar, BarKind, BarPlacement, ResourceRow};
use crate::services::time_grid::TimeGrid;

/// Receives computed placements; the only side effect of a layout pass.
pub trait BarSurface {
    fn place_bar(&mut self, placement: &BarPlacement);
}

impl BarSurface for Vec<BarPlacement> {
    fn place_bar(&mut self, placement: &BarPlacement) {
        self.push(placement.clone());
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Compute one bar's placement, or `None` if it lacks usable times.
pub fn layout_bar(bar: &Bar, grid: &TimeGrid) -> Option<BarPlacement> {
    let (Some(start), Some(end)) = (present(&bar.start_time), present(&bar.end_time)) else {
        log::debug!("Skipping bar {} without start/end time", bar.bar_id);
        return None;
    };

    let (left, width) = match (grid.position_of(start), grid.width_between(start, end)) {
        (Ok(left), Ok(width)) => (left, width),
        (Err(err), _) | (_, Err(err)) => {
            log::debug!("Skipping bar {}: {}", bar.bar_id, err);
            return None;
        }
    };

    let left_px = match bar.kind {
        BarKind::WorkBackground => left + grid.cell_width_px(),
        BarKind::Reservation => left,
    };

    Some(BarPlacement {
        bar_id: bar.bar_id.clone(),
        owner_row_id: bar.owner_row_id.clone(),
        kind: bar.kind,
        left_px,
        width_px: width.max(0.0),
    })
}

pub fn layout_bars(bars: &[Bar], grid: &TimeGrid) -> Vec<BarPlacement> {
    bars.iter().filter_map(|bar| layout_bar(bar, grid)).collect()
}

/// One work-background bar per row that has a complete shift.
pub fn work_bars_for_rows(rows: &[ResourceRow]) -> Vec<Bar> {
    rows.iter()
        .filter(|row| row.has_work_time())
        .filter_map(|row| {
            Some(Bar::work_background(
                row.resource_id.clone(),
                row.work_start_time.clone()?,
                row.work_end_time.clone()?,
            ))
        })
        .collect()
}

/// Lay out `bars` and hand each placement to `surface`. Returns the number placed.
///
/// Placements are computed in full before the surface is touched, so a surface
/// that rebuilds its own bar list while placing cannot disturb this pass.
pub fn apply_layout(bars: &[Bar], grid: &TimeGrid, surface: &mut dyn BarSurface) -> usize {
    let placements = layout_bars(bars, grid);
    for placement in &placements {
        surface.place_bar(placement);
    }
    log::debug!("Placed {} of {} bars", placements.len(), bars.len());
    placements.len()
}
