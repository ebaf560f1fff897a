//! Cost model for reshaping land.

use landscape_core::{Corner, Money, SlopeStyle};
use landscape_world::{SurfaceView, TileElement, TileStack};

use crate::obstruction::is_cleared_scenery;

/// Price of moving one surface corner by one height unit.
pub const HEIGHT_UNIT_COST: Money = Money::new(25);

/// Price of removing one small scenery element.
pub(crate) fn removal_price(element: &TileElement) -> Money {
    element
        .as_small_scenery()
        .map_or(Money::ZERO, |scenery| {
            Money::from_whole(i64::from(scenery.removal_price))
        })
}

/// Sum of removal prices of the small scenery cleared by moving land to `height`.
pub(crate) fn small_scenery_removal_cost(stack: &TileStack, height: u8) -> Money {
    stack
        .iter()
        .filter(|element| is_cleared_scenery(element, height))
        .map(removal_price)
        .sum()
}

/// Price of moving every corner of the surface to the proposed shape.
pub(crate) fn surface_height_change_cost(
    surface: &SurfaceView<'_>,
    height: u8,
    style: SlopeStyle,
) -> Money {
    let current_base = surface.element.base_height();
    let current_style = surface.surface.slope;
    let delta: i64 = Corner::ALL
        .iter()
        .map(|&corner| {
            let current = current_style.corner_height(current_base, corner);
            let proposed = style.corner_height(height, corner);
            i64::from((proposed - current).abs())
        })
        .sum();
    HEIGHT_UNIT_COST.times(delta)
}
