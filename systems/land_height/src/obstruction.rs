//! Obstruction rules evaluated over a cell's element stack.

use landscape_core::{CellCoord, SlopeStyle, SLOPE_CORNER_STEP};
use landscape_world::{
    query, ClearDecision, ElementKind, PathElement, SurfaceView, TileElement, TileStack, World,
};

/// Height above the target within which small scenery is still cleared.
const SCENERY_CLEARING_REACH: u16 = 4;

/// Clearance kept between surfaces and water that track depends on.
const WATER_CLEARANCE: i32 = 2;

/// Reports whether the element is small scenery cleared by moving land to `height`.
pub(crate) fn is_cleared_scenery(element: &TileElement, height: u8) -> bool {
    element.as_small_scenery().is_some()
        && height <= element.clearance_height()
        && u16::from(element.base_height()) <= u16::from(height) + SCENERY_CLEARING_REACH
}

/// First tree that moving land to `height` would have to clear.
pub(crate) fn find_protected_tree(stack: &TileStack, height: u8) -> Option<&TileElement> {
    stack.iter().find(|element| {
        is_cleared_scenery(element, height)
            && element
                .as_small_scenery()
                .is_some_and(|scenery| scenery.is_tree)
    })
}

/// First track piece whose supports would outgrow its ride's ceiling.
///
/// Supports span from the new surface to the top of the track. Track of an
/// unknown ride is ignored.
pub(crate) fn find_overextended_support<'a>(
    world: &World,
    stack: &'a TileStack,
    height: u8,
) -> Option<&'a TileElement> {
    stack.iter().find(|element| {
        let ElementKind::Track(track) = element.kind() else {
            return false;
        };
        let Some(ride) = query::ride(world, track.ride) else {
            return false;
        };
        let support = i32::from(element.clearance_height()) - i32::from(height);
        support >= 0 && support / 2 > i32::from(ride.max_height())
    })
}

/// Reports whether a level crossing rests on the cell's current surface.
pub(crate) fn has_level_crossing(world: &World, cell: CellCoord, surface_height: u8) -> bool {
    query::footpath_at(world, cell, surface_height).is_some_and(|element| {
        matches!(
            element.kind(),
            ElementKind::Path(PathElement {
                level_crossing: true
            })
        )
    })
}

/// Highest corner of the proposed surface, used for clearance checks.
pub(crate) fn upper_corner_height(height: u8, style: SlopeStyle) -> u8 {
    let mut corner = height;
    if style.has_raised_corners() {
        corner = corner.saturating_add(SLOPE_CORNER_STEP);
        if style.is_diagonal() {
            corner = corner.saturating_add(SLOPE_CORNER_STEP);
        }
    }
    corner
}

/// Element blocking a surface whose water carries track, if the new land rises into it.
///
/// The reported element is the one stacked directly above the surface, or the
/// surface itself when nothing is.
pub(crate) fn find_floating_structure<'a>(
    stack: &'a TileStack,
    surface: &SurfaceView<'a>,
    height: u8,
    style: SlopeStyle,
) -> Option<&'a TileElement> {
    let water_height = surface.surface.water_height;
    if !surface.surface.track_needs_water || water_height == 0 {
        return None;
    }

    let mut corner = i32::from(height);
    if style.has_slope() {
        corner += i32::from(SLOPE_CORNER_STEP);
        if style.is_diagonal() {
            corner += i32::from(SLOPE_CORNER_STEP);
        }
    }
    if corner > i32::from(water_height) - WATER_CLEARANCE {
        Some(stack.get(surface.index + 1).unwrap_or(surface.element))
    } else {
        None
    }
}

/// First element that cannot be cleared and would collide with the new surface.
///
/// Walls and small scenery are cleared by the command itself, and ghosts never
/// obstruct. Elements above the surface collide when the new upper corner
/// passes their base; elements below collide when the new surface stays under
/// their top.
pub(crate) fn find_unremovable_obstruction(
    stack: &TileStack,
    surface_index: usize,
    height: u8,
    upper_corner: u8,
) -> Option<&TileElement> {
    stack
        .iter_indexed()
        .find(|(index, element)| {
            if element.is_wall() || element.as_small_scenery().is_some() || element.is_ghost() {
                return false;
            }
            if *index == surface_index {
                return false;
            }
            if *index > surface_index {
                upper_corner > element.base_height()
            } else {
                height < element.clearance_height()
            }
        })
        .map(|(_, element)| element)
}

/// Clear policy handed to the construction clearance check.
///
/// The surface is being replaced and small scenery is removed by the command;
/// everything else stays in the way.
pub(crate) fn land_height_clear(element: &TileElement) -> ClearDecision {
    match element.kind() {
        ElementKind::Surface(_) | ElementKind::SmallScenery(_) => ClearDecision::Clear,
        ElementKind::Path(_)
        | ElementKind::Track(_)
        | ElementKind::Entrance(_)
        | ElementKind::Wall(_)
        | ElementKind::LargeScenery(_)
        | ElementKind::Banner(_) => ClearDecision::Obstruct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landscape_core::{ObjectEntryId, RideId};
    use landscape_world::{SmallSceneryElement, SurfaceElement, TrackElement};

    fn scenery(base: u8, clearance: u8, is_tree: bool) -> TileElement {
        TileElement::new(
            base,
            clearance,
            ElementKind::SmallScenery(SmallSceneryElement {
                entry: ObjectEntryId::new(7),
                removal_price: 4,
                is_tree,
            }),
        )
    }

    fn track(base: u8, clearance: u8) -> TileElement {
        TileElement::new(
            base,
            clearance,
            ElementKind::Track(TrackElement {
                ride: RideId::new(0),
            }),
        )
    }

    #[test]
    fn scenery_band_reaches_four_units_above_target() {
        assert!(is_cleared_scenery(&scenery(20, 24, false), 16));
        assert!(!is_cleared_scenery(&scenery(21, 24, false), 16));
        assert!(is_cleared_scenery(&scenery(10, 16, false), 16));
        assert!(!is_cleared_scenery(&scenery(10, 15, false), 16));
        assert!(!is_cleared_scenery(&track(14, 18), 16));
    }

    #[test]
    fn upper_corner_counts_raised_corners_and_diagonal() {
        let corner = SlopeStyle::from_bits(SlopeStyle::EAST_UP);
        let steep = SlopeStyle::from_bits(
            SlopeStyle::NORTH_UP
                | SlopeStyle::EAST_UP
                | SlopeStyle::WEST_UP
                | SlopeStyle::DIAGONAL_FLAG,
        );
        let diagonal_only = SlopeStyle::from_bits(SlopeStyle::DIAGONAL_FLAG);
        assert_eq!(upper_corner_height(10, SlopeStyle::FLAT), 10);
        assert_eq!(upper_corner_height(10, corner), 12);
        assert_eq!(upper_corner_height(10, steep), 14);
        assert_eq!(upper_corner_height(10, diagonal_only), 10);
    }

    #[test]
    fn unremovable_scan_distinguishes_above_and_below() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        let _ = world.insert_element(cell, track(4, 8));
        let _ = world.insert_element(cell, track(20, 24));
        let stack = query::tile(&world, cell).expect("tile");
        let surface = stack.surface().expect("surface");

        assert!(find_unremovable_obstruction(stack, surface.index, 14, 14).is_none());
        let below = find_unremovable_obstruction(stack, surface.index, 6, 6);
        assert_eq!(below.map(TileElement::base_height), Some(4));
        let above = find_unremovable_obstruction(stack, surface.index, 18, 22);
        assert_eq!(above.map(TileElement::base_height), Some(20));
    }

    #[test]
    fn unremovable_scan_skips_clearable_and_ghost_elements() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        let _ = world.insert_element(cell, scenery(16, 20, true));
        let _ = world.insert_element(
            cell,
            TileElement::new(16, 20, ElementKind::Wall(ObjectEntryId::new(1))),
        );
        let _ = world.insert_element(cell, track(16, 20).into_ghost());
        let stack = query::tile(&world, cell).expect("tile");
        let surface = stack.surface().expect("surface");

        assert!(find_unremovable_obstruction(stack, surface.index, 20, 24).is_none());
    }

    #[test]
    fn floating_check_needs_water_carrying_track() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        let _ = world.configure_surface(
            cell,
            10,
            SurfaceElement {
                water_height: 16,
                track_needs_water: true,
                ..SurfaceElement::default()
            },
        );
        let _ = world.insert_element(cell, track(16, 18));
        let stack = query::tile(&world, cell).expect("tile");
        let surface = stack.surface().expect("surface");

        assert!(find_floating_structure(stack, &surface, 14, SlopeStyle::FLAT).is_none());
        let blocked = find_floating_structure(stack, &surface, 15, SlopeStyle::FLAT);
        assert_eq!(blocked.map(TileElement::base_height), Some(16));
        let sloped = SlopeStyle::from_bits(SlopeStyle::DIAGONAL_FLAG);
        assert!(find_floating_structure(stack, &surface, 12, sloped).is_some());
    }

    #[test]
    fn clear_policy_only_clears_surface_and_small_scenery() {
        assert_eq!(land_height_clear(&scenery(14, 18, true)), ClearDecision::Clear);
        assert_eq!(
            land_height_clear(&TileElement::surface(14, SurfaceElement::default())),
            ClearDecision::Clear
        );
        assert_eq!(land_height_clear(&track(14, 18)), ClearDecision::Obstruct);
    }
}
