#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the landscaping engine.
//!
//! The world owns one ordered [`TileStack`] per cell, the ride registry, the
//! litter scattered across the park, and the park ledger. Systems read it
//! through [`query`] and change it only through [`mutate`], which reports every
//! change as an [`Event`](landscape_core::Event).

mod clearance;
mod element;
mod finance;
mod rides;
mod stack;

use landscape_core::{CellCoord, Money, RideId, DEFAULT_LAND_HEIGHT, MAXIMUM_MAP_SIZE};

pub use clearance::{can_construct_with_clear_at, ClearDecision, Obstruction};
pub use element::{
    ElementKind, EntranceKind, Ownership, PathElement, SmallSceneryElement, SurfaceElement,
    TileElement, TrackElement,
};
pub use finance::Finance;
pub use rides::{Ride, RideType};
pub use stack::{SurfaceView, TileStack};

use rides::RideRegistry;

/// Vertical distance, in world-z units, within which litter is swept up.
const LITTER_SWEEP_RANGE_Z: u32 = 32;

/// Represents the authoritative landscaping world state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct World {
    map_size: u32,
    tiles: Vec<TileStack>,
    rides: RideRegistry,
    litter: Vec<Litter>,
    finance: Finance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Litter {
    cell: CellCoord,
    z: i32,
}

impl World {
    /// Creates a square map whose every cell holds a flat, unowned surface.
    ///
    /// Sizes above [`MAXIMUM_MAP_SIZE`] are clamped to it.
    #[must_use]
    pub fn new(map_size: u32) -> Self {
        let map_size = map_size.min(MAXIMUM_MAP_SIZE);
        let capacity = usize::try_from(map_size * map_size).unwrap_or(0);
        let mut flat = TileStack::default();
        let _ = flat.insert(TileElement::surface(
            DEFAULT_LAND_HEIGHT,
            SurfaceElement::default(),
        ));
        Self {
            map_size,
            tiles: vec![flat; capacity],
            rides: RideRegistry::default(),
            litter: Vec::new(),
            finance: Finance::default(),
        }
    }

    /// Inserts an element into the cell's stack, returning its position.
    ///
    /// The element lands above every element whose base is not higher than
    /// its own. Returns `None` when the cell lies outside the grid.
    pub fn insert_element(&mut self, cell: CellCoord, element: TileElement) -> Option<usize> {
        self.tile_mut(cell).map(|stack| stack.insert(element))
    }

    /// Replaces the surface of a cell with the provided height and payload.
    ///
    /// Returns `false` when the cell has no surface.
    pub fn configure_surface(
        &mut self,
        cell: CellCoord,
        height: u8,
        surface: SurfaceElement,
    ) -> bool {
        let Some(element) = self.tile_mut(cell).and_then(TileStack::surface_mut) else {
            return false;
        };
        element.set_heights(height, height);
        if let Some(payload) = element.as_surface_mut() {
            *payload = surface;
        }
        true
    }

    /// Changes the ownership of the land beneath a cell's surface.
    pub fn set_ownership(&mut self, cell: CellCoord, ownership: Ownership) -> bool {
        let Some(surface) = self
            .tile_mut(cell)
            .and_then(TileStack::surface_mut)
            .and_then(TileElement::as_surface_mut)
        else {
            return false;
        };
        surface.ownership = ownership;
        true
    }

    /// Stores a ride and returns its identifier.
    pub fn register_ride(&mut self, ride: Ride) -> RideId {
        self.rides.register(ride)
    }

    /// Drops a piece of litter at the provided world-z above a cell.
    pub fn drop_litter(&mut self, cell: CellCoord, z: i32) {
        self.litter.push(Litter { cell, z });
    }

    /// Replaces the park's cash balance.
    pub fn set_cash(&mut self, cash: Money) {
        self.finance.set_cash(cash);
    }

    fn tile_index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.map_size && cell.row() < self.map_size {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.map_size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn tile(&self, cell: CellCoord) -> Option<&TileStack> {
        self.tile_index(cell).and_then(|index| self.tiles.get(index))
    }

    fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut TileStack> {
        let index = self.tile_index(cell)?;
        self.tiles.get_mut(index)
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use landscape_core::{CellCoord, RideId};

    use super::{ElementKind, Finance, Ownership, Ride, SurfaceView, TileElement, TileStack, World};

    /// Largest column or row index that lies inside the playable area.
    ///
    /// The outermost ring of cells is the map edge and cannot be edited.
    #[must_use]
    pub fn max_coordinate(world: &World) -> u32 {
        world.map_size.saturating_sub(2)
    }

    /// Reports whether the cell lies inside the playable area.
    #[must_use]
    pub fn is_on_map(world: &World, cell: CellCoord) -> bool {
        let max = max_coordinate(world);
        cell.column() <= max && cell.row() <= max
    }

    /// Provides read-only access to the element stack of a cell.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<&TileStack> {
        world.tile(cell)
    }

    /// Locates the surface element of a cell.
    #[must_use]
    pub fn surface(world: &World, cell: CellCoord) -> Option<SurfaceView<'_>> {
        world.tile(cell).and_then(TileStack::surface)
    }

    /// Locates the footpath element of a cell resting at the provided base height.
    #[must_use]
    pub fn footpath_at(world: &World, cell: CellCoord, base_height: u8) -> Option<&TileElement> {
        world.tile(cell).and_then(|stack| {
            stack
                .find(|element| {
                    matches!(element.kind(), ElementKind::Path(_))
                        && element.base_height() == base_height
                })
                .map(|(_, element)| element)
        })
    }

    /// Reports whether the park owns the land beneath a cell.
    #[must_use]
    pub fn is_in_park(world: &World, cell: CellCoord) -> bool {
        surface(world, cell).is_some_and(|view| view.surface.ownership == Ownership::Owned)
    }

    /// Resolves a ride from its identifier.
    #[must_use]
    pub fn ride(world: &World, id: RideId) -> Option<&Ride> {
        world.rides.get(id)
    }

    /// Provides read-only access to the park ledger.
    #[must_use]
    pub fn finance(world: &World) -> &Finance {
        &world.finance
    }

    /// Counts the pieces of litter lying on a cell.
    #[must_use]
    pub fn litter_count(world: &World, cell: CellCoord) -> usize {
        world
            .litter
            .iter()
            .filter(|litter| litter.cell == cell)
            .count()
    }
}

/// Mutation functions used by systems to apply validated commands.
///
/// Each function reports what it changed through `out_events`.
pub mod mutate {
    use landscape_core::{CellCoord, Event, ExpenditureType, Money, SlopeStyle};

    use super::{TileElement, TileStack, World, LITTER_SWEEP_RANGE_Z};

    /// Sweeps up litter lying near the provided world-z above a cell.
    pub fn remove_litter(world: &mut World, cell: CellCoord, z: i32, out_events: &mut Vec<Event>) {
        let before = world.litter.len();
        world.litter.retain(|litter| {
            litter.cell != cell || litter.z.abs_diff(z) > LITTER_SWEEP_RANGE_Z
        });
        let count = before - world.litter.len();
        if count > 0 {
            out_events.push(Event::LitterRemoved {
                cell,
                count: u32::try_from(count).unwrap_or(u32::MAX),
            });
        }
    }

    /// Removes every wall intersecting the height range `low..high` of a cell.
    pub fn remove_walls_in_range(
        world: &mut World,
        cell: CellCoord,
        low: u8,
        high: u8,
        out_events: &mut Vec<Event>,
    ) {
        let Some(stack) = world.tile_mut(cell) else {
            return;
        };
        let removed = stack.remove_where(|element| {
            element.is_wall() && low < element.clearance_height() && high > element.base_height()
        });
        if !removed.is_empty() {
            out_events.push(Event::WallsRemoved {
                cell,
                count: u32::try_from(removed.len()).unwrap_or(u32::MAX),
            });
        }
    }

    /// Detaches every small scenery element of a cell accepted by `predicate`.
    ///
    /// Returns the detached elements from bottom to top. Elements of any other
    /// category are never offered to the predicate.
    pub fn remove_small_scenery_where<P>(
        world: &mut World,
        cell: CellCoord,
        mut predicate: P,
        out_events: &mut Vec<Event>,
    ) -> Vec<TileElement>
    where
        P: FnMut(&TileElement) -> bool,
    {
        let Some(stack) = world.tile_mut(cell) else {
            return Vec::new();
        };
        let removed = stack
            .remove_where(|element| element.as_small_scenery().is_some() && predicate(element));
        if !removed.is_empty() {
            out_events.push(Event::SmallSceneryRemoved {
                cell,
                count: u32::try_from(removed.len()).unwrap_or(u32::MAX),
            });
        }
        removed
    }

    /// Moves a cell's surface to the provided height and slope.
    ///
    /// Water at or below the new height drains away. Returns `false` when the
    /// cell has no surface.
    pub fn set_surface_height(
        world: &mut World,
        cell: CellCoord,
        height: u8,
        style: SlopeStyle,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(element) = world.tile_mut(cell).and_then(TileStack::surface_mut) else {
            return false;
        };
        element.set_heights(height, height);
        let slope = style.slope();
        if let Some(surface) = element.as_surface_mut() {
            surface.slope = slope;
            if surface.water_height != 0 && surface.water_height <= height {
                surface.water_height = 0;
            }
        }
        out_events.push(Event::SurfaceHeightChanged {
            cell,
            height,
            style: slope,
        });
        true
    }

    /// Requests a redraw of the cell.
    pub fn invalidate_tile(cell: CellCoord, out_events: &mut Vec<Event>) {
        out_events.push(Event::TileInvalidated { cell });
    }

    /// Charges the ledger and records the expenditure.
    pub fn charge(
        world: &mut World,
        amount: Money,
        category: ExpenditureType,
        out_events: &mut Vec<Event>,
    ) {
        world.finance.charge(amount, category);
        out_events.push(Event::FundsSpent { amount, category });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landscape_core::{Event, ExpenditureType, ObjectEntryId, SlopeStyle};

    fn wall(base: u8, clearance: u8) -> TileElement {
        TileElement::new(base, clearance, ElementKind::Wall(ObjectEntryId::new(1)))
    }

    #[test]
    fn new_world_is_flat_and_unowned() {
        let world = World::new(8);
        let cell = CellCoord::new(3, 5);
        let view = query::surface(&world, cell).expect("surface");

        assert_eq!(view.element.base_height(), DEFAULT_LAND_HEIGHT);
        assert_eq!(view.surface.slope, SlopeStyle::FLAT);
        assert!(!query::is_in_park(&world, cell));
        assert!(query::surface(&world, CellCoord::new(8, 0)).is_none());
    }

    #[test]
    fn outer_ring_is_off_map() {
        let world = World::new(8);
        assert!(query::is_on_map(&world, CellCoord::new(0, 6)));
        assert!(!query::is_on_map(&world, CellCoord::new(7, 1)));
        assert!(!query::is_on_map(&world, CellCoord::new(1, 7)));
    }

    #[test]
    fn ownership_marks_cell_in_park() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        assert!(world.set_ownership(cell, Ownership::Owned));
        assert!(query::is_in_park(&world, cell));
        assert!(world.set_ownership(cell, Ownership::ConstructionRightsOwned));
        assert!(!query::is_in_park(&world, cell));
    }

    #[test]
    fn set_surface_height_drains_submerged_water() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        assert!(world.configure_surface(
            cell,
            10,
            SurfaceElement {
                water_height: 16,
                ..SurfaceElement::default()
            },
        ));
        let mut events = Vec::new();

        assert!(mutate::set_surface_height(
            &mut world,
            cell,
            12,
            SlopeStyle::from_bits(0xe1),
            &mut events,
        ));
        let view = query::surface(&world, cell).expect("surface");
        assert_eq!(view.surface.water_height, 16, "water above the land stays");
        assert_eq!(view.surface.slope.bits(), 0x01, "style is masked to the slope bits");

        assert!(mutate::set_surface_height(&mut world, cell, 16, SlopeStyle::FLAT, &mut events));
        let view = query::surface(&world, cell).expect("surface");
        assert_eq!(view.surface.water_height, 0);
        assert_eq!(
            (view.element.base_height(), view.element.clearance_height()),
            (16, 16)
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn walls_are_removed_only_inside_range() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        let _ = world.insert_element(cell, wall(14, 18));
        let _ = world.insert_element(cell, wall(18, 22));
        let _ = world.insert_element(cell, wall(40, 44));
        let mut events = Vec::new();

        mutate::remove_walls_in_range(&mut world, cell, 12, 20, &mut events);

        let remaining: Vec<u8> = query::tile(&world, cell)
            .expect("tile")
            .iter()
            .filter(|element| element.is_wall())
            .map(TileElement::base_height)
            .collect();
        assert_eq!(remaining, vec![40]);
        assert_eq!(events, vec![Event::WallsRemoved { cell, count: 2 }]);
    }

    #[test]
    fn litter_is_swept_near_the_surface_only() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        world.drop_litter(cell, 112);
        world.drop_litter(cell, 140);
        world.drop_litter(cell, 300);
        world.drop_litter(CellCoord::new(3, 2), 112);
        let mut events = Vec::new();

        mutate::remove_litter(&mut world, cell, 112, &mut events);

        assert_eq!(query::litter_count(&world, cell), 1);
        assert_eq!(query::litter_count(&world, CellCoord::new(3, 2)), 1);
        assert_eq!(events, vec![Event::LitterRemoved { cell, count: 2 }]);
    }

    #[test]
    fn litter_at_extreme_heights_stays_put() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        world.drop_litter(cell, i32::MIN);
        world.drop_litter(cell, i32::MAX);
        let mut events = Vec::new();

        mutate::remove_litter(&mut world, cell, 112, &mut events);

        assert_eq!(query::litter_count(&world, cell), 2, "far litter is kept");
        assert!(events.is_empty());
    }

    #[test]
    fn oversized_maps_are_clamped() {
        let world = World::new(u32::MAX);

        assert_eq!(query::max_coordinate(&world), MAXIMUM_MAP_SIZE - 2);
        assert!(query::surface(&world, CellCoord::new(254, 254)).is_some());
        assert!(query::surface(&world, CellCoord::new(256, 0)).is_none());
    }

    #[test]
    fn charge_updates_ledger_and_reports() {
        let mut world = World::new(4);
        world.set_cash(Money::from_whole(50));
        let mut events = Vec::new();

        mutate::charge(&mut world, Money::new(200), ExpenditureType::Landscaping, &mut events);

        assert_eq!(query::finance(&world).cash(), Money::new(300));
        assert_eq!(
            events,
            vec![Event::FundsSpent {
                amount: Money::new(200),
                category: ExpenditureType::Landscaping,
            }]
        );
    }

    #[test]
    fn footpath_lookup_matches_base_height() {
        let mut world = World::new(8);
        let cell = CellCoord::new(2, 2);
        let _ = world.insert_element(
            cell,
            TileElement::new(14, 18, ElementKind::Path(PathElement { level_crossing: true })),
        );
        assert!(query::footpath_at(&world, cell, 14).is_some());
        assert!(query::footpath_at(&world, cell, 16).is_none());
    }
}
