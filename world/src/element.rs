//! Heterogeneous elements stacked inside a single cell.

use landscape_core::{ObjectEntryId, RideId, SlopeStyle};

/// Single object occupying a vertical range of a cell.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileElement {
    base_height: u8,
    clearance_height: u8,
    ghost: bool,
    kind: ElementKind,
}

impl TileElement {
    /// Creates a real element spanning `base_height..=clearance_height`.
    #[must_use]
    pub const fn new(base_height: u8, clearance_height: u8, kind: ElementKind) -> Self {
        Self {
            base_height,
            clearance_height,
            ghost: false,
            kind,
        }
    }

    /// Creates a flat surface element at the provided height.
    #[must_use]
    pub const fn surface(height: u8, surface: SurfaceElement) -> Self {
        Self::new(height, height, ElementKind::Surface(surface))
    }

    /// Marks the element as a placement preview.
    #[must_use]
    pub fn into_ghost(mut self) -> Self {
        self.ghost = true;
        self
    }

    /// Lower vertical extent in height units.
    #[must_use]
    pub const fn base_height(&self) -> u8 {
        self.base_height
    }

    /// Upper vertical extent in height units.
    #[must_use]
    pub const fn clearance_height(&self) -> u8 {
        self.clearance_height
    }

    /// Reports whether the element is a preview that never obstructs.
    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        self.ghost
    }

    /// Type-specific payload.
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Surface payload when the element is a surface.
    #[must_use]
    pub const fn as_surface(&self) -> Option<&SurfaceElement> {
        match &self.kind {
            ElementKind::Surface(surface) => Some(surface),
            _ => None,
        }
    }

    /// Small scenery payload when the element is small scenery.
    #[must_use]
    pub const fn as_small_scenery(&self) -> Option<&SmallSceneryElement> {
        match &self.kind {
            ElementKind::SmallScenery(scenery) => Some(scenery),
            _ => None,
        }
    }

    /// Reports whether the element is a wall.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        matches!(self.kind, ElementKind::Wall(_))
    }

    pub(crate) fn set_heights(&mut self, base_height: u8, clearance_height: u8) {
        self.base_height = base_height;
        self.clearance_height = clearance_height;
    }

    pub(crate) fn as_surface_mut(&mut self) -> Option<&mut SurfaceElement> {
        match &mut self.kind {
            ElementKind::Surface(surface) => Some(surface),
            _ => None,
        }
    }
}

/// Closed set of element categories.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Terrain surface; exactly one per populated cell.
    Surface(SurfaceElement),
    /// Footpath segment.
    Path(PathElement),
    /// Ride track piece.
    Track(TrackElement),
    /// Small scenery item such as a tree or bench.
    SmallScenery(SmallSceneryElement),
    /// Ride or park entrance.
    Entrance(EntranceKind),
    /// Wall segment.
    Wall(ObjectEntryId),
    /// Piece of a multi-cell scenery object.
    LargeScenery(ObjectEntryId),
    /// Banner.
    Banner(ObjectEntryId),
}

/// Ownership state of the land beneath a surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The park owns neither the land nor construction rights.
    #[default]
    Unowned,
    /// The park owns the land.
    Owned,
    /// The park may build above or below the land but does not own it.
    ConstructionRightsOwned,
}

/// Payload of a terrain surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SurfaceElement {
    /// Raised corners and diagonal flag.
    pub slope: SlopeStyle,
    /// Water level in height units; zero when the cell holds no water.
    pub water_height: u8,
    /// Ownership of the land.
    pub ownership: Ownership,
    /// Set when track above relies on the water, such as boat rides.
    pub track_needs_water: bool,
}

/// Payload of a footpath segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PathElement {
    /// Set when the path crosses railway track on the same level.
    pub level_crossing: bool,
}

/// Payload of a ride track piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrackElement {
    /// Ride owning the track.
    pub ride: RideId,
}

/// Payload of a small scenery item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SmallSceneryElement {
    /// Object definition of the item.
    pub entry: ObjectEntryId,
    /// Price of removing the item, in whole currency units.
    pub removal_price: i16,
    /// Set for trees, which parks may protect from removal.
    pub is_tree: bool,
}

/// Kinds of entrance elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntranceKind {
    /// Entrance of a ride.
    RideEntrance(RideId),
    /// Exit of a ride.
    RideExit(RideId),
    /// Entrance of the park.
    ParkEntrance,
}
