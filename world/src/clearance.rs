//! Construction clearance checks and obstruction messages.

use landscape_core::{CellCoord, MessageArg, MessageId};

use crate::{
    element::{ElementKind, EntranceKind, TileElement},
    World,
};

/// Verdict of a clear callback for one overlapping element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearDecision {
    /// The element will be cleared or replaced by the construction.
    Clear,
    /// The element stays and blocks the construction.
    Obstruct,
}

/// Player-facing description of whatever blocks a construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obstruction {
    /// Message body.
    pub message: MessageId,
    /// Ordered message arguments.
    pub args: Vec<MessageArg>,
}

impl Obstruction {
    /// Describes the element as the thing in the way.
    #[must_use]
    pub fn describe(element: &TileElement) -> Self {
        let (message, args) = match element.kind() {
            ElementKind::Surface(_) => (MessageId::RaiseOrLowerLandFirst, Vec::new()),
            ElementKind::Path(_) => (MessageId::FootpathInTheWay, Vec::new()),
            ElementKind::Track(track) => (
                MessageId::ObjectInTheWay,
                vec![MessageArg::RideName(track.ride)],
            ),
            ElementKind::SmallScenery(scenery) => (
                MessageId::ObjectInTheWay,
                vec![MessageArg::ObjectName(scenery.entry)],
            ),
            ElementKind::Entrance(EntranceKind::ParkEntrance) => {
                (MessageId::ParkEntranceInTheWay, Vec::new())
            }
            ElementKind::Entrance(
                EntranceKind::RideEntrance(ride) | EntranceKind::RideExit(ride),
            ) => (MessageId::ObjectInTheWay, vec![MessageArg::RideName(*ride)]),
            ElementKind::Wall(entry) | ElementKind::LargeScenery(entry) | ElementKind::Banner(entry) => {
                (MessageId::ObjectInTheWay, vec![MessageArg::ObjectName(*entry)])
            }
        };
        Self { message, args }
    }

    fn off_map() -> Self {
        Self {
            message: MessageId::OffEdgeOfMap,
            args: Vec::new(),
        }
    }
}

/// Checks whether the volume `base_height..top_height` of a cell can be built in.
///
/// Every real element overlapping the volume is offered to `clear`; the first
/// element it refuses to clear is reported. Walls hug cell edges rather than
/// filling the volume and are never offered.
pub fn can_construct_with_clear_at<F>(
    world: &World,
    cell: CellCoord,
    base_height: u8,
    top_height: u8,
    mut clear: F,
) -> Result<(), Obstruction>
where
    F: FnMut(&TileElement) -> ClearDecision,
{
    let Some(stack) = world.tile(cell) else {
        return Err(Obstruction::off_map());
    };

    for element in stack.iter() {
        if element.is_ghost() || element.is_wall() {
            continue;
        }
        let overlaps =
            top_height > element.base_height() && base_height < element.clearance_height();
        if overlaps && clear(element) == ClearDecision::Obstruct {
            return Err(Obstruction::describe(element));
        }
    }
    Ok(())
}
