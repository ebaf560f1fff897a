#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the landscaping engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters wrap a [`Command`] in a
//! [`CommandEnvelope`] for transport and replay, systems validate and apply
//! commands against the world, and every outcome is reported as an
//! [`ActionResult`] together with [`Event`] values describing what changed.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
};

use serde::{Deserialize, Serialize};

mod envelope;

pub use envelope::{CodecError, CommandEnvelope, CommandFlags, PlayerId};

/// Lowest base height a surface element may be lowered to.
pub const MINIMUM_LAND_HEIGHT: u8 = 2;

/// Highest base height a surface element may be raised to.
pub const MAXIMUM_LAND_HEIGHT: u8 = 142;

/// Base height given to every surface of a freshly created map.
pub const DEFAULT_LAND_HEIGHT: u8 = 14;

/// Largest number of cells along each edge of a map.
pub const MAXIMUM_MAP_SIZE: u32 = 256;

/// Width of a single cell measured in world-xy units.
pub const COORDS_XY_STEP: i32 = 32;

/// Number of world-z units covered by one height unit.
pub const COORDS_Z_STEP: i32 = 8;

/// Height added to a corner raised by the slope style.
pub const SLOPE_CORNER_STEP: u8 = 2;

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Raises, lowers or reshapes the surface of a single cell.
    SetLandHeight(LandSetHeightParams),
}

/// Parameters of a land height change, fixed for the lifetime of a command.
///
/// The serialized record is order stable: column, row, height, style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandSetHeightParams {
    /// Cell whose surface is reshaped.
    pub cell: CellCoord,
    /// Target base height of the surface, in height units.
    pub height: u8,
    /// Target slope style of the surface.
    pub style: SlopeStyle,
}

impl LandSetHeightParams {
    /// Creates a new parameter record.
    #[must_use]
    pub const fn new(cell: CellCoord, height: u8, style: SlopeStyle) -> Self {
        Self {
            cell,
            height,
            style,
        }
    }
}

/// Events broadcast by the world after a command mutated it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a surface element received a new height and slope.
    SurfaceHeightChanged {
        /// Cell owning the surface.
        cell: CellCoord,
        /// New base height of the surface.
        height: u8,
        /// New slope style of the surface.
        style: SlopeStyle,
    },
    /// Reports small scenery removed to make room for a surface change.
    SmallSceneryRemoved {
        /// Cell the scenery was removed from.
        cell: CellCoord,
        /// Number of elements detached from the stack.
        count: u32,
    },
    /// Reports walls removed to make room for a surface change.
    WallsRemoved {
        /// Cell the walls were removed from.
        cell: CellCoord,
        /// Number of elements detached from the stack.
        count: u32,
    },
    /// Reports litter cleared from a cell.
    LitterRemoved {
        /// Cell the litter was cleared from.
        cell: CellCoord,
        /// Number of litter items cleared.
        count: u32,
    },
    /// Requests that presentation layers redraw the provided cell.
    TileInvalidated {
        /// Cell whose appearance changed.
        cell: CellCoord,
    },
    /// Confirms that the ledger recorded an expenditure.
    FundsSpent {
        /// Amount charged to the ledger.
        amount: Money,
        /// Category the expenditure was booked under.
        category: ExpenditureType,
    },
    /// Reports that a command was rejected before reaching the world.
    CommandRejected {
        /// Player that issued the command.
        player: PlayerId,
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World position of the centre of the cell at the provided world-z.
    #[must_use]
    pub fn centre_at(self, z: i32) -> WorldPosition {
        let half = COORDS_XY_STEP / 2;
        WorldPosition {
            x: i32::try_from(self.column)
                .unwrap_or(i32::MAX / COORDS_XY_STEP)
                .saturating_mul(COORDS_XY_STEP)
                .saturating_add(half),
            y: i32::try_from(self.row)
                .unwrap_or(i32::MAX / COORDS_XY_STEP)
                .saturating_mul(COORDS_XY_STEP)
                .saturating_add(half),
            z,
        }
    }
}

/// Point in world units used for camera and sound hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldPosition {
    /// Horizontal world-x coordinate.
    pub x: i32,
    /// Horizontal world-y coordinate.
    pub y: i32,
    /// Vertical world-z coordinate.
    pub z: i32,
}

/// One of the four corners of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    /// Corner toward decreasing rows and columns.
    North,
    /// Corner toward decreasing rows and increasing columns.
    East,
    /// Corner toward increasing rows and columns.
    South,
    /// Corner toward increasing rows and decreasing columns.
    West,
}

impl Corner {
    /// Every corner in direction order.
    pub const ALL: [Corner; 4] = [Corner::North, Corner::East, Corner::South, Corner::West];

    /// Slope bit raising this corner.
    #[must_use]
    pub const fn raised_bit(self) -> u8 {
        match self {
            Self::North => SlopeStyle::NORTH_UP,
            Self::East => SlopeStyle::EAST_UP,
            Self::South => SlopeStyle::SOUTH_UP,
            Self::West => SlopeStyle::WEST_UP,
        }
    }

    /// Corner diagonally across the cell.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

/// Bitfield describing which corners of a surface are raised.
///
/// The low nibble holds one bit per raised corner and bit four marks the
/// steep diagonal slope, where three corners are raised and the corner
/// opposite the lowered one peaks a further step up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlopeStyle(u8);

impl SlopeStyle {
    /// North corner raised.
    pub const NORTH_UP: u8 = 0x01;
    /// East corner raised.
    pub const EAST_UP: u8 = 0x02;
    /// South corner raised.
    pub const SOUTH_UP: u8 = 0x04;
    /// West corner raised.
    pub const WEST_UP: u8 = 0x08;
    /// All raised-corner bits.
    pub const RAISED_CORNERS_MASK: u8 = 0x0f;
    /// Steep diagonal slope flag.
    pub const DIAGONAL_FLAG: u8 = 0x10;
    /// Every bit that contributes to the slope.
    pub const SLOPE_MASK: u8 = Self::RAISED_CORNERS_MASK | Self::DIAGONAL_FLAG;

    /// Flat surface.
    pub const FLAT: Self = Self(0);

    /// Wraps raw style bits exactly as received.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Raw style bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Style bits restricted to the slope mask.
    #[must_use]
    pub const fn slope(&self) -> Self {
        Self(self.0 & Self::SLOPE_MASK)
    }

    /// Reports whether any slope bit, raised corner or diagonal, is set.
    #[must_use]
    pub const fn has_slope(&self) -> bool {
        self.0 & Self::SLOPE_MASK != 0
    }

    /// Reports whether any corner is raised.
    #[must_use]
    pub const fn has_raised_corners(&self) -> bool {
        self.0 & Self::RAISED_CORNERS_MASK != 0
    }

    /// Reports whether the diagonal flag is set.
    #[must_use]
    pub const fn is_diagonal(&self) -> bool {
        self.0 & Self::DIAGONAL_FLAG != 0
    }

    /// Reports whether the provided corner is raised.
    #[must_use]
    pub const fn is_raised(&self, corner: Corner) -> bool {
        self.0 & corner.raised_bit() != 0
    }

    /// Effective height of one corner for a surface at `base_height`.
    ///
    /// A raised corner sits one slope step above the base. The peak of a
    /// diagonal slope, the corner opposite the only lowered corner, sits two
    /// steps above it.
    #[must_use]
    pub const fn corner_height(&self, base_height: u8, corner: Corner) -> i32 {
        let mut height = base_height as i32;
        if self.is_raised(corner) {
            height += SLOPE_CORNER_STEP as i32;
            let peak = (Self::RAISED_CORNERS_MASK & !corner.opposite().raised_bit())
                | Self::DIAGONAL_FLAG;
            if self.slope().0 == peak {
                height += SLOPE_CORNER_STEP as i32;
            }
        }
        height
    }
}

/// Signed amount of money counted in tenths of the currency unit.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Money(i64);

impl Money {
    /// No money.
    pub const ZERO: Self = Self(0);

    /// Wraps an amount expressed in tenths of the currency unit.
    #[must_use]
    pub const fn new(tenths: i64) -> Self {
        Self(tenths)
    }

    /// Converts a whole currency amount into money.
    #[must_use]
    pub const fn from_whole(units: i64) -> Self {
        Self(units.saturating_mul(10))
    }

    /// Amount expressed in tenths of the currency unit.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Multiplies the amount by an integer factor, saturating on overflow.
    #[must_use]
    pub const fn times(self, factor: i64) -> Self {
        Self(self.0.saturating_mul(factor))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", magnitude / 10, (magnitude % 10) * 10)
    }
}

/// Ledger category an expenditure is booked under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenditureType {
    /// Terrain shaping and clearing.
    Landscaping,
}

/// Unique identifier assigned to a ride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RideId(u16);

impl RideId {
    /// Creates a new ride identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }
}

/// Index of a loaded scenery, wall or banner object definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectEntryId(u16);

impl ObjectEntryId {
    /// Creates a new object entry identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }
}

/// Outcome class of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The command is legal or was applied.
    Ok,
    /// The command was refused.
    Disallowed,
    /// The world was in an unexpected state.
    Unknown,
}

/// Identifier of a localized message. Formatting happens in presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageId {
    /// No message.
    None,
    /// Landscaping is forbidden by the local authority.
    ForbiddenByLocalAuthority,
    /// The land is not owned by the park.
    LandNotOwnedByPark,
    /// The location is off the edge of the map.
    OffEdgeOfMap,
    /// The requested height is too low.
    TooLow,
    /// The requested height is too high.
    TooHigh,
    /// Ride supports cannot be extended any further.
    SupportsCantBeExtended,
    /// A level crossing must be removed first.
    RemoveLevelCrossingFirst,
    /// The first argument names an object in the way.
    ObjectInTheWay,
    /// A footpath is in the way.
    FootpathInTheWay,
    /// The park entrance is in the way.
    ParkEntranceInTheWay,
    /// Neighbouring land must be raised or lowered first.
    RaiseOrLowerLandFirst,
    /// Not enough cash; the first argument holds the required amount.
    NotEnoughCashRequires,
}

/// Ordered argument substituted into a localized message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageArg {
    /// Name of a ride.
    RideName(RideId),
    /// Name of an object definition.
    ObjectName(ObjectEntryId),
    /// Formatted amount of money.
    Money(Money),
    /// A nested message.
    Message(MessageId),
}

/// Reasons a command parameter set fails validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterError {
    /// The cell lies outside the playable map.
    OffMap,
    /// The height is below the minimum land height.
    TooLow,
    /// The height, or the height plus slope, exceeds the maximum.
    TooHigh,
}

impl ParameterError {
    /// Message shown to players for the failure.
    #[must_use]
    pub const fn message(self) -> MessageId {
        match self {
            Self::OffMap => MessageId::OffEdgeOfMap,
            Self::TooLow => MessageId::TooLow,
            Self::TooHigh => MessageId::TooHigh,
        }
    }
}

/// Reasons a command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// A park-wide policy forbids the edit.
    PolicyForbidden,
    /// The cell lies outside park-owned territory.
    OwnershipViolation,
    /// A parameter is out of range.
    ParameterOutOfRange(ParameterError),
    /// A protected tree would have to be removed.
    ProtectedObstruction,
    /// Ride supports would exceed the ride's height ceiling.
    CapacityExceeded,
    /// An element would be left floating, embedded or cut through.
    GeometricConflict,
    /// The ledger cannot cover the cost.
    InsufficientFunds,
    /// The world was in an unexpected state.
    Unknown,
}

/// Structured outcome of querying or executing a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionResult {
    /// Outcome class.
    pub status: Status,
    /// Specific rejection reason, present whenever `status` is not [`Status::Ok`].
    pub reason: Option<RejectionReason>,
    /// Body of the error message, if any.
    pub error_message: MessageId,
    /// Ordered arguments for the error message.
    pub message_args: Vec<MessageArg>,
    /// Projected or realized cost.
    pub cost: Money,
    /// Position hint for camera and sound effects.
    pub position: Option<WorldPosition>,
    /// Ledger category the cost belongs to.
    pub expenditure: Option<ExpenditureType>,
}

impl ActionResult {
    /// Creates a successful result with the provided cost.
    #[must_use]
    pub fn ok(cost: Money, expenditure: ExpenditureType) -> Self {
        Self {
            status: Status::Ok,
            reason: None,
            error_message: MessageId::None,
            message_args: Vec::new(),
            cost,
            position: None,
            expenditure: Some(expenditure),
        }
    }

    /// Creates a refusal carrying the rejection reason and message.
    #[must_use]
    pub fn disallowed(reason: RejectionReason, message: MessageId) -> Self {
        Self {
            status: Status::Disallowed,
            reason: Some(reason),
            error_message: message,
            message_args: Vec::new(),
            cost: Money::ZERO,
            position: None,
            expenditure: None,
        }
    }

    /// Creates a result reporting an unexpected world state.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            status: Status::Unknown,
            reason: Some(RejectionReason::Unknown),
            error_message: MessageId::None,
            message_args: Vec::new(),
            cost: Money::ZERO,
            position: None,
            expenditure: None,
        }
    }

    /// Replaces the message arguments.
    #[must_use]
    pub fn with_args(mut self, args: Vec<MessageArg>) -> Self {
        self.message_args = args;
        self
    }

    /// Replaces the position hint.
    #[must_use]
    pub fn with_position(mut self, position: WorldPosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Reports whether the command succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}

/// Park and cheat settings consulted by commands.
///
/// Passed explicitly into every query and execution so that the same command
/// yields the same outcome for every peer holding the same settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Policies {
    /// Forbids every landscape change.
    pub forbid_landscape_changes: bool,
    /// Forbids removing trees while landscaping.
    pub forbid_tree_removal: bool,
    /// Allows building on land the park does not own.
    pub sandbox_mode: bool,
    /// Marks the session as the scenario editor, which ignores ownership.
    pub scenario_editor: bool,
    /// Skips clearance checks and scenery clearing.
    pub disable_clearance_checks: bool,
    /// Skips ride support height limits.
    pub disable_support_limits: bool,
    /// Runs the park without money, so nothing is charged.
    pub no_money: bool,
}
