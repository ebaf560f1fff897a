#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Land height command: raises, lowers or reshapes the surface of one cell.
//!
//! The command runs in two phases. [`LandSetHeightAction::query`] evaluates
//! every rule against a shared borrow of the world and projects the cost;
//! [`LandSetHeightAction::execute`] clears what the edit displaces, reshapes
//! the surface and reports the realized cost. Execution trusts an earlier
//! query and does not repeat the rejection chain. [`LandHeightEdit`] tracks the
//! phases explicitly for callers that hold a command across both.

mod cost;
mod obstruction;
mod params;

use landscape_core::{
    ActionResult, Event, ExpenditureType, LandSetHeightParams, MessageId, Money, Policies,
    RejectionReason, COORDS_Z_STEP,
};
use landscape_world::{can_construct_with_clear_at, mutate, query, Obstruction, TileElement, World};
use thiserror::Error;

pub use cost::HEIGHT_UNIT_COST;

use cost::{removal_price, small_scenery_removal_cost, surface_height_change_cost};
use obstruction::{
    find_floating_structure, find_overextended_support, find_protected_tree,
    find_unremovable_obstruction, has_level_crossing, is_cleared_scenery, land_height_clear,
    upper_corner_height,
};
use params::check_parameters;

/// Height below the target from which walls are cleared.
const WALL_CLEARING_DEPTH: u8 = 2;

/// Height above the target up to which walls are cleared.
const WALL_CLEARING_REACH: u8 = 4;

/// Command that moves a cell's surface to a new height and slope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandSetHeightAction {
    params: LandSetHeightParams,
}

impl LandSetHeightAction {
    /// Creates the command from its parameters.
    #[must_use]
    pub const fn new(params: LandSetHeightParams) -> Self {
        Self { params }
    }

    /// Parameters the command was created with.
    #[must_use]
    pub const fn params(&self) -> LandSetHeightParams {
        self.params
    }

    /// Validates the command without touching the world and projects its cost.
    #[must_use]
    pub fn query(&self, world: &World, policies: &Policies) -> ActionResult {
        let result = self.evaluate(world, policies);
        if let Some(reason) = result.reason {
            tracing::debug!(
                target: "landscape::land_height",
                column = self.params.cell.column(),
                row = self.params.cell.row(),
                height = self.params.height,
                reason = ?reason,
                message = ?result.error_message,
                "land_height.query.rejected"
            );
        }
        result
    }

    /// Price of the small scenery the command would clear, for previews.
    #[must_use]
    pub fn scenery_removal_cost(&self, world: &World) -> Money {
        query::tile(world, self.params.cell).map_or(Money::ZERO, |stack| {
            small_scenery_removal_cost(stack, self.params.height)
        })
    }

    /// Applies the command and reports the realized cost.
    ///
    /// Litter near the current surface is swept, and unless clearance checks
    /// are disabled the walls and small scenery in the way are removed. The
    /// position hint is the cell centre at the surface height before the edit.
    /// Returns an `Unknown` result without mutating anything when the cell has
    /// no surface.
    pub fn execute(
        &self,
        world: &mut World,
        policies: &Policies,
        out_events: &mut Vec<Event>,
    ) -> ActionResult {
        let LandSetHeightParams {
            cell,
            height,
            style,
        } = self.params;

        let Some(previous_height) =
            query::surface(world, cell).map(|surface| surface.element.base_height())
        else {
            return ActionResult::unknown();
        };
        let surface_z = i32::from(previous_height) * COORDS_Z_STEP;
        mutate::remove_litter(world, cell, surface_z, out_events);

        let mut cost = Money::ZERO;
        if !policies.disable_clearance_checks {
            mutate::remove_walls_in_range(
                world,
                cell,
                height.saturating_sub(WALL_CLEARING_DEPTH),
                height.saturating_add(WALL_CLEARING_REACH),
                out_events,
            );
            let removed = mutate::remove_small_scenery_where(
                world,
                cell,
                |element| is_cleared_scenery(element, height),
                out_events,
            );
            cost += removed.iter().map(removal_price).sum::<Money>();
        }

        let Some(surface) = query::surface(world, cell) else {
            return ActionResult::unknown();
        };
        cost += surface_height_change_cost(&surface, height, style);

        if !mutate::set_surface_height(world, cell, height, style, out_events) {
            return ActionResult::unknown();
        }
        mutate::invalidate_tile(cell, out_events);

        tracing::info!(
            target: "landscape::land_height",
            column = cell.column(),
            row = cell.row(),
            from = previous_height,
            to = height,
            style = style.slope().bits(),
            cost = %cost,
            "land_height.executed"
        );

        ActionResult::ok(cost, ExpenditureType::Landscaping)
            .with_position(cell.centre_at(surface_z))
    }

    fn evaluate(&self, world: &World, policies: &Policies) -> ActionResult {
        let LandSetHeightParams {
            cell,
            height,
            style,
        } = self.params;

        if policies.forbid_landscape_changes {
            return ActionResult::disallowed(
                RejectionReason::PolicyForbidden,
                MessageId::ForbiddenByLocalAuthority,
            );
        }
        if let Err(error) = check_parameters(world, &self.params) {
            return ActionResult::disallowed(
                RejectionReason::ParameterOutOfRange(error),
                error.message(),
            );
        }
        if !(policies.sandbox_mode || policies.scenario_editor) && !query::is_in_park(world, cell)
        {
            return ActionResult::disallowed(
                RejectionReason::OwnershipViolation,
                MessageId::LandNotOwnedByPark,
            );
        }

        let Some(stack) = query::tile(world, cell) else {
            return ActionResult::unknown();
        };

        let clearance_checks = !policies.disable_clearance_checks;
        let mut scenery_cost = Money::ZERO;
        if clearance_checks {
            if policies.forbid_tree_removal {
                if let Some(tree) = find_protected_tree(stack, height) {
                    return obstructed(RejectionReason::ProtectedObstruction, tree);
                }
            }
            scenery_cost = small_scenery_removal_cost(stack, height);
        }

        if !policies.disable_support_limits
            && find_overextended_support(world, stack, height).is_some()
        {
            return ActionResult::disallowed(
                RejectionReason::CapacityExceeded,
                MessageId::SupportsCantBeExtended,
            );
        }

        let Some(surface) = stack.surface() else {
            return ActionResult::unknown();
        };

        if has_level_crossing(world, cell, surface.element.base_height()) {
            return ActionResult::disallowed(
                RejectionReason::GeometricConflict,
                MessageId::RemoveLevelCrossingFirst,
            );
        }

        if let Some(element) = find_floating_structure(stack, &surface, height, style) {
            return obstructed(RejectionReason::GeometricConflict, element);
        }

        if clearance_checks {
            let upper_corner = upper_corner_height(height, style);
            if let Err(obstruction) =
                can_construct_with_clear_at(world, cell, height, upper_corner, land_height_clear)
            {
                return ActionResult::disallowed(
                    RejectionReason::GeometricConflict,
                    obstruction.message,
                )
                .with_args(obstruction.args);
            }
            if let Some(element) =
                find_unremovable_obstruction(stack, surface.index, height, upper_corner)
            {
                return obstructed(RejectionReason::GeometricConflict, element);
            }
        }

        let cost = scenery_cost + surface_height_change_cost(&surface, height, style);
        ActionResult::ok(cost, ExpenditureType::Landscaping)
    }
}

fn obstructed(reason: RejectionReason, element: &TileElement) -> ActionResult {
    let Obstruction { message, args } = Obstruction::describe(element);
    ActionResult::disallowed(reason, message).with_args(args)
}

/// Phase of a [`LandHeightEdit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditState {
    /// The command has not been queried yet.
    Unvalidated,
    /// The query succeeded with the projected cost.
    Validated {
        /// Cost projected by the query.
        cost: Money,
    },
    /// The query refused the command.
    Rejected(RejectionReason),
    /// The command was applied with the realized cost.
    Executed {
        /// Cost reported by the execution.
        cost: Money,
    },
}

/// Invalid transitions of a [`LandHeightEdit`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommitError {
    /// The edit was committed before a successful query.
    #[error("land height edit must be validated before it is committed")]
    NotValidated,
    /// The edit was committed after its query refused it.
    #[error("land height edit was rejected: {0:?}")]
    Rejected(RejectionReason),
    /// The edit was already applied.
    #[error("land height edit was already executed")]
    AlreadyExecuted,
}

/// Land height command paired with the explicit phase it has reached.
///
/// `validate` may be repeated until the edit is executed; `commit` is only
/// accepted from [`EditState::Validated`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandHeightEdit {
    action: LandSetHeightAction,
    state: EditState,
}

impl LandHeightEdit {
    /// Creates an unvalidated edit.
    #[must_use]
    pub const fn new(params: LandSetHeightParams) -> Self {
        Self {
            action: LandSetHeightAction::new(params),
            state: EditState::Unvalidated,
        }
    }

    /// Phase the edit has reached.
    #[must_use]
    pub const fn state(&self) -> EditState {
        self.state
    }

    /// Queries the command and records the verdict.
    pub fn validate(
        &mut self,
        world: &World,
        policies: &Policies,
    ) -> Result<ActionResult, CommitError> {
        if matches!(self.state, EditState::Executed { .. }) {
            return Err(CommitError::AlreadyExecuted);
        }
        let result = self.action.query(world, policies);
        self.state = match result.reason {
            None => EditState::Validated { cost: result.cost },
            Some(reason) => EditState::Rejected(reason),
        };
        Ok(result)
    }

    /// Executes a validated edit.
    pub fn commit(
        &mut self,
        world: &mut World,
        policies: &Policies,
        out_events: &mut Vec<Event>,
    ) -> Result<ActionResult, CommitError> {
        match self.state {
            EditState::Unvalidated => Err(CommitError::NotValidated),
            EditState::Rejected(reason) => Err(CommitError::Rejected(reason)),
            EditState::Executed { .. } => Err(CommitError::AlreadyExecuted),
            EditState::Validated { .. } => {
                let result = self.action.execute(world, policies, out_events);
                self.state = match result.reason {
                    None => EditState::Executed { cost: result.cost },
                    Some(reason) => EditState::Rejected(reason),
                };
                Ok(result)
            }
        }
    }
}
