//! Parameter validation run before any rule touches the element stack.

use landscape_core::{LandSetHeightParams, ParameterError, MAXIMUM_LAND_HEIGHT, MINIMUM_LAND_HEIGHT};
use landscape_world::{query, World};

/// Validates the cell, height and style of a land height change.
///
/// Rules are checked in order and the first failure wins. Slopes lift their
/// raised corners above the base, so sloped surfaces must stay further below
/// the maximum than flat ones.
pub(crate) fn check_parameters(
    world: &World,
    params: &LandSetHeightParams,
) -> Result<(), ParameterError> {
    if !query::is_on_map(world, params.cell) {
        return Err(ParameterError::OffMap);
    }
    if params.height < MINIMUM_LAND_HEIGHT {
        return Err(ParameterError::TooLow);
    }
    if params.height > MAXIMUM_LAND_HEIGHT {
        return Err(ParameterError::TooHigh);
    }
    if params.height > MAXIMUM_LAND_HEIGHT - 2 && params.style.has_slope() {
        return Err(ParameterError::TooHigh);
    }
    if params.height == MAXIMUM_LAND_HEIGHT - 2 && params.style.is_diagonal() {
        return Err(ParameterError::TooHigh);
    }
    Ok(())
}
