#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host-side runner that authorizes, applies and records command envelopes.
//!
//! The runner is the single writer of the world. Every envelope is queried at
//! the moment of execution, checked against the ledger, executed, charged and
//! appended to a replay log of encoded envelopes. Replaying that log on an
//! equal world reproduces the same world, ledger and results.

use landscape_core::{
    ActionResult, CodecError, Command, CommandEnvelope, CommandFlags, Event, MessageArg,
    MessageId, Money, Policies, RejectionReason,
};
use landscape_system_land_height::LandSetHeightAction;
use landscape_world::{mutate, query, World};
use thiserror::Error;

/// Failures raised by the runner itself rather than by a command's rules.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The envelope could not be encoded for the replay log.
    #[error("failed to record command for replay")]
    Record(#[source] CodecError),
    /// A replay log entry could not be decoded.
    #[error("replay entry {index} is malformed")]
    Replay {
        /// Position of the entry within the log.
        index: usize,
        /// Decoding failure.
        #[source]
        source: CodecError,
    },
}

/// Applies command envelopes to a world and records them for replay.
#[derive(Debug, Default, Clone)]
pub struct CommandRunner {
    log: Vec<Vec<u8>>,
}

impl CommandRunner {
    /// Creates a runner with an empty replay log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded envelopes of every command applied so far, oldest first.
    #[must_use]
    pub fn log(&self) -> &[Vec<u8>] {
        &self.log
    }

    /// Authorizes and applies a single envelope.
    ///
    /// Rejections are returned as results and reported through
    /// [`Event::CommandRejected`]; only an envelope that cannot be recorded
    /// produces an error, and it does so before the world is touched.
    pub fn run(
        &mut self,
        world: &mut World,
        policies: &Policies,
        envelope: &CommandEnvelope,
        out_events: &mut Vec<Event>,
    ) -> Result<ActionResult, RunnerError> {
        let encoded = envelope.encode().map_err(RunnerError::Record)?;
        let Command::SetLandHeight(params) = envelope.command;
        let action = LandSetHeightAction::new(params);

        let projected = action.query(world, policies);
        if let Some(reason) = projected.reason {
            out_events.push(Event::CommandRejected {
                player: envelope.player,
                reason,
            });
            return Ok(projected);
        }

        let spends = !policies.no_money && !envelope.flags.contains(CommandFlags::NO_SPEND);
        if spends
            && projected.cost > Money::ZERO
            && !query::finance(world).can_afford(projected.cost)
        {
            tracing::warn!(
                target: "landscape::runner",
                player = envelope.player.get(),
                cost = %projected.cost,
                cash = %query::finance(world).cash(),
                "runner.command.unaffordable"
            );
            out_events.push(Event::CommandRejected {
                player: envelope.player,
                reason: RejectionReason::InsufficientFunds,
            });
            return Ok(ActionResult::disallowed(
                RejectionReason::InsufficientFunds,
                MessageId::NotEnoughCashRequires,
            )
            .with_args(vec![MessageArg::Money(projected.cost)]));
        }

        if envelope.flags.contains(CommandFlags::QUERY_ONLY) {
            return Ok(projected);
        }

        let applied = action.execute(world, policies, out_events);
        if let Some(reason) = applied.reason {
            out_events.push(Event::CommandRejected {
                player: envelope.player,
                reason,
            });
            return Ok(applied);
        }
        if spends && applied.cost != Money::ZERO {
            if let Some(category) = applied.expenditure {
                mutate::charge(world, applied.cost, category, out_events);
            }
        }

        tracing::info!(
            target: "landscape::runner",
            player = envelope.player.get(),
            sequence = self.log.len(),
            cost = %applied.cost,
            "runner.command.applied"
        );
        self.log.push(encoded);
        Ok(applied)
    }

    /// Decodes and runs every entry of a replay log in order.
    ///
    /// Returns the result of each entry. Stops at the first malformed entry.
    pub fn replay(
        &mut self,
        world: &mut World,
        policies: &Policies,
        log: &[Vec<u8>],
        out_events: &mut Vec<Event>,
    ) -> Result<Vec<ActionResult>, RunnerError> {
        let mut results = Vec::with_capacity(log.len());
        for (index, bytes) in log.iter().enumerate() {
            let envelope = CommandEnvelope::decode(bytes)
                .map_err(|source| RunnerError::Replay { index, source })?;
            results.push(self.run(world, policies, &envelope, out_events)?);
        }
        Ok(results)
    }
}
