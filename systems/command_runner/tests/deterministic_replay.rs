use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use landscape_core::{
    ActionResult, CellCoord, Command, CommandEnvelope, CommandFlags, ExpenditureType,
    LandSetHeightParams, Money, ObjectEntryId, PlayerId, Policies, SlopeStyle, Status,
};
use landscape_system_command_runner::CommandRunner;
use landscape_world::{
    query, ElementKind, Ownership, Ride, RideType, SmallSceneryElement, TileElement,
    TrackElement, World,
};

#[test]
fn replaying_the_log_reproduces_world_and_ledger() {
    let first = play(scripted_commands());
    let second = play(scripted_commands());

    assert_eq!(first.world, second.world, "live runs diverged");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert!(
        first.results.iter().any(|result| !result.is_ok()),
        "the script must exercise rejections"
    );

    let mut replayed_world = scenario_world();
    let mut replay_runner = CommandRunner::new();
    let replayed = replay_runner
        .replay(
            &mut replayed_world,
            &Policies::default(),
            &first.log,
            &mut Vec::new(),
        )
        .expect("log decodes");

    let applied: Vec<ActionResult> = scripted_commands()
        .iter()
        .zip(&first.results)
        .filter(|(envelope, result)| {
            result.is_ok() && !envelope.flags.contains(CommandFlags::QUERY_ONLY)
        })
        .map(|(_, result)| result.clone())
        .collect();
    assert_eq!(replayed.len(), first.log.len());
    assert_eq!(
        replayed, applied,
        "replay must reproduce every applied result"
    );
    assert_eq!(replayed_world, first.world, "replay diverged from live run");
    assert_eq!(replay_runner.log(), first.log.as_slice());
    assert_eq!(
        query::finance(&replayed_world),
        query::finance(&first.world)
    );
}

#[test]
fn scripted_run_charges_the_ledger() {
    let outcome = play(scripted_commands());
    let finance = query::finance(&outcome.world);

    let charged: Money = [0, 1, 2, 6]
        .iter()
        .map(|&index| outcome.results[index].cost)
        .sum();
    assert_eq!(charged, Money::new(270 + 150 + 1_000 + 700));
    assert!(outcome.results[7].is_ok());
    assert!(
        outcome.results[7].cost > Money::ZERO,
        "NO_SPEND commands are priced but not charged"
    );
    assert_eq!(finance.spent(ExpenditureType::Landscaping), charged);
    assert_eq!(finance.cash(), Money::from_whole(1_000) - charged);
    assert_eq!(
        outcome.results[3].status,
        Status::Ok,
        "query-only envelopes report their projection"
    );
    assert_eq!(
        outcome.log.len(),
        outcome.results.iter().filter(|result| result.is_ok()).count() - 1,
        "query-only envelopes are not recorded"
    );
}

struct ReplayOutcome {
    world: World,
    results: Vec<ActionResult>,
    log: Vec<Vec<u8>>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.world.hash(&mut hasher);
        self.log.hash(&mut hasher);
        for result in &self.results {
            result.status.hash(&mut hasher);
            result.reason.hash(&mut hasher);
            result.cost.hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn play(envelopes: Vec<CommandEnvelope>) -> ReplayOutcome {
    let mut world = scenario_world();
    let mut runner = CommandRunner::new();
    let mut events = Vec::new();
    let results = envelopes
        .iter()
        .map(|envelope| {
            runner
                .run(&mut world, &Policies::default(), envelope, &mut events)
                .expect("run")
        })
        .collect();
    ReplayOutcome {
        world,
        results,
        log: runner.log().to_vec(),
    }
}

fn scenario_world() -> World {
    let mut world = World::new(24);
    world.set_cash(Money::from_whole(1_000));
    for column in 4..12 {
        for row in 4..12 {
            assert!(world.set_ownership(CellCoord::new(column, row), Ownership::Owned));
        }
    }
    let ride = world.register_ride(Ride::new("Woodie", RideType::WoodenCoaster));
    let _ = world.insert_element(
        CellCoord::new(6, 6),
        TileElement::new(24, 28, ElementKind::Track(TrackElement { ride })),
    );
    for price in [3, 4] {
        let _ = world.insert_element(
            CellCoord::new(5, 5),
            TileElement::new(
                14,
                18,
                ElementKind::SmallScenery(SmallSceneryElement {
                    entry: ObjectEntryId::new(9),
                    removal_price: price,
                    is_tree: false,
                }),
            ),
        );
    }
    world.drop_litter(CellCoord::new(7, 7), 112);
    world
}

fn envelope(column: u32, row: u32, height: u8, style: u8, flags: u32) -> CommandEnvelope {
    CommandEnvelope::new(
        PlayerId::new(1),
        CommandFlags::from_bits(flags),
        Command::SetLandHeight(LandSetHeightParams::new(
            CellCoord::new(column, row),
            height,
            SlopeStyle::from_bits(style),
        )),
    )
}

fn scripted_commands() -> Vec<CommandEnvelope> {
    vec![
        envelope(5, 5, 16, 0, 0),
        envelope(7, 7, 12, SlopeStyle::NORTH_UP, 0),
        envelope(6, 6, 24, 0, 0),
        envelope(8, 8, 18, 0, CommandFlags::QUERY_ONLY),
        envelope(2, 2, 16, 0, 0),
        envelope(23, 5, 16, 0, 0),
        envelope(9, 9, 20, SlopeStyle::EAST_UP | SlopeStyle::SOUTH_UP, 0),
        envelope(9, 9, 14, 0, CommandFlags::NO_SPEND),
    ]
}
