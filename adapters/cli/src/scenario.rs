use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use landscape_core::{
    CellCoord, Money, ObjectEntryId, Policies, RideId, SlopeStyle, MAXIMUM_MAP_SIZE,
};
use landscape_world::{
    query, ElementKind, EntranceKind, Ownership, PathElement, Ride, RideType, SmallSceneryElement,
    SurfaceElement, TileElement, TrackElement, World,
};
use serde::Deserialize;

const SUPPORTED_SCENARIO_VERSION: u32 = 1;

/// Park scenario loaded from a TOML file.
#[derive(Debug)]
pub(crate) struct Scenario {
    pub(crate) world: World,
    pub(crate) policies: Policies,
}

/// Loads and builds the scenario stored at the provided path.
pub(crate) fn load(path: &Path) -> Result<Scenario> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
}

fn parse(contents: &str) -> Result<Scenario> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    if manifest.version != SUPPORTED_SCENARIO_VERSION {
        bail!(
            "unsupported scenario version {}; expected {}",
            manifest.version,
            SUPPORTED_SCENARIO_VERSION
        );
    }
    if manifest.map_size < 3 {
        bail!("map size {} leaves no playable cells", manifest.map_size);
    }
    if manifest.map_size > MAXIMUM_MAP_SIZE {
        bail!(
            "map size {} exceeds the maximum of {}",
            manifest.map_size,
            MAXIMUM_MAP_SIZE
        );
    }

    let mut world = World::new(manifest.map_size);
    world.set_cash(Money::from_whole(manifest.cash));

    for area in &manifest.owned {
        for column in area.from[0]..=area.to[0] {
            for row in area.from[1]..=area.to[1] {
                if !world.set_ownership(CellCoord::new(column, row), Ownership::Owned) {
                    bail!("owned area reaches past the map at ({column}, {row})");
                }
            }
        }
    }

    for surface in &manifest.surfaces {
        let cell = CellCoord::new(surface.cell[0], surface.cell[1]);
        let ownership = query::surface(&world, cell)
            .map_or(Ownership::Unowned, |view| view.surface.ownership);
        let payload = SurfaceElement {
            slope: SlopeStyle::from_bits(surface.slope).slope(),
            water_height: surface.water_height,
            ownership,
            track_needs_water: surface.track_needs_water,
        };
        if !world.configure_surface(cell, surface.height, payload) {
            bail!("surface cell ({}, {}) is off the map", cell.column(), cell.row());
        }
    }

    let mut rides = Vec::with_capacity(manifest.rides.len());
    for spec in &manifest.rides {
        let mut ride = Ride::new(spec.name.clone(), spec.ride_type.into());
        if let Some(max_height) = spec.max_height {
            ride = ride.with_max_height(max_height);
        }
        rides.push(world.register_ride(ride));
    }

    for spec in &manifest.elements {
        let cell = CellCoord::new(spec.cell[0], spec.cell[1]);
        let kind = spec
            .kind
            .to_element_kind(&rides)
            .with_context(|| format!("element at ({}, {})", cell.column(), cell.row()))?;
        let mut element = TileElement::new(spec.base, spec.clearance, kind);
        if spec.ghost {
            element = element.into_ghost();
        }
        if world.insert_element(cell, element).is_none() {
            bail!("element cell ({}, {}) is off the map", cell.column(), cell.row());
        }
    }

    for litter in &manifest.litter {
        world.drop_litter(CellCoord::new(litter.cell[0], litter.cell[1]), litter.z);
    }

    Ok(Scenario {
        world,
        policies: manifest.policies,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    version: u32,
    map_size: u32,
    #[serde(default)]
    cash: i64,
    #[serde(default)]
    policies: Policies,
    #[serde(default)]
    owned: Vec<AreaSpec>,
    #[serde(default)]
    surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    rides: Vec<RideSpec>,
    #[serde(default)]
    elements: Vec<ElementSpec>,
    #[serde(default)]
    litter: Vec<LitterSpec>,
}

#[derive(Debug, Deserialize)]
struct AreaSpec {
    from: [u32; 2],
    to: [u32; 2],
}

#[derive(Debug, Deserialize)]
struct SurfaceSpec {
    cell: [u32; 2],
    height: u8,
    #[serde(default)]
    slope: u8,
    #[serde(default)]
    water_height: u8,
    #[serde(default)]
    track_needs_water: bool,
}

#[derive(Debug, Deserialize)]
struct RideSpec {
    name: String,
    ride_type: RideTypeName,
    max_height: Option<u8>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RideTypeName {
    JuniorCoaster,
    WoodenCoaster,
    LoopingCoaster,
    MiniatureRailway,
    Monorail,
    LogFlume,
}

impl From<RideTypeName> for RideType {
    fn from(name: RideTypeName) -> Self {
        match name {
            RideTypeName::JuniorCoaster => RideType::JuniorCoaster,
            RideTypeName::WoodenCoaster => RideType::WoodenCoaster,
            RideTypeName::LoopingCoaster => RideType::LoopingCoaster,
            RideTypeName::MiniatureRailway => RideType::MiniatureRailway,
            RideTypeName::Monorail => RideType::Monorail,
            RideTypeName::LogFlume => RideType::LogFlume,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ElementSpec {
    cell: [u32; 2],
    base: u8,
    clearance: u8,
    #[serde(default)]
    ghost: bool,
    #[serde(flatten)]
    kind: ElementKindSpec,
}

/// Element payloads; `ride` fields index the scenario's `rides` list.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ElementKindSpec {
    Path {
        #[serde(default)]
        level_crossing: bool,
    },
    Track {
        ride: usize,
    },
    SmallScenery {
        entry: u16,
        #[serde(default)]
        removal_price: i16,
        #[serde(default)]
        tree: bool,
    },
    RideEntrance {
        ride: usize,
    },
    RideExit {
        ride: usize,
    },
    ParkEntrance,
    Wall {
        entry: u16,
    },
    LargeScenery {
        entry: u16,
    },
    Banner {
        entry: u16,
    },
}

impl ElementKindSpec {
    fn to_element_kind(&self, rides: &[RideId]) -> Result<ElementKind> {
        let ride = |index: usize| {
            rides
                .get(index)
                .copied()
                .with_context(|| format!("ride index {index} is not declared"))
        };
        Ok(match *self {
            Self::Path { level_crossing } => ElementKind::Path(PathElement { level_crossing }),
            Self::Track { ride: index } => ElementKind::Track(TrackElement { ride: ride(index)? }),
            Self::SmallScenery {
                entry,
                removal_price,
                tree,
            } => ElementKind::SmallScenery(SmallSceneryElement {
                entry: ObjectEntryId::new(entry),
                removal_price,
                is_tree: tree,
            }),
            Self::RideEntrance { ride: index } => {
                ElementKind::Entrance(EntranceKind::RideEntrance(ride(index)?))
            }
            Self::RideExit { ride: index } => {
                ElementKind::Entrance(EntranceKind::RideExit(ride(index)?))
            }
            Self::ParkEntrance => ElementKind::Entrance(EntranceKind::ParkEntrance),
            Self::Wall { entry } => ElementKind::Wall(ObjectEntryId::new(entry)),
            Self::LargeScenery { entry } => ElementKind::LargeScenery(ObjectEntryId::new(entry)),
            Self::Banner { entry } => ElementKind::Banner(ObjectEntryId::new(entry)),
        })
    }
}

#[derive(Debug, Deserialize)]
struct LitterSpec {
    cell: [u32; 2],
    z: i32,
}
