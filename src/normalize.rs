//! Legacy coordinate migration.
//!
//! Early records stored absolute pixels against a 1000×700 canvas. Current
//! records store percentages: `x` in `0..=100` of field width and `y` in
//! `0..=70`. Both axes shrink by the same factor, so a single divisor covers
//! players, route waypoints and icons alike.
//!
//! Classification is a threshold heuristic: any player beyond the canonical
//! extent marks the whole payload as legacy. A canonical record with a bad
//! out-of-range value is indistinguishable from legacy data and will be
//! rescaled too.
//!
//! A rescaled payload is stamped with `"coordinateSpace": "percent"`. Stamped
//! payloads are canonical whatever their values, so a pixel value past
//! 1000×700 is divided once and never again.

use serde_json::Value;
use tracing::debug;

use crate::model::{Formation, Icon, PlayData, PlayRecord, Player, RecordId, RoutePoint};

pub const CANONICAL_MAX_X: f64 = 100.0;
pub const CANONICAL_MAX_Y: f64 = 70.0;
/// 1000 / 100 and 700 / 70.
pub const LEGACY_SCALE: f64 = 10.0;
/// Payload key recording that coordinates are already percentages.
pub const SPACE_KEY: &str = "coordinateSpace";
pub const SPACE_PERCENT: &str = "percent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSpace {
    Canonical,
    Legacy,
}

/// Only player positions decide; routes and icons follow their players. A
/// payload stamped by an earlier migration is always canonical.
pub fn detect(data: &PlayData) -> CoordinateSpace {
    if data.extra.get(SPACE_KEY).and_then(Value::as_str) == Some(SPACE_PERCENT) {
        return CoordinateSpace::Canonical;
    }

    let legacy = data
        .players()
        .iter()
        .any(|p| p.x > CANONICAL_MAX_X || p.y > CANONICAL_MAX_Y);

    if legacy {
        CoordinateSpace::Legacy
    } else {
        CoordinateSpace::Canonical
    }
}

/// Returns the payload in canonical space. Already-canonical payloads come
/// back unchanged; rescaled ones carry the percent stamp, so applying this
/// twice is the same as applying it once for any input.
pub fn normalize(data: &PlayData) -> PlayData {
    match detect(data) {
        CoordinateSpace::Canonical => data.clone(),
        CoordinateSpace::Legacy => {
            debug!(
                players = data.players().len(),
                icons = data.icons.len(),
                "rescaling legacy pixel coordinates"
            );
            rescale(data)
        }
    }
}

fn rescale(data: &PlayData) -> PlayData {
    let mut extra = data.extra.clone();
    extra.insert(SPACE_KEY.to_string(), Value::from(SPACE_PERCENT));

    PlayData {
        players: data
            .players
            .as_ref()
            .map(|players| players.iter().map(rescale_player).collect()),
        icons: data.icons.iter().map(rescale_icon).collect(),
        extra,
    }
}

fn rescale_player(player: &Player) -> Player {
    Player {
        x: player.x / LEGACY_SCALE,
        y: player.y / LEGACY_SCALE,
        route: player
            .route
            .iter()
            .map(|pt| RoutePoint {
                x: pt.x / LEGACY_SCALE,
                y: pt.y / LEGACY_SCALE,
            })
            .collect(),
        ..player.clone()
    }
}

fn rescale_icon(icon: &Icon) -> Icon {
    Icon {
        x: icon.x / LEGACY_SCALE,
        y: icon.y / LEGACY_SCALE,
        ..icon.clone()
    }
}

pub fn normalize_record(record: &PlayRecord) -> PlayRecord {
    PlayRecord {
        data: record.data.as_ref().map(normalize),
        ..record.clone()
    }
}

pub fn normalize_formation(formation: &Formation) -> Formation {
    Formation {
        default_formation: formation.default_formation.as_ref().map(normalize),
        ..formation.clone()
    }
}

/// Which record field a replacement payload is written back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Data,
    DefaultFormation,
}

impl PayloadField {
    pub fn as_str(self) -> &'static str {
        match self {
            PayloadField::Data => "data",
            PayloadField::DefaultFormation => "default_formation",
        }
    }
}

/// A full replacement payload for a stored record found to be legacy.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub id: Option<RecordId>,
    pub field: PayloadField,
    pub payload: PlayData,
}

impl Migration {
    /// The body a persistence layer sends: `{"<field>": <payload>}`.
    pub fn to_patch(&self) -> serde_json::Value {
        let payload = serde_json::to_value(&self.payload).unwrap_or(serde_json::Value::Null);
        let mut body = serde_json::Map::new();
        body.insert(self.field.as_str().to_string(), payload);
        serde_json::Value::Object(body)
    }
}

/// Why a stored record was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    NoPlayerData,
    AlreadyCanonical,
}

pub fn migrate_record(record: &PlayRecord) -> Result<Migration, Skip> {
    migrate_payload(record.id.clone(), record.data.as_ref(), PayloadField::Data)
}

pub fn migrate_formation(formation: &Formation) -> Result<Migration, Skip> {
    migrate_payload(
        formation.id.clone(),
        formation.default_formation.as_ref(),
        PayloadField::DefaultFormation,
    )
}

fn migrate_payload(
    id: Option<RecordId>,
    data: Option<&PlayData>,
    field: PayloadField,
) -> Result<Migration, Skip> {
    let data = data
        .filter(|d| !d.players().is_empty())
        .ok_or(Skip::NoPlayerData)?;

    if detect(data) == CoordinateSpace::Canonical {
        return Err(Skip::AlreadyCanonical);
    }

    Ok(Migration {
        id,
        field,
        payload: normalize(data),
    })
}
