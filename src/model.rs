//! Play records as stored by the authoring tool.
//!
//! Deserialization is deliberately forgiving: a missing coordinate reads as
//! `0`, a missing or `null` route/icon list reads as empty, and any field this
//! crate does not know about is carried through untouched in `extra` so a
//! migrated payload can be written back as a full replacement.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Record identity as issued by the record store (numeric or uuid-like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

/// A single authored play.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PlayData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayRecord {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }

    /// Identity rendered for log and report lines.
    pub fn label(&self) -> String {
        self.id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "?".to_string())
    }

    /// The diagram payload, if the record has player data at all.
    pub fn diagram(&self) -> Option<&PlayData> {
        self.data.as_ref().filter(|d| d.players.is_some())
    }
}

/// A reusable starting layout. Shares the play payload shape but stores it
/// under `default_formation`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Formation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_formation: Option<PlayData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Formation {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unnamed"
        } else {
            &self.name
        }
    }

    pub fn label(&self) -> String {
        self.id
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "?".to_string())
    }
}

/// One frame of a diagram: pre-snap positions plus planned motion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayData {
    /// `None` means the payload carries no player array at all, which is
    /// rendered as nothing. `Some(vec![])` still renders the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<Player>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub icons: Vec<Icon>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayData {
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players: Some(players),
            ..Self::default()
        }
    }

    pub fn players(&self) -> &[Player] {
        self.players.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub y: f64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub route: Vec<RoutePoint>,
    #[serde(default, deserialize_with = "null_as_empty_string")]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Stroke of each route segment, indexed like `route`. Segments past the
    /// end of the list draw solid.
    #[serde(rename = "routeStyles", default, skip_serializing_if = "Option::is_none")]
    pub route_styles: Option<Vec<SegmentStyle>>,
    #[serde(rename = "routeEndType", default, skip_serializing_if = "Option::is_none")]
    pub route_end_type: Option<RouteEnd>,
    /// The play's primary target, drawn as a star.
    #[serde(rename = "isPrimary", default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn labeled(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn colored(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_route(mut self, points: &[(f64, f64)]) -> Self {
        self.route = points.iter().map(|&(x, y)| RoutePoint { x, y }).collect();
        self
    }

    pub fn with_segment_styles(mut self, styles: &[SegmentStyle]) -> Self {
        self.route_styles = Some(styles.to_vec());
        self
    }

    pub fn ending(mut self, end: RouteEnd) -> Self {
        self.route_end_type = Some(end);
        self
    }

    pub fn as_primary(mut self) -> Self {
        self.primary = Some(true);
        self
    }

    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }

    /// Style of the segment ending at `route[idx]`, if one was stored.
    pub fn segment_style(&self, idx: usize) -> Option<&SegmentStyle> {
        self.route_styles.as_ref().and_then(|styles| styles.get(idx))
    }

    /// True when every drawn segment is plain, so the route can be one polyline.
    pub fn has_plain_route(&self) -> bool {
        (0..self.route.len()).all(|idx| {
            !matches!(
                self.segment_style(idx),
                Some(SegmentStyle::Dashed | SegmentStyle::Squiggly)
            )
        })
    }
}

/// Stroke of one route segment.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SegmentStyle {
    #[default]
    Solid,
    Dashed,
    Squiggly,
    Other(String),
}

impl From<String> for SegmentStyle {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "solid" => SegmentStyle::Solid,
            "dashed" => SegmentStyle::Dashed,
            "squiggly" => SegmentStyle::Squiggly,
            _ => SegmentStyle::Other(value),
        }
    }
}

impl From<SegmentStyle> for String {
    fn from(style: SegmentStyle) -> Self {
        match style {
            SegmentStyle::Solid => "solid".to_string(),
            SegmentStyle::Dashed => "dashed".to_string(),
            SegmentStyle::Squiggly => "squiggly".to_string(),
            SegmentStyle::Other(s) => s,
        }
    }
}

/// Marker at the end of a route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RouteEnd {
    #[default]
    Arrow,
    Circle,
    Other(String),
}

impl From<String> for RouteEnd {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "arrow" => RouteEnd::Arrow,
            "circle" => RouteEnd::Circle,
            _ => RouteEnd::Other(value),
        }
    }
}

impl From<RouteEnd> for String {
    fn from(end: RouteEnd) -> Self {
        match end {
            RouteEnd::Arrow => "arrow".to_string(),
            RouteEnd::Circle => "circle".to_string(),
            RouteEnd::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePoint {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Icon {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub x: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub y: f64,
    #[serde(default)]
    pub kind: IconKind,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Badge shown for an icon. Unrecognized kinds keep their original string so
/// they survive a write-back.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IconKind {
    #[default]
    Ball,
    DecoyBall,
    Other(String),
}

impl From<String> for IconKind {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "ball" | "football" => IconKind::Ball,
            "decoy-ball" | "decoy" | "decoy-football" => IconKind::DecoyBall,
            _ => IconKind::Other(value),
        }
    }
}

impl From<IconKind> for String {
    fn from(kind: IconKind) -> Self {
        match kind {
            IconKind::Ball => "ball".to_string(),
            IconKind::DecoyBall => "decoy-ball".to_string(),
            IconKind::Other(s) => s,
        }
    }
}

/// Parses either a single play, a bare array of plays, or a playbook object
/// with a `plays` array.
pub fn parse_plays(text: &str) -> Result<Vec<PlayRecord>, Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PlayInput {
        Many(Vec<PlayRecord>),
        Playbook { plays: Vec<PlayRecord> },
        One(Box<PlayRecord>),
    }

    Ok(match serde_json::from_str::<PlayInput>(text)? {
        PlayInput::Many(plays) => plays,
        PlayInput::Playbook { plays } => plays,
        PlayInput::One(play) => vec![*play],
    })
}

/// Parses a single formation or an array of them.
pub fn parse_formations(text: &str) -> Result<Vec<Formation>, Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FormationInput {
        Many(Vec<Formation>),
        One(Box<Formation>),
    }

    Ok(match serde_json::from_str::<FormationInput>(text)? {
        FormationInput::Many(items) => items,
        FormationInput::One(item) => vec![*item],
    })
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_empty_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
