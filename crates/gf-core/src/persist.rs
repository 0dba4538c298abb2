//! The `key=value` persistence contract.
//!
//! Each persistable entity becomes one line of `;`-separated attributes,
//! always starting with `type`, `x` and `y`. Only the origin and a handful of
//! per-kind extras are written; the hitbox is re-derived from the origin and
//! footprint when the line is parsed back.
//!
//! Values escape `\\`, `;`, line breaks, tabs and any whitespace at either
//! end, so free text survives a save and reload unchanged.

use std::fmt;

use crate::component::{PlatformComponent, TextboxComponent};
use crate::entity::{Entity, EntityId, EntityKind, Facing};
use crate::error::{CoreError, CoreResult};
use crate::footprint::FootprintProvider;
use crate::geometry::Vec2;
use crate::store::EntityStore;
use crate::tags::Tags;

/// Default platform speed in scene units per tick.
pub const DEFAULT_PLATFORM_SPEED: f32 = 2.0;

/// An ordered list of `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// An empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `k=v;k=v` line. Empty segments are ignored.
    pub fn parse(line: &str) -> CoreResult<Self> {
        let mut attrs = Self::new();
        for segment in split_segments(line)
            .into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let mut parts = segment.splitn(2, '=');
            let key = parts.next().unwrap_or_default().trim();
            let value = parts
                .next()
                .ok_or_else(|| CoreError::Malformed(format!("expected key=value, got \"{segment}\"")))?;
            if key.is_empty() {
                return Err(CoreError::Malformed(format!("empty key in \"{segment}\"")));
            }
            attrs.push(key, unescape(value.trim())?);
        }
        Ok(attrs)
    }

    /// Append a pair. Duplicate keys are kept; lookups see the first.
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Value of the first pair with `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Optional finite float.
    pub fn f32(&self, key: &str) -> CoreResult<Option<f32>> {
        let Some(raw) = self.get(key) else {
            return Ok(None);
        };
        match raw.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(CoreError::InvalidAttribute {
                key: key.to_string(),
                value: raw.to_string(),
            }),
        }
    }

    /// Required finite float.
    pub fn require_f32(&self, kind: &str, key: &str) -> CoreResult<f32> {
        self.f32(key)?.ok_or_else(|| CoreError::MissingAttribute {
            kind: kind.to_string(),
            key: key.to_string(),
        })
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// No pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, ";")?;
            }
            write!(f, "{k}={}", escape_value(v))?;
        }
        Ok(())
    }
}

/// Escape a value so it can sit between `;` separators and keep its
/// surrounding whitespace.
pub(crate) fn escape_value(value: &str) -> String {
    let leading = value.len() - value.trim_start().len();
    let trailing = value.trim_end().len();
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        let edge = i < leading || i >= trailing;
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if edge && c.is_whitespace() => out.push_str(&format!("\\u{{{:x}}}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Split on every `;` not preceded by a backslash escape.
fn split_segments(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                segments.push(&line[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&line[start..]);
    segments
}

fn unescape(raw: &str) -> CoreResult<String> {
    let bad = || CoreError::Malformed(format!("bad escape in \"{raw}\""));
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some(';') => out.push(';'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let rest = chars.as_str();
                let (hex, tail) = rest
                    .strip_prefix('{')
                    .and_then(|r| r.split_once('}'))
                    .ok_or_else(bad)?;
                let decoded = u32::from_str_radix(hex, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(bad)?;
                out.push(decoded);
                chars = tail.chars();
            }
            _ => return Err(bad()),
        }
    }
    Ok(out)
}

/// A parsed entity line, ready to be inserted into a store.
#[derive(Debug, Clone)]
pub struct Record {
    /// The entity, placed at its origin.
    pub entity: Entity,
    /// End of the track, for moving platforms.
    pub track_end: Option<Vec2>,
}

/// Kinds that may appear in a level file.
pub fn is_persisted_kind(kind: EntityKind) -> bool {
    kind.default_tags().contains(Tags::PERSISTABLE)
}

fn has_explicit_size(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Block | EntityKind::Spike | EntityKind::HookPoint | EntityKind::Textbox
    )
}

fn has_facing(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::Player | EntityKind::Enemy)
}

/// Serialize a persistable entity. Returns `None` for runtime-only entities
/// (camera, hook, anchors), which are rebuilt rather than stored.
pub fn serialize(entity: &Entity, store: &EntityStore) -> Option<Attributes> {
    if !entity.has(Tags::PERSISTABLE) {
        return None;
    }
    let mut attrs = Attributes::new();
    attrs.push("type", entity.kind);
    attrs.push("x", entity.origin.x);
    attrs.push("y", entity.origin.y);

    if has_explicit_size(entity.kind) {
        attrs.push("w", entity.size.x);
        attrs.push("h", entity.size.y);
    }
    if has_facing(entity.kind) {
        attrs.push("facing", entity.facing);
    }
    if let Some(platform) = &entity.components.platform {
        let end = store
            .platform_track(entity.id)
            .map(|(_, end)| end)
            .unwrap_or(entity.origin);
        attrs.push("x2", end.x);
        attrs.push("y2", end.y);
        attrs.push("size", platform.size);
        attrs.push("speed", platform.speed);
    }
    if let Some(textbox) = &entity.components.textbox {
        attrs.push("text", &textbox.text);
    }
    Some(attrs)
}

/// Parse one entity line.
pub fn parse(line: &str, footprints: &dyn FootprintProvider) -> CoreResult<Record> {
    let attrs = Attributes::parse(line)?;
    let type_name = attrs.get("type").ok_or_else(|| CoreError::MissingAttribute {
        kind: "entity".to_string(),
        key: "type".to_string(),
    })?;
    let kind = EntityKind::parse(type_name)
        .filter(|k| is_persisted_kind(*k))
        .ok_or_else(|| CoreError::UnknownKind(type_name.to_string()))?;
    let kind_name = kind.as_str();

    let origin = Vec2::new(
        attrs.require_f32(kind_name, "x")?,
        attrs.require_f32(kind_name, "y")?,
    );
    let mut entity = Entity::spawn(kind, origin, footprints);

    if has_explicit_size(kind) {
        let w = attrs.f32("w")?.unwrap_or(entity.size.x);
        let h = attrs.f32("h")?.unwrap_or(entity.size.y);
        entity = Entity::new(kind, origin, Vec2::new(w, h));
    }

    if let Some(raw) = attrs.get("facing") {
        let facing = Facing::parse(raw).ok_or_else(|| CoreError::InvalidAttribute {
            key: "facing".to_string(),
            value: raw.to_string(),
        })?;
        entity.facing = facing;
    }

    let mut track_end = None;
    if kind == EntityKind::MovingPlatform {
        let end = Vec2::new(
            attrs.require_f32(kind_name, "x2")?,
            attrs.require_f32(kind_name, "y2")?,
        );
        let size = attrs.f32("size")?.unwrap_or(1.0);
        let speed = attrs.f32("speed")?.unwrap_or(DEFAULT_PLATFORM_SPEED);
        if size <= 0.0 {
            return Err(CoreError::InvalidAttribute {
                key: "size".to_string(),
                value: size.to_string(),
            });
        }
        entity = platform_entity(origin, end, size, speed, footprints);
        track_end = Some(end);
    }

    if kind == EntityKind::Textbox {
        entity.components.textbox = Some(TextboxComponent {
            text: attrs.get("text").unwrap_or_default().to_string(),
        });
    }

    Ok(Record { entity, track_end })
}

/// A moving platform placed at `start`, not yet linked to its anchors.
pub fn platform_entity(
    start: Vec2,
    end: Vec2,
    size: f32,
    speed: f32,
    footprints: &dyn FootprintProvider,
) -> Entity {
    let unit = footprints
        .footprint(EntityKind::MovingPlatform)
        .unwrap_or(Vec2::new(96.0, 16.0));
    let delta = end - start;
    let mut entity = Entity::new(
        EntityKind::MovingPlatform,
        start,
        Vec2::new(unit.x * size, unit.y),
    );
    entity.components.platform = Some(PlatformComponent {
        start_anchor: EntityId::NULL,
        end_anchor: EntityId::NULL,
        current_pos: start,
        size,
        angle: (-delta.y).atan2(delta.x),
        speed,
        forward: true,
        last_frame_trajectory: Vec2::ZERO,
    });
    entity
}
