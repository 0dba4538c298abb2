//! Level text: an optional header line followed by one entity per line.
//!
//! ```text
//! level;name=first steps;death_y=2000
//! # comments and blank lines are ignored
//! type=player;x=64;y=304;facing=right
//! type=block;x=0;y=352;w=640;h=32
//! ```
//!
//! Loading is lenient: a line that fails to parse is logged, recorded in the
//! [`LoadReport`] and skipped, and the rest of the level still loads.

use serde::{Deserialize, Serialize};

use crate::component::{AnchorComponent, AnchorRole, CameraComponent, TextboxComponent};
use crate::entity::{Entity, EntityId, EntityKind, Facing};
use crate::footprint::FootprintProvider;
use crate::geometry::{Rect, Vec2};
use crate::persist::{self, Attributes, Record};
use crate::store::EntityStore;
use crate::tags::Tags;

/// Falling below this `y` kills players and enemies unless the header overrides it.
pub const DEFAULT_DEATH_Y: f32 = 2000.0;

/// Level-wide settings from the header line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMeta {
    /// Display name.
    pub name: String,
    /// Entities below this `y` die.
    pub death_y: f32,
}

impl LevelMeta {
    /// Metadata with the default death line.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            death_y: DEFAULT_DEATH_Y,
        }
    }
}

impl Default for LevelMeta {
    fn default() -> Self {
        Self::new("untitled")
    }
}

/// A line that was skipped while loading.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Why the line was rejected.
    pub reason: String,
}

/// Outcome of loading a level file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Entity lines accepted.
    pub loaded: usize,
    /// Lines rejected, in file order.
    pub skipped: Vec<SkippedLine>,
}

impl LoadReport {
    /// Nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    fn skip(&mut self, line: usize, reason: String) {
        log::warn!("level line {line} skipped: {reason}");
        self.skipped.push(SkippedLine { line, reason });
    }
}

/// A loaded level: header metadata plus the populated entity store.
#[derive(Debug, Clone, Default)]
pub struct Level {
    /// Header settings.
    pub meta: LevelMeta,
    /// Every entity in the level.
    pub store: EntityStore,
}

impl Level {
    /// An empty level.
    pub fn new(meta: LevelMeta) -> Self {
        Self {
            meta,
            store: EntityStore::new(),
        }
    }

    /// Parse level text. Never fails; problems end up in the report.
    pub fn parse(text: &str, footprints: &dyn FootprintProvider) -> (Level, LoadReport) {
        let mut level = Level::default();
        let mut report = LoadReport::default();

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line == "level" || line.starts_with("level;") {
                if let Err(reason) = level.apply_header(&line["level".len()..]) {
                    report.skip(line_no, reason);
                }
                continue;
            }

            match persist::parse(line, footprints) {
                Ok(record) => {
                    if record.entity.has(Tags::PLAYER) && level.store.player_id().is_some() {
                        report.skip(line_no, "duplicate player".to_string());
                        continue;
                    }
                    insert_record(&mut level.store, record, footprints);
                    report.loaded += 1;
                }
                Err(e) => report.skip(line_no, e.to_string()),
            }
        }

        ensure_camera(&mut level.store, footprints);
        log::debug!(
            "loaded level \"{}\": {} entities, {} skipped",
            level.meta.name,
            report.loaded,
            report.skipped.len()
        );
        (level, report)
    }

    fn apply_header(&mut self, rest: &str) -> Result<(), String> {
        let attrs = Attributes::parse(rest).map_err(|e| e.to_string())?;
        if let Some(name) = attrs.get("name") {
            self.meta.name = name.to_string();
        }
        if let Some(death_y) = attrs.f32("death_y").map_err(|e| e.to_string())? {
            self.meta.death_y = death_y;
        }
        Ok(())
    }

    /// Serialize back to level text. Runtime-only entities are left out.
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "level;name={};death_y={}\n",
            persist::escape_value(&self.meta.name),
            self.meta.death_y
        );
        for entity in self.store.iter() {
            if let Some(attrs) = persist::serialize(entity, &self.store) {
                out.push_str(&attrs.to_string());
                out.push('\n');
            }
        }
        out
    }

    /// A small playable level exercising every persisted kind.
    pub fn template(footprints: &dyn FootprintProvider) -> Level {
        let mut level = Level::new(LevelMeta::new("template"));
        let store = &mut level.store;

        let block = |x: f32, y: f32, w: f32, h: f32| {
            Entity::new(EntityKind::Block, Vec2::new(x, y), Vec2::new(w, h))
        };

        store.insert(
            Entity::spawn(EntityKind::Player, Vec2::new(64.0, 304.0), footprints)
                .with_facing(Facing::Right),
        );
        store.insert(block(0.0, 352.0, 640.0, 32.0));
        let mut hint = Entity::new(
            EntityKind::Textbox,
            Vec2::new(96.0, 224.0),
            Vec2::new(64.0, 64.0),
        );
        hint.components.textbox = Some(TextboxComponent {
            text: "Hold run and press jump".to_string(),
        });
        store.insert(hint);
        store.insert(
            Entity::spawn(EntityKind::Enemy, Vec2::new(320.0, 320.0), footprints)
                .with_facing(Facing::Left),
        );
        store.insert(Entity::new(
            EntityKind::Spike,
            Vec2::new(448.0, 320.0),
            Vec2::new(32.0, 32.0),
        ));
        store.insert(Entity::new(
            EntityKind::HookPoint,
            Vec2::new(256.0, 160.0),
            Vec2::new(32.0, 32.0),
        ));
        let platform = persist::platform_entity(
            Vec2::new(672.0, 288.0),
            Vec2::new(864.0, 288.0),
            1.0,
            persist::DEFAULT_PLATFORM_SPEED,
            footprints,
        );
        insert_platform(store, platform, Vec2::new(864.0, 288.0), footprints);
        store.insert(block(992.0, 352.0, 320.0, 32.0));
        store.insert(Entity::spawn(
            EntityKind::Checkpoint,
            Vec2::new(1024.0, 288.0),
            footprints,
        ));
        store.insert(Entity::spawn(
            EntityKind::GlidePickup,
            Vec2::new(1104.0, 320.0),
            footprints,
        ));
        store.insert(Entity::spawn(
            EntityKind::Exit,
            Vec2::new(1248.0, 288.0),
            footprints,
        ));

        ensure_camera(store, footprints);
        level
    }
}

/// Insert a parsed record, creating anchors for moving platforms.
pub fn insert_record(
    store: &mut EntityStore,
    record: Record,
    footprints: &dyn FootprintProvider,
) -> EntityId {
    match record.track_end {
        Some(end) => insert_platform(store, record.entity, end, footprints),
        None => store.insert(record.entity),
    }
}

/// Insert a moving platform together with its two anchors.
///
/// The anchors are centered on the track endpoints and inserted first, so
/// they precede the platform in list order.
pub fn insert_platform(
    store: &mut EntityStore,
    mut platform: Entity,
    end: Vec2,
    footprints: &dyn FootprintProvider,
) -> EntityId {
    let anchor_size = footprints
        .footprint(EntityKind::Anchor)
        .unwrap_or(Vec2::new(8.0, 8.0));
    let start = platform.origin;
    let make_anchor = |point: Vec2, role: AnchorRole| {
        let mut anchor = Entity::new(
            EntityKind::Anchor,
            Rect::centered(point, anchor_size).position(),
            anchor_size,
        );
        anchor.components.anchor = Some(AnchorComponent {
            platform: EntityId::NULL,
            role,
        });
        anchor
    };

    let start_anchor = store.insert(make_anchor(start, AnchorRole::Start));
    let end_anchor = store.insert(make_anchor(end, AnchorRole::End));
    if let Some(p) = platform.components.platform.as_mut() {
        p.start_anchor = start_anchor;
        p.end_anchor = end_anchor;
    }
    let id = store.insert(platform);
    for anchor in [start_anchor, end_anchor] {
        if let Some(a) = store
            .get_mut(anchor)
            .and_then(|e| e.components.anchor.as_mut())
        {
            a.platform = id;
        }
    }
    id
}

/// Add a camera centered on the player if the store has none.
pub fn ensure_camera(store: &mut EntityStore, footprints: &dyn FootprintProvider) -> EntityId {
    if let Some(id) = store.camera_id() {
        return id;
    }
    let viewport = footprints
        .footprint(EntityKind::Camera)
        .unwrap_or(CameraComponent::default().viewport);
    let center = store
        .player_id()
        .and_then(|id| store.get(id))
        .map(|p| p.hitbox.center())
        .unwrap_or(Vec2::ZERO);
    let mut camera = Entity::new(
        EntityKind::Camera,
        Rect::centered(center, viewport).position(),
        viewport,
    );
    camera.components.camera = Some(CameraComponent { center, viewport });
    store.insert(camera)
}
