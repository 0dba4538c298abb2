use std::fmt;

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Capability flags. Behavior is selected by testing membership, not by type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Tags: u32 {
        /// The controllable character.
        const PLAYER          = 1 << 0;
        /// Patrols and can be stomped.
        const ENEMY           = 1 << 1;
        /// Solid for wall and ceiling resolution.
        const GEOMETRY        = 1 << 2;
        /// Can be stood on.
        const GROUND          = 1 << 3;
        /// Kills the player on touch.
        const HAZARD          = 1 << 4;
        /// The grappling hook can attach here.
        const HOOKABLE        = 1 << 5;
        /// Carries riders along its track.
        const MOVING_PLATFORM = 1 << 6;
        /// Unlocks gliding.
        const GLIDE_PICKUP    = 1 << 7;
        /// Completes the level.
        const EXIT            = 1 << 8;
        /// Sets the respawn point.
        const CHECKPOINT      = 1 << 9;
        /// Shows text while overlapped.
        const TEXTBOX         = 1 << 10;
        /// Written to level files.
        const PERSISTABLE     = 1 << 11;
        /// Track end of a moving platform.
        const ANCHOR          = 1 << 12;
        /// Follow camera.
        const CAMERA          = 1 << 13;
        /// Fired grappling hook.
        const HOOK            = 1 << 14;

        /// Entities that `EntityStore::destroy` refuses to remove.
        const PROTECTED = Self::PLAYER.bits() | Self::CAMERA.bits() | Self::ANCHOR.bits();
    }
}

const NAMES: &[(&str, Tags)] = &[
    ("player", Tags::PLAYER),
    ("enemy", Tags::ENEMY),
    ("geometry", Tags::GEOMETRY),
    ("ground", Tags::GROUND),
    ("hazard", Tags::HAZARD),
    ("hookable", Tags::HOOKABLE),
    ("moving_platform", Tags::MOVING_PLATFORM),
    ("glide_pickup", Tags::GLIDE_PICKUP),
    ("exit", Tags::EXIT),
    ("checkpoint", Tags::CHECKPOINT),
    ("textbox", Tags::TEXTBOX),
    ("persistable", Tags::PERSISTABLE),
    ("anchor", Tags::ANCHOR),
    ("camera", Tags::CAMERA),
    ("hook", Tags::HOOK),
];

impl Tags {
    /// Look up a single tag by its snake_case name.
    pub fn from_snake_name(name: &str) -> Option<Tags> {
        let lower = name.to_lowercase();
        NAMES
            .iter()
            .find(|(n, _)| *n == lower.replace('-', "_"))
            .map(|(_, t)| *t)
    }

    /// The snake_case names of every single tag set in `self`.
    pub fn names(&self) -> Vec<&'static str> {
        NAMES
            .iter()
            .filter(|(_, t)| self.contains(*t))
            .map(|(n, _)| *n)
            .collect()
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}
