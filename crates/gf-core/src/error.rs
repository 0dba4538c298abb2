use crate::entity::{EntityId, EntityKind};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating the entity store or loading a level.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// The requested entity ID does not resolve to a live entity.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity carries a tag that forbids destruction (player, camera, anchor).
    #[error("entity is protected from destruction: {0}")]
    Protected(EntityId),

    /// A persisted record named an entity type this build does not know.
    #[error("unknown entity type \"{0}\"")]
    UnknownKind(String),

    /// A persisted record is missing an attribute its type requires.
    #[error("{kind} is missing required attribute \"{key}\"")]
    MissingAttribute {
        /// The entity type being parsed.
        kind: String,
        /// The attribute that was not present.
        key: String,
    },

    /// A persisted attribute could not be parsed into its expected type.
    #[error("invalid value for \"{key}\": \"{value}\"")]
    InvalidAttribute {
        /// The attribute key.
        key: String,
        /// The raw text that failed to parse.
        value: String,
    },

    /// A persisted line does not follow the `key=value` layout.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// The editor cannot place this kind directly (it is created by the runtime).
    #[error("{0} cannot be placed")]
    NotPlaceable(EntityKind),

    /// A placement was refused because solid geometry already occupies the spot.
    #[error("position ({x}, {y}) is occupied")]
    Occupied {
        /// Snapped x coordinate of the refused placement.
        x: f32,
        /// Snapped y coordinate of the refused placement.
        y: f32,
    },
}
