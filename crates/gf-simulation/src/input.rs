use serde::{Deserialize, Serialize};

/// Held horizontal direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalIntent {
    /// Move left.
    Left,
    /// Move right.
    Right,
    /// No direction held.
    #[default]
    Stop,
}

impl HorizontalIntent {
    /// `-1.0`, `1.0`, or `0.0`.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
            Self::Stop => 0.0,
        }
    }
}

/// Discrete input signals for one tick.
///
/// `jump_pressed` and `interact_pressed` are edges: true only on the tick the
/// button went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Direction held this tick.
    pub horizontal: HorizontalIntent,
    /// Run button held.
    pub run_held: bool,
    /// Jump went down this tick.
    pub jump_pressed: bool,
    /// Fire the grappling hook, or release it if one is out.
    pub interact_pressed: bool,
}

impl InputSnapshot {
    /// No input.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Hold a direction.
    pub fn with_horizontal(mut self, horizontal: HorizontalIntent) -> Self {
        self.horizontal = horizontal;
        self
    }

    /// Hold or release run.
    pub fn with_run(mut self, held: bool) -> Self {
        self.run_held = held;
        self
    }

    /// Press jump this tick.
    pub fn with_jump(mut self, pressed: bool) -> Self {
        self.jump_pressed = pressed;
        self
    }

    /// Press interact this tick.
    pub fn with_interact(mut self, pressed: bool) -> Self {
        self.interact_pressed = pressed;
        self
    }
}
