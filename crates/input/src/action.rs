use crate::Key;

/// A high-level camera/control action.
///
/// Scene behaviors query actions rather than keys so bindings live in one
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    Ascend,
    Descend,
    /// Doubles movement speed while held.
    Sprint,
    /// Ends the frame loop.
    Quit,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveForward,
        Action::MoveBackward,
        Action::StrafeLeft,
        Action::StrafeRight,
        Action::Ascend,
        Action::Descend,
        Action::Sprint,
        Action::Quit,
    ];

    /// Keys bound to this action.
    pub fn keys(self) -> &'static [Key] {
        match self {
            Action::MoveForward => &[Key::W],
            Action::MoveBackward => &[Key::S],
            Action::StrafeLeft => &[Key::A],
            Action::StrafeRight => &[Key::D],
            Action::Ascend => &[Key::Space],
            Action::Descend => &[Key::LeftControl],
            Action::Sprint => &[Key::LeftShift],
            Action::Quit => &[Key::Escape],
        }
    }
}
