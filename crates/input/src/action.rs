/// A discrete game action produced by any input backend.
///
/// The simulation consumes actions and [`MoveInput`](crate::MoveInput),
/// never raw window events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Rotate the camera. `dy` is positive when looking up.
    Look { dx: f32, dy: f32 },
    /// Scroll-wheel zoom; positive zooms in.
    Zoom(f32),
    /// Start over after winning.
    Restart,
    /// Close the game.
    Quit,
}

/// One of the four movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
}

/// Which movement keys are currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveInput {
    pub fn set(&mut self, direction: Direction, held: bool) {
        match direction {
            Direction::Forward => self.forward = held,
            Direction::Back => self.back = held,
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
        }
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn is_idle(&self) -> bool {
        !(self.forward || self.back || self.left || self.right)
    }
}

/// Turns cursor samples into [`Action::Look`] offsets.
///
/// Absolute cursor positions are differenced against the previous sample; the
/// first sample after construction or [`reset`](Self::reset) yields no motion so
/// the camera does not jump when the cursor enters the window.
#[derive(Debug, Clone, Default)]
pub struct MouseLook {
    last: Option<(f32, f32)>,
}

impl MouseLook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute cursor position in window pixels (y grows downward).
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> Option<Action> {
        let previous = self.last.replace((x, y));
        let (last_x, last_y) = previous?;
        look(x - last_x, last_y - y)
    }

    /// Raw relative motion from a locked pointer (y grows downward).
    pub fn motion(&mut self, dx: f32, dy: f32) -> Option<Action> {
        look(dx, -dy)
    }

    /// Forget the previous cursor sample.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

fn look(dx: f32, dy: f32) -> Option<Action> {
    if dx == 0.0 && dy == 0.0 {
        return None;
    }
    tracing::trace!(dx, dy, "look");
    Some(Action::Look { dx, dy })
}
