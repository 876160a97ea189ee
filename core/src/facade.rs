use serde::{Deserialize, Serialize};

use crate::TileContent;

/// Face shown on the game's status button.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SmileState {
    Neutral,
    /// A reveal gesture is in flight.
    Pressed,
    Dead,
    Success,
}

/// Notification surface of the surrounding application: the remaining-mine
/// counter, the timer, the status face, and the scene. All calls are
/// fire-and-forget; the engine never reads anything back and never waits.
pub trait GameFacade {
    /// Remaining-mine counter; goes negative when the player over-flags.
    fn set_mines_left(&mut self, mines_left: i32);

    fn start_timer(&mut self);
    fn stop_timer(&mut self);
    fn reset_timer(&mut self);

    fn set_smile(&mut self, smile: SmileState);

    /// Content of the tile currently under the pointer.
    fn set_hovered_content(&mut self, content: TileContent);

    fn request_render(&mut self);
    fn request_layout(&mut self);
}

/// No-op façade for headless use (benches, tests that only assert on the
/// field itself).
impl GameFacade for () {
    fn set_mines_left(&mut self, _mines_left: i32) {}
    fn start_timer(&mut self) {}
    fn stop_timer(&mut self) {}
    fn reset_timer(&mut self) {}
    fn set_smile(&mut self, _smile: SmileState) {}
    fn set_hovered_content(&mut self, _content: TileContent) {}
    fn request_render(&mut self) {}
    fn request_layout(&mut self) {}
}
