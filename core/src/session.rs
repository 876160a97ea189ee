use bitflags::bitflags;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Buttons still held when a pointer event is delivered. On button-up
    /// events the transitioning button is already excluded, as in
    /// `PointerEvent.buttons` or a `WM_*BUTTONUP` wParam.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u8 {
        const PRIMARY   = 1;
        const SECONDARY = 1 << 1;
        const MIDDLE    = 1 << 2;
    }
}

impl MouseButtons {
    /// Buttons that drive a pressed preview on their own.
    const REVEALING: Self = Self::PRIMARY.union(Self::MIDDLE);
}

/// Where the pointer interaction currently stands: one value instead of
/// loose `chording`/`held-after-chord` booleans, with the transitions below
/// keeping the exact per-button gates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// No reveal gesture in flight.
    Idle,
    /// Primary button held on its own, tracking a single-tile preview.
    Pressing,
    /// Two-button or middle-button chord in flight, tracking a 3x3 preview.
    Chording,
    /// A chord ended with one of its buttons still down; new gestures stay
    /// suppressed until that button is released too.
    PostChord,
}

impl Gesture {
    pub const fn is_chording(self) -> bool {
        matches!(self, Self::Chording)
    }

    pub const fn is_suppressed(self) -> bool {
        matches!(self, Self::PostChord)
    }

    /// Radius previews move with: the full chord square while chording, the
    /// single hovered tile otherwise.
    const fn preview_radius(self) -> i32 {
        if self.is_chording() { 1 } else { 0 }
    }
}

impl Default for Gesture {
    fn default() -> Self {
        Self::Idle
    }
}

/// Drives a [`Minefield`] from pointer and configuration events and forwards
/// the resulting counter/timer/face updates to the injected façade.
///
/// Every handler takes the grid cell under the pointer (the event source
/// clamps to the board before calling) together with the held-buttons mask.
/// Gestures only mutate the field while the game is active; once it ends,
/// only the read surface and the configuration surface stay live.
#[derive(Debug)]
pub struct GameSession<F> {
    field: Minefield,
    ui: F,
    rng: SmallRng,
    gesture: Gesture,
    last_pos: Option<Coord2>,
    pointer_inside: bool,
}

impl<F: GameFacade> GameSession<F> {
    pub fn new(config: GameConfig, seed: u64, ui: F) -> Self {
        Self::with_field(Minefield::new(config), seed, ui)
    }

    /// Session over a prepared board, e.g. a fixed layout for a replay.
    pub fn with_field(field: Minefield, seed: u64, ui: F) -> Self {
        Self {
            field,
            ui,
            rng: SmallRng::seed_from_u64(seed),
            gesture: Gesture::Idle,
            last_pos: None,
            pointer_inside: false,
        }
    }

    pub fn field(&self) -> &Minefield {
        &self.field
    }

    pub fn ui(&self) -> &F {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut F {
        &mut self.ui
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Applies a new width/height/mine-count. The board is rebuilt and the
    /// auxiliary UI reset only when the clamped parameters actually change;
    /// returns whether that happened.
    pub fn configure(&mut self, config: GameConfig) -> bool {
        let changed = self.field.configure(config);
        if changed {
            self.reset_session_ui();
        }
        changed
    }

    /// Starts the current configuration over.
    pub fn reset_game(&mut self) {
        self.field.reset();
        self.reset_session_ui();
    }

    fn reset_session_ui(&mut self) {
        self.gesture = Gesture::Idle;
        self.last_pos = None;
        self.ui.set_mines_left(i32::from(self.field.mine_count()));
        self.ui.stop_timer();
        self.ui.reset_timer();
        self.ui.set_smile(SmileState::Neutral);
        self.ui.request_layout();
        self.ui.request_render();
    }

    pub fn toggle_question_marks(&mut self) {
        if !self.field.toggle_question_marks() {
            self.ui.request_render();
        }
    }

    pub fn primary_down(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active()
            && !buttons.contains(MouseButtons::MIDDLE)
            && !self.gesture.is_suppressed()
        {
            self.ui.set_smile(SmileState::Pressed);

            if buttons.contains(MouseButtons::SECONDARY) {
                self.begin_chord(pos);
            } else {
                self.gesture = Gesture::Pressing;
                let tile = self.field.tile_at(pos);
                if tile.state == TileState::Hidden && !tile.mark.is_flag() {
                    self.field.move_preview(pos, pos, 0, true);
                    self.ui.request_render();
                }
            }
        }
    }

    pub fn primary_up(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active()
            && !buttons.contains(MouseButtons::MIDDLE)
            && !self.gesture.is_suppressed()
        {
            if self.gesture.is_chording() {
                self.end_chord(pos);
                self.gesture = Gesture::PostChord;
            } else {
                if self.field.tile_at(pos).state == TileState::Clicked {
                    if self.field.revealed_count() == 0 {
                        self.field.generate_mines(&mut self.rng, pos);
                        self.ui.start_timer();
                    }

                    let outcome = self.field.reveal(pos).unwrap_or(RevealOutcome::NoChange);
                    self.ui.request_render();
                    self.notify_outcome(outcome);
                }
                self.gesture = Gesture::Idle;
            }

            if self.field.is_active() {
                self.ui.set_smile(SmileState::Neutral);
            }
        } else if self.gesture.is_suppressed() && !buttons.contains(MouseButtons::SECONDARY) {
            self.gesture = Gesture::Idle;
        }
    }

    pub fn secondary_down(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active()
            && !buttons.contains(MouseButtons::MIDDLE)
            && !self.gesture.is_suppressed()
        {
            if buttons.contains(MouseButtons::PRIMARY) {
                self.begin_chord(pos);
            } else if self.field.tile_at(pos).state == TileState::Hidden
                && self
                    .field
                    .cycle_mark(pos)
                    .map_or(false, MarkOutcome::has_update)
            {
                self.ui.set_mines_left(self.field.mines_left());
                self.ui.request_render();
            }
        }
    }

    pub fn secondary_up(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active()
            && !buttons.contains(MouseButtons::MIDDLE)
            && !self.gesture.is_suppressed()
        {
            if self.gesture.is_chording() {
                self.end_chord(pos);
                self.gesture = Gesture::PostChord;
            }
        } else if self.gesture.is_suppressed() && !buttons.contains(MouseButtons::PRIMARY) {
            self.gesture = Gesture::Idle;
        }
    }

    /// Middle-down opens a chord even while post-chord suppressed; that
    /// asymmetry is deliberate and matches the per-button gates above.
    pub fn middle_down(&mut self, pos: Coord2, _buttons: MouseButtons) {
        if self.field.is_active() && !self.gesture.is_chording() {
            self.begin_chord(pos);
        }
    }

    pub fn middle_up(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active() && self.gesture.is_chording() {
            let still_held =
                buttons.intersects(MouseButtons::PRIMARY | MouseButtons::SECONDARY);
            self.end_chord(pos);
            self.gesture = if still_held {
                Gesture::PostChord
            } else {
                Gesture::Idle
            };
        }
    }

    pub fn pointer_move(&mut self, pos: Coord2, buttons: MouseButtons) {
        log::trace!("pointer at {:?} ({:?})", pos, buttons);

        if self.pointer_inside {
            self.tracked_move(pos, buttons);
        } else {
            self.reenter_move(pos, buttons);
        }

        // the hovered-content display follows the pointer even after the
        // game has ended
        self.ui.set_hovered_content(self.field.tile_at(pos).content);
    }

    pub fn pointer_leave(&mut self) {
        log::trace!("pointer left the field");

        if self.field.is_active() {
            self.ui.set_smile(SmileState::Neutral);
            if let Some(last) = self.last_pos {
                self.field.clear_preview(last, self.gesture.preview_radius());
            }
            self.ui.request_render();
        }

        self.gesture = Gesture::Idle;
        self.pointer_inside = false;
        self.ui.set_hovered_content(TileContent::Empty);
    }

    /// Ordinary in-field movement: slide whatever preview the current
    /// gesture owns along with the pointer.
    fn tracked_move(&mut self, pos: Coord2, buttons: MouseButtons) {
        if self.field.is_active() {
            if buttons.intersects(MouseButtons::REVEALING) {
                let old = self.last_pos.unwrap_or(pos);
                let moved = if self.gesture.is_chording() {
                    self.field.move_preview(old, pos, 1, false)
                } else if !self.gesture.is_suppressed() {
                    self.field.move_preview(old, pos, 0, false)
                } else {
                    false
                };

                if moved {
                    self.ui.request_render();
                }
            }

            self.last_pos = Some(pos);
        }
    }

    /// First movement after the pointer (re)enters the field: the gesture is
    /// re-derived from the button mask and the preview force-refreshed.
    fn reenter_move(&mut self, pos: Coord2, buttons: MouseButtons) {
        self.pointer_inside = true;

        if self.field.is_active() {
            if buttons.intersects(MouseButtons::REVEALING) {
                self.ui.set_smile(SmileState::Pressed);

                let old = self.last_pos.unwrap_or(pos);
                let radius = if buttons
                    .intersects(MouseButtons::SECONDARY | MouseButtons::MIDDLE)
                {
                    1
                } else {
                    0
                };
                if self.field.move_preview(old, pos, radius, true) {
                    self.ui.request_render();
                }

                let chord_mask = MouseButtons::PRIMARY | MouseButtons::SECONDARY;
                self.gesture = if buttons.contains(chord_mask)
                    || buttons.contains(MouseButtons::MIDDLE)
                {
                    Gesture::Chording
                } else {
                    Gesture::Pressing
                };
            }

            self.last_pos = Some(pos);
        }
    }

    fn begin_chord(&mut self, pos: Coord2) {
        self.ui.set_smile(SmileState::Pressed);
        self.field.begin_chord(pos);
        self.gesture = Gesture::Chording;
        self.ui.request_render();
    }

    fn end_chord(&mut self, pos: Coord2) {
        self.ui.set_smile(SmileState::Neutral);
        let outcome = self.field.end_chord(pos).unwrap_or(RevealOutcome::NoChange);
        self.ui.request_render();
        self.notify_outcome(outcome);
    }

    /// One-shot end-of-game notifications. Gestures are gated on the game
    /// being active, so a finished game never re-fires these.
    fn notify_outcome(&mut self, outcome: RevealOutcome) {
        match outcome {
            RevealOutcome::HitMine => {
                self.ui.stop_timer();
                self.ui.set_smile(SmileState::Dead);
            }
            RevealOutcome::Won => {
                self.ui.stop_timer();
                self.ui.set_mines_left(0);
                self.ui.set_smile(SmileState::Success);
            }
            RevealOutcome::Revealed | RevealOutcome::NoChange => {}
        }
    }
}
