use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::num::Saturating;
use core::ops::BitOr;
use ndarray::Array2;

use crate::*;

/// The minefield proper: the tile board plus its derived counters. Mines are
/// placed lazily by the first reveal; all mutation goes through the
/// operations below, and the pointer protocol that drives them lives in
/// [`GameSession`](crate::GameSession).
#[derive(Clone, Debug)]
pub struct Minefield {
    config: GameConfig,
    tiles: Array2<Tile>,
    revealed: Saturating<CellCount>,
    flagged: Saturating<CellCount>,
    lost: bool,
    mines_placed: bool,
    question_marks: bool,
}

impl Minefield {
    /// A fresh, unrevealed board. The config is clamped as per
    /// [`GameConfig::new`]. Question marks start disabled.
    pub fn new(config: GameConfig) -> Self {
        let config = GameConfig::new(config.size, config.mines);
        Self {
            config,
            tiles: Array2::default(config.size.to_nd_index()),
            revealed: Saturating(0),
            flagged: Saturating(0),
            lost: false,
            mines_placed: false,
            question_marks: false,
        }
    }

    /// Board with a fixed mine layout, already generated. Used for replays
    /// and deterministic tests.
    pub fn with_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut field = Self::new(GameConfig::new(size, 0));

        for &coords in mine_coords {
            field.validate_coords(coords)?;
            field.tiles[coords.to_nd_index()].content = TileContent::Mine;
        }

        field.config.mines = field
            .tiles
            .iter()
            .filter(|tile| tile.content.is_mine())
            .count()
            .try_into()
            .unwrap();
        field.generate_numbers();
        field.mines_placed = true;
        Ok(field)
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn total_tiles(&self) -> CellCount {
        self.config.total_tiles()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed.0
    }

    pub fn flagged_count(&self) -> CellCount {
        self.flagged.0
    }

    /// How many mines have not been flagged yet; negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flagged.0)
    }

    pub fn question_marks_enabled(&self) -> bool {
        self.question_marks
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.tiles[coords.to_nd_index()]
    }

    /// Tiles in ascending linear-index order.
    pub fn iter_tiles(&self) -> impl Iterator<Item = (Coord2, Tile)> + '_ {
        let width = self.config.size.0;
        (0..self.total_tiles()).map(move |index| {
            let coords = to_coord(index, width);
            (coords, self.tiles[coords.to_nd_index()])
        })
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (max_x, max_y) = self.config.size;
        if coords.0 < max_x && coords.1 < max_y {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Won once every safe tile is revealed and no mine was hit. The first
    /// clause keeps a freshly reset zero-mine board from counting as won.
    pub fn is_won(&self) -> bool {
        !self.lost && self.revealed.0 > 0 && self.revealed.0 >= self.config.safe_tiles()
    }

    pub fn is_active(&self) -> bool {
        !self.is_lost() && !self.is_won()
    }

    /// Applies a new configuration. The board is rebuilt from scratch only
    /// when the clamped parameters differ from the current ones; returns
    /// whether that happened.
    pub fn configure(&mut self, config: GameConfig) -> bool {
        let config = GameConfig::new(config.size, config.mines);
        if config == self.config {
            return false;
        }

        self.config = config;
        self.reset();
        true
    }

    /// Discards the current game wholesale: fresh default tiles, zeroed
    /// counters, mines to be generated again. Question-mark usage is a
    /// setting and survives.
    pub fn reset(&mut self) {
        self.tiles = Array2::default(self.config.size.to_nd_index());
        self.revealed = Saturating(0);
        self.flagged = Saturating(0);
        self.lost = false;
        self.mines_placed = false;
    }

    /// Places this game's mines, keeping an exclusion zone around the first
    /// revealed tile, then derives every numeral. Runs exactly once per
    /// game; the first reveal action triggers it.
    pub fn generate_mines<R: rand::Rng>(&mut self, rng: &mut R, first: Coord2) {
        if self.mines_placed {
            log::warn!("mines already placed, ignoring generation at {:?}", first);
            return;
        }
        self.mines_placed = true;

        let mines = usize::from(self.config.mines);
        // a full 3x3 opening needs nine spare tiles; otherwise only the
        // first tile itself is kept clear
        let radius = if self.config.safe_tiles() >= 9 { 1 } else { 0 };

        let mut candidates = self.tiles_outside(first, radius);
        if candidates.len() < mines {
            log::warn!(
                "cannot keep {:?} clear, {} candidates for {} mines",
                first,
                candidates.len(),
                mines
            );
            candidates = self.tiles_outside(first, -1);
        }

        for coords in sample_tiles(rng, candidates, mines) {
            self.tiles[coords.to_nd_index()].content = TileContent::Mine;
        }

        self.generate_numbers();
        log::debug!("placed {} mines away from {:?}", mines, first);
    }

    /// Every tile outside the square of `radius` around `center`, in
    /// linear-index order. A negative radius excludes nothing.
    fn tiles_outside(&self, center: Coord2, radius: i32) -> Vec<Coord2> {
        let width = self.config.size.0;
        (0..self.total_tiles())
            .map(|index| to_coord(index, width))
            .filter(|&(x, y)| {
                (i32::from(x) - i32::from(center.0)).abs() > radius
                    || (i32::from(y) - i32::from(center.1)).abs() > radius
            })
            .collect()
    }

    /// Derives every safe tile's numeral from its neighborhood.
    fn generate_numbers(&mut self) {
        let (x_end, y_end) = self.config.size;
        for y in 0..y_end {
            for x in 0..x_end {
                let coords = (x, y);
                if !self.tiles[coords.to_nd_index()].content.is_mine() {
                    let count = self.adjacent_mines(coords);
                    self.tiles[coords.to_nd_index()].content = TileContent::from_adjacent(count);
                }
            }
        }
    }

    /// Mines within the 8-neighborhood of `coords`.
    fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.tiles
            .iter_grid(coords, 1)
            .filter(|&pos| self.tiles[pos.to_nd_index()].content.is_mine())
            .count()
            .try_into()
            .unwrap()
    }

    fn flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.tiles
            .iter_grid(coords, 1)
            .filter(|&pos| self.tiles[pos.to_nd_index()].mark.is_flag())
            .count()
            .try_into()
            .unwrap()
    }

    /// Reveals a tile, flood-revealing from empty tiles. Already revealed
    /// and flagged tiles are left untouched.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_active()?;

        Ok(self.reveal_tile(coords))
    }

    fn reveal_tile(&mut self, coords: Coord2) -> RevealOutcome {
        use RevealOutcome::*;

        if !self.tiles[coords.to_nd_index()].can_reveal() {
            return NoChange;
        }

        self.tiles[coords.to_nd_index()].state = TileState::Revealed;
        self.revealed += 1;

        match self.tiles[coords.to_nd_index()].content {
            TileContent::Mine => {
                self.lost = true;
                log::debug!("revealed a mine at {:?}", coords);
                return HitMine;
            }
            TileContent::Empty => self.flood_reveal(coords),
            TileContent::Number(_) => {}
        }

        if self.is_won() { Won } else { Revealed }
    }

    /// Breadth-first expansion from a revealed empty tile. Neighbors are
    /// revealed before they are enqueued, so each tile enters the worklist
    /// at most once and the loop drains in bounded time.
    fn flood_reveal(&mut self, origin: Coord2) {
        let mut worklist = VecDeque::from([origin]);

        while let Some(center) = worklist.pop_front() {
            for pos in self.tiles.iter_grid(center, 1) {
                let tile = self.tiles[pos.to_nd_index()];
                if !tile.can_reveal() {
                    continue;
                }

                self.tiles[pos.to_nd_index()].state = TileState::Revealed;
                self.revealed += 1;
                log::trace!("flood revealed {:?}", pos);

                if tile.content == TileContent::Empty {
                    worklist.push_back(pos);
                }
            }
        }
    }

    /// Presses the chord preview: every hidden, unflagged tile in the square
    /// around the center (center included) shows as clicked. Purely visual.
    pub fn begin_chord(&mut self, coords: Coord2) {
        for pos in self.tiles.iter_grid(coords, 1) {
            let tile = &mut self.tiles[pos.to_nd_index()];
            if tile.state == TileState::Hidden && !tile.mark.is_flag() {
                tile.state = TileState::Clicked;
            }
        }
    }

    /// Resolves a chord. When the center is revealed and the flags around it
    /// match its numeral, every neighbor is revealed (which may cascade and
    /// may end the game either way); any mismatch reverts the pressed
    /// preview without touching a counter.
    pub fn end_chord(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_active()?;

        let center = self.tile_at(coords);
        if center.state.is_revealed() && self.flagged_neighbors(coords) == center.content.number() {
            let grid = self.tiles.iter_grid(coords, 1);
            Ok(grid
                .map(|pos| self.reveal_tile(pos))
                .reduce(BitOr::bitor)
                .unwrap_or(NoChange))
        } else {
            self.clear_preview(coords, 1);
            Ok(NoChange)
        }
    }

    /// Cycles the mark on a hidden tile: none -> flag -> question (when
    /// enabled, else none) -> none. Pressed previews and revealed tiles are
    /// left alone.
    pub fn cycle_mark(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        self.check_active()?;

        let question_marks = self.question_marks;
        let tile = &mut self.tiles[coords.to_nd_index()];
        if tile.state != TileState::Hidden {
            return Ok(NoChange);
        }

        match tile.mark {
            TileMark::None => {
                tile.mark = TileMark::Flag;
                self.flagged += 1;
            }
            TileMark::Flag => {
                tile.mark = if question_marks {
                    TileMark::Question
                } else {
                    TileMark::None
                };
                self.flagged -= 1;
            }
            TileMark::Question => tile.mark = TileMark::None,
        }

        Ok(Changed)
    }

    /// Flips question-mark usage, returning the new setting. Disabling
    /// sweeps any question marks off the board; the flag counter is
    /// unaffected either way.
    pub fn toggle_question_marks(&mut self) -> bool {
        self.question_marks = !self.question_marks;

        if !self.question_marks {
            for tile in self.tiles.iter_mut() {
                if tile.mark == TileMark::Question {
                    tile.mark = TileMark::None;
                }
            }
        }

        self.question_marks
    }

    /// Slides the pressed preview from `old` to `new` when they differ (or
    /// unconditionally with `force`): the old square is released, the new
    /// one pressed. Radius 0 tracks a single tile, radius 1 a chord. Purely
    /// visual; returns whether anything may have changed.
    pub fn move_preview(&mut self, old: Coord2, new: Coord2, radius: i32, force: bool) -> bool {
        if old == new && !force {
            return false;
        }

        self.clear_preview(old, radius);
        for pos in self.tiles.iter_grid(new, radius) {
            let tile = &mut self.tiles[pos.to_nd_index()];
            if tile.state == TileState::Hidden && !tile.mark.is_flag() {
                tile.state = TileState::Clicked;
            }
        }

        true
    }

    /// Reverts any pressed preview in the square around `center` back to
    /// hidden; returns whether any tile changed.
    pub fn clear_preview(&mut self, center: Coord2, radius: i32) -> bool {
        let mut updated = false;

        for pos in self.tiles.iter_grid(center, radius) {
            let tile = &mut self.tiles[pos.to_nd_index()];
            if tile.state == TileState::Clicked {
                tile.state = TileState::Hidden;
                updated = true;
            }
        }

        updated
    }

    fn check_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(GameError::AlreadyEnded)
        }
    }
}
