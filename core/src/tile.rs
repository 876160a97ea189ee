use serde::{Deserialize, Serialize};

/// What a tile holds once mines have been generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileContent {
    Empty,
    /// Numeral 1..=8, the number of adjacent mines.
    Number(u8),
    Mine,
}

impl TileContent {
    /// Content of a safe tile with `count` adjacent mines.
    pub const fn from_adjacent(count: u8) -> Self {
        match count {
            0 => Self::Empty,
            n => Self::Number(n),
        }
    }

    /// The numeral shown on the tile; zero for empty tiles and mines.
    pub const fn number(self) -> u8 {
        match self {
            Self::Number(n) => n,
            _ => 0,
        }
    }

    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for TileContent {
    fn default() -> Self {
        Self::Empty
    }
}

/// Reveal progression of a tile. `Clicked` is the pressed-but-not-released
/// preview and never outlives the gesture that produced it; `Revealed` is a
/// one-way transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    Hidden,
    Clicked,
    Revealed,
}

impl TileState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

impl Default for TileState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// Player-placed annotation on a hidden tile, independent of its content.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileMark {
    None,
    Flag,
    Question,
}

impl TileMark {
    pub const fn is_flag(self) -> bool {
        matches!(self, Self::Flag)
    }
}

impl Default for TileMark {
    fn default() -> Self {
        Self::None
    }
}

/// A single cell of the minefield.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub content: TileContent,
    pub state: TileState,
    pub mark: TileMark,
}

impl Tile {
    /// Whether a reveal may transition this tile. Flags are never overridden
    /// by a reveal, chorded or not.
    pub const fn can_reveal(&self) -> bool {
        !self.state.is_revealed() && !self.mark.is_flag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tile_is_a_hidden_unmarked_empty() {
        let tile = Tile::default();
        assert_eq!(tile.content, TileContent::Empty);
        assert_eq!(tile.state, TileState::Hidden);
        assert_eq!(tile.mark, TileMark::None);
        assert!(tile.can_reveal());
    }

    #[test]
    fn adjacent_count_maps_zero_to_empty() {
        assert_eq!(TileContent::from_adjacent(0), TileContent::Empty);
        assert_eq!(TileContent::from_adjacent(3), TileContent::Number(3));
        assert_eq!(TileContent::from_adjacent(3).number(), 3);
        assert_eq!(TileContent::Empty.number(), 0);
    }

    #[test]
    fn flagged_and_revealed_tiles_resist_reveal() {
        let flagged = Tile {
            mark: TileMark::Flag,
            ..Tile::default()
        };
        assert!(!flagged.can_reveal());

        let revealed = Tile {
            state: TileState::Revealed,
            ..Tile::default()
        };
        assert!(!revealed.can_reveal());

        let clicked = Tile {
            state: TileState::Clicked,
            ..Tile::default()
        };
        assert!(clicked.can_reveal());
    }
}
