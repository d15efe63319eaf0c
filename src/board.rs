use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Standard chessboard width/height
pub const BOARD_SIZE: usize = 8;

/// One letter per file, so boards wider than the alphabet can't be named
pub const MAX_BOARD_SIZE: usize = 26;

/// Which side of the board is drawn at the bottom
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    #[default]
    White,
    Black,
}

impl Perspective {
    pub fn flipped(self) -> Self {
        match self {
            Perspective::White => Perspective::Black,
            Perspective::Black => Perspective::White,
        }
    }
}

/// A square on screen: `col` counts from the left edge, `row` from the top edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub col: usize,
    pub row: usize,
}

impl GridPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

impl From<(usize, usize)> for GridPos {
    fn from(v: (usize, usize)) -> Self {
        GridPos { col: v.0, row: v.1 }
    }
}

/// A freshly drawn target as shown to the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinate {
    pub notation: String,
    pub pos: GridPos,
}

/// Generates targets and checks clicks against them.
///
/// The target is stored in the white-side frame (file left to right, rank 8
/// at row 0). The perspective only changes how that frame is mapped onto
/// what the player sees.
#[derive(Debug, Clone)]
pub struct CoordinateBoard {
    size: usize,
    perspective: Perspective,
    target: Option<GridPos>,
}

impl Default for CoordinateBoard {
    fn default() -> Self {
        Self {
            size: BOARD_SIZE,
            perspective: Perspective::White,
            target: None,
        }
    }
}

impl CoordinateBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(size: usize) -> Result<Self> {
        if size == 0 || size > MAX_BOARD_SIZE {
            return Err(Error::InvalidBoardSize(size));
        }
        Ok(Self {
            size,
            ..Self::default()
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn perspective(&self) -> Perspective {
        self.perspective
    }

    pub fn set_perspective(&mut self, perspective: Perspective) {
        self.perspective = perspective;
    }

    pub fn flip_perspective(&mut self) {
        self.perspective = self.perspective.flipped();
    }

    /// Canonical (white-frame) target, if any
    pub fn target(&self) -> Option<GridPos> {
        self.target
    }

    pub fn set_target(&mut self, pos: GridPos) {
        self.target = Some(pos);
    }

    pub fn clear_target(&mut self) {
        self.target = None;
    }

    /// Draw a new target from the thread-local RNG. Any unfinished target is dropped.
    pub fn generate_coordinate(&mut self) -> Coordinate {
        self.generate_coordinate_with(&mut rand::thread_rng())
    }

    pub fn generate_coordinate_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Coordinate {
        let file = rng.gen_range(0..self.size);
        let rank = rng.gen_range(1..=self.size);

        let pos = GridPos::new(file, self.size - rank);
        self.target = Some(pos);

        Coordinate {
            notation: format!("{}{}", file_letter(file), rank),
            pos,
        }
    }

    /// Where the current target sits on screen under the current perspective
    pub fn target_on_screen(&self) -> Option<GridPos> {
        self.target.map(|t| self.mirror(t))
    }

    /// Does not advance the target; the caller decides what happens next.
    pub fn validate_click(&self, col: usize, row: usize) -> bool {
        match self.target_on_screen() {
            Some(expected) => expected == GridPos::new(col, row),
            None => false,
        }
    }

    /// Label for the screen square at (col, row), as used by the coordinate overlay.
    ///
    /// `col` and `row` must be on the board (`< size`).
    pub fn coordinate_to_notation(&self, col: usize, row: usize) -> String {
        debug_assert!(
            col < self.size && row < self.size,
            "({col}, {row}) is off a {0}x{0} board",
            self.size
        );
        let last = self.size - 1;
        let (file, rank) = match self.perspective {
            Perspective::White => (col, self.size - row),
            Perspective::Black => (last - col, row + 1),
        };
        format!("{}{}", file_letter(file), rank)
    }

    /// Inverse of [`coordinate_to_notation`](Self::coordinate_to_notation).
    pub fn notation_to_coordinate(&self, notation: &str) -> Option<GridPos> {
        let notation = notation.trim();
        let mut chars = notation.chars();
        let letter = chars.next()?.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            return None;
        }
        let file = (letter as u8 - b'A') as usize;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let rank: usize = digits.parse().ok()?;
        if file >= self.size || rank == 0 || rank > self.size {
            return None;
        }

        let last = self.size - 1;
        let pos = match self.perspective {
            Perspective::White => GridPos::new(file, self.size - rank),
            Perspective::Black => GridPos::new(last - file, rank - 1),
        };
        Some(pos)
    }

    fn mirror(&self, pos: GridPos) -> GridPos {
        match self.perspective {
            Perspective::White => pos,
            Perspective::Black => {
                let last = self.size - 1;
                GridPos::new(last - pos.col, last - pos.row)
            }
        }
    }
}

fn file_letter(file: usize) -> char {
    (b'A' + file as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initial_state() {
        let board = CoordinateBoard::new();
        assert_eq!(board.perspective(), Perspective::White);
        assert_eq!(board.target(), None);
        assert_eq!(board.size(), 8);
    }

    #[test]
    fn test_flip_perspective_twice_is_identity() {
        let mut board = CoordinateBoard::new();
        board.flip_perspective();
        assert_eq!(board.perspective(), Perspective::Black);
        board.flip_perspective();
        assert_eq!(board.perspective(), Perspective::White);
    }

    #[test]
    fn test_flip_keeps_target() {
        let mut board = CoordinateBoard::new();
        board.set_target(GridPos::new(2, 5));
        board.flip_perspective();
        assert_eq!(board.target(), Some(GridPos::new(2, 5)));
    }

    #[test]
    fn test_generated_coordinates_stay_on_board() {
        let mut board = CoordinateBoard::new();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..500 {
            let coord = board.generate_coordinate_with(&mut rng);
            let file = coord.pos.col;
            let rank = 8 - coord.pos.row;

            assert!(file <= 7);
            assert!((1..=8).contains(&rank));
            assert_eq!(
                coord.notation,
                format!("{}{}", (b'A' + file as u8) as char, rank)
            );
            assert_eq!(board.target(), Some(coord.pos));
        }
    }

    #[test]
    fn test_generate_with_thread_rng() {
        let mut board = CoordinateBoard::new();
        let coord = board.generate_coordinate();
        assert_eq!(coord.notation.len(), 2);
        assert!(board.validate_click(coord.pos.col, coord.pos.row));
    }

    #[test]
    fn test_generation_covers_every_file_and_rank() {
        let mut board = CoordinateBoard::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut files = [false; 8];
        let mut rows = [false; 8];

        for _ in 0..2000 {
            let coord = board.generate_coordinate_with(&mut rng);
            files[coord.pos.col] = true;
            rows[coord.pos.row] = true;
        }

        assert!(files.iter().all(|&f| f));
        assert!(rows.iter().all(|&r| r));
    }

    #[test]
    fn test_generation_overwrites_previous_target() {
        let mut board = CoordinateBoard::new();
        board.set_target(GridPos::new(0, 0));
        let mut rng = StdRng::seed_from_u64(1);
        let coord = board.generate_coordinate_with(&mut rng);
        assert_eq!(board.target(), Some(coord.pos));
    }

    #[test]
    fn test_non_standard_sizes() {
        for size in [1, 3, 10, 26] {
            let mut board = CoordinateBoard::with_size(size).unwrap();
            let mut rng = StdRng::seed_from_u64(size as u64);
            for _ in 0..200 {
                let coord = board.generate_coordinate_with(&mut rng);
                assert!(coord.pos.col < size);
                assert!(coord.pos.row < size);
                let rank: usize = coord.notation[1..].parse().unwrap();
                assert!((1..=size).contains(&rank));
            }
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert_matches!(CoordinateBoard::with_size(0), Err(Error::InvalidBoardSize(0)));
        assert_matches!(
            CoordinateBoard::with_size(27),
            Err(Error::InvalidBoardSize(27))
        );
    }

    #[test]
    fn test_validate_without_target() {
        let board = CoordinateBoard::new();
        for col in 0..8 {
            for row in 0..8 {
                assert!(!board.validate_click(col, row));
            }
        }
    }

    #[test]
    fn test_validate_white_perspective() {
        let mut board = CoordinateBoard::new();
        // E4 -> file 4, rank 4 -> row 4
        board.set_target(GridPos::new(4, 4));

        assert!(board.validate_click(4, 4));
        assert!(!board.validate_click(3, 3));
        assert!(!board.validate_click(4, 3));
        // validation never consumes the target
        assert!(board.validate_click(4, 4));
    }

    #[test]
    fn test_validate_black_perspective_mirrors_both_axes() {
        let mut board = CoordinateBoard::new();
        // A8 sits in the top-left corner from white's side
        board.set_target(GridPos::new(0, 0));
        board.flip_perspective();

        assert!(board.validate_click(7, 7));
        assert!(!board.validate_click(0, 0));
    }

    #[test]
    fn test_click_valid_after_flip_when_mirrored() {
        let mut board = CoordinateBoard::new();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..100 {
            let coord = board.generate_coordinate_with(&mut rng);
            let (c, r) = (coord.pos.col, coord.pos.row);
            assert!(board.validate_click(c, r));

            board.flip_perspective();
            assert!(board.validate_click(7 - c, 7 - r));
            board.flip_perspective();
        }
    }

    #[test]
    fn test_notation_white() {
        let board = CoordinateBoard::new();
        assert_eq!(board.coordinate_to_notation(0, 0), "A8");
        assert_eq!(board.coordinate_to_notation(0, 7), "A1");
        assert_eq!(board.coordinate_to_notation(7, 7), "H1");
        assert_eq!(board.coordinate_to_notation(4, 4), "E4");
    }

    #[test]
    fn test_notation_black() {
        let mut board = CoordinateBoard::new();
        board.flip_perspective();
        assert_eq!(board.coordinate_to_notation(0, 0), "H1");
        assert_eq!(board.coordinate_to_notation(7, 7), "A8");
        assert_eq!(board.coordinate_to_notation(3, 3), "E4");
    }

    #[test]
    fn test_notation_round_trip_white() {
        let board = CoordinateBoard::new();
        for col in 0..8 {
            for row in 0..8 {
                let notation = board.coordinate_to_notation(col, row);
                let file = (notation.as_bytes()[0] - b'A') as usize;
                let rank: usize = notation[1..].parse().unwrap();
                // same mapping generation uses
                assert_eq!((file, 8 - rank), (col, row));
                assert_eq!(
                    board.notation_to_coordinate(&notation),
                    Some(GridPos::new(col, row))
                );
            }
        }
    }

    #[test]
    fn test_notation_round_trip_black() {
        let mut board = CoordinateBoard::new();
        board.flip_perspective();
        for col in 0..8 {
            for row in 0..8 {
                let notation = board.coordinate_to_notation(col, row);
                assert_eq!(
                    board.notation_to_coordinate(&notation),
                    Some(GridPos::new(col, row))
                );
            }
        }
    }

    #[test]
    fn test_generated_notation_matches_overlay_label() {
        let mut board = CoordinateBoard::new();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let coord = board.generate_coordinate_with(&mut rng);
            let on_screen = board.target_on_screen().unwrap();
            assert_eq!(
                board.coordinate_to_notation(on_screen.col, on_screen.row),
                coord.notation
            );
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "off a 8x8 board")]
    fn test_label_for_off_board_square_panics() {
        CoordinateBoard::new().coordinate_to_notation(8, 0);
    }

    #[test]
    fn test_parse_rejects_off_board() {
        let board = CoordinateBoard::new();
        assert_eq!(board.notation_to_coordinate("e4"), Some(GridPos::new(4, 4)));
        assert_eq!(board.notation_to_coordinate("I1"), None);
        assert_eq!(board.notation_to_coordinate("A0"), None);
        assert_eq!(board.notation_to_coordinate("A9"), None);
        assert_eq!(board.notation_to_coordinate(""), None);
        assert_eq!(board.notation_to_coordinate("44"), None);
        assert_eq!(board.notation_to_coordinate("A+1"), None);
        assert_eq!(board.notation_to_coordinate("A-1"), None);
        assert_eq!(board.notation_to_coordinate("A 1"), None);
    }

    #[test]
    fn test_perspective_display() {
        assert_eq!(Perspective::White.to_string(), "White");
        assert_eq!(Perspective::Black.to_string(), "Black");
    }
}
