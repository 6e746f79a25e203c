use std::str::FromStr;

use crate::error::{EngineError, Result};

use super::{CastlingRights, Color, Move, MoveType, Piece, Position, Square};

fn fen_error(fen: &str, reason: impl Into<String>) -> EngineError {
    EngineError::InvalidFenString {
        fen: fen.to_string(),
        reason: reason.into(),
    }
}

impl Position {
    /// Parse a position from FEN notation.
    ///
    /// Only the text is checked here: a FEN without kings parses, and queries that need a
    /// king report it later.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut position = Position::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 || parts.len() > 6 {
            return Err(fen_error(fen, format!("expected 4 to 6 fields, found {}", parts.len())));
        }

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(fen_error(fen, format!("expected 8 ranks, found {}", ranks.len())));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    file += skip as u8;
                } else {
                    let piece = Piece::from_char(c)
                        .ok_or_else(|| fen_error(fen, format!("invalid piece character '{c}'")))?;
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let sq = Square::new(rank, file)
                        .ok_or_else(|| fen_error(fen, format!("rank {} has more than 8 files", rank + 1)))?;
                    position.set_piece(sq, color, piece);
                    file += 1;
                }
            }
            if file != 8 {
                return Err(fen_error(fen, format!("rank {} describes {file} files", rank + 1)));
            }
        }

        position.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(fen_error(fen, format!("invalid side to move '{other}'"))),
        };

        let mut castling = CastlingRights::none();
        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => castling.set(Color::White, true),
                    'Q' => castling.set(Color::White, false),
                    'k' => castling.set(Color::Black, true),
                    'q' => castling.set(Color::Black, false),
                    _ => return Err(fen_error(fen, format!("invalid castling character '{c}'"))),
                }
            }
        }
        position.castling = castling;

        position.en_passant = match parts[3] {
            "-" => None,
            text => {
                let sq = Square::parse(text)
                    .ok_or_else(|| fen_error(fen, format!("invalid en passant square '{text}'")))?;
                let expected_rank = match position.side_to_move {
                    Color::White => 5,
                    Color::Black => 2,
                };
                if sq.rank() != expected_rank {
                    return Err(fen_error(fen, format!("en passant square {sq} on the wrong rank")));
                }
                Some(sq)
            }
        };

        if let Some(text) = parts.get(4) {
            position.halfmove_clock = text
                .parse()
                .map_err(|_| fen_error(fen, format!("invalid halfmove clock '{text}'")))?;
        }
        if let Some(text) = parts.get(5) {
            position.fullmove_number = text
                .parse()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or_else(|| fen_error(fen, format!("invalid fullmove number '{text}'")))?;
        }

        position.hash = position.compute_hash();
        Ok(position)
    }

    /// Convert the position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square::at(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };
        let mut castling = String::new();
        for (color, kingside, c) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            if self.castling.has(color, kingside) {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            castling,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Find the legal move written in long algebraic notation (`e2e4`, `e7e8q`).
    pub fn parse_move(&mut self, text: &str) -> Result<Move> {
        let (squares, promo) = match text.len() {
            4 => (text, None),
            5 => (text.get(..4).unwrap_or_default(), text.chars().nth(4)),
            _ => {
                return Err(EngineError::invalid_position(format!(
                    "malformed move text '{text}'"
                )))
            }
        };
        let (from, to) = match (
            squares.get(..2).and_then(Square::parse),
            squares.get(2..).and_then(Square::parse),
        ) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(EngineError::invalid_position(format!(
                    "malformed move text '{text}'"
                )))
            }
        };
        let promotion = match promo {
            None => None,
            Some(c) => match Piece::from_char(c) {
                Some(piece) if piece.is_promotion_target() => Some(piece),
                piece => return Err(EngineError::InvalidPieceType { piece }),
            },
        };

        let legal_moves = self.generate_legal_moves()?;
        legal_moves
            .iter()
            .copied()
            .find(|mv| mv.from() == from && mv.to() == to && mv.promotion() == promotion)
            .ok_or_else(|| {
                let move_type = if promotion.is_some() {
                    MoveType::Promotion
                } else {
                    MoveType::Normal
                };
                let mv = Move::new(from, to, move_type, promotion).unwrap_or_default();
                EngineError::InvalidMove { mv }
            })
    }
}

impl FromStr for Position {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Position::from_fen(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_fen_round_trip() {
        let position = Position::from_fen(START_FEN).unwrap();
        assert_eq!(position.to_fen(), START_FEN);
        assert_eq!(position, Position::new());
    }

    #[test]
    fn test_fen_black_to_move() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let position = Position::from_fen(fen).unwrap();
        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(position.en_passant(), Square::parse("e3"));
        assert_eq!(position.hash(), position.compute_hash());
    }

    #[test]
    fn test_fen_errors_are_invalid_fen_string() {
        let bad = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w",
            "rnbqkbnr/ppppxppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w XQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq z9 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
        ];
        for fen in bad {
            let err = Position::from_fen(fen).unwrap_err();
            assert_eq!(err.code(), "invalid_fen_string", "{fen}");
        }
    }

    #[test]
    fn test_fen_partial_castling() {
        let position =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w Kq - 0 1").unwrap();
        let rights = position.castling_rights();
        assert!(rights.has(Color::White, true));
        assert!(!rights.has(Color::White, false));
        assert!(!rights.has(Color::Black, true));
        assert!(rights.has(Color::Black, false));
    }

    #[test]
    fn test_parse_move() {
        let mut position = Position::new();
        let mv = position.parse_move("e2e4").unwrap();
        assert_eq!(mv.move_type(), MoveType::DoublePawnAdvance);

        let mut position = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
        let mv = position.parse_move("a7a8q").unwrap();
        assert_eq!(mv.promotion(), Some(Piece::Queen));
        assert_eq!(
            position.parse_move("a7a8k").unwrap_err().code(),
            "invalid_piece_type"
        );
    }

    #[test]
    fn test_parse_move_rejects_illegal_and_malformed() {
        let mut position = Position::new();
        assert_eq!(position.parse_move("e2e5").unwrap_err().code(), "invalid_move");
        assert_eq!(position.parse_move("z9z9").unwrap_err().code(), "invalid_position");
        assert_eq!(position.parse_move("e2").unwrap_err().code(), "invalid_position");
    }

    #[test]
    fn test_clocks_are_parsed() {
        let position = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 42 17").unwrap();
        assert_eq!(position.halfmove_clock(), 42);
        assert_eq!(position.fullmove_number(), 17);
    }
}
