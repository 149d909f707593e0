//! FEN and UCI coordinate notation, kept for test fixtures and debugging —
//! there is no protocol layer in this crate to drive it from stdin.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::state::Position;
use super::types::{Castle, CastlingRights, Color, Move, Piece, Square};

impl Position {
    /// Parse a position from FEN notation.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut pos = Position::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        for (rank_idx, rank_str) in parts[0].split('/').enumerate() {
            if rank_idx >= 8 {
                return Err(FenError::InvalidRank { rank: rank_idx });
            }
            let mut file = 0;
            for c in rank_str.chars() {
                if c.is_ascii_digit() {
                    file += c.to_digit(10).unwrap() as usize;
                } else {
                    let color = if c.is_uppercase() { Color::White } else { Color::Black };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    pos.place(Square::new(7 - rank_idx, file), color, piece);
                    file += 1;
                }
            }
        }

        pos.us = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        let mut castling_rights = CastlingRights::none();
        for c in parts[2].chars() {
            match c {
                'K' => castling_rights.set(Color::White, Castle::Kingside),
                'Q' => castling_rights.set(Color::White, Castle::Queenside),
                'k' => castling_rights.set(Color::Black, Castle::Kingside),
                'q' => castling_rights.set(Color::Black, Castle::Queenside),
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        pos.castling_rights = castling_rights;

        pos.en_passant_square = if parts[3] == "-" {
            None
        } else {
            let chars: Vec<char> = parts[3].chars().collect();
            if chars.len() == 2 && ('a'..='h').contains(&chars[0]) && ('1'..='8').contains(&chars[1]) {
                Some(Square::new(chars[1] as usize - '1' as usize, chars[0] as usize - 'a' as usize))
            } else {
                return Err(FenError::InvalidEnPassant {
                    found: parts[3].to_string(),
                });
            }
        };

        if parts.len() >= 5 {
            pos.halfmove_clock = parts[4].parse().unwrap_or(0);
        }

        pos.recompute_occupancies();
        pos.hash = pos.compute_hash();
        pos.their_attacks = pos.compute_their_attacks();
        Ok(pos)
    }

    /// Parse a position from FEN notation.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use [`Position::try_from_fen`] for
    /// fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("invalid FEN string")
    }

    /// Render the position as FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::new();
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                let sq = Square::new(rank, file);
                if let Some(color) = self.color_on(sq) {
                    let piece = self
                        .piece_at(sq, color)
                        .expect("color_on implies a piece is present");
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

        let active = if self.us == Color::White { "w" } else { "b" };
        let mut castling = String::new();
        if self.castling_rights.has(Color::White, Castle::Kingside) {
            castling.push('K');
        }
        if self.castling_rights.has(Color::White, Castle::Queenside) {
            castling.push('Q');
        }
        if self.castling_rights.has(Color::Black, Castle::Kingside) {
            castling.push('k');
        }
        if self.castling_rights.has(Color::Black, Castle::Queenside) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }
        let ep = self
            .en_passant_square
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} 1",
            rows.join("/"),
            active,
            castling,
            ep,
            self.halfmove_clock
        )
    }

    /// Parse a move in UCI long algebraic notation (e.g. "e2e4", "e7e8q")
    /// against this position's legal moves.
    pub fn parse_move(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        if uci.len() < 4 || uci.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: uci.len() });
        }

        let chars: Vec<char> = uci.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: uci.to_string(),
            });
        }

        let from_sq = Square::new(chars[1] as usize - '1' as usize, chars[0] as usize - 'a' as usize);
        let to_sq = Square::new(chars[3] as usize - '1' as usize, chars[2] as usize - 'a' as usize);

        let promotion = if uci.len() == 5 {
            let piece =
                Piece::from_char(chars[4]).ok_or(MoveParseError::InvalidPromotion { char: chars[4] })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece)
        } else {
            None
        };

        let legal_moves = self.legal_moves();
        for candidate in &legal_moves {
            if candidate.source() == from_sq && candidate.target() == to_sq && candidate.promotion() == promotion
            {
                return Ok(*candidate);
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: uci.to_string(),
        })
    }

    /// Parse a UCI move and play it in one call.
    pub fn make_move_uci(&mut self, uci: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(uci)?;
        self.make_move(mv);
        Ok(mv)
    }
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::try_from_fen(s)
    }
}
