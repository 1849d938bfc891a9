//! FEN形式の解析・出力

use crate::types::{CastleSide, Color, Piece, PieceType, Square};

use super::board::Board;
use super::zobrist;

/// 初期局面のFEN
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// FENパースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// 盤面の形式が不正
    Board(String),
    /// 手番の形式が不正
    SideToMove(String),
    /// キャスリング権の形式が不正
    Castling(String),
    /// アンパッサン升の形式が不正
    EnPassant(String),
    /// クロックの形式が不正
    Clock(String),
}

impl std::fmt::Display for FenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FenError::Board(s) => write!(f, "Invalid board: {s}"),
            FenError::SideToMove(s) => write!(f, "Invalid side to move: {s}"),
            FenError::Castling(s) => write!(f, "Invalid castling rights: {s}"),
            FenError::EnPassant(s) => write!(f, "Invalid en passant square: {s}"),
            FenError::Clock(s) => write!(f, "Invalid clock: {s}"),
        }
    }
}

impl std::error::Error for FenError {}

fn fen_piece(c: char) -> Option<PieceType> {
    match c.to_ascii_lowercase() {
        'p' => Some(PieceType::Pawn),
        'n' => Some(PieceType::Knight),
        'b' => Some(PieceType::Bishop),
        'r' => Some(PieceType::Rook),
        'q' => Some(PieceType::Queen),
        'k' => Some(PieceType::King),
        _ => None,
    }
}

fn piece_to_fen(pc: Piece) -> char {
    let c = match pc.piece_type() {
        PieceType::Pawn => 'p',
        PieceType::Knight => 'n',
        PieceType::Bishop => 'b',
        PieceType::Rook => 'r',
        PieceType::Queen => 'q',
        PieceType::King => 'k',
    };
    match pc.color() {
        Color::White => c.to_ascii_uppercase(),
        Color::Black => c,
    }
}

impl Board {
    /// FEN文字列から局面を生成
    ///
    /// 空白には寛容、フィールドの順序には厳格。クロック2つは省略可。
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        let mut board = Board::empty();
        let mut parts = fen.split_whitespace();

        // 1. 盤面（8段目から）
        let placement = parts
            .next()
            .ok_or_else(|| FenError::Board("empty FEN".to_string()))?;
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Board(format!("expected 8 ranks, got {}", ranks.len())));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(d) = c.to_digit(10) {
                    file += d as u8;
                    if file > 8 {
                        return Err(FenError::Board(format!("rank overflow: {rank_str}")));
                    }
                } else if let Some(pt) = fen_piece(c) {
                    if file >= 8 {
                        return Err(FenError::Board(format!("rank overflow: {rank_str}")));
                    }
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    // SAFETY: rank < 8 かつ file < 8
                    let sq = unsafe { Square::from_u8_unchecked(rank * 8 + file) };
                    board.set_piece(pt, color, sq);
                    file += 1;
                } else {
                    return Err(FenError::Board(format!("unexpected character: {c}")));
                }
            }
            if file != 8 {
                return Err(FenError::Board(format!("incomplete rank: {rank_str}")));
            }
        }

        // 2. 手番
        match parts.next() {
            Some("w") => board.set_turn(Color::White),
            Some("b") => {
                board.set_turn(Color::Black);
                board.xor_hash(zobrist::black_move_key());
            }
            other => {
                return Err(FenError::SideToMove(other.unwrap_or("").to_string()));
            }
        }

        // 3. キャスリング権
        let castling = parts
            .next()
            .ok_or_else(|| FenError::Castling("missing field".to_string()))?;
        if castling != "-" {
            for c in castling.chars() {
                let (side, color) = match c {
                    'K' => (CastleSide::Kingside, Color::White),
                    'Q' => (CastleSide::Queenside, Color::White),
                    'k' => (CastleSide::Kingside, Color::Black),
                    'q' => (CastleSide::Queenside, Color::Black),
                    _ => return Err(FenError::Castling(castling.to_string())),
                };
                board.set_castling(side, color, true);
            }
        }

        // 4. アンパッサン升
        let ep = parts
            .next()
            .ok_or_else(|| FenError::EnPassant("missing field".to_string()))?;
        if ep != "-" {
            let sq = Square::from_uci(ep).ok_or_else(|| FenError::EnPassant(ep.to_string()))?;
            board.set_ep_square(Some(sq));
            board.xor_hash(zobrist::ep_file_key(sq.file()));
        }

        // 5-6. ハーフムーブ/フルムーブ（省略時は 0 / 1）
        let half = match parts.next() {
            Some(s) => s.parse::<u16>().map_err(|_| FenError::Clock(s.to_string()))?,
            None => 0,
        };
        let full = match parts.next() {
            Some(s) => s.parse::<u16>().map_err(|_| FenError::Clock(s.to_string()))?,
            None => 1,
        };
        board.set_clocks(half, full);

        board.update_checkers();
        Ok(board)
    }

    /// 現局面のFEN文字列を取得
    pub fn to_fen(&self) -> String {
        let mut result = String::new();

        // 盤面
        for rank in (0..8).rev() {
            let mut space = 0;
            for file in 0..8 {
                // SAFETY: rank < 8 かつ file < 8
                let sq = unsafe { Square::from_u8_unchecked(rank * 8 + file) };
                let pc = self.piece_on(sq);
                if pc.is_none() {
                    space += 1;
                } else {
                    if space > 0 {
                        result.push_str(&space.to_string());
                        space = 0;
                    }
                    result.push(piece_to_fen(pc));
                }
            }
            if space > 0 {
                result.push_str(&space.to_string());
            }
            result.push(if rank > 0 { '/' } else { ' ' });
        }

        // 手番
        result.push_str(match self.turn() {
            Color::White => "w ",
            Color::Black => "b ",
        });

        // キャスリング権
        let mut found = false;
        for (c, side, color) in [
            ('K', CastleSide::Kingside, Color::White),
            ('Q', CastleSide::Queenside, Color::White),
            ('k', CastleSide::Kingside, Color::Black),
            ('q', CastleSide::Queenside, Color::Black),
        ] {
            if self.castling_right(side, color) {
                found = true;
                result.push(c);
            }
        }
        result.push_str(if found { " " } else { "- " });

        // アンパッサン升
        match self.ep_square() {
            Some(sq) => result.push_str(&sq.to_uci()),
            None => result.push('-'),
        }

        // クロック
        result.push_str(&format!(" {} {}", self.half_move_clock(), self.full_move_clock()));

        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::from_fen(START_FEN).expect("start position FEN is valid")
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "   +------------------------+")?;
        for rank in (0..8).rev() {
            write!(f, " {} |", rank + 1)?;
            for file in 0..8 {
                // SAFETY: rank < 8 かつ file < 8
                let sq = unsafe { Square::from_u8_unchecked(rank * 8 + file) };
                let pc = self.piece_on(sq);
                if pc.is_none() {
                    write!(f, " . ")?;
                } else {
                    write!(f, " {} ", piece_to_fen(pc))?;
                }
            }
            writeln!(f, "|")?;
        }
        writeln!(f, "   +------------------------+")?;
        writeln!(f, "     a  b  c  d  e  f  g  h")?;
        writeln!(f)?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        write!(f, "Hash: {:016x}", self.hash())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fen_startpos() {
        let b = Board::default();
        assert_eq!(b.turn(), Color::White);
        assert_eq!(b.piece_type_at(Square::E1), Some(PieceType::King));
        assert_eq!(b.piece_type_at(Square::D8), Some(PieceType::Queen));
        assert_eq!(b.pieces(Color::White, PieceType::Pawn).count(), 8);
        assert_eq!(b.half_move_clock(), 0);
        assert_eq!(b.full_move_clock(), 1);
        assert!(b.castling_right(CastleSide::Kingside, Color::White));
        assert!(b.castling_right(CastleSide::Queenside, Color::Black));
        assert!(b.is_valid());
    }

    #[test]
    fn test_fen_roundtrip() {
        let fens = [
            START_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
            "4k3/8/8/8/8/8/8/4K2R w K - 99 50",
            "rnbqkbnr/ppp1pppp/8/3p4/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 2",
        ];
        for fen in fens {
            let b = Board::from_fen(fen).unwrap();
            assert_eq!(b.to_fen(), fen, "round trip failed for {fen}");
            assert_eq!(b.hash(), b.generate_hash());
        }
    }

    #[test]
    fn test_fen_no_castling() {
        let b = Board::from_fen("8/8/8/8/8/8/8/K6k w - - 12 34").unwrap();
        assert!(b.to_fen().contains(" - "));
        assert_eq!(b.half_move_clock(), 12);
        assert_eq!(b.full_move_clock(), 34);
    }

    #[test]
    fn test_fen_full_move_clamped() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0").unwrap();
        assert_eq!(b.full_move_clock(), 1);
    }

    #[test]
    fn test_fen_lenient_whitespace() {
        let b = Board::from_fen("  4k3/8/8/8/8/8/8/4K3   w   -   -  0   1 ").unwrap();
        assert_eq!(b.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn test_fen_missing_clocks() {
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(b.half_move_clock(), 0);
        assert_eq!(b.full_move_clock(), 1);
    }

    #[test]
    fn test_fen_errors() {
        assert!(matches!(Board::from_fen(""), Err(FenError::Board(_))));
        assert!(matches!(
            Board::from_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::Board(_))
        ));
        assert!(matches!(
            Board::from_fen("9/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::Board(_))
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1"),
            Err(FenError::SideToMove(_))
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w xq - 0 1"),
            Err(FenError::Castling(_))
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - e9 0 1"),
            Err(FenError::EnPassant(_))
        ));
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1"),
            Err(FenError::Clock(_))
        ));
    }

    #[test]
    fn test_fen_black_to_move_hash() {
        let w = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(w.hash(), b.hash());
        assert_eq!(w.hash() ^ b.hash(), zobrist::black_move_key());
    }

    #[test]
    fn test_display_contains_fen() {
        let b = Board::default();
        let s = format!("{b}");
        assert!(s.contains("FEN: rnbqkbnr/"));
        assert!(s.contains("Hash:"));
    }
}
