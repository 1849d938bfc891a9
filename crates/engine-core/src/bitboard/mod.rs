//! Bitboardと利きテーブル

mod core;
mod sliders;
mod tables;

pub use self::core::{Bitboard, BitboardIter};
pub use sliders::{bishop_attacks, init, queen_attacks, rook_attacks};
pub use tables::{king_attacks, knight_attacks, pawn_attacks};

use crate::types::{PieceType, Square};

/// ポーン以外の駒の利きを取得
///
/// ポーンは前進と捕獲で利きが異なるため `pawn_attacks` を直接使うこと。
#[inline]
pub fn piece_attacks(pt: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    match pt {
        PieceType::Knight => knight_attacks(sq),
        PieceType::Bishop => bishop_attacks(sq, occupied),
        PieceType::Rook => rook_attacks(sq, occupied),
        PieceType::Queen => queen_attacks(sq, occupied),
        PieceType::King => king_attacks(sq),
        PieceType::Pawn => {
            debug_assert!(false, "piece_attacks called with Pawn");
            Bitboard::EMPTY
        }
    }
}
