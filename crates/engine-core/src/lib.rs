//! hiveチェスエンジンのコア
//!
//! Bitboardによる局面表現、指し手生成、着手と増分状態管理、
//! 指し手オーダリングを提供する。探索・置換表・時間管理・UCIループは
//! このクレートの外にあり、ここが公開する `Position` / `MoveOrder` /
//! `Histories` の契約を通じて駆動する。

pub mod bitboard;
pub mod eval;
pub mod movegen;
pub mod position;
pub mod search;
pub mod types;
pub mod uci;

pub use bitboard::Bitboard;
pub use movegen::{GenType, MoveList};
pub use position::{Board, FenError, Position, START_FEN};
pub use search::{Histories, MoveOrder};
pub use types::{CastleSide, Color, Move, MoveType, Piece, PieceType, Square};

/// 利きテーブルを事前構築する
///
/// プロセス起動時に一度呼ぶ。呼ばなくても初回アクセス時に構築される。
pub fn init() {
    bitboard::init();
}
