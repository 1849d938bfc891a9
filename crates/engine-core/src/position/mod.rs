//! 局面表現
//!
//! - `Board`: 1局面の値型（増分ハッシュ・PST・フェーズ付き）
//! - `Position`: 探索ライン上のBoardスタックと引き分け検出
//! - `zobrist`: 局面ハッシュ用の乱数テーブル

mod board;
mod fen;
mod pos;
pub mod zobrist;

pub use board::Board;
pub use fen::{FenError, START_FEN};
pub use pos::{MoveInfo, Position};
