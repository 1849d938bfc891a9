//! 探索を支える部品
//!
//! 探索本体（alpha-beta・静止探索・置換表・時間管理）は外部
//! コンポーネント。ここにはそれが消費する履歴テーブルと
//! 指し手オーダリング、検証用のperftを置く。

pub mod history;
pub mod movepick;
pub mod perft;

pub use history::{Histories, NUM_KILLERS};
pub use movepick::{MoveOrder, MoveStage};
pub use perft::{perft, perft_hashed, perft_ordered};
