//! 評価用の静的データ
//!
//! 探索本体は外部コンポーネント。ここには盤面が増分管理する
//! 駒割り・PST・フェーズの定義のみを置く。

mod psqt;

pub use psqt::{piece_square, piece_value, PHASE_TOTAL, PHASE_WEIGHT};
