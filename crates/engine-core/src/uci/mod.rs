//! UCIプロトコルの表記ユーティリティ
//!
//! プロトコルのコマンドループはengine-uciクレートが持つ。

mod notation;

pub use notation::move_from_uci;
