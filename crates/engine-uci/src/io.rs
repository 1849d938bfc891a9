//! UCIプロトコルの出力ヘルパ

use std::io::{self, Write};

/// UCIプロトコルに沿って標準出力へ行を出力する
///
/// GUIにサブプロセスとして起動された場合に備えて毎回フラッシュする。
pub fn uci_println(s: &str) {
    println!("{s}");
    let _ = io::stdout().flush();
}
