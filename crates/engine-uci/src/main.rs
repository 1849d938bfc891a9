//! UCIプロトコルエンジン
//!
//! チェスGUIとの通信を行うUCIプロトコル実装。局面管理・指し手解決・
//! perftをengine-coreに委譲する。探索・置換表・時間管理は外部
//! コンポーネントで、`go` は現状オーダリング先頭の合法手を返す。

use std::io::BufRead;
use std::time::Instant;

use anyhow::Result;
use engine_core::position::Position;
use engine_core::search::{perft, Histories, MoveOrder};
use engine_core::types::{Depth, Move};
use engine_core::uci::move_from_uci;
use log::{info, warn};

mod io;

use crate::io::uci_println;

/// エンジン名
const ENGINE_NAME: &str = "hive";
/// エンジン作者
const ENGINE_AUTHOR: &str = "the hive developers";

/// UCIエンジンの状態
struct UciEngine {
    /// 現在の局面（対局で指された手を履歴として含む）
    position: Position,
    /// 手の順序付け履歴
    histories: Histories,
    /// 置換表サイズ（MB、外部の置換表に渡す値）
    hash_mb: i64,
    /// 探索スレッド数
    threads: i64,
    /// MultiPV値
    multi_pv: i64,
    /// Ponderオプション
    ponder: bool,
}

impl UciEngine {
    fn new() -> Self {
        Self {
            position: Position::new(),
            histories: Histories::new(),
            hash_mb: 16,
            threads: 1,
            multi_pv: 1,
            ponder: false,
        }
    }

    /// UCIコマンドを処理。falseを返したら終了
    fn process_command(&mut self, line: &str) -> bool {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            return true;
        }

        match tokens[0] {
            "uci" => self.cmd_uci(),
            "isready" => uci_println("readyok"),
            "setoption" => self.cmd_setoption(&tokens),
            "ucinewgame" => self.cmd_ucinewgame(),
            "position" => self.cmd_position(&tokens),
            "go" => self.cmd_go(&tokens),
            // 探索は同期実行なので停止要求に対してすることはない
            "stop" => {}
            "quit" => return false,
            // デバッグ用コマンド
            "d" | "board" => uci_println(&format!("{}", self.position.board())),
            _ => {
                // 未知のコマンドは無視
            }
        }

        true
    }

    fn cmd_uci(&self) {
        uci_println(&format!("id name {ENGINE_NAME}"));
        uci_println(&format!("id author {ENGINE_AUTHOR}"));
        uci_println("");
        uci_println("option name Hash type spin default 16 min 1 max 65536");
        uci_println("option name Threads type spin default 1 min 1 max 512");
        uci_println("option name MultiPV type spin default 1 min 1 max 255");
        uci_println("option name Ponder type check default false");
        uci_println("option name Clear Hash type button");
        uci_println("uciok");
    }

    fn cmd_setoption(&mut self, tokens: &[&str]) {
        // setoption name <name...> [value <value...>]
        let mut name = Vec::new();
        let mut value = Vec::new();
        let mut target: Option<&mut Vec<&str>> = None;
        for &tok in &tokens[1..] {
            match tok {
                "name" => target = Some(&mut name),
                "value" => target = Some(&mut value),
                _ => {
                    if let Some(t) = target.as_mut() {
                        t.push(tok);
                    }
                }
            }
        }
        let name = name.join(" ");
        let value = value.join(" ");

        match name.as_str() {
            "Hash" => {
                if let Ok(v) = value.parse::<i64>() {
                    self.hash_mb = v.clamp(1, 65536);
                    info!("Hash = {} MB", self.hash_mb);
                }
            }
            "Threads" => {
                if let Ok(v) = value.parse::<i64>() {
                    self.threads = v.clamp(1, 512);
                    info!("Threads = {}", self.threads);
                }
            }
            "MultiPV" => {
                if let Ok(v) = value.parse::<i64>() {
                    self.multi_pv = v.clamp(1, 255);
                }
            }
            "Ponder" => self.ponder = value == "true",
            "Clear Hash" => {
                self.histories.clear();
                info!("histories cleared");
            }
            _ => warn!("unknown option: {name}"),
        }
    }

    fn cmd_ucinewgame(&mut self) {
        self.position = Position::new();
        self.histories.clear();
    }

    fn cmd_position(&mut self, tokens: &[&str]) {
        let moves_idx = tokens.iter().position(|&t| t == "moves");
        let setup = &tokens[1..moves_idx.unwrap_or(tokens.len())];

        match setup.first() {
            Some(&"startpos") => self.position = Position::new(),
            Some(&"fen") => {
                let fen = setup[1..].join(" ");
                match Position::from_fen(&fen) {
                    Ok(pos) => self.position = pos,
                    Err(e) => {
                        warn!("ignoring position command: {e}");
                        return;
                    }
                }
            }
            _ => return,
        }

        // 指し手を再生し、履歴をルート以前に残す
        if let Some(idx) = moves_idx {
            for &tok in &tokens[idx + 1..] {
                match move_from_uci(self.position.board(), tok) {
                    Some(mv) => {
                        self.position.make_move(mv, false);
                        self.position.set_init_ply();
                    }
                    None => {
                        warn!("illegal move in position command: {tok}");
                        break;
                    }
                }
            }
        }
    }

    fn cmd_go(&mut self, tokens: &[&str]) {
        let mut perft_depth: Depth = 0;
        let mut iter = tokens[1..].iter();
        while let Some(&tok) = iter.next() {
            match tok {
                "perft" => {
                    perft_depth = iter
                        .next()
                        .and_then(|d| d.parse().ok())
                        .unwrap_or(0);
                }
                // 探索制限は受理だけする
                "depth" | "nodes" | "movetime" | "mate" | "wtime" | "btime" | "winc" | "binc"
                | "movestogo" => {
                    let _ = iter.next();
                }
                "searchmoves" | "infinite" | "ponder" => {}
                _ => {}
            }
        }

        if perft_depth > 0 {
            let start = Instant::now();
            let nodes = perft(&mut self.position, perft_depth);
            let elapsed = start.elapsed();
            info!(
                "perft {} in {:.3}s ({:.0} nps)",
                perft_depth,
                elapsed.as_secs_f64(),
                nodes as f64 / elapsed.as_secs_f64().max(1e-9)
            );
            uci_println("");
            uci_println(&format!("Nodes searched: {nodes}"));
            return;
        }

        match self.pick_first_move() {
            Some(mv) => uci_println(&format!("bestmove {}", mv.to_uci())),
            None => uci_println("bestmove 0000"),
        }
    }

    /// オーダリング先頭の合法手
    fn pick_first_move(&mut self) -> Option<Move> {
        let mut order = MoveOrder::new(0, 1, Move::NONE, self.position.last_move(), false);
        loop {
            let mv = order.next_move(&self.position, &self.histories);
            if mv.is_none() {
                return None;
            }
            self.position.make_move(mv, false);
            let legal = self.position.board().last_move_legal();
            self.position.unmake_move();
            if legal {
                return Some(mv);
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    engine_core::init();

    let mut engine = UciEngine::new();
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if !engine.process_command(&line) {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::types::Color;

    #[test]
    fn test_position_startpos_moves() {
        let mut engine = UciEngine::new();
        engine.cmd_position(&["position", "startpos", "moves", "e2e4", "e7e5"]);

        assert_eq!(engine.position.turn(), Color::White);
        assert_eq!(engine.position.ply(), 0);
        assert!(engine.position.board().to_fen().starts_with(
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w"
        ));
    }

    #[test]
    fn test_position_fen() {
        let mut engine = UciEngine::new();
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let mut tokens = vec!["position", "fen"];
        tokens.extend(fen.split(' '));
        engine.cmd_position(&tokens);

        assert_eq!(engine.position.board().to_fen(), fen);
    }

    #[test]
    fn test_position_illegal_move_stops_replay() {
        let mut engine = UciEngine::new();
        engine.cmd_position(&["position", "startpos", "moves", "e2e4", "e2e4"]);
        // 2つ目は不正なので1手だけ進んでいる
        assert_eq!(engine.position.turn(), Color::Black);
    }

    #[test]
    fn test_setoption() {
        let mut engine = UciEngine::new();
        engine.cmd_setoption(&["setoption", "name", "Hash", "value", "128"]);
        assert_eq!(engine.hash_mb, 128);

        engine.cmd_setoption(&["setoption", "name", "Hash", "value", "0"]);
        assert_eq!(engine.hash_mb, 1);

        engine.cmd_setoption(&["setoption", "name", "Ponder", "value", "true"]);
        assert!(engine.ponder);

        engine.cmd_setoption(&["setoption", "name", "Clear", "Hash"]);
        // ボタンは値なしで受理される
    }

    #[test]
    fn test_pick_first_move_is_legal() {
        let mut engine = UciEngine::new();
        let mv = engine.pick_first_move().unwrap();
        assert!(engine.position.board().legal(mv));

        // ステイルメイト局面では合法手がなくNone
        engine.cmd_position(&[
            "position", "fen", "7k/5Q2/6K1/8/8/8/8/8", "b", "-", "-", "0", "1",
        ]);
        assert_eq!(engine.pick_first_move(), None);
    }
}
