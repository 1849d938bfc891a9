//! perft（指し手生成の網羅性検査）
//!
//! 指定深さの末端局面数を数える。探索本体は外部コンポーネントだが、
//! perftは生成・着手・オーダリングの正しさを突き合わせる基準として
//! コアに持つ。3種の実装は同じ局面・深さで必ず同じ値を返す。

use std::collections::HashMap;

use crate::movegen::{GenType, MoveList};
use crate::position::Position;
use crate::types::{Depth, Hash, Move};

use super::history::Histories;
use super::movepick::MoveOrder;

fn pseudo_legal_moves(pos: &Position) -> MoveList {
    let mut list = MoveList::new();
    pos.board().generate_moves(&mut list, GenType::Captures);
    pos.board().generate_moves(&mut list, GenType::Quiets);
    list
}

/// 標準のperft
///
/// 疑似合法手を着手し、自玉が取られる手だけを除外して数える。
pub fn perft(pos: &mut Position, depth: Depth) -> u64 {
    if depth <= 0 {
        return 1;
    }

    let mut nodes = 0;
    let moves = pseudo_legal_moves(pos);
    for &mv in moves.iter() {
        pos.make_move(mv, false);
        if pos.board().last_move_legal() {
            nodes += if depth == 1 { 1 } else { perft(pos, depth - 1) };
        }
        pos.unmake_move();
    }
    nodes
}

/// 段階的オーダリングを通したperft
///
/// `MoveOrder` が全手を漏れも重複もなく返すことの検査用。
pub fn perft_ordered(pos: &mut Position, depth: Depth) -> u64 {
    let histories = Histories::new();
    perft_ordered_inner(pos, depth, &histories)
}

fn perft_ordered_inner(pos: &mut Position, depth: Depth, histories: &Histories) -> u64 {
    if depth <= 0 {
        return 1;
    }

    let mut nodes = 0;
    let mut order = MoveOrder::new(pos.ply(), depth, Move::NONE, pos.last_move(), false);
    loop {
        let mv = order.next_move(pos, histories);
        if mv.is_none() {
            break;
        }
        pos.make_move(mv, false);
        if pos.board().last_move_legal() {
            nodes += if depth == 1 {
                1
            } else {
                perft_ordered_inner(pos, depth - 1, histories)
            };
        }
        pos.unmake_move();
    }
    nodes
}

/// (ハッシュ, 深さ) でメモ化したperft
///
/// Zobristキーの衝突しにくさと増分更新の正しさの検査を兼ねる。
pub fn perft_hashed(pos: &mut Position, depth: Depth) -> u64 {
    let mut table: HashMap<(Hash, Depth), u64> = HashMap::new();
    perft_hashed_inner(pos, depth, &mut table)
}

fn perft_hashed_inner(
    pos: &mut Position,
    depth: Depth,
    table: &mut HashMap<(Hash, Depth), u64>,
) -> u64 {
    if depth <= 0 {
        return 1;
    }

    let key = (pos.hash(), depth);
    if let Some(&nodes) = table.get(&key) {
        return nodes;
    }

    let mut nodes = 0;
    let moves = pseudo_legal_moves(pos);
    for &mv in moves.iter() {
        pos.make_move(mv, false);
        if pos.board().last_move_legal() {
            nodes += if depth == 1 {
                1
            } else {
                perft_hashed_inner(pos, depth - 1, table)
            };
        }
        pos.unmake_move();
    }

    table.insert(key, nodes);
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perft_startpos_shallow() {
        let mut pos = Position::new();
        assert_eq!(perft(&mut pos, 1), 20);
        assert_eq!(perft(&mut pos, 2), 400);
        assert_eq!(perft(&mut pos, 3), 8_902);
    }

    #[test]
    fn test_perft_depth_zero() {
        let mut pos = Position::new();
        assert_eq!(perft(&mut pos, 0), 1);
    }

    #[test]
    fn test_perft_leaves_position_unchanged() {
        let mut pos = Position::new();
        let before = *pos.board();
        perft(&mut pos, 3);
        assert_eq!(*pos.board(), before);
        assert_eq!(pos.ply(), 0);
    }

    #[test]
    fn test_perft_variants_agree_shallow() {
        let mut pos = Position::new();
        let plain = perft(&mut pos, 3);
        assert_eq!(perft_ordered(&mut pos, 3), plain);
        assert_eq!(perft_hashed(&mut pos, 3), plain);
    }
}
