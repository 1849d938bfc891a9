//! 探索ライン上の局面スタック（Position）
//!
//! ルートからの `Board` の列を保持する。`make_move`/`unmake_move` が
//! 唯一の変更手段で、厳密なスタック規律に従う。千日手・50手ルールの
//! 検出もここで行う。

use crate::movegen::{self, GenType, MoveList};
use crate::types::{Color, Depth, Hash, Move, MAX_DEPTH};

use super::board::Board;
use super::fen::FenError;

/// スタックに積まれた1手の情報
#[derive(Debug, Clone, Copy)]
pub struct MoveInfo {
    pub mv: Move,
    pub extended: bool,
}

/// 局面スタック
///
/// 先頭の `Board` がルート。`set_init_ply` でプライ原点をずらすことで、
/// 対局で実際に指された手をルート以前の履歴として残したまま
/// 千日手検出に使える。
pub struct Position {
    boards: Vec<Board>,
    stack: Vec<MoveInfo>,
    ply: usize,
    extensions: i32,
    reduced: bool,
}

impl Position {
    /// 初期局面のPosition
    pub fn new() -> Position {
        Position {
            boards: {
                let mut v = Vec::with_capacity(MAX_DEPTH);
                v.push(Board::default());
                v
            },
            stack: Vec::with_capacity(MAX_DEPTH),
            ply: 0,
            extensions: 0,
            reduced: false,
        }
    }

    /// FEN文字列からPositionを生成
    pub fn from_fen(fen: &str) -> Result<Position, FenError> {
        let mut pos = Position::new();
        pos.boards[0] = Board::from_fen(fen)?;
        Ok(pos)
    }

    /// 現局面
    #[inline]
    pub fn board(&self) -> &Board {
        // 先頭はコンストラクタで必ず積まれている
        self.boards.last().expect("position stack is never empty")
    }

    /// 現局面のハッシュ
    #[inline]
    pub fn hash(&self) -> Hash {
        self.board().hash()
    }

    /// 手番
    #[inline]
    pub fn turn(&self) -> Color {
        self.board().turn()
    }

    /// 手番が王手されているか
    #[inline]
    pub fn in_check(&self) -> bool {
        self.board().in_check()
    }

    /// 探索ルートからのプライ
    #[inline]
    pub fn ply(&self) -> Depth {
        self.ply as Depth
    }

    /// 直前の手（ルートでは `Move::NONE`）
    #[inline]
    pub fn last_move(&self) -> Move {
        match self.stack.last() {
            Some(info) => info.mv,
            None => Move::NONE,
        }
    }

    /// 延長した手の数
    #[inline]
    pub fn num_extensions(&self) -> i32 {
        self.extensions
    }

    /// 探索が削減を適用したか
    #[inline]
    pub fn reduced(&self) -> bool {
        self.reduced
    }

    /// 削減フラグを設定（探索側が使う）
    pub fn set_reduced(&mut self, reduced: bool) {
        self.reduced = reduced;
    }

    /// プライ原点を現在位置に移す
    ///
    /// `position ... moves ...` の再生後に呼ぶと、指し手履歴を
    /// ルート以前の履歴として保持したまま探索を開始できる。
    pub fn set_init_ply(&mut self) {
        self.ply = 0;
        self.extensions = 0;
    }

    /// 疑似合法/合法手を生成
    pub fn generate_moves(&self, gen_type: GenType) -> MoveList {
        let mut list = MoveList::new();
        movegen::generate(self.board(), gen_type, &mut list);
        list
    }

    /// 指し手を適用してスタックに積む
    pub fn make_move(&mut self, mv: Move, extension: bool) {
        debug_assert!(self.boards.len() < MAX_DEPTH + 1);
        self.boards.push(self.board().make_move(mv));
        self.stack.push(MoveInfo { mv, extended: extension });
        self.ply += 1;
        if extension {
            self.extensions += 1;
        }
    }

    /// 直前の指し手を取り消す
    pub fn unmake_move(&mut self) {
        debug_assert!(!self.stack.is_empty());
        self.boards.pop();
        self.ply -= 1;
        if let Some(info) = self.stack.pop() {
            if info.extended {
                self.extensions -= 1;
            }
        }
    }

    /// パスを適用してスタックに積む
    ///
    /// 合法性検査は行わない。王手中に呼んではならない。
    pub fn make_null_move(&mut self) {
        self.boards.push(self.board().make_null_move());
        self.stack.push(MoveInfo { mv: Move::NONE, extended: false });
        self.ply += 1;
    }

    /// 直前のパスを取り消す
    pub fn unmake_null_move(&mut self) {
        debug_assert!(!self.stack.is_empty());
        self.boards.pop();
        self.stack.pop();
        self.ply -= 1;
    }

    /// 引き分けかどうか
    ///
    /// 50手ルール、または同一局面の繰り返しを検出する。
    /// `unique == true` なら1回の繰り返し（探索ライン内の千日手打ち切り）、
    /// `false` なら2回の繰り返し（対局履歴に対する三回同形）で真を返す。
    pub fn is_draw(&self, unique: bool) -> bool {
        let board = self.board();

        // 50手ルール
        if board.half_move_clock() >= 100 {
            return true;
        }

        // 繰り返しはクロックがリセットされて以降の同手番の局面のみ調べる
        let cur = self.boards.len() as i32 - 1;
        let n_moves = (cur + 1).min(board.half_move_clock() as i32 + 1);
        let min_pos = cur - n_moves + 1;
        let hash = board.hash();

        let mut pos1 = cur - 4;
        while pos1 >= min_pos {
            if self.boards[pos1 as usize].hash() == hash {
                if unique {
                    return true;
                }
                let mut pos2 = pos1 - 4;
                while pos2 >= min_pos {
                    if self.boards[pos2 as usize].hash() == hash {
                        return true;
                    }
                    pos2 -= 2;
                }
            }
            pos1 -= 2;
        }

        false
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}
