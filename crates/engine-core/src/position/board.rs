//! 局面（Board）
//!
//! 駒のBitboardとメールボックスを持つ値型。`make_move` は新しいBoardを
//! 返し、ハッシュ・駒割り/PST・フェーズ・王手駒を増分更新する。
//! 増分値が常に一から再計算した値と一致することを `is_valid` が検証する。

use crate::bitboard::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, piece_attacks, rook_attacks,
    Bitboard,
};
use crate::eval::{piece_square, piece_value, PHASE_TOTAL, PHASE_WEIGHT};
use crate::types::{
    CastleSide, Color, Hash, MixedScore, Move, MoveType, Piece, PieceType, Rank, Square, Value,
};

use super::zobrist;

/// SEE用の駒価値
const SEE_PIECE_SCORE: [Value; PieceType::NUM] = [10, 30, 30, 50, 90, 1000];

/// 盤内に収まることが保証されたオフセット移動
#[inline]
fn shift_sq(sq: Square, d: i8) -> Square {
    // SAFETY: 呼び出し側が盤内に収まることを保証する
    unsafe { Square::from_u8_unchecked((sq.raw() as i8 + d) as u8) }
}

/// 手番から見た升（白はそのまま、黒は段を反転）
#[inline]
const fn relative_square(sq: Square, color: Color) -> Square {
    match color {
        Color::White => sq,
        Color::Black => sq.flip_rank(),
    }
}

/// 局面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pieces: [[Bitboard; Color::NUM]; PieceType::NUM],
    mailbox: [Piece; Square::NUM],
    turn: Color,
    castling_rights: [[bool; Color::NUM]; CastleSide::NUM],
    ep_square: Option<Square>,
    half_move_clock: u16,
    full_move_clock: u16,
    hash: Hash,
    psq: MixedScore,
    phase: i16,
    checkers: Bitboard,
}

impl Board {
    /// 空の盤面（FENパーサ用）
    pub(super) fn empty() -> Board {
        Board {
            pieces: [[Bitboard::EMPTY; Color::NUM]; PieceType::NUM],
            mailbox: [Piece::NONE; Square::NUM],
            turn: Color::White,
            castling_rights: [[false; Color::NUM]; CastleSide::NUM],
            ep_square: None,
            half_move_clock: 0,
            full_move_clock: 1,
            hash: 0,
            psq: MixedScore::ZERO,
            phase: PHASE_TOTAL as i16,
            checkers: Bitboard::EMPTY,
        }
    }

    // =========================================================================
    // 駒操作プリミティブ
    //
    // すべてハッシュ・PST・フェーズを同時に更新する。
    // =========================================================================

    pub(super) fn set_piece(&mut self, pt: PieceType, color: Color, sq: Square) {
        debug_assert!(self.mailbox[sq.index()].is_none());
        self.pieces[pt.index()][color.index()].set(sq);
        self.mailbox[sq.index()] = Piece::new(color, pt);
        self.hash ^= zobrist::piece_key(pt, color, sq);
        self.psq += (piece_value(pt) + piece_square(pt, sq, color)) * color.sign();
        self.phase -= PHASE_WEIGHT[pt.index()] as i16;
    }

    fn pop_piece(&mut self, pt: PieceType, color: Color, sq: Square) {
        debug_assert!(self.pieces[pt.index()][color.index()].contains(sq));
        self.pieces[pt.index()][color.index()].clear(sq);
        self.mailbox[sq.index()] = Piece::NONE;
        self.hash ^= zobrist::piece_key(pt, color, sq);
        self.psq -= (piece_value(pt) + piece_square(pt, sq, color)) * color.sign();
        self.phase += PHASE_WEIGHT[pt.index()] as i16;
    }

    fn move_piece(&mut self, pt: PieceType, color: Color, from: Square, to: Square) {
        debug_assert!(self.pieces[pt.index()][color.index()].contains(from));
        debug_assert!(self.mailbox[to.index()].is_none());
        self.pieces[pt.index()][color.index()].toggle(from);
        self.pieces[pt.index()][color.index()].toggle(to);
        self.mailbox[from.index()] = Piece::NONE;
        self.mailbox[to.index()] = Piece::new(color, pt);
        self.hash ^= zobrist::piece_key(pt, color, from) ^ zobrist::piece_key(pt, color, to);
        self.psq += (piece_square(pt, to, color) - piece_square(pt, from, color)) * color.sign();
    }

    pub(super) fn set_castling(&mut self, side: CastleSide, color: Color, value: bool) {
        if self.castling_rights[side.index()][color.index()] != value {
            self.castling_rights[side.index()][color.index()] = value;
            self.hash ^= zobrist::castle_key(side, color);
        }
    }

    pub(super) fn set_turn(&mut self, turn: Color) {
        self.turn = turn;
    }

    pub(super) fn set_ep_square(&mut self, sq: Option<Square>) {
        self.ep_square = sq;
    }

    pub(super) fn set_clocks(&mut self, half: u16, full: u16) {
        self.half_move_clock = half;
        self.full_move_clock = full.max(1);
    }

    pub(super) fn xor_hash(&mut self, key: Hash) {
        self.hash ^= key;
    }

    // =========================================================================
    // アクセサ
    // =========================================================================

    /// 手番
    #[inline]
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// 局面ハッシュ
    #[inline]
    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// 指定の駒のBitboard
    #[inline]
    pub fn pieces(&self, color: Color, pt: PieceType) -> Bitboard {
        self.pieces[pt.index()][color.index()]
    }

    /// 指定の手番の全駒
    #[inline]
    pub fn pieces_of(&self, color: Color) -> Bitboard {
        let p = &self.pieces;
        let c = color.index();
        p[0][c] | p[1][c] | p[2][c] | p[3][c] | p[4][c] | p[5][c]
    }

    /// 全占有
    #[inline]
    pub fn occupancy(&self) -> Bitboard {
        self.pieces_of(Color::White) | self.pieces_of(Color::Black)
    }

    /// 升上の駒
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Piece {
        self.mailbox[sq.index()]
    }

    /// 升上の駒種
    #[inline]
    pub fn piece_type_at(&self, sq: Square) -> Option<PieceType> {
        let pc = self.mailbox[sq.index()];
        if pc.is_none() {
            None
        } else {
            Some(pc.piece_type())
        }
    }

    /// キングの位置
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        let bb = self.pieces(color, PieceType::King);
        debug_assert!(bb.is_not_empty(), "king_square on board without king");
        bb.lsb().unwrap_or(Square::A1)
    }

    /// 手番のキングに王手をかけている駒
    #[inline]
    pub fn checkers(&self) -> Bitboard {
        self.checkers
    }

    /// 手番が王手されているか
    #[inline]
    pub fn in_check(&self) -> bool {
        self.checkers.is_not_empty()
    }

    /// アンパッサン升
    #[inline]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// 50手ルール用のカウンタ
    #[inline]
    pub fn half_move_clock(&self) -> u16 {
        self.half_move_clock
    }

    /// 手数（黒の着手後に増える）
    #[inline]
    pub fn full_move_clock(&self) -> u16 {
        self.full_move_clock
    }

    /// キャスリング権
    #[inline]
    pub fn castling_right(&self, side: CastleSide, color: Color) -> bool {
        self.castling_rights[side.index()][color.index()]
    }

    /// 増分管理している駒割り+PST（白が正）
    #[inline]
    pub fn material_eval(&self) -> MixedScore {
        self.psq
    }

    /// ゲームフェーズ（0=純中盤、PHASE_TOTAL=純終盤）
    #[inline]
    pub fn phase(&self) -> u8 {
        self.phase.clamp(0, PHASE_TOTAL as i16) as u8
    }

    /// ポーンとキング以外の駒
    pub fn non_pawn_material(&self, color: Color) -> Bitboard {
        self.pieces(color, PieceType::Knight)
            | self.pieces(color, PieceType::Bishop)
            | self.pieces(color, PieceType::Rook)
            | self.pieces(color, PieceType::Queen)
    }

    // =========================================================================
    // 利きと王手
    // =========================================================================

    /// 指定升に利いている `by` の駒の集合
    pub fn attackers(&self, sq: Square, occupied: Bitboard, by: Color) -> Bitboard {
        let diag = self.pieces(by, PieceType::Bishop) | self.pieces(by, PieceType::Queen);
        let orth = self.pieces(by, PieceType::Rook) | self.pieces(by, PieceType::Queen);
        (pawn_attacks(!by, sq) & self.pieces(by, PieceType::Pawn))
            | (knight_attacks(sq) & self.pieces(by, PieceType::Knight))
            | (king_attacks(sq) & self.pieces(by, PieceType::King))
            | (bishop_attacks(sq, occupied) & diag)
            | (rook_attacks(sq, occupied) & orth)
    }

    /// 王手駒のキャッシュを再計算
    pub(super) fn update_checkers(&mut self) {
        let king = self.king_square(self.turn);
        self.checkers = self.attackers(king, self.occupancy(), !self.turn);
    }

    /// 直前に指した側のキングが取られない状態か
    ///
    /// 疑似合法手を `make_move` した後の合法性検査に使う。
    #[inline]
    pub fn last_move_legal(&self) -> bool {
        let king = self.king_square(!self.turn);
        self.attackers(king, self.occupancy(), self.turn).is_empty()
    }

    // =========================================================================
    // 着手
    // =========================================================================

    /// 指し手を適用した新しい局面を返す
    ///
    /// `mv` は疑似合法であること。自玉が取られる状態になるかどうかは
    /// 検査しないので、呼び出し側が `last_move_legal` で確認する。
    pub fn make_move(&self, mv: Move) -> Board {
        let mut result = *self;
        let up = self.turn.forward();
        debug_assert!(self.mailbox[mv.from().index()].is_some());
        let piece = self.mailbox[mv.from().index()].piece_type();

        // クロック更新
        if self.turn == Color::Black {
            result.full_move_clock += 1;
        }
        if piece == PieceType::Pawn || mv.is_capture() {
            result.half_move_clock = 0;
        } else {
            result.half_move_clock += 1;
        }

        result.ep_square = None;

        // この手によるキャスリング権の消失
        if piece == PieceType::King {
            result.set_castling(CastleSide::Kingside, self.turn, false);
            result.set_castling(CastleSide::Queenside, self.turn, false);
        } else if piece == PieceType::Rook {
            if mv.from() == relative_square(Square::H1, self.turn) {
                result.set_castling(CastleSide::Kingside, self.turn, false);
            }
            if mv.from() == relative_square(Square::A1, self.turn) {
                result.set_castling(CastleSide::Queenside, self.turn, false);
            }
        }

        if mv.is_capture() {
            // アンパッサンは捕獲升が目的地と異なる
            let target = if mv.is_ep_capture() {
                shift_sq(mv.to(), -up)
            } else {
                mv.to()
            };
            let victim = result.mailbox[target.index()].piece_type();
            result.pop_piece(victim, !self.turn, target);

            // 敵ルークの初期位置への捕獲は相手のキャスリング権を消す
            if mv.to() == relative_square(Square::H8, self.turn) {
                result.set_castling(CastleSide::Kingside, !self.turn, false);
            }
            if mv.to() == relative_square(Square::A8, self.turn) {
                result.set_castling(CastleSide::Queenside, !self.turn, false);
            }
        } else if mv.is_double_pawn_push() {
            result.ep_square = Some(shift_sq(mv.to(), -up));
            result.hash ^= zobrist::ep_file_key(mv.to().file());
        } else if mv.is_castle() {
            // ルークを定位置間で移動（H1↔F1 / A1↔D1、黒は鏡像）
            let (rook_from, rook_to) = if mv.to() > mv.from() {
                (shift_sq(mv.to(), 1), shift_sq(mv.to(), -1))
            } else {
                (shift_sq(mv.to(), -2), shift_sq(mv.to(), 1))
            };
            result.move_piece(PieceType::Rook, self.turn, rook_from, rook_to);
        }

        if mv.is_promotion() {
            result.pop_piece(piece, self.turn, mv.from());
            result.set_piece(mv.promo_piece(), self.turn, mv.to());
        } else {
            result.move_piece(piece, self.turn, mv.from(), mv.to());
        }

        // 手番交代
        result.turn = !self.turn;
        result.hash ^= zobrist::black_move_key();

        // 前局面のアンパッサン項を消す
        if let Some(ep) = self.ep_square {
            result.hash ^= zobrist::ep_file_key(ep.file());
        }

        result.update_checkers();
        result
    }

    /// パスした新しい局面を返す
    ///
    /// 手番が王手されている場合は不正（呼び出し側の責任）。
    pub fn make_null_move(&self) -> Board {
        debug_assert!(!self.in_check());
        let mut result = *self;

        result.ep_square = None;
        if let Some(ep) = self.ep_square {
            result.hash ^= zobrist::ep_file_key(ep.file());
        }

        result.turn = !self.turn;
        result.hash ^= zobrist::black_move_key();
        result.update_checkers();
        result
    }

    // =========================================================================
    // 合法性
    // =========================================================================

    /// 任意の指し手が現局面で完全に合法かどうか
    ///
    /// 置換表・killer・countermoveの手は生成を経ないため、
    /// ここで幾何・フラグ整合・自玉の安全まで全て検査する。
    pub fn legal(&self, mv: Move) -> bool {
        // 同一升への移動は常に不正（Move::NONEもここで弾かれる）
        if mv.from() == mv.to() {
            return false;
        }

        // 予約された無効タイプ
        if matches!(mv.move_type(), MoveType::Invalid1 | MoveType::Invalid2) {
            return false;
        }

        // アンパッサンはep升と一致する場合のみ
        if mv.is_ep_capture() && self.ep_square != Some(mv.to()) {
            return false;
        }

        // 移動元は自駒、移動先は自駒以外
        let our = self.pieces_of(self.turn);
        if !our.contains(mv.from()) || our.contains(mv.to()) {
            return false;
        }

        let piece = self.mailbox[mv.from().index()].piece_type();

        // 捕獲フラグと移動先の占有の整合（epは仮想的に敵駒扱い）
        let mut enemy = self.occupancy() & !our;
        if mv.is_ep_capture() && piece == PieceType::Pawn {
            if let Some(ep) = self.ep_square {
                enemy.set(ep);
            }
        }
        if enemy.contains(mv.to()) != mv.is_capture() {
            return false;
        }

        // ポーン専用フラグ
        if piece != PieceType::Pawn
            && (mv.is_double_pawn_push() || mv.is_ep_capture() || mv.is_promotion())
        {
            return false;
        }

        // キング専用フラグ
        if piece != PieceType::King && mv.is_castle() {
            return false;
        }

        // 駒種ごとの幾何
        let occ = self.occupancy();
        let geometry_ok = match piece {
            PieceType::Pawn => self.legal_pawn(mv, occ),
            PieceType::King => self.legal_king(mv, occ),
            pt => piece_attacks(pt, mv.from(), occ).contains(mv.to()),
        };
        if !geometry_ok {
            return false;
        }

        // ピンや両取り王手を含め、指した後に自玉が取られないこと
        self.make_move(mv).last_move_legal()
    }

    fn legal_pawn(&self, mv: Move, occ: Bitboard) -> bool {
        let up = self.turn.forward();
        let from = mv.from();
        let to = mv.to();

        // 最終段への到達と成りフラグは一致する
        if mv.is_promotion() != (to.rank() == Rank::Rank8.relative(self.turn)) {
            return false;
        }

        if mv.is_capture() {
            pawn_attacks(self.turn, from).contains(to)
        } else if mv.is_double_pawn_push() {
            from.rank() == Rank::Rank2.relative(self.turn)
                && to.raw() as i16 == from.raw() as i16 + 2 * up as i16
                && !occ.contains(shift_sq(from, up))
        } else {
            to.raw() as i16 == from.raw() as i16 + up as i16
        }
    }

    fn legal_king(&self, mv: Move, occ: Bitboard) -> bool {
        if !mv.is_castle() {
            return king_attacks(mv.from()).contains(mv.to());
        }

        if mv.from() != relative_square(Square::E1, self.turn) {
            return false;
        }

        let side = if mv.move_type() == MoveType::KingCastle {
            CastleSide::Kingside
        } else {
            CastleSide::Queenside
        };
        if !self.castling_right(side, self.turn) {
            return false;
        }

        let (to, empties, path): (Square, &[Square], &[Square]) = match side {
            CastleSide::Kingside => (
                Square::G1,
                &[Square::F1, Square::G1],
                &[Square::E1, Square::F1, Square::G1],
            ),
            CastleSide::Queenside => (
                Square::C1,
                &[Square::B1, Square::C1, Square::D1],
                &[Square::E1, Square::D1, Square::C1],
            ),
        };

        if mv.to() != relative_square(to, self.turn) {
            return false;
        }
        for &sq in empties {
            if occ.contains(relative_square(sq, self.turn)) {
                return false;
            }
        }
        // キングの通過升はすべて敵の利きがないこと
        for &sq in path {
            if self
                .attackers(relative_square(sq, self.turn), occ, !self.turn)
                .is_not_empty()
            {
                return false;
            }
        }
        true
    }

    // =========================================================================
    // 静的交換評価（SEE）
    // =========================================================================

    fn least_valuable(&self, bb: Bitboard) -> Option<Square> {
        for pt in PieceType::ALL {
            let pieces =
                (self.pieces[pt.index()][0] | self.pieces[pt.index()][1]) & bb;
            if let Some(sq) = pieces.lsb() {
                return Some(sq);
            }
        }
        None
    }

    /// 静的交換評価
    ///
    /// 対象升での取り合いを最弱の駒から順に進め、符号付きスコアの
    /// 10倍を返す。取り返す側が既に得をしていれば打ち切る。
    pub fn see(&self, mv: Move, threshold: Value) -> Value {
        let target = mv.to();

        // 最初の捕獲
        let mut last_attacker = self.mailbox[mv.from().index()].piece_type();
        let victim_score = if mv.is_ep_capture() {
            SEE_PIECE_SCORE[PieceType::Pawn.index()]
        } else {
            match self.piece_type_at(target) {
                Some(pt) => SEE_PIECE_SCORE[pt.index()],
                None => 0,
            }
        };
        let mut gain = victim_score - threshold / 10;
        let mut occupancy = self.occupancy() ^ Bitboard::from_square(mv.from());
        let mut side_to_move = !self.turn;
        let mut color: Value = -1;

        let mut attackers = self.attackers(target, occupancy, side_to_move) & occupancy;
        while attackers.is_not_empty() {
            // 取り合いを続けなくても得なら相手は打ち切る
            if color * gain > 0 {
                return 10 * gain;
            }

            let attacker = match self.least_valuable(attackers) {
                Some(sq) => sq,
                None => break,
            };

            gain += color * SEE_PIECE_SCORE[last_attacker.index()];
            last_attacker = self.mailbox[attacker.index()].piece_type();
            occupancy ^= Bitboard::from_square(attacker);
            side_to_move = !side_to_move;
            color = -color;

            attackers = self.attackers(target, occupancy, side_to_move) & occupancy;
        }

        10 * gain
    }

    // =========================================================================
    // 整合性検査
    // =========================================================================

    /// 一から再計算した局面ハッシュ
    pub fn generate_hash(&self) -> Hash {
        let mut hash: Hash = 0;

        for pt in PieceType::ALL {
            for color in [Color::White, Color::Black] {
                for sq in self.pieces(color, pt).iter() {
                    hash ^= zobrist::piece_key(pt, color, sq);
                }
            }
        }

        if self.turn == Color::Black {
            hash ^= zobrist::black_move_key();
        }

        if let Some(ep) = self.ep_square {
            hash ^= zobrist::ep_file_key(ep.file());
        }

        for side in CastleSide::ALL {
            for color in [Color::White, Color::Black] {
                if self.castling_right(side, color) {
                    hash ^= zobrist::castle_key(side, color);
                }
            }
        }

        hash
    }

    /// 全不変条件を独立に再検査する（テスト用）
    pub fn is_valid(&self) -> bool {
        // 手番でない側が王手されていないか
        if !self.last_move_legal() {
            return false;
        }

        // Bitboard同士の排他性
        let mut occupancy = Bitboard::EMPTY;
        for pt in PieceType::ALL {
            for color in [Color::White, Color::Black] {
                let bb = self.pieces(color, pt);
                if (bb & occupancy).is_not_empty() {
                    return false;
                }
                occupancy |= bb;
            }
        }

        // メールボックスとの一致
        for sq in Square::all() {
            let pc = self.mailbox[sq.index()];
            if pc.is_none() {
                if occupancy.contains(sq) {
                    return false;
                }
            } else if !self.pieces(pc.color(), pc.piece_type()).contains(sq) {
                return false;
            }
        }

        // 両キングの存在
        if self.pieces(Color::White, PieceType::King).count() != 1
            || self.pieces(Color::Black, PieceType::King).count() != 1
        {
            return false;
        }

        // ハッシュ
        if self.hash != self.generate_hash() {
            return false;
        }

        // 駒割り+PSTとフェーズ
        let mut phase = PHASE_TOTAL as i16;
        let mut eval = MixedScore::ZERO;
        for pt in PieceType::ALL {
            for color in [Color::White, Color::Black] {
                let bb = self.pieces(color, pt);
                phase -= bb.count() as i16 * PHASE_WEIGHT[pt.index()] as i16;
                for sq in bb.iter() {
                    eval += (piece_value(pt) + piece_square(pt, sq, color)) * color.sign();
                }
            }
        }
        if phase != self.phase || eval != self.psq {
            return false;
        }

        // 王手駒のキャッシュ
        let king = self.king_square(self.turn);
        if self.checkers != self.attackers(king, self.occupancy(), !self.turn) {
            return false;
        }

        // アンパッサン升は直前の2マス前進と整合する
        if let Some(ep) = self.ep_square {
            if ep.rank() != Rank::Rank3.relative(!self.turn) {
                return false;
            }
            let pawn_sq = shift_sq(ep, (!self.turn).forward());
            if !self.pieces(!self.turn, PieceType::Pawn).contains(pawn_sq) {
                return false;
            }
        }

        true
    }
}
