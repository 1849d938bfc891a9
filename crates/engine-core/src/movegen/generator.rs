//! 指し手生成
//!
//! `Captures` / `Quiets` は疑似合法手（自玉の安全は未検査）を生成し、
//! 両者で疑似合法手全体を分割する。`Legal` は生成後に自玉の安全を
//! 検査して完全な合法手のみを返す。

use crate::bitboard::{pawn_attacks, piece_attacks};
use crate::position::Board;
use crate::types::{CastleSide, Color, Move, MoveType, PieceType, Rank, Square};

use super::movelist::MoveList;
use super::types::GenType;

/// 手番から見た升（白はそのまま、黒は段を反転）
#[inline]
const fn relative_square(sq: Square, color: Color) -> Square {
    match color {
        Color::White => sq,
        Color::Black => sq.flip_rank(),
    }
}

/// 指し手を生成してリストに追加
pub fn generate(board: &Board, gen_type: GenType, list: &mut MoveList) {
    match gen_type {
        GenType::Captures => generate_pseudo_legal(board, true, list),
        GenType::Quiets => generate_pseudo_legal(board, false, list),
        GenType::Legal => {
            let mut pseudo = MoveList::new();
            generate_pseudo_legal(board, true, &mut pseudo);
            generate_pseudo_legal(board, false, &mut pseudo);
            for &mv in pseudo.iter() {
                if board.make_move(mv).last_move_legal() {
                    list.push(mv);
                }
            }
        }
    }
}

impl Board {
    /// 指し手を生成してリストに追加
    pub fn generate_moves(&self, list: &mut MoveList, gen_type: GenType) {
        generate(self, gen_type, list);
    }
}

fn generate_pseudo_legal(board: &Board, captures: bool, list: &mut MoveList) {
    let us = board.turn();
    let occ = board.occupancy();
    let our = board.pieces_of(us);
    let enemy = occ & !our;
    let targets = if captures { enemy } else { !occ };
    let move_type = if captures { MoveType::Capture } else { MoveType::Quiet };

    generate_pawn_moves(board, captures, list);

    for pt in [
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ] {
        for from in board.pieces(us, pt).iter() {
            for to in (piece_attacks(pt, from, occ) & targets).iter() {
                list.push(Move::new(from, to, move_type));
            }
        }
    }

    if !captures {
        generate_castles(board, list);
    }
}

fn push_promotions(list: &mut MoveList, from: Square, to: Square, capture: bool) {
    let types = if capture {
        [
            MoveType::QueenPromoCapture,
            MoveType::KnightPromoCapture,
            MoveType::RookPromoCapture,
            MoveType::BishopPromoCapture,
        ]
    } else {
        [
            MoveType::QueenPromo,
            MoveType::KnightPromo,
            MoveType::RookPromo,
            MoveType::BishopPromo,
        ]
    };
    for mt in types {
        list.push(Move::new(from, to, mt));
    }
}

fn generate_pawn_moves(board: &Board, captures: bool, list: &mut MoveList) {
    let us = board.turn();
    let up = us.forward();
    let occ = board.occupancy();
    let enemy = occ & !board.pieces_of(us);
    let promo_rank = Rank::Rank8.relative(us);
    let start_rank = Rank::Rank2.relative(us);

    for from in board.pieces(us, PieceType::Pawn).iter() {
        if captures {
            for to in (pawn_attacks(us, from) & enemy).iter() {
                if to.rank() == promo_rank {
                    push_promotions(list, from, to, true);
                } else {
                    list.push(Move::new(from, to, MoveType::Capture));
                }
            }
            if let Some(ep) = board.ep_square() {
                if pawn_attacks(us, from).contains(ep) {
                    list.push(Move::new(from, ep, MoveType::EpCapture));
                }
            }
        } else if let Some(to) = from.offset(up) {
            if !occ.contains(to) {
                if to.rank() == promo_rank {
                    push_promotions(list, from, to, false);
                } else {
                    list.push(Move::new(from, to, MoveType::Quiet));
                    if from.rank() == start_rank {
                        if let Some(to2) = to.offset(up) {
                            if !occ.contains(to2) {
                                list.push(Move::new(from, to2, MoveType::DoublePawnPush));
                            }
                        }
                    }
                }
            }
        }
    }
}

fn generate_castles(board: &Board, list: &mut MoveList) {
    let us = board.turn();
    let occ = board.occupancy();

    let candidates: [(CastleSide, MoveType, Square, &[Square], &[Square]); 2] = [
        (
            CastleSide::Kingside,
            MoveType::KingCastle,
            Square::G1,
            &[Square::F1, Square::G1],
            &[Square::E1, Square::F1],
        ),
        (
            CastleSide::Queenside,
            MoveType::QueenCastle,
            Square::C1,
            &[Square::B1, Square::C1, Square::D1],
            &[Square::E1, Square::D1],
        ),
    ];

    'outer: for (side, move_type, to, empties, path) in candidates {
        if !board.castling_right(side, us) {
            continue;
        }
        for &sq in empties {
            if occ.contains(relative_square(sq, us)) {
                continue 'outer;
            }
        }
        // キングが通過する升に敵の利きがあれば生成しない
        // （移動先の升は合法性検査側が扱う）
        for &sq in path {
            if board
                .attackers(relative_square(sq, us), occ, !us)
                .is_not_empty()
            {
                continue 'outer;
            }
        }
        list.push(Move::new(
            relative_square(Square::E1, us),
            relative_square(to, us),
            move_type,
        ));
    }
}
