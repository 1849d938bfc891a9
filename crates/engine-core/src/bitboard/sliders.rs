//! 遠方駒（ビショップ、ルーク、クイーン）の利き計算
//!
//! マスごとに関連マス（レイ上の、端を除いたマス）の占有パターンを列挙した
//! ルックアップテーブルを一度だけ構築する。

use std::array;
use std::sync::OnceLock;

use log::debug;

use crate::types::{File, Rank, Square};

use super::Bitboard;

struct SliderTable {
    rook_masks: [Vec<Square>; Square::NUM],
    rook_attacks: [Vec<Bitboard>; Square::NUM],
    bishop_masks: [Vec<Square>; Square::NUM],
    bishop_attacks: [Vec<Bitboard>; Square::NUM],
}

static SLIDER_ATTACKS: OnceLock<SliderTable> = OnceLock::new();

fn slider_attacks() -> &'static SliderTable {
    SLIDER_ATTACKS.get_or_init(SliderTable::new)
}

/// テーブルを事前構築する
///
/// 呼ばなくても初回アクセス時に構築されるが、起動時に済ませておくと
/// 探索開始直後の遅延を避けられる。
pub fn init() {
    let _ = slider_attacks();
}

impl SliderTable {
    fn new() -> Self {
        let mut rook_masks: [Vec<Square>; Square::NUM] = array::from_fn(|_| Vec::new());
        let mut rook_attacks: [Vec<Bitboard>; Square::NUM] = array::from_fn(|_| Vec::new());
        let mut bishop_masks: [Vec<Square>; Square::NUM] = array::from_fn(|_| Vec::new());
        let mut bishop_attacks: [Vec<Bitboard>; Square::NUM] = array::from_fn(|_| Vec::new());

        for sq in Square::all() {
            let idx = sq.index();

            let rook_rays = build_rays(sq, &[(0, -1), (0, 1), (1, 0), (-1, 0)]);
            let rook_mask = relevant_mask(&rook_rays);
            rook_attacks[idx] = build_attack_table(&rook_rays, &rook_mask);
            rook_masks[idx] = rook_mask;

            let bishop_rays = build_rays(sq, &[(1, -1), (-1, -1), (1, 1), (-1, 1)]);
            let bishop_mask = relevant_mask(&bishop_rays);
            bishop_attacks[idx] = build_attack_table(&bishop_rays, &bishop_mask);
            bishop_masks[idx] = bishop_mask;
        }

        let entries: usize = rook_attacks.iter().map(Vec::len).sum::<usize>()
            + bishop_attacks.iter().map(Vec::len).sum::<usize>();
        debug!("slider attack tables built ({entries} entries)");

        SliderTable {
            rook_masks,
            rook_attacks,
            bishop_masks,
            bishop_attacks,
        }
    }
}

fn build_rays(sq: Square, dirs: &[(i32, i32)]) -> Vec<Vec<Square>> {
    dirs.iter().map(|&(df, dr)| ray(sq, df, dr)).collect()
}

fn ray(sq: Square, df: i32, dr: i32) -> Vec<Square> {
    let mut squares = Vec::new();
    let mut file = sq.file() as i32 + df;
    let mut rank = sq.rank() as i32 + dr;
    while (0..8).contains(&file) && (0..8).contains(&rank) {
        squares.push(Square::new(
            File::from_u8(file as u8).unwrap(),
            Rank::from_u8(rank as u8).unwrap(),
        ));
        file += df;
        rank += dr;
    }
    squares
}

/// 各レイの末尾（盤端）を除いた関連マス集合
///
/// 端のマスの占有は利きに影響しないのでテーブルを小さくできる。
fn relevant_mask(rays: &[Vec<Square>]) -> Vec<Square> {
    let mut mask = Vec::new();
    for ray in rays {
        if ray.len() > 1 {
            mask.extend_from_slice(&ray[..ray.len() - 1]);
        }
    }
    mask
}

fn build_attack_table(rays: &[Vec<Square>], mask: &[Square]) -> Vec<Bitboard> {
    debug_assert!(mask.len() < usize::BITS as usize);
    let table_len = 1usize << mask.len();
    let mut table = Vec::with_capacity(table_len);
    for idx in 0..table_len {
        let occupied = occupancy_from_index(idx, mask);
        table.push(attacks_from_rays(rays, occupied));
    }
    table
}

fn occupancy_from_index(index: usize, mask: &[Square]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for (i, sq) in mask.iter().enumerate() {
        if (index >> i) & 1 == 1 {
            bb.set(*sq);
        }
    }
    bb
}

fn occupancy_to_index(occupied: Bitboard, mask: &[Square]) -> usize {
    let mut idx = 0usize;
    for (i, sq) in mask.iter().enumerate() {
        if occupied.contains(*sq) {
            idx |= 1usize << i;
        }
    }
    idx
}

fn attacks_from_rays(rays: &[Vec<Square>], occupied: Bitboard) -> Bitboard {
    let mut result = Bitboard::EMPTY;
    for ray in rays {
        for &target in ray {
            result.set(target);
            if occupied.contains(target) {
                break;
            }
        }
    }
    result
}

/// ルークの利き（占有を考慮）
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let table = slider_attacks();
    let idx = sq.index();
    table.rook_attacks[idx][occupancy_to_index(occupied, &table.rook_masks[idx])]
}

/// ビショップの利き（占有を考慮）
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let table = slider_attacks();
    let idx = sq.index();
    table.bishop_attacks[idx][occupancy_to_index(occupied, &table.bishop_masks[idx])]
}

/// クイーンの利き（占有を考慮）
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}
