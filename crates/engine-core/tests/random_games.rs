//! ランダム対局による不変条件の検査
//!
//! 固定シードの乱数でランダムな合法手を進め、各局面で増分状態
//! （ハッシュ・PST・フェーズ・王手駒）が一から再計算した値と
//! 一致することを確認する。

use engine_core::movegen::GenType;
use engine_core::position::{Board, Position};
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const GAME_FENS: [&str; 4] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

#[test]
fn random_walks_preserve_invariants() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(20240217);

    for fen in GAME_FENS {
        for _ in 0..16 {
            let mut pos = Position::from_fen(fen).unwrap();
            for _ in 0..100 {
                let moves = pos.generate_moves(GenType::Legal);
                if moves.is_empty() || pos.is_draw(false) {
                    break;
                }
                let mv = moves.at(rng.gen_range(0..moves.len()));
                pos.make_move(mv, false);

                let board = pos.board();
                assert!(board.is_valid(), "invalid after {} in {}", mv.to_uci(), fen);
                assert_eq!(board.hash(), board.generate_hash());
            }
        }
    }
}

#[test]
fn random_walks_unmake_restores_exactly() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(77);

    for fen in GAME_FENS {
        let mut pos = Position::from_fen(fen).unwrap();
        for _ in 0..60 {
            let moves = pos.generate_moves(GenType::Legal);
            if moves.is_empty() {
                break;
            }
            let before = *pos.board();
            let ply = pos.ply();
            let mv = moves.at(rng.gen_range(0..moves.len()));

            pos.make_move(mv, false);
            pos.unmake_move();
            assert_eq!(*pos.board(), before);
            assert_eq!(pos.ply(), ply);

            // パスの往復も同様にビット単位で一致する
            if !pos.in_check() {
                pos.make_null_move();
                pos.unmake_null_move();
                assert_eq!(*pos.board(), before);
            }

            pos.make_move(mv, false);
        }
    }
}

#[test]
fn random_walks_fen_roundtrip() {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(123456789);

    let mut pos = Position::new();
    for _ in 0..200 {
        let moves = pos.generate_moves(GenType::Legal);
        if moves.is_empty() {
            break;
        }
        let mv = moves.at(rng.gen_range(0..moves.len()));
        pos.make_move(mv, false);

        let board = pos.board();
        let reparsed = Board::from_fen(&board.to_fen()).unwrap();
        assert_eq!(reparsed, *board, "FEN round trip failed: {}", board.to_fen());
    }
}
