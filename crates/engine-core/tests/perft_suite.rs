//! perft回帰スイート
//!
//! 公開されている基準値との完全一致を確認する。さらに素のperft、
//! オーダリング経由、ハッシュメモ化の3実装が一致することを確認する。

use engine_core::position::Position;
use engine_core::search::{perft, perft_hashed, perft_ordered};

struct PerftTest {
    fen: &'static str,
    depth: i32,
    nodes: u64,
}

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";
const POSITION_6: &str = "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10";

fn suite() -> Vec<PerftTest> {
    vec![
        PerftTest { fen: STARTPOS, depth: 1, nodes: 20 },
        PerftTest { fen: STARTPOS, depth: 2, nodes: 400 },
        PerftTest { fen: STARTPOS, depth: 3, nodes: 8_902 },
        PerftTest { fen: STARTPOS, depth: 4, nodes: 197_281 },
        PerftTest { fen: STARTPOS, depth: 5, nodes: 4_865_609 },
        PerftTest { fen: KIWIPETE, depth: 1, nodes: 48 },
        PerftTest { fen: KIWIPETE, depth: 2, nodes: 2_039 },
        PerftTest { fen: KIWIPETE, depth: 3, nodes: 97_862 },
        PerftTest { fen: KIWIPETE, depth: 4, nodes: 4_085_603 },
        PerftTest { fen: POSITION_3, depth: 1, nodes: 14 },
        PerftTest { fen: POSITION_3, depth: 2, nodes: 191 },
        PerftTest { fen: POSITION_3, depth: 3, nodes: 2_812 },
        PerftTest { fen: POSITION_3, depth: 4, nodes: 43_238 },
        PerftTest { fen: POSITION_3, depth: 5, nodes: 674_624 },
        PerftTest { fen: POSITION_4, depth: 1, nodes: 6 },
        PerftTest { fen: POSITION_4, depth: 2, nodes: 264 },
        PerftTest { fen: POSITION_4, depth: 3, nodes: 9_467 },
        PerftTest { fen: POSITION_4, depth: 4, nodes: 422_333 },
        PerftTest { fen: POSITION_5, depth: 1, nodes: 44 },
        PerftTest { fen: POSITION_5, depth: 2, nodes: 1_486 },
        PerftTest { fen: POSITION_5, depth: 3, nodes: 62_379 },
        PerftTest { fen: POSITION_5, depth: 4, nodes: 2_103_487 },
        PerftTest { fen: POSITION_6, depth: 1, nodes: 46 },
        PerftTest { fen: POSITION_6, depth: 2, nodes: 2_079 },
        PerftTest { fen: POSITION_6, depth: 3, nodes: 89_890 },
        PerftTest { fen: POSITION_6, depth: 4, nodes: 3_894_594 },
    ]
}

#[test]
fn perft_matches_published_values() {
    for test in suite() {
        let mut pos = Position::from_fen(test.fen).unwrap();
        let nodes = perft(&mut pos, test.depth);
        assert_eq!(
            nodes, test.nodes,
            "perft({}) mismatch for {}",
            test.depth, test.fen
        );
    }
}

#[test]
fn perft_ordered_agrees() {
    // オーダリングを通しても漏れも重複もないこと
    for test in suite().iter().filter(|t| t.depth <= 3) {
        let mut pos = Position::from_fen(test.fen).unwrap();
        assert_eq!(
            perft_ordered(&mut pos, test.depth),
            test.nodes,
            "ordered perft({}) mismatch for {}",
            test.depth,
            test.fen
        );
    }
}

#[test]
fn perft_hashed_agrees() {
    for test in suite().iter().filter(|t| t.depth <= 4) {
        let mut pos = Position::from_fen(test.fen).unwrap();
        assert_eq!(
            perft_hashed(&mut pos, test.depth),
            test.nodes,
            "hashed perft({}) mismatch for {}",
            test.depth,
            test.fen
        );
    }
}

#[test]
fn perft_ordered_agrees_kiwipete_deep() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft_ordered(&mut pos, 4), 4_085_603);
}

#[test]
#[ignore = "slow; run with --ignored in release builds"]
fn perft_startpos_depth_6() {
    let mut pos = Position::from_fen(STARTPOS).unwrap();
    assert_eq!(perft(&mut pos, 6), 119_060_324);
}

#[test]
#[ignore = "slow; run with --ignored in release builds"]
fn perft_kiwipete_depth_5() {
    let mut pos = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut pos, 5), 193_690_690);
}
