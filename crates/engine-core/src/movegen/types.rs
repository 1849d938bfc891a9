//! 指し手生成の型定義

/// 1局面での最大指し手数
///
/// チェスの理論上の最大は218手。余裕を持たせる。
pub const MAX_MOVES: usize = 256;

/// 指し手生成のタイプ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenType {
    /// 駒を取る指し手（アンパッサン・成り捕獲含む）
    Captures,
    /// 駒を取らない指し手（前進、成り、キャスリング含む）
    Quiets,
    /// 合法手すべて（自玉の安全まで検査済み）
    Legal,
}
