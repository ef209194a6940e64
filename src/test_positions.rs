//! 测试局面库
//!
//! 提供命名的交换串局面，方便测试、基准和调试
//!
//! 命名规范:
//! - START: 初始局面
//! - OPENING_n: 开局后数步
//! - 其余按局面特征命名

/// 初始局面，己方先走
pub const START: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1";

/// 己方左炮移到中路，对方走
pub const OPENING_1: &str = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/4C2C1/9/RNBAKABNR b - - 0 1";

/// 开局数步后的局面，对方走
pub const OPENING_2: &str = "r1bakabr1/9/1cn3nc1/p1p1p1p1p/9/9/P1P1P1P1P/1C2C1N2/9/RNBAKAB1R b - - 0 1";

/// 己方车在中路直指对方将
pub const GENERAL_EXPOSED: &str = "4k4/9/9/9/4R4/9/9/9/9/3K5 w - - 0 1";

/// 双车同一横线对峙，己方先走
pub const CHARIOT_DUEL: &str = "4k4/9/9/9/R7r/9/9/9/9/4K4 w - - 0 1";

/// 对方炮隔兵打己方将，对方走
pub const CANNON_CHECK: &str = "3k5/9/9/9/9/4c4/9/9/4P4/4K4 b - - 0 1";

/// 双方都只剩将
pub const BARE_GENERALS: &str = "3k5/9/9/9/9/9/9/9/9/5K3 w - - 0 1";

pub const ALL: &[&str] = &[
    START,
    OPENING_1,
    OPENING_2,
    GENERAL_EXPOSED,
    CHARIOT_DUEL,
    CANNON_CHECK,
    BARE_GENERALS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::fen::parse_fen;
    use crate::types::{Camp, PawnKind};

    #[test]
    fn test_all_positions_valid() {
        for (i, fen) in ALL.iter().enumerate() {
            let board = Board::from_fen(fen);
            assert!(board.is_ok(), "position {} invalid: {:?}", i, board.err());
        }
    }

    #[test]
    fn test_every_position_has_both_generals() {
        for fen in ALL {
            let board = Board::from_fen(fen).unwrap();
            for camp in [Camp::Own, Camp::Opponent] {
                let generals = board
                    .pawns(Some(camp))
                    .filter(|p| p.pawn.kind == PawnKind::General)
                    .count();
                assert_eq!(generals, 1, "{} in {}", camp, fen);
            }
        }
    }

    #[test]
    fn test_side_to_move() {
        assert_eq!(parse_fen(OPENING_1).unwrap().turn, Camp::Opponent);
        assert_eq!(parse_fen(CHARIOT_DUEL).unwrap().turn, Camp::Own);
    }
}
