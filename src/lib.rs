//! Chinese Chess (Xiangqi) rules engine
//!
//! 中国象棋规则引擎 - 走法生成、可撤销的对局记录，以及两种机器人：
//! 本地穷举搜索和外部 UCCI 引擎

pub mod board;
pub mod error;
pub mod fen;
pub mod game;
pub mod robot;
pub mod test_positions;
pub mod types;

pub use board::Board;
pub use error::{ChessError, Result};
pub use fen::{board_to_fen, parse_fen, FenState};
pub use game::Game;
pub use robot::{
    create_robot, find_winning_capture, Robot, RobotConfig, StepTree, TreeSearchRobot, UcciRobot,
    AVAILABLE_STRATEGIES, DEFAULT_STRATEGY,
};
pub use types::{Camp, GameOperation, Location, Pawn, PawnKind, PawnOnBoard};
