//! 机器人模块
//!
//! 机器人根据对局选出下一步走法。提供两种实现：
//! - `tree`（别名 `ergodic`）：在本地穷举有限深度的步骤树
//! - `ucci`：把局面交给外部 UCCI 引擎进程

mod step_tree;
mod tree_search;
mod ucci;

pub use step_tree::{NodeId, Paths, StepNode, StepTree};
pub use tree_search::TreeSearchRobot;
pub use ucci::{parse_best_move, UcciRobot, UcciSession};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::game::Game;
use crate::types::{Camp, GameOperation};

/// 可用的机器人策略
pub const AVAILABLE_STRATEGIES: &[&str] = &["tree", "ergodic", "ucci"];

/// 默认策略
pub const DEFAULT_STRATEGY: &str = "tree";

/// 机器人接口
#[async_trait]
pub trait Robot: Send {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 未指定深度时使用的搜索深度
    fn default_depth(&self) -> u32;

    /// 以指定深度计算下一步
    async fn step_with_depth(&mut self, game: &Game, depth: u32) -> Result<GameOperation>;

    /// 以默认深度计算下一步
    async fn step(&mut self, game: &Game) -> Result<GameOperation> {
        let depth = self.default_depth();
        self.step_with_depth(game, depth).await
    }

    /// 释放机器人持有的资源
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// 机器人配置
///
/// 可从 JSON 文件加载，缺省字段取默认值：
///
/// ```json
/// { "depth": 4, "engine_path": "/usr/local/bin/eleeye", "response_timeout_ms": 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// 搜索深度
    pub depth: u32,
    /// 外部引擎可执行文件
    pub engine_path: Option<PathBuf>,
    /// 外部引擎启动参数
    pub engine_args: Vec<String>,
    /// 等待引擎每一行回复的超时（毫秒），缺省不限时
    pub response_timeout_ms: Option<u64>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        RobotConfig {
            depth: 3,
            engine_path: None,
            engine_args: Vec::new(),
            response_timeout_ms: None,
        }
    }
}

impl RobotConfig {
    /// 从 JSON 文件加载
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<RobotConfig> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ChessError::io(format!("read config {}", path.display()), e))?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}

/// 按策略名称创建机器人
///
/// `ucci` 策略会立即启动引擎进程，因此需要在 tokio 运行时内调用。
pub fn create_robot(strategy: &str, camp: Camp, config: &RobotConfig) -> Result<Box<dyn Robot>> {
    match strategy.to_lowercase().as_str() {
        "tree" | "ergodic" => Ok(Box::new(TreeSearchRobot::new(camp, config.depth)?)),
        "ucci" => {
            let path = config.engine_path.as_ref().ok_or_else(|| ChessError::Io {
                operation: "start ucci engine".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no engine_path configured",
                ),
            })?;
            Ok(Box::new(UcciRobot::spawn(
                path,
                &config.engine_args,
                config.depth,
                config.response_timeout(),
            )?))
        }
        _ => Err(ChessError::UnknownStrategy {
            name: strategy.to_string(),
            available: AVAILABLE_STRATEGIES.join(", "),
        }),
    }
}

/// 一步就能吃掉对方将的走法（按走法生成顺序取第一个）
pub fn find_winning_capture(board: &Board, camp: Camp) -> Option<GameOperation> {
    let enemy = camp.opposite();
    board
        .legal_operations(camp)
        .into_iter()
        .find(|op| op.captures_general_of(enemy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;
    use crate::types::{Location, PawnKind};

    #[test]
    fn test_default_config() {
        let config = RobotConfig::default();
        assert_eq!(config.depth, 3);
        assert!(config.engine_path.is_none());
        assert!(config.response_timeout().is_none());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RobotConfig =
            serde_json::from_str(r#"{ "engine_path": "/opt/eleeye", "response_timeout_ms": 250 }"#)
                .unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.engine_path, Some(PathBuf::from("/opt/eleeye")));
        assert!(config.engine_args.is_empty());
        assert_eq!(config.response_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_config_from_json_file() {
        let path = std::env::temp_dir().join(format!("robot-config-{}.json", std::process::id()));
        fs::write(&path, r#"{ "depth": 5, "engine_args": ["-q"] }"#).unwrap();
        let config = RobotConfig::from_json_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.depth, 5);
        assert_eq!(config.engine_args, vec!["-q".to_string()]);
    }

    #[test]
    fn test_config_errors() {
        assert!(matches!(
            RobotConfig::from_json_file("/nonexistent/robot.json"),
            Err(ChessError::Io { .. })
        ));
        let parsed: std::result::Result<RobotConfig, _> = serde_json::from_str("{ \"depth\": -1 }");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_create_tree_robot() {
        let config = RobotConfig::default();
        for name in ["tree", "ergodic", "TREE"] {
            let robot = create_robot(name, Camp::Own, &config).unwrap();
            assert_eq!(robot.name(), "tree");
            assert_eq!(robot.default_depth(), 3);
        }
    }

    #[test]
    fn test_create_robot_errors() {
        let config = RobotConfig::default();
        assert!(matches!(
            create_robot("minimax", Camp::Own, &config),
            Err(ChessError::UnknownStrategy { .. })
        ));
        // 未配置引擎路径
        assert!(matches!(
            create_robot("ucci", Camp::Own, &config),
            Err(ChessError::Io { .. })
        ));
        let zero = RobotConfig {
            depth: 0,
            ..RobotConfig::default()
        };
        assert!(matches!(
            create_robot("tree", Camp::Own, &zero),
            Err(ChessError::InvalidDepth { depth: 0 })
        ));
    }

    #[test]
    fn test_find_winning_capture() {
        let board = Board::from_fen(test_positions::GENERAL_EXPOSED).unwrap();
        let op = find_winning_capture(&board, Camp::Own).unwrap();
        assert_eq!(op.from, Location::new(4, 5));
        assert_eq!(op.to, Location::new(4, 9));
        assert!(op.captures_general_of(Camp::Opponent));
        assert!(find_winning_capture(&board, Camp::Opponent).is_none());

        let board = Board::from_fen(test_positions::CANNON_CHECK).unwrap();
        let op = find_winning_capture(&board, Camp::Opponent).unwrap();
        assert_eq!(op.from, Location::new(4, 4));
        assert_eq!(op.to, Location::new(4, 0));
        assert_eq!(op.target_pawn.map(|p| p.kind), Some(PawnKind::General));

        assert!(find_winning_capture(&Board::standard(), Camp::Own).is_none());
    }
}
