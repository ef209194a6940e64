//! 穷举搜索机器人
//!
//! 展开有限深度的步骤树，按路径首步之后的子力分变化范围给路径打分，
//! 取分数最高的第一条路径的第一步。

use std::time::Instant;

use async_trait::async_trait;
use log::debug;

use super::step_tree::StepTree;
use super::{find_winning_capture, Robot};
use crate::error::{ChessError, Result};
use crate::game::Game;
use crate::types::{Camp, GameOperation};

/// 穷举搜索机器人
#[derive(Debug, Clone)]
pub struct TreeSearchRobot {
    camp: Camp,
    default_depth: u32,
}

impl TreeSearchRobot {
    pub fn new(camp: Camp, default_depth: u32) -> Result<Self> {
        if default_depth == 0 {
            return Err(ChessError::InvalidDepth {
                depth: default_depth,
            });
        }
        Ok(TreeSearchRobot {
            camp,
            default_depth,
        })
    }

    #[inline]
    pub fn camp(&self) -> Camp {
        self.camp
    }

    /// 从当前局面展开 `depth` 层，第 i 层由当前走子方交替 i - 1 次后的阵营走
    pub fn build_tree(&self, game: &Game, depth: u32) -> Result<StepTree> {
        let first = game.current_turn();
        let mut tree = StepTree::new(game.board());

        tree.append_steps(depth, |board, level| {
            let camp = if level % 2 == 1 {
                first
            } else {
                first.opposite()
            };
            board.legal_operations(camp)
        })?;

        Ok(tree)
    }

    /// 同步搜索
    pub fn search(&self, game: &Game, depth: u32) -> Result<GameOperation> {
        if depth == 0 {
            return Err(ChessError::InvalidDepth { depth });
        }
        if game.current_turn() != self.camp {
            return Err(ChessError::NotRobotTurn {
                robot: self.camp,
                current: game.current_turn(),
            });
        }

        if let Some(operation) = find_winning_capture(game.board(), self.camp) {
            debug!("winning capture available: {}", operation);
            return Ok(operation);
        }

        let start = Instant::now();
        let tree = self.build_tree(game, depth)?;

        let mut best: Option<(i32, GameOperation)> = None;
        let mut path_count = 0usize;

        for path in tree.paths() {
            path_count += 1;
            let first = path[0];
            let (min, max) =
                tree.future_min_max_score_offset(first, self.camp, (path.len() - 1) as u32);
            let weight = min + max;

            // 只有严格更大才替换，平分时保留先出现的路径
            if best.is_none_or(|(best_weight, _)| weight > best_weight) {
                best = Some((weight, tree.node(first).operation()));
            }
        }

        debug!(
            "tree search depth={} nodes={} paths={} time={:.3}s",
            depth,
            tree.len(),
            path_count,
            start.elapsed().as_secs_f64()
        );

        match best {
            Some((weight, operation)) => {
                debug!("best operation {} weight={}", operation, weight);
                Ok(operation)
            }
            None => Ok(GameOperation::NONE),
        }
    }
}

#[async_trait]
impl Robot for TreeSearchRobot {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn default_depth(&self) -> u32 {
        self.default_depth
    }

    async fn step_with_depth(&mut self, game: &Game, depth: u32) -> Result<GameOperation> {
        self.search(game, depth)
    }
}
