//! 步骤树
//!
//! 节点存放在一个数组里，用下标互相引用，只保存父到子的边。
//! 每个节点持有走子前后两份独立的棋盘副本。

use std::collections::VecDeque;

use crate::board::Board;
use crate::error::Result;
use crate::types::{Camp, GameOperation};

/// 节点在树中的下标
pub type NodeId = usize;

/// 步骤树节点
#[derive(Debug, Clone)]
pub struct StepNode {
    initial_board: Board,
    current_board: Board,
    operation: GameOperation,
    children: Vec<NodeId>,
}

impl StepNode {
    /// 在 `board` 的副本上执行 `operation`；`GameOperation::NONE` 不走子
    fn new(board: &Board, operation: GameOperation) -> Result<StepNode> {
        let mut current_board = board.clone();
        if !operation.is_none() {
            current_board.move_pawn(operation.from, operation.to)?;
        }
        Ok(StepNode {
            initial_board: board.clone(),
            current_board,
            operation,
            children: Vec::new(),
        })
    }

    /// 走子前的棋盘
    pub fn initial_board(&self) -> &Board {
        &self.initial_board
    }

    /// 走子后的棋盘
    pub fn current_board(&self) -> &Board {
        &self.current_board
    }

    pub fn operation(&self) -> GameOperation {
        self.operation
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// 步骤树
#[derive(Debug, Clone)]
pub struct StepTree {
    nodes: Vec<StepNode>,
}

impl StepTree {
    const ROOT: NodeId = 0;

    /// 以当前棋盘为根（根节点的走法为 `GameOperation::NONE`）
    pub fn new(board: &Board) -> StepTree {
        let root = StepNode {
            initial_board: board.clone(),
            current_board: board.clone(),
            operation: GameOperation::NONE,
            children: Vec::new(),
        };
        StepTree { nodes: vec![root] }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &StepNode {
        &self.nodes[id]
    }

    /// 节点总数（含根节点）
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 只有根节点
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// 按广度优先顺序列出叶子节点
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut queue = VecDeque::from([Self::ROOT]);

        while let Some(id) = queue.pop_front() {
            let children = &self.nodes[id].children;
            if children.is_empty() {
                leaves.push(id);
            } else {
                queue.extend(children.iter().copied());
            }
        }

        leaves
    }

    /// 逐层扩展 `depth` 层
    ///
    /// 第 1 层扩展当前所有叶子，之后每层只扩展上一层新加的节点。
    /// 某一层没有新节点时就此停止，不会回头再扩展旧叶子。
    /// `factory` 接收叶子的棋盘和从 1 开始的层号，返回候选走法。
    pub fn append_steps<F>(&mut self, depth: u32, mut factory: F) -> Result<()>
    where
        F: FnMut(&Board, u32) -> Vec<GameOperation>,
    {
        let mut frontier = self.leaves();

        for level in 1..=depth {
            let mut added = Vec::new();

            for parent in frontier {
                let operations = factory(&self.nodes[parent].current_board, level);

                for operation in operations {
                    let child = StepNode::new(&self.nodes[parent].current_board, operation)?;
                    let child_id = self.nodes.len();
                    self.nodes.push(child);
                    self.nodes[parent].children.push(child_id);
                    added.push(child_id);
                }
            }

            frontier = added;
        }

        Ok(())
    }

    /// 所有从根到叶子的路径（不含根节点），深度优先，按子节点顺序
    pub fn paths(&self) -> Paths<'_> {
        let mut stack = Vec::new();
        for &child in self.nodes[Self::ROOT].children.iter().rev() {
            stack.push(vec![child]);
        }
        Paths { tree: self, stack }
    }

    /// 从 `id` 往下看 `depth` 层时 `camp` 的子力分变化范围 (最小, 最大)
    ///
    /// 两端都从 0 开始。每层扫描的都是 `id` 的直接子节点，
    /// 所以只要 `depth >= 1`，结果就是直接子节点的分差范围。
    pub fn future_min_max_score_offset(&self, id: NodeId, camp: Camp, depth: u32) -> (i32, i32) {
        if depth == 0 {
            return (0, 0);
        }

        let node = &self.nodes[id];
        let base = node.current_board.score(camp);

        node.children
            .iter()
            .map(|&child| self.nodes[child].current_board.score(camp) - base)
            .fold((0, 0), |(min, max), offset| (min.min(offset), max.max(offset)))
    }
}

/// 路径迭代器，见 [`StepTree::paths`]
pub struct Paths<'a> {
    tree: &'a StepTree,
    stack: Vec<Vec<NodeId>>,
}

impl Iterator for Paths<'_> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(path) = self.stack.pop() {
            let Some(&last) = path.last() else {
                continue;
            };
            let children = &self.tree.nodes[last].children;
            if children.is_empty() {
                return Some(path);
            }
            for &child in children.iter().rev() {
                let mut next = path.clone();
                next.push(child);
                self.stack.push(next);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;
    use crate::types::{Location, Pawn, PawnKind};

    fn expand_both_sides(tree: &mut StepTree, first: Camp, depth: u32) {
        tree.append_steps(depth, |board, level| {
            let camp = if level % 2 == 1 { first } else { first.opposite() };
            board.legal_operations(camp)
        })
        .unwrap();
    }

    #[test]
    fn test_new_tree() {
        let board = Board::standard();
        let tree = StepTree::new(&board);
        assert_eq!(tree.len(), 1);
        assert!(tree.is_empty());
        assert!(tree.node(tree.root()).operation().is_none());
        assert_eq!(tree.node(tree.root()).current_board(), &board);
        assert_eq!(tree.leaves(), vec![tree.root()]);
        assert_eq!(tree.paths().count(), 0);
    }

    #[test]
    fn test_single_level() {
        let board = Board::standard();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 1);

        assert_eq!(tree.len(), 1 + 44);
        let paths: Vec<_> = tree.paths().collect();
        assert_eq!(paths.len(), 44);
        assert!(paths.iter().all(|p| p.len() == 1));

        // 第一条路径对应第一个走法
        let first = tree.node(paths[0][0]);
        assert_eq!(first.operation().from, Location::new(0, 0));
        assert_eq!(first.operation().to, Location::new(0, 1));
        assert_eq!(first.initial_board(), &board);
        assert_ne!(first.current_board(), &board);
    }

    #[test]
    fn test_two_levels() {
        let board = Board::standard();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 2);

        let paths: Vec<_> = tree.paths().collect();
        assert_eq!(paths.len(), tree.leaves().len());
        assert!(paths.iter().all(|p| p.len() == 2));

        // 第二层是对方的走法，且在第一层之后的棋盘上生成
        for path in &paths {
            let reply = tree.node(path[1]);
            let mover = reply
                .initial_board()
                .get_pawn(reply.operation().from)
                .unwrap()
                .unwrap();
            assert_eq!(mover.camp, Camp::Opponent);
            assert_eq!(reply.initial_board(), tree.node(path[0]).current_board());
        }
    }

    #[test]
    fn test_paths_are_repeatable() {
        let board = Board::from_fen(test_positions::CHARIOT_DUEL).unwrap();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 2);

        let first: Vec<_> = tree.paths().collect();
        let second: Vec<_> = tree.paths().collect();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn test_append_to_existing_leaves() {
        let board = Board::from_fen(test_positions::BARE_GENERALS).unwrap();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 1);
        let after_one = tree.len();

        // 再扩展一层：只在叶子上继续
        tree.append_steps(1, |board, _| board.legal_operations(Camp::Opponent))
            .unwrap();
        assert!(tree.len() > after_one);
        assert!(tree.paths().all(|p| p.len() == 2));
    }

    #[test]
    fn test_factory_levels() {
        let board = Board::from_fen(test_positions::BARE_GENERALS).unwrap();
        let mut tree = StepTree::new(&board);
        let mut levels = Vec::new();
        tree.append_steps(3, |board, level| {
            levels.push(level);
            let camp = if level % 2 == 1 { Camp::Own } else { Camp::Opponent };
            board.legal_operations(camp)
        })
        .unwrap();

        assert_eq!(levels.first(), Some(&1));
        assert_eq!(levels.last(), Some(&3));
        assert!(levels.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_no_operations_no_paths() {
        let board = Board::empty();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 3);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.paths().count(), 0);
    }

    #[test]
    fn test_stops_after_empty_level() {
        // 对方没有棋子：第 2 层一个节点都加不上，第 3 层不再扩展
        let mut board = Board::empty();
        board
            .set_pawn(Location::new(4, 1), Some(Pawn::new(Camp::Own, PawnKind::General)))
            .unwrap();
        let mut tree = StepTree::new(&board);

        let mut levels = Vec::new();
        tree.append_steps(3, |board, level| {
            levels.push(level);
            let camp = if level % 2 == 1 { Camp::Own } else { Camp::Opponent };
            board.legal_operations(camp)
        })
        .unwrap();

        assert_eq!(levels, vec![1, 2, 2, 2, 2]);
        assert_eq!(tree.len(), 5);
        let paths: Vec<_> = tree.paths().collect();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|path| path.len() == 1));
    }

    #[test]
    fn test_future_min_max_score_offset() {
        let board = Board::from_fen(test_positions::CHARIOT_DUEL).unwrap();
        let mut tree = StepTree::new(&board);
        expand_both_sides(&mut tree, Camp::Own, 2);

        let root = tree.node(tree.root());
        // 第一个走法：己方将左移，对方车随后可以吃掉己方车
        let first = root.children()[0];
        assert_eq!(tree.future_min_max_score_offset(first, Camp::Own, 1), (-10, 0));
        assert_eq!(tree.future_min_max_score_offset(first, Camp::Own, 3), (-10, 0));
        assert_eq!(tree.future_min_max_score_offset(first, Camp::Opponent, 1), (0, 10));
        assert_eq!(tree.future_min_max_score_offset(first, Camp::Own, 0), (0, 0));

        // 叶子没有子节点
        let leaf = tree.node(first).children()[0];
        assert_eq!(tree.future_min_max_score_offset(leaf, Camp::Own, 2), (0, 0));
    }
}
