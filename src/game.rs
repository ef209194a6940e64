//! 对局：当前棋盘、走子方与可撤销的历史记录
//!
//! 悔棋/重做通过在当前棋盘上回放历史记录完成，不保存整盘快照。

use log::debug;

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::fen::parse_fen;
use crate::types::{Camp, GameOperation, Location, Pawn, PawnKind, PawnOnBoard};

/// 对局
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    current_turn: Camp,
    history: Vec<GameOperation>,
    /// 末尾已撤销的走法数量，0 表示没有可重做的走法
    state_offset: usize,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// 标准开局，己方先走
    pub fn new() -> Game {
        Game::with_board(Board::standard(), Camp::Own)
    }

    pub fn with_board(board: Board, current_turn: Camp) -> Game {
        Game {
            board,
            current_turn,
            history: Vec::new(),
            state_offset: 0,
        }
    }

    /// 从交换串创建对局
    pub fn from_fen(fen: &str) -> Result<Game> {
        let state = parse_fen(fen)?;
        Ok(Game::with_board(state.board, state.turn))
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn current_turn(&self) -> Camp {
        self.current_turn
    }

    /// 已生效的走法（不含已撤销的部分）
    pub fn history(&self) -> &[GameOperation] {
        &self.history[..self.history.len() - self.state_offset]
    }

    /// 可撤销的步数
    #[inline]
    pub fn undo_depth(&self) -> usize {
        self.history.len() - self.state_offset
    }

    /// 可重做的步数
    #[inline]
    pub fn redo_depth(&self) -> usize {
        self.state_offset
    }

    pub fn pawn(&self, location: Location) -> Result<Option<Pawn>> {
        self.board.get_pawn(location)
    }

    /// 某位置棋子的可走位置；空位返回空列表
    pub fn walkable_locations(&self, location: Location) -> Result<Vec<Location>> {
        match self.board.get_pawn(location)? {
            Some(pawn) => self
                .board
                .walkable_locations(PawnOnBoard::new(pawn, location)),
            None => Ok(Vec::new()),
        }
    }

    fn switch_turn(&mut self) {
        self.current_turn = self.current_turn.opposite();
    }

    /// 走子并记录历史；会丢弃尚未重做的走法
    ///
    /// 起点没有棋子时返回错误，不记录历史也不换手。
    pub fn move_pawn(&mut self, from: Location, to: Location) -> Result<GameOperation> {
        if self.board.get_pawn(from)?.is_none() {
            return Err(ChessError::EmptySquare { location: from });
        }
        let target_pawn = self.board.get_pawn(to)?;

        if self.state_offset > 0 {
            debug!("discarding {} undone operation(s)", self.state_offset);
            self.history.truncate(self.history.len() - self.state_offset);
            self.state_offset = 0;
        }

        let operation = GameOperation::new(from, to, target_pawn);
        self.history.push(operation);
        self.board.move_pawn(from, to)?;
        self.switch_turn();

        Ok(operation)
    }

    /// 悔棋 `count` 步
    pub fn undo(&mut self, count: usize) -> Result<()> {
        let available = self.undo_depth();
        if count == 0 || count > available {
            return Err(ChessError::HistoryOutOfRange {
                operation: "undo",
                requested: count,
                available,
            });
        }

        for _ in 0..count {
            let operation = self.history[self.history.len() - self.state_offset - 1];
            Self::revert(&mut self.board, operation)?;
            self.state_offset += 1;
            self.switch_turn();
        }

        Ok(())
    }

    /// 重做 `count` 步
    pub fn redo(&mut self, count: usize) -> Result<()> {
        let available = self.redo_depth();
        if count == 0 || count > available {
            return Err(ChessError::HistoryOutOfRange {
                operation: "redo",
                requested: count,
                available,
            });
        }

        for _ in 0..count {
            let operation = self.history[self.history.len() - self.state_offset];
            self.board.move_pawn(operation.from, operation.to)?;
            self.state_offset -= 1;
            self.switch_turn();
        }

        Ok(())
    }

    /// 把走法退回：棋子回到起点，目标格恢复原来的棋子
    fn revert(board: &mut Board, operation: GameOperation) -> Result<()> {
        let moved = board.get_pawn(operation.to)?;
        board.set_pawn(operation.from, moved)?;
        board.set_pawn(operation.to, operation.target_pawn)
    }

    /// `distance` 步之前的棋盘副本，不影响当前对局
    pub fn board_at(&self, distance: usize) -> Result<Board> {
        let available = self.undo_depth();
        if distance > available {
            return Err(ChessError::HistoryOutOfRange {
                operation: "look back",
                requested: distance,
                available,
            });
        }

        let mut board = self.board.clone();
        for operation in self.history().iter().rev().take(distance) {
            Self::revert(&mut board, *operation)?;
        }
        Ok(board)
    }

    /// 按行优先顺序找到的第一个指定棋子
    pub fn find_pawn(&self, camp: Camp, kind: PawnKind) -> Option<PawnOnBoard> {
        self.board
            .pawns(Some(camp))
            .find(|pob| pob.pawn.kind == kind)
    }

    /// 胜方：对方的将已被吃掉
    pub fn winner(&self) -> Option<Camp> {
        if self.find_pawn(Camp::Opponent, PawnKind::General).is_none() {
            Some(Camp::Own)
        } else if self.find_pawn(Camp::Own, PawnKind::General).is_none() {
            Some(Camp::Opponent)
        } else {
            None
        }
    }
}
