//! 交换串（FEN）解析和生成
//!
//! 格式: `<棋盘> <走子方> - - 0 1`
//!
//! 棋盘从最上一行 (y = 9) 写到最下一行 (y = 0)，行之间用 `/` 分隔：
//! - 己方棋子：R(车) N(马) B(象) A(士) K(将) C(炮) P(兵)
//! - 对方棋子：r n b a k c p
//! - 空格：数字 (1-9)
//!
//! 走子方：`w` 己方，`b` 对方

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::types::{Camp, Location, Pawn, BOARD_HEIGHT, BOARD_WIDTH};

/// 交换串中走子方之后的固定占位字段
const FEN_SUFFIX: &str = "- - 0 1";

/// 交换串解析后的状态
#[derive(Debug, Clone)]
pub struct FenState {
    pub board: Board,
    pub turn: Camp,
}

fn invalid(fen: &str, message: impl Into<String>) -> ChessError {
    ChessError::InvalidFen {
        fen: fen.to_string(),
        message: message.into(),
    }
}

/// 解析交换串
///
/// 走子方缺省时视为己方先走；其余占位字段忽略。
pub fn parse_fen(fen: &str) -> Result<FenState> {
    let mut parts = fen.split_whitespace();
    let board_str = parts.next().ok_or_else(|| invalid(fen, "empty string"))?;

    let turn = match parts.next() {
        None => Camp::Own,
        Some(side) => {
            let mut chars = side.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Camp::from_fen_char(c)
                    .ok_or_else(|| invalid(fen, format!("invalid side to move: {}", side)))?,
                _ => return Err(invalid(fen, format!("invalid side to move: {}", side))),
            }
        }
    };

    let board = parse_board(fen, board_str)?;
    Ok(FenState { board, turn })
}

/// 解析棋盘部分
fn parse_board(fen: &str, board_str: &str) -> Result<Board> {
    let rows: Vec<&str> = board_str.split('/').collect();
    if rows.len() != BOARD_HEIGHT as usize {
        return Err(invalid(
            fen,
            format!("expected {} ranks, got {}", BOARD_HEIGHT, rows.len()),
        ));
    }

    let mut board = Board::empty();

    for (row_idx, row_str) in rows.iter().enumerate() {
        // 第一行是 y = 9
        let y = BOARD_HEIGHT - 1 - row_idx as i32;
        let mut x = 0;

        for ch in row_str.chars() {
            if let Some(count) = ch.to_digit(10) {
                if count == 0 {
                    return Err(invalid(fen, "empty count must be 1-9"));
                }
                x += count as i32;
            } else {
                let pawn = Pawn::from_fen_char(ch)
                    .ok_or_else(|| invalid(fen, format!("invalid piece char: {}", ch)))?;
                let location = Location::new(x, y);
                if !location.is_valid() {
                    return Err(invalid(fen, format!("rank {} is too long", y)));
                }
                board.set_pawn(location, Some(pawn))?;
                x += 1;
            }

            if x > BOARD_WIDTH {
                return Err(invalid(fen, format!("rank {} is too long", y)));
            }
        }

        if x != BOARD_WIDTH {
            return Err(invalid(
                fen,
                format!("rank {} has {} files, expected {}", y, x, BOARD_WIDTH),
            ));
        }
    }

    Ok(board)
}

/// 生成交换串
#[allow(clippy::needless_range_loop)]
pub fn board_to_fen(board: &Board, turn: Camp) -> String {
    // 构建 10x9 的棋盘
    let mut grid = [[None::<Pawn>; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
    for pob in board.pawns(None) {
        grid[pob.location.y as usize][pob.location.x as usize] = Some(pob.pawn);
    }

    let mut rows = Vec::with_capacity(BOARD_HEIGHT as usize);

    for y in (0..BOARD_HEIGHT as usize).rev() {
        let mut row_str = String::new();
        let mut empty_count = 0;

        for x in 0..BOARD_WIDTH as usize {
            match grid[y][x] {
                Some(pawn) => {
                    if empty_count > 0 {
                        row_str.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    row_str.push(pawn.to_fen_char());
                }
                None => empty_count += 1,
            }
        }

        if empty_count > 0 {
            row_str.push_str(&empty_count.to_string());
        }

        rows.push(row_str);
    }

    format!("{} {} {}", rows.join("/"), turn.to_fen_char(), FEN_SUFFIX)
}
