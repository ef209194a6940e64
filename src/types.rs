//! 中国象棋核心类型定义
//!
//! 坐标、阵营、棋子以及可撤销的走法记录

use std::fmt;

/// 棋盘宽度（列数）
pub const BOARD_WIDTH: i32 = 9;
/// 棋盘高度（行数）
pub const BOARD_HEIGHT: i32 = 10;
/// 格子总数
pub const SQUARE_COUNT: usize = (BOARD_WIDTH * BOARD_HEIGHT) as usize;

/// 阵营
///
/// 始终以己方视角命名：己方在棋盘下方 (y = 0..=4)，对方在上方。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Camp {
    /// 己方
    Own,
    /// 对方
    Opponent,
}

impl Camp {
    /// 获取对方阵营
    pub fn opposite(&self) -> Camp {
        match self {
            Camp::Own => Camp::Opponent,
            Camp::Opponent => Camp::Own,
        }
    }

    /// 交换串中的走子方字符
    pub fn to_fen_char(&self) -> char {
        match self {
            Camp::Own => 'w',
            Camp::Opponent => 'b',
        }
    }

    /// 从交换串中的走子方字符解析
    pub fn from_fen_char(c: char) -> Option<Camp> {
        match c {
            'w' => Some(Camp::Own),
            'b' => Some(Camp::Opponent),
            _ => None,
        }
    }
}

impl fmt::Display for Camp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Camp::Own => write!(f, "Own"),
            Camp::Opponent => write!(f, "Opponent"),
        }
    }
}

/// 棋子种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PawnKind {
    /// 車 / 俥
    Chariot,
    /// 馬 / 傌
    Horse,
    /// 砲 / 炮
    Cannon,
    /// 卒 / 兵
    Soldier,
    /// 士 / 仕
    Advisor,
    /// 象 / 相
    Elephant,
    /// 將 / 帥
    General,
}

impl PawnKind {
    pub const ALL: [PawnKind; 7] = [
        PawnKind::Chariot,
        PawnKind::Horse,
        PawnKind::Cannon,
        PawnKind::Soldier,
        PawnKind::Advisor,
        PawnKind::Elephant,
        PawnKind::General,
    ];

    /// 子力权重
    pub fn weight(&self) -> i32 {
        match self {
            PawnKind::Chariot => 10,
            PawnKind::Horse => 5,
            PawnKind::Cannon => 8,
            PawnKind::Soldier => 1,
            PawnKind::Advisor => 3,
            PawnKind::Elephant => 3,
            PawnKind::General => 1000,
        }
    }

    /// 转换为交换串字符（小写）
    pub fn to_fen_char(&self) -> char {
        match self {
            PawnKind::Chariot => 'r',
            PawnKind::Horse => 'n',
            PawnKind::Elephant => 'b',
            PawnKind::Advisor => 'a',
            PawnKind::General => 'k',
            PawnKind::Cannon => 'c',
            PawnKind::Soldier => 'p',
        }
    }

    /// 从交换串字符解析（忽略大小写）
    pub fn from_fen_char(c: char) -> Option<PawnKind> {
        match c.to_ascii_lowercase() {
            'r' => Some(PawnKind::Chariot),
            'n' => Some(PawnKind::Horse),
            'b' => Some(PawnKind::Elephant),
            'a' => Some(PawnKind::Advisor),
            'k' => Some(PawnKind::General),
            'c' => Some(PawnKind::Cannon),
            'p' => Some(PawnKind::Soldier),
            _ => None,
        }
    }
}

impl fmt::Display for PawnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PawnKind::Chariot => "Chariot",
            PawnKind::Horse => "Horse",
            PawnKind::Cannon => "Cannon",
            PawnKind::Soldier => "Soldier",
            PawnKind::Advisor => "Advisor",
            PawnKind::Elephant => "Elephant",
            PawnKind::General => "General",
        };
        write!(f, "{}", name)
    }
}

/// 棋子（不含位置）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pawn {
    pub camp: Camp,
    pub kind: PawnKind,
}

impl Pawn {
    pub const fn new(camp: Camp, kind: PawnKind) -> Self {
        Pawn { camp, kind }
    }

    #[inline]
    pub fn weight(&self) -> i32 {
        self.kind.weight()
    }

    /// 交换串字符：己方大写，对方小写
    pub fn to_fen_char(&self) -> char {
        let c = self.kind.to_fen_char();
        match self.camp {
            Camp::Own => c.to_ascii_uppercase(),
            Camp::Opponent => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Pawn> {
        let kind = PawnKind::from_fen_char(c)?;
        let camp = if c.is_ascii_uppercase() {
            Camp::Own
        } else {
            Camp::Opponent
        };
        Some(Pawn { camp, kind })
    }
}

impl fmt::Display for Pawn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.camp, self.kind)
    }
}

/// 棋盘坐标 (x, y)
///
/// x: 0-8 (从左到右)
/// y: 0-9 (0 是己方底线，9 是对方底线)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    /// 表示“没有格子”的哨兵值
    pub const INVALID: Location = Location { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    /// 检查坐标是否在棋盘范围内
    #[inline]
    pub fn is_valid(&self) -> bool {
        (0..BOARD_WIDTH).contains(&self.x) && (0..BOARD_HEIGHT).contains(&self.y)
    }

    /// 数组下标（行优先），调用方保证坐标合法
    #[inline]
    pub(crate) fn to_index(self) -> usize {
        (self.y * BOARD_WIDTH + self.x) as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Location {
        let index = index as i32;
        Location {
            x: index % BOARD_WIDTH,
            y: index / BOARD_WIDTH,
        }
    }

    /// 坐标加偏移量
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Location {
        Location {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// 检查坐标是否在该阵营的九宫内
    pub fn is_in_palace(&self, camp: Camp) -> bool {
        if !(3..=5).contains(&self.x) {
            return false;
        }
        match camp {
            Camp::Own => (0..=2).contains(&self.y),
            Camp::Opponent => (7..=9).contains(&self.y),
        }
    }

    /// 检查该阵营的棋子在此处是否已过河
    pub fn has_crossed_river(&self, camp: Camp) -> bool {
        match camp {
            Camp::Own => self.y > 4,
            Camp::Opponent => self.y < 5,
        }
    }

    /// 从引擎坐标解析（如 "b2"：列字母 + 行数字）
    pub fn from_ucci_str(s: &str) -> Option<Location> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        let x = match file {
            'a'..='i' => file as i32 - 'a' as i32,
            _ => return None,
        };
        let y = rank.to_digit(10)? as i32;
        Some(Location { x, y })
    }

    /// 转换为引擎坐标（如 "b2"）
    pub fn to_ucci_str(&self) -> String {
        if !self.is_valid() {
            return "--".to_string();
        }
        let file = (b'a' + self.x as u8) as char;
        format!("{}{}", file, self.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// 棋盘上的棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PawnOnBoard {
    pub pawn: Pawn,
    pub location: Location,
}

impl PawnOnBoard {
    pub fn new(pawn: Pawn, location: Location) -> Self {
        PawnOnBoard { pawn, location }
    }
}

/// 可撤销的走法记录
///
/// `target_pawn` 记录走子前目标格上的棋子，撤销时据此复原。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameOperation {
    pub from: Location,
    pub to: Location,
    pub target_pawn: Option<Pawn>,
}

impl GameOperation {
    /// “不走棋”：步骤树的根节点，或引擎报告无棋可走
    pub const NONE: GameOperation = GameOperation {
        from: Location::INVALID,
        to: Location::INVALID,
        target_pawn: None,
    };

    pub fn new(from: Location, to: Location, target_pawn: Option<Pawn>) -> Self {
        GameOperation {
            from,
            to,
            target_pawn,
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        *self == GameOperation::NONE
    }

    /// 是否吃掉了指定阵营的将
    pub fn captures_general_of(&self, camp: Camp) -> bool {
        matches!(
            self.target_pawn,
            Some(Pawn { camp: c, kind: PawnKind::General }) if c == camp
        )
    }

    /// 引擎格式的走法（如 "b2e2"）
    pub fn to_ucci_str(&self) -> String {
        if self.is_none() {
            return "none".to_string();
        }
        format!("{}{}", self.from.to_ucci_str(), self.to.to_ucci_str())
    }
}

impl fmt::Display for GameOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_pawn {
            Some(target) => write!(f, "{}x{}", self.to_ucci_str(), target.to_fen_char()),
            None => write!(f, "{}", self.to_ucci_str()),
        }
    }
}
