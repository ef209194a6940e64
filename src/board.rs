//! 中国象棋棋盘
//!
//! 使用 90 格数组存储棋子，并随每次落子/提子增量维护双方子力分。

use crate::error::{ChessError, Result};
use crate::fen::{board_to_fen, parse_fen};
use crate::types::{
    Camp, GameOperation, Location, Pawn, PawnKind, PawnOnBoard, BOARD_HEIGHT, BOARD_WIDTH,
    SQUARE_COUNT,
};

/// 车、炮的四个方向：左、右、上、下
const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// 棋盘
///
/// 值语义：搜索中的每一步都在独立的副本上进行。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Pawn>; SQUARE_COUNT],
    own_score: i32,
    opponent_score: i32,
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub const WIDTH: i32 = BOARD_WIDTH;
    pub const HEIGHT: i32 = BOARD_HEIGHT;

    /// 空棋盘
    pub fn empty() -> Board {
        Board {
            squares: [None; SQUARE_COUNT],
            own_score: 0,
            opponent_score: 0,
        }
    }

    /// 标准开局
    pub fn standard() -> Board {
        const BACK_RANK: [PawnKind; 9] = [
            PawnKind::Chariot,
            PawnKind::Horse,
            PawnKind::Elephant,
            PawnKind::Advisor,
            PawnKind::General,
            PawnKind::Advisor,
            PawnKind::Elephant,
            PawnKind::Horse,
            PawnKind::Chariot,
        ];

        let mut board = Board::empty();
        // (阵营, 底线, 炮线, 兵线)
        for (camp, back, cannon, soldier) in [(Camp::Own, 0, 2, 3), (Camp::Opponent, 9, 7, 6)] {
            for (x, kind) in BACK_RANK.iter().enumerate() {
                board.place(Location::new(x as i32, back), Pawn::new(camp, *kind));
            }
            for x in [1, 7] {
                board.place(Location::new(x, cannon), Pawn::new(camp, PawnKind::Cannon));
            }
            for x in (0..BOARD_WIDTH).step_by(2) {
                board.place(Location::new(x, soldier), Pawn::new(camp, PawnKind::Soldier));
            }
        }
        board
    }

    /// 从交换串创建棋盘（忽略走子方）
    pub fn from_fen(fen: &str) -> Result<Board> {
        parse_fen(fen).map(|state| state.board)
    }

    /// 生成交换串
    pub fn to_fen(&self, turn: Camp) -> String {
        board_to_fen(self, turn)
    }

    #[inline]
    pub fn own_score(&self) -> i32 {
        self.own_score
    }

    #[inline]
    pub fn opponent_score(&self) -> i32 {
        self.opponent_score
    }

    /// 某一阵营的子力分
    #[inline]
    pub fn score(&self, camp: Camp) -> i32 {
        match camp {
            Camp::Own => self.own_score,
            Camp::Opponent => self.opponent_score,
        }
    }

    fn check_location(location: Location) -> Result<()> {
        if location.is_valid() {
            Ok(())
        } else {
            Err(ChessError::LocationOutOfRange { location })
        }
    }

    /// 获取某位置的棋子
    pub fn get_pawn(&self, location: Location) -> Result<Option<Pawn>> {
        Self::check_location(location)?;
        Ok(self.squares[location.to_index()])
    }

    /// 放置（或清除）某位置的棋子，同时调整双方子力分
    pub fn set_pawn(&mut self, location: Location, pawn: Option<Pawn>) -> Result<()> {
        Self::check_location(location)?;
        self.put(location, pawn);
        Ok(())
    }

    /// 走子：起点为空时什么也不做，否则覆盖终点，返回被吃的棋子
    pub fn move_pawn(&mut self, from: Location, to: Location) -> Result<Option<Pawn>> {
        Self::check_location(from)?;
        Self::check_location(to)?;

        let Some(pawn) = self.squares[from.to_index()] else {
            return Ok(None);
        };
        let captured = self.squares[to.to_index()];
        self.put(from, None);
        self.put(to, Some(pawn));
        Ok(captured)
    }

    fn place(&mut self, location: Location, pawn: Pawn) {
        self.put(location, Some(pawn));
    }

    /// 调用方保证坐标合法
    fn put(&mut self, location: Location, pawn: Option<Pawn>) {
        let index = location.to_index();

        if let Some(origin) = self.squares[index] {
            self.adjust_score(origin, -origin.weight());
        }

        self.squares[index] = pawn;

        if let Some(pawn) = pawn {
            self.adjust_score(pawn, pawn.weight());
        }
    }

    /// 己方得分即对方失分
    fn adjust_score(&mut self, pawn: Pawn, delta: i32) {
        match pawn.camp {
            Camp::Own => {
                self.own_score += delta;
                self.opponent_score -= delta;
            }
            Camp::Opponent => {
                self.own_score -= delta;
                self.opponent_score += delta;
            }
        }
    }

    /// 坐标合法且为空
    #[inline]
    pub fn is_location_empty(&self, location: Location) -> bool {
        location.is_valid() && self.squares[location.to_index()].is_none()
    }

    /// 坐标合法且为另一阵营的棋子
    #[inline]
    pub fn is_location_different_camp(&self, location: Location, camp: Camp) -> bool {
        location.is_valid()
            && self.squares[location.to_index()].is_some_and(|pawn| pawn.camp != camp)
    }

    /// 可以落子：空位或敌子
    #[inline]
    fn can_land_on(&self, location: Location, camp: Camp) -> bool {
        self.is_location_empty(location) || self.is_location_different_camp(location, camp)
    }

    /// 按行优先（y 升序，x 升序）遍历棋子，可选按阵营过滤
    pub fn pawns(&self, camp: Option<Camp>) -> impl Iterator<Item = PawnOnBoard> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(index, square)| {
                square.map(|pawn| PawnOnBoard::new(pawn, Location::from_index(index)))
            })
            .filter(move |pob| camp.is_none_or(|c| pob.pawn.camp == c))
    }

    /// 获取棋子的所有可走位置
    pub fn walkable_locations(&self, pawn_on_board: PawnOnBoard) -> Result<Vec<Location>> {
        Self::check_location(pawn_on_board.location)?;
        Ok(self.walkable_from(pawn_on_board))
    }

    fn walkable_from(&self, pawn_on_board: PawnOnBoard) -> Vec<Location> {
        let PawnOnBoard { pawn, location } = pawn_on_board;

        match pawn.kind {
            PawnKind::Chariot => self.chariot_moves(location, pawn.camp),
            PawnKind::Horse => self.horse_moves(location, pawn.camp),
            PawnKind::Cannon => self.cannon_moves(location, pawn.camp),
            PawnKind::Soldier => self.soldier_moves(location, pawn.camp),
            PawnKind::Advisor => self.advisor_moves(location, pawn.camp),
            PawnKind::Elephant => self.elephant_moves(location, pawn.camp),
            PawnKind::General => self.general_moves(location, pawn.camp),
        }
    }

    /// 某阵营所有走法，按棋子遍历顺序排列
    pub fn legal_operations(&self, camp: Camp) -> Vec<GameOperation> {
        let mut operations = Vec::new();
        for pob in self.pawns(Some(camp)) {
            for to in self.walkable_from(pob) {
                let target = self.squares[to.to_index()];
                operations.push(GameOperation::new(pob.location, to, target));
            }
        }
        operations
    }

    fn chariot_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        let mut moves = Vec::with_capacity(17);

        for (dx, dy) in ORTHOGONAL {
            let mut next = location.offset(dx, dy);
            while next.is_valid() {
                match self.squares[next.to_index()] {
                    None => moves.push(next),
                    Some(target) => {
                        if target.camp != camp {
                            moves.push(next);
                        }
                        break;
                    }
                }
                next = next.offset(dx, dy);
            }
        }

        moves
    }

    fn horse_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        let mut moves = Vec::with_capacity(8);

        // (马腿, 两个落点)：左、右、上、下
        let steps: [((i32, i32), [(i32, i32); 2]); 4] = [
            ((-1, 0), [(-2, -1), (-2, 1)]),
            ((1, 0), [(2, -1), (2, 1)]),
            ((0, 1), [(-1, 2), (1, 2)]),
            ((0, -1), [(-1, -2), (1, -2)]),
        ];

        for ((lx, ly), targets) in steps {
            if !self.is_location_empty(location.offset(lx, ly)) {
                continue;
            }
            for (dx, dy) in targets {
                let target = location.offset(dx, dy);
                if self.can_land_on(target, camp) {
                    moves.push(target);
                }
            }
        }

        moves
    }

    fn cannon_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        let mut moves = Vec::with_capacity(17);

        for (dx, dy) in ORTHOGONAL {
            let mut next = location.offset(dx, dy);
            let mut found_screen = false;

            while next.is_valid() {
                match self.squares[next.to_index()] {
                    None => {
                        if !found_screen {
                            moves.push(next);
                        }
                    }
                    Some(target) => {
                        if !found_screen {
                            found_screen = true;
                        } else {
                            if target.camp != camp {
                                moves.push(next);
                            }
                            break;
                        }
                    }
                }
                next = next.offset(dx, dy);
            }
        }

        moves
    }

    fn soldier_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        let mut moves = Vec::with_capacity(3);

        let forward = match camp {
            Camp::Own => 1,
            Camp::Opponent => -1,
        };
        let ahead = location.offset(0, forward);
        if self.can_land_on(ahead, camp) {
            moves.push(ahead);
        }

        // 过河后可以左右走
        if location.has_crossed_river(camp) {
            for dx in [-1, 1] {
                let side = location.offset(dx, 0);
                if self.can_land_on(side, camp) {
                    moves.push(side);
                }
            }
        }

        moves
    }

    fn advisor_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        // 左上、右上、左下、右下
        let steps = [(-1, 1), (1, 1), (-1, -1), (1, -1)];
        self.palace_steps(location, camp, &steps)
    }

    fn general_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        // 左、右、下、上
        let steps = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        self.palace_steps(location, camp, &steps)
    }

    fn palace_steps(&self, location: Location, camp: Camp, steps: &[(i32, i32)]) -> Vec<Location> {
        steps
            .iter()
            .map(|&(dx, dy)| location.offset(dx, dy))
            .filter(|step| step.is_in_palace(camp) && self.can_land_on(*step, camp))
            .collect()
    }

    fn elephant_moves(&self, location: Location, camp: Camp) -> Vec<Location> {
        let mut moves = Vec::with_capacity(4);

        // (象眼, 落点)
        let steps: [((i32, i32), (i32, i32)); 4] = [
            ((-1, -1), (-2, -2)),
            ((1, -1), (2, -2)),
            ((-1, 1), (-2, 2)),
            ((1, 1), (2, 2)),
        ];

        for ((ex, ey), (dx, dy)) in steps {
            if !self.is_location_empty(location.offset(ex, ey)) {
                continue;
            }
            let target = location.offset(dx, dy);
            if self.can_land_on(target, camp) {
                moves.push(target);
            }
        }

        moves
    }
}
