//! Chinese Chess CLI
//!
//! 命令行界面，用于查看走法和让机器人下棋
//!
//! 日志级别由 `RUST_LOG` 控制，例如 `RUST_LOG=debug chinese-chess best`

use std::path::PathBuf;
use std::time::Instant;

use chinese_chess::{
    create_robot, test_positions, Camp, Game, GameOperation, Location, Robot, RobotConfig,
    DEFAULT_STRATEGY,
};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "chinese-chess")]
#[command(about = "Chinese chess rules engine and robots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// 机器人相关的公共参数，覆盖配置文件中的同名字段
#[derive(clap::Args)]
struct RobotArgs {
    /// 配置文件 (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 搜索深度
    #[arg(long)]
    depth: Option<u32>,

    /// UCCI 引擎可执行文件
    #[arg(long)]
    engine: Option<PathBuf>,

    /// 传给引擎的参数（可重复）
    #[arg(long = "engine-arg")]
    engine_args: Vec<String>,

    /// 等待引擎回复的超时（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,
}

impl RobotArgs {
    fn to_config(&self) -> Result<RobotConfig, String> {
        let mut config = match &self.config {
            Some(path) => RobotConfig::from_json_file(path).map_err(|e| e.to_string())?,
            None => RobotConfig::default(),
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if let Some(engine) = &self.engine {
            config.engine_path = Some(engine.clone());
        }
        if !self.engine_args.is_empty() {
            config.engine_args = self.engine_args.clone();
        }
        if let Some(timeout) = self.timeout_ms {
            config.response_timeout_ms = Some(timeout);
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 列出某个格子上棋子的可走位置
    Moves {
        /// 交换串
        #[arg(long, default_value = test_positions::START)]
        fen: String,

        /// 列 (0-8)
        #[arg(long)]
        x: i32,

        /// 行 (0-9)
        #[arg(long)]
        y: i32,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 输出局面的交换串（可先依次走若干步）
    Fen {
        /// 起始交换串
        #[arg(long, default_value = test_positions::START)]
        fen: String,

        /// 要执行的走法，如 b2e2（可重复）
        #[arg(long = "move")]
        moves: Vec<String>,
    },

    /// 让机器人为走子方选择一步
    Best {
        /// 交换串
        #[arg(long, default_value = test_positions::START)]
        fen: String,

        /// 机器人策略 (tree, ergodic, ucci)
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        strategy: String,

        #[command(flatten)]
        robot: RobotArgs,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 两个机器人对弈，直到一方的将被吃或达到步数上限
    Play {
        /// 起始交换串
        #[arg(long, default_value = test_positions::START)]
        fen: String,

        /// 己方策略
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        own: String,

        /// 对方策略
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        opponent: String,

        /// 最多走多少步
        #[arg(long, default_value = "100")]
        max_plies: usize,

        #[command(flatten)]
        robot: RobotArgs,

        /// JSON 输出
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct MovesResponse {
    from: String,
    pawn: Option<String>,
    moves: Vec<String>,
    total: usize,
}

#[derive(Serialize)]
struct BestResponse {
    strategy: String,
    #[serde(rename = "move")]
    mv: String,
    capture: Option<String>,
    depth: u32,
    elapsed_ms: f64,
}

#[derive(Serialize)]
struct PlyRecord {
    ply: usize,
    camp: String,
    #[serde(rename = "move")]
    mv: String,
    capture: Option<String>,
}

#[derive(Serialize)]
struct PlayResponse {
    plies: Vec<PlyRecord>,
    winner: Option<String>,
    fen: String,
}

fn capture_str(operation: &GameOperation) -> Option<String> {
    operation.target_pawn.map(|p| p.to_fen_char().to_string())
}

/// 解析 "b2e2" 形式的走法
fn parse_move_token(token: &str) -> Result<(Location, Location), String> {
    if token.len() != 4 || !token.is_ascii() {
        return Err(format!("invalid move: {}", token));
    }
    let from = Location::from_ucci_str(&token[..2]);
    let to = Location::from_ucci_str(&token[2..]);
    match (from, to) {
        (Some(from), Some(to)) => Ok((from, to)),
        _ => Err(format!("invalid move: {}", token)),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn run_moves(fen: &str, x: i32, y: i32, json: bool) -> Result<(), String> {
    let game = Game::from_fen(fen).map_err(|e| e.to_string())?;
    let from = Location::new(x, y);
    let pawn = game.pawn(from).map_err(|e| e.to_string())?;
    let moves = game.walkable_locations(from).map_err(|e| e.to_string())?;

    if json {
        let response = MovesResponse {
            from: from.to_ucci_str(),
            pawn: pawn.map(|p| p.to_fen_char().to_string()),
            total: moves.len(),
            moves: moves.iter().map(Location::to_ucci_str).collect(),
        };
        println!("{}", to_json(&response)?);
    } else {
        match pawn {
            Some(pawn) => println!("{} at {} ({}):", pawn, from, from.to_ucci_str()),
            None => println!("No pawn at {}", from),
        }
        for to in &moves {
            println!("  {} {}", to.to_ucci_str(), to);
        }
        println!("Total: {}", moves.len());
    }
    Ok(())
}

fn run_fen(fen: &str, moves: &[String]) -> Result<(), String> {
    let mut game = Game::from_fen(fen).map_err(|e| e.to_string())?;
    for token in moves {
        let (from, to) = parse_move_token(token)?;
        game.move_pawn(from, to).map_err(|e| e.to_string())?;
    }
    println!("{}", game.board().to_fen(game.current_turn()));
    Ok(())
}

async fn run_best(fen: &str, strategy: &str, args: &RobotArgs, json: bool) -> Result<(), String> {
    let game = Game::from_fen(fen).map_err(|e| e.to_string())?;
    let config = args.to_config()?;
    let mut robot =
        create_robot(strategy, game.current_turn(), &config).map_err(|e| e.to_string())?;

    let start = Instant::now();
    let result = robot.step(&game).await;
    let elapsed = start.elapsed().as_secs_f64();
    robot.close().await.map_err(|e| e.to_string())?;
    let operation = result.map_err(|e| e.to_string())?;

    if json {
        let response = BestResponse {
            strategy: strategy.to_string(),
            mv: operation.to_ucci_str(),
            capture: capture_str(&operation),
            depth: robot.default_depth(),
            elapsed_ms: elapsed * 1000.0,
        };
        println!("{}", to_json(&response)?);
    } else if operation.is_none() {
        println!("No move available (strategy={})", strategy);
    } else {
        println!("Best move (strategy={}): {}", strategy, operation);
        println!("  {} -> {}", operation.from, operation.to);
        println!("\nStats: depth={}, time={:.3}s", robot.default_depth(), elapsed);
    }
    Ok(())
}

async fn play(
    game: &mut Game,
    robots: &mut [Box<dyn Robot>; 2],
    max_plies: usize,
) -> Result<Vec<PlyRecord>, String> {
    let mut plies = Vec::new();

    while plies.len() < max_plies && game.winner().is_none() {
        let camp = game.current_turn();
        let robot = match camp {
            Camp::Own => &mut robots[0],
            Camp::Opponent => &mut robots[1],
        };

        let operation = robot.step(game).await.map_err(|e| e.to_string())?;
        if operation.is_none() {
            info!("{} has no move", camp);
            break;
        }

        let applied = game
            .move_pawn(operation.from, operation.to)
            .map_err(|e| e.to_string())?;
        plies.push(PlyRecord {
            ply: plies.len() + 1,
            camp: camp.to_string(),
            mv: applied.to_ucci_str(),
            capture: capture_str(&applied),
        });
    }

    Ok(plies)
}

async fn run_play(
    fen: &str,
    own: &str,
    opponent: &str,
    max_plies: usize,
    args: &RobotArgs,
    json: bool,
) -> Result<(), String> {
    let mut game = Game::from_fen(fen).map_err(|e| e.to_string())?;
    let config = args.to_config()?;
    let mut robots = [
        create_robot(own, Camp::Own, &config).map_err(|e| e.to_string())?,
        create_robot(opponent, Camp::Opponent, &config).map_err(|e| e.to_string())?,
    ];

    let result = play(&mut game, &mut robots, max_plies).await;
    for robot in robots.iter_mut() {
        robot.close().await.map_err(|e| e.to_string())?;
    }
    let plies = result?;

    let winner = game.winner().map(|c| c.to_string());
    let final_fen = game.board().to_fen(game.current_turn());

    if json {
        let response = PlayResponse {
            plies,
            winner,
            fen: final_fen,
        };
        println!("{}", to_json(&response)?);
    } else {
        for ply in &plies {
            let capture = ply
                .capture
                .as_ref()
                .map(|c| format!(" x{}", c))
                .unwrap_or_default();
            println!("{:>4}. {:<8} {}{}", ply.ply, ply.camp, ply.mv, capture);
        }
        match winner {
            Some(winner) => println!("\nWinner: {}", winner),
            None => println!("\nNo winner after {} plies", plies.len()),
        }
        println!("FEN: {}", final_fen);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Moves { fen, x, y, json } => run_moves(&fen, x, y, json),
        Commands::Fen { fen, moves } => run_fen(&fen, &moves),
        Commands::Best {
            fen,
            strategy,
            robot,
            json,
        } => run_best(&fen, &strategy, &robot, json).await,
        Commands::Play {
            fen,
            own,
            opponent,
            max_plies,
            robot,
            json,
        } => run_play(&fen, &own, &opponent, max_plies, &robot, json).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
