//! UCCI 引擎机器人
//!
//! 通过标准输入输出与外部引擎进程逐行通信：
//!
//! ```text
//! >> ucci
//! << ucciok
//! >> position fen <交换串>
//! >> go depth <N>
//! << bestmove b2e2 ...   或   nobestmove
//! ```
//!
//! 坐标：列为 `'a' + x`，行直接写 y 的数字。

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::{find_winning_capture, Robot};
use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::game::Game;
use crate::types::{Camp, GameOperation, Location};

/// 解析 `bestmove` 行，返回 (起点, 终点)
pub fn parse_best_move(line: &str) -> Result<(Location, Location)> {
    let malformed = |message: &str| ChessError::MalformedReply {
        line: line.to_string(),
        message: message.to_string(),
    };

    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return Err(malformed("expected bestmove"));
    }
    let mv = tokens.next().ok_or_else(|| malformed("missing move"))?;
    if mv.len() != 4 || !mv.is_ascii() {
        return Err(malformed("move must have 4 characters"));
    }

    let from = Location::from_ucci_str(&mv[..2]).ok_or_else(|| malformed("invalid from square"))?;
    let to = Location::from_ucci_str(&mv[2..]).ok_or_else(|| malformed("invalid to square"))?;
    Ok((from, to))
}

/// 一条 UCCI 会话：握手状态加上读写两端
pub struct UcciSession<R, W> {
    reader: R,
    writer: W,
    ready: bool,
    timeout: Option<Duration>,
}

impl<R, W> UcciSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, timeout: Option<Duration>) -> Self {
        UcciSession {
            reader,
            writer,
            ready: false,
            timeout,
        }
    }

    /// 是否已完成握手
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    async fn send_line(&mut self, line: &str) -> Result<()> {
        trace!(">> {}", line);
        self.writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ChessError::io("write to engine", e))?;
        self.writer
            .write_all(b"\n")
            .await
            .map_err(|e| ChessError::io("write to engine", e))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ChessError::io("flush engine input", e))
    }

    /// 读一行；流结束视为引擎已关闭
    async fn read_line(&mut self, expected: &'static str) -> Result<String> {
        let mut buf = String::new();
        let timeout = self.timeout;
        let read = self.reader.read_line(&mut buf);

        let n = match timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| ChessError::EngineTimeout {
                    expected,
                    timeout: limit,
                })?,
            None => read.await,
        }
        .map_err(|e| ChessError::io("read from engine", e))?;

        if n == 0 {
            return Err(ChessError::EngineClosed { expected });
        }

        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        trace!("<< {}", line);
        Ok(line)
    }

    /// 握手，只在第一次调用时发送 `ucci`
    pub async fn handshake(&mut self) -> Result<()> {
        if self.ready {
            return Ok(());
        }

        self.send_line("ucci").await?;
        loop {
            let line = self.read_line("ucciok").await?;
            if line.starts_with("ucciok") {
                break;
            }
            debug!("engine: {}", line);
        }

        info!("ucci engine ready");
        self.ready = true;
        Ok(())
    }

    pub async fn set_position(&mut self, board: &Board, turn: Camp) -> Result<()> {
        let command = format!("position fen {}", board.to_fen(turn));
        self.send_line(&command).await
    }

    /// 请求搜索，`None` 表示引擎回复 `nobestmove`
    pub async fn go(&mut self, depth: u32) -> Result<Option<(Location, Location)>> {
        self.send_line(&format!("go depth {}", depth)).await?;

        loop {
            let line = self.read_line("bestmove").await?;
            if line.starts_with("bestmove") {
                return parse_best_move(&line).map(Some);
            }
            if line.starts_with("nobestmove") {
                return Ok(None);
            }
            if line.starts_with("info") {
                trace!("skipping engine info");
            } else {
                warn!("unexpected engine line: {}", line);
            }
        }
    }

    /// 握手、发送局面并取回引擎的走法；走法记录终点原有的棋子
    pub async fn best_operation(&mut self, game: &Game, depth: u32) -> Result<GameOperation> {
        self.handshake().await?;
        self.set_position(game.board(), game.current_turn()).await?;

        match self.go(depth).await? {
            Some((from, to)) => {
                let target = game.board().get_pawn(to)?;
                let operation = GameOperation::new(from, to, target);
                debug!("engine suggests {}", operation);
                Ok(operation)
            }
            None => {
                debug!("engine has no move");
                Ok(GameOperation::NONE)
            }
        }
    }
}

struct Engine {
    child: Child,
    session: UcciSession<BufReader<ChildStdout>, ChildStdin>,
}

/// UCCI 引擎机器人
///
/// 进程在创建时启动并一直复用；`close()` 之后或通信出错之后的调用返回 `Disposed`。
/// 机器人被丢弃时进程随之被杀掉。
pub struct UcciRobot {
    default_depth: u32,
    engine: Option<Engine>,
}

impl UcciRobot {
    /// 启动引擎进程，需要在 tokio 运行时内调用
    pub fn spawn(
        path: impl AsRef<Path>,
        args: &[String],
        default_depth: u32,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        if default_depth == 0 {
            return Err(ChessError::InvalidDepth {
                depth: default_depth,
            });
        }

        let path = path.as_ref();
        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ChessError::io(format!("start engine {}", path.display()), e))?;

        let missing = |pipe: &str| {
            ChessError::io(
                format!("open engine {}", pipe),
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe not captured"),
            )
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;

        info!("started ucci engine {} (pid {:?})", path.display(), child.id());

        Ok(UcciRobot {
            default_depth,
            engine: Some(Engine {
                child,
                session: UcciSession::new(BufReader::new(stdout), stdin, timeout),
            }),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.engine.is_none()
    }

    /// 结束引擎进程并等待其退出
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(mut engine) = self.engine.take() else {
            return Ok(());
        };

        match engine.child.try_wait() {
            Ok(Some(status)) => {
                info!("ucci engine already exited: {}", status);
                Ok(())
            }
            _ => {
                engine
                    .child
                    .kill()
                    .await
                    .map_err(|e| ChessError::io("stop engine", e))?;
                info!("ucci engine stopped");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Robot for UcciRobot {
    fn name(&self) -> &'static str {
        "ucci"
    }

    fn default_depth(&self) -> u32 {
        self.default_depth
    }

    async fn step_with_depth(&mut self, game: &Game, depth: u32) -> Result<GameOperation> {
        let engine = self.engine.as_mut().ok_or(ChessError::Disposed)?;
        if depth == 0 {
            return Err(ChessError::InvalidDepth { depth });
        }

        if let Some(operation) = find_winning_capture(game.board(), game.current_turn()) {
            debug!("winning capture available: {}", operation);
            return Ok(operation);
        }

        // 出错后输出流里可能还留着旧的回复，这个进程不能再用
        let result = engine.session.best_operation(game, depth).await;
        if let Err(e) = &result {
            warn!("dropping ucci engine after error: {}", e);
            if let Err(kill) = self.shutdown().await {
                warn!("{}", kill);
            }
        }
        result
    }

    async fn close(&mut self) -> Result<()> {
        self.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_positions;
    use crate::types::{Pawn, PawnKind};

    fn session(script: &'static str) -> UcciSession<&'static [u8], Vec<u8>> {
        UcciSession::new(script.as_bytes(), Vec::new(), None)
    }

    fn sent(session: UcciSession<&'static [u8], Vec<u8>>) -> Vec<String> {
        let (_, writer) = session.into_inner();
        String::from_utf8(writer)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_best_move() {
        assert_eq!(
            parse_best_move("bestmove b2e2").unwrap(),
            (Location::new(1, 2), Location::new(4, 2))
        );
        assert_eq!(
            parse_best_move("bestmove h9g7 ponder b0c2").unwrap(),
            (Location::new(7, 9), Location::new(6, 7))
        );
        for bad in ["bestmove", "bestmove b2e", "bestmove z2e2", "bestmove b2e2e", "nobestmove"] {
            assert!(
                matches!(parse_best_move(bad), Err(ChessError::MalformedReply { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_handshake_and_best_move() {
        let mut s = session("id name fake\nucciok\nbestmove b2e2 ponder h7e7\n");
        let op = s.best_operation(&Game::new(), 3).await.unwrap();
        assert_eq!(op, GameOperation::new(Location::new(1, 2), Location::new(4, 2), None));
        assert!(s.is_ready());

        assert_eq!(
            sent(s),
            vec![
                "ucci".to_string(),
                format!("position fen {}", test_positions::START),
                "go depth 3".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_handshake_only_once() {
        let mut s = session("ucciok\nbestmove a0a1\nbestmove i0i1\n");
        let game = Game::new();
        s.best_operation(&game, 1).await.unwrap();
        let op = s.best_operation(&game, 2).await.unwrap();
        assert_eq!((op.from, op.to), (Location::new(8, 0), Location::new(8, 1)));

        let lines = sent(s);
        assert_eq!(lines.iter().filter(|l| *l == "ucci").count(), 1);
        assert_eq!(lines.last().map(String::as_str), Some("go depth 2"));
    }

    #[tokio::test]
    async fn test_records_captured_pawn() {
        let mut s = session("ucciok\ninfo depth 1 score 5\nbestmove b2b9\n");
        let op = s.best_operation(&Game::new(), 1).await.unwrap();
        assert_eq!(op.target_pawn, Some(Pawn::new(Camp::Opponent, PawnKind::Horse)));
    }

    #[tokio::test]
    async fn test_no_best_move() {
        let mut s = session("ucciok\ninfo nothing\nnobestmove\n");
        let op = s.best_operation(&Game::new(), 1).await.unwrap();
        assert!(op.is_none());
    }

    #[tokio::test]
    async fn test_position_uses_side_to_move() {
        let mut s = session("ucciok\nnobestmove\n");
        let game = Game::from_fen(test_positions::OPENING_1).unwrap();
        s.best_operation(&game, 4).await.unwrap();
        let lines = sent(s);
        assert_eq!(lines[1], format!("position fen {}", test_positions::OPENING_1));
    }

    #[tokio::test]
    async fn test_malformed_reply() {
        let mut s = session("ucciok\nbestmove\n");
        assert!(matches!(
            s.best_operation(&Game::new(), 1).await,
            Err(ChessError::MalformedReply { .. })
        ));
    }

    #[tokio::test]
    async fn test_end_of_stream() {
        let mut s = session("");
        assert!(matches!(
            s.handshake().await,
            Err(ChessError::EngineClosed { expected: "ucciok" })
        ));

        let mut s = session("ucciok\ninfo depth 1\n");
        assert!(matches!(
            s.best_operation(&Game::new(), 1).await,
            Err(ChessError::EngineClosed { expected: "bestmove" })
        ));
    }

    #[tokio::test]
    async fn test_response_timeout() {
        let (client, _engine) = tokio::io::duplex(256);
        let (read_half, write_half) = tokio::io::split(client);
        let mut s = UcciSession::new(
            BufReader::new(read_half),
            write_half,
            Some(Duration::from_millis(50)),
        );
        assert!(matches!(
            s.handshake().await,
            Err(ChessError::EngineTimeout {
                expected: "ucciok",
                ..
            })
        ));
        assert!(!s.is_ready());
    }

    #[tokio::test]
    async fn test_crlf_lines() {
        let mut s = session("ucciok\r\nbestmove b0c2\r\n");
        let op = s.best_operation(&Game::new(), 1).await.unwrap();
        assert_eq!((op.from, op.to), (Location::new(1, 0), Location::new(2, 2)));
    }
}
