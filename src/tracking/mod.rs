// ==========================================
// 地铁列车编组诱导系统 - 列车位置追踪模拟
// ==========================================
// 职责: 后台任务按固定间隔推进列车位置, 通过 mpsc 通道发送更新
// 红线: 模拟任务不触碰共享状态, 位置表只由 TrackingBoard 持有者修改
// 停止: watch 信号
// ==========================================

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// 模拟步长下限（tokio interval 不接受 0）
pub const MIN_TICK: Duration = Duration::from_millis(1);

/// 线路车站（阿卢瓦 → 佩塔）
pub const STATIONS: &[&str] = &[
    "Aluva",
    "Pulinchodu",
    "Companypady",
    "Ambattukavu",
    "Muttom",
    "Kalamassery",
    "Cochin University",
    "Pathadipalam",
    "Edapally",
    "Changampuzha Park",
    "Palarivattom",
    "JLN Stadium",
    "Kaloor",
    "Town Hall",
    "M.G. Road",
    "Maharaja's College",
    "Ernakulam South",
    "Kadavanthra",
    "Elamkulam",
    "Vyttila",
    "Thaikoodam",
    "Petta",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,   // 阿卢瓦 → 佩塔
    Down, // 佩塔 → 阿卢瓦
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainPosition {
    pub trainset_id: String,
    pub station_index: usize,
    pub station_name: String,
    pub direction: Direction,
    /// 驶向下一站的进度 [0, 1)
    pub progress: f64,
    pub speed_kmh: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub sequence: u64,
    pub position: TrainPosition,
}

// ==========================================
// TrackingSimulator - 位置模拟器
// ==========================================
pub struct TrackingSimulator {
    positions: Vec<TrainPosition>,
    rng: StdRng,
    sequence: u64,
}

impl TrackingSimulator {
    /// 将列车均匀分布在线路上, 方向交替
    pub fn new(trainset_ids: &[String], seed: u64, now: DateTime<Utc>) -> Self {
        let spacing = (STATIONS.len() / trainset_ids.len().max(1)).max(1);
        let positions = trainset_ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let station_index = (i * spacing) % STATIONS.len();
                TrainPosition {
                    trainset_id: id.clone(),
                    station_index,
                    station_name: STATIONS[station_index].to_string(),
                    direction: if i % 2 == 0 { Direction::Up } else { Direction::Down },
                    progress: 0.0,
                    speed_kmh: 0.0,
                    updated_at: now,
                }
            })
            .collect();

        Self {
            positions,
            rng: StdRng::seed_from_u64(seed),
            sequence: 0,
        }
    }

    pub fn train_count(&self) -> usize {
        self.positions.len()
    }

    /// 推进一个时间步, 返回所有列车的新位置
    pub fn step(&mut self, now: DateTime<Utc>) -> Vec<PositionUpdate> {
        let last = STATIONS.len() - 1;
        let mut updates = Vec::with_capacity(self.positions.len());

        for pos in self.positions.iter_mut() {
            pos.progress += self.rng.gen_range(0.2..0.5);
            pos.speed_kmh = self.rng.gen_range(30.0..80.0);

            while pos.progress >= 1.0 {
                pos.progress -= 1.0;
                match pos.direction {
                    Direction::Up if pos.station_index >= last => {
                        pos.direction = Direction::Down;
                        pos.station_index = last - 1;
                    }
                    Direction::Up => pos.station_index += 1,
                    Direction::Down if pos.station_index == 0 => {
                        pos.direction = Direction::Up;
                        pos.station_index = 1;
                    }
                    Direction::Down => pos.station_index -= 1,
                }
            }
            // 终点站到站即折返
            if pos.station_index == last {
                pos.direction = Direction::Down;
            } else if pos.station_index == 0 {
                pos.direction = Direction::Up;
            }

            pos.station_name = STATIONS[pos.station_index].to_string();
            pos.updated_at = now;

            self.sequence += 1;
            updates.push(PositionUpdate {
                sequence: self.sequence,
                position: pos.clone(),
            });
        }
        updates
    }

    /// 启动后台模拟任务
    ///
    /// # 返回
    /// - Receiver: 位置更新通道（交给 TrackingBoard 消费）
    /// - TrackingHandle: 停止信号与任务句柄
    ///
    /// # 说明
    /// - interval 低于 MIN_TICK 时按 MIN_TICK 运行
    /// - 通道满时丢弃本拍更新, 不阻塞停止信号
    /// - 接收端关闭时任务自行退出
    pub fn spawn(
        mut self,
        interval: Duration,
        capacity: usize,
    ) -> (mpsc::Receiver<PositionUpdate>, TrackingHandle) {
        let interval = interval.max(MIN_TICK);
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            info!(trains = self.train_count(), interval_ms = interval.as_millis() as u64, "位置模拟任务启动");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for update in self.step(Utc::now()) {
                            match tx.try_send(update) {
                                Ok(()) => {}
                                // 通道满: 丢弃本条
                                Err(TrySendError::Full(_)) => {}
                                Err(TrySendError::Closed(_)) => {
                                    debug!("位置接收端已关闭, 模拟任务退出");
                                    return;
                                }
                            }
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("位置模拟任务停止");
        });

        (
            rx,
            TrackingHandle {
                shutdown: shutdown_tx,
                join,
            },
        )
    }
}

// ==========================================
// TrackingHandle - 后台任务句柄
// ==========================================
pub struct TrackingHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TrackingHandle {
    /// 发送停止信号并等待任务结束
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            debug!(error = %e, "位置模拟任务异常结束");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

// ==========================================
// TrackingBoard - 位置表
// ==========================================
#[derive(Debug, Default)]
pub struct TrackingBoard {
    positions: BTreeMap<String, TrainPosition>,
    last_sequence: u64,
}

impl TrackingBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用一条更新（乱序的旧更新忽略）
    pub fn apply(&mut self, update: PositionUpdate) -> bool {
        if let Some(existing) = self.positions.get(&update.position.trainset_id) {
            if existing.updated_at > update.position.updated_at {
                return false;
            }
        }
        self.last_sequence = self.last_sequence.max(update.sequence);
        self.positions
            .insert(update.position.trainset_id.clone(), update.position);
        true
    }

    /// 非阻塞地取出通道中所有待处理更新
    pub fn drain(&mut self, receiver: &mut mpsc::Receiver<PositionUpdate>) -> usize {
        self.drain_until_idle(receiver).0
    }

    /// 同 drain, 额外返回发送端是否已全部关闭（模拟任务已结束）
    pub fn drain_until_idle(&mut self, receiver: &mut mpsc::Receiver<PositionUpdate>) -> (usize, bool) {
        let mut applied = 0;
        loop {
            match receiver.try_recv() {
                Ok(update) => {
                    if self.apply(update) {
                        applied += 1;
                    }
                }
                Err(TryRecvError::Empty) => return (applied, false),
                Err(TryRecvError::Disconnected) => return (applied, true),
            }
        }
    }

    pub fn position(&self, trainset_id: &str) -> Option<&TrainPosition> {
        self.positions.get(trainset_id)
    }

    pub fn positions(&self) -> impl Iterator<Item = &TrainPosition> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }
}
