//! # 命令/状态记录
//!
//! 每个控制周期产生一条 [`Record`]：收到的状态 + 随后发出的命令。

use armlink_protocol::{
    CartesianPose, CartesianVelocities, JointPositions, JointVelocities, RobotState, Torques,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// 发送给机器人的命令（仅用于记录）
///
/// 默认值：零关节位置、零速度、单位位姿、零力矩。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotCommand {
    /// 发送的 q_d
    pub joint_positions: JointPositions,
    /// 发送的 dq_d
    pub joint_velocities: JointVelocities,
    /// 发送的 O_T_EE_d
    pub cartesian_pose: CartesianPose,
    /// 发送的 O_dP_EE_d
    pub cartesian_velocities: CartesianVelocities,
    /// 发送的 tau_J_d
    pub torques: Torques,
}

impl RobotCommand {
    /// 按固定顺序列出所有子命令（名称, 值），CSV 表头依赖此顺序
    pub fn arrays(&self) -> [(&'static str, &[f64]); 5] {
        [
            ("q_d", &self.joint_positions.q),
            ("dq_d", &self.joint_velocities.dq),
            ("o_t_ee_d", &self.cartesian_pose.o_t_ee),
            ("o_dp_ee_d", &self.cartesian_velocities.o_dp_ee),
            ("tau_j_d", &self.torques.tau_j),
        ]
    }
}

/// 日志中的一行：收到的状态与之后发出的命令
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    /// 收到的状态
    pub state: RobotState,
    /// 收到该状态后发出的命令
    pub command: RobotCommand,
}

impl Record {
    pub fn new(state: RobotState, command: RobotCommand) -> Self {
        Self { state, command }
    }
}

/// 固定容量的环形日志
///
/// 只保留最近 `capacity` 条记录；容量为 0 时不记录任何内容。
#[derive(Debug, Clone)]
pub struct Logger {
    records: VecDeque<Record>,
    capacity: usize,
}

impl Logger {
    /// 默认保留的记录条数
    pub const DEFAULT_CAPACITY: usize = 50;

    /// 创建最多保留 `capacity` 条记录的日志
    ///
    /// 缓冲区按需增长，不会预先分配整个容量。
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY)),
            capacity,
        }
    }

    /// 追加一条记录，满时丢弃最旧的一条
    pub fn log(&mut self, state: &RobotState, command: RobotCommand) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(Record::new(state.clone(), command));
    }

    /// 取出全部记录（从旧到新），并清空缓冲
    pub fn flush(&mut self) -> Vec<Record> {
        self.records.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// 控制循环中止时的错误，携带中止前的日志
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct ControlError {
    pub message: String,
    /// 中止前最近的记录（从旧到新）
    pub log: Vec<Record>,
}

impl ControlError {
    pub fn new(message: impl Into<String>, log: Vec<Record>) -> Self {
        Self {
            message: message.into(),
            log,
        }
    }

    /// 用 logger 中现有的记录构造（会清空 logger）
    pub fn with_logger(message: impl Into<String>, logger: &mut Logger) -> Self {
        Self::new(message, logger.flush())
    }

    /// 日志的 CSV 文本（空日志返回空字符串）
    pub fn log_csv(&self) -> String {
        crate::csv::log_to_csv(&self.log)
    }
}
