//! `RobotState` 快照及其编解码
//!
//! 负载布局（小端）：
//!
//! ```text
//! [sequence_number: u64]
//! [o_t_ee: 16 x f64][elbow: 2 x f64][tau_j: 7 x f64][dtau_j: 7 x f64]
//! [q: 7 x f64][dq: 7 x f64][q_d: 7 x f64]
//! [o_f_ext_hat_k: 6 x f64][k_f_ext_hat_k: 6 x f64]
//! ```

use crate::control::IDENTITY_TRANSFORM;
use crate::message::{HEADER_LEN, MessageHeader, MessageType, check_payload_len};
use crate::ProtocolError;
use bytes::{Buf, BufMut};

/// 关节数量
pub const JOINT_COUNT: usize = 7;

/// 状态中 f64 值的总数
const ROBOT_STATE_F64_COUNT: usize = 16 + 2 + JOINT_COUNT * 5 + 6 + 6;

/// `RobotState` 消息负载长度（字节）
pub const ROBOT_STATE_PAYLOAD_LEN: usize = 8 + ROBOT_STATE_F64_COUNT * 8;

/// 一个采样时刻的机器人状态快照
///
/// 由控制器每个控制周期推送一次。解码后不可变，直到被下一次完整、
/// 校验通过的快照整体替换。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotState {
    /// 控制器分配的消息序号，连续递增
    pub sequence_number: u64,
    /// 末端在基坐标系下的位姿（4x4 齐次变换，列主序）
    pub o_t_ee: [f64; 16],
    /// 肘部构型
    pub elbow: [f64; 2],
    /// 测量关节力矩（Nm）
    pub tau_j: [f64; JOINT_COUNT],
    /// 测量关节力矩导数（Nm/s）
    pub dtau_j: [f64; JOINT_COUNT],
    /// 测量关节位置（rad）
    pub q: [f64; JOINT_COUNT],
    /// 测量关节速度（rad/s）
    pub dq: [f64; JOINT_COUNT],
    /// 期望关节位置（rad）
    pub q_d: [f64; JOINT_COUNT],
    /// 基坐标系下估计的外部力旋量
    pub o_f_ext_hat_k: [f64; 6],
    /// 刚度坐标系下估计的外部力旋量
    pub k_f_ext_hat_k: [f64; 6],
}

impl Default for RobotState {
    fn default() -> Self {
        Self {
            sequence_number: 0,
            o_t_ee: IDENTITY_TRANSFORM,
            elbow: [0.0; 2],
            tau_j: [0.0; JOINT_COUNT],
            dtau_j: [0.0; JOINT_COUNT],
            q: [0.0; JOINT_COUNT],
            dq: [0.0; JOINT_COUNT],
            q_d: [0.0; JOINT_COUNT],
            o_f_ext_hat_k: [0.0; 6],
            k_f_ext_hat_k: [0.0; 6],
        }
    }
}

impl RobotState {
    /// 按线上顺序列出所有浮点数组字段（名称, 值）
    ///
    /// 编解码和 CSV 表头都依赖这个顺序。
    pub fn arrays(&self) -> [(&'static str, &[f64]); 9] {
        [
            ("o_t_ee", &self.o_t_ee),
            ("elbow", &self.elbow),
            ("tau_j", &self.tau_j),
            ("dtau_j", &self.dtau_j),
            ("q", &self.q),
            ("dq", &self.dq),
            ("q_d", &self.q_d),
            ("o_f_ext_hat_k", &self.o_f_ext_hat_k),
            ("k_f_ext_hat_k", &self.k_f_ext_hat_k),
        ]
    }

    fn arrays_mut(&mut self) -> [&mut [f64]; 9] {
        [
            &mut self.o_t_ee,
            &mut self.elbow,
            &mut self.tau_j,
            &mut self.dtau_j,
            &mut self.q,
            &mut self.dq,
            &mut self.q_d,
            &mut self.o_f_ext_hat_k,
            &mut self.k_f_ext_hat_k,
        ]
    }

    /// 检查快照内部一致性
    ///
    /// - 所有浮点数有限（无 NaN/Inf）
    /// - `o_t_ee` 是齐次变换：最后一行为 `[0, 0, 0, 1]`（列主序下标 3, 7, 11, 15）
    pub fn validate(&self) -> Result<(), ProtocolError> {
        for (name, values) in self.arrays() {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(ProtocolError::InconsistentState(format!(
                    "non-finite value in {}[{}]",
                    name, i
                )));
            }
        }

        let m = &self.o_t_ee;
        if m[3] != 0.0 || m[7] != 0.0 || m[11] != 0.0 || m[15] != 1.0 {
            return Err(ProtocolError::InconsistentState(
                "o_t_ee is not a homogeneous transform".to_string(),
            ));
        }

        Ok(())
    }

    /// 从负载解码并校验
    ///
    /// 只有在解码和校验全部成功时才返回快照，调用方永远拿不到半成品。
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        check_payload_len(MessageType::RobotState, payload)?;

        let mut buf = payload;
        let mut state = RobotState {
            sequence_number: buf.get_u64_le(),
            ..Default::default()
        };
        for values in state.arrays_mut() {
            for v in values.iter_mut() {
                *v = buf.get_f64_le();
            }
        }

        state.validate()?;
        Ok(state)
    }

    /// 编码为完整消息（消息头 + 负载）
    ///
    /// 客户端本身只解码状态；编码用于控制器模拟与测试。
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + ROBOT_STATE_PAYLOAD_LEN);
        MessageHeader::new(MessageType::RobotState).encode(&mut buf);
        buf.put_u64_le(self.sequence_number);
        for (_, values) in self.arrays() {
            for v in values {
                buf.put_f64_le(*v);
            }
        }
        buf
    }
}
