//! 命令值类型
//!
//! 每个子命令都有确定的默认值（零位置、零速度、零力矩、单位位姿），
//! 因此即使某个周期没有计算命令，默认构造的命令也是合法且可记录的。

use crate::state::JOINT_COUNT;

/// 4x4 单位齐次变换（列主序）
pub const IDENTITY_TRANSFORM: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// 期望关节位置 q_d（rad）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointPositions {
    pub q: [f64; JOINT_COUNT],
}

impl JointPositions {
    pub fn new(q: [f64; JOINT_COUNT]) -> Self {
        Self { q }
    }
}

/// 期望关节速度 dq_d（rad/s）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointVelocities {
    pub dq: [f64; JOINT_COUNT],
}

impl JointVelocities {
    pub fn new(dq: [f64; JOINT_COUNT]) -> Self {
        Self { dq }
    }
}

/// 期望末端位姿 O_T_EE_d（4x4 齐次变换，列主序）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianPose {
    pub o_t_ee: [f64; 16],
}

impl CartesianPose {
    pub fn new(o_t_ee: [f64; 16]) -> Self {
        Self { o_t_ee }
    }
}

impl Default for CartesianPose {
    fn default() -> Self {
        Self {
            o_t_ee: IDENTITY_TRANSFORM,
        }
    }
}

/// 期望末端速度 O_dP_EE（[vx, vy, vz, wx, wy, wz]）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CartesianVelocities {
    pub o_dp_ee: [f64; 6],
}

impl CartesianVelocities {
    pub fn new(o_dp_ee: [f64; 6]) -> Self {
        Self { o_dp_ee }
    }
}

/// 期望关节力矩 tau_J_d（Nm）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Torques {
    pub tau_j: [f64; JOINT_COUNT],
}

impl Torques {
    pub fn new(tau_j: [f64; JOINT_COUNT]) -> Self {
        Self { tau_j }
    }
}
