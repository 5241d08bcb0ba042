//! # CSV 诊断输出
//!
//! 把日志格式化为 CSV 文本：第一行是表头，之后每条记录一行。
//!
//! - 空日志返回空字符串（不输出表头）
//! - 浮点数使用 Rust `Display` 的最短往返表示，所有行使用同一算法
//! - 字段以单个逗号分隔，每行以 `\n` 结尾
//!
//! 格式化是纯函数：相同输入总是得到逐字节相同的输出。

use crate::log::{Record, RobotCommand};
use anyhow::{Context, Result};
use armlink_protocol::RobotState;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// 列名（展开后的字段名，顺序固定）
///
/// ```text
/// state.sequence_number,state.o_t_ee[0],...,cmd.q_d[0],...,cmd.tau_j_d[6]
/// ```
pub fn csv_header() -> Vec<String> {
    let state = RobotState::default();
    let command = RobotCommand::default();

    let mut columns = vec!["state.sequence_number".to_string()];
    for (name, values) in state.arrays() {
        columns.extend((0..values.len()).map(|i| format!("state.{}[{}]", name, i)));
    }
    for (name, values) in command.arrays() {
        columns.extend((0..values.len()).map(|i| format!("cmd.{}[{}]", name, i)));
    }
    columns
}

fn csv_row(record: &Record) -> String {
    let mut fields = vec![record.state.sequence_number.to_string()];
    for (_, values) in record.state.arrays() {
        fields.extend(values.iter().map(f64::to_string));
    }
    for (_, values) in record.command.arrays() {
        fields.extend(values.iter().map(f64::to_string));
    }
    fields.join(",")
}

/// 把日志格式化为 CSV 文本
///
/// # 参数
/// - `log`: 按时间顺序排列的记录（通常来自 [`ControlError`](crate::ControlError)）
///
/// # 返回
/// CSV 文本；日志为空时返回空字符串
pub fn log_to_csv(log: &[Record]) -> String {
    if log.is_empty() {
        return String::new();
    }

    let mut out = csv_header().join(",");
    out.push('\n');
    for record in log {
        out.push_str(&csv_row(record));
        out.push('\n');
    }
    out
}

/// 把日志以 CSV 格式写入文件
pub fn write_csv<P: AsRef<Path>>(path: P, log: &[Record]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("创建 CSV 文件失败: {}", path.display()))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(log_to_csv(log).as_bytes())
        .context("写入 CSV 数据失败")?;
    writer.flush().context("刷新缓冲区失败")?;

    Ok(())
}
