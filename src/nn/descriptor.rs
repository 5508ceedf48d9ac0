/*
 * @Author       : 老董
 * @Date         : 2026-06-19
 * @Description  : 层描述符（Layer Descriptor）
 *                 统一的中间表示（IR），用于序列化、调试输出
 */

use super::activation::Activation;
use super::backend::PoolMode;
use serde::{Deserialize, Serialize};

/// 层的可序列化描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 变体名（如"Conv2D"、"MaxPool1D"）
    pub name: String,
    /// 算子描述（含类型特定几何参数）
    pub op: OpDescriptor,
}

/// 算子类型描述
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OpDescriptor {
    Conv {
        channels: usize,
        /// 已解析（或显式给定）的输入通道数；延迟待推断时为None
        in_channels: Option<usize>,
        kernel: Vec<usize>,
        stride: Vec<usize>,
        padding: Vec<usize>,
        dilation: Vec<usize>,
        groups: usize,
        layout: String,
        use_bias: bool,
        activation: Option<Activation>,
    },
    ConvTranspose {
        channels: usize,
        in_channels: Option<usize>,
        kernel: Vec<usize>,
        stride: Vec<usize>,
        padding: Vec<usize>,
        dilation: Vec<usize>,
        output_padding: Vec<usize>,
        groups: usize,
        layout: String,
        use_bias: bool,
        activation: Option<Activation>,
    },
    Pool {
        mode: PoolMode,
        kernel: Vec<usize>,
        stride: Vec<usize>,
        padding: Vec<usize>,
        ceil_mode: bool,
        global: bool,
        layout: String,
    },
}

impl LayerDescriptor {
    /// 创建新的层描述符
    pub fn new(name: &str, op: OpDescriptor) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            op,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
