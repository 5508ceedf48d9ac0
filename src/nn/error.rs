/*
 * @Author       : 老董
 * @Date         : 2026-06-14
 * @Description  : 层模块的错误类型
 */

use thiserror::Error;

/// 层构建/前向传播的错误类型
///
/// 所有错误都是同步上报、不重试、不部分成功：
/// - 构建期：`InvalidGeometry`、`InvalidGroups`
/// - 前向期：`ShapeMismatch`（含分组在推断时不可整除的`InvalidGroups`）
/// - 后端：`BackendOperator`原样透传，不做任何恢复
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("参数`{param}`的几何配置无效：{message}")]
    InvalidGeometry {
        param: &'static str,
        message: String,
    },

    #[error("通道数{channels}无法被分组数{groups}整除")]
    InvalidGroups { channels: usize, groups: usize },

    #[error("形状不匹配：期望{expected:?}，得到{got:?}（{message}）")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    #[error("后端算子执行失败（参数`{param}`）：{message}")]
    BackendOperator { param: String, message: String },
}
