/*
 * @Author       : 老董
 * @Date         : 2026-06-18
 * @Description  : 后端算子接口 - 数值内核的外部协作边界
 *
 * 层把已解析的权重/偏置和原始几何参数打包成请求，同步交给后端执行；
 * 后端要么返回输出张量，要么报错（原样透传为`BackendOperator`）。
 * 本crate不实现任何卷积/池化算术。
 */

use super::geometry::Layout;
use super::shape::Rounding;
use super::LayerError;
use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// 池化模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolMode {
    Max,
    Avg,
}

/// 卷积族算子调用的类型化信封
///
/// 几何字段全部已按空间秩展开（长度 = rank），层在构建期保证这一点。
pub struct ConvRequest<'a> {
    /// 输入张量，rank = 空间秩 + 2
    pub input: &'a Tensor,
    /// 已解析的权重
    pub weight: &'a Tensor,
    /// 已解析的偏置（use_bias=false时为None）
    pub bias: Option<&'a Tensor>,
    pub kernel: &'a [usize],
    pub stride: &'a [usize],
    pub padding: &'a [usize],
    pub dilation: &'a [usize],
    /// 仅转置方向有意义
    pub output_padding: &'a [usize],
    pub groups: usize,
    pub layout: &'a Layout,
    /// true表示转置卷积（反卷积）
    pub transposed: bool,
}

/// 池化算子调用的类型化信封
pub struct PoolRequest<'a> {
    /// 输入张量，rank = 空间秩 + 2
    pub input: &'a Tensor,
    pub mode: PoolMode,
    pub kernel: &'a [usize],
    pub stride: &'a [usize],
    pub padding: &'a [usize],
    pub rounding: Rounding,
    /// true表示全局池化（窗口=整个空间轴，几何参数不参与）
    pub global: bool,
    pub layout: &'a Layout,
}

/// 后端算子：纯同步的张量运算服务
///
/// 错误约定：失败时返回`LayerError::BackendOperator`并带上出错的
/// 参数名；层不重试、不恢复，原样上报给`forward`的调用者。
pub trait TensorOps {
    /// 执行（转置）卷积
    fn convolution(&self, req: &ConvRequest<'_>) -> Result<Tensor, LayerError>;

    /// 执行池化
    fn pooling(&self, req: &PoolRequest<'_>) -> Result<Tensor, LayerError>;
}
