/*
 * 形状代数（Shape Algebra）：窗口算子的符号形状计算
 *
 * 本模块只做纯函数的形状推导，不碰任何数值数据：
 * - 正向（卷积/池化）与转置（反卷积）方向的逐轴输出长度公式；
 * - 权重/偏置张量的形状公式（含分组）；
 * - `DynamicShape`：允许某个维度暂时未知的形状表示，用于
 *   输入通道数尚未观测到的延迟初始化权重（显示为`?`）。
 *
 * # 公式
 * ```text
 * 正向:  out = floor|ceil((in + 2*pad - dilation*(kernel-1) - 1) / stride) + 1
 * 转置:  out = (in - 1)*stride - 2*pad + kernel + output_pad
 * 权重:  [C_out, C_in/G, K...]（正向） / [C_in, C_out/G, K...]（转置）
 * ```
 */

use super::geometry::Layout;
use super::LayerError;
use std::fmt;

/// 输出长度的取整模式（仅池化区分floor/ceil，卷积恒为floor）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// 向下取整（默认，等价于mxnet的"valid"约定）
    #[default]
    Floor,
    /// 向上取整（等价于mxnet的"full"约定，允许末尾不完整窗口）
    Ceil,
}

// ==================== DynamicShape ====================

/// 维度值：Some(n)表示固定值n，None表示未解析（待首次前向推断）
pub type Dim = Option<usize>;

/// 动态形状：恰有权重的输入通道维可以是None的形状表示
///
/// 与`Vec<usize>`的区别：
/// - `Vec<usize>`: 所有维度必须是确定的数值
/// - `DynamicShape`: 某些维度可以是None，表示"待定"
///
/// # 示例
/// ```
/// use only_gluon::nn::DynamicShape;
///
/// // in_channels未知的2D卷积核形状 [16, ?, 3, 3]
/// let w = DynamicShape::new(&[Some(16), None, Some(3), Some(3)]);
/// assert_eq!(w.to_string(), "[16, ?, 3, 3]");
/// assert!(w.has_dynamic_dims());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DynamicShape {
    dims: Vec<Dim>,
}

impl DynamicShape {
    /// 创建一个动态形状
    pub fn new(dims: &[Dim]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    /// 从固定形状创建（所有维度都是确定的）
    pub fn fixed(dims: &[usize]) -> Self {
        Self {
            dims: dims.iter().map(|&d| Some(d)).collect(),
        }
    }

    /// 获取维度数量
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// 获取指定维度的值（固定返回Some(n)，未解析返回None）
    pub fn dim(&self, index: usize) -> Dim {
        self.dims.get(index).copied().flatten()
    }

    /// 是否存在未解析的维度
    pub fn has_dynamic_dims(&self) -> bool {
        self.dims.iter().any(|d| d.is_none())
    }

    /// 检查与一个完全具体的形状是否兼容
    ///
    /// 规则：维度数量相同，且每个固定维度的值相等（None匹配任意值）。
    pub fn is_compatible_with(&self, concrete: &[usize]) -> bool {
        if self.dims.len() != concrete.len() {
            return false;
        }
        self.dims
            .iter()
            .zip(concrete.iter())
            .all(|(expected, &actual)| match expected {
                None => true,
                Some(n) => *n == actual,
            })
    }

    /// 转换为固定形状向量；存在未解析维度时返回None
    pub fn to_vec_fixed(&self) -> Option<Vec<usize>> {
        self.dims.iter().copied().collect()
    }

    /// 内部维度数组
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }
}

impl fmt::Display for DynamicShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .dims
            .iter()
            .map(|d| match d {
                Some(n) => n.to_string(),
                None => "?".to_string(),
            })
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl From<&[usize]> for DynamicShape {
    fn from(shape: &[usize]) -> Self {
        Self::fixed(shape)
    }
}

// ==================== 逐轴长度公式 ====================

/// 正向（卷积/池化）单个空间轴的输出长度
///
/// `out = floor|ceil((in + 2*pad - dilation*(kernel-1) - 1) / stride) + 1`
///
/// # 错误
/// 膨胀后的窗口大于补零后的输入时，该轴没有任何合法窗口位置，
/// 返回`ShapeMismatch`。
pub fn window_extent(
    input: usize,
    kernel: usize,
    stride: usize,
    pad: usize,
    dilation: usize,
    rounding: Rounding,
) -> Result<usize, LayerError> {
    let padded = input + 2 * pad;
    let effective = dilation * (kernel - 1) + 1;
    if padded < effective {
        return Err(LayerError::ShapeMismatch {
            expected: vec![effective],
            got: vec![padded],
            message: format!(
                "输入长度{input}（补零后{padded}）容不下膨胀后大小为{effective}的窗口"
            ),
        });
    }
    let numer = padded - effective;
    let quotient = match rounding {
        Rounding::Floor => numer / stride,
        Rounding::Ceil => numer.div_ceil(stride),
    };
    Ok(quotient + 1)
}

/// 转置（反卷积）单个空间轴的输出长度
///
/// `out = (in - 1)*stride - 2*pad + kernel + output_pad`
///
/// # 错误
/// 输入长度为0、或补零吃掉了整个输出（结果不足1）时返回`ShapeMismatch`。
pub fn transposed_extent(
    input: usize,
    kernel: usize,
    stride: usize,
    pad: usize,
    output_pad: usize,
) -> Result<usize, LayerError> {
    if input == 0 {
        return Err(LayerError::ShapeMismatch {
            expected: vec![1],
            got: vec![0],
            message: "转置卷积的输入空间轴长度至少为1".to_string(),
        });
    }
    let gross = (input - 1) * stride + kernel + output_pad;
    let trim = 2 * pad;
    if gross <= trim {
        return Err(LayerError::ShapeMismatch {
            expected: vec![trim + 1],
            got: vec![gross],
            message: format!("padding={pad}过大，转置输出长度不足1"),
        });
    }
    Ok(gross - trim)
}

// ==================== 参数形状公式 ====================

/// 卷积族权重张量的（可能含未解析维度的）形状
///
/// - 正向：`[C_out, C_in/G, K...]`
/// - 转置：`[C_in, C_out/G, K...]`（输入/输出通道角色互换）
///
/// # 错误
/// `channels`或已知的`in_channels`不能被`groups`整除时返回`InvalidGroups`。
pub fn conv_weight_shape(
    channels: usize,
    in_channels: Dim,
    groups: usize,
    kernel: &[usize],
    transposed: bool,
) -> Result<DynamicShape, LayerError> {
    if channels % groups != 0 {
        return Err(LayerError::InvalidGroups { channels, groups });
    }
    if let Some(c_in) = in_channels {
        if c_in % groups != 0 {
            return Err(LayerError::InvalidGroups {
                channels: c_in,
                groups,
            });
        }
    }

    let mut dims: Vec<Dim> = if transposed {
        vec![in_channels, Some(channels / groups)]
    } else {
        vec![Some(channels), in_channels.map(|c| c / groups)]
    };
    dims.extend(kernel.iter().map(|&k| Some(k)));
    Ok(DynamicShape::new(&dims))
}

/// 偏置张量形状：正向与转置同为`[C_out]`
pub fn bias_shape(channels: usize) -> DynamicShape {
    DynamicShape::fixed(&[channels])
}

// ==================== 整形状构建 ====================

/// 正向卷积的完整输出形状（batch保持、channel替换、空间轴套公式）
pub fn conv_output_shape(
    input: &[usize],
    layout: &Layout,
    channels: usize,
    kernel: &[usize],
    stride: &[usize],
    pad: &[usize],
    dilation: &[usize],
) -> Result<Vec<usize>, LayerError> {
    let mut out = input.to_vec();
    out[layout.channel_axis()] = channels;
    for (i, &axis) in layout.spatial_axes().iter().enumerate() {
        out[axis] = window_extent(
            input[axis],
            kernel[i],
            stride[i],
            pad[i],
            dilation[i],
            Rounding::Floor,
        )?;
    }
    Ok(out)
}

/// 转置卷积的完整输出形状
pub fn transposed_output_shape(
    input: &[usize],
    layout: &Layout,
    channels: usize,
    kernel: &[usize],
    stride: &[usize],
    pad: &[usize],
    output_pad: &[usize],
) -> Result<Vec<usize>, LayerError> {
    let mut out = input.to_vec();
    out[layout.channel_axis()] = channels;
    for (i, &axis) in layout.spatial_axes().iter().enumerate() {
        out[axis] = transposed_extent(input[axis], kernel[i], stride[i], pad[i], output_pad[i])?;
    }
    Ok(out)
}

/// 池化的完整输出形状
///
/// `global`为真时等价于kernel = 整个空间轴：所有空间轴输出强制为1，
/// 配置的pool_size/stride/padding一概不参与。
pub fn pool_output_shape(
    input: &[usize],
    layout: &Layout,
    kernel: &[usize],
    stride: &[usize],
    pad: &[usize],
    rounding: Rounding,
    global: bool,
) -> Result<Vec<usize>, LayerError> {
    let mut out = input.to_vec();
    for (i, &axis) in layout.spatial_axes().iter().enumerate() {
        out[axis] = if global {
            1
        } else {
            window_extent(input[axis], kernel[i], stride[i], pad[i], 1, rounding)?
        };
    }
    Ok(out)
}
