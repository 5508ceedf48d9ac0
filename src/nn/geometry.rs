/*
 * @Author       : 老董
 * @Date         : 2026-06-15
 * @Description  : 几何归一化器（Geometry Normalizer）
 *
 * 两个职责：
 * 1. `Geometry`：把标量或逐轴元组展开成长度等于空间秩的向量（标量广播），
 *    长度不符时报`InvalidGeometry`并指明是哪个参数；
 * 2. `Layout`：解析轴排列字符串（如"NCHW"），定位batch/channel/空间轴。
 *
 * 两者都是纯函数，无副作用。
 */

use super::LayerError;
use std::fmt;

// ==================== Geometry ====================

/// 几何参数：标量或逐轴序列
///
/// 对应gluon风格的`kernel_size=3`与`kernel_size=(3, 5)`两种写法：
/// 标量会被广播到每个空间轴。
///
/// # 示例
/// ```
/// use only_gluon::nn::Geometry;
///
/// let g: Geometry = 3.into();
/// assert_eq!(g.expand("kernel_size", 2).unwrap(), vec![3, 3]);
///
/// let g: Geometry = (2, 4).into();
/// assert_eq!(g.expand("kernel_size", 2).unwrap(), vec![2, 4]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Geometry {
    /// 标量，广播到每个空间轴
    Scalar(usize),
    /// 逐轴给定，长度必须等于空间秩
    Axes(Vec<usize>),
}

impl Geometry {
    /// 展开为长度等于`rank`的逐轴向量
    ///
    /// # 错误
    /// 逐轴序列长度与`rank`不符时返回`InvalidGeometry`，错误中带上
    /// 参数名`param`，方便定位是kernel_size/stride/padding中的哪一个。
    pub fn expand(&self, param: &'static str, rank: usize) -> Result<Vec<usize>, LayerError> {
        match self {
            Self::Scalar(v) => Ok(vec![*v; rank]),
            Self::Axes(axes) => {
                if axes.len() == rank {
                    Ok(axes.clone())
                } else {
                    Err(LayerError::InvalidGeometry {
                        param,
                        message: format!("期望{}个轴向值，得到{}个", rank, axes.len()),
                    })
                }
            }
        }
    }
}

impl From<usize> for Geometry {
    fn from(v: usize) -> Self {
        Self::Scalar(v)
    }
}

impl From<(usize, usize)> for Geometry {
    fn from(v: (usize, usize)) -> Self {
        Self::Axes(vec![v.0, v.1])
    }
}

impl From<(usize, usize, usize)> for Geometry {
    fn from(v: (usize, usize, usize)) -> Self {
        Self::Axes(vec![v.0, v.1, v.2])
    }
}

impl From<Vec<usize>> for Geometry {
    fn from(v: Vec<usize>) -> Self {
        Self::Axes(v)
    }
}

impl From<&[usize]> for Geometry {
    fn from(v: &[usize]) -> Self {
        Self::Axes(v.to_vec())
    }
}

// ==================== Layout ====================

/// 轴排列：描述张量各轴的语义（batch/channel/空间）及顺序
///
/// 排列字符串的约定与mxnet一致：'N'是batch轴，'C'是channel轴，
/// 空间轴按秩取'W'（1D）、'H''W'（2D）、'D''H''W'（3D），
/// 空间字母之间保持D、H、W的相对顺序。
///
/// # 示例
/// ```
/// use only_gluon::nn::Layout;
///
/// let layout = Layout::parse("NCHW", 2).unwrap();
/// assert_eq!(layout.batch_axis(), 0);
/// assert_eq!(layout.channel_axis(), 1);
/// assert_eq!(layout.spatial_axes(), &[2, 3]);
///
/// let layout = Layout::parse("NHWC", 2).unwrap();
/// assert_eq!(layout.channel_axis(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    tag: String,
    batch_axis: usize,
    channel_axis: usize,
    spatial_axes: Vec<usize>,
}

/// 各秩的空间轴字母（相对顺序固定）
const SPATIAL_LETTERS: [&str; 3] = ["W", "HW", "DHW"];

impl Layout {
    /// 解析排列字符串并校验其与空间秩`rank`匹配
    ///
    /// # 错误
    /// 长度不等于`rank + 2`、缺少/重复N或C、空间字母非法或乱序时，
    /// 返回`InvalidGeometry`（参数名为"layout"）。
    pub fn parse(tag: &str, rank: usize) -> Result<Self, LayerError> {
        let invalid = |message: String| LayerError::InvalidGeometry {
            param: "layout",
            message,
        };

        if !(1..=3).contains(&rank) {
            return Err(invalid(format!("空间秩必须是1/2/3，得到{rank}")));
        }
        if tag.len() != rank + 2 {
            return Err(invalid(format!(
                "排列`{tag}`的长度应为{}（batch+channel+{rank}个空间轴）",
                rank + 2
            )));
        }

        let find_unique = |letter: char| -> Result<usize, LayerError> {
            let mut it = tag.chars().enumerate().filter(|(_, c)| *c == letter);
            let pos = it
                .next()
                .ok_or_else(|| invalid(format!("排列`{tag}`缺少`{letter}`轴")))?
                .0;
            if it.next().is_some() {
                return Err(invalid(format!("排列`{tag}`中`{letter}`轴出现多次")));
            }
            Ok(pos)
        };

        let batch_axis = find_unique('N')?;
        let channel_axis = find_unique('C')?;

        let letters = SPATIAL_LETTERS[rank - 1];
        let mut spatial_axes = Vec::with_capacity(rank);
        for letter in letters.chars() {
            spatial_axes.push(find_unique(letter)?);
        }
        // 空间字母必须保持D、H、W的相对顺序（如NHWC合法，NWHC非法）
        if spatial_axes.windows(2).any(|w| w[0] > w[1]) {
            return Err(invalid(format!("排列`{tag}`的空间轴顺序非法")));
        }

        Ok(Self {
            tag: tag.to_string(),
            batch_axis,
            channel_axis,
            spatial_axes,
        })
    }

    /// 原始排列字符串
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// batch轴下标
    pub const fn batch_axis(&self) -> usize {
        self.batch_axis
    }

    /// channel轴下标
    pub const fn channel_axis(&self) -> usize {
        self.channel_axis
    }

    /// 空间轴下标（按D、H、W的语义顺序）
    pub fn spatial_axes(&self) -> &[usize] {
        &self.spatial_axes
    }

    /// 空间秩
    pub fn rank(&self) -> usize {
        self.spatial_axes.len()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}
