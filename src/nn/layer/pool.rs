/*
 * @Author       : 老董
 * @Date         : 2026-06-22
 * @Description  : 池化族门面（最大/平均 × 普通/全局 × 1D/2D/3D）
 *
 * 池化层没有可学习参数，纯粹是形状校验 + 后端委托。
 * stride缺省时取pool_size（与gluon一致）。
 *
 * 输出尺寸计算（逐空间轴）：
 * out = floor|ceil((in + 2*pad - pool_size) / stride) + 1
 * 全局池化：所有空间轴输出恒为1，配置的几何参数不参与。
 */

use super::variant::{self, Variant};
use super::ensure_positive;
use crate::nn::backend::{PoolMode, PoolRequest, TensorOps};
use crate::nn::descriptor::{LayerDescriptor, OpDescriptor};
use crate::nn::display::format_axes;
use crate::nn::geometry::{Geometry, Layout};
use crate::nn::param::ParameterSlot;
use crate::nn::shape::{pool_output_shape, Rounding};
use crate::nn::{LayerError, Module};
use crate::tensor::Tensor;
use std::fmt;

/// 池化层的构建配置
///
/// # 示例
/// ```
/// use only_gluon::nn::{Pool, PoolSpec};
///
/// // stride缺省 = pool_size
/// let pool = Pool::max_pool2d(PoolSpec { pool_size: 2.into(), ..Default::default() }).unwrap();
/// assert_eq!(pool.stride(), &[2, 2]);
/// ```
pub struct PoolSpec {
    /// 池化窗口大小
    pub pool_size: Geometry,
    /// 步长；None时取pool_size
    pub stride: Option<Geometry>,
    /// 填充
    pub padding: Geometry,
    /// true时输出尺寸用ceil代替floor（允许末尾不完整窗口）
    pub ceil_mode: bool,
    /// 轴排列；None取变体默认（NCW/NCHW/NCDHW）
    pub layout: Option<String>,
}

impl Default for PoolSpec {
    fn default() -> Self {
        Self {
            pool_size: Geometry::Scalar(2),
            stride: None,
            padding: Geometry::Scalar(0),
            ceil_mode: false,
            layout: None,
        }
    }
}

/// 池化门面：一个通用结构覆盖最大/平均、普通/全局的全部变体
pub struct Pool {
    variant: &'static Variant,
    mode: PoolMode,
    kernel: Vec<usize>,
    stride: Vec<usize>,
    padding: Vec<usize>,
    rounding: Rounding,
    global: bool,
    layout: Layout,
}

impl Pool {
    /// 创建1D最大池化层
    pub fn max_pool1d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::MAX_POOL1D, PoolMode::Max, false, spec)
    }

    /// 创建2D最大池化层
    pub fn max_pool2d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::MAX_POOL2D, PoolMode::Max, false, spec)
    }

    /// 创建3D最大池化层
    pub fn max_pool3d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::MAX_POOL3D, PoolMode::Max, false, spec)
    }

    /// 创建1D平均池化层
    pub fn avg_pool1d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::AVG_POOL1D, PoolMode::Avg, false, spec)
    }

    /// 创建2D平均池化层
    pub fn avg_pool2d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::AVG_POOL2D, PoolMode::Avg, false, spec)
    }

    /// 创建3D平均池化层
    pub fn avg_pool3d(spec: PoolSpec) -> Result<Self, LayerError> {
        Self::build(&variant::AVG_POOL3D, PoolMode::Avg, false, spec)
    }

    /// 创建1D全局最大池化层
    pub fn global_max_pool1d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_MAX_POOL1D, PoolMode::Max, layout)
    }

    /// 创建2D全局最大池化层
    pub fn global_max_pool2d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_MAX_POOL2D, PoolMode::Max, layout)
    }

    /// 创建3D全局最大池化层
    pub fn global_max_pool3d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_MAX_POOL3D, PoolMode::Max, layout)
    }

    /// 创建1D全局平均池化层
    pub fn global_avg_pool1d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_AVG_POOL1D, PoolMode::Avg, layout)
    }

    /// 创建2D全局平均池化层
    pub fn global_avg_pool2d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_AVG_POOL2D, PoolMode::Avg, layout)
    }

    /// 创建3D全局平均池化层
    pub fn global_avg_pool3d(layout: Option<&str>) -> Result<Self, LayerError> {
        Self::build_global(&variant::GLOBAL_AVG_POOL3D, PoolMode::Avg, layout)
    }

    fn build(
        variant: &'static Variant,
        mode: PoolMode,
        global: bool,
        spec: PoolSpec,
    ) -> Result<Self, LayerError> {
        let rank = variant.rank;

        let kernel = spec.pool_size.expand("pool_size", rank)?;
        // stride缺省 = pool_size
        let stride = match spec.stride {
            Some(s) => s.expand("stride", rank)?,
            None => kernel.clone(),
        };
        let padding = spec.padding.expand("padding", rank)?;

        ensure_positive("pool_size", &kernel)?;
        ensure_positive("stride", &stride)?;

        let layout_tag = spec.layout.as_deref().unwrap_or(variant.default_layout);
        let layout = Layout::parse(layout_tag, rank)?;

        Ok(Self {
            variant,
            mode,
            kernel,
            stride,
            padding,
            rounding: if spec.ceil_mode {
                Rounding::Ceil
            } else {
                Rounding::Floor
            },
            global,
            layout,
        })
    }

    fn build_global(
        variant: &'static Variant,
        mode: PoolMode,
        layout: Option<&str>,
    ) -> Result<Self, LayerError> {
        // 全局池化的窗口在前向时等于整个空间轴，这里的几何只是占位
        Self::build(
            variant,
            mode,
            true,
            PoolSpec {
                pool_size: Geometry::Scalar(1),
                stride: Some(Geometry::Scalar(1)),
                padding: Geometry::Scalar(0),
                ceil_mode: true,
                layout: layout.map(str::to_string),
            },
        )
    }

    /// 前向传播
    ///
    /// # 参数
    /// - `ops`: 后端算子
    /// - `x`: 输入张量，维数 = 空间秩 + 2，轴排列须与层配置一致
    ///
    /// # 错误
    /// - 输入维数与秩不符 / 窗口容不下：`ShapeMismatch`
    /// - 后端失败：`BackendOperator`原样透传
    pub fn forward(&self, ops: &dyn TensorOps, x: &Tensor) -> Result<Tensor, LayerError> {
        let expected_ndim = self.layout.rank() + 2;
        if x.ndim() != expected_ndim {
            return Err(LayerError::ShapeMismatch {
                expected: vec![expected_ndim],
                got: vec![x.ndim()],
                message: format!("{}的输入维数应为空间秩+2", self.variant.name),
            });
        }

        let expected = pool_output_shape(
            x.shape(),
            &self.layout,
            &self.kernel,
            &self.stride,
            &self.padding,
            self.rounding,
            self.global,
        )?;

        let output = ops.pooling(&PoolRequest {
            input: x,
            mode: self.mode,
            kernel: &self.kernel,
            stride: &self.stride,
            padding: &self.padding,
            rounding: self.rounding,
            global: self.global,
            layout: &self.layout,
        })?;

        if output.shape() != expected.as_slice() {
            return Err(LayerError::ShapeMismatch {
                expected,
                got: output.shape().to_vec(),
                message: format!("{}的后端输出形状与闭式公式不一致", self.variant.name),
            });
        }

        Ok(output)
    }

    /// 获取池化模式
    pub const fn mode(&self) -> PoolMode {
        self.mode
    }

    /// 获取池化窗口大小
    pub fn pool_size(&self) -> &[usize] {
        &self.kernel
    }

    /// 获取步长
    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    /// 获取填充
    pub fn padding(&self) -> &[usize] {
        &self.padding
    }

    /// 是否ceil取整
    pub fn ceil_mode(&self) -> bool {
        self.rounding == Rounding::Ceil
    }

    /// 是否全局池化
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// 获取轴排列
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// 生成可序列化的层描述符
    pub fn describe(&self) -> LayerDescriptor {
        LayerDescriptor::new(
            self.variant.name,
            OpDescriptor::Pool {
                mode: self.mode,
                kernel: self.kernel.clone(),
                stride: self.stride.clone(),
                padding: self.padding.clone(),
                ceil_mode: self.ceil_mode(),
                global: self.global,
                layout: self.layout.tag().to_string(),
            },
        )
    }
}

impl Module for Pool {
    /// 池化层没有可学习参数
    fn parameters(&self) -> Vec<(&str, &ParameterSlot)> {
        Vec::new()
    }
}

impl fmt::Display for Pool {
    /// 诊断用文本描述；与卷积不同，池化按gluon惯例无条件渲染全部字段
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(size={}, stride={}, padding={}, ceil_mode={})",
            self.variant.name,
            format_axes(&self.kernel),
            format_axes(&self.stride),
            format_axes(&self.padding),
            self.ceil_mode()
        )
    }
}
