/*
 * @Author       : 老董
 * @Date         : 2026-06-21
 * @Description  : 卷积族门面（正向卷积 + 转置卷积，1D/2D/3D）
 *
 * 计算：output = activation(conv(x, W) + b)
 *
 * 层本身只做三件事：
 * 1. 构建期归一化/校验几何参数，推出权重与偏置的（可能含未知维的）形状；
 * 2. 首次前向时按观测到的输入通道数解析参数槽（之后冻结）；
 * 3. 把已解析参数和原始几何打包给后端算子执行，再做可选的激活后处理。
 *
 * 输出尺寸计算（正向，逐空间轴）：
 * out = floor((in + 2*pad - dilation*(kernel-1) - 1) / stride) + 1
 * 转置方向：
 * out = (in - 1)*stride - 2*pad + kernel + output_pad
 */

use super::variant::{self, Variant};
use super::ensure_positive;
use crate::nn::backend::{ConvRequest, TensorOps};
use crate::nn::descriptor::{LayerDescriptor, OpDescriptor};
use crate::nn::display::format_axes;
use crate::nn::geometry::{Geometry, Layout};
use crate::nn::param::ParameterSlot;
use crate::nn::shape::{
    bias_shape, conv_output_shape, conv_weight_shape, transposed_output_shape,
};
use crate::nn::{Activation, Init, Initializer, LayerError, Module};
use crate::tensor::Tensor;
use std::fmt;
use std::sync::Arc;

/// 卷积族层的构建配置
///
/// 字段语义与gluon一致：标量几何会广播到每个空间轴；
/// `in_channels = 0`表示未知，参数初始化推迟到首次前向、
/// 从输入数据的形状推断。
///
/// # 示例
/// ```
/// use only_gluon::nn::{Conv, ConvSpec};
///
/// let conv = Conv::conv2d(ConvSpec {
///     channels: 16,
///     kernel_size: 3.into(),
///     padding: 1.into(),
///     ..Default::default()
/// }).unwrap();
/// assert_eq!(conv.to_string(), "Conv2D(16, kernel_size=(3, 3), stride=(1, 1), padding=(1, 1))");
/// ```
pub struct ConvSpec {
    /// 输出通道数
    pub channels: usize,
    /// 卷积核大小
    pub kernel_size: Geometry,
    /// 步长
    pub stride: Geometry,
    /// 填充
    pub padding: Geometry,
    /// 膨胀率
    pub dilation: Geometry,
    /// 输出填充（仅转置卷积，须逐轴小于stride）
    pub output_padding: Geometry,
    /// 分组数（须整除输入/输出通道数）
    pub groups: usize,
    /// 轴排列；None取变体默认（NCW/NCHW/NCDHW）
    pub layout: Option<String>,
    /// 输入通道数；0表示未知，推迟到首次前向推断
    pub in_channels: usize,
    /// 激活函数（可选）
    pub activation: Option<Activation>,
    /// 是否使用偏置
    pub use_bias: bool,
    /// 权重初始化器
    pub weight_init: Arc<dyn Initializer>,
    /// 偏置初始化器
    pub bias_init: Arc<dyn Initializer>,
}

impl Default for ConvSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            kernel_size: Geometry::Scalar(1),
            stride: Geometry::Scalar(1),
            padding: Geometry::Scalar(0),
            dilation: Geometry::Scalar(1),
            output_padding: Geometry::Scalar(0),
            groups: 1,
            layout: None,
            in_channels: 0,
            activation: None,
            use_bias: true,
            weight_init: Arc::new(Init::Kaiming),
            bias_init: Arc::new(Init::Zeros),
        }
    }
}

/// 卷积族门面：一个通用结构覆盖正向/转置 × 1D/2D/3D全部变体
///
/// 状态机：`Constructed(unresolved)` --首次前向--> `Bound`（终态）；
/// 显式给定`in_channels`时构建即是`Bound`，不存在回退。
#[derive(Debug)]
pub struct Conv {
    variant: &'static Variant,
    transposed: bool,
    channels: usize,
    kernel: Vec<usize>,
    stride: Vec<usize>,
    padding: Vec<usize>,
    dilation: Vec<usize>,
    output_padding: Vec<usize>,
    groups: usize,
    layout: Layout,
    weight: ParameterSlot,
    bias: Option<ParameterSlot>,
    activation: Option<Activation>,
}

impl Conv {
    /// 创建1D卷积层
    pub fn conv1d(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV1D, false, spec)
    }

    /// 创建2D卷积层
    pub fn conv2d(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV2D, false, spec)
    }

    /// 创建3D卷积层
    pub fn conv3d(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV3D, false, spec)
    }

    /// 创建1D转置卷积（反卷积）层
    pub fn conv1d_transpose(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV1D_TRANSPOSE, true, spec)
    }

    /// 创建2D转置卷积（反卷积）层
    pub fn conv2d_transpose(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV2D_TRANSPOSE, true, spec)
    }

    /// 创建3D转置卷积（反卷积）层
    pub fn conv3d_transpose(spec: ConvSpec) -> Result<Self, LayerError> {
        Self::build(&variant::CONV3D_TRANSPOSE, true, spec)
    }

    fn build(variant: &'static Variant, transposed: bool, spec: ConvSpec) -> Result<Self, LayerError> {
        let rank = variant.rank;

        // 1. 几何归一化（标量广播 + 长度校验）
        let kernel = spec.kernel_size.expand("kernel_size", rank)?;
        let stride = spec.stride.expand("stride", rank)?;
        let padding = spec.padding.expand("padding", rank)?;
        let dilation = spec.dilation.expand("dilation", rank)?;
        let output_padding = spec.output_padding.expand("output_padding", rank)?;

        // 2. 取值校验
        ensure_positive("channels", &[spec.channels])?;
        ensure_positive("groups", &[spec.groups])?;
        ensure_positive("kernel_size", &kernel)?;
        ensure_positive("stride", &stride)?;
        ensure_positive("dilation", &dilation)?;
        if transposed {
            for i in 0..rank {
                if output_padding[i] >= stride[i] {
                    return Err(LayerError::InvalidGeometry {
                        param: "output_padding",
                        message: format!(
                            "第{i}轴的output_padding={}须小于stride={}",
                            output_padding[i], stride[i]
                        ),
                    });
                }
            }
        } else if output_padding.iter().any(|&v| v != 0) {
            return Err(LayerError::InvalidGeometry {
                param: "output_padding",
                message: "仅转置卷积支持output_padding".to_string(),
            });
        }

        let layout_tag = spec.layout.as_deref().unwrap_or(variant.default_layout);
        let layout = Layout::parse(layout_tag, rank)?;

        // 3. 参数形状推导 + 注册参数槽（in_channels=0时weight含未知维）
        let in_channels = (spec.in_channels != 0).then_some(spec.in_channels);
        let weight_shape =
            conv_weight_shape(spec.channels, in_channels, spec.groups, &kernel, transposed)?;
        let weight = ParameterSlot::new("weight", weight_shape, spec.weight_init);
        let bias = spec
            .use_bias
            .then(|| ParameterSlot::new("bias", bias_shape(spec.channels), spec.bias_init));

        Ok(Self {
            variant,
            transposed,
            channels: spec.channels,
            kernel,
            stride,
            padding,
            dilation,
            output_padding,
            groups: spec.groups,
            layout,
            weight,
            bias,
            activation: spec.activation,
        })
    }

    /// 前向传播
    ///
    /// 首次调用可能触发一次性的参数解析（观测输入通道数、分配并初始化
    /// 权重/偏置）；之后每次前向都直接复用已解析的参数槽。
    ///
    /// # 参数
    /// - `ops`: 后端算子
    /// - `x`: 输入张量，维数 = 空间秩 + 2，轴排列须与层配置一致
    ///
    /// # 错误
    /// - 输入维数与秩不符 / 通道数与已解析权重冲突：`ShapeMismatch`
    /// - 推断出的输入通道数不能被分组数整除：`InvalidGroups`
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

        // 解析（或校验）参数槽
        let c_in = x.shape()[self.layout.channel_axis()];
        let weight_shape = conv_weight_shape(
            self.channels,
            Some(c_in),
            self.groups,
            &self.kernel,
            self.transposed,
        )?
        .to_vec_fixed()
        .expect("代入输入通道数后形状必为固定");
        let weight = self.weight.resolve(&weight_shape)?;
        let bias = match &self.bias {
            Some(slot) => Some(slot.resolve(&[self.channels])?),
            None => None,
        };

        // 闭式公式给出的期望输出形状
        let expected = if self.transposed {
            transposed_output_shape(
                x.shape(),
                &self.layout,
                self.channels,
                &self.kernel,
                &self.stride,
                &self.padding,
                &self.output_padding,
            )?
        } else {
            conv_output_shape(
                x.shape(),
                &self.layout,
                self.channels,
                &self.kernel,
                &self.stride,
                &self.padding,
                &self.dilation,
            )?
        };

        // 委托后端执行数值内核
        let output = ops.convolution(&ConvRequest {
            input: x,
            weight,
            bias,
            kernel: &self.kernel,
            stride: &self.stride,
            padding: &self.padding,
            dilation: &self.dilation,
            output_padding: &self.output_padding,
            groups: self.groups,
            layout: &self.layout,
            transposed: self.transposed,
        })?;

        // 与后端口径对账：形状分歧说明实现有bug，绝不静默放行
        if output.shape() != expected.as_slice() {
            return Err(LayerError::ShapeMismatch {
                expected,
                got: output.shape().to_vec(),
                message: format!("{}的后端输出形状与闭式公式不一致", self.variant.name),
            });
        }

        Ok(match &self.activation {
            Some(act) => act.apply(&output),
            None => output,
        })
    }

    /// 获取输出通道数
    pub const fn channels(&self) -> usize {
        self.channels
    }

    /// 获取输入通道数；尚未解析时返回None
    pub fn in_channels(&self) -> Option<usize> {
        self.weight.shape().map(|s| {
            if self.transposed {
                s[0]
            } else {
                s[1] * self.groups
            }
        })
    }

    /// 获取卷积核大小
    pub fn kernel_size(&self) -> &[usize] {
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

    /// 获取膨胀率
    pub fn dilation(&self) -> &[usize] {
        &self.dilation
    }

    /// 获取输出填充（仅转置卷积非零）
    pub fn output_padding(&self) -> &[usize] {
        &self.output_padding
    }

    /// 获取分组数
    pub const fn groups(&self) -> usize {
        self.groups
    }

    /// 获取轴排列
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// 获取权重参数槽
    pub const fn weight(&self) -> &ParameterSlot {
        &self.weight
    }

    /// 获取偏置参数槽（use_bias=false时为None）
    pub const fn bias(&self) -> Option<&ParameterSlot> {
        self.bias.as_ref()
    }

    /// 生成可序列化的层描述符
    pub fn describe(&self) -> LayerDescriptor {
        let op = if self.transposed {
            OpDescriptor::ConvTranspose {
                channels: self.channels,
                in_channels: self.in_channels(),
                kernel: self.kernel.clone(),
                stride: self.stride.clone(),
                padding: self.padding.clone(),
                dilation: self.dilation.clone(),
                output_padding: self.output_padding.clone(),
                groups: self.groups,
                layout: self.layout.tag().to_string(),
                use_bias: self.bias.is_some(),
                activation: self.activation,
            }
        } else {
            OpDescriptor::Conv {
                channels: self.channels,
                in_channels: self.in_channels(),
                kernel: self.kernel.clone(),
                stride: self.stride.clone(),
                padding: self.padding.clone(),
                dilation: self.dilation.clone(),
                groups: self.groups,
                layout: self.layout.tag().to_string(),
                use_bias: self.bias.is_some(),
                activation: self.activation,
            }
        };
        LayerDescriptor::new(self.variant.name, op)
    }
}

impl Module for Conv {
    fn parameters(&self) -> Vec<(&str, &ParameterSlot)> {
        let mut params = vec![(self.weight.name(), &self.weight)];
        if let Some(bias) = &self.bias {
            params.push((bias.name(), bias));
        }
        params
    }
}

impl fmt::Display for Conv {
    /// 诊断用文本描述，与gluon的repr同构：
    /// 通道映射在解析后显示`in -> out`、否则只显示`out`；
    /// padding/dilation/output_padding/groups/bias只在偏离默认值时出现。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.variant.name)?;
        match self.in_channels() {
            Some(c_in) => write!(f, "{} -> {}", c_in, self.channels)?,
            None => write!(f, "{}", self.channels)?,
        }
        write!(
            f,
            ", kernel_size={}, stride={}",
            format_axes(&self.kernel),
            format_axes(&self.stride)
        )?;
        if self.padding.iter().any(|&v| v != 0) {
            write!(f, ", padding={}", format_axes(&self.padding))?;
        }
        if self.dilation.iter().any(|&v| v != 1) {
            write!(f, ", dilation={}", format_axes(&self.dilation))?;
        }
        if self.output_padding.iter().any(|&v| v != 0) {
            write!(f, ", output_padding={}", format_axes(&self.output_padding))?;
        }
        if self.groups != 1 {
            write!(f, ", groups={}", self.groups)?;
        }
        if self.bias.is_none() {
            write!(f, ", bias=false")?;
        }
        write!(f, ")")
    }
}
