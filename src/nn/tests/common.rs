/*
 * @Author       : 老董
 * @Date         : 2026-06-23
 * @Description  : 层测试共用的桩后端与计数初始化器
 *
 * `StubBackend`扮演外部数值后端：不做真正的卷积/池化算术，
 * 只用"逐个窗口起点数数"的方式独立推出输出形状（即形状神谕），
 * 返回填充常数值的张量。层的forward会拿闭式公式与它对账，
 * 两边口径不一致时测试立即暴露。
 */

use crate::nn::{
    ConvRequest, Init, Initializer, LayerError, PoolRequest, TensorOps,
};
use crate::tensor::Tensor;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 单轴窗口数：不套除法公式，逐个起点数出来
///
/// floor模式只数完整窗口；ceil模式允许末尾的不完整窗口。
pub fn count_windows(
    input: usize,
    kernel: usize,
    stride: usize,
    pad: usize,
    dilation: usize,
    ceil: bool,
) -> Option<usize> {
    let padded = input + 2 * pad;
    let effective = dilation * (kernel - 1) + 1;
    if padded < effective {
        return None;
    }
    let limit = if ceil {
        padded - effective + stride
    } else {
        padded - effective + 1
    };
    let mut count = 0;
    let mut start = 0;
    while start < limit {
        count += 1;
        start += stride;
    }
    Some(count)
}

/// 转置方向单轴长度：按散射（scatter）过程推，
/// 最后一个输入位置写到(in-1)*stride起始的kernel格，再裁掉两侧padding、
/// 末尾补output_pad
pub fn scatter_extent(
    input: usize,
    kernel: usize,
    stride: usize,
    pad: usize,
    output_pad: usize,
) -> Option<usize> {
    if input == 0 {
        return None;
    }
    let gross = (input - 1) * stride + kernel + output_pad;
    gross.checked_sub(2 * pad).filter(|&v| v > 0)
}

/// 桩后端：独立推形状、返回常数填充的张量
pub struct StubBackend {
    /// 输出张量的填充值（默认0.0；激活测试用非零值观察后处理）
    pub fill: f32,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self { fill: 0.0 }
    }
}

impl StubBackend {
    pub fn with_fill(fill: f32) -> Self {
        Self { fill }
    }

    fn make_output(&self, shape: &[usize]) -> Tensor {
        Tensor::zeros(shape).map(|_| self.fill)
    }
}

impl TensorOps for StubBackend {
    fn convolution(&self, req: &ConvRequest<'_>) -> Result<Tensor, LayerError> {
        let in_shape = req.input.shape();
        let w_shape = req.weight.shape();
        let c_in = in_shape[req.layout.channel_axis()];

        // 后端自己的参数合法性校验（错误带上出错的参数名）
        let (expect_c_in, c_out) = if req.transposed {
            (w_shape[0], w_shape[1] * req.groups)
        } else {
            (w_shape[1] * req.groups, w_shape[0])
        };
        if expect_c_in != c_in {
            return Err(LayerError::BackendOperator {
                param: "weight".to_string(),
                message: format!("权重输入通道{expect_c_in}与输入{c_in}不符"),
            });
        }
        if let Some(bias) = req.bias {
            if bias.shape() != [c_out] {
                return Err(LayerError::BackendOperator {
                    param: "bias".to_string(),
                    message: format!("偏置形状{:?}应为[{c_out}]", bias.shape()),
                });
            }
        }

        let mut out = in_shape.to_vec();
        out[req.layout.channel_axis()] = c_out;
        for (i, &axis) in req.layout.spatial_axes().iter().enumerate() {
            let extent = if req.transposed {
                scatter_extent(
                    in_shape[axis],
                    req.kernel[i],
                    req.stride[i],
                    req.padding[i],
                    req.output_padding[i],
                )
            } else {
                count_windows(
                    in_shape[axis],
                    req.kernel[i],
                    req.stride[i],
                    req.padding[i],
                    req.dilation[i],
                    false,
                )
            };
            out[axis] = extent.ok_or_else(|| LayerError::BackendOperator {
                param: "kernel".to_string(),
                message: format!("第{i}个空间轴放不下窗口"),
            })?;
        }
        Ok(self.make_output(&out))
    }

    fn pooling(&self, req: &PoolRequest<'_>) -> Result<Tensor, LayerError> {
        let in_shape = req.input.shape();
        let mut out = in_shape.to_vec();
        for (i, &axis) in req.layout.spatial_axes().iter().enumerate() {
            out[axis] = if req.global {
                // 全局池化 = 窗口盖满整个空间轴
                1
            } else {
                count_windows(
                    in_shape[axis],
                    req.kernel[i],
                    req.stride[i],
                    req.padding[i],
                    1,
                    req.rounding == crate::nn::Rounding::Ceil,
                )
                .ok_or_else(|| LayerError::BackendOperator {
                    param: "kernel".to_string(),
                    message: format!("第{i}个空间轴放不下窗口"),
                })?
            };
        }
        Ok(self.make_output(&out))
    }
}

/// 总是失败的后端，用于验证错误原样透传
pub struct FailingBackend;

impl TensorOps for FailingBackend {
    fn convolution(&self, _req: &ConvRequest<'_>) -> Result<Tensor, LayerError> {
        Err(LayerError::BackendOperator {
            param: "input".to_string(),
            message: "设备内存不足".to_string(),
        })
    }

    fn pooling(&self, _req: &PoolRequest<'_>) -> Result<Tensor, LayerError> {
        Err(LayerError::BackendOperator {
            param: "input".to_string(),
            message: "设备内存不足".to_string(),
        })
    }
}

/// 记录调用次数的初始化器，用于断言"恰好初始化一次"
pub struct CountingInit {
    pub calls: AtomicUsize,
    inner: Init,
}

impl CountingInit {
    pub fn new(inner: Init) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            inner,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Initializer for CountingInit {
    fn initialize(&self, shape: &[usize]) -> Tensor {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.generate(shape)
    }
}
