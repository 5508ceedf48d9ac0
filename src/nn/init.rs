/*
 * @Author       : 老董
 * @Date         : 2026-06-16
 * @Description  : 参数初始化服务
 *
 * `Initializer`是参数槽在解析时调用一次的协作接口；
 * `Init`枚举是本crate自带的实现（常数/零/一/正态/Kaiming/Xavier）。
 */

use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Mutex;

/// 初始化服务：给定形状生成参数张量
///
/// 每个参数槽在Unresolved->Resolved转换时恰好调用一次。
/// 要求`Send + Sync`，因为首次前向可能发生在任意线程。
pub trait Initializer: Send + Sync {
    /// 按`shape`生成初始化后的张量
    fn initialize(&self, shape: &[usize]) -> Tensor;
}

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He初始化（适用于`ReLU`）
    Kaiming,
    /// Xavier/Glorot初始化（适用于Sigmoid/Tanh）
    Xavier,
}

/// 卷积族权重的fan_in：除首维（输出侧）外所有维度的乘积，
/// 即 C_in/G * K_0 * ... * K_{R-1}
fn fan_in(shape: &[usize]) -> usize {
    shape.iter().skip(1).product::<usize>().max(1)
}

fn fan_out(shape: &[usize]) -> usize {
    let spatial: usize = shape.iter().skip(2).product::<usize>().max(1);
    shape.first().copied().unwrap_or(1) * spatial
}

impl Init {
    /// 生成初始化后的Tensor（使用全局RNG）
    pub fn generate(&self, shape: &[usize]) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::ones(shape).map(|x| x * *v),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal(*mean, *std, shape),
            Self::Kaiming => {
                let std = (2.0 / fan_in(shape) as f32).sqrt();
                Tensor::normal(0.0, std, shape)
            }
            Self::Xavier => {
                let std = (2.0 / (fan_in(shape) + fan_out(shape)) as f32).sqrt();
                Tensor::normal(0.0, std, shape)
            }
        }
    }

    /// 生成初始化后的Tensor（使用指定的RNG，保证可重复性）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::ones(shape).map(|x| x * *v),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let std = (2.0 / fan_in(shape) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let std = (2.0 / (fan_in(shape) + fan_out(shape)) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

impl Initializer for Init {
    fn initialize(&self, shape: &[usize]) -> Tensor {
        self.generate(shape)
    }
}

/// 带固定种子的初始化器包装，保证层参数可重复
///
/// # 示例
/// ```
/// use only_gluon::nn::{Init, Initializer, SeededInit};
///
/// let a = SeededInit::new(Init::Kaiming, 42).initialize(&[4, 2, 3, 3]);
/// let b = SeededInit::new(Init::Kaiming, 42).initialize(&[4, 2, 3, 3]);
/// assert_eq!(a.data_as_slice(), b.data_as_slice());
/// ```
pub struct SeededInit {
    init: Init,
    rng: Mutex<StdRng>,
}

impl SeededInit {
    pub fn new(init: Init, seed: u64) -> Self {
        Self {
            init,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Initializer for SeededInit {
    fn initialize(&self, shape: &[usize]) -> Tensor {
        let mut rng = self.rng.lock().expect("SeededInit内部RNG锁中毒");
        self.init.generate_with_rng(shape, &mut rng)
    }
}
