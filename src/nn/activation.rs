/*
 * @Author       : 老董
 * @Date         : 2026-06-16
 * @Description  : 激活协作者 - 前向输出的逐元素后处理
 *
 * 层只负责在后端算子返回后调用一次`apply`；不参与形状推断。
 */

use crate::tensor::Tensor;
use serde::{Deserialize, Serialize};

/// 激活函数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Activation {
    ReLU,
    LeakyReLU { alpha: f32 },
    Sigmoid,
    Tanh,
    SoftPlus,
}

impl Activation {
    /// 按gluon风格的字符串标识查找激活函数
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "relu" => Some(Self::ReLU),
            "leaky_relu" => Some(Self::LeakyReLU { alpha: 0.1 }),
            "sigmoid" => Some(Self::Sigmoid),
            "tanh" => Some(Self::Tanh),
            "softplus" => Some(Self::SoftPlus),
            _ => None,
        }
    }

    /// 逐元素应用激活函数，返回新张量
    pub fn apply(&self, x: &Tensor) -> Tensor {
        match self {
            Self::ReLU => x.map(|v| v.max(0.0)),
            Self::LeakyReLU { alpha } => {
                let alpha = *alpha;
                x.map(move |v| if v > 0.0 { v } else { alpha * v })
            }
            Self::Sigmoid => x.map(|v| 1.0 / (1.0 + (-v).exp())),
            Self::Tanh => x.map(f32::tanh),
            Self::SoftPlus => x.map(|v| (1.0 + v.exp()).ln()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_relu_and_leaky() {
        let x = Tensor::new(&[-2.0, 0.0, 3.0], &[3]);
        assert_eq!(Activation::ReLU.apply(&x).data_as_slice(), &[0.0, 0.0, 3.0]);
        let leaky = Activation::LeakyReLU { alpha: 0.1 }.apply(&x);
        assert_abs_diff_eq!(leaky.data_as_slice()[0], -0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(leaky.data_as_slice()[2], 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sigmoid_at_zero() {
        let x = Tensor::zeros(&[2, 2]);
        let y = Activation::Sigmoid.apply(&x);
        for &v in y.data_as_slice() {
            assert_abs_diff_eq!(v, 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Activation::from_name("relu"), Some(Activation::ReLU));
        assert_eq!(Activation::from_name("tanh"), Some(Activation::Tanh));
        assert_eq!(Activation::from_name("gelu"), None);
    }
}
