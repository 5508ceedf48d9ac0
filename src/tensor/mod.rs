/*
 * @Author       : 老董
 * @Date         : 2026-06-14
 * @Description  : 轻量张量载体（shape + 数据），仅作为层与后端之间的搬运工。
 *                 本crate不实现卷积/池化等数值内核，故这里只保留构造、
 *                 形状访问、逐元素映射等最小能力。
 */

use ndarray::{Array, IxDyn};
use rand::Rng;
use rand::rngs::StdRng;
use std::fmt;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通过Tensor初始化的都是张量（即使标量也是张量）。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量。`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .expect("data长度与shape乘积不一致");
        Self { data }
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// 创建一个全一张量
    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 创建一个正态分布张量（使用全局RNG）
    pub fn normal(mean: f32, std: f32, shape: &[usize]) -> Self {
        let mut rng = rand::thread_rng();
        Self::normal_impl(mean, std, shape, &mut rng)
    }

    /// 创建一个正态分布张量（使用指定的RNG，保证可重复性）
    pub fn normal_with_rng(mean: f32, std: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        Self::normal_impl(mean, std, shape, rng)
    }

    // Box-Muller采样：rand 0.8本身不带正态分布
    fn normal_impl<R: Rng>(mean: f32, std: f32, shape: &[usize], rng: &mut R) -> Self {
        let size = shape.iter().product::<usize>();
        let data = (0..size)
            .map(|_| {
                let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
                let u2: f32 = rng.gen_range(0.0..1.0);
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
                mean + std * z
            })
            .collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 获取形状
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 获取维度数量
    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    /// 获取元素总数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 以切片形式访问底层数据（行优先）
    pub fn data_as_slice(&self) -> &[f32] {
        self.data.as_slice().expect("张量内存不连续")
    }

    /// 逐元素映射，返回新张量（用于激活函数等）
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            data: self.data.map(|&x| f(x)),
        }
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "形状: {:?}", self.shape())?;
        write!(f, "{}", self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_new_and_shape() {
        let t = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.ndim(), 2);
        assert_eq!(t.size(), 6);
        assert_eq!(t.data_as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "data长度与shape乘积不一致")]
    fn test_new_with_wrong_len() {
        let _ = Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]);
    }

    #[test]
    fn test_zeros_ones() {
        let z = Tensor::zeros(&[2, 2]);
        assert!(z.data_as_slice().iter().all(|&x| x == 0.0));
        let o = Tensor::ones(&[3]);
        assert!(o.data_as_slice().iter().all(|&x| x == 1.0));
    }

    #[test]
    fn test_normal_seeded_repeatable() {
        let mut rng1 = StdRng::seed_from_u64(42);
        let mut rng2 = StdRng::seed_from_u64(42);
        let a = Tensor::normal_with_rng(0.0, 1.0, &[4, 4], &mut rng1);
        let b = Tensor::normal_with_rng(0.0, 1.0, &[4, 4], &mut rng2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_map() {
        let t = Tensor::new(&[-1.0, 2.0], &[2]);
        let r = t.map(|x| x.max(0.0));
        assert_eq!(r.data_as_slice(), &[0.0, 2.0]);
    }
}
