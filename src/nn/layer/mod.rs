/*
 * @Author       : 老董
 * @Date         : 2026-06-20
 * @Description  : Layer 模块 - 卷积/池化门面
 *
 * 每个变体不再是独立类型：Conv/Pool两个通用门面 + variant.rs的
 * 静态描述表覆盖全部1D/2D/3D × 正向/转置/最大/平均/全局变体。
 */

mod conv;
mod pool;
mod variant;

pub use conv::{Conv, ConvSpec};
pub use pool::{Pool, PoolSpec};

use super::LayerError;

/// 校验几何参数取值为正（kernel/stride/dilation/groups等不允许0）
pub(in crate::nn) fn ensure_positive(
    param: &'static str,
    values: &[usize],
) -> Result<(), LayerError> {
    if let Some(pos) = values.iter().position(|&v| v == 0) {
        return Err(LayerError::InvalidGeometry {
            param,
            message: format!("第{pos}个值为0，必须为正整数"),
        });
    }
    Ok(())
}
