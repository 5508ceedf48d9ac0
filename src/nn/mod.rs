/*
 * @Author       : 老董
 * @Date         : 2026-06-14
 * @Description  : 负责层抽象（形状推断 + 延迟参数）的构建
 */

mod activation;
mod backend;
mod descriptor;
mod display;
mod error;
mod geometry;
mod init;
pub mod layer;
mod module;
mod param;
pub mod shape;

pub use activation::Activation;
pub use backend::{ConvRequest, PoolMode, PoolRequest, TensorOps};
pub use descriptor::{LayerDescriptor, OpDescriptor};
pub use error::LayerError;
pub use geometry::{Geometry, Layout};
pub use init::{Init, Initializer, SeededInit};
pub use layer::{Conv, ConvSpec, Pool, PoolSpec};
pub use module::Module;
pub use param::ParameterSlot;
pub use shape::{Dim, DynamicShape, Rounding};

#[cfg(test)]
mod tests;
