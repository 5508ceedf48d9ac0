//! # Only Gluon
//!
//! `only_gluon`项目旨在用纯rust仿造[mxnet gluon](https://mxnet.apache.org)的
//! 卷积/池化层抽象：层本身只做形状推断与参数生命周期管理（延迟初始化），
//! 真正的数值内核（卷积/池化的算术）全部委托给外部后端实现。
//!

pub mod nn;
pub mod tensor;
