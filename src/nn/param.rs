/*
 * @Author       : 老董
 * @Date         : 2026-06-17
 * @Description  : 延迟参数绑定器（Deferred Parameter Binder）
 *
 * 参数槽的状态机：Unresolved --(首次前向观测到输入通道数)--> Resolved。
 * - 构建时形状已完全确定的槽立即解析，首次前向不再做任何事；
 * - 含未知维度的槽在首次前向时代入观测值、分配存储并调用初始化器，
 *   之后形状冻结，任何冲突的输入都报`ShapeMismatch`；
 * - 解析用`OnceLock`做一次性守护：并发的首次前向最多只有一次
 *   分配+初始化，所有调用方看到同一个已解析张量。
 */

use super::shape::DynamicShape;
use super::{Initializer, LayerError};
use crate::tensor::Tensor;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// 一个可学习参数（权重或偏置）的槽位
///
/// 由所属层独占持有，不跨层共享；通过`Module::parameters`暴露给容器。
pub struct ParameterSlot {
    name: String,
    placeholder: DynamicShape,
    init: Arc<dyn Initializer>,
    cell: OnceLock<Tensor>,
}

impl ParameterSlot {
    /// 创建参数槽；占位形状完全固定时立即解析（跳过首次前向那一步）
    pub(in crate::nn) fn new(
        name: &str,
        placeholder: DynamicShape,
        init: Arc<dyn Initializer>,
    ) -> Self {
        let slot = Self {
            name: name.to_string(),
            placeholder,
            init,
            cell: OnceLock::new(),
        };
        if let Some(shape) = slot.placeholder.to_vec_fixed() {
            let tensor = slot.init.initialize(&shape);
            let _ = slot.cell.set(tensor);
        }
        slot
    }

    /// 参数名（如"weight"、"bias"）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 占位形状（未解析维度显示为`?`）
    pub fn placeholder(&self) -> &DynamicShape {
        &self.placeholder
    }

    /// 是否已解析
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// 已解析的具体形状；未解析时返回None
    pub fn shape(&self) -> Option<&[usize]> {
        self.cell.get().map(Tensor::shape)
    }

    /// 已解析的参数张量；未解析时返回None
    pub fn value(&self) -> Option<&Tensor> {
        self.cell.get()
    }

    /// 用观测到的具体形状解析本槽（幂等，一次性）
    ///
    /// - 首次调用：分配存储、调用初始化器恰好一次，转入Resolved；
    /// - 后续调用：直接复用，常数时间，不再推断、不再分配；
    /// - 具体形状与占位形状不兼容、或与已解析形状冲突时报`ShapeMismatch`。
    pub(in crate::nn) fn resolve(&self, concrete: &[usize]) -> Result<&Tensor, LayerError> {
        if !self.placeholder.is_compatible_with(concrete) {
            return Err(LayerError::ShapeMismatch {
                expected: self
                    .placeholder
                    .dims()
                    .iter()
                    .map(|d| d.unwrap_or(0))
                    .collect(),
                got: concrete.to_vec(),
                message: format!(
                    "参数`{}`的占位形状{}与代入形状不兼容",
                    self.name, self.placeholder
                ),
            });
        }

        let tensor = self.cell.get_or_init(|| self.init.initialize(concrete));

        // 并发首次前向只会有一个赢家；输家（或后续形状冲突的前向）在此被揪出
        if tensor.shape() != concrete {
            return Err(LayerError::ShapeMismatch {
                expected: tensor.shape().to_vec(),
                got: concrete.to_vec(),
                message: format!("参数`{}`已按其它输入解析，形状不可再变", self.name),
            });
        }
        Ok(tensor)
    }
}

impl fmt::Debug for ParameterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSlot")
            .field("name", &self.name)
            .field("placeholder", &self.placeholder)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl fmt::Display for ParameterSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape() {
            Some(shape) => write!(f, "参数[name={}, shape={:?}]", self.name, shape),
            None => write!(f, "参数[name={}, shape={}(未解析)]", self.name, self.placeholder),
        }
    }
}
