/*
 * @Author       : 老董
 * @Date         : 2026-06-18
 * @Description  : Module trait 定义
 */

use super::ParameterSlot;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回参数名到参数槽的映射（签名一致，放入 trait）
/// - 参数由层实例显式持有并在此暴露给容器，**没有**任何全局注册表
pub trait Module {
    /// 获取所有参数槽（名字 -> 槽）
    ///
    /// 用于：
    /// - 容器收集待优化/待序列化的参数
    /// - 统计参数数量
    /// - 检查延迟初始化的解析状态
    fn parameters(&self) -> Vec<(&str, &ParameterSlot)>;

    /// 获取参数槽数量
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}
