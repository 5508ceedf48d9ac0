/*
 * @Author       : 老董
 * @Date         : 2026-06-19
 * @Description  : 层文本描述的格式化辅助
 */

/// 格式化逐轴几何值，如 `(3, 3)`；单轴为 `(3)`
///
/// 用于层的Display输出，必须确定且稳定（供golden测试比对）。
pub(in crate::nn) fn format_axes(values: &[usize]) -> String {
    let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("({})", parts.join(", "))
}
