/*
 * @Author       : 老董
 * @Date         : 2026-06-25
 * @Description  : Pool layer 单元测试（最大/平均/全局池化）
 */

use super::common::StubBackend;
use crate::nn::{LayerError, Module, Pool, PoolSpec};
use crate::tensor::Tensor;

/// floor/ceil两种取整下的输出形状
#[test]
fn test_max_pool2d_floor_vs_ceil() -> Result<(), LayerError> {
    let backend = StubBackend::default();

    // in=5, k=2, s=2: floor -> 2
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: 2.into(),
        ..Default::default()
    })?;
    let out = pool.forward(&backend, &Tensor::zeros(&[1, 3, 5, 5]))?;
    assert_eq!(out.shape(), &[1, 3, 2, 2]);

    // ceil -> 3（末尾不完整窗口也算）
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: 2.into(),
        ceil_mode: true,
        ..Default::default()
    })?;
    let out = pool.forward(&backend, &Tensor::zeros(&[1, 3, 5, 5]))?;
    assert_eq!(out.shape(), &[1, 3, 3, 3]);
    Ok(())
}

/// stride缺省 = pool_size（gluon语义）
#[test]
fn test_stride_defaults_to_pool_size() -> Result<(), LayerError> {
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: (2, 3).into(),
        ..Default::default()
    })?;
    assert_eq!(pool.stride(), &[2, 3]);

    let pool = Pool::avg_pool1d(PoolSpec {
        pool_size: 4.into(),
        stride: Some(1.into()),
        ..Default::default()
    })?;
    assert_eq!(pool.stride(), &[1]);
    Ok(())
}

/// 带padding的平均池化
#[test]
fn test_avg_pool2d_with_padding() -> Result<(), LayerError> {
    let backend = StubBackend::default();
    let pool = Pool::avg_pool2d(PoolSpec {
        pool_size: 3.into(),
        stride: Some(2.into()),
        padding: 1.into(),
        ..Default::default()
    })?;
    // in=8(+2) => (10-3)/2+1=4
    let out = pool.forward(&backend, &Tensor::zeros(&[2, 4, 8, 8]))?;
    assert_eq!(out.shape(), &[2, 4, 4, 4]);

    // ceil模式下同配置：ceil(7/2)+1=5
    let pool = Pool::avg_pool2d(PoolSpec {
        pool_size: 3.into(),
        stride: Some(2.into()),
        padding: 1.into(),
        ceil_mode: true,
        ..Default::default()
    })?;
    let out = pool.forward(&backend, &Tensor::zeros(&[2, 4, 8, 8]))?;
    assert_eq!(out.shape(), &[2, 4, 5, 5]);
    Ok(())
}

/// 全局平均池化：输入(H=7, W=5)，输出空间恒为(1, 1)，与几何配置无关
#[test]
fn test_global_avg_pool2d_forces_unit_extent() -> Result<(), LayerError> {
    let backend = StubBackend::default();
    let pool = Pool::global_avg_pool2d(None)?;

    let out = pool.forward(&backend, &Tensor::zeros(&[2, 3, 7, 5]))?;
    assert_eq!(out.shape(), &[2, 3, 1, 1]);

    // 任何输入空间尺寸都一样
    for (h, w) in [(1, 1), (4, 9), (32, 32)] {
        let out = pool.forward(&backend, &Tensor::zeros(&[1, 8, h, w]))?;
        assert_eq!(out.shape(), &[1, 8, 1, 1]);
    }
    Ok(())
}

/// 1D/3D全局最大池化
#[test]
fn test_global_max_pool_other_ranks() -> Result<(), LayerError> {
    let backend = StubBackend::default();

    let pool = Pool::global_max_pool1d(None)?;
    let out = pool.forward(&backend, &Tensor::zeros(&[4, 16, 100]))?;
    assert_eq!(out.shape(), &[4, 16, 1]);
    assert!(pool.is_global());

    let pool = Pool::global_max_pool3d(None)?;
    let out = pool.forward(&backend, &Tensor::zeros(&[1, 2, 3, 4, 5]))?;
    assert_eq!(out.shape(), &[1, 2, 1, 1, 1]);
    Ok(())
}

/// channel-last轴排列下的池化
#[test]
fn test_pool_channel_last_layout() -> Result<(), LayerError> {
    let backend = StubBackend::default();
    let pool = Pool::max_pool1d(PoolSpec {
        pool_size: 2.into(),
        layout: Some("NWC".to_string()),
        ..Default::default()
    })?;
    let out = pool.forward(&backend, &Tensor::zeros(&[2, 10, 4]))?;
    assert_eq!(out.shape(), &[2, 5, 4]);
    Ok(())
}

/// 窗口大于输入时报ShapeMismatch
#[test]
fn test_pool_window_too_large() -> Result<(), LayerError> {
    let backend = StubBackend::default();
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: 5.into(),
        ..Default::default()
    })?;
    let err = pool
        .forward(&backend, &Tensor::zeros(&[1, 1, 2, 2]))
        .unwrap_err();
    assert!(matches!(err, LayerError::ShapeMismatch { .. }));
    Ok(())
}

/// 输入维数与空间秩不符
#[test]
fn test_pool_input_rank_mismatch() -> Result<(), LayerError> {
    let backend = StubBackend::default();
    let pool = Pool::max_pool3d(PoolSpec::default())?;
    let err = pool
        .forward(&backend, &Tensor::zeros(&[1, 2, 8, 8]))
        .unwrap_err();
    assert!(matches!(err, LayerError::ShapeMismatch { .. }));
    Ok(())
}

/// 池化层没有可学习参数
#[test]
fn test_pool_has_no_parameters() -> Result<(), LayerError> {
    let pool = Pool::avg_pool2d(PoolSpec::default())?;
    assert!(pool.parameters().is_empty());
    assert_eq!(pool.num_params(), 0);
    Ok(())
}

/// Display按gluon惯例无条件渲染全部字段
#[test]
fn test_pool_display_golden() -> Result<(), LayerError> {
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: 2.into(),
        ..Default::default()
    })?;
    assert_eq!(
        pool.to_string(),
        "MaxPool2D(size=(2, 2), stride=(2, 2), padding=(0, 0), ceil_mode=false)"
    );

    let pool = Pool::global_avg_pool2d(None)?;
    assert_eq!(
        pool.to_string(),
        "GlobalAvgPool2D(size=(1, 1), stride=(1, 1), padding=(0, 0), ceil_mode=true)"
    );
    Ok(())
}

/// 池化描述符IR往返
#[test]
fn test_pool_descriptor_round_trip() -> Result<(), LayerError> {
    let pool = Pool::max_pool2d(PoolSpec {
        pool_size: 3.into(),
        stride: Some(2.into()),
        padding: 1.into(),
        ceil_mode: true,
        ..Default::default()
    })?;
    let json = pool.describe().to_json().expect("序列化失败");
    let parsed = crate::nn::LayerDescriptor::from_json(&json).expect("反序列化失败");
    assert_eq!(parsed.name, "MaxPool2D");
    match parsed.op {
        crate::nn::OpDescriptor::Pool {
            kernel,
            stride,
            ceil_mode,
            global,
            ..
        } => {
            assert_eq!(kernel, vec![3, 3]);
            assert_eq!(stride, vec![2, 2]);
            assert!(ceil_mode);
            assert!(!global);
        }
        other => panic!("期望Pool描述，得到{other:?}"),
    }
    Ok(())
}
