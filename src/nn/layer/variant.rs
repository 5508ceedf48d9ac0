/*
 * @Author       : 老董
 * @Date         : 2026-06-20
 * @Description  : 变体描述表
 *
 * gluon原版为每个变体各写一个子类（17+个近乎相同的薄类）；
 * 这里改为一张静态描述表 + 两个通用门面（Conv/Pool），
 * 每个变体只贡献一行：名字、空间秩、默认轴排列。
 */

/// 一个层变体的静态描述
#[derive(Debug)]
pub(in crate::nn) struct Variant {
    /// 变体名（用于Display与描述符）
    pub name: &'static str,
    /// 空间秩
    pub rank: usize,
    /// 默认轴排列
    pub default_layout: &'static str,
}

pub(in crate::nn) static CONV1D: Variant = Variant {
    name: "Conv1D",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static CONV2D: Variant = Variant {
    name: "Conv2D",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static CONV3D: Variant = Variant {
    name: "Conv3D",
    rank: 3,
    default_layout: "NCDHW",
};

pub(in crate::nn) static CONV1D_TRANSPOSE: Variant = Variant {
    name: "Conv1DTranspose",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static CONV2D_TRANSPOSE: Variant = Variant {
    name: "Conv2DTranspose",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static CONV3D_TRANSPOSE: Variant = Variant {
    name: "Conv3DTranspose",
    rank: 3,
    default_layout: "NCDHW",
};

pub(in crate::nn) static MAX_POOL1D: Variant = Variant {
    name: "MaxPool1D",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static MAX_POOL2D: Variant = Variant {
    name: "MaxPool2D",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static MAX_POOL3D: Variant = Variant {
    name: "MaxPool3D",
    rank: 3,
    default_layout: "NCDHW",
};

pub(in crate::nn) static AVG_POOL1D: Variant = Variant {
    name: "AvgPool1D",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static AVG_POOL2D: Variant = Variant {
    name: "AvgPool2D",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static AVG_POOL3D: Variant = Variant {
    name: "AvgPool3D",
    rank: 3,
    default_layout: "NCDHW",
};

pub(in crate::nn) static GLOBAL_MAX_POOL1D: Variant = Variant {
    name: "GlobalMaxPool1D",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static GLOBAL_MAX_POOL2D: Variant = Variant {
    name: "GlobalMaxPool2D",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static GLOBAL_MAX_POOL3D: Variant = Variant {
    name: "GlobalMaxPool3D",
    rank: 3,
    default_layout: "NCDHW",
};

pub(in crate::nn) static GLOBAL_AVG_POOL1D: Variant = Variant {
    name: "GlobalAvgPool1D",
    rank: 1,
    default_layout: "NCW",
};
pub(in crate::nn) static GLOBAL_AVG_POOL2D: Variant = Variant {
    name: "GlobalAvgPool2D",
    rank: 2,
    default_layout: "NCHW",
};
pub(in crate::nn) static GLOBAL_AVG_POOL3D: Variant = Variant {
    name: "GlobalAvgPool3D",
    rank: 3,
    default_layout: "NCDHW",
};
