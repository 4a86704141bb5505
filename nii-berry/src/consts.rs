//! 通用常量.

/// 单通道颜色.
pub mod gray {
    /// 单通道黑色. 退化切片归一化后的唯一像素值.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道白色. 归一化结果的上限.
    pub const WHITE: u8 = 0b_1111_1111;

    /// 像素是否是黑色?
    #[inline]
    pub const fn is_black(p: u8) -> bool {
        p == BLACK
    }
}

/// 文件命名规则.
pub mod naming {
    /// 边缘图文件名中的类别标记, 即 `slice_{index:03}_edges.png`.
    pub const EDGES_TAG: &str = "edges";

    /// 原始切片文件名中的类别标记, 即 `slice_{index:03}_original.png`.
    pub const ORIGINAL_TAG: &str = "original";

    /// 所有切片图像文件名的共同前缀.
    pub const SLICE_PREFIX: &str = "slice_";

    /// 预览图文件名前缀, 即 `preview_{index:03}.png`.
    pub const PREVIEW_PREFIX: &str = "preview_";

    /// 写出图像时使用的无损格式扩展名.
    pub const IMG_EXT: &str = "png";

    /// 数据集组装器能识别的图像扩展名 (大小写不敏感).
    pub const IMG_EXTS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff"];
}

/// 训练样本张量的默认高度.
pub const DEFAULT_IMG_HEIGHT: u32 = 256;

/// 训练样本张量的默认宽度.
pub const DEFAULT_IMG_WIDTH: u32 = 256;

/// 默认批大小.
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// 默认预取批数.
pub const DEFAULT_PREFETCH: usize = 2;

/// 预览时默认抽取的切片数.
pub const DEFAULT_PREVIEW_LEN: usize = 9;

/// 局部统计量默认窗口边长.
pub const DEFAULT_STATS_WINDOW: usize = 3;
