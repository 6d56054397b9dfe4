// crates/at_physics/src/boundary/handler.rs

//! 边界处理
//!
//! - 垂直：越过下界（地形）或上界（模式顶）时关于该边界反射，再夹到
//!   `[lower, upper]` 内
//! - 水平：纬度越过极点时折返（经度平移 180°），经度回绕到 `[-180, 180]`
//!
//! 发生垂直反射或跨极时置 `reflected`。

use at_geo::normalize_lonlat;

/// 边界处理结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryOutcome {
    /// 经度 [°]，位于 `[-180, 180]`
    pub lon: f64,
    /// 纬度 [°]，位于 `[-90, 90]`
    pub lat: f64,
    /// 垂直坐标，位于 `[lower, upper]`
    pub z: f64,
    /// 是否发生反射或跨极
    pub reflected: bool,
}

/// 边界处理器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryHandler {
    model_top: f64,
}

impl BoundaryHandler {
    /// 创建处理器
    pub fn new(model_top: f64) -> Self {
        Self { model_top }
    }

    /// 模式顶
    #[inline]
    pub fn model_top(&self) -> f64 {
        self.model_top
    }

    /// 以地形高度为下界、模式顶为上界处理位置
    pub fn apply(&self, lon: f64, lat: f64, z: f64, terrain_h: f64) -> BoundaryOutcome {
        self.apply_within(lon, lat, z, terrain_h, self.model_top)
    }

    /// 以任意垂直上下界处理位置
    ///
    /// `upper < lower` 时上界取 `lower`。
    pub fn apply_within(&self, lon: f64, lat: f64, z: f64, lower: f64, upper: f64) -> BoundaryOutcome {
        let (z, vertical) = reflect(z, lower, upper.max(lower));
        let (lon, lat, crossed) = normalize_lonlat(lon, lat);
        BoundaryOutcome {
            lon,
            lat,
            z,
            reflected: vertical || crossed,
        }
    }
}

/// 关于越过的边界反射一次后夹取
fn reflect(z: f64, lower: f64, upper: f64) -> (f64, bool) {
    if z.is_nan() {
        return (lower, true);
    }
    let reflected_z = if z < lower {
        2.0 * lower - z
    } else if z > upper {
        2.0 * upper - z
    } else {
        return (z, false);
    };
    (reflected_z.clamp(lower, upper), true)
}
