// crates/at_physics/src/turbulence/similarity.rs

//! 边界层相似理论扩散系数
//!
//! 垂直扩散系数（边界层内）：
//!
//! $$ K_z = \frac{\kappa u_* z (1 - z/z_i)^2}{\phi_h(z/L)} $$
//!
//! - 稳定 (`L > 0`)：`φh = 1 + 5 z/L`
//! - 不稳定 (`L < 0`)：`φh = (1 - 15 z/L)^(-1/2)`
//!
//! 结果不低于背景值；`z ≥ z_i` 时恰为背景值。
//!
//! 水平扩散系数：`K_h = min(c · Δx^(4/3), K_h,max)`。

/// von Kármán 常数
pub const VON_KARMAN: f64 = 0.4;

/// 稳定度函数 `φh(ζ)`，`ζ = z / L`
#[inline]
pub fn stability_function(zeta: f64) -> f64 {
    if zeta >= 0.0 {
        1.0 + 5.0 * zeta
    } else {
        (1.0 - 15.0 * zeta).powf(-0.5)
    }
}

/// 垂直扩散系数 [m²/s]
///
/// - `z_agl`: 离地高度 [m]
/// - `mixing_height`: 混合层高度 [m]
/// - `friction_velocity`: 摩擦速度 [m/s]
/// - `obukhov_length`: Obukhov 长度 [m]，0 或非有限值按中性处理
/// - `kz_background`: 背景扩散系数 [m²/s]
pub fn vertical_diffusivity(
    z_agl: f64,
    mixing_height: f64,
    friction_velocity: f64,
    obukhov_length: f64,
    kz_background: f64,
) -> f64 {
    if mixing_height.is_nan() || mixing_height <= 0.0 || z_agl.is_nan() || z_agl >= mixing_height {
        return kz_background;
    }
    let z = z_agl.max(0.0);
    let zeta = if obukhov_length.is_finite() && obukhov_length != 0.0 {
        z / obukhov_length
    } else {
        0.0
    };
    let shape = 1.0 - z / mixing_height;
    let kz = VON_KARMAN * friction_velocity.max(0.0) * z * shape * shape / stability_function(zeta);
    if kz.is_finite() {
        kz.max(kz_background)
    } else {
        kz_background
    }
}

/// 水平扩散系数 [m²/s]
#[inline]
pub fn horizontal_diffusivity(dx: f64, coefficient: f64, kh_max: f64) -> f64 {
    (coefficient * dx.max(0.0).powf(4.0 / 3.0)).min(kh_max)
}

/// 随机游走速度尺度 `σ = sqrt(2K / |dt|)`，使位移标准差为 `sqrt(2K|dt|)`
#[inline]
pub fn velocity_scale(diffusivity: f64, dt: f64) -> f64 {
    let dt = dt.abs();
    if dt == 0.0 || diffusivity.is_nan() || diffusivity <= 0.0 {
        return 0.0;
    }
    (2.0 * diffusivity / dt).sqrt()
}
