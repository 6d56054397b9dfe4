// crates/at_physics/src/turbulence/model.rs

//! 湍流扰动模型
//!
//! 扰动速度 `σ ξ`，`σ = sqrt(2K / |dt|)`，`ξ ~ N(0, 1)`；
//! 乘以步长后位移标准差为 `sqrt(2K|dt|)`。
//!
//! 随机数由调用方显式传入。每个起点使用独立的 `ChaCha8Rng`，种子由
//! 运行种子、起点坐标与同坐标副本序号混合得到，因此某个起点的随机序列
//! 与同批次的其他起点无关。关闭湍流时不触碰随机数发生器，扰动恒为零。

use std::collections::HashMap;

use at_config::{StartLocation, TurbulenceConfig};
use at_geo::Sphere;
use glam::DVec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use super::similarity::{horizontal_diffusivity, velocity_scale, vertical_diffusivity};
use crate::error::TrajectoryResult;
use crate::field::{names, Axis, Interpolator, VerticalCoordinateKind};
use crate::trajectory::ParcelPosition;

/// 标准大气标高 [m]
pub const SCALE_HEIGHT: f64 = 8434.5;

/// SplitMix64 混合
#[inline]
pub fn splitmix64(state: u64) -> u64 {
    let mut z = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// 由运行种子、起点坐标与副本序号派生起点种子
///
/// 坐标完全相同的起点以 `replica` 区分，同点多次释放得到各自独立的随机流；
/// 增删其他坐标的起点不会改变任何起点的种子。
pub fn source_seed(run_seed: u64, source: &StartLocation, replica: u32) -> u64 {
    source_key(source)
        .into_iter()
        .chain(std::iter::once(u64::from(replica)))
        .fold(splitmix64(run_seed), |state, bits| splitmix64(state ^ bits))
}

fn source_key(source: &StartLocation) -> [u64; 4] {
    let time_bits = source.start_time.map_or(u64::MAX, f64::to_bits);
    [source.lon.to_bits(), source.lat.to_bits(), source.z.to_bits(), time_bits]
}

/// 每个起点在同坐标起点中的出现序号（从 0 开始）
pub fn replica_numbers(sources: &[StartLocation]) -> Vec<u32> {
    let mut seen: HashMap<[u64; 4], u32> = HashMap::with_capacity(sources.len());
    sources
        .iter()
        .map(|source| {
            let count = seen.entry(source_key(source)).or_insert(0);
            let replica = *count;
            *count += 1;
            replica
        })
        .collect()
}

/// 边界层参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryLayer {
    /// 摩擦速度 [m/s]
    pub friction_velocity: f64,
    /// Obukhov 长度 [m]
    pub obukhov_length: f64,
    /// 混合层高度 [m]
    pub mixing_height: f64,
}

/// 湍流扰动模型
#[derive(Debug, Clone)]
pub struct TurbulenceModel {
    config: TurbulenceConfig,
    sphere: Sphere,
}

impl Default for TurbulenceModel {
    fn default() -> Self {
        Self::disabled()
    }
}

impl TurbulenceModel {
    /// 关闭湍流
    pub fn disabled() -> Self {
        Self {
            config: TurbulenceConfig::default(),
            sphere: Sphere::EARTH,
        }
    }

    /// 从配置创建
    pub fn from_config(config: &TurbulenceConfig) -> Self {
        Self {
            config: config.clone(),
            sphere: Sphere::EARTH,
        }
    }

    /// 是否启用
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// 湍流配置
    pub fn config(&self) -> &TurbulenceConfig {
        &self.config
    }

    /// 为起点创建独立随机数发生器
    pub fn rng_for_source(&self, source: &StartLocation, replica: u32) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(source_seed(self.config.seed, source, replica))
    }

    /// 位置处的边界层参数：地面场优先，否则取配置值
    pub fn boundary_layer(&self, interp: &Interpolator<'_>, pos: &ParcelPosition) -> TrajectoryResult<BoundaryLayer> {
        let lookup = |name: &str, fallback: f64| -> TrajectoryResult<f64> {
            Ok(interp
                .try_surface(name, pos.lon, pos.lat, pos.time)?
                .unwrap_or(fallback))
        };
        Ok(BoundaryLayer {
            friction_velocity: lookup(names::FRICTION_VELOCITY, self.config.friction_velocity)?,
            obukhov_length: lookup(names::OBUKHOV_LENGTH, self.config.obukhov_length)?,
            mixing_height: lookup(names::MIXING_HEIGHT, self.config.mixing_height)?,
        })
    }

    /// 湍流扰动速度 `(du, dv, dw)`
    ///
    /// `ground` 为位置处的地面高度 [m]（仅高度坐标使用）；`dw` 以气象场的
    /// 垂直坐标单位表示，位温坐标下恒为 0。
    pub fn get_perturbation<R: Rng + ?Sized>(
        &self,
        interp: &Interpolator<'_>,
        pos: &ParcelPosition,
        ground: f64,
        dt: f64,
        rng: &mut R,
    ) -> TrajectoryResult<DVec3> {
        if !self.config.enabled || dt == 0.0 {
            return Ok(DVec3::ZERO);
        }

        let field = interp.field();
        let layer = self.boundary_layer(interp, pos)?;
        let (z_agl, to_native) = vertical_frame(field.vertical_kind(), field.level_axis(), pos.z, ground);

        let kz = vertical_diffusivity(
            z_agl,
            layer.mixing_height,
            layer.friction_velocity,
            layer.obukhov_length,
            self.config.kz_background,
        );
        let kh = horizontal_diffusivity(
            self.horizontal_spacing(interp, pos),
            self.config.kh_coefficient,
            self.config.kh_max,
        );

        let sigma_h = velocity_scale(kh, dt);
        let sigma_w = velocity_scale(kz, dt);

        // 固定抽样顺序 x, y, z
        let xi_u: f64 = StandardNormal.sample(rng);
        let xi_v: f64 = StandardNormal.sample(rng);
        let xi_w: f64 = StandardNormal.sample(rng);

        Ok(DVec3::new(sigma_h * xi_u, sigma_h * xi_v, sigma_w * xi_w * to_native))
    }

    /// 局部水平网格间距 [m]（经纬向的平均）
    fn horizontal_spacing(&self, interp: &Interpolator<'_>, pos: &ParcelPosition) -> f64 {
        let field = interp.field();
        let dx = field
            .lon_axis()
            .spacing_at(field.normalize_longitude(pos.lon))
            .map(|d| d * self.sphere.meters_per_degree_lon(pos.lat));
        let dy = field
            .lat_axis()
            .spacing_at(pos.lat)
            .map(|d| d * self.sphere.meters_per_degree_lat());
        match (dx, dy) {
            (Some(a), Some(b)) => 0.5 * (a + b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => 0.0,
        }
    }
}

/// 离地高度 [m] 与 m/s → 垂直坐标单位/s 的换算系数
///
/// 气压与 sigma 坐标使用标高关系 `z = H ln(p_s / p)`。
pub fn vertical_frame(kind: VerticalCoordinateKind, level: &Axis, z: f64, ground: f64) -> (f64, f64) {
    match kind {
        VerticalCoordinateKind::Height => (z - ground, 1.0),
        VerticalCoordinateKind::Pressure => {
            if z <= 0.0 {
                return (f64::INFINITY, 0.0);
            }
            let surface = level.last();
            (SCALE_HEIGHT * (surface / z).ln(), -z / SCALE_HEIGHT)
        }
        VerticalCoordinateKind::Sigma => {
            if z <= 0.0 {
                return (f64::INFINITY, 0.0);
            }
            (-SCALE_HEIGHT * z.min(1.0).ln(), -z / SCALE_HEIGHT)
        }
        VerticalCoordinateKind::Isentropic => (f64::INFINITY, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::GriddedField;

    fn field() -> GriddedField {
        GriddedField::uniform(
            Axis::regular("lon", -5.0, 1.0, 11).unwrap(),
            Axis::regular("lat", -5.0, 1.0, 11).unwrap(),
            Axis::regular("level", 0.0, 250.0, 9).unwrap(),
            Axis::regular("time", 0.0, 3600.0, 2).unwrap(),
            VerticalCoordinateKind::Height,
            DVec3::new(3.0, 1.0, 0.0),
        )
        .unwrap()
    }

    #[test]
    fn test_disabled_is_zero_and_leaves_rng_untouched() {
        let field = field();
        let interp = Interpolator::new(&field);
        let model = TurbulenceModel::disabled();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut reference = ChaCha8Rng::seed_from_u64(7);
        for i in 0..20 {
            let pos = ParcelPosition::new(100.0 * i as f64, 0.5 * i as f64 - 4.0, 1.0, 100.0 * i as f64);
            let p = model.get_perturbation(&interp, &pos, 0.0, 600.0, &mut rng).unwrap();
            assert_eq!(p, DVec3::ZERO);
        }
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_seeded_reproducible() {
        let field = field();
        let interp = Interpolator::new(&field);
        let model = TurbulenceModel::from_config(&TurbulenceConfig::enabled_with_seed(11));
        let source = StartLocation::new(0.0, 0.0, 200.0);
        let pos = ParcelPosition::new(0.0, 0.0, 0.0, 200.0);

        let mut a = model.rng_for_source(&source, 0);
        let mut b = model.rng_for_source(&source, 0);
        let pa = model.get_perturbation(&interp, &pos, 0.0, 300.0, &mut a).unwrap();
        let pb = model.get_perturbation(&interp, &pos, 0.0, 300.0, &mut b).unwrap();
        assert_eq!(pa, pb);
        assert_ne!(pa, DVec3::ZERO);
    }

    #[test]
    fn test_source_seed_depends_on_location() {
        let a = StartLocation::new(0.0, 0.0, 200.0);
        let b = StartLocation::new(0.0, 0.0, 300.0);
        assert_ne!(source_seed(1, &a, 0), source_seed(1, &b, 0));
        assert_ne!(source_seed(1, &a, 0), source_seed(2, &a, 0));
        assert_eq!(source_seed(1, &a, 0), source_seed(1, &a, 0));
        assert_ne!(source_seed(1, &a, 0), source_seed(1, &a, 1));
    }

    #[test]
    fn test_replica_numbers() {
        let a = StartLocation::new(0.0, 70.0, 500.0);
        let b = StartLocation::new(1.0, 70.0, 500.0);
        assert_eq!(replica_numbers(&[a, b, a, a, b]), vec![0, 0, 1, 2, 1]);
        // 插入其他坐标的起点不改变序号
        assert_eq!(replica_numbers(&[b, a, a]), vec![0, 0, 1]);
    }

    #[test]
    fn test_free_troposphere_uses_background() {
        let field = field();
        let interp = Interpolator::new(&field);
        let mut config = TurbulenceConfig::enabled_with_seed(3);
        config.mixing_height = 500.0;
        config.kz_background = 0.5;
        config.kh_max = 0.0;
        let model = TurbulenceModel::from_config(&config);

        // 混合层之上，σw = sqrt(2·0.5/|dt|)
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut reference = ChaCha8Rng::seed_from_u64(0);
        let pos = ParcelPosition::new(0.0, 0.0, 0.0, 1500.0);
        let p = model.get_perturbation(&interp, &pos, 0.0, 100.0, &mut rng).unwrap();
        let _: f64 = StandardNormal.sample(&mut reference);
        let _: f64 = StandardNormal.sample(&mut reference);
        let xi: f64 = StandardNormal.sample(&mut reference);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, 0.0);
        assert!((p.z - 0.1 * xi).abs() < 1e-12);
    }

    #[test]
    fn test_surface_fields_override_config() {
        let field = field();
        let n = field.surface_node_count();
        let field = field
            .with_surface(names::MIXING_HEIGHT, vec![2000.0; n])
            .unwrap();
        let interp = Interpolator::new(&field);
        let model = TurbulenceModel::from_config(&TurbulenceConfig::enabled_with_seed(0));
        let layer = model
            .boundary_layer(&interp, &ParcelPosition::new(0.0, 0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(layer.mixing_height, 2000.0);
        assert_eq!(layer.friction_velocity, model.config().friction_velocity);
    }

    #[test]
    fn test_vertical_frame() {
        let axis = Axis::new("level", vec![500.0, 850.0, 1000.0]).unwrap();
        let (agl, factor) = vertical_frame(VerticalCoordinateKind::Pressure, &axis, 1000.0, 0.0);
        assert_eq!(agl, 0.0);
        assert!(factor < 0.0);
        let (agl, _) = vertical_frame(VerticalCoordinateKind::Height, &axis, 800.0, 300.0);
        assert_eq!(agl, 500.0);
        let (_, factor) = vertical_frame(VerticalCoordinateKind::Isentropic, &axis, 300.0, 0.0);
        assert_eq!(factor, 0.0);
    }
}
