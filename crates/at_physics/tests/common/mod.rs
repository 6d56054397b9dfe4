// crates/at_physics/tests/common/mod.rs

//! 集成测试共用的气象场

#![allow(dead_code)]

use at_physics::prelude::*;
use glam::DVec3;

/// 经纬度 -10..10（1°），高度 0..5000 m（500 m），时间 0..7200 s（3600 s）
pub fn axes() -> (Axis, Axis, Axis, Axis) {
    (
        Axis::regular("lon", -10.0, 1.0, 21).unwrap(),
        Axis::regular("lat", -10.0, 1.0, 21).unwrap(),
        Axis::regular("level", 0.0, 500.0, 11).unwrap(),
        Axis::regular("time", 0.0, 3600.0, 3).unwrap(),
    )
}

/// 时空均匀风场
pub fn uniform_field(wind: DVec3) -> GriddedField {
    let (lon, lat, level, time) = axes();
    GriddedField::uniform(lon, lat, level, time, VerticalCoordinateKind::Height, wind).unwrap()
}

/// 风随位置与时间线性变化的气象场
///
/// `u = 5 + 0.2·lat + 0.3·t[h]`，`v = 1 + 0.1·lon`，`w = 0.05 + 1e-5·z`
pub fn sheared_field() -> GriddedField {
    let (lon, lat, level, time) = axes();
    let n = time.len() * level.len() * lat.len() * lon.len();
    let mut u = Vec::with_capacity(n);
    let mut v = Vec::with_capacity(n);
    let mut w = Vec::with_capacity(n);
    for &t in time.values() {
        for &z in level.values() {
            for &y in lat.values() {
                for &x in lon.values() {
                    u.push(5.0 + 0.2 * y + 0.3 * t / 3600.0);
                    v.push(1.0 + 0.1 * x);
                    w.push(0.05 + 1e-5 * z);
                }
            }
        }
    }
    GriddedField::new(lon, lat, level, time, VerticalCoordinateKind::Height, u, v, w).unwrap()
}
