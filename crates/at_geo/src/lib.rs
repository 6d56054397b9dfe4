// crates/at_geo/src/lib.rs
//! AtmoTrace 地理空间处理模块
//!
//! 提供球面地球上的平流位移换算与经纬度规范化。
//!
//! # 模块
//!
//! - `sphere`: 球体参数、风速 (m/s) → 经纬度增量 (°) 的换算
//! - `normalize`: 经度回绕、纬度跨极折返
//!
//! # 示例
//!
//! ```
//! use at_geo::prelude::*;
//!
//! // 赤道上 10 m/s 东风吹 1 小时
//! let (lon, lat) = advect_lonlat(0.0, 0.0, 10.0, 0.0, 3600.0);
//! assert!((lon - 0.3237).abs() < 1e-3);
//! assert_eq!(lat, 0.0);
//!
//! assert_eq!(wrap_longitude(190.0), -170.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod normalize;
pub mod sphere;

/// 预导入模块
pub mod prelude {
    pub use crate::normalize::{fold_latitude, normalize_lonlat, wrap_longitude};
    pub use crate::sphere::{advect_lonlat, Sphere, EARTH_RADIUS};
}

// 重导出常用类型
pub use normalize::{fold_latitude, normalize_lonlat, wrap_longitude};
pub use sphere::{advect_lonlat, advect_lonlat_batch, Sphere, EARTH_RADIUS, MIN_COS_LAT};
