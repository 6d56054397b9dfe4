// crates/at_physics/src/trajectory/observer.rs

//! 步进观察接口
//!
//! 引擎在每个接受步之后报告 `(lon, lat, wind_speed, dt)`，供外部的
//! 子区域扩展逻辑判断是否需要在下一次插值前扩大气象场范围。
//! 并行执行时观察者会被多个线程同时调用。

use parking_lot::Mutex;
use serde::Serialize;

/// 单步采样
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepSample {
    /// 起点序号
    pub source_index: usize,
    /// 经度 [°]
    pub lon: f64,
    /// 纬度 [°]
    pub lat: f64,
    /// 水平风速 [m/s]
    pub wind_speed: f64,
    /// 步长 [s]（带符号）
    pub dt: f64,
}

/// 步进观察者
pub trait StepObserver: Send + Sync {
    /// 每个接受步之后调用
    fn on_step(&self, sample: &StepSample);
}

/// 不做任何事的观察者
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StepObserver for NullObserver {
    #[inline]
    fn on_step(&self, _sample: &StepSample) {}
}

/// 观测到的轨迹覆盖范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ObservedExtent {
    /// 最小经度
    pub lon_min: f64,
    /// 最大经度
    pub lon_max: f64,
    /// 最小纬度
    pub lat_min: f64,
    /// 最大纬度
    pub lat_max: f64,
    /// 最大水平风速 [m/s]
    pub max_wind_speed: f64,
    /// 最大步长绝对值 [s]
    pub max_abs_dt: f64,
    /// 采样数
    pub samples: usize,
}

impl ObservedExtent {
    fn from_sample(s: &StepSample) -> Self {
        Self {
            lon_min: s.lon,
            lon_max: s.lon,
            lat_min: s.lat,
            lat_max: s.lat,
            max_wind_speed: s.wind_speed,
            max_abs_dt: s.dt.abs(),
            samples: 1,
        }
    }

    fn include(&mut self, s: &StepSample) {
        self.lon_min = self.lon_min.min(s.lon);
        self.lon_max = self.lon_max.max(s.lon);
        self.lat_min = self.lat_min.min(s.lat);
        self.lat_max = self.lat_max.max(s.lat);
        self.max_wind_speed = self.max_wind_speed.max(s.wind_speed);
        self.max_abs_dt = self.max_abs_dt.max(s.dt.abs());
        self.samples += 1;
    }

    /// 单步最大可能位移 [m]
    pub fn max_step_distance(&self) -> f64 {
        self.max_wind_speed * self.max_abs_dt
    }
}

/// 累积观测范围的观察者
#[derive(Debug, Default)]
pub struct ExtentTracker {
    extent: Mutex<Option<ObservedExtent>>,
}

impl ExtentTracker {
    /// 创建空跟踪器
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前观测范围
    pub fn extent(&self) -> Option<ObservedExtent> {
        *self.extent.lock()
    }

    /// 清空
    pub fn reset(&self) {
        *self.extent.lock() = None;
    }
}

impl StepObserver for ExtentTracker {
    fn on_step(&self, sample: &StepSample) {
        let mut guard = self.extent.lock();
        match guard.as_mut() {
            Some(extent) => extent.include(sample),
            None => *guard = Some(ObservedExtent::from_sample(sample)),
        }
    }
}
