// crates/at_physics/src/engine/batch.rs

//! 批量推进策略
//!
//! 所有活动气团以结构数组（SoA）存放，每轮对全部活动气团同步执行
//! 风场采样、预估、校正与最终平流。每个气团仍使用自己的步长与随机流，
//! 结果与逐条串行逐位一致。

use at_config::StartLocation;
use at_foundation::AtError;
use at_geo::advect_lonlat_batch;
use glam::DVec3;

use crate::engine::integrator::{provisional_lonlat, WindSampler};
use crate::error::TrajectoryResult;
use crate::trajectory::runner::{Particle, StepPlan};
use crate::trajectory::{Trajectory, TrajectoryEngine};

/// 活动气团的结构数组
#[derive(Debug, Default)]
pub struct BatchLanes {
    /// 经度
    pub lon: Vec<f64>,
    /// 纬度
    pub lat: Vec<f64>,
    /// 垂直坐标
    pub z: Vec<f64>,
    /// 纬向风
    pub u: Vec<f64>,
    /// 经向风
    pub v: Vec<f64>,
    /// 垂直速度
    pub w: Vec<f64>,
    /// 带符号步长
    pub dt: Vec<f64>,
}

impl BatchLanes {
    /// 预分配容量
    pub fn with_capacity(n: usize) -> Self {
        Self {
            lon: Vec::with_capacity(n),
            lat: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            u: Vec::with_capacity(n),
            v: Vec::with_capacity(n),
            w: Vec::with_capacity(n),
            dt: Vec::with_capacity(n),
        }
    }

    /// 清空
    pub fn clear(&mut self) {
        self.lon.clear();
        self.lat.clear();
        self.z.clear();
        self.u.clear();
        self.v.clear();
        self.w.clear();
        self.dt.clear();
    }

    /// 追加一个气团
    pub fn push(&mut self, lon: f64, lat: f64, z: f64, wind: DVec3, dt: f64) {
        self.lon.push(lon);
        self.lat.push(lat);
        self.z.push(z);
        self.u.push(wind.x);
        self.v.push(wind.y);
        self.w.push(wind.z);
        self.dt.push(dt);
    }

    /// 气团数
    pub fn len(&self) -> usize {
        self.lon.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.lon.is_empty()
    }

    /// 以当前风推进一步（水平球面平流，垂直线性）
    pub fn advect(&mut self) {
        advect_lonlat_batch(&mut self.lon, &mut self.lat, &self.u, &self.v, &self.dt);
        for i in 0..self.z.len() {
            self.z[i] += self.w[i] * self.dt[i];
        }
    }
}

/// 本轮参与推进的气团
struct Lane {
    slot: usize,
    wind: DVec3,
    plan: StepPlan,
}

/// 以批量策略运行
pub fn run_batch(
    engine: &TrajectoryEngine<'_>,
    sources: &[StartLocation],
    replicas: &[u32],
) -> Vec<TrajectoryResult<Trajectory>> {
    let mut results: Vec<Option<TrajectoryResult<Trajectory>>> = Vec::with_capacity(sources.len());
    let mut particles: Vec<Particle> = Vec::new();
    for (i, (source, &replica)) in sources.iter().zip(replicas).enumerate() {
        match engine.initialize_replica(i, source, replica) {
            Ok(p) => {
                particles.push(p);
                results.push(None);
            }
            Err(e) => results.push(Some(Err(e))),
        }
    }

    let integrator = engine.integrator();
    let mut lanes: Vec<Lane> = Vec::with_capacity(particles.len());
    let mut soa = BatchLanes::with_capacity(particles.len());

    loop {
        // 1. 起点风场与步长
        lanes.clear();
        for (slot, particle) in particles.iter_mut().enumerate() {
            if !particle.is_running() {
                continue;
            }
            match engine.begin_step(particle) {
                Ok(wind) => {
                    let plan = engine.plan_step(particle, wind);
                    lanes.push(Lane { slot, wind, plan });
                }
                Err(e) => engine.fail(particle, e),
            }
        }
        if lanes.is_empty() {
            break;
        }

        // 2. 预估与校正
        let mut effective: Vec<Option<DVec3>> = Vec::with_capacity(lanes.len());
        if integrator.needs_corrector() {
            soa.clear();
            for lane in &lanes {
                let pos = particles[lane.slot].position();
                soa.push(pos.lon, pos.lat, pos.z, lane.wind, lane.plan.dt);
            }
            soa.advect();
            for (k, lane) in lanes.iter().enumerate() {
                let (lon, lat) = provisional_lonlat(soa.lon[k], soa.lat[k]);
                let (lon, lat, z) = engine.settle(lon, lat, soa.z[k]);
                match engine.sample(lon, lat, z, lane.plan.new_time) {
                    Ok(corr) => effective.push(Some(integrator.effective_wind(lane.wind, Some(corr)))),
                    Err(e) => {
                        engine.fail(&mut particles[lane.slot], e);
                        effective.push(None);
                    }
                }
            }
        } else {
            effective.extend(lanes.iter().map(|lane| Some(integrator.effective_wind(lane.wind, None))));
        }

        // 3. 以有效风从原始位置推进
        let advancing: Vec<(Lane, DVec3)> = lanes
            .drain(..)
            .zip(effective)
            .filter_map(|(lane, wind)| wind.map(|wind| (lane, wind)))
            .collect();
        soa.clear();
        for (lane, wind) in &advancing {
            let pos = particles[lane.slot].position();
            soa.push(pos.lon, pos.lat, pos.z, *wind, lane.plan.dt);
        }
        soa.advect();

        // 4. 湍流、边界与提交
        for (k, (lane, _)) in advancing.iter().enumerate() {
            let moved = (soa.lon[k], soa.lat[k], soa.z[k]);
            engine.finish_step(&mut particles[lane.slot], &lane.plan, lane.wind, moved);
        }
    }

    let mut finished = particles.into_iter();
    results
        .into_iter()
        .map(|slot| match slot {
            Some(result) => result,
            None => finished
                .next()
                .map(|p| Ok(p.into_trajectory()))
                .unwrap_or_else(|| Err(AtError::internal("批量推进丢失气团").into())),
        })
        .collect()
}
