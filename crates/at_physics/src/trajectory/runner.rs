// crates/at_physics/src/trajectory/runner.rs

//! 轨迹引擎
//!
//! 单条轨迹的步进严格串行，每步依次执行：
//!
//! 1. 采样起点风场（已应用垂直运动模式）
//! 2. 规划步长：CFL 控制器，再受输出时刻、运行终点、最大年龄约束
//! 3. 积分格式推进
//! 4. 叠加湍流扰动
//! 5. 非有限值检查
//! 6. 数据范围检查与边界处理
//! 7. 提交：记录路径、质量衰减、通知观察者
//! 8. 终止判定与输出
//!
//! 步进中的错误转为轨迹终止状态，只影响该轨迹。

use std::sync::Arc;

use at_config::{RunConfig, StartLocation};
use at_foundation::validation::ensure_finite;
use at_foundation::AtError;
use at_geo::{advect_lonlat, normalize_lonlat};
use glam::DVec3;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use super::mass::MassDecay;
use super::observer::{NullObserver, StepObserver, StepSample};
use super::state::{ParcelPosition, Trajectory, TrajectoryStatus};
use crate::boundary::BoundaryHandler;
use crate::engine::integrator::{provisional_lonlat, ForwardEuler, HeunIntegrator, Integrator, WindSampler};
use crate::engine::parallel::{run_parallel, ExecutionStrategy};
use crate::engine::timestep::AdaptiveStepController;
use crate::engine::batch::run_batch;
use crate::error::{ensure_finite_value, TrajectoryError, TrajectoryResult};
use crate::field::{names, GriddedField, Interpolator, VerticalCoordinateKind};
use crate::turbulence::{replica_numbers, TurbulenceModel};
use crate::vertical::VerticalMotionResolver;

/// 时间比较容差 [s]
pub const TIME_TOLERANCE: f64 = 1e-6;

/// 单条轨迹的最大步数
pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

/// 引擎运行参数（由 `RunConfig` 一次性换算）
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    /// 积分方向 +1 / -1
    pub direction: f64,
    /// 运行时长 [s]（绝对值）
    pub duration: f64,
    /// 输出间隔 [s]
    pub output_interval: f64,
    /// 最大年龄 [s]
    pub max_age: Option<f64>,
    /// 模式顶
    pub model_top: f64,
    /// 缺省地形高度
    pub terrain_height: f64,
    /// 最大步数
    pub max_steps: usize,
}

impl EngineSettings {
    /// 从运行配置换算
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            direction: config.direction(),
            duration: config.total_run_seconds().abs(),
            output_interval: config.output_interval_seconds(),
            max_age: config.max_age_seconds(),
            model_top: config.model_top,
            terrain_height: config.terrain_height,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// 单步规划
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepPlan {
    /// 带符号步长 [s]
    pub dt: f64,
    /// 步末时刻
    pub new_time: f64,
    /// 步末已运行时长
    pub new_elapsed: f64,
}

/// 正在积分的气团
#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) trajectory: Trajectory,
    pub(crate) position: ParcelPosition,
    start_time: f64,
    elapsed: f64,
    next_output: f64,
    pub(crate) rng: ChaCha8Rng,
}

impl Particle {
    /// 当前轨迹
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// 当前位置
    pub fn position(&self) -> &ParcelPosition {
        &self.position
    }

    /// 已运行时长 [s]
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// 是否仍在积分
    pub fn is_running(&self) -> bool {
        self.trajectory.is_running()
    }

    /// 取出轨迹
    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }
}

/// 轨迹引擎
pub struct TrajectoryEngine<'a> {
    field: &'a GriddedField,
    interp: Interpolator<'a>,
    settings: EngineSettings,
    controller: AdaptiveStepController,
    integrator: Box<dyn Integrator>,
    vertical: VerticalMotionResolver,
    turbulence: TurbulenceModel,
    boundary: BoundaryHandler,
    mass: MassDecay,
    execution: ExecutionStrategy,
    observer: Arc<dyn StepObserver>,
    sources: Vec<StartLocation>,
}

impl<'a> TrajectoryEngine<'a> {
    /// 创建引擎，验证配置与垂直运动模式所需字段
    pub fn new(field: &'a GriddedField, config: &RunConfig) -> TrajectoryResult<Self> {
        config.validate()?;
        let vertical = VerticalMotionResolver::from_config(&config.vertical_motion);
        vertical.validate(field)?;

        let integrator: Box<dyn Integrator> = match config.integration {
            at_config::IntegrationScheme::Heun => Box::new(HeunIntegrator),
            at_config::IntegrationScheme::Euler => Box::new(ForwardEuler),
        };

        Ok(Self {
            field,
            interp: Interpolator::new(field),
            settings: EngineSettings::from_config(config),
            controller: AdaptiveStepController::from_config(config),
            integrator,
            vertical,
            turbulence: TurbulenceModel::from_config(&config.turbulence),
            boundary: BoundaryHandler::new(config.model_top),
            mass: MassDecay::from_config(&config.mass),
            execution: config.execution.into(),
            observer: Arc::new(NullObserver),
            sources: config.start_locations.clone(),
        })
    }

    /// 设置步进观察者
    pub fn with_observer(mut self, observer: Arc<dyn StepObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// 替换积分格式
    pub fn with_integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = integrator;
        self
    }

    /// 设置单条轨迹的最大步数
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.settings.max_steps = max_steps;
        self
    }

    /// 气象场
    pub fn field(&self) -> &'a GriddedField {
        self.field
    }

    /// 运行参数
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// 积分格式
    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    /// 垂直运动解析器
    pub fn vertical_motion(&self) -> &VerticalMotionResolver {
        &self.vertical
    }

    /// 湍流模型
    pub fn turbulence(&self) -> &TurbulenceModel {
        &self.turbulence
    }

    /// 配置中的起点
    pub fn sources(&self) -> &[StartLocation] {
        &self.sources
    }

    // ========================================================
    // 运行
    // ========================================================

    /// 按配置的执行策略运行配置中的起点
    pub fn run_configured(&self) -> Vec<TrajectoryResult<Trajectory>> {
        self.run_with(&self.sources, self.execution)
    }

    /// 按配置的执行策略运行
    pub fn run(&self, sources: &[StartLocation]) -> Vec<TrajectoryResult<Trajectory>> {
        self.run_with(sources, self.execution)
    }

    /// 以指定执行策略运行，结果按提交顺序返回
    pub fn run_with(&self, sources: &[StartLocation], strategy: ExecutionStrategy) -> Vec<TrajectoryResult<Trajectory>> {
        let resolved = strategy.resolve(sources.len());
        info!(
            sources = sources.len(),
            strategy = resolved.name(),
            integrator = self.integrator.name(),
            vertical = self.vertical.name(),
            turbulence = self.turbulence.is_enabled(),
            "开始轨迹计算"
        );

        let replicas = replica_numbers(sources);
        let results = match resolved {
            ExecutionStrategy::Parallel => run_parallel(self, sources, &replicas),
            ExecutionStrategy::Batch => run_batch(self, sources, &replicas),
            ExecutionStrategy::Sequential | ExecutionStrategy::Auto => sources
                .iter()
                .zip(&replicas)
                .enumerate()
                .map(|(i, (source, &replica))| self.run_replica(i, source, replica))
                .collect(),
        };

        let mut completed = 0usize;
        for (i, result) in results.iter().enumerate() {
            match result {
                Ok(traj) if traj.status == TrajectoryStatus::CompletedNormally => completed += 1,
                Ok(_) => {}
                Err(e) => warn!(source = i, "起点初始化失败: {}", e),
            }
        }
        info!(completed, total = results.len(), "轨迹计算结束");
        results
    }

    /// 运行单个起点直至终止
    pub fn run_source(&self, index: usize, source: &StartLocation) -> TrajectoryResult<Trajectory> {
        self.run_replica(index, source, 0)
    }

    /// 运行同坐标起点中的第 `replica` 个副本
    pub fn run_replica(&self, index: usize, source: &StartLocation, replica: u32) -> TrajectoryResult<Trajectory> {
        let mut particle = self.initialize_replica(index, source, replica)?;
        while particle.is_running() {
            self.step(&mut particle);
        }
        Ok(particle.into_trajectory())
    }

    /// 初始化起点
    ///
    /// 坐标非有限或纬度超出 `[-90, 90]` 时返回输入错误，
    /// 垂直坐标不在垂直轴范围内时返回 `InvalidCoordinate`，
    /// 起始时刻或水平位置不在数据范围内时返回 `Boundary`。
    pub fn initialize(&self, index: usize, source: &StartLocation) -> TrajectoryResult<Particle> {
        self.initialize_replica(index, source, 0)
    }

    /// 初始化同坐标起点中的第 `replica` 个副本
    pub fn initialize_replica(
        &self,
        index: usize,
        source: &StartLocation,
        replica: u32,
    ) -> TrajectoryResult<Particle> {
        ensure_finite("start_location", &[source.lon, source.lat, source.z])?;
        if !(-90.0..=90.0).contains(&source.lat) {
            return Err(AtError::out_of_range("lat", source.lat, -90.0, 90.0).into());
        }

        let level = self.field.level_axis();
        if !level.contains(source.z) {
            return Err(TrajectoryError::InvalidCoordinate {
                value: source.z,
                min: level.first(),
                max: level.last(),
            });
        }

        let time_axis = self.field.time_axis();
        let start_time = source.start_time.unwrap_or(if self.settings.direction > 0.0 {
            time_axis.first()
        } else {
            time_axis.last()
        });
        if !time_axis.contains(start_time) {
            return Err(time_axis.out_of_range(start_time));
        }

        let (lon, lat, _) = normalize_lonlat(source.lon, source.lat);
        self.ensure_horizontal(lon, lat)?;

        let origin = ParcelPosition::new(start_time, lon, lat, source.z);
        Ok(Particle {
            trajectory: Trajectory::start(index, *source, origin, self.mass.initial()),
            position: origin,
            start_time,
            elapsed: 0.0,
            next_output: self.settings.output_interval,
            rng: self.turbulence.rng_for_source(source, replica),
        })
    }

    /// 推进一步；已终止的气团不做任何事
    pub fn step(&self, particle: &mut Particle) {
        if !particle.is_running() {
            return;
        }
        let wind = match self.begin_step(particle) {
            Ok(wind) => wind,
            Err(e) => return self.fail(particle, e),
        };
        let plan = self.plan_step(particle, wind);
        match self
            .integrator
            .step(self, &particle.position, wind, plan.dt, plan.new_time)
        {
            Ok(moved) => self.finish_step(particle, &plan, wind, moved),
            Err(e) => self.fail(particle, e),
        }
    }

    // ========================================================
    // 步进各阶段（批量策略复用）
    // ========================================================

    /// 步数检查并采样起点风场
    pub(crate) fn begin_step(&self, particle: &Particle) -> TrajectoryResult<DVec3> {
        if particle.trajectory.steps >= self.settings.max_steps {
            return Err(TrajectoryError::instability(
                "steps",
                particle.trajectory.steps as f64,
            ));
        }
        self.sample_at(&particle.position)
    }

    /// 采样风场并应用垂直运动模式
    pub(crate) fn sample_at(&self, pos: &ParcelPosition) -> TrajectoryResult<DVec3> {
        let raw = self.interp.wind(pos.lon, pos.lat, pos.z, pos.time)?;
        let wind = self.vertical.resolve(&self.interp, pos, raw)?;
        ensure_finite_value("u", wind.x)?;
        ensure_finite_value("v", wind.y)?;
        ensure_finite_value("w", wind.z)?;
        Ok(wind)
    }

    /// 规划步长
    pub(crate) fn plan_step(&self, particle: &Particle, wind: DVec3) -> StepPlan {
        let direction = self.settings.direction;
        let step = self
            .controller
            .compute_dt(self.field, wind, &particle.position, direction);

        let mut dt_abs = step.dt.abs();
        let (mut new_time, mut new_elapsed) = match step.target {
            Some(node) => (node, (node - particle.start_time) * direction),
            None => (particle.position.time + step.dt, particle.elapsed + dt_abs),
        };

        let limits = [
            Some(self.settings.duration),
            Some(particle.next_output),
            self.settings.max_age,
        ];
        for limit in limits.into_iter().flatten() {
            let remaining = limit - particle.elapsed;
            if remaining > TIME_TOLERANCE && remaining <= dt_abs {
                dt_abs = remaining;
                new_elapsed = limit;
                new_time = particle.start_time + direction * limit;
            }
        }

        StepPlan {
            dt: direction * dt_abs,
            new_time,
            new_elapsed,
        }
    }

    /// 湍流、边界处理、提交与终止判定
    pub(crate) fn finish_step(
        &self,
        particle: &mut Particle,
        plan: &StepPlan,
        wind: DVec3,
        moved: (f64, f64, f64),
    ) {
        match self.settle_step(particle, plan, moved) {
            Ok((position, reflected)) => {
                if reflected {
                    particle.trajectory.reflections += 1;
                    trace!(
                        source = particle.trajectory.source_index,
                        step = particle.trajectory.steps + 1,
                        z = position.z,
                        "边界反射"
                    );
                }
                self.commit(particle, plan, wind, position)
            }
            Err(e) => self.fail(particle, e),
        }
    }

    /// 以错误终止轨迹
    pub(crate) fn fail(&self, particle: &mut Particle, err: TrajectoryError) {
        let status = if err.is_boundary() {
            TrajectoryStatus::BoundaryError
        } else {
            TrajectoryStatus::NumericalInstability
        };
        debug!(
            source = particle.trajectory.source_index,
            steps = particle.trajectory.steps,
            status = status.name(),
            "轨迹终止: {}",
            err
        );
        particle.trajectory.terminate(status, Some(err.to_string()));
    }

    fn settle_step(
        &self,
        particle: &mut Particle,
        plan: &StepPlan,
        moved: (f64, f64, f64),
    ) -> TrajectoryResult<(ParcelPosition, bool)> {
        let (mut lon, mut lat, mut z) = moved;

        if self.turbulence.is_enabled() {
            let (hlon, hlat) = provisional_lonlat(lon, lat);
            let here = ParcelPosition::new(plan.new_time, hlon, hlat, self.field.level_axis().clamp(z));
            let ground = self.ground_height(&here)?;
            let kick = self
                .turbulence
                .get_perturbation(&self.interp, &here, ground, plan.dt, &mut particle.rng)?;
            let (plon, plat) = advect_lonlat(lon, lat, kick.x, kick.y, plan.dt);
            lon = plon;
            lat = plat;
            z += kick.z * plan.dt;
        }

        ensure_finite_value("lon", lon)?;
        ensure_finite_value("lat", lat)?;
        ensure_finite_value("z", z)?;

        let (hlon, hlat, _) = normalize_lonlat(lon, lat);
        self.ensure_horizontal(hlon, hlat)?;
        let (lower, upper) = self.vertical_bounds(&ParcelPosition::new(plan.new_time, hlon, hlat, z))?;
        let out = self.boundary.apply_within(lon, lat, z, lower, upper);
        Ok((ParcelPosition::new(plan.new_time, out.lon, out.lat, out.z), out.reflected))
    }

    fn commit(&self, particle: &mut Particle, plan: &StepPlan, wind: DVec3, position: ParcelPosition) {
        particle.position = position;
        particle.elapsed = plan.new_elapsed;
        particle.trajectory.push_step(position);
        particle.trajectory.mass = self.mass.decay(particle.trajectory.mass, plan.dt);

        self.observer.on_step(&StepSample {
            source_index: particle.trajectory.source_index,
            lon: position.lon,
            lat: position.lat,
            wind_speed: wind.truncate().length(),
            dt: plan.dt,
        });

        let interval = self.settings.output_interval;
        if particle.elapsed >= particle.next_output - TIME_TOLERANCE {
            particle.trajectory.record_output(position);
            while particle.next_output <= particle.elapsed + TIME_TOLERANCE {
                particle.next_output += interval;
            }
        }

        let status = if particle.elapsed >= self.settings.duration - TIME_TOLERANCE {
            Some(TrajectoryStatus::CompletedNormally)
        } else if self
            .settings
            .max_age
            .is_some_and(|age| particle.elapsed >= age - TIME_TOLERANCE)
        {
            Some(TrajectoryStatus::MaxAgeExceeded)
        } else if self.mass.is_depleted(particle.trajectory.mass) {
            Some(TrajectoryStatus::MassDepleted)
        } else {
            None
        };

        if let Some(status) = status {
            debug!(
                source = particle.trajectory.source_index,
                steps = particle.trajectory.steps,
                status = status.name(),
                reflections = particle.trajectory.reflections,
                "轨迹终止"
            );
            particle.trajectory.terminate(status, None);
        }
    }

    // ========================================================
    // 辅助
    // ========================================================

    fn ensure_horizontal(&self, lon: f64, lat: f64) -> TrajectoryResult<()> {
        let lat_axis = self.field.lat_axis();
        if !lat_axis.contains(lat) {
            return Err(lat_axis.out_of_range(lat));
        }
        if !self.field.contains_horizontal(lon, lat) {
            return Err(self
                .field
                .lon_axis()
                .out_of_range(self.field.normalize_longitude(lon)));
        }
        Ok(())
    }

    /// 地面高度：地形地面场优先，否则取配置值
    fn ground_height(&self, pos: &ParcelPosition) -> TrajectoryResult<f64> {
        Ok(self
            .interp
            .try_surface(names::TERRAIN_HEIGHT, pos.lon, pos.lat, pos.time)?
            .unwrap_or(self.settings.terrain_height))
    }

    /// 垂直上下界
    ///
    /// 高度坐标取 `[max(地形, 轴下限), min(模式顶, 轴上限)]`，其余坐标取垂直轴范围。
    fn vertical_bounds(&self, pos: &ParcelPosition) -> TrajectoryResult<(f64, f64)> {
        let axis = self.field.level_axis();
        match self.field.vertical_kind() {
            VerticalCoordinateKind::Height => {
                let ground = self.ground_height(pos)?;
                Ok((
                    ground.max(axis.first()),
                    self.settings.model_top.min(axis.last()),
                ))
            }
            _ => Ok((axis.first(), axis.last())),
        }
    }
}

impl WindSampler for TrajectoryEngine<'_> {
    fn sample(&self, lon: f64, lat: f64, z: f64, t: f64) -> TrajectoryResult<DVec3> {
        self.sample_at(&ParcelPosition::new(t, lon, lat, z))
    }

    fn settle(&self, lon: f64, lat: f64, z: f64) -> (f64, f64, f64) {
        (
            self.field.normalize_longitude(lon),
            lat,
            self.field.level_axis().clamp(z),
        )
    }
}
