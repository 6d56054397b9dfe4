// crates/at_physics/src/trajectory/mass.rs

//! 质量衰减
//!
//! 按半衰期做指数衰减 `m(t+dt) = m(t) · exp(-λ|dt|)`，`λ = ln2 / T½`。
//! 剩余比例低于阈值时轨迹以 `MassDepleted` 终止。

use at_config::MassConfig;

/// 质量衰减规则
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassDecay {
    initial: f64,
    /// 衰减率 λ [1/s]
    rate: Option<f64>,
    threshold: f64,
}

impl Default for MassDecay {
    fn default() -> Self {
        Self::from_config(&MassConfig::default())
    }
}

impl MassDecay {
    /// 从配置创建
    pub fn from_config(config: &MassConfig) -> Self {
        Self {
            initial: config.initial_mass,
            rate: config
                .half_life_hours
                .map(|h| std::f64::consts::LN_2 / (h * 3600.0)),
            threshold: config.depletion_threshold,
        }
    }

    /// 初始质量
    #[inline]
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// 衰减一步
    #[inline]
    pub fn decay(&self, mass: f64, dt: f64) -> f64 {
        match self.rate {
            Some(rate) => mass * (-rate * dt.abs()).exp(),
            None => mass,
        }
    }

    /// 是否耗尽
    #[inline]
    pub fn is_depleted(&self, mass: f64) -> bool {
        mass < self.initial * self.threshold
    }
}
