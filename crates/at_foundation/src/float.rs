// crates/at_foundation/src/float.rs

//! 浮点插值工具

/// 线性插值 `a + t (b - a)`
///
/// 采用该形式而非 `(1 - t) a + t b`，保证 `t == 0` 时精确返回 `a`。
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 {
        a
    } else {
        a + t * (b - a)
    }
}
