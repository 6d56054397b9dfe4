// crates/at_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 气象场在构造时需要满足坐标轴严格单调、数组尺寸一致等不变量，
//! 这些检查集中在这里，返回带定位信息的 [`AtError`]。

use crate::error::{AtError, AtResult};

/// 验证序列非空、有限且严格递增
pub fn ensure_strictly_increasing(name: &str, values: &[f64]) -> AtResult<()> {
    if values.is_empty() {
        return Err(AtError::invalid_input(format!("坐标轴 {} 为空", name)));
    }
    ensure_finite(name, values)?;
    for (index, pair) in values.windows(2).enumerate() {
        if pair[1] <= pair[0] {
            return Err(AtError::NonMonotonic {
                axis: name.to_string(),
                index: index + 1,
                value: pair[1],
                previous: pair[0],
            });
        }
    }
    Ok(())
}

/// 验证所有值有限
pub fn ensure_finite(name: &str, values: &[f64]) -> AtResult<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(AtError::NonFinite {
            name: name.to_string(),
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// 验证数组长度
pub fn ensure_len(name: &str, values: &[f64], expected: usize) -> AtResult<()> {
    if values.len() != expected {
        return Err(AtError::size_mismatch(name, expected, values.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_increasing() {
        assert!(ensure_strictly_increasing("lat", &[-10.0, 0.0, 10.0]).is_ok());
        assert!(ensure_strictly_increasing("lat", &[5.0]).is_ok());

        let err = ensure_strictly_increasing("lat", &[0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, AtError::NonMonotonic { index: 2, .. }));
    }

    #[test]
    fn test_empty_axis_rejected() {
        assert!(ensure_strictly_increasing("time", &[]).is_err());
    }

    #[test]
    fn test_non_finite_axis_rejected() {
        let err = ensure_strictly_increasing("lon", &[0.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, AtError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn test_ensure_len() {
        assert!(ensure_len("u", &[0.0; 4], 4).is_ok());
        assert!(matches!(
            ensure_len("u", &[0.0; 3], 4),
            Err(AtError::SizeMismatch { expected: 4, actual: 3, .. })
        ));
    }
}
