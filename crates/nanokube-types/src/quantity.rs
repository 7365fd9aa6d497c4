//! Resource quantity conversion: Kubernetes-style strings to the runtime
//! native strings the container daemon expects.
//!
//! Adapted from the teacher's `crates/kubelet/src/resources/quantity.rs`,
//! whose `Suffix` enum and suffix-detection approach this reuses, but
//! retargeted at spec.md §6's actual contract: the output is a runtime
//! command-line string (`"64Mi" -> "64m"`), not a byte count, since this
//! orchestrator's container runtime is a local daemon addressed by CLI
//! flags rather than a typed API.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    #[error("empty quantity string")]
    Empty,
    #[error("invalid numeric value in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unsupported memory unit in quantity {0:?}")]
    UnsupportedMemoryUnit(String),
    #[error("unsupported cpu unit in quantity {0:?}")]
    UnsupportedCpuUnit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemorySuffix {
    Kibibyte,
    Mebibyte,
    Gibibyte,
    None,
}

fn split_numeric_suffix(raw: &str) -> (&str, &str) {
    let end = raw
        .rfind(|c: char| c.is_ascii_digit() || c == '.')
        .map(|i| i + 1)
        .unwrap_or(0);
    raw.split_at(end)
}

/// Converts a Kubernetes-style memory quantity (`Ki`/`Mi`/`Gi` suffix, or
/// bare bytes) into the runtime-native string spec.md §6 specifies:
/// `Mi -> m`, `Gi -> g`, `Ki -> k`.
pub fn memory_to_runtime_string(raw: &str) -> Result<String, QuantityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(QuantityError::Empty);
    }
    let (value, suffix) = split_numeric_suffix(trimmed);
    let value: f64 = value
        .parse()
        .map_err(|_| QuantityError::InvalidNumber(raw.to_string()))?;
    let (suffix, unit) = match suffix {
        "Ki" | "ki" => (MemorySuffix::Kibibyte, "k"),
        "Mi" | "mi" => (MemorySuffix::Mebibyte, "m"),
        "Gi" | "gi" => (MemorySuffix::Gibibyte, "g"),
        "" => (MemorySuffix::None, "m"),
        _ => return Err(QuantityError::UnsupportedMemoryUnit(raw.to_string())),
    };
    // A bare byte count still has to become *some* runtime unit; convert it
    // to whole mebibytes so the daemon sees a sane flag value.
    let scaled = match suffix {
        MemorySuffix::None => (value / (1024.0 * 1024.0)).max(1.0),
        _ => value,
    };
    if scaled.fract() == 0.0 {
        Ok(format!("{}{}", scaled as i64, unit))
    } else {
        Ok(format!("{:.3}{}", scaled, unit))
    }
}

/// Converts a Kubernetes-style CPU quantity (`m`-suffixed millicpu, or a
/// bare core count) into a fractional core count string with three decimal
/// places, per spec.md §6: `250m -> 0.250`.
pub fn cpu_to_runtime_string(raw: &str) -> Result<String, QuantityError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(QuantityError::Empty);
    }
    let cores = if let Some(milli) = trimmed.strip_suffix('m') {
        let value: f64 = milli
            .parse()
            .map_err(|_| QuantityError::InvalidNumber(raw.to_string()))?;
        value / 1000.0
    } else {
        trimmed
            .parse()
            .map_err(|_| QuantityError::UnsupportedCpuUnit(raw.to_string()))?
    };
    Ok(format!("{:.3}", cores))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn memory_mebibytes_converts_to_m() {
        assert_eq!(memory_to_runtime_string("64Mi").unwrap(), "64m");
    }

    #[test]
    fn memory_gibibytes_converts_to_g() {
        assert_eq!(memory_to_runtime_string("2Gi").unwrap(), "2g");
    }

    #[test]
    fn memory_kibibytes_converts_to_k() {
        assert_eq!(memory_to_runtime_string("512Ki").unwrap(), "512k");
    }

    #[test]
    fn memory_rejects_unsupported_unit() {
        assert!(matches!(
            memory_to_runtime_string("1Pi"),
            Err(QuantityError::UnsupportedMemoryUnit(_))
        ));
    }

    #[test]
    fn memory_rejects_empty() {
        assert_eq!(memory_to_runtime_string(""), Err(QuantityError::Empty));
    }

    #[test]
    fn cpu_millicpu_converts_to_fractional_cores() {
        assert_eq!(cpu_to_runtime_string("250m").unwrap(), "0.250");
    }

    #[test]
    fn cpu_bare_cores_round_to_three_decimals() {
        assert_eq!(cpu_to_runtime_string("2").unwrap(), "2.000");
    }

    #[test]
    fn cpu_fractional_millicpu() {
        assert_eq!(cpu_to_runtime_string("1234m").unwrap(), "1.234");
    }

    #[test]
    fn cpu_rejects_empty() {
        assert_eq!(cpu_to_runtime_string(""), Err(QuantityError::Empty));
    }
}
