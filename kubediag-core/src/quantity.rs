//! Resource quantity parsing
//!
//! Converts Kubernetes quantity strings (`250m`, `1.5`, `128Mi`, `1e3`) into
//! milli-CPU and bytes. Unparseable quantities count as zero.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// Split a quantity into its numeric part and multiplier
fn split(quantity: &str) -> Option<(f64, f64)> {
    let s = quantity.trim();
    if s.is_empty() {
        return None;
    }

    const BINARY: [(&str, f64); 6] = [
        ("Ki", 1024.0),
        ("Mi", 1_048_576.0),
        ("Gi", 1_073_741_824.0),
        ("Ti", 1_099_511_627_776.0),
        ("Pi", 1_125_899_906_842_624.0),
        ("Ei", 1_152_921_504_606_846_976.0),
    ];
    for (suffix, factor) in BINARY {
        if let Some(number) = s.strip_suffix(suffix) {
            return number.parse::<f64>().ok().map(|n| (n, factor));
        }
    }

    const DECIMAL: [(char, f64); 9] = [
        ('n', 1e-9),
        ('u', 1e-6),
        ('m', 1e-3),
        ('k', 1e3),
        ('M', 1e6),
        ('G', 1e9),
        ('T', 1e12),
        ('P', 1e15),
        ('E', 1e18),
    ];
    for (suffix, factor) in DECIMAL {
        if let Some(number) = s.strip_suffix(suffix) {
            return number.parse::<f64>().ok().map(|n| (n, factor));
        }
    }

    // Plain numbers and decimal exponents such as `1e3` or `12E-2`
    s.parse::<f64>().ok().map(|n| (n, 1.0))
}

/// Quantity in base units (cores for CPU, bytes for memory)
pub fn to_base_units(quantity: &str) -> f64 {
    split(quantity)
        .map(|(number, factor)| number * factor)
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// CPU quantity in millicores
pub fn cpu_millis(quantity: &Quantity) -> f64 {
    to_base_units(&quantity.0) * 1000.0
}

/// Memory quantity in bytes
pub fn memory_bytes(quantity: &Quantity) -> f64 {
    to_base_units(&quantity.0)
}

/// `used / requested * 100`, defined as 0 when nothing is requested
pub fn usage_percentage(used: f64, requested: f64) -> f64 {
    if requested <= 0.0 {
        return 0.0;
    }
    used / requested * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> Quantity {
        Quantity(s.to_string())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_cpu_quantities() {
        assert!(approx(cpu_millis(&q("250m")), 250.0));
        assert!(approx(cpu_millis(&q("2")), 2000.0));
        assert!(approx(cpu_millis(&q("0.5")), 500.0));
        assert!(approx(cpu_millis(&q("1500000n")), 1.5));
        assert!(approx(cpu_millis(&q("750u")), 0.75));
    }

    #[test]
    fn test_memory_quantities() {
        assert!(approx(memory_bytes(&q("128Mi")), 134_217_728.0));
        assert!(approx(memory_bytes(&q("1Gi")), 1_073_741_824.0));
        assert!(approx(memory_bytes(&q("512Ki")), 524_288.0));
        assert!(approx(memory_bytes(&q("1k")), 1000.0));
        assert!(approx(memory_bytes(&q("2M")), 2_000_000.0));
        assert!(approx(memory_bytes(&q("1e3")), 1000.0));
        assert!(approx(memory_bytes(&q("4096")), 4096.0));
    }

    #[test]
    fn test_invalid_quantities_are_zero() {
        assert_eq!(to_base_units(""), 0.0);
        assert_eq!(to_base_units("abc"), 0.0);
        assert_eq!(to_base_units("Mi"), 0.0);
    }

    #[test]
    fn test_zero_request_is_zero_percent() {
        assert_eq!(usage_percentage(500.0, 0.0), 0.0);
        assert_eq!(usage_percentage(0.0, 0.0), 0.0);
        assert_eq!(usage_percentage(f64::MAX, 0.0), 0.0);
        assert!(approx(usage_percentage(50.0, 200.0), 25.0));
    }
}
