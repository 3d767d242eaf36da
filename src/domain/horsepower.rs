// Horsepower estimation from weight and quarter-mile trap speed
use serde::Serialize;

/// Trap speed (mph) at which one pound of vehicle corresponds to one horsepower.
pub const TRAP_SPEED_DIVISOR: f64 = 234.0;

/// Snapshot of one successful calculation. Inputs are echoed unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub horsepower: i64,
    pub weight: f64,
    pub trap_speed: f64,
}

/// `HP = weight × (trap_speed / 234)³`, rounded to the nearest integer.
///
/// Callers validate both inputs first; there is no failure case here.
pub fn estimate(weight: f64, trap_speed: f64) -> CalculationResult {
    let horsepower = weight * (trap_speed / TRAP_SPEED_DIVISOR).powi(3);

    CalculationResult {
        horsepower: horsepower.round() as i64,
        weight,
        trap_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_values() {
        assert_eq!(estimate(3500.0, 115.0).horsepower, 415);
        assert_eq!(estimate(3000.0, 100.0).horsepower, 234);
        assert_eq!(estimate(234.0, 234.0).horsepower, 234);
    }

    #[test]
    fn test_echoes_inputs_unrounded() {
        let result = estimate(3456.7, 112.35);
        assert_eq!(result.weight, 3456.7);
        assert_eq!(result.trap_speed, 112.35);
    }

    #[test]
    fn test_matches_formula_across_domain() {
        for weight in [1.0, 850.5, 2200.0, 3500.0, 9999.9, 20_000.0] {
            for trap_speed in [1.0, 45.5, 99.9, 115.0, 212.3, 400.0] {
                let exact = weight * (trap_speed / 234.0_f64).powf(3.0);
                let horsepower = estimate(weight, trap_speed).horsepower as f64;
                assert!((horsepower - exact).abs() <= 0.5, "{weight} lb @ {trap_speed} mph");
            }
        }
    }

    #[test]
    fn test_domain_extremes() {
        assert_eq!(estimate(1.0, 1.0).horsepower, 0);
        assert_eq!(estimate(20_000.0, 400.0).horsepower, 99_899);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(estimate(3500.0, 115.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"horsepower": 415, "weight": 3500.0, "trapSpeed": 115.0})
        );
    }
}
