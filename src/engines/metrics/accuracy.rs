// src/engines/metrics/accuracy.rs
use std::collections::HashMap;

/// Point-forecast accuracy against observed values
pub struct AccuracyMetrics;

impl AccuracyMetrics {
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> HashMap<String, f64> {
        let mut metrics = HashMap::new();

        let n = actual.len().min(predicted.len());
        if n == 0 {
            return metrics;
        }

        let errors: Vec<f64> = actual.iter()
            .zip(predicted.iter())
            .map(|(a, p)| a - p)
            .collect();

        metrics.insert("mae".to_string(), Self::mean_absolute_error(&errors));
        metrics.insert("rmse".to_string(), Self::root_mean_squared_error(&errors));

        // Percentage error is undefined when any actual value is zero
        if actual[..n].iter().all(|&a| a != 0.0) {
            let mape = actual.iter()
                .zip(errors.iter())
                .map(|(a, e)| (e / a).abs())
                .sum::<f64>() / n as f64 * 100.0;
            metrics.insert("mape".to_string(), mape);
        }

        metrics.insert("bias".to_string(), errors.iter().sum::<f64>() / n as f64);
        metrics.insert("n".to_string(), n as f64);

        metrics
    }

    fn mean_absolute_error(errors: &[f64]) -> f64 {
        errors.iter().map(|e| e.abs()).sum::<f64>() / errors.len() as f64
    }

    fn root_mean_squared_error(errors: &[f64]) -> f64 {
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / errors.len() as f64;
        mse.sqrt()
    }
}
