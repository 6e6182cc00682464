use ndarray::{Array1, Zip};

/// Scalar training objective over a prediction and its target, together with
/// its derivative with respect to the prediction.
pub trait Cost {
    fn apply(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> f64;

    fn delta(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> Array1<f64>;
}

/// Half the summed squared difference between prediction and target.
#[derive(Clone)]
pub struct SquaredError;

impl Cost for SquaredError {
    fn apply(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> f64 {
        Zip::from(prediction)
            .and(target)
            .fold(0.0, |cost, &p, &t| cost + (p - t).powi(2))
            / 2.0
    }

    fn delta(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> Array1<f64> {
        prediction - target
    }
}

/// Summed binary cross-entropy. Predictions are clamped away from zero and
/// one so the logarithms stay finite.
#[derive(Clone)]
pub struct CrossEntropy {
    epsilon: f64,
}

impl CrossEntropy {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Default for CrossEntropy {
    fn default() -> Self {
        Self::new(1e-11)
    }
}

impl Cost for CrossEntropy {
    fn apply(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> f64 {
        Zip::from(prediction).and(target).fold(0.0, |cost, &p, &t| {
            let clamped = p.clamp(self.epsilon, 1.0 - self.epsilon);
            cost - t * clamped.ln() - (1.0 - t) * (1.0 - clamped).ln()
        })
    }

    fn delta(&self, prediction: &Array1<f64>, target: &Array1<f64>) -> Array1<f64> {
        Zip::from(prediction)
            .and(target)
            .map_collect(|&p, &t| (p - t) / (p * (1.0 - p)).max(self.epsilon))
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr1;

    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;

    #[test]
    fn squared_error_apply() {
        let prediction = arr1(&[1.0, 0.5, -0.1]);
        let target = arr1(&[1.0, 0.0, 0.0]);
        let cost = SquaredError.apply(&prediction, &target);
        assert_relative_eq!(cost, 0.13, epsilon = 1e-12);
    }

    #[test]
    fn squared_error_delta() {
        let prediction = arr1(&[1.0, 0.5, -0.1]);
        let target = arr1(&[1.0, 0.0, 0.0]);
        assert_rel_eq_arr1!(
            SquaredError.delta(&prediction, &target),
            arr1(&[0.0, 0.5, -0.1])
        );
    }

    #[test]
    fn squared_error_is_zero_at_the_target() {
        let target = arr1(&[0.3, 0.6, 0.1]);
        assert_relative_eq!(SquaredError.apply(&target, &target), 0.0);
    }

    #[test]
    fn cross_entropy_apply() {
        let prediction = arr1(&[0.9, 0.1]);
        let target = arr1(&[1.0, 0.0]);
        let cost = CrossEntropy::default().apply(&prediction, &target);
        // -ln(0.9) - ln(0.9)
        assert_relative_eq!(cost, 0.21072103131565253, epsilon = 1e-12);
    }

    #[test]
    fn cross_entropy_delta() {
        let prediction = arr1(&[0.8, 0.2]);
        let target = arr1(&[1.0, 0.0]);
        let delta = CrossEntropy::default().delta(&prediction, &target);
        // (p - t) / (p * (1 - p))
        assert_rel_eq_arr1!(delta, arr1(&[-1.25, 1.25]));
    }

    #[test]
    fn cross_entropy_stays_finite_at_saturated_predictions() {
        let prediction = arr1(&[0.0, 1.0]);
        let target = arr1(&[1.0, 0.0]);
        let cost = CrossEntropy::default().apply(&prediction, &target);
        assert!(cost.is_finite());
        let delta = CrossEntropy::default().delta(&prediction, &target);
        assert!(delta.iter().all(|v| v.is_finite()));
    }
}
