use crate::matrices::Matrices;
use crate::optimizer::Optimizer;

/// Gradient descent with an exponentially decaying velocity term.
pub struct Momentum {
    rate: f64,
    velocity: Option<Matrices>,
}

impl Momentum {
    pub fn new(rate: f64) -> Self {
        assert!(
            (0.0..1.0).contains(&rate),
            "momentum rate must lie in [0, 1)"
        );
        Self {
            rate,
            velocity: None,
        }
    }
}

impl Optimizer for Momentum {
    fn update(&mut self, weights: &Matrices, gradient: &Matrices, learning_rate: f64) -> Matrices {
        let velocity = match self.velocity.take() {
            Some(previous) => &(&previous * self.rate) + gradient,
            None => gradient.clone(),
        };
        let updated = weights + &(&velocity * -learning_rate);
        self.velocity = Some(velocity);
        updated
    }
}
