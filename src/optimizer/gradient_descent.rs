use crate::matrices::Matrices;
use crate::optimizer::Optimizer;

/// Plain stochastic gradient descent: step against the gradient, scaled by
/// the learning rate.
pub struct GradientDescent;

impl Optimizer for GradientDescent {
    fn update(&mut self, weights: &Matrices, gradient: &Matrices, learning_rate: f64) -> Matrices {
        weights + &(gradient * -learning_rate)
    }
}
