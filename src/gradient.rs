use ndarray::Axis;
use tracing::warn;

use crate::cost::Cost;
use crate::example::Example;
use crate::matrices::Matrices;
use crate::network::Network;

/// Computes the derivative of the cost with respect to every weight by
/// propagating the cost's derivative backward through the layers.
pub struct Backprop<'a> {
    network: &'a Network,
    cost: Box<dyn Cost>,
}

impl<'a> Backprop<'a> {
    pub fn new<C: Cost + 'static>(network: &'a Network, cost: C) -> Self {
        Self {
            network,
            cost: Box::new(cost),
        }
    }

    /// Gradient with the same shapes as `weights`. The weights must match
    /// the network's topology; a mismatch surfaces as a dimension panic from
    /// the matrix products.
    pub fn gradient(&self, weights: &Matrices, example: &Example) -> Matrices {
        let states = self.network.forward(weights, &example.data);
        let prediction = &states[states.len() - 1].outgoing;
        let mut above = self.cost.delta(prediction, &example.target);
        let mut gradient = Matrices::new(self.network.shapes().to_vec());
        for index in (1..states.len()).rev() {
            let state = &states[index];
            let local = self.network.layers()[index].activation().delta(
                &state.incoming,
                &state.outgoing,
                &above,
            );
            // The weight matrix feeding this layer saw the activation of the
            // layer below as its input.
            let below = &states[index - 1].outgoing;
            let outer = local
                .view()
                .insert_axis(Axis(1))
                .dot(&below.view().insert_axis(Axis(0)));
            gradient.get_mut(index - 1).assign(&outer);
            above = weights.get(index - 1).t().dot(&local);
        }
        gradient
    }
}

/// Estimates the gradient with central finite differences over every single
/// weight. Far too slow for training; exists to validate [`Backprop`].
pub struct NumericalGradient<'a> {
    network: &'a Network,
    cost: Box<dyn Cost>,
    distance: f64,
}

impl<'a> NumericalGradient<'a> {
    pub fn new<C: Cost + 'static>(network: &'a Network, cost: C) -> Self {
        Self::with_distance(network, cost, 1e-5)
    }

    pub fn with_distance<C: Cost + 'static>(
        network: &'a Network,
        cost: C,
        distance: f64,
    ) -> Self {
        Self {
            network,
            cost: Box::new(cost),
            distance,
        }
    }

    pub fn gradient(&self, weights: &Matrices, example: &Example) -> Matrices {
        let mut gradient = Matrices::new(self.network.shapes().to_vec());
        for index in 0..weights.flat().len() {
            let mut plus = weights.clone();
            plus.flat_mut()[index] += self.distance;
            let mut minus = weights.clone();
            minus.flat_mut()[index] -= self.distance;
            let difference = self.evaluate(&plus, example) - self.evaluate(&minus, example);
            gradient.flat_mut()[index] = difference / (2.0 * self.distance);
        }
        gradient
    }

    fn evaluate(&self, weights: &Matrices, example: &Example) -> f64 {
        let prediction = self.network.feed(weights, &example.data);
        self.cost.apply(&prediction, &example.target)
    }
}

/// [`Backprop`] that cross-checks every gradient against finite differences
/// and logs a warning when they disagree. A debugging aid for new activation
/// or cost functions, not something to train with.
pub struct CheckedBackprop<'a> {
    backprop: Backprop<'a>,
    numerical: NumericalGradient<'a>,
    tolerance: f64,
}

impl<'a> CheckedBackprop<'a> {
    pub fn new<C: Cost + Clone + 'static>(network: &'a Network, cost: C) -> Self {
        Self {
            backprop: Backprop::new(network, cost.clone()),
            numerical: NumericalGradient::new(network, cost),
            tolerance: 1e-4,
        }
    }

    pub fn gradient(&self, weights: &Matrices, example: &Example) -> Matrices {
        let analytic = self.backprop.gradient(weights, example);
        let numerical = self.numerical.gradient(weights, example);
        let deviation = analytic
            .flat()
            .iter()
            .zip(numerical.flat().iter())
            .map(|(a, n)| (a - n).abs())
            .fold(0.0, f64::max);
        if deviation > self.tolerance {
            warn!(deviation, "gradient deviates from finite differences");
        }
        analytic
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr2;

    use super::*;
    use crate::activation::{Identity, Sigmoid};
    use crate::cost::SquaredError;
    use crate::network::{Layer, Network};
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2, Array};

    #[test]
    fn single_connection_gradient_is_the_outer_product() {
        let network = Network::new(vec![Layer::new(2, Identity), Layer::new(2, Identity)]);
        let mut weights = Matrices::new(network.shapes().to_vec());
        weights.set_flat(arr1(&[1.0, 2.0, 3.0, 4.0]));
        let example = Example::new(arr1(&[1.0, 2.0]), arr1(&[0.0, 0.0]));

        // Prediction is [5, 11]; with a zero target the cost derivative is
        // the prediction itself.
        let gradient = Backprop::new(&network, SquaredError).gradient(&weights, &example);
        assert_rel_eq_arr2!(gradient.get(0), arr2(&[[5.0, 10.0], [11.0, 22.0]]));
    }

    #[test]
    fn gradient_shapes_match_the_weights() {
        let network = Network::new(vec![
            Layer::new(3, Identity),
            Layer::new(4, Sigmoid),
            Layer::new(2, Sigmoid),
        ]);
        let mut weights = Matrices::new(network.shapes().to_vec());
        weights.set_flat(Array::linspace(-0.5, 0.5, weights.flat().len()));
        let example = Example::new(arr1(&[1.0, 0.0, -1.0]), arr1(&[1.0, 0.0]));

        let gradient = Backprop::new(&network, SquaredError).gradient(&weights, &example);
        assert_eq!(gradient.shapes(), weights.shapes());
    }

    #[test]
    fn checked_backprop_returns_the_analytic_gradient() {
        let network = Network::new(vec![Layer::new(2, Identity), Layer::new(2, Sigmoid)]);
        let mut weights = Matrices::new(network.shapes().to_vec());
        weights.set_flat(arr1(&[0.1, -0.2, 0.3, 0.4]));
        let example = Example::new(arr1(&[0.5, 1.0]), arr1(&[1.0, 0.0]));

        let checked = CheckedBackprop::new(&network, SquaredError).gradient(&weights, &example);
        let plain = Backprop::new(&network, SquaredError).gradient(&weights, &example);
        assert_rel_eq_arr2!(checked.get(0), plain.get(0));
    }
}
