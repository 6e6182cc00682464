use ndarray::Array1;

use crate::activation::Activation;
use crate::matrices::Matrices;

/// A row of units and the activation function applied to them.
pub struct Layer {
    size: usize,
    activation: Box<dyn Activation>,
}

impl Layer {
    pub fn new<A: Activation + 'static>(size: usize, activation: A) -> Self {
        assert!(size > 0, "layer must have at least one unit");
        Self {
            size,
            activation: Box::new(activation),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn activation(&self) -> &dyn Activation {
        self.activation.as_ref()
    }
}

/// Pre- and post-activation vectors of one layer, recorded during a forward
/// pass for the backward pass to consume.
pub struct LayerState {
    pub incoming: Array1<f64>,
    pub outgoing: Array1<f64>,
}

/// An ordered stack of layers. The network only describes the topology; the
/// weights between the layers are passed into every operation, so repeated
/// calls with the same arguments give identical results.
pub struct Network {
    layers: Vec<Layer>,
    shapes: Vec<(usize, usize)>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Self {
        assert!(layers.len() >= 2, "network needs at least two layers");
        let shapes = layers
            .windows(2)
            .map(|pair| (pair[1].size, pair[0].size))
            .collect();
        Self { layers, shapes }
    }

    /// Shapes of the weight matrices between consecutive layers.
    pub fn shapes(&self) -> &[(usize, usize)] {
        &self.shapes
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Output of the final layer for the given weights and input. The input
    /// layer passes its data through untouched.
    pub fn feed(&self, weights: &Matrices, data: &Array1<f64>) -> Array1<f64> {
        let mut outgoing = data.clone();
        for (index, layer) in self.layers.iter().enumerate().skip(1) {
            let incoming = weights.get(index - 1).dot(&outgoing);
            outgoing = layer.activation().apply(&incoming);
        }
        outgoing
    }

    /// Forward pass that records every layer's incoming and outgoing
    /// vectors. The record belongs to the caller and is meant to be consumed
    /// once by backpropagation.
    pub fn forward(&self, weights: &Matrices, data: &Array1<f64>) -> Vec<LayerState> {
        let mut states = Vec::with_capacity(self.layers.len());
        states.push(LayerState {
            incoming: data.clone(),
            outgoing: data.clone(),
        });
        for (index, layer) in self.layers.iter().enumerate().skip(1) {
            let incoming = weights.get(index - 1).dot(&states[index - 1].outgoing);
            let outgoing = layer.activation().apply(&incoming);
            states.push(LayerState { incoming, outgoing });
        }
        states
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr1;

    use super::*;
    use crate::activation::{Identity, Relu, Sigmoid, Softmax};
    use approx::assert_relative_eq;
    use ndarray::{arr1, Array};

    fn network() -> Network {
        Network::new(vec![
            Layer::new(5, Identity),
            Layer::new(5, Relu),
            Layer::new(6, Sigmoid),
            Layer::new(3, Softmax),
        ])
    }

    fn weights(network: &Network) -> Matrices {
        let mut weights = Matrices::new(network.shapes().to_vec());
        let count = weights.flat().len();
        weights.set_flat(Array::linspace(-0.2, 0.2, count));
        weights
    }

    #[test]
    fn shapes_connect_consecutive_layers() {
        assert_eq!(network().shapes(), &[(5, 5), (6, 5), (3, 6)]);
    }

    #[test]
    #[should_panic(expected = "at least two layers")]
    fn rejects_single_layer() {
        Network::new(vec![Layer::new(5, Identity)]);
    }

    #[test]
    #[should_panic(expected = "at least one unit")]
    fn rejects_empty_layer() {
        Layer::new(0, Identity);
    }

    #[test]
    fn feed_is_deterministic() {
        let network = network();
        let weights = weights(&network);
        let data = arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let first = network.feed(&weights, &data);
        let second = network.feed(&weights, &data);
        assert_eq!(first, second);
    }

    #[test]
    fn forward_records_every_layer() {
        let network = network();
        let weights = weights(&network);
        let data = arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let states = network.forward(&weights, &data);

        assert_eq!(states.len(), 4);
        assert_rel_eq_arr1!(states[0].incoming, data);
        assert_rel_eq_arr1!(states[0].outgoing, data);
        for (state, layer) in states.iter().zip(network.layers()) {
            assert_eq!(state.incoming.len(), layer.size());
            assert_eq!(state.outgoing.len(), layer.size());
        }
    }

    #[test]
    fn forward_agrees_with_feed() {
        let network = network();
        let weights = weights(&network);
        let data = arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let states = network.forward(&weights, &data);
        let prediction = network.feed(&weights, &data);
        assert_rel_eq_arr1!(states.last().unwrap().outgoing, prediction);
        assert_relative_eq!(prediction.sum(), 1.0);
    }
}
