//! Feedforward neural networks trained with plain backpropagation.
//!
//! A network is described by its layer sizes and activation functions; the
//! weights between the layers live outside the network in a [`matrices::Matrices`]
//! value, so a forward pass is a pure function of weights and input.
//! [`gradient::Backprop`] computes per-weight gradients which an
//! [`optimizer::Optimizer`] turns into new weights.

use std::{collections::HashMap, hash::Hash};

use ndarray::Array1;

pub mod activation;
pub mod cost;
pub mod example;
pub mod gradient;
pub mod matrices;
pub mod network;
pub mod optimizer;
pub mod utils;

#[macro_export]
macro_rules! assert_rel_eq_arr1 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}

#[macro_export]
macro_rules! assert_rel_eq_arr2 {
    ($actual:expr, $expected:expr) => {
        assert_eq!($actual.shape(), $expected.shape());
        ndarray::Zip::from(&$actual)
            .and(&$expected)
            .for_each(|v, w| {
                assert_relative_eq!(v, w);
            });
    };
}

/// Encode class labels to one-hot target vectors and decode predictions.
pub struct OneHotEncoder<Label>
where
    Label: Hash + Eq + Clone,
{
    label_to_id: HashMap<Label, usize>,
    id_to_label: Vec<Label>,
}

impl<Label> OneHotEncoder<Label>
where
    Label: Hash + Eq + Clone,
{
    /// Record the label kinds to convert. Their order fixes the unit each
    /// label maps to in the output layer.
    pub fn new(label_kinds: Vec<Label>) -> Self {
        let label_to_id = label_kinds
            .iter()
            .cloned()
            .enumerate()
            .map(|(id, label)| (label, id))
            .collect();
        Self {
            label_to_id,
            id_to_label: label_kinds,
        }
    }

    /// One-hot target vector for a label. Panics if the label is unknown.
    pub fn encode(&self, label: &Label) -> Array1<f64> {
        let id = self.label_to_id.get(label).expect("unknown label");
        let mut target = Array1::zeros(self.id_to_label.len());
        target[*id] = 1.0;
        target
    }

    /// Label whose unit carries the greatest score in a prediction.
    pub fn decode(&self, prediction: &Array1<f64>) -> &Label {
        let id = prediction
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(best, max), (index, &score)| {
                if score > max {
                    (index, score)
                } else {
                    (best, max)
                }
            })
            .0;
        &self.id_to_label[id]
    }
}

#[cfg(test)]
mod tests {
    use crate::assert_rel_eq_arr1;

    use super::*;

    use approx::assert_relative_eq;
    use ndarray::arr1;

    fn encoder() -> OneHotEncoder<String> {
        let label_kinds = vec!["A", "B", "C"].into_iter().map(String::from).collect();
        OneHotEncoder::new(label_kinds)
    }

    #[test]
    fn encode_label() {
        let encoder = encoder();
        assert_rel_eq_arr1!(encoder.encode(&"B".to_string()), arr1(&[0.0, 1.0, 0.0]));
    }

    #[test]
    fn decode_prediction() {
        let encoder = encoder();
        assert_eq!(encoder.decode(&arr1(&[0.05, 0.05, 0.9])), "C");
        assert_eq!(encoder.decode(&arr1(&[0.8, 0.2, 0.0])), "A");
    }

    #[test]
    #[should_panic(expected = "unknown label")]
    fn encode_rejects_unknown_label() {
        encoder().encode(&"D".to_string());
    }
}
