use ndarray::Array1;

/// One labeled training or testing case. The data vector feeds the input
/// layer and the target vector is compared against the final output.
#[derive(Debug, Clone)]
pub struct Example {
    pub data: Array1<f64>,
    pub target: Array1<f64>,
}

impl Example {
    pub fn new(data: Array1<f64>, target: Array1<f64>) -> Self {
        Self { data, target }
    }
}
