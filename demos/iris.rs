use std::path::Path;

use csv::Reader;
use ndarray::{Array, Array1};
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use tracing::info;

use lamina::activation::{Identity, Relu, Softmax};
use lamina::{
    cost::{Cost, SquaredError},
    example::Example,
    gradient::Backprop,
    matrices::Matrices,
    network::{Layer, Network},
    optimizer::{GradientDescent, Optimizer},
    utils::train_test_split,
    OneHotEncoder,
};

// Load the iris dataset available here:
// https://www.kaggle.com/arshid/iris-flower-dataset
fn load_iris(file_path: impl AsRef<Path>) -> (Vec<Array1<f64>>, Vec<String>) {
    let mut reader = Reader::from_path(file_path).expect("cannot open IRIS.csv");
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for row in reader.records() {
        let row = row.expect("malformed csv row");
        labels.push(row[4].to_string());
        let values = row
            .into_iter()
            .take(4)
            .map(|value| value.parse().expect("malformed feature value"))
            .collect::<Vec<f64>>();
        features.push(Array1::from(values));
    }
    (features, labels)
}

fn main() {
    tracing_subscriber::fmt::init();

    let (features, labels) = load_iris("./IRIS.csv");
    let kinds = vec!["Iris-setosa", "Iris-versicolor", "Iris-virginica"]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
    let encoder = OneHotEncoder::new(kinds);

    let examples = features
        .into_iter()
        .zip(labels.iter())
        .map(|(data, label)| Example::new(data, encoder.encode(label)))
        .collect::<Vec<_>>();
    let (training, testing) = train_test_split(examples, 0.25);

    let network = Network::new(vec![
        Layer::new(4, Identity),
        Layer::new(10, Relu),
        Layer::new(10, Relu),
        Layer::new(3, Softmax),
    ]);
    let mut weights = Matrices::new(network.shapes().to_vec());
    let count = weights.flat().len();
    weights.set_flat(Array::random(count, Normal::new(0.0, 0.01).unwrap()));

    let backprop = Backprop::new(&network, SquaredError);
    let mut descent = GradientDescent;
    let learning_rate = 0.1;

    for epoch in 0..100 {
        for example in &training {
            let gradient = backprop.gradient(&weights, example);
            weights = descent.update(&weights, &gradient, learning_rate);
        }
        if epoch % 10 == 0 {
            let cost = training
                .iter()
                .map(|example| {
                    let prediction = network.feed(&weights, &example.data);
                    SquaredError.apply(&prediction, &example.target)
                })
                .sum::<f64>();
            info!(epoch, cost, "finished epoch");
        }
    }

    let errors = testing
        .iter()
        .filter(|example| {
            let prediction = network.feed(&weights, &example.data);
            encoder.decode(&prediction) != encoder.decode(&example.target)
        })
        .count();
    let error_rate = 100.0 * errors as f64 / testing.len() as f64;
    info!("testing error {:.2} %", error_rate);
}
