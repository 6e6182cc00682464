use ndarray_rand::rand::{prelude::SliceRandom, thread_rng};

/// Shuffle a dataset and split it into training and testing parts.
/// `test_ratio` is the fraction of items withheld for testing.
pub fn train_test_split<T>(items: Vec<T>, test_ratio: f64) -> (Vec<T>, Vec<T>) {
    assert!(
        0.0 < test_ratio && test_ratio < 1.0,
        "test ratio must lie strictly between zero and one"
    );

    let mut rng = thread_rng();
    let n_training = (items.len() as f64 * (1.0 - test_ratio)) as usize;

    let mut training = items;
    training.shuffle(&mut rng);
    let testing = training.split_off(n_training);

    (training, testing)
}
