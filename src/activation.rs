use ndarray::{s, Array1, Array2, Zip};

/// Nonlinearity applied to a layer's pre-activation vector.
///
/// `delta` computes the derivative of the cost with respect to the input of
/// the activation. `outgoing` must be the value `apply` returned for
/// `incoming` in the forward pass and `above` is the derivative of the cost
/// with respect to the outgoing activation.
pub trait Activation {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64>;

    fn delta(
        &self,
        incoming: &Array1<f64>,
        outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64>;
}

#[derive(Clone, Copy)]
pub struct Identity;

impl Activation for Identity {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        incoming.clone()
    }

    fn delta(
        &self,
        _incoming: &Array1<f64>,
        _outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        above.clone()
    }
}

#[derive(Clone, Copy)]
pub struct Sigmoid;

impl Sigmoid {
    fn apply_one(x: &f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }
}

impl Activation for Sigmoid {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        incoming.map(Sigmoid::apply_one)
    }

    fn delta(
        &self,
        _incoming: &Array1<f64>,
        outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        &(outgoing * &outgoing.map(|&v| 1.0 - v)) * above
    }
}

#[derive(Clone, Copy)]
pub struct Relu;

impl Activation for Relu {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        incoming.map(|&v| if v > 0.0 { v } else { 0.0 })
    }

    fn delta(
        &self,
        incoming: &Array1<f64>,
        _outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        &incoming.map(|&v| if v > 0.0 { 1.0 } else { 0.0 }) * above
    }
}

/// Normalizes the whole vector into one probability distribution.
#[derive(Clone, Copy)]
pub struct Softmax;

impl Activation for Softmax {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        // The constant doesn't change the expression but prevents overflows.
        let constant = incoming.iter().fold(f64::NAN, |v, &w| v.max(w));
        let exps = incoming.map(|&v| (v - constant).exp());
        let sum = exps.sum();
        exps / sum
    }

    fn delta(
        &self,
        _incoming: &Array1<f64>,
        outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        let delta = outgoing * above;
        let sum = delta.sum();
        &delta - &(outgoing * sum)
    }
}

/// Competitive activation with spatial inhibition.
///
/// Interprets the incoming vector as a square field. The strongest cells win
/// one after another, each suppressing a square neighborhood around itself so
/// that winners spread out over the field. Winning cells output one;
/// `leaking` optionally lets a fraction of the raw input through elsewhere.
pub struct SparseField {
    inhibition: f64,
    leaking: f64,
}

impl SparseField {
    pub fn new(inhibition: f64, leaking: f64) -> Self {
        Self {
            inhibition,
            leaking,
        }
    }

    fn argmax(field: &Array2<f64>) -> (usize, usize) {
        field
            .indexed_iter()
            .fold(
                ((0, 0), f64::NEG_INFINITY),
                |(best, max), (index, &value)| {
                    if value > max {
                        (index, value)
                    } else {
                        (best, max)
                    }
                },
            )
            .0
    }
}

impl Default for SparseField {
    fn default() -> Self {
        Self::new(0.05, 0.0)
    }
}

impl Activation for SparseField {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        let count = incoming.len();
        let side = (count as f64).sqrt() as usize;
        assert!(side * side == count, "layer size must be a square");
        let radius = ((self.inhibition * count as f64).sqrt() as usize) / 2;
        assert!(radius > 0, "no inhibition due to small factor");
        let mut field = incoming.clone().into_shape((side, side)).unwrap();
        let mut winners = Array2::<f64>::zeros((side, side));
        loop {
            let (x, y) = SparseField::argmax(&field);
            if field[[x, y]] <= 0.0 {
                break;
            }
            winners[[x, y]] = 1.0;
            let rows = x.saturating_sub(radius)..(x + radius + 1).min(side);
            let cols = y.saturating_sub(radius)..(y + radius + 1).min(side);
            field.slice_mut(s![rows, cols]).fill(0.0);
        }
        let winners = winners.into_shape(count).unwrap();
        Zip::from(&winners)
            .and(incoming)
            .map_collect(|&winner, &raw| winner.max(self.leaking * raw))
    }

    fn delta(
        &self,
        _incoming: &Array1<f64>,
        outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        // The selection dominates the nonlinearity; the leaked fraction
        // carries no gradient.
        &outgoing.map(|&v| if v > 0.0 { 1.0 } else { 0.0 }) * above
    }
}

/// E%-max winner-take-all.
///
/// Binary activation layered on top of an inner activation function. All
/// units within the given range below the strongest unit output one, all
/// others output zero. The gradient is the inner function's gradient for
/// active units and zero otherwise.
///
/// See: A Second Function of Gamma Frequency Oscillations: An E%-Max
/// Winner-Take-All Mechanism Selects Which Cells Fire. (2009)
pub struct SparseRange {
    range: f64,
    function: Box<dyn Activation>,
}

impl SparseRange {
    pub fn new(range: f64) -> Self {
        Self::with_function(range, Sigmoid)
    }

    pub fn with_function<A: Activation + 'static>(range: f64, function: A) -> Self {
        assert!(
            0.0 < range && range < 1.0,
            "range must lie strictly between zero and one"
        );
        Self {
            range,
            function: Box::new(function),
        }
    }

    fn threshold(&self, strengths: &Array1<f64>) -> f64 {
        let min = strengths.iter().fold(f64::INFINITY, |v, &w| v.min(w));
        let max = strengths.iter().fold(f64::NEG_INFINITY, |v, &w| v.max(w));
        min + (max - min) * (1.0 - self.range)
    }
}

impl Default for SparseRange {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl Activation for SparseRange {
    fn apply(&self, incoming: &Array1<f64>) -> Array1<f64> {
        let strengths = self.function.apply(incoming);
        let threshold = self.threshold(&strengths);
        strengths.map(|&v| if v >= threshold { 1.0 } else { 0.0 })
    }

    fn delta(
        &self,
        incoming: &Array1<f64>,
        outgoing: &Array1<f64>,
        above: &Array1<f64>,
    ) -> Array1<f64> {
        outgoing * &self.function.delta(incoming, outgoing, above)
    }
}
