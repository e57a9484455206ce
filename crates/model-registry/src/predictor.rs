//! Fitted regressors
//!
//! Runtime forms of the three artifact kinds. Each is validated once at
//! construction so that prediction is a plain numeric walk.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A fitted model mapping one scaled feature row to one scalar
pub trait Regressor: Send + Sync {
    /// Predict from a row already scaled by the task's scaler
    fn predict(&self, row: &[f64]) -> f64;

    /// Number of input features
    fn n_features(&self) -> usize;

    /// Short model family name for logs and health output
    fn kind(&self) -> &'static str;
}

/// Single regression tree in flat-array form.
///
/// Node `i` is a leaf when `children_left[i] < 0`; otherwise the walk goes
/// left when `row[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        let n = self.value.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if [
            self.children_left.len(),
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
        ]
        .iter()
        .any(|len| *len != n)
        {
            return Err("tree node arrays differ in length".to_string());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left < 0 {
                continue;
            }
            // Children must point forward so every walk terminates.
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} has out-of-order child {}", i, child));
                }
            }
            let feature = self.feature[i];
            if feature < 0 || feature >= n_features as i64 {
                return Err(format!(
                    "node {} splits on feature {} of {}",
                    i, feature, n_features
                ));
            }
        }
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left < 0 {
                return self.value[node];
            }
            let x = row.get(self.feature[node] as usize).copied().unwrap_or(f64::NAN);
            node = if x <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Bagged tree ensemble; output is the mean of its trees
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Build a forest, checking every tree's structure
    pub fn new(trees: Vec<DecisionTree>, n_features: usize) -> Result<Self, String> {
        if trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in trees.iter().enumerate() {
            tree.validate(n_features).map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(Self { trees, n_features })
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for RandomForest {
    fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

/// Ordinary linear regression
#[derive(Debug, Clone)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, String> {
        if coefficients.is_empty() {
            return Err("linear model has no coefficients".to_string());
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Regressor for LinearModel {
    fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(w, x)| w * x)
                .sum::<f64>()
    }

    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// Hidden-layer activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Relu,
    Tanh,
    Logistic,
    Identity,
}

impl Activation {
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Relu => x.max(0.0),
            Activation::Tanh => x.tanh(),
            Activation::Logistic => 1.0 / (1.0 + (-x).exp()),
            Activation::Identity => x,
        }
    }
}

/// Serialized dense layer: `weights` is `inputs x outputs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Multi-layer perceptron regressor with an identity output layer
#[derive(Debug, Clone)]
pub struct Mlp {
    activation: Activation,
    layers: Vec<(Array2<f64>, Array1<f64>)>,
}

impl Mlp {
    /// Build the network, checking that layer shapes chain from
    /// `n_features` inputs down to a single output
    pub fn new(
        activation: Activation,
        layers: Vec<DenseLayer>,
        n_features: usize,
    ) -> Result<Self, String> {
        if layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut width = n_features;
        let mut built = Vec::with_capacity(layers.len());
        for (i, layer) in layers.into_iter().enumerate() {
            if layer.weights.len() != width {
                return Err(format!(
                    "layer {} expects {} inputs, previous width is {}",
                    i,
                    layer.weights.len(),
                    width
                ));
            }
            let outputs = layer.biases.len();
            if layer.weights.iter().any(|r| r.len() != outputs) {
                return Err(format!("layer {} weight rows do not match {} biases", i, outputs));
            }
            let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((width, outputs), flat)
                .map_err(|e| format!("layer {}: {}", i, e))?;
            built.push((weights, Array1::from(layer.biases)));
            width = outputs;
        }
        if width != 1 {
            return Err(format!("network has {} outputs, expected 1", width));
        }

        Ok(Self {
            activation,
            layers: built,
        })
    }
}

impl Regressor for Mlp {
    fn predict(&self, row: &[f64]) -> f64 {
        let last = self.layers.len() - 1;
        let mut x = Array1::from(row.to_vec());
        for (i, (weights, biases)) in self.layers.iter().enumerate() {
            x = x.dot(weights) + biases;
            if i < last {
                x.mapv_inplace(|v| self.activation.apply(v));
            }
        }
        x.first().copied().unwrap_or(f64::NAN)
    }

    fn n_features(&self) -> usize {
        self.layers.first().map(|(w, _)| w.nrows()).unwrap_or(0)
    }

    fn kind(&self) -> &'static str {
        "mlp"
    }
}
