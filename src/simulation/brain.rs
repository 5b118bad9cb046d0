//! Neural network controllers for cars.
//!
//! Implements a fixed-topology multi-layer perceptron with tanh activation
//! and the genetic operators used by the evolution engine (mutation and
//! averaging crossover). There is no gradient training.

use ndarray::{Array1, Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::SimError;

/// A single fully connected layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Weight matrix (`output_size` × `input_size`).
    pub weights: Array2<f32>,
    /// Bias vector (`output_size`).
    pub biases: Array1<f32>,
}

impl Layer {
    /// Creates a new layer with weights and biases drawn from `[-scale, scale]`.
    pub fn new_random<R: Rng + ?Sized>(
        input_size: usize,
        output_size: usize,
        scale: f32,
        rng: &mut R,
    ) -> Self {
        Self {
            weights: Array2::from_shape_simple_fn((output_size, input_size), || {
                rng.random_range(-scale..=scale)
            }),
            biases: Array1::from_shape_simple_fn(output_size, || rng.random_range(-scale..=scale)),
        }
    }

    /// Performs forward pass with tanh activation.
    #[inline]
    pub fn forward(&self, inputs: ArrayView1<f32>) -> Array1<f32> {
        let mut output = self.weights.dot(&inputs);
        output += &self.biases;
        output.mapv_inplace(f32::tanh);
        output
    }

    /// Perturbs each weight and bias with probability `rate` by `u·amplitude`,
    /// `u` uniform in `[-1, 1]`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, amplitude: f32, rng: &mut R) {
        let mut perturb = |v: f32| {
            if rng.random::<f32>() < rate {
                v + rng.random_range(-1.0..=1.0) * amplitude
            } else {
                v
            }
        };
        self.weights.mapv_inplace(&mut perturb);
        self.biases.mapv_inplace(&mut perturb);
    }

    /// Creates a new layer by averaging two parent layers.
    pub fn crossover(parent1: &Layer, parent2: &Layer) -> Self {
        Self {
            weights: &parent1.weights * 0.5 + &parent2.weights * 0.5,
            biases: &parent1.biases * 0.5 + &parent2.biases * 0.5,
        }
    }
}

/// A feed-forward network mapping sensor readings to one steering value.
///
/// `Clone` produces fully independent storage, so a mutated child never
/// aliases its parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    layer_sizes: Vec<usize>,
    layers: Vec<Layer>,
}

impl NeuralNetwork {
    /// Creates a network with random weights for `[input, hidden.., output]`.
    ///
    /// Layer sizes must contain at least two entries; the engine validates
    /// this through [`super::params::Params::validate`].
    pub fn random<R: Rng + ?Sized>(layer_sizes: &[usize], scale: f32, rng: &mut R) -> Self {
        let layers = layer_sizes
            .windows(2)
            .map(|pair| Layer::new_random(pair[0], pair[1], scale, rng))
            .collect();

        Self {
            layer_sizes: layer_sizes.to_vec(),
            layers,
        }
    }

    /// Ordered layer sizes, input first.
    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    /// Number of inputs expected by [`NeuralNetwork::predict`].
    pub fn input_size(&self) -> usize {
        self.layer_sizes.first().copied().unwrap_or(0)
    }

    /// Layers from input to output.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Total number of weights and biases.
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|layer| layer.weights.len() + layer.biases.len())
            .sum()
    }

    /// Runs a forward pass and returns the first output activation.
    pub fn predict(&self, inputs: &[f32]) -> Result<f32, SimError> {
        let expected = self.input_size();
        if inputs.len() != expected {
            return Err(SimError::ShapeMismatch {
                expected,
                actual: inputs.len(),
            });
        }

        let mut activations = ArrayView1::from(inputs).to_owned();
        for layer in &self.layers {
            activations = layer.forward(activations.view());
        }

        Ok(activations.first().copied().unwrap_or(0.0))
    }

    /// Mutates all layers in the network.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f32, amplitude: f32, rng: &mut R) {
        for layer in &mut self.layers {
            layer.mutate(rate, amplitude, rng);
        }
    }

    /// Creates a new network by averaging two parents with the same topology.
    pub fn crossover(a: &NeuralNetwork, b: &NeuralNetwork) -> Result<Self, SimError> {
        if a.layer_sizes != b.layer_sizes {
            return Err(SimError::IncompatibleTopology {
                left: a.layer_sizes.clone(),
                right: b.layer_sizes.clone(),
            });
        }

        let layers = a
            .layers
            .iter()
            .zip(&b.layers)
            .map(|(layer1, layer2)| Layer::crossover(layer1, layer2))
            .collect();

        Ok(Self {
            layer_sizes: a.layer_sizes.clone(),
            layers,
        })
    }

    /// Euclidean distance between the parameters of two networks.
    ///
    /// Networks with different topologies are infinitely far apart.
    pub fn distance(a: &NeuralNetwork, b: &NeuralNetwork) -> f32 {
        if a.layer_sizes != b.layer_sizes {
            return f32::INFINITY;
        }

        let mut sum_sq = 0.0;
        for (layer1, layer2) in a.layers.iter().zip(&b.layers) {
            for (w1, w2) in layer1.weights.iter().zip(layer2.weights.iter()) {
                let diff = w1 - w2;
                sum_sq += diff * diff;
            }
            for (b1, b2) in layer1.biases.iter().zip(layer2.biases.iter()) {
                let diff = b1 - b2;
                sum_sq += diff * diff;
            }
        }

        sum_sq.sqrt()
    }
}
