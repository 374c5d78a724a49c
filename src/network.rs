use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::activations::Activation;
use crate::approximator::ValueApproximator;
use crate::config::{NetworkConfig, OptimizerKind};
use crate::error::{DqnError, Result};
use crate::layers::DenseLayer;
use crate::loss::{Loss, MSE};
use crate::optimizer::{Adam, Optimizer, OptimizerWrapper, SGD};

/// A feed-forward network of dense layers together with the optimizer that
/// trains it. Serializing the network captures architecture, weights and
/// optimizer state.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NeuralNetwork {
    pub layers: Vec<DenseLayer>,
    pub optimizer: OptimizerWrapper,
    pub learning_rate: f32,
}

impl NeuralNetwork {
    /// Create a new neural network with the given layer sizes and activations.
    /// `layer_sizes` includes the input and output sizes, so there is one
    /// activation per consecutive pair of sizes.
    pub fn new(
        layer_sizes: &[usize],
        activations: &[Activation],
        optimizer: OptimizerKind,
        learning_rate: f32,
        rng: &mut StdRng,
    ) -> Result<Self> {
        if layer_sizes.len() < 2 {
            return Err(DqnError::invalid_parameter(
                "layer_sizes",
                "need at least input and output sizes",
            ));
        }
        if layer_sizes.len() - 1 != activations.len() {
            return Err(DqnError::invalid_parameter(
                "activations",
                "need one activation per layer",
            ));
        }
        if layer_sizes.iter().any(|&size| size == 0) {
            return Err(DqnError::invalid_parameter("layer_sizes", "sizes must be positive"));
        }

        let layers = layer_sizes
            .windows(2)
            .zip(activations.iter())
            .map(|(window, &activation)| DenseLayer::new(window[0], window[1], activation, rng))
            .collect::<Vec<_>>();

        let optimizer = match optimizer {
            OptimizerKind::Adam => OptimizerWrapper::Adam(Adam::new(&layers, 0.9, 0.999, 1e-7)),
            OptimizerKind::Sgd => OptimizerWrapper::SGD(SGD::new()),
        };

        Ok(NeuralNetwork { layers, optimizer, learning_rate })
    }

    /// ReLU hidden layers of the configured widths, linear output layer.
    pub fn from_config(
        input_size: usize,
        output_size: usize,
        config: &NetworkConfig,
        rng: &mut StdRng,
    ) -> Result<Self> {
        config.validate()?;
        let mut layer_sizes = Vec::with_capacity(config.hidden_layers.len() + 2);
        layer_sizes.push(input_size);
        layer_sizes.extend_from_slice(&config.hidden_layers);
        layer_sizes.push(output_size);

        let mut activations = vec![Activation::Relu; config.hidden_layers.len()];
        activations.push(Activation::Linear);

        let mut network = Self::new(&layer_sizes, &activations, config.optimizer, config.learning_rate, rng)?;
        if let OptimizerWrapper::Adam(adam) = &mut network.optimizer {
            adam.beta1 = config.beta1;
            adam.beta2 = config.beta2;
            adam.epsilon = config.epsilon;
        }
        Ok(network)
    }

    /// Forward pass for a single input vector.
    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.check_input(input.len())?;
        let output = self.forward_batch(input.insert_axis(Axis(0)));
        Ok(output.index_axis_move(Axis(0), 0))
    }

    /// Forward pass for a batch of input vectors, one per row.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &self.layers {
            current_output = layer.predict_batch(current_output.view());
        }
        current_output
    }

    fn forward_train(&mut self, inputs: ArrayView2<f32>) -> Array2<f32> {
        let mut current_output = inputs.to_owned();
        for layer in &mut self.layers {
            current_output = layer.forward_batch(current_output.view());
        }
        current_output
    }

    /// Gradients for every layer, in layer order, given the loss gradient at the output.
    fn backward_batch(&self, output_errors: ArrayView2<f32>) -> Result<Vec<(Array2<f32>, Array1<f32>)>> {
        let mut gradients = Vec::with_capacity(self.layers.len());
        let mut current_error = output_errors.to_owned();

        for (i, layer) in self.layers.iter().enumerate().rev() {
            let (adjusted_error, weight_gradients, bias_gradients) = layer.backward_batch(current_error.view())?;
            gradients.push((weight_gradients, bias_gradients));
            if i != 0 {
                current_error = adjusted_error.dot(&layer.weights.t());
            }
        }

        gradients.reverse();
        Ok(gradients)
    }

    /// One optimizer step on a batch of inputs and target outputs.
    /// Returns the mean squared error of the predictions made before the step.
    pub fn train_minibatch(&mut self, inputs: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        self.check_input(inputs.ncols())?;
        if targets.dim() != (inputs.nrows(), self.output_size()) {
            return Err(DqnError::dimension_mismatch(
                format!("{:?}", (inputs.nrows(), self.output_size())),
                format!("{:?}", targets.dim()),
            ));
        }

        let outputs = self.forward_train(inputs);
        let loss = MSE.compute_batch(outputs.view(), targets);
        let output_errors = MSE.gradient_batch(outputs.view(), targets);
        let gradients = self.backward_batch(output_errors.view())?;

        let learning_rate = self.learning_rate;
        self.optimizer.begin_step();
        for (i, (layer, (weight_gradients, bias_gradients))) in self.layers.iter_mut().zip(gradients).enumerate() {
            self.optimizer.update_weights(i, &mut layer.weights, &weight_gradients, learning_rate);
            self.optimizer.update_biases(i, &mut layer.biases, &bias_gradients, learning_rate);
        }

        Ok(loss)
    }

    fn check_input(&self, len: usize) -> Result<()> {
        if len != self.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("input of length {}", self.input_size()),
                format!("input of length {}", len),
            ));
        }
        Ok(())
    }

    /// Layers must chain and the optimizer must hold state for every layer.
    fn check_consistency(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(DqnError::invalid_parameter("layers", "network has no layers"));
        }
        for pair in self.layers.windows(2) {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(DqnError::dimension_mismatch(
                    format!("layer input of {}", pair[0].output_size()),
                    format!("layer input of {}", pair[1].input_size()),
                ));
            }
        }
        for layer in &self.layers {
            if layer.biases.len() != layer.output_size() {
                return Err(DqnError::dimension_mismatch(
                    format!("{} biases", layer.output_size()),
                    format!("{} biases", layer.biases.len()),
                ));
            }
        }
        if let OptimizerWrapper::Adam(adam) = &self.optimizer {
            adam.check_shapes(&self.layers)?;
        }
        Ok(())
    }
}

impl ValueApproximator for NeuralNetwork {
    fn fresh(
        observation_space: usize,
        action_space: usize,
        config: &NetworkConfig,
        rng: &mut StdRng,
    ) -> Result<Self> {
        Self::from_config(observation_space, action_space, config, rng)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let network: Self = bincode::deserialize(bytes)?;
        network.check_consistency()?;
        Ok(network)
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn input_size(&self) -> usize {
        self.layers.first().map_or(0, |layer| layer.input_size())
    }

    fn output_size(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.output_size())
    }

    fn predict(&self, state: ArrayView1<f32>) -> Result<Array1<f32>> {
        self.forward(state)
    }

    fn fit(&mut self, state: ArrayView1<f32>, target: ArrayView1<f32>) -> Result<f32> {
        self.train_minibatch(state.insert_axis(Axis(0)), target.insert_axis(Axis(0)))
    }
}
