use ndarray::arr2;
use crate::activations::Activation;

#[test]
fn test_relu_apply() {
    let mut input = arr2(&[[-1.0, 0.0, 2.5]]);
    Activation::Relu.apply_batch(&mut input);
    assert_eq!(input, arr2(&[[0.0, 0.0, 2.5]]));
}

#[test]
fn test_linear_is_identity() {
    let mut inputs = arr2(&[[-1.0, 3.0], [0.5, -0.25]]);
    let expected = inputs.clone();
    Activation::Linear.apply_batch(&mut inputs);
    assert_eq!(inputs, expected);
}

#[test]
fn test_derivatives() {
    let inputs = arr2(&[[-1.0, 0.0, 2.0]]);
    assert_eq!(Activation::Relu.derivative_batch(inputs.view()), arr2(&[[0.0, 0.0, 1.0]]));
    assert_eq!(Activation::Linear.derivative_batch(inputs.view()), arr2(&[[1.0, 1.0, 1.0]]));
}

#[test]
fn test_default_is_relu() {
    assert_eq!(Activation::default(), Activation::Relu);
}
