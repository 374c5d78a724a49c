use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use crate::error::DqnError;
use crate::replay_buffer::{ReplayBuffer, Transition};

fn numbered(i: usize) -> Transition {
    Transition::new(array![i as f32], i % 2, i as f32, array![(i + 1) as f32], false)
}

#[test]
fn test_replay_buffer_add_and_sample() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut replay_buffer = ReplayBuffer::new(10);
    let transition = Transition {
        state: array![0.5, -0.5],
        action: 0,
        reward: 1.0,
        next_state: array![0.6, -0.4],
        done: false,
    };
    replay_buffer.push(transition.clone());
    assert_eq!(replay_buffer.len(), 1);
    let sample = replay_buffer.sample(1, &mut rng).unwrap();
    assert_eq!(sample[0], &transition);
}

#[test]
fn test_replay_buffer_evicts_oldest() {
    let mut buffer = ReplayBuffer::new(3);

    for i in 1..=5 {
        buffer.push(numbered(i));
    }

    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.capacity(), 3);
    let states: Vec<f32> = buffer.iter().map(|t| t.state[0]).collect();
    assert_eq!(states, vec![3.0, 4.0, 5.0]);
}

#[test]
fn test_replay_buffer_is_empty() {
    let mut buffer = ReplayBuffer::new(10);
    assert!(buffer.is_empty());

    buffer.push(numbered(0));
    assert!(!buffer.is_empty());

    buffer.clear();
    assert!(buffer.is_empty());
}

#[test]
fn test_replay_buffer_sample_size() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..5 {
        buffer.push(numbered(i));
    }

    assert_eq!(buffer.sample(1, &mut rng).unwrap().len(), 1);
    assert_eq!(buffer.sample(3, &mut rng).unwrap().len(), 3);
    assert_eq!(buffer.sample(5, &mut rng).unwrap().len(), 5);
}

#[test]
fn test_replay_buffer_insufficient_data() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..4 {
        buffer.push(numbered(i));
    }

    match buffer.sample(5, &mut rng) {
        Err(DqnError::InsufficientData { requested, available }) => {
            assert_eq!(requested, 5);
            assert_eq!(available, 4);
        }
        other => panic!("expected InsufficientData, got {:?}", other.map(|s| s.len())),
    }
}

#[test]
fn test_replay_buffer_sample_has_no_duplicates() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut buffer = ReplayBuffer::new(20);
    for i in 0..20 {
        buffer.push(numbered(i));
    }

    for _ in 0..50 {
        let sample = buffer.sample(20, &mut rng).unwrap();
        let distinct: HashSet<i64> = sample.iter().map(|t| t.state[0] as i64).collect();
        assert_eq!(distinct.len(), 20);
    }
}

#[test]
fn test_replay_buffer_sampling_reaches_every_entry() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut buffer = ReplayBuffer::new(10);
    for i in 0..10 {
        buffer.push(numbered(i));
    }

    let mut seen = HashSet::new();
    for _ in 0..200 {
        for t in buffer.sample(2, &mut rng).unwrap() {
            seen.insert(t.state[0] as i64);
        }
    }
    assert_eq!(seen.len(), 10);
}

#[test]
fn test_replay_buffer_extend() {
    let mut buffer = ReplayBuffer::new(2);
    buffer.extend((0..4).map(numbered));
    let states: Vec<f32> = buffer.iter().map(|t| t.state[0]).collect();
    assert_eq!(states, vec![2.0, 3.0]);
}
