use crate::table::types::{MAX_NUMBER, POCKET_COUNT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplier of winning numbers, uniform over 0..=36
pub trait WinningNumberSource {
    fn next_winning_number(&mut self) -> u8;
}

impl<S: WinningNumberSource + ?Sized> WinningNumberSource for Box<S> {
    fn next_winning_number(&mut self) -> u8 {
        (**self).next_winning_number()
    }
}

/// Source backed by a `rand` generator
pub struct RandomSource<R = StdRng> {
    rng: R,
}

impl RandomSource<StdRng> {
    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence for replays
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> WinningNumberSource for RandomSource<R> {
    fn next_winning_number(&mut self) -> u8 {
        self.rng.gen_range(0..POCKET_COUNT)
    }
}

/// Replays a fixed list of numbers, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    numbers: Vec<u8>,
    position: usize,
}

impl ScriptedSource {
    /// # Panics
    ///
    /// Panics if `numbers` is empty or contains a number above 36.
    pub fn new(numbers: impl Into<Vec<u8>>) -> Self {
        let numbers = numbers.into();
        assert!(!numbers.is_empty(), "scripted source needs at least one number");
        assert!(
            numbers.iter().all(|n| *n <= MAX_NUMBER),
            "scripted numbers must be within 0..=36"
        );
        Self {
            numbers,
            position: 0,
        }
    }
}

impl WinningNumberSource for ScriptedSource {
    fn next_winning_number(&mut self) -> u8 {
        let number = self.numbers[self.position % self.numbers.len()];
        self.position += 1;
        number
    }
}
