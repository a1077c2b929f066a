use crate::errors::BetError;

/// Active chip denomination.
///
/// With a chip selected, clicking a spot stacks that chip; with none selected
/// the click removes the top chip instead.
#[derive(Debug, Clone)]
pub struct ChipSelector {
    denominations: Vec<u64>,
    current: Option<u64>,
    locked: bool,
}

impl ChipSelector {
    pub fn new(denominations: Vec<u64>) -> Self {
        Self {
            denominations,
            current: None,
            locked: false,
        }
    }

    pub fn denominations(&self) -> &[u64] {
        &self.denominations
    }

    pub fn current(&self) -> Option<u64> {
        self.current
    }

    /// Select a chip, or deselect it if it is already active
    pub fn select(&mut self, value: u64) -> Result<Option<u64>, BetError> {
        if self.locked {
            return Err(BetError::RoundLocked);
        }
        if !self.denominations.contains(&value) {
            return Err(BetError::InvalidAmount(value));
        }

        self.current = if self.current == Some(value) {
            None
        } else {
            Some(value)
        };
        Ok(self.current)
    }

    pub fn clear_selection(&mut self) {
        self.current = None;
    }

    /// Follow the table lock; locking drops the selection
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked {
            self.clear_selection();
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}
