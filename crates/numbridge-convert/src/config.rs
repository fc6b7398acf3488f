//! Registration Options
//!
//! [`ExposeOptions`] controls what the registration pass puts into a
//! registry. By default every converter family is registered and
//! arrays with unit stride in both dimensions are accepted by both
//! orientations, so any dense 1xN or Nx1 matrix round-trips.

/// How a 2-D array whose two dimensions both have unit stride (a 1xN or
/// Nx1 matrix) is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContiguityTieBreak {
    /// Dimension 1 is tested first, so such arrays are row-major only.
    ///
    /// Column-major containers with a single row (or no rows) then fail
    /// to read back their own foreign arrays.
    PreferRowMajor,
    /// Such arrays are accepted by both orientations
    #[default]
    AcceptEither,
}

/// Options for [`expose_converters_with`](crate::expose_converters_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeOptions {
    /// Tie-break for arrays contiguous in both dimensions
    pub tie_break: ContiguityTieBreak,
    /// Register converters for array scalars
    pub array_scalars: bool,
    /// Register the copying converters for plain native containers
    pub indirect_targets: bool,
}

impl ExposeOptions {
    /// Options with every converter family enabled
    pub fn new() -> Self {
        Self {
            tie_break: ContiguityTieBreak::default(),
            array_scalars: true,
            indirect_targets: true,
        }
    }

    /// Set the tie-break policy
    pub fn with_tie_break(mut self, tie_break: ContiguityTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Enable or disable array scalar converters
    pub fn with_array_scalars(mut self, enabled: bool) -> Self {
        self.array_scalars = enabled;
        self
    }

    /// Enable or disable indirect (copying) converters
    pub fn with_indirect_targets(mut self, enabled: bool) -> Self {
        self.indirect_targets = enabled;
        self
    }
}

impl Default for ExposeOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExposeOptions::default();
        assert_eq!(options.tie_break, ContiguityTieBreak::AcceptEither);
        assert!(options.array_scalars);
        assert!(options.indirect_targets);
    }

    #[test]
    fn test_builder() {
        let options = ExposeOptions::new()
            .with_tie_break(ContiguityTieBreak::PreferRowMajor)
            .with_array_scalars(false);
        assert_eq!(options.tie_break, ContiguityTieBreak::PreferRowMajor);
        assert!(!options.array_scalars);
        assert!(options.indirect_targets);
    }
}
