//! Configuration threaded through every construction and solve.

use crate::types::{Result, RustySpectralError};

/// Basis used for univariate representations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Basis {
    /// Chebyshev polynomials on a bounded interval.
    Chebyshev,
    /// Trigonometric polynomials for periodic functions.
    Trigonometric,
}

/// Discretization technique for differential operators in the Chebyshev basis.
///
/// When [`Preferences::basis`] is [`Basis::Trigonometric`] Fourier collocation is
/// used regardless of this setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Discretization {
    /// Rectangular spectral collocation on Chebyshev points.
    Collocation,
    /// The ultraspherical spectral method in coefficient space.
    Ultraspherical,
}

/// Numerical preferences.
///
/// The defaults play the role of process-wide settings. They are never
/// mutated globally; pass a modified copy to override them for one call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preferences {
    /// Relative accuracy target for all truncations.
    pub tolerance: f64,
    pub discretization: Discretization,
    pub basis: Basis,
    /// Maximum number of samples for a univariate approximation.
    pub max_length: usize,
    /// Maximum rank of a separable approximation.
    pub max_rank: usize,
    /// Initial number of pivot-search points per coordinate.
    pub sample_grid: usize,
    /// Maximum number of pivot-search points per coordinate.
    pub max_sample_grid: usize,
    /// First dimension tried when discretizing an operator.
    pub min_dimension: usize,
    /// Largest dimension tried when discretizing an operator.
    pub max_dimension: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            tolerance: 1E-10,
            discretization: Discretization::Ultraspherical,
            basis: Basis::Chebyshev,
            max_length: 4097,
            max_rank: 128,
            sample_grid: 33,
            max_sample_grid: 257,
            min_dimension: 33,
            max_dimension: 513,
        }
    }
}

impl Preferences {
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Preferences { tolerance, ..self }
    }

    pub fn with_discretization(self, discretization: Discretization) -> Self {
        Preferences {
            discretization,
            ..self
        }
    }

    pub fn with_basis(self, basis: Basis) -> Self {
        Preferences { basis, ..self }
    }

    pub fn with_max_rank(self, max_rank: usize) -> Self {
        Preferences { max_rank, ..self }
    }

    pub fn with_sample_grid(self, sample_grid: usize) -> Self {
        Preferences {
            sample_grid,
            ..self
        }
    }

    /// Initial and largest pivot-search grid per axis.
    pub fn with_sample_grids(self, sample_grid: usize, max_sample_grid: usize) -> Self {
        Preferences {
            sample_grid,
            max_sample_grid,
            ..self
        }
    }

    pub fn with_max_length(self, max_length: usize) -> Self {
        Preferences { max_length, ..self }
    }

    pub fn with_dimensions(self, min_dimension: usize, max_dimension: usize) -> Self {
        Preferences {
            min_dimension,
            max_dimension,
            ..self
        }
    }

    /// Check that the preferences describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            return Err(RustySpectralError::InvalidTolerance(self.tolerance));
        }
        if self.max_length < 17 {
            return Err(RustySpectralError::InvalidPreferences(
                "max_length must be at least 17",
            ));
        }
        if self.sample_grid < 3 || self.sample_grid > self.max_sample_grid {
            return Err(RustySpectralError::InvalidPreferences(
                "require 3 <= sample_grid <= max_sample_grid",
            ));
        }
        if self.min_dimension < 3 || self.min_dimension > self.max_dimension {
            return Err(RustySpectralError::InvalidPreferences(
                "require 3 <= min_dimension <= max_dimension",
            ));
        }
        Ok(())
    }

    /// Sample counts `n, 2n - 1, 4n - 3, ...` up to and including `max`.
    pub(crate) fn refinement(start: usize, max: usize) -> impl Iterator<Item = usize> {
        std::iter::successors(Some(start), move |&n| {
            let next = 2 * n - 1;
            if next <= max {
                Some(next)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refinement_sequence() {
        let sizes: Vec<usize> = Preferences::refinement(17, 129).collect();
        assert_eq!(sizes, vec![17, 33, 65, 129]);
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        assert!(Preferences::default().validate().is_ok());
        assert!(Preferences::default().with_tolerance(0.0).validate().is_err());
        assert!(Preferences::default().with_tolerance(2.0).validate().is_err());
        assert!(Preferences::default().with_dimensions(65, 33).validate().is_err());
    }
}
