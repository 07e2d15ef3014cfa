//! simplex::state — vertex storage and geometric primitives.
//!
//! Purpose
//! -------
//! Own the `nTerms + 1` vertices of the current simplex (in scaled space)
//! together with their objective values, and provide the primitive moves the
//! Nelder–Mead iteration is built from.
//!
//! Key behaviors
//! -------------
//! - [`SimplexState::initialize`] builds vertex 0 at the start point and
//!   vertex `i + 1` at `start + stepᵢ·eᵢ`, evaluating every vertex.
//! - [`SimplexState::lowest`] / [`SimplexState::highest`] return the first
//!   index holding the extreme value, so ties resolve deterministically.
//! - [`SimplexState::shrink`] halves every edge toward the lowest vertex.
//!
//! Invariants & assumptions
//! ------------------------
//! - `vertices.len() == values.len() == dim + 1` at all times.
//! - Stored values are never NaN; the objective adapter maps non-finite
//!   values to `+∞`.
use argmin::core::{CostFunction, Error};

use crate::optimization::simplex::types::{Cost, Theta};

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexState {
    vertices: Vec<Theta>,
    values: Vec<Cost>,
}

impl SimplexState {
    /// Build and evaluate the axis-aligned simplex around `start`.
    ///
    /// `start_value` is the already-known objective at `start`; the remaining
    /// `dim` vertices are evaluated here.
    ///
    /// # Errors
    /// Propagates any error raised by the objective.
    pub fn initialize<O>(
        start: &Theta, start_value: Cost, steps: &Theta, objective: &O,
    ) -> Result<Self, Error>
    where
        O: CostFunction<Param = Theta, Output = Cost>,
    {
        let dim = start.len();
        let mut vertices = Vec::with_capacity(dim + 1);
        let mut values = Vec::with_capacity(dim + 1);
        vertices.push(start.clone());
        values.push(start_value);
        for i in 0..dim {
            let mut vertex = start.clone();
            vertex[i] += steps[i];
            values.push(objective.cost(&vertex)?);
            vertices.push(vertex);
        }
        Ok(Self { vertices, values })
    }

    pub fn dim(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn vertices(&self) -> &[Theta] {
        &self.vertices
    }

    pub fn values(&self) -> &[Cost] {
        &self.values
    }

    pub fn vertex(&self, index: usize) -> &Theta {
        &self.vertices[index]
    }

    pub fn value(&self, index: usize) -> Cost {
        self.values[index]
    }

    pub fn lowest(&self) -> usize {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate().skip(1) {
            if v < self.values[best] {
                best = i;
            }
        }
        best
    }

    pub fn highest(&self) -> usize {
        let mut worst = 0;
        for (i, &v) in self.values.iter().enumerate().skip(1) {
            if v > self.values[worst] {
                worst = i;
            }
        }
        worst
    }

    /// `true` when `value` is no better than every vertex other than `skip`.
    pub fn no_better_than_others(&self, value: Cost, skip: usize) -> bool {
        self.values.iter().enumerate().filter(|&(i, _)| i != skip).all(|(_, &v)| value >= v)
    }

    /// Centroid of all vertices except `skip`.
    pub fn centroid_excluding(&self, skip: usize) -> Theta {
        let mut centroid = Theta::zeros(self.dim());
        for (i, vertex) in self.vertices.iter().enumerate() {
            if i != skip {
                centroid += vertex;
            }
        }
        centroid /= self.dim() as f64;
        centroid
    }

    /// Population standard deviation of the vertex values over `dim`.
    pub fn sd(&self) -> f64 {
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let ss: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / self.dim() as f64).sqrt()
    }

    pub fn replace(&mut self, index: usize, vertex: Theta, value: Cost) {
        self.vertices[index] = vertex;
        self.values[index] = value;
    }

    /// Move every vertex halfway toward `anchor` and re-evaluate it.
    ///
    /// # Errors
    /// Propagates any error raised by the objective.
    pub fn shrink<O>(&mut self, anchor: usize, objective: &O) -> Result<(), Error>
    where
        O: CostFunction<Param = Theta, Output = Cost>,
    {
        let pivot = self.vertices[anchor].clone();
        for i in 0..self.vertices.len() {
            if i == anchor {
                continue;
            }
            let moved = (&self.vertices[i] + &pivot) * 0.5;
            self.values[i] = objective.cost(&moved)?;
            self.vertices[i] = moved;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    struct SumOfSquares;

    impl CostFunction for SumOfSquares {
        type Param = Theta;
        type Output = Cost;

        fn cost(&self, theta: &Theta) -> Result<Cost, Error> {
            Ok(theta.dot(theta))
        }
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Axis-aligned initialization and vertex evaluation.
    // - Extreme-vertex selection, centroid, and spread of values.
    // - Shrinking toward an anchor vertex.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Vertex i + 1 is the start point moved along axis i by its step.
    //
    // Given
    // -----
    // - Start (1, 2), steps (0.5, -1).
    //
    // Expect
    // ------
    // - Vertices (1, 2), (1.5, 2), (1, 1) with values 5, 6.25, 2.
    fn initialize_builds_axis_aligned_simplex() {
        // Arrange
        let start = array![1.0, 2.0];
        let steps = array![0.5, -1.0];

        // Act
        let state = SimplexState::initialize(&start, 5.0, &steps, &SumOfSquares).unwrap();

        // Assert
        assert_eq!(state.vertex(1), &array![1.5, 2.0]);
        assert_eq!(state.vertex(2), &array![1.0, 1.0]);
        assert_eq!(state.values(), &[5.0, 6.25, 2.0]);
        assert_eq!(state.lowest(), 2);
        assert_eq!(state.highest(), 1);
    }

    #[test]
    fn centroid_and_sd_use_expected_denominators() {
        let start = array![0.0, 0.0];
        let state = SimplexState::initialize(&start, 0.0, &array![2.0, 4.0], &SumOfSquares).unwrap();

        let centroid = state.centroid_excluding(2);
        // Values are 0, 4, 16 with mean 20/3.
        let mean: f64 = 20.0 / 3.0;
        let expected = (mean.powi(2) + (4.0 - mean).powi(2) + (16.0 - mean).powi(2)) / 2.0;

        assert_eq!(centroid, array![1.0, 0.0]);
        assert_relative_eq!(state.sd(), expected.sqrt(), epsilon = 1e-12);
        assert!(state.no_better_than_others(4.0, 2));
        assert!(!state.no_better_than_others(3.0, 2));
    }

    #[test]
    // Purpose
    // -------
    // Shrinking halves each vertex's offset from the anchor and leaves the
    // anchor untouched.
    fn shrink_moves_vertices_toward_anchor() {
        let start = array![1.0, 1.0];
        let mut state =
            SimplexState::initialize(&start, 2.0, &array![2.0, 2.0], &SumOfSquares).unwrap();

        state.shrink(0, &SumOfSquares).unwrap();

        assert_eq!(state.vertex(0), &array![1.0, 1.0]);
        assert_eq!(state.vertex(1), &array![2.0, 1.0]);
        assert_eq!(state.vertex(2), &array![1.0, 2.0]);
        assert_eq!(state.values(), &[2.0, 5.0, 5.0]);
    }
}
