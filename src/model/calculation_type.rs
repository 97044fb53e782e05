/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::model::value::Value;
use anyhow::{anyhow, Error};
use randlib::Rand;
use std::fmt;
use std::str::FromStr;
use tracing::*;

/// How an attribute combines the values connected to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationType {
    Mean,
    And,
    Or,
    Multiplication,
    Division,
    SampleTriangle,
    /// Never computed: the attribute is always entered by hand, even with inputs connected.
    Qualitative,
}

impl CalculationType {
    pub const ALL: [CalculationType; 7] = [
        CalculationType::Mean,
        CalculationType::And,
        CalculationType::Or,
        CalculationType::Multiplication,
        CalculationType::Division,
        CalculationType::SampleTriangle,
        CalculationType::Qualitative,
    ];

    // A degenerate triangle (a == b == c) is widened by this much on each side before sampling.
    const TRIANGLE_EPSILON: f64 = 1e-10;

    pub fn symbol(&self) -> &'static str {
        match self {
            CalculationType::Mean => "mean",
            CalculationType::And => "and",
            CalculationType::Or => "or",
            CalculationType::Multiplication => "multiplication",
            CalculationType::Division => "division",
            CalculationType::SampleTriangle => "sample_triangle",
            CalculationType::Qualitative => "qualitative",
        }
    }

    /// None means any number of inputs, in no particular order. Some(n) means exactly n inputs,
    /// where position matters (the "enumerated" input types).
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            CalculationType::Division | CalculationType::SampleTriangle => Some(2),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        *self != CalculationType::Qualitative
    }

    /// Reduces the (already validated and scaled) input values to one output value. Inputs are in
    /// slot order for the order-significant types. Only the triangle comparison uses num_samples.
    pub fn calculate_output_value(&self, inputs: &[Value], num_samples: u32) -> Value {
        if inputs.is_empty() {
            return Value::Insufficient;
        }
        match self {
            CalculationType::Mean => {
                let sum = CalculationType::fold_exact(inputs, |a, b| a + b);
                let count = inputs.len() as f64;
                sum.map_components(|_, x| x / count)
            }
            CalculationType::And => CalculationType::fold_exact(inputs, |a, b| a + b),
            CalculationType::Or => CalculationType::fold_exact(inputs, f64::min),
            CalculationType::Multiplication => inputs[1..]
                .iter()
                .fold(inputs[0].clone(), |acc, v| acc.zip_broadcast(v, |a, b| a * b)),
            CalculationType::Division => {
                if inputs.len() != 2 {
                    return Value::Insufficient;
                }
                let quotient = inputs[0].zip_broadcast(&inputs[1], |a, b| a / b);
                match quotient.components() {
                    Some(components) if components.iter().all(|x| x.is_finite()) => quotient,
                    Some(_) => {
                        debug!("Division of {} by {} is not finite.", inputs[0], inputs[1]);
                        Value::SetupError
                    }
                    None => quotient,
                }
            }
            CalculationType::SampleTriangle => {
                if inputs.len() != 2 {
                    return Value::Insufficient;
                }
                match (&inputs[0], &inputs[1]) {
                    (Value::Triangle(first), Value::Triangle(second)) => {
                        CalculationType::sample_triangle(*first, *second, num_samples)
                    }
                    _ => Value::SetupError,
                }
            }
            CalculationType::Qualitative => Value::Insufficient,
        }
    }

    fn fold_exact(inputs: &[Value], f: impl Fn(f64, f64) -> f64) -> Value {
        inputs[1..]
            .iter()
            .fold(inputs[0].clone(), |acc, v| acc.zip_exact(v, &f))
    }

    /// Estimates the probability that a draw from the first triangular distribution exceeds a draw
    /// from the second, by drawing num_samples pairs. The result is random: repeated calls agree
    /// statistically, not bit for bit.
    pub fn sample_triangle(first: [f64; 3], second: [f64; 3], num_samples: u32) -> Value {
        if num_samples == 0 {
            return Value::Insufficient;
        }
        let first = CalculationType::widen_if_degenerate(first);
        let second = CalculationType::widen_if_degenerate(second);
        if !CalculationType::is_ordered_triangle(&first) || !CalculationType::is_ordered_triangle(&second) {
            debug!("Triangle {:?} or {:?} is not ordered as a <= b <= c.", first, second);
            return Value::SetupError;
        }
        let mut rng = Rand::new();
        let mut first_greater: u64 = 0;
        for _ in 0..num_samples {
            let x = CalculationType::sample_one_triangle(&mut rng, &first);
            let y = CalculationType::sample_one_triangle(&mut rng, &second);
            if x > y {
                first_greater += 1;
            }
        }
        Value::Number(first_greater as f64 / num_samples as f64)
    }

    fn widen_if_degenerate(t: [f64; 3]) -> [f64; 3] {
        let [a, b, c] = t;
        if a == b && b == c {
            [a - CalculationType::TRIANGLE_EPSILON, b, c + CalculationType::TRIANGLE_EPSILON]
        } else {
            t
        }
    }

    fn is_ordered_triangle(t: &[f64; 3]) -> bool {
        t[0] <= t[1] && t[1] <= t[2] && t[0] < t[2]
    }

    /// Inverse transform sampling, with a the minimum, b the mode and c the maximum.
    fn sample_one_triangle(rng: &mut Rand, t: &[f64; 3]) -> f64 {
        let [min, mode, max] = *t;
        let u = CalculationType::uniform(rng);
        let mode_fraction = (mode - min) / (max - min);
        if u < mode_fraction {
            min + (u * (max - min) * (mode - min)).sqrt()
        } else {
            max - ((1.0 - u) * (max - min) * (max - mode)).sqrt()
        }
    }

    /// Uniform in [0, 1), from the top 53 bits of a random u64.
    fn uniform(rng: &mut Rand) -> f64 {
        (rng.rand_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for CalculationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        CalculationType::ALL
            .iter()
            .find(|c| c.symbol() == lowered)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown calculation type \"{}\"; expected one of: {}",
                    s,
                    CalculationType::ALL
                        .iter()
                        .map(|c| c.symbol())
                        .collect::<Vec<&str>>()
                        .join(", ")
                )
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Util;

    fn numbers(xs: &[f64]) -> Vec<Value> {
        xs.iter().map(|x| Value::Number(*x)).collect()
    }

    #[test]
    fn mean_and_or_on_numbers() {
        Util::initialize_tracing();
        let inputs = numbers(&[2.0, 4.0, 9.0]);
        assert_eq!(CalculationType::Mean.calculate_output_value(&inputs, 1), Value::Number(5.0));
        assert_eq!(CalculationType::And.calculate_output_value(&inputs, 1), Value::Number(15.0));
        assert_eq!(CalculationType::Or.calculate_output_value(&inputs, 1), Value::Number(2.0));
    }

    #[test]
    fn mean_works_element_wise_on_triangles() {
        Util::initialize_tracing();
        let inputs = vec![Value::Triangle([1.0, 2.0, 3.0]), Value::Triangle([3.0, 4.0, 7.0])];
        assert_eq!(
            CalculationType::Mean.calculate_output_value(&inputs, 1),
            Value::Triangle([2.0, 3.0, 5.0])
        );
        assert_eq!(
            CalculationType::Or.calculate_output_value(&inputs, 1),
            Value::Triangle([1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn mixed_lengths_are_a_setup_error_for_mean() {
        Util::initialize_tracing();
        let inputs = vec![Value::Number(1.0), Value::Triangle([3.0, 4.0, 7.0])];
        assert_eq!(CalculationType::Mean.calculate_output_value(&inputs, 1), Value::SetupError);
    }

    #[test]
    fn multiplication_broadcasts() {
        Util::initialize_tracing();
        assert_eq!(
            CalculationType::Multiplication.calculate_output_value(&numbers(&[3.0, 1.0, 2.0]), 1),
            Value::Number(6.0)
        );
        let mixed = vec![Value::Number(2.0), Value::Triangle([1.0, 2.0, 3.0]), Value::Number(0.5)];
        assert_eq!(
            CalculationType::Multiplication.calculate_output_value(&mixed, 1),
            Value::Triangle([1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn division_is_ordered_and_broadcasts() {
        Util::initialize_tracing();
        assert_eq!(
            CalculationType::Division.calculate_output_value(&numbers(&[6.0, 4.0]), 1),
            Value::Number(1.5)
        );
        assert_eq!(
            CalculationType::Division.calculate_output_value(&numbers(&[4.0, 6.0]), 1),
            Value::Number(4.0 / 6.0)
        );
        let t = vec![Value::Triangle([2.0, 4.0, 8.0]), Value::Number(2.0)];
        assert_eq!(
            CalculationType::Division.calculate_output_value(&t, 1),
            Value::Triangle([1.0, 2.0, 4.0])
        );
        assert_eq!(
            CalculationType::Division.calculate_output_value(&numbers(&[1.0, 0.0]), 1),
            Value::SetupError
        );
    }

    #[test]
    fn fixed_arity() {
        Util::initialize_tracing();
        assert_eq!(CalculationType::Division.fixed_arity(), Some(2));
        assert_eq!(CalculationType::SampleTriangle.fixed_arity(), Some(2));
        assert_eq!(CalculationType::And.fixed_arity(), None);
        assert!(!CalculationType::Qualitative.is_computed());
    }

    #[test]
    fn sample_triangle_favors_the_larger_distribution() {
        Util::initialize_tracing();
        let low = [1.0, 2.0, 3.0];
        let high = [4.0, 5.0, 6.0];
        match CalculationType::sample_triangle(low, high, 20000) {
            Value::Number(p) => assert!(p <= 0.02, "p = {}", p),
            other => panic!("unexpected {:?}", other),
        }
        match CalculationType::sample_triangle(high, low, 20000) {
            Value::Number(p) => assert!(p >= 0.98, "p = {}", p),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn sample_triangle_of_identical_distributions_is_about_even() {
        Util::initialize_tracing();
        let t = [0.0, 1.0, 2.0];
        match CalculationType::sample_triangle(t, t, 50000) {
            Value::Number(p) => assert!((p - 0.5).abs() < 0.03, "p = {}", p),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn sample_triangle_handles_degenerate_and_unordered_input() {
        Util::initialize_tracing();
        // a point at 5 against a point at 3: the widening keeps them apart.
        assert_eq!(
            CalculationType::sample_triangle([5.0, 5.0, 5.0], [3.0, 3.0, 3.0], 1000),
            Value::Number(1.0)
        );
        assert_eq!(
            CalculationType::sample_triangle([3.0, 1.0, 2.0], [1.0, 2.0, 3.0], 1000),
            Value::SetupError
        );
    }

    #[test]
    fn parse_from_symbol() {
        Util::initialize_tracing();
        assert_eq!("AND".parse::<CalculationType>().unwrap(), CalculationType::And);
        assert_eq!(
            "sample_triangle".parse::<CalculationType>().unwrap(),
            CalculationType::SampleTriangle
        );
        assert!("sum".parse::<CalculationType>().is_err());
    }
}
