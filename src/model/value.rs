/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::util::Util;
use std::fmt;

/// The value held by (or computed for) one setup attribute.
///
/// Numeric values are small tuples: a `Number` is a 1-tuple (used by both the Number and the
/// Probability value types) and a `Triangle` is the 3-tuple (a, b, c) of a triangular
/// distribution with mode b. The last three variants are the sentinels that stand in for a local
/// failure; they are never thrown, just stored and passed on to whatever consumes them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Triangle([f64; 3]),
    Text(String),
    /// A calculation type with a fixed arity got the wrong number of inputs (or an input was
    /// never entered).
    Insufficient,
    /// An input had the wrong shape, was out of range, or could not be parsed.
    SetupError,
    /// The attribute depends on itself.
    Cycle,
}

impl Value {
    pub const INSUFFICIENT: &'static str = "-";
    pub const SETUP_ERROR: &'static str = "SETUP ERROR";
    pub const CYCLE: &'static str = "CYCLE ERROR";
    const SEPARATOR: &'static str = " / ";

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Value::Insufficient | Value::SetupError | Value::Cycle)
    }

    /// The numeric components, or None for text and sentinels.
    pub fn components(&self) -> Option<&[f64]> {
        match self {
            Value::Number(x) => Some(std::slice::from_ref(x)),
            Value::Triangle(t) => Some(&t[..]),
            _ => None,
        }
    }

    /// Only 1 or 3 components make a value; any other count is a setup error.
    pub fn from_components(components: &[f64]) -> Value {
        match *components {
            [x] => Value::Number(x),
            [a, b, c] => Value::Triangle([a, b, c]),
            _ => Value::SetupError,
        }
    }

    /// Applies f to each numeric component (with its index). Text and sentinels come back unchanged.
    pub fn map_components(&self, f: impl Fn(usize, f64) -> f64) -> Value {
        match self.components() {
            Some(components) => {
                let mapped: Vec<f64> = components
                    .iter()
                    .enumerate()
                    .map(|(i, x)| f(i, *x))
                    .collect();
                Value::from_components(&mapped)
            }
            None => self.clone(),
        }
    }

    /// Element-wise combination where both sides must have the same number of components.
    pub fn zip_exact(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
        match (self.components(), other.components()) {
            (Some(a), Some(b)) if a.len() == b.len() => {
                let combined: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| f(*x, *y)).collect();
                Value::from_components(&combined)
            }
            _ => Value::SetupError,
        }
    }

    /// Element-wise combination where a 1-component side is broadcast against a 3-component side.
    pub fn zip_broadcast(&self, other: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
        let (a, b) = match (self.components(), other.components()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Value::SetupError,
        };
        let len = a.len().max(b.len());
        if (a.len() != len && a.len() != 1) || (b.len() != len && b.len() != 1) {
            return Value::SetupError;
        }
        let pick = |side: &[f64], i: usize| if side.len() == 1 { side[0] } else { side[i] };
        let combined: Vec<f64> = (0..len).map(|i| f(pick(a, i), pick(b, i))).collect();
        Value::from_components(&combined)
    }

    /// Reads the "a / b / c" (or plain "x") form used wherever values cross into or out of strings.
    /// Any failure gives the SetupError sentinel rather than an error, and the sentinel texts read
    /// back as their sentinels.
    pub fn parse_numeric(s: &str) -> Value {
        let trimmed = s.trim();
        if let Some(sentinel) = Value::parse_sentinel(trimmed) {
            return sentinel;
        }
        let parsed: Result<Vec<f64>, _> = trimmed
            .split('/')
            .map(|part| part.trim().parse::<f64>())
            .collect();
        match parsed {
            Ok(numbers) if numbers.iter().all(|x| x.is_finite()) => {
                Value::from_components(&numbers)
            }
            _ => Value::SetupError,
        }
    }

    pub fn parse_sentinel(s: &str) -> Option<Value> {
        match s {
            Value::INSUFFICIENT => Some(Value::Insufficient),
            Value::SETUP_ERROR => Some(Value::SetupError),
            Value::CYCLE => Some(Value::Cycle),
            _ => None,
        }
    }

    /// For display only: decimal_places of None means show the full precision.
    pub fn to_display_string(&self, decimal_places: Option<usize>) -> String {
        match self {
            Value::Number(_) | Value::Triangle(_) => self
                .components()
                .unwrap_or_default()
                .iter()
                .map(|x| Util::format_number(*x, decimal_places))
                .collect::<Vec<String>>()
                .join(Value::SEPARATOR),
            Value::Text(s) => s.clone(),
            Value::Insufficient => Value::INSUFFICIENT.to_string(),
            Value::SetupError => Value::SETUP_ERROR.to_string(),
            Value::Cycle => Value::CYCLE.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string(None))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_numeric_reads_numbers_triangles_and_sentinels() {
        Util::initialize_tracing();
        assert_eq!(Value::parse_numeric("3"), Value::Number(3.0));
        assert_eq!(Value::parse_numeric(" 1 / 2.5 / 4 "), Value::Triangle([1.0, 2.5, 4.0]));
        assert_eq!(Value::parse_numeric("-"), Value::Insufficient);
        assert_eq!(Value::parse_numeric("SETUP ERROR"), Value::SetupError);
        assert_eq!(Value::parse_numeric("CYCLE ERROR"), Value::Cycle);
    }

    #[test]
    fn parse_numeric_failures_become_setup_error() {
        Util::initialize_tracing();
        assert_eq!(Value::parse_numeric(""), Value::SetupError);
        assert_eq!(Value::parse_numeric("abc"), Value::SetupError);
        assert_eq!(Value::parse_numeric("1 / 2"), Value::SetupError);
        assert_eq!(Value::parse_numeric("1 / x / 3"), Value::SetupError);
        assert_eq!(Value::parse_numeric("inf"), Value::SetupError);
    }

    #[test]
    fn display_string_joins_components() {
        Util::initialize_tracing();
        let t = Value::Triangle([1.0, 2.0, 3.5]);
        assert_eq!(t.to_string(), "1 / 2 / 3.5");
        assert_eq!(Value::Number(1.0 / 3.0).to_display_string(Some(3)), "0.333");
        assert_eq!(Value::Number(7.0).to_display_string(Some(3)), "7");
        assert_eq!(Value::SetupError.to_string(), "SETUP ERROR");
        assert_eq!(Value::Insufficient.to_string(), "-");
    }

    #[test]
    fn zip_broadcast_spreads_a_single_component() {
        Util::initialize_tracing();
        let product = Value::Number(2.0).zip_broadcast(&Value::Triangle([1.0, 2.0, 3.0]), |a, b| a * b);
        assert_eq!(product, Value::Triangle([2.0, 4.0, 6.0]));
        let quotient = Value::Triangle([2.0, 4.0, 6.0]).zip_broadcast(&Value::Number(2.0), |a, b| a / b);
        assert_eq!(quotient, Value::Triangle([1.0, 2.0, 3.0]));
        assert_eq!(
            Value::Text("x".to_string()).zip_broadcast(&Value::Number(1.0), |a, b| a + b),
            Value::SetupError
        );
    }

    #[test]
    fn zip_exact_requires_equal_lengths() {
        Util::initialize_tracing();
        assert_eq!(
            Value::Number(1.0).zip_exact(&Value::Triangle([1.0, 2.0, 3.0]), |a, b| a + b),
            Value::SetupError
        );
        assert_eq!(
            Value::Triangle([1.0, 2.0, 3.0]).zip_exact(&Value::Triangle([1.0, 1.0, 1.0]), |a, b| a + b),
            Value::Triangle([2.0, 3.0, 4.0])
        );
    }
}
