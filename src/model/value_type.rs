/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::model::calculation_type::CalculationType;
use crate::model::value::Value;
use anyhow::{anyhow, Error};
use std::fmt;
use std::str::FromStr;
use tracing::*;

/// The kind of value an attribute holds. Decides what a valid value looks like, what an
/// attribute with nothing connected defaults to, and which connections make sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Probability,
    TriangleDistribution,
}

impl ValueType {
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Number,
        ValueType::Probability,
        ValueType::TriangleDistribution,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Probability => "probability",
            ValueType::TriangleDistribution => "triangle",
        }
    }

    /// What an attribute computes to when nothing is connected to it.
    pub fn default_value(&self) -> Value {
        match self {
            ValueType::String => Value::Text(String::new()),
            ValueType::Number | ValueType::Probability => Value::Number(0.0),
            ValueType::TriangleDistribution => Value::Triangle([0.0, 0.0, 0.0]),
        }
    }

    pub fn is_correct_input_value(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::String, Value::Text(_)) => true,
            (ValueType::Number, Value::Number(x)) => x.is_finite(),
            (ValueType::Probability, Value::Number(x)) => (0.0..=1.0).contains(x),
            (ValueType::TriangleDistribution, Value::Triangle(t)) => t.iter().all(|x| x.is_finite()),
            _ => false,
        }
    }

    pub fn adjust_to_range(&self, value: Value) -> Value {
        match (self, value) {
            (ValueType::Probability, Value::Number(x)) => Value::Number(x.clamp(0.0, 1.0)),
            (_, other) => other,
        }
    }

    /// How many scalars may multiply a value of this type: a single one multiplies every
    /// component, three multiply a triangle component-wise.
    pub fn allowed_scalar_arities(&self) -> &'static [usize] {
        match self {
            ValueType::String => &[],
            ValueType::Number | ValueType::Probability => &[1],
            ValueType::TriangleDistribution => &[1, 3],
        }
    }

    /// Multiplies a value by a per-connection scalar tuple. A scalar whose length this type doesn't
    /// allow is skipped (the value passes through unchanged) with a diagnostic.
    pub fn apply_scalars(&self, value: Value, scalars: &[f64]) -> Value {
        if !self.allowed_scalar_arities().contains(&scalars.len()) {
            warn!(
                "Skipping scalar {:?}: a {} value takes {:?} scalar(s).",
                scalars,
                self.symbol(),
                self.allowed_scalar_arities()
            );
            return value;
        }
        if scalars.len() == 1 {
            value.map_components(|_, x| x * scalars[0])
        } else {
            value.map_components(|i, x| x * scalars[i])
        }
    }

    /// Parses user (or script) input for an attribute of this type. Never fails: an
    /// unparsable string is the SetupError sentinel.
    pub fn parse_value(&self, s: &str) -> Value {
        match self {
            ValueType::String => match Value::parse_sentinel(s.trim()) {
                Some(sentinel) => sentinel,
                None => Value::Text(s.to_string()),
            },
            _ => Value::parse_numeric(s),
        }
    }

    /// Whether an attribute of this type (the output), using calculation_type, can take inputs of
    /// input_value_types, in order. Mismatches are reported as a diagnostic and false, never as an
    /// error: the caller just doesn't store the connection.
    ///
    /// This is checked each time an input is added, so it accepts a partial input list: a fixed
    /// arity type may have fewer inputs than it will need for calculating, and a triangle product
    /// may get its scalar inputs before its triangle one (see awaits_triangle_input).
    pub fn correctly_connected(
        &self,
        calculation_type: Option<CalculationType>,
        input_value_types: &[ValueType],
    ) -> bool {
        let result = self.check_connection(calculation_type, input_value_types);
        match result {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Connection refused for {} output with {:?} from {:?}: {}",
                    self.symbol(),
                    calculation_type.map(|c| c.symbol()),
                    input_value_types
                        .iter()
                        .map(|t| t.symbol())
                        .collect::<Vec<&str>>(),
                    e
                );
                false
            }
        }
    }

    /// A triangle product with inputs, none of them a triangle: incomplete, so it doesn't calculate
    /// yet, and its last triangle input can't be taken away while the others stay.
    pub fn awaits_triangle_input(
        &self,
        calculation_type: Option<CalculationType>,
        input_value_types: &[ValueType],
    ) -> bool {
        *self == ValueType::TriangleDistribution
            && calculation_type == Some(CalculationType::Multiplication)
            && !input_value_types.is_empty()
            && !input_value_types.contains(&ValueType::TriangleDistribution)
    }

    fn check_connection(
        &self,
        calculation_type: Option<CalculationType>,
        input_value_types: &[ValueType],
    ) -> Result<(), Error> {
        if input_value_types.is_empty() {
            return Ok(());
        }
        if let Some(arity) = calculation_type.and_then(|c| c.fixed_arity()) {
            if input_value_types.len() > arity {
                return Err(anyhow!("it takes exactly {} inputs", arity));
            }
        }
        let numeric = |t: &ValueType| *t != ValueType::String;
        let is_triangle = |t: &ValueType| *t == ValueType::TriangleDistribution;
        match calculation_type {
            Some(CalculationType::Qualitative) => Ok(()),
            Some(_) if *self == ValueType::String => {
                Err(anyhow!("a string attribute can only be entered manually"))
            }
            Some(CalculationType::SampleTriangle) => {
                if *self != ValueType::Probability {
                    Err(anyhow!("comparing triangles gives a probability"))
                } else if !input_value_types.iter().all(is_triangle) {
                    Err(anyhow!("only triangle distributions can be compared"))
                } else {
                    Ok(())
                }
            }
            Some(CalculationType::Multiplication) => {
                if !input_value_types.iter().all(numeric) {
                    Err(anyhow!("only numeric values can be multiplied"))
                } else if !is_triangle(self) && input_value_types.iter().any(is_triangle) {
                    Err(anyhow!("a triangle input makes a triangle product"))
                } else {
                    Ok(())
                }
            }
            Some(CalculationType::Division) if is_triangle(self) => {
                if !is_triangle(&input_value_types[0]) {
                    Err(anyhow!("the dividend of a triangle quotient must be a triangle"))
                } else if !input_value_types.iter().all(numeric) {
                    Err(anyhow!("only numeric values can be divided"))
                } else {
                    Ok(())
                }
            }
            _ => {
                if input_value_types.iter().all(|t| t == self) {
                    Ok(())
                } else {
                    Err(anyhow!("value types must match"))
                }
            }
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        ValueType::ALL
            .iter()
            .find(|t| t.symbol() == lowered)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "Unknown value type \"{}\"; expected one of: {}",
                    s,
                    ValueType::ALL
                        .iter()
                        .map(|t| t.symbol())
                        .collect::<Vec<&str>>()
                        .join(", ")
                )
            })
    }
}
