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
use crate::model::ids::{ConfigurationAttributeId, ConfigurationClassId};
use crate::model::value_type::ValueType;

/// One declared input of a configuration attribute. Internal means the input is read from the
/// same setup instance; external means it is read from another instance connected to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeInput {
    pub attribute: ConfigurationAttributeId,
    pub is_internal: bool,
}

/// The schema-level definition of an attribute: its type, how it is calculated, and where its
/// inputs come from. The inputs are kept in the order they were added; for the order-significant
/// calculation types that order is the operand order (slot 0, slot 1).
///
/// Structural changes (adding or removing inputs) go through RiskModel, which validates them and
/// keeps the instances in step; the plain settings below can be changed here directly.
#[derive(Debug, Clone)]
pub struct ConfigurationAttribute {
    id: ConfigurationAttributeId,
    class_id: ConfigurationClassId,
    name: String,
    value_type: ValueType,
    calculation_type: Option<CalculationType>,
    inputs: Vec<AttributeInput>,
    input_scalar: f64,
    input_offset: f64,
    is_hidden: bool,
}

impl ConfigurationAttribute {
    /// A new attribute is a manually entered number, with no inputs.
    pub fn new(
        id: ConfigurationAttributeId,
        class_id: ConfigurationClassId,
        name_in: &str,
    ) -> ConfigurationAttribute {
        ConfigurationAttribute {
            id,
            class_id,
            name: name_in.to_string(),
            value_type: ValueType::Number,
            calculation_type: None,
            inputs: Vec::new(),
            input_scalar: 1.0,
            input_offset: 0.0,
            is_hidden: false,
        }
    }

    pub fn get_id(&self) -> ConfigurationAttributeId {
        self.id
    }

    pub fn get_class_id(&self) -> ConfigurationClassId {
        self.class_id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn set_value_type(&mut self, value_type_in: ValueType) {
        self.value_type = value_type_in;
    }

    pub fn get_calculation_type(&self) -> Option<CalculationType> {
        self.calculation_type
    }

    pub fn set_calculation_type(&mut self, calculation_type_in: Option<CalculationType>) {
        self.calculation_type = calculation_type_in;
    }

    pub fn get_input_scalar(&self) -> f64 {
        self.input_scalar
    }

    pub fn set_input_scalar(&mut self, scalar_in: f64) {
        self.input_scalar = scalar_in;
    }

    pub fn get_input_offset(&self) -> f64 {
        self.input_offset
    }

    pub fn set_input_offset(&mut self, offset_in: f64) {
        self.input_offset = offset_in;
    }

    pub fn is_hidden(&self) -> bool {
        self.is_hidden
    }

    pub fn set_hidden(&mut self, hidden_in: bool) {
        self.is_hidden = hidden_in;
    }

    pub fn get_input_configuration_attributes(&self) -> &[AttributeInput] {
        &self.inputs
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// The slot an input occupies, which for Division and SampleTriangle is its operand position.
    pub fn input_slot(&self, attribute: ConfigurationAttributeId) -> Option<usize> {
        self.inputs.iter().position(|i| i.attribute == attribute)
    }

    /// True when the engine computes this attribute (rather than the user entering it): it has a
    /// calculation type other than Qualitative, and something is connected to it.
    pub fn is_calculated(&self) -> bool {
        self.has_inputs() && self.calculation_type.map_or(false, |c| c.is_computed())
    }

    // Only RiskModel calls these, after validating the connection.
    // An input that is already there keeps its slot; only its internal flag changes.
    pub(crate) fn push_input(&mut self, input: AttributeInput) {
        match self.inputs.iter_mut().find(|i| i.attribute == input.attribute) {
            Some(existing) => existing.is_internal = input.is_internal,
            None => self.inputs.push(input),
        }
    }

    pub(crate) fn remove_input(&mut self, attribute: ConfigurationAttributeId) -> bool {
        let before = self.inputs.len();
        self.inputs.retain(|i| i.attribute != attribute);
        before != self.inputs.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Util;

    #[test]
    fn new_attribute_defaults() {
        Util::initialize_tracing();
        let a = ConfigurationAttribute::new(ConfigurationAttributeId::new(1), ConfigurationClassId::new(1), "cost");
        assert_eq!(a.get_name(), "cost");
        assert_eq!(a.get_value_type(), ValueType::Number);
        assert_eq!(a.get_calculation_type(), None);
        assert_eq!(a.get_input_scalar(), 1.0);
        assert_eq!(a.get_input_offset(), 0.0);
        assert!(!a.is_hidden());
        assert!(!a.is_calculated());
    }

    #[test]
    fn inputs_keep_their_slots() {
        Util::initialize_tracing();
        let mut a = ConfigurationAttribute::new(ConfigurationAttributeId::new(1), ConfigurationClassId::new(1), "ratio");
        a.set_calculation_type(Some(CalculationType::Division));
        let first = ConfigurationAttributeId::new(2);
        let second = ConfigurationAttributeId::new(3);
        a.push_input(AttributeInput { attribute: first, is_internal: true });
        a.push_input(AttributeInput { attribute: second, is_internal: false });
        assert_eq!(a.input_slot(first), Some(0));
        assert_eq!(a.input_slot(second), Some(1));
        assert!(a.is_calculated());

        // re-adding updates the entry where it is:
        a.push_input(AttributeInput { attribute: first, is_internal: false });
        assert_eq!(a.get_input_configuration_attributes().len(), 2);
        assert_eq!(a.input_slot(first), Some(0));
        assert!(!a.get_input_configuration_attributes()[0].is_internal);
        assert_eq!(a.input_slot(second), Some(1));

        assert!(a.remove_input(second));
        assert!(!a.remove_input(second));
        assert_eq!(a.input_slot(first), Some(0));
    }

    #[test]
    fn qualitative_is_never_calculated() {
        Util::initialize_tracing();
        let mut a = ConfigurationAttribute::new(ConfigurationAttributeId::new(1), ConfigurationClassId::new(1), "notes");
        a.set_calculation_type(Some(CalculationType::Qualitative));
        a.push_input(AttributeInput { attribute: ConfigurationAttributeId::new(2), is_internal: true });
        assert!(a.has_inputs());
        assert!(!a.is_calculated());
    }
}
