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
use crate::model::ids::{SetupAttributeId, SetupClassId};
use crate::model::risk_model::RiskModel;
use crate::model::settings::Settings;
use crate::model::value::Value;
use crate::model::value_type::ValueType;
use anyhow::{Error, Result};
use std::collections::HashSet;
use tracing::*;

/// One setup attribute feeding another, as found by RiskModel::connected_setup_attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedSetupAttribute {
    pub setup_attribute: SetupAttributeId,
    /// Position of the declaring input in the consumer's input list; the operand position for
    /// Division and SampleTriangle.
    pub slot: usize,
    /// The value type of the input's own configuration attribute.
    pub value_type: ValueType,
    /// What the link from the consumer's instance to this one multiplies by. None when internal.
    pub scalars: Option<Vec<f64>>,
}

/// The attribute-level settings combine_values needs, gathered from a ConfigurationAttribute.
#[derive(Debug, Clone, Copy)]
pub struct CombineRule {
    pub calculation_type: CalculationType,
    pub value_type: ValueType,
    /// How many inputs the configuration attribute declares.
    pub slot_count: usize,
    pub scalar: f64,
    pub offset: f64,
}

impl RiskModel {
    /// Computes the attribute if it isn't already (and, first, everything it depends on), stores
    /// the result and returns it. Values already present are returned as they are, so between
    /// resets this computes each attribute at most once.
    ///
    /// Manual attributes are never written: their entered value comes back, or Insufficient if
    /// nothing was entered. Overrides are not returned here (see SetupAttribute::get_current_value),
    /// but they are what consumers see.
    pub fn calculate_value(&mut self, id: SetupAttributeId, settings: &Settings) -> Result<Value, Error> {
        let mut in_progress: HashSet<SetupAttributeId> = HashSet::new();
        self.calculate_value_visiting(id, settings, &mut in_progress)
    }

    fn calculate_value_visiting(
        &mut self,
        id: SetupAttributeId,
        settings: &Settings,
        in_progress: &mut HashSet<SetupAttributeId>,
    ) -> Result<Value, Error> {
        let setup_attribute = self.setup_attribute(id)?;
        if let Some(value) = setup_attribute.get_value() {
            return Ok(value.clone());
        }
        let attribute = self.configuration_attribute(setup_attribute.get_configuration_attribute_id())?;
        let calculation_type = match attribute.get_calculation_type() {
            Some(calculation_type) if attribute.is_calculated() => calculation_type,
            _ => return Ok(Value::Insufficient),
        };
        let rule = CombineRule {
            calculation_type,
            value_type: attribute.get_value_type(),
            slot_count: attribute.get_input_configuration_attributes().len(),
            scalar: attribute.get_input_scalar(),
            offset: attribute.get_input_offset(),
        };
        if !in_progress.insert(id) {
            warn!("Attribute {} (\"{}\") depends on itself.", id, attribute.get_name());
            return Ok(Value::Cycle);
        }

        let connections = self.connected_setup_attributes(id)?;
        let mut inputs: Vec<(ConnectedSetupAttribute, Value)> = Vec::with_capacity(connections.len());
        for connection in connections {
            let computed = self.calculate_value_visiting(connection.setup_attribute, settings, in_progress)?;
            let effective = match self.setup_attribute(connection.setup_attribute)?.get_override_value() {
                Some(override_value) => override_value.clone(),
                None => computed,
            };
            inputs.push((connection, effective));
        }
        in_progress.remove(&id);

        let value = combine_values(&rule, &inputs, settings.num_samples);
        debug!("Calculated {}: {}", id, value);
        self.setup_attribute_mut(id)?.set_value(value.clone());
        Ok(value)
    }

    /// Everything that feeds the attribute: for each declared input of its configuration
    /// attribute, the mirroring setup attribute in the owning instance (internal inputs) or in
    /// each linked input instance (external ones). Ordered by slot, then by link order.
    pub fn connected_setup_attributes(&self, id: SetupAttributeId) -> Result<Vec<ConnectedSetupAttribute>, Error> {
        let setup_attribute = self.setup_attribute(id)?;
        let owner = setup_attribute.get_setup_class_id();
        let attribute = self.configuration_attribute(setup_attribute.get_configuration_attribute_id())?;

        let mut candidates: Vec<(SetupClassId, Option<Vec<f64>>)> = vec![(owner, None)];
        for (other, scalars) in self.setup_class(owner)?.get_input_setup_classes() {
            candidates.push((*other, Some(scalars.clone())));
        }

        let mut connected = Vec::new();
        for (slot, input) in attribute.get_input_configuration_attributes().iter().enumerate() {
            let value_type = self.configuration_attribute(input.attribute)?.get_value_type();
            for (candidate, scalars) in &candidates {
                if input.is_internal != (*candidate == owner) {
                    continue;
                }
                if let Some(found) = self.find_setup_attribute(*candidate, input.attribute)? {
                    connected.push(ConnectedSetupAttribute {
                        setup_attribute: found,
                        slot,
                        value_type,
                        scalars: scalars.clone(),
                    });
                }
            }
        }
        Ok(connected)
    }

    /// Calculates every attribute of the instance. Always completes: failures end up as sentinel
    /// values, not errors (errors here mean a handle was not found).
    pub fn calculate_values(&mut self, setup_class_id: SetupClassId, settings: &Settings) -> Result<(), Error> {
        let attributes: Vec<SetupAttributeId> = self.setup_class(setup_class_id)?.get_setup_attributes().to_vec();
        for attribute in attributes {
            self.calculate_value(attribute, settings)?;
        }
        Ok(())
    }

    /// Marks the instance's calculated attributes for recalculation. Manual attributes, and any
    /// attribute with an override, keep their value.
    pub fn reset_calculated_values(&mut self, setup_class_id: SetupClassId) -> Result<(), Error> {
        let attributes: Vec<SetupAttributeId> = self.setup_class(setup_class_id)?.get_setup_attributes().to_vec();
        for id in attributes {
            let setup_attribute = self.setup_attribute(id)?;
            let calculated = self
                .configuration_attribute(setup_attribute.get_configuration_attribute_id())?
                .is_calculated();
            if calculated && !setup_attribute.has_override() {
                self.setup_attribute_mut(id)?.clear_value();
            }
        }
        Ok(())
    }

    /// Resets, then calculates, every instance in the model.
    pub fn calculate_all_values(&mut self, settings: &Settings) -> Result<(), Error> {
        let instances: Vec<SetupClassId> = self.setup_classes().map(|s| s.get_id()).collect();
        for instance in &instances {
            self.reset_calculated_values(*instance)?;
        }
        for instance in &instances {
            self.calculate_values(*instance, settings)?;
        }
        info!("Calculated {} instance(s).", instances.len());
        Ok(())
    }
}

/// Combines the effective values of whatever is connected into one value, per the rule. Pure
/// apart from the randomness of SampleTriangle.
pub fn combine_values(rule: &CombineRule, inputs: &[(ConnectedSetupAttribute, Value)], num_samples: u32) -> Value {
    let mut ordered: Vec<&(ConnectedSetupAttribute, Value)> = inputs.iter().collect();
    if let Some(arity) = rule.calculation_type.fixed_arity() {
        let each_slot_filled_once = (0..arity).all(|slot| ordered.iter().filter(|(c, _)| c.slot == slot).count() == 1);
        if rule.slot_count != arity || ordered.len() != arity || !each_slot_filled_once {
            return Value::Insufficient;
        }
        ordered.sort_by_key(|(c, _)| c.slot);
    }
    let input_types: Vec<ValueType> = ordered.iter().map(|(c, _)| c.value_type).collect();
    if rule
        .value_type
        .awaits_triangle_input(Some(rule.calculation_type), &input_types)
    {
        return Value::Insufficient;
    }

    let mut values: Vec<Value> = Vec::with_capacity(ordered.len());
    for (connection, value) in ordered {
        if value.is_sentinel() {
            return value.clone();
        }
        if !connection.value_type.is_correct_input_value(value) {
            debug!("Input {} is not a valid {} value: {}", connection.setup_attribute, connection.value_type, value);
            return Value::SetupError;
        }
        values.push(match &connection.scalars {
            Some(scalars) => connection.value_type.apply_scalars(value.clone(), scalars),
            None => value.clone(),
        });
    }

    let result = if values.is_empty() {
        rule.value_type.default_value()
    } else {
        rule.calculation_type.calculate_output_value(&values, num_samples)
    };
    if result.is_sentinel() {
        return result;
    }
    let adjusted = rule
        .value_type
        .adjust_to_range(result.map_components(|_, x| x * rule.scalar + rule.offset));
    if rule.value_type.is_correct_input_value(&adjusted) {
        adjusted
    } else {
        debug!("Result {} does not fit a {} attribute.", adjusted, rule.value_type);
        Value::SetupError
    }
}
