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
use crate::model::configuration_attribute::{AttributeInput, ConfigurationAttribute};
use crate::model::configuration_class::ConfigurationClass;
use crate::model::ids::{ConfigurationAttributeId, ConfigurationClassId, SetupAttributeId, SetupClassId};
use crate::model::setup_attribute::SetupAttribute;
use crate::model::setup_class::SetupClass;
use crate::model::value_type::ValueType;
use crate::util::Util;
use anyhow::{anyhow, Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::*;

/// Holds every class, attribute and instance of one model, keyed by id. Everything refers to
/// everything else by id, so removing something is a map deletion plus a sweep of the places that
/// could still mention it; nothing can be left pointing at freed memory, even with cyclic wiring.
///
/// All structural edits go through here so the invariants hold after each call:
/// - every instance has exactly one setup attribute per attribute of its class, in class order;
/// - an attribute's inputs only name attributes that exist;
/// - an instance only takes input from instances of classes its own class declares as external
///   input sources.
#[derive(Debug, Default)]
pub struct RiskModel {
    last_id: i64,
    configuration_classes: BTreeMap<ConfigurationClassId, ConfigurationClass>,
    configuration_attributes: BTreeMap<ConfigurationAttributeId, ConfigurationAttribute>,
    setup_classes: BTreeMap<SetupClassId, SetupClass>,
    setup_attributes: BTreeMap<SetupAttributeId, SetupAttribute>,
}

impl RiskModel {
    pub fn new() -> RiskModel {
        RiskModel::default()
    }

    // Ids are unique across all four kinds, which makes log output less ambiguous.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    // ----- configuration classes -----

    pub fn is_duplicate_class_name(&self, name_in: &str, self_id_to_ignore: Option<ConfigurationClassId>) -> bool {
        self.configuration_classes
            .values()
            .any(|c| c.get_name() == name_in && Some(c.get_id()) != self_id_to_ignore)
    }

    pub fn create_configuration_class(&mut self, name_in: &str) -> Result<ConfigurationClassId, Error> {
        if name_in.trim().is_empty() {
            return Err(anyhow!("A class name can't be blank."));
        }
        if self.is_duplicate_class_name(name_in, None) {
            return Err(anyhow!("There is already a class named \"{}\".", name_in));
        }
        let id = ConfigurationClassId::new(self.next_id());
        self.configuration_classes.insert(id, ConfigurationClass::new(id, name_in));
        debug!("Created class {} \"{}\"", id, name_in);
        Ok(id)
    }

    /// Removes the class, its attributes (with the same sweeps as remove_attribute), and its instances.
    pub fn remove_configuration_class(&mut self, class_id: ConfigurationClassId) -> Result<(), Error> {
        let class = self.configuration_class(class_id)?;
        let instances: Vec<SetupClassId> = class.get_setup_classes().to_vec();
        let attributes: Vec<ConfigurationAttributeId> = class.get_configuration_attributes().to_vec();
        for instance in instances {
            self.remove_setup_class(instance)?;
        }
        for attribute in attributes {
            self.remove_attribute(attribute)?;
        }
        self.configuration_classes.remove(&class_id);
        debug!("Removed class {}", class_id);
        Ok(())
    }

    pub fn configuration_class(&self, id: ConfigurationClassId) -> Result<&ConfigurationClass, Error> {
        self.configuration_classes
            .get(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn configuration_class_mut(&mut self, id: ConfigurationClassId) -> Result<&mut ConfigurationClass, Error> {
        self.configuration_classes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    /// In creation order.
    pub fn configuration_classes(&self) -> impl Iterator<Item = &ConfigurationClass> {
        self.configuration_classes.values()
    }

    pub fn find_configuration_class(&self, name_in: &str) -> Option<ConfigurationClassId> {
        self.configuration_classes
            .values()
            .find(|c| c.get_name() == name_in)
            .map(|c| c.get_id())
    }

    // ----- configuration attributes -----

    /// Adds a (manually entered, Number) attribute to the class, and a matching setup attribute to
    /// every existing instance of it.
    pub fn create_attribute(&mut self, class_id: ConfigurationClassId, name_in: &str) -> Result<ConfigurationAttributeId, Error> {
        if name_in.trim().is_empty() {
            return Err(anyhow!("An attribute name can't be blank."));
        }
        if self.find_configuration_attribute(class_id, name_in)?.is_some() {
            return Err(anyhow!("The class already has an attribute named \"{}\".", name_in));
        }
        let id = ConfigurationAttributeId::new(self.next_id());
        self.configuration_attributes
            .insert(id, ConfigurationAttribute::new(id, class_id, name_in));
        let class = self.configuration_class_mut(class_id)?;
        class.push_attribute(id);
        let instances: Vec<SetupClassId> = class.get_setup_classes().to_vec();
        for instance in instances {
            self.create_setup_attribute(instance, id)?;
        }
        debug!("Created attribute {} \"{}\" in class {}", id, name_in, class_id);
        Ok(id)
    }

    /// Removes the attribute, every setup attribute mirroring it, and every mention of it in
    /// other attributes' inputs.
    pub fn remove_attribute(&mut self, attribute_id: ConfigurationAttributeId) -> Result<(), Error> {
        let class_id = self.configuration_attribute(attribute_id)?.get_class_id();
        let class = self.configuration_class_mut(class_id)?;
        let position = class
            .remove_attribute(attribute_id)
            .ok_or_else(|| anyhow!("Attribute {} is not listed in its class {}.", attribute_id, class_id))?;
        let instances: Vec<SetupClassId> = class.get_setup_classes().to_vec();
        for instance in instances {
            if let Some(setup_attribute) = self.setup_class_mut(instance)?.remove_attribute_at(position) {
                self.setup_attributes.remove(&setup_attribute);
            }
        }
        self.configuration_attributes.remove(&attribute_id);

        let mut affected_classes: BTreeSet<ConfigurationClassId> = BTreeSet::new();
        affected_classes.insert(class_id);
        for attribute in self.configuration_attributes.values_mut() {
            if attribute.remove_input(attribute_id) {
                affected_classes.insert(attribute.get_class_id());
            }
        }
        for affected in affected_classes {
            self.prune_input_setup_classes(affected)?;
        }
        debug!("Removed attribute {}", attribute_id);
        Ok(())
    }

    pub fn configuration_attribute(&self, id: ConfigurationAttributeId) -> Result<&ConfigurationAttribute, Error> {
        self.configuration_attributes
            .get(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn configuration_attribute_mut(&mut self, id: ConfigurationAttributeId) -> Result<&mut ConfigurationAttribute, Error> {
        self.configuration_attributes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn find_configuration_attribute(
        &self,
        class_id: ConfigurationClassId,
        name_in: &str,
    ) -> Result<Option<ConfigurationAttributeId>, Error> {
        for id in self.configuration_class(class_id)?.get_configuration_attributes() {
            if self.configuration_attribute(*id)?.get_name() == name_in {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }

    /// Wires input into target. Returns Ok(false), with a diagnostic, when the connection doesn't
    /// make sense (see ValueType::correctly_connected); the connection is then not stored.
    /// Adding an input that is already there keeps its slot (its operand position) and only
    /// changes whether it is internal.
    pub fn add_input_configuration_attribute(
        &mut self,
        target_id: ConfigurationAttributeId,
        input_id: ConfigurationAttributeId,
        is_internal: bool,
    ) -> Result<bool, Error> {
        let target = self.configuration_attribute(target_id)?;
        let input = self.configuration_attribute(input_id)?;
        if is_internal && target_id == input_id {
            warn!("Connection refused: attribute {} can't be its own internal input.", target_id);
            return Ok(false);
        }
        if is_internal && target.get_class_id() != input.get_class_id() {
            warn!(
                "Connection refused: internal input {} is not in the same class as {}.",
                input_id, target_id
            );
            return Ok(false);
        }
        let mut input_types = self.input_value_types(target_id, None)?;
        if target.input_slot(input_id).is_none() {
            input_types.push(input.get_value_type());
        }
        if !target
            .get_value_type()
            .correctly_connected(target.get_calculation_type(), &input_types)
        {
            return Ok(false);
        }
        let class_id = target.get_class_id();
        self.configuration_attribute_mut(target_id)?.push_input(AttributeInput {
            attribute: input_id,
            is_internal,
        });
        // replacing an external input with an internal one can leave instance links unjustified.
        self.prune_input_setup_classes(class_id)?;
        debug!(
            "Connected {} into {} ({})",
            input_id,
            target_id,
            if is_internal { "internal" } else { "external" }
        );
        Ok(true)
    }

    /// Ok(false), with a diagnostic, when input is not an input of target, or is the last
    /// triangle input of a triangle product that has other inputs.
    pub fn remove_input_configuration_attribute(
        &mut self,
        target_id: ConfigurationAttributeId,
        input_id: ConfigurationAttributeId,
    ) -> Result<bool, Error> {
        let target = self.configuration_attribute(target_id)?;
        if target.input_slot(input_id).is_none() {
            warn!("Attribute {} is not an input of {}.", input_id, target_id);
            return Ok(false);
        }
        let mut remaining = Vec::new();
        for input in target.get_input_configuration_attributes() {
            if input.attribute != input_id {
                remaining.push(self.configuration_attribute(input.attribute)?.get_value_type());
            }
        }
        if target
            .get_value_type()
            .awaits_triangle_input(target.get_calculation_type(), &remaining)
        {
            warn!(
                "Attribute {} is the last triangle input of {}; connect another triangle first, or remove the other inputs.",
                input_id, target_id
            );
            return Ok(false);
        }
        let class_id = target.get_class_id();
        self.configuration_attribute_mut(target_id)?.remove_input(input_id);
        self.prune_input_setup_classes(class_id)?;
        debug!("Disconnected {} from {}", input_id, target_id);
        Ok(true)
    }

    /// Changes the value type, unless the attribute's inputs, or an attribute it feeds, would no
    /// longer fit (then Ok(false), with a diagnostic).
    pub fn set_value_type(&mut self, id: ConfigurationAttributeId, value_type: ValueType) -> Result<bool, Error> {
        let attribute = self.configuration_attribute(id)?;
        let own_inputs = self.input_value_types(id, None)?;
        if !value_type.correctly_connected(attribute.get_calculation_type(), &own_inputs) {
            return Ok(false);
        }
        for consumer in self.configuration_attributes.values() {
            if consumer.input_slot(id).is_none() {
                continue;
            }
            let inputs = self.input_value_types(consumer.get_id(), Some((id, value_type)))?;
            let consumer_type = consumer.get_value_type();
            if !consumer_type.correctly_connected(consumer.get_calculation_type(), &inputs) {
                return Ok(false);
            }
            let before = self.input_value_types(consumer.get_id(), None)?;
            if consumer_type.awaits_triangle_input(consumer.get_calculation_type(), &inputs)
                && !consumer_type.awaits_triangle_input(consumer.get_calculation_type(), &before)
            {
                warn!("Attribute {} is the last triangle input of {}.", id, consumer.get_id());
                return Ok(false);
            }
        }
        self.configuration_attribute_mut(id)?.set_value_type(value_type);
        Ok(true)
    }

    /// Changes (or, with None, clears) the calculation type, unless the current inputs don't fit
    /// the new one (then Ok(false), with a diagnostic).
    pub fn set_calculation_type(
        &mut self,
        id: ConfigurationAttributeId,
        calculation_type: Option<CalculationType>,
    ) -> Result<bool, Error> {
        let value_type = self.configuration_attribute(id)?.get_value_type();
        let inputs = self.input_value_types(id, None)?;
        if !value_type.correctly_connected(calculation_type, &inputs) {
            return Ok(false);
        }
        self.configuration_attribute_mut(id)?
            .set_calculation_type(calculation_type);
        Ok(true)
    }

    // The value types of the attribute's inputs, in slot order, optionally as if one of them had
    // another type.
    fn input_value_types(
        &self,
        id: ConfigurationAttributeId,
        replacing: Option<(ConfigurationAttributeId, ValueType)>,
    ) -> Result<Vec<ValueType>, Error> {
        let mut types = Vec::new();
        for input in self.configuration_attribute(id)?.get_input_configuration_attributes() {
            match replacing {
                Some((replaced, value_type)) if replaced == input.attribute => types.push(value_type),
                _ => types.push(self.configuration_attribute(input.attribute)?.get_value_type()),
            }
        }
        Ok(types)
    }

    /// The classes whose instances this class's attributes read from externally.
    pub fn external_source_classes(&self, class_id: ConfigurationClassId) -> Result<BTreeSet<ConfigurationClassId>, Error> {
        let mut sources = BTreeSet::new();
        for attribute_id in self.configuration_class(class_id)?.get_configuration_attributes() {
            for input in self.configuration_attribute(*attribute_id)?.get_input_configuration_attributes() {
                if !input.is_internal {
                    sources.insert(self.configuration_attribute(input.attribute)?.get_class_id());
                }
            }
        }
        Ok(sources)
    }

    /// Drops instance links that no external input of the class justifies any more.
    fn prune_input_setup_classes(&mut self, class_id: ConfigurationClassId) -> Result<(), Error> {
        let sources = self.external_source_classes(class_id)?;
        let instances: Vec<SetupClassId> = self.configuration_class(class_id)?.get_setup_classes().to_vec();
        for instance in instances {
            let unjustified: Vec<SetupClassId> = self
                .setup_class(instance)?
                .get_input_setup_classes()
                .iter()
                .map(|(other, _)| *other)
                .filter(|other| {
                    self.setup_classes
                        .get(other)
                        .map_or(true, |o| !sources.contains(&o.get_class_id()))
                })
                .collect();
            for other in unjustified {
                debug!("Unlinking {} from {}: no external input uses its class now.", other, instance);
                self.setup_class_mut(instance)?.remove_input_setup_class(other);
            }
        }
        Ok(())
    }

    // ----- setup classes (instances) -----

    pub fn is_duplicate_instance_name(&self, name_in: &str, self_id_to_ignore: Option<SetupClassId>) -> bool {
        self.setup_classes
            .values()
            .any(|s| s.get_instance_name() == name_in && Some(s.get_id()) != self_id_to_ignore)
    }

    /// Creates an instance of the class, with one (empty) setup attribute per attribute.
    pub fn create_setup_version(&mut self, class_id: ConfigurationClassId, instance_name_in: &str) -> Result<SetupClassId, Error> {
        if instance_name_in.trim().is_empty() {
            return Err(anyhow!("An instance name can't be blank."));
        }
        if self.is_duplicate_instance_name(instance_name_in, None) {
            return Err(anyhow!("There is already an instance named \"{}\".", instance_name_in));
        }
        let attributes: Vec<ConfigurationAttributeId> =
            self.configuration_class(class_id)?.get_configuration_attributes().to_vec();
        let id = SetupClassId::new(self.next_id());
        self.setup_classes
            .insert(id, SetupClass::new(id, class_id, instance_name_in));
        self.configuration_class_mut(class_id)?.push_setup_class(id);
        for attribute in attributes {
            self.create_setup_attribute(id, attribute)?;
        }
        debug!("Created instance {} \"{}\" of class {}", id, instance_name_in, class_id);
        Ok(id)
    }

    fn create_setup_attribute(
        &mut self,
        setup_class_id: SetupClassId,
        attribute_id: ConfigurationAttributeId,
    ) -> Result<SetupAttributeId, Error> {
        let id = SetupAttributeId::new(self.next_id());
        self.setup_class_mut(setup_class_id)?.push_attribute(id);
        self.setup_attributes
            .insert(id, SetupAttribute::new(id, setup_class_id, attribute_id));
        Ok(id)
    }

    /// Removes the instance, its attributes, and every other instance's link to it.
    pub fn remove_setup_class(&mut self, setup_class_id: SetupClassId) -> Result<(), Error> {
        let setup_class = self
            .setup_classes
            .remove(&setup_class_id)
            .ok_or_else(|| anyhow!("Key {}{}", setup_class_id, Util::DOES_NOT_EXIST))?;
        for attribute in setup_class.get_setup_attributes() {
            self.setup_attributes.remove(attribute);
        }
        for other in self.setup_classes.values_mut() {
            other.remove_input_setup_class(setup_class_id);
        }
        self.configuration_class_mut(setup_class.get_class_id())?
            .remove_setup_class(setup_class_id);
        debug!("Removed instance {}", setup_class_id);
        Ok(())
    }

    pub fn setup_class(&self, id: SetupClassId) -> Result<&SetupClass, Error> {
        self.setup_classes
            .get(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn setup_class_mut(&mut self, id: SetupClassId) -> Result<&mut SetupClass, Error> {
        self.setup_classes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn setup_classes(&self) -> impl Iterator<Item = &SetupClass> {
        self.setup_classes.values()
    }

    pub fn find_setup_class(&self, instance_name_in: &str) -> Option<SetupClassId> {
        self.setup_classes
            .values()
            .find(|s| s.get_instance_name() == instance_name_in)
            .map(|s| s.get_id())
    }

    /// Makes other an external input of target, with scalars multiplying what flows in from it.
    /// Refused (Ok(false), with a diagnostic) for target itself, or for an instance of a class
    /// that no attribute of target's class reads from externally.
    pub fn set_input_setup_class(
        &mut self,
        target_id: SetupClassId,
        other_id: SetupClassId,
        scalars: Vec<f64>,
    ) -> Result<bool, Error> {
        let target_class = self.setup_class(target_id)?.get_class_id();
        let other_class = self.setup_class(other_id)?.get_class_id();
        if target_id == other_id {
            warn!("Link refused: instance {} can't be its own input.", target_id);
            return Ok(false);
        }
        if !self.external_source_classes(target_class)?.contains(&other_class) {
            warn!(
                "Link refused: no attribute of {} takes external input from class {} (of {}).",
                target_id, other_class, other_id
            );
            return Ok(false);
        }
        self.setup_class_mut(target_id)?
            .set_input_setup_class(other_id, scalars);
        debug!("Linked {} into {}", other_id, target_id);
        Ok(true)
    }

    pub fn remove_input_setup_class(&mut self, target_id: SetupClassId, other_id: SetupClassId) -> Result<bool, Error> {
        Ok(self.setup_class_mut(target_id)?.remove_input_setup_class(other_id))
    }

    // ----- setup attributes -----

    pub fn setup_attribute(&self, id: SetupAttributeId) -> Result<&SetupAttribute, Error> {
        self.setup_attributes
            .get(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    pub fn setup_attribute_mut(&mut self, id: SetupAttributeId) -> Result<&mut SetupAttribute, Error> {
        self.setup_attributes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Key {}{}", id, Util::DOES_NOT_EXIST))
    }

    /// The instance's setup attribute that mirrors the given configuration attribute, if the
    /// instance's class has that attribute.
    pub fn find_setup_attribute(
        &self,
        setup_class_id: SetupClassId,
        attribute_id: ConfigurationAttributeId,
    ) -> Result<Option<SetupAttributeId>, Error> {
        for id in self.setup_class(setup_class_id)?.get_setup_attributes() {
            if self.setup_attribute(*id)?.get_configuration_attribute_id() == attribute_id {
                return Ok(Some(*id));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::value::Value;

    #[test]
    fn create_attribute_propagates_to_instances() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let class = model.create_configuration_class("Asset").unwrap();
        let first = model.create_attribute(class, "value").unwrap();
        let instance = model.create_setup_version(class, "server").unwrap();
        assert_eq!(model.setup_class(instance).unwrap().get_setup_attributes().len(), 1);

        let second = model.create_attribute(class, "exposure").unwrap();
        let setup_attributes = model.setup_class(instance).unwrap().get_setup_attributes().to_vec();
        assert_eq!(setup_attributes.len(), 2);
        let mirrored: Vec<ConfigurationAttributeId> = setup_attributes
            .iter()
            .map(|id| model.setup_attribute(*id).unwrap().get_configuration_attribute_id())
            .collect();
        assert_eq!(mirrored, vec![first, second]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let class = model.create_configuration_class("Asset").unwrap();
        assert!(model.create_configuration_class("Asset").is_err());
        model.create_attribute(class, "value").unwrap();
        assert!(model.create_attribute(class, "value").is_err());
        model.create_setup_version(class, "server").unwrap();
        assert!(model.create_setup_version(class, "server").is_err());
        assert!(model.create_configuration_class(" ").is_err());
    }

    #[test]
    fn remove_attribute_sweeps_instances_and_inputs() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let class = model.create_configuration_class("Asset").unwrap();
        let a = model.create_attribute(class, "a").unwrap();
        let b = model.create_attribute(class, "b").unwrap();
        let total = model.create_attribute(class, "total").unwrap();
        model
            .configuration_attribute_mut(total)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        assert!(model.add_input_configuration_attribute(total, a, true).unwrap());
        assert!(model.add_input_configuration_attribute(total, b, true).unwrap());
        let instance = model.create_setup_version(class, "server").unwrap();

        model.remove_attribute(a).unwrap();
        assert!(model.configuration_attribute(a).is_err());
        assert_eq!(model.configuration_class(class).unwrap().get_configuration_attributes(), &[b, total]);
        let inputs = model.configuration_attribute(total).unwrap().get_input_configuration_attributes();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].attribute, b);
        let remaining = model.setup_class(instance).unwrap().get_setup_attributes().to_vec();
        assert_eq!(remaining.len(), 2);
        assert_eq!(model.find_setup_attribute(instance, a).unwrap(), None);
        assert!(model.find_setup_attribute(instance, b).unwrap().is_some());
    }

    #[test]
    fn internal_inputs_must_come_from_the_same_class() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let c1 = model.create_configuration_class("One").unwrap();
        let c2 = model.create_configuration_class("Two").unwrap();
        let x = model.create_attribute(c1, "x").unwrap();
        let y = model.create_attribute(c2, "y").unwrap();
        model
            .configuration_attribute_mut(y)
            .unwrap()
            .set_calculation_type(Some(CalculationType::Mean));
        assert!(!model.add_input_configuration_attribute(y, x, true).unwrap());
        assert!(!model.add_input_configuration_attribute(y, y, true).unwrap());
        assert!(model.add_input_configuration_attribute(y, x, false).unwrap());
    }

    #[test]
    fn incompatible_connections_are_not_stored() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let class = model.create_configuration_class("Asset").unwrap();
        let p = model.create_attribute(class, "p").unwrap();
        model
            .configuration_attribute_mut(p)
            .unwrap()
            .set_value_type(ValueType::Probability);
        let n = model.create_attribute(class, "n").unwrap();
        model
            .configuration_attribute_mut(n)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        assert!(!model.add_input_configuration_attribute(n, p, true).unwrap());
        assert!(!model.configuration_attribute(n).unwrap().has_inputs());
    }

    #[test]
    fn instance_links_need_an_external_input() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let output = model.create_configuration_class("Output").unwrap();
        let input = model.create_configuration_class("Input").unwrap();
        let a = model.create_attribute(output, "a").unwrap();
        let sum = model.create_attribute(input, "sum").unwrap();
        model
            .configuration_attribute_mut(sum)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        let out1 = model.create_setup_version(output, "out1").unwrap();
        let in1 = model.create_setup_version(input, "in1").unwrap();

        // nothing in Input reads from Output yet:
        assert!(!model.set_input_setup_class(in1, out1, vec![1.0]).unwrap());
        assert!(model.add_input_configuration_attribute(sum, a, false).unwrap());
        assert!(model.set_input_setup_class(in1, out1, vec![1.0]).unwrap());
        assert!(!model.set_input_setup_class(in1, in1, vec![1.0]).unwrap());
        assert_eq!(model.setup_class(in1).unwrap().get_input_scalars(out1), Some(&[1.0][..]));

        // and once nothing does again, the link goes away:
        assert!(model.remove_input_configuration_attribute(sum, a).unwrap());
        assert!(model.setup_class(in1).unwrap().get_input_setup_classes().is_empty());
    }

    #[test]
    fn removing_the_only_external_source_attribute_drops_the_link() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let output = model.create_configuration_class("Output").unwrap();
        let input = model.create_configuration_class("Input").unwrap();
        let a = model.create_attribute(output, "a").unwrap();
        let b = model.create_attribute(input, "b").unwrap();
        let sum = model.create_attribute(input, "sum").unwrap();
        model
            .configuration_attribute_mut(sum)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        assert!(model.add_input_configuration_attribute(sum, a, false).unwrap());
        assert!(model.add_input_configuration_attribute(sum, b, true).unwrap());
        let out1 = model.create_setup_version(output, "out1").unwrap();
        let in1 = model.create_setup_version(input, "in1").unwrap();
        assert!(model.set_input_setup_class(in1, out1, vec![1.0]).unwrap());

        model.remove_attribute(a).unwrap();
        assert!(model.setup_class(in1).unwrap().get_input_setup_classes().is_empty());
        let inputs = model.configuration_attribute(sum).unwrap().get_input_configuration_attributes();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].attribute, b);
    }

    #[test]
    fn remove_setup_class_unlinks_it_everywhere() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let output = model.create_configuration_class("Output").unwrap();
        let input = model.create_configuration_class("Input").unwrap();
        let a = model.create_attribute(output, "a").unwrap();
        let sum = model.create_attribute(input, "sum").unwrap();
        model
            .configuration_attribute_mut(sum)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        model.add_input_configuration_attribute(sum, a, false).unwrap();
        let out1 = model.create_setup_version(output, "out1").unwrap();
        let in1 = model.create_setup_version(input, "in1").unwrap();
        model.set_input_setup_class(in1, out1, vec![2.0]).unwrap();
        let out1_attribute = model.find_setup_attribute(out1, a).unwrap().unwrap();

        model.remove_setup_class(out1).unwrap();
        assert!(model.setup_class(out1).is_err());
        assert!(model.setup_attribute(out1_attribute).is_err());
        assert!(model.setup_class(in1).unwrap().get_input_setup_classes().is_empty());
        assert!(model.configuration_class(output).unwrap().get_setup_classes().is_empty());
    }

    #[test]
    fn remove_configuration_class_removes_everything_it_owns() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let output = model.create_configuration_class("Output").unwrap();
        let input = model.create_configuration_class("Input").unwrap();
        let a = model.create_attribute(output, "a").unwrap();
        let sum = model.create_attribute(input, "sum").unwrap();
        model
            .configuration_attribute_mut(sum)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        model.add_input_configuration_attribute(sum, a, false).unwrap();
        let out1 = model.create_setup_version(output, "out1").unwrap();
        model.create_setup_version(input, "in1").unwrap();
        let a_value = model.find_setup_attribute(out1, a).unwrap().unwrap();
        model.setup_attribute_mut(a_value).unwrap().set_value(Value::Number(1.0));

        model.remove_configuration_class(output).unwrap();
        assert_eq!(model.find_configuration_class("Output"), None);
        assert_eq!(model.find_setup_class("out1"), None);
        assert!(!model.configuration_attribute(sum).unwrap().has_inputs());
        assert_eq!(model.setup_classes().count(), 1);
    }

    #[test]
    fn type_changes_are_checked_against_connections() {
        Util::initialize_tracing();
        let mut model = RiskModel::new();
        let class = model.create_configuration_class("Race").unwrap();
        let t1 = model.create_attribute(class, "t1").unwrap();
        let t2 = model.create_attribute(class, "t2").unwrap();
        let p = model.create_attribute(class, "p").unwrap();
        assert!(model.set_value_type(t1, ValueType::TriangleDistribution).unwrap());
        assert!(model.set_value_type(t2, ValueType::TriangleDistribution).unwrap());
        assert!(model.set_value_type(p, ValueType::Probability).unwrap());
        assert!(model.set_calculation_type(p, Some(CalculationType::SampleTriangle)).unwrap());
        assert!(model.add_input_configuration_attribute(p, t1, true).unwrap());
        assert!(model.add_input_configuration_attribute(p, t2, true).unwrap());

        // p's inputs must stay triangles, and p must stay a probability:
        assert!(!model.set_value_type(t1, ValueType::Number).unwrap());
        assert!(!model.set_value_type(p, ValueType::Number).unwrap());
        assert!(!model.set_calculation_type(p, Some(CalculationType::Mean)).unwrap());
        assert_eq!(model.configuration_attribute(t1).unwrap().get_value_type(), ValueType::TriangleDistribution);
        assert_eq!(
            model.configuration_attribute(p).unwrap().get_calculation_type(),
            Some(CalculationType::SampleTriangle)
        );
        assert!(model.set_calculation_type(p, Some(CalculationType::Qualitative)).unwrap());
    }
}
