/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::color::Color;
use crate::model::ids::{ConfigurationAttributeId, ConfigurationClassId, SetupAttributeId, SetupClassId};
use crate::model::risk_model::RiskModel;
use crate::model::settings::Settings;
use crate::model::value::Value;
use crate::util::Util;
use anyhow::{anyhow, Error, Result};
use std::collections::BTreeMap;
use tracing::*;

/// A user's mark on an instance. Cosmetic only: nothing in the calculation reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub color: String,
}

/// Name-based access to a model, for scripts and the command line: look things up by name,
/// read and write values as text, override them, recalculate, and mark instances.
pub struct Scripting {
    model: RiskModel,
    settings: Settings,
    annotations: BTreeMap<SetupClassId, Annotation>,
}

impl Scripting {
    pub fn new(settings: Settings) -> Scripting {
        Scripting {
            model: RiskModel::new(),
            settings,
            annotations: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    /// For structural edits (classes, attributes, connections).
    pub fn model_mut(&mut self) -> &mut RiskModel {
        &mut self.model
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ----- lookups -----

    pub fn class_id(&self, class_name: &str) -> Result<ConfigurationClassId, Error> {
        self.model
            .find_configuration_class(class_name)
            .ok_or_else(|| anyhow!("There is no class named \"{}\".", class_name))
    }

    pub fn attribute_id(&self, class_name: &str, attribute_name: &str) -> Result<ConfigurationAttributeId, Error> {
        let class_id = self.class_id(class_name)?;
        self.model
            .find_configuration_attribute(class_id, attribute_name)?
            .ok_or_else(|| anyhow!("Class \"{}\" has no attribute named \"{}\".", class_name, attribute_name))
    }

    pub fn instance_id(&self, instance_name: &str) -> Result<SetupClassId, Error> {
        self.model
            .find_setup_class(instance_name)
            .ok_or_else(|| anyhow!("There is no instance named \"{}\".", instance_name))
    }

    pub fn instance_attribute_id(&self, instance_name: &str, attribute_name: &str) -> Result<SetupAttributeId, Error> {
        let instance_id = self.instance_id(instance_name)?;
        let class_id = self.model.setup_class(instance_id)?.get_class_id();
        let attribute_id = self
            .model
            .find_configuration_attribute(class_id, attribute_name)?
            .ok_or_else(|| anyhow!("Instance \"{}\" has no attribute named \"{}\".", instance_name, attribute_name))?;
        self.model
            .find_setup_attribute(instance_id, attribute_id)?
            .ok_or_else(|| anyhow!("Key {}{}", attribute_id, Util::DOES_NOT_EXIST))
    }

    // ----- enumeration -----

    pub fn class_names(&self) -> Vec<String> {
        self.model
            .configuration_classes()
            .map(|c| c.get_name().to_string())
            .collect()
    }

    /// In class order. Hidden attributes are left out unless include_hidden.
    pub fn attribute_names(&self, class_name: &str, include_hidden: bool) -> Result<Vec<String>, Error> {
        let class_id = self.class_id(class_name)?;
        let mut names = Vec::new();
        for id in self.model.configuration_class(class_id)?.get_configuration_attributes() {
            let attribute = self.model.configuration_attribute(*id)?;
            if include_hidden || !attribute.is_hidden() {
                names.push(attribute.get_name().to_string());
            }
        }
        Ok(names)
    }

    pub fn instance_names(&self, class_name: &str) -> Result<Vec<String>, Error> {
        let class_id = self.class_id(class_name)?;
        let mut names = Vec::new();
        for id in self.model.configuration_class(class_id)?.get_setup_classes() {
            names.push(self.model.setup_class(*id)?.get_instance_name().to_string());
        }
        Ok(names)
    }

    // ----- values -----

    /// The stored (entered or calculated) value, ignoring any override.
    pub fn get_value(&self, instance_name: &str, attribute_name: &str) -> Result<Option<Value>, Error> {
        let id = self.instance_attribute_id(instance_name, attribute_name)?;
        Ok(self.model.setup_attribute(id)?.get_value().cloned())
    }

    /// What everyone else sees: the override if there is one, else the stored value.
    pub fn get_current_value(&self, instance_name: &str, attribute_name: &str) -> Result<Option<Value>, Error> {
        let id = self.instance_attribute_id(instance_name, attribute_name)?;
        Ok(self.model.setup_attribute(id)?.get_current_value().cloned())
    }

    /// The current value as displayed, rounded per the settings; blank when there is none yet.
    pub fn display_value(&self, instance_name: &str, attribute_name: &str) -> Result<String, Error> {
        Ok(self
            .get_current_value(instance_name, attribute_name)?
            .map(|v| v.to_display_string(self.settings.decimal_places))
            .unwrap_or_default())
    }

    /// Manual entry, parsed for the attribute's value type ("3", "1 / 2 / 3", text). Refused for
    /// a calculated attribute, whose value the next calculation would replace: use an override.
    pub fn set_value(&mut self, instance_name: &str, attribute_name: &str, text: &str) -> Result<Value, Error> {
        let id = self.instance_attribute_id(instance_name, attribute_name)?;
        let attribute_id = self.model.setup_attribute(id)?.get_configuration_attribute_id();
        let attribute = self.model.configuration_attribute(attribute_id)?;
        if attribute.is_calculated() {
            return Err(anyhow!(
                "\"{}\" is calculated; set an override instead.",
                attribute.get_name()
            ));
        }
        let value = attribute.get_value_type().parse_value(text);
        if value == Value::SetupError {
            warn!("\"{}\" is not a valid {} value; storing {}.", text, attribute.get_value_type(), value);
        }
        self.model.setup_attribute_mut(id)?.set_value(value.clone());
        Ok(value)
    }

    pub fn set_override_value(&mut self, instance_name: &str, attribute_name: &str, text: &str) -> Result<Value, Error> {
        let id = self.instance_attribute_id(instance_name, attribute_name)?;
        let attribute_id = self.model.setup_attribute(id)?.get_configuration_attribute_id();
        let value = self
            .model
            .configuration_attribute(attribute_id)?
            .get_value_type()
            .parse_value(text);
        self.model.setup_attribute_mut(id)?.set_override_value(value.clone());
        debug!("Override {} on {}", value, id);
        Ok(value)
    }

    pub fn reset_override_value(&mut self, instance_name: &str, attribute_name: &str) -> Result<(), Error> {
        let id = self.instance_attribute_id(instance_name, attribute_name)?;
        self.model.setup_attribute_mut(id)?.reset_override_value();
        Ok(())
    }

    /// Recalculates every instance.
    pub fn calculate_values(&mut self) -> Result<(), Error> {
        let settings = self.settings;
        self.model.calculate_all_values(&settings)
    }

    // ----- marks -----

    pub fn mark(&mut self, instance_name: &str, text: &str, color: &str) -> Result<(), Error> {
        let id = self.instance_id(instance_name)?;
        if !Color::is_known(color) {
            return Err(anyhow!("Unknown color \"{}\"; use one of: {}", color, Color::NAMES.join(", ")));
        }
        self.annotations.insert(
            id,
            Annotation {
                text: text.to_string(),
                color: color.to_lowercase(),
            },
        );
        Ok(())
    }

    pub fn clear_mark(&mut self, instance_name: &str) -> Result<bool, Error> {
        let id = self.instance_id(instance_name)?;
        Ok(self.annotations.remove(&id).is_some())
    }

    pub fn annotation(&self, instance_name: &str) -> Result<Option<&Annotation>, Error> {
        let id = self.instance_id(instance_name)?;
        Ok(self.annotations.get(&id))
    }

    /// Removes the instance from the model, along with its mark.
    pub fn remove_instance(&mut self, instance_name: &str) -> Result<(), Error> {
        let id = self.instance_id(instance_name)?;
        self.model.remove_setup_class(id)?;
        self.annotations.remove(&id);
        Ok(())
    }

    /// Removes the class (and so its instances) from the model, along with their marks.
    pub fn remove_class(&mut self, class_name: &str) -> Result<(), Error> {
        let class_id = self.class_id(class_name)?;
        let instances: Vec<SetupClassId> = self.model.configuration_class(class_id)?.get_setup_classes().to_vec();
        self.model.remove_configuration_class(class_id)?;
        for instance in instances {
            self.annotations.remove(&instance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::calculation_type::CalculationType;
    use crate::model::value_type::ValueType;
    use crate::util::Util;

    fn input_output() -> Scripting {
        let mut s = Scripting::new(Settings::default());
        let model = s.model_mut();
        let output = model.create_configuration_class("Output").unwrap();
        let input = model.create_configuration_class("Input").unwrap();
        let a = model.create_attribute(output, "a").unwrap();
        let b = model.create_attribute(output, "b").unwrap();
        let sum = model.create_attribute(input, "sum").unwrap();
        model
            .configuration_attribute_mut(sum)
            .unwrap()
            .set_calculation_type(Some(CalculationType::And));
        model.add_input_configuration_attribute(sum, a, false).unwrap();
        model.add_input_configuration_attribute(sum, b, false).unwrap();
        let out1 = model.create_setup_version(output, "out1").unwrap();
        let in1 = model.create_setup_version(input, "in1").unwrap();
        model.set_input_setup_class(in1, out1, vec![1.0]).unwrap();
        s
    }

    #[test]
    fn set_calculate_and_read_by_name() {
        Util::initialize_tracing();
        let mut s = input_output();
        s.set_value("out1", "a", "3").unwrap();
        s.set_value("out1", "b", "4").unwrap();
        s.calculate_values().unwrap();
        assert_eq!(s.get_current_value("in1", "sum").unwrap(), Some(Value::Number(7.0)));
        assert_eq!(s.display_value("in1", "sum").unwrap(), "7");
        assert!(s.set_value("in1", "sum", "1").is_err());
    }

    #[test]
    fn override_then_reset() {
        Util::initialize_tracing();
        let mut s = input_output();
        s.set_value("out1", "a", "3").unwrap();
        s.set_value("out1", "b", "4").unwrap();
        s.calculate_values().unwrap();
        s.set_override_value("in1", "sum", "100").unwrap();
        assert_eq!(s.get_current_value("in1", "sum").unwrap(), Some(Value::Number(100.0)));
        assert_eq!(s.get_value("in1", "sum").unwrap(), Some(Value::Number(7.0)));
        s.reset_override_value("in1", "sum").unwrap();
        assert_eq!(s.get_current_value("in1", "sum").unwrap(), Some(Value::Number(7.0)));
    }

    #[test]
    fn bad_text_is_stored_as_a_setup_error() {
        Util::initialize_tracing();
        let mut s = input_output();
        assert_eq!(s.set_value("out1", "a", "lots").unwrap(), Value::SetupError);
        s.set_value("out1", "b", "4").unwrap();
        s.calculate_values().unwrap();
        assert_eq!(s.display_value("in1", "sum").unwrap(), Value::SETUP_ERROR);
    }

    #[test]
    fn names_and_hidden_attributes() {
        Util::initialize_tracing();
        let mut s = input_output();
        let b = s.attribute_id("Output", "b").unwrap();
        s.model_mut().configuration_attribute_mut(b).unwrap().set_hidden(true);
        assert_eq!(s.class_names(), vec!["Output", "Input"]);
        assert_eq!(s.attribute_names("Output", false).unwrap(), vec!["a"]);
        assert_eq!(s.attribute_names("Output", true).unwrap(), vec!["a", "b"]);
        assert_eq!(s.instance_names("Input").unwrap(), vec!["in1"]);
        assert!(s.attribute_names("Nope", true).is_err());
        assert!(s.get_value("out1", "nope").is_err());
    }

    #[test]
    fn string_values_are_kept_as_text() {
        Util::initialize_tracing();
        let mut s = input_output();
        let output = s.class_id("Output").unwrap();
        let notes = s.model_mut().create_attribute(output, "notes").unwrap();
        s.model_mut()
            .configuration_attribute_mut(notes)
            .unwrap()
            .set_value_type(ValueType::String);
        s.set_value("out1", "notes", "patched in May").unwrap();
        assert_eq!(s.display_value("out1", "notes").unwrap(), "patched in May");
    }

    #[test]
    fn marks_are_cosmetic_and_go_with_the_instance() {
        Util::initialize_tracing();
        let mut s = input_output();
        s.mark("out1", "reviewed", "Green").unwrap();
        assert_eq!(
            s.annotation("out1").unwrap(),
            Some(&Annotation {
                text: "reviewed".to_string(),
                color: "green".to_string()
            })
        );
        assert!(s.mark("out1", "x", "mauve").is_err());
        assert!(s.clear_mark("out1").unwrap());
        assert!(!s.clear_mark("out1").unwrap());

        s.mark("out1", "again", "red").unwrap();
        s.remove_instance("out1").unwrap();
        assert!(s.annotation("out1").is_err());
        assert!(s.instance_names("Output").unwrap().is_empty());
    }
}
