/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::model::ids::{ConfigurationClassId, SetupAttributeId, SetupClassId};

/// One instance of a configuration class: its attributes (one per configuration attribute of the
/// class, in the same order), and the other instances it takes external input from, each with
/// the scalar tuple that multiplies what flows in from there.
#[derive(Debug, Clone)]
pub struct SetupClass {
    id: SetupClassId,
    class_id: ConfigurationClassId,
    instance_name: String,
    attributes: Vec<SetupAttributeId>,
    input_setup_classes: Vec<(SetupClassId, Vec<f64>)>,
}

impl SetupClass {
    pub fn new(id: SetupClassId, class_id: ConfigurationClassId, instance_name_in: &str) -> SetupClass {
        SetupClass {
            id,
            class_id,
            instance_name: instance_name_in.to_string(),
            attributes: Vec::new(),
            input_setup_classes: Vec::new(),
        }
    }

    pub fn get_id(&self) -> SetupClassId {
        self.id
    }

    pub fn get_class_id(&self) -> ConfigurationClassId {
        self.class_id
    }

    pub fn get_instance_name(&self) -> &str {
        &self.instance_name
    }

    pub fn get_setup_attributes(&self) -> &[SetupAttributeId] {
        &self.attributes
    }

    pub fn get_input_setup_classes(&self) -> &[(SetupClassId, Vec<f64>)] {
        &self.input_setup_classes
    }

    pub fn get_input_scalars(&self, other: SetupClassId) -> Option<&[f64]> {
        self.input_setup_classes
            .iter()
            .find(|(id, _)| *id == other)
            .map(|(_, scalars)| scalars.as_slice())
    }

    pub(crate) fn push_attribute(&mut self, attribute: SetupAttributeId) {
        self.attributes.push(attribute);
    }

    pub(crate) fn remove_attribute_at(&mut self, position: usize) -> Option<SetupAttributeId> {
        if position < self.attributes.len() {
            Some(self.attributes.remove(position))
        } else {
            None
        }
    }

    /// Replaces the scalars if the instance is already an input.
    pub(crate) fn set_input_setup_class(&mut self, other: SetupClassId, scalars: Vec<f64>) {
        match self.input_setup_classes.iter_mut().find(|(id, _)| *id == other) {
            Some(entry) => entry.1 = scalars,
            None => self.input_setup_classes.push((other, scalars)),
        }
    }

    pub(crate) fn remove_input_setup_class(&mut self, other: SetupClassId) -> bool {
        let before = self.input_setup_classes.len();
        self.input_setup_classes.retain(|(id, _)| *id != other);
        before != self.input_setup_classes.len()
    }
}
