/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::model::ids::{ConfigurationAttributeId, ConfigurationClassId, SetupClassId};

/// A named collection of configuration attributes (in display order), plus the setup instances
/// made from it. The attributes themselves live in the RiskModel; this holds their ids.
#[derive(Debug, Clone)]
pub struct ConfigurationClass {
    id: ConfigurationClassId,
    name: String,
    attributes: Vec<ConfigurationAttributeId>,
    setup_classes: Vec<SetupClassId>,
}

impl ConfigurationClass {
    pub fn new(id: ConfigurationClassId, name_in: &str) -> ConfigurationClass {
        ConfigurationClass {
            id,
            name: name_in.to_string(),
            attributes: Vec::new(),
            setup_classes: Vec::new(),
        }
    }

    pub fn get_id(&self) -> ConfigurationClassId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_configuration_attributes(&self) -> &[ConfigurationAttributeId] {
        &self.attributes
    }

    pub fn get_setup_classes(&self) -> &[SetupClassId] {
        &self.setup_classes
    }

    pub(crate) fn push_attribute(&mut self, attribute: ConfigurationAttributeId) {
        self.attributes.push(attribute);
    }

    /// Returns the position the attribute had, which is also its position in every instance.
    pub(crate) fn remove_attribute(&mut self, attribute: ConfigurationAttributeId) -> Option<usize> {
        let position = self.attributes.iter().position(|a| *a == attribute)?;
        self.attributes.remove(position);
        Some(position)
    }

    pub(crate) fn push_setup_class(&mut self, setup_class: SetupClassId) {
        self.setup_classes.push(setup_class);
    }

    pub(crate) fn remove_setup_class(&mut self, setup_class: SetupClassId) {
        self.setup_classes.retain(|s| *s != setup_class);
    }
}
