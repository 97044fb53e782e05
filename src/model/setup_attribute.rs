/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use crate::model::ids::{ConfigurationAttributeId, SetupAttributeId, SetupClassId};
use crate::model::value::Value;

/// The instance-level mirror of one configuration attribute. A value of None means "needs
/// (re)calculation" (or, for a manual attribute, "not entered yet").
///
/// The override, when present, is what everyone reads: display, downstream attributes, scripts.
/// It never touches the underlying value, so resetting it shows that value again as it was.
#[derive(Debug, Clone)]
pub struct SetupAttribute {
    id: SetupAttributeId,
    setup_class_id: SetupClassId,
    configuration_attribute_id: ConfigurationAttributeId,
    value: Option<Value>,
    override_value: Option<Value>,
}

impl SetupAttribute {
    pub fn new(
        id: SetupAttributeId,
        setup_class_id: SetupClassId,
        configuration_attribute_id: ConfigurationAttributeId,
    ) -> SetupAttribute {
        SetupAttribute {
            id,
            setup_class_id,
            configuration_attribute_id,
            value: None,
            override_value: None,
        }
    }

    pub fn get_id(&self) -> SetupAttributeId {
        self.id
    }

    pub fn get_setup_class_id(&self) -> SetupClassId {
        self.setup_class_id
    }

    pub fn get_configuration_attribute_id(&self) -> ConfigurationAttributeId {
        self.configuration_attribute_id
    }

    pub fn get_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Manual entry, or the engine storing what it computed.
    pub fn set_value(&mut self, value_in: Value) {
        self.value = Some(value_in);
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    pub fn get_override_value(&self) -> Option<&Value> {
        self.override_value.as_ref()
    }

    pub fn set_override_value(&mut self, value_in: Value) {
        self.override_value = Some(value_in);
    }

    pub fn reset_override_value(&mut self) {
        self.override_value = None;
    }

    pub fn has_override(&self) -> bool {
        self.override_value.is_some()
    }

    /// The override if there is one, else the value.
    pub fn get_current_value(&self) -> Option<&Value> {
        self.override_value.as_ref().or(self.value.as_ref())
    }
}
