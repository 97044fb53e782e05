/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use std::fmt;

// Represents the unique ID (key) for one class, attribute or instance held in a RiskModel. Having a
// separate type per kind means a method signature says which kind of thing it wants, so a setup
// attribute id can't be passed where a configuration attribute id was meant.
macro_rules! model_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> $name {
                $name(id)
            }

            pub fn get_id(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

model_id!(ConfigurationClassId, "class#");
model_id!(ConfigurationAttributeId, "attribute#");
model_id!(SetupClassId, "instance#");
model_id!(SetupAttributeId, "instance-attribute#");

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Util;

    #[test]
    fn ids_display_with_their_kind() {
        Util::initialize_tracing();
        assert_eq!(ConfigurationClassId::new(3).to_string(), "class#3");
        assert_eq!(SetupAttributeId::new(12).to_string(), "instance-attribute#12");
        assert_eq!(SetupClassId::new(7).get_id(), 7);
    }
}
