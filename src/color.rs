/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use console::{style, Style};

/// Terminal colors, for messages and for the colors users mark instances with. The console crate
/// leaves the text plain when the output is not a color terminal.
pub struct Color {}

impl Color {
    /// The names accepted for instance marks.
    pub const NAMES: [&'static str; 8] = ["black", "red", "green", "yellow", "blue", "magenta", "cyan", "white"];

    pub fn is_known(name_in: &str) -> bool {
        Color::NAMES.contains(&name_in.to_lowercase().as_str())
    }

    /// Unknown names leave the text plain.
    pub fn paint(name_in: &str, s: &str) -> String {
        if Color::is_known(name_in) {
            Style::from_dotted_str(&name_in.to_lowercase()).apply_to(s).to_string()
        } else {
            s.to_string()
        }
    }

    pub fn red(s: &str) -> String {
        style(s).red().to_string()
    }

    pub fn cyan(s: &str) -> String {
        style(s).cyan().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Util;

    #[test]
    fn paint_keeps_the_text() {
        Util::initialize_tracing();
        assert!(Color::is_known("Red"));
        assert!(!Color::is_known("mauve"));
        assert_eq!(console::strip_ansi_codes(&Color::paint("red", "breached")), "breached");
        assert_eq!(Color::paint("mauve", "breached"), "breached");
        assert_eq!(console::strip_ansi_codes(&Color::cyan("careful")), "careful");
    }
}
