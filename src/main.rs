/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
pub mod color;
pub mod controllers;
pub mod model;
pub mod text_ui;
pub mod util;
use crate::controllers::controller::Controller;
use crate::model::settings::Settings;
use crate::text_ui::TextUI;
use crate::util::Util;
use anyhow::{anyhow, Error, Result};
use std::env;

/// A text-based interface to the calculator: build classes and instances, wire them, enter
/// values and see what they calculate to. A file named on the command line is run as commands
/// first, then input continues from the terminal.
fn main() {
    Util::initialize_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Error> {
    let (settings, rest) = Settings::from_args(args)?;
    let mut ui = TextUI::new(false)?;
    match rest.as_slice() {
        [] => {}
        [script] => {
            let text = std::fs::read_to_string(script).map_err(|e| anyhow!("Unable to read {}: {}", script, e))?;
            ui.queue_input(text.lines().map(String::from));
        }
        _ => return Err(anyhow!(Settings::USAGE)),
    }
    let mut controller = Controller::new(ui, settings);
    controller.start()
}
