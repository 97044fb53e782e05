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
use crate::controllers::command::Command;
use crate::controllers::scripting::Scripting;
use crate::model::ids::SetupClassId;
use crate::model::settings::Settings;
use crate::text_ui::TextUI;
use crate::util::Util;
use anyhow::{anyhow, Error, Result};
use tracing::*;

/// Runs the command loop: read a line, parse it, carry it out on the model, show the result.
/// Errors from one command are shown and the loop goes on; only end of input (or "quit") stops it.
pub struct Controller {
    ui: TextUI,
    scripting: Scripting,
}

impl Controller {
    const PROMPT: &'static str = "riskmodel> ";
    const REFUSED: &'static str = "(see the warning above for why)";

    pub fn new(ui: TextUI, settings: Settings) -> Controller {
        Controller {
            ui,
            scripting: Scripting::new(settings),
        }
    }

    pub fn get_ui(&self) -> &TextUI {
        &self.ui
    }

    pub fn get_scripting(&self) -> &Scripting {
        &self.scripting
    }

    pub fn start(&mut self) -> Result<(), Error> {
        self.ui.display_text(&Util::license());
        self.ui.display_visual_separator();
        let greeting = format!("Type \"help\" for the commands.  To exit: {}.", Util::how_quit());
        self.ui.display_text(&greeting);
        loop {
            let line = match self.ui.read_line(Controller::PROMPT)? {
                Some(line) => line,
                None => break,
            };
            let command = match Command::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    self.ui.display_text(&Color::red(&e.to_string()));
                    continue;
                }
            };
            match self.run(command) {
                Ok(reply) => {
                    if !reply.is_empty() {
                        self.ui.display_text(&reply);
                    }
                }
                Err(e) => {
                    debug!("Command failed: {:?}", e);
                    self.ui.display_text(&Color::red(&e.to_string()));
                }
            }
        }
        Ok(())
    }

    /// Carries out one line and returns what to show for it.
    pub fn execute(&mut self, line: &str) -> Result<String, Error> {
        match Command::parse(line)? {
            Some(command) => self.run(command),
            None => Ok(String::new()),
        }
    }

    fn run(&mut self, command: Command) -> Result<String, Error> {
        match command {
            Command::Class { name } => {
                self.scripting.model_mut().create_configuration_class(&name)?;
                Ok(format!("Created class \"{}\".", name))
            }
            Command::RemoveClass { name } => {
                self.scripting.remove_class(&name)?;
                Ok(format!("Removed class \"{}\", its attributes and its instances.", name))
            }
            Command::Attr { class, name } => {
                let class_id = self.scripting.class_id(&class)?;
                self.scripting.model_mut().create_attribute(class_id, &name)?;
                Ok(format!("Added attribute \"{}\" to \"{}\".", name, class))
            }
            Command::RemoveAttr { class, name } => {
                let id = self.scripting.attribute_id(&class, &name)?;
                self.scripting.model_mut().remove_attribute(id)?;
                Ok(format!("Removed attribute \"{}\" from \"{}\".", name, class))
            }
            Command::Type { class, attr, value_type } => {
                let id = self.scripting.attribute_id(&class, &attr)?;
                if !self.scripting.model_mut().set_value_type(id, value_type)? {
                    return Err(anyhow!("\"{}\" can't become {} with its connections {}", attr, value_type, Controller::REFUSED));
                }
                Ok(format!("\"{}\" is now {}.", attr, value_type))
            }
            Command::Calc { class, attr, calculation_type } => {
                let id = self.scripting.attribute_id(&class, &attr)?;
                if !self.scripting.model_mut().set_calculation_type(id, calculation_type)? {
                    return Err(anyhow!("\"{}\" can't use that calculation with its inputs {}", attr, Controller::REFUSED));
                }
                Ok(match calculation_type {
                    Some(c) => format!("\"{}\" is now calculated by {}.", attr, c),
                    None => format!("\"{}\" is now entered manually.", attr),
                })
            }
            Command::Scalar { class, attr, scalar } => {
                let id = self.scripting.attribute_id(&class, &attr)?;
                self.scripting
                    .model_mut()
                    .configuration_attribute_mut(id)?
                    .set_input_scalar(scalar);
                Ok(format!("\"{}\" scalar is {}.", attr, scalar))
            }
            Command::Offset { class, attr, offset } => {
                let id = self.scripting.attribute_id(&class, &attr)?;
                self.scripting
                    .model_mut()
                    .configuration_attribute_mut(id)?
                    .set_input_offset(offset);
                Ok(format!("\"{}\" offset is {}.", attr, offset))
            }
            Command::Hide { class, attr, hidden } => {
                let id = self.scripting.attribute_id(&class, &attr)?;
                self.scripting.model_mut().configuration_attribute_mut(id)?.set_hidden(hidden);
                Ok(format!("\"{}\" is {}.", attr, if hidden { "hidden" } else { "shown" }))
            }
            Command::Input { class, attr, from_class, from_attr } => {
                let target = self.scripting.attribute_id(&class, &attr)?;
                let (input, is_internal) = match &from_class {
                    None => (self.scripting.attribute_id(&class, &from_attr)?, true),
                    Some(from_class) => (self.scripting.attribute_id(from_class, &from_attr)?, false),
                };
                if !self
                    .scripting
                    .model_mut()
                    .add_input_configuration_attribute(target, input, is_internal)?
                {
                    return Err(anyhow!("Not connected {}", Controller::REFUSED));
                }
                Ok(format!(
                    "\"{}\" now takes {} input from \"{}\".",
                    attr,
                    if is_internal { "internal" } else { "external" },
                    from_attr
                ))
            }
            Command::Uninput { class, attr, from_class, from_attr } => {
                let target = self.scripting.attribute_id(&class, &attr)?;
                let input = self.scripting.attribute_id(&from_class, &from_attr)?;
                if !self
                    .scripting
                    .model_mut()
                    .remove_input_configuration_attribute(target, input)?
                {
                    return Err(anyhow!("Not disconnected {}", Controller::REFUSED));
                }
                Ok(format!("\"{}\" no longer takes input from \"{}\".", attr, from_attr))
            }
            Command::Instance { class, name } => {
                let class_id = self.scripting.class_id(&class)?;
                self.scripting.model_mut().create_setup_version(class_id, &name)?;
                Ok(format!("Created instance \"{}\" of \"{}\".", name, class))
            }
            Command::RemoveInstance { name } => {
                self.scripting.remove_instance(&name)?;
                Ok(format!("Removed instance \"{}\".", name))
            }
            Command::Link { instance, from_instance, scalars } => {
                let target = self.scripting.instance_id(&instance)?;
                let other = self.scripting.instance_id(&from_instance)?;
                if !self
                    .scripting
                    .model_mut()
                    .set_input_setup_class(target, other, scalars)?
                {
                    return Err(anyhow!("Not linked {}", Controller::REFUSED));
                }
                Ok(format!("\"{}\" now takes input from \"{}\".", instance, from_instance))
            }
            Command::Unlink { instance, from_instance } => {
                let target = self.scripting.instance_id(&instance)?;
                let other = self.scripting.instance_id(&from_instance)?;
                if !self.scripting.model_mut().remove_input_setup_class(target, other)? {
                    return Err(anyhow!("\"{}\" was not linked to \"{}\".", from_instance, instance));
                }
                Ok(format!("\"{}\" no longer takes input from \"{}\".", instance, from_instance))
            }
            Command::Set { instance, attr, value } => {
                self.scripting.set_value(&instance, &attr, &value)?;
                self.describe_value(&instance, &attr)
            }
            Command::Override { instance, attr, value } => {
                self.scripting.set_override_value(&instance, &attr, &value)?;
                self.describe_value(&instance, &attr)
            }
            Command::ResetOverride { instance, attr } => {
                self.scripting.reset_override_value(&instance, &attr)?;
                self.describe_value(&instance, &attr)
            }
            Command::CalcAll => {
                self.scripting.calculate_values()?;
                Ok("Calculated.".to_string())
            }
            Command::Get { instance, attr } => self.describe_value(&instance, &attr),
            Command::Show { instance } => match instance {
                Some(name) => {
                    let id = self.scripting.instance_id(&name)?;
                    self.show_instance(id)
                }
                None => {
                    let ids: Vec<SetupClassId> = self.scripting.model().setup_classes().map(|s| s.get_id()).collect();
                    if ids.is_empty() {
                        return Ok("There are no instances yet.".to_string());
                    }
                    let mut shown = Vec::new();
                    for id in ids {
                        shown.push(self.show_instance(id)?);
                    }
                    Ok(shown.join(Util::NEWLN))
                }
            },
            Command::Mark { instance, color, text } => {
                self.scripting.mark(&instance, &text, &color)?;
                Ok(format!("Marked \"{}\": {}", instance, Color::paint(&color, &text)))
            }
            Command::Unmark { instance } => {
                self.scripting.clear_mark(&instance)?;
                Ok(format!("Unmarked \"{}\".", instance))
            }
            Command::Help => Ok(Command::HELP.to_string()),
            Command::Quit => Ok("Bye.".to_string()),
        }
    }

    fn describe_value(&self, instance: &str, attr: &str) -> Result<String, Error> {
        Ok(format!("{}.{} = {}", instance, attr, self.value_text(instance, attr)?))
    }

    // The shown value, marked when it is an override.
    fn value_text(&self, instance: &str, attr: &str) -> Result<String, Error> {
        let id = self.scripting.instance_attribute_id(instance, attr)?;
        let overridden = self.scripting.model().setup_attribute(id)?.has_override();
        Ok(format!(
            "{}{}",
            self.scripting.display_value(instance, attr)?,
            if overridden { " (override)" } else { "" }
        ))
    }

    fn show_instance(&self, id: SetupClassId) -> Result<String, Error> {
        let model = self.scripting.model();
        let instance = model.setup_class(id)?;
        let name = instance.get_instance_name();
        let class_name = model.configuration_class(instance.get_class_id())?.get_name();
        let mut lines = vec![match self.scripting.annotation(name)? {
            Some(mark) => format!("{} ({})  {}", Color::cyan(name), class_name, Color::paint(&mark.color, &mark.text)),
            None => format!("{} ({})", Color::cyan(name), class_name),
        }];
        for attribute_name in self.scripting.attribute_names(class_name, false)? {
            lines.push(format!("  {} = {}", attribute_name, self.value_text(name, &attribute_name)?));
        }
        for (other, scalars) in instance.get_input_setup_classes() {
            let scalars: Vec<String> = scalars
                .iter()
                .map(|x| Util::format_number(*x, None))
                .collect();
            lines.push(format!(
                "  <- {} (x {})",
                model.setup_class(*other)?.get_instance_name(),
                scalars.join(" / ")
            ));
        }
        Ok(lines.join(Util::NEWLN))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn new_controller() -> Controller {
        Controller::new(TextUI::new(true).unwrap(), Settings::default())
    }

    fn run_all(controller: &mut Controller, lines: &[&str]) {
        for line in lines {
            controller
                .execute(line)
                .unwrap_or_else(|e| panic!("\"{}\" failed: {}", line, e));
        }
    }

    #[test]
    fn input_output_scenario_by_commands() {
        Util::initialize_tracing();
        let mut c = new_controller();
        run_all(
            &mut c,
            &[
                "class Output",
                "class Input",
                "attr Output a",
                "attr Output b",
                "attr Input sum",
                "calc Input sum and",
                "input Input sum external Output a",
                "input Input sum external Output b",
                "instance Output out1",
                "instance Input in1",
                "link in1 out1",
                "set out1 a 3",
                "set out1 b 4",
                "calc-all",
            ],
        );
        assert_eq!(c.execute("get in1 sum").unwrap(), "in1.sum = 7");
        assert_eq!(c.execute("override in1 sum 9").unwrap(), "in1.sum = 9 (override)");
        assert_eq!(c.execute("reset-override in1 sum").unwrap(), "in1.sum = 7");
    }

    #[test]
    fn triangles_and_sampling_by_commands() {
        Util::initialize_tracing();
        let mut c = new_controller();
        run_all(
            &mut c,
            &[
                "class Race",
                "attr Race slow",
                "attr Race fast",
                "attr Race \"slow wins\"",
                "type Race slow triangle",
                "type Race fast triangle",
                "type Race \"slow wins\" probability",
                "calc Race \"slow wins\" sample_triangle",
                "input Race \"slow wins\" internal slow",
                "input Race \"slow wins\" internal fast",
                "instance Race r",
                "set r slow 1 / 2 / 3",
                "set r fast 4 / 5 / 6",
                "calc-all",
            ],
        );
        assert_eq!(c.execute("get r slow").unwrap(), "r.slow = 1 / 2 / 3");
        assert_eq!(c.execute("get r \"slow wins\"").unwrap(), "r.slow wins = 0");
    }

    #[test]
    fn refusals_and_mistakes_are_errors() {
        Util::initialize_tracing();
        let mut c = new_controller();
        run_all(&mut c, &["class A", "attr A p", "attr A n", "type A p probability", "calc A n and", "instance A a1"]);
        assert!(c.execute("input A n internal p").is_err());
        assert!(c.execute("link a1 a1").is_err());
        assert!(c.execute("set a1 nope 3").is_err());
        assert!(c.execute("class A").is_err());
        assert!(c.execute("uninput A n A p").is_err());
        assert!(c.execute("mark a1 mauve hmm").is_err());
    }

    #[test]
    fn string_values_and_marks_keep_their_spacing() {
        Util::initialize_tracing();
        let mut c = new_controller();
        run_all(
            &mut c,
            &[
                "class Asset",
                "attr Asset notes",
                "type Asset notes string",
                "instance Asset \"web server\"",
                "set \"web server\" notes patched  twice, see \"CVE list\"",
                "mark \"web server\" red two  spaces",
            ],
        );
        assert_eq!(
            c.execute("get \"web server\" notes").unwrap(),
            "web server.notes = patched  twice, see \"CVE list\""
        );
        let shown = console::strip_ansi_codes(&c.execute("show \"web server\"").unwrap()).to_string();
        assert!(shown.contains("  notes = patched  twice"), "{}", shown);
        assert!(shown.contains("two  spaces"), "{}", shown);
    }

    #[test]
    fn show_lists_visible_attributes_marks_and_links() {
        Util::initialize_tracing();
        let mut c = new_controller();
        run_all(
            &mut c,
            &[
                "class Output",
                "class Input",
                "attr Output a",
                "attr Output secret",
                "hide Output secret",
                "attr Input sum",
                "calc Input sum and",
                "input Input sum external Output a",
                "instance Output out1",
                "instance Input in1",
                "link in1 out1 2",
                "set out1 a 3",
                "mark out1 green reviewed",
                "calc-all",
            ],
        );
        let shown = console::strip_ansi_codes(&c.execute("show").unwrap()).to_string();
        assert!(shown.contains("out1 (Output)  reviewed"), "{}", shown);
        assert!(shown.contains("  a = 3"), "{}", shown);
        assert!(!shown.contains("secret"), "{}", shown);
        assert!(shown.contains("  sum = 6"), "{}", shown);
        assert!(shown.contains("  <- out1 (x 2)"), "{}", shown);
    }

    #[test]
    fn start_runs_queued_lines_until_quit() {
        Util::initialize_tracing();
        let mut ui = TextUI::new(true).unwrap();
        ui.queue_input(
            ["class Asset", "bogus", "quit", "class Never"]
                .iter()
                .map(|s| s.to_string()),
        );
        let mut c = Controller::new(ui, Settings::default());
        c.start().unwrap();
        assert_eq!(c.get_scripting().class_names(), vec!["Asset"]);
        let displayed: Vec<String> = c
            .get_ui()
            .get_displayed()
            .iter()
            .map(|s| console::strip_ansi_codes(s).to_string())
            .collect();
        assert!(displayed.iter().any(|s| s.starts_with("Unknown command \"bogus\"")), "{:?}", displayed);
    }
}
