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
use crate::model::value::Value;
use crate::model::value_type::ValueType;
use crate::util::Util;
use anyhow::{anyhow, Error, Result};
use std::str::FromStr;

/// One line of the command language, parsed. Names with spaces go in double quotes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Class { name: String },
    RemoveClass { name: String },
    Attr { class: String, name: String },
    RemoveAttr { class: String, name: String },
    Type { class: String, attr: String, value_type: ValueType },
    Calc { class: String, attr: String, calculation_type: Option<CalculationType> },
    Scalar { class: String, attr: String, scalar: f64 },
    Offset { class: String, attr: String, offset: f64 },
    Hide { class: String, attr: String, hidden: bool },
    /// from_class is None for an internal input (same class, same instance).
    Input { class: String, attr: String, from_class: Option<String>, from_attr: String },
    Uninput { class: String, attr: String, from_class: String, from_attr: String },
    Instance { class: String, name: String },
    RemoveInstance { name: String },
    Link { instance: String, from_instance: String, scalars: Vec<f64> },
    Unlink { instance: String, from_instance: String },
    Set { instance: String, attr: String, value: String },
    Override { instance: String, attr: String, value: String },
    ResetOverride { instance: String, attr: String },
    CalcAll,
    Get { instance: String, attr: String },
    Show { instance: Option<String> },
    Mark { instance: String, color: String, text: String },
    Unmark { instance: String },
    Help,
    Quit,
}

impl Command {
    pub const HELP: &'static str = "\
Commands (put names containing spaces in double quotes):
  class <class>                                  create a class
  remove-class <class>
  attr <class> <attr>                            add an attribute (a manually entered number)
  remove-attr <class> <attr>
  type <class> <attr> string|number|probability|triangle
  calc <class> <attr> mean|and|or|multiplication|division|sample_triangle|qualitative|none
  scalar <class> <attr> <x>                      multiply the attribute's calculated value by x
  offset <class> <attr> <x>                      then add x
  hide <class> <attr> [on|off]
  input <class> <attr> internal <from-attr>      feed from the same instance
  input <class> <attr> external <from-class> <from-attr>
                                                 feed from linked instances of from-class
  uninput <class> <attr> <from-class> <from-attr>
  instance <class> <instance>                    create an instance
  remove-instance <instance>
  link <instance> <from-instance> [x | x / y / z]   take external input, times the scalar(s)
  unlink <instance> <from-instance>
  set <instance> <attr> <value>                  e.g. 3, 0.25, or 1 / 2 / 4 for a triangle
  override <instance> <attr> <value>
  reset-override <instance> <attr>
  calc-all                                       recalculate everything
  get <instance> <attr>
  show [<instance>]
  mark <instance> <color> <text>                 colors: black red green yellow blue magenta cyan white
  unmark <instance>
  help
  quit";

    /// None for a blank line or a comment (starting with '#').
    pub fn parse(line: &str) -> Result<Option<Command>, Error> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        let verb = match trimmed.split_whitespace().next() {
            Some(verb) => verb.to_lowercase(),
            None => return Ok(None),
        };
        if matches!(verb.as_str(), "link" | "set" | "override" | "mark") {
            return Command::parse_with_rest(&verb, trimmed).map(Some);
        }
        let words = Util::split_words(trimmed)?;
        let args = words.get(1..).unwrap_or(&[]);
        let command = match verb.as_str() {
            "class" => {
                let [name] = Command::exactly::<1>(&verb, args)?;
                Command::Class { name }
            }
            "remove-class" => {
                let [name] = Command::exactly::<1>(&verb, args)?;
                Command::RemoveClass { name }
            }
            "attr" => {
                let [class, name] = Command::exactly::<2>(&verb, args)?;
                Command::Attr { class, name }
            }
            "remove-attr" => {
                let [class, name] = Command::exactly::<2>(&verb, args)?;
                Command::RemoveAttr { class, name }
            }
            "type" => {
                let [class, attr, value_type] = Command::exactly::<3>(&verb, args)?;
                Command::Type {
                    class,
                    attr,
                    value_type: ValueType::from_str(&value_type)?,
                }
            }
            "calc" => {
                let [class, attr, calculation_type] = Command::exactly::<3>(&verb, args)?;
                let calculation_type = if calculation_type.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(CalculationType::from_str(&calculation_type)?)
                };
                Command::Calc {
                    class,
                    attr,
                    calculation_type,
                }
            }
            "scalar" => {
                let [class, attr, x] = Command::exactly::<3>(&verb, args)?;
                Command::Scalar {
                    class,
                    attr,
                    scalar: Command::number(&x)?,
                }
            }
            "offset" => {
                let [class, attr, x] = Command::exactly::<3>(&verb, args)?;
                Command::Offset {
                    class,
                    attr,
                    offset: Command::number(&x)?,
                }
            }
            "hide" => {
                let (class, attr, hidden) = match args {
                    [class, attr] => (class.clone(), attr.clone(), true),
                    [class, attr, on_off] => (class.clone(), attr.clone(), Command::on_off(on_off)?),
                    _ => return Err(Command::usage(&verb)),
                };
                Command::Hide { class, attr, hidden }
            }
            "input" => match args {
                [class, attr, kind, from_attr] if kind.eq_ignore_ascii_case("internal") => Command::Input {
                    class: class.clone(),
                    attr: attr.clone(),
                    from_class: None,
                    from_attr: from_attr.clone(),
                },
                [class, attr, kind, from_class, from_attr] if kind.eq_ignore_ascii_case("external") => Command::Input {
                    class: class.clone(),
                    attr: attr.clone(),
                    from_class: Some(from_class.clone()),
                    from_attr: from_attr.clone(),
                },
                _ => return Err(Command::usage(&verb)),
            },
            "uninput" => {
                let [class, attr, from_class, from_attr] = Command::exactly::<4>(&verb, args)?;
                Command::Uninput {
                    class,
                    attr,
                    from_class,
                    from_attr,
                }
            }
            "instance" => {
                let [class, name] = Command::exactly::<2>(&verb, args)?;
                Command::Instance { class, name }
            }
            "remove-instance" => {
                let [name] = Command::exactly::<1>(&verb, args)?;
                Command::RemoveInstance { name }
            }
            "unlink" => {
                let [instance, from_instance] = Command::exactly::<2>(&verb, args)?;
                Command::Unlink { instance, from_instance }
            }
            "reset-override" => {
                let [instance, attr] = Command::exactly::<2>(&verb, args)?;
                Command::ResetOverride { instance, attr }
            }
            "calc-all" => {
                let [] = Command::exactly::<0>(&verb, args)?;
                Command::CalcAll
            }
            "get" => {
                let [instance, attr] = Command::exactly::<2>(&verb, args)?;
                Command::Get { instance, attr }
            }
            "show" => match args {
                [] => Command::Show { instance: None },
                [instance] => Command::Show {
                    instance: Some(instance.clone()),
                },
                _ => return Err(Command::usage(&verb)),
            },
            "unmark" => {
                let [instance] = Command::exactly::<1>(&verb, args)?;
                Command::Unmark { instance }
            }
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return Err(anyhow!("Unknown command \"{}\"; type \"help\" for the list.", verb)),
        };
        Ok(Some(command))
    }

    // The commands whose last argument is the rest of the line as typed: a value, a mark's text,
    // or link scalars.
    fn parse_with_rest(verb: &str, line: &str) -> Result<Command, Error> {
        let (words, rest) = match Util::split_leading_words(line, 3)? {
            Some(split) => split,
            None if verb == "link" => {
                let words = Util::split_words(line)?;
                let [instance, from_instance] = Command::exactly::<2>(verb, words.get(1..).unwrap_or(&[]))?;
                return Ok(Command::Link {
                    instance,
                    from_instance,
                    scalars: vec![1.0],
                });
            }
            None => return Err(Command::usage(verb)),
        };
        let [_, first, second] = Command::exactly::<3>(verb, &words)?;
        Ok(match verb {
            "set" => Command::Set {
                instance: first,
                attr: second,
                value: rest,
            },
            "override" => Command::Override {
                instance: first,
                attr: second,
                value: rest,
            },
            "mark" => Command::Mark {
                instance: first,
                color: second,
                text: rest,
            },
            _ => Command::Link {
                instance: first,
                from_instance: second,
                scalars: Command::scalars(&rest)?,
            },
        })
    }

    fn exactly<const N: usize>(verb: &str, args: &[String]) -> Result<[String; N], Error> {
        <[String; N]>::try_from(args.to_vec()).map_err(|_| Command::usage(verb))
    }

    fn usage(verb: &str) -> Error {
        let lines: Vec<&str> = Command::HELP
            .lines()
            .filter(|l| l.trim_start().starts_with(&format!("{} ", verb)) || l.trim() == verb)
            .map(|l| l.trim())
            .collect();
        if lines.is_empty() {
            anyhow!("Wrong arguments for \"{}\"; type \"help\".", verb)
        } else {
            anyhow!("Usage: {}", lines.join("  or  "))
        }
    }

    fn number(s: &str) -> Result<f64, Error> {
        s.parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| anyhow!("\"{}\" is not a number.", s))
    }

    fn on_off(s: &str) -> Result<bool, Error> {
        match s.to_lowercase().as_str() {
            "on" | "yes" | "true" => Ok(true),
            "off" | "no" | "false" => Ok(false),
            _ => Err(anyhow!("Expected on or off, not \"{}\".", s)),
        }
    }

    /// "2" or "1 / 2 / 3".
    fn scalars(s: &str) -> Result<Vec<f64>, Error> {
        match Value::parse_numeric(s).components() {
            Some(components) => Ok(components.to_vec()),
            None => Err(anyhow!("\"{}\" is not a scalar (x) or scalar triple (x / y / z).", s)),
        }
    }
}
