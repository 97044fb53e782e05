/*  This file is part of RiskModel, a program to calculate risk and attack models.
    Copyright in each year of 2024-2025 inclusive, the RiskModel authors.
    RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,
    and the GNU Affero General Public License as published by the Free Software Foundation;
    see the file LICENSE for license version and details.
    RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
    You should have received a copy of the GNU Affero General Public License along with RiskModel.  If not, see <http://www.gnu.org/licenses/>
*/
use anyhow::{anyhow, Error, Result};

/// What the calculation and the display need from the outside. Passed explicitly to whatever
/// uses it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Sample pairs drawn per SampleTriangle calculation.
    pub num_samples: u32,
    /// Rounding for displayed values; None shows full precision.
    pub decimal_places: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            num_samples: Settings::DEFAULT_NUM_SAMPLES,
            decimal_places: Some(Settings::DEFAULT_DECIMAL_PLACES),
        }
    }
}

impl Settings {
    pub const DEFAULT_NUM_SAMPLES: u32 = 10000;
    pub const DEFAULT_DECIMAL_PLACES: usize = 3;
    pub const USAGE: &'static str = "Usage: riskmodel [--samples N] [--decimals N|none] [script-file]";

    /// Reads "--samples N" and "--decimals N|none" from the program arguments (without the program
    /// name). Returns the settings and whatever arguments were not flags, in order.
    pub fn from_args(args: &[String]) -> Result<(Settings, Vec<String>), Error> {
        let mut settings = Settings::default();
        let mut rest: Vec<String> = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--samples" => {
                    let n = Settings::flag_value(arg, iter.next())?;
                    settings.num_samples = n
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or_else(|| anyhow!("--samples needs a positive whole number, not \"{}\".", n))?;
                }
                "--decimals" => {
                    let n = Settings::flag_value(arg, iter.next())?;
                    settings.decimal_places = if n.eq_ignore_ascii_case("none") {
                        None
                    } else {
                        Some(
                            n.parse::<usize>()
                                .map_err(|_| anyhow!("--decimals needs a whole number or \"none\", not \"{}\".", n))?,
                        )
                    };
                }
                s if s.starts_with("--") => return Err(anyhow!("Unknown option {}.  {}", s, Settings::USAGE)),
                _ => rest.push(arg.clone()),
            }
        }
        Ok((settings, rest))
    }

    fn flag_value<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, Error> {
        value
            .map(|s| s.as_str())
            .ok_or_else(|| anyhow!("{} needs a value.  {}", flag, Settings::USAGE))
    }
}
