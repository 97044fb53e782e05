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
use tracing_subscriber::EnvFilter;

/// Shared code ("Utility") that doesn't belong to any one type.
pub struct Util {}

static TRACING_INIT: std::sync::Once = std::sync::Once::new();

impl Util {
    pub const DOES_NOT_EXIST: &'static str = " does not exist in the model.";
    pub const NEWLN: &'static str = "\n";
    /// Holds a tracing filter such as "debug" or "riskmodel=trace".
    pub const LOG_ENV_VAR: &'static str = "RISKMODEL_LOG";
    pub const DEFAULT_LOG_LEVEL: &'static str = "warn";

    pub fn is_windows() -> bool {
        let os = std::env::consts::OS;
        os.to_lowercase().eq("windows")
    }

    pub fn how_quit() -> &'static str {
        if Util::is_windows() {
            "Close the window, or type \"quit\""
        } else {
            "Ctrl+D, or type \"quit\""
        }
    }

    pub fn license() -> String {
        String::from(
            "RiskModel, a program to calculate risk and attack models.\n\
             Copyright in each year of 2024-2025 inclusive, the RiskModel authors.\n\
             RiskModel is free software, distributed under a license that includes honesty, the Golden Rule,\n\
             and the GNU Affero General Public License as published by the Free Software Foundation;\n\
             see the file LICENSE for license version and details.\n\
             RiskModel is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied\n\
             warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for\n\
             more details.",
        )
    }

    /// Installs the log subscriber, once per process; main and every test call this.
    pub fn initialize_tracing() {
        TRACING_INIT.call_once(|| {
            let filter = EnvFilter::try_from_env(Util::LOG_ENV_VAR)
                .unwrap_or_else(|_| EnvFilter::new(Util::DEFAULT_LOG_LEVEL));
            // Fails only if something else installed a global subscriber first, which is fine.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        });
    }

    /// Rounds for display and drops trailing zeros, so 7.0 shows as "7" and 1/3 as "0.333" (with
    /// 3 places). None leaves the number at full precision.
    pub fn format_number(x: f64, decimal_places: Option<usize>) -> String {
        let s = match decimal_places {
            None => x.to_string(),
            Some(places) => {
                let rounded = format!("{:.*}", places, x);
                if rounded.contains('.') {
                    rounded.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    rounded
                }
            }
        };
        if s == "-0" {
            "0".to_string()
        } else {
            s
        }
    }

    /// Splits a command line on whitespace, keeping "double-quoted words" together (without the
    /// quotes) so names can contain spaces.
    pub fn split_words(line: &str) -> Result<Vec<String>, Error> {
        let (words, _) = Util::scan_words(line, None)?;
        Ok(words)
    }

    /// Splits off the first `count` words (as split_words does) and returns them with the rest of
    /// the line as typed. A rest that is one double-quoted word loses its quotes. None when
    /// nothing follows those words.
    pub fn split_leading_words(line: &str, count: usize) -> Result<Option<(Vec<String>, String)>, Error> {
        let (words, rest_start) = Util::scan_words(line, Some(count))?;
        Ok(rest_start.map(|i| {
            let rest = line[i..].trim_end();
            let unquoted = rest
                .strip_prefix('"')
                .and_then(|r| r.strip_suffix('"'))
                .filter(|inner| !inner.contains('"'));
            (words, unquoted.unwrap_or(rest).to_string())
        }))
    }

    // Stops at the first non-blank character after `count` words, returning where that is.
    fn scan_words(line: &str, count: Option<usize>) -> Result<(Vec<String>, Option<usize>), Error> {
        let mut words: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut have_word = false;
        for (i, c) in line.char_indices() {
            if count == Some(words.len()) && !have_word && !c.is_whitespace() {
                return Ok((words, Some(i)));
            }
            match c {
                '"' => {
                    in_quotes = !in_quotes;
                    have_word = true;
                }
                c if c.is_whitespace() && !in_quotes => {
                    if have_word {
                        words.push(std::mem::take(&mut current));
                        have_word = false;
                    }
                }
                c => {
                    current.push(c);
                    have_word = true;
                }
            }
        }
        if in_quotes {
            return Err(anyhow!("Unmatched double quote in: {}", line));
        }
        if have_word {
            words.push(current);
        }
        Ok((words, None))
    }
}
