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
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::VecDeque;
use tracing::*;

/// Line-oriented input and output. Lines queued up front (from a script file, or by a test) are
/// read first; after them, input comes from the terminal unless we are testing. When testing,
/// output is kept in `displayed` instead of printed.
pub struct TextUI {
    pub testing: bool,
    editor: Option<DefaultEditor>,
    queued_input: VecDeque<String>,
    displayed: Vec<String>,
}

impl TextUI {
    const SEPARATOR: &'static str = "==============================================";

    pub fn new(testing: bool) -> Result<TextUI, Error> {
        let editor = if testing {
            None
        } else {
            Some(DefaultEditor::new().map_err(|e| anyhow!("Unable to set up line editing: {}", e))?)
        };
        Ok(TextUI {
            testing,
            editor,
            queued_input: VecDeque::new(),
            displayed: Vec::new(),
        })
    }

    pub fn queue_input<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        self.queued_input.extend(lines);
    }

    pub fn get_displayed(&self) -> &[String] {
        &self.displayed
    }

    pub fn display_text(&mut self, text: &str) {
        if self.testing {
            self.displayed.push(text.to_string());
        } else {
            println!("{}", text);
        }
    }

    pub fn display_visual_separator(&mut self) {
        self.display_text(TextUI::SEPARATOR);
    }

    /// The next line of input, or None at end of input (Ctrl+D, Ctrl+C, or the end of the queued
    /// lines when there is no terminal).
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>, Error> {
        if let Some(line) = self.queued_input.pop_front() {
            if !self.testing {
                println!("{}{}", prompt, line);
            }
            return Ok(Some(line));
        }
        let editor = match self.editor.as_mut() {
            Some(editor) => editor,
            None => return Ok(None),
        };
        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = editor.add_history_entry(line.as_str()) {
                        debug!("Not added to history: {}", e);
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(anyhow!("Unable to read input: {}", e)),
        }
    }
}
