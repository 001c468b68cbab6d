use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use ini::{Ini, ParseOption, Properties};

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".trello-tracker.ini";
pub const CONFIG_PATH_ENV: &str = "TRELLO_TRACKER_CONFIG";
pub const API_KEY_ENV: &str = "TRELLO_API_KEY";
pub const TOKEN_ENV: &str = "TRELLO_TOKEN";

const MAX_FIELD_WIDTH: usize = 10;

/// ISO week and week-numbering year used to expand `{WEEK}` / `{YEAR}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekContext {
    pub week: u32,
    pub year: i32,
}

impl WeekContext {
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            week: iso.week(),
            year: iso.year(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    fn lookup(&self, name: &str) -> Option<i64> {
        match name {
            "WEEK" => Some(self.week as i64),
            "YEAR" => Some(self.year as i64),
            _ => None,
        }
    }
}

/// Expands `{WEEK}` and `{YEAR}` placeholders.
///
/// A placeholder may carry a zero-padded width (`{WEEK:02}` or `{WEEK:02d}`).
/// `{{` and `}}` produce literal braces.
pub fn expand_template(text: &str, week: &WeekContext) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut field = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    field.push(c);
                }
                if !closed {
                    return Err(Error::invalid(format!("unclosed placeholder in '{}'", text)));
                }
                out.push_str(&render_field(&field, week, text)?);
            }
            '}' => {
                return Err(Error::invalid(format!("single '}}' in '{}'", text)));
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

fn render_field(field: &str, week: &WeekContext, text: &str) -> Result<String> {
    let (name, spec) = match field.split_once(':') {
        Some((name, spec)) => (name, Some(spec)),
        None => (field, None),
    };

    let value = week
        .lookup(name.trim())
        .ok_or_else(|| Error::invalid(format!("unknown placeholder '{{{}}}' in '{}'", field, text)))?;

    let Some(spec) = spec else {
        return Ok(value.to_string());
    };

    let digits = spec.strip_suffix('d').unwrap_or(spec);
    let width: usize = if digits.is_empty() {
        0
    } else {
        digits
            .parse()
            .map_err(|_| Error::invalid(format!("unsupported format '{}' in '{}'", spec, text)))?
    };
    if width > MAX_FIELD_WIDTH {
        return Err(Error::invalid(format!(
            "width {} in '{}' exceeds {}",
            width, text, MAX_FIELD_WIDTH
        )));
    }

    if digits.starts_with('0') {
        Ok(format!("{:0width$}", value, width = width))
    } else {
        Ok(format!("{:>width$}", value, width = width))
    }
}

/// Interprets a boolean-ish config value.
pub fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        other => Err(Error::invalid(format!(
            "[email] {} must be a boolean (true/false/yes/no/1/0), got '{}'",
            key, other
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct TrelloConfig {
    pub api_key: String,
    pub token: String,
    pub board_id: String,
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Expanded list names, in report order, without duplicates.
    pub lists: Vec<String>,
    pub ignore_labels: HashSet<String>,
    pub done_list: String,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    pub to: String,
    pub server: String,
    pub subject: String,
    pub send: bool,
    pub ask_before_send: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub trello: TrelloConfig,
    pub filters: FilterConfig,
    pub email: EmailConfig,
    pub week: WeekContext,
}

/// Credentials supplied outside of the ini file.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub api_key: Option<String>,
    pub token: Option<String>,
}

impl CredentialOverrides {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(API_KEY_ENV).ok().filter(|v| !v.is_empty()),
            token: env::var(TOKEN_ENV).ok().filter(|v| !v.is_empty()),
        }
    }
}

impl Config {
    /// Locates and loads the configuration file.
    pub fn load(explicit: Option<&Path>, week: WeekContext) -> Result<Self> {
        let candidates = candidate_paths(explicit);
        let path = candidates
            .iter()
            .find(|p| p.is_file())
            .ok_or_else(|| Error::ConfigurationNotFound {
                candidates: candidates.clone(),
            })?;

        tracing::debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_ini_str(&text, week, CredentialOverrides::from_env())
    }

    pub fn from_ini_str(text: &str, week: WeekContext, overrides: CredentialOverrides) -> Result<Self> {
        // Backslashes and quotes are part of the value, as list names may contain them.
        let options = ParseOption {
            enabled_escape: false,
            enabled_quote: false,
            ..Default::default()
        };
        let ini = Ini::load_from_str_opt(text, options).map_err(|e| Error::invalid(e.to_string()))?;

        let trello = section(&ini, "trello")?;
        let filters = section(&ini, "filters")?;
        let email = section(&ini, "email")?;

        let api_key = match overrides.api_key {
            Some(key) => key,
            None => required(trello, "trello", "apikey")?,
        };
        let token = match overrides.token {
            Some(token) => token,
            None => required(trello, "trello", "token")?,
        };

        let mut lists = Vec::new();
        for raw in split_csv(&required(filters, "filters", "lists")?) {
            let name = expand_template(&raw, &week)?;
            if !lists.contains(&name) {
                lists.push(name);
            }
        }
        if lists.is_empty() {
            return Err(Error::invalid("[filters] lists must name at least one list"));
        }

        Ok(Self {
            trello: TrelloConfig {
                api_key,
                token,
                board_id: required(trello, "trello", "boardid")?,
            },
            filters: FilterConfig {
                lists,
                ignore_labels: split_csv(&required(filters, "filters", "ignorelabels")?)
                    .into_iter()
                    .collect(),
                done_list: expand_template(&required(filters, "filters", "donelist")?, &week)?,
            },
            email: EmailConfig {
                from: required(email, "email", "from")?,
                to: required(email, "email", "to")?,
                server: required(email, "email", "server")?,
                subject: expand_template(&required(email, "email", "subject")?, &week)?,
                send: parse_flag("send", &required(email, "email", "send")?)?,
                ask_before_send: parse_flag(
                    "ask_before_send",
                    &required(email, "email", "ask_before_send")?,
                )?,
            },
            week,
        })
    }
}

/// Where the configuration is looked up, most specific first.
pub fn candidate_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    if let Some(path) = explicit {
        return vec![path.to_path_buf()];
    }

    let mut candidates = Vec::new();
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            candidates.push(PathBuf::from(path));
        }
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(CONFIG_FILE_NAME));
    }
    candidates.push(PathBuf::from(".").join(CONFIG_FILE_NAME));
    candidates
}

fn section<'a>(ini: &'a Ini, name: &str) -> Result<&'a Properties> {
    ini.section(Some(name))
        .ok_or_else(|| Error::invalid(format!("missing section [{}]", name)))
}

/// Key lookup ignores case, section names do not.
fn required(props: &Properties, section: &str, key: &str) -> Result<String> {
    props
        .iter()
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().to_string())
        .ok_or_else(|| Error::invalid(format!("missing key '{}' in section [{}]", key, section)))
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
