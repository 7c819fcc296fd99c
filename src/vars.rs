//! `.tfvars` variables files
//!
//! Flat `name = value` lines with `#` comments and blank lines. Values are
//! typed on a best-effort basis and written back in the same layout.

use serde::Serialize;

/// Best-effort typed value of a variable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl VarValue {
    /// Type a raw value: booleans (quoted or not), finite numbers, else text
    pub fn infer(raw: &str) -> Self {
        let raw = raw.trim();

        match raw {
            "true" | "\"true\"" => return VarValue::Bool(true),
            "false" | "\"false\"" => return VarValue::Bool(false),
            _ => {}
        }

        if looks_numeric(raw) {
            if let Ok(number) = raw.parse::<f64>() {
                if number.is_finite() {
                    return VarValue::Number(number);
                }
            }
        }

        VarValue::Text(raw.to_string())
    }

    /// Text with surrounding quotes removed
    pub fn display(&self) -> String {
        match self {
            VarValue::Bool(b) => b.to_string(),
            VarValue::Number(n) => n.to_string(),
            VarValue::Text(s) => s
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(s)
                .to_string(),
        }
    }
}

fn looks_numeric(raw: &str) -> bool {
    !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && raw.chars().any(|c| c.is_ascii_digit())
}

/// One line of a variables file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VarEntry {
    Blank,
    Comment(String),
    Assignment {
        name: String,
        value: VarValue,
        /// Value text as written in the file
        raw: String,
    },
    /// A line that is none of the above, kept verbatim
    Other(String),
}

/// Parsed variables file, in line order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VarsFile {
    pub entries: Vec<VarEntry>,
}

impl VarsFile {
    /// Assigned variables as `(name, value)` pairs
    pub fn variables(&self) -> impl Iterator<Item = (&str, &VarValue)> {
        self.entries.iter().filter_map(|entry| match entry {
            VarEntry::Assignment { name, value, .. } => Some((name.as_str(), value)),
            _ => None,
        })
    }

    pub fn get(&self, name: &str) -> Option<&VarValue> {
        self.variables()
            .find(|(var, _)| *var == name)
            .map(|(_, value)| value)
    }

    /// Set a variable, appending it when it is not defined yet
    ///
    /// Booleans and numbers are written bare; text is written quoted.
    pub fn set(&mut self, name: &str, value: &str) {
        let inferred = VarValue::infer(value);
        let raw = match &inferred {
            VarValue::Text(text) if !(text.starts_with('"') && text.ends_with('"') && text.len() > 1) => {
                format!("\"{}\"", text.replace('"', "\\\""))
            }
            _ => value.trim().to_string(),
        };

        let existing = self.entries.iter_mut().find_map(|entry| match entry {
            VarEntry::Assignment { name: var, value, raw } if var == name => Some((value, raw)),
            _ => None,
        });

        match existing {
            Some((value, current_raw)) => {
                *value = inferred;
                *current_raw = raw;
            }
            None => self.entries.push(VarEntry::Assignment {
                name: name.to_string(),
                value: inferred,
                raw,
            }),
        }
    }
}

/// Parse the contents of a variables file
pub fn parse_vars(text: &str) -> VarsFile {
    let entries = text
        .lines()
        .map(|line| {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                return VarEntry::Blank;
            }
            if trimmed.starts_with('#') {
                return VarEntry::Comment(line.to_string());
            }

            match line.split_once('=') {
                Some((name, raw)) if !name.trim().is_empty() => VarEntry::Assignment {
                    name: name.trim().to_string(),
                    value: VarValue::infer(raw),
                    raw: raw.trim().to_string(),
                },
                _ => VarEntry::Other(line.to_string()),
            }
        })
        .collect();

    VarsFile { entries }
}

/// Write a variables file back as `name = value` lines
pub fn write_vars(vars: &VarsFile) -> String {
    let mut output = String::new();

    for entry in &vars.entries {
        match entry {
            VarEntry::Blank => {}
            VarEntry::Comment(line) | VarEntry::Other(line) => output.push_str(line),
            VarEntry::Assignment { name, raw, .. } => {
                output.push_str(&format!("{} = {}", name, raw));
            }
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> &'static str {
        "# Route53 settings\nhosted_zone_id = \"Z2FDTNDATAQYW2\"\ntop_domain = \"example.com\"\n\nenable_redis = false\nuse_cdn = \"true\"\ninstance_count = 2\ndisk_size_gb = 20.5\n"
    }

    #[test]
    fn test_round_trip() {
        assert_eq!(write_vars(&parse_vars(sample())), sample());
    }

    #[test]
    fn test_round_trip_normalizes_spacing_around_equals() {
        let text = "region=\"us-west-2\"\nport   =   8080\n";
        assert_eq!(
            write_vars(&parse_vars(text)),
            "region = \"us-west-2\"\nport = 8080\n"
        );
    }

    #[test]
    fn test_typing() {
        let vars = parse_vars(sample());

        assert_eq!(vars.get("enable_redis"), Some(&VarValue::Bool(false)));
        assert_eq!(vars.get("use_cdn"), Some(&VarValue::Bool(true)));
        assert_eq!(vars.get("instance_count"), Some(&VarValue::Number(2.0)));
        assert_eq!(vars.get("disk_size_gb"), Some(&VarValue::Number(20.5)));
        assert_eq!(
            vars.get("top_domain"),
            Some(&VarValue::Text("\"example.com\"".to_string()))
        );
        assert!(vars.get("missing").is_none());
    }

    #[test]
    fn test_non_numeric_words_stay_text() {
        assert_eq!(VarValue::infer("inf"), VarValue::Text("inf".to_string()));
        assert_eq!(VarValue::infer("NaN"), VarValue::Text("NaN".to_string()));
        assert_eq!(VarValue::infer("-"), VarValue::Text("-".to_string()));
        assert_eq!(VarValue::infer("1e3"), VarValue::Number(1000.0));
    }

    #[test]
    fn test_comments_and_blanks_are_preserved() {
        let vars = parse_vars(sample());
        assert_eq!(vars.entries[0], VarEntry::Comment("# Route53 settings".to_string()));
        assert_eq!(vars.entries[3], VarEntry::Blank);
        assert_eq!(vars.variables().count(), 6);
    }

    #[test]
    fn test_set_existing_and_new_values() {
        let mut vars = parse_vars(sample());

        vars.set("hosted_zone_id", "Z0000");
        vars.set("certificate_arn", "arn:aws:acm:us-west-2:123:certificate/abc");
        vars.set("instance_count", "3");

        let written = write_vars(&vars);
        assert!(written.contains("hosted_zone_id = \"Z0000\"\n"));
        assert!(written.contains("instance_count = 3\n"));
        assert!(written.ends_with("certificate_arn = \"arn:aws:acm:us-west-2:123:certificate/abc\"\n"));
        assert!(written.starts_with("# Route53 settings\n"));
    }

    #[test]
    fn test_display_strips_quotes() {
        assert_eq!(VarValue::infer("\"example.com\"").display(), "example.com");
        assert_eq!(VarValue::infer("2").display(), "2");
    }

    #[test]
    fn test_lines_without_equals_are_kept() {
        let text = "tags {\n}\n";
        let vars = parse_vars(text);
        assert!(matches!(vars.entries[0], VarEntry::Other(_)));
        assert_eq!(write_vars(&vars), text);
    }
}
