//! Shell command lines as data, rendered by one formatter.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Emitted as-is.
    Bare(String),
    /// Wrapped in double quotes without escaping.
    DoubleQuoted(String),
    /// Wrapped in single quotes without escaping.
    SingleQuoted(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Bare(s) => f.write_str(s),
            Arg::DoubleQuoted(s) => write!(f, "\"{}\"", s),
            Arg::SingleQuoted(s) => write!(f, "'{}'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    args: Vec<Arg>,
}

impl ShellCommand {
    /// Start a command from its leading words, e.g. `["keeper", "pam", "config", "new"]`.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: words.into_iter().map(|w| Arg::Bare(w.into())).collect(),
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn flag(self, flag: &str) -> Self {
        self.arg(Arg::Bare(flag.to_string()))
    }

    pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
        self.flag(flag).arg(Arg::Bare(value.into()))
    }

    pub fn opt_quoted(self, flag: &str, value: impl Into<String>) -> Self {
        self.flag(flag).arg(Arg::DoubleQuoted(value.into()))
    }

    pub fn opt_single_quoted(self, flag: &str, value: impl Into<String>) -> Self {
        self.flag(flag).arg(Arg::SingleQuoted(value.into()))
    }

    pub fn quoted(self, value: impl Into<String>) -> Self {
        self.arg(Arg::DoubleQuoted(value.into()))
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mixed_quoting() {
        let cmd = ShellCommand::new(["keeper", "pam", "rotation", "set"])
            .opt_quoted("--record", "/Users/srv1 Local Admin")
            .flag("--enable")
            .opt_single_quoted("-sj", r#"{"type":"DAILY"}"#);

        assert_eq!(
            cmd.to_string(),
            r#"keeper pam rotation set --record "/Users/srv1 Local Admin" --enable -sj '{"type":"DAILY"}'"#
        );
    }

    #[test]
    fn test_render_single_word() {
        assert_eq!(ShellCommand::new(["keeper"]).to_string(), "keeper");
    }

    #[test]
    fn test_no_double_spaces_with_empty_optional_parts() {
        let cmd = ShellCommand::new(["keeper", "folder", "move"])
            .quoted("/A")
            .quoted("/P/A");
        let text = cmd.to_string();
        assert_eq!(text, r#"keeper folder move "/A" "/P/A""#);
        assert!(!text.contains("  "));
        assert_eq!(cmd.args.len(), 5);
    }

    #[test]
    fn test_values_are_not_escaped() {
        let arg = Arg::DoubleQuoted("say \"hi\"".to_string());
        assert_eq!(arg.to_string(), "\"say \"hi\"\"");
    }
}
