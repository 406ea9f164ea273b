use itertools::Itertools;
use regex::{Captures, Regex};

use crate::error::FormatError;

/// Pipes generated code through `rustfmt`, turning `#[doc]` attributes into `///` comments.
pub(crate) struct Formatter {
    shell: xshell::Shell,
    doc_re: Regex,
}

impl Formatter {
    pub(crate) fn new() -> Result<Self, FormatError> {
        Ok(Self {
            shell: xshell::Shell::new()?,
            doc_re: Regex::new(r#"(?m)^(?<spaces>\s*)#\[doc\s*=\s*"(?<doc>.*)"\]$"#)?,
        })
    }

    pub(crate) fn format(&self, code: &str) -> Result<String, FormatError> {
        use xshell::cmd;

        let code = cmd!(self.shell, "rustfmt").stdin(code).read()?;
        let code = code.replace(" :: ", "::");
        let code = self.doc_re.replace_all(&code, |caps: &Captures<'_>| {
            let spaces = caps.name("spaces").map_or("", |m| m.as_str());
            let doc_indent = spaces.replace('\n', "");
            let doc = caps.name("doc").map_or("", |m| m.as_str());

            let lines = doc.split(r"\n").map(|line| line.replace(r#"\""#, r#"""#)).collect::<Vec<_>>();

            format!(
                "{spaces}{}",
                lines.iter().format_with("\n", |line, f| match line.trim_start() {
                    "" => f(&format_args!("{doc_indent}///")),
                    line => f(&format_args!("{doc_indent}/// {line}")),
                })
            )
        });

        Ok(cmd!(self.shell, "rustfmt").stdin(&*code).read()?)
    }
}
