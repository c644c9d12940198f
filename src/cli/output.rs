//! Terminal output for the deep-research CLI
//!
//! Every line is formatted by a pure `format_*` function so the plain
//! (`--no-color`) rendering can be asserted in tests.

use owo_colors::OwoColorize;

/// Kind of a one-line status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Note,
    Warn,
    Fail,
    Created,
    Skipped,
    Tip,
    Done,
}

impl Status {
    fn tag(self) -> &'static str {
        match self {
            Status::Ok => "[ok]",
            Status::Note => "[note]",
            Status::Warn => "[warn]",
            Status::Fail => "[fail]",
            Status::Created => "[new]",
            Status::Skipped => "[skip]",
            Status::Tip => "[tip]",
            Status::Done => "[done]",
        }
    }
}

/// Writes CLI output, colored unless disabled
pub struct Output {
    colored: bool,
}

impl Output {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn banner(&self) {
        println!("{}", self.format_banner());
    }

    /// Print a status line; failures go to stderr
    pub fn status(&self, status: Status, message: &str) {
        let line = self.format_status(status, message);
        if status == Status::Fail {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    pub fn heading(&self, title: &str) {
        println!("{}", self.format_heading(title));
    }

    pub fn subheading(&self, title: &str) {
        println!("{}", self.format_subheading(title));
    }

    pub fn field(&self, key: &str, value: &str) {
        println!("{}", self.format_field(key, value));
    }

    pub fn bullet(&self, item: &str) {
        println!("{}", self.format_bullet(item));
    }

    /// Print a shell command the user can copy
    pub fn command(&self, cmd: &str) {
        println!("{}", self.format_command(cmd));
    }

    fn format_banner(&self) -> String {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        let tagline = "topic -> clarifying questions -> report";
        if self.colored {
            format!(
                "\n   {} {}\n   {}\n",
                "Deep Research".bright_cyan().bold(),
                version.dimmed(),
                tagline.bright_white()
            )
        } else {
            format!("\n   Deep Research {}\n   {}\n", version, tagline)
        }
    }

    fn format_status(&self, status: Status, message: &str) -> String {
        if !self.colored {
            return format!("  {} {}", status.tag(), message);
        }
        match status {
            Status::Ok | Status::Done => format!("  {} {}", "✓".green().bold(), message.green()),
            Status::Note => format!("  {} {}", "•".blue(), message),
            Status::Warn => format!("  {} {}", "!".yellow().bold(), message.yellow()),
            Status::Fail => format!("  {} {}", "✗".red().bold(), message.red()),
            Status::Created => format!("  {} {}", "+".green().bold(), message.bright_white()),
            Status::Skipped => format!("  {} {}", "-".yellow(), message.dimmed()),
            Status::Tip => format!("  {} {}", "›".dimmed(), message.dimmed().italic()),
        }
    }

    fn format_heading(&self, title: &str) -> String {
        if self.colored {
            format!("\n  {}", title.bright_white().bold().underline())
        } else {
            format!("\n  == {} ==", title)
        }
    }

    fn format_subheading(&self, title: &str) -> String {
        if self.colored {
            format!("\n  {}", title.cyan().bold())
        } else {
            format!("\n  -- {} --", title)
        }
    }

    fn format_field(&self, key: &str, value: &str) -> String {
        if self.colored {
            format!("    {:<20} {}", key.dimmed(), value.bright_white())
        } else {
            format!("    {:<20} {}", key, value)
        }
    }

    fn format_bullet(&self, item: &str) -> String {
        if self.colored {
            format!("    {} {}", "•".blue(), item)
        } else {
            format!("    - {}", item)
        }
    }

    fn format_command(&self, cmd: &str) -> String {
        if self.colored {
            format!("      {}", format!("$ {}", cmd).bright_cyan())
        } else {
            format!("      $ {}", cmd)
        }
    }
}
