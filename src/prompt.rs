use std::io::{self, BufRead, Write};

/// Interactive terminal seam. Everything the user sees or types goes through here.
pub trait Prompter {
    /// Ask for a line of text. An empty answer yields `default` when one is given.
    fn ask(&mut self, prompt: &str, default: Option<&str>, hint: Option<&str>) -> io::Result<String>;

    /// Ask for a secret without echoing it.
    fn ask_secret(&mut self, prompt: &str) -> io::Result<String>;

    /// Print a banner, optionally followed by a body.
    fn show(&mut self, title: &str, body: Option<&str>);

    /// Print a single plain line.
    fn line(&mut self, text: &str);
}

/// Stdin/stdout prompter used by the binary.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str, default: Option<&str>, hint: Option<&str>) -> io::Result<String> {
        let mut out = io::stdout();
        match (default, hint) {
            (Some(d), Some(h)) => writeln!(out, "{}: [{}]({})", prompt, d, h)?,
            (Some(d), None) => writeln!(out, "{}: [{}]", prompt, d)?,
            (None, _) => writeln!(out, "{}", prompt)?,
        }
        out.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(resolve_answer(&answer, default))
    }

    fn ask_secret(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(format!("{} ", prompt.trim_end()))
    }

    fn show(&mut self, title: &str, body: Option<&str>) {
        println!("{}", banner(title, body));
    }

    fn line(&mut self, text: &str) {
        println!("{}", text);
    }
}

fn resolve_answer(answer: &str, default: Option<&str>) -> String {
    let trimmed = answer.trim();
    match default {
        Some(d) if trimmed.is_empty() => d.to_string(),
        _ => trimmed.to_string(),
    }
}

fn banner(title: &str, body: Option<&str>) -> String {
    let rule = "==================";
    let mut text = format!("{}\n{}\n{}\n", rule, title, rule);
    if let Some(body) = body {
        text.push_str(body);
        text.push('\n');
    }
    text
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::io;

    use super::{Prompter, resolve_answer};

    /// Replays canned answers and records everything shown to the user.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        /// Every prompt asked, in order, with its default.
        pub asked: Vec<(String, Option<String>)>,
        /// Banner titles and plain lines, in display order.
        pub shown: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(Into::into).collect(),
                ..Self::default()
            }
        }

        fn next_answer(&mut self, prompt: &str) -> io::Result<String> {
            self.answers.pop_front().ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, format!("no scripted answer for '{}'", prompt))
            })
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, prompt: &str, default: Option<&str>, _hint: Option<&str>) -> io::Result<String> {
            self.asked.push((prompt.to_string(), default.map(str::to_string)));
            let answer = self.next_answer(prompt)?;
            Ok(resolve_answer(&answer, default))
        }

        fn ask_secret(&mut self, prompt: &str) -> io::Result<String> {
            self.asked.push((prompt.to_string(), None));
            self.next_answer(prompt)
        }

        fn show(&mut self, title: &str, _body: Option<&str>) {
            self.shown.push(title.to_string());
        }

        fn line(&mut self, text: &str) {
            self.shown.push(text.to_string());
        }
    }
}
