//! Line-oriented prompts over stdin.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub struct Prompt {
    lines: Lines<BufReader<Stdin>>,
    closed: bool,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            closed: false,
        }
    }

    /// True once stdin has hit end of input.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Print `label` and read one trimmed line. End of input reads as "".
    pub async fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        print!("{label}: ");
        std::io::stdout().flush()?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => {
                self.closed = true;
                println!();
                Ok(String::new())
            }
        }
    }

    /// Like [`Prompt::ask`], but an empty answer becomes `None`.
    pub async fn ask_optional(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        let answer = self.ask(label).await?;
        Ok((!answer.is_empty()).then_some(answer))
    }

    /// Show a numbered menu and return the picked index. `0` and an empty
    /// answer both mean "back".
    pub async fn choose(&mut self, title: &str, options: &[&str]) -> anyhow::Result<Option<usize>> {
        println!();
        println!("== {title} ==");
        for (i, option) in options.iter().enumerate() {
            println!("{:>3}) {option}", i + 1);
        }
        println!("  0) Back");

        loop {
            let answer = self.ask("Choice").await?;
            if answer.is_empty() || answer == "0" {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => println!("Pick a number between 0 and {}", options.len()),
            }
        }
    }

    /// Read a JSON document typed on one line, or from a file when the
    /// answer starts with `@`.
    pub async fn json(&mut self, label: &str) -> anyhow::Result<Value> {
        let answer = self.ask(&format!("{label} (JSON, or @path/to/file.json)")).await?;
        parse_json_answer(&answer).await
    }

    /// Read a positive integer id.
    pub async fn id(&mut self, label: &str) -> anyhow::Result<i64> {
        let answer = self.ask(label).await?;
        answer
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .with_context(|| format!("'{answer}' is not a valid id"))
    }
}

async fn parse_json_answer(answer: &str) -> anyhow::Result<Value> {
    let text = match answer.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(Path::new(path.trim()))
            .await
            .with_context(|| format!("Could not read {path}"))?,
        None => answer.to_string(),
    };
    serde_json::from_str(&text).context("Input is not valid JSON")
}
