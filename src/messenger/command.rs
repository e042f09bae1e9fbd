// Text command parsing
//
// A message is `<command> [argument]`: the command is the first word,
// lower-cased with punctuation dropped, and the argument is everything after
// the first space, kept verbatim.

use crate::meme::CaptionPosition;

/// A parsed user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `top <text>` / `bottom <text>`; no text clears the caption
    Caption {
        position: CaptionPosition,
        text: Option<String>,
    },
    /// `stock` lists the library, `stock <id>` selects an image
    Stock(Option<String>),
    Help,
    Hello,
    Hi,
    Unknown(String),
}

/// Split a message into its command word and optional argument
pub fn split_command(input: &str) -> (String, Option<&str>) {
    let input = input.trim();
    match input.find(' ') {
        Some(index) if index > 0 => (input[..index].to_lowercase(), Some(&input[index + 1..])),
        _ => (input.to_lowercase(), None),
    }
}

/// Keep only word characters: ASCII letters, digits and underscore
fn normalize_command(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

pub fn parse_command(input: &str) -> Command {
    let (word, argument) = split_command(input);
    let command = normalize_command(&word);
    let argument = argument.filter(|a| !a.is_empty()).map(str::to_string);

    if let Some(position) = CaptionPosition::from_key(&command) {
        return Command::Caption {
            position,
            text: argument,
        };
    }

    match command.as_str() {
        "stock" => Command::Stock(argument),
        "help" => Command::Help,
        "hello" => Command::Hello,
        "hi" => Command::Hi,
        _ => Command::Unknown(command),
    }
}
