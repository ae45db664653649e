use thiserror::Error;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Register { username: String, password: String },
    Login { username: String, password: String },
    Guest,
    Logout,
    /// Fetch a fresh batch.
    Next,
    /// Switch the mode token and fetch a batch for it.
    Mode(String),
    /// Switch the batch size and fetch a batch of that size.
    Count(usize),
    /// Answer exercise `index` (zero-based).
    Answer { index: usize, value: i64 },
    /// Answers for the batch in order, starting at the first exercise.
    Answers(Vec<i64>),
    Check,
    Repeat,
    Show,
    Profile,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`; type `help`")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("`{0}` is not a whole number")]
    NotANumber(String),
}

pub const HELP: &str = "\
commands:
  register <name> <password>   create an account and sign in
  login <name> <password>      sign in
  guest                        play without saving progress
  logout                       sign out
  next                         start a new batch
  mode <token>                 switch mode (table:<n>, mixed:<n>, easy, hard)
  count <n>                    switch the number of exercises per batch
  <n> <answer>                 answer exercise n
  = <a1> <a2> ...              answer exercises in order
  check                        grade the batch
  repeat                       retry the same batch
  show                         print the batch
  profile                      show level, score and achievements
  quit";

impl Command {
    /// Returns `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match head {
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "register" => {
                let (username, password) = credentials(&rest, "register <name> <password>")?;
                Self::Register { username, password }
            }
            "login" => {
                let (username, password) = credentials(&rest, "login <name> <password>")?;
                Self::Login { username, password }
            }
            "guest" => Self::Guest,
            "logout" => Self::Logout,
            "next" | "new" => Self::Next,
            "mode" => match rest[..] {
                [token] => Self::Mode(token.to_owned()),
                _ => return Err(CommandError::Usage("mode <token>")),
            },
            "count" => match rest[..] {
                [n] => match n.parse::<usize>() {
                    Ok(count) if count > 0 => Self::Count(count),
                    Ok(_) => return Err(CommandError::Usage("count <n>, n >= 1")),
                    Err(_) => return Err(CommandError::NotANumber(n.to_owned())),
                },
                _ => return Err(CommandError::Usage("count <n>")),
            },
            "check" => Self::Check,
            "repeat" => Self::Repeat,
            "show" => Self::Show,
            "profile" => Self::Profile,
            "=" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("= <a1> <a2> ..."));
                }
                Self::Answers(rest.iter().map(|w| number(w)).collect::<Result<_, _>>()?)
            }
            other => match other.parse::<usize>() {
                Ok(n) if n > 0 => {
                    let [value] = rest[..] else {
                        return Err(CommandError::Usage("<n> <answer>"));
                    };
                    Self::Answer {
                        index: n - 1,
                        value: number(value)?,
                    }
                }
                _ => return Err(CommandError::Unknown(other.to_owned())),
            },
        };
        Ok(Some(command))
    }
}

fn credentials(rest: &[&str], usage: &'static str) -> Result<(String, String), CommandError> {
    match rest {
        [username, password] => Ok(((*username).to_owned(), (*password).to_owned())),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn number(word: &str) -> Result<i64, CommandError> {
    word.parse()
        .map_err(|_| CommandError::NotANumber(word.to_owned()))
}
