use clap::Parser;

const USAGE: &str = "\
'nb <some text>' to make a note.
'nb' to list, search, and edit notes.
'nb -s|--search <query>' to start out with a query.
'nb --reindex' to re-index notes after they've been changed externally.";

/// nb - a very simple note-taking program
#[derive(Parser, Debug)]
#[command(name = "nb")]
#[command(about = "nb is a very simple note-taking program.", long_about = None)]
#[command(after_help = USAGE)]
#[command(version)]
pub struct Cli {
    /// Rebuild the index from the notes on disk
    #[arg(long, conflicts_with_all = ["search", "text"])]
    pub reindex: bool,

    /// Open the interactive console with a query already typed
    #[arg(short, long, value_name = "QUERY", num_args = 0.., conflicts_with = "text")]
    pub search: Option<Vec<String>>,

    /// Text of a new note (words are joined with single spaces)
    #[arg(value_name = "TEXT", trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

/// What the invocation asks nb to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Console { query: String },
    Reindex,
    Create { text: String },
}

impl Cli {
    pub fn command(&self) -> Command {
        if self.reindex {
            Command::Reindex
        } else if let Some(words) = &self.search {
            Command::Console {
                query: words.join(" "),
            }
        } else if !self.text.is_empty() {
            Command::Create {
                text: self.text.join(" "),
            }
        } else {
            Command::Console {
                query: String::new(),
            }
        }
    }
}
