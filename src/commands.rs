//! Shell command parsing.
//!
//! Lines starting with a backslash are commands; anything else is a search
//! term. Row arguments are 1-based positions in the last table printed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login,
    Register,
    Google(String),
    Logout,
    WhoAmI,

    Search(String),
    Page(u32),
    Next,
    Prev,
    /// `None` clears the category filter
    Category(Option<String>),

    Like(usize),
    View(usize),
    Approve(usize),
    Delete(usize),
    Edit(usize),
    Submit,
    Pending(u32),

    Collections,
    CollectionNew(String),
    CollectionAdd { folder: usize, row: usize },
    CollectionRemove { folder: usize, listing_id: String },
    CollectionDelete(usize),

    Profile,
    ProfileEdit,
    Avatar(String),
    Stats,
    Contact,

    Logs(usize),
    Help,
    Clear,
    Export(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command: \\{0} (type \\help for a list)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Names offered by tab completion
pub const COMMAND_NAMES: &[&str] = &[
    "\\login",
    "\\register",
    "\\google",
    "\\logout",
    "\\whoami",
    "search",
    "\\page",
    "\\next",
    "\\prev",
    "\\category",
    "\\like",
    "\\view",
    "\\approve",
    "\\delete",
    "\\edit",
    "\\submit",
    "\\pending",
    "\\collections",
    "\\collection",
    "\\profile",
    "\\avatar",
    "\\stats",
    "\\contact",
    "\\logs",
    "\\help",
    "\\clear",
    "\\export",
    "\\quit",
];

const DEFAULT_LOG_LINES: usize = 50;

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('\\') else {
        let term = match line.split_once(char::is_whitespace) {
            Some(("search", term)) => term.trim(),
            _ if line == "search" => "",
            _ => line,
        };
        return Ok(Some(Command::Search(term.to_string())));
    };

    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "login" => Command::Login,
        "register" => Command::Register,
        "google" => Command::Google(required(args, "\\google <credential>")?.to_string()),
        "logout" => Command::Logout,
        "whoami" => Command::WhoAmI,

        "search" | "s" => Command::Search(args.to_string()),
        "page" => Command::Page(number(args, "\\page <n>")?),
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "category" => match required(args, "\\category <name|all>")? {
            all if all.eq_ignore_ascii_case("all") => Command::Category(None),
            category => Command::Category(Some(category.to_string())),
        },

        "like" => Command::Like(row(args, "\\like <row>")?),
        "view" | "open" => Command::View(row(args, "\\view <row>")?),
        "approve" => Command::Approve(row(args, "\\approve <row>")?),
        "delete" => Command::Delete(row(args, "\\delete <row>")?),
        "edit" => Command::Edit(row(args, "\\edit <row>")?),
        "submit" => Command::Submit,
        "pending" => {
            if args.is_empty() {
                Command::Pending(1)
            } else {
                Command::Pending(number(args, "\\pending [page]")?)
            }
        }

        "collections" => Command::Collections,
        "collection" => parse_collection(args)?,

        "profile" => match args {
            "" => Command::Profile,
            "edit" => Command::ProfileEdit,
            _ => return Err(ParseError::Usage("\\profile [edit]")),
        },
        "avatar" => Command::Avatar(required(args, "\\avatar <image file>")?.to_string()),
        "stats" => Command::Stats,
        "contact" => Command::Contact,

        "logs" => {
            if args.is_empty() {
                Command::Logs(DEFAULT_LOG_LINES)
            } else {
                Command::Logs(number(args, "\\logs [count]")? as usize)
            }
        }
        "help" | "h" | "?" => Command::Help,
        "clear" => Command::Clear,
        "export" => Command::Export(required(args, "\\export <file.csv>")?.to_string()),
        "quit" | "q" | "exit" => Command::Quit,

        other => return Err(ParseError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

fn parse_collection(args: &str) -> Result<Command, ParseError> {
    const USAGE: &str =
        "\\collection new <name> | add <folder> <row> | remove <folder> <listing-id> | delete <folder>";

    let mut parts = args.split_whitespace();
    match parts.next() {
        Some("new") => {
            let name = args["new".len()..].trim();
            Ok(Command::CollectionNew(required(name, USAGE)?.to_string()))
        }
        Some("add") => {
            let folder = row(parts.next().unwrap_or(""), USAGE)?;
            let row = row(parts.next().unwrap_or(""), USAGE)?;
            Ok(Command::CollectionAdd { folder, row })
        }
        Some("remove") => {
            let folder = row(parts.next().unwrap_or(""), USAGE)?;
            let listing_id = required(parts.next().unwrap_or(""), USAGE)?;
            Ok(Command::CollectionRemove {
                folder,
                listing_id: listing_id.to_string(),
            })
        }
        Some("delete") => Ok(Command::CollectionDelete(row(
            parts.next().unwrap_or(""),
            USAGE,
        )?)),
        _ => Err(ParseError::Usage(USAGE)),
    }
}

fn required<'a>(args: &'a str, usage: &'static str) -> Result<&'a str, ParseError> {
    if args.is_empty() {
        Err(ParseError::Usage(usage))
    } else {
        Ok(args)
    }
}

fn number(args: &str, usage: &'static str) -> Result<u32, ParseError> {
    match args.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn row(args: &str, usage: &'static str) -> Result<usize, ParseError> {
    number(args, usage).map(|n| n as usize)
}
