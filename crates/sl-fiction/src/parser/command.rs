//! Command parsing for player input.

use serde::{Deserialize, Serialize};

/// Direction for movement commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// North.
    North,
    /// South.
    South,
    /// East.
    East,
    /// West.
    West,
    /// Up.
    Up,
    /// Down.
    Down,
    /// Northeast.
    Northeast,
    /// Northwest.
    Northwest,
    /// Southeast.
    Southeast,
    /// Southwest.
    Southwest,
}

impl Direction {
    /// Parse a direction or its abbreviation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "n" | "north" => Some(Self::North),
            "s" | "south" => Some(Self::South),
            "e" | "east" => Some(Self::East),
            "w" | "west" => Some(Self::West),
            "u" | "up" => Some(Self::Up),
            "d" | "down" => Some(Self::Down),
            "ne" | "northeast" => Some(Self::Northeast),
            "nw" | "northwest" => Some(Self::Northwest),
            "se" | "southeast" => Some(Self::Southeast),
            "sw" | "southwest" => Some(Self::Southwest),
            _ => None,
        }
    }

    /// The full lower-case name, as exits are usually labelled.
    pub fn name(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Up => "up",
            Self::Down => "down",
            Self::Northeast => "northeast",
            Self::Northwest => "northwest",
            Self::Southeast => "southeast",
            Self::Southwest => "southwest",
        }
    }
}

/// A parsed player command.
///
/// Noun phrases are kept as typed; resolving them to entities happens
/// against the current scene when the command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Describe the scene, or examine a target.
    Look {
        /// Optional target to examine.
        target: Option<String>,
    },
    /// Take an item.
    Take {
        /// The item phrase.
        item: String,
    },
    /// Drop an item.
    Drop {
        /// The item phrase.
        item: String,
    },
    /// Leave through an exit.
    Go {
        /// The exit label, destination name or direction.
        exit: String,
    },
    /// List inventory.
    Inventory,
    /// Use an item, optionally on a target.
    Use {
        /// The item phrase.
        item: String,
        /// Optional target phrase.
        target: Option<String>,
    },
    /// Give an item to a character.
    Give {
        /// The item phrase.
        item: String,
        /// The recipient, when named.
        recipient: Option<String>,
    },
    /// Combine two inventory items.
    Combine {
        /// First ingredient phrase.
        first: String,
        /// Second ingredient phrase.
        second: String,
    },
    /// Talk to a character.
    Talk {
        /// The character phrase.
        character: String,
    },
    /// Pick a lock.
    Lockpick {
        /// The locked item phrase.
        target: String,
    },
    /// Abandon a pending question.
    Cancel,
    /// Show help.
    Help,
    /// Quit the game.
    Quit,
    /// A verb without the object it needs.
    Incomplete {
        /// The question to put back to the player, e.g. "Take what?".
        prompt: String,
    },
    /// Unknown command.
    Unknown {
        /// The original input.
        input: String,
    },
}

/// Verb synonyms for command parsing.
const MOVE_VERBS: &[&str] = &["go", "move", "walk", "head", "travel", "enter"];
const LOOK_VERBS: &[&str] = &["look", "l"];
const EXAMINE_VERBS: &[&str] = &["examine", "ex", "x", "inspect", "describe", "read"];
const TAKE_VERBS: &[&str] = &["take", "get", "pick", "grab"];
const DROP_VERBS: &[&str] = &["drop", "discard"];
const TALK_VERBS: &[&str] = &["talk", "speak", "chat"];
const USE_VERBS: &[&str] = &["use", "apply"];
const GIVE_VERBS: &[&str] = &["give", "offer", "hand"];
const COMBINE_VERBS: &[&str] = &["combine", "mix", "join"];
const LOCKPICK_VERBS: &[&str] = &["lockpick", "unpick"];
const INVENTORY_VERBS: &[&str] = &["inventory", "inv", "i", "items"];
const HELP_VERBS: &[&str] = &["help", "h", "?", "commands"];
const QUIT_VERBS: &[&str] = &["quit", "q", "bye"];
const CANCEL_VERBS: &[&str] = &["cancel", "nevermind"];

/// Words dropped from the front of a noun phrase.
const ARTICLES: &[&str] = &["the", "a", "an"];

/// Parse a player input string into a command.
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Look { target: None };
    }

    let words: Vec<&str> = input.split_whitespace().collect();
    let verb = words[0].to_lowercase();
    let rest = words.get(1..).unwrap_or(&[]);

    // Check for bare direction
    if let Some(dir) = Direction::parse(&verb).filter(|_| words.len() == 1) {
        return Command::Go {
            exit: dir.name().to_string(),
        };
    }

    let verb = verb.as_str();
    if MOVE_VERBS.contains(&verb) {
        return parse_move(rest);
    }
    if LOOK_VERBS.contains(&verb) {
        return parse_look(rest);
    }
    if EXAMINE_VERBS.contains(&verb) {
        return parse_examine(rest);
    }
    if TAKE_VERBS.contains(&verb) {
        return parse_take(rest);
    }
    if DROP_VERBS.contains(&verb) {
        return parse_drop(rest);
    }
    if TALK_VERBS.contains(&verb) {
        return parse_talk(rest);
    }
    if USE_VERBS.contains(&verb) {
        return parse_use(rest);
    }
    if GIVE_VERBS.contains(&verb) {
        return parse_give(rest);
    }
    if COMBINE_VERBS.contains(&verb) {
        return parse_combine(rest);
    }
    if LOCKPICK_VERBS.contains(&verb) {
        return parse_lockpick(rest);
    }
    if INVENTORY_VERBS.contains(&verb) && rest.is_empty() {
        return Command::Inventory;
    }
    if HELP_VERBS.contains(&verb) {
        return Command::Help;
    }
    if QUIT_VERBS.contains(&verb) && rest.is_empty() {
        return Command::Quit;
    }
    if CANCEL_VERBS.contains(&verb) && rest.is_empty() {
        return Command::Cancel;
    }

    Command::Unknown {
        input: input.to_string(),
    }
}

/// Lower-case a noun phrase and strip a leading article.
pub fn normalize_phrase(phrase: &str) -> String {
    let lower = phrase.trim().to_lowercase();
    let mut words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() > 1 && ARTICLES.contains(&words[0]) {
        words.remove(0);
    }
    words.join(" ")
}

fn phrase(words: &[&str]) -> Option<String> {
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn skip_word<'a, 'b>(words: &'a [&'b str], skip: &[&str]) -> &'a [&'b str] {
    match words.first() {
        Some(first) if skip.iter().any(|s| first.eq_ignore_ascii_case(s)) => &words[1..],
        _ => words,
    }
}

/// Split `words` at the first separator, returning the phrases on both sides.
fn split_on(words: &[&str], separators: &[&str]) -> Option<(String, Option<String>)> {
    match words
        .iter()
        .position(|w| separators.iter().any(|s| w.eq_ignore_ascii_case(s)))
    {
        Some(pos) => Some((phrase(&words[..pos])?, phrase(&words[pos + 1..]))),
        None => Some((phrase(words)?, None)),
    }
}

fn incomplete(prompt: &str) -> Command {
    Command::Incomplete {
        prompt: prompt.to_string(),
    }
}

fn parse_move(rest: &[&str]) -> Command {
    let rest = skip_word(rest, &["to", "through"]);
    match phrase(rest) {
        Some(exit) => match Direction::parse(&exit) {
            Some(dir) => Command::Go {
                exit: dir.name().to_string(),
            },
            None => Command::Go { exit },
        },
        None => incomplete("Go where?"),
    }
}

fn parse_look(rest: &[&str]) -> Command {
    // Skip "at" if present
    let target_words = skip_word(rest, &["at"]);
    Command::Look {
        target: phrase(target_words),
    }
}

fn parse_examine(rest: &[&str]) -> Command {
    match phrase(rest) {
        Some(target) => Command::Look {
            target: Some(target),
        },
        None => incomplete("Examine what?"),
    }
}

fn parse_take(rest: &[&str]) -> Command {
    // "pick lock of X" reads as lockpicking
    if rest.first().is_some_and(|w| w.eq_ignore_ascii_case("lock")) {
        return parse_lockpick(skip_word(&rest[1..], &["of", "on"]));
    }

    // Skip "up" if present (pick up)
    let item_words = skip_word(rest, &["up"]);
    match phrase(item_words) {
        Some(item) => Command::Take { item },
        None => incomplete("Take what?"),
    }
}

fn parse_drop(rest: &[&str]) -> Command {
    match phrase(rest) {
        Some(item) => Command::Drop { item },
        None => incomplete("Drop what?"),
    }
}

fn parse_talk(rest: &[&str]) -> Command {
    // Skip "to" or "with" if present
    let remaining = skip_word(rest, &["to", "with"]);
    match phrase(remaining) {
        Some(character) => Command::Talk { character },
        None => incomplete("Talk to whom?"),
    }
}

fn parse_use(rest: &[&str]) -> Command {
    match split_on(rest, &["on", "with"]) {
        Some((item, target)) => Command::Use { item, target },
        None => incomplete("Use what?"),
    }
}

fn parse_give(rest: &[&str]) -> Command {
    match split_on(rest, &["to"]) {
        Some((item, recipient)) => Command::Give { item, recipient },
        None => incomplete("Give what?"),
    }
}

/// `+` wins over the word separators, so names like "salt and pepper"
/// survive when the player writes `+`. Otherwise "with" is tried before "and".
fn parse_combine(rest: &[&str]) -> Command {
    let joined = rest.join(" ");
    let pair = match joined.split_once('+') {
        Some((first, second)) => both_named(first.trim(), second.trim()),
        None => ["with", "and"]
            .into_iter()
            .find_map(|separator| match split_on(rest, &[separator]) {
                Some((first, Some(second))) => Some((first, second)),
                _ => None,
            }),
    };
    match pair {
        Some((first, second)) => Command::Combine { first, second },
        None => incomplete("Combine what with what?"),
    }
}

fn both_named(first: &str, second: &str) -> Option<(String, String)> {
    (!first.is_empty() && !second.is_empty()).then(|| (first.to_string(), second.to_string()))
}

fn parse_lockpick(rest: &[&str]) -> Command {
    match phrase(rest) {
        Some(target) => Command::Lockpick { target },
        None => incomplete("Pick which lock?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn go(exit: &str) -> Command {
        Command::Go {
            exit: exit.to_string(),
        }
    }

    #[test]
    fn parse_bare_direction() {
        assert_eq!(parse_command("north"), go("north"));
        assert_eq!(parse_command("n"), go("north"));
        assert_eq!(parse_command("sw"), go("southwest"));
    }

    #[test]
    fn parse_go() {
        assert_eq!(parse_command("go north"), go("north"));
        assert_eq!(parse_command("walk e"), go("east"));
        assert_eq!(parse_command("go to the Street"), go("the Street"));
        assert_eq!(
            parse_command("go"),
            Command::Incomplete {
                prompt: "Go where?".to_string()
            }
        );
    }

    #[test]
    fn parse_look_and_examine() {
        assert_eq!(parse_command("look"), Command::Look { target: None });
        assert_eq!(parse_command("l"), Command::Look { target: None });
        assert_eq!(
            parse_command("look at the desk"),
            Command::Look {
                target: Some("the desk".to_string())
            }
        );
        assert_eq!(
            parse_command("x desk"),
            Command::Look {
                target: Some("desk".to_string())
            }
        );
    }

    #[test]
    fn parse_take() {
        assert_eq!(
            parse_command("pick up the brass key"),
            Command::Take {
                item: "the brass key".to_string()
            }
        );
        assert_eq!(
            parse_command("take"),
            Command::Incomplete {
                prompt: "Take what?".to_string()
            }
        );
    }

    #[test]
    fn parse_use_with_target() {
        assert_eq!(
            parse_command("use key"),
            Command::Use {
                item: "key".to_string(),
                target: None
            }
        );
        assert_eq!(
            parse_command("use brass key on chest"),
            Command::Use {
                item: "brass key".to_string(),
                target: Some("chest".to_string())
            }
        );
    }

    #[test]
    fn parse_give() {
        assert_eq!(
            parse_command("give locket to informant"),
            Command::Give {
                item: "locket".to_string(),
                recipient: Some("informant".to_string())
            }
        );
        assert_eq!(
            parse_command("give locket"),
            Command::Give {
                item: "locket".to_string(),
                recipient: None
            }
        );
    }

    #[test]
    fn parse_combine_separators() {
        let expected = Command::Combine {
            first: "rag".to_string(),
            second: "alcohol".to_string(),
        };
        assert_eq!(parse_command("combine rag + alcohol"), expected);
        assert_eq!(parse_command("combine rag with alcohol"), expected);
        assert_eq!(parse_command("mix rag and alcohol"), expected);
        assert_eq!(parse_command("combine rag+alcohol"), expected);
        assert_eq!(parse_command("combine rag +alcohol"), expected);
        assert_eq!(
            parse_command("combine salt and pepper + lamp"),
            Command::Combine {
                first: "salt and pepper".to_string(),
                second: "lamp".to_string(),
            }
        );
        assert_eq!(
            parse_command("combine salt and pepper with lamp"),
            Command::Combine {
                first: "salt and pepper".to_string(),
                second: "lamp".to_string(),
            }
        );
        assert_eq!(
            parse_command("combine rag +"),
            Command::Incomplete {
                prompt: "Combine what with what?".to_string()
            }
        );
        assert_eq!(
            parse_command("combine rag"),
            Command::Incomplete {
                prompt: "Combine what with what?".to_string()
            }
        );
    }

    #[test]
    fn parse_lockpick() {
        let expected = Command::Lockpick {
            target: "chest".to_string(),
        };
        assert_eq!(parse_command("lockpick chest"), expected);
        assert_eq!(parse_command("pick lock of chest"), expected);
    }

    #[test]
    fn parse_talk() {
        assert_eq!(
            parse_command("talk to Informant"),
            Command::Talk {
                character: "Informant".to_string()
            }
        );
    }

    #[test]
    fn parse_simple_verbs() {
        assert_eq!(parse_command("inventory"), Command::Inventory);
        assert_eq!(parse_command("i"), Command::Inventory);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("cancel"), Command::Cancel);
    }

    #[test]
    fn parse_unknown() {
        assert_eq!(
            parse_command("dance wildly"),
            Command::Unknown {
                input: "dance wildly".to_string()
            }
        );
    }

    #[test]
    fn empty_input_is_look() {
        assert_eq!(parse_command("   "), Command::Look { target: None });
    }

    #[test]
    fn normalize_strips_articles() {
        assert_eq!(normalize_phrase("  The Brass KEY "), "brass key");
        assert_eq!(normalize_phrase("a"), "a");
    }
}
