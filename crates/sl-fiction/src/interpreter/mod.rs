//! The command interpreter: one line of input in, text and a new state out.
//!
//! Every command runs against a clone of the state. If the command fails the
//! clone is thrown away, so a refused command never leaves the story half
//! changed.

pub(crate) mod actions;
pub(crate) mod context;

use std::collections::BTreeMap;

use sl_core::World;

use crate::dialogue;
use crate::error::CommandError;
use crate::parser::{AliasIndex, Command, EntityRef, normalize_phrase, parse_command};
use crate::puzzle;
use crate::render;
use crate::state::{Pending, WorldState};
use context::{Context, Halt, Step};

/// What one command produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Text for the player.
    pub output: String,
    /// The state after the command.
    pub state: WorldState,
}

/// Runs commands against a world.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'w> {
    world: &'w World,
    aliases: &'w AliasIndex,
}

impl<'w> Interpreter<'w> {
    /// Create an interpreter over `world`, using a prebuilt alias index.
    pub fn new(world: &'w World, aliases: &'w AliasIndex) -> Self {
        Self { world, aliases }
    }

    /// Run one line of input against `state`.
    ///
    /// If the state is waiting on a question, the input answers it;
    /// otherwise it is parsed as a command.
    pub fn execute(&self, state: &WorldState, input: &str) -> Turn {
        match state.pending.clone() {
            Some(pending) => self.answer(state, pending, input),
            None => {
                let command = parse_command(input);
                tracing::debug!(?command, "dispatching command");
                self.attempt(state, Some(&command), BTreeMap::new(), |ctx| {
                    dispatch(ctx, &command)
                })
            }
        }
    }

    fn answer(&self, state: &WorldState, pending: Pending, input: &str) -> Turn {
        if parse_command(input) == Command::Cancel {
            return cancel(state, &pending);
        }
        let reply = normalize_phrase(input);
        let world = self.world;

        match pending {
            Pending::Dialogue { character, node } => {
                if dialogue::LEAVE_WORDS.contains(&reply.as_str()) {
                    return self.attempt(state, None, BTreeMap::new(), |ctx| {
                        dialogue::end(ctx);
                        Ok(())
                    });
                }
                match reply.parse::<usize>() {
                    Ok(answer) => self.attempt(state, None, BTreeMap::new(), |ctx| {
                        dialogue::choose(ctx, &character, &node, answer)
                    }),
                    Err(_) => refuse(state, CommandError::InvalidChoice(input.trim().to_string())),
                }
            }
            Pending::Disambiguation {
                command,
                phrase,
                candidates,
                mut bindings,
            } => {
                let Some(chosen) = pick(&reply, &candidates, |c| c.name(world).to_string()) else {
                    return refuse(state, CommandError::InvalidChoice(input.trim().to_string()));
                };
                bindings.insert(normalize_phrase(&phrase), chosen.clone());
                let mut resumed = state.clone();
                resumed.pending = None;
                self.attempt(&resumed, Some(&command), bindings, |ctx| {
                    dispatch(ctx, &command)
                })
            }
            Pending::Recipe {
                first,
                second,
                candidates,
            } => {
                let chosen = pick(&reply, &candidates, |c| {
                    render::item_name(world, c).to_string()
                })
                .or_else(|| candidates.iter().find(|c| c.as_str() == reply));
                let Some(result) = chosen else {
                    return refuse(state, CommandError::InvalidChoice(input.trim().to_string()));
                };
                let mut resumed = state.clone();
                resumed.pending = None;
                self.attempt(&resumed, None, BTreeMap::new(), |ctx| {
                    let message =
                        puzzle::produce(ctx.world, &mut ctx.state, &first, &second, result)?;
                    ctx.say(message);
                    Ok(())
                })
            }
        }
    }

    /// Run `step` on a working copy and turn its outcome into a [`Turn`].
    fn attempt<F>(
        &self,
        state: &WorldState,
        command: Option<&Command>,
        bindings: BTreeMap<String, EntityRef>,
        step: F,
    ) -> Turn
    where
        F: FnOnce(&mut Context<'w>) -> Step<()>,
    {
        let mut ctx = Context::new(self.world, self.aliases, state.clone(), bindings.clone());
        match step(&mut ctx) {
            Ok(()) => {
                let (mut next, output) = ctx.into_parts();
                next.turns += 1;
                Turn {
                    output,
                    state: next,
                }
            }
            Err(Halt::Failed(err)) => {
                tracing::debug!(%err, "command refused");
                refuse(state, err)
            }
            Err(Halt::Ambiguous { phrase, candidates }) => {
                let Some(command) = command else {
                    return refuse(state, CommandError::InvalidChoice(phrase));
                };
                let output = if phrase.is_empty() {
                    "There is more than one possibility.".to_string()
                } else {
                    format!("There is more than one \"{phrase}\" here.")
                };
                let mut next = state.clone();
                next.pending = Some(Pending::Disambiguation {
                    command: command.clone(),
                    phrase,
                    candidates,
                    bindings,
                });
                Turn {
                    output,
                    state: next,
                }
            }
        }
    }
}

/// Run one line of input against `state`, building the alias index on the
/// spot. Prefer [`Interpreter`] when running many commands.
pub fn execute(world: &World, state: &WorldState, input: &str) -> Turn {
    let aliases = AliasIndex::build(world);
    Interpreter::new(world, &aliases).execute(state, input)
}

fn dispatch(ctx: &mut Context<'_>, command: &Command) -> Step<()> {
    match command {
        Command::Look { target: None } => actions::look(ctx),
        Command::Look {
            target: Some(target),
        } => actions::examine(ctx, target),
        Command::Take { item } => actions::take(ctx, item),
        Command::Drop { item } => actions::drop_item(ctx, item),
        Command::Go { exit } => actions::go(ctx, exit),
        Command::Inventory => actions::inventory(ctx),
        Command::Use { item, target } => actions::use_item(ctx, item, target.as_deref()),
        Command::Give { item, recipient } => actions::give(ctx, item, recipient.as_deref()),
        Command::Combine { first, second } => actions::combine(ctx, first, second),
        Command::Talk { character } => dialogue::talk(ctx, character),
        Command::Lockpick { target } => actions::lockpick(ctx, target),
        Command::Cancel => Err(CommandError::NothingPending.into()),
        Command::Help => {
            ctx.say(actions::HELP);
            Ok(())
        }
        Command::Quit => {
            ctx.say("Goodbye.");
            Ok(())
        }
        Command::Incomplete { prompt } => Err(CommandError::Incomplete(prompt.clone()).into()),
        Command::Unknown { input } => actions::go_bare(ctx, input),
    }
}

fn cancel(state: &WorldState, pending: &Pending) -> Turn {
    let mut next = state.clone();
    next.pending = None;
    let output = match pending {
        Pending::Dialogue { .. } => "The conversation ends.",
        Pending::Disambiguation { .. } | Pending::Recipe { .. } => "Never mind.",
    };
    Turn {
        output: output.to_string(),
        state: next,
    }
}

fn refuse(state: &WorldState, err: CommandError) -> Turn {
    Turn {
        output: err.to_string(),
        state: state.clone(),
    }
}

/// The candidate a reply picks: a 1-based number or an exact name.
fn pick<'c, T>(reply: &str, candidates: &'c [T], name: impl Fn(&T) -> String) -> Option<&'c T> {
    if let Ok(number) = reply.parse::<usize>() {
        return number.checked_sub(1).and_then(|i| candidates.get(i));
    }
    let mut named = candidates
        .iter()
        .filter(|c| normalize_phrase(&name(c)) == reply);
    match (named.next(), named.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}
