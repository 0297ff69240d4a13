//! Handlers for the everyday verbs.

use sl_core::{Exit, Item, slugify};

use super::context::{Context, Halt, Scope, Step};
use crate::error::CommandError;
use crate::parser::{Direction, EntityRef, normalize_phrase};
use crate::puzzle::{self, Combination};
use crate::render;
use crate::state::{Owner, Pending};

pub(crate) const HELP: &str = "\
Commands:
  look                        describe where you are
  look at <thing>             examine something (also: examine, x)
  take <item>, drop <item>    pick up or put down an item
  go <exit>                   leave; a bare exit name or direction works too
  inventory (or i)            list what you carry
  use <item> [on <target>]    use an item, for instance a key on a lock
  give <item> [to <someone>]  hand an item over
  combine <item> + <item>     make something new from two items
  lockpick <item>             try to pick a lock
  talk to <someone>           start a conversation
  help, quit";

pub(crate) fn look(ctx: &mut Context<'_>) -> Step<()> {
    let text = render::scene(ctx.world, &ctx.state);
    ctx.say(text);
    Ok(())
}

pub(crate) fn examine(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    match ctx.resolve(phrase, Scope::Visible)? {
        EntityRef::Character(id) => {
            let character = ctx.character(&id)?;
            if character.description.is_empty() {
                ctx.say(format!("You see nothing special about {}.", character.name));
            } else {
                ctx.say(format!("{}: {}", character.name, character.description));
            }
            let carried = ctx.state.items.held_by(&Owner::Character(id));
            if !carried.is_empty() {
                ctx.say(format!(
                    "{} is carrying: {}.",
                    character.name,
                    render::names(ctx.world, &carried)
                ));
            }
        }
        EntityRef::Item(id) => {
            let item = ctx.item(&id)?;
            ctx.say(item.examine_text().map_or_else(
                || format!("You see nothing special about the {}.", item.name),
                str::to_string,
            ));
            if item.is_container() {
                if ctx.state.is_locked(ctx.world, &id) {
                    ctx.say(format!("The {} is locked.", item.name));
                } else {
                    let inside = ctx.state.items.held_by(&Owner::Contained(id.clone()));
                    ctx.state.revealed.insert(id);
                    if inside.is_empty() {
                        ctx.say("It is empty.");
                    } else {
                        ctx.say(format!("It contains: {}.", render::names(ctx.world, &inside)));
                    }
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn take(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    let item = match ctx.resolve_item(phrase, Scope::Scene) {
        Ok(item) => item,
        Err(Halt::Failed(CommandError::NotFound {
            phrase: typed,
            suggestion,
        })) => {
            let err = match ctx.named_item(phrase) {
                Some(known) if ctx.state.has_item(&known.id) => {
                    CommandError::AlreadyCarrying(known.name.clone())
                }
                Some(known) => CommandError::NotPresent(known.name.clone()),
                None => CommandError::NotFound {
                    phrase: typed,
                    suggestion,
                },
            };
            return Err(err.into());
        }
        Err(halt) => return Err(halt),
    };

    if !item.movable {
        return Err(CommandError::NotMovable(item.name.clone()).into());
    }
    ctx.state.items.place(item.id.clone(), Owner::Inventory);
    ctx.say(format!("Taken: {}.", item.name));
    Ok(())
}

pub(crate) fn drop_item(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    let item = carried(ctx, phrase)?;
    let here = Owner::Scene(ctx.state.current_scene.clone());
    ctx.state.items.place(item.id.clone(), here);
    ctx.say(format!("Dropped: {}.", item.name));
    Ok(())
}

/// Resolve an inventory item, reporting "not carrying" rather than "not here".
fn carried<'a>(ctx: &Context<'a>, phrase: &str) -> Step<&'a Item> {
    match ctx.resolve_item(phrase, Scope::Inventory) {
        Err(Halt::Failed(CommandError::NotFound { .. })) => {
            let name = ctx
                .named_item(phrase)
                .map_or_else(|| normalize_phrase(phrase), |i| i.name.clone());
            Err(CommandError::NotCarrying(name).into())
        }
        other => other,
    }
}

/// The exit of the current scene that `phrase` names: its label, a direction
/// abbreviation, or the destination's name.
pub(crate) fn find_exit<'a>(ctx: &Context<'a>, phrase: &str) -> Step<Option<&'a Exit>> {
    let scene = ctx.scene()?;
    let wanted = normalize_phrase(phrase);
    let direction = Direction::parse(&wanted);
    let exit = scene.exits.iter().find(|exit| {
        exit.matches(phrase)
            || exit.matches(&wanted)
            || direction.is_some_and(|d| Direction::parse(&exit.label) == Some(d))
            || exit.destination.as_str() == slugify(&wanted)
            || ctx
                .world
                .scene(&exit.destination)
                .is_some_and(|s| s.name.eq_ignore_ascii_case(&wanted))
    });
    Ok(exit)
}

pub(crate) fn go(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    let exit = find_exit(ctx, phrase)?
        .ok_or_else(|| CommandError::NoExit(phrase.trim().to_string()))?;

    if let Some(required) = exit.requires.as_ref().filter(|r| !ctx.state.has_item(r)) {
        let message = exit.message.clone().unwrap_or_else(|| {
            format!(
                "You need the {} to go that way.",
                render::item_name(ctx.world, required)
            )
        });
        return Err(CommandError::Gated(message).into());
    }
    if exit.blocked {
        let message = exit
            .message
            .clone()
            .unwrap_or_else(|| "You can't go that way.".to_string());
        return Err(CommandError::Gated(message).into());
    }

    ctx.state.current_scene = exit.destination.clone();
    tracing::debug!(scene = %exit.destination, "entered scene");
    look(ctx)
}

/// Input that matched no verb may still be the name of an exit.
pub(crate) fn go_bare(ctx: &mut Context<'_>, input: &str) -> Step<()> {
    match find_exit(ctx, input)? {
        Some(_) => go(ctx, input),
        None => Err(CommandError::UnknownCommand(input.to_string()).into()),
    }
}

pub(crate) fn inventory(ctx: &mut Context<'_>) -> Step<()> {
    let carried = ctx.state.inventory();
    if carried.is_empty() {
        ctx.say("You're not carrying anything.");
        return Ok(());
    }
    ctx.say("You are carrying:");
    for id in &carried {
        let line = format!("  - {}", render::item_name(ctx.world, id));
        ctx.say(line);
    }
    Ok(())
}

pub(crate) fn use_item(ctx: &mut Context<'_>, phrase: &str, target: Option<&str>) -> Step<()> {
    let item = ctx.resolve_item(phrase, Scope::Reachable)?;
    let Some(target) = target else {
        return match item.use_message() {
            Some(message) => {
                ctx.say(message);
                Ok(())
            }
            None => Err(CommandError::CannotUse(item.name.clone()).into()),
        };
    };

    let target = ctx.resolve_item(target, Scope::Reachable)?;
    let outcome = puzzle::use_on(puzzle::DEFAULT_RULES, ctx.world, &ctx.state, item, target)?;
    outcome.apply(&mut ctx.state);
    ctx.say(outcome.message);
    Ok(())
}

pub(crate) fn give(ctx: &mut Context<'_>, phrase: &str, recipient: Option<&str>) -> Step<()> {
    let item = carried(ctx, phrase)?;
    let character = match recipient {
        Some(name) => ctx.resolve_character(name)?,
        None => {
            // With nobody named, the only person present is the recipient.
            let present = ctx.visible(Scope::Characters);
            let chosen = match ctx.bindings.get("").filter(|b| present.contains(b)) {
                Some(bound) => bound.clone(),
                None => match present.len() {
                    0 => return Err(CommandError::NoRecipient.into()),
                    1 => present[0].clone(),
                    _ => {
                        return Err(Halt::Ambiguous {
                            phrase: String::new(),
                            candidates: present,
                        });
                    }
                },
            };
            match chosen {
                EntityRef::Character(id) => ctx.character(&id)?,
                EntityRef::Item(_) => return Err(CommandError::NoRecipient.into()),
            }
        }
    };

    if !character.accepts(&item.id) {
        return Err(CommandError::NotAccepted {
            character: character.name.clone(),
            item: item.name.clone(),
        }
        .into());
    }
    ctx.state
        .items
        .place(item.id.clone(), Owner::Character(character.id.clone()));
    ctx.state.set_flag(format!("given:{}", item.id));
    ctx.say(
        character
            .on_give
            .clone()
            .unwrap_or_else(|| format!("{} takes the {}.", character.name, item.name)),
    );
    Ok(())
}

pub(crate) fn combine(ctx: &mut Context<'_>, first: &str, second: &str) -> Step<()> {
    let first = carried(ctx, first)?;
    let second = carried(ctx, second)?;
    match puzzle::combine(ctx.world, &mut ctx.state, &first.id, &second.id)? {
        Combination::Made(message) => ctx.say(message),
        Combination::Choose(candidates) => {
            ctx.say(format!(
                "Combining the {} and the {} could make: {}.",
                first.name,
                second.name,
                render::names(ctx.world, &candidates)
            ));
            ctx.state.pending = Some(Pending::Recipe {
                first: first.id.clone(),
                second: second.id.clone(),
                candidates,
            });
        }
    }
    Ok(())
}

pub(crate) fn lockpick(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    let target = ctx.resolve_item(phrase, Scope::Reachable)?;
    let outcome = puzzle::pick_lock(ctx.world, &ctx.state, target)?;
    outcome.apply(&mut ctx.state);
    ctx.say(outcome.message);
    Ok(())
}
