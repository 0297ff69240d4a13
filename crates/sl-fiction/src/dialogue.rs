//! The dialogue engine.
//!
//! A conversation is a cursor moving over a character's node graph. Each
//! answer is one step: apply the choice's effects, then either show the
//! next node and wait, or end. Nothing recurses, so a `goto` back to an
//! earlier node is just another edge.

use sl_core::{Character, CharacterId, DialogueGraph, Effect, NodeId};

use crate::error::CommandError;
use crate::interpreter::actions::look;
use crate::interpreter::context::{Context, Step};
use crate::render;
use crate::state::{Owner, Pending};

/// Inputs that leave a conversation.
pub const LEAVE_WORDS: &[&str] = &["0", "e", "exit", "leave", "bye"];

/// Start talking to the character `phrase` names.
pub(crate) fn talk(ctx: &mut Context<'_>, phrase: &str) -> Step<()> {
    let character = ctx.resolve_character(phrase)?;
    let graph = graph_of(character)?;
    let start = ctx
        .state
        .cursor(&character.id)
        .filter(|id| graph.contains(id))
        .cloned()
        .unwrap_or_else(|| graph.root.clone());
    tracing::debug!(character = %character.id, node = %start, "conversation started");
    enter(ctx, character, graph, &start)
}

/// Answer the choices of `node` with option `answer` (1-based).
///
/// Effects apply in a fixed order: requirements, flags, gifts, takings,
/// `goto`, leaving the scene, ending. Any refusal aborts the whole step.
/// A gift comes from the speaker, or enters play if it is not yet placed.
pub(crate) fn choose(
    ctx: &mut Context<'_>,
    character: &CharacterId,
    node: &NodeId,
    answer: usize,
) -> Step<()> {
    let character = ctx.character(character)?;
    let graph = graph_of(character)?;
    let node = graph.node(node).ok_or_else(|| {
        CommandError::BrokenWorld(format!("{} has no dialogue node \"{node}\"", character.id))
    })?;
    let choice = answer
        .checked_sub(1)
        .and_then(|i| node.choices.get(i))
        .ok_or_else(|| CommandError::InvalidChoice(answer.to_string()))?;

    let missing = choice.effects.iter().find_map(|effect| match effect {
        Effect::Requires(flag) if !ctx.state.has_flag(flag) => Some(flag),
        _ => None,
    });
    if let Some(flag) = missing {
        return Err(CommandError::Unavailable(flag.clone()).into());
    }
    for effect in &choice.effects {
        if let Effect::Sets(flag) = effect {
            ctx.state.set_flag(flag.clone());
        }
    }
    for effect in &choice.effects {
        if let Effect::Gives(item) = effect {
            let name = render::item_name(ctx.world, item);
            let handed_over = match ctx.state.items.owner(item) {
                None => true,
                Some(Owner::Character(holder)) => holder == &character.id,
                Some(_) => false,
            };
            if !handed_over {
                return Err(CommandError::NotHeld {
                    character: character.name.clone(),
                    item: name.to_string(),
                }
                .into());
            }
            ctx.state.items.place(item.clone(), Owner::Inventory);
            ctx.say(format!("Received: {name}."));
        }
    }
    for effect in &choice.effects {
        if let Effect::Takes(item) = effect {
            let name = render::item_name(ctx.world, item);
            if !ctx.state.has_item(item) {
                return Err(CommandError::LacksItem(name.to_string()).into());
            }
            ctx.state
                .items
                .place(item.clone(), Owner::Character(character.id.clone()));
            ctx.say(format!("Gave: {name}."));
        }
    }

    let mut next = choice.next.clone();
    if let Some(target) = choice.goto() {
        ctx.state
            .dialogue_cursors
            .insert(character.id.clone(), target.clone());
        next = Some(target.clone());
    }

    if let Some(scene) = choice.leaves_to() {
        ctx.state.pending = None;
        ctx.state.current_scene = scene.clone();
        tracing::debug!(character = %character.id, %scene, "conversation left the scene");
        return look(ctx);
    }

    if choice.ends_dialogue() {
        if let Some(text) = next
            .as_ref()
            .and_then(|id| graph.node(id))
            .and_then(|n| render::node(character, n))
        {
            ctx.say(text);
        }
        end(ctx);
        return Ok(());
    }

    match next {
        Some(id) => enter(ctx, character, graph, &id),
        None => {
            end(ctx);
            Ok(())
        }
    }
}

/// Leave the conversation.
pub(crate) fn end(ctx: &mut Context<'_>) {
    ctx.state.pending = None;
    ctx.say("The conversation ends.");
}

/// Show `node` and wait for an answer, or end if it offers no choices.
fn enter(
    ctx: &mut Context<'_>,
    character: &Character,
    graph: &DialogueGraph,
    node: &NodeId,
) -> Step<()> {
    let shown = graph.node(node).ok_or_else(|| {
        CommandError::BrokenWorld(format!("{} has no dialogue node \"{node}\"", character.id))
    })?;
    if let Some(text) = render::node(character, shown) {
        ctx.say(text);
    }
    if shown.choices.is_empty() {
        end(ctx);
    } else {
        ctx.state.pending = Some(Pending::Dialogue {
            character: character.id.clone(),
            node: node.clone(),
        });
    }
    Ok(())
}

fn graph_of(character: &Character) -> Result<&DialogueGraph, CommandError> {
    character
        .dialogue
        .as_ref()
        .ok_or_else(|| CommandError::NoDialogue(character.name.clone()))
}
