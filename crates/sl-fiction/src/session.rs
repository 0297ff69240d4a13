//! Interactive fiction session management.

use sl_core::World;

use crate::config::SessionConfig;
use crate::error::CommandResult;
use crate::interpreter::Interpreter;
use crate::parser::{AliasIndex, Command, parse_command};
use crate::render::{self, Prompt};
use crate::state::WorldState;

/// What the session says back after one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text for the player.
    pub text: String,
    /// A question waiting for an answer, if any.
    pub prompt: Option<Prompt>,
    /// Whether the player asked to quit.
    pub quit: bool,
}

/// A play session: one world, one evolving state.
#[derive(Debug, Clone)]
pub struct Session {
    world: World,
    aliases: AliasIndex,
    state: WorldState,
    finished: bool,
}

impl Session {
    /// Start a session using the world's own front matter.
    pub fn new(world: World) -> CommandResult<Self> {
        Self::with_config(world, &SessionConfig::default())
    }

    /// Start a session with overrides.
    pub fn with_config(world: World, config: &SessionConfig) -> CommandResult<Self> {
        let state = WorldState::new(&world, config)?;
        let aliases = AliasIndex::build(&world);
        tracing::info!(
            title = %world.meta.title,
            scene = %state.current_scene,
            scenes = world.scene_count(),
            items = world.item_count(),
            "session started"
        );
        Ok(Self {
            world,
            aliases,
            state,
            finished: false,
        })
    }

    /// The world being played.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The current state.
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Whether the player has quit.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The opening text: title, blurb and the first scene.
    pub fn intro(&self) -> Reply {
        let meta = &self.world.meta;
        let mut text = meta.title.clone();
        if !meta.description.is_empty() {
            text.push('\n');
            text.push_str(&meta.description);
        }
        text.push_str("\n\n");
        text.push_str(&render::scene(&self.world, &self.state));
        Reply {
            text,
            prompt: render::prompt(&self.world, &self.state),
            quit: false,
        }
    }

    /// Process one line of player input.
    pub fn process(&mut self, input: &str) -> Reply {
        if parse_command(input) == Command::Quit {
            self.finished = true;
            return Reply {
                text: "Goodbye.".to_string(),
                prompt: None,
                quit: true,
            };
        }

        let turn = Interpreter::new(&self.world, &self.aliases).execute(&self.state, input);
        self.state = turn.state;
        Reply {
            text: turn.output,
            prompt: render::prompt(&self.world, &self.state),
            quit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::{Exit, Scene, SceneId, WorldMeta};

    fn world() -> World {
        let mut meta = WorldMeta::new("Two Rooms");
        meta.description = "A tiny test story.".to_string();
        let mut world = World::new(meta);
        let mut hall = Scene::new(SceneId::new("hall"), "Hall");
        hall.exits = vec![Exit::new("east", SceneId::new("yard"))];
        world.add_scene(hall).unwrap();
        let mut yard = Scene::new(SceneId::new("yard"), "Yard");
        yard.exits = vec![Exit::new("west", SceneId::new("hall"))];
        world.add_scene(yard).unwrap();
        world
    }

    #[test]
    fn intro_shows_title_and_scene() {
        let session = Session::new(world()).unwrap();
        let intro = session.intro();
        assert!(intro.text.starts_with("Two Rooms\nA tiny test story.\n\nHall"));
        assert_eq!(intro.prompt, None);
    }

    #[test]
    fn process_moves_and_counts_turns() {
        let mut session = Session::new(world()).unwrap();
        let reply = session.process("e");
        assert!(reply.text.starts_with("Yard"));
        assert_eq!(session.state().current_scene, SceneId::new("yard"));
        assert_eq!(session.state().turns, 1);

        let reply = session.process("dance");
        assert_eq!(reply.text, "I don't understand that command.");
        assert_eq!(session.state().turns, 1);
    }

    #[test]
    fn quit_finishes_session() {
        let mut session = Session::new(world()).unwrap();
        let reply = session.process("quit");
        assert!(reply.quit);
        assert!(session.is_finished());
    }

    #[test]
    fn bare_exit_name_moves() {
        let mut session = Session::new(world()).unwrap();
        session.process("yard");
        assert_eq!(session.state().current_scene, SceneId::new("yard"));
        session.process("go west");
        assert_eq!(session.state().current_scene, SceneId::new("hall"));
    }
}
