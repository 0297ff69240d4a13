//! Reading story files and reporting what is wrong with them.

use std::path::PathBuf;

use sl_core::World;
use sl_markdown::ParseResult;

/// Parse every file into one world and print diagnostics.
/// Returns the world if there are no errors.
pub fn load(paths: &[PathBuf]) -> Result<World, String> {
    let result = sl_markdown::parse_files(paths).map_err(|e| e.to_string())?;
    print_diagnostics(&result);

    if result.has_errors() {
        Err("the story could not be loaded".into())
    } else {
        tracing::debug!(
            scenes = result.world.scene_count(),
            items = result.world.item_count(),
            characters = result.world.character_count(),
            "story loaded"
        );
        Ok(result.world)
    }
}

/// Print diagnostics to stderr using ariadne.
fn print_diagnostics(result: &ParseResult) {
    if result.diagnostics.is_empty() {
        return;
    }
    eprint!("{}", result.render());

    let errors = result.error_count();
    let warnings = result.warning_count();
    eprintln!(
        "  {} error{}, {} warning{}",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" },
    );
}
