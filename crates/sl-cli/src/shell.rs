//! The line-oriented play loop.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use sl_fiction::{Prompt, Reply, Session};

/// Play until the player quits or input runs out.
pub fn run<R: BufRead, W: Write>(mut session: Session, input: R, mut out: W) -> io::Result<()> {
    let intro = session.intro();
    let (title, rest) = intro.text.split_once('\n').unwrap_or((intro.text.as_str(), ""));
    writeln!(out, "{}", title.bold().cyan())?;
    writeln!(out, "{rest}")?;
    show_prompt(&mut out, intro.prompt.as_ref())?;

    for line in input.lines() {
        let line = line?;
        let reply = session.process(&line);
        show(&mut out, &reply)?;
        if reply.quit {
            break;
        }
    }
    out.flush()
}

fn show<W: Write>(out: &mut W, reply: &Reply) -> io::Result<()> {
    writeln!(out, "{}", reply.text)?;
    if reply.quit {
        return Ok(());
    }
    show_prompt(out, reply.prompt.as_ref())
}

fn show_prompt<W: Write>(out: &mut W, prompt: Option<&Prompt>) -> io::Result<()> {
    if let Some(prompt) = prompt {
        writeln!(out, "{}", prompt.question.yellow())?;
        for (i, option) in prompt.options.iter().enumerate() {
            writeln!(out, "  {}. {option}", (i + 1).to_string().dimmed())?;
        }
    }
    write!(out, "{} ", ">".bold())?;
    out.flush()
}
