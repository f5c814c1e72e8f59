//! Line-oriented terminal view over a challenge session.
//!
//! Each input line replaces the current entry. `:r` draws a new challenge,
//! `:q` quits. Presentation of the image is delegated to `present`.

use anyhow::Result;
use std::io::{BufRead, Write};

use glyphwall_engine::{ChallengeSession, RandomSource, Surface};

const REGENERATE: &str = ":r";
const QUIT: &str = ":q";

/// Result of an interactive run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PlayStats {
    pub challenges: u64,
    pub attempts: u64,
    pub solved: u64,
}

/// Drive `session` from `input` until `:q` or end of input
pub fn play<S, R, I, O, P>(
    session: &mut ChallengeSession,
    surface: &mut S,
    rng: &mut R,
    input: I,
    mut output: O,
    mut present: P,
) -> Result<PlayStats>
where
    S: Surface + ?Sized,
    R: RandomSource + ?Sized,
    I: BufRead,
    O: Write,
    P: FnMut(&S, &mut O) -> Result<()>,
{
    let mut stats = PlayStats::default();

    session.regenerate(surface, rng)?;
    stats.challenges += 1;
    present(surface, &mut output)?;
    prompt(&mut output)?;

    for line in input.lines() {
        let line = line?;
        let entry = line.trim();

        match entry {
            QUIT => break,
            REGENERATE => {
                session.regenerate(surface, rng)?;
                stats.challenges += 1;
                present(surface, &mut output)?;
            }
            _ => {
                let accepted = session.enter_text(entry);
                stats.attempts += 1;
                if session.is_validated() {
                    stats.solved += 1;
                    writeln!(output, "validated")?;
                    tracing::info!(generation = session.generation(), "Challenge solved");
                    session.regenerate(surface, rng)?;
                    stats.challenges += 1;
                    present(surface, &mut output)?;
                } else {
                    writeln!(
                        output,
                        "not validated ({accepted}/{} characters accepted)",
                        session.cells().len()
                    )?;
                }
            }
        }
        prompt(&mut output)?;
    }

    Ok(stats)
}

fn prompt<O: Write>(output: &mut O) -> Result<()> {
    write!(output, "> ")?;
    output.flush()?;
    Ok(())
}
