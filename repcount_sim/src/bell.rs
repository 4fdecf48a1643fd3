use std::io::Write;

use repcount_traits::{AudioCue, BoxError};

/// ASCII BEL.
const BEL: &[u8] = b"\x07";

/// Rings the terminal bell once per cue.
///
/// A terminal has no volume control, so any volume above 0 rings.
#[derive(Debug)]
pub struct TerminalBell<W: Write = std::io::Stderr> {
    out: W,
}

impl TerminalBell {
    pub fn stderr() -> Self {
        Self {
            out: std::io::stderr(),
        }
    }
}

impl<W: Write> TerminalBell<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioCue for TerminalBell<W> {
    fn play(&mut self, volume: f32) -> Result<(), BoxError> {
        if volume <= 0.0 {
            return Ok(());
        }
        self.out.write_all(BEL)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rings_unless_muted() {
        let mut bell = TerminalBell::new(Vec::new());
        bell.play(0.5).expect("ring");
        bell.play(0.0).expect("muted");
        bell.play(1.0).expect("ring");
        assert_eq!(bell.into_inner(), b"\x07\x07".to_vec());
    }
}
