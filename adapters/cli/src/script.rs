use anyhow::{bail, Result};
use maze_chase_core::Direction;

/// Largest repeat count a single script entry may carry.
const MAX_REPEAT: usize = u16::MAX as usize;

/// Sequence of player moves submitted one per update tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MoveScript {
    moves: Vec<Direction>,
    cursor: usize,
}

impl MoveScript {
    /// Parses `U`/`D`/`L`/`R` letters; whitespace and commas are ignored.
    ///
    /// A decimal count may precede a letter to repeat it, so `3L2U` reads as
    /// `LLLUU`.
    pub(crate) fn parse(text: &str) -> Result<Self> {
        let mut moves = Vec::new();
        let mut repeat: Option<usize> = None;

        for (index, letter) in text.chars().enumerate() {
            if letter.is_whitespace() || letter == ',' {
                continue;
            }
            if let Some(digit) = letter.to_digit(10) {
                let count = repeat
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|count| count.checked_add(digit as usize))
                    .filter(|count| *count <= MAX_REPEAT);
                let Some(count) = count else {
                    bail!("repeat count at position {index} exceeds {MAX_REPEAT}");
                };
                repeat = Some(count);
                continue;
            }
            let Some(direction) = Direction::from_letter(letter) else {
                bail!("unknown move `{letter}` at position {index}");
            };
            moves.extend(std::iter::repeat(direction).take(repeat.take().unwrap_or(1)));
        }

        if repeat.is_some() {
            bail!("move script ends with a dangling repeat count");
        }

        Ok(Self { moves, cursor: 0 })
    }

    /// Next scripted move, if any remain.
    pub(crate) fn next_move(&mut self) -> Option<Direction> {
        let direction = self.moves.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(direction)
    }
}
