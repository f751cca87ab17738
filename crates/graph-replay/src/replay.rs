//! Bidirectional replay of a mutation log.
//!
//! The log is read lazily: a group is pulled from the source only when the
//! cursor is already at the end of what has been loaded. Each group is
//! stored together with the group that undoes it, so stepping back never
//! touches the source again.

use std::io::{self, BufRead};

use crate::codec::{self, CodecError, MutationGroup};
use crate::store::Store;

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("failed to read action log: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// What reading the next block from the source produced.
enum Block {
    Lines(Vec<String>),
    EndOfStream,
}

pub struct ReplayLog<R> {
    source: R,
    forward: Vec<MutationGroup>,
    inverse: Vec<MutationGroup>,
    cursor: usize,
    exhausted: bool,
}

impl<R: BufRead> ReplayLog<R> {
    /// `source` must be positioned after the graph header.
    pub fn new(source: R) -> Self {
        Self {
            source,
            forward: Vec::new(),
            inverse: Vec::new(),
            cursor: 0,
            exhausted: false,
        }
    }

    /// Number of groups currently applied.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of groups read from the source so far.
    pub fn loaded(&self) -> usize {
        self.forward.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn forward(&self, index: usize) -> Option<&MutationGroup> {
        self.forward.get(index)
    }

    pub fn inverse(&self, index: usize) -> Option<&MutationGroup> {
        self.inverse.get(index)
    }

    /// Apply the next group. Returns `Ok(false)` when the source has no more
    /// groups; the cursor is left where it was.
    pub fn step_forward(&mut self, store: &mut Store) -> Result<bool, ReplayError> {
        if self.cursor < self.forward.len() {
            codec::apply_with_inverse(store, &self.forward[self.cursor])
                .map_err(CodecError::from)?;
            self.cursor += 1;
            log::debug!("replayed cached group {}", self.cursor);
            return Ok(true);
        }
        if self.exhausted {
            return Ok(false);
        }

        let lines = match self.read_block()? {
            Block::Lines(lines) => lines,
            Block::EndOfStream => {
                self.exhausted = true;
                log::info!(
                    "action log ended after {} groups",
                    self.forward.len()
                );
                return Ok(false);
            }
        };

        let group = codec::decode_group(lines.iter().map(String::as_str))?;
        let undo = codec::apply_with_inverse(store, &group)
            .map_err(CodecError::from)?;
        log::debug!(
            "group {}: {} actions applied",
            self.forward.len() + 1,
            group.len()
        );
        self.forward.push(group);
        self.inverse.push(undo);
        self.cursor += 1;
        Ok(true)
    }

    /// Undo the last applied group. Returns `Ok(false)` at the start.
    pub fn step_backward(&mut self, store: &mut Store) -> Result<bool, ReplayError> {
        if self.cursor == 0 {
            return Ok(false);
        }
        codec::apply_with_inverse(store, &self.inverse[self.cursor - 1])
            .map_err(CodecError::from)?;
        self.cursor -= 1;
        log::debug!("undid group {}", self.cursor + 1);
        Ok(true)
    }

    /// Step until the cursor reaches `target` or the source runs out.
    /// Returns the number of steps taken.
    pub fn seek(
        &mut self,
        store: &mut Store,
        target: usize,
    ) -> Result<usize, ReplayError> {
        let mut steps = 0;
        while self.cursor > target {
            if !self.step_backward(store)? {
                break;
            }
            steps += 1;
        }
        while self.cursor < target {
            if !self.step_forward(store)? {
                break;
            }
            steps += 1;
        }
        Ok(steps)
    }

    /// Size line, then that many raw lines (blank ones included). Blank
    /// lines before the size are skipped. A missing or malformed size, or
    /// a block cut short, ends the stream.
    fn read_block(&mut self) -> io::Result<Block> {
        let Some(header) = self.next_size_line()? else {
            return Ok(Block::EndOfStream);
        };
        let size = header
            .split_whitespace()
            .next()
            .and_then(|t| t.parse::<usize>().ok());
        let Some(size) = size else {
            log::warn!("malformed block size {:?}", header.trim());
            return Ok(Block::EndOfStream);
        };

        // size is untrusted, so grow as lines actually arrive
        let mut lines = Vec::new();
        while lines.len() < size {
            match self.next_line()? {
                Some(line) => lines.push(line),
                None => {
                    log::warn!(
                        "truncated block: expected {} lines, found {}",
                        size,
                        lines.len()
                    );
                    return Ok(Block::EndOfStream);
                }
            }
        }
        Ok(Block::Lines(lines))
    }

    fn next_size_line(&mut self) -> io::Result<Option<String>> {
        loop {
            match self.next_line()? {
                Some(line) if line.trim().is_empty() => continue,
                other => return Ok(other),
            }
        }
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
