use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::color::Color;

#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("failed to write log: {0}")]
    Io(#[from] io::Error),
    #[error("graph header already written")]
    AlreadyInitialized,
    #[error("node {node} out of range ({count} nodes)")]
    UnknownNode { node: usize, count: usize },
    #[error("no edge with id {id} ({count} edges)")]
    UnknownEdgeId { id: usize, count: usize },
    #[error("no edge between nodes {u} and {v}")]
    UnknownEdge { u: usize, v: usize },
}

fn pair(u: usize, v: usize) -> (usize, usize) {
    (u.min(v), u.max(v))
}

/// Writes the graph header and the action blocks a viewer replays.
///
/// Node and edge ids are 0-based here and written 1-based. Edges can also
/// be addressed by their endpoints; when a pair has been appended more
/// than once the latest edge wins.
///
/// Mutations are grouped into blocks. [`set_block_size`] opens a block of
/// `n` mutations which is written once the `n`th one arrives; without an
/// open block every mutation is written as a block of one.
///
/// [`set_block_size`]: LogWriter::set_block_size
pub struct LogWriter<W: Write> {
    out: W,
    initialized: bool,
    node_count: usize,
    edge_count: usize,
    edge_ids: HashMap<(usize, usize), usize>,
    pending: Vec<String>,
    remaining: usize,
}

impl LogWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let file = File::create(path.as_ref())?;
        log::info!("writing graph log to {}", path.as_ref().display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> LogWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            initialized: false,
            node_count: 0,
            edge_count: 0,
            edge_ids: HashMap::new(),
            pending: Vec::new(),
            remaining: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Write the graph header. Edge ids follow the order of `edges`.
    pub fn init(
        &mut self,
        node_count: usize,
        edges: &[(usize, usize)],
    ) -> Result<(), LogError> {
        if self.initialized {
            return Err(LogError::AlreadyInitialized);
        }
        if let Some(&node) = edges
            .iter()
            .flat_map(|(u, v)| [u, v])
            .find(|&&x| x >= node_count)
        {
            return Err(LogError::UnknownNode {
                node,
                count: node_count,
            });
        }

        writeln!(self.out, "{} {}", node_count, edges.len())?;
        for &(u, v) in edges {
            writeln!(self.out, "{} {}", u + 1, v + 1)?;
        }
        self.initialized = true;
        self.node_count = node_count;
        for &(u, v) in edges {
            self.record_edge(u, v);
        }
        Ok(())
    }

    /// Header from adjacency lists; each undirected edge is listed once,
    /// from its smaller endpoint.
    pub fn init_adjacency(
        &mut self,
        adjacency: &[Vec<usize>],
    ) -> Result<(), LogError> {
        let edges: Vec<(usize, usize)> = adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, targets)| {
                targets.iter().filter(move |&&v| u < v).map(move |&v| (u, v))
            })
            .collect();
        self.init(adjacency.len(), &edges)
    }

    fn record_edge(&mut self, u: usize, v: usize) -> usize {
        let id = self.edge_count;
        self.edge_ids.insert(pair(u, v), id);
        self.edge_count += 1;
        id
    }

    /// Open a block of `size` mutations. Ignored while another block is
    /// still waiting for mutations.
    pub fn set_block_size(&mut self, size: usize) -> Result<(), LogError> {
        if self.remaining > 0 {
            log::error!(
                "set_block_size({}) while a block still expects {} actions; ignored",
                size,
                self.remaining
            );
            return Ok(());
        }
        if size == 0 {
            // an empty block is a step that changes nothing
            return self.write_block(&[]);
        }
        self.remaining = size;
        Ok(())
    }

    fn write_block(&mut self, lines: &[String]) -> Result<(), LogError> {
        writeln!(self.out, "{}", lines.len())?;
        for line in lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn emit(&mut self, line: String) -> Result<(), LogError> {
        if self.remaining == 0 {
            return self.write_block(&[line]);
        }
        self.pending.push(line);
        self.remaining -= 1;
        if self.remaining == 0 {
            let block = std::mem::take(&mut self.pending);
            self.write_block(&block)?;
        }
        Ok(())
    }

    fn check_node(&self, node: usize) -> Result<(), LogError> {
        if node < self.node_count {
            Ok(())
        } else {
            Err(LogError::UnknownNode {
                node,
                count: self.node_count,
            })
        }
    }

    fn check_edge(&self, id: usize) -> Result<(), LogError> {
        if id < self.edge_count {
            Ok(())
        } else {
            Err(LogError::UnknownEdgeId {
                id,
                count: self.edge_count,
            })
        }
    }

    /// Id of the edge between `u` and `v`, in either direction.
    pub fn edge_id(&self, u: usize, v: usize) -> Result<usize, LogError> {
        self.edge_ids
            .get(&pair(u, v))
            .copied()
            .ok_or(LogError::UnknownEdge { u, v })
    }

    pub fn change_node_color(
        &mut self,
        node: usize,
        color: Color,
    ) -> Result<(), LogError> {
        self.check_node(node)?;
        self.emit(format!("nc {} {}", node + 1, color.packed()))
    }

    /// Back to the viewer's default highlight.
    pub fn clear_node_color(&mut self, node: usize) -> Result<(), LogError> {
        self.change_node_color(node, Color::NODE_DEFAULT)
    }

    pub fn change_edge_color(
        &mut self,
        id: usize,
        color: Color,
    ) -> Result<(), LogError> {
        self.check_edge(id)?;
        self.emit(format!("ec {} {}", id + 1, color.packed()))
    }

    pub fn clear_edge_color(&mut self, id: usize) -> Result<(), LogError> {
        self.change_edge_color(id, Color::EDGE_DEFAULT)
    }

    pub fn change_edge_color_between(
        &mut self,
        u: usize,
        v: usize,
        color: Color,
    ) -> Result<(), LogError> {
        let id = self.edge_id(u, v)?;
        self.change_edge_color(id, color)
    }

    pub fn clear_edge_color_between(
        &mut self,
        u: usize,
        v: usize,
    ) -> Result<(), LogError> {
        let id = self.edge_id(u, v)?;
        self.clear_edge_color(id)
    }

    /// Add an edge; returns the id it will have in the viewer.
    pub fn append_edge(&mut self, u: usize, v: usize) -> Result<usize, LogError> {
        self.check_node(u)?;
        self.check_node(v)?;
        self.emit(format!("ea {} {}", u + 1, v + 1))?;
        Ok(self.record_edge(u, v))
    }

    /// Mark an edge dead. It stays addressable but is no longer drawn.
    pub fn kill_edge(&mut self, id: usize) -> Result<(), LogError> {
        self.check_edge(id)?;
        self.emit(format!("ed {}", id + 1))
    }

    pub fn kill_edge_between(&mut self, u: usize, v: usize) -> Result<(), LogError> {
        let id = self.edge_id(u, v)?;
        self.kill_edge(id)
    }

    /// Write out a partially filled block, then flush the sink.
    pub fn flush(&mut self) -> Result<(), LogError> {
        if !self.pending.is_empty() {
            log::warn!(
                "closing block early: {} actions written, {} missing",
                self.pending.len(),
                self.remaining
            );
            let block = std::mem::take(&mut self.pending);
            self.write_block(&block)?;
        }
        self.remaining = 0;
        self.out.flush()?;
        Ok(())
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W, LogError> {
        self.flush()?;
        Ok(self.out)
    }
}
