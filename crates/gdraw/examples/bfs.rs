//! Breadth-first search over a small grid, written to `GraphLog.txt`.
//!
//! Run with `cargo run -p gdraw --example bfs`, then open the log in the
//! viewer and step through it with the arrow keys.

use gdraw::{palette, Color, LogError, LogWriter};
use std::collections::VecDeque;

const SIDE: usize = 5;

fn grid() -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); SIDE * SIDE];
    for row in 0..SIDE {
        for col in 0..SIDE {
            let u = row * SIDE + col;
            if col + 1 < SIDE {
                adjacency[u].push(u + 1);
                adjacency[u + 1].push(u);
            }
            if row + 1 < SIDE {
                adjacency[u].push(u + SIDE);
                adjacency[u + SIDE].push(u);
            }
        }
    }
    adjacency
}

fn main() -> Result<(), LogError> {
    env_logger::init();
    let adjacency = grid();
    let mut log = LogWriter::create("GraphLog.txt")?;
    log.init_adjacency(&adjacency)?;

    let frontier = palette::category(1);
    let done = palette::category(0);
    let tree = Color::rgb(230, 230, 230);

    let mut seen = vec![false; adjacency.len()];
    let mut queue = VecDeque::from([0]);
    seen[0] = true;
    log.change_node_color(0, frontier)?;

    while let Some(u) = queue.pop_front() {
        let fresh: Vec<usize> = adjacency[u]
            .iter()
            .copied()
            .filter(|&v| !seen[v])
            .collect();

        // one step per visited node: finish it, discover its neighbours
        log.set_block_size(1 + 2 * fresh.len())?;
        log.change_node_color(u, done)?;
        for &v in &fresh {
            seen[v] = true;
            log.change_node_color(v, frontier)?;
            log.change_edge_color_between(u, v, tree)?;
            queue.push_back(v);
        }
    }

    log.finish()?;
    Ok(())
}
