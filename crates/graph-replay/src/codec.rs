//! Text encoding of replay mutations and their inverses.
//!
//! One mutation per line, whitespace separated, ids 1-based:
//!
//! ```text
//! nc <node> <rgba>    set node highlight
//! ec <edge> <rgba>    set edge color
//! ea <u> <v>          append edge
//! ed <edge>           mark edge dead
//! ```
//!
//! Lines with any other leading token decode to nothing.

use crate::color::Rgba;
use crate::store::{EntityKind, Store, StoreError};
use std::str::{FromStr, SplitWhitespace};

/// One state change of the replayed graph. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    SetNodeColor { node: usize, color: Rgba },
    SetEdgeColor { edge: usize, color: Rgba },
    AppendEdge { u: usize, v: usize },
    SetEdgeAlive { edge: usize, alive: bool },
    /// Inverse of `AppendEdge`; has no text form.
    RemoveLastEdge,
}

/// Mutations applied or undone together as one replay step.
pub type MutationGroup = Vec<Mutation>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed action line {line:?}: {reason}")]
    Parse { line: String, reason: &'static str },
    #[error(transparent)]
    OutOfRange(#[from] StoreError),
}

// ------------------------------------------------------------------
// Decoding / encoding
// ------------------------------------------------------------------

fn parse_arg<T: FromStr>(
    tokens: &mut SplitWhitespace<'_>,
    line: &str,
    reason: &'static str,
) -> Result<T, CodecError> {
    tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| CodecError::Parse {
            line: line.to_string(),
            reason,
        })
}

fn parse_id(
    tokens: &mut SplitWhitespace<'_>,
    line: &str,
) -> Result<usize, CodecError> {
    let id: usize = parse_arg(tokens, line, "expected a 1-based id")?;
    id.checked_sub(1).ok_or_else(|| CodecError::Parse {
        line: line.to_string(),
        reason: "ids start at 1",
    })
}

fn parse_color(
    tokens: &mut SplitWhitespace<'_>,
    line: &str,
) -> Result<Rgba, CodecError> {
    parse_arg(tokens, line, "expected a packed rgba color")
        .map(Rgba::from_packed)
}

/// Decode one log line. Blank lines and unknown tags give `Ok(None)`.
pub fn decode(line: &str) -> Result<Option<Mutation>, CodecError> {
    let mut tokens = line.split_whitespace();
    let mutation = match tokens.next() {
        Some("nc") => Mutation::SetNodeColor {
            node: parse_id(&mut tokens, line)?,
            color: parse_color(&mut tokens, line)?,
        },
        Some("ec") => Mutation::SetEdgeColor {
            edge: parse_id(&mut tokens, line)?,
            color: parse_color(&mut tokens, line)?,
        },
        Some("ea") => Mutation::AppendEdge {
            u: parse_id(&mut tokens, line)?,
            v: parse_id(&mut tokens, line)?,
        },
        Some("ed") => Mutation::SetEdgeAlive {
            edge: parse_id(&mut tokens, line)?,
            alive: false,
        },
        Some(other) => {
            log::debug!("ignoring unknown action tag {:?}", other);
            return Ok(None);
        }
        None => return Ok(None),
    };
    Ok(Some(mutation))
}

pub fn decode_group<'a>(
    lines: impl IntoIterator<Item = &'a str>,
) -> Result<MutationGroup, CodecError> {
    let mut group = MutationGroup::new();
    for line in lines {
        if let Some(mutation) = decode(line)? {
            group.push(mutation);
        }
    }
    Ok(group)
}

/// Text form of a mutation, if it has one. Reviving an edge and removing
/// the last edge only ever appear as inverses.
pub fn encode(mutation: &Mutation) -> Option<String> {
    match *mutation {
        Mutation::SetNodeColor { node, color } => {
            Some(format!("nc {} {}", node + 1, color.packed()))
        }
        Mutation::SetEdgeColor { edge, color } => {
            Some(format!("ec {} {}", edge + 1, color.packed()))
        }
        Mutation::AppendEdge { u, v } => {
            Some(format!("ea {} {}", u + 1, v + 1))
        }
        Mutation::SetEdgeAlive { edge, alive: false } => {
            Some(format!("ed {}", edge + 1))
        }
        Mutation::SetEdgeAlive { alive: true, .. }
        | Mutation::RemoveLastEdge => None,
    }
}

// ------------------------------------------------------------------
// Application and inverses
// ------------------------------------------------------------------

/// The mutation that undoes `mutation`, read off the current state.
pub fn inverse(
    store: &Store,
    mutation: &Mutation,
) -> Result<Mutation, StoreError> {
    Ok(match *mutation {
        Mutation::SetNodeColor { node, .. } => Mutation::SetNodeColor {
            node,
            color: store.node(node)?.highlight,
        },
        Mutation::SetEdgeColor { edge, .. } => Mutation::SetEdgeColor {
            edge,
            color: store.edge(edge)?.color,
        },
        Mutation::AppendEdge { u, v } => {
            store.node(u)?;
            store.node(v)?;
            Mutation::RemoveLastEdge
        }
        Mutation::SetEdgeAlive { edge, .. } => Mutation::SetEdgeAlive {
            edge,
            alive: store.edge(edge)?.alive,
        },
        Mutation::RemoveLastEdge => {
            let last = store.edge_count().checked_sub(1).ok_or(
                StoreError::OutOfRange {
                    kind: EntityKind::Edge,
                    index: 0,
                    len: 0,
                },
            )?;
            let edge = store.edge(last)?;
            Mutation::AppendEdge {
                u: edge.u(),
                v: edge.v(),
            }
        }
    })
}

pub fn apply(
    store: &mut Store,
    mutation: &Mutation,
) -> Result<(), StoreError> {
    match *mutation {
        Mutation::SetNodeColor { node, color } => {
            store.node_mut(node)?.highlight = color;
        }
        Mutation::SetEdgeColor { edge, color } => {
            store.edge_mut(edge)?.color = color;
        }
        Mutation::AppendEdge { u, v } => {
            store.push_edge(u, v)?;
        }
        Mutation::SetEdgeAlive { edge, alive } => {
            store.edge_mut(edge)?.alive = alive;
        }
        Mutation::RemoveLastEdge => {
            store.pop_edge()?;
        }
    }
    Ok(())
}

/// Apply `group` in order and return the group that undoes it.
///
/// Each inverse is taken against the state left by the mutations before
/// it, and the undo group lists them last-to-first, so repeated ids and
/// edges appended earlier in the same group round-trip exactly. On error
/// everything applied so far is rolled back and the store is unchanged.
pub fn apply_with_inverse(
    store: &mut Store,
    group: &[Mutation],
) -> Result<MutationGroup, StoreError> {
    let mut undo = MutationGroup::with_capacity(group.len());
    for mutation in group {
        let result = inverse(store, mutation)
            .and_then(|inv| apply(store, mutation).map(|()| inv));
        match result {
            Ok(inv) => undo.push(inv),
            Err(err) => {
                for inv in undo.iter().rev() {
                    if let Err(rollback) = apply(store, inv) {
                        log::error!("rollback failed: {}", rollback);
                    }
                }
                return Err(err);
            }
        }
    }
    undo.reverse();
    Ok(undo)
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_settings::LayoutSettings;
    use crate::sim::SimContext;
    use eframe::egui::Vec2;
    use proptest::prelude::*;

    fn store(n: usize, edges: &[(usize, usize)]) -> Store {
        let mut store = Store::new(LayoutSettings::default());
        let mut ctx = SimContext::seeded(Vec2::new(800.0, 600.0), 9);
        store.load(&mut ctx, n, edges).unwrap();
        store
    }

    fn snapshot(store: &Store) -> (Vec<Rgba>, Vec<(usize, usize, Rgba, bool)>) {
        (
            store.nodes().iter().map(|n| n.highlight).collect(),
            store
                .edges()
                .iter()
                .map(|e| (e.u(), e.v(), e.color, e.alive))
                .collect(),
        )
    }

    #[test]
    fn test_decode_each_tag() {
        assert_eq!(
            decode("nc 1 4294967295").unwrap(),
            Some(Mutation::SetNodeColor {
                node: 0,
                color: Rgba::WHITE
            })
        );
        assert_eq!(
            decode("ec 2 255").unwrap(),
            Some(Mutation::SetEdgeColor {
                edge: 1,
                color: Rgba::from_rgba(0, 0, 0, 255)
            })
        );
        assert_eq!(
            decode("  ea 1   3 ").unwrap(),
            Some(Mutation::AppendEdge { u: 0, v: 2 })
        );
        assert_eq!(
            decode("ed 2").unwrap(),
            Some(Mutation::SetEdgeAlive {
                edge: 1,
                alive: false
            })
        );
    }

    #[test]
    fn test_unknown_and_blank_lines_are_noops() {
        assert_eq!(decode("zz 1 2").unwrap(), None);
        assert_eq!(decode("").unwrap(), None);
        assert_eq!(decode("   ").unwrap(), None);
    }

    #[test]
    fn test_malformed_arguments_are_errors() {
        assert!(matches!(
            decode("nc x 5"),
            Err(CodecError::Parse { .. })
        ));
        assert!(matches!(decode("ec 1"), Err(CodecError::Parse { .. })));
        assert!(matches!(
            decode("ed 0"),
            Err(CodecError::Parse {
                reason: "ids start at 1",
                ..
            })
        ));
    }

    #[test]
    fn test_encode_matches_wire_format() {
        let red = Rgba::from_rgb(255, 0, 0);
        assert_eq!(
            encode(&Mutation::SetNodeColor { node: 0, color: red }),
            Some("nc 1 4278190335".to_string())
        );
        assert_eq!(
            encode(&Mutation::AppendEdge { u: 0, v: 2 }),
            Some("ea 1 3".to_string())
        );
        assert_eq!(encode(&Mutation::RemoveLastEdge), None);
        assert_eq!(
            encode(&Mutation::SetEdgeAlive {
                edge: 0,
                alive: true
            }),
            None
        );
    }

    #[test]
    fn test_inverse_table() {
        let mut s = store(3, &[(0, 1), (1, 2)]);
        let red = Rgba::from_rgb(255, 0, 0);
        s.edge_mut(1).unwrap().color = red;
        assert_eq!(
            inverse(&s, &Mutation::SetNodeColor { node: 2, color: red })
                .unwrap(),
            Mutation::SetNodeColor {
                node: 2,
                color: Rgba::WHITE
            }
        );
        assert_eq!(
            inverse(
                &s,
                &Mutation::SetEdgeColor {
                    edge: 1,
                    color: Rgba::WHITE
                }
            )
            .unwrap(),
            Mutation::SetEdgeColor { edge: 1, color: red }
        );
        assert_eq!(
            inverse(&s, &Mutation::AppendEdge { u: 0, v: 2 }).unwrap(),
            Mutation::RemoveLastEdge
        );
        assert_eq!(
            inverse(
                &s,
                &Mutation::SetEdgeAlive {
                    edge: 0,
                    alive: false
                }
            )
            .unwrap(),
            Mutation::SetEdgeAlive {
                edge: 0,
                alive: true
            }
        );
    }

    #[test]
    fn test_out_of_range_reference_fails_fast() {
        let mut s = store(3, &[(0, 1)]);
        let err = apply_with_inverse(
            &mut s,
            &[Mutation::SetEdgeColor {
                edge: 5,
                color: Rgba::WHITE,
            }],
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { index: 5, .. }));
        assert!(apply(&mut s, &Mutation::AppendEdge { u: 0, v: 3 }).is_err());
        assert_eq!(s.edge_count(), 1);
    }

    #[test]
    fn test_failed_group_is_rolled_back() {
        let mut s = store(3, &[(0, 1)]);
        let before = snapshot(&s);
        let group = [
            Mutation::SetNodeColor {
                node: 0,
                color: Rgba::from_rgb(1, 2, 3),
            },
            Mutation::AppendEdge { u: 1, v: 2 },
            Mutation::SetEdgeAlive {
                edge: 0,
                alive: false,
            },
            Mutation::SetNodeColor {
                node: 7,
                color: Rgba::WHITE,
            },
        ];
        assert!(apply_with_inverse(&mut s, &group).is_err());
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn test_same_node_twice_in_one_group() {
        let mut s = store(2, &[]);
        let before = snapshot(&s);
        let group = [
            Mutation::SetNodeColor {
                node: 0,
                color: Rgba::from_rgb(1, 0, 0),
            },
            Mutation::SetNodeColor {
                node: 0,
                color: Rgba::from_rgb(2, 0, 0),
            },
        ];
        let undo = apply_with_inverse(&mut s, &group).unwrap();
        assert_eq!(s.node(0).unwrap().highlight, Rgba::from_rgb(2, 0, 0));
        apply_with_inverse(&mut s, &undo).unwrap();
        assert_eq!(snapshot(&s), before);
    }

    #[test]
    fn test_color_of_edge_appended_in_same_group() {
        let mut s = store(3, &[(0, 1)]);
        let before = snapshot(&s);
        let group = decode_group(["ea 2 3", "ec 2 4278190335"]).unwrap();
        let undo = apply_with_inverse(&mut s, &group).unwrap();
        assert_eq!(s.edge(1).unwrap().color, Rgba::from_rgb(255, 0, 0));
        apply_with_inverse(&mut s, &undo).unwrap();
        assert_eq!(snapshot(&s), before);
    }

    fn mutation_strategy(
        nodes: usize,
        edges: usize,
    ) -> impl Strategy<Value = Mutation> {
        prop_oneof![
            (0..nodes, any::<u32>()).prop_map(|(node, c)| {
                Mutation::SetNodeColor {
                    node,
                    color: Rgba::from_packed(c),
                }
            }),
            (0..edges, any::<u32>()).prop_map(|(edge, c)| {
                Mutation::SetEdgeColor {
                    edge,
                    color: Rgba::from_packed(c),
                }
            }),
            (0..edges).prop_map(|edge| Mutation::SetEdgeAlive {
                edge,
                alive: false
            }),
            (0..nodes, 0..nodes)
                .prop_map(|(u, v)| Mutation::AppendEdge { u, v }),
        ]
    }

    proptest! {
        #[test]
        fn prop_group_then_undo_restores_state(
            groups in prop::collection::vec(
                prop::collection::vec(mutation_strategy(6, 5), 0..8),
                1..6,
            )
        ) {
            let mut s = store(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
            let mut history = Vec::new();
            let mut snapshots = Vec::new();
            for group in &groups {
                snapshots.push(snapshot(&s));
                history.push(apply_with_inverse(&mut s, group).unwrap());
            }
            while let Some(undo) = history.pop() {
                apply_with_inverse(&mut s, &undo).unwrap();
                prop_assert_eq!(snapshot(&s), snapshots.pop().unwrap());
            }
        }

        #[test]
        fn prop_encode_then_decode_is_identity(
            m in mutation_strategy(100, 100)
        ) {
            let line = encode(&m).unwrap();
            prop_assert_eq!(decode(&line).unwrap(), Some(m));
        }
    }
}
