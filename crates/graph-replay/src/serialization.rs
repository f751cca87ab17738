use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::layout_settings::{InvalidSetting, LayoutSettings};
use crate::store::{Store, StoreError};

// ------------------------------------------------------------------
// Graph header / adjacency text
// ------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum GraphFileError {
    #[error("failed to read graph: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error(transparent)]
    OutOfRange(#[from] StoreError),
}

/// Node count and 0-based edge list at the top of a log or saved graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphHeader {
    pub node_count: usize,
    pub edges: Vec<(usize, usize)>,
}

/// Reads exactly the header lines, leaving the reader positioned at the
/// first action block (if any).
struct LineCursor<'a, R> {
    reader: &'a mut R,
    line_no: usize,
    buf: String,
}

impl<'a, R: BufRead> LineCursor<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    /// Next non-blank line split into tokens, or `None` at end of input.
    fn next_tokens(&mut self) -> io::Result<Option<Vec<&str>>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !self.buf.trim().is_empty() {
                return Ok(Some(self.buf.split_whitespace().collect()));
            }
        }
    }

    fn error(&self, reason: impl Into<String>) -> GraphFileError {
        GraphFileError::Parse {
            line: self.line_no,
            reason: reason.into(),
        }
    }
}

fn parse_count(token: Option<&&str>, what: &str) -> Result<usize, String> {
    token
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| format!("expected {}", what))
}

pub fn read_graph_header<R: BufRead>(
    reader: &mut R,
) -> Result<GraphHeader, GraphFileError> {
    let mut cursor = LineCursor::new(reader);

    let (node_count, edge_count) = match cursor.next_tokens()? {
        Some(tokens) => {
            let counts = parse_count(tokens.first(), "node count")
                .and_then(|n| {
                    parse_count(tokens.get(1), "edge count").map(|m| (n, m))
                });
            counts.map_err(|reason| cursor.error(reason))?
        }
        None => return Err(cursor.error("empty graph file")),
    };

    // edge_count is untrusted, so grow as edges actually parse
    let mut edges = Vec::new();
    for _ in 0..edge_count {
        let endpoints = match cursor.next_tokens()? {
            Some(tokens) => {
                let parse_endpoint = |token: Option<&&str>| {
                    parse_count(token, "two 1-based endpoints").and_then(
                        |x| {
                            if (1..=node_count).contains(&x) {
                                Ok(x - 1)
                            } else {
                                Err(format!(
                                    "endpoint {} outside 1..={}",
                                    x, node_count
                                ))
                            }
                        },
                    )
                };
                parse_endpoint(tokens.first()).and_then(|u| {
                    parse_endpoint(tokens.get(1)).map(|v| (u, v))
                })
            }
            None => Err(format!(
                "expected {} edges, found {}",
                edge_count,
                edges.len()
            )),
        };
        edges.push(endpoints.map_err(|reason| cursor.error(reason))?);
    }

    Ok(GraphHeader { node_count, edges })
}

pub fn load_graph_file(path: &Path) -> Result<GraphHeader, GraphFileError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_graph_header(&mut reader)
}

pub fn save_graph_file(store: &Store, path: &Path) -> io::Result<()> {
    std::fs::write(path, store.serialize())?;
    log::info!("saved graph to {}", path.display());
    Ok(())
}

// ------------------------------------------------------------------
// Settings
// ------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] InvalidSetting),
}

pub fn load_settings(path: &Path) -> Result<LayoutSettings, SettingsError> {
    let json = std::fs::read_to_string(path)?;
    let settings: LayoutSettings = serde_json::from_str(&json)?;
    settings.validate()?;
    Ok(settings)
}

pub fn save_settings(
    settings: &LayoutSettings,
    path: &Path,
) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Settings from `path`, or the defaults when there is no file or it
/// cannot be used.
pub fn load_settings_or_default(path: Option<&Path>) -> LayoutSettings {
    let Some(path) = path else {
        return LayoutSettings::default();
    };
    match load_settings(path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!(
                "{}: {}. Using default layout settings.",
                path.display(),
                e
            );
            LayoutSettings::default()
        }
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimContext;
    use eframe::egui::Vec2;
    use std::io::{Cursor, Read};

    #[test]
    fn test_header_converts_to_zero_based() {
        let mut input = Cursor::new("3 2\n1 2\n2 3\n");
        let header = read_graph_header(&mut input).unwrap();
        assert_eq!(header.node_count, 3);
        assert_eq!(header.edges, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_header_stops_before_first_block() {
        let mut input = Cursor::new("2 1\n\n1 2\n1\nnc 1 255\n");
        read_graph_header(&mut input).unwrap();
        let mut rest = String::new();
        input.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "1\nnc 1 255\n");
    }

    #[test]
    fn test_header_errors_carry_line_numbers() {
        let err = read_graph_header(&mut Cursor::new("3 x\n")).unwrap_err();
        assert!(matches!(err, GraphFileError::Parse { line: 1, .. }));

        let err =
            read_graph_header(&mut Cursor::new("3 1\n1 4\n")).unwrap_err();
        assert!(matches!(err, GraphFileError::Parse { line: 2, .. }));

        let err =
            read_graph_header(&mut Cursor::new("3 2\n1 2\n")).unwrap_err();
        assert!(matches!(err, GraphFileError::Parse { .. }));

        let err = read_graph_header(&mut Cursor::new("")).unwrap_err();
        assert!(matches!(err, GraphFileError::Parse { .. }));
    }

    #[test]
    fn test_huge_edge_count_is_a_parse_error() {
        let err = read_graph_header(&mut Cursor::new(
            "3 18446744073709551615\n1 2\n",
        ))
        .unwrap_err();
        assert!(matches!(err, GraphFileError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_save_then_load_graph_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triangle.txt");

        let mut store = Store::new(LayoutSettings::default());
        let mut ctx = SimContext::seeded(Vec2::new(640.0, 480.0), 5);
        store.load(&mut ctx, 3, &[(0, 1), (1, 2), (2, 0)]).unwrap();
        save_graph_file(&store, &path).unwrap();

        let header = load_graph_file(&path).unwrap();
        assert_eq!(header.node_count, 3);
        assert_eq!(header.edges, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_settings_round_trip_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = LayoutSettings {
            force: 7.5,
            ..LayoutSettings::default()
        };
        save_settings(&settings, &path).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_settings(&path),
            Err(SettingsError::Json(_))
        ));
        assert_eq!(
            load_settings_or_default(Some(&path)),
            LayoutSettings::default()
        );
        assert_eq!(load_settings_or_default(None), LayoutSettings::default());
    }

    #[test]
    fn test_unusable_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        for json in [
            r#"{ "max_frame_dt": -1.0 }"#,
            r#"{ "full_size_nodes": 0.0 }"#,
        ] {
            std::fs::write(&path, json).unwrap();
            assert!(matches!(
                load_settings(&path),
                Err(SettingsError::Invalid(_))
            ));
            assert_eq!(
                load_settings_or_default(Some(&path)),
                LayoutSettings::default()
            );
        }
    }
}
