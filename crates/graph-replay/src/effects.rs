use crate::serialization::{self, GraphFileError};
use crate::state::{LogSource, Session};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Deferred effects that must run outside the main reducer (file IO)
#[derive(Debug, Clone)]
pub enum Effect {
    /// Load a graph header and replay the action groups after it
    OpenLog { path: PathBuf },
    /// Load a saved graph; there is nothing to replay
    OpenGraph { path: PathBuf },
    /// Write the current graph in adjacency form
    SaveGraph { path: PathBuf },
}

fn open_log(session: &mut Session, path: &Path) -> Result<(), GraphFileError> {
    let source: LogSource = Box::new(BufReader::new(File::open(path)?));
    session.open_log(source)?;
    session.log_path = Some(path.to_path_buf());
    log::info!("replaying {}", path.display());
    Ok(())
}

fn open_graph(
    session: &mut Session,
    path: &Path,
) -> Result<(), GraphFileError> {
    let header = serialization::load_graph_file(path)?;
    session.open_graph(&header)?;
    session.log_path = None;
    Ok(())
}

/// Execute a single effect against the session
pub fn run(session: &mut Session, effect: Effect) {
    match effect {
        Effect::OpenLog { path } => {
            if let Err(e) = open_log(session, &path) {
                session.report(format!("{}: {}", path.display(), e));
            }
        }
        Effect::OpenGraph { path } => {
            if let Err(e) = open_graph(session, &path) {
                session.report(format!("{}: {}", path.display(), e));
            }
        }
        Effect::SaveGraph { path } => {
            if let Err(e) =
                serialization::save_graph_file(&session.store, &path)
            {
                session.report(format!("{}: {}", path.display(), e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_settings::LayoutSettings;
    use crate::sim::SimContext;
    use eframe::egui::Vec2;

    fn session() -> Session {
        Session::new(
            LayoutSettings::default(),
            SimContext::seeded(Vec2::new(800.0, 600.0), 8),
        )
    }

    #[test]
    fn test_open_log_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("GraphLog.txt");
        std::fs::write(&path, "3 2\n1 2\n2 3\n1\nnc 2 255\n").unwrap();

        let mut s = session();
        run(&mut s, Effect::OpenLog { path: path.clone() });
        assert_eq!(s.error_message, None);
        assert_eq!(s.log_path.as_deref(), Some(path.as_path()));
        assert!(s.replay.step_forward(&mut s.store).unwrap());
        assert_eq!(s.store.node(1).unwrap().highlight.packed(), 255);
    }

    #[test]
    fn test_missing_log_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session();
        run(
            &mut s,
            Effect::OpenLog {
                path: dir.path().join("missing.txt"),
            },
        );
        assert!(s.error_message.is_some());
        assert_eq!(s.store.node_count(), 0);
    }

    #[test]
    fn test_save_then_open_graph() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("GraphLog.txt");
        let saved = dir.path().join("saved.txt");
        std::fs::write(&log, "4 3\n1 2\n2 3\n3 4\n1\nea 1 4\n").unwrap();

        let mut s = session();
        run(&mut s, Effect::OpenLog { path: log });
        s.replay.step_forward(&mut s.store).unwrap();
        s.store.delete_node(1).unwrap();
        run(&mut s, Effect::SaveGraph { path: saved.clone() });
        assert_eq!(
            std::fs::read_to_string(&saved).unwrap(),
            "3 2\n2 3\n1 3\n"
        );

        run(&mut s, Effect::OpenGraph { path: saved });
        assert_eq!(s.error_message, None);
        assert_eq!(s.store.node_count(), 3);
        assert_eq!(s.store.edge_count(), 2);
        assert_eq!(s.replay.loaded(), 0);
        assert_eq!(s.log_path, None);
    }
}
