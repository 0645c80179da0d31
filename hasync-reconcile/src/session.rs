//! Transactional access to the persisted configuration record.

use std::path::{Path, PathBuf};

use config_tree::{changes, parse_file, write_file, Change, ConfigNode};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fields::HASYNC;
use crate::plan::ChangeSet;

/// One load of `config.xml`, edited in memory and either committed or dropped.
///
/// The snapshot taken at open time is kept unchanged so the session can tell
/// whether anything changed and produce a diff. Dropping a session without
/// calling [`ConfigSession::save`] leaves the file untouched.
#[derive(Debug)]
pub struct ConfigSession {
    path: PathBuf,
    context: String,
    original: ConfigNode,
    working: ConfigNode,
    saved: bool,
}

impl ConfigSession {
    pub fn open(path: &Path, context: &str) -> Result<Self> {
        let tree = parse_file(path)?;
        debug!(path = %path.display(), context, "opened config session");
        Ok(Self::from_tree(tree, path, context))
    }

    /// Start a session over an already-parsed record.
    pub fn from_tree(tree: ConfigNode, path: &Path, context: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            context: context.to_string(),
            original: tree.clone(),
            working: tree,
            saved: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// The current working tree.
    pub fn root(&self) -> &ConfigNode {
        &self.working
    }

    /// Apply a whole plan, or nothing if any mutation fails.
    pub fn apply_plan(&mut self, plan: &ChangeSet) -> Result<()> {
        let mut next = self.working.clone();
        plan.apply(&mut next)?;
        self.working = next;
        Ok(())
    }

    /// `true` exactly when [`ConfigSession::diff`] has something to report.
    pub fn changed(&self) -> bool {
        !self.diff().is_empty()
    }

    /// Differences in the HA block between open time and now.
    pub fn diff(&self) -> Vec<Change> {
        changes(
            self.original.get_child(HASYNC),
            self.working.get_child(HASYNC),
        )
    }

    /// Write the working tree back to the record file.
    pub fn save(&mut self) -> Result<()> {
        write_file(&self.working, &self.path)?;
        self.original = self.working.clone();
        self.saved = true;
        info!(path = %self.path.display(), context = %self.context, "config saved");
        Ok(())
    }
}

impl Drop for ConfigSession {
    fn drop(&mut self) {
        if self.changed() {
            warn!(
                context = %self.context,
                "discarding uncommitted changes to {}",
                self.path.display()
            );
        } else if !self.saved {
            debug!(context = %self.context, "config session closed without changes");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use config_tree::parse;

    use super::ConfigSession;
    use crate::plan::ChangeSet;

    const RECORD: &str = r#"<?xml version="1.0"?>
<opnsense><hasync><pfsyncinterface>lan</pfsyncinterface></hasync></opnsense>"#;

    #[test]
    fn failed_plan_leaves_working_tree_unchanged() {
        let tree = parse(br#"<opnsense/>"#).expect("parse");
        let mut session = ConfigSession::from_tree(tree, Path::new("config.xml"), "test");
        let mut plan = ChangeSet::default();
        plan.set("pfsyncenabled", "on");

        assert!(session.apply_plan(&plan).is_err());
        assert!(!session.changed());
    }

    #[test]
    fn save_persists_and_resets_change_tracking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.xml");
        fs::write(&path, RECORD).expect("seed");

        let mut session = ConfigSession::open(&path, "test").expect("open");
        let mut plan = ChangeSet::default();
        plan.set("pfsyncenabled", "on");
        session.apply_plan(&plan).expect("apply");
        assert!(session.changed());
        assert_eq!(session.diff().len(), 1);
        assert_eq!(
            session.root().get_text(&["hasync", "pfsyncenabled"]),
            Some("on")
        );

        session.save().expect("save");
        assert!(!session.changed());
        drop(session);

        let reopened = ConfigSession::open(&path, "test").expect("reopen");
        assert_eq!(
            reopened.root().get_text(&["hasync", "pfsyncenabled"]),
            Some("on")
        );
    }

    #[test]
    fn dropped_session_does_not_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.xml");
        fs::write(&path, RECORD).expect("seed");

        {
            let mut session = ConfigSession::open(&path, "test").expect("open");
            let mut plan = ChangeSet::default();
            plan.remove("pfsyncinterface");
            session.apply_plan(&plan).expect("apply");
        }

        assert_eq!(fs::read_to_string(&path).expect("read"), RECORD);
    }
}
