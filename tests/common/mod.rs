//! Common test utilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

use bake::Context;

/// Create a temporary directory with a bake.yml file
pub fn create_test_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("bake.yml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

/// Create a test config with an empty subdirectory next to it
pub fn create_test_config_in_subdir(content: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, config_path) = create_test_config(content);
    let sub_dir = temp_dir.path().join("subdir");
    fs::create_dir(&sub_dir).unwrap();
    (temp_dir, config_path, sub_dir)
}

/// Shared record of which callbacks ran, in order
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Action that appends `entry` to the journal
pub fn record(journal: &Journal, entry: &str) -> impl Fn(&mut Context) -> anyhow::Result<()> + 'static {
    let journal = Rc::clone(journal);
    let entry = entry.to_string();
    move |_ctx| {
        journal.borrow_mut().push(entry.clone());
        Ok(())
    }
}

/// Action that appends `entry` to the journal, then fails
pub fn record_and_fail(journal: &Journal, entry: &str) -> impl Fn(&mut Context) -> anyhow::Result<()> + 'static {
    let journal = Rc::clone(journal);
    let entry = entry.to_string();
    move |_ctx| {
        journal.borrow_mut().push(entry.clone());
        anyhow::bail!("{entry} failed")
    }
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
