use std::fs;
use std::path::PathBuf;

use renderer::clean::{find_orphans, remove_files};
use renderer::ProcessError;
use tempfile::TempDir;

const KEPT: &str = "render-00000000000000000000000000000001.svg";
const ORPHAN_SVG: &str = "render-00000000000000000000000000000002.svg";
const ORPHAN_PNG: &str = "render-00000000000000000000000000000003.png";

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let dir = TempDir::new().unwrap();
    let images = dir.path().join("images");
    fs::create_dir(&images).unwrap();
    for name in [KEPT, ORPHAN_SVG, ORPHAN_PNG, "logo.svg", "render-notes.txt", "arch.png"] {
        fs::write(images.join(name), "").unwrap();
    }
    fs::create_dir(images.join("render-00000000000000000000000000000004.svg")).unwrap();

    let doc = dir.path().join("doc.md");
    fs::write(&doc, format!("![{0}](images/{0})\n\n```dot render\n```\n", KEPT)).unwrap();
    (dir, images, doc)
}

#[test]
fn finds_unreferenced_renders_only() {
    let (_dir, images, doc) = setup();
    let orphans = find_orphans(&[&doc], &images).unwrap();
    assert_eq!(orphans, vec![images.join(ORPHAN_SVG), images.join(ORPHAN_PNG)]);
}

#[test]
fn references_from_any_document_keep_an_image() {
    let (dir, images, doc) = setup();
    let other = dir.path().join("other.md");
    fs::write(&other, format!("See ![diagram](images/{})", ORPHAN_PNG)).unwrap();

    let orphans = find_orphans(&[&doc, &other], &images).unwrap();
    assert_eq!(orphans, vec![images.join(ORPHAN_SVG)]);
}

#[test]
fn removes_orphans() {
    let (_dir, images, doc) = setup();
    let orphans = find_orphans(&[&doc], &images).unwrap();
    remove_files(&orphans).unwrap();

    assert!(images.join(KEPT).exists());
    assert!(images.join("logo.svg").exists());
    assert!(!images.join(ORPHAN_SVG).exists());
    assert!(!images.join(ORPHAN_PNG).exists());
    assert!(find_orphans(&[&doc], &images).unwrap().is_empty());
}

#[test]
fn unreadable_inputs_are_errors() {
    let (dir, images, doc) = setup();

    let err = find_orphans(&[dir.path().join("missing.md")], &images).unwrap_err();
    assert!(matches!(err, ProcessError::Read { .. }), "{:?}", err);

    let err = find_orphans(&[&doc], &dir.path().join("no-images")).unwrap_err();
    assert!(matches!(err, ProcessError::Read { .. }), "{:?}", err);

    let err = remove_files(&[images.join("gone.svg")]).unwrap_err();
    assert!(matches!(err, ProcessError::Remove { .. }), "{:?}", err);
}
