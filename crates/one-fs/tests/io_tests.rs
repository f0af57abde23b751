use one_fs::io;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join(".npminstall.done");

    io::write_atomic(&path, b"done").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "done");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("test.txt");
    fs::write(&file_path, "original").unwrap();

    io::write_atomic(&file_path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_file() {
    let temp = TempDir::new().unwrap();
    io::write_atomic(&temp.path().join("a.txt"), b"x").unwrap();

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt".to_string()]);
}

#[test]
fn test_read_text_nonexistent_file() {
    let result = io::read_text(std::path::Path::new("/nonexistent/file.txt"));
    assert!(matches!(result, Err(one_fs::Error::Io { .. })));
}

#[test]
fn test_remove_dir_if_exists() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("partial");
    fs::create_dir_all(dir.join("lib")).unwrap();
    fs::write(dir.join("lib/index.js"), "").unwrap();

    io::remove_dir_if_exists(&dir).unwrap();
    assert!(!dir.exists());

    // Second removal is a no-op
    io::remove_dir_if_exists(&dir).unwrap();
}
