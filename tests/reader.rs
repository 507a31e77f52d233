mod common;

use std::fs;

use common::{complex_payload, format_xml, write_ildg};
use lattice_reader::{ElementMetaData, ErrorKind, IldgFile, RawFile};

#[test]
fn same_path_returns_first_state_despite_new_metadata() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.bin");
    fs::write(&path, vec![0u8; 24 * 8]).expect("write");

    let first = ElementMetaData::new(vec![2, 3, 4], "<f8", 0).expect("element");
    let second = ElementMetaData::new(vec![6, 4], ">i4", 0).expect("element");

    let mut reader = RawFile::new();
    reader.open(&path, &first).expect("first open").read(0usize).expect("read");

    let file = reader.open(&path, &second).expect("second open");
    assert_eq!(file.shape(), &[2, 3, 4]);
    assert_eq!(file.dtype().to_string(), "<f8");
    // Counters survive the cache hit: it is the same handle.
    assert_eq!(file.stats().reads, 1);
}

#[test]
fn different_path_replaces_the_held_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = dir.path().join("a.bin");
    let b = dir.path().join("b.bin");
    fs::write(&a, vec![0u8; 16]).expect("write a");
    fs::write(&b, vec![0u8; 32]).expect("write b");

    let mut reader = RawFile::new();
    let small = ElementMetaData::new(vec![2], "<f8", 0).expect("element");
    let large = ElementMetaData::new(vec![4], "<f8", 0).expect("element");

    reader.open(&a, &small).expect("open a").read(1usize).expect("read a");
    let file = reader.open(&b, &large).expect("open b");
    assert_eq!(file.path(), b.as_path());
    assert_eq!(file.shape(), &[4]);
    assert_eq!(file.stats().reads, 0);

    let file = reader.open(&a, &large).expect("reopen a");
    assert_eq!(file.shape(), &[4], "reopening after eviction uses the new metadata");
}

#[test]
fn failed_open_leaves_the_reader_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = write_ildg(&dir.path().join("good.lime"), &format_xml(64), &complex_payload(4));
    let bad = dir.path().join("bad.lime");
    fs::write(&bad, b"not a lime file").expect("write bad");

    let element = ElementMetaData::new(vec![4], ">c16", 0).expect("element");
    let mut reader = IldgFile::new();
    reader.open(&good, &element).expect("open good");
    assert!(reader.current().is_some());

    let err = reader.open(&bad, &element).expect_err("open bad");
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(reader.current().is_none());

    reader.open(&good, &element).expect("reopen good");
    let owned = reader.close().expect("held handle");
    assert_eq!(owned.path(), good.as_path());
    assert!(reader.current().is_none());
}
