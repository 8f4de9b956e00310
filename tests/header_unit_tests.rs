#![allow(non_upper_case_globals)]

extern crate currawong;

use std::io::{Cursor, Seek, SeekFrom};

use currawong::io::headers::{
    ContainerHeader, LdOutputHeader, SortedLdHeader, GENOTYPE_MAGIC, LD_MAGIC,
};

#[test]
fn container_header_round_trips() {
    let mut header = ContainerHeader::new(2548, 24);
    header.controller = 0b101;

    let mut buffer = Vec::new();
    header.write_to(&mut buffer).unwrap();
    assert_eq!(&buffer[..GENOTYPE_MAGIC.len()], &GENOTYPE_MAGIC);

    let parsed = ContainerHeader::read_from(&mut Cursor::new(&buffer)).unwrap();
    assert_eq!(parsed, header);
}

#[test]
fn ld_output_header_round_trips() {
    let header = LdOutputHeader::new(1000, 22);

    let mut buffer = Vec::new();
    header.write_to(&mut buffer).unwrap();
    assert_eq!(&buffer[..LD_MAGIC.len()], &LD_MAGIC);

    let parsed = LdOutputHeader::read_from(&mut Cursor::new(&buffer)).unwrap();
    assert_eq!(parsed, header);
}

#[test]
fn sorted_header_carries_the_sorted_bit() {
    let mut header = SortedLdHeader::new(64, 1);
    header.n_entries = 120_000;
    assert!(!header.is_sorted());
    header.set_sorted(true);
    assert!(header.is_sorted());

    let mut buffer = Vec::new();
    header.write_to(&mut buffer).unwrap();
    let parsed = SortedLdHeader::read_from(&mut Cursor::new(&buffer)).unwrap();
    assert_eq!(parsed, header);
    assert!(parsed.is_sorted());
    assert_eq!(parsed.n_entries, 120_000);

    header.set_sorted(false);
    assert!(!header.is_sorted());
}

#[test]
fn mismatched_magic_is_rejected() {
    let mut buffer = Vec::new();
    ContainerHeader::new(10, 1).write_to(&mut buffer).unwrap();
    assert!(LdOutputHeader::read_from(&mut Cursor::new(&buffer)).is_err());

    let mut buffer = Vec::new();
    LdOutputHeader::new(10, 1).write_to(&mut buffer).unwrap();
    assert!(ContainerHeader::read_from(&mut Cursor::new(&buffer)).is_err());
}

#[test]
fn empty_panels_are_rejected() {
    let mut buffer = Vec::new();
    ContainerHeader::new(0, 5).write_to(&mut buffer).unwrap();
    assert!(ContainerHeader::read_from(&mut Cursor::new(&buffer)).is_err());

    let mut buffer = Vec::new();
    ContainerHeader::new(5, 0).write_to(&mut buffer).unwrap();
    assert!(ContainerHeader::read_from(&mut Cursor::new(&buffer)).is_err());
}

#[test]
fn truncated_headers_are_rejected() {
    let mut buffer = Vec::new();
    ContainerHeader::new(100, 3).write_to(&mut buffer).unwrap();
    buffer.truncate(buffer.len() - 1);
    assert!(ContainerHeader::read_from(&mut Cursor::new(&buffer)).is_err());
}

#[test]
fn headers_survive_a_file_round_trip() {
    let mut file = tempfile::tempfile().unwrap();

    let container = ContainerHeader::new(2548, 24);
    let mut sorted = SortedLdHeader::new(2548, 24);
    sorted.n_entries = 77;
    sorted.set_sorted(true);

    container.write_to(&mut file).unwrap();
    sorted.write_to(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    assert_eq!(ContainerHeader::read_from(&mut file).unwrap(), container);
    assert_eq!(SortedLdHeader::read_from(&mut file).unwrap(), sorted);
}
