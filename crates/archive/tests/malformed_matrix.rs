use keyed_archive::{archive, unarchive, ArchiveError, ArchiveValue, KeyedArchiver};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

fn sample() -> ArchiveValue {
    ArchiveValue::map([
        ("name", ArchiveValue::from("session")),
        ("count", ArchiveValue::from(3)),
        (
            "tags",
            ArchiveValue::Array(vec![ArchiveValue::from("a"), ArchiveValue::from("b")]),
        ),
        ("payload", ArchiveValue::Bytes(vec![0xab; 40])),
    ])
}

#[test]
fn empty_buffer_is_absent() {
    assert_eq!(unarchive(&[]), None);
    assert_eq!(KeyedArchiver::new().try_decode(&[]), Err(ArchiveError::Empty));
}

#[test]
fn truncated_buffer_is_absent() {
    let bytes = archive(&sample()).unwrap();
    assert!(bytes.len() > 10);
    let truncated = &bytes[..bytes.len() - 10];
    assert_eq!(unarchive(truncated), None);
    assert_eq!(
        KeyedArchiver::new().try_decode(truncated),
        Err(ArchiveError::Truncated)
    );
}

#[test]
fn every_prefix_is_absent() {
    let bytes = archive(&sample()).unwrap();
    for len in 0..bytes.len() {
        assert_eq!(unarchive(&bytes[..len]), None, "prefix of {len} bytes");
    }
}

#[test]
fn foreign_formats_are_absent() {
    let foreign: [&[u8]; 5] = [
        b"{\"name\":\"session\"}",
        b"bplist00\xd1\x01\x02",
        b"\x89PNG\r\n\x1a\n",
        b"\xa1\x61a\x01",
        b"KARC",
    ];
    for bytes in foreign {
        assert_eq!(unarchive(bytes), None);
    }
}

#[test]
fn random_garbage_is_absent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..2000 {
        let len = rng.gen_range(0..128);
        let mut bytes = vec![0u8; len];
        rng.fill_bytes(&mut bytes);
        assert_eq!(unarchive(&bytes), None);
    }
}

#[test]
fn garbage_after_valid_header_never_panics() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5000 {
        let len = rng.gen_range(0..64);
        let mut bytes = b"KARC\x01".to_vec();
        bytes.extend((0..len).map(|_| rng.gen::<u8>()));
        let _ = unarchive(&bytes);
    }
}

#[test]
fn corrupted_bytes_never_panic() {
    let bytes = archive(&sample()).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..2000 {
        let mut corrupted = bytes.clone();
        let at = rng.gen_range(0..corrupted.len());
        corrupted[at] = rng.gen();
        let _ = unarchive(&corrupted);
    }
}

#[test]
fn unknown_tag_is_absent_not_partial() {
    let mut bytes = archive(&ArchiveValue::map([
        ("ok", ArchiveValue::from(1)),
        ("later", ArchiveValue::Null),
    ]))
    .unwrap();
    // Replace the trailing null with tag 4 (decimal fraction) around an empty array.
    bytes.pop();
    bytes.extend_from_slice(&[0xc4, 0x80]);
    assert_eq!(unarchive(&bytes), None);
    assert_eq!(
        KeyedArchiver::new().try_decode(&bytes),
        Err(ArchiveError::UnknownTag(4))
    );
}

#[test]
fn newer_format_version_is_absent() {
    let mut bytes = archive(&sample()).unwrap();
    bytes[4] = 0xff;
    assert_eq!(
        KeyedArchiver::new().try_decode(&bytes),
        Err(ArchiveError::UnsupportedVersion(0xff))
    );
}

#[test]
fn trailing_bytes_are_rejected() {
    let mut bytes = archive(&sample()).unwrap();
    bytes.extend_from_slice(&[0, 0]);
    assert_eq!(
        KeyedArchiver::new().try_decode(&bytes),
        Err(ArchiveError::TrailingBytes(2))
    );
}

#[test]
fn invalid_utf8_string_is_absent() {
    assert_eq!(
        KeyedArchiver::new().try_decode(b"KARC\x01\x62\xff\xfe"),
        Err(ArchiveError::InvalidUtf8)
    );
}

#[test]
fn huge_declared_lengths_do_not_allocate() {
    // Byte string, array and map each claiming u64::MAX entries.
    for head in [0x5b, 0x9b, 0xbb] {
        let mut bytes = b"KARC\x01".to_vec();
        bytes.push(head);
        bytes.extend_from_slice(&[0xff; 8]);
        assert_eq!(unarchive(&bytes), None);
    }
}

#[test]
fn deeply_nested_garbage_hits_depth_limit() {
    let mut bytes = b"KARC\x01".to_vec();
    bytes.extend(std::iter::repeat(0x81).take(100_000));
    bytes.push(0xf6);
    assert_eq!(
        KeyedArchiver::new().try_decode(&bytes),
        Err(ArchiveError::DepthLimitExceeded(512))
    );
}

#[test]
fn long_tag_chain_is_rejected_without_recursion() {
    let mut bytes = b"KARC\x01".to_vec();
    bytes.extend(std::iter::repeat(0xc1).take(100_000));
    bytes.push(0x01);
    assert!(matches!(
        KeyedArchiver::new().try_decode(&bytes),
        Err(ArchiveError::InvalidTypedValue { .. })
    ));
}
