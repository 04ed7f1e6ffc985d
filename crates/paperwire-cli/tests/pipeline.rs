//! End-to-end pipeline tests for the four commands

use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use paperwire_cli::{open, pack, seal, unpack};
use paperwire_core::{seal_frame, ChunkEncoder, ChunkSet, EcLevel, Error, FrameKey, XzCodec};

/// Name a packed path appears under inside the archive (roots stripped).
fn archived_name(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

fn build_tree(root: &Path) -> Vec<u8> {
    let blob: Vec<u8> = (0..600u32).map(|i| ((i * 7 + 13) % 256) as u8).collect();
    fs::create_dir_all(root.join("notes")).unwrap();
    fs::write(root.join("readme.txt"), b"paper is a channel too\n").unwrap();
    fs::write(root.join("notes/blob.bin"), &blob).unwrap();
    blob
}

#[test]
fn test_pack_unpack_roundtrip() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("docs");
    let blob = build_tree(&input);

    let codes = work.path().join("codes");
    pack::run(pack::PackConfig {
        patterns: vec![input.to_string_lossy().into_owned()],
        level: EcLevel::M,
        max_version: 2,
        output_dir: codes.clone(),
    })
    .unwrap();

    // Multiple small-version codes, numbered from zero.
    assert!(codes.join("0.png").exists());
    assert!(codes.join("1.png").exists());

    let out = work.path().join("out");
    unpack::run(unpack::UnpackConfig {
        sources: vec![codes],
        output_dir: out.clone(),
        raw: false,
    })
    .unwrap();

    let restored = out.join(archived_name(&input));
    assert_eq!(
        fs::read(restored.join("readme.txt")).unwrap(),
        b"paper is a channel too\n"
    );
    assert_eq!(fs::read(restored.join("notes/blob.bin")).unwrap(), blob);
}

#[test]
fn test_unpack_missing_chunk_reports_index() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("docs");
    build_tree(&input);

    let codes = work.path().join("codes");
    pack::run(pack::PackConfig {
        patterns: vec![input.to_string_lossy().into_owned()],
        level: EcLevel::M,
        max_version: 2,
        output_dir: codes.clone(),
    })
    .unwrap();
    assert!(codes.join("2.png").exists(), "tree should span >2 chunks");

    // 1.png carries chunk index 2.
    fs::remove_file(codes.join("1.png")).unwrap();

    let out = work.path().join("out");
    let err = unpack::run(unpack::UnpackConfig {
        sources: vec![codes],
        output_dir: out.clone(),
        raw: false,
    })
    .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::MissingChunks { missing }) => assert_eq!(missing, &vec![2]),
        other => panic!("expected missing-chunk error, got {other:?}"),
    }
    assert!(!out.exists(), "no partial output on incomplete input");
}

#[test]
fn test_unpack_from_raw_digit_dumps() {
    let work = tempfile::tempdir().unwrap();
    let input = work.path().join("docs");
    let blob = build_tree(&input);

    // Chunk the compressed archive by hand and spread the digit strings
    // over decorated text dumps, the way transcribed scans arrive.
    let encoder = XzCodec::new().encoder(Vec::new()).unwrap();
    let mut archive = paperwire_core::ArchiveWriter::new(encoder);
    archive.append_path(&input).unwrap();
    let compressed = archive.finish().unwrap().finish().unwrap();

    let units = work.path().join("units");
    fs::create_dir_all(&units).unwrap();
    let chunks: Vec<_> = ChunkEncoder::new(&compressed, 100).unwrap().collect();
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        let unit = units.join(format!("scan-{:03}.txt", chunk.index));
        fs::write(&unit, format!("transcribed payload:\n{}\n", chunk.digits())).unwrap();
    }
    // Noise and a duplicate of the first chunk are both tolerated.
    fs::write(units.join("noise.txt"), b"nothing to see").unwrap();
    fs::write(
        units.join("scan-extra.txt"),
        format!("{}\n", chunks[0].digits()),
    )
    .unwrap();

    let out = work.path().join("out");
    unpack::run(unpack::UnpackConfig {
        sources: vec![units],
        output_dir: out.clone(),
        raw: true,
    })
    .unwrap();

    let restored = out.join(archived_name(&input));
    assert_eq!(fs::read(restored.join("notes/blob.bin")).unwrap(), blob);
}

#[test]
fn test_zero_run_chunk_count() {
    let zeros = vec![0u8; 10_000];
    let compressed = XzCodec::new().compress(&zeros).unwrap();

    let encoder = ChunkEncoder::new(&compressed, 100).unwrap();
    assert_eq!(encoder.total_chunks(), compressed.len().div_ceil(100));

    // Discovery order does not matter for reassembly.
    let mut set = ChunkSet::new();
    for chunk in encoder.collect::<Vec<_>>().into_iter().rev() {
        set.insert(chunk);
    }
    assert_eq!(set.reassemble().unwrap(), compressed);
    assert_eq!(XzCodec::new().decompress(&compressed).unwrap(), zeros);
}

#[test]
fn test_swapped_chunk_payloads_detected() {
    let data: Vec<u8> = (0..4_000u32).map(|i| (i % 97) as u8).collect();
    let compressed = XzCodec::new().compress(&data).unwrap();

    let mut chunks: Vec<_> = ChunkEncoder::new(&compressed, 64).unwrap().collect();
    assert!(chunks.len() >= 2);

    // Same index set, but the first two payloads trade places.
    let first = chunks[0].payload.clone();
    chunks[0].payload = chunks[1].payload.clone();
    chunks[1].payload = first;

    let mut set = ChunkSet::new();
    for chunk in chunks {
        set.insert(chunk);
    }
    // Completeness holds, so reassembly succeeds; the xz layer is what
    // catches the wrong content mapping.
    let garbled = set.reassemble().unwrap();
    assert!(matches!(
        XzCodec::new().decompress(&garbled),
        Err(Error::Stream(_))
    ));
}

#[test]
fn test_seal_then_open_batch() {
    let work = tempfile::tempdir().unwrap();
    let first = work.path().join("first.txt");
    let second = work.path().join("second.bin");
    fs::write(&first, b"frame one\n").unwrap();
    fs::write(&second, (0..512u32).map(|i| (i % 251) as u8).collect::<Vec<_>>()).unwrap();

    let key = FrameKey::derive("letmein");
    let mut text = Vec::new();
    seal::seal_paths(&key, &[first.clone(), second.clone()], &mut text).unwrap();
    assert_eq!(text.iter().filter(|&&b| b == b'\n').count(), 2);

    let out = work.path().join("out");
    fs::create_dir_all(&out).unwrap();
    let failures = open::open_lines(&key, Cursor::new(text), &out).unwrap();
    assert_eq!(failures, 0);
    assert_eq!(fs::read(out.join("0.bin")).unwrap(), b"frame one\n");
    assert_eq!(fs::read(out.join("1.bin")).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_frame_batch_survives_one_corrupt_line() {
    let key = FrameKey::derive("batch");
    let f0 = seal_frame(&key, b"alpha").unwrap();
    let mut f1 = seal_frame(&key, b"bravo").unwrap();
    let f2 = seal_frame(&key, b"charlie").unwrap();

    let mid = f1.len() / 2;
    f1[mid] = if f1[mid] == b'A' { b'B' } else { b'A' };
    let text = [f0, f1, f2].concat();

    let out = tempfile::tempdir().unwrap();
    let failures = open::open_lines(&key, Cursor::new(text), out.path()).unwrap();

    assert_eq!(failures, 1);
    assert_eq!(fs::read(out.path().join("0.bin")).unwrap(), b"alpha");
    assert!(!out.path().join("1.bin").exists());
    assert_eq!(fs::read(out.path().join("2.bin")).unwrap(), b"charlie");
}

#[test]
fn test_wrong_password_fails_every_frame() {
    let key = FrameKey::derive("right");
    let text = seal_frame(&key, b"secret payload").unwrap();

    let out = tempfile::tempdir().unwrap();
    let wrong = FrameKey::derive("wrong");
    let failures = open::open_lines(&wrong, Cursor::new(text), out.path()).unwrap();

    assert_eq!(failures, 1);
    assert!(!out.path().join("0.bin").exists());
}
