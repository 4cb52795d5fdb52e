// Copyright 2024
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for file-level splitting.
//!
//! These tests split real files on disk and verify that the shards,
//! decompressed where needed, reassemble into the original input.

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use rand::Rng;
use tempfile::{tempdir, TempDir};

use linesplit::config::{SplitConfig, SplitMode};
use linesplit::error::Result;
use linesplit::parallel::chunk_queue::Dispatch;
use linesplit::splitter::Splitter;

/// Writes `content` to a file named `name` in a fresh temp directory.
fn input_file(name: &str, content: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write input");
    (dir, path)
}

fn read_shard(path: &Path, mode: SplitMode) -> Vec<u8> {
    let raw = fs::read(path).expect("Failed to read shard");
    match mode {
        SplitMode::Plain => raw,
        SplitMode::Gzip { .. } => {
            let mut decoded = Vec::new();
            GzDecoder::new(&raw[..])
                .read_to_end(&mut decoded)
                .expect("Shard is not a valid gzip stream");
            decoded
        }
    }
}

fn lines_of(data: &[u8]) -> Vec<Vec<u8>> {
    data.split_inclusive(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}

/// Splits `content` and returns the decoded shard contents in shard order.
fn split(content: &[u8], shards: usize, mode: SplitMode) -> Result<Vec<Vec<u8>>> {
    let (dir, input) = input_file("input.txt", content);
    let out = dir.path().join("out");

    let splitter = Splitter::new(
        SplitConfig::new(&input, shards, mode).with_output_dir(&out),
    )?;
    splitter.run()?;

    let paths = splitter.output_paths()?;
    assert_eq!(fs::read_dir(&out)?.count(), shards);
    Ok(paths.iter().map(|p| read_shard(p, mode)).collect())
}

/// Every input line ends up in exactly one shard and nothing else does.
fn assert_reassembles(content: &[u8], shards: &[Vec<u8>]) {
    let mut expected: HashMap<Vec<u8>, usize> = HashMap::new();
    for line in lines_of(content) {
        *expected.entry(line).or_default() += 1;
    }

    let mut actual: HashMap<Vec<u8>, usize> = HashMap::new();
    for shard in shards {
        for line in lines_of(shard) {
            *actual.entry(line).or_default() += 1;
        }
    }

    assert_eq!(actual, expected);
    assert_eq!(shards.iter().map(Vec::len).sum::<usize>(), content.len());
}

#[test]
fn test_plain_three_lines_three_shards() -> Result<()> {
    let content = b"a\nb\nc\n";
    let shards = split(content, 3, SplitMode::Plain)?;
    assert_eq!(shards.len(), 3);
    assert_reassembles(content, &shards);
    Ok(())
}

#[test]
fn test_gzip_single_shard_without_newline() -> Result<()> {
    let (dir, input) = input_file("abc.txt", b"abc");
    let out = dir.path().join("out");

    Splitter::new(SplitConfig::new(&input, 1, SplitMode::gzip()).with_output_dir(&out))?.run()?;

    let shard = out.join("abc.txt.gz");
    assert!(shard.exists());
    assert_eq!(read_shard(&shard, SplitMode::gzip()), b"abc");
    Ok(())
}

#[test]
fn test_gzip_shards_are_standalone_streams() -> Result<()> {
    let content: Vec<u8> = (0..10_000)
        .flat_map(|i| format!("record number {}\n", i).into_bytes())
        .collect();
    let shards = split(&content, 4, SplitMode::gzip())?;
    assert_reassembles(&content, &shards);
    Ok(())
}

#[test]
fn test_empty_input_creates_empty_shards() -> Result<()> {
    let plain = split(b"", 3, SplitMode::Plain)?;
    assert!(plain.iter().all(Vec::is_empty));

    let compressed = split(b"", 2, SplitMode::gzip())?;
    assert!(compressed.iter().all(Vec::is_empty));
    Ok(())
}

#[test]
fn test_megabyte_line_is_never_split() -> Result<()> {
    let mut content = vec![b'q'; 1_000_000];
    content.push(b'\n');
    let shards = split(&content, 3, SplitMode::Plain)?;

    let holders: Vec<_> = shards.iter().filter(|s| !s.is_empty()).collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0], &content);
    Ok(())
}

#[test]
fn test_random_content_round_trips() -> Result<()> {
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        let mut content = Vec::new();
        for _ in 0..rng.gen_range(1..2_000) {
            let len = rng.gen_range(0..10_000);
            content.extend((0..len).map(|_| rng.gen_range(0x20u8..0x7f)));
            content.push(b'\n');
        }

        let shards = rng.gen_range(2..6);
        let mode = if rng.gen_bool(0.5) {
            SplitMode::Plain
        } else {
            SplitMode::Gzip { level: rng.gen_range(0..=9) }
        };
        let outputs = split(&content, shards, mode)?;
        assert_reassembles(&content, &outputs);
    }
    Ok(())
}

#[test]
fn test_round_robin_output_is_reproducible() -> Result<()> {
    let content: Vec<u8> = (0..999).flat_map(|i| format!("{}\n", i).into_bytes()).collect();
    let (dir, input) = input_file("numbers.txt", &content);

    let mut runs = Vec::new();
    for run in 0..2 {
        let out = dir.path().join(format!("run-{}", run));
        let splitter = Splitter::new(
            SplitConfig::new(&input, 3, SplitMode::Plain)
                .with_output_dir(&out)
                .with_dispatch(Dispatch::RoundRobin),
        )?;
        splitter.run()?;
        let contents: Vec<Vec<u8>> = splitter
            .output_paths()?
            .iter()
            .map(|p| read_shard(p, SplitMode::Plain))
            .collect();
        runs.push(contents);
    }

    assert_eq!(runs[0], runs[1]);
    assert!(runs[0][0].starts_with(b"0\n3\n6\n"));
    Ok(())
}
