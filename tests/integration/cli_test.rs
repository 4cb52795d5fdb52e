//! End-to-end tests of the `splitl` and `fastgzip` binaries.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Output};

use flate2::read::GzDecoder;
use tempfile::tempdir;

fn splitl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_splitl"))
        .args(args)
        .output()
        .expect("Failed to run splitl")
}

fn fastgzip(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fastgzip"))
        .args(args)
        .output()
        .expect("Failed to run fastgzip")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("Temp paths are UTF-8")
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn test_splitl_splits_into_n_files() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.txt");
    fs::write(&input, b"a\nb\nc\n").unwrap();
    let out = dir.path().join("out");

    let output = splitl(&["-f", path_str(&input), "-n", "3", "-d", path_str(&out)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let mut joined = Vec::new();
    for i in 1..=3 {
        let shard = fs::read(out.join(format!("data.{}.txt", i))).unwrap();
        assert!(shard.len() <= 6);
        joined.extend(shard);
    }
    joined.sort_unstable();
    let mut expected = b"a\nb\nc\n".to_vec();
    expected.sort_unstable();
    assert_eq!(joined, expected);
}

#[test]
fn test_splitl_accepts_positional_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.txt");
    fs::write(&input, b"x\ny\n").unwrap();

    let output = splitl(&["-n", "2", "-d", path_str(dir.path()), path_str(&input)]);
    assert!(output.status.success());
    assert!(dir.path().join("data.1.txt").exists());
    assert!(dir.path().join("data.2.txt").exists());
}

#[test]
fn test_splitl_rejects_single_shard() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.txt");
    fs::write(&input, b"a\n").unwrap();
    let out = dir.path().join("out");

    let output = splitl(&["-f", path_str(&input), "-n", "1", "-d", path_str(&out)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("split number must be greater than 1"), "stderr: {}", stderr);
    assert_eq!(file_count(&out), 0);
}

#[test]
fn test_splitl_requires_input() {
    let output = splitl(&["-n", "2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("input file is required"));
}

#[test]
fn test_invalid_flag_value_exits_with_one() {
    let output = splitl(&["-f", "data.txt", "-n", "many"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_input_file_exits_with_one() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.txt");

    let output = splitl(&["-f", path_str(&missing), "-n", "2", "-d", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Error: open file"), "stderr: {}", stderr);
}

#[test]
fn test_fastgzip_single_shard() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("abc.txt");
    fs::write(&input, b"abc").unwrap();
    let out = dir.path().join("gz");

    let output = fastgzip(&["-f", path_str(&input), "-d", path_str(&out)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let mut decoded = Vec::new();
    GzDecoder::new(fs::File::open(out.join("abc.txt.gz")).unwrap())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(decoded, b"abc");
    assert_eq!(file_count(&out), 1);
}

#[test]
fn test_fastgzip_multiple_shards() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("log.txt");
    let content: Vec<u8> = (0..500).flat_map(|i| format!("line {}\n", i).into_bytes()).collect();
    fs::write(&input, &content).unwrap();

    let output = fastgzip(&["-f", path_str(&input), "-n", "3", "-d", path_str(dir.path())]);
    assert!(output.status.success());

    let mut total = 0;
    for i in 1..=3 {
        let mut decoded = Vec::new();
        GzDecoder::new(fs::File::open(dir.path().join(format!("log.txt.{}.gz", i))).unwrap())
            .read_to_end(&mut decoded)
            .unwrap();
        total += decoded.len();
    }
    assert_eq!(total, content.len());
}

#[test]
fn test_fastgzip_refuses_to_decompress() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.gz");
    fs::write(&input, b"whatever").unwrap();
    let out = dir.path().join("out");

    let output = fastgzip(&["-f", path_str(&input), "-d", path_str(&out)]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("decompression is not supported"), "stderr: {}", stderr);
    assert!(!out.exists());
}

#[test]
fn test_help_exits_with_zero() {
    let output = fastgzip(&["--help"]);
    assert!(output.status.success());
}

#[test]
fn test_fastgzip_level_round_robin_and_read_buffer() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("rows.txt");
    let content: Vec<u8> = (0..10).flat_map(|i| format!("row {}\n", i).into_bytes()).collect();
    fs::write(&input, &content).unwrap();
    let out = dir.path().join("out");

    let output = fastgzip(&[
        "-f",
        path_str(&input),
        "-n",
        "2",
        "-l",
        "1",
        "--round-robin",
        "--read-buffer",
        "4",
        "-d",
        path_str(&out),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let decode = |name: &str| {
        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(out.join(name)).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        decoded
    };

    // Strict rotation: even rows in the first shard, odd rows in the second
    assert_eq!(decode("rows.txt.1.gz"), "row 0\nrow 2\nrow 4\nrow 6\nrow 8\n");
    assert_eq!(decode("rows.txt.2.gz"), "row 1\nrow 3\nrow 5\nrow 7\nrow 9\n");
}

#[test]
fn test_fastgzip_rejects_invalid_level() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("rows.txt");
    fs::write(&input, b"row\n").unwrap();

    let output = fastgzip(&["-f", path_str(&input), "-l", "12", "-d", path_str(dir.path())]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("compression level"));
}
