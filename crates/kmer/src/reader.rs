// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::KmerFileError,
    model::{Extension, KmerPair, PackedKmer, KMER_LEN},
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

fn open(path: &Path) -> Result<BufReader<File>, KmerFileError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| KmerFileError::Io {
            path: path.display().to_string(),
            source,
        })
}

fn parse_line(path: &str, line_no: usize, line: &str) -> Result<KmerPair, KmerFileError> {
    let mut fields = line.split_whitespace();
    let (Some(key), Some(backward), Some(forward)) =
        (fields.next(), fields.next(), fields.next())
    else {
        return Err(KmerFileError::MalformedLine {
            path: path.to_string(),
            line: line_no,
            content: line.to_string(),
        });
    };

    let key = PackedKmer::from_str(key).ok_or_else(|| KmerFileError::WidthMismatch {
        path: path.to_string(),
        expected: KMER_LEN,
        found: key.len(),
    })?;

    let parse_ext = |s: &str| -> Result<Extension, KmerFileError> {
        let c = s.chars().next().ok_or_else(|| KmerFileError::MalformedLine {
            path: path.to_string(),
            line: line_no,
            content: line.to_string(),
        })?;
        Extension::from_char(c).ok_or(KmerFileError::BadExtension {
            path: path.to_string(),
            line: line_no,
            found: c,
        })
    };

    Ok(KmerPair {
        key,
        backward: parse_ext(backward)?,
        forward: parse_ext(forward)?,
    })
}

/// Counts the k-mer records in `path` without materializing them. Used
/// by the driver to size the table before construction.
pub fn count_kmers(path: &Path) -> Result<usize, KmerFileError> {
    let reader = open(path)?;
    Ok(reader.lines().filter(|l| l.as_ref().is_ok_and(|l| !l.trim().is_empty())).count())
}

/// Returns the k-mer key width of the first record in `path`, without
/// validating every line against it. The driver compares this against
/// the binary's compiled `KMER_LEN` before doing any real work.
pub fn kmer_width(path: &Path) -> Result<usize, KmerFileError> {
    let reader = open(path)?;
    for line in reader.lines() {
        let line = line.map_err(|source| KmerFileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(key) = line.split_whitespace().next() {
            return Ok(key.len());
        }
    }
    Err(KmerFileError::Empty {
        path: path.display().to_string(),
    })
}

/// Parses `path` and returns the contiguous block of records assigned to
/// `rank_me` out of `rank_n` ranks, partitioned by line number.
///
/// Every key's width is validated against the compiled [`KMER_LEN`];
/// the first mismatch is a fatal, typed error.
pub fn read_kmers(
    path: &Path,
    rank_n: usize,
    rank_me: usize,
) -> Result<Vec<KmerPair>, KmerFileError> {
    let path_str = path.display().to_string();
    let reader = open(path)?;
    let lines: Vec<String> = reader
        .lines()
        .collect::<Result<_, _>>()
        .map_err(|source| KmerFileError::Io {
            path: path_str.clone(),
            source,
        })?;
    let lines: Vec<&str> = lines
        .iter()
        .map(String::as_str)
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(KmerFileError::Empty {
            path: path_str,
        });
    }

    let total = lines.len();
    let chunk = total / rank_n + 1;
    let start = (rank_me * chunk).min(total);
    let end = ((rank_me + 1) * chunk).min(total);

    let mut kmers = Vec::with_capacity(end - start);
    for (offset, line) in lines[start..end].iter().enumerate() {
        kmers.push(parse_line(&path_str, start + offset + 1, line)?);
    }

    tracing::debug!(
        rank = rank_me,
        count = kmers.len(),
        "read k-mer partition"
    );
    Ok(kmers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(lines: &[&str]) -> tempfile_like::NamedFile {
        tempfile_like::NamedFile::with_contents(&lines.join("\n"))
    }

    /// A tiny hand-rolled temp-file helper so these tests don't need an
    /// extra dev-dependency just to write a fixture file.
    mod tempfile_like {
        use std::{
            fs,
            path::{Path, PathBuf},
        };

        pub struct NamedFile {
            path: PathBuf,
        }

        impl NamedFile {
            pub fn with_contents(contents: &str) -> Self {
                let path = std::env::temp_dir().join(format!(
                    "kmer-reader-test-{}-{:?}",
                    std::process::id(),
                    std::thread::current().id()
                ));
                fs::write(&path, contents).unwrap();
                Self { path }
            }

            pub fn path(&self) -> &Path {
                &self.path
            }
        }

        impl Drop for NamedFile {
            fn drop(&mut self) {
                let _ = fs::remove_file(&self.path);
            }
        }
    }

    fn sample_key(fill: u8) -> String {
        std::iter::repeat(fill as char).take(KMER_LEN).collect()
    }

    #[test]
    fn partitions_contiguous_blocks_across_ranks() {
        let k1 = sample_key(b'A');
        let k2 = sample_key(b'C');
        let lines = vec![
            format!("{k1} F A"),
            format!("{k2} A F"),
        ];
        let lines_ref: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = write_fixture(&lines_ref);

        let rank0 = read_kmers(file.path(), 2, 0).unwrap();
        let rank1 = read_kmers(file.path(), 2, 1).unwrap();
        assert_eq!(rank0.len() + rank1.len(), 2);
    }

    #[test]
    fn rejects_wrong_width_key() {
        let lines = ["ACGT F A"];
        let file = write_fixture(&lines);
        let err = read_kmers(file.path(), 1, 0).unwrap_err();
        assert!(matches!(err, KmerFileError::WidthMismatch { .. }));
    }

    #[test]
    fn rejects_unknown_extension_character() {
        let key = sample_key(b'A');
        let line = format!("{key} X A");
        let file = write_fixture(&[&line]);
        let err = read_kmers(file.path(), 1, 0).unwrap_err();
        assert!(matches!(err, KmerFileError::BadExtension { found: 'X', .. }));
    }

    #[test]
    fn kmer_width_reads_first_key_length() {
        let key = sample_key(b'G');
        let line = format!("{key} F F");
        let file = write_fixture(&[&line]);
        assert_eq!(kmer_width(file.path()).unwrap(), KMER_LEN);
    }

    #[test]
    fn count_kmers_ignores_blank_lines() {
        let key = sample_key(b'T');
        let lines = vec![format!("{key} F A"), String::new(), format!("{key} A F")];
        let lines_ref: Vec<&str> = lines.iter().map(String::as_str).collect();
        let file = write_fixture(&lines_ref);
        assert_eq!(count_kmers(file.path()).unwrap(), 2);
    }
}
