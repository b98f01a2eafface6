// Copyright The kmer-assemble Project Authors. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmerFileError {
    #[error("failed to open k-mer file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} contains {found}-mers, but this binary is compiled for {expected}-mers")]
    WidthMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("{path}:{line}: expected `<key> <backward> <forward>`, found {content:?}")]
    MalformedLine {
        path: String,
        line: usize,
        content: String,
    },

    #[error("{path}:{line}: unrecognized extension character {found:?}")]
    BadExtension {
        path: String,
        line: usize,
        found: char,
    },

    #[error("{path} contains no k-mers")]
    Empty { path: String },
}
