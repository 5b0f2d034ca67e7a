//! Line-oriented loaders that feed addresses into a [`Pool`].
//!
//! Every loader calls [`Pool::add`] once per line, so blank lines, `#`
//! comments and duplicates are skipped the same way regardless of source.
//! Read errors propagate; adding never fails. Each loader returns how many
//! new endpoints it created.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::{debug, info};
use slist_pool::Pool;

mod error;
mod http_source;

pub use error::IngestError;
pub use http_source::{DEFAULT_FETCH_TIMEOUT, load_from_url};

pub fn load_from_str(pool: &Pool, servers: &str) -> usize {
    servers.lines().filter(|line| pool.add(line)).count()
}

/// Lines that are not valid UTF-8 are decoded lossily rather than rejected.
pub fn load_from_reader<R: BufRead>(pool: &Pool, mut reader: R) -> Result<usize, IngestError> {
    let mut added = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if pool.add(&String::from_utf8_lossy(&buf)) {
            added += 1;
        }
    }
    Ok(added)
}

pub fn load_from_file<P: AsRef<Path>>(pool: &Pool, path: P) -> Result<usize, IngestError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| IngestError::File {
        path: path.display().to_string(),
        source: err,
    })?;

    let added = load_from_reader(pool, BufReader::new(file))?;
    debug!("Loaded {} endpoint(s) from {}", added, path.display());
    Ok(added)
}

/// Loads from a URL when `source` has an http(s) scheme, otherwise from a file.
pub async fn load_source(pool: &Pool, source: &str) -> Result<usize, IngestError> {
    let source = source.trim();
    let added = if source.starts_with("http://") || source.starts_with("https://") {
        load_from_url(pool, source).await?
    } else {
        load_from_file(pool, source)?
    };

    info!("Source {} added {} endpoint(s)", source, added);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read};

    use slist_pool::SelectMode;

    use super::*;

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            self.served = true;
            let data = b"10.0.0.1\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn load_from_str_skips_noise() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        let added = load_from_str(
            &pool,
            "\n\n# resolvers\n8.8.8.8\n  1.1.1.1  \n8.8.8.8\n   # 9.9.9.9\n8.8.4.4",
        );

        assert_eq!(added, 3);
        let list: Vec<String> = pool
            .list()
            .iter()
            .map(|e| e.address().to_string())
            .collect();
        assert_eq!(list, vec!["8.8.8.8", "1.1.1.1", "8.8.4.4"]);
    }

    #[test]
    fn load_from_str_handles_crlf() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        assert_eq!(load_from_str(&pool, "a\r\nb\r\n"), 2);
        assert!(pool.get("a").is_some());
    }

    #[test]
    fn load_from_reader_counts_new_only() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        pool.add("10.0.0.1");
        let added = load_from_reader(&pool, Cursor::new("10.0.0.1\n10.0.0.2\n")).unwrap();
        assert_eq!(added, 1);
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn load_from_reader_propagates_read_errors() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        let reader = BufReader::new(FailingReader { served: false });

        let err = load_from_reader(&pool, reader).unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
        // lines before the failure are kept
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn load_from_reader_accepts_non_utf8_lines() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        let added =
            load_from_reader(&pool, Cursor::new(&b"10.0.0.1\nhost-\xe9\n# caf\xe9\n10.0.0.2\n"[..]))
                .unwrap();

        assert_eq!(added, 3);
        assert!(pool.get("host-\u{fffd}").is_some());
        assert!(pool.get("10.0.0.2").is_some());
    }

    #[test]
    fn load_from_missing_file_fails() {
        let pool = Pool::new(SelectMode::RoundRobin, 10);
        let err = load_from_file(&pool, "/definitely/not/here.txt").unwrap_err();
        match err {
            IngestError::File { path, .. } => assert_eq!(path, "/definitely/not/here.txt"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
