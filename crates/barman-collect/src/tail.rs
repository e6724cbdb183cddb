use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::error::CollectError;

/// Read at most `max_bytes` from the end of the file at `path`, realigned
/// to a record boundary.
///
/// When the file is shorter than `max_bytes` the whole file is returned:
/// offset 0 is a record boundary by definition. When the window starts
/// mid-file, everything up to and including the first newline is dropped so
/// the buffer never begins with a partial record; a window with no newline
/// at all is a line fragment and yields an empty buffer.
///
/// A missing or unreadable file is an error for this source only. Callers
/// decide containment; this function never panics and never retries.
pub async fn read_tail(path: &Path, max_bytes: u64) -> Result<Vec<u8>, CollectError> {
    let mut file = File::open(path)
        .await
        .map_err(|e| CollectError::unreadable(path, e))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| CollectError::unreadable(path, e))?
        .len();

    let start = len.saturating_sub(max_bytes);
    file.seek(SeekFrom::Start(start))
        .await
        .map_err(|e| CollectError::unreadable(path, e))?;

    let mut buf = Vec::with_capacity((len - start) as usize);
    file.read_to_end(&mut buf)
        .await
        .map_err(|e| CollectError::unreadable(path, e))?;

    if start == 0 {
        return Ok(buf);
    }

    match buf.iter().position(|&b| b == b'\n') {
        Some(i) => Ok(buf.split_off(i + 1)),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn fixture(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content).expect("write fixture");
        file
    }

    #[tokio::test]
    async fn short_file_is_returned_whole() {
        let file = fixture(b"1\tbkt\t0\t10\t20\tid-1\n2\tbkt\t0\t11\t21\tid-2\n");
        let buf = read_tail(file.path(), 4096).await.unwrap();
        assert_eq!(buf, b"1\tbkt\t0\t10\t20\tid-1\n2\tbkt\t0\t11\t21\tid-2\n");
    }

    #[tokio::test]
    async fn window_realigns_past_split_line() {
        // The window starts inside the first line; the result must begin at
        // the second line, never mid-record.
        let file = fixture(b"aaaa\tbbbb\tcccc\nsecond\tline\n");
        let buf = read_tail(file.path(), 15).await.unwrap();
        assert_eq!(buf, b"second\tline\n");
    }

    #[tokio::test]
    async fn mid_file_window_always_drops_its_first_line() {
        // Even when the window happens to begin at a line start, the reader
        // cannot tell it apart from a split line and drops up to the first
        // newline.
        let file = fixture(b"first\nsecond\nthird\n");
        let buf = read_tail(file.path(), 13).await.unwrap();
        assert_eq!(buf, b"third\n");
    }

    #[tokio::test]
    async fn fragment_without_newline_yields_empty() {
        let file = fixture(b"0123456789");
        let buf = read_tail(file.path(), 4).await.unwrap();
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn single_unterminated_line_shorter_than_window_is_kept() {
        let file = fixture(b"1\tbkt\t0\t10\t20\tid-1");
        let buf = read_tail(file.path(), 4096).await.unwrap();
        assert_eq!(buf, b"1\tbkt\t0\t10\t20\tid-1");
    }

    #[tokio::test]
    async fn empty_file_yields_empty() {
        let file = fixture(b"");
        let buf = read_tail(file.path(), 1024).await.unwrap();
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let err = read_tail(Path::new("/nonexistent/backup.log"), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Unreadable { .. }));
    }
}
