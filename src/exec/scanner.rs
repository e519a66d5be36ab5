// src/exec/scanner.rs

/// Streaming substring detector for process output.
///
/// Output arrives in arbitrary chunks, so the marker can be split across two
/// reads. The scanner keeps the last `marker.len() - 1` bytes between calls.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    marker: Vec<u8>,
    tail: Vec<u8>,
    found: bool,
}

impl MarkerScanner {
    pub fn new(marker: impl AsRef<[u8]>) -> Self {
        Self {
            marker: marker.as_ref().to_vec(),
            tail: Vec::new(),
            found: false,
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    /// Feed the next chunk. Returns `true` only for the chunk that completes
    /// the first occurrence of the marker.
    pub fn feed(&mut self, chunk: &[u8]) -> bool {
        if self.found {
            return false;
        }
        if self.marker.is_empty() {
            self.found = true;
            return true;
        }

        let mut window = std::mem::take(&mut self.tail);
        window.extend_from_slice(chunk);

        if window
            .windows(self.marker.len())
            .any(|candidate| candidate == self.marker.as_slice())
        {
            self.found = true;
            return true;
        }

        let keep = self.marker.len() - 1;
        let start = window.len().saturating_sub(keep);
        self.tail = window.split_off(start);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "Press CTRL+C to quit";

    #[test]
    fn finds_marker_in_single_chunk() {
        let mut s = MarkerScanner::new(MARKER);
        assert!(!s.feed(b"Mounting first at http://127.0.0.1:3000/test [GET]\n"));
        assert!(s.feed(b" * Running on http://127.0.0.1:3000/ (Press CTRL+C to quit)\n"));
        assert!(s.found());
    }

    #[test]
    fn finds_marker_split_across_chunks() {
        let mut s = MarkerScanner::new(MARKER);
        assert!(!s.feed(b"(Press CTR"));
        assert!(!s.feed(b"L+C "));
        assert!(s.feed(b"to quit)"));
    }

    #[test]
    fn reports_only_first_occurrence() {
        let mut s = MarkerScanner::new(MARKER);
        assert!(s.feed(MARKER.as_bytes()));
        assert!(!s.feed(MARKER.as_bytes()));
    }

    #[test]
    fn tail_is_bounded() {
        let mut s = MarkerScanner::new(MARKER);
        for _ in 0..100 {
            s.feed(&[b'x'; 4096]);
        }
        assert!(s.tail.len() < MARKER.len());
        assert!(!s.found());
    }
}
