use super::{AudioFileError, Resolution, SampleSource, StreamInfo};

/// Sample source over an in-memory buffer
///
/// Useful for audio that was decoded elsewhere. `fail_after` makes the
/// source return a read error once that many chunks have been served.
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<f32>,
    position: usize,
    info: StreamInfo,
    reads: usize,
    fail_after: Option<usize>,
}

impl MemorySource {
    /// Mono float source
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let info = StreamInfo {
            total_samples: samples.len() as u64,
            sample_rate,
            channels: 1,
            resolution: Resolution::Float,
        };
        Self {
            samples,
            position: 0,
            info,
            reads: 0,
            fail_after: None,
        }
    }

    /// Fail with a read error after `reads` successful chunk reads
    pub fn fail_after(mut self, reads: usize) -> Self {
        self.fail_after = Some(reads);
        self
    }
}

impl SampleSource for MemorySource {
    fn info(&self) -> &StreamInfo {
        &self.info
    }

    fn read_chunk(&mut self, buf: &mut [f32]) -> Result<usize, AudioFileError> {
        if self.fail_after.is_some_and(|limit| self.reads >= limit) {
            return Err(AudioFileError::Read(format!(
                "simulated failure after {} reads",
                self.reads
            )));
        }

        let remaining = &self.samples[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        self.reads += 1;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_until_exhausted() {
        let mut source = MemorySource::new(vec![0.1, 0.2, 0.3, 0.4, 0.5], 8000);
        let mut buf = [0.0f32; 2];

        assert_eq!(source.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(buf, [0.1, 0.2]);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 2);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 0.5);
        assert_eq!(source.read_chunk(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_simulated_failure() {
        let mut source = MemorySource::new(vec![0.0; 10], 8000).fail_after(1);
        let mut buf = [0.0f32; 4];

        assert!(source.read_chunk(&mut buf).is_ok());
        assert!(matches!(source.read_chunk(&mut buf), Err(AudioFileError::Read(_))));
    }
}
