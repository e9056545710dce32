//! Transient transfer progress

use serde::{Deserialize, Serialize};

/// Cumulative progress of one resumable upload, as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    /// Completed fraction in percent; a zero-byte file counts as done
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            100.0
        } else {
            self.bytes_sent as f64 * 100.0 / self.total_bytes as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        let half = UploadProgress {
            bytes_sent: 50,
            total_bytes: 200,
        };
        assert!((half.percent() - 25.0).abs() < f64::EPSILON);

        let empty = UploadProgress {
            bytes_sent: 0,
            total_bytes: 0,
        };
        assert!((empty.percent() - 100.0).abs() < f64::EPSILON);
    }
}
