pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod mail;
pub mod pdf;
pub mod render;
pub mod server;
pub mod summarize;
pub mod video_url;
pub mod youtube;

use serde::Serialize;

pub use video_url::{VideoId, extract_video_id, validate};

/// A single captioned segment
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Complete transcript for a video
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub video_id: String,
    pub title: String,
    pub language: String,
    pub segments: Vec<Segment>,
}

impl Transcript {
    /// Caption text fragments in playback order
    pub fn fragments(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.text.clone()).collect()
    }

    /// Seconds from the start of the video to the end of the last caption
    pub fn duration_secs(&self) -> f64 {
        self.segments.last().map(|s| s.start + s.duration).unwrap_or_default()
    }
}

/// Join caption fragments into the text handed to the summarizer
pub fn join_fragments(fragments: &[String]) -> String {
    fragments.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> Transcript {
        Transcript {
            video_id: "dQw4w9WgXcQ".to_string(),
            title: "Test Video".to_string(),
            language: "en".to_string(),
            segments: vec![
                Segment {
                    text: "Hello world".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                Segment {
                    text: "This is a test".to_string(),
                    start: 1.5,
                    duration: 2.0,
                },
            ],
        }
    }

    #[test]
    fn test_fragments_keep_order() {
        let t = sample_transcript();
        assert_eq!(t.fragments(), vec!["Hello world", "This is a test"]);
    }

    #[test]
    fn test_join_fragments() {
        let t = sample_transcript();
        assert_eq!(join_fragments(&t.fragments()), "Hello world\nThis is a test");
    }

    #[test]
    fn test_duration_ends_with_last_segment() {
        let t = sample_transcript();
        assert!((t.duration_secs() - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_duration_without_segments() {
        let mut t = sample_transcript();
        t.segments.clear();
        assert_eq!(t.duration_secs(), 0.0);
    }

    #[test]
    fn test_join_fragments_empty() {
        assert_eq!(join_fragments(&[]), "");
    }
}
