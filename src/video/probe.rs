//! Media probing using `ffprobe -print_format json`.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{Result, VideoError};
use crate::video::ffmpeg::FfmpegTools;
use crate::video::types::{FrameRate, VideoMetadata};

/// Probe a media file for its first video stream and overall duration.
pub async fn probe_video(tools: &FfmpegTools, path: &Path) -> Result<VideoMetadata> {
    if !path.exists() {
        return Err(VideoError::LoadFailed {
            path: path.display().to_string(),
        }
        .into());
    }

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.display().to_string(),
    ];

    let stdout = tools.run_ffprobe(args).await?;
    let json: Value = serde_json::from_slice(&stdout).map_err(|e| VideoError::ProbeFailed {
        path: path.display().to_string(),
        reason: format!("invalid ffprobe output: {}", e),
    })?;

    let metadata = parse_probe_json(&json, path)?;
    debug!(
        "Probed {}: {}x{} @ {} fps, {:.3}s, audio: {}",
        path.display(),
        metadata.width,
        metadata.height,
        metadata.frame_rate,
        metadata.duration,
        metadata.has_audio
    );
    Ok(metadata)
}

/// Parse the JSON document printed by ffprobe.
pub fn parse_probe_json(json: &Value, path: &Path) -> Result<VideoMetadata> {
    let probe_failed = |reason: &str| VideoError::ProbeFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };

    let streams = json
        .get("streams")
        .and_then(|s| s.as_array())
        .ok_or_else(|| probe_failed("no streams reported"))?;

    let video = streams
        .iter()
        .find(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("video"))
        .ok_or_else(|| probe_failed("no video stream"))?;

    let has_audio = streams
        .iter()
        .any(|s| s.get("codec_type").and_then(|t| t.as_str()) == Some("audio"));

    let dimension = |key: &str| -> std::result::Result<u32, VideoError> {
        let value = video
            .get(key)
            .and_then(|v| v.as_u64())
            .ok_or_else(|| probe_failed(&format!("video stream has no {}", key)))?;
        u32::try_from(value)
            .map_err(|_| probe_failed(&format!("video stream {} {} is out of range", key, value)))
    };
    let width = dimension("width")?;
    let height = dimension("height")?;

    // r_frame_rate is the stream's base rate; avg_frame_rate can be 0/0 for
    // some containers
    let frame_rate = ["r_frame_rate", "avg_frame_rate"]
        .iter()
        .filter_map(|key| video.get(*key).and_then(|v| v.as_str()))
        .find_map(|rate| rate.parse::<FrameRate>().ok())
        .ok_or_else(|| probe_failed("video stream has no usable frame rate"))?;

    // Container duration first, stream duration as a fallback
    let duration = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(number_or_string)
        .or_else(|| video.get("duration").and_then(number_or_string))
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| probe_failed("no duration reported"))?;

    let codec = video
        .get("codec_name")
        .and_then(|c| c.as_str())
        .unwrap_or("unknown")
        .to_string();

    let frame_count = video
        .get("nb_frames")
        .and_then(number_or_string)
        .map(|n| n as u64);

    Ok(VideoMetadata {
        path: path.to_path_buf(),
        duration,
        frame_rate,
        width,
        height,
        codec,
        frame_count,
        has_audio,
    })
}

/// ffprobe prints most numbers as JSON strings
fn number_or_string(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TriptychError;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "streams": [
                {
                    "index": 0,
                    "codec_name": "h264",
                    "codec_type": "video",
                    "width": 1280,
                    "height": 720,
                    "r_frame_rate": "30000/1001",
                    "avg_frame_rate": "30000/1001",
                    "duration": "12.345000",
                    "nb_frames": "370"
                },
                {
                    "index": 1,
                    "codec_name": "aac",
                    "codec_type": "audio"
                }
            ],
            "format": {
                "filename": "input/video1.mov",
                "duration": "12.400000"
            }
        })
    }

    #[test]
    fn test_parse_full_probe() {
        let metadata = parse_probe_json(&sample(), Path::new("input/video1.mov")).unwrap();

        assert_eq!(metadata.width, 1280);
        assert_eq!(metadata.height, 720);
        assert_eq!(metadata.frame_rate, FrameRate::new(30000, 1001));
        assert!((metadata.duration - 12.4).abs() < 1e-9);
        assert_eq!(metadata.codec, "h264");
        assert_eq!(metadata.frame_count, Some(370));
        assert!(metadata.has_audio);
    }

    #[test]
    fn test_falls_back_to_stream_duration() {
        let mut json = sample();
        json["format"] = json!({});
        json["streams"][0]["avg_frame_rate"] = json!("0/0");

        let metadata = parse_probe_json(&json, Path::new("a.mov")).unwrap();
        assert!((metadata.duration - 12.345).abs() < 1e-9);
    }

    #[test]
    fn test_audio_only_file_is_rejected() {
        let json = json!({
            "streams": [{ "codec_type": "audio", "codec_name": "aac" }],
            "format": { "duration": "3.0" }
        });

        let err = parse_probe_json(&json, Path::new("song.m4a")).unwrap_err();
        assert!(matches!(
            err,
            TriptychError::Video(VideoError::ProbeFailed { .. })
        ));
    }

    #[test]
    fn test_oversized_dimension_is_rejected() {
        let mut json = sample();
        json["streams"][0]["width"] = json!(u64::from(u32::MAX) + 1);

        let err = parse_probe_json(&json, Path::new("a.mov")).unwrap_err();
        match err {
            TriptychError::Video(VideoError::ProbeFailed { reason, .. }) => {
                assert!(reason.contains("width"), "reason: {reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_audio_stream() {
        let mut json = sample();
        json["streams"].as_array_mut().unwrap().pop();

        let metadata = parse_probe_json(&json, Path::new("a.mov")).unwrap();
        assert!(!metadata.has_audio);
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let tools = FfmpegTools::default();
        let err = probe_video(&tools, Path::new("/definitely/not/here.mov"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TriptychError::Video(VideoError::LoadFailed { .. })
        ));
    }
}
