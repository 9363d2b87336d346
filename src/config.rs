/// Environment-based configuration.

use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.15;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_TARGET_SIZE: u32 = 640;
pub const DEFAULT_PAD_COLOR: [u8; 3] = [114, 114, 114];

/// Tunables for letterboxing and post-processing.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub target_size: u32,
    pub pad_color: [u8; 3],
    /// Class id to display name. Its length is the number of classes the decoder reads.
    pub class_names: BTreeMap<usize, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            target_size: DEFAULT_TARGET_SIZE,
            pad_color: DEFAULT_PAD_COLOR,
            class_names: BTreeMap::from([(0, "Fracture".to_string())]),
        }
    }
}

impl PipelineConfig {
    pub fn num_classes(&self) -> usize {
        self.class_names.keys().next_back().map_or(0, |max_id| max_id + 1)
    }

    pub fn class_name(&self, class_id: usize) -> String {
        self.class_names
            .get(&class_id)
            .cloned()
            .unwrap_or_else(|| format!("Class {class_id}"))
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub model_path: String,
    pub max_upload_bytes: usize,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PipelineConfig::default();

        let confidence_threshold = lookup("CONFIDENCE_THRESHOLD")
            .and_then(|v| v.parse().ok())
            .and_then(|v| unit_interval("CONFIDENCE_THRESHOLD", v))
            .unwrap_or(defaults.confidence_threshold);
        let iou_threshold = lookup("IOU_THRESHOLD")
            .and_then(|v| v.parse().ok())
            .and_then(|v| unit_interval("IOU_THRESHOLD", v))
            .unwrap_or(defaults.iou_threshold);
        let target_size = lookup("INPUT_SIZE")
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&v| {
                if v == 0 {
                    warn!("INPUT_SIZE must be positive, using default");
                }
                v > 0
            })
            .unwrap_or(defaults.target_size);
        let pad_color = lookup("PAD_COLOR")
            .and_then(|v| parse_color(&v))
            .unwrap_or(defaults.pad_color);

        Self {
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            model_path: lookup("MODEL_PATH").unwrap_or_else(|| "models/best.onnx".to_string()),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            pipeline: PipelineConfig {
                confidence_threshold,
                iou_threshold,
                target_size,
                pad_color,
                ..defaults
            },
        }
    }
}

fn unit_interval(name: &str, value: f32) -> Option<f32> {
    if (0.0..=1.0).contains(&value) {
        Some(value)
    } else {
        warn!("{name}={value} is outside [0, 1], using default");
        None
    }
}

/// Parses `"r,g,b"`.
fn parse_color(raw: &str) -> Option<[u8; 3]> {
    let parts: Vec<u8> = raw
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some([*r, *g, *b]),
        _ => {
            warn!("PAD_COLOR must be \"r,g,b\", got {raw:?}");
            None
        }
    }
}
