//! Step catalog and typed step configuration
//!
//! Every operation the combo pipeline can chain is described by a static
//! [`StepDescriptor`]; a user's choice for one run is a [`SelectedStep`]
//! carrying a [`StepConfig`] whose variant fixes the operation kind.

use std::fmt;

/// The seven operations the combo pipeline can chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    FormatConverter,
    Compressor,
    SpeedAdjuster,
    ResolutionChanger,
    FilterApplier,
    VoiceChanger,
    VideoTrimmer,
}

impl StepKind {
    pub const ALL: [StepKind; 7] = [
        StepKind::FormatConverter,
        StepKind::Compressor,
        StepKind::SpeedAdjuster,
        StepKind::ResolutionChanger,
        StepKind::FilterApplier,
        StepKind::VoiceChanger,
        StepKind::VideoTrimmer,
    ];

    /// Stable identifier
    pub fn key(self) -> &'static str {
        match self {
            StepKind::FormatConverter => "format_converter",
            StepKind::Compressor => "compressor",
            StepKind::SpeedAdjuster => "speed_adjuster",
            StepKind::ResolutionChanger => "resolution_changer",
            StepKind::FilterApplier => "filter_applier",
            StepKind::VoiceChanger => "voice_changer",
            StepKind::VideoTrimmer => "video_trimmer",
        }
    }

    pub fn from_key(key: &str) -> Option<StepKind> {
        StepKind::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn descriptor(self) -> &'static StepDescriptor {
        // CATALOG is ordered like ALL
        &CATALOG[StepKind::ALL.iter().position(|k| *k == self).unwrap_or(0)]
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Static catalog entry
#[derive(Debug, PartialEq, Eq)]
pub struct StepDescriptor {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub kind: StepKind,
    /// Number shown in the selection menu
    pub menu_number: u8,
}

pub static CATALOG: [StepDescriptor; 7] = [
    StepDescriptor {
        key: "format_converter",
        display_name: "Convert format",
        description: "Change the container format (MP4, AVI, MOV, MKV)",
        kind: StepKind::FormatConverter,
        menu_number: 1,
    },
    StepDescriptor {
        key: "compressor",
        display_name: "Compress",
        description: "Reduce file size",
        kind: StepKind::Compressor,
        menu_number: 2,
    },
    StepDescriptor {
        key: "speed_adjuster",
        display_name: "Change speed",
        description: "Speed up or slow down playback",
        kind: StepKind::SpeedAdjuster,
        menu_number: 3,
    },
    StepDescriptor {
        key: "resolution_changer",
        display_name: "Change resolution",
        description: "Resize the video frame",
        kind: StepKind::ResolutionChanger,
        menu_number: 4,
    },
    StepDescriptor {
        key: "filter_applier",
        display_name: "Apply filter",
        description: "Add a colour grading preset",
        kind: StepKind::FilterApplier,
        menu_number: 5,
    },
    StepDescriptor {
        key: "voice_changer",
        display_name: "Change voice",
        description: "Transform the voice in the audio track",
        kind: StepKind::VoiceChanger,
        menu_number: 6,
    },
    StepDescriptor {
        key: "video_trimmer",
        display_name: "Trim",
        description: "Cut seconds from the start or the end",
        kind: StepKind::VideoTrimmer,
        menu_number: 7,
    },
];

/// 1-based position of `value` inside `options`
pub fn menu_number<T: PartialEq>(options: &[T], value: &T) -> usize {
    options.iter().position(|o| o == value).map(|i| i + 1).unwrap_or(0)
}

/// Resolve a 1-based menu answer against `options`
pub fn pick<T: Copy>(options: &[T], answer: &str) -> Option<T> {
    let index: usize = answer.trim().parse().ok()?;
    if index == 0 {
        return None;
    }
    options.get(index - 1).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp4,
    Avi,
    Mov,
    Wmv,
    Flv,
    Mkv,
    Webm,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 7] = [
        OutputFormat::Mp4,
        OutputFormat::Avi,
        OutputFormat::Mov,
        OutputFormat::Wmv,
        OutputFormat::Flv,
        OutputFormat::Mkv,
        OutputFormat::Webm,
    ];

    /// Formats offered when configuring a combo step
    pub const COMBO_CHOICES: [OutputFormat; 4] = [
        OutputFormat::Mp4,
        OutputFormat::Avi,
        OutputFormat::Mov,
        OutputFormat::Mkv,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp4 => "mp4",
            OutputFormat::Avi => "avi",
            OutputFormat::Mov => "mov",
            OutputFormat::Wmv => "wmv",
            OutputFormat::Flv => "flv",
            OutputFormat::Mkv => "mkv",
            OutputFormat::Webm => "webm",
        }
    }

    /// Container for a file extension, case-insensitive
    pub fn from_extension(ext: &str) -> Option<OutputFormat> {
        let ext = ext.to_lowercase();
        OutputFormat::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn video_codec(self) -> &'static str {
        match self {
            OutputFormat::Webm => "libvpx-vp9",
            OutputFormat::Wmv => "wmv2",
            _ => "libx264",
        }
    }

    pub fn audio_codec(self) -> &'static str {
        match self {
            OutputFormat::Webm => "libopus",
            OutputFormat::Wmv => "wmav2",
            _ => "aac",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.extension().to_uppercase())
    }
}

/// Compression tier, mapped to x264 rate control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Ultra,
    High,
    Medium,
    Low,
}

impl Quality {
    pub const ALL: [Quality; 4] = [Quality::Ultra, Quality::High, Quality::Medium, Quality::Low];
    pub const COMBO_CHOICES: [Quality; 3] = [Quality::High, Quality::Medium, Quality::Low];

    pub fn crf(self) -> u8 {
        match self {
            Quality::Ultra => 15,
            Quality::High => 18,
            Quality::Medium => 23,
            Quality::Low => 28,
        }
    }

    /// Fixed quantizer for encoders without CRF (wmv2)
    pub fn qscale(self) -> u8 {
        match self {
            Quality::Ultra => 2,
            Quality::High => 3,
            Quality::Medium => 5,
            Quality::Low => 8,
        }
    }

    pub fn preset(self) -> &'static str {
        match self {
            Quality::Ultra => "veryslow",
            Quality::High => "slow",
            Quality::Medium => "medium",
            Quality::Low => "fast",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Quality::Ultra => "ultra",
            Quality::High => "high",
            Quality::Medium => "medium",
            Quality::Low => "low",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Quality::Ultra => "Best quality, largest file",
            Quality::High => "High quality, light compression",
            Quality::Medium => "Balanced",
            Quality::Low => "Small file, strong compression",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    P1080,
    P720,
    P480,
    P360,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [Resolution::P1080, Resolution::P720, Resolution::P480, Resolution::P360];
    pub const COMBO_CHOICES: [Resolution; 3] = [Resolution::P720, Resolution::P1080, Resolution::P480];

    pub fn dimensions(self) -> Dimensions {
        match self {
            Resolution::P1080 => Dimensions { width: 1920, height: 1080 },
            Resolution::P720 => Dimensions { width: 1280, height: 720 },
            Resolution::P480 => Dimensions { width: 854, height: 480 },
            Resolution::P360 => Dimensions { width: 640, height: 360 },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resolution::P1080 => "1080p",
            Resolution::P720 => "720p",
            Resolution::P480 => "480p",
            Resolution::P360 => "360p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPreset {
    Vintage,
    Cinematic,
    Vibrant,
    BlackWhite,
    Warm,
    Cool,
}

impl FilterPreset {
    pub const ALL: [FilterPreset; 6] = [
        FilterPreset::Vintage,
        FilterPreset::Cinematic,
        FilterPreset::Vibrant,
        FilterPreset::BlackWhite,
        FilterPreset::Warm,
        FilterPreset::Cool,
    ];
    pub const COMBO_CHOICES: [FilterPreset; 4] = [
        FilterPreset::Vintage,
        FilterPreset::Cinematic,
        FilterPreset::Vibrant,
        FilterPreset::BlackWhite,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FilterPreset::Vintage => "vintage",
            FilterPreset::Cinematic => "cinematic",
            FilterPreset::Vibrant => "vibrant",
            FilterPreset::BlackWhite => "black_white",
            FilterPreset::Warm => "warm",
            FilterPreset::Cool => "cool",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FilterPreset::Vintage => "Faded sepia look",
            FilterPreset::Cinematic => "High contrast with vignette",
            FilterPreset::Vibrant => "Saturated, punchy colours",
            FilterPreset::BlackWhite => "Monochrome",
            FilterPreset::Warm => "Warmer colour temperature",
            FilterPreset::Cool => "Cooler colour temperature",
        }
    }
}

impl fmt::Display for FilterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePreset {
    MaleToFemale,
    FemaleToMale,
    Robot,
    Chipmunk,
    Monster,
    Echo,
    Telephone,
    Reverb,
}

impl VoicePreset {
    pub const ALL: [VoicePreset; 8] = [
        VoicePreset::MaleToFemale,
        VoicePreset::FemaleToMale,
        VoicePreset::Robot,
        VoicePreset::Chipmunk,
        VoicePreset::Monster,
        VoicePreset::Echo,
        VoicePreset::Telephone,
        VoicePreset::Reverb,
    ];
    pub const COMBO_CHOICES: [VoicePreset; 4] = [
        VoicePreset::MaleToFemale,
        VoicePreset::FemaleToMale,
        VoicePreset::Robot,
        VoicePreset::Chipmunk,
    ];

    pub fn key(self) -> &'static str {
        match self {
            VoicePreset::MaleToFemale => "male_to_female",
            VoicePreset::FemaleToMale => "female_to_male",
            VoicePreset::Robot => "robot",
            VoicePreset::Chipmunk => "chipmunk",
            VoicePreset::Monster => "monster",
            VoicePreset::Echo => "echo",
            VoicePreset::Telephone => "telephone",
            VoicePreset::Reverb => "reverb",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoicePreset::MaleToFemale => "Male -> Female",
            VoicePreset::FemaleToMale => "Female -> Male",
            VoicePreset::Robot => "Robot",
            VoicePreset::Chipmunk => "Chipmunk",
            VoicePreset::Monster => "Monster",
            VoicePreset::Echo => "Echo",
            VoicePreset::Telephone => "Telephone",
            VoicePreset::Reverb => "Reverb",
        }
    }
}

impl fmt::Display for VoicePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimDirection {
    Start,
    End,
}

impl TrimDirection {
    pub const ALL: [TrimDirection; 2] = [TrimDirection::Start, TrimDirection::End];

    pub fn key(self) -> &'static str {
        match self {
            TrimDirection::Start => "start",
            TrimDirection::End => "end",
        }
    }
}

impl fmt::Display for TrimDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind-specific configuration of one pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum StepConfig {
    FormatConverter { format: OutputFormat },
    Compressor { quality: Quality },
    SpeedAdjuster { speed: f64 },
    ResolutionChanger { resolution: Resolution },
    FilterApplier { filter: FilterPreset },
    VoiceChanger { voice: VoicePreset },
    VideoTrimmer { direction: TrimDirection, seconds: f64 },
}

impl StepConfig {
    pub fn kind(&self) -> StepKind {
        match self {
            StepConfig::FormatConverter { .. } => StepKind::FormatConverter,
            StepConfig::Compressor { .. } => StepKind::Compressor,
            StepConfig::SpeedAdjuster { .. } => StepKind::SpeedAdjuster,
            StepConfig::ResolutionChanger { .. } => StepKind::ResolutionChanger,
            StepConfig::FilterApplier { .. } => StepKind::FilterApplier,
            StepConfig::VoiceChanger { .. } => StepKind::VoiceChanger,
            StepConfig::VideoTrimmer { .. } => StepKind::VideoTrimmer,
        }
    }

    /// Human-readable summary shown in step lists
    pub fn summary(&self) -> String {
        match self {
            StepConfig::FormatConverter { format } => format!("Format: {}", format),
            StepConfig::Compressor { quality } => format!("Quality: {}", quality),
            StepConfig::SpeedAdjuster { speed } => format!("Speed: {}x", speed),
            StepConfig::ResolutionChanger { resolution } => format!("Resolution: {}", resolution),
            StepConfig::FilterApplier { filter } => format!("Filter: {}", filter),
            StepConfig::VoiceChanger { voice } => format!("Voice: {}", voice),
            StepConfig::VideoTrimmer { direction, seconds } => {
                format!("Trim {}s from the {}", seconds, direction)
            }
        }
    }
}

/// One step chosen for a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedStep {
    pub kind: StepKind,
    pub config: StepConfig,
    pub summary: String,
}

impl SelectedStep {
    pub fn new(config: StepConfig) -> Self {
        Self {
            kind: config.kind(),
            summary: config.summary(),
            config,
        }
    }

    pub fn descriptor_key(&self) -> &'static str {
        self.kind.key()
    }

    pub fn descriptor(&self) -> &'static StepDescriptor {
        self.kind.descriptor()
    }
}
