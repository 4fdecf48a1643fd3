//! Pose model choice and device-based auto selection.

use std::fmt;

use repcount_traits::KeypointLayout;

/// Supported pose estimation models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// Fastest, lowest accuracy.
    MoveNetLightning,
    MoveNetThunder,
    /// Full-body 33-point model; needs the most headroom.
    BlazePose,
}

impl ModelKind {
    pub fn layout(self) -> KeypointLayout {
        match self {
            ModelKind::MoveNetLightning | ModelKind::MoveNetThunder => KeypointLayout::MoveNet17,
            ModelKind::BlazePose => KeypointLayout::BlazePose33,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::MoveNetLightning => "movenet-lightning",
            ModelKind::MoveNetThunder => "movenet-thunder",
            ModelKind::BlazePose => "blazepose",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured model: a fixed kind, or picked from the device profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelPreference {
    #[default]
    Auto,
    Fixed(ModelKind),
}

impl ModelPreference {
    pub fn resolve(self, device: &DeviceProfile) -> ModelKind {
        match self {
            ModelPreference::Auto => device.recommend(),
            ModelPreference::Fixed(kind) => kind,
        }
    }
}

/// Coarse capability tier of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Mobile,
    HighEnd,
    MidRange,
    LowEnd,
}

/// What we know about the host when picking a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceProfile {
    pub cores: usize,
    pub memory_gib: u32,
    pub gpu: bool,
    pub mobile: bool,
}

/// Assumed memory when the host does not report it.
const FALLBACK_MEMORY_GIB: u32 = 2;

impl DeviceProfile {
    /// Probe the current host. GPU and mobile are not detectable here and
    /// default to `false`.
    pub fn detect() -> Self {
        let cores = std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        let memory_gib = read_meminfo_gib().unwrap_or(FALLBACK_MEMORY_GIB);
        let profile = Self {
            cores,
            memory_gib,
            gpu: false,
            mobile: false,
        };
        tracing::debug!(cores, memory_gib, "device profile detected");
        profile
    }

    pub fn with_gpu(mut self, gpu: bool) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    pub fn class(&self) -> DeviceClass {
        if self.mobile {
            DeviceClass::Mobile
        } else if self.cores >= 8 && self.memory_gib >= 8 && self.gpu {
            DeviceClass::HighEnd
        } else if self.cores >= 4 && self.gpu {
            DeviceClass::MidRange
        } else {
            DeviceClass::LowEnd
        }
    }

    pub fn recommend(&self) -> ModelKind {
        match self.class() {
            DeviceClass::HighEnd => ModelKind::BlazePose,
            DeviceClass::MidRange => ModelKind::MoveNetThunder,
            DeviceClass::Mobile | DeviceClass::LowEnd => ModelKind::MoveNetLightning,
        }
    }
}

#[cfg(target_os = "linux")]
fn read_meminfo_gib() -> Option<u32> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo_gib(&text)
}

#[cfg(not(target_os = "linux"))]
fn read_meminfo_gib() -> Option<u32> {
    None
}

/// `MemTotal` from `/proc/meminfo` contents, rounded to whole GiB.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo_gib(text: &str) -> Option<u32> {
    let line = text.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    let gib = (kib + 512 * 1024) / (1024 * 1024);
    u32::try_from(gib).ok()
}
