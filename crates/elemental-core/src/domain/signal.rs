//! Names of the lifecycle signals shared by every element.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonSignal {
    /// An implementation has been installed in the slot.
    ReadyToUpgrade,
    Upgraded,
    Built,
    Mounted,
    RenderStart,
    LoadStart,
    LoadEnd,
    IniLoad,
    Unload,
}

impl CommonSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            CommonSignal::ReadyToUpgrade => "ready-upgrade",
            CommonSignal::Upgraded => "upgraded",
            CommonSignal::Built => "built",
            CommonSignal::Mounted => "mounted",
            CommonSignal::RenderStart => "render-start",
            CommonSignal::LoadStart => "load-start",
            CommonSignal::LoadEnd => "load-end",
            CommonSignal::IniLoad => "ini-load",
            CommonSignal::Unload => "unload",
        }
    }

    /// Signals cleared when a mount/layout cycle restarts.
    pub const CYCLE: [CommonSignal; 4] = [
        CommonSignal::RenderStart,
        CommonSignal::LoadStart,
        CommonSignal::LoadEnd,
        CommonSignal::IniLoad,
    ];
}

impl AsRef<str> for CommonSignal {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CommonSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
