/// Tray appearances corresponding to managed-process state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// The managed process is running.
    On,
    /// The managed process is stopped.
    Off,
}

impl TrayIconState {
    /// Tray tooltip for this state.
    pub fn title(self) -> &'static str {
        match self {
            TrayIconState::On => "sing-box [On]",
            TrayIconState::Off => "sing-box [Off]",
        }
    }
}
