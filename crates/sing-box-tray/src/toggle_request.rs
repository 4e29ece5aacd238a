/// A payload-free request to flip the managed process, tagged with the
/// input source that produced it.
///
/// Both sources push into one bounded single-consumer queue; a request
/// arriving while another is pending is dropped, so simultaneous
/// duplicates coalesce into a single transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRequest {
    /// The tray menu's Toggle entry was clicked.
    Menu,
    /// The configured global hotkey was pressed.
    Hotkey,
}
