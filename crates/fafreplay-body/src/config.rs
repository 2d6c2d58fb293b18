//! Engine configuration.

use fafreplay_core::{CommandType, CommandTypeSet};

/// Configuration for a [`ReplayBody`](crate::ReplayBody) pass.
///
/// Build with struct-update syntax over [`Default`]:
///
/// ```
/// use fafreplay_body::BodyConfig;
/// use fafreplay_core::CommandType;
///
/// let config = BodyConfig {
///     stop_on_desync: true,
///     selected: [CommandType::LuaSimCallback].into_iter().collect(),
///     ..Default::default()
/// };
/// assert!(config.surfaces(CommandType::LuaSimCallback));
/// assert!(!config.surfaces(CommandType::IssueCommand));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyConfig {
    /// End the pass at the first detected desync. Default: false.
    pub stop_on_desync: bool,
    /// Commands yielded with a decoded record. Empty means all. Default: empty.
    ///
    /// Selection never suppresses bookkeeping: tick, command source,
    /// checksum, and chat tracking run for every frame of those types.
    pub selected: CommandTypeSet,
    /// Keep per-tick, per-source command groups. Default: false.
    pub store_body: bool,
}

impl BodyConfig {
    /// Whether events of `ty` carry their decoded command.
    pub fn surfaces(&self, ty: CommandType) -> bool {
        self.selected.is_empty() || self.selected.contains(ty)
    }

    /// Whether frames of `ty` must be decoded at all.
    pub fn decodes(&self, ty: CommandType) -> bool {
        ty.is_bookkeeping() || self.surfaces(ty)
    }
}
