use crate::core::style::MapStyleId;
use crate::engine::{lock_map, SharedMapHandle};
use crate::Result;

/// Tracks the selected theme and pushes changes to the map.
#[derive(Debug, Clone)]
pub struct StyleController {
    current: MapStyleId,
}

impl StyleController {
    pub fn new(initial: MapStyleId) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> MapStyleId {
        self.current
    }

    /// Themes offered to the user, in display order.
    pub fn catalog(&self) -> &'static [MapStyleId] {
        &MapStyleId::ALL
    }

    /// Switch to `style`. Selecting the current style is accepted and does
    /// nothing; returns whether the map was actually restyled.
    pub fn set_style(&mut self, map: &SharedMapHandle, style: MapStyleId) -> Result<bool> {
        if style == self.current {
            log::debug!("style {} already active", style);
            return Ok(false);
        }
        lock_map(map).set_style(style)?;
        log::info!("map style {} -> {}", self.current, style);
        self.current = style;
        Ok(true)
    }
}
