// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Session configuration.

use undercoat_props::Tolerance;

/// Knobs for a [`Session`](crate::Session).
///
/// Build one with [`SessionConfig::builder`], or use the default.
///
/// # Example
///
/// ```rust
/// use undercoat_cascade::SessionConfig;
/// use undercoat_props::Tolerance;
///
/// let config = SessionConfig::builder()
///     .tolerance(Tolerance::EXACT)
///     .auto_batch(false)
///     .build();
/// assert!(!config.auto_batch());
/// assert!(config.sweep_every_tick());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    tolerance: Tolerance,
    auto_batch: bool,
    sweep_every_tick: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::DEFAULT,
            auto_batch: true,
            sweep_every_tick: true,
        }
    }
}

impl SessionConfig {
    /// Starts a builder from the default configuration.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Comparison tolerance used to suppress no-op value updates.
    #[must_use]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    /// Whether a change outside a batch opens one for the rest of the frame.
    ///
    /// When `false`, such changes are delivered to compiled outputs
    /// immediately, scoped to the single changed field.
    #[must_use]
    pub fn auto_batch(&self) -> bool {
        self.auto_batch
    }

    /// Whether every tick starts by sweeping consumers the host destroyed.
    #[must_use]
    pub fn sweep_every_tick(&self) -> bool {
        self.sweep_every_tick
    }
}

/// Builder for [`SessionConfig`].
#[derive(Clone, Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    /// Sets the value comparison tolerance.
    #[must_use]
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.config.tolerance = tolerance;
        self
    }

    /// Sets whether changes are batched per frame by default.
    #[must_use]
    pub fn auto_batch(mut self, enabled: bool) -> Self {
        self.config.auto_batch = enabled;
        self
    }

    /// Sets whether each tick sweeps dead consumers first.
    #[must_use]
    pub fn sweep_every_tick(mut self, enabled: bool) -> Self {
        self.config.sweep_every_tick = enabled;
        self
    }

    /// Finishes the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.tolerance(), &Tolerance::DEFAULT);
        assert!(config.auto_batch());
        assert!(config.sweep_every_tick());
        assert_eq!(SessionConfig::builder().build(), config);
    }

    #[test]
    fn builder_overrides() {
        let config = SessionConfig::builder()
            .auto_batch(false)
            .sweep_every_tick(false)
            .build();
        assert!(!config.auto_batch());
        assert!(!config.sweep_every_tick());
    }
}
