//! Display configuration types and builder

pub use crate::error::BuilderError;
use crate::line::{FRAME_LINE_BYTES, LINE_BUFFER_LEN};

/// Panel sizes driven by the G2 controller family
///
/// Only [`PanelKind::Epd144`] has a complete geometry and timing profile;
/// the other sizes are recognised so they can be rejected explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelKind {
    /// 1.44" panel, 128 x 96
    Epd144,
    /// 2.0" panel, 200 x 96
    Epd200,
    /// 2.7" panel, 264 x 176
    Epd270,
}

impl PanelKind {
    /// Whether this driver can run the panel
    pub fn is_supported(self) -> bool {
        matches!(self, PanelKind::Epd144)
    }
}

impl core::fmt::Display for PanelKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PanelKind::Epd144 => write!(f, "1.44\""),
            PanelKind::Epd200 => write!(f, "2.0\""),
            PanelKind::Epd270 => write!(f, "2.7\""),
        }
    }
}

/// Columns of the 1.44" panel
pub const COLUMNS_144: u16 = 128;
/// Scan lines of the 1.44" panel
pub const LINES_144: u16 = 96;
/// Settle time after each stage of a stage update, in ms
pub const STAGE_DELAY_144_MS: u32 = 480;
/// Stage delay multiplier at room temperature
pub const STAGE_DELAY_144_MULTIPLIER: u32 = 1;
/// Full-panel redraws per ghost-cancelling stage
pub const GHOST_ITERATIONS_144: u8 = 2;

/// Interval between BUSY polls, in ms
pub const BUSY_POLL_INTERVAL_MS: u32 = 10;
/// Give up waiting for BUSY after this long, in ms
pub const BUSY_TIMEOUT_MS: u32 = 5_000;
/// Charge pump ramp attempts before power-up fails
pub const CHARGE_PUMP_ATTEMPTS: u8 = 4;

/// Display configuration
///
/// Geometry, stage timing and power-up bounds for one panel. Obtain the
/// canonical values with [`Config::for_panel`] or tune timing through
/// [`Builder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Panel variant
    pub panel: PanelKind,
    /// Width in pixels
    pub columns: u16,
    /// Number of scan lines
    pub lines: u16,
    /// Length of one encoded transmit line in bytes
    pub line_buffer_length: usize,
    /// Base settle time after each stage, in ms
    pub stage_delay_base_ms: u32,
    /// Multiplier applied to `stage_delay_base_ms`
    pub stage_delay_multiplier: u32,
    /// Full-panel redraws per ghost-cancelling stage
    pub ghost_iterations: u8,
    /// Interval between BUSY polls, in ms
    pub busy_poll_interval_ms: u32,
    /// Maximum time spent waiting for BUSY to clear, in ms
    pub busy_timeout_ms: u32,
    /// Charge pump ramp attempts
    pub charge_pump_attempts: u8,
}

impl Config {
    /// Canonical configuration for a panel
    ///
    /// # Errors
    ///
    /// Returns `BuilderError::Unsupported` for panels without a profile.
    pub fn for_panel(panel: PanelKind) -> Result<Self, BuilderError> {
        match panel {
            PanelKind::Epd144 => Ok(Config {
                panel,
                columns: COLUMNS_144,
                lines: LINES_144,
                line_buffer_length: LINE_BUFFER_LEN,
                stage_delay_base_ms: STAGE_DELAY_144_MS,
                stage_delay_multiplier: STAGE_DELAY_144_MULTIPLIER,
                ghost_iterations: GHOST_ITERATIONS_144,
                busy_poll_interval_ms: BUSY_POLL_INTERVAL_MS,
                busy_timeout_ms: BUSY_TIMEOUT_MS,
                charge_pump_attempts: CHARGE_PUMP_ATTEMPTS,
            }),
            other => Err(BuilderError::Unsupported(other)),
        }
    }

    /// Bytes of frame data per scan line (2 bits per pixel)
    pub fn bytes_per_line(&self) -> usize {
        self.columns as usize / 4
    }

    /// Required length of a frame in bytes
    pub fn frame_size(&self) -> usize {
        self.lines as usize * self.bytes_per_line()
    }

    /// Settle time after each stage, in ms
    pub fn stage_delay_ms(&self) -> u32 {
        self.stage_delay_base_ms
            .saturating_mul(self.stage_delay_multiplier)
    }

    /// Check that the driver can run this configuration
    ///
    /// [`Builder::build`] and [`Display::new`](crate::display::Display::new)
    /// both call this, so a hand-edited `Config` is held to the same rules.
    ///
    /// # Errors
    ///
    /// - `BuilderError::Unsupported` if the panel has no profile
    /// - `BuilderError::InvalidGeometry` if the geometry is not the one the
    ///   line encoder produces
    /// - `BuilderError::InvalidGhostIterations` if iterations is zero
    /// - `BuilderError::InvalidStageDelay` if the multiplier is zero
    /// - `BuilderError::InvalidBusyPolling` if the poll interval is zero
    /// - `BuilderError::InvalidChargePumpAttempts` if attempts is zero
    pub fn validate(&self) -> Result<(), BuilderError> {
        if !self.panel.is_supported() {
            return Err(BuilderError::Unsupported(self.panel));
        }
        if self.columns != COLUMNS_144
            || self.lines != LINES_144
            || self.line_buffer_length != LINE_BUFFER_LEN
            || self.bytes_per_line() != FRAME_LINE_BYTES
        {
            return Err(BuilderError::InvalidGeometry {
                columns: self.columns,
                lines: self.lines,
                line_buffer_length: self.line_buffer_length,
            });
        }
        if self.ghost_iterations == 0 {
            return Err(BuilderError::InvalidGhostIterations);
        }
        if self.stage_delay_multiplier == 0 {
            return Err(BuilderError::InvalidStageDelay {
                base_ms: self.stage_delay_base_ms,
                multiplier: self.stage_delay_multiplier,
            });
        }
        if self.busy_poll_interval_ms == 0 {
            return Err(BuilderError::InvalidBusyPolling);
        }
        if self.charge_pump_attempts == 0 {
            return Err(BuilderError::InvalidChargePumpAttempts);
        }
        Ok(())
    }
}

/// Builder for constructing display configuration
///
/// Geometry is fixed by the panel; the builder only tunes timing.
///
/// # Example
///
/// ```
/// use epd_g2::{Builder, PanelKind};
///
/// let config = Builder::new(PanelKind::Epd144)
///     .ghost_iterations(3)
///     .stage_delay(480, 2)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.stage_delay_ms(), 960);
/// ```
pub struct Builder {
    /// Panel variant (required)
    panel: PanelKind,
    /// Overrides for the panel defaults
    stage_delay: Option<(u32, u32)>,
    ghost_iterations: Option<u8>,
    busy_poll_interval_ms: Option<u32>,
    busy_timeout_ms: Option<u32>,
}

impl Builder {
    /// Create a new Builder for a panel
    pub fn new(panel: PanelKind) -> Self {
        Builder {
            panel,
            stage_delay: None,
            ghost_iterations: None,
            busy_poll_interval_ms: None,
            busy_timeout_ms: None,
        }
    }

    /// Set the stage settle time as `base_ms * multiplier`
    pub fn stage_delay(mut self, base_ms: u32, multiplier: u32) -> Self {
        self.stage_delay = Some((base_ms, multiplier));
        self
    }

    /// Set full-panel redraws per ghost-cancelling stage
    pub fn ghost_iterations(mut self, iterations: u8) -> Self {
        self.ghost_iterations = Some(iterations);
        self
    }

    /// Set the BUSY poll interval
    pub fn busy_poll_interval_ms(mut self, interval_ms: u32) -> Self {
        self.busy_poll_interval_ms = Some(interval_ms);
        self
    }

    /// Set the BUSY wait timeout
    pub fn busy_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.busy_timeout_ms = Some(timeout_ms);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::Unsupported` if the panel has no profile
    /// - `BuilderError::InvalidGhostIterations` if iterations is zero
    /// - `BuilderError::InvalidStageDelay` if the multiplier is zero
    /// - `BuilderError::InvalidBusyPolling` if the poll interval is zero
    pub fn build(self) -> Result<Config, BuilderError> {
        let mut config = Config::for_panel(self.panel)?;

        if let Some((base_ms, multiplier)) = self.stage_delay {
            config.stage_delay_base_ms = base_ms;
            config.stage_delay_multiplier = multiplier;
        }
        if let Some(iterations) = self.ghost_iterations {
            config.ghost_iterations = iterations;
        }
        if let Some(interval_ms) = self.busy_poll_interval_ms {
            config.busy_poll_interval_ms = interval_ms;
        }
        if let Some(timeout_ms) = self.busy_timeout_ms {
            config.busy_timeout_ms = timeout_ms;
        }

        config.validate()?;
        Ok(config)
    }
}
