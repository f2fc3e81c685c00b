//! Logging setup and batch statistics.
//!
//! The crate logs through the [`log`] facade. [`init_logger`] installs
//! `env_logger` as the sink, filtered by `RUST_LOG` and defaulting to
//! `info`. Per-flush summaries are emitted at `trace`, so
//! `RUST_LOG=flis=trace` shows every draw call.

use std::fmt;
use std::sync::Once;

static INIT: Once = Once::new();

/// Install `env_logger` as the global logger.
///
/// Safe to call more than once. If another logger is already installed, a
/// warning is printed to stderr and the existing logger stays in place.
pub fn init_logger() {
    INIT.call_once(|| {
        let result = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .try_init();
        if result.is_err() {
            eprintln!("[flis] Warning: a logger is already set.");
        }
    });
}

/// Counters collected by a [`SpriteBatch`](crate::render2d::SpriteBatch).
///
/// Counters saturate at `u64::MAX` rather than wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// `begin`/`end` cycles whose final flush succeeded.
    pub frames: u64,
    /// Draw calls issued. Each flush that finds a pending rectangle issues
    /// exactly one.
    pub draw_calls: u64,
    /// Rectangles accepted by `submit`.
    pub quads_submitted: u64,
    /// Stale slots collapsed during flushes.
    pub slots_cleared: u64,
}

impl BatchStats {
    /// Average rectangles per draw call, or 0 with no draws.
    pub fn quads_per_draw(&self) -> f32 {
        if self.draw_calls == 0 {
            0.0
        } else {
            self.quads_submitted as f32 / self.draw_calls as f32
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, {} quads in {} draw calls ({:.1} quads/draw), {} slots cleared",
            self.frames,
            self.quads_submitted,
            self.draw_calls,
            self.quads_per_draw(),
            self.slots_cleared,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_per_draw_handles_no_draws() {
        assert_eq!(BatchStats::default().quads_per_draw(), 0.0);

        let stats = BatchStats {
            draw_calls: 4,
            quads_submitted: 10,
            ..Default::default()
        };
        assert_eq!(stats.quads_per_draw(), 2.5);
    }

    #[test]
    fn display_summarizes_counters() {
        let stats = BatchStats {
            frames: 2,
            draw_calls: 3,
            quads_submitted: 12,
            slots_cleared: 1,
        };
        assert_eq!(
            stats.to_string(),
            "2 frames, 12 quads in 3 draw calls (4.0 quads/draw), 1 slots cleared"
        );
    }

    #[test]
    fn init_logger_is_idempotent() {
        init_logger();
        init_logger();
        log::info!("logger initialized twice");
    }
}
