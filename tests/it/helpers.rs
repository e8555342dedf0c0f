//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `Stage` - a 500x500 positioned container holding one 100x100 card
//! - `StageBuilder` - builder for the stage and the engine on top of it
//! - Pointer helpers that press, move and release through the engine

#![allow(dead_code)]

use dragcore::config::DragConfig;
use dragcore::geometry::PositionMode;
use dragcore::{
    Channel, DragCore, DragOptions, ElementId, ElementSpec, Host, MemoryHost, PointerSample,
};
use std::cell::RefCell;
use std::rc::Rc;

// ============================================================================
// Stage - the standard fixture
// ============================================================================

/// A document with one positioned container and one draggable card.
///
/// ```text
/// body (1000 x 1000)
/// └── div#stage   absolute (0, 0), 500 x 500
///     └── div.card  absolute (10, 10), 100 x 100
/// ```
pub struct Stage {
    pub host: Rc<MemoryHost>,
    pub stage: ElementId,
    pub card: ElementId,
    pub core: Rc<DragCore>,
}

impl Stage {
    pub fn press(&self, x: f64, y: f64) -> bool {
        self.core.press(self.card, PointerSample::at(self.card, x, y))
    }

    pub fn move_to(&self, x: f64, y: f64) -> bool {
        self.core.pointer_move(PointerSample::at(self.card, x, y))
    }

    pub fn release(&self, x: f64, y: f64) -> bool {
        self.core.release(PointerSample::at(self.card, x, y))
    }

    /// Press at `from`, move through every point of `path`, release at
    /// the last one.
    pub fn drag(&self, from: (f64, f64), path: &[(f64, f64)]) {
        assert!(self.press(from.0, from.1));
        for &(x, y) in path {
            self.move_to(x, y);
        }
        let (x, y) = path.last().copied().unwrap_or(from);
        self.release(x, y);
    }

    /// Committed position of the card.
    pub fn position(&self) -> (f64, f64) {
        let record = self.core.session(self.card).unwrap();
        (record.x, record.y)
    }

    /// Every (left, top) written to the card.
    pub fn writes(&self) -> Vec<(f64, f64)> {
        self.host
            .writes_for(self.card)
            .into_iter()
            .map(|w| (w.left, w.top))
            .collect()
    }
}

// ============================================================================
// StageBuilder
// ============================================================================

/// Builder for [`Stage`].
///
/// # Example
/// ```ignore
/// let stage = StageBuilder::new()
///     .with_config(config)
///     .bare()
///     .build();
/// ```
pub struct StageBuilder {
    config: DragConfig,
    card_mode: PositionMode,
    card_margin: (f64, f64),
    stage_content: Option<(f64, f64)>,
    builtin: bool,
}

impl Default for StageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StageBuilder {
    pub fn new() -> Self {
        Self {
            config: DragConfig::default(),
            card_mode: PositionMode::Absolute,
            card_margin: (0.0, 0.0),
            stage_content: None,
            builtin: true,
        }
    }

    pub fn with_config(mut self, config: DragConfig) -> Self {
        self.config = config;
        self
    }

    /// Lay the card out in normal flow at (10, 10) instead.
    pub fn in_flow(mut self) -> Self {
        self.card_mode = PositionMode::Relative;
        self
    }

    pub fn with_margin(mut self, left: f64, top: f64) -> Self {
        self.card_margin = (left, top);
        self
    }

    /// Make the stage scrollable over `width` x `height` of content.
    pub fn scrollable(mut self, width: f64, height: f64) -> Self {
        self.stage_content = Some((width, height));
        self
    }

    /// Skip the built-in plugins.
    pub fn bare(mut self) -> Self {
        self.builtin = false;
        self
    }

    pub fn build(self) -> Stage {
        let host = Rc::new(MemoryHost::new(1000.0, 1000.0));
        let mut stage_spec = ElementSpec::new("div")
            .id("stage")
            .absolute(0.0, 0.0)
            .size(500.0, 500.0);
        if let Some((width, height)) = self.stage_content {
            stage_spec = stage_spec.content(width, height);
        }
        let stage = host.append(host.root(), stage_spec);

        let card_spec = match self.card_mode {
            PositionMode::Absolute => ElementSpec::new("div").absolute(10.0, 10.0),
            mode => ElementSpec::new("div").position(mode).flow(10.0, 10.0),
        };
        let card = host.append(
            stage,
            card_spec
                .class("card")
                .size(100.0, 100.0)
                .margin(self.card_margin.0, self.card_margin.1),
        );

        let dyn_host: Rc<dyn Host> = host.clone();
        let options = DragOptions::new(".card").with_config(self.config);
        let core = if self.builtin {
            dragcore::drag(dyn_host, options)
        } else {
            DragCore::new(dyn_host, options)
        };

        Stage {
            host,
            stage,
            card,
            core,
        }
    }
}

/// Standard stage with every built-in plugin.
pub fn stage() -> Stage {
    StageBuilder::new().build()
}

// ============================================================================
// Event recording
// ============================================================================

/// Shared log of `(channel, x, y)` as listeners saw them.
pub type EventLog = Rc<RefCell<Vec<(Channel, f64, f64)>>>;

/// Record every lifecycle channel of `core` into a log.
pub fn record_events(core: &DragCore) -> EventLog {
    let log: EventLog = Rc::default();
    for channel in Channel::ALL {
        let log = Rc::clone(&log);
        core.subscribe(channel, move |event| {
            log.borrow_mut().push((event.channel(), event.x, event.y));
        });
    }
    log
}

/// Channels in the order they fired.
pub fn channels(log: &EventLog) -> Vec<Channel> {
    log.borrow().iter().map(|(channel, _, _)| *channel).collect()
}

/// Count of one channel in the log.
pub fn count(log: &EventLog, channel: Channel) -> usize {
    log.borrow().iter().filter(|(c, _, _)| *c == channel).count()
}

/// Install a tracing subscriber honoring `RUST_LOG`; safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
