//! Builder for configuring and constructing a `Monitor`.

use crate::config::MonitorConfig;
use crate::{Error, Monitor, Result};
use keytrace_display::{Display, DisplayBuilder, KeyMap, Renderer, UiStyle};
use keytrace_io::{RetryPolicy, Transport};
use keytrace_midi::{DecoderConfig, Diagnostic, DiagnosticCallback, StreamDecoder};
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// A transport is required; everything else has a default.
///
/// # Example
///
/// ```ignore
/// use keytrace::prelude::*;
///
/// let mut monitor = Monitor::builder()
///     .transport(SerialTransport::new(SerialConfig::new("/dev/ttyUSB0")))
///     .style(UiStyle::Console)
///     .keymap("c2-c7".parse()?)
///     .build()?;
///
/// monitor.run()?;
/// ```
pub struct MonitorBuilder {
    transport: Option<Box<dyn Transport>>,
    display: DisplayBuilder,
    decoder: DecoderConfig,
    on_diagnostic: Option<DiagnosticCallback>,
    retry: RetryPolicy,
    poll_interval: Duration,
    settle: Duration,
}

impl Default for MonitorBuilder {
    fn default() -> Self {
        let config = MonitorConfig::default();
        Self {
            transport: None,
            display: Display::builder()
                .keymap(KeyMap::default())
                .refresh(config.refresh),
            decoder: config.decoder,
            on_diagnostic: None,
            retry: config.retry,
            poll_interval: config.poll_interval,
            settle: config.settle,
        }
    }
}

impl MonitorBuilder {
    /// Applies every setting in `config`, including the transport it names.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let keymap: KeyMap = config.key_range.parse()?;
        let transport = config.transport()?;

        Ok(Self {
            transport: Some(transport),
            display: Display::builder()
                .style(config.style)
                .keymap(keymap)
                .refresh(config.refresh),
            decoder: config.decoder,
            on_diagnostic: None,
            retry: config.retry.clone(),
            poll_interval: config.poll_interval,
            settle: config.settle,
        })
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Default: console
    pub fn style(mut self, style: UiStyle) -> Self {
        self.display = self.display.style(style);
        self
    }

    /// Overrides `style`.
    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.display = self.display.renderer(renderer);
        self
    }

    /// Default: full piano
    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.display = self.display.keymap(keymap);
        self
    }

    /// Default: 10 ms
    pub fn refresh(mut self, refresh: Duration) -> Self {
        self.display = self.display.refresh(refresh);
        self
    }

    /// Default: stdout
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.display = self.display.output(output);
        self
    }

    pub fn decoder(mut self, config: DecoderConfig) -> Self {
        self.decoder = config;
        self
    }

    /// Called for each diagnostic after it has been logged.
    pub fn on_diagnostic(mut self, callback: impl FnMut(Diagnostic) + Send + 'static) -> Self {
        self.on_diagnostic = Some(Box::new(callback));
        self
    }

    /// Default: 10 attempts, 1 s apart
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Default: 1 ms
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Default: 100 ms
    pub fn settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn build(self) -> Result<Monitor> {
        let transport = self
            .transport
            .ok_or_else(|| Error::InvalidArgs("no transport configured".into()))?;

        let mut decoder = StreamDecoder::with_config(self.decoder);
        if let Some(callback) = self.on_diagnostic {
            decoder = decoder.with_diagnostics(callback);
        }

        Ok(Monitor {
            transport,
            decoder,
            display: self.display.build(),
            retry: self.retry,
            poll_interval: self.poll_interval,
            settle: self.settle,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }
}
