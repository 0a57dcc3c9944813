//! Live display: a shared note table plus a render thread drawing it.

use crate::error::{Error, Result};
use crate::keymap::KeyMap;
use crate::render::{Renderer, UiStyle};
use crate::table::NoteTable;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use keytrace_midi::DecodedPair;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

const DEFAULT_REFRESH: Duration = Duration::from_millis(10);

/// Configures a [`Display`].
///
/// # Example
///
/// ```ignore
/// let mut display = Display::builder()
///     .style(UiStyle::Console)
///     .keymap(KeyMap::new("c2", "c7")?)
///     .build();
/// display.start()?;
/// display.set_notes(&pairs);
/// display.close()?;
/// ```
pub struct DisplayBuilder {
    style: UiStyle,
    keymap: KeyMap,
    refresh: Duration,
    renderer: Option<Box<dyn Renderer>>,
    output: Option<Box<dyn Write + Send>>,
}

impl Default for DisplayBuilder {
    fn default() -> Self {
        Self {
            style: UiStyle::default(),
            keymap: KeyMap::default(),
            refresh: DEFAULT_REFRESH,
            renderer: None,
            output: None,
        }
    }
}

impl DisplayBuilder {
    /// Default: console
    pub fn style(mut self, style: UiStyle) -> Self {
        self.style = style;
        self
    }

    /// Default: full piano
    pub fn keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Default: 10 ms
    pub fn refresh(mut self, refresh: Duration) -> Self {
        self.refresh = refresh;
        self
    }

    /// Overrides `style`.
    pub fn renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Default: stdout
    pub fn output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn build(self) -> Display {
        Display {
            table: Arc::new(NoteTable::new(self.keymap)),
            renderer: Some(self.renderer.unwrap_or_else(|| self.style.renderer())),
            output: Some(self.output.unwrap_or_else(|| Box::new(io::stdout()))),
            refresh: self.refresh,
            worker: None,
        }
    }
}

type Output = Box<dyn Write + Send>;

struct RenderThread {
    stop: Sender<()>,
    /// Hands the renderer and output back so the display can be started again.
    handle: JoinHandle<(Box<dyn Renderer>, Output, io::Result<()>)>,
}

/// Receives decoded pairs and keeps them on screen.
///
/// `set_notes` works whether or not the render thread runs. `close` stops and joins the thread
/// and is safe to call repeatedly; `start` after `close` runs it again. Dropping the display
/// closes it.
pub struct Display {
    table: Arc<NoteTable>,
    renderer: Option<Box<dyn Renderer>>,
    output: Option<Output>,
    refresh: Duration,
    worker: Option<RenderThread>,
}

impl Display {
    pub fn builder() -> DisplayBuilder {
        DisplayBuilder::default()
    }

    pub fn table(&self) -> Arc<NoteTable> {
        Arc::clone(&self.table)
    }

    pub fn set_notes(&self, pairs: &[DecodedPair]) {
        self.table.set_notes(pairs);
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// No-op while the thread is running.
    pub fn start(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        // Only a panicked render thread fails to hand these back
        let (Some(renderer), Some(output)) = (self.renderer.take(), self.output.take()) else {
            return Err(Error::RenderPanicked);
        };

        let (stop, stop_rx) = bounded(1);
        let table = Arc::clone(&self.table);
        let refresh = self.refresh;

        let handle = thread::Builder::new()
            .name("keytrace-render".into())
            .spawn(move || render_loop(renderer, output, table, stop_rx, refresh))?;

        debug!("Render thread started");
        self.worker = Some(RenderThread { stop, handle });
        Ok(())
    }

    /// Surfaces the first output error the render thread hit, if any.
    pub fn close(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let _ = worker.stop.send(());
        let result = match worker.handle.join() {
            Ok((renderer, output, result)) => {
                self.renderer = Some(renderer);
                self.output = Some(output);
                result.map_err(Error::Io)
            }
            Err(_) => Err(Error::RenderPanicked),
        };
        debug!("Render thread stopped");
        result
    }
}

impl Drop for Display {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

fn render_loop(
    mut renderer: Box<dyn Renderer>,
    mut output: Output,
    table: Arc<NoteTable>,
    stop: Receiver<()>,
    refresh: Duration,
) -> (Box<dyn Renderer>, Output, io::Result<()>) {
    let result = draw_until_stopped(renderer.as_mut(), &mut output, &table, &stop, refresh);
    (renderer, output, result)
}

fn draw_until_stopped(
    renderer: &mut dyn Renderer,
    output: &mut Output,
    table: &NoteTable,
    stop: &Receiver<()>,
    refresh: Duration,
) -> io::Result<()> {
    let keymap = table.keymap();
    renderer.init(keymap, output)?;

    loop {
        renderer.render(keymap, &table.snapshot(), output)?;

        match stop.recv_timeout(refresh) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Final frame so the last state stays visible, then leave the cursor on a fresh line
    renderer.render(keymap, &table.snapshot(), output)?;
    writeln!(output)?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_notes_without_thread() {
        let display = Display::builder().output(io::sink()).build();
        display.set_notes(&[DecodedPair::key(60, 90), DecodedPair::pedal(127)]);
        assert_eq!(display.table().value(60), 90);
        assert_eq!(display.table().sustain(), 1);
        assert!(!display.is_running());
    }

    #[test]
    fn test_start_close_idempotent() {
        let mut display = Display::builder()
            .refresh(Duration::from_millis(1))
            .output(io::sink())
            .build();
        display.start().unwrap();
        assert!(display.is_running());
        // A second start is a no-op
        display.start().unwrap();
        display.close().unwrap();
        display.close().unwrap();
        assert!(!display.is_running());
    }

    #[test]
    fn test_restart_after_close_renders_again() {
        #[derive(Clone, Default)]
        struct Shared(Arc<std::sync::Mutex<Vec<u8>>>);
        impl Write for Shared {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let screen = Shared::default();
        let mut display = Display::builder()
            .keymap(KeyMap::new("c4", "c4").unwrap())
            .refresh(Duration::from_millis(1))
            .output(screen.clone())
            .build();

        display.start().unwrap();
        display.close().unwrap();
        let first = screen.0.lock().unwrap().len();
        assert!(first > 0);

        display.set_notes(&[DecodedPair::key(60, 77)]);
        display.start().unwrap();
        assert!(display.is_running());
        display.close().unwrap();

        let text = String::from_utf8(screen.0.lock().unwrap().clone()).unwrap();
        assert!(text.len() > first);
        assert_eq!(text.matches(" c4 sustain \n").count(), 2);
        assert!(text.ends_with("\r 77   0 \n"), "got {text:?}");
    }

    #[test]
    fn test_output_error_surfaces_on_close() {
        struct Failing;
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut display = Display::builder().output(Failing).build();
        display.start().unwrap();
        assert!(matches!(display.close(), Err(Error::Io(_))));
    }
}
