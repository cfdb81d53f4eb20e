use std::thread::{self, JoinHandle};

use crate::screen::Screen;

/// Background screen construction on a worker thread.
///
/// The worker builds the replacement screens; the caller polls `is_ready`
/// every tick and calls `take` once it reports true, so the join never
/// blocks a frame and the screen list is only ever mutated on the main
/// thread.
pub struct ScreenLoader {
    handle: Option<JoinHandle<Vec<Screen>>>,
}

impl ScreenLoader {
    pub fn start<F>(builder: F) -> Self
    where
        F: FnOnce() -> Vec<Screen> + Send + 'static,
    {
        log::debug!("screen loader started");
        Self {
            handle: Some(thread::spawn(builder)),
        }
    }

    /// True once the worker has finished (or the result was already taken).
    pub fn is_ready(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| h.is_finished())
            .unwrap_or(true)
    }

    /// Join the finished worker. A panicked worker is reported and yields
    /// `None`; the load is abandoned but the caller stays usable.
    pub fn take(&mut self) -> Option<Vec<Screen>> {
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(screens) => {
                log::debug!("screen loader finished with {} screens", screens.len());
                Some(screens)
            }
            Err(_) => {
                log::error!("screen loader worker panicked, abandoning load");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Size;
    use crate::style::StyleSheet;
    use std::time::Duration;

    #[test]
    fn builds_screens_on_worker_thread() {
        let mut loader = ScreenLoader::start(|| {
            let style = StyleSheet::default();
            vec![
                Screen::new("a", &style, Size::new(800, 600)),
                Screen::new("b", &style, Size::new(800, 600)),
            ]
        });
        // Poll like a frame loop would.
        while !loader.is_ready() {
            thread::sleep(Duration::from_millis(1));
        }
        let screens = loader.take().expect("worker succeeded");
        assert_eq!(screens.len(), 2);
        assert_eq!(screens[0].name(), "a");
        assert!(loader.is_ready());
        assert!(loader.take().is_none());
    }

    #[test]
    fn panicking_worker_yields_none() {
        let mut loader = ScreenLoader::start(|| panic!("boom"));
        while !loader.is_ready() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(loader.take().is_none());
    }
}
