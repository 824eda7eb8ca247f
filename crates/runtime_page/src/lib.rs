use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use bus::{PageCommand, PageEnvelope, PagePort, PageReply, PortError};
use content::Page;

/// Serve commands for `page` on a dedicated thread until every sender is gone.
/// The thread hands the page back when it finishes.
pub fn start_page_runtime(page: Page, cmd_rx: Receiver<PageEnvelope>) -> JoinHandle<Page> {
    thread::spawn(move || {
        let mut page = page;
        while let Ok(PageEnvelope { command, reply_tx }) = cmd_rx.recv() {
            let name = command.name();
            let reply = page.handle(command);
            if reply_tx.send(reply).is_err() {
                log::debug!(target: "runtime_page", "reply to {name} dropped");
            }
        }
        log::debug!(target: "runtime_page", "page runtime stopped");
        page
    })
}

/// Owner of a page runtime thread; requests block until the page replies.
#[derive(Debug)]
pub struct PageHandle {
    cmd_tx: Option<Sender<PageEnvelope>>,
    thread: Option<JoinHandle<Page>>,
}

impl PageHandle {
    pub fn spawn(page: Page) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let thread = start_page_runtime(page, cmd_rx);
        Self {
            cmd_tx: Some(cmd_tx),
            thread: Some(thread),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.cmd_tx.is_some()
    }

    /// Stop the runtime and take the page back. Later requests fail with
    /// [`PortError::Disconnected`].
    pub fn close(&mut self) -> Option<Page> {
        self.cmd_tx = None;
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(page) => Some(page),
            Err(_) => {
                log::warn!(target: "runtime_page", "page runtime panicked");
                None
            }
        }
    }

    pub fn into_page(mut self) -> Option<Page> {
        self.close()
    }
}

impl PagePort for PageHandle {
    fn request(&mut self, command: PageCommand) -> Result<PageReply, PortError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(PortError::Disconnected)?;
        let (reply_tx, reply_rx) = mpsc::channel();
        cmd_tx
            .send(PageEnvelope { command, reply_tx })
            .map_err(|_| PortError::Disconnected)?;
        reply_rx.recv().map_err(|_| PortError::Disconnected)
    }
}

impl Drop for PageHandle {
    fn drop(&mut self) {
        self.close();
    }
}
