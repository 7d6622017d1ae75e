// SPDX-License-Identifier: MPL-2.0

//! The system console as a file object.
//!
//! `proc_create_runprogram`-style process creation binds descriptors 0, 1
//! and 2 to console handles, so reads and writes on the standard
//! descriptors reach the console driver through the ordinary file path.

use ferrite_frame::sync::Once;

use crate::{
    fs::{file_handle::FileLike, utils::AccessMode},
    prelude::*,
};

/// The character device the platform provides.
pub trait ConsoleDriver: Send + Sync {
    fn putch(&self, ch: u8);

    /// Returns the next input byte, or a negative value at end of input.
    fn getch(&self) -> i32;
}

static CONSOLE: Once<&'static dyn ConsoleDriver> = Once::new();

/// Registers the console driver. Must be called exactly once at boot.
pub fn set_console_driver(driver: &'static dyn ConsoleDriver) {
    CONSOLE.call_once(|| driver);
}

fn console_driver() -> &'static dyn ConsoleDriver {
    *CONSOLE.get().expect("no console driver is registered")
}

/// An open console, bound to a file-table slot.
#[derive(Debug)]
pub struct Console {
    access_mode: AccessMode,
}

impl Console {
    pub fn new(access_mode: AccessMode) -> Arc<Self> {
        Arc::new(Self { access_mode })
    }
}

impl FileLike for Console {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if !self.access_mode.is_readable() {
            return_errno_with_message!(Errno::EBADF, "the console is not open for reading");
        }

        let driver = console_driver();
        let mut read_len = 0;
        for slot in buf.iter_mut() {
            let ch = driver.getch();
            if ch < 0 {
                break;
            }
            *slot = ch as u8;
            read_len += 1;
        }
        Ok(read_len)
    }

    fn write(&self, buf: &[u8]) -> Result<usize> {
        if !self.access_mode.is_writable() {
            return_errno_with_message!(Errno::EBADF, "the console is not open for writing");
        }

        let driver = console_driver();
        for ch in buf {
            driver.putch(*ch);
        }
        Ok(buf.len())
    }

    fn access_mode(&self) -> AccessMode {
        self.access_mode
    }
}
