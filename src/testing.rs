// Host-side test doubles: a bus that emulates panel GRAM and a recording delay.

use std::collections::BTreeSet;
use std::vec::Vec;

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};
use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

use crate::commands::{CASET, PASET, RAMWR};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Command(u8),
    Data(Vec<u8>),
}

/// Records every frame and replays CASET/PASET/RAMWR into a pixel grid.
pub struct MockPanel {
    pub frames: Vec<Frame>,
    /// Fail every bus call once this many frames have been accepted.
    pub fail_after: Option<usize>,
    width: u16,
    height: u16,
    gram: Vec<Option<u16>>,
    writes: Vec<u32>,
    cmd: Option<u8>,
    params: Vec<u8>,
    cols: (u16, u16),
    rows: (u16, u16),
    cursor: (u16, u16),
    half: Option<u8>,
    /// Pixels streamed past the end of the address window.
    pub overruns: usize,
    /// Pixels that landed outside the emulated GRAM.
    pub off_panel: usize,
}

impl MockPanel {
    pub fn new(width: u16, height: u16) -> Self {
        let cells = usize::from(width) * usize::from(height);
        Self {
            frames: Vec::new(),
            fail_after: None,
            width,
            height,
            gram: vec![None; cells],
            writes: vec![0; cells],
            cmd: None,
            params: Vec::new(),
            cols: (0, 0),
            rows: (0, 0),
            cursor: (0, 0),
            half: None,
            overruns: 0,
            off_panel: 0,
        }
    }

    pub fn pixel(&self, x: u16, y: u16) -> Option<u16> {
        self.index(x, y).and_then(|i| self.gram[i])
    }

    pub fn write_count(&self, x: u16, y: u16) -> u32 {
        self.index(x, y).map_or(0, |i| self.writes[i])
    }

    /// Every coordinate written at least once.
    pub fn written(&self) -> BTreeSet<(u16, u16)> {
        let mut set = BTreeSet::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.write_count(x, y) > 0 {
                    set.insert((x, y));
                }
            }
        }
        set
    }

    pub fn total_writes(&self) -> u64 {
        self.writes.iter().map(|&n| u64::from(n)).sum()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                Frame::Command(c) => Some(*c),
                Frame::Data(_) => None,
            })
            .collect()
    }

    pub fn count_command(&self, cmd: u8) -> usize {
        self.commands().iter().filter(|&&c| c == cmd).count()
    }

    /// Sizes of the data bursts that followed a RAMWR.
    pub fn pixel_bursts(&self) -> Vec<usize> {
        let mut in_ramwr = false;
        let mut sizes = Vec::new();
        for frame in &self.frames {
            match frame {
                Frame::Command(c) => in_ramwr = *c == RAMWR,
                Frame::Data(d) if in_ramwr => sizes.push(d.len()),
                Frame::Data(_) => {}
            }
        }
        sizes
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    fn check_fail(&self) -> Result<(), DisplayError> {
        match self.fail_after {
            Some(n) if self.frames.len() >= n => Err(DisplayError::BusWriteError),
            _ => Ok(()),
        }
    }

    fn command(&mut self, cmd: u8) {
        self.cmd = Some(cmd);
        self.params.clear();
        self.half = None;
        if cmd == RAMWR {
            self.cursor = (self.cols.0, self.rows.0);
        }
    }

    fn data(&mut self, bytes: &[u8]) {
        match self.cmd {
            Some(RAMWR) => {
                for &b in bytes {
                    match self.half.take() {
                        None => self.half = Some(b),
                        Some(hi) => self.store(u16::from_be_bytes([hi, b])),
                    }
                }
            }
            Some(c @ (CASET | PASET)) => {
                self.params.extend_from_slice(bytes);
                if self.params.len() >= 4 {
                    let p = &self.params;
                    let range = (
                        u16::from_be_bytes([p[0], p[1]]),
                        u16::from_be_bytes([p[2], p[3]]),
                    );
                    if c == CASET {
                        self.cols = range;
                    } else {
                        self.rows = range;
                    }
                }
            }
            _ => self.params.extend_from_slice(bytes),
        }
    }

    fn store(&mut self, color: u16) {
        let (x, y) = self.cursor;
        if y > self.rows.1 {
            self.overruns += 1;
            return;
        }
        match self.index(x, y) {
            Some(i) => {
                self.gram[i] = Some(color);
                self.writes[i] += 1;
            }
            None => self.off_panel += 1,
        }
        self.cursor = if x >= self.cols.1 { (self.cols.0, y + 1) } else { (x + 1, y) };
    }
}

impl WriteOnlyDataCommand for MockPanel {
    fn send_commands(&mut self, cmds: DataFormat<'_>) -> Result<(), DisplayError> {
        self.check_fail()?;
        let DataFormat::U8(bytes) = cmds else {
            return Err(DisplayError::DataFormatNotImplemented);
        };
        for &c in bytes {
            self.frames.push(Frame::Command(c));
            self.command(c);
        }
        Ok(())
    }

    fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
        self.check_fail()?;
        let DataFormat::U8(bytes) = buf else {
            return Err(DisplayError::DataFormatNotImplemented);
        };
        self.frames.push(Frame::Data(bytes.to_vec()));
        self.data(bytes);
        Ok(())
    }
}

/// Delay that returns immediately and remembers every millisecond request.
#[derive(Default)]
pub struct MockDelay {
    pub ms: Vec<u32>,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.ms.push(ms);
    }
}

/// Output pin that records every level it is driven to.
#[derive(Default)]
pub struct MockPin {
    pub levels: Vec<bool>,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.push(true);
        Ok(())
    }
}
